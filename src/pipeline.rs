use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostic;
use crate::formats::{FormatError, FormatRegistry, ReadOptions, TopologyUse};
use crate::mesh::topology::{FaceTopology, TopologyError};

#[derive(Debug)]
pub enum ConvertError {
    /// No format is registered for the extension of the path.
    UnknownFormat(PathBuf),
    NotReadable(&'static str),
    NotWritable(&'static str),
    Read {
        path: PathBuf,
        source: FormatError,
    },
    Write {
        path: PathBuf,
        source: FormatError,
    },
    Topology(TopologyError),
    /// Faces shared by more than two tetrahedra were found in strict mode.
    NonManifold {
        face_count: usize,
    },
    SerializingReport(ron::Error),
    WritingReport {
        path: PathBuf,
        source: io::Error,
    },
}

impl error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConvertError::Read { source, .. } | ConvertError::Write { source, .. } => Some(source),
            ConvertError::Topology(err) => Some(err),
            ConvertError::SerializingReport(err) => Some(err),
            ConvertError::WritingReport { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConvertError::UnknownFormat(path) => write!(
                f,
                "Don't know the format of '{}'; invoke with --help for a list of supported formats.",
                path.display(),
            ),
            ConvertError::NotReadable(extension) => {
                write!(f, "The .{} format can't be read.", extension)
            }
            ConvertError::NotWritable(extension) => {
                write!(f, "The .{} format can't be written.", extension)
            }
            ConvertError::Read { path, source } => {
                write!(f, "Failed to read mesh {}: {}", path.display(), source)
            }
            ConvertError::Write { path, source } => {
                write!(f, "Failed to write mesh {}: {}", path.display(), source)
            }
            ConvertError::Topology(err) => write!(f, "Failed to recover faces: {}", err),
            ConvertError::NonManifold { face_count } => write!(
                f,
                "The mesh is not manifold: {} faces are shared by more than two tetrahedra.",
                face_count,
            ),
            ConvertError::SerializingReport(err) => {
                write!(f, "An error occurred while serializing the report: {}", err)
            }
            ConvertError::WritingReport { path, source } => write!(
                f,
                "An error occurred while writing the report {}: {}",
                path.display(),
                source,
            ),
        }
    }
}

impl From<TopologyError> for ConvertError {
    fn from(err: TopologyError) -> Self {
        ConvertError::Topology(err)
    }
}

impl From<ron::Error> for ConvertError {
    fn from(err: ron::Error) -> Self {
        ConvertError::SerializingReport(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub read_options: ReadOptions,
    /// Multiply all vertex coordinates by this factor before writing.
    pub scale: Option<f64>,
    /// Recover faces even if the output format doesn't require them.
    pub compute_faces: bool,
    /// Fail if the recovered faces show the mesh is not manifold.
    pub strict: bool,
    /// Where to write the conversion report in RON format.
    pub report: Option<PathBuf>,
}

impl ConvertOptions {
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O) -> Self {
        ConvertOptions {
            input: input.into(),
            output: output.into(),
            read_options: ReadOptions::default(),
            scale: None,
            compute_faces: false,
            strict: false,
            report: None,
        }
    }
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub vertex_count: usize,
    pub tetrahedron_count: usize,
    pub corrected_count: usize,
    pub degenerate_count: usize,
    pub unique_face_count: Option<usize>,
    pub boundary_face_count: Option<usize>,
    pub non_manifold_face_count: usize,
    /// Sum of signed tetrahedron volumes after repair, before scaling.
    pub volume: f64,
    pub scale: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads a mesh, makes all its tetrahedra positively oriented, optionally
/// recovers its boundary faces and scales it, and writes it in the format
/// given by the output extension.
///
/// Diagnostics are logged as they are found and returned in the report.
pub fn convert(
    registry: &FormatRegistry,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    let input_format = registry
        .for_path(&options.input)
        .ok_or_else(|| ConvertError::UnknownFormat(options.input.clone()))?;
    let output_format = registry
        .for_path(&options.output)
        .ok_or_else(|| ConvertError::UnknownFormat(options.output.clone()))?;
    let read = input_format
        .read
        .ok_or(ConvertError::NotReadable(input_format.extension))?;
    let write = output_format
        .write
        .ok_or(ConvertError::NotWritable(output_format.extension))?;

    log::info!(
        "Reading {} from {}",
        input_format.description,
        options.input.display(),
    );
    let mesh = read(&options.input, &options.read_options).map_err(|source| {
        ConvertError::Read {
            path: options.input.clone(),
            source,
        }
    })?;
    log::info!(
        "Read {} vertices and {} tetrahedra",
        mesh.vertices().len(),
        mesh.tetrahedra().len(),
    );

    let (mesh, repair) = mesh.repair_orientation();
    log_diagnostics(&repair.diagnostics);
    let corrected_count = repair.corrected_count();
    let degenerate_count = repair.degenerate_count();
    if corrected_count > 0 {
        log::info!("Corrected {} inverted tetrahedra", corrected_count);
    }
    if degenerate_count > 0 {
        log::warn!("Found {} zero-volume tetrahedra", degenerate_count);
    }

    let topology = if options.compute_faces || output_format.topology == TopologyUse::Required {
        Some(recover_faces(&mesh, options.strict)?)
    } else {
        None
    };
    if topology.is_some() && output_format.topology == TopologyUse::Ignored {
        log::warn!(
            "The .{} format can't store faces, recovered boundary faces will not be written",
            output_format.extension,
        );
    }

    let volume = mesh.signed_volume();
    let mesh = match options.scale {
        Some(factor) => {
            log::info!("Scaling vertices by {}", factor);
            mesh.scaled(factor)
        }
        None => mesh,
    };

    log::info!(
        "Writing {} to {}",
        output_format.description,
        options.output.display(),
    );
    write(&options.output, &mesh, topology.as_ref()).map_err(|source| ConvertError::Write {
        path: options.output.clone(),
        source,
    })?;

    let mut diagnostics = repair.diagnostics;
    if let Some(topology) = &topology {
        diagnostics.extend_from_slice(topology.diagnostics());
    }

    let report = ConversionReport {
        input: options.input.clone(),
        output: options.output.clone(),
        vertex_count: mesh.vertices().len(),
        tetrahedron_count: mesh.tetrahedra().len(),
        corrected_count,
        degenerate_count,
        unique_face_count: topology.as_ref().map(|t| t.unique_faces().len()),
        boundary_face_count: topology.as_ref().map(|t| t.boundary_faces().len()),
        non_manifold_face_count: topology
            .as_ref()
            .map_or(0, FaceTopology::non_manifold_face_count),
        volume,
        scale: options.scale,
        diagnostics,
    };

    if let Some(report_path) = &options.report {
        write_report(report_path, &report)?;
    }

    Ok(report)
}

fn recover_faces(mesh: &crate::mesh::Mesh, strict: bool) -> Result<FaceTopology, ConvertError> {
    let topology = mesh.face_topology()?;

    log::info!(
        "Recovered {} faces, {} of them on the boundary",
        topology.unique_faces().len(),
        topology.boundary_faces().len(),
    );
    log_diagnostics(topology.diagnostics());

    if !topology.is_manifold() {
        let face_count = topology.non_manifold_face_count();
        if strict {
            return Err(ConvertError::NonManifold { face_count });
        }
        log::error!(
            "{} faces are shared by more than two tetrahedra, only the first two owners are kept",
            face_count,
        );
    }

    Ok(topology)
}

/// Serializes the report as pretty RON into `path`.
pub fn write_report(path: &Path, report: &ConversionReport) -> Result<(), ConvertError> {
    let contents = ron::ser::to_string_pretty(report, ron::ser::PrettyConfig::default())?;

    fs::write(path, contents).map_err(|source| ConvertError::WritingReport {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Wrote conversion report to {}", path.display());

    Ok(())
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        log::log!(diagnostic.severity().log_level(), "{}", diagnostic);
    }
}
