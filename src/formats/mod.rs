//! Readers and writers of on-disk tetrahedral mesh formats.
//!
//! Formats are looked up by file extension in a `FormatRegistry`, which maps
//! each extension to the read and write functions of its adapter.

use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nalgebra::Point3;

use crate::mesh::topology::FaceTopology;
use crate::mesh::{Mesh, MeshError};

pub mod node_ele;
pub mod obj;
pub mod tet;

#[derive(Debug)]
pub enum FormatError {
    FileNotFound(PathBuf),
    PermissionDenied(PathBuf),
    Io(io::Error),
    /// The file contents don't follow the format.
    InvalidStructure {
        line: usize,
        reason: String,
    },
    /// The parsed elements don't form a valid mesh.
    Mesh(MeshError),
    /// The writer needs recovered face topology, but none was provided.
    MissingTopology,
    /// Adds the path of the file in which the wrapped error occurred.
    InFile {
        path: PathBuf,
        source: Box<FormatError>,
    },
}

impl FormatError {
    /// Converts an IO error that occurred while opening `path`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FormatError::FileNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => FormatError::PermissionDenied(path.to_path_buf()),
            _ => FormatError::Io(err),
        }
    }

    /// Attaches `path` to errors that don't mention a file yet.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            FormatError::FileNotFound(_)
            | FormatError::PermissionDenied(_)
            | FormatError::InFile { .. } => self,
            _ => FormatError::InFile {
                path: path.to_path_buf(),
                source: Box::new(self),
            },
        }
    }
}

impl error::Error for FormatError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            FormatError::Io(err) => Some(err),
            FormatError::Mesh(err) => Some(err),
            FormatError::InFile { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatError::FileNotFound(path) => write!(f, "File {} was not found.", path.display()),
            FormatError::PermissionDenied(path) => write!(
                f,
                "Permission denied while accessing the file {}.",
                path.display(),
            ),
            FormatError::Io(err) => write!(f, "An IO error occurred: {}", err),
            FormatError::InvalidStructure { line, reason } => {
                write!(f, "Invalid file structure on line {}: {}", line, reason)
            }
            FormatError::Mesh(err) => write!(f, "Invalid mesh: {}", err),
            FormatError::MissingTopology => {
                write!(f, "The format requires recovered boundary faces.")
            }
            FormatError::InFile { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        FormatError::Io(err)
    }
}

impl From<MeshError> for FormatError {
    fn from(err: MeshError) -> Self {
        FormatError::Mesh(err)
    }
}

/// Whether a file numbers its vertices starting from zero or from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, clap::ValueEnum)]
pub enum IndexOrigin {
    Zero,
    One,
}

impl IndexOrigin {
    /// Detects the origin from the index of the first vertex in a file.
    pub fn detect(first_index: u64) -> Option<Self> {
        match first_index {
            0 => Some(IndexOrigin::Zero),
            1 => Some(IndexOrigin::One),
            _ => None,
        }
    }

    /// The value to subtract from file indices to get zero-based indices.
    pub fn offset(self) -> u64 {
        match self {
            IndexOrigin::Zero => 0,
            IndexOrigin::One => 1,
        }
    }
}

impl fmt::Display for IndexOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IndexOrigin::Zero => write!(f, "zero-based"),
            IndexOrigin::One => write!(f, "one-based"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Index origin of the file. If not set, readers detect it where the
    /// format allows and assume zero otherwise.
    pub index_origin: Option<IndexOrigin>,
}

pub type ReadFn = fn(&Path, &ReadOptions) -> Result<Mesh, FormatError>;
pub type WriteFn = fn(&Path, &Mesh, Option<&FaceTopology>) -> Result<(), FormatError>;

/// How a writer makes use of recovered face topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyUse {
    /// The format has no place to store faces.
    Ignored,
    /// Boundary faces are written if available.
    Optional,
    /// The format can't be written without boundary faces.
    Required,
}

/// Read and write capabilities of a mesh file format.
#[derive(Clone, Copy)]
pub struct FormatAdapter {
    /// Lowercase file extension, without the dot.
    pub extension: &'static str,
    pub description: &'static str,
    pub read: Option<ReadFn>,
    pub write: Option<WriteFn>,
    pub topology: TopologyUse,
}

impl fmt::Debug for FormatAdapter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FormatAdapter")
            .field("extension", &self.extension)
            .field("description", &self.description)
            .field("readable", &self.read.is_some())
            .field("writable", &self.write.is_some())
            .field("topology", &self.topology)
            .finish()
    }
}

/// Maps file extensions to format adapters.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    adapters: Vec<FormatAdapter>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registry of all formats supported by this crate.
    pub fn builtin() -> Self {
        let mut registry = FormatRegistry::new();

        registry.register(FormatAdapter {
            extension: "node",
            description: "Shewchuk's .node/.ele (and .face) files",
            read: Some(node_ele::read),
            write: Some(node_ele::write),
            topology: TopologyUse::Optional,
        });
        registry.register(FormatAdapter {
            extension: "tet",
            description: "AIM@SHAPE tetrahedral mesh",
            read: Some(tet::read),
            write: Some(tet::write),
            topology: TopologyUse::Ignored,
        });
        registry.register(FormatAdapter {
            extension: "obj",
            description: "Wavefront OBJ boundary surface (write only)",
            read: None,
            write: Some(obj::write),
            topology: TopologyUse::Required,
        });

        registry
    }

    /// Registers an adapter, replacing any adapter for the same extension.
    pub fn register(&mut self, adapter: FormatAdapter) {
        self.adapters
            .retain(|registered| registered.extension != adapter.extension);
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[FormatAdapter] {
        &self.adapters
    }

    /// Finds the adapter for an extension, ignoring case.
    pub fn find(&self, extension: &str) -> Option<&FormatAdapter> {
        let extension = extension.to_ascii_lowercase();
        self.adapters
            .iter()
            .find(|adapter| adapter.extension == extension)
    }

    /// Finds the adapter for the extension of `path`.
    pub fn for_path(&self, path: &Path) -> Option<&FormatAdapter> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| self.find(extension))
    }

    /// Human readable list of the registered formats.
    pub fn describe(&self) -> String {
        let mut description = String::from("SUPPORTED FORMATS:\n");

        for adapter in &self.adapters {
            let capabilities = match (adapter.read.is_some(), adapter.write.is_some()) {
                (true, true) => "read, write",
                (true, false) => "read",
                (false, true) => "write",
                (false, false) => "none",
            };
            description.push_str(&format!(
                "    .{:<6} {} [{}]\n",
                adapter.extension, adapter.description, capabilities,
            ));
        }

        description
    }
}

pub(crate) fn open_file(path: &Path) -> Result<BufReader<File>, FormatError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| FormatError::from_io(err, path))
}

pub(crate) fn create_file(path: &Path) -> Result<BufWriter<File>, FormatError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| FormatError::from_io(err, path))
}

/// A non-empty line of a text mesh file, split into whitespace separated
/// tokens.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Record {
    pub line: usize,
    pub tokens: Vec<String>,
}

impl Record {
    pub fn invalid(&self, reason: String) -> FormatError {
        FormatError::InvalidStructure {
            line: self.line,
            reason,
        }
    }

    pub fn expect_tokens(&self, count: usize, what: &str) -> Result<(), FormatError> {
        if self.tokens.len() < count {
            Err(self.invalid(format!(
                "expected {} with at least {} values, found {}",
                what,
                count,
                self.tokens.len(),
            )))
        } else {
            Ok(())
        }
    }

    pub fn parse<T: FromStr>(&self, position: usize, what: &str) -> Result<T, FormatError> {
        let token = self
            .tokens
            .get(position)
            .ok_or_else(|| self.invalid(format!("missing {}", what)))?;

        token
            .parse()
            .map_err(|_| self.invalid(format!("invalid {} '{}'", what, token)))
    }

    /// Parses a coordinate, rejecting `nan` and infinities.
    pub fn parse_coordinate(&self, position: usize, what: &str) -> Result<f64, FormatError> {
        let value: f64 = self.parse(position, what)?;

        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(format!("{} must be finite, found {}", what, value)))
        }
    }

    /// Parses three consecutive coordinates starting at `position`.
    pub fn parse_point(&self, position: usize) -> Result<Point3<f64>, FormatError> {
        Ok(Point3::new(
            self.parse_coordinate(position, "x coordinate")?,
            self.parse_coordinate(position + 1, "y coordinate")?,
            self.parse_coordinate(position + 2, "z coordinate")?,
        ))
    }
}

/// Initial capacity for a list whose length comes from a file header. The
/// header can't be trusted until the records are actually read.
pub(crate) fn capacity_for(count: usize) -> usize {
    count.min(MAX_PREALLOCATED_RECORDS)
}

const MAX_PREALLOCATED_RECORDS: usize = 4096;

/// Reads records from a text mesh file. Skips blank lines and comments
/// starting with `#`.
pub(crate) struct RecordReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        RecordReader {
            lines: reader.lines(),
            line: 0,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<Record>, FormatError> {
        for line in &mut self.lines {
            self.line += 1;
            let line = line?;
            let content = match line.find('#') {
                Some(comment_start) => &line[..comment_start],
                None => &line[..],
            };
            let tokens: Vec<String> = content.split_whitespace().map(String::from).collect();

            if !tokens.is_empty() {
                return Ok(Some(Record {
                    line: self.line,
                    tokens,
                }));
            }
        }

        Ok(None)
    }

    pub fn expect_record(&mut self, what: &str) -> Result<Record, FormatError> {
        match self.next_record()? {
            Some(record) => Ok(record),
            None => Err(FormatError::InvalidStructure {
                line: self.line,
                reason: format!("unexpected end of file, expected {}", what),
            }),
        }
    }
}
