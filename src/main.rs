use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, FromArgMatches, Parser};

use tetconvert::formats::{FormatRegistry, IndexOrigin, ReadOptions};
use tetconvert::logger;
use tetconvert::pipeline::{self, ConvertOptions};

/// Converts tetrahedral meshes between file formats, making all tetrahedra
/// positively oriented on the way.
#[derive(Debug, Parser)]
#[clap(name = "tetconvert", version)]
struct Options {
    /// Mesh to read; its extension selects the format
    input: PathBuf,
    /// Mesh to write; its extension selects the format
    output: PathBuf,
    /// Multiply all vertex coordinates by this factor
    #[clap(short, long)]
    scale: Option<f64>,
    /// Recover boundary faces even if the output format doesn't need them
    #[clap(short, long)]
    faces: bool,
    /// Vertex numbering of the input instead of detecting it
    #[clap(long, value_enum)]
    index_origin: Option<IndexOrigin>,
    /// Write a conversion report in RON format to this path
    #[clap(long)]
    report: Option<PathBuf>,
    /// Fail if a face is shared by more than two tetrahedra
    #[clap(long)]
    strict: bool,
}

impl From<Options> for ConvertOptions {
    fn from(options: Options) -> Self {
        ConvertOptions {
            input: options.input,
            output: options.output,
            read_options: ReadOptions {
                index_origin: options.index_origin,
            },
            scale: options.scale,
            compute_faces: options.faces,
            strict: options.strict,
            report: options.report,
        }
    }
}

fn main() {
    let registry = FormatRegistry::builtin();
    let formats_help = registry.describe();
    let matches = Options::command()
        .after_help(formats_help.as_str())
        .get_matches();
    let options = match Options::from_arg_matches(&matches) {
        Ok(options) => options,
        Err(err) => err.exit(),
    };

    let logging = match logger::init() {
        Ok(()) => true,
        Err(err) => {
            eprintln!("Failed to initialize logger: {}", err);
            false
        }
    };

    match pipeline::convert(&registry, &ConvertOptions::from(options)) {
        Ok(report) => log::info!(
            "Converted {} tetrahedra ({} corrected, {} degenerate)",
            report.tetrahedron_count,
            report.corrected_count,
            report.degenerate_count,
        ),
        Err(err) => {
            if logging {
                log::error!("{}", err);
            } else {
                eprintln!("Error: {}", err);
            }
            process::exit(1);
        }
    }
}
