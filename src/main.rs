//! scenedump CLI
//!
//! Loads a scene file and writes a deterministic text dump of its meshes,
//! animations and node graph. Embedded textures are exported next to the
//! dump as image files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, error, info};

use scenedump_core::logging::{self, TracingConfig};
use scenedump_export::{DumpError, DumpOptions, ImageFormat, SceneDumper, TextureExportOptions};
use scenedump_loaders::{LoaderInfo, LoaderRegistry};

/// Extension the output document must carry
const OUTPUT_EXTENSION: &str = "txt";

/// Wrong number of arguments
const EXIT_USAGE: u8 = 5;
/// Output path does not end in `.txt`
const EXIT_BAD_EXTENSION: u8 = 10;
/// Output file cannot be created
const EXIT_OPEN_OUTPUT: u8 = 15;

/// scenedump - write a plain-text dump of a 3D scene
#[derive(Parser, Debug)]
#[command(name = "scenedump")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene file to load
    input: PathBuf,

    /// Dump file to write (must end in .txt)
    #[arg(default_value = "output.txt")]
    output: PathBuf,

    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Image format for embedded textures: tga, png, bmp, jpg
    #[arg(long, default_value = "tga")]
    image_format: ImageFormat,

    /// Flip textures vertically before writing them
    #[arg(long)]
    flip_textures: bool,

    /// Only describe embedded textures, do not write image files
    #[arg(long)]
    no_textures: bool,

    /// Skip structural checks of the loaded scene
    #[arg(long)]
    no_validate: bool,
}

fn setup_logging(verbosity: u8) {
    logging::init_with_config(TracingConfig::for_verbosity(verbosity));
}

/// Whether `path` ends in `.<extension>` (case-sensitive)
fn has_required_extension(path: &Path, extension: &str) -> bool {
    path.to_string_lossy()
        .strip_suffix(extension)
        .is_some_and(|rest| rest.ends_with('.'))
}

/// Exit code for a command line that failed to parse
///
/// A wrong number of arguments maps to [`EXIT_USAGE`]; everything else keeps
/// clap's own code (0 for help/version, 2 for invalid values).
fn parse_error_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::MissingRequiredArgument
        | ErrorKind::UnknownArgument
        | ErrorKind::TooManyValues
        | ErrorKind::WrongNumberOfValues => EXIT_USAGE,
        _ => u8::try_from(err.exit_code()).unwrap_or(2),
    }
}

/// `JSON Scene (.json), ...` for the "not recognized" hint
fn supported_formats(loaders: &[LoaderInfo]) -> String {
    loaders
        .iter()
        .map(|l| {
            let extensions: Vec<String> = l.extensions.iter().map(|e| format!(".{e}")).collect();
            format!("{} ({})", l.name, extensions.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_error_code(&err));
        }
    };
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if !has_required_extension(&cli.output, OUTPUT_EXTENSION) {
        eprintln!("The output path must have .{OUTPUT_EXTENSION} as file extension");
        return Ok(ExitCode::from(EXIT_BAD_EXTENSION));
    }

    let registry = LoaderRegistry::with_builtin().with_options(scenedump_loaders::LoadOptions {
        validate: !cli.no_validate,
    });
    let loaders = registry.list();
    for loader in &loaders {
        debug!(
            loader = %loader.name,
            extensions = ?loader.extensions,
            priority = loader.priority,
            "Loader available"
        );
    }

    let scene = match registry.load(&cli.input) {
        Ok(scene) => scene,
        Err(err) => {
            error!("{err}");
            eprintln!("Unable to load asset: {}", cli.input.display());
            if err.is_not_recognized() {
                eprintln!("Supported formats: {}", supported_formats(&loaders));
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    let options = DumpOptions {
        texture: TextureExportOptions {
            format: cli.image_format,
            flip_y: cli.flip_textures,
        },
        export_textures: !cli.no_textures,
        required_extension: OUTPUT_EXTENSION.to_string(),
    };

    let dumper = SceneDumper::new(options);
    let report = match dumper.dump_to_path(&scene, &cli.output) {
        Ok(report) => report,
        Err(err @ DumpError::OpenOutput { .. }) => {
            error!("{err}");
            eprintln!("Unable to open output file");
            return Ok(ExitCode::from(EXIT_OPEN_OUTPUT));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to write {}", cli.output.display()));
        }
    };

    info!(
        meshes = report.meshes,
        animations = report.animations,
        nodes = report.nodes,
        "Dump written"
    );
    println!("Wrote {}", cli.output.display());
    println!(
        "  {} meshes, {} animations, {} nodes",
        report.meshes, report.animations, report.nodes
    );
    if !report.textures.is_empty() {
        println!(
            "  {} textures written, {} skipped",
            report.textures_written(),
            report.textures_skipped()
        );
    }

    Ok(ExitCode::SUCCESS)
}
