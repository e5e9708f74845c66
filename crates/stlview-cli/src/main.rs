//! stlview CLI - inspect and convert STL models.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use stlview::{load_model_from_path, MeshStats, Model, ViewerConfig};
use stlview_stl::Format;

#[derive(Parser)]
#[command(name = "stlview")]
#[command(about = "Inspect and convert STL models", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print geometry statistics for an STL file
    Info {
        /// Path to the STL file
        file: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Re-encode an STL file as ASCII or binary
    Convert {
        /// Input STL file
        input: PathBuf,
        /// Output STL file
        output: PathBuf,
        /// Output encoding
        #[arg(short, long, value_enum, default_value_t = Encoding::Binary)]
        to: Encoding,
    },
    /// Parse files and report which ones fail
    Check {
        /// STL files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Encoding {
    Ascii,
    Binary,
}

impl From<Encoding> for Format {
    fn from(e: Encoding) -> Self {
        match e {
            Encoding::Ascii => Format::Ascii,
            Encoding::Binary => Format::Binary,
        }
    }
}

/// `info --json` payload.
#[derive(Serialize)]
struct Report<'a> {
    title: &'a str,
    #[serde(flatten)]
    stats: MeshStats,
    bound_size: f32,
    bound_scale: f32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .init();
}

/// `RUST_LOG` directives (default `warn`), raised to debug or trace by `-v`.
fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    let filter = rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    match verbose {
        0 => filter,
        1 => filter.add_directive(Level::DEBUG.into()),
        _ => filter.add_directive(Level::TRACE.into()),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Commands::Info { file, json } => show_info(&file, json, &config)?,
        Commands::Convert { input, output, to } => convert(&input, &output, to.into(), &config)?,
        Commands::Check { files } => return Ok(check(&files, &config)),
    }
    Ok(ExitCode::SUCCESS)
}

fn load(path: &Path, config: &ViewerConfig) -> Result<Model> {
    load_model_from_path(path, config).with_context(|| format!("failed to load {}", path.display()))
}

fn show_info(file: &Path, json: bool, config: &ViewerConfig) -> Result<()> {
    let mut model = load(file, config)?;
    model.setup(config.bound_size);
    let mesh = model.mesh();

    if json {
        let report = Report {
            title: model.title(),
            stats: mesh.stats(),
            bound_size: config.bound_size,
            bound_scale: mesh.bound_scale(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let b = mesh.bounds();
    let [cx, cy, cz] = mesh.center_of_mass();
    println!("STL model: {}", file.display());
    println!("  Title: {}", model.title());
    println!("  Triangles: {}", mesh.triangle_count());
    println!("  Vertices: {}", mesh.vertex_count());
    println!(
        "  Bounds: x [{}, {}]  y [{}, {}]  z [{}, {}]",
        b.min_x(),
        b.max_x(),
        b.min_y(),
        b.max_y(),
        b.min_z(),
        b.max_z()
    );
    println!(
        "  Size: {} x {} x {}",
        mesh.width(),
        mesh.height(),
        mesh.depth()
    );
    println!("  Center of mass: ({cx}, {cy}, {cz})");
    println!("  Volume: {}", mesh.volume());
    println!(
        "  Floor offset: {} (bound size {})",
        mesh.floor_offset(),
        config.bound_size
    );
    Ok(())
}

fn convert(input: &Path, output: &Path, format: Format, config: &ViewerConfig) -> Result<()> {
    let model = load(input, config)?;
    stlview_stl::write_stl_file(model.mesh(), model.title(), format, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Converted {} ({} triangles) to {} STL at {}",
        input.display(),
        model.mesh().triangle_count(),
        format,
        output.display()
    );
    Ok(())
}

fn check(files: &[PathBuf], config: &ViewerConfig) -> ExitCode {
    let mut failed = 0;
    for file in files {
        match load_model_from_path(file, config) {
            Ok(model) => println!(
                "ok    {} ({} triangles)",
                file.display(),
                model.mesh().triangle_count()
            ),
            Err(e) => {
                failed += 1;
                println!("FAIL  {} [{:?}] {}", file.display(), e.kind(), e);
            }
        }
    }
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_defaults_to_binary() {
        let cli = Cli::try_parse_from(["stlview", "convert", "a.stl", "b.stl"]).unwrap();
        match cli.command {
            Commands::Convert { to, .. } => assert_eq!(Format::from(to), Format::Binary),
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stlview", "info", "a.stl", "--json", "-vv", "--config", "c.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(Path::new("c.toml")));
        assert!(matches!(cli.command, Commands::Info { json: true, .. }));
    }

    #[test]
    fn test_check_requires_files() {
        assert!(Cli::try_parse_from(["stlview", "check"]).is_err());
    }

    #[test]
    fn test_log_filter_honors_rust_log() {
        assert_eq!(log_filter(0, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(0, Some("")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(0, Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(0, Some("stlview_stl=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_log_filter_verbosity() {
        assert_eq!(log_filter(1, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(2, Some("info")).max_level_hint(), Some(LevelFilter::TRACE));
    }
}
