//! polysmooth CLI - smooth planar polygonal meshes.
//!
//! Usage: polysmooth <COMMAND> [OPTIONS] <INPUT>
//!
//! `smooth` writes `<name>_initial`, `<name>_smart_laplace` and `<name>_getme`
//! meshes into the output directory and prints a quality report for each.
//! Run `polysmooth --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use polysmooth::algo::{getme, smart_laplace, GetmeConfig, Progress, SmartLaplaceConfig};
use polysmooth::io;
use polysmooth::mesh::PolygonalMesh;
use polysmooth::report;

#[derive(Parser)]
#[command(name = "polysmooth")]
#[command(author, version, about = "Polygonal mesh smoothing CLI", long_about = None)]
struct Cli {
    /// Log level (overrides RUST_LOG)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information and quality
    Info {
        /// Input mesh file (.obj or .mesh)
        input: PathBuf,
    },

    /// Smooth a mesh and write the results
    Smooth {
        /// Input mesh file (.obj or .mesh)
        input: PathBuf,

        /// Directory receiving the result meshes
        #[arg(short, long, default_value = "res")]
        output_dir: PathBuf,

        /// Smoothing algorithm
        #[arg(short, long, value_enum, default_value = "all")]
        algorithm: AlgorithmChoice,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum AlgorithmChoice {
    /// Smart-Laplace followed by GETMe
    All,
    /// Smart-Laplace only
    SmartLaplace,
    /// GETMe only
    Getme,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if let Some(level) = cli.log_level {
        logger.filter_level(level.into());
    }
    logger.init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Smooth {
            input,
            output_dir,
            algorithm,
            progress,
            sequential,
        } => {
            cmd_smooth(&input, &output_dir, algorithm, progress, sequential)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let shown = Arc::new(AtomicUsize::new(usize::MAX));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        let percent = (current.min(total) * 100) / total;
        if shown.swap(percent, Ordering::Relaxed) == percent {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {:<24}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: PolygonalMesh = io::load(input)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "File: {}", input.display())?;
    report::write_initial_mesh_information(&mut out, &mesh)?;
    writeln!(out, "  total area: {:.6}", mesh.total_area())?;
    Ok(())
}

fn cmd_smooth(
    input: &Path,
    output_dir: &Path,
    algorithm: AlgorithmChoice,
    show_progress: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "In File: {}", input.display())?;

    let mesh: PolygonalMesh = io::load(input)?;
    report::write_initial_mesh_information(&mut out, &mesh)?;

    std::fs::create_dir_all(output_dir)?;
    write_result_mesh(&mut out, &mesh, output_dir, input, "initial")?;

    let progress = if show_progress {
        create_progress()
    } else {
        Progress::none()
    };
    let mode = if sequential { "sequential" } else { "parallel" };

    if algorithm != AlgorithmChoice::Getme {
        let config = SmartLaplaceConfig::default().with_parallel(!sequential);
        info!("Running Smart Laplace ({})", mode);
        let result = smart_laplace::smart_laplace_with_progress(&mesh, &config, &progress)?;
        finish_progress(show_progress);
        report::write_smoothing_result(&mut out, &result)?;
        write_result_mesh(&mut out, &result.mesh, output_dir, input, result.algorithm.file_suffix())?;
    }

    if algorithm != AlgorithmChoice::SmartLaplace {
        let config = GetmeConfig::new(mesh.max_polygon_nodes()).with_parallel(!sequential);
        info!("Running GETMe ({})", mode);
        let result = getme::getme_with_progress(&mesh, &config, &progress)?;
        finish_progress(show_progress);
        report::write_smoothing_result(&mut out, &result)?;
        write_result_mesh(&mut out, &result.mesh, output_dir, input, result.algorithm.file_suffix())?;
    }

    Ok(())
}

fn finish_progress(show_progress: bool) {
    if show_progress {
        eprintln!();
    }
}

fn write_result_mesh<W: Write>(
    out: &mut W,
    mesh: &PolygonalMesh,
    output_dir: &Path,
    input: &Path,
    mesh_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = report::result_mesh_path(output_dir, input, mesh_name);
    writeln!(out, "Writing result mesh file {}", path.display())?;
    io::save(mesh, &path)?;
    Ok(())
}
