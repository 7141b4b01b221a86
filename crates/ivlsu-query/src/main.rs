//! Command-line point queries against the IVLSU velocity model.
//!
//! Reads `longitude latitude depth` lines from a file or stdin and writes
//! `longitude latitude depth vp vs rho` for each point to stdout. Logs go to
//! stderr.
//!
//! ```bash
//! echo "-116.0516 32.6862 2000" | ivlsu_query --install-dir /opt/ucvm
//! ```

mod input;
mod output;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ivlsu_model::{LoadOptions, Model, ModelError, PropertiesRecord, StorageMode};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use output::Format;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A query line could not be parsed.
    #[error("Input line {line}: {reason}")]
    Input { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageArg {
    /// Memory when it fits, otherwise disk.
    Auto,
    /// Always load into memory.
    Memory,
    /// Always read from disk.
    File,
}

impl From<StorageArg> for StorageMode {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Auto => StorageMode::Auto,
            StorageArg::Memory => StorageMode::InMemory,
            StorageArg::File => StorageMode::FileBacked,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ivlsu_query", version, about = "Query the IVLSU velocity model")]
struct Cli {
    /// Installation root holding `model/<label>/data`.
    #[arg(long, env = "IVLSU_INSTALL_DIR")]
    install_dir: PathBuf,

    /// Model label under the installation root.
    #[arg(long, default_value = "ivlsu")]
    label: String,

    /// Query points file (default: stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// How to hold the velocity data.
    #[arg(long, value_enum, default_value_t = StorageArg::Auto)]
    storage: StorageArg,

    /// Largest model, in bytes, to hold in memory.
    #[arg(long)]
    memory_limit: Option<u64>,

    /// Query points in parallel.
    #[arg(long)]
    parallel: bool,

    /// Write one JSON object per line.
    #[arg(long)]
    json: bool,

    /// Print the model summary and exit.
    #[arg(long)]
    info: bool,

    /// Debug logging (overrides RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            storage: self.storage.into(),
            memory_limit: self.memory_limit,
        }
    }

    fn format(&self) -> Format {
        if self.json {
            Format::JsonLines
        } else {
            Format::Text
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run<R: BufRead, W: Write>(cli: &Cli, input: R, output: W) -> Result<(), CliError> {
    let model = Model::init(&cli.install_dir, &cli.label, &cli.load_options())?;

    if cli.info {
        let mut output = output;
        writeln!(output, "{}", model.info())?;
        model.finalize()?;
        return Ok(());
    }

    let points = input::read_points(input)?;
    let mut records = vec![PropertiesRecord::default(); points.len()];
    let report = if cli.parallel {
        model.par_query(&points, &mut records)?
    } else {
        model.query(&points, &mut records)?
    };

    info!(
        points = report.points,
        resolved = report.resolved,
        not_available = report.not_available(),
        "Query complete"
    );
    for (index, err) in &report.failures {
        warn!(index, error = %err, "Point failed");
    }

    output::write_results(output, cli.format(), &points, &records)?;
    model.finalize()?;
    Ok(())
}

fn entrypoint(cli: &Cli) -> Result<(), CliError> {
    let stdout = BufWriter::new(io::stdout().lock());
    match &cli.input {
        Some(path) => run(cli, BufReader::new(File::open(path)?), stdout),
        None => run(cli, io::stdin().lock(), stdout),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match entrypoint(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
