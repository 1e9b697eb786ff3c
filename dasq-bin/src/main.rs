mod errors;
mod file_store;
mod handlers;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dasq", version, about, long_about = None)]
struct DasqCLI {
    /// Log library internals at debug level, unless `RUST_LOG` says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: DasqCommand,
}

#[derive(Subcommand)]
enum DasqCommand {
    /// Lays out data blob as shares of one namespace, erasure-extends the square and commits to it
    Build {
        /// Path of source data blob
        #[arg(short)]
        blob_path: PathBuf,
        /// Hex encoded namespace of the blob
        #[arg(short)]
        namespace: String,
        /// Optional target directory to put data availability header and extended square
        #[arg(short)]
        opt_target_dir: Option<PathBuf>,
    },
    /// Checks every row and column of shares on disk against data availability header
    Verify {
        /// Directory path to extended square
        square_dir_path: PathBuf,
    },
    /// Runs light node availability sampling over shares on disk
    Sample {
        /// Directory path to extended square
        square_dir_path: PathBuf,
        /// Number of distinct random coordinates to sample
        #[arg(long, default_value_t = 16)]
        samples: usize,
        /// Maximum number of samples in flight
        #[arg(long, default_value_t = 16)]
        concurrency: usize,
        /// Time budget of each sample, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
    /// Retrieves all shares of a namespace, verifying their inclusion and completeness
    Namespace {
        /// Directory path to extended square
        square_dir_path: PathBuf,
        /// Hex encoded namespace to look up
        namespace: String,
    },
    /// Reconstructs extended square from remaining shares, restoring missing ones
    Repair {
        /// Directory path to extended square
        square_dir_path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = DasqCLI::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        DasqCommand::Build {
            blob_path,
            namespace,
            opt_target_dir,
        } => handlers::handle_build_command(blob_path, namespace, opt_target_dir).await,
        DasqCommand::Verify { square_dir_path } => handlers::handle_verify_command(square_dir_path).await,
        DasqCommand::Sample {
            square_dir_path,
            samples,
            concurrency,
            timeout_ms,
        } => handlers::handle_sample_command(square_dir_path, *samples, *concurrency, *timeout_ms).await,
        DasqCommand::Namespace { square_dir_path, namespace } => handlers::handle_namespace_command(square_dir_path, namespace).await,
        DasqCommand::Repair { square_dir_path } => handlers::handle_repair_command(square_dir_path).await,
    }
}
