//! # manifold-cli
//!
//! Merges the dependency buckets of npm, yarn and bower manifests into a
//! template manifest.
//!
//! This is the main entry point for the `manifold` tool. It handles command
//! parsing, sets up logging and panic reporting, and dispatches to the
//! command handlers.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use manifold_core::{ManifoldError, ManifoldResult};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Environment variable holding an `EnvFilter` directive
const LOG_ENV: &str = "MANIFOLD_LOG";

/// Merge dependency buckets of npm, yarn and bower manifests
#[derive(Parser)]
#[command(name = "manifold", version, about = "Merge npm, yarn and bower manifests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Job file to run directly
    #[arg(value_name = "JOB")]
    pub job: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Format of log lines written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge package.json manifests
    Npm(MergeArgs),
    /// Merge package.json manifests, including resolutions
    Yarn(MergeArgs),
    /// Merge bower.json manifests
    Bower(MergeArgs),
    /// Run a manifold.toml merge job
    Run {
        /// Job file; searched for upwards from the working directory when omitted
        job: Option<String>,
        #[command(flatten)]
        options: MergeOptions,
    },
    /// Combine two version constraints the way a merge would
    Intersect {
        /// Constraint already held
        current: String,
        /// Constraint being merged in
        incoming: String,
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify version constraints as exact versions, ranges or other values
    Classify {
        #[arg(required = true)]
        values: Vec<String>,
        /// Print the classifications as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

/// Arguments of the per-kind merge commands
#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// Template manifest (falls back to MANIFOLD_TEMPLATE)
    pub template: Option<String>,

    /// Package manifests or directories, merged in order
    pub packages: Vec<String>,

    #[command(flatten)]
    pub options: MergeOptions,
}

/// Options shared by every command that performs a merge
#[derive(Args, Debug, Clone, Default)]
pub struct MergeOptions {
    /// Write the merged manifest here instead of stdout; a trailing slash
    /// appends the default file name
    #[arg(long)]
    pub save_to: Option<String>,

    /// Additional dependency bucket to merge (repeatable)
    #[arg(long = "extra-bucket", value_name = "BUCKET")]
    pub extra_buckets: Vec<String>,

    /// Indent width of the written manifest
    #[arg(long)]
    pub indent: Option<usize>,

    /// Narrate the merge on stderr
    #[arg(long)]
    pub log: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_format);
    setup_panic_handler();

    info!("Starting manifold v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&error));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> ManifoldResult<()> {
    // Only the loader does async file IO
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ManifoldError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;

        match cli.command {
            Some(command) => commands::dispatch_command(command, &ctx).await,
            None => match cli.job {
                Some(job) => commands::execute_job_argument(&job, &ctx).await,
                None => commands::show_help(&ctx),
            },
        }
    })
}

fn setup_logging(verbose: bool, format: LogFormat) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "manifold={level},manifold_core={level},manifold_config={level},manifold_resolver={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("manifold encountered an unexpected error: {}", panic_info);
        eprintln!("manifold crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/manifold-rs/manifold/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
