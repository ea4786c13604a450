//! Command implementations and dispatch logic.
//!
//! Each command is an async function that takes a [`CommandContext`].

use camino::{Utf8Path, Utf8PathBuf};
use manifold_config::{JobOverrides, ManifestKind};
use manifold_core::{ManifoldError, ManifoldResult};
use tracing::info;

pub mod intersect;
pub mod merge;


use crate::output::OutputHandler;
use crate::{Commands, MergeArgs};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
}

impl CommandContext {
    pub fn new() -> ManifoldResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| ManifoldError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| ManifoldError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("working directory is not valid UTF-8: {}", e.as_path().display()),
        })?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> ManifoldResult<()> {
    match command {
        Commands::Npm(args) => execute_kind(ManifestKind::Npm, args, ctx).await,
        Commands::Yarn(args) => execute_kind(ManifestKind::Yarn, args, ctx).await,
        Commands::Bower(args) => execute_kind(ManifestKind::Bower, args, ctx).await,
        Commands::Run { job, options } => {
            info!("Running merge job {:?}", job);
            let overrides = merge::overrides(None, None, Vec::new(), &options);
            merge::execute_job(job.as_deref().map(Utf8Path::new), overrides, options.log, ctx).await
        },
        Commands::Intersect {
            current,
            incoming,
            json,
        } => intersect::execute(&current, &incoming, json, ctx),
        Commands::Classify { values, json } => intersect::classify(&values, json, ctx),
        Commands::Version => show_version(ctx),
    }
}

async fn execute_kind(kind: ManifestKind, args: MergeArgs, ctx: &CommandContext) -> ManifoldResult<()> {
    info!("Merging {} manifests", kind);
    let overrides = merge::overrides(Some(kind), args.template, args.packages, &args.options);
    merge::execute(overrides, args.options.log, ctx).await
}

/// Handle a bare argument: a job file to run, or a mistyped command
pub async fn execute_job_argument(raw: &str, ctx: &CommandContext) -> ManifoldResult<()> {
    let path = Utf8Path::new(raw);

    if !ctx.cwd.join(path).exists() && !raw.contains('.') && !raw.contains('/') {
        if let Some(suggestion) = suggest_similar_command(raw) {
            ctx.output.error(&format!("Unknown command '{}'", raw));
            ctx.output.info(&format!("Did you mean '{}'?", suggestion));
            ctx.output.info("");
            ctx.output.info("Run 'manifold --help' to see available commands.");
        }
        return Err(ManifoldError::ConfigValidation {
            field: "command".to_string(),
            reason: format!("Unknown command: {}", raw),
        });
    }

    info!("Running job file: {}", path);
    merge::execute_job(Some(path), JobOverrides::default(), false, ctx).await
}

/// Show help information
pub fn show_help(ctx: &CommandContext) -> ManifoldResult<()> {
    ctx.output.info("manifold - merge npm, yarn and bower manifests");
    ctx.output.info("");
    ctx.output.info("Usage: manifold [COMMAND] [OPTIONS]");
    ctx.output.info("");
    ctx.output.info("Merging:");
    ctx.output.info("  npm <template> [packages...]     Merge package.json manifests");
    ctx.output.info("  yarn <template> [packages...]    Merge package.json manifests with resolutions");
    ctx.output.info("  bower <template> [packages...]   Merge bower.json manifests");
    ctx.output.info("  run [job]                        Run a manifold.toml job");
    ctx.output.info("");
    ctx.output.info("Constraints:");
    ctx.output.info("  intersect <current> <incoming>   Combine two version constraints");
    ctx.output.info("  classify <values...>             Classify dependency values");
    ctx.output.info("");
    ctx.output.info("Meta:");
    ctx.output.info("  version                          Show version information");
    ctx.output.info("");
    ctx.output.info("Run 'manifold <command> --help' for more information on a command.");
    Ok(())
}

pub(crate) fn show_version(ctx: &CommandContext) -> ManifoldResult<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.emit(&format!("manifold v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.emit(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.emit(&format!("Target: {}", target));
    ctx.output.emit(&format!("Rust: {}", env!("RUSTC_VERSION")));
    Ok(())
}

/// Suggest similar commands based on edit distance
pub fn suggest_similar_command(input: &str) -> Option<String> {
    const COMMANDS: [&str; 8] = [
        "npm", "yarn", "bower", "run", "intersect", "classify", "version", "help",
    ];

    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for command in COMMANDS {
        let distance = edit_distance(input, command);
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(command);
        }
    }

    best_match.map(str::to_string)
}

/// Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b.len()]
}
