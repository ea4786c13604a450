//! Merge pipeline behind the `npm`, `yarn`, `bower` and `run` commands
//!
//! Load the template and packages, fold the packages into the template,
//! write the merged buckets back into the template document, then save it
//! or print it.

use camino::{Utf8Path, Utf8PathBuf};
use manifold_config::{
    JobLayering, JobLoader, JobOverrides, JobSource, ManifestKind, ManifestLoader, MergeJob,
    PackageDocument,
};
use manifold_core::ManifoldResult;
use manifold_resolver::{DependencyMerger, MergeReporter, TracingReporter};
use tracing::{debug, info};

use super::CommandContext;
use crate::output::ConsoleReporter;
use crate::MergeOptions;

/// Result of one merge run
#[derive(Debug)]
pub struct MergeOutcome {
    /// Template document with the merged buckets
    pub document: PackageDocument,
    /// Where the document was written, if it was
    pub saved_to: Option<Utf8PathBuf>,
    /// Validation warnings, prefixed with the manifest path
    pub warnings: Vec<String>,
}

/// Collect command line values into job overrides
pub fn overrides(
    kind: Option<ManifestKind>,
    template: Option<String>,
    packages: Vec<String>,
    options: &MergeOptions,
) -> JobOverrides {
    JobOverrides {
        kind,
        template,
        packages,
        save_to: options.save_to.clone(),
        extra_buckets: options.extra_buckets.clone(),
        indent: options.indent,
    }
}

/// Merge using only the command line and environment
pub async fn execute(overrides: JobOverrides, log: bool, ctx: &CommandContext) -> ManifoldResult<()> {
    let env = JobLayering::collect_env_overrides();
    let job = JobLayering::from_overrides(&env, &overrides)?.rebase(&ctx.cwd);
    run_and_report(&job, log, ctx).await
}

/// Merge as described by a job file, with environment and flags layered on top
pub async fn execute_job(
    path: Option<&Utf8Path>,
    overrides: JobOverrides,
    log: bool,
    ctx: &CommandContext,
) -> ManifoldResult<()> {
    let (job, source) = JobLoader::new(ctx.cwd.clone()).load_job(path).await?;
    if let JobSource::File(path) = &source {
        info!(path = %path, "loaded merge job");
    }

    let env = JobLayering::collect_env_overrides();
    let job = JobLayering::layer(job, &env, &overrides)?.rebase(&ctx.cwd);
    run_and_report(&job, log, ctx).await
}

async fn run_and_report(job: &MergeJob, log: bool, ctx: &CommandContext) -> ManifoldResult<()> {
    let console = log.then(ConsoleReporter::new);
    let outcome = run_job(job, console.as_ref()).await?;

    for warning in &outcome.warnings {
        ctx.output.warn(warning);
    }

    match &outcome.saved_to {
        Some(path) => ctx.output.success(&format!("Saved merged manifest to {}", path)),
        None => ctx.output.emit(&outcome.document.to_json_string(job.indent())?),
    }
    Ok(())
}

/// Run one merge job
///
/// With a console reporter the run is narrated; otherwise merge events go to
/// `tracing`.
pub async fn run_job(job: &MergeJob, console: Option<&ConsoleReporter>) -> ManifoldResult<MergeOutcome> {
    let narrate = |message: &str| {
        if let Some(console) = console {
            console.announce(message);
        }
    };
    let reporter: &dyn MergeReporter = match console {
        Some(console) => console,
        None => &TracingReporter,
    };

    let mut loader = ManifestLoader::new(job.kind, &job.extra_buckets);
    let mut warnings = Vec::new();

    narrate("Inspecting template package...");
    let template = loader.load_template(&job.template).await?;
    warnings.extend(prefixed(&template.path, &template.warnings));

    let mut packages = Vec::with_capacity(job.packages.len());
    for raw in &job.packages {
        narrate(&format!("Inspecting package at {}", raw));
        let loaded = loader.load_package(raw).await?;
        warnings.extend(prefixed(&loaded.path, &loaded.warnings));
        packages.push(loaded.manifest);
    }

    narrate("Starting dependency resolution merge.");
    debug!(packages = packages.len(), kind = %job.kind, "merging manifests");
    let merged = DependencyMerger::new(loader.buckets())
        .with_reporter(reporter)
        .merge(template.manifest, &packages)?;

    let mut document = template.document;
    document.apply_manifest(&merged)?;

    let saved_to = match &job.save_to {
        Some(raw) => {
            narrate(&format!("Saving generated package to '{}'", loader.resolve_path(raw)));
            Some(loader.save(&document, raw, job.indent()).await?)
        },
        None => None,
    };

    narrate("All done!");
    Ok(MergeOutcome {
        document,
        saved_to,
        warnings,
    })
}

fn prefixed(path: &Utf8Path, warnings: &[String]) -> Vec<String> {
    warnings.iter().map(|warning| format!("{}: {}", path, warning)).collect()
}
