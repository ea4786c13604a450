//! Job file discovery, layering and environment overrides
//!
//! Settings are layered job file < environment < command line. Each layer
//! only replaces the fields it actually sets.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use manifold_core::ManifoldError;

use crate::kind::ManifestKind;
use crate::toml::{MergeJob, JOB_FILE};
use crate::ConfigResult;

/// Environment variables read by [`JobLayering::collect_env_overrides`]
pub const ENV_KIND: &str = "MANIFOLD_KIND";
pub const ENV_TEMPLATE: &str = "MANIFOLD_TEMPLATE";
pub const ENV_SAVE_TO: &str = "MANIFOLD_SAVE_TO";
pub const ENV_PACKAGES: &str = "MANIFOLD_PACKAGES";

/// Finds and loads merge job files
#[derive(Debug, Clone)]
pub struct JobLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Where a job came from
#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    /// Job file on disk
    File(Utf8PathBuf),
    /// Assembled from flags and environment only
    CommandLine,
}

/// Values set on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOverrides {
    pub kind: Option<ManifestKind>,
    pub template: Option<String>,
    /// Replaces the job's package list when non-empty
    pub packages: Vec<String>,
    pub save_to: Option<String>,
    /// Appended to the job's extra buckets
    pub extra_buckets: Vec<String>,
    pub indent: Option<usize>,
}

/// Layers environment and command line values over a job
pub struct JobLayering;

impl JobLoader {
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// Find a file in the working directory or one of its parents
    pub fn find_job_file(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    /// Load an explicit job file, or discover `manifold.toml`
    ///
    /// Relative paths inside the job are resolved against the job file's
    /// directory.
    pub async fn load_job(&self, explicit: Option<&Utf8Path>) -> ConfigResult<(MergeJob, JobSource)> {
        let path = match explicit {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.cwd.join(path),
            None => self.find_job_file(JOB_FILE).ok_or_else(|| ManifoldError::ConfigValidation {
                field: "job".to_string(),
                reason: format!(
                    "No {} found in {} or parent directories",
                    JOB_FILE, self.cwd
                ),
            })?,
        };

        debug!(path = %path, "loading merge job");
        let job = crate::toml::load_from_file(&path).await?;
        let base = path.parent().map(Utf8Path::to_path_buf).unwrap_or_default();

        Ok((job.rebase(&base), JobSource::File(path)))
    }
}

impl JobLayering {
    /// Apply environment then command line values on top of a job
    pub fn layer(
        job: MergeJob,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &JobOverrides,
    ) -> ConfigResult<MergeJob> {
        let mut merged = job;
        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides);
        crate::toml::validate_job(&merged)?;
        Ok(merged)
    }

    /// Build a job without a job file; the kind and template must come from
    /// the environment or the command line
    pub fn from_overrides(
        env_overrides: &HashMap<String, String>,
        cli_overrides: &JobOverrides,
    ) -> ConfigResult<MergeJob> {
        let kind = match cli_overrides.kind {
            Some(kind) => kind,
            None => env_overrides
                .get(ENV_KIND)
                .ok_or_else(|| missing("kind"))?
                .parse()?,
        };
        let template = cli_overrides
            .template
            .clone()
            .or_else(|| env_overrides.get(ENV_TEMPLATE).cloned())
            .ok_or_else(|| missing("template"))?;

        Self::layer(MergeJob::new(kind, template), env_overrides, cli_overrides)
    }

    fn apply_env_overrides(job: &mut MergeJob, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                ENV_KIND => {
                    job.kind = value.parse().map_err(|_| ManifoldError::ConfigValidation {
                        field: ENV_KIND.to_string(),
                        reason: format!("Invalid manifest kind in {}: '{}'", ENV_KIND, value),
                    })?;
                },
                ENV_TEMPLATE => job.template = value.clone(),
                ENV_SAVE_TO => job.save_to = Some(value.clone()),
                ENV_PACKAGES => job.packages = split_path_list(value),
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }
        Ok(())
    }

    fn apply_cli_overrides(job: &mut MergeJob, overrides: &JobOverrides) {
        if let Some(kind) = overrides.kind {
            job.kind = kind;
        }
        if let Some(template) = &overrides.template {
            job.template = template.clone();
        }
        if !overrides.packages.is_empty() {
            job.packages = overrides.packages.clone();
        }
        if let Some(save_to) = &overrides.save_to {
            job.save_to = Some(save_to.clone());
        }
        for bucket in &overrides.extra_buckets {
            if !job.extra_buckets.contains(bucket) {
                job.extra_buckets.push(bucket.clone());
            }
        }
        if overrides.indent.is_some() {
            job.indent = overrides.indent;
        }
    }

    /// Collect `MANIFOLD_*` environment variables
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("MANIFOLD_"))
            .collect()
    }
}

/// Split a platform path list (`:` on Unix, `;` on Windows)
fn split_path_list(value: &str) -> Vec<String> {
    std::env::split_paths(value)
        .map(|path| path.to_string_lossy().into_owned())
        .filter(|path| !path.is_empty())
        .collect()
}

fn missing(field: &str) -> ManifoldError {
    ManifoldError::ConfigValidation {
        field: field.to_string(),
        reason: format!("no {} given; pass it as an argument or set it in a job file", field),
    }
}
