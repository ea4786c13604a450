//! Colored merge narration for `--log`

use std::io::Write;
use std::sync::Mutex;

use manifold_core::ConstraintError;
use manifold_resolver::MergeReporter;

use super::colors::ColorSupport;

/// Narrates a merge to a writer, stderr by default
pub struct ConsoleReporter {
    colors: ColorSupport,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::with_writer(ColorSupport::detect(), Box::new(std::io::stderr()))
    }

    pub fn with_writer(colors: ColorSupport, out: Box<dyn Write + Send>) -> Self {
        Self {
            colors,
            out: Mutex::new(out),
        }
    }

    /// Print a free-form narration line
    pub fn announce(&self, message: &str) {
        self.line(&self.colors.bold(message));
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        // Narration is best effort; a closed stderr must not fail the merge
        let _ = writeln!(out, "{}", text);
    }
}

impl std::fmt::Debug for ConsoleReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleReporter")
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

impl MergeReporter for ConsoleReporter {
    fn on_manifest_started(&self, manifest: &str, _index: usize) {
        self.line(&format!("Merging {}", self.colors.bold(manifest)));
    }

    fn on_bucket_started(&self, _manifest: &str, bucket: &str) {
        self.line(&self.colors.dim(&format!("  [{}]", bucket)));
    }

    fn on_dependency_added(&self, _bucket: &str, dependency: &str, value: &str) {
        self.line(&format!(
            "  Adding dependency '{}' with '{}'.",
            self.colors.cyan(dependency),
            self.colors.magenta(value)
        ));
    }

    fn on_dependency_merged(
        &self,
        _bucket: &str,
        dependency: &str,
        previous: &str,
        incoming: &str,
        merged: &str,
    ) {
        self.line(&format!(
            "  Merging dependency '{}' with '{}' and '{}' into '{}'.",
            self.colors.cyan(dependency),
            self.colors.magenta(previous),
            self.colors.magenta(incoming),
            self.colors.magenta(merged)
        ));
    }

    fn on_override_applied(&self, _bucket: &str, dependency: &str, value: &str) {
        self.line(&format!(
            "  {} '{}' resolved by resolution '{}'.",
            self.colors.yellow("Dependency conflict detected,"),
            self.colors.cyan(dependency),
            self.colors.magenta(value)
        ));
    }

    fn on_conflict(&self, bucket: &str, dependency: &str, error: &ConstraintError) {
        self.line(&format!(
            "  {} '{}' in '{}': {}",
            self.colors.red("Dependency conflict detected!"),
            self.colors.cyan(dependency),
            bucket,
            error
        ));
    }
}
