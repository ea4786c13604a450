//! manifold.toml merge job parsing and serialization
//!
//! A job file describes one merge run so it can be repeated without a long
//! command line:
//!
//! ```toml
//! kind = "yarn"
//! template = "template/package.json"
//! packages = ["packages/app/", "packages/lib/package.json"]
//! save-to = "dist/"
//! extra-buckets = ["bundledDependencies"]
//! indent = 2
//! ```

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use manifold_core::ManifoldError;

use crate::json::DEFAULT_INDENT;
use crate::kind::ManifestKind;
use crate::ConfigResult;

/// Default job file name
pub const JOB_FILE: &str = "manifold.toml";

/// Complete merge job description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MergeJob {
    /// Manifest format being merged
    pub kind: ManifestKind,

    /// Template manifest the packages are merged into
    pub template: String,

    /// Package manifests, merged in order
    #[serde(default)]
    pub packages: Vec<String>,

    /// Output path; the merged manifest goes to stdout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to: Option<String>,

    /// Additional dependency buckets to merge
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_buckets: Vec<String>,

    /// Indent width of the written manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

impl MergeJob {
    pub fn new(kind: ManifestKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            template: template.into(),
            packages: Vec::new(),
            save_to: None,
            extra_buckets: Vec::new(),
            indent: None,
        }
    }

    pub fn indent(&self) -> usize {
        self.indent.unwrap_or(DEFAULT_INDENT)
    }

    /// Resolve relative paths against the directory holding the job file
    ///
    /// Trailing separators are kept so directory arguments still get the
    /// kind's default file name.
    pub fn rebase(mut self, base: &Utf8Path) -> Self {
        let join = |raw: &str| -> String {
            let path = Utf8Path::new(raw);
            if path.is_absolute() || base.as_str().is_empty() {
                raw.to_string()
            } else {
                let joined = base.join(path).into_string();
                if raw.ends_with('/') || raw.ends_with('\\') {
                    format!("{}/", joined.trim_end_matches(['/', '\\']))
                } else {
                    joined
                }
            }
        };

        self.template = join(&self.template);
        self.packages = self.packages.iter().map(|p| join(p)).collect();
        self.save_to = self.save_to.as_deref().map(join);
        self
    }
}

/// Parse TOML text into a merge job
pub fn parse_merge_job(content: &str) -> ConfigResult<MergeJob> {
    // First try with toml_edit for syntax errors with a location
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| toml_error(content, e.message(), e.span()))?;

    // Then parse with serde for type safety
    let job: MergeJob =
        toml::from_str(content).map_err(|e| toml_error(content, e.message(), e.span()))?;

    validate_job(&job)?;
    Ok(job)
}

/// Serialize a merge job to TOML text
pub fn serialize_merge_job(job: &MergeJob) -> ConfigResult<String> {
    toml::to_string_pretty(job).map_err(|e| ManifoldError::ConfigValidation {
        field: "job".to_string(),
        reason: format!("TOML serialization error: {}", e),
    })
}

/// Check job fields that serde cannot
pub fn validate_job(job: &MergeJob) -> ConfigResult<()> {
    if job.template.trim().is_empty() {
        return Err(ManifoldError::ConfigValidation {
            field: "template".to_string(),
            reason: "a template manifest path is required".to_string(),
        });
    }

    if let Some(index) = job.packages.iter().position(|p| p.trim().is_empty()) {
        return Err(ManifoldError::ConfigValidation {
            field: format!("packages[{}]", index),
            reason: "package paths must not be empty".to_string(),
        });
    }

    if let Some(bucket) = job.extra_buckets.iter().find(|b| b.trim().is_empty()) {
        return Err(ManifoldError::ConfigValidation {
            field: "extra-buckets".to_string(),
            reason: format!("invalid bucket name '{}'", bucket),
        });
    }

    if matches!(job.indent, Some(width) if width > 16) {
        return Err(ManifoldError::ConfigValidation {
            field: "indent".to_string(),
            reason: "indent must be at most 16 spaces".to_string(),
        });
    }

    Ok(())
}

/// Load and parse a job file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<MergeJob> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ManifoldError::io(format!("Failed to read {}", path), e))?;

    parse_merge_job(&content).map_err(|e| match e {
        ManifoldError::TomlParse {
            message,
            line,
            column,
        } => ManifoldError::TomlParse {
            message: format!("in file {}: {}", path, message),
            line,
            column,
        },
        other => other,
    })
}

fn toml_error(content: &str, message: &str, span: Option<std::ops::Range<usize>>) -> ManifoldError {
    let (line, column) = span
        .map(|span| line_column(content, span.start))
        .unwrap_or((0, 0));

    ManifoldError::TomlParse {
        message: message.trim().to_string(),
        line,
        column,
    }
}

/// One-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |newline| before.len() - newline - 1) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_job() {
        let toml = r#"
kind = "npm"
template = "template.json"
"#;
        let job = parse_merge_job(toml).unwrap();
        assert_eq!(job.kind, ManifestKind::Npm);
        assert!(job.packages.is_empty());
        assert_eq!(job.indent(), 4);
    }

    #[test]
    fn test_parse_full_job() {
        let toml = r#"
kind = "yarn"
template = "template/package.json"
packages = ["packages/app/", "packages/lib/package.json"]
save-to = "dist/"
extra-buckets = ["bundledDependencies"]
indent = 2
"#;
        let job = parse_merge_job(toml).unwrap();
        assert_eq!(job.kind, ManifestKind::Yarn);
        assert_eq!(job.packages.len(), 2);
        assert_eq!(job.save_to.as_deref(), Some("dist/"));
        assert_eq!(job.extra_buckets, vec!["bundledDependencies"]);
        assert_eq!(job.indent(), 2);
    }

    #[test]
    fn test_syntax_error_has_location() {
        let toml = "kind = \"npm\"\ntemplate = \n";
        match parse_merge_job(toml) {
            Err(ManifoldError::TomlParse { line, column, .. }) => {
                assert_eq!(line, 2);
                assert!(column > 1);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind() {
        let toml = "kind = \"pnpm\"\ntemplate = \"t.json\"\n";
        assert!(matches!(parse_merge_job(toml), Err(ManifoldError::TomlParse { .. })));
    }

    #[test]
    fn test_unknown_field() {
        let toml = "kind = \"npm\"\ntemplate = \"t.json\"\nsave_to = \"x\"\n";
        assert!(parse_merge_job(toml).is_err());
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let toml = "kind = \"bower\"\ntemplate = \"  \"\n";
        assert!(matches!(
            parse_merge_job(toml),
            Err(ManifoldError::ConfigValidation { ref field, .. }) if field == "template"
        ));
    }

    #[test]
    fn test_rebase_keeps_directory_hints() {
        let mut job = MergeJob::new(ManifestKind::Npm, "template.json");
        job.packages = vec!["pkgs/app/".to_string(), "/abs/package.json".to_string()];
        job.save_to = Some("out/".to_string());

        let job = job.rebase(Utf8Path::new("/work"));
        assert_eq!(job.template, "/work/template.json");
        assert_eq!(job.packages, vec!["/work/pkgs/app/", "/abs/package.json"]);
        assert_eq!(job.save_to.as_deref(), Some("/work/out/"));
    }

    #[test]
    fn test_round_trip_serialization() {
        let mut job = MergeJob::new(ManifestKind::Bower, "bower.json");
        job.packages = vec!["a/".to_string()];
        job.indent = Some(2);

        let serialized = serialize_merge_job(&job).unwrap();
        assert_eq!(parse_merge_job(&serialized).unwrap(), job);
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("abc", 0), (1, 1));
        assert_eq!(line_column("abc\ndef", 5), (2, 2));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rebase_keeps_directory_hint(dir in "[a-z]{1,8}(/[a-z]{1,8}){0,2}") {
                let mut job = MergeJob::new(ManifestKind::Npm, "template.json");
                job.packages = vec![format!("{}/", dir)];

                let job = job.rebase(Utf8Path::new("/work"));
                prop_assert_eq!(&job.packages[0], &format!("/work/{}/", dir));
            }

            #[test]
            fn line_column_is_one_based(content in "[a-z\\n]{0,40}", offset in 0usize..50) {
                let (line, column) = line_column(&content, offset);
                prop_assert!(line >= 1);
                prop_assert!(column >= 1);
            }
        }
    }
}
