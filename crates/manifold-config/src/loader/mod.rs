//! Manifest loading for one merge run
//!
//! Resolves manifest arguments to files, parses and validates them with the
//! kind's cached validator, and extracts the merge view. The template also
//! gets an empty object for every bucket it lacks, so the merge never has to
//! create buckets on the fly.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use manifold_core::utils::manifest_path;
use manifold_core::{BucketSet, Manifest};

use crate::json::{self, PackageDocument};
use crate::kind::ManifestKind;
use crate::validate::ValidatorCache;
use crate::ConfigResult;

/// A parsed, validated manifest file
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub path: Utf8PathBuf,
    pub document: PackageDocument,
    pub manifest: Manifest,
    /// Non-fatal validation findings
    pub warnings: Vec<String>,
}

/// Loads manifests of one kind
#[derive(Debug)]
pub struct ManifestLoader {
    kind: ManifestKind,
    buckets: BucketSet,
    validators: ValidatorCache,
}

impl ManifestLoader {
    pub fn new(kind: ManifestKind, extra_buckets: &[String]) -> Self {
        Self {
            kind,
            buckets: kind.bucket_set(extra_buckets),
            validators: ValidatorCache::new(),
        }
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    /// Turn a manifest argument into a file path
    pub fn resolve_path(&self, raw: &str) -> Utf8PathBuf {
        manifest_path(raw, self.kind.default_file())
    }

    /// Validate an in-memory document
    pub fn validate(&mut self, document: &PackageDocument) -> ConfigResult<Vec<String>> {
        let validator = self.validators.get(self.kind);
        let warnings = validator
            .validate(document.root())
            .into_result(&document.display_path())?;

        for warning in &warnings {
            warn!(path = %document.display_path(), "{}", warning);
        }
        Ok(warnings)
    }

    /// Load the template manifest, adding any missing buckets
    pub async fn load_template(&mut self, raw: &str) -> ConfigResult<LoadedManifest> {
        info!(path = raw, "inspecting template manifest");
        let mut loaded = self.load(raw).await?;
        loaded.document.ensure_buckets(&self.buckets)?;
        loaded.manifest = loaded.document.to_manifest(&self.buckets)?;
        Ok(loaded)
    }

    /// Load one package manifest
    pub async fn load_package(&mut self, raw: &str) -> ConfigResult<LoadedManifest> {
        info!(path = raw, "inspecting package manifest");
        self.load(raw).await
    }

    /// Use an in-memory template, adding any missing buckets
    pub fn prepare_template(&mut self, mut document: PackageDocument) -> ConfigResult<LoadedManifest> {
        let warnings = self.validate(&document)?;
        document.ensure_buckets(&self.buckets)?;
        let manifest = document.to_manifest(&self.buckets)?;

        Ok(LoadedManifest {
            path: document.source().map(Utf8Path::to_path_buf).unwrap_or_default(),
            document,
            manifest,
            warnings,
        })
    }

    async fn load(&mut self, raw: &str) -> ConfigResult<LoadedManifest> {
        let path = self.resolve_path(raw);
        debug!(path = %path, "loading manifest");

        let document = json::load_from_file(&path).await?;
        let warnings = self.validate(&document)?;
        let manifest = document.to_manifest(&self.buckets)?;

        Ok(LoadedManifest {
            path,
            document,
            manifest,
            warnings,
        })
    }

    /// Write a document to the resolved output path
    pub async fn save(&self, document: &PackageDocument, raw: &str, indent: usize) -> ConfigResult<Utf8PathBuf> {
        let path = self.resolve_path(raw);
        info!(path = %path, "saving merged manifest");
        json::save_to_file(document, &path, indent).await?;
        Ok(path)
    }
}
