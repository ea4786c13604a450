//! Manifest merge orchestration
//!
//! Folds an ordered list of incoming manifests into an accumulator manifest,
//! one bucket at a time. Override entries from every incoming manifest are
//! merged first so they can rescue collisions anywhere in the bucket pass.
//! The first unresolvable collision aborts the merge; entries merged before
//! it are left in place.

use tracing::{debug, info};

use manifold_core::{
    BucketSet, ConflictError, DependencyMap, InvalidArgumentError, Manifest, MergeError,
};

use crate::collision::resolve_detailed;
use crate::report::{MergeReporter, NoopReporter};

/// Merge incoming manifests into the accumulator without diagnostics
pub fn merge(
    accumulator: Manifest,
    incoming: &[Manifest],
    buckets: &BucketSet,
) -> Result<Manifest, MergeError> {
    DependencyMerger::new(buckets).merge(accumulator, incoming)
}

/// Merges manifests over a fixed bucket set, narrating to a reporter
#[derive(Debug, Clone, Copy)]
pub struct DependencyMerger<'a> {
    buckets: &'a BucketSet,
    reporter: &'a dyn MergeReporter,
}

impl<'a> DependencyMerger<'a> {
    /// Create a merger that reports nothing
    pub fn new(buckets: &'a BucketSet) -> Self {
        Self {
            buckets,
            reporter: &NoopReporter,
        }
    }

    /// Send merge events to the given reporter
    pub fn with_reporter(mut self, reporter: &'a dyn MergeReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn buckets(&self) -> &BucketSet {
        self.buckets
    }

    /// Merge every incoming manifest into the accumulator, in order
    pub fn merge(&self, mut accumulator: Manifest, incoming: &[Manifest]) -> Result<Manifest, MergeError> {
        self.check_accumulator(&accumulator)?;

        info!(
            manifests = incoming.len(),
            buckets = self.buckets.len(),
            overrides = self.buckets.has_overrides(),
            "starting merge"
        );

        if self.buckets.has_overrides() {
            self.merge_overrides(&mut accumulator, incoming)?;
        }

        for (index, manifest) in incoming.iter().enumerate() {
            let label = manifest.label();
            self.reporter.on_manifest_started(&label, index);

            for bucket in self.buckets.regular() {
                let Some(entries) = manifest.bucket(bucket) else {
                    continue;
                };
                self.reporter.on_bucket_started(&label, bucket);

                for (name, value) in entries {
                    self.merge_entry(&mut accumulator, manifest, bucket, name, value)?;
                }
            }

            self.reporter.on_manifest_finished(&label, index);
        }

        Ok(accumulator)
    }

    /// Every configured bucket must already exist on the accumulator
    fn check_accumulator(&self, accumulator: &Manifest) -> Result<(), InvalidArgumentError> {
        if self.buckets.is_empty() {
            return Err(InvalidArgumentError::new("buckets", "bucket set is empty"));
        }

        let missing: Vec<&str> = self
            .buckets
            .iter()
            .filter(|bucket| !accumulator.has_bucket(bucket))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(InvalidArgumentError::new(
                "accumulator",
                format!("missing bucket(s): {}", missing.join(", ")),
            ))
        }
    }

    /// Pre-pass: fold every incoming override map into the accumulator's
    fn merge_overrides(&self, accumulator: &mut Manifest, incoming: &[Manifest]) -> Result<(), MergeError> {
        let bucket = self.buckets.override_bucket();

        for manifest in incoming {
            let Some(entries) = manifest.bucket(bucket) else {
                continue;
            };
            self.reporter.on_bucket_started(&manifest.label(), bucket);

            for (name, value) in entries {
                let target = bucket_slot(accumulator, bucket)?;
                let Some(current) = target.get(name).cloned() else {
                    target.insert(name.clone(), value.clone());
                    self.reporter.on_dependency_added(bucket, name, value);
                    continue;
                };

                match resolve_detailed(&current, value) {
                    Ok(resolution) => {
                        self.reporter
                            .on_dependency_merged(bucket, name, &current, value, &resolution.value);
                        target.insert(name.clone(), resolution.value);
                    },
                    Err(source) => {
                        self.reporter.on_conflict(bucket, name, &source);
                        return Err(conflict(manifest, bucket, name, source).into());
                    },
                }
            }
        }

        Ok(())
    }

    fn merge_entry(
        &self,
        accumulator: &mut Manifest,
        manifest: &Manifest,
        bucket: &str,
        name: &str,
        value: &str,
    ) -> Result<(), MergeError> {
        let rescue = accumulator
            .dependency(self.buckets.override_bucket(), name)
            .map(str::to_string);
        let target = bucket_slot(accumulator, bucket)?;

        let Some(current) = target.get(name).cloned() else {
            target.insert(name.to_string(), value.to_string());
            self.reporter.on_dependency_added(bucket, name, value);
            return Ok(());
        };

        match resolve_detailed(&current, value) {
            Ok(resolution) => {
                debug!(bucket, dependency = name, method = %resolution.method, "collision resolved");
                self.reporter
                    .on_dependency_merged(bucket, name, &current, value, &resolution.value);
                target.insert(name.to_string(), resolution.value);
                Ok(())
            },
            Err(source) => match rescue {
                Some(forced) => {
                    self.reporter.on_override_applied(bucket, name, &forced);
                    target.insert(name.to_string(), forced);
                    Ok(())
                },
                None => {
                    self.reporter.on_conflict(bucket, name, &source);
                    Err(conflict(manifest, bucket, name, source).into())
                },
            },
        }
    }
}

fn bucket_slot<'m>(accumulator: &'m mut Manifest, bucket: &str) -> Result<&'m mut DependencyMap, InvalidArgumentError> {
    accumulator.bucket_mut(bucket).ok_or_else(|| {
        InvalidArgumentError::new("accumulator", format!("missing bucket(s): {}", bucket))
    })
}

fn conflict(
    manifest: &Manifest,
    bucket: &str,
    name: &str,
    source: manifold_core::ConstraintError,
) -> ConflictError {
    ConflictError {
        dependency: name.to_string(),
        bucket: bucket.to_string(),
        origin: manifest.source.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MergeEvent, RecordingReporter};
    use manifold_core::ConstraintFailure;

    const DEPS: &str = "dependencies";
    const DEV: &str = "devDependencies";
    const RES: &str = "resolutions";

    fn template(buckets: &BucketSet) -> Manifest {
        let mut manifest = Manifest::new("template");
        for bucket in buckets.iter() {
            manifest.ensure_bucket(bucket);
        }
        manifest
    }

    #[test]
    fn test_first_sighting_is_inserted() {
        let buckets = BucketSet::new([DEPS, DEV]);
        let incoming = [
            Manifest::new("a").with_bucket(DEPS, [("left-pad", "^1.0.0")]),
            Manifest::new("b").with_bucket(DEV, [("mocha", "~5.0.0")]),
        ];

        let merged = merge(template(&buckets), &incoming, &buckets).unwrap();
        assert_eq!(merged.dependency(DEPS, "left-pad"), Some("^1.0.0"));
        assert_eq!(merged.dependency(DEV, "mocha"), Some("~5.0.0"));
    }

    #[test]
    fn test_collisions_are_intersected() {
        let buckets = BucketSet::new([DEPS]);
        let incoming = [
            Manifest::new("a").with_bucket(DEPS, [("react", "^16.0.0")]),
            Manifest::new("b").with_bucket(DEPS, [("react", ">=16.4.0")]),
        ];

        let merged = merge(template(&buckets), &incoming, &buckets).unwrap();
        assert_eq!(merged.dependency(DEPS, "react"), Some("^16.4.0"));
    }

    #[test]
    fn test_rescue_by_override() {
        let buckets = BucketSet::new([DEPS]);
        let accumulator = template(&buckets)
            .with_bucket(DEPS, [("left-pad", "^1.0.0")])
            .with_bucket(RES, [("left-pad", "^2.0.0")]);
        let incoming = [Manifest::new("a").with_bucket(DEPS, [("left-pad", "^3.0.0")])];

        let merged = merge(accumulator, &incoming, &buckets).unwrap();
        assert_eq!(merged.dependency(DEPS, "left-pad"), Some("^2.0.0"));
    }

    #[test]
    fn test_fail_fast_without_override() {
        let buckets = BucketSet::new([DEPS]);
        let accumulator = template(&buckets).with_bucket(DEPS, [("left-pad", "^1.0.0")]);
        let incoming = [Manifest::new("a")
            .with_source("pkgs/a/package.json")
            .with_bucket(DEPS, [("left-pad", "^3.0.0")])];

        let error = merge(accumulator, &incoming, &buckets).unwrap_err();
        match error {
            MergeError::Conflict(conflict) => {
                assert_eq!(conflict.dependency, "left-pad");
                assert_eq!(conflict.bucket, DEPS);
                assert_eq!(conflict.origin.as_deref().map(|p| p.as_str()), Some("pkgs/a/package.json"));
                assert_eq!(conflict.source.reason, ConstraintFailure::Contradiction);
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_override_from_later_manifest_rescues_earlier_collision() {
        let buckets = BucketSet::new([DEPS, RES]);
        let incoming = [
            Manifest::new("a").with_bucket(DEPS, [("left-pad", "^1.0.0")]),
            Manifest::new("b").with_bucket(DEPS, [("left-pad", "^3.0.0")]),
            Manifest::new("c").with_bucket(RES, [("left-pad", "^2.0.0")]),
        ];

        let merged = merge(template(&buckets), &incoming, &buckets).unwrap();
        assert_eq!(merged.dependency(DEPS, "left-pad"), Some("^2.0.0"));
        assert_eq!(merged.dependency(RES, "left-pad"), Some("^2.0.0"));
    }

    #[test]
    fn test_override_prepass_resolves_collisions() {
        let buckets = BucketSet::new([DEPS, RES]);
        let incoming = [
            Manifest::new("a").with_bucket(RES, [("lodash", "^4.0.0")]),
            Manifest::new("b").with_bucket(RES, [("lodash", "^4.17.0")]),
        ];

        let merged = merge(template(&buckets), &incoming, &buckets).unwrap();
        assert_eq!(merged.dependency(RES, "lodash"), Some("^4.17.0"));
    }

    #[test]
    fn test_override_prepass_conflict() {
        let buckets = BucketSet::new([DEPS, RES]);
        let incoming = [
            Manifest::new("a").with_bucket(RES, [("lodash", "^3.0.0")]),
            Manifest::new("b").with_bucket(RES, [("lodash", "^4.0.0")]),
        ];

        let error = merge(template(&buckets), &incoming, &buckets).unwrap_err();
        assert!(matches!(error, MergeError::Conflict(ref c) if c.bucket == RES));
    }

    #[test]
    fn test_buckets_are_isolated() {
        let buckets = BucketSet::new([DEPS, DEV]);
        let incoming = [
            Manifest::new("a").with_bucket(DEPS, [("chai", "^1.0.0")]),
            Manifest::new("b").with_bucket(DEV, [("chai", "^3.0.0")]),
        ];

        let merged = merge(template(&buckets), &incoming, &buckets).unwrap();
        assert_eq!(merged.dependency(DEPS, "chai"), Some("^1.0.0"));
        assert_eq!(merged.dependency(DEV, "chai"), Some("^3.0.0"));
    }

    #[test]
    fn test_buckets_outside_the_set_are_ignored() {
        let buckets = BucketSet::new([DEPS]);
        let incoming = [Manifest::new("a").with_bucket("peerDependencies", [("react", "^16.0.0")])];

        let merged = merge(template(&buckets), &incoming, &buckets).unwrap();
        assert!(!merged.has_bucket("peerDependencies"));
    }

    #[test]
    fn test_failure_stops_at_first_conflict() {
        let buckets = BucketSet::new([DEPS]);
        let accumulator = template(&buckets).with_bucket(DEPS, [("left-pad", "^1.0.0")]);
        let incoming = [
            Manifest::new("a").with_bucket(DEPS, [("added-first", "1.0.0"), ("left-pad", "^3.0.0")]),
            Manifest::new("b").with_bucket(DEPS, [("never-seen", "1.0.0")]),
        ];
        let reporter = RecordingReporter::new();

        let result = DependencyMerger::new(&buckets)
            .with_reporter(&reporter)
            .merge(accumulator, &incoming);
        assert!(result.is_err());

        let events = reporter.into_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, MergeEvent::DependencyAdded { dependency, .. } if dependency == "added-first")));
        assert!(matches!(events.last(), Some(MergeEvent::Conflict { .. })));
        assert!(!events
            .iter()
            .any(|event| matches!(event, MergeEvent::ManifestStarted { index: 1, .. })));
    }

    #[test]
    fn test_missing_bucket_is_invalid_argument() {
        let buckets = BucketSet::new([DEPS, DEV]);
        let accumulator = Manifest::new("template").with_bucket(DEPS, Vec::<(String, String)>::new());

        let error = merge(accumulator, &[], &buckets).unwrap_err();
        match error {
            MergeError::InvalidArgument(error) => assert!(error.reason.contains(DEV)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_bucket_set_is_invalid_argument() {
        let buckets = BucketSet::new(Vec::<String>::new());
        let error = merge(Manifest::new("template"), &[], &buckets).unwrap_err();
        assert!(matches!(error, MergeError::InvalidArgument(_)));
    }

    #[test]
    fn test_events_are_reported_in_order() {
        let buckets = BucketSet::new([DEPS]);
        let accumulator = template(&buckets).with_bucket(DEPS, [("left-pad", "^1.0.0")]);
        let incoming = [Manifest::new("a").with_bucket(DEPS, [("left-pad", "^1.2.0"), ("chalk", "2.4.1")])];
        let reporter = RecordingReporter::new();

        DependencyMerger::new(&buckets)
            .with_reporter(&reporter)
            .merge(accumulator, &incoming)
            .unwrap();

        let events = reporter.into_events();
        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0],
            MergeEvent::ManifestStarted {
                manifest: "a".to_string(),
                index: 0
            }
        );
        assert!(matches!(events[1], MergeEvent::BucketStarted { .. }));
        assert!(matches!(
            events[2],
            MergeEvent::DependencyMerged { ref merged, .. } if merged == "^1.2.0"
        ));
        assert!(matches!(events[3], MergeEvent::DependencyAdded { ref dependency, .. } if dependency == "chalk"));
        assert!(matches!(events[4], MergeEvent::ManifestFinished { .. }));
    }

    #[test]
    fn test_override_rescue_is_reported() {
        let buckets = BucketSet::new([DEPS]);
        let accumulator = template(&buckets)
            .with_bucket(DEPS, [("left-pad", "^1.0.0")])
            .with_bucket(RES, [("left-pad", "2.0.0")]);
        let incoming = [Manifest::new("a").with_bucket(DEPS, [("left-pad", "^3.0.0")])];
        let reporter = RecordingReporter::new();

        DependencyMerger::new(&buckets)
            .with_reporter(&reporter)
            .merge(accumulator, &incoming)
            .unwrap();

        assert!(reporter
            .events()
            .iter()
            .any(|event| matches!(event, MergeEvent::OverrideApplied { value, .. } if value == "2.0.0")));
    }
}
