//! Merge diagnostics
//!
//! The merge engine narrates what it does through a [`MergeReporter`]. Every
//! method has an empty default body, so a sink only implements the events it
//! cares about.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use manifold_core::ConstraintError;

/// Sink for structured merge progress events
pub trait MergeReporter: std::fmt::Debug + Send + Sync {
    /// An incoming manifest is about to be merged (`index` is its position)
    #[allow(unused_variables)]
    fn on_manifest_started(&self, manifest: &str, index: usize) {}

    #[allow(unused_variables)]
    fn on_manifest_finished(&self, manifest: &str, index: usize) {}

    #[allow(unused_variables)]
    fn on_bucket_started(&self, manifest: &str, bucket: &str) {}

    /// First sighting of a dependency in the accumulator bucket
    #[allow(unused_variables)]
    fn on_dependency_added(&self, bucket: &str, dependency: &str, value: &str) {}

    /// A collision was resolved; `previous` is the accumulator's old value
    #[allow(unused_variables)]
    fn on_dependency_merged(
        &self,
        bucket: &str,
        dependency: &str,
        previous: &str,
        incoming: &str,
        merged: &str,
    ) {
    }

    /// A failed collision was rescued by the override map
    #[allow(unused_variables)]
    fn on_override_applied(&self, bucket: &str, dependency: &str, value: &str) {}

    /// A collision failed and nothing could rescue it
    #[allow(unused_variables)]
    fn on_conflict(&self, bucket: &str, dependency: &str, error: &ConstraintError) {}
}

/// Reporter that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl MergeReporter for NoopReporter {}

/// Reporter that forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl MergeReporter for TracingReporter {
    fn on_manifest_started(&self, manifest: &str, index: usize) {
        info!(manifest, index, "merging manifest");
    }

    fn on_manifest_finished(&self, manifest: &str, index: usize) {
        debug!(manifest, index, "manifest merged");
    }

    fn on_bucket_started(&self, manifest: &str, bucket: &str) {
        debug!(manifest, bucket, "entering bucket");
    }

    fn on_dependency_added(&self, bucket: &str, dependency: &str, value: &str) {
        debug!(bucket, dependency, value, "dependency added");
    }

    fn on_dependency_merged(
        &self,
        bucket: &str,
        dependency: &str,
        previous: &str,
        incoming: &str,
        merged: &str,
    ) {
        info!(bucket, dependency, previous, incoming, merged, "dependency merged");
    }

    fn on_override_applied(&self, bucket: &str, dependency: &str, value: &str) {
        warn!(bucket, dependency, value, "conflict rescued by override");
    }

    fn on_conflict(&self, bucket: &str, dependency: &str, error: &ConstraintError) {
        warn!(bucket, dependency, %error, "unresolvable dependency conflict");
    }
}

/// One recorded merge event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum MergeEvent {
    ManifestStarted {
        manifest: String,
        index: usize,
    },
    ManifestFinished {
        manifest: String,
        index: usize,
    },
    BucketStarted {
        manifest: String,
        bucket: String,
    },
    DependencyAdded {
        bucket: String,
        dependency: String,
        value: String,
    },
    DependencyMerged {
        bucket: String,
        dependency: String,
        previous: String,
        incoming: String,
        merged: String,
    },
    OverrideApplied {
        bucket: String,
        dependency: String,
        value: String,
    },
    Conflict {
        bucket: String,
        dependency: String,
        message: String,
    },
}

/// Reporter that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<MergeEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<MergeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_events(self) -> Vec<MergeEvent> {
        self.events
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: MergeEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl MergeReporter for RecordingReporter {
    fn on_manifest_started(&self, manifest: &str, index: usize) {
        self.record(MergeEvent::ManifestStarted {
            manifest: manifest.to_string(),
            index,
        });
    }

    fn on_manifest_finished(&self, manifest: &str, index: usize) {
        self.record(MergeEvent::ManifestFinished {
            manifest: manifest.to_string(),
            index,
        });
    }

    fn on_bucket_started(&self, manifest: &str, bucket: &str) {
        self.record(MergeEvent::BucketStarted {
            manifest: manifest.to_string(),
            bucket: bucket.to_string(),
        });
    }

    fn on_dependency_added(&self, bucket: &str, dependency: &str, value: &str) {
        self.record(MergeEvent::DependencyAdded {
            bucket: bucket.to_string(),
            dependency: dependency.to_string(),
            value: value.to_string(),
        });
    }

    fn on_dependency_merged(
        &self,
        bucket: &str,
        dependency: &str,
        previous: &str,
        incoming: &str,
        merged: &str,
    ) {
        self.record(MergeEvent::DependencyMerged {
            bucket: bucket.to_string(),
            dependency: dependency.to_string(),
            previous: previous.to_string(),
            incoming: incoming.to_string(),
            merged: merged.to_string(),
        });
    }

    fn on_override_applied(&self, bucket: &str, dependency: &str, value: &str) {
        self.record(MergeEvent::OverrideApplied {
            bucket: bucket.to_string(),
            dependency: dependency.to_string(),
            value: value.to_string(),
        });
    }

    fn on_conflict(&self, bucket: &str, dependency: &str, error: &ConstraintError) {
        self.record(MergeEvent::Conflict {
            bucket: bucket.to_string(),
            dependency: dependency.to_string(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifold_core::ConstraintFailure;

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.on_bucket_started("app", "dependencies");
        reporter.on_dependency_added("dependencies", "a", "^1.0.0");
        reporter.on_override_applied("dependencies", "a", "^2.0.0");

        let events = reporter.into_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], MergeEvent::BucketStarted { .. }));
        assert_eq!(
            events[2],
            MergeEvent::OverrideApplied {
                bucket: "dependencies".to_string(),
                dependency: "a".to_string(),
                value: "^2.0.0".to_string(),
            }
        );
    }

    #[test]
    fn test_conflict_event_carries_message() {
        let reporter = RecordingReporter::new();
        let error = ConstraintError::new("^1.0.0", "^3.0.0", ConstraintFailure::Contradiction);
        reporter.on_conflict("dependencies", "left-pad", &error);

        match &reporter.events()[0] {
            MergeEvent::Conflict { dependency, message, .. } => {
                assert_eq!(dependency, "left-pad");
                assert!(message.contains("^3.0.0"));
            },
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = MergeEvent::DependencyAdded {
            bucket: "dependencies".to_string(),
            dependency: "a".to_string(),
            value: "1.0.0".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "dependency-added");
        assert_eq!(json["dependency"], "a");
    }

    #[test]
    fn test_noop_reporter_accepts_everything() {
        let reporter = NoopReporter;
        reporter.on_manifest_started("app", 0);
        reporter.on_manifest_finished("app", 0);
    }
}
