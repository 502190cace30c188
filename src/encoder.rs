//! Snapshot encoding
//!
//! This module wraps tracker snapshots with producer metadata and a
//! computation timestamp, and encodes them to JSON for the presentation layer.

use crate::error::TrackerError;
use crate::tracker::SegmentTracker;
use crate::types::{SnapshotEnvelope, SnapshotProducer, TrackerSnapshot};
use crate::{PRODUCER_NAME, STRIDE_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current snapshot schema version
pub const SNAPSHOT_SCHEMA: &str = "stride.snapshot.v1";

/// Encoder for tracker snapshots
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a snapshot with producer metadata
    pub fn encode(&self, snapshot: TrackerSnapshot) -> SnapshotEnvelope {
        SnapshotEnvelope {
            schema: SNAPSHOT_SCHEMA.to_string(),
            producer: SnapshotProducer {
                name: PRODUCER_NAME.to_string(),
                version: STRIDE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            snapshot,
        }
    }

    /// Snapshot the tracker and encode to a JSON string
    pub fn encode_to_json(&self, tracker: &SegmentTracker) -> Result<String, TrackerError> {
        let envelope = self.encode(tracker.snapshot());
        serde_json::to_string(&envelope).map_err(TrackerError::JsonError)
    }
}
