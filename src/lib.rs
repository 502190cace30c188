//! Synheart Stride - On-device segment tracking engine for structured workouts
//!
//! Stride turns a training-day definition plus a live stream of cumulative
//! distance/speed samples into an always-current answer to "which part of the
//! workout am I in, what is my target, how much is left, and am I done".
//!
//! ## Modules
//!
//! - **Definition**: validated interval and combination workout structures
//! - **Tracker**: the distance-driven state machine and its derived queries
//! - **Schema**: training-day and sample wire formats
//! - **Encoder / Pipeline**: snapshot encoding and recorded-stream replay

pub mod config;
pub mod definition;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod shared;
pub mod tracker;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::TrackerConfig;
pub use definition::WorkoutDefinition;
pub use error::TrackerError;
pub use pipeline::{replay_ndjson, replay_samples, ReplayStep};
pub use shared::SharedTracker;
pub use tracker::{SegmentTracker, TrackerEvent, TrackerState};
pub use types::{HeartRateRange, Pace, PaceStatus, Phase, Segment, TrackerSnapshot, TrackingMode};

// Schema exports
pub use schema::{DistanceSample, SampleAdapter, TrainingDay, SAMPLE_SCHEMA, TRAINING_DAY_SCHEMA};

/// Stride version embedded in all snapshots
pub const STRIDE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshots
pub const PRODUCER_NAME: &str = "synheart-stride";
