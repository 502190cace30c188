//! Replay pipeline
//!
//! This module drives a tracker over a recorded sample stream, the same way a
//! live session would drive it at ~1 Hz. It backs the `stride replay` command
//! and the C ABI's batch entry point.

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::schema::{DistanceSample, SampleAdapter, TrainingDay};
use crate::tracker::{SegmentTracker, TrackerEvent};
use crate::types::TrackerSnapshot;
use serde::{Deserialize, Serialize};

/// Tracker output after one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    /// Index of the sample in the input stream
    pub index: usize,
    pub events: Vec<TrackerEvent>,
    pub snapshot: TrackerSnapshot,
}

/// Replay `samples` against the workout of `day`.
///
/// Pipeline stages:
/// 1. TrainingDay - validate and build the workout definition
/// 2. SegmentTracker - feed every sample in order
/// 3. ReplayStep - collect events and a snapshot per sample
pub fn replay_samples(
    day: &TrainingDay,
    samples: &[DistanceSample],
    config: TrackerConfig,
) -> Result<Vec<ReplayStep>, TrackerError> {
    let definition = day.to_definition()?;
    let mut tracker = SegmentTracker::with_config(definition, day.mode(), config)?;

    let steps = samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let events = tracker.update_progress(sample.distance_m, sample.speed_mps);
            ReplayStep {
                index,
                events,
                snapshot: tracker.snapshot(),
            }
        })
        .collect();

    Ok(steps)
}

/// Replay an NDJSON sample stream against a training-day JSON document.
///
/// # Returns
/// One JSON-encoded [`ReplayStep`] per sample
///
/// # Example
/// ```ignore
/// let steps = replay_ndjson(
///     training_day_json,
///     samples_ndjson,
/// )?;
/// ```
pub fn replay_ndjson(
    training_day_json: &str,
    samples_ndjson: &str,
) -> Result<Vec<String>, TrackerError> {
    let day = TrainingDay::from_json(training_day_json)?;
    let samples = SampleAdapter::parse_ndjson(samples_ndjson)?;

    replay_samples(&day, &samples, TrackerConfig::default())?
        .iter()
        .map(|step| serde_json::to_string(step).map_err(TrackerError::JsonError))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;
    use pretty_assertions::assert_eq;

    fn sample_day_json() -> &'static str {
        r#"{
            "day": 3,
            "title": "2 x 1000 m",
            "workout": {
                "type": "interval",
                "work": { "distance_m": 1000, "pace": "4:00" },
                "recovery": { "distance_m": 400, "pace": "6:00" },
                "repeats": 2
            }
        }"#
    }

    fn sample_stream() -> String {
        (0..=10)
            .map(|i| format!("{{\"distance_m\": {}, \"speed_mps\": 4.0}}", i * 300))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_replay_samples() {
        let day = TrainingDay::from_json(sample_day_json()).unwrap();
        let samples = SampleAdapter::parse_ndjson(&sample_stream()).unwrap();

        let steps = replay_samples(&day, &samples, TrackerConfig::default()).unwrap();

        assert_eq!(steps.len(), 11);
        assert!(steps[3].events.is_empty());
        // 1200 m crosses the first work segment
        assert_eq!(
            steps[4].events,
            vec![TrackerEvent::PhaseStarted {
                lap: 1,
                phase: Phase::Recovery
            }]
        );
        // 2800 m finishes the workout at sample 10 (3000 m)
        assert!(!steps[9].snapshot.completed);
        assert_eq!(steps[10].events, vec![TrackerEvent::Completed]);
        assert!(steps[10].snapshot.completed);
    }

    #[test]
    fn test_replay_ndjson() {
        let lines = replay_ndjson(sample_day_json(), &sample_stream()).unwrap();
        assert_eq!(lines.len(), 11);

        let last: serde_json::Value = serde_json::from_str(&lines[10]).unwrap();
        assert_eq!(last["snapshot"]["completed"], true);
        assert_eq!(last["events"][0]["type"], "completed");
    }

    #[test]
    fn test_replay_rejects_invalid_day() {
        let json = sample_day_json().replace("\"repeats\": 2", "\"repeats\": 0");
        let result = replay_ndjson(&json, &sample_stream());
        assert!(matches!(result, Err(TrackerError::InvalidDefinition(_))));
    }

    #[test]
    fn test_replay_empty_stream() {
        let lines = replay_ndjson(sample_day_json(), "").unwrap();
        assert!(lines.is_empty());
    }
}
