//! Workout definitions
//!
//! A [`WorkoutDefinition`] is the immutable structure of one training session,
//! either a repeated work/recovery pair or an ordered list of segments.

use crate::error::TrackerError;
use crate::types::{Segment, TrackingMode};
use serde::Serialize;

/// Upper bound on interval repeats accepted from a training plan
pub const MAX_REPEATS: u32 = 1000;

/// Structure of a training session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkoutDefinition {
    /// `repeats` laps of `work` followed by `recovery`
    Interval {
        work: Segment,
        recovery: Segment,
        repeats: u32,
    },
    /// Segments run once each, in list order
    Combination { segments: Vec<Segment> },
}

impl WorkoutDefinition {
    /// Build an interval workout. `repeats` must be within `1..=MAX_REPEATS`.
    pub fn interval(work: Segment, recovery: Segment, repeats: u32) -> Result<Self, TrackerError> {
        let definition = WorkoutDefinition::Interval {
            work,
            recovery,
            repeats,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Build a combination workout from a non-empty list of segments.
    pub fn combination(segments: Vec<Segment>) -> Result<Self, TrackerError> {
        let definition = WorkoutDefinition::Combination { segments };
        definition.validate()?;
        Ok(definition)
    }

    /// Check the structural invariants.
    ///
    /// Segments are validated when they are built, but the distance check is
    /// repeated here so a definition assembled by hand is still rejected.
    pub fn validate(&self) -> Result<(), TrackerError> {
        match self {
            WorkoutDefinition::Interval {
                work,
                recovery,
                repeats,
            } => {
                if *repeats < 1 {
                    return Err(TrackerError::InvalidDefinition(
                        "interval workout needs at least 1 repeat".to_string(),
                    ));
                }
                if *repeats > MAX_REPEATS {
                    return Err(TrackerError::InvalidDefinition(format!(
                        "interval workout allows at most {MAX_REPEATS} repeats, got {repeats}"
                    )));
                }
                check_distance("work", work)?;
                check_distance("recovery", recovery)?;
            }
            WorkoutDefinition::Combination { segments } => {
                if segments.is_empty() {
                    return Err(TrackerError::InvalidDefinition(
                        "combination workout needs at least 1 segment".to_string(),
                    ));
                }
                for (index, segment) in segments.iter().enumerate() {
                    check_distance(&format!("segment {index}"), segment)?;
                }
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> TrackingMode {
        match self {
            WorkoutDefinition::Interval { .. } => TrackingMode::Interval,
            WorkoutDefinition::Combination { .. } => TrackingMode::Combination,
        }
    }

    /// Number of distinct segments (2 for an interval workout)
    pub fn segment_count(&self) -> usize {
        match self {
            WorkoutDefinition::Interval { .. } => 2,
            WorkoutDefinition::Combination { segments } => segments.len(),
        }
    }

    /// Repeat count, interval workouts only
    pub fn repeats(&self) -> Option<u32> {
        match self {
            WorkoutDefinition::Interval { repeats, .. } => Some(*repeats),
            WorkoutDefinition::Combination { .. } => None,
        }
    }

    /// Distance of the whole session in meters
    pub fn total_distance_meters(&self) -> f64 {
        match self {
            WorkoutDefinition::Interval {
                work,
                recovery,
                repeats,
            } => {
                (work.target_distance_meters() + recovery.target_distance_meters())
                    * (*repeats as f64)
            }
            WorkoutDefinition::Combination { segments } => segments
                .iter()
                .map(Segment::target_distance_meters)
                .sum(),
        }
    }
}

fn check_distance(label: &str, segment: &Segment) -> Result<(), TrackerError> {
    let distance = segment.target_distance_meters();
    if !distance.is_finite() || distance <= 0.0 {
        return Err(TrackerError::InvalidDefinition(format!(
            "{label} distance must be greater than 0 m"
        )));
    }
    Ok(())
}
