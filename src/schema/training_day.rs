//! stride.training_day.v1 schema definition
//!
//! A training day carries one workout in either interval or combination shape.
//! Segment distances may be given in kilometres (`distance_km`, as training
//! plans usually write them) or meters (`distance_m`), but not both.

use crate::definition::WorkoutDefinition;
use crate::error::TrackerError;
use crate::types::{HeartRateRange, Pace, Segment, TrackingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current training-day schema version
pub const TRAINING_DAY_SCHEMA: &str = "stride.training_day.v1";

fn default_schema_version() -> String {
    TRAINING_DAY_SCHEMA.to_string()
}

/// One day of a training plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDay {
    /// Schema version, defaults to the current one when omitted
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Day number within the plan (1-based)
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Calendar date the day is scheduled for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub workout: WorkoutRecord,
}

/// Workout structure as written in the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkoutRecord {
    Interval {
        work: SegmentRecord,
        recovery: SegmentRecord,
        repeats: u32,
    },
    Combination { segments: Vec<SegmentRecord> },
}

/// Segment as written in the plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Target pace per km, `m:ss`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<Pace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRateRange>,
    #[serde(default)]
    pub description: String,
}

impl SegmentRecord {
    /// Distance in meters, rejecting records that give none or both units
    pub fn distance_meters(&self) -> Result<f64, TrackerError> {
        match (self.distance_km, self.distance_m) {
            (Some(km), None) => Ok(km * 1000.0),
            (None, Some(m)) => Ok(m),
            (Some(_), Some(_)) => Err(TrackerError::InvalidDefinition(
                "segment gives both distance_km and distance_m".to_string(),
            )),
            (None, None) => Err(TrackerError::InvalidDefinition(
                "segment is missing a distance".to_string(),
            )),
        }
    }

    pub fn to_segment(&self) -> Result<Segment, TrackerError> {
        Segment::new(
            self.distance_meters()?,
            self.pace,
            self.heart_rate,
            self.description.clone(),
        )
    }
}

impl TrainingDay {
    /// Parse a training day from JSON
    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let day: TrainingDay = serde_json::from_str(json)?;
        Ok(day)
    }

    pub fn to_json(&self) -> Result<String, TrackerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn mode(&self) -> TrackingMode {
        match self.workout {
            WorkoutRecord::Interval { .. } => TrackingMode::Interval,
            WorkoutRecord::Combination { .. } => TrackingMode::Combination,
        }
    }

    /// Check the schema version and build the validated workout definition
    pub fn to_definition(&self) -> Result<WorkoutDefinition, TrackerError> {
        if self.schema_version != TRAINING_DAY_SCHEMA {
            return Err(TrackerError::ParseError(format!(
                "Invalid schema version: expected {}, got {}",
                TRAINING_DAY_SCHEMA, self.schema_version
            )));
        }

        match &self.workout {
            WorkoutRecord::Interval {
                work,
                recovery,
                repeats,
            } => WorkoutDefinition::interval(work.to_segment()?, recovery.to_segment()?, *repeats),
            WorkoutRecord::Combination { segments } => {
                let segments = segments
                    .iter()
                    .map(SegmentRecord::to_segment)
                    .collect::<Result<Vec<_>, _>>()?;
                WorkoutDefinition::combination(segments)
            }
        }
    }
}
