//! Core types for the Synheart Stride tracker
//!
//! This module defines the value types that describe one leg of a workout:
//! target pace, heart-rate range, and the segment itself, plus the small enums
//! used to report where a session currently is.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracking mode, one per workout definition shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    Interval,
    Combination,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::Interval => "interval",
            TrackingMode::Combination => "combination",
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half of an interval lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    Recovery,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Recovery => "recovery",
        }
    }
}

/// Target pace expressed as whole seconds per kilometre.
///
/// Parsed from and displayed as `m:ss` (e.g. `"4:00"`, `"3:50"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pace {
    seconds_per_km: u32,
}

impl Pace {
    /// Create a pace from seconds per kilometre. Zero is not a pace.
    pub fn from_secs_per_km(seconds_per_km: u32) -> Result<Self, TrackerError> {
        if seconds_per_km == 0 {
            return Err(TrackerError::InvalidDefinition(
                "pace must be greater than 0:00 per km".to_string(),
            ));
        }
        Ok(Self { seconds_per_km })
    }

    pub fn seconds_per_km(&self) -> u32 {
        self.seconds_per_km
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds_per_km as f64
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}",
            self.seconds_per_km / 60,
            self.seconds_per_km % 60
        )
    }
}

impl FromStr for Pace {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || TrackerError::InvalidDefinition(format!("invalid pace '{s}', expected m:ss"));
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        let (minutes, seconds) = s.trim().split_once(':').ok_or_else(invalid)?;
        if !digits(minutes) || !digits(seconds) || seconds.len() != 2 {
            return Err(invalid());
        }
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
        if seconds >= 60 {
            return Err(invalid());
        }

        let total = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(invalid)?;
        Pace::from_secs_per_km(total)
    }
}

impl TryFrom<String> for Pace {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pace> for String {
    fn from(pace: Pace) -> Self {
        pace.to_string()
    }
}

/// Target heart-rate window in beats per minute (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateRange {
    pub min: u16,
    pub max: u16,
}

impl HeartRateRange {
    pub fn new(min: u16, max: u16) -> Result<Self, TrackerError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.min == 0 || self.min > self.max {
            return Err(TrackerError::InvalidDefinition(format!(
                "invalid heart rate range {}-{} bpm",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// One leg of a structured workout.
///
/// A segment always covers a positive distance and carries at least one
/// intensity target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    target_distance_meters: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_pace: Option<Pace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_heart_rate: Option<HeartRateRange>,
    description: String,
}

impl Segment {
    /// Create a segment, rejecting non-positive distances and segments without
    /// any intensity target.
    pub fn new(
        target_distance_meters: f64,
        target_pace: Option<Pace>,
        target_heart_rate: Option<HeartRateRange>,
        description: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        if !target_distance_meters.is_finite() || target_distance_meters <= 0.0 {
            return Err(TrackerError::InvalidDefinition(format!(
                "segment distance must be greater than 0 m, got {target_distance_meters}"
            )));
        }
        if target_pace.is_none() && target_heart_rate.is_none() {
            return Err(TrackerError::InvalidDefinition(
                "segment needs a target pace or a target heart rate range".to_string(),
            ));
        }
        if let Some(range) = &target_heart_rate {
            range.validate()?;
        }

        Ok(Self {
            target_distance_meters,
            target_pace,
            target_heart_rate,
            description: description.into(),
        })
    }

    /// Pace-targeted segment
    pub fn with_pace(
        target_distance_meters: f64,
        target_pace: Pace,
        description: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        Self::new(target_distance_meters, Some(target_pace), None, description)
    }

    /// Heart-rate-targeted segment
    pub fn with_heart_rate(
        target_distance_meters: f64,
        target_heart_rate: HeartRateRange,
        description: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        Self::new(target_distance_meters, None, Some(target_heart_rate), description)
    }

    pub fn target_distance_meters(&self) -> f64 {
        self.target_distance_meters
    }

    pub fn target_pace(&self) -> Option<Pace> {
        self.target_pace
    }

    pub fn target_heart_rate(&self) -> Option<HeartRateRange> {
        self.target_heart_rate
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Live pace compared with the active segment's target pace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    /// Faster than target by more than the tolerance
    Ahead,
    OnTarget,
    /// Slower than target by more than the tolerance
    Behind,
}

/// Point-in-time readout of a tracker for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub mode: TrackingMode,
    /// Current lap, 1-based (interval only). Exceeds `repeats` once completed.
    pub lap: Option<u32>,
    pub repeats: Option<u32>,
    pub phase: Option<Phase>,
    /// Current segment, 0-based (combination only)
    pub segment_index: Option<usize>,
    pub segment_count: usize,
    pub segment_description: String,
    pub segment_distance_m: f64,
    pub target_pace: Option<Pace>,
    pub target_heart_rate: Option<HeartRateRange>,
    pub distance_in_segment_m: f64,
    pub remaining_distance_m: f64,
    pub total_distance_m: f64,
    pub workout_distance_m: f64,
    /// Fraction of the active segment covered (0-1)
    pub segment_progress: f64,
    /// Fraction of the whole workout covered (0-1)
    pub overall_progress: f64,
    pub current_speed_mps: f64,
    pub current_pace_secs_per_km: Option<f64>,
    pub pace_status: Option<PaceStatus>,
    pub completed: bool,
}

/// Snapshot producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Snapshot wrapped with producer metadata and a computation timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub schema: String,
    pub producer: SnapshotProducer,
    pub computed_at_utc: String,
    pub snapshot: TrackerSnapshot,
}
