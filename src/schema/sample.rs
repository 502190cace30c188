//! stride.sample.v1 schema definition

use crate::error::TrackerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current sample schema version
pub const SAMPLE_SCHEMA: &str = "stride.sample.v1";

/// One reading from the motion/location provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    /// Cumulative session distance (meters)
    pub distance_m: f64,
    /// Instantaneous speed (m/s)
    #[serde(default)]
    pub speed_mps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl DistanceSample {
    pub fn new(distance_m: f64, speed_mps: f64) -> Self {
        Self {
            distance_m,
            speed_mps,
            timestamp: None,
        }
    }

    /// Report samples the tracker would clamp.
    ///
    /// The tracker accepts these anyway; validation only exists so a recorded
    /// stream can be inspected before it is replayed.
    pub fn validate(&self) -> Result<(), SampleError> {
        if !self.distance_m.is_finite() {
            return Err(SampleError::NonFiniteDistance);
        }
        if self.distance_m < 0.0 {
            return Err(SampleError::NegativeDistance(self.distance_m));
        }
        if !self.speed_mps.is_finite() {
            return Err(SampleError::NonFiniteSpeed);
        }
        if self.speed_mps < 0.0 {
            return Err(SampleError::NegativeSpeed(self.speed_mps));
        }
        Ok(())
    }
}

/// Validation errors for samples
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("Distance is not a finite number")]
    NonFiniteDistance,

    #[error("Negative distance: {0} m")]
    NegativeDistance(f64),

    #[error("Speed is not a finite number")]
    NonFiniteSpeed,

    #[error("Negative speed: {0} m/s")]
    NegativeSpeed(f64),
}

/// Result of sample validation
#[derive(Debug)]
pub struct SampleValidation {
    pub index: usize,
    pub error: SampleError,
}

/// Parser for recorded sample streams
pub struct SampleAdapter;

impl SampleAdapter {
    /// Parse a JSON string containing an array of samples
    pub fn parse_array(json: &str) -> Result<Vec<DistanceSample>, TrackerError> {
        let samples: Vec<DistanceSample> = serde_json::from_str(json)?;
        Ok(samples)
    }

    /// Parse NDJSON (newline-delimited JSON) containing samples
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DistanceSample>, TrackerError> {
        let mut samples = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<DistanceSample>(trimmed) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    return Err(TrackerError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(samples)
    }

    /// Collect every sample that fails validation
    pub fn validate_samples(samples: &[DistanceSample]) -> Vec<SampleValidation> {
        samples
            .iter()
            .enumerate()
            .filter_map(|(index, sample)| {
                sample
                    .validate()
                    .err()
                    .map(|error| SampleValidation { index, error })
            })
            .collect()
    }
}
