//! Tracker configuration

use serde::{Deserialize, Serialize};

/// Default tolerance when comparing live pace to the target pace (seconds per km)
pub const DEFAULT_PACE_TOLERANCE_SECS: f64 = 5.0;

/// Tunables that affect derived outputs but never the state machine itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// A live pace within this many seconds per km of the target counts as on target
    #[serde(default = "default_pace_tolerance")]
    pub pace_tolerance_secs: f64,
}

fn default_pace_tolerance() -> f64 {
    DEFAULT_PACE_TOLERANCE_SECS
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            pace_tolerance_secs: DEFAULT_PACE_TOLERANCE_SECS,
        }
    }
}

impl TrackerConfig {
    /// Config with a custom pace tolerance; negative or non-finite values fall back to the default
    pub fn with_pace_tolerance(pace_tolerance_secs: f64) -> Self {
        Self {
            pace_tolerance_secs,
        }
        .sanitized()
    }

    /// Load config from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Serialize config to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn sanitized(mut self) -> Self {
        if !self.pace_tolerance_secs.is_finite() || self.pace_tolerance_secs < 0.0 {
            log::warn!(
                "Ignoring pace tolerance {}, using {}",
                self.pace_tolerance_secs,
                DEFAULT_PACE_TOLERANCE_SECS
            );
            self.pace_tolerance_secs = DEFAULT_PACE_TOLERANCE_SECS;
        }
        self
    }
}
