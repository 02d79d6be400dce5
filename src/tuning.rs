//! Data-driven spawn balance
//!
//! Every field has a default matching the shipped game, so a tuning file
//! only needs the values it overrides.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Failure loading a tuning file
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read tuning file: {e}"),
            Self::Parse(e) => write!(f, "failed to parse tuning file: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning value `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Spawn scheduler parameters (distances in world units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === First triggers of a run ===
    pub first_door: f32,
    pub first_obstacle: f32,
    pub first_letter: f32,
    pub first_gem_pattern: f32,

    // === Doors ===
    /// Distance between question doors
    pub door_interval: f32,
    /// Quiet zone after a door for obstacles / gem patterns
    pub door_obstacle_buffer: f32,
    pub door_gem_buffer: f32,
    /// Minimum distance from the next door for each trigger to fire
    pub obstacle_door_gap: f32,
    pub letter_door_gap: f32,
    pub gem_door_gap: f32,

    // === Obstacles ===
    pub obstacle_base_interval: f32,
    /// Most the interval can shrink with speed
    pub obstacle_speed_shrink: f32,
    /// Floor for the speed-adjusted interval
    pub obstacle_min_interval: f32,
    pub obstacle_jitter: f32,
    /// Chance a cluster has two obstacles instead of one
    pub double_obstacle_chance: f64,
    pub sky_gem_chance: f64,
    pub gem_trail_chance: f64,

    // === Letters: (base, jitter) per score band ===
    pub letter_interval: (f32, f32),
    pub letter_interval_tier2: (f32, f32),
    pub letter_interval_tier3: (f32, f32),

    // === Gem patterns ===
    pub gem_pattern_interval: f32,
    pub gem_pattern_jitter: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            first_door: 50.0,
            first_obstacle: 80.0,
            first_letter: 300.0,
            first_gem_pattern: 30.0,

            door_interval: 140.0,
            door_obstacle_buffer: 40.0,
            door_gem_buffer: 30.0,
            obstacle_door_gap: 30.0,
            letter_door_gap: 40.0,
            gem_door_gap: 20.0,

            obstacle_base_interval: 60.0,
            obstacle_speed_shrink: 20.0,
            obstacle_min_interval: 20.0,
            obstacle_jitter: 30.0,
            double_obstacle_chance: 0.3,
            sky_gem_chance: 0.4,
            gem_trail_chance: 0.3,

            letter_interval: (300.0, 200.0),
            letter_interval_tier2: (200.0, 150.0),
            letter_interval_tier3: (100.0, 100.0),

            gem_pattern_interval: 70.0,
            gem_pattern_jitter: 50.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("door_interval", self.door_interval),
            ("obstacle_base_interval", self.obstacle_base_interval),
            ("obstacle_min_interval", self.obstacle_min_interval),
            ("gem_pattern_interval", self.gem_pattern_interval),
            ("letter_interval", self.letter_interval.0),
            ("letter_interval_tier2", self.letter_interval_tier2.0),
            ("letter_interval_tier3", self.letter_interval_tier3.0),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }

        let non_negative = [
            ("first_door", self.first_door),
            ("first_obstacle", self.first_obstacle),
            ("first_letter", self.first_letter),
            ("first_gem_pattern", self.first_gem_pattern),
            ("door_obstacle_buffer", self.door_obstacle_buffer),
            ("door_gem_buffer", self.door_gem_buffer),
            ("obstacle_door_gap", self.obstacle_door_gap),
            ("letter_door_gap", self.letter_door_gap),
            ("gem_door_gap", self.gem_door_gap),
            ("obstacle_speed_shrink", self.obstacle_speed_shrink),
            ("obstacle_jitter", self.obstacle_jitter),
            ("gem_pattern_jitter", self.gem_pattern_jitter),
            ("letter_interval", self.letter_interval.1),
            ("letter_interval_tier2", self.letter_interval_tier2.1),
            ("letter_interval_tier3", self.letter_interval_tier3.1),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }

        let chances = [
            ("double_obstacle_chance", self.double_obstacle_chance),
            ("sky_gem_chance", self.sky_gem_chance),
            ("gem_trail_chance", self.gem_trail_chance),
        ];
        for (field, p) in chances {
            if !(0.0..=1.0).contains(&p) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "probability must be within 0..=1",
                });
            }
        }
        Ok(())
    }

    /// Distance until the next obstacle cluster, before jitter
    pub fn obstacle_interval(&self, speed: f32) -> f32 {
        let shrink = (speed - crate::consts::RUN_SPEED_BASE).min(self.obstacle_speed_shrink);
        (self.obstacle_base_interval - shrink).max(self.obstacle_min_interval)
    }

    /// (base, jitter) for the letter interval at `score`
    pub fn letter_band(&self, score: u64) -> (f32, f32) {
        match crate::sim::questions::difficulty_tier(score) {
            3 => self.letter_interval_tier3,
            2 => self.letter_interval_tier2,
            _ => self.letter_interval,
        }
    }
}
