//! Player preferences
//!
//! Audio levels and mute. Kept apart from run state: a restart never
//! touches them.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// All audio muted
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Parse settings JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
                settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Volume applied to sound effects
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mute_zeroes_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 0.0001);
        assert!(settings.toggle_mute());
        assert_eq!(settings.effective_volume(), 0.0);
        assert!(!settings.toggle_mute());
    }

    #[test]
    fn test_from_json() {
        let settings = Settings::from_json(r#"{ "master_volume": 3.0, "muted": true }"#);
        assert_eq!(settings.master_volume, 1.0);
        assert!(settings.muted);
        assert_eq!(settings.sfx_volume, 1.0);

        assert_eq!(Settings::from_json("{"), Settings::default());
    }
}
