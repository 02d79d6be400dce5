//! Gate Runner - an endless-runner grammar game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, game state)
//! - `tuning`: Data-driven spawn balance
//! - `settings`: Audio preferences
//! - `audio`: Sound cue seam for an external audio backend
//! - `review`: Post-game mistake review (explanation service seam)

pub mod audio;
pub mod review;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation will integrate (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.05;

    /// Lateral distance between lane centers
    pub const LANE_WIDTH: f32 = 2.2;
    /// Lane indices, left to right
    pub const LANES: [i32; 3] = [-1, 0, 1];

    /// Objects spawn this far ahead of the player (negative z)
    pub const SPAWN_DISTANCE: f32 = 120.0;
    /// Objects past this z are behind the player and evicted
    pub const REMOVE_DISTANCE: f32 = 20.0;
    /// How long a hit object lingers for its destruction effect (seconds)
    pub const HIT_EFFECT_SECS: f32 = 1.0;

    /// Player jump apex and airtime
    pub const JUMP_HEIGHT: f32 = 2.5;
    pub const JUMP_DURATION: f32 = 0.6;

    /// Run speed at the start of a run and after wrong answers
    pub const RUN_SPEED_BASE: f32 = 12.0;
    /// Speed caps: challenge mode, normal mode above 6000, normal mode below
    pub const SPEED_CAP_CHALLENGE: f32 = 80.0;
    pub const SPEED_CAP_NORMAL_HIGH: f32 = 55.0;
    pub const SPEED_CAP_NORMAL: f32 = 45.0;
    /// Speed lost on a wrong answer
    pub const WRONG_ANSWER_SLOWDOWN: f32 = 3.0;

    /// Lives at the start of a run
    pub const STARTING_LIVES: u32 = 3;

    /// Score for a correct door before the streak bonus
    pub const CORRECT_ANSWER_SCORE: u64 = 500;
    /// Per-streak bonus, counted up to `STREAK_BONUS_CAP` answers
    pub const STREAK_BONUS: u64 = 100;
    pub const STREAK_BONUS_CAP: u32 = 10;

    /// Mission alphabet
    pub const TARGET_LETTERS: [char; 4] = ['F', 'K', 'Y', 'C'];
    pub const LETTER_BONUS: u64 = 1000;
    pub const DUPLICATE_LETTER_BONUS: u64 = 200;
    pub const MISSION_BONUS: u64 = 5000;

    /// Score thresholds for question tiers and letter frequency
    pub const TIER_2_SCORE: u64 = 3000;
    pub const TIER_3_SCORE: u64 = 6000;
    /// Challenge mode mixes every tier above this score
    pub const CHALLENGE_MIX_SCORE: u64 = 10_000;

    /// Transient flag lifetimes (seconds)
    pub const ANSWER_FEEDBACK_SECS: f64 = 0.8;
    pub const DAMAGE_FLASH_SECS: f64 = 0.3;
    pub const IMMORTALITY_SECS: f64 = 5.0;

    /// Collision proxies
    pub const COLLISION_Z_TOLERANCE: f32 = 1.2;
    pub const LANE_TOLERANCE: f32 = 0.8;
    pub const GEM_Y_TOLERANCE: f32 = 1.2;
    pub const LETTER_Y_TOLERANCE: f32 = 1.5;
    pub const OBSTACLE_Y_TOLERANCE: f32 = 1.2;
    /// Player must be at least this high to clear an obstacle
    pub const OBSTACLE_CLEARANCE: f32 = 1.0;
}

/// World x coordinate of a lane index
#[inline]
pub fn lane_x(lane: i32) -> f32 {
    lane as f32 * consts::LANE_WIDTH
}

/// Nearest lane index for a world x coordinate
#[inline]
pub fn lane_of(x: f32) -> i32 {
    ((x / consts::LANE_WIDTH).round() as i32).clamp(-1, 1)
}

/// Spawn position for an object in `lane` at height `y`, `offset` units
/// further from the player than the spawn line
#[inline]
pub fn spawn_position(lane: i32, y: f32, offset: f32) -> Vec3 {
    Vec3::new(lane_x(lane), y, -consts::SPAWN_DISTANCE - offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_round_trip() {
        for lane in consts::LANES {
            assert_eq!(lane_of(lane_x(lane)), lane);
        }
        // Off-track positions snap to the outer lanes
        assert_eq!(lane_of(10.0), 1);
        assert_eq!(lane_of(-10.0), -1);
    }

    #[test]
    fn test_spawn_position() {
        let pos = spawn_position(1, 3.2, 8.0);
        assert!((pos.x - 2.2).abs() < 0.0001);
        assert!((pos.y - 3.2).abs() < 0.0001);
        assert!((pos.z + 128.0).abs() < 0.0001);
    }
}
