//! Demo player proxy
//!
//! Stands in for the external input and player-movement components when
//! the simulation runs headless: picks a door lane, jumps obstacles and
//! floating pickups, and reports the player's world position each frame.

use glam::Vec3;
use rand::Rng;

use super::runway::{ObjectKind, Runway, RunwayObject};
use crate::consts::{COLLISION_Z_TOLERANCE, JUMP_DURATION, JUMP_HEIGHT};
use crate::{lane_of, lane_x};

/// How far ahead the pilot commits to a door
const DOOR_LOOKAHEAD: f32 = 40.0;
/// How far ahead the pilot drifts toward a letter
const LETTER_LOOKAHEAD: f32 = 30.0;
/// Seconds of warning before an object reaches the collision band
const JUMP_LEAD_SECS: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct Autopilot {
    lane: i32,
    /// Seconds into the current jump
    jump_time: Option<f32>,
    /// Chance of deliberately picking a wrong door
    mistake_rate: f64,
    /// Door the pilot is steering for
    target_door: Option<u32>,
}

impl Autopilot {
    pub fn new(mistake_rate: f64) -> Self {
        Self {
            lane: 0,
            jump_time: None,
            mistake_rate: mistake_rate.clamp(0.0, 1.0),
            target_door: None,
        }
    }

    pub fn lane(&self) -> i32 {
        self.lane
    }

    pub fn airborne(&self) -> bool {
        self.jump_time.is_some()
    }

    /// Current player position
    pub fn position(&self) -> Vec3 {
        Vec3::new(lane_x(self.lane), self.height(), 0.0)
    }

    /// Parabolic jump height
    fn height(&self) -> f32 {
        match self.jump_time {
            Some(t) => {
                let s = (t / JUMP_DURATION).clamp(0.0, 1.0);
                4.0 * JUMP_HEIGHT * s * (1.0 - s)
            }
            None => 0.0,
        }
    }

    /// Decide this frame's lane and jump, returning the new position
    pub fn steer<R: Rng>(&mut self, runway: &Runway, speed: f32, dt: f32, rng: &mut R) -> Vec3 {
        if let Some(t) = self.jump_time.as_mut() {
            *t += dt;
            if *t >= JUMP_DURATION {
                self.jump_time = None;
            }
        }

        self.pick_door(runway, rng);

        if let Some(door) = self.target_door.and_then(|id| runway.objects().iter().find(|o| o.id == id)) {
            self.lane = lane_of(door.position.x);
        } else if let Some(letter) = nearest_ahead(runway, LETTER_LOOKAHEAD, |o| matches!(o.kind, ObjectKind::Letter(_))) {
            self.lane = lane_of(letter.position.x);
        }

        if self.jump_time.is_none() && self.should_jump(runway, speed) {
            self.jump_time = Some(0.0);
        }

        self.position()
    }

    /// Commit to one door of the next row
    fn pick_door<R: Rng>(&mut self, runway: &Runway, rng: &mut R) {
        let still_ahead = self
            .target_door
            .and_then(|id| runway.objects().iter().find(|o| o.id == id))
            .is_some_and(|o| o.active && o.position.z < 0.0);
        if still_ahead {
            return;
        }
        self.target_door = None;

        let Some(nearest) = nearest_ahead(runway, DOOR_LOOKAHEAD, |o| matches!(o.kind, ObjectKind::Door(_))) else {
            return;
        };
        let row_z = nearest.position.z;

        let row: Vec<&RunwayObject> = runway
            .objects()
            .iter()
            .filter(|o| o.active && matches!(o.kind, ObjectKind::Door(_)) && (o.position.z - row_z).abs() < 0.5)
            .collect();
        let correct = row
            .iter()
            .find(|o| matches!(&o.kind, ObjectKind::Door(d) if d.is_correct));
        let wrong: Vec<&&RunwayObject> = row
            .iter()
            .filter(|o| matches!(&o.kind, ObjectKind::Door(d) if !d.is_correct))
            .collect();

        let pick = if !wrong.is_empty() && rng.random_bool(self.mistake_rate) {
            Some(*wrong[rng.random_range(0..wrong.len())])
        } else {
            correct.copied()
        };
        self.target_door = pick.map(|o| o.id);
    }

    /// Jump when something that needs air is about to reach the player
    fn should_jump(&self, runway: &Runway, speed: f32) -> bool {
        let near = -COLLISION_Z_TOLERANCE;
        let far = near - speed.max(1.0) * JUMP_LEAD_SECS;
        let x = lane_x(self.lane);

        runway.objects().iter().any(|o| {
            o.active
                && (o.position.x - x).abs() < 0.5
                && o.position.z >= far
                && o.position.z <= near
                && match &o.kind {
                    ObjectKind::Obstacle | ObjectKind::Letter(_) => true,
                    ObjectKind::Gem(_) => o.position.y > 2.0,
                    ObjectKind::Door(_) => false,
                }
        })
    }
}

/// Closest active object ahead of the player within `range`
fn nearest_ahead<F>(runway: &Runway, range: f32, filter: F) -> Option<&RunwayObject>
where
    F: Fn(&RunwayObject) -> bool,
{
    runway
        .objects()
        .iter()
        .filter(|o| o.active && o.position.z < 0.0 && o.position.z > -range && filter(o))
        .max_by(|a, b| a.position.z.total_cmp(&b.position.z))
}
