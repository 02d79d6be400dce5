//! Runway objects and the store that owns them
//!
//! Objects spawn ahead of the player at negative z and scroll toward
//! positive z. An object leaves the store when it scrolls past the
//! trailing boundary or when its destruction effect finishes.

use glam::Vec3;
use serde::Serialize;

use crate::consts::{HIT_EFFECT_SECS, REMOVE_DISTANCE};

/// Gem value / color bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GemColor {
    /// Ground gems
    Yellow,
    /// Mid-air gems on a jump arc
    Mint,
    /// High gems that need a jump
    Cyan,
}

impl GemColor {
    pub fn hex(&self) -> &'static str {
        match self {
            GemColor::Yellow => "#ffff00",
            GemColor::Mint => "#00ffaa",
            GemColor::Cyan => "#00ffff",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoorPayload {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GemPayload {
    pub points: u32,
    pub color: GemColor,
}

impl GemPayload {
    pub const GROUND: GemPayload = GemPayload {
        points: 50,
        color: GemColor::Yellow,
    };
    pub const MID: GemPayload = GemPayload {
        points: 75,
        color: GemColor::Mint,
    };
    pub const SKY: GemPayload = GemPayload {
        points: 100,
        color: GemColor::Cyan,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LetterPayload {
    pub letter: char,
}

/// What an object is, with its kind-specific data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectKind {
    Obstacle,
    Gem(GemPayload),
    Door(DoorPayload),
    Letter(LetterPayload),
}

/// A spawned runway entity
#[derive(Debug, Clone, Serialize)]
pub struct RunwayObject {
    pub id: u32,
    pub kind: ObjectKind,
    /// x = lane offset, y = height, z = distance (grows toward the player)
    pub position: Vec3,
    /// Still eligible for collision
    pub active: bool,
    /// Destroyed on contact; kept until the effect window ends
    pub hit: bool,
    /// Seconds since `hit` was set
    pub hit_age: f32,
}

impl RunwayObject {
    /// Deactivate without a destruction effect (pickups)
    pub fn consume(&mut self) {
        self.active = false;
    }

    /// Deactivate and start the destruction effect (doors, obstacles)
    pub fn shatter(&mut self) {
        self.active = false;
        self.hit = true;
        self.hit_age = 0.0;
    }

    fn expired(&self) -> bool {
        self.position.z > REMOVE_DISTANCE || (self.hit && self.hit_age >= HIT_EFFECT_SECS)
    }
}

/// Authoritative list of live runway objects (sorted by id)
#[derive(Debug, Clone, Serialize)]
pub struct Runway {
    objects: Vec<RunwayObject>,
    next_id: u32,
}

impl Default for Runway {
    fn default() -> Self {
        Self::new()
    }
}

impl Runway {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an object, returning its id
    pub fn spawn(&mut self, kind: ObjectKind, position: Vec3) -> u32 {
        debug_assert!(position.is_finite(), "non-finite spawn position {position}");
        if !position.is_finite() {
            return 0;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.objects.push(RunwayObject {
            id,
            kind,
            position,
            active: true,
            hit: false,
            hit_age: 0.0,
        });
        id
    }

    /// Scroll every object toward the player by `travel` units
    pub fn advance(&mut self, travel: f32, dt: f32) {
        for obj in &mut self.objects {
            obj.position.z += travel;
            if obj.hit {
                obj.hit_age += dt;
            }
        }
    }

    /// Drop objects past the trailing boundary or done shattering.
    /// Returns how many were removed.
    pub fn evict(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !o.expired());
        before - self.objects.len()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> &[RunwayObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [RunwayObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects a renderer should draw: active ones and shattering ones
    pub fn visible(&self) -> impl Iterator<Item = &RunwayObject> {
        self.objects.iter().filter(|o| o.active || o.hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let mut runway = Runway::new();
        let a = runway.spawn(ObjectKind::Obstacle, Vec3::new(0.0, 0.0, -120.0));
        let b = runway.spawn(ObjectKind::Gem(GemPayload::SKY), Vec3::new(2.2, 3.2, -120.0));
        assert_ne!(a, b);
        assert_eq!(runway.len(), 2);
        assert!(runway.objects().iter().all(|o| o.active && !o.hit));
    }

    #[test]
    fn test_advance_moves_every_object() {
        let mut runway = Runway::new();
        runway.spawn(ObjectKind::Obstacle, Vec3::new(0.0, 0.0, -50.0));
        runway.spawn(ObjectKind::Letter(LetterPayload { letter: 'K' }), Vec3::new(0.0, 2.5, -10.0));
        runway.objects_mut()[1].consume();

        runway.advance(0.6, 0.05);
        assert!((runway.objects()[0].position.z + 49.4).abs() < 0.0001);
        assert!((runway.objects()[1].position.z + 9.4).abs() < 0.0001);
    }

    #[test]
    fn test_evict_past_boundary() {
        let mut runway = Runway::new();
        runway.spawn(ObjectKind::Obstacle, Vec3::new(0.0, 0.0, 19.5));
        runway.spawn(ObjectKind::Obstacle, Vec3::new(0.0, 0.0, -5.0));

        runway.advance(1.0, 0.05);
        assert_eq!(runway.evict(), 1);
        assert_eq!(runway.len(), 1);
    }

    #[test]
    fn test_shattered_objects_linger() {
        let mut runway = Runway::new();
        runway.spawn(
            ObjectKind::Door(DoorPayload {
                text: "was".into(),
                is_correct: true,
            }),
            Vec3::new(0.0, 0.0, 0.0),
        );
        runway.objects_mut()[0].shatter();
        assert_eq!(runway.visible().count(), 1);

        for _ in 0..19 {
            runway.advance(0.0, 0.05);
            assert_eq!(runway.evict(), 0);
        }
        runway.advance(0.0, 0.06);
        assert_eq!(runway.evict(), 1);
    }

    #[test]
    fn test_consumed_pickups_hidden() {
        let mut runway = Runway::new();
        runway.spawn(ObjectKind::Gem(GemPayload::GROUND), Vec3::new(0.0, 1.0, 0.0));
        runway.objects_mut()[0].consume();
        assert_eq!(runway.visible().count(), 0);
        assert_eq!(runway.len(), 1);
    }
}
