//! Procedural spawn scheduling
//!
//! A distance accumulator drives four independent triggers: question
//! doors, obstacle clusters, mission letters and designed gem patterns.
//! Each trigger fires once its threshold is passed and then moves its
//! threshold forward. Doors impose a quiet zone on the others so answers
//! stay readable.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::runway::{DoorPayload, GemPayload, LetterPayload, ObjectKind, Runway};
use super::state::GameState;
use crate::consts::{LANES, TARGET_LETTERS};
use crate::spawn_position;
use crate::tuning::Tuning;

/// Heights of the three gem bands
const GROUND_Y: f32 = 1.0;
const MID_Y: f32 = 2.2;
const SKY_Y: f32 = 3.2;
const LETTER_Y: f32 = 2.5;

/// Fixed gem layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GemPattern {
    /// Six ground gems in one lane
    GroundLine,
    /// Four high gems in one lane
    SkyLine,
    /// Ground, mid, sky, mid, ground: one jump collects it all
    JumpArc,
    /// Four ground gems alternating between the outer lanes
    Slalom,
}

impl GemPattern {
    pub const ALL: [GemPattern; 4] = [
        GemPattern::GroundLine,
        GemPattern::SkyLine,
        GemPattern::JumpArc,
        GemPattern::Slalom,
    ];

    /// Gems for this pattern as (lane, height, offset behind the spawn line)
    pub fn layout(&self, lane: i32) -> Vec<(i32, f32, f32, GemPayload)> {
        match self {
            GemPattern::GroundLine => (0..6)
                .map(|i| (lane, GROUND_Y, i as f32 * 4.0, GemPayload::GROUND))
                .collect(),
            GemPattern::SkyLine => (0..4)
                .map(|i| (lane, SKY_Y, i as f32 * 4.0, GemPayload::SKY))
                .collect(),
            GemPattern::JumpArc => vec![
                (lane, GROUND_Y, 0.0, GemPayload::GROUND),
                (lane, MID_Y, 4.0, GemPayload::MID),
                (lane, SKY_Y, 8.0, GemPayload::SKY),
                (lane, MID_Y, 12.0, GemPayload::MID),
                (lane, GROUND_Y, 16.0, GemPayload::GROUND),
            ],
            GemPattern::Slalom => (0..4)
                .map(|i| {
                    let slalom_lane = if i % 2 == 0 { -1 } else { 1 };
                    (slalom_lane, GROUND_Y, i as f32 * 6.0, GemPayload::GROUND)
                })
                .collect(),
        }
    }
}

/// Distance accumulator plus the four trigger thresholds
#[derive(Debug, Clone, Serialize)]
pub struct SpawnScheduler {
    tuning: Tuning,
    distance: f32,
    next_door: f32,
    next_obstacle: f32,
    next_letter: f32,
    next_gem: f32,
}

impl SpawnScheduler {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            distance: 0.0,
            next_door: tuning.first_door,
            next_obstacle: tuning.first_obstacle,
            next_letter: tuning.first_letter,
            next_gem: tuning.first_gem_pattern,
            tuning,
        }
    }

    /// Back to the start of a run
    pub fn reset(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Total distance travelled this run
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn next_door(&self) -> f32 {
        self.next_door
    }

    pub fn next_obstacle(&self) -> f32 {
        self.next_obstacle
    }

    pub fn next_letter(&self) -> f32 {
        self.next_letter
    }

    pub fn next_gem(&self) -> f32 {
        self.next_gem
    }

    /// Add this frame's travel to the accumulator
    pub fn advance(&mut self, travel: f32) {
        self.distance += travel.max(0.0);
    }

    /// Fire every trigger whose threshold has been reached.
    /// Returns the number of objects spawned.
    pub fn spawn<R: Rng>(&mut self, state: &GameState, runway: &mut Runway, rng: &mut R) -> usize {
        let before = runway.len();

        if self.distance >= self.next_door {
            self.spawn_doors(state, runway);
        }

        let dist_to_door = (self.distance - self.next_door).abs();

        if self.distance >= self.next_obstacle && dist_to_door > self.tuning.obstacle_door_gap {
            self.spawn_obstacles(state.speed(), runway, rng);
        }

        if self.distance >= self.next_letter && dist_to_door > self.tuning.letter_door_gap {
            self.spawn_letter(state, runway, rng);
        }

        if self.distance >= self.next_gem && dist_to_door > self.tuning.gem_door_gap {
            self.spawn_gem_pattern(runway, rng);
        }

        runway.len() - before
    }

    fn spawn_doors(&mut self, state: &GameState, runway: &mut Runway) {
        let options = state.current_options();
        debug_assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);

        for (&lane, option) in LANES.iter().zip(options) {
            runway.spawn(
                ObjectKind::Door(DoorPayload {
                    text: option.text.clone(),
                    is_correct: option.is_correct,
                }),
                spawn_position(lane, 0.0, 0.0),
            );
        }

        // Keep the approach to the door clear
        self.next_obstacle = self
            .next_obstacle
            .max(self.distance + self.tuning.door_obstacle_buffer);
        self.next_gem = self.next_gem.max(self.distance + self.tuning.door_gem_buffer);
        self.next_door += self.tuning.door_interval;

        log::debug!("Doors spawned at distance {:.1}", self.distance);
    }

    fn spawn_obstacles<R: Rng>(&mut self, speed: f32, runway: &mut Runway, rng: &mut R) {
        let mut lanes = LANES;
        lanes.shuffle(rng);
        let count = if rng.random_bool(self.tuning.double_obstacle_chance) {
            2
        } else {
            1
        };

        for &lane in &lanes[..count] {
            runway.spawn(ObjectKind::Obstacle, spawn_position(lane, 0.0, 0.0));

            // Bonus gem floating over the obstacle
            if rng.random_bool(self.tuning.sky_gem_chance) {
                runway.spawn(
                    ObjectKind::Gem(GemPayload::SKY),
                    spawn_position(lane, SKY_Y, 0.0),
                );
            }

            // Ground trail leading into it
            if rng.random_bool(self.tuning.gem_trail_chance) {
                for k in 1..=3 {
                    runway.spawn(
                        ObjectKind::Gem(GemPayload::GROUND),
                        spawn_position(lane, GROUND_Y, -(k as f32) * 5.0),
                    );
                }
            }
        }

        let jitter = rng.random::<f32>() * self.tuning.obstacle_jitter;
        self.next_obstacle += self.tuning.obstacle_interval(speed) + jitter;
    }

    fn spawn_letter<R: Rng>(&mut self, state: &GameState, runway: &mut Runway, rng: &mut R) {
        let collected = state.collected_letters();
        let missing: Vec<char> = TARGET_LETTERS
            .iter()
            .copied()
            .filter(|l| !collected.contains(l))
            .collect();
        // Every letter held: offer the full alphabet again
        let pool: &[char] = if missing.is_empty() {
            &TARGET_LETTERS
        } else {
            &missing
        };

        let letter = pool[rng.random_range(0..pool.len())];
        let lane = rng.random_range(-1..=1);
        runway.spawn(
            ObjectKind::Letter(LetterPayload { letter }),
            spawn_position(lane, LETTER_Y, 0.0),
        );

        let (base, jitter) = self.tuning.letter_band(state.score());
        self.next_letter += base + rng.random::<f32>() * jitter;

        log::debug!("Letter {letter} spawned in lane {lane}");
    }

    fn spawn_gem_pattern<R: Rng>(&mut self, runway: &mut Runway, rng: &mut R) {
        let pattern = GemPattern::ALL[rng.random_range(0..GemPattern::ALL.len())];
        let lane = rng.random_range(-1..=1);

        for (gem_lane, y, offset, gem) in pattern.layout(lane) {
            runway.spawn(ObjectKind::Gem(gem), spawn_position(gem_lane, y, offset));
        }

        self.next_gem += self.tuning.gem_pattern_interval + rng.random::<f32>() * self.tuning.gem_pattern_jitter;
    }
}
