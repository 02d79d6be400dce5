//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame deltas clamped before integration
//! - Seeded RNG only
//! - Stable iteration order (by object ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod questions;
pub mod runway;
pub mod shop;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use autopilot::Autopilot;
pub use collision::{depth_overlap, lateral_overlap, obstacle_hits, resolve};
pub use questions::{AnswerOption, Question, difficulty_tier, select_next, shuffled_options};
pub use runway::{DoorPayload, GemColor, GemPayload, LetterPayload, ObjectKind, Runway, RunwayObject};
pub use shop::ShopItem;
pub use spawn::{GemPattern, SpawnScheduler};
pub use state::{AnswerFeedback, GameEvent, GameMode, GameState, GameStatus, Inventory, Mistake};
pub use tick::{FrameStats, Simulation, TickInput};
pub use timers::{TimerKind, TimerQueue};
