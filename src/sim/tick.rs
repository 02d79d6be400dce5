//! Per-frame simulation tick
//!
//! `Simulation` owns the game state, the runway, the spawn scheduler and
//! the seeded RNG. One call to [`Simulation::tick`] per rendered frame
//! spawns, moves, collides and evicts, then returns the events produced.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision;
use super::runway::Runway;
use super::shop::ShopItem;
use super::spawn::SpawnScheduler;
use super::state::{GameEvent, GameMode, GameState, GameStatus};
use crate::consts::MAX_FRAME_DELTA;
use crate::tuning::Tuning;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player world position (from the external movement component)
    pub player: Vec3,
    /// Pause toggle
    pub pause: bool,
}

/// Counters for the last playing frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameStats {
    pub distance: f32,
    pub spawned: usize,
    pub resolved: usize,
    pub evicted: usize,
}

/// One simulation instance
#[derive(Debug, Clone)]
pub struct Simulation {
    seed: u64,
    rng: Pcg32,
    state: GameState,
    runway: Runway,
    spawner: SpawnScheduler,
    last_frame: Option<FrameStats>,
}

impl Simulation {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            state: GameState::new(),
            runway: Runway::new(),
            spawner: SpawnScheduler::new(tuning),
            last_frame: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn runway(&self) -> &Runway {
        &self.runway
    }

    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    /// Counters from the most recent playing frame
    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last_frame.as_ref()
    }

    /// Start a fresh run: clears the runway and spawn clocks
    pub fn start_game(&mut self, mode: GameMode) {
        self.clear_world();
        self.state.start_game(mode, &mut self.rng);
    }

    /// Start again in the current mode
    pub fn restart_game(&mut self) {
        self.clear_world();
        self.state.restart_game(&mut self.rng);
    }

    fn clear_world(&mut self) {
        self.runway.clear();
        self.spawner.reset();
        self.last_frame = None;
    }

    /// Leave a paused or finished run, discarding its objects
    pub fn return_to_menu(&mut self) -> bool {
        if !self.state.return_to_menu() {
            return false;
        }
        self.runway.clear();
        true
    }

    // === Screen operations ===
    //
    // These never touch the runway, so the HUD drives them directly.
    // Events they raise are returned by the next `tick`.

    pub fn toggle_pause(&mut self) {
        self.state.toggle_pause();
    }

    pub fn open_shop(&mut self) -> bool {
        self.state.open_shop()
    }

    pub fn close_shop(&mut self) -> bool {
        self.state.close_shop()
    }

    pub fn open_art_room(&mut self) -> bool {
        self.state.open_art_room()
    }

    pub fn close_art_room(&mut self) -> bool {
        self.state.close_art_room()
    }

    /// Buy `item` with score; false when unaffordable or already owned
    pub fn buy_item(&mut self, item: ShopItem) -> bool {
        self.state.buy_item(item)
    }

    pub fn activate_immortality(&mut self) -> bool {
        self.state.activate_immortality()
    }

    /// Advance one rendered frame of `delta` seconds
    pub fn tick(&mut self, input: &TickInput, delta: f32) -> Vec<GameEvent> {
        if input.pause {
            self.state.toggle_pause();
        }

        // A broken frame time counts as no time at all
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        // Timers run on wall time in every status
        self.state.advance_clock(delta as f64);

        if self.state.status() != GameStatus::Playing {
            return self.state.drain_events();
        }

        let dt = delta.clamp(0.0, MAX_FRAME_DELTA);
        let travel = self.state.speed() * dt;

        self.spawner.advance(travel);
        let spawned = self.spawner.spawn(&self.state, &mut self.runway, &mut self.rng);

        self.runway.advance(travel, dt);

        let resolved = collision::resolve(
            &mut self.state,
            &mut self.runway,
            input.player,
            travel,
            &mut self.rng,
        );

        let evicted = self.runway.evict();

        if matches!(self.state.status(), GameStatus::GameOver | GameStatus::Victory) {
            self.state.record_distance(self.spawner.distance());
        }

        self.last_frame = Some(FrameStats {
            distance: self.spawner.distance(),
            spawned,
            resolved,
            evicted,
        });

        self.state.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::runway::ObjectKind;

    /// Player standing in a lane with no doors or pickups ever spawning there
    fn off_track() -> TickInput {
        TickInput {
            player: Vec3::new(100.0, 0.0, 0.0),
            pause: false,
        }
    }

    #[test]
    fn test_tick_menu_is_inert() {
        let mut sim = Simulation::new(1, Tuning::default());
        sim.tick(&off_track(), 0.016);
        assert_eq!(sim.state().status(), GameStatus::Menu);
        assert!(sim.runway().is_empty());
        assert_eq!(sim.spawner().distance(), 0.0);
    }

    #[test]
    fn test_tick_pause() {
        let mut sim = Simulation::new(12345, Tuning::default());
        sim.start_game(GameMode::Normal);
        for _ in 0..300 {
            sim.tick(&off_track(), 0.016);
        }
        let distance = sim.spawner().distance();
        let objects: Vec<f32> = sim.runway().objects().iter().map(|o| o.position.z).collect();

        let pause = TickInput {
            pause: true,
            ..off_track()
        };
        sim.tick(&pause, 0.016);
        assert_eq!(sim.state().status(), GameStatus::Paused);
        for _ in 0..100 {
            sim.tick(&off_track(), 0.016);
        }
        assert_eq!(sim.spawner().distance(), distance);
        let after: Vec<f32> = sim.runway().objects().iter().map(|o| o.position.z).collect();
        assert_eq!(objects, after);

        // Unpause
        sim.tick(&pause, 0.016);
        assert_eq!(sim.state().status(), GameStatus::Playing);
        assert!(sim.spawner().distance() > distance);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut sim = Simulation::new(5, Tuning::default());
        sim.start_game(GameMode::Normal);
        sim.tick(&off_track(), 1.0);
        let expected = RUN_SPEED_BASE * MAX_FRAME_DELTA;
        assert!((sim.spawner().distance() - expected).abs() < 0.0001);
    }

    #[test]
    fn test_objects_move_by_travel() {
        let mut sim = Simulation::new(8, Tuning::default());
        sim.start_game(GameMode::Normal);
        while sim.runway().is_empty() {
            sim.tick(&off_track(), 0.05);
        }

        let before: Vec<(u32, f32)> = sim.runway().objects().iter().map(|o| (o.id, o.position.z)).collect();
        let travel = sim.state().speed() * 0.03;
        sim.tick(&off_track(), 0.03);

        for (id, z) in before {
            if let Some(obj) = sim.runway().objects().iter().find(|o| o.id == id) {
                assert!((obj.position.z - (z + travel)).abs() < 0.0001);
            }
        }
    }

    #[test]
    fn test_door_spawned_and_passed() {
        let mut sim = Simulation::new(77, Tuning::default());
        sim.start_game(GameMode::Normal);

        // Run until the first doors appear
        while !sim
            .runway()
            .objects()
            .iter()
            .any(|o| matches!(o.kind, ObjectKind::Door(_)))
        {
            sim.tick(&off_track(), 0.05);
        }
        assert!(sim.spawner().distance() >= 50.0);

        // Nothing collides off-track; doors scroll out and are evicted
        for _ in 0..400 {
            sim.tick(&off_track(), 0.05);
        }
        assert_eq!(sim.state().score(), 0);
        assert!(sim.runway().objects().iter().all(|o| o.position.z <= REMOVE_DISTANCE));
    }

    #[test]
    fn test_center_lane_run_reaches_game_over() {
        let mut sim = Simulation::new(3, Tuning::default());
        sim.start_game(GameMode::Normal);
        let input = TickInput::default();

        let mut events = Vec::new();
        for _ in 0..20_000 {
            events.extend(sim.tick(&input, 0.05));
            if sim.state().status() != GameStatus::Playing {
                break;
            }
        }

        // Standing still in the middle lane hits doors and obstacles
        assert!(events.iter().any(|e| matches!(e, GameEvent::CorrectAnswer { .. } | GameEvent::WrongAnswer | GameEvent::Damage)));
        if sim.state().status() == GameStatus::GameOver {
            assert_eq!(sim.state().lives(), 0);
            assert_eq!(sim.state().speed(), 0.0);
            assert!(sim.state().distance() > 0);
        }
    }

    #[test]
    fn test_restart_clears_runway() {
        let mut sim = Simulation::new(9, Tuning::default());
        sim.start_game(GameMode::Challenge);
        for _ in 0..200 {
            sim.tick(&off_track(), 0.05);
        }
        assert!(!sim.runway().is_empty());

        sim.restart_game();
        assert!(sim.runway().is_empty());
        assert_eq!(sim.spawner().distance(), 0.0);
        assert_eq!(sim.state().mode(), GameMode::Challenge);
        assert_eq!(sim.state().run_id(), 2);
    }

    #[test]
    fn test_determinism() {
        // Two simulations with the same seed produce identical runs
        let mut sim1 = Simulation::new(99999, Tuning::default());
        let mut sim2 = Simulation::new(99999, Tuning::default());
        sim1.start_game(GameMode::Normal);
        sim2.start_game(GameMode::Normal);

        let input = TickInput::default();
        for _ in 0..2000 {
            sim1.tick(&input, 0.02);
            sim2.tick(&input, 0.02);
        }

        assert_eq!(sim1.state().score(), sim2.state().score());
        assert_eq!(sim1.state().lives(), sim2.state().lives());
        assert_eq!(sim1.runway().len(), sim2.runway().len());
        assert_eq!(sim1.state().current_question(), sim2.state().current_question());
    }

    fn door_texts(sim: &Simulation) -> Vec<(String, bool)> {
        sim.runway()
            .objects()
            .iter()
            .filter_map(|o| match &o.kind {
                ObjectKind::Door(d) if o.active => Some((d.text.clone(), d.is_correct)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_restart_never_keeps_stale_doors() {
        let mut sim = Simulation::new(21, Tuning::default());
        sim.start_game(GameMode::Normal);
        while door_texts(&sim).is_empty() {
            sim.tick(&off_track(), 0.05);
        }

        sim.restart_game();
        assert!(door_texts(&sim).is_empty());
        assert_eq!(sim.spawner().distance(), 0.0);

        while door_texts(&sim).is_empty() {
            sim.tick(&off_track(), 0.05);
        }
        let passive = sim.state().current_question().unwrap().passive;
        let correct: Vec<String> = door_texts(&sim)
            .into_iter()
            .filter(|(_, is_correct)| *is_correct)
            .map(|(text, _)| text)
            .collect();
        assert_eq!(correct, vec![passive.to_string()]);
    }

    #[test]
    fn test_shop_screen_freezes_runway() {
        let mut sim = Simulation::new(4, Tuning::default());
        sim.start_game(GameMode::Normal);
        for _ in 0..100 {
            sim.tick(&off_track(), 0.05);
        }
        let distance = sim.spawner().distance();

        assert!(sim.open_shop());
        assert_eq!(sim.state().status(), GameStatus::Shop);
        // Nothing affordable at zero score
        assert!(!sim.buy_item(ShopItem::Heal));
        assert!(!sim.activate_immortality());
        sim.tick(&off_track(), 0.05);
        assert_eq!(sim.spawner().distance(), distance);

        assert!(sim.close_shop());
        assert!(!sim.open_art_room());
        sim.toggle_pause();
        assert_eq!(sim.state().status(), GameStatus::Paused);
        assert!(sim.return_to_menu());
        assert!(sim.runway().is_empty());
        assert!(sim.open_art_room());
        assert!(sim.close_art_room());
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut sim = Simulation::new(6, Tuning::default());
        sim.start_game(GameMode::Normal);
        while sim.runway().is_empty() {
            sim.tick(&off_track(), 0.05);
        }
        let distance = sim.spawner().distance();
        let clock = sim.state().clock();

        sim.tick(&off_track(), f32::NAN);
        sim.tick(&off_track(), f32::INFINITY);
        assert_eq!(sim.spawner().distance(), distance);
        assert_eq!(sim.state().clock(), clock);
        assert!(sim.runway().objects().iter().all(|o| o.position.is_finite()));

        sim.tick(&off_track(), 0.05);
        assert!(sim.spawner().distance() > distance);
    }
}
