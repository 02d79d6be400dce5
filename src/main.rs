//! Gate Runner headless entry point
//!
//! Runs one autopiloted run at a fixed frame rate and prints a JSON
//! summary. Usage:
//!
//! ```text
//! gate-runner [seed] [normal|challenge] [seconds] [tuning.json]
//! ```

use std::process::ExitCode;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use gate_runner::audio::{self, LogAudioSink};
use gate_runner::review::{MistakeReview, RuleBasedExplainer};
use gate_runner::sim::{Autopilot, GameMode, GameStatus, ShopItem, Simulation, TickInput};
use gate_runner::{Settings, Tuning};

/// Rendered frame rate being simulated
const FRAME_DT: f32 = 1.0 / 60.0;
/// Chance the autopilot picks a wrong door
const MISTAKE_RATE: f64 = 0.15;

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    mode: GameMode,
    status: GameStatus,
    seconds: f32,
    score: u64,
    lives: u32,
    max_lives: u32,
    questions_answered: u32,
    gems_collected: u32,
    distance: f32,
    mistakes: usize,
    sound_cues: usize,
    explanations: Vec<String>,
}

struct Args {
    seed: u64,
    mode: GameMode,
    seconds: f32,
    tuning: Tuning,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);

    let seed = match args.next() {
        Some(s) => s.parse().map_err(|_| format!("invalid seed `{s}`"))?,
        None => 12345,
    };
    let mode = match args.next().as_deref() {
        None | Some("normal") => GameMode::Normal,
        Some("challenge") => GameMode::Challenge,
        Some(other) => return Err(format!("unknown mode `{other}`")),
    };
    let seconds = match args.next() {
        Some(s) => s.parse().map_err(|_| format!("invalid duration `{s}`"))?,
        None => 180.0,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path).map_err(|e| e.to_string())?,
        None => Tuning::default(),
    };

    Ok(Args {
        seed,
        mode,
        seconds,
        tuning,
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = Settings::default();
    let mut sink = LogAudioSink::default();
    let mut sim = Simulation::new(args.seed, args.tuning);
    // Separate stream so the pilot does not perturb spawn randomness
    let mut pilot_rng = Pcg32::seed_from_u64(args.seed ^ 0x9e37_79b9);
    let mut pilot = Autopilot::new(MISTAKE_RATE);

    sim.start_game(args.mode);
    let frames = (args.seconds / FRAME_DT).max(0.0) as u32;
    let mut elapsed = 0.0;

    for _ in 0..frames {
        let player = pilot.steer(sim.runway(), sim.state().speed(), FRAME_DT, &mut pilot_rng);
        let events = sim.tick(&TickInput { player, pause: false }, FRAME_DT);
        audio::dispatch(&mut sink, &settings, &events);
        elapsed += FRAME_DT;

        visit_shop(&mut sim);

        if matches!(sim.state().status(), GameStatus::GameOver | GameStatus::Victory) {
            break;
        }
    }

    let state = sim.state();
    let mut review = MistakeReview::new();
    review.generate(state.status(), state.mistakes(), &RuleBasedExplainer);

    let summary = RunSummary {
        seed: sim.seed(),
        mode: state.mode(),
        status: state.status(),
        seconds: elapsed,
        score: state.score(),
        lives: state.lives(),
        max_lives: state.max_lives(),
        questions_answered: state.questions_answered(),
        gems_collected: state.gems_collected(),
        distance: sim.spawner().distance(),
        mistakes: state.mistakes().len(),
        sound_cues: sink.played.len(),
        explanations: review.explanations().values().cloned().collect(),
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize summary: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Spend score on survival when low on lives
fn visit_shop(sim: &mut Simulation) {
    let state = sim.state();
    let wants_heal = state.lives() == 1 && state.score() >= ShopItem::Heal.cost();
    let wants_shield = !state.inventory().has_immortality && state.score() >= 8000;
    if !(wants_heal || wants_shield) {
        return;
    }

    if !sim.open_shop() {
        return;
    }
    if wants_heal {
        sim.buy_item(ShopItem::Heal);
    }
    if wants_shield && sim.buy_item(ShopItem::Immortality) {
        sim.activate_immortality();
    }
    sim.close_shop();
}
