//! Game state and the run state machine
//!
//! `GameState` is the single owner of score, lives, speed, streak, letters,
//! inventory and the mistake log. Every change goes through one of the
//! named operations below; collaborators only read it.

use rand::Rng;
use serde::Serialize;

use super::questions::{self, AnswerOption, Question};
use super::shop::{self, ShopItem};
use super::timers::{TimerKind, TimerQueue};
use crate::consts::*;

/// Top-level screen / run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    Shop,
    GameOver,
    Victory,
    ArtRoom,
}

/// Normal runs end when the mission is complete; challenge runs loop it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GameMode {
    #[default]
    Normal,
    Challenge,
}

/// Result of the last door, shown briefly on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnswerFeedback {
    Correct,
    Wrong,
}

/// Unlocks and the transient immortality effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Inventory {
    pub has_double_jump: bool,
    pub has_immortality: bool,
    pub immortality_active: bool,
}

/// A wrong answer, kept for the post-game review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mistake {
    pub question: Question,
    pub selected_answer: String,
}

/// Discrete things that happened, for audio and HUD collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    RunStarted(GameMode),
    CorrectAnswer { streak: u32 },
    WrongAnswer,
    Damage,
    GemCollected { points: u32 },
    LetterCollected { letter: char, duplicate: bool },
    /// All mission letters collected in challenge mode
    MissionLooped,
    Victory,
    GameOver,
    ItemPurchased(ShopItem),
    ImmortalityStarted,
    ImmortalityEnded,
}

/// Complete run state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    status: GameStatus,
    mode: GameMode,
    score: u64,
    lives: u32,
    max_lives: u32,
    speed: f32,
    /// Consecutive correct answers
    streak: u32,
    questions_answered: u32,
    gems_collected: u32,
    /// Distance snapshot taken when the run ends
    distance: u64,

    current_question: Option<Question>,
    current_options: Vec<AnswerOption>,
    used_questions: Vec<String>,
    last_answer: Option<AnswerFeedback>,
    last_damage_at: Option<f64>,

    collected_letters: Vec<char>,
    inventory: Inventory,
    mistakes: Vec<Mistake>,

    /// Incremented on every run start; timers from older runs are ignored
    run_id: u32,
    /// Seconds since the state was created
    clock: f64,
    timers: TimerQueue,
    feedback_token: u32,
    damage_token: u32,
    immortality_token: u32,

    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A fresh state sitting on the menu
    pub fn new() -> Self {
        Self {
            status: GameStatus::Menu,
            mode: GameMode::Normal,
            score: 0,
            lives: STARTING_LIVES,
            max_lives: STARTING_LIVES,
            speed: 0.0,
            streak: 0,
            questions_answered: 0,
            gems_collected: 0,
            distance: 0,
            current_question: None,
            current_options: Vec::new(),
            used_questions: Vec::new(),
            last_answer: None,
            last_damage_at: None,
            collected_letters: Vec::new(),
            inventory: Inventory::default(),
            mistakes: Vec::new(),
            run_id: 0,
            clock: 0.0,
            timers: TimerQueue::new(),
            feedback_token: 0,
            damage_token: 0,
            immortality_token: 0,
            events: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn gems_collected(&self) -> u32 {
        self.gems_collected
    }

    pub fn distance(&self) -> u64 {
        self.distance
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn current_options(&self) -> &[AnswerOption] {
        &self.current_options
    }

    pub fn used_questions(&self) -> &[String] {
        &self.used_questions
    }

    pub fn last_answer(&self) -> Option<AnswerFeedback> {
        self.last_answer
    }

    /// Clock time of the last damage, while the flash is showing
    pub fn last_damage_at(&self) -> Option<f64> {
        self.last_damage_at
    }

    pub fn collected_letters(&self) -> &[char] {
        &self.collected_letters
    }

    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    pub fn run_id(&self) -> u32 {
        self.run_id
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Items the shop currently offers
    pub fn shop_offers(&self) -> Vec<ShopItem> {
        shop::offers(&self.inventory)
    }

    /// Take the events produced since the last call
    pub(crate) fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Run lifecycle ===

    /// Reset every run-scoped value and start playing
    pub(crate) fn start_game<R: Rng>(&mut self, mode: GameMode, rng: &mut R) {
        self.run_id = self.run_id.wrapping_add(1);
        self.timers.cancel_all();

        self.status = GameStatus::Playing;
        self.mode = mode;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.max_lives = STARTING_LIVES;
        self.speed = RUN_SPEED_BASE;
        self.streak = 0;
        self.questions_answered = 0;
        self.gems_collected = 0;
        self.distance = 0;
        self.current_question = None;
        self.current_options.clear();
        self.used_questions.clear();
        self.last_answer = None;
        self.last_damage_at = None;
        self.collected_letters.clear();
        self.inventory = Inventory::default();
        self.mistakes.clear();

        log::info!("Run {} started ({:?} mode)", self.run_id, mode);
        self.events.push(GameEvent::RunStarted(mode));
        self.next_question(rng);
    }

    /// Start again in the current mode
    pub(crate) fn restart_game<R: Rng>(&mut self, rng: &mut R) {
        self.start_game(self.mode, rng);
    }

    /// Choose the next question for the current score and mode
    pub(crate) fn next_question<R: Rng>(&mut self, rng: &mut R) {
        let question = questions::select_next(self.score, self.mode, &mut self.used_questions, rng);
        self.current_options = questions::shuffled_options(&question, rng);
        self.current_question = Some(question);
    }

    pub fn toggle_pause(&mut self) {
        match self.status {
            GameStatus::Playing => self.status = GameStatus::Paused,
            GameStatus::Paused => self.status = GameStatus::Playing,
            other => log::warn!("Pause ignored in {:?}", other),
        }
    }

    pub fn open_shop(&mut self) -> bool {
        self.transition(GameStatus::Playing, GameStatus::Shop)
    }

    pub fn close_shop(&mut self) -> bool {
        self.transition(GameStatus::Shop, GameStatus::Playing)
    }

    pub fn open_art_room(&mut self) -> bool {
        self.transition(GameStatus::Menu, GameStatus::ArtRoom)
    }

    pub fn close_art_room(&mut self) -> bool {
        self.transition(GameStatus::ArtRoom, GameStatus::Menu)
    }

    /// Leave a paused or finished run for the menu
    pub(crate) fn return_to_menu(&mut self) -> bool {
        match self.status {
            GameStatus::Paused | GameStatus::GameOver | GameStatus::Victory => {
                self.status = GameStatus::Menu;
                self.speed = 0.0;
                true
            }
            other => {
                log::warn!("Cannot return to menu from {:?}", other);
                false
            }
        }
    }

    fn transition(&mut self, from: GameStatus, to: GameStatus) -> bool {
        if self.status != from {
            log::warn!("Rejected transition {:?} -> {:?} (status is {:?})", from, to, self.status);
            return false;
        }
        self.status = to;
        true
    }

    /// Record how far the finished run went
    pub(crate) fn record_distance(&mut self, distance: f32) {
        self.distance = distance.max(0.0).floor() as u64;
    }

    // === Outcomes ===

    /// A door was hit. `selected` is the text shown on the door.
    pub(crate) fn handle_door_hit<R: Rng>(&mut self, is_correct: bool, selected: &str, rng: &mut R) {
        if is_correct {
            self.answer_correct(rng);
        } else {
            self.answer_wrong(selected);
        }
    }

    fn answer_correct<R: Rng>(&mut self, rng: &mut R) {
        self.set_answer_feedback(AnswerFeedback::Correct);

        self.streak += 1;
        let streak_bonus = self.streak.min(STREAK_BONUS_CAP) as u64 * STREAK_BONUS;
        // Cap depends on the score before this answer
        let cap = self.speed_cap();
        self.score += CORRECT_ANSWER_SCORE + streak_bonus;
        self.questions_answered += 1;

        if self.speed < cap {
            self.speed = (self.speed + 0.2 + self.streak as f32 * 0.05).min(cap);
        }

        self.events.push(GameEvent::CorrectAnswer { streak: self.streak });
        self.next_question(rng);
    }

    fn answer_wrong(&mut self, selected: &str) {
        self.set_answer_feedback(AnswerFeedback::Wrong);

        if let Some(question) = self.current_question {
            self.mistakes.push(Mistake {
                question,
                selected_answer: selected.to_string(),
            });
        }

        self.events.push(GameEvent::WrongAnswer);
        self.take_damage();
        self.streak = 0;
        // A lethal wrong answer leaves the run stopped
        if self.status != GameStatus::GameOver {
            self.speed = (self.speed - WRONG_ANSWER_SLOWDOWN).max(RUN_SPEED_BASE);
        }
    }

    fn speed_cap(&self) -> f32 {
        match self.mode {
            GameMode::Challenge => SPEED_CAP_CHALLENGE,
            GameMode::Normal if self.score > TIER_3_SCORE => SPEED_CAP_NORMAL_HIGH,
            GameMode::Normal => SPEED_CAP_NORMAL,
        }
    }

    /// Lose a life, or end the run on the last one
    pub(crate) fn take_damage(&mut self) {
        if self.inventory.immortality_active {
            return;
        }

        self.damage_token = self.damage_token.wrapping_add(1);
        self.last_damage_at = Some(self.clock);
        self.timers.schedule(
            TimerKind::DamageFlash,
            self.run_id,
            self.damage_token,
            self.clock + DAMAGE_FLASH_SECS,
        );
        self.events.push(GameEvent::Damage);

        if self.lives > 1 {
            self.lives -= 1;
        } else {
            self.lives = 0;
            self.speed = 0.0;
            if self.status != GameStatus::GameOver {
                log::info!("Game over: score {}", self.score);
                self.events.push(GameEvent::GameOver);
            }
            self.status = GameStatus::GameOver;
        }
    }

    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
    }

    pub(crate) fn collect_gem(&mut self, points: u32) {
        self.score += points as u64;
        self.gems_collected += 1;
        self.events.push(GameEvent::GemCollected { points });
    }

    /// Pick up a mission letter
    pub(crate) fn collect_letter(&mut self, letter: char) {
        if self.collected_letters.contains(&letter) {
            self.score += DUPLICATE_LETTER_BONUS;
            self.events.push(GameEvent::LetterCollected {
                letter,
                duplicate: true,
            });
            return;
        }

        debug_assert!(TARGET_LETTERS.contains(&letter), "unknown mission letter {letter}");
        self.collected_letters.push(letter);
        self.score += LETTER_BONUS;
        self.events.push(GameEvent::LetterCollected {
            letter,
            duplicate: false,
        });

        let complete = TARGET_LETTERS
            .iter()
            .all(|l| self.collected_letters.contains(l));
        if !complete {
            return;
        }

        match self.mode {
            GameMode::Normal => {
                log::info!("Mission complete: victory with score {}", self.score);
                self.status = GameStatus::Victory;
                self.speed = 0.0;
                self.events.push(GameEvent::Victory);
            }
            GameMode::Challenge => {
                self.collected_letters.clear();
                self.score += MISSION_BONUS;
                self.lives = (self.lives + 1).min(self.max_lives);
                log::info!("Mission looped: score {}, lives {}", self.score, self.lives);
                self.events.push(GameEvent::MissionLooped);
            }
        }
    }

    // === Shop / abilities ===

    /// Buy `item` with score. Returns false (and changes nothing) when the
    /// item is unaffordable or already owned.
    pub fn buy_item(&mut self, item: ShopItem) -> bool {
        if self.score < item.cost() || (item.one_time() && item.owned(&self.inventory)) {
            return false;
        }

        self.score -= item.cost();
        match item {
            ShopItem::DoubleJump => self.inventory.has_double_jump = true,
            ShopItem::MaxLife => {
                self.max_lives += 1;
                self.lives += 1;
            }
            ShopItem::Heal => self.lives = (self.lives + 1).min(self.max_lives),
            ShopItem::Immortality => self.inventory.has_immortality = true,
        }

        log::info!("Bought {} for {}", item.name(), item.cost());
        self.events.push(GameEvent::ItemPurchased(item));
        true
    }

    /// Start the invincibility window. Returns false when not owned or
    /// already active.
    pub fn activate_immortality(&mut self) -> bool {
        if !self.inventory.has_immortality || self.inventory.immortality_active {
            return false;
        }

        self.inventory.immortality_active = true;
        self.immortality_token = self.immortality_token.wrapping_add(1);
        self.timers.schedule(
            TimerKind::Immortality,
            self.run_id,
            self.immortality_token,
            self.clock + IMMORTALITY_SECS,
        );
        self.events.push(GameEvent::ImmortalityStarted);
        true
    }

    // === Timers ===

    fn set_answer_feedback(&mut self, feedback: AnswerFeedback) {
        self.last_answer = Some(feedback);
        self.feedback_token = self.feedback_token.wrapping_add(1);
        self.timers.schedule(
            TimerKind::AnswerFeedback,
            self.run_id,
            self.feedback_token,
            self.clock + ANSWER_FEEDBACK_SECS,
        );
    }

    /// Advance the clock and fire any timers that came due
    pub(crate) fn advance_clock(&mut self, dt: f64) {
        self.clock += dt.max(0.0);

        for timer in self.timers.take_due(self.clock) {
            if timer.run_id != self.run_id {
                continue;
            }
            match timer.kind {
                TimerKind::AnswerFeedback if timer.token == self.feedback_token => {
                    self.last_answer = None;
                }
                TimerKind::DamageFlash if timer.token == self.damage_token => {
                    self.last_damage_at = None;
                }
                TimerKind::Immortality if timer.token == self.immortality_token => {
                    if self.inventory.immortality_active {
                        self.inventory.immortality_active = false;
                        self.events.push(GameEvent::ImmortalityEnded);
                    }
                }
                _ => {}
            }
        }
    }
}
