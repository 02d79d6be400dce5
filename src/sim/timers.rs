//! Run-keyed one-shot timers
//!
//! Transient flags (answer feedback, damage flash, immortality) clear
//! themselves after a delay. Each timer remembers the run it was scheduled
//! in and the token of the flag it guards, so a timer from an earlier run
//! or an overwritten flag fires harmlessly.

use serde::Serialize;

/// Which flag a timer clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerKind {
    AnswerFeedback,
    DamageFlash,
    Immortality,
}

/// A scheduled reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timer {
    pub kind: TimerKind,
    /// Run the timer belongs to
    pub run_id: u32,
    /// Token of the flag value the timer was scheduled for
    pub token: u32,
    /// Clock time (seconds) at which it fires
    pub due: f64,
}

/// Pending timers, ordered by due time
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimerQueue {
    pending: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `due`
    pub fn schedule(&mut self, kind: TimerKind, run_id: u32, token: u32, due: f64) {
        let timer = Timer {
            kind,
            run_id,
            token,
            due,
        };
        let pos = self.pending.partition_point(|t| t.due <= due);
        self.pending.insert(pos, timer);
    }

    /// Drop every pending timer (run restart)
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending timers", self.pending.len());
        }
        self.pending.clear();
    }

    /// Remove and return timers due at or before `now`, earliest first
    pub fn take_due(&mut self, now: f64) -> Vec<Timer> {
        let split = self.pending.partition_point(|t| t.due <= now);
        self.pending.drain(..split).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
