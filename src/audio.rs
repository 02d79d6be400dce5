//! Sound cues
//!
//! The simulation never plays audio itself. Game events map to sound
//! effects, which are handed to whatever `AudioSink` the host provides.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Gem picked up or correct door
    GemCollect,
    /// Mission letter picked up
    LetterCollect,
    /// Lost a life (obstacle or wrong door)
    Damage,
    /// Mission complete (challenge loop or victory)
    MissionComplete,
    /// Run ended
    GameOver,
    /// Shop purchase
    Purchase,
    /// Immortality switched on
    PowerUp,
}

impl SoundEffect {
    /// Cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CorrectAnswer { .. } | GameEvent::GemCollected { .. } => Some(Self::GemCollect),
            GameEvent::LetterCollected { .. } => Some(Self::LetterCollect),
            GameEvent::Damage => Some(Self::Damage),
            GameEvent::MissionLooped | GameEvent::Victory => Some(Self::MissionComplete),
            GameEvent::GameOver => Some(Self::GameOver),
            GameEvent::ItemPurchased(_) => Some(Self::Purchase),
            GameEvent::ImmortalityStarted => Some(Self::PowerUp),
            // A wrong door sounds through its Damage event, if any
            GameEvent::WrongAnswer | GameEvent::RunStarted(_) | GameEvent::ImmortalityEnded => None,
        }
    }
}

/// Something that can play a sound effect at a volume
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Route a frame's events to `sink`, honouring mute and volume
pub fn dispatch(sink: &mut dyn AudioSink, settings: &Settings, events: &[GameEvent]) {
    let volume = settings.effective_volume();
    if volume <= 0.0 {
        return;
    }
    for effect in events.iter().filter_map(SoundEffect::for_event) {
        sink.play(effect, volume);
    }
}

/// Headless sink: logs and counts cues
#[derive(Debug, Default)]
pub struct LogAudioSink {
    pub played: Vec<SoundEffect>,
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sfx {:?} at {:.2}", effect, volume);
        self.played.push(effect);
    }
}
