//! Sound selection for simulation events
//!
//! The simulation never plays anything itself. It reports [`GameEvent`]s and
//! an [`AudioSink`] decides how to voice them. Each effect owns one mixer
//! channel, so a new explosion cuts off the previous one instead of stacking.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// A rock started exploding
    RockExplosion,
    /// A bullet was fired
    Laser,
    /// A ship flew into a rock
    ShipExplosion,
}

impl SoundEffect {
    /// Number of mixer channels needed
    pub const CHANNELS: usize = 3;

    /// Mixer channel this effect plays on
    pub fn channel(&self) -> usize {
        match self {
            SoundEffect::RockExplosion => 0,
            SoundEffect::Laser => 1,
            SoundEffect::ShipExplosion => 2,
        }
    }

    /// Effect for an event, if it makes a sound
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::RockExploded { .. } => Some(SoundEffect::RockExplosion),
            GameEvent::BulletFired { .. } => Some(SoundEffect::Laser),
            GameEvent::ShipExploded { .. } => Some(SoundEffect::ShipExplosion),
            GameEvent::ShipRespawned { .. } => None,
        }
    }
}

/// Something that can play sound effects
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Voice every audible event, in order
pub fn play_events(sink: &mut impl AudioSink, events: &[GameEvent]) {
    for effect in events.iter().filter_map(SoundEffect::for_event) {
        sink.play(effect);
    }
}

/// Sink that writes effects to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: [u64; SoundEffect::CHANNELS],
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played[effect.channel()] += 1;
        log::debug!("channel {}: {:?}", effect.channel(), effect);
    }
}
