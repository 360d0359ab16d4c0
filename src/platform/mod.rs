//! Platform abstraction layer
//!
//! Seams for the collaborators the simulation does not own:
//! - Frame pacing at the target tick rate
//! - Input polling
//! - Sound playback ([`AudioSink`])
//! - Presenting snapshots

use std::time::{Duration, Instant};

use crate::sim::{FrameInput, Snapshot};

pub use crate::audio::AudioSink;

/// Draws a snapshot each frame
pub trait Renderer {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Reports the player's intents each frame
pub trait InputSource {
    fn poll(&mut self) -> FrameInput;
}

/// Paces ticks to a fixed rate.
///
/// When a tick finishes early the caller waits for the next boundary. A late
/// tick starts the next one immediately and reschedules from now; missed
/// ticks are dropped rather than run back to back.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(target_fps: u32, now: Instant) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            next: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// How long to wait before the next tick may start, advancing the schedule
    pub fn schedule(&mut self, now: Instant) -> Duration {
        if now < self.next {
            let wait = self.next - now;
            self.next += self.period;
            wait
        } else {
            self.next = now + self.period;
            Duration::ZERO
        }
    }

    /// Sleep until the next tick boundary
    pub fn wait(&mut self) {
        let wait = self.schedule(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_immediate() {
        let now = Instant::now();
        let mut clock = FrameClock::new(50, now);
        assert_eq!(clock.period(), Duration::from_millis(20));
        assert_eq!(clock.schedule(now), Duration::ZERO);
    }

    #[test]
    fn test_early_tick_waits_for_boundary() {
        let now = Instant::now();
        let mut clock = FrameClock::new(50, now);
        clock.schedule(now);

        // Tick took 5ms: wait the remaining 15ms
        assert_eq!(clock.schedule(now + Duration::from_millis(5)), Duration::from_millis(15));
        // Next boundary is 40ms after start
        assert_eq!(clock.schedule(now + Duration::from_millis(25)), Duration::from_millis(15));
    }

    #[test]
    fn test_late_tick_does_not_burst() {
        let now = Instant::now();
        let mut clock = FrameClock::new(50, now);
        clock.schedule(now);

        // 100ms stall: run immediately, then resume normal spacing
        let late = now + Duration::from_millis(100);
        assert_eq!(clock.schedule(late), Duration::ZERO);
        assert_eq!(
            clock.schedule(late + Duration::from_millis(1)),
            Duration::from_millis(19)
        );
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let clock = FrameClock::new(0, Instant::now());
        assert_eq!(clock.period(), Duration::from_secs(1));
    }
}
