//! Space Rocks - drifting, splitting rocks in a 2D arena
//!
//! Core modules:
//! - `sim`: Simulation (geometry, collisions, entity lifecycles, tick pipeline)
//! - `platform`: Collaborator seams (renderer, input) and frame pacing
//! - `settings`: Explicit, immutable game configuration
//! - `scoreboard`: Per-player tallies and standings
//! - `audio`: Sound selection for simulation events

pub mod audio;
pub mod platform;
pub mod scoreboard;
pub mod settings;
pub mod sim;

pub use scoreboard::Scoreboard;
pub use settings::{Settings, SettingsError};

/// Game configuration defaults
pub mod consts {
    /// Visible arena size in pixels
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Margin beyond the visible arena before entities are culled.
    /// Wider than the largest possible rock so nothing vanishes while partly onscreen.
    pub const BORDER: f32 = 100.0;

    /// Ticks per second
    pub const TARGET_FPS: u32 = 60;

    /// Rocks kept alive at once
    pub const ROCK_TARGET: usize = 20;

    /// Match length in seconds
    pub const MATCH_SECONDS: u64 = 60;

    /// Ship defaults
    pub const MAX_BULLETS: usize = 10;
    pub const SHIP_ROTATION_STEP: f32 = 10.0;
    pub const SHIP_LOSS_PENALTY: i64 = 100;

    /// Bullet speed in pixels per tick
    pub const BULLET_SPEED: f32 = 20.0;

    /// Rock polygon resolution
    pub const ROCK_VERTEX_COUNT: usize = 12;

    /// Ship explosion ring resolution
    pub const SHIP_PARTICLE_COUNT: usize = 72;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }
}
