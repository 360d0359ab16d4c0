//! Game settings
//!
//! One immutable value handed to every constructor and tick. Loaded from an
//! optional JSON file; missing keys fall back to [`crate::consts`].

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Visible arena width in pixels
    pub screen_width: f32,
    /// Visible arena height in pixels
    pub screen_height: f32,
    /// Margin beyond the visible arena where entities spawn and die
    pub border: f32,

    // === Pacing ===
    /// Ticks per second. Animation lengths and drift speeds scale with it.
    pub target_fps: u32,
    /// Match length in seconds
    pub match_seconds: u64,

    // === Population ===
    /// Rocks the session tries to keep alive
    pub rock_target: usize,

    // === Ships ===
    /// Live bullets allowed per ship
    pub max_bullets: usize,
    /// Bullet speed in pixels per tick
    pub bullet_speed: f32,
    /// Degrees turned per rotate intent
    pub ship_rotation_step: f32,
    /// Score lost when a ship is destroyed
    pub ship_loss_penalty: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            border: BORDER,

            target_fps: TARGET_FPS,
            match_seconds: MATCH_SECONDS,

            rock_target: ROCK_TARGET,

            max_bullets: MAX_BULLETS,
            bullet_speed: BULLET_SPEED,
            ship_rotation_step: SHIP_ROTATION_STEP,
            ship_loss_penalty: SHIP_LOSS_PENALTY,
        }
    }
}

impl Settings {
    /// Centre of the visible arena
    pub fn screen_centre(&self) -> Vec2 {
        Vec2::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }

    #[inline]
    pub fn left_dead(&self) -> f32 {
        -self.border
    }

    #[inline]
    pub fn right_dead(&self) -> f32 {
        self.screen_width + self.border
    }

    #[inline]
    pub fn top_dead(&self) -> f32 {
        -self.border
    }

    #[inline]
    pub fn bottom_dead(&self) -> f32 {
        self.screen_height + self.border
    }

    /// True when a point lies in the dead zone (strictly outside arena + border)
    pub fn is_dead(&self, pos: Vec2) -> bool {
        pos.x < self.left_dead()
            || pos.x > self.right_dead()
            || pos.y < self.top_dead()
            || pos.y > self.bottom_dead()
    }

    /// Target tick rate as a float, for per-tick scaling
    #[inline]
    pub fn fps(&self) -> f32 {
        self.target_fps as f32
    }

    /// Check that every value is usable by the simulation
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.target_fps == 0 {
            return Err(SettingsError::invalid("target_fps", 0.0, "must be at least 1"));
        }
        if self.screen_width <= 0.0 || !self.screen_width.is_finite() {
            return Err(SettingsError::invalid(
                "screen_width",
                self.screen_width as f64,
                "must be positive",
            ));
        }
        if self.screen_height <= 0.0 || !self.screen_height.is_finite() {
            return Err(SettingsError::invalid(
                "screen_height",
                self.screen_height as f64,
                "must be positive",
            ));
        }
        if self.border < 0.0 || !self.border.is_finite() {
            return Err(SettingsError::invalid(
                "border",
                self.border as f64,
                "must not be negative",
            ));
        }
        if self.max_bullets == 0 {
            return Err(SettingsError::invalid("max_bullets", 0.0, "must be at least 1"));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// Errors raised while loading settings
#[derive(Debug)]
pub enum SettingsError {
    /// Settings file could not be read
    Io(std::io::Error),
    /// Settings file is not valid JSON for [`Settings`]
    Parse(serde_json::Error),
    /// A value is outside its usable range
    Invalid {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl SettingsError {
    fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        SettingsError::Invalid {
            name,
            value,
            reason,
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "could not read settings: {}", e),
            SettingsError::Parse(e) => write!(f, "could not parse settings: {}", e),
            SettingsError::Invalid {
                name,
                value,
                reason,
            } => write!(f, "setting '{}' = {} {}", name, value, reason),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}
