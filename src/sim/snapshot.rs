//! Read-only view of a session for renderers
//!
//! Everything is already in screen coordinates so a renderer only draws.

use std::time::Instant;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Color, Session, SessionMode, SizeClass};

/// Colours for presentation
pub mod colors {
    use super::Color;

    pub const WHITE: Color = [255, 255, 255];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RockView {
    pub size: SizeClass,
    pub position: Vec2,
    /// Outline, closed (last joins first)
    pub vertices: Vec<Vec2>,
    pub exploding: bool,
    /// Debris positions while exploding, empty otherwise
    pub particles: Vec<Vec2>,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub player: usize,
    pub position: Vec2,
    pub vertices: Vec<Vec2>,
    pub exploding: bool,
    pub particles: Vec<Vec2>,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletView {
    pub position: Vec2,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreView {
    pub name: String,
    pub score: i64,
    pub color: Color,
}

/// One tick's worth of drawable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub rocks: Vec<RockView>,
    pub ships: Vec<ShipView>,
    pub bullets: Vec<BulletView>,
    pub scores: Vec<ScoreView>,
    /// Whole seconds left in the match, `None` in demo
    pub time_remaining_secs: Option<u64>,
    /// Demo sessions draw in outline/white
    pub monochrome: bool,
}

impl Snapshot {
    pub fn capture<R: Rng>(session: &Session<R>, now: Instant) -> Self {
        let settings = &session.settings;

        let rocks = session
            .rocks
            .iter()
            .map(|rock| RockView {
                size: rock.size,
                position: rock.position,
                vertices: rock.world_vertices(),
                exploding: rock.exploding,
                particles: if rock.exploding {
                    rock.explosion_particles(settings)
                } else {
                    Vec::new()
                },
                color: rock.color,
            })
            .collect();

        let ships = session
            .players
            .iter()
            .enumerate()
            .map(|(player, p)| ShipView {
                player,
                position: p.ship.position,
                vertices: p.ship.world_vertices(),
                exploding: p.ship.exploding,
                particles: if p.ship.exploding {
                    p.ship.explosion_positions(settings)
                } else {
                    Vec::new()
                },
                color: p.ship.color,
            })
            .collect();

        let bullets = session
            .players
            .iter()
            .flat_map(|p| p.ship.bullets.iter())
            .map(|b| BulletView {
                position: b.position,
                color: b.color,
            })
            .collect();

        let scores = session
            .players
            .iter()
            .map(|p| ScoreView {
                name: p.name.clone(),
                score: p.score,
                color: p.color,
            })
            .collect();

        Self {
            tick: session.time_ticks,
            rocks,
            ships,
            bullets,
            scores,
            time_remaining_secs: session
                .time_remaining(now)
                .map(|d| d.as_secs_f64().round() as u64),
            monochrome: session.mode == SessionMode::Demo,
        }
    }

    /// Colour to draw with, honouring monochrome
    pub fn paint(&self, color: Color) -> Color {
        if self.monochrome { colors::WHITE } else { color }
    }
}

impl<R: Rng> Session<R> {
    /// Capture the drawable state
    pub fn snapshot(&self, now: Instant) -> Snapshot {
        Snapshot::capture(self, now)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::PlayerCount;

    #[test]
    fn test_snapshot_of_match() {
        let now = Instant::now();
        let mut session =
            Session::seeded(Settings::default(), SessionMode::Match, PlayerCount::Two, now, 12);
        let settings = session.settings.clone();
        session.players[0].ship.fire(&settings);
        session.players[1].ship.explode();
        session.players[1].ship.explosion_step = 30;

        let snap = session.snapshot(now + Duration::from_millis(10_400));
        assert_eq!(snap.rocks.len(), settings.rock_target);
        assert!(snap.rocks.iter().all(|r| r.vertices.len() == 12 && r.particles.is_empty()));
        assert_eq!(snap.ships.len(), 2);
        assert!(snap.ships[0].particles.is_empty());
        assert!(!snap.ships[1].particles.is_empty());
        assert_eq!(snap.bullets.len(), 1);
        assert_eq!(snap.scores[1].name, "Player 2");
        assert_eq!(snap.time_remaining_secs, Some(50));
        assert!(!snap.monochrome);
        assert_eq!(snap.paint(snap.ships[1].color), [0, 255, 0]);
    }

    #[test]
    fn test_snapshot_of_demo_is_monochrome() {
        let session = Session::demo(Settings::default());
        let snap = session.snapshot(Instant::now());
        assert!(snap.monochrome);
        assert_eq!(snap.time_remaining_secs, None);
        assert_eq!(snap.ships[0].vertices.len(), 4);
        assert_eq!(snap.paint(snap.ships[0].color), colors::WHITE);
    }

    #[test]
    fn test_exploding_rock_debris_spreads() {
        let mut session = Session::seeded(
            Settings::default(),
            SessionMode::Demo,
            PlayerCount::One,
            Instant::now(),
            4,
        );
        session.rocks.truncate(1);
        session.rocks[0].position = Vec2::new(400.0, 300.0);
        session.rocks[0].explode();
        session.rocks[0].explosion_step = 24;

        let snap = session.snapshot(Instant::now());
        let rock = &snap.rocks[0];
        // 5 * 24 / 60 = 2x the outline
        for (debris, outline) in rock.particles.iter().zip(&rock.vertices) {
            let spread = (*debris - rock.position).length();
            let radius = (*outline - rock.position).length();
            assert!((spread - 2.0 * radius).abs() < 1e-2);
        }
    }
}
