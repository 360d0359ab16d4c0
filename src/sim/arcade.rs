//! Demo / match flow
//!
//! The arcade idles in a demo session until someone starts a 1 or 2 player
//! match. A match runs until its deadline or a quit request, then keeps
//! drifting on screen as the demo with the final scores shown. Quitting from
//! the demo ends the program.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::snapshot::Snapshot;
use super::state::{GameEvent, PlayerCount, Session, SessionMode};
use super::tick::{ShipInput, tick};
use crate::scoreboard::Standing;
use crate::settings::Settings;

/// Everything the input collaborator reports for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Per-player intents, player 1 first
    pub ships: [ShipInput; 2],
    pub start_one_player: bool,
    pub start_two_player: bool,
    /// Escape during a match, close from the demo
    pub quit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcadeStatus {
    Running,
    Quit,
}

/// Result of one arcade frame
#[derive(Debug, Clone)]
pub struct ArcadeFrame {
    pub status: ArcadeStatus,
    pub events: Vec<GameEvent>,
}

/// Owner of the current session
#[derive(Debug)]
pub struct Arcade {
    settings: Settings,
    session: Session,
    /// Seeds each new session
    seeds: Pcg32,
    last_results: Option<Vec<Standing>>,
}

impl Arcade {
    /// Start in demo mode, seeded from entropy.
    /// `settings` must pass [`Settings::validate`].
    pub fn new(settings: Settings, now: Instant) -> Self {
        Self::with_seed(settings, rand::random(), now)
    }

    /// Start in demo mode with a reproducible stream of sessions
    pub fn with_seed(settings: Settings, seed: u64, now: Instant) -> Self {
        let mut seeds = Pcg32::seed_from_u64(seed);
        let session = Session::seeded(
            settings.clone(),
            SessionMode::Demo,
            PlayerCount::One,
            now,
            seeds.random(),
        );
        Self {
            settings,
            session,
            seeds,
            last_results: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn in_match(&self) -> bool {
        self.session.mode == SessionMode::Match
    }

    /// Final standings of the most recent finished match
    pub fn last_results(&self) -> Option<&[Standing]> {
        self.last_results.as_deref()
    }

    /// Handle session-level intents, then run one tick
    pub fn update(&mut self, input: &FrameInput, now: Instant) -> ArcadeFrame {
        match self.session.mode {
            SessionMode::Demo => {
                if input.quit {
                    log::info!("Quit requested");
                    return ArcadeFrame {
                        status: ArcadeStatus::Quit,
                        events: Vec::new(),
                    };
                }
                if input.start_two_player {
                    self.start_match(PlayerCount::Two, now);
                } else if input.start_one_player {
                    self.start_match(PlayerCount::One, now);
                }
            }
            SessionMode::Match => {
                if input.quit || self.session.is_over(now) {
                    self.finish_match();
                }
            }
        }

        let events = tick(&mut self.session, &input.ships);
        ArcadeFrame {
            status: ArcadeStatus::Running,
            events,
        }
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot {
        self.session.snapshot(now)
    }

    fn start_match(&mut self, players: PlayerCount, now: Instant) {
        self.session = Session::seeded(
            self.settings.clone(),
            SessionMode::Match,
            players,
            now,
            self.seeds.random(),
        );
    }

    fn finish_match(&mut self) {
        let standings = self.session.scoreboard.standings();
        for standing in &standings {
            log::info!("#{} {}: {}", standing.rank, standing.name, standing.score);
        }
        self.last_results = Some(standings);
        self.session.end_match();
    }
}
