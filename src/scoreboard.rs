//! Per-match scoreboard
//!
//! Tallies score deltas and kills from simulation events and ranks players.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Running totals for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub name: String,
    pub score: i64,
    pub rocks_destroyed: u32,
    pub ships_lost: u32,
    pub bullets_fired: u32,
}

/// A ranked line of the final table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-indexed; tied scores share a rank
    pub rank: usize,
    pub name: String,
    pub score: i64,
}

/// Score tallies, indexed like the session's players
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub tallies: Vec<PlayerTally>,
}

impl Scoreboard {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            tallies: names
                .into_iter()
                .map(|name| PlayerTally {
                    name: name.into(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    /// Apply one event. Events naming unknown players are ignored.
    pub fn record(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::BulletFired { player } => {
                if let Some(tally) = self.tallies.get_mut(player) {
                    tally.bullets_fired += 1;
                }
            }
            GameEvent::RockExploded {
                shooter: Some(player),
                points,
                ..
            } => {
                if let Some(tally) = self.tallies.get_mut(player) {
                    tally.score += points;
                    tally.rocks_destroyed += 1;
                }
            }
            GameEvent::RockExploded { shooter: None, .. } => {}
            GameEvent::ShipExploded { .. } => {}
            GameEvent::ShipRespawned { player, penalty } => {
                if let Some(tally) = self.tallies.get_mut(player) {
                    tally.score -= penalty;
                    tally.ships_lost += 1;
                }
            }
        }
    }

    pub fn record_all<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Current score of a player
    pub fn score(&self, player: usize) -> Option<i64> {
        self.tallies.get(player).map(|t| t.score)
    }

    /// Players sorted by score, highest first
    pub fn standings(&self) -> Vec<Standing> {
        let mut sorted: Vec<&PlayerTally> = self.tallies.iter().collect();
        // Stable: equal scores keep player order
        sorted.sort_by(|a, b| b.score.cmp(&a.score));

        let mut standings: Vec<Standing> = Vec::with_capacity(sorted.len());
        for (i, tally) in sorted.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev) if prev.score == tally.score => prev.rank,
                _ => i + 1,
            };
            standings.push(Standing {
                rank,
                name: tally.name.clone(),
                score: tally.score,
            });
        }
        standings
    }

    /// The single highest scorer, or `None` on a tie or an empty board
    pub fn leader(&self) -> Option<&PlayerTally> {
        let best = self.tallies.iter().map(|t| t.score).max()?;
        let mut leaders = self.tallies.iter().filter(|t| t.score == best);
        let leader = leaders.next();
        if leaders.next().is_some() { None } else { leader }
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}
