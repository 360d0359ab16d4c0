//! Fixed-rate simulation tick
//!
//! Advances every entity one step, resolves collisions, runs explosions and
//! culls what has left the arena. Removal is always two-phase: entities are
//! flagged while iterating and evicted afterwards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, Rock, Session, SessionMode, SizeClass};

/// One player's intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipInput {
    /// Turn anticlockwise
    pub rotate_left: bool,
    /// Turn clockwise
    pub rotate_right: bool,
    pub fire: bool,
}

/// Advance the session by one tick.
///
/// `inputs[i]` drives player `i`; missing entries mean no input. Input and
/// collisions are ignored in demo sessions.
pub fn tick<R: Rng>(session: &mut Session<R>, inputs: &[ShipInput]) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let collisions = session.collisions_enabled();

    let Session {
        settings,
        mode,
        rocks,
        players,
        scoreboard,
        time_ticks,
        rng,
        ..
    } = session;

    // Player intents
    if *mode == SessionMode::Match {
        for (index, (player, input)) in players.iter_mut().zip(inputs).enumerate() {
            let ship = &mut player.ship;
            if input.rotate_left {
                ship.rotate_anticlockwise(settings.ship_rotation_step);
            }
            if input.rotate_right {
                ship.rotate_clockwise(settings.ship_rotation_step);
            }
            if input.fire && ship.fire(settings) {
                events.push(GameEvent::BulletFired { player: index });
            }
        }
    }

    // Ships and their bullets
    for (index, player) in players.iter_mut().enumerate() {
        if player.ship.exploding {
            player.ship.animate_explosion(settings, rng);
        }

        if player.ship.kill {
            let penalty = player.lost_a_ship(settings, rng);
            log::info!("{} lost a ship ({} points)", player.name, -penalty);
            events.push(GameEvent::ShipRespawned {
                player: index,
                penalty,
            });
        }

        for bullet in &mut player.ship.bullets {
            bullet.advance();
            bullet.check_onscreen(settings);
        }
        evict_bullets(&player.name, &mut player.ship.bullets);
    }

    // Rocks drift and spin
    for rock in rocks.iter_mut() {
        rock.advance();
        rock.check_onscreen(settings);
    }

    if collisions {
        // Bullets vs rocks. A spent bullet can't hit a second rock.
        for rock in rocks.iter_mut() {
            if rock.exploding || rock.kill {
                continue;
            }
            for (index, player) in players.iter_mut().enumerate() {
                let hit = player
                    .ship
                    .bullets
                    .iter_mut()
                    .find(|b| !b.kill && rock.contains_point(b.position));
                if let Some(bullet) = hit {
                    bullet.kill = true;
                    rock.explode();
                    let points = player.killed_a_rock(rock.size);
                    events.push(GameEvent::RockExploded {
                        size: rock.size,
                        shooter: Some(index),
                        points,
                    });
                    break;
                }
            }
        }

        // Ships vs rocks
        for rock in rocks.iter_mut() {
            if rock.exploding || rock.kill {
                continue;
            }
            for (index, player) in players.iter_mut().enumerate() {
                if player.ship.exploding || !rock.contains_point(player.ship.position) {
                    continue;
                }
                if !rock.exploding {
                    rock.explode();
                    events.push(GameEvent::RockExploded {
                        size: rock.size,
                        shooter: None,
                        points: 0,
                    });
                }
                player.ship.explode();
                events.push(GameEvent::ShipExploded { player: index });
            }
        }
    }

    // Explosions; big rocks split halfway through
    let mut children = Vec::new();
    for rock in rocks.iter_mut().filter(|r| r.exploding) {
        children.extend(rock.animate_explosion(settings, rng));
    }
    rocks.extend(children);

    // Evict spent bullets and dead rocks
    for player in players.iter_mut() {
        evict_bullets(&player.name, &mut player.ship.bullets);
    }

    let (removed, mut survivors): (Vec<Rock>, Vec<Rock>) =
        std::mem::take(rocks).into_iter().partition(|r| r.kill);
    let mut pending = removed.len();
    for rock in removed {
        let live = survivors.len() + pending;
        if rock.exploding {
            // Destroyed: top up with a fresh large rock when running low
            if live <= settings.rock_target {
                survivors.push(Rock::spawn_at_edge(SizeClass::Large, settings, rng));
            }
        } else {
            // Drifted away: replace like for like
            survivors.push(Rock::spawn_at_edge(rock.size, settings, rng));
        }
        pending -= 1;
        log::debug!(
            "{} rock removed, rocks left={}",
            rock.size.as_str(),
            survivors.len() + pending
        );
    }
    *rocks = survivors;

    scoreboard.record_all(&events);
    *time_ticks += 1;

    events
}

/// Drop bullets flagged for removal
fn evict_bullets(owner: &str, bullets: &mut Vec<super::state::Bullet>) {
    let before = bullets.len();
    bullets.retain(|b| !b.kill);
    if bullets.len() != before {
        log::debug!("Bullet removed, bullets left for {} = {}", owner, bullets.len());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::{Bullet, PlayerCount};

    fn match_session(settings: Settings, seed: u64) -> Session {
        Session::seeded(settings, SessionMode::Match, PlayerCount::One, Instant::now(), seed)
    }

    /// A motionless rock of `size` at `pos`
    fn parked_rock(session: &mut Session, size: SizeClass, pos: Vec2) -> Rock {
        let settings = session.settings.clone();
        let mut rock = Rock::new(size, &settings, session.rng());
        rock.position = pos;
        rock
    }

    #[test]
    fn test_demo_keeps_population_and_ignores_input() {
        let settings = Settings::default();
        let target = settings.rock_target;
        let mut session = Session::seeded(
            settings,
            SessionMode::Demo,
            PlayerCount::One,
            Instant::now(),
            3,
        );

        let fire = [ShipInput {
            fire: true,
            rotate_left: true,
            ..Default::default()
        }];
        for _ in 0..2000 {
            let events = tick(&mut session, &fire);
            assert!(events.is_empty());
            assert_eq!(session.rocks.len(), target);
        }
        assert_eq!(session.bullet_count(), 0);
        assert_eq!(session.players[0].ship.rotation, 0.0);
        assert!(session.rocks.iter().all(|r| !r.exploding));
        assert_eq!(session.time_ticks, 2000);
    }

    #[test]
    fn test_population_never_drops_below_target() {
        let settings = Settings::default();
        let target = settings.rock_target;
        let mut session = match_session(settings, 11);
        let input = [ShipInput {
            rotate_right: true,
            fire: true,
            ..Default::default()
        }];

        let mut destroyed = 0;
        for _ in 0..5000 {
            let events = tick(&mut session, &input);
            destroyed += events
                .iter()
                .filter(|e| matches!(e, GameEvent::RockExploded { .. }))
                .count();
            assert!(session.rocks.len() >= target);
            assert!(session.rocks.iter().all(|r| !r.kill));
        }
        assert!(destroyed > 0, "autopilot never hit anything");
    }

    #[test]
    fn test_destroying_large_rock_leaves_two_mediums() {
        let settings = Settings {
            rock_target: 1,
            ..Default::default()
        };
        let fps = settings.target_fps;
        let mut session = match_session(settings, 5);

        let target = Vec2::new(200.0, 150.0);
        let rock = parked_rock(&mut session, SizeClass::Large, target);
        session.rocks = vec![rock];

        // Lands on the rock's centre after one tick of movement
        let mut bullet = Bullet::new(Vec2::ZERO, 90.0, session.settings.bullet_speed, [255, 0, 0]);
        bullet.position = target - bullet.drift;
        session.players[0].ship.bullets.push(bullet);

        let events = tick(&mut session, &[]);
        assert_eq!(
            events,
            vec![GameEvent::RockExploded {
                size: SizeClass::Large,
                shooter: Some(0),
                points: 10,
            }]
        );
        assert_eq!(session.players[0].score, 10);
        assert_eq!(session.scoreboard.score(0), Some(10));
        assert_eq!(session.bullet_count(), 0);

        for _ in 0..fps {
            tick(&mut session, &[]);
        }

        assert!(session.rocks.iter().all(|r| r.size != SizeClass::Large));
        let mediums = session
            .rocks
            .iter()
            .filter(|r| r.size == SizeClass::Medium)
            .count();
        assert_eq!(mediums, 2);
        assert_eq!(session.rocks.len(), 2);
        assert_eq!(session.players[0].score, 10);
    }

    #[test]
    fn test_bullet_hits_only_one_rock() {
        let settings = Settings {
            rock_target: 0,
            ..Default::default()
        };
        let mut session = match_session(settings, 9);
        let target = Vec2::new(150.0, 150.0);
        let first = parked_rock(&mut session, SizeClass::Small, target);
        let second = parked_rock(&mut session, SizeClass::Small, target);
        session.rocks = vec![first, second];

        let mut bullet = Bullet::new(Vec2::ZERO, 90.0, session.settings.bullet_speed, [255, 0, 0]);
        bullet.position = target - bullet.drift;
        session.players[0].ship.bullets.push(bullet);

        tick(&mut session, &[]);
        assert_eq!(session.rocks.iter().filter(|r| r.exploding).count(), 1);
        assert_eq!(session.players[0].score, 30);
    }

    /// Two bullets heading out along `heading`: one starts 10px inside the
    /// dead line, one 20px inside. The first must go on tick 1, the second
    /// (landing exactly on the line) on tick 2.
    fn assert_culled_on_crossing(heading: f32, near: Vec2, far: Vec2) {
        let settings = Settings {
            rock_target: 0,
            ..Default::default()
        };
        let mut session = match_session(settings, 1);

        let mut first = Bullet::new(Vec2::ZERO, heading, 20.0, [255, 0, 0]);
        first.position = near;
        let mut second = first.clone();
        second.position = far;
        session.players[0].ship.bullets = vec![first, second];

        tick(&mut session, &[]);
        let left = &session.players[0].ship.bullets;
        assert_eq!(left.len(), 1, "heading {heading}: near bullet should be culled");
        assert!((left[0].position - (far + left[0].drift)).length() < 1e-3);

        tick(&mut session, &[]);
        assert!(
            session.players[0].ship.bullets.is_empty(),
            "heading {heading}: far bullet should be culled"
        );
    }

    #[test]
    fn test_bullet_culled_on_crossing_tick() {
        let settings = Settings::default();

        // Right
        let x = settings.right_dead();
        assert_culled_on_crossing(90.0, Vec2::new(x - 10.0, 300.0), Vec2::new(x - 20.0, 500.0));
        // Left
        let x = settings.left_dead();
        assert_culled_on_crossing(270.0, Vec2::new(x + 10.0, 300.0), Vec2::new(x + 20.0, 500.0));
        // Bottom
        let y = settings.bottom_dead();
        assert_culled_on_crossing(0.0, Vec2::new(200.0, y - 10.0), Vec2::new(600.0, y - 20.0));
        // Top
        let y = settings.top_dead();
        assert_culled_on_crossing(180.0, Vec2::new(200.0, y + 10.0), Vec2::new(600.0, y + 20.0));
    }

    #[test]
    fn test_large_rock_splits_at_one_fps() {
        let settings = Settings {
            target_fps: 1,
            rock_target: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        let mut session = match_session(settings, 8);

        let target = Vec2::new(200.0, 150.0);
        let rock = parked_rock(&mut session, SizeClass::Large, target);
        session.rocks = vec![rock];

        let mut bullet = Bullet::new(Vec2::ZERO, 90.0, session.settings.bullet_speed, [255, 0, 0]);
        bullet.position = target - bullet.drift;
        session.players[0].ship.bullets.push(bullet);

        let events = tick(&mut session, &[]);
        assert_eq!(
            events,
            vec![GameEvent::RockExploded {
                size: SizeClass::Large,
                shooter: Some(0),
                points: 10,
            }]
        );
        // Halfway is the very first explosion step at 1 fps
        assert_eq!(session.rocks.len(), 3);

        // Parent finishes on the next tick and is not topped up (target 0)
        tick(&mut session, &[]);
        assert_eq!(session.rocks.len(), 2);
        assert!(session.rocks.iter().all(|r| r.size == SizeClass::Medium));
        assert_eq!(session.players[0].score, 10);
    }

    #[test]
    fn test_fire_cap_through_tick() {
        let settings = Settings {
            rock_target: 0,
            ..Default::default()
        };
        let max = settings.max_bullets;
        let mut session = match_session(settings, 2);
        let fire = [ShipInput {
            fire: true,
            ..Default::default()
        }];

        for _ in 0..max {
            tick(&mut session, &fire);
        }
        assert_eq!(session.bullet_count(), max);

        let events = tick(&mut session, &fire);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BulletFired { .. })));
        assert_eq!(session.bullet_count(), max);
    }

    #[test]
    fn test_exploding_ship_ignores_rotate_intents() {
        let settings = Settings {
            rock_target: 0,
            ..Default::default()
        };
        let mut session = match_session(settings, 4);
        session.players[0].ship.rotation = 30.0;
        session.players[0].ship.explode();

        let spin = [ShipInput {
            rotate_left: true,
            rotate_right: false,
            fire: false,
        }];
        for _ in 0..10 {
            tick(&mut session, &spin);
            assert_eq!(session.players[0].ship.rotation, 30.0);
        }
    }

    #[test]
    fn test_ship_collision_and_respawn_penalty() {
        let settings = Settings {
            rock_target: 0,
            ..Default::default()
        };
        let fps = settings.target_fps;
        let mut session = match_session(settings, 8);
        let ship_pos = session.players[0].ship.position;
        let rock = parked_rock(&mut session, SizeClass::Small, ship_pos);
        session.rocks = vec![rock];

        let events = tick(&mut session, &[]);
        assert!(events.contains(&GameEvent::ShipExploded { player: 0 }));
        assert!(session.players[0].ship.exploding);

        let mut respawned = false;
        for _ in 0..(4 * fps + 1) {
            let events = tick(&mut session, &[]);
            if events.contains(&GameEvent::ShipRespawned {
                player: 0,
                penalty: 100,
            }) {
                respawned = true;
            }
        }
        assert!(respawned);
        assert_eq!(session.players[0].score, -100);
        assert_eq!(session.scoreboard.score(0), Some(-100));
        assert!(!session.players[0].ship.exploding);
        assert_eq!(session.players[0].ship.position, ship_pos);
    }

    #[test]
    fn test_culled_rock_replaced_with_same_size() {
        let settings = Settings {
            rock_target: 1,
            ..Default::default()
        };
        let mut session = match_session(settings, 6);
        let edge = Vec2::new(session.settings.right_dead(), 50.0);
        let mut rock = parked_rock(&mut session, SizeClass::Medium, edge);
        rock.drift = Vec2::new(5.0, 0.0);
        session.rocks = vec![rock];

        tick(&mut session, &[]);
        assert_eq!(session.rocks.len(), 1);
        assert_eq!(session.rocks[0].size, SizeClass::Medium);
        assert!(!session.settings.is_dead(session.rocks[0].position));
    }

    #[test]
    fn test_seeded_sessions_match() {
        let input = [ShipInput {
            rotate_left: true,
            fire: true,
            ..Default::default()
        }];
        let mut a = match_session(Settings::default(), 77);
        let mut b = Session::with_rng(
            Settings::default(),
            SessionMode::Match,
            PlayerCount::One,
            Instant::now(),
            Pcg32::seed_from_u64(77),
        );
        for _ in 0..300 {
            assert_eq!(tick(&mut a, &input), tick(&mut b, &input));
        }
        assert_eq!(a.rocks.len(), b.rocks.len());
        assert_eq!(a.players[0].score, b.players[0].score);
    }
}
