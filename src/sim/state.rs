//! Simulation entities and session state
//!
//! Rocks, bullets, ships and players, plus the [`Session`] that owns them.
//! Every constructor and per-tick method takes the [`Settings`] explicitly.

use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::point_hits_polygon;
use super::geometry::{rotate_around_origin, scale, translate};
use crate::consts::{ROCK_VERTEX_COUNT, SHIP_PARTICLE_COUNT};
use crate::normalize_degrees;
use crate::scoreboard::Scoreboard;
use crate::settings::Settings;

/// RGB colour
pub type Color = [u8; 3];

pub const RED: Color = [255, 0, 0];
pub const GREEN: Color = [0, 255, 0];

/// Rock size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Large,
    Medium,
    Small,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Large => "Large",
            SizeClass::Medium => "Medium",
            SizeClass::Small => "Small",
        }
    }

    /// Range the nominal radius is drawn from
    pub fn radius_range(&self) -> RangeInclusive<i32> {
        match self {
            SizeClass::Large => 30..=50,
            SizeClass::Medium => 15..=25,
            SizeClass::Small => 10..=15,
        }
    }

    /// Most a vertex can stray from the nominal radius
    pub fn jitter(&self) -> i32 {
        match self {
            SizeClass::Large => 15,
            SizeClass::Medium => 7,
            SizeClass::Small => 5,
        }
    }

    /// Points for shooting a rock of this size. Small rocks are hard to hit.
    pub fn score(&self) -> i64 {
        match self {
            SizeClass::Large => 10,
            SizeClass::Medium => 20,
            SizeClass::Small => 30,
        }
    }

    /// Size of the two rocks this one splits into
    pub fn child(&self) -> Option<SizeClass> {
        match self {
            SizeClass::Large => Some(SizeClass::Medium),
            SizeClass::Medium => Some(SizeClass::Small),
            SizeClass::Small => None,
        }
    }
}

/// Screen edge a rock enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..4) {
            0 => Edge::Top,
            1 => Edge::Bottom,
            2 => Edge::Left,
            _ => Edge::Right,
        }
    }
}

/// Uniform pick in `lo..=hi`, collapsing to `lo` when the range is empty
fn span(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}

/// `10 * n / fps` for a random integer `n` in `range`: per-tick speed that
/// looks the same at any frame rate
fn paced(rng: &mut impl Rng, range: RangeInclusive<i32>, settings: &Settings) -> f32 {
    10.0 * rng.random_range(range) as f32 / settings.fps()
}

/// A drifting, spinning rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rock {
    pub size: SizeClass,
    /// Nominal radius
    pub radius: f32,
    /// Outline around the origin, fixed for life
    pub vertices: Vec<Vec2>,
    pub position: Vec2,
    /// Movement per tick
    pub drift: Vec2,
    /// Current rotation (degrees)
    pub rotation: f32,
    /// Degrees per tick, never zero
    pub rotation_speed: f32,
    pub exploding: bool,
    pub explosion_step: u32,
    /// Marked for removal
    pub kill: bool,
    pub color: Color,
}

impl Rock {
    /// Create a rock at the origin with no drift
    pub fn new(size: SizeClass, settings: &Settings, rng: &mut impl Rng) -> Self {
        let radius = rng.random_range(size.radius_range()) as f32;

        let max_spin = (100.0 / settings.fps()).round() as i32;
        let mut rotation_speed = rng.random_range(-max_spin..=max_spin);
        if rotation_speed == 0 {
            // Still rocks look dead
            rotation_speed = 1;
        }

        let slice = 360.0 / ROCK_VERTEX_COUNT as f32;
        let jitter = size.jitter();
        let vertices = (0..ROCK_VERTEX_COUNT)
            .map(|i| {
                let r = radius + rng.random_range(-jitter..=jitter) as f32;
                rotate_around_origin(Vec2::new(0.0, r), slice * i as f32)
            })
            .collect();

        let color = [
            rng.random_range(60..=200),
            rng.random_range(60..=200),
            rng.random_range(60..=200),
        ];

        log::debug!("{} rock created", size.as_str());

        Self {
            size,
            radius,
            vertices,
            position: Vec2::ZERO,
            drift: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: rotation_speed as f32,
            exploding: false,
            explosion_step: 0,
            kill: false,
            color,
        }
    }

    /// Create a rock on a random screen edge, drifting onto the arena
    pub fn spawn_at_edge(size: SizeClass, settings: &Settings, rng: &mut impl Rng) -> Self {
        let mut rock = Self::new(size, settings, rng);
        rock.place_on_edge(Edge::random(rng), settings, rng);
        rock
    }

    /// Put the rock on the dead line of `edge` with drift toward the interior
    pub fn place_on_edge(&mut self, edge: Edge, settings: &Settings, rng: &mut impl Rng) {
        let border = settings.border;
        let (w, h) = (settings.screen_width, settings.screen_height);

        match edge {
            Edge::Top | Edge::Bottom => {
                let x = span(rng, border, w - border).round();
                let y = if edge == Edge::Top {
                    settings.top_dead()
                } else {
                    settings.bottom_dead()
                };
                // Left half drifts right, right half drifts left
                let dx = if x <= w / 2.0 {
                    paced(rng, 1..=3, settings)
                } else {
                    paced(rng, -3..=-1, settings)
                };
                let dy = if edge == Edge::Top {
                    paced(rng, 2..=4, settings)
                } else {
                    paced(rng, -4..=-2, settings)
                };
                self.position = Vec2::new(x, y);
                self.drift = Vec2::new(dx, dy);
            }
            Edge::Left | Edge::Right => {
                let y = span(rng, border, h - border).round();
                let (x, dx) = if edge == Edge::Left {
                    (settings.left_dead(), paced(rng, 2..=4, settings))
                } else {
                    (settings.right_dead(), paced(rng, -4..=-2, settings))
                };
                self.position = Vec2::new(x, y);
                self.drift = Vec2::new(dx, paced(rng, -3..=3, settings));
            }
        }
    }

    /// Local vertex to screen coordinates
    #[inline]
    pub fn world_vertex(&self, vertex: Vec2) -> Vec2 {
        translate(rotate_around_origin(vertex, self.rotation), self.position)
    }

    pub fn world_vertices(&self) -> Vec<Vec2> {
        self.vertices.iter().map(|&v| self.world_vertex(v)).collect()
    }

    /// Half side of the box that always contains the rock
    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.radius + self.size.jitter() as f32
    }

    /// Is the point inside the rock?
    pub fn contains_point(&self, point: Vec2) -> bool {
        point_hits_polygon(
            point,
            self.position,
            &self.world_vertices(),
            self.half_extent(),
        )
    }

    /// Move by one tick
    pub fn advance(&mut self) {
        self.rotation = normalize_degrees(self.rotation + self.rotation_speed);
        self.position = translate(self.position, self.drift);
    }

    /// Flag the rock for removal once it has left the arena plus border
    pub fn check_onscreen(&mut self, settings: &Settings) {
        if settings.is_dead(self.position) {
            self.kill = true;
        }
    }

    pub fn explode(&mut self) {
        self.exploding = true;
    }

    /// Advance the explosion by one tick.
    ///
    /// Returns the two child rocks on the tick halfway through the explosion
    /// (Large and Medium rocks only), otherwise nothing.
    pub fn animate_explosion(&mut self, settings: &Settings, rng: &mut impl Rng) -> Vec<Rock> {
        if self.explosion_step < settings.target_fps {
            self.explosion_step += 1;
        } else {
            self.kill = true;
        }

        let Some(child) = self.size.child() else {
            return Vec::new();
        };
        if self.explosion_step != Self::split_step(settings) || self.kill {
            return Vec::new();
        }

        (0..2)
            .map(|_| {
                let mut rock = Rock::new(child, settings, rng);
                let offset = Vec2::new(
                    rng.random_range(-25..=25) as f32,
                    rng.random_range(-25..=25) as f32,
                );
                rock.position = translate(self.position, offset);
                rock.drift = self.drift
                    + Vec2::new(paced(rng, -1..=1, settings), paced(rng, -1..=1, settings));
                rock
            })
            .collect()
    }

    /// Explosion step on which big rocks split. Never 0, since the step is
    /// already 1 on the first animated tick.
    pub fn split_step(settings: &Settings) -> u32 {
        (settings.target_fps / 2).max(1)
    }

    /// Debris spread factor; grows as the explosion runs
    pub fn explosion_scale(&self, settings: &Settings) -> f32 {
        5.0 * self.explosion_step as f32 / settings.fps()
    }

    /// Screen positions of explosion debris (the outline blown outward)
    pub fn explosion_particles(&self, settings: &Settings) -> Vec<Vec2> {
        let factor = self.explosion_scale(settings);
        self.vertices
            .iter()
            .map(|&v| self.world_vertex(scale(v, factor)))
            .collect()
    }
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub position: Vec2,
    /// Direction of travel (degrees), fixed at launch
    pub heading: f32,
    pub drift: Vec2,
    pub kill: bool,
    pub color: Color,
}

impl Bullet {
    pub fn new(origin: Vec2, heading: f32, speed: f32, color: Color) -> Self {
        Self {
            position: origin,
            heading,
            drift: rotate_around_origin(Vec2::new(0.0, speed), heading),
            kill: false,
            color,
        }
    }

    pub fn advance(&mut self) {
        self.position = translate(self.position, self.drift);
    }

    pub fn check_onscreen(&mut self, settings: &Settings) {
        if settings.is_dead(self.position) {
            self.kill = true;
        }
    }
}

/// Arrow-shaped hull; vertex 0 is the nose
pub const SHIP_OUTLINE: [Vec2; 4] = [
    Vec2::new(0.0, 10.0),
    Vec2::new(-5.0, -5.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(5.0, -5.0),
];

/// Furthest any hull vertex sits from the ship's position
pub const SHIP_HALF_EXTENT: f32 = 10.0;

/// A player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub position: Vec2,
    /// Direction the nose points (degrees)
    pub rotation: f32,
    pub vertices: [Vec2; 4],
    pub exploding: bool,
    pub explosion_step: u32,
    /// Ring of debris, thinned out while the explosion runs
    pub explosion_particles: Vec<Vec2>,
    pub kill: bool,
    /// Carried for respawn protection; collisions never consult it
    pub invincibility_ticks: u32,
    pub bullets: Vec<Bullet>,
    pub color: Color,
}

impl Ship {
    pub fn new(origin: Vec2, color: Color, rng: &mut impl Rng) -> Self {
        let slice = 360.0 / SHIP_PARTICLE_COUNT as f32;
        let explosion_particles = (0..SHIP_PARTICLE_COUNT)
            .map(|i| {
                let r = 7.0 + rng.random_range(-2..=2) as f32;
                rotate_around_origin(Vec2::new(0.0, r), slice * i as f32)
            })
            .collect();

        Self {
            position: origin,
            rotation: 0.0,
            vertices: SHIP_OUTLINE,
            exploding: false,
            explosion_step: 0,
            explosion_particles,
            kill: false,
            invincibility_ticks: 0,
            bullets: Vec::new(),
            color,
        }
    }

    /// Turn clockwise on screen (y grows downward, so the angle decreases)
    pub fn rotate_clockwise(&mut self, step: f32) {
        if !self.exploding {
            self.rotation = normalize_degrees(self.rotation - step);
        }
    }

    pub fn rotate_anticlockwise(&mut self, step: f32) {
        if !self.exploding {
            self.rotation = normalize_degrees(self.rotation + step);
        }
    }

    /// Fire from the nose. Returns false when exploding or the magazine is full.
    pub fn fire(&mut self, settings: &Settings) -> bool {
        if self.exploding || self.bullets.len() >= settings.max_bullets {
            return false;
        }
        let nose = self.world_vertex(self.vertices[0]);
        self.bullets.push(Bullet::new(
            nose,
            self.rotation,
            settings.bullet_speed,
            self.color,
        ));
        true
    }

    #[inline]
    pub fn world_vertex(&self, vertex: Vec2) -> Vec2 {
        translate(rotate_around_origin(vertex, self.rotation), self.position)
    }

    pub fn world_vertices(&self) -> Vec<Vec2> {
        self.vertices.iter().map(|&v| self.world_vertex(v)).collect()
    }

    /// Is the point inside the hull?
    ///
    /// Query for collaborators (hover, hit markers). The tick tests rocks
    /// against the ship's position, not its hull.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point_hits_polygon(
            point,
            self.position,
            &self.world_vertices(),
            SHIP_HALF_EXTENT,
        )
    }

    pub fn explode(&mut self) {
        self.exploding = true;
    }

    /// Advance the explosion; ship explosions run four times as long as rocks'
    pub fn animate_explosion(&mut self, settings: &Settings, rng: &mut impl Rng) {
        if self.explosion_step < 4 * settings.target_fps {
            self.explosion_step += 1;
        } else {
            self.kill = true;
        }
        // Debris twinkles away
        self.explosion_particles.retain(|_| !rng.random_bool(0.01));
    }

    pub fn explosion_scale(&self, settings: &Settings) -> f32 {
        5.0 * self.explosion_step as f32 / settings.fps()
    }

    /// Screen positions of the remaining debris
    pub fn explosion_positions(&self, settings: &Settings) -> Vec<Vec2> {
        let factor = self.explosion_scale(settings);
        self.explosion_particles
            .iter()
            .map(|&p| translate(scale(p, factor), self.position))
            .collect()
    }
}

/// A player and their one live ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub color: Color,
    /// Where the first ship appeared
    pub origin: Vec2,
    pub score: i64,
    pub ship: Ship,
}

impl Player {
    pub fn new(name: impl Into<String>, color: Color, origin: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            name: name.into(),
            color,
            origin,
            score: 0,
            ship: Ship::new(origin, color, rng),
        }
    }

    /// Credit a destroyed rock. Returns the points awarded.
    pub fn killed_a_rock(&mut self, size: SizeClass) -> i64 {
        let points = size.score();
        self.score += points;
        points
    }

    /// Replace the destroyed ship with a fresh one where it died.
    /// Returns the penalty applied.
    pub fn lost_a_ship(&mut self, settings: &Settings, rng: &mut impl Rng) -> i64 {
        self.ship = Ship::new(self.ship.position, self.color, rng);
        self.score -= settings.ship_loss_penalty;
        settings.ship_loss_penalty
    }
}

/// How many people are playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCount {
    One,
    Two,
}

impl PlayerCount {
    pub fn count(&self) -> usize {
        match self {
            PlayerCount::One => 1,
            PlayerCount::Two => 2,
        }
    }
}

/// Demo sessions animate without collisions or input; matches are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Demo,
    Match,
}

/// Something the audio (or anything else) may react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A ship fired a bullet
    BulletFired { player: usize },
    /// A rock started exploding. `shooter` is set when a bullet did it.
    RockExploded {
        size: SizeClass,
        shooter: Option<usize>,
        points: i64,
    },
    /// A ship flew into a rock
    ShipExploded { player: usize },
    /// A ship finished exploding and was replaced
    ShipRespawned { player: usize, penalty: i64 },
}

/// Everything in play: rocks, players and the match clock
#[derive(Debug)]
pub struct Session<R: Rng = Pcg32> {
    pub settings: Settings,
    pub mode: SessionMode,
    pub rocks: Vec<Rock>,
    pub players: Vec<Player>,
    pub scoreboard: Scoreboard,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Wall-clock end of the match (matches only)
    pub ends_at: Option<Instant>,
    pub(crate) rng: R,
}

impl Session<Pcg32> {
    /// An unscored session seeded from entropy
    pub fn demo(settings: Settings) -> Self {
        let rng = Pcg32::seed_from_u64(rand::random());
        Self::with_rng(settings, SessionMode::Demo, PlayerCount::One, Instant::now(), rng)
    }

    /// A scored match seeded from entropy, ending `match_seconds` after `now`
    pub fn start_match(settings: Settings, players: PlayerCount, now: Instant) -> Self {
        let rng = Pcg32::seed_from_u64(rand::random());
        Self::with_rng(settings, SessionMode::Match, players, now, rng)
    }

    /// Same as [`Session::with_rng`] with a seeded PCG stream
    pub fn seeded(
        settings: Settings,
        mode: SessionMode,
        players: PlayerCount,
        now: Instant,
        seed: u64,
    ) -> Self {
        Self::with_rng(settings, mode, players, now, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    /// Create a session drawing all randomness from `rng`.
    ///
    /// `settings` must already pass [`Settings::validate`]; a zero tick rate
    /// makes every per-tick speed infinite. Debug builds assert this.
    pub fn with_rng(
        settings: Settings,
        mode: SessionMode,
        players: PlayerCount,
        now: Instant,
        mut rng: R,
    ) -> Self {
        debug_assert!(
            settings.validate().is_ok(),
            "session built from invalid settings: {:?}",
            settings.validate()
        );
        let rocks = (0..settings.rock_target)
            .map(|_| Rock::spawn_at_edge(SizeClass::Large, &settings, &mut rng))
            .collect();

        let centre = settings.screen_centre();
        let players: Vec<Player> = match players {
            PlayerCount::One => vec![Player::new("Player 1", RED, centre, &mut rng)],
            PlayerCount::Two => {
                let offset = (settings.screen_width / 4.0).floor();
                vec![
                    Player::new("Player 1", RED, centre - Vec2::new(offset, 0.0), &mut rng),
                    Player::new("Player 2", GREEN, centre + Vec2::new(offset, 0.0), &mut rng),
                ]
            }
        };
        let scoreboard = Scoreboard::new(players.iter().map(|p| p.name.clone()));

        let ends_at = match mode {
            SessionMode::Match => Some(now + Duration::from_secs(settings.match_seconds)),
            SessionMode::Demo => None,
        };

        log::info!(
            "{:?} session started: {} player(s), {} rocks",
            mode,
            players.len(),
            settings.rock_target
        );

        Self {
            settings,
            mode,
            rocks,
            players,
            scoreboard,
            time_ticks: 0,
            ends_at,
            rng,
        }
    }

    /// Collisions are only evaluated in scored matches
    pub fn collisions_enabled(&self) -> bool {
        self.mode == SessionMode::Match
    }

    /// Match time left, `None` outside a match
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.ends_at.map(|end| end.saturating_duration_since(now))
    }

    /// True once the match deadline has passed
    pub fn is_over(&self, now: Instant) -> bool {
        self.ends_at.is_some_and(|end| now >= end)
    }

    /// Stop scoring: keep drifting the last state as a demo
    pub fn end_match(&mut self) {
        if self.mode == SessionMode::Match {
            log::info!("Match over after {} ticks", self.time_ticks);
            self.mode = SessionMode::Demo;
            self.ends_at = None;
        }
    }

    /// Add a rock of `size` on a random edge
    pub fn spawn_rock_at_edge(&mut self, size: SizeClass) {
        let rock = Rock::spawn_at_edge(size, &self.settings, &mut self.rng);
        self.rocks.push(rock);
    }

    /// Live bullets across all ships
    pub fn bullet_count(&self) -> usize {
        self.players.iter().map(|p| p.ship.bullets.len()).sum()
    }

    /// Direct access to the random source (tests build entities with it)
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }
}
