//! Simulation module
//!
//! All gameplay logic lives here, free of rendering, audio and input:
//! - One tick runs to completion before the next starts
//! - Settings are passed in explicitly, never read from globals
//! - Randomness comes from the session's own generator

pub mod arcade;
pub mod collision;
pub mod geometry;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use arcade::{Arcade, ArcadeFrame, ArcadeStatus, FrameInput};
pub use collision::{point_hits_polygon, point_in_fan, within_bounds};
pub use geometry::{
    point_in_triangle, rotate_around_origin, rotate_around_pivot, scale, translate, triangle_area,
};
pub use snapshot::Snapshot;
pub use state::{
    Bullet, GameEvent, Player, PlayerCount, Rock, Session, SessionMode, Ship, SizeClass,
};
pub use tick::{ShipInput, tick};
