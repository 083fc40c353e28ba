//! Deterministic game simulation
//!
//! The simulation is pure with respect to the host: it consumes `TickInput`
//! and a clamped `dt`, mutates a `StageRuntime`, and reports side effects as
//! drainable `GameEvent`s. No I/O, no wall clock, RNG injected at
//! construction.

pub mod ai;
pub mod collision;
pub mod entities;
pub mod powerups;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod tiles;

pub use entities::{Bullet, ControllerKind, Direction, EnemyKind, Explosion, PowerUp, Tank, TankId};
pub use powerups::PowerUpKind;
pub use state::{GameEvent, GamePhase, Sprite, SpriteKind, StageRuntime};
pub use tick::{TickInput, tick};
pub use tiles::{TileGrid, TileKind};
