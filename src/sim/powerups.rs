//! Power-up kinds, drop rotation and field placement
//!
//! Effects themselves are applied by the orchestrator, which owns the state
//! they touch (player, enemies, grid, timers).

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::tiles::TileGrid;
use crate::consts::{FIELD_SIZE, TILE_SIZE};
use crate::coord_to_tile;

/// Placement rejection sampling gives up after this many attempts and keeps
/// the last sampled point.
const MAX_PLACEMENT_ATTEMPTS: u32 = 10;

/// The seven collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Shield for at least 10 seconds
    Helmet,
    /// Freeze all current and subsequently spawned enemies
    Timer,
    /// Reinforce the base walls with steel, temporarily
    Shovel,
    /// +1 upgrade level
    Star,
    /// Destroy every live enemy on the field
    Grenade,
    /// +1 life
    Tank,
    /// Jump straight to the maximum upgrade level
    Gun,
}

/// Fixed rotation drops are drawn from, uniformly
pub const DROP_ROTATION: [PowerUpKind; 7] = [
    PowerUpKind::Star,
    PowerUpKind::Helmet,
    PowerUpKind::Timer,
    PowerUpKind::Grenade,
    PowerUpKind::Tank,
    PowerUpKind::Shovel,
    PowerUpKind::Gun,
];

/// Draw the next drop kind
pub fn random_kind(rng: &mut impl Rng) -> PowerUpKind {
    *DROP_ROTATION
        .choose(rng)
        .expect("drop rotation is non-empty")
}

/// Pick a drop position on a passable tile, rejection-sampled over the upper
/// field (the bottom rows around the base are excluded). Falls back to the
/// last sampled point if no passable spot turns up in time.
pub fn sample_drop_position(grid: &TileGrid, rng: &mut impl Rng) -> Vec2 {
    let mut pos = Vec2::ZERO;
    for attempt in 0..MAX_PLACEMENT_ATTEMPTS {
        let x = rng.random_range(0.0..FIELD_SIZE - TILE_SIZE);
        let y = rng.random_range(0.0..FIELD_SIZE - TILE_SIZE * 4.0);
        pos = Vec2::new(x, y);
        if grid.get(coord_to_tile(y), coord_to_tile(x)).is_passable() {
            break;
        }
        if attempt == MAX_PLACEMENT_ATTEMPTS - 1 {
            log::debug!("power-up placement fell back after {MAX_PLACEMENT_ATTEMPTS} attempts");
        }
    }
    pos
}
