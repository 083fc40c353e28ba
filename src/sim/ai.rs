//! Enemy decision policy
//!
//! Enemies wander with rate-based random direction re-rolls, snap their
//! facing toward the player when row- or column-aligned within one tile,
//! and want to fire aggressively when aligned and only occasionally when
//! not. Cooldown and max-bullet gating happen in the orchestrator, which
//! owns the bullet list.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::entities::{Direction, Tank};
use crate::consts::TILE_SIZE;

/// Fire attempts per second while not aligned with the player
const IDLE_FIRE_RATE: f32 = 1.2;

/// What an enemy wants to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnemyIntent {
    pub wants_fire: bool,
}

/// Steer one enemy tank and report its fire intent.
///
/// `player` is `None` while the player is dead; wandering continues but no
/// alignment seeking or firing happens.
pub fn drive_enemy(tank: &mut Tank, player: Option<&Tank>, rng: &mut impl Rng, dt: f32) -> EnemyIntent {
    let kind = match tank.enemy_kind() {
        Some(kind) => kind,
        None => return EnemyIntent::default(),
    };

    if rng.random::<f32>() < kind.dir_change_rate() * dt {
        if let Some(dir) = Direction::ALL.choose(rng) {
            tank.dir = *dir;
        }
    }

    let player = match player.filter(|p| p.alive) {
        Some(player) => player,
        None => return EnemyIntent::default(),
    };

    let aligned_column = (player.pos.x - tank.pos.x).abs() < TILE_SIZE;
    let aligned_row = (player.pos.y - tank.pos.y).abs() < TILE_SIZE;

    if aligned_column {
        tank.dir = if player.pos.y < tank.pos.y {
            Direction::Up
        } else {
            Direction::Down
        };
    } else if aligned_row {
        tank.dir = if player.pos.x < tank.pos.x {
            Direction::Left
        } else {
            Direction::Right
        };
    }

    let wants_fire = aligned_column || aligned_row || rng.random::<f32>() < IDLE_FIRE_RATE * dt;
    EnemyIntent { wants_fire }
}
