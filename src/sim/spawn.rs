//! Spawn director: releases the stage's enemy composition onto the field
//!
//! One enemy leaves the queue per timer expiry, capped at four on field,
//! cycling through three fixed lanes along the top edge. A freeze in effect
//! at release time is inherited by the newcomer.

use std::collections::VecDeque;

use glam::Vec2;

use super::entities::{EnemyKind, Tank, TankId};
use crate::consts::{FIELD_SIZE, MAX_ENEMIES_ON_FIELD, TILE_SIZE, TOTAL_ENEMIES_PER_STAGE};

/// The three entry lanes: left corner, top center, right corner
pub const SPAWN_LANES: [Vec2; 3] = [
    Vec2::new(TILE_SIZE, TILE_SIZE),
    Vec2::new(FIELD_SIZE / 2.0 - TILE_SIZE / 2.0, TILE_SIZE),
    Vec2::new(FIELD_SIZE - TILE_SIZE * 2.0, TILE_SIZE),
];

/// Pop and place the next queued enemy, if the concurrency cap allows.
///
/// `freeze_timer` is the remaining global freeze; a positive value is
/// inherited so freshly spawned enemies do not break a Timer power-up.
pub fn try_release(
    queue: &mut VecDeque<EnemyKind>,
    live_enemies: usize,
    freeze_timer: f32,
    id: TankId,
) -> Option<Tank> {
    if live_enemies >= MAX_ENEMIES_ON_FIELD {
        return None;
    }
    let kind = queue.pop_front()?;
    let lane = (TOTAL_ENEMIES_PER_STAGE - queue.len()) % SPAWN_LANES.len();
    let mut enemy = Tank::new_enemy(id, SPAWN_LANES[lane], kind);
    if freeze_timer > 0.0 {
        enemy.frozen = freeze_timer;
    }
    log::debug!("released {kind:?} enemy {id} on lane {lane}, {} queued", queue.len());
    Some(enemy)
}

/// A stage is complete once the queue is drained and the field is clear
pub fn stage_complete(queue: &VecDeque<EnemyKind>, live_enemies: usize) -> bool {
    queue.is_empty() && live_enemies == 0
}
