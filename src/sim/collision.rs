//! Movement and collision resolution on the tile grid
//!
//! A move candidate is accepted only if the whole destination bounding box
//! stays in the field, overlaps passable tiles only, and touches no other
//! live tank. Movement is all-or-nothing per axis attempt.

use glam::Vec2;

use super::entities::TankId;
use super::tiles::TileGrid;
use crate::consts::{FIELD_SIZE, TILE_SIZE};
use crate::coord_to_tile;

/// Axis-aligned box overlap (strict, zero-area contact does not count)
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: f32, b_pos: Vec2, b_size: f32) -> bool {
    a_pos.x < b_pos.x + b_size
        && a_pos.x + a_size > b_pos.x
        && a_pos.y < b_pos.y + b_size
        && a_pos.y + a_size > b_pos.y
}

/// Whether a bounding box lies fully inside the playfield
#[inline]
pub fn box_inside_field(pos: Vec2, size: f32) -> bool {
    pos.x >= 0.0 && pos.y >= 0.0 && pos.x + size <= FIELD_SIZE && pos.y + size <= FIELD_SIZE
}

/// Tile index range (row0, col0, row1, col1) overlapped by a bounding box.
/// The box must already be inside the field.
pub fn tile_span(pos: Vec2, size: f32) -> (usize, usize, usize, usize) {
    let row0 = coord_to_tile(pos.y);
    let col0 = coord_to_tile(pos.x);
    let row1 = coord_to_tile(pos.y + size - 1.0);
    let col1 = coord_to_tile(pos.x + size - 1.0);
    (row0, col0, row1, col1)
}

/// Every tile under the box is passable for tanks
fn tiles_passable(grid: &TileGrid, pos: Vec2, size: f32) -> bool {
    let (row0, col0, row1, col1) = tile_span(pos, size);
    for row in row0..=row1 {
        for col in col0..=col1 {
            if !grid.get(row, col).is_passable() {
                return false;
            }
        }
    }
    true
}

/// Full movement test: field bounds, terrain, and other live tanks.
/// `others` is a snapshot of live tank boxes; the mover excludes itself by id.
pub fn can_occupy(
    grid: &TileGrid,
    pos: Vec2,
    size: f32,
    self_id: TankId,
    others: &[(TankId, Vec2)],
) -> bool {
    if !box_inside_field(pos, size) {
        return false;
    }
    if !tiles_passable(grid, pos, size) {
        return false;
    }
    for &(id, other_pos) in others {
        if id == self_id {
            continue;
        }
        if aabb_overlap(pos, size, other_pos, TILE_SIZE) {
            return false;
        }
    }
    true
}

/// Grid-alignment assist for the player: nudge an off-axis coordinate toward
/// the nearest tile boundary, spending at most `step` of this tick's velocity
/// budget. Returns the nudged coordinate (possibly unchanged).
pub fn align_axis_to_grid(value: f32, max_coordinate: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    let target = ((value / TILE_SIZE).round() * TILE_SIZE).clamp(0.0, max_coordinate);
    let delta = target - value;
    if delta.abs() <= step {
        target
    } else {
        value + delta.signum() * step
    }
}
