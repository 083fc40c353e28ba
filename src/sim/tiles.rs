//! Terrain grid and tile resolution
//!
//! The grid is the only mutable terrain state. All mutation goes through
//! `TileGrid` operations; rendering gets a read-only view.

use serde::{Deserialize, Serialize};

use crate::consts::GRID_SIZE;

/// One cell of the terrain grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    /// Destructible wall
    Brick,
    /// Destructible only by power >= 2 bullets
    Steel,
    /// Blocks bullets and tanks, indestructible
    Water,
    /// Cosmetic cover, fully passable
    Grass,
    /// Passable, slippery in the original artwork only
    Ice,
    /// Protective wall segment of the base footprint
    Base,
    /// The objective itself; a hit ends the run
    Eagle,
}

impl TileKind {
    /// Tanks may occupy this tile
    pub fn is_passable(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Grass | TileKind::Ice)
    }

    /// Bullets stop on this tile (Grass is visual cover only, never blocking)
    pub fn is_bullet_blocking(self) -> bool {
        matches!(
            self,
            TileKind::Brick | TileKind::Steel | TileKind::Water | TileKind::Base
        )
    }
}

/// Square terrain matrix, deep-copied from a stage template at stage start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    cells: Vec<TileKind>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl TileGrid {
    /// All-empty grid
    pub fn empty() -> Self {
        Self {
            cells: vec![TileKind::Empty; GRID_SIZE * GRID_SIZE],
        }
    }

    /// Tile at (row, col). Out-of-range indices are a caller bug and panic.
    pub fn get(&self, row: usize, col: usize) -> TileKind {
        assert!(row < GRID_SIZE && col < GRID_SIZE, "tile index out of range: ({row}, {col})");
        self.cells[row * GRID_SIZE + col]
    }

    pub fn set(&mut self, row: usize, col: usize, tile: TileKind) {
        assert!(row < GRID_SIZE && col < GRID_SIZE, "tile index out of range: ({row}, {col})");
        self.cells[row * GRID_SIZE + col] = tile;
    }

    /// Resolve a bullet impact against the tile at (row, col).
    ///
    /// Returns true when the tile was destroyed (cleared to Empty). Brick
    /// falls to any power; Steel only to power > 1; Base always clears.
    /// No side effects beyond the grid mutation - explosions and run-over
    /// signalling are the caller's job.
    pub fn hit(&mut self, row: usize, col: usize, power: u8) -> bool {
        match self.get(row, col) {
            TileKind::Brick => {
                self.set(row, col, TileKind::Empty);
                true
            }
            TileKind::Steel if power > 1 => {
                self.set(row, col, TileKind::Empty);
                true
            }
            TileKind::Base => {
                self.set(row, col, TileKind::Empty);
                true
            }
            _ => false,
        }
    }

    /// Rewrite the two base-footprint wall rows with the reinforced (Steel)
    /// or normal (Brick) pattern. The Base wall block itself is untouched.
    pub fn reinforce_base(&mut self, strong: bool) {
        let wall = if strong { TileKind::Steel } else { TileKind::Brick };
        let center = GRID_SIZE / 2;
        let base_row = GRID_SIZE - 3;
        for row in base_row..base_row + 2 {
            for offset in 0..5usize {
                let col = center - 2 + offset;
                if row == base_row + 1 && offset == 2 {
                    continue;
                }
                self.set(row, col, wall);
            }
        }
    }

    /// Row-major view of the whole grid, for the renderer collaborator
    pub fn rows(&self) -> impl Iterator<Item = &[TileKind]> {
        self.cells.chunks(GRID_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passability_classes() {
        assert!(TileKind::Empty.is_passable());
        assert!(TileKind::Grass.is_passable());
        assert!(TileKind::Ice.is_passable());
        for tile in [TileKind::Brick, TileKind::Steel, TileKind::Water, TileKind::Base, TileKind::Eagle] {
            assert!(!tile.is_passable(), "{tile:?} should block tanks");
        }
    }

    #[test]
    fn test_bullet_blocking_classes() {
        for tile in [TileKind::Brick, TileKind::Steel, TileKind::Water, TileKind::Base] {
            assert!(tile.is_bullet_blocking());
        }
        assert!(!TileKind::Grass.is_bullet_blocking());
        assert!(!TileKind::Ice.is_bullet_blocking());
        assert!(!TileKind::Empty.is_bullet_blocking());
    }

    #[test]
    fn test_hit_brick_clears_at_any_power() {
        let mut grid = TileGrid::empty();
        grid.set(4, 4, TileKind::Brick);
        assert!(grid.hit(4, 4, 1));
        assert_eq!(grid.get(4, 4), TileKind::Empty);
    }

    #[test]
    fn test_hit_steel_requires_power_two() {
        let mut grid = TileGrid::empty();
        grid.set(2, 9, TileKind::Steel);
        assert!(!grid.hit(2, 9, 1));
        assert_eq!(grid.get(2, 9), TileKind::Steel);
        assert!(grid.hit(2, 9, 2));
        assert_eq!(grid.get(2, 9), TileKind::Empty);
    }

    #[test]
    fn test_hit_water_is_indestructible() {
        let mut grid = TileGrid::empty();
        grid.set(7, 7, TileKind::Water);
        assert!(!grid.hit(7, 7, 2));
        assert_eq!(grid.get(7, 7), TileKind::Water);
    }

    #[test]
    fn test_hit_base_always_clears() {
        let mut grid = TileGrid::empty();
        grid.set(24, 13, TileKind::Base);
        assert!(grid.hit(24, 13, 1));
        assert_eq!(grid.get(24, 13), TileKind::Empty);
    }

    #[test]
    fn test_reinforce_base_round_trip() {
        let mut grid = TileGrid::empty();
        let base_row = GRID_SIZE - 3;
        let center = GRID_SIZE / 2;
        grid.set(base_row + 1, center, TileKind::Base);

        grid.reinforce_base(true);
        assert_eq!(grid.get(base_row, center - 2), TileKind::Steel);
        assert_eq!(grid.get(base_row, center), TileKind::Steel);
        assert_eq!(grid.get(base_row + 1, center + 2), TileKind::Steel);
        // the Base wall block is never overwritten
        assert_eq!(grid.get(base_row + 1, center), TileKind::Base);

        grid.reinforce_base(false);
        assert_eq!(grid.get(base_row, center - 2), TileKind::Brick);
        assert_eq!(grid.get(base_row + 1, center), TileKind::Base);
    }

    #[test]
    #[should_panic(expected = "tile index out of range")]
    fn test_out_of_range_access_panics() {
        TileGrid::empty().get(GRID_SIZE, 0);
    }
}
