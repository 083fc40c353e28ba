//! Authored stage data: terrain templates and the enemy distribution plan
//!
//! Templates are built with a small rect/mirror DSL and handed to the
//! orchestrator as immutable `StageDefinition`s; the runtime deep-copies the
//! grid at stage start and never mutates the template.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{GRID_SIZE, TOTAL_ENEMIES_PER_STAGE};
use crate::sim::entities::EnemyKind;
use crate::sim::tiles::{TileGrid, TileKind};

/// Number of distinct terrain templates; stage indices wrap over these
pub const STAGE_TEMPLATE_COUNT: usize = 5;

/// Immutable per-stage inputs to the orchestrator
#[derive(Debug, Clone)]
pub struct StageDefinition {
    pub template: TileGrid,
    pub sequence: Vec<EnemyKind>,
}

/// Stage definition for an arbitrary (wrapping) stage index
pub fn stage_definition(index: usize) -> StageDefinition {
    StageDefinition {
        template: stage_template(index),
        sequence: spawn_sequence(index),
    }
}

// --- enemy composition -----------------------------------------------------

/// Per-stage enemy counts (Basic, Fast, Power, Armor), each row summing to
/// twenty; weight shifts from Basic toward Armor with the stage index and
/// the table cycles once exhausted.
const DISTRIBUTION_PLAN: [[usize; 4]; 35] = [
    [18, 2, 0, 0],
    [14, 4, 2, 0],
    [14, 2, 2, 2],
    [10, 4, 4, 2],
    [10, 4, 4, 2],
    [8, 6, 4, 2],
    [6, 6, 4, 4],
    [6, 4, 6, 4],
    [4, 6, 6, 4],
    [4, 4, 6, 6],
    [4, 4, 6, 6],
    [2, 6, 6, 6],
    [2, 6, 6, 6],
    [2, 4, 8, 6],
    [2, 2, 8, 8],
    [2, 2, 8, 8],
    [0, 4, 8, 8],
    [0, 4, 8, 8],
    [0, 2, 8, 10],
    [0, 2, 8, 10],
    [0, 0, 10, 10],
    [0, 0, 10, 10],
    [0, 0, 8, 12],
    [0, 0, 8, 12],
    [0, 0, 6, 14],
    [0, 0, 6, 14],
    [0, 0, 4, 16],
    [0, 0, 4, 16],
    [0, 0, 2, 18],
    [0, 0, 2, 18],
    [0, 0, 0, 20],
    [0, 0, 0, 20],
    [0, 0, 0, 20],
    [0, 0, 0, 20],
    [0, 0, 0, 20],
];

/// Ordered spawn composition for a stage, consumed front-to-back
pub fn spawn_sequence(stage_index: usize) -> Vec<EnemyKind> {
    let counts = DISTRIBUTION_PLAN[stage_index % DISTRIBUTION_PLAN.len()];
    let mut sequence = Vec::with_capacity(TOTAL_ENEMIES_PER_STAGE);
    for (kind, &count) in EnemyKind::ALL.iter().zip(counts.iter()) {
        sequence.extend(std::iter::repeat_n(*kind, count));
    }
    // short rows pad out with Basic
    while sequence.len() < TOTAL_ENEMIES_PER_STAGE {
        sequence.push(EnemyKind::Basic);
    }
    sequence
}

// --- terrain templates -----------------------------------------------------

fn fill_rect(grid: &mut TileGrid, x0: usize, y0: usize, x1: usize, y1: usize, tile: TileKind) {
    let max = GRID_SIZE - 1;
    for y in y0.min(max)..=y1.min(max) {
        for x in x0.min(max)..=x1.min(max) {
            grid.set(y, x, tile);
        }
    }
}

fn clear_rect(grid: &mut TileGrid, x0: usize, y0: usize, x1: usize, y1: usize) {
    fill_rect(grid, x0, y0, x1, y1, TileKind::Empty);
}

/// Mirror the left half onto the right half
fn mirror_vertically(grid: &mut TileGrid) {
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE / 2 {
            grid.set(y, GRID_SIZE - 1 - x, grid.get(y, x));
        }
    }
}

/// Mirror the top half onto the bottom half
fn mirror_horizontally(grid: &mut TileGrid) {
    for y in 0..GRID_SIZE / 2 {
        for x in 0..GRID_SIZE {
            grid.set(GRID_SIZE - 1 - y, x, grid.get(y, x));
        }
    }
}

/// Scatter small grass patches over the upper field, reproducibly per seed
fn scatter_grass(grid: &mut TileGrid, seed: u64) {
    let mut rng = Pcg32::seed_from_u64(seed);
    for _ in 0..30 {
        let x = rng.random_range(0..GRID_SIZE);
        let y = rng.random_range(0..GRID_SIZE - 6);
        fill_rect(
            grid,
            x,
            y,
            (x + 1).min(GRID_SIZE - 1),
            (y + 1).min(GRID_SIZE - 6),
            TileKind::Grass,
        );
    }
}

/// The canonical base footprint: a brick ring over the two bottom-center
/// rows, the Base wall column, and the Eagle on the bottom row.
fn apply_base(grid: &mut TileGrid) {
    let center = GRID_SIZE / 2;
    let base_row = GRID_SIZE - 3;
    for x in center - 2..=center + 2 {
        grid.set(base_row, x, TileKind::Brick);
        grid.set(base_row + 1, x, TileKind::Brick);
    }
    grid.set(base_row + 1, center, TileKind::Base);
    grid.set(base_row + 2, center, TileKind::Eagle);
}

/// Terrain template for a (wrapping) stage index
pub fn stage_template(index: usize) -> TileGrid {
    let mut grid = TileGrid::empty();
    match index % STAGE_TEMPLATE_COUNT {
        0 => {
            fill_rect(&mut grid, 0, 0, 3, GRID_SIZE - 6, TileKind::Brick);
            fill_rect(&mut grid, GRID_SIZE - 4, 0, GRID_SIZE - 1, GRID_SIZE - 6, TileKind::Brick);
            clear_rect(&mut grid, 1, 6, GRID_SIZE - 2, GRID_SIZE - 8);
            fill_rect(&mut grid, 4, 2, 8, 5, TileKind::Brick);
            fill_rect(&mut grid, GRID_SIZE - 9, 2, GRID_SIZE - 5, 5, TileKind::Brick);
            fill_rect(&mut grid, 9, 8, 16, 12, TileKind::Water);
            fill_rect(&mut grid, 6, 9, 7, 14, TileKind::Brick);
            mirror_vertically(&mut grid);
            fill_rect(&mut grid, 11, 5, 14, 7, TileKind::Brick);
        }
        1 => {
            fill_rect(&mut grid, 0, 0, GRID_SIZE - 1, 2, TileKind::Steel);
            fill_rect(&mut grid, 0, 3, 5, GRID_SIZE - 8, TileKind::Brick);
            fill_rect(&mut grid, 8, 5, 17, 10, TileKind::Water);
            fill_rect(&mut grid, 4, 12, GRID_SIZE - 5, 16, TileKind::Grass);
            mirror_vertically(&mut grid);
            fill_rect(&mut grid, 11, 8, 14, 11, TileKind::Steel);
        }
        2 => {
            fill_rect(&mut grid, 2, 0, 4, GRID_SIZE - 7, TileKind::Brick);
            fill_rect(&mut grid, 6, 5, GRID_SIZE - 7, 7, TileKind::Steel);
            fill_rect(&mut grid, 6, 9, GRID_SIZE - 7, 11, TileKind::Steel);
            fill_rect(&mut grid, 5, 13, GRID_SIZE - 6, 15, TileKind::Grass);
            fill_rect(&mut grid, 8, 2, GRID_SIZE - 9, 4, TileKind::Water);
            mirror_vertically(&mut grid);
        }
        3 => {
            fill_rect(&mut grid, 0, 0, GRID_SIZE - 1, GRID_SIZE - 8, TileKind::Grass);
            fill_rect(&mut grid, 3, 3, GRID_SIZE - 4, GRID_SIZE - 12, TileKind::Brick);
            clear_rect(&mut grid, 5, 5, GRID_SIZE - 6, GRID_SIZE - 14);
            fill_rect(&mut grid, 9, 7, GRID_SIZE - 10, GRID_SIZE - 16, TileKind::Water);
            mirror_vertically(&mut grid);
            mirror_horizontally(&mut grid);
            clear_rect(&mut grid, 9, GRID_SIZE - 8, GRID_SIZE - 10, GRID_SIZE - 1);
        }
        _ => {
            fill_rect(&mut grid, 2, 2, 6, 6, TileKind::Ice);
            fill_rect(&mut grid, 4, 8, 9, 10, TileKind::Brick);
            fill_rect(&mut grid, 2, 12, 5, 18, TileKind::Steel);
            fill_rect(&mut grid, 8, 13, 11, 17, TileKind::Water);
            mirror_vertically(&mut grid);
            scatter_grass(&mut grid, index as u64 + 1);
            clear_rect(&mut grid, 10, 0, GRID_SIZE - 11, 2);
        }
    }
    // spawn lanes and the base footprint stay clear of authored terrain
    clear_rect(&mut grid, 0, 0, 2, 1);
    clear_rect(&mut grid, GRID_SIZE / 2 - 1, 0, GRID_SIZE / 2 + 1, 1);
    clear_rect(&mut grid, GRID_SIZE - 3, 0, GRID_SIZE - 1, 1);
    clear_rect(&mut grid, GRID_SIZE / 2 - 3, GRID_SIZE - 5, GRID_SIZE / 2 + 3, GRID_SIZE - 1);
    apply_base(&mut grid);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_stage_composition() {
        let sequence = spawn_sequence(0);
        assert_eq!(sequence.len(), TOTAL_ENEMIES_PER_STAGE);
        let basics = sequence.iter().filter(|k| **k == EnemyKind::Basic).count();
        let fasts = sequence.iter().filter(|k| **k == EnemyKind::Fast).count();
        assert_eq!(basics, 18);
        assert_eq!(fasts, 2);
    }

    #[test]
    fn test_plan_wraps_after_table_end() {
        assert_eq!(spawn_sequence(35), spawn_sequence(0));
        assert_eq!(spawn_sequence(70), spawn_sequence(0));
    }

    #[test]
    fn test_late_stages_are_all_armor() {
        let sequence = spawn_sequence(34);
        assert!(sequence.iter().all(|k| *k == EnemyKind::Armor));
    }

    #[test]
    fn test_templates_have_base_footprint() {
        let center = GRID_SIZE / 2;
        for index in 0..STAGE_TEMPLATE_COUNT {
            let grid = stage_template(index);
            assert_eq!(grid.get(GRID_SIZE - 2, center), TileKind::Base, "stage {index}");
            assert_eq!(grid.get(GRID_SIZE - 1, center), TileKind::Eagle, "stage {index}");
            assert_eq!(grid.get(GRID_SIZE - 3, center - 2), TileKind::Brick, "stage {index}");
        }
    }

    #[test]
    fn test_templates_keep_spawn_points_open() {
        for index in 0..STAGE_TEMPLATE_COUNT {
            let grid = stage_template(index);
            // three enemy lanes along the top and the player spawn area
            for (row, col) in [(1, 1), (1, GRID_SIZE / 2), (1, GRID_SIZE - 2)] {
                assert!(
                    grid.get(row, col).is_passable(),
                    "stage {index}: spawn tile ({row}, {col}) blocked"
                );
            }
            let player_row = GRID_SIZE - 4;
            let player_col = GRID_SIZE / 2 - 1;
            assert!(grid.get(player_row, player_col).is_passable(), "stage {index}");
        }
    }

    #[test]
    fn test_templates_are_reproducible() {
        for index in 0..STAGE_TEMPLATE_COUNT {
            assert_eq!(stage_template(index), stage_template(index));
        }
    }

    proptest! {
        #[test]
        fn prop_every_plan_row_sums_to_twenty(row in 0usize..35) {
            let total: usize = DISTRIBUTION_PLAN[row].iter().sum();
            prop_assert_eq!(total, TOTAL_ENEMIES_PER_STAGE);
        }

        #[test]
        fn prop_sequences_always_hold_twenty(stage in 0usize..200) {
            prop_assert_eq!(spawn_sequence(stage).len(), TOTAL_ENEMIES_PER_STAGE);
        }
    }
}
