//! Tank Battle - a top-down tile-based tank battle engine
//!
//! Core modules:
//! - `sim`: the simulation (tile grid, entities, collision, AI, stage loop)
//! - `stages`: authored stage templates and the enemy distribution plan
//! - `audio`: event-to-audio dispatch behind a host-implemented sink
//! - `settings`: audio/HUD preferences

pub mod audio;
pub mod settings;
pub mod sim;
pub mod stages;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Edge length of one terrain tile, in world units
    pub const TILE_SIZE: f32 = 16.0;
    /// Tiles per side of the square playfield
    pub const GRID_SIZE: usize = 26;
    /// Playfield edge length in world units
    pub const FIELD_SIZE: f32 = TILE_SIZE * GRID_SIZE as f32;

    /// Maximum frame delta fed to the simulation (tab-resume guard)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Fixed simulation timestep for the headless runner
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Hard cap on simultaneous live enemies
    pub const MAX_ENEMIES_ON_FIELD: usize = 4;
    /// Enemies released per stage
    pub const TOTAL_ENEMIES_PER_STAGE: usize = 20;

    /// Lives granted at the start of a run
    pub const PLAYER_BASE_LIVES: u32 = 3;
    /// Player base movement speed (world units per second)
    pub const PLAYER_BASE_SPEED: f32 = 60.0;
    /// Highest player upgrade level
    pub const PLAYER_MAX_LEVEL: u8 = 3;

    /// Bullet bounding box edge (half a tile)
    pub const BULLET_SIZE: f32 = TILE_SIZE / 2.0;
    pub const PLAYER_BULLET_SPEED: f32 = 220.0;
    pub const ENEMY_BULLET_SPEED: f32 = 180.0;
    pub const ENEMY_FIRE_COOLDOWN: f32 = 0.5;

    /// Grace-period shield on enemy spawn
    pub const ENEMY_SPAWN_SHIELD: f32 = 1.5;
    /// Shield granted to the player on (re)spawn
    pub const PLAYER_RESPAWN_SHIELD: f32 = 2.0;

    /// Delay before the first enemy release of a stage
    pub const SPAWN_TIMER_INITIAL: f32 = 1.5;
    /// Interval between subsequent enemy releases
    pub const SPAWN_TIMER_INTERVAL: f32 = 3.0;

    /// Seconds an uncollected power-up stays on the field
    pub const POWER_UP_LIFETIME: f32 = 10.0;
    /// A power-up drops on every Nth enemy kill
    pub const POWER_UP_KILL_INTERVAL: u32 = 4;
    pub const HELMET_SHIELD_DURATION: f32 = 10.0;
    pub const FREEZE_DURATION: f32 = 5.0;
    pub const SHOVEL_DURATION: f32 = 15.0;

    pub const EXPLOSION_RADIUS: f32 = 18.0;
    pub const EXPLOSION_DURATION: f32 = 0.4;

    pub const STAGE_INTRO_DURATION: f32 = 2.5;
    pub const GAME_OVER_DURATION: f32 = 5.0;
    /// Battle theme starts this long after the stage intro begins
    pub const BATTLE_THEME_DELAY: f32 = 2.0;
}

/// Convert a tile index to its top-left world coordinate
#[inline]
pub fn tile_to_coord(tile: usize) -> f32 {
    tile as f32 * consts::TILE_SIZE
}

/// Convert a world coordinate to the tile index containing it
#[inline]
pub fn coord_to_tile(coord: f32) -> usize {
    (coord / consts::TILE_SIZE).floor() as usize
}

/// Whether a point lies inside the playfield
#[inline]
pub fn is_inside_field(x: f32, y: f32) -> bool {
    x >= 0.0 && y >= 0.0 && x < consts::FIELD_SIZE && y < consts::FIELD_SIZE
}

/// Zero-padded six digit score display
pub fn format_score(value: u32) -> String {
    format!("{value:06}")
}

/// Zero-padded two digit stage number display
pub fn format_stage(value: usize) -> String {
    format!("{value:02}")
}
