//! Stage runtime state and core orchestration types
//!
//! `StageRuntime` owns every piece of mutable stage state (grid, entities,
//! timers, score, RNG) for the duration of a stage; per-system update
//! functions borrow into it and nothing retains a writable reference across
//! frames.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{Bullet, Direction, EnemyKind, Explosion, PowerUp, Tank, TankId};
use super::powerups::PowerUpKind;
use super::tiles::TileGrid;
use crate::consts::*;
use crate::stages::{self, StageDefinition};

/// Current phase of the stage life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a start action
    Menu,
    /// Stage banner, fixed timer
    StageIntro,
    /// Active gameplay
    Playing,
    /// Gameplay suspended, toggled by the pause action
    Paused,
    /// Run ended; returns to the menu after a fixed timer
    GameOver,
    /// Per-stage tally, waiting for the advance action
    Score,
}

/// Simulation events of one tick, drained by the host for audio/UI.
/// Purely fire-and-forget; the simulation never reads them back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A tank fired a bullet
    Fired,
    /// Something exploded (tank, tile or bullet cancellation)
    Explosion,
    PowerUpCollected(PowerUpKind),
    EnemyDestroyed { kind: EnemyKind, score: u32 },
    PlayerDied { lives_left: u32 },
    PauseToggled,
    /// A fresh run began
    RunStarted,
    /// The deferred battle theme should start now
    BattleThemeDue,
    StageCleared { stage: usize },
    GameOver,
}

/// What to draw for one entity; a pure data sink for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpriteKind {
    PlayerTank,
    EnemyTank(EnemyKind),
    Bullet,
    PowerUp(PowerUpKind),
    Explosion { progress: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub pos: Vec2,
    pub dir: Option<Direction>,
    pub shielded: bool,
}

/// Where the player (re)spawns, just below the base row
pub fn player_spawn_position() -> Vec2 {
    Vec2::new(FIELD_SIZE / 2.0 - TILE_SIZE, FIELD_SIZE - TILE_SIZE * 4.0)
}

/// Complete mutable state of a run
#[derive(Debug, Clone)]
pub struct StageRuntime {
    /// Run seed; a test seam, not a replay guarantee
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Monotonic stage index; template and spawn-table lookups wrap
    pub stage_index: usize,
    /// Stage shown on the Score screen (the one just finished)
    pub last_completed_stage: usize,

    pub score: u32,
    pub hi_score: u32,
    pub stage_score: u32,
    /// Kills this stage, drives the power-up drop trigger
    pub kills: u32,
    /// Per-kind kill tally for the Score screen, indexed by `EnemyKind::index`
    pub kill_stats: [u32; 4],

    pub grid: TileGrid,
    pub player: Tank,
    pub enemies: Vec<Tank>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    pub spawn_queue: VecDeque<EnemyKind>,

    pub spawn_timer: f32,
    pub freeze_timer: f32,
    pub shovel_timer: f32,
    pub intro_timer: f32,
    pub game_over_timer: f32,
    /// Scheduled simulation-time event: battle theme start
    pub battle_theme_timer: Option<f32>,
    pub base_destroyed: bool,
    /// Simulation time within the current stage
    pub time: f32,

    pub events: Vec<GameEvent>,
    next_id: TankId,
}

impl StageRuntime {
    /// Fresh runtime on the menu screen
    pub fn new(seed: u64) -> Self {
        let mut runtime = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            stage_index: 0,
            last_completed_stage: 0,
            score: 0,
            hi_score: 0,
            stage_score: 0,
            kills: 0,
            kill_stats: [0; 4],
            grid: TileGrid::empty(),
            player: Tank::new_player(0, player_spawn_position()),
            enemies: Vec::new(),
            bullets: Vec::new(),
            power_ups: Vec::new(),
            explosions: Vec::new(),
            spawn_queue: VecDeque::new(),
            spawn_timer: SPAWN_TIMER_INITIAL,
            freeze_timer: 0.0,
            shovel_timer: 0.0,
            intro_timer: 0.0,
            game_over_timer: 0.0,
            battle_theme_timer: None,
            base_destroyed: false,
            time: 0.0,
            events: Vec::new(),
            next_id: 1,
        };
        runtime.player.id = runtime.next_entity_id();
        runtime
    }

    pub fn next_entity_id(&mut self) -> TankId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset run-level state and enter the first stage intro
    pub fn start_new_game(&mut self) {
        log::info!("starting new run (seed {})", self.seed);
        self.stage_index = 0;
        self.score = 0;
        self.stage_score = 0;
        self.last_completed_stage = 0;
        self.player = Tank::new_player(self.next_entity_id(), player_spawn_position());
        self.events.push(GameEvent::RunStarted);
        self.enter_stage();
    }

    /// Load the current stage definition and enter the intro
    pub fn enter_stage(&mut self) {
        let StageDefinition { template, sequence } = stages::stage_definition(self.stage_index);
        self.grid = template;
        self.spawn_queue = sequence.into_iter().collect();
        self.enemies.clear();
        self.bullets.clear();
        self.power_ups.clear();
        self.explosions.clear();
        self.spawn_timer = SPAWN_TIMER_INITIAL;
        self.freeze_timer = 0.0;
        self.shovel_timer = 0.0;
        self.base_destroyed = false;
        self.kills = 0;
        self.kill_stats = [0; 4];
        self.stage_score = 0;
        self.time = 0.0;
        self.intro_timer = STAGE_INTRO_DURATION;
        self.battle_theme_timer = Some(BATTLE_THEME_DELAY);
        self.player.respawn(player_spawn_position());
        self.phase = GamePhase::StageIntro;
        log::info!("entering stage {}", self.stage_index + 1);
    }

    /// Live bullets currently owned by one tank
    pub fn owner_bullet_count(&self, owner: TankId) -> usize {
        self.bullets
            .iter()
            .filter(|b| b.alive && b.owner == owner)
            .count()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    /// Add to the score, tracking the in-memory hi-score
    pub fn add_score(&mut self, value: u32) {
        self.score += value;
        self.stage_score += value;
        if self.score > self.hi_score {
            self.hi_score = self.score;
        }
    }

    /// Hand the tick's events to the host
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Per-entity draw records for the renderer collaborator. Empty outside
    /// of active play; the grid itself is composited separately.
    pub fn draw_list(&self) -> Vec<Sprite> {
        if !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return Vec::new();
        }
        let mut sprites = Vec::new();
        if self.player.alive {
            sprites.push(Sprite {
                kind: SpriteKind::PlayerTank,
                pos: self.player.pos,
                dir: Some(self.player.dir),
                shielded: self.player.invincible > 0.0,
            });
        }
        for enemy in self.enemies.iter().filter(|e| e.alive) {
            sprites.push(Sprite {
                kind: SpriteKind::EnemyTank(enemy.enemy_kind().expect("enemy controller")),
                pos: enemy.pos,
                dir: Some(enemy.dir),
                shielded: enemy.invincible > 0.0,
            });
        }
        for bullet in self.bullets.iter().filter(|b| b.alive) {
            sprites.push(Sprite {
                kind: SpriteKind::Bullet,
                pos: bullet.pos,
                dir: Some(bullet.dir),
                shielded: false,
            });
        }
        for power_up in self.power_ups.iter().filter(|p| p.alive) {
            sprites.push(Sprite {
                kind: SpriteKind::PowerUp(power_up.kind),
                pos: power_up.pos,
                dir: None,
                shielded: false,
            });
        }
        for explosion in self.explosions.iter().filter(|e| e.alive) {
            sprites.push(Sprite {
                kind: SpriteKind::Explosion {
                    progress: (explosion.elapsed / explosion.duration).clamp(0.0, 1.0),
                },
                pos: explosion.pos,
                dir: None,
                shielded: false,
            });
        }
        sprites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_runtime_is_on_menu() {
        let runtime = StageRuntime::new(1);
        assert_eq!(runtime.phase, GamePhase::Menu);
        assert_eq!(runtime.score, 0);
        assert_eq!(runtime.player.lives, PLAYER_BASE_LIVES);
    }

    #[test]
    fn test_enter_stage_loads_definition() {
        let mut runtime = StageRuntime::new(1);
        runtime.start_new_game();
        assert_eq!(runtime.phase, GamePhase::StageIntro);
        assert_eq!(runtime.spawn_queue.len(), TOTAL_ENEMIES_PER_STAGE);
        assert!(runtime.enemies.is_empty());
        assert_eq!(runtime.intro_timer, STAGE_INTRO_DURATION);
        assert_eq!(runtime.battle_theme_timer, Some(BATTLE_THEME_DELAY));
        assert!(runtime.events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_start_new_game_resets_run_state() {
        let mut runtime = StageRuntime::new(1);
        runtime.start_new_game();
        runtime.add_score(1200);
        runtime.stage_index = 3;
        runtime.player.lives = 1;
        runtime.start_new_game();
        assert_eq!(runtime.score, 0);
        assert_eq!(runtime.stage_index, 0);
        assert_eq!(runtime.player.lives, PLAYER_BASE_LIVES);
        // hi-score survives the reset in memory
        assert_eq!(runtime.hi_score, 1200);
    }

    #[test]
    fn test_owner_bullet_count_ignores_dead() {
        let mut runtime = StageRuntime::new(1);
        runtime.start_new_game();
        let mut bullet = Bullet::fired_by(&runtime.player);
        runtime.bullets.push(bullet.clone());
        bullet.alive = false;
        runtime.bullets.push(bullet);
        assert_eq!(runtime.owner_bullet_count(runtime.player.id), 1);
    }

    #[test]
    fn test_draw_list_empty_outside_play() {
        let mut runtime = StageRuntime::new(1);
        assert!(runtime.draw_list().is_empty());
        runtime.start_new_game();
        assert!(runtime.draw_list().is_empty());
        runtime.phase = GamePhase::Playing;
        // player tank at minimum
        assert_eq!(runtime.draw_list().len(), 1);
    }

    #[test]
    fn test_take_events_drains() {
        let mut runtime = StageRuntime::new(1);
        runtime.start_new_game();
        assert!(!runtime.take_events().is_empty());
        assert!(runtime.take_events().is_empty());
    }
}
