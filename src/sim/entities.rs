//! Entity model: tanks, bullets, power-ups, explosions
//!
//! One `Tank` record covers both the player and enemies; per-kind behavior
//! is data looked up through `ControllerKind`, not virtual dispatch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::powerups::PowerUpKind;
use crate::consts::*;

/// Facing of a tank or flight direction of a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit displacement, screen coordinates (y grows downward)
    pub fn as_vec2(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Enemy archetypes with fixed stat tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Power,
    Armor,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Power,
        EnemyKind::Armor,
    ];

    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Basic => 50.0,
            EnemyKind::Fast => 70.0,
            EnemyKind::Power => 55.0,
            EnemyKind::Armor => 40.0,
        }
    }

    pub fn hit_points(self) -> i32 {
        match self {
            EnemyKind::Armor => 4,
            _ => 1,
        }
    }

    pub fn bullet_power(self) -> u8 {
        match self {
            EnemyKind::Power => 2,
            _ => 1,
        }
    }

    pub fn max_bullets(self) -> usize {
        match self {
            EnemyKind::Power => 2,
            _ => 1,
        }
    }

    pub fn score_value(self) -> u32 {
        match self {
            EnemyKind::Basic => 100,
            EnemyKind::Fast => 200,
            EnemyKind::Power => 300,
            EnemyKind::Armor => 400,
        }
    }

    /// Random direction re-rolls per second while wandering.
    /// Fast tanks re-roll twice as often as the rest.
    pub fn dir_change_rate(self) -> f32 {
        match self {
            EnemyKind::Fast => 1.2,
            _ => 0.6,
        }
    }

    /// Index into per-kind stat arrays (kill tallies)
    pub fn index(self) -> usize {
        match self {
            EnemyKind::Basic => 0,
            EnemyKind::Fast => 1,
            EnemyKind::Power => 2,
            EnemyKind::Armor => 3,
        }
    }
}

/// Who drives a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerKind {
    Player,
    Enemy(EnemyKind),
}

/// Stable entity id, unique within a run
pub type TankId = u32;

/// A tank on the field. Player and enemy variants share this record;
/// `upgrade` and `lives` are meaningful for the player only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: TankId,
    pub controller: ControllerKind,
    /// Top-left corner of the bounding box, world units
    pub pos: Vec2,
    pub dir: Direction,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
    /// Remaining shield; `damage` is a no-op while positive
    pub invincible: f32,
    /// Remaining freeze; a frozen tank neither moves nor fires
    pub frozen: f32,
    pub hit_points: i32,
    pub alive: bool,
    /// Player upgrade level 0-3
    pub upgrade: u8,
    /// Player remaining lives
    pub lives: u32,
}

impl Tank {
    pub fn new_player(id: TankId, pos: Vec2) -> Self {
        Self {
            id,
            controller: ControllerKind::Player,
            pos,
            dir: Direction::Up,
            cooldown: 0.0,
            invincible: PLAYER_RESPAWN_SHIELD,
            frozen: 0.0,
            hit_points: 1,
            alive: true,
            upgrade: 0,
            lives: PLAYER_BASE_LIVES,
        }
    }

    pub fn new_enemy(id: TankId, pos: Vec2, kind: EnemyKind) -> Self {
        Self {
            id,
            controller: ControllerKind::Enemy(kind),
            pos,
            dir: Direction::Down,
            cooldown: 0.0,
            invincible: ENEMY_SPAWN_SHIELD,
            frozen: 0.0,
            hit_points: kind.hit_points(),
            alive: true,
            upgrade: 0,
            lives: 0,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.controller, ControllerKind::Player)
    }

    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match self.controller {
            ControllerKind::Enemy(kind) => Some(kind),
            ControllerKind::Player => None,
        }
    }

    /// Bounding box edge; every tank occupies one tile
    pub fn size(&self) -> f32 {
        TILE_SIZE
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(TILE_SIZE / 2.0)
    }

    /// Movement speed, including the player upgrade bonus
    pub fn speed(&self) -> f32 {
        match self.controller {
            ControllerKind::Player => PLAYER_BASE_SPEED * (1.0 + self.upgrade as f32 * 0.15),
            ControllerKind::Enemy(kind) => kind.speed(),
        }
    }

    pub fn max_bullets(&self) -> usize {
        match self.controller {
            ControllerKind::Player => {
                if self.upgrade >= 2 {
                    2
                } else {
                    1
                }
            }
            ControllerKind::Enemy(kind) => kind.max_bullets(),
        }
    }

    pub fn fire_cooldown(&self) -> f32 {
        match self.controller {
            ControllerKind::Player => {
                if self.upgrade >= 3 {
                    0.15
                } else {
                    0.2
                }
            }
            ControllerKind::Enemy(_) => ENEMY_FIRE_COOLDOWN,
        }
    }

    pub fn bullet_power(&self) -> u8 {
        match self.controller {
            ControllerKind::Player => {
                if self.upgrade >= PLAYER_MAX_LEVEL {
                    2
                } else {
                    1
                }
            }
            ControllerKind::Enemy(kind) => kind.bullet_power(),
        }
    }

    pub fn bullet_speed(&self) -> f32 {
        match self.controller {
            ControllerKind::Player => PLAYER_BULLET_SPEED,
            ControllerKind::Enemy(_) => ENEMY_BULLET_SPEED,
        }
    }

    /// Apply a bullet hit. Returns true when the hit was lethal. Shielded
    /// tanks ignore damage entirely.
    pub fn damage(&mut self, power: u8) -> bool {
        if self.invincible > 0.0 {
            return false;
        }
        self.hit_points -= power as i32;
        if self.hit_points > 0 {
            return false;
        }
        self.alive = false;
        true
    }

    /// Extend the shield to at least `duration`, never shortening it
    pub fn grant_shield(&mut self, duration: f32) {
        self.invincible = self.invincible.max(duration);
    }

    /// Raise the player upgrade level by one, capped
    pub fn upgrade_level(&mut self) {
        self.upgrade = (self.upgrade + 1).min(PLAYER_MAX_LEVEL);
    }

    /// Put the player back at its spawn point with a fresh shield.
    /// Upgrade level and lives persist across respawns.
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.dir = Direction::Up;
        self.cooldown = 0.0;
        self.hit_points = 1;
        self.alive = true;
        self.invincible = PLAYER_RESPAWN_SHIELD;
    }
}

/// A bullet in flight. Direction is inherited at spawn and fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub owner: TankId,
    pub from_player: bool,
    pub pos: Vec2,
    pub dir: Direction,
    pub speed: f32,
    pub power: u8,
    pub alive: bool,
}

impl Bullet {
    /// Spawn a bullet centered on its owner's bounding box
    pub fn fired_by(tank: &Tank) -> Self {
        let offset = (TILE_SIZE - BULLET_SIZE) / 2.0;
        Self {
            owner: tank.id,
            from_player: tank.is_player(),
            pos: tank.pos + Vec2::splat(offset),
            dir: tank.dir,
            speed: tank.bullet_speed(),
            power: tank.bullet_power(),
            alive: true,
        }
    }

    pub fn size(&self) -> f32 {
        BULLET_SIZE
    }
}

/// A dropped power-up waiting to be collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    /// Seconds until it silently expires
    pub timer: f32,
    pub alive: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            timer: POWER_UP_LIFETIME,
            alive: true,
        }
    }

    pub fn size(&self) -> f32 {
        TILE_SIZE
    }

    pub fn tick(&mut self, dt: f32) {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.alive = false;
        }
    }
}

/// Decaying visual token with no gameplay effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub alive: bool,
}

impl Explosion {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            radius: EXPLOSION_RADIUS,
            duration: EXPLOSION_DURATION,
            elapsed: 0.0,
            alive: true,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armor_tank_survives_three_hits() {
        let mut tank = Tank::new_enemy(1, Vec2::ZERO, EnemyKind::Armor);
        tank.invincible = 0.0;
        for expected_hp in [3, 2, 1] {
            assert!(!tank.damage(1));
            assert_eq!(tank.hit_points, expected_hp);
            assert!(tank.alive);
        }
        assert!(tank.damage(1));
        assert!(!tank.alive);
    }

    #[test]
    fn test_shielded_tank_ignores_damage() {
        let mut tank = Tank::new_enemy(1, Vec2::ZERO, EnemyKind::Basic);
        assert!(tank.invincible > 0.0);
        assert!(!tank.damage(2));
        assert_eq!(tank.hit_points, 1);
        assert!(tank.alive);
    }

    #[test]
    fn test_grant_shield_never_shortens() {
        let mut tank = Tank::new_player(0, Vec2::ZERO);
        tank.invincible = 12.0;
        tank.grant_shield(10.0);
        assert_eq!(tank.invincible, 12.0);
        tank.invincible = 1.0;
        tank.grant_shield(10.0);
        assert_eq!(tank.invincible, 10.0);
    }

    #[test]
    fn test_player_upgrade_tables() {
        let mut player = Tank::new_player(0, Vec2::ZERO);
        assert_eq!(player.max_bullets(), 1);
        assert_eq!(player.bullet_power(), 1);
        assert_eq!(player.fire_cooldown(), 0.2);

        player.upgrade_level();
        player.upgrade_level();
        assert_eq!(player.upgrade, 2);
        assert_eq!(player.max_bullets(), 2);
        assert_eq!(player.bullet_power(), 1);

        player.upgrade_level();
        assert_eq!(player.upgrade, 3);
        assert_eq!(player.bullet_power(), 2);
        assert_eq!(player.fire_cooldown(), 0.15);

        // capped
        player.upgrade_level();
        assert_eq!(player.upgrade, PLAYER_MAX_LEVEL);
    }

    #[test]
    fn test_enemy_stat_table() {
        assert_eq!(EnemyKind::Basic.speed(), 50.0);
        assert_eq!(EnemyKind::Fast.speed(), 70.0);
        assert_eq!(EnemyKind::Power.bullet_power(), 2);
        assert_eq!(EnemyKind::Power.max_bullets(), 2);
        assert_eq!(EnemyKind::Armor.hit_points(), 4);
        assert_eq!(EnemyKind::Armor.score_value(), 400);
        assert!(EnemyKind::Fast.dir_change_rate() > EnemyKind::Basic.dir_change_rate());
    }

    #[test]
    fn test_bullet_inherits_owner_facing() {
        let mut tank = Tank::new_player(0, Vec2::new(32.0, 48.0));
        tank.dir = Direction::Left;
        let bullet = Bullet::fired_by(&tank);
        assert_eq!(bullet.dir, Direction::Left);
        assert!(bullet.from_player);
        // centered on the tank's box
        assert_eq!(bullet.pos, Vec2::new(36.0, 52.0));
    }

    #[test]
    fn test_power_up_expires() {
        let mut power_up = PowerUp::new(PowerUpKind::Star, Vec2::ZERO);
        power_up.tick(POWER_UP_LIFETIME - 0.1);
        assert!(power_up.alive);
        power_up.tick(0.2);
        assert!(!power_up.alive);
    }

    #[test]
    fn test_explosion_decays() {
        let mut explosion = Explosion::at(Vec2::ZERO);
        explosion.tick(EXPLOSION_DURATION / 2.0);
        assert!(explosion.alive);
        explosion.tick(EXPLOSION_DURATION);
        assert!(!explosion.alive);
    }
}
