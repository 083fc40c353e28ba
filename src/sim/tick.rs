//! Per-frame simulation update and stage life cycle
//!
//! One `tick` call advances the whole simulation by `dt` (clamped). The
//! update order inside Playing is fixed and load-bearing for interaction
//! determinism: player, enemies, freeze bookkeeping, bullets, power-ups,
//! explosions, spawn timer, shovel timer, death/loss checks, completion.
//! Collections are never edited mid-traversal; entities are marked dead and
//! compacted once per frame.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::ai;
use super::collision::{aabb_overlap, align_axis_to_grid, box_inside_field, can_occupy, tile_span};
use super::entities::{Bullet, Direction, EnemyKind, Explosion, PowerUp, Tank, TankId};
use super::powerups::{self, PowerUpKind};
use super::spawn;
use super::state::{GameEvent, GamePhase, StageRuntime, player_spawn_position};
use super::tiles::TileKind;
use crate::consts::*;
use crate::tile_to_coord;

/// Input commands for a single tick.
///
/// Direction and fire flags are level-triggered (held keys); `pause`,
/// `start` and `advance` are edge-triggered one-shots the host clears after
/// each processed frame.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Toggle pause (one-shot)
    pub pause: bool,
    /// Start a run from the menu or game-over screen (one-shot)
    pub start: bool,
    /// Advance past the score screen (one-shot)
    pub advance: bool,
    /// Demo mode: an autopilot drives the player
    pub idle_mode: bool,
}

impl TickInput {
    fn desired_direction(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Advance the simulation by one frame
pub fn tick(rt: &mut StageRuntime, input: &TickInput, dt: f32) {
    let dt = dt.min(MAX_FRAME_DT);
    let input = if input.idle_mode {
        autopilot(rt, input)
    } else {
        input.clone()
    };

    match rt.phase {
        GamePhase::Menu => {
            if input.start {
                rt.start_new_game();
            }
        }
        GamePhase::StageIntro => {
            tick_battle_theme(rt, dt);
            rt.intro_timer -= dt;
            if rt.intro_timer <= 0.0 {
                rt.phase = GamePhase::Playing;
                log::debug!("stage {} intro done, playing", rt.stage_index + 1);
            }
        }
        GamePhase::Playing => {
            if input.pause {
                rt.phase = GamePhase::Paused;
                rt.events.push(GameEvent::PauseToggled);
                return;
            }
            update_playing(rt, &input, dt);
        }
        GamePhase::Paused => {
            if input.pause {
                rt.phase = GamePhase::Playing;
                rt.events.push(GameEvent::PauseToggled);
            }
        }
        GamePhase::GameOver => {
            if input.start {
                rt.start_new_game();
                return;
            }
            rt.game_over_timer -= dt;
            if rt.game_over_timer <= 0.0 {
                rt.phase = GamePhase::Menu;
            }
        }
        GamePhase::Score => {
            if input.advance {
                rt.enter_stage();
            }
        }
    }
}

/// One frame of active play, in the fixed order documented above
fn update_playing(rt: &mut StageRuntime, input: &TickInput, dt: f32) {
    rt.time += dt;
    tick_battle_theme(rt, dt);

    update_player(rt, input, dt);
    update_enemies(rt, dt);

    // freeze bookkeeping: thaw everyone when the global timer runs out
    if rt.freeze_timer > 0.0 {
        rt.freeze_timer -= dt;
        if rt.freeze_timer <= 0.0 {
            for enemy in &mut rt.enemies {
                enemy.frozen = 0.0;
            }
        }
    }

    update_bullets(rt, dt);
    update_power_ups(rt, dt);

    for explosion in &mut rt.explosions {
        explosion.tick(dt);
    }
    rt.explosions.retain(|e| e.alive);

    rt.spawn_timer -= dt;
    if rt.spawn_timer <= 0.0 {
        let id = rt.next_entity_id();
        let live_enemy_count = rt.live_enemy_count();
        let freeze_timer = rt.freeze_timer;
        if let Some(enemy) =
            spawn::try_release(&mut rt.spawn_queue, live_enemy_count, freeze_timer, id)
        {
            rt.enemies.push(enemy);
        }
        rt.spawn_timer = SPAWN_TIMER_INTERVAL;
    }

    if rt.shovel_timer > 0.0 {
        rt.shovel_timer -= dt;
        if rt.shovel_timer <= 0.0 {
            rt.grid.reinforce_base(false);
            log::debug!("shovel expired, base walls back to brick");
        }
    }

    if !rt.player.alive {
        handle_player_death(rt);
    }
    if rt.base_destroyed {
        enter_game_over(rt);
    }
    if rt.phase != GamePhase::Playing {
        return;
    }

    if spawn::stage_complete(&rt.spawn_queue, rt.live_enemy_count()) {
        rt.last_completed_stage = rt.stage_index;
        rt.stage_index += 1;
        rt.phase = GamePhase::Score;
        rt.events.push(GameEvent::StageCleared {
            stage: rt.last_completed_stage,
        });
        log::info!(
            "stage {} cleared, score {}",
            rt.last_completed_stage + 1,
            rt.score
        );
    }
}

fn tick_battle_theme(rt: &mut StageRuntime, dt: f32) {
    if let Some(timer) = &mut rt.battle_theme_timer {
        *timer -= dt;
        if *timer <= 0.0 {
            rt.battle_theme_timer = None;
            rt.events.push(GameEvent::BattleThemeDue);
        }
    }
}

/// Snapshot of live tank boxes for movement tests; entries are refreshed as
/// tanks settle so two movers cannot claim the same space in one frame.
fn tank_boxes(player: &Tank, enemies: &[Tank]) -> Vec<(TankId, Vec2)> {
    let mut boxes = Vec::with_capacity(1 + enemies.len());
    if player.alive {
        boxes.push((player.id, player.pos));
    }
    boxes.extend(enemies.iter().filter(|e| e.alive).map(|e| (e.id, e.pos)));
    boxes
}

/// Fire if the cooldown has elapsed and the owner is under its bullet cap.
/// A rejected request is a no-op: no bullet, cooldown untouched.
fn try_fire(tank: &mut Tank, bullets: &mut Vec<Bullet>, events: &mut Vec<GameEvent>) {
    let live = bullets
        .iter()
        .filter(|b| b.alive && b.owner == tank.id)
        .count();
    if tank.cooldown > 0.0 || live >= tank.max_bullets() {
        return;
    }
    bullets.push(Bullet::fired_by(tank));
    tank.cooldown = tank.fire_cooldown();
    events.push(GameEvent::Fired);
}

fn update_player(rt: &mut StageRuntime, input: &TickInput, dt: f32) {
    let StageRuntime {
        grid,
        player,
        enemies,
        bullets,
        events,
        ..
    } = rt;
    if !player.alive {
        return;
    }
    player.invincible = (player.invincible - dt).max(0.0);

    if let Some(desired) = input.desired_direction() {
        player.dir = desired;
        let velocity = player.speed() * dt;
        let max_coordinate = FIELD_SIZE - player.size();
        let boxes = tank_boxes(player, enemies);

        // grid-alignment assist: spend part of the velocity budget snapping
        // the off-axis coordinate to the nearest tile boundary first
        if desired.is_vertical() {
            let aligned_x = align_axis_to_grid(player.pos.x, max_coordinate, velocity);
            if aligned_x != player.pos.x {
                let candidate = Vec2::new(aligned_x, player.pos.y);
                if can_occupy(grid, candidate, player.size(), player.id, &boxes) {
                    player.pos = candidate;
                }
            }
        } else {
            let aligned_y = align_axis_to_grid(player.pos.y, max_coordinate, velocity);
            if aligned_y != player.pos.y {
                let candidate = Vec2::new(player.pos.x, aligned_y);
                if can_occupy(grid, candidate, player.size(), player.id, &boxes) {
                    player.pos = candidate;
                }
            }
        }

        let target = player.pos + desired.as_vec2() * velocity;
        if can_occupy(grid, target, player.size(), player.id, &boxes) {
            player.pos = target;
        }
    }

    if input.fire {
        try_fire(player, bullets, events);
    }
    player.cooldown -= dt;
}

fn update_enemies(rt: &mut StageRuntime, dt: f32) {
    let StageRuntime {
        grid,
        player,
        enemies,
        bullets,
        events,
        rng,
        ..
    } = rt;
    let mut boxes = tank_boxes(player, enemies);

    for i in 0..enemies.len() {
        let enemy = &mut enemies[i];
        if !enemy.alive {
            continue;
        }
        enemy.invincible = (enemy.invincible - dt).max(0.0);
        if enemy.frozen > 0.0 {
            enemy.frozen -= dt;
            continue;
        }

        let intent = ai::drive_enemy(enemy, Some(&*player), rng, dt);

        let candidate = enemy.pos + enemy.dir.as_vec2() * enemy.speed() * dt;
        if can_occupy(grid, candidate, enemy.size(), enemy.id, &boxes) {
            enemy.pos = candidate;
            if let Some(entry) = boxes.iter_mut().find(|(id, _)| *id == enemy.id) {
                entry.1 = candidate;
            }
        } else if let Some(dir) = Direction::ALL.choose(rng) {
            // simple wall avoidance: blocked movers pick a new random facing
            enemy.dir = *dir;
        }

        if intent.wants_fire {
            try_fire(enemy, bullets, events);
        }
        enemy.cooldown -= dt;
    }
}

/// Integrate and resolve every live bullet: field bounds, then terrain in
/// raster order, then opposing tanks, then enemy-vs-player bullet
/// cancellation. First hit wins; a bullet never damages twice.
fn update_bullets(rt: &mut StageRuntime, dt: f32) {
    let mut killed: Vec<(EnemyKind, Vec2)> = Vec::new();
    let mut base_hit = false;

    {
        let StageRuntime {
            grid,
            player,
            enemies,
            bullets,
            explosions,
            events,
            ..
        } = rt;

        for i in 0..bullets.len() {
            if !bullets[i].alive {
                continue;
            }
            let step = bullets[i].dir.as_vec2() * bullets[i].speed * dt;
            bullets[i].pos += step;

            let (pos, size, power, from_player) =
                (bullets[i].pos, bullets[i].size(), bullets[i].power, bullets[i].from_player);

            if !box_inside_field(pos, size) {
                bullets[i].alive = false;
                continue;
            }

            // terrain, raster order over the overlapped cells
            let (row0, col0, row1, col1) = tile_span(pos, size);
            'terrain: for row in row0..=row1 {
                for col in col0..=col1 {
                    let tile = grid.get(row, col);
                    if tile.is_bullet_blocking() {
                        let was_base = tile == TileKind::Base;
                        if grid.hit(row, col, power) {
                            explosions.push(Explosion::at(tile_center(row, col)));
                            events.push(GameEvent::Explosion);
                            if was_base {
                                base_hit = true;
                            }
                        }
                        bullets[i].alive = false;
                        break 'terrain;
                    }
                    if tile == TileKind::Eagle {
                        grid.set(row, col, TileKind::Empty);
                        explosions.push(Explosion::at(tile_center(row, col)));
                        events.push(GameEvent::Explosion);
                        base_hit = true;
                        bullets[i].alive = false;
                        break 'terrain;
                    }
                }
            }
            if !bullets[i].alive {
                continue;
            }

            if from_player {
                for enemy in enemies.iter_mut() {
                    if !enemy.alive {
                        continue;
                    }
                    if aabb_overlap(pos, size, enemy.pos, enemy.size()) {
                        let lethal = enemy.damage(power);
                        bullets[i].alive = false;
                        if lethal {
                            killed.push((
                                enemy.enemy_kind().expect("enemy controller"),
                                enemy.center(),
                            ));
                        }
                        break;
                    }
                }
            } else {
                if player.alive && aabb_overlap(pos, size, player.pos, player.size()) {
                    let lethal = player.damage(power);
                    bullets[i].alive = false;
                    if lethal {
                        explosions.push(Explosion::at(player.center()));
                        events.push(GameEvent::Explosion);
                    }
                    continue;
                }
                // enemy bullets cancel against player bullets, never
                // against each other
                for j in 0..bullets.len() {
                    if j == i || !bullets[j].alive || !bullets[j].from_player {
                        continue;
                    }
                    if aabb_overlap(pos, size, bullets[j].pos, bullets[j].size()) {
                        bullets[i].alive = false;
                        bullets[j].alive = false;
                        explosions.push(Explosion::at(pos + Vec2::splat(size / 2.0)));
                        events.push(GameEvent::Explosion);
                        break;
                    }
                }
            }
        }
    }

    rt.bullets.retain(|b| b.alive);
    for (kind, center) in killed {
        credit_kill(rt, kind, center);
    }
    rt.enemies.retain(|e| e.alive);
    if base_hit {
        rt.base_destroyed = true;
    }
}

fn tile_center(row: usize, col: usize) -> Vec2 {
    Vec2::new(
        tile_to_coord(col) + TILE_SIZE / 2.0,
        tile_to_coord(row) + TILE_SIZE / 2.0,
    )
}

/// Credit one enemy kill: tally, score, explosion, and the every-4th-kill
/// power-up drop. Used by bullets and by the grenade effect alike.
fn credit_kill(rt: &mut StageRuntime, kind: EnemyKind, center: Vec2) {
    rt.kills += 1;
    rt.kill_stats[kind.index()] += 1;
    rt.add_score(kind.score_value());
    rt.explosions.push(Explosion::at(center));
    rt.events.push(GameEvent::EnemyDestroyed {
        kind,
        score: kind.score_value(),
    });
    if rt.kills % POWER_UP_KILL_INTERVAL == 0 {
        let drop = powerups::random_kind(&mut rt.rng);
        let pos = powerups::sample_drop_position(&rt.grid, &mut rt.rng);
        rt.power_ups.push(PowerUp::new(drop, pos));
        log::debug!("power-up drop: {drop:?} after {} kills", rt.kills);
    }
}

fn update_power_ups(rt: &mut StageRuntime, dt: f32) {
    let mut collected: Vec<PowerUpKind> = Vec::new();
    {
        let StageRuntime {
            player, power_ups, ..
        } = rt;
        for power_up in power_ups.iter_mut() {
            if power_up.alive
                && player.alive
                && aabb_overlap(player.pos, player.size(), power_up.pos, power_up.size())
            {
                power_up.alive = false;
                collected.push(power_up.kind);
            }
            power_up.tick(dt);
        }
    }
    for kind in collected {
        apply_power_up(rt, kind);
        rt.events.push(GameEvent::PowerUpCollected(kind));
    }
    rt.power_ups.retain(|p| p.alive);
}

/// Apply one collected power-up effect
fn apply_power_up(rt: &mut StageRuntime, kind: PowerUpKind) {
    log::debug!("collected {kind:?}");
    match kind {
        PowerUpKind::Helmet => rt.player.grant_shield(HELMET_SHIELD_DURATION),
        PowerUpKind::Timer => {
            rt.freeze_timer = FREEZE_DURATION;
            for enemy in &mut rt.enemies {
                enemy.frozen = FREEZE_DURATION;
            }
        }
        PowerUpKind::Shovel => {
            // re-activation resets the countdown, never accumulates
            rt.shovel_timer = SHOVEL_DURATION;
            rt.grid.reinforce_base(true);
        }
        PowerUpKind::Star => rt.player.upgrade_level(),
        PowerUpKind::Grenade => {
            let doomed: Vec<(EnemyKind, Vec2)> = rt
                .enemies
                .iter()
                .filter(|e| e.alive)
                .map(|e| (e.enemy_kind().expect("enemy controller"), e.center()))
                .collect();
            for enemy in &mut rt.enemies {
                enemy.alive = false;
            }
            // every victim is a full kill: score, tally, drop trigger
            for (enemy_kind, center) in doomed {
                credit_kill(rt, enemy_kind, center);
            }
            rt.enemies.clear();
        }
        PowerUpKind::Tank => rt.player.lives += 1,
        PowerUpKind::Gun => rt.player.upgrade = PLAYER_MAX_LEVEL,
    }
}

fn handle_player_death(rt: &mut StageRuntime) {
    if rt.player.lives > 0 {
        rt.player.lives -= 1;
        rt.player.respawn(player_spawn_position());
        // the old tank's bullets die with it
        let player_id = rt.player.id;
        rt.bullets.retain(|b| !(b.from_player && b.owner == player_id));
        rt.events.push(GameEvent::PlayerDied {
            lives_left: rt.player.lives,
        });
        log::info!("player down, {} lives left", rt.player.lives);
    } else {
        enter_game_over(rt);
    }
}

fn enter_game_over(rt: &mut StageRuntime) {
    if rt.phase == GamePhase::GameOver {
        return;
    }
    rt.phase = GamePhase::GameOver;
    rt.game_over_timer = GAME_OVER_DURATION;
    rt.events.push(GameEvent::GameOver);
    log::info!("game over, final score {}", rt.score);
}

/// Demo-mode input synthesis: starts runs, advances screens, wanders and
/// fires continuously while playing.
fn autopilot(rt: &mut StageRuntime, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    match rt.phase {
        GamePhase::Menu | GamePhase::GameOver => input.start = true,
        GamePhase::Score => input.advance = true,
        GamePhase::Playing => {
            // hold a heading for a couple of seconds, occasionally re-rolled
            let heading = (rt.time / 2.0) as usize + rt.seed as usize;
            match Direction::ALL[heading % 4] {
                Direction::Up => input.up = true,
                Direction::Right => input.right = true,
                Direction::Down => input.down = true,
                Direction::Left => input.left = true,
            }
            input.fire = rt.rng.random::<f32>() < 0.5;
        }
        _ => {}
    }
    input
}
