//! Per-tick session update
//!
//! Order within a tick: scheduled tasks, aim, player movement intent, firing,
//! enemy steering, movement against the map, overlap resolution, wave-clear
//! check. Nothing runs while the game is over except the restart control.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use super::collision::{circle_in_bounds, clamp_to_bounds};
use super::combat;
use super::map::{Blocker, TileMap};
use super::state::{Body, GameState, Projectile};
use super::timers::TimedTask;
use super::wave;
use crate::Facing;

/// Autopilot backs off from enemies closer than this
const AUTOPILOT_KEEP_AWAY: f32 = 180.0;
/// Autopilot drifts back toward the map center beyond this distance
const AUTOPILOT_HOME_RADIUS: f32 = 200.0;

/// Input state for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Pointer position in world coordinates (None keeps the last aim)
    pub pointer: Option<Vec2>,
    /// Pointer held down
    pub fire: bool,
    /// Restart control activated; honored only after game over
    pub restart: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the session by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if state.is_game_over() {
        if input.restart {
            state.restart();
        }
        return;
    }

    let input = if input.idle_mode {
        autopilot(state, input)
    } else {
        input.clone()
    };

    state.time_ms += dt_ms as f64;
    run_due_tasks(state);

    if let Some(pointer) = input.pointer {
        state.reticle = pointer;
    }

    let speed = state.config.player_speed;
    state.player.body.vel = Vec2::new(axis(input.left, input.right), axis(input.up, input.down)) * speed;
    state.player.facing = Facing::toward(state.player.body.pos.x, state.reticle.x);

    if input.fire && state.time_ms > state.next_fire_ms {
        fire(state);
    }

    steer_enemies(state, dt_ms);
    move_bodies(state, dt_ms / 1000.0);
    resolve_overlaps(state);

    if !state.is_game_over()
        && state.active_enemies() == 0
        && !state.timers.is_pending(|t| *t == TimedTask::StartWave)
    {
        let delay = state.config.wave_delay_ms;
        state.timers.schedule(state.time_ms, delay, TimedTask::StartWave);
    }
}

/// Resolve one movement axis. Holding both directions cancels out.
fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

fn run_due_tasks(state: &mut GameState) {
    for task in state.timers.take_due(state.time_ms) {
        match task {
            TimedTask::StartWave => {
                wave::start_next_wave(state);
            }
            TimedTask::ClearEnemyTint(enemy) => combat::clear_enemy_tint(state, enemy),
        }
    }
}

/// Shoot at the reticle. A full projectile pool drops the shot and leaves
/// the cooldown untouched.
fn fire(state: &mut GameState) {
    let from = state.player.body.pos;
    let target = if state.reticle == from {
        from + Vec2::X
    } else {
        state.reticle
    };
    let shot = Projectile::fire(
        from,
        target,
        state.config.projectile_speed,
        state.config.projectile_radius,
    );
    if state.projectiles.acquire(shot).is_some() {
        state.next_fire_ms = state.time_ms + state.config.fire_rate_ms as f64;
        state.stats.shots_fired += 1;
    } else {
        log::debug!("Projectile pool full, shot dropped");
    }
}

/// Weaving pursuit: each enemy heads for the player plus a random offset
/// that is re-rolled on a fixed interval.
fn steer_enemies(state: &mut GameState, dt_ms: f32) {
    let player = state.player.body.pos;
    let interval = state.config.retarget_interval_ms;
    let bound = state.config.target_offset_bound;
    let dead_zone = state.config.facing_dead_zone;
    let rng = &mut state.rng;

    for (_, enemy) in state.enemies.iter_mut() {
        enemy.retarget_ms -= dt_ms;
        if enemy.retarget_ms <= 0.0 {
            enemy.retarget_ms = interval;
            enemy.target_offset = Vec2::new(
                rng.random_range(-bound..=bound) as f32,
                rng.random_range(-bound..=bound) as f32,
            );
        }
        enemy.body.move_toward(player + enemy.target_offset, enemy.speed);
        enemy.facing = Facing::from_velocity_x(enemy.facing, enemy.body.vel.x, dead_zone);
    }
}

/// Move a body one axis at a time. A step that would overlap a blocking tile
/// is undone on that axis. A body already inside a tile may only take steps
/// that leave it less deep, so it can get out but not push further in.
/// Bouncing bodies reflect velocity off tiles and world edges.
fn step_body(map: &TileMap, body: &mut Body, dt_s: f32, who: Blocker, bounce: bool) {
    let delta = body.vel * dt_s;

    if delta.x != 0.0 {
        let next = Vec2::new(body.pos.x + delta.x, body.pos.y);
        if blocked(map, body, next, who) {
            if bounce {
                body.vel.x = -body.vel.x;
            }
        } else {
            body.pos = next;
        }
    }
    if delta.y != 0.0 {
        let next = Vec2::new(body.pos.x, body.pos.y + delta.y);
        if blocked(map, body, next, who) {
            if bounce {
                body.vel.y = -body.vel.y;
            }
        } else {
            body.pos = next;
        }
    }

    let contact = clamp_to_bounds(&map.world_bounds(), body.pos, body.radius);
    body.pos = contact.pos;
    if bounce {
        if contact.hit_x {
            body.vel.x = -body.vel.x;
        }
        if contact.hit_y {
            body.vel.y = -body.vel.y;
        }
    }
}

fn blocked(map: &TileMap, body: &Body, next: Vec2, who: Blocker) -> bool {
    let depth_next = map.penetration(next, body.radius, who);
    depth_next > 0.0 && depth_next >= map.penetration(body.pos, body.radius, who)
}

fn move_bodies(state: &mut GameState, dt_s: f32) {
    let map = Arc::clone(&state.map);

    step_body(&map, &mut state.player.body, dt_s, Blocker::Player, false);
    for (_, enemy) in state.enemies.iter_mut() {
        step_body(&map, &mut enemy.body, dt_s, Blocker::Enemy, true);
    }

    // Projectiles fly straight; tiles and leaving the world destroy them
    let bounds = map.world_bounds();
    for shot in state.projectiles.handles() {
        let Some(projectile) = state.projectiles.get_mut(shot) else {
            continue;
        };
        projectile.body.pos += projectile.body.vel * dt_s;
        let body = projectile.body;
        if map.circle_hits(body.pos, body.radius, Blocker::Projectile) {
            combat::projectile_hits_map(state, shot);
        } else if !circle_in_bounds(&bounds, body.pos, body.radius) {
            state.projectiles.release(shot);
        }
    }
}

fn resolve_overlaps(state: &mut GameState) {
    let enemies = state.enemies.handles();

    for shot in state.projectiles.handles() {
        for &enemy in &enemies {
            let (Some(projectile), Some(target)) = (state.projectiles.get(shot), state.enemies.get(enemy)) else {
                continue;
            };
            if projectile.body.overlaps(&target.body) {
                combat::projectile_hits_enemy(state, shot, enemy);
            }
        }
    }

    for enemy in enemies {
        let Some(target) = state.enemies.get(enemy) else {
            continue;
        };
        if state.player.body.overlaps(&target.body) {
            combat::player_hits_enemy(state, enemy);
        }
    }
}

/// Demo input: aim and fire at the nearest enemy, back away from close ones,
/// otherwise wander home to the map center.
fn autopilot(state: &GameState, input: &TickInput) -> TickInput {
    let me = state.player.body.pos;
    let nearest = state
        .enemies
        .iter()
        .map(|(_, e)| e.body.pos)
        .min_by(|a, b| {
            a.distance_squared(me)
                .partial_cmp(&b.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut out = TickInput {
        restart: input.restart,
        idle_mode: true,
        ..Default::default()
    };

    let heading = match nearest {
        Some(target) => {
            out.pointer = Some(target);
            out.fire = true;
            let away = me - target;
            if away.length() < AUTOPILOT_KEEP_AWAY { away } else { Vec2::ZERO }
        }
        None => Vec2::ZERO,
    };
    let heading = if heading == Vec2::ZERO && me.distance(state.map.center()) > AUTOPILOT_HOME_RADIUS {
        state.map.center() - me
    } else {
        heading
    };

    out.left = heading.x < -1.0;
    out.right = heading.x > 1.0;
    out.up = heading.y < -1.0;
    out.down = heading.y > 1.0;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::sim::state::{Effect, Enemy, GamePhase};
    use crate::tuning::GameConfig;

    fn session_on(map: TileMap, seed: u64) -> GameState {
        GameState::new(Arc::new(GameConfig::default()), Arc::new(map), seed)
    }

    fn session() -> GameState {
        session_on(TileMap::open(30, 20, 64.0), 12345)
    }

    fn run(state: &mut GameState, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT_MS);
        }
    }

    #[test]
    fn test_first_tick_starts_wave_one() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.wave, 1);
        assert_eq!(state.active_enemies(), 2);
        assert_eq!(state.enemy_speed, 45.0);
    }

    #[test]
    fn test_player_moves_with_input() {
        let mut state = session();
        let start = state.player.body.pos;
        let input = TickInput {
            right: true,
            up: true,
            ..Default::default()
        };
        run(&mut state, &input, 120);
        let moved = state.player.body.pos - start;
        assert!((moved.x - 160.0).abs() < 0.1, "moved {moved:?}");
        assert!((moved.y + 160.0).abs() < 0.1, "moved {moved:?}");
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut state = session();
        let start = state.player.body.pos;
        let input = TickInput {
            left: true,
            right: true,
            up: true,
            down: true,
            ..Default::default()
        };
        run(&mut state, &input, 30);
        assert_eq!(state.player.body.pos, start);
    }

    #[test]
    fn test_player_faces_reticle() {
        let mut state = session();
        let pos = state.player.body.pos;
        let aim_left = TickInput {
            pointer: Some(pos - Vec2::new(50.0, 0.0)),
            ..Default::default()
        };
        tick(&mut state, &aim_left, SIM_DT_MS);
        assert_eq!(state.player.facing, Facing::Left);

        let aim_right = TickInput {
            pointer: Some(pos + Vec2::new(50.0, 0.0)),
            ..Default::default()
        };
        tick(&mut state, &aim_right, SIM_DT_MS);
        assert_eq!(state.player.facing, Facing::Right);
    }

    #[test]
    fn test_fire_cooldown_drops_inputs() {
        let mut state = session();
        let input = TickInput {
            fire: true,
            pointer: Some(Vec2::new(0.0, 0.0)),
            ..Default::default()
        };
        // One second of held fire at 200ms cooldown
        run(&mut state, &input, 120);
        assert_eq!(state.stats.shots_fired, 5);
    }

    #[test]
    fn test_full_projectile_pool_keeps_cooldown_open() {
        let config = GameConfig {
            max_projectiles: Some(1),
            ..GameConfig::default()
        };
        let mut state = GameState::new(Arc::new(config), Arc::new(TileMap::open(30, 20, 64.0)), 1);
        let input = TickInput {
            fire: true,
            pointer: Some(Vec2::ZERO),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT_MS);
        assert_eq!(state.stats.shots_fired, 1);
        let watermark = state.next_fire_ms;
        run(&mut state, &input, 30);
        // The only slot is still in flight, so later shots were skipped
        assert_eq!(state.stats.shots_fired, 1);
        assert_eq!(state.next_fire_ms, watermark);
    }

    #[test]
    fn test_projectile_leaves_world() {
        let mut state = session();
        // Keep the arena empty so nothing else can stop the shot
        state.timers.take_due(f64::MAX);
        let shot = state
            .projectiles
            .acquire(Projectile::fire(Vec2::new(1900.0, 640.0), Vec2::new(2000.0, 640.0), 300.0, 4.0))
            .unwrap();
        run(&mut state, &TickInput::default(), 6);
        assert!(state.projectiles.is_active(shot));
        run(&mut state, &TickInput::default(), 60);
        assert!(!state.projectiles.is_active(shot));
    }

    #[test]
    fn test_projectile_stopped_by_solid_tile() {
        let mut map = TileMap::open(30, 20, 64.0);
        let wall = map.add_layer("tracks", false);
        map.set_solid(wall, 20, 10);
        let mut state = session_on(map, 5);
        state.timers.take_due(f64::MAX);
        let from = Vec2::new(1200.0, 672.0);
        let shot = state
            .projectiles
            .acquire(Projectile::fire(from, Vec2::new(1400.0, 672.0), 300.0, 4.0))
            .unwrap();
        // Reaches x = 1280 after roughly a quarter second
        run(&mut state, &TickInput::default(), 40);
        assert!(!state.projectiles.is_active(shot));
    }

    #[test]
    fn test_player_blocked_by_solid_tile() {
        let mut map = TileMap::open(30, 20, 64.0);
        let wall = map.add_layer("wagons", true);
        // Column right of the spawn point (player starts at 960, 640)
        for row in 0..20 {
            map.set_solid(wall, 16, row);
        }
        let mut state = session_on(map, 5);
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut state, &input, 240);
        let p = state.player.body;
        assert!(p.pos.x + p.radius <= 1024.0, "walked into the wall: {:?}", p.pos);
    }

    fn thick_wall_session() -> GameState {
        let mut map = TileMap::open(30, 20, 64.0);
        let wall = map.add_layer("wagons", true);
        // x in [960, 1152); the player spawns at x = 960, on the wall's face
        for col in 15..=17 {
            for row in 0..20 {
                map.set_solid(wall, col, row);
            }
        }
        let mut state = session_on(map, 5);
        state.timers.take_due(f64::MAX);
        state
    }

    #[test]
    fn test_stuck_player_cannot_walk_through_wall() {
        let mut state = thick_wall_session();
        assert!(state.map.circle_hits(state.player.body.pos, state.player.body.radius, Blocker::Player));
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut state, &input, 240);
        assert!(state.player.body.pos.x <= 960.0, "went into the wall: {:?}", state.player.body.pos);
    }

    #[test]
    fn test_stuck_player_can_back_out() {
        let mut state = thick_wall_session();
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        run(&mut state, &input, 30);
        let p = state.player.body;
        assert!(p.pos.x < 960.0);
        assert!(!state.map.circle_hits(p.pos, p.radius, Blocker::Player));
    }

    #[test]
    fn test_enemies_weave_toward_player() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        for (_, enemy) in state.enemies.iter() {
            assert!(enemy.target_offset.x.abs() <= 60.0);
            assert!(enemy.target_offset.y.abs() <= 60.0);
            assert!(enemy.retarget_ms > 0.0 && enemy.retarget_ms <= 1000.0);
            let speed = enemy.body.vel.length();
            assert!((speed - enemy.speed).abs() < 0.01 || speed < 0.01);
        }
    }

    #[test]
    fn test_offsets_reroll_on_interval() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        let before: Vec<_> = state.enemies.iter().map(|(_, e)| e.target_offset).collect();
        // Just under a second later nothing has been re-rolled
        run(&mut state, &TickInput::default(), 119);
        let mid: Vec<_> = state.enemies.iter().map(|(_, e)| e.target_offset).collect();
        assert_eq!(before, mid);
        run(&mut state, &TickInput::default(), 2);
        let after: Vec<_> = state.enemies.iter().map(|(_, e)| e.target_offset).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_wave_clear_schedules_once() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.wave, 1);

        state.enemies.clear();
        run(&mut state, &TickInput::default(), 10);
        let pending = state
            .timers
            .take_due(f64::MAX)
            .into_iter()
            .filter(|t| *t == TimedTask::StartWave)
            .count();
        assert_eq!(pending, 1);
    }

    #[test]
    fn test_next_wave_after_delay() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        state.enemies.clear();

        // Delay is one second
        run(&mut state, &TickInput::default(), 60);
        assert_eq!(state.wave, 1);
        run(&mut state, &TickInput::default(), 70);
        assert_eq!(state.wave, 2);
        assert_eq!(state.active_enemies(), 3);
        assert!(state.enemies.iter().all(|(_, e)| e.max_hp == 4));
    }

    #[test]
    fn test_hit_tint_clears() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        let (enemy, pos) = state
            .enemies
            .iter()
            .map(|(h, e)| (h, e.body.pos))
            .next()
            .unwrap();
        let shot = state
            .projectiles
            .acquire(Projectile::fire(pos, pos + Vec2::X, 1.0, 4.0))
            .unwrap();
        combat::projectile_hits_enemy(&mut state, shot, enemy);
        assert!(state.enemies.get(enemy).unwrap().tinted);

        run(&mut state, &TickInput::default(), 13);
        assert!(!state.enemies.get(enemy).unwrap().tinted);
        assert!(
            state
                .drain_effects()
                .contains(&Effect::EnemyTint { enemy, tinted: false })
        );
    }

    #[test]
    fn test_contact_hurts_player() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        let pos = state.player.body.pos;
        state.enemies.acquire(Enemy::new(pos, 12.0, 3, 45.0));
        let before = state.active_enemies();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.player_health, 9);
        assert_eq!(state.active_enemies(), before - 1);
    }

    #[test]
    fn test_simultaneous_contacts_at_one_health() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        state.player_health = 1;
        let pos = state.player.body.pos;
        state.enemies.acquire(Enemy::new(pos, 12.0, 3, 45.0));
        state.enemies.acquire(Enemy::new(pos + Vec2::X, 12.0, 3, 45.0));
        tick(&mut state, &TickInput::default(), SIM_DT_MS);

        assert_eq!(state.player_health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        let screens = state
            .drain_effects()
            .into_iter()
            .filter(|e| matches!(e, Effect::GameOverScreen { .. }))
            .count();
        assert_eq!(screens, 1);
    }

    #[test]
    fn test_game_over_freezes_session() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        state.phase = GamePhase::GameOver;
        state.enemies.clear();

        let snapshot = (state.time_ms, state.player.body.pos, state.wave, state.player_health);
        let input = TickInput {
            right: true,
            fire: true,
            pointer: Some(Vec2::ZERO),
            ..Default::default()
        };
        run(&mut state, &input, 300);
        assert_eq!(
            (state.time_ms, state.player.body.pos, state.wave, state.player_health),
            snapshot
        );
        assert_eq!(state.stats.shots_fired, 0);
        assert_eq!(state.active_enemies(), 0);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut state = session();
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT_MS);
        assert_eq!(state.wave, 1);
        assert_eq!(state.seed, 12345);

        state.phase = GamePhase::GameOver;
        state.player_health = 0;
        tick(&mut state, &restart, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.wave, 0);
        assert_eq!(state.player_health, 10);
        assert_eq!(state.active_enemies(), 0);
        assert_eq!(state.projectiles.count_active(), 0);

        // Back to Playing: the next tick opens wave 1 again
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.wave, 1);
        assert_eq!(state.enemy_speed, 45.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = session();
        let mut b = session();
        let inputs = [
            TickInput {
                pointer: Some(Vec2::new(100.0, 100.0)),
                fire: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..200 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT_MS);
                tick(&mut b, input, SIM_DT_MS);
            }
        }
        assert_eq!(a.time_ms, b.time_ms);
        assert_eq!(a.player.body.pos, b.player.body.pos);
        let pa: Vec<_> = a.enemies.iter().map(|(_, e)| e.body.pos).collect();
        let pb: Vec<_> = b.enemies.iter().map(|(_, e)| e.body.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_autopilot_kills_enemies() {
        let mut state = session();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        // 30 simulated seconds
        run(&mut state, &input, 3600);
        assert!(state.stats.shots_fired > 0);
        assert!(state.stats.enemies_killed > 0);
    }
}
