//! Wave director
//!
//! Wave composition depends only on the wave index: wave `w` has `w + 1`
//! enemies with `base + (w - 1)` health, and every wave start raises the
//! enemy speed by a fixed step.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::state::{Effect, Enemy, GameState};

/// Enemies spawned by wave `wave` (1-based)
pub fn enemy_count(wave: u32) -> u32 {
    wave + 1
}

/// Health of every enemy in wave `wave` (1-based)
pub fn enemy_health(base_health: i32, wave: u32) -> i32 {
    base_health + (wave as i32 - 1)
}

/// Enemy speed once `waves` waves have started
pub fn enemy_speed_after(initial_speed: f32, step: f32, waves: u32) -> f32 {
    initial_speed + step * waves as f32
}

/// Random point on one of the four edges of `bounds`, edges equally likely
pub fn edge_spawn_point(rng: &mut impl Rng, bounds: &Rect) -> Vec2 {
    let along_x = rng.random_range(bounds.min.x..=bounds.max.x);
    let along_y = rng.random_range(bounds.min.y..=bounds.max.y);
    match rng.random_range(0..4u8) {
        0 => Vec2::new(bounds.min.x, along_y),
        1 => Vec2::new(bounds.max.x, along_y),
        2 => Vec2::new(along_x, bounds.min.y),
        _ => Vec2::new(along_x, bounds.max.y),
    }
}

/// Start the next wave if the arena is clear and the game is still on.
///
/// Returns false (and changes nothing) while enemies are alive or after game
/// over, so repeated calls inside one clear window start a single wave.
/// Spawns the pool refuses are skipped.
pub fn start_next_wave(state: &mut GameState) -> bool {
    if state.is_game_over() || state.active_enemies() > 0 {
        return false;
    }

    state.wave += 1;
    state.enemy_speed += state.config.enemy_speed_step;
    let wave = state.wave;
    let count = enemy_count(wave);
    let health = enemy_health(state.config.base_enemy_health, wave);
    let bounds = state.map.world_bounds();
    let radius = state.config.enemy_radius;

    let mut spawned = 0;
    for _ in 0..count {
        let pos = edge_spawn_point(&mut state.rng, &bounds);
        if state
            .enemies
            .acquire(Enemy::new(pos, radius, health, state.enemy_speed))
            .is_some()
        {
            spawned += 1;
        } else {
            log::debug!("Enemy pool full, skipped a wave {wave} spawn");
        }
    }

    log::info!(
        "Wave {}: {}/{} enemies, hp {}, speed {}",
        wave,
        spawned,
        count,
        health,
        state.enemy_speed
    );
    state.push_effect(Effect::WaveBanner { wave });
    true
}
