//! Combat resolution
//!
//! Each function takes one collision pair and applies the rule for it.
//! Damage is fixed: one per projectile hit, one per enemy contact. Every
//! rule re-checks that its entities are still active, so a pair reported
//! after one side was destroyed earlier in the same tick changes nothing.

use super::pool::Handle;
use super::state::{Effect, GamePhase, GameState};
use super::timers::TimedTask;
use crate::consts::*;

/// What a projectile hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// One of the pair was already gone
    Ignored,
    Wounded { hp_left: i32 },
    Killed,
}

/// What an enemy touching the player did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Ignored,
    Hurt { health_left: u32 },
    /// This contact ended the game
    GameOver,
}

/// A projectile overlapped an enemy
pub fn projectile_hits_enemy(state: &mut GameState, projectile: Handle, enemy: Handle) -> HitOutcome {
    if !state.enemies.is_active(enemy) || !state.projectiles.is_active(projectile) {
        return HitOutcome::Ignored;
    }
    state.projectiles.release(projectile);

    let Some(target) = state.enemies.get_mut(enemy) else {
        return HitOutcome::Ignored;
    };
    target.hp -= PROJECTILE_DAMAGE;
    let hp_left = target.hp;
    let pos = target.body.pos;

    if hp_left <= 0 {
        state.enemies.release(enemy);
        state.stats.enemies_killed += 1;
        state.push_effect(Effect::CameraShake {
            duration_ms: state.config.death_shake_ms,
            intensity: state.config.death_shake_intensity,
        });
        state.push_effect(Effect::SparkBurst {
            pos,
            count: DEATH_SPARK_COUNT,
            lifespan_ms: DEATH_SPARK_LIFESPAN_MS,
        });
        HitOutcome::Killed
    } else {
        target.tinted = true;
        let tint_ms = state.config.hit_tint_ms;
        state.timers.schedule(state.time_ms, tint_ms, TimedTask::ClearEnemyTint(enemy));
        state.push_effect(Effect::EnemyTint { enemy, tinted: true });
        state.push_effect(Effect::BloodSpray {
            pos,
            count: BLOOD_SPRAY_COUNT,
            lifespan_ms: BLOOD_SPRAY_LIFESPAN_MS,
        });
        HitOutcome::Wounded { hp_left }
    }
}

/// An enemy touched the player. The enemy is consumed by the contact.
pub fn player_hits_enemy(state: &mut GameState, enemy: Handle) -> ContactOutcome {
    if state.is_game_over() || !state.enemies.is_active(enemy) {
        return ContactOutcome::Ignored;
    }

    state.player_health = state.player_health.saturating_sub(CONTACT_DAMAGE);
    state.stats.contact_hits += 1;
    state.enemies.release(enemy);

    let health = state.player_health;
    let max = state.config.max_player_health;
    state.push_effect(Effect::HealthChanged { health, max });
    state.push_effect(Effect::CameraShake {
        duration_ms: state.config.contact_shake_ms,
        intensity: state.config.contact_shake_intensity,
    });
    state.push_effect(Effect::CameraFlash {
        duration_ms: state.config.contact_flash_ms,
        color: [255, 0, 0],
    });

    if health == 0 {
        state.phase = GamePhase::GameOver;
        for (_, projectile) in state.projectiles.iter_mut() {
            projectile.body.vel = glam::Vec2::ZERO;
        }
        state.player.body.vel = glam::Vec2::ZERO;
        state.push_effect(Effect::PlayerTint);
        state.push_effect(Effect::GameOverScreen { wave: state.wave });
        log::info!(
            "Game over on wave {} ({} kills, {} shots)",
            state.wave,
            state.stats.enemies_killed,
            state.stats.shots_fired
        );
        ContactOutcome::GameOver
    } else {
        ContactOutcome::Hurt { health_left: health }
    }
}

/// A projectile touched a solid map tile
pub fn projectile_hits_map(state: &mut GameState, projectile: Handle) -> bool {
    state.projectiles.release(projectile).is_some()
}

/// Clear an enemy's hit tint if the enemy still exists
pub fn clear_enemy_tint(state: &mut GameState, enemy: Handle) {
    if let Some(target) = state.enemies.get_mut(enemy) {
        target.tinted = false;
        state.push_effect(Effect::EnemyTint { enemy, tinted: false });
    }
}
