//! Data-driven game balance
//!
//! One `GameConfig` is built at startup and shared by every session through
//! an `Arc`. Fields missing from a JSON file keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Player ===
    /// Movement speed (pixels/s)
    pub player_speed: f32,
    /// Collision circle radius
    pub player_radius: f32,
    pub max_player_health: u32,

    // === Enemies ===
    /// Health of a wave-1 enemy; each later wave adds one
    pub base_enemy_health: i32,
    /// Enemy speed before the first wave (pixels/s)
    pub initial_enemy_speed: f32,
    /// Speed added at the start of every wave
    pub enemy_speed_step: f32,
    pub enemy_radius: f32,
    /// How often an enemy re-rolls its aim offset (ms)
    pub retarget_interval_ms: f32,
    /// Aim offsets are rolled in [-bound, bound] on each axis
    pub target_offset_bound: i32,
    /// Horizontal speed below which facing is left unchanged
    pub facing_dead_zone: f32,
    /// How long an enemy stays tinted after a non-lethal hit (ms)
    pub hit_tint_ms: f32,

    // === Weapon ===
    /// Minimum time between shots (ms)
    pub fire_rate_ms: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,

    // === Waves ===
    /// Pause between clearing a wave and spawning the next (ms)
    pub wave_delay_ms: f32,

    // === Pools (None = grow without limit) ===
    pub max_enemies: Option<usize>,
    pub max_projectiles: Option<usize>,

    // === Feedback ===
    pub contact_shake_ms: f32,
    pub contact_shake_intensity: f32,
    pub contact_flash_ms: f32,
    pub death_shake_ms: f32,
    pub death_shake_intensity: f32,

    // === Map (used when no tile map file is given) ===
    pub map_cols: u32,
    pub map_rows: u32,
    pub tile_size: f32,
    pub map_scale: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: 160.0,
            player_radius: 14.0,
            max_player_health: 10,

            base_enemy_health: 3,
            initial_enemy_speed: 40.0,
            enemy_speed_step: 5.0,
            enemy_radius: 12.0,
            retarget_interval_ms: 1000.0,
            target_offset_bound: 60,
            facing_dead_zone: 2.0,
            hit_tint_ms: 100.0,

            fire_rate_ms: 200.0,
            projectile_speed: 300.0,
            projectile_radius: 4.0,

            wave_delay_ms: 1000.0,

            max_enemies: None,
            max_projectiles: None,

            contact_shake_ms: 150.0,
            contact_shake_intensity: 0.015,
            contact_flash_ms: 150.0,
            death_shake_ms: 200.0,
            death_shake_intensity: 0.02,

            map_cols: 30,
            map_rows: 20,
            tile_size: 16.0,
            map_scale: 4.0,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("player_speed", self.player_speed),
            ("player_radius", self.player_radius),
            ("initial_enemy_speed", self.initial_enemy_speed),
            ("enemy_radius", self.enemy_radius),
            ("retarget_interval_ms", self.retarget_interval_ms),
            ("projectile_speed", self.projectile_speed),
            ("projectile_radius", self.projectile_radius),
            ("tile_size", self.tile_size),
            ("map_scale", self.map_scale),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("enemy_speed_step", self.enemy_speed_step),
            ("facing_dead_zone", self.facing_dead_zone),
            ("hit_tint_ms", self.hit_tint_ms),
            ("fire_rate_ms", self.fire_rate_ms),
            ("wave_delay_ms", self.wave_delay_ms),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must not be negative, got {value}")));
            }
        }

        if self.max_player_health == 0 {
            return Err(Error::InvalidConfig("max_player_health must be at least 1".into()));
        }
        if self.base_enemy_health < 1 {
            return Err(Error::InvalidConfig("base_enemy_health must be at least 1".into()));
        }
        if self.target_offset_bound < 0 {
            return Err(Error::InvalidConfig("target_offset_bound must not be negative".into()));
        }
        if self.map_cols == 0 || self.map_rows == 0 {
            return Err(Error::InvalidConfig("map must have at least one tile".into()));
        }
        Ok(())
    }

    /// Size of one tile in world pixels
    pub fn world_tile_size(&self) -> f32 {
        self.tile_size * self.map_scale
    }
}
