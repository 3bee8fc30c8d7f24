//! Railyard Shooter - a wave-based top-down arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (waves, combat, movement, session state)
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences applied to effect requests
//! - `error`: Loading errors for config and map files
//!
//! Rendering, audio and asset loading belong to the host engine. The
//! simulation only queues [`sim::Effect`] requests for it.

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::Error;
pub use settings::{QualityPreset, Settings};
pub use tuning::GameConfig;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (120 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Damage dealt by one projectile hit
    pub const PROJECTILE_DAMAGE: i32 = 1;
    /// Damage dealt to the player by one enemy contact
    pub const CONTACT_DAMAGE: u32 = 1;

    /// Particles in the spark burst of a dying enemy
    pub const DEATH_SPARK_COUNT: u32 = 30;
    pub const DEATH_SPARK_LIFESPAN_MS: f32 = 500.0;
    /// Particles in the blood spray of a wounded enemy
    pub const BLOOD_SPRAY_COUNT: u32 = 15;
    pub const BLOOD_SPRAY_LIFESPAN_MS: f32 = 1000.0;
}

/// Which way a sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing derived from horizontal velocity. Inside the dead zone the
    /// current facing is kept so near-zero velocity doesn't flicker.
    #[inline]
    pub fn from_velocity_x(current: Facing, vx: f32, dead_zone: f32) -> Facing {
        if vx < -dead_zone {
            Facing::Left
        } else if vx > dead_zone {
            Facing::Right
        } else {
            current
        }
    }

    /// Facing toward an aim point (right when the aim point is strictly to the right)
    #[inline]
    pub fn toward(from_x: f32, aim_x: f32) -> Facing {
        if from_x < aim_x { Facing::Right } else { Facing::Left }
    }
}

/// Velocity that moves `from` toward `to` at a constant `speed` (pixels/s)
#[inline]
pub fn move_to_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}
