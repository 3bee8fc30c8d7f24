//! Game state and core simulation types
//!
//! `GameState` is the session: it owns the player, the enemy and projectile
//! pools, the wave counter and the scheduled tasks. Restarting replaces the
//! whole value rather than patching fields.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::map::TileMap;
use super::pool::{Handle, Pool};
use super::timers::{TimedTask, Timers};
use crate::Facing;
use crate::tuning::GameConfig;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Player ran out of health; only a restart leaves this phase
    GameOver,
}

/// A movable circle. Entities own one and the simulation moves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    /// Point velocity at `target` with a constant `speed`
    pub fn move_toward(&mut self, target: Vec2, speed: f32) {
        self.vel = crate::move_to_velocity(self.pos, target, speed);
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        super::collision::circles_overlap(self.pos, self.radius, other.pos, other.radius)
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
}

/// A hostile chasing the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub hp: i32,
    pub max_hp: i32,
    /// Copied from the session when spawned; fixed for the enemy's lifetime
    pub speed: f32,
    /// Aim point relative to the player, re-rolled every retarget interval
    pub target_offset: Vec2,
    /// Time left before the next re-roll (ms)
    pub retarget_ms: f32,
    pub facing: Facing,
    /// Cosmetic hit tint, cleared by a scheduled task
    pub tinted: bool,
}

impl Enemy {
    pub fn new(pos: Vec2, radius: f32, health: i32, speed: f32) -> Self {
        Self {
            body: Body::new(pos, radius),
            hp: health,
            max_hp: health,
            speed,
            target_offset: Vec2::ZERO,
            // Zero so the first update rolls an offset
            retarget_ms: 0.0,
            facing: Facing::default(),
            tinted: false,
        }
    }
}

/// A shot travelling in a straight line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    pub speed: f32,
}

impl Projectile {
    /// Projectile at `from` heading for `target` at `speed`
    pub fn fire(from: Vec2, target: Vec2, speed: f32, radius: f32) -> Self {
        let mut body = Body::new(from, radius);
        body.move_toward(target, speed);
        Self { body, speed }
    }
}

/// Feedback the host engine should play. Fire-and-forget: nothing in the
/// simulation waits on or reads back an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    CameraShake { duration_ms: f32, intensity: f32 },
    CameraFlash { duration_ms: f32, color: [u8; 3] },
    /// Spark explosion where an enemy died
    SparkBurst { pos: Vec2, count: u32, lifespan_ms: f32 },
    /// Blood particles where an enemy was wounded
    BloodSpray { pos: Vec2, count: u32, lifespan_ms: f32 },
    EnemyTint { enemy: Handle, tinted: bool },
    /// Player turns red on death
    PlayerTint,
    WaveBanner { wave: u32 },
    HealthChanged { health: u32, max: u32 },
    /// Show the game-over text and restart control
    GameOverScreen { wave: u32 },
}

/// Run statistics (reset on restart)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub shots_fired: u32,
    pub enemies_killed: u32,
    pub contact_hits: u32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: Arc<GameConfig>,
    pub map: Arc<TileMap>,
    /// Seed this session was started with
    pub seed: u64,
    pub rng: Pcg32,
    /// Waves started so far (0 before the first)
    pub wave: u32,
    pub player_health: u32,
    /// Speed handed to newly spawned enemies
    pub enemy_speed: f32,
    pub phase: GamePhase,
    /// Session clock (ms)
    pub time_ms: f64,
    /// A shot is allowed only when `time_ms` exceeds this
    pub next_fire_ms: f64,
    pub player: Player,
    /// Aim point in world coordinates
    pub reticle: Vec2,
    pub enemies: Pool<Enemy>,
    pub projectiles: Pool<Projectile>,
    pub timers: Timers,
    pub stats: Stats,
    effects: Vec<Effect>,
}

impl GameState {
    /// Fresh session: full health, wave 0, no enemies. The first wave is
    /// scheduled to start on the first tick.
    pub fn new(config: Arc<GameConfig>, map: Arc<TileMap>, seed: u64) -> Self {
        let center = map.center();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            wave: 0,
            player_health: config.max_player_health,
            enemy_speed: config.initial_enemy_speed,
            phase: GamePhase::Playing,
            time_ms: 0.0,
            next_fire_ms: 0.0,
            player: Player {
                body: Body::new(center, config.player_radius),
                facing: Facing::Right,
            },
            reticle: center,
            enemies: Pool::new(config.max_enemies),
            projectiles: Pool::new(config.max_projectiles),
            timers: Timers::default(),
            stats: Stats::default(),
            effects: Vec::new(),
            config,
            map,
        };
        state.timers.schedule(0.0, 0.0, TimedTask::StartWave);
        state
    }

    /// Start over with a new session. The next seed comes from this
    /// session's RNG so a run of restarts stays reproducible.
    pub fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        log::info!("Restarting session (seed {seed})");
        *self = Self::new(Arc::clone(&self.config), Arc::clone(&self.map), seed);
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn active_enemies(&self) -> usize {
        self.enemies.count_active()
    }

    /// Queue a visual/audio request for the host
    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Hand pending effect requests to the host
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Health as a fraction of the maximum, for the HUD bar
    pub fn health_fraction(&self) -> f32 {
        self.player_health as f32 / self.config.max_player_health as f32
    }

    /// The bar over the player's head shows only while hurt but alive
    pub fn show_overhead_health_bar(&self) -> bool {
        self.player_health > 0 && self.player_health < self.config.max_player_health
    }
}
