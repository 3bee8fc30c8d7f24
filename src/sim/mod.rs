//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies; effects are queued, never played

pub mod collision;
pub mod combat;
pub mod map;
pub mod pool;
pub mod state;
pub mod tick;
pub mod timers;
pub mod wave;

pub use collision::{Rect, circle_rect_overlap, circles_overlap};
pub use combat::{ContactOutcome, HitOutcome, player_hits_enemy, projectile_hits_enemy};
pub use map::{Blocker, TileMap};
pub use pool::{Handle, Pool};
pub use state::{Body, Effect, Enemy, GamePhase, GameState, Player, Projectile, Stats};
pub use tick::{TickInput, tick};
pub use timers::{TimedTask, Timers};
pub use wave::{enemy_count, enemy_health, enemy_speed_after, start_next_wave};
