//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Clamped delta time supplied by the caller, no clock reads
//! - Single injected RNG owned by the context
//! - Stable iteration order (player first, then AI by index)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod level;
pub mod physics;
pub mod projectile;
pub mod race;
pub mod state;
pub mod tick;

pub use level::{LevelLayout, generate_level, obstacle_count};
pub use race::player_wins;
pub use state::{
    Coin, Craft, CraftRole, DestroyCause, GameEvent, Obstacle, ObstacleShape, PLAYER_INDEX,
    Projectile, RaceConfig, RaceOutcome, RacePhase, ShieldToken, SimContext, Track,
};
pub use tick::{Command, TickInput, clamp_dt, tick};
