//! Jet Racer - an arcade flight-combat racing simulation
//!
//! Core modules:
//! - `sim`: Simulation engine (craft physics, collisions, projectiles, AI, levels, race flow)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences and custom race selections
//! - `renderer`: Read-only render snapshots and GPU instance records
//! - `platform`: Input adapter (raw key/mouse events to simulation commands)

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{CameraMode, Settings, Theme};
pub use tuning::{Tuning, TuningError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Velocities are tuned per frame at this rate; positions integrate as `vel * dt * rate`
    pub const FRAME_REFERENCE_RATE: f32 = 60.0;
    /// Largest delta time a single tick will apply (stall protection)
    pub const MAX_TICK_DT: f32 = 0.1;

    /// Track dimensions
    pub const TRACK_WIDTH: f32 = 1200.0;
    pub const BASE_TRACK_LENGTH: f32 = 3000.0;
    pub const TRACK_LENGTH_PER_LEVEL: f32 = 2000.0;
    /// Finish line sits this far before the far end of the track
    pub const FINISH_LINE_INSET: f32 = 200.0;

    /// Lateral wall: clamp distance from the edge, bounce and scrub factors
    pub const BOUNDARY_MARGIN: f32 = 50.0;
    pub const BOUNDARY_BOUNCE: f32 = -0.5;
    pub const BOUNDARY_SCRUB: f32 = 0.8;

    /// Per-tick velocity damping
    pub const LATERAL_DAMPING: f32 = 0.92;
    pub const AIR_RESISTANCE: f32 = 0.99;

    /// Bank angle (degrees) per unit of lateral velocity, and smoothing factor
    pub const BANK_PER_LATERAL: f32 = 15.0;
    pub const BANK_SMOOTHING: f32 = 0.1;

    /// Cosmetic hover bob
    pub const HOVER_ALTITUDE: f32 = 30.0;
    pub const HOVER_AMPLITUDE: f32 = 2.0;
    pub const HOVER_FREQUENCY: f32 = 5.0;

    /// Crash fall animation (per tick)
    pub const CRASH_FALL_RATE: f32 = 2.0;
    pub const CRASH_SPIN_RATE: f32 = 10.0;

    /// Collision radii
    pub const PICKUP_RADIUS: f32 = 60.0;
    pub const OBSTACLE_HIT_RADIUS: f32 = 60.0;
    pub const CRAFT_COLLISION_RADIUS: f32 = 80.0;
    pub const PROJECTILE_HIT_RADIUS: f32 = 35.0;

    /// Projectiles
    pub const PROJECTILE_MUZZLE_DISTANCE: f32 = 12.0;
    pub const PROJECTILE_MUZZLE_HEIGHT: f32 = 7.0;
    pub const PROJECTILE_SPEED: f32 = 800.0;
    /// Projectiles survive this far past the far end of the track
    pub const PROJECTILE_DESPAWN_MARGIN: f32 = 500.0;

    /// Where a craft re-enters the track after a non-final lap
    pub const PLAYER_LAP_RESET_Y: f32 = 50.0;
    pub const AI_LAP_RESET_MIN_Y: f32 = 50.0;
    pub const AI_LAP_RESET_MAX_Y: f32 = 150.0;
}

/// Unit forward vector for a heading in degrees (0 = +y down the track, rotation counter-clockwise)
#[inline]
pub fn heading_forward(heading_deg: f32) -> Vec2 {
    let rad = heading_deg.to_radians();
    Vec2::new(-rad.sin(), rad.cos())
}

/// Ground-plane distance between two points, ignoring altitude
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}
