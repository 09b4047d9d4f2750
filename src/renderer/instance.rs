//! GPU instance records
//!
//! Flattens a `RenderSnapshot` into one fixed-size record per drawable so a
//! frontend can upload the whole scene with a single buffer write.

use bytemuck::{Pod, Zeroable};

use super::snapshot::RenderSnapshot;
use crate::settings::Theme;
use crate::sim::{CraftRole, ObstacleShape};

/// Drawable kinds (must match shader)
pub mod kind {
    pub const CRAFT: u32 = 0;
    pub const COIN: u32 = 1;
    pub const SHIELD_TOKEN: u32 = 2;
    pub const OBSTACLE_CUBE: u32 = 3;
    pub const OBSTACLE_CONE: u32 = 4;
    pub const PROJECTILE: u32 = 5;
    pub const SHIELD_BUBBLE: u32 = 6;
    pub const ENGINE_GLOW: u32 = 7;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3], // offset 0
    pub kind: u32,          // offset 12
    pub color: [f32; 4],    // offset 16
    pub heading: f32,       // offset 32
    pub bank: f32,          // offset 36
    pub scale: f32,         // offset 40
    pub _pad: u32,          // pad to 48 bytes
}

impl Instance {
    fn new(position: glam::Vec3, kind: u32, color: [f32; 4], scale: f32) -> Self {
        Self {
            position: position.to_array(),
            kind,
            color,
            heading: 0.0,
            bank: 0.0,
            scale,
            _pad: 0,
        }
    }
}

/// Per-frame scene constants (uniform buffer)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Scene {
    pub background: [f32; 4], // offset 0
    pub road: [f32; 4],       // offset 16
    pub accent: [f32; 4],     // offset 32
    /// width, length, finish line, sim time
    pub track: [f32; 4], // offset 48
}

/// Colors for one visual theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: [f32; 4],
    pub road: [f32; 4],
    /// Road edges, HUD text and canopy glow
    pub accent: [f32; 4],
    pub coin: [f32; 4],
    pub engine_glow: [f32; 4],
}

impl Palette {
    pub const CYBERPUNK: Self = Self {
        background: [0.1, 0.0, 0.2, 1.0],
        road: [0.1, 0.0, 0.2, 1.0],
        accent: [0.0, 1.0, 1.0, 1.0],
        coin: [1.0, 0.0, 1.0, 1.0],
        engine_glow: [1.0, 0.0, 1.0, 1.0],
    };

    pub const STANDARD: Self = Self {
        background: [0.0, 0.0, 0.0, 1.0],
        road: [0.0, 0.0, 0.0, 1.0],
        accent: [0.0, 1.0, 0.0, 1.0],
        coin: [0.0, 1.0, 0.0, 1.0],
        engine_glow: [0.0, 1.0, 0.0, 1.0],
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Cyberpunk => Self::CYBERPUNK,
            Theme::Standard => Self::STANDARD,
        }
    }
}

/// Theme-independent colors
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.7, 0.7, 0.8, 1.0];
    pub const AI: [[f32; 4]; 3] = [
        [0.8, 0.2, 0.2, 1.0],
        [0.2, 0.8, 0.2, 1.0],
        [0.8, 0.8, 0.2, 1.0],
    ];
    pub const WRECK: [f32; 4] = [0.3, 0.3, 0.3, 1.0];
    pub const SHIELD_TOKEN: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const SHIELD_BUBBLE: [f32; 4] = [0.0, 0.0, 1.0, 0.3];
    pub const OBSTACLE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const PROJECTILE: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
}

/// Draw scales (world units)
const CRAFT_SCALE: f32 = 25.0;
const COIN_SCALE: f32 = 8.0;
const SHIELD_TOKEN_SCALE: f32 = 8.0;
const SHIELD_BUBBLE_SCALE: f32 = 22.0;
const OBSTACLE_SCALE: f32 = 40.0;
const PROJECTILE_SCALE: f32 = 3.0;
const ENGINE_GLOW_SCALE: f32 = 6.0;
/// Engines glow above this speed
const ENGINE_GLOW_MIN_SPEED: f32 = 0.5;
/// Exhaust sits behind the craft
const ENGINE_GLOW_OFFSET: f32 = 14.0;

fn craft_color(role: CraftRole, ai_slot: usize, crashed: bool) -> [f32; 4] {
    if crashed {
        return colors::WRECK;
    }
    match role {
        CraftRole::Player => colors::PLAYER,
        CraftRole::Ai => colors::AI[ai_slot % colors::AI.len()],
    }
}

/// Build instance records for every drawable in the snapshot
pub fn build_instances(snapshot: &RenderSnapshot) -> Vec<Instance> {
    let palette = Palette::for_theme(snapshot.theme);
    let mut out = Vec::with_capacity(
        snapshot.crafts.len() * 3
            + snapshot.coins.len()
            + snapshot.obstacles.len()
            + snapshot.projectiles.len()
            + 1,
    );

    let mut ai_slot = 0;
    for craft in &snapshot.crafts {
        let color = craft_color(craft.role, ai_slot, craft.crashed);
        if craft.role == CraftRole::Ai {
            ai_slot += 1;
        }
        out.push(Instance {
            heading: craft.heading,
            bank: craft.bank,
            ..Instance::new(craft.pos, kind::CRAFT, color, CRAFT_SCALE)
        });
        if craft.has_shield {
            out.push(Instance::new(
                craft.pos,
                kind::SHIELD_BUBBLE,
                colors::SHIELD_BUBBLE,
                SHIELD_BUBBLE_SCALE,
            ));
        }
        if !craft.crashed && craft.speed > ENGINE_GLOW_MIN_SPEED {
            let exhaust = craft.pos - glam::Vec3::Y * ENGINE_GLOW_OFFSET;
            out.push(Instance {
                heading: craft.heading,
                ..Instance::new(exhaust, kind::ENGINE_GLOW, palette.engine_glow, ENGINE_GLOW_SCALE)
            });
        }
    }

    out.extend(
        snapshot
            .coins
            .iter()
            .map(|&pos| Instance::new(pos, kind::COIN, palette.coin, COIN_SCALE)),
    );

    if let Some(pos) = snapshot.shield {
        out.push(Instance::new(
            pos,
            kind::SHIELD_TOKEN,
            colors::SHIELD_TOKEN,
            SHIELD_TOKEN_SCALE,
        ));
    }

    out.extend(snapshot.obstacles.iter().map(|o| {
        let kind = match o.shape {
            ObstacleShape::Cube => kind::OBSTACLE_CUBE,
            ObstacleShape::Cone => kind::OBSTACLE_CONE,
        };
        Instance::new(o.pos, kind, colors::OBSTACLE, OBSTACLE_SCALE)
    }));

    out.extend(
        snapshot
            .projectiles
            .iter()
            .map(|&pos| Instance::new(pos, kind::PROJECTILE, colors::PROJECTILE, PROJECTILE_SCALE)),
    );

    out
}

/// Scene uniform for the snapshot's theme and track
pub fn build_scene(snapshot: &RenderSnapshot) -> Scene {
    let palette = Palette::for_theme(snapshot.theme);
    Scene {
        background: palette.background,
        road: palette.road,
        accent: palette.accent,
        track: [
            snapshot.track_width,
            snapshot.track_length,
            snapshot.finish_line,
            snapshot.sim_time,
        ],
    }
}

/// Raw bytes for a buffer upload
pub fn as_bytes(instances: &[Instance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
