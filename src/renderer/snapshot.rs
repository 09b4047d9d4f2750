//! Read-only view of the simulation for a frame
//!
//! Captured after each tick. A renderer only ever sees this copy, so nothing
//! it does can feed back into the simulation.

use glam::Vec3;
use serde::Serialize;

use crate::heading_forward;
use crate::settings::{CameraMode, Theme};
use crate::sim::{Craft, CraftRole, ObstacleShape, PLAYER_INDEX, RaceOutcome, RacePhase, SimContext};

/// Displayed airspeed per unit of simulation speed
pub const KNOTS_PER_UNIT: f32 = 20.0;

const CHASE_LATERAL_FOLLOW: f32 = 0.8;
const CHASE_DISTANCE: f32 = 250.0;
const CHASE_HEIGHT: f32 = 120.0;
const CHASE_FOV: f32 = 60.0;
const COCKPIT_EYE_FORWARD: f32 = 10.0;
const COCKPIT_EYE_HEIGHT: f32 = 5.0;
const COCKPIT_FOV: f32 = 70.0;
/// Both cameras look this far down the track
const LOOK_AHEAD: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CraftView {
    pub role: CraftRole,
    pub pos: Vec3,
    pub heading: f32,
    pub bank: f32,
    pub speed: f32,
    pub crashed: bool,
    pub has_shield: bool,
}

impl From<&Craft> for CraftView {
    fn from(craft: &Craft) -> Self {
        Self {
            role: craft.role,
            pos: craft.pos,
            heading: craft.heading,
            bank: craft.bank,
            speed: craft.speed,
            crashed: craft.crashed,
            has_shield: craft.has_shield,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub pos: Vec3,
    pub shape: ObstacleShape,
}

/// Perspective camera parameters (z up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Camera {
    /// Camera for the given mode, following a craft
    pub fn follow(mode: CameraMode, craft: &Craft) -> Self {
        let p = craft.pos;
        match mode {
            CameraMode::Chase => Self {
                eye: Vec3::new(
                    p.x * CHASE_LATERAL_FOLLOW,
                    p.y - CHASE_DISTANCE,
                    p.z + CHASE_HEIGHT,
                ),
                target: Vec3::new(p.x, p.y + LOOK_AHEAD, p.z),
                fov: CHASE_FOV,
            },
            CameraMode::Cockpit => {
                let forward = heading_forward(craft.heading);
                Self {
                    eye: Vec3::new(p.x, p.y + COCKPIT_EYE_FORWARD, p.z + COCKPIT_EYE_HEIGHT),
                    target: Vec3::new(p.x + forward.x * LOOK_AHEAD, p.y + LOOK_AHEAD, p.z),
                    fov: COCKPIT_FOV,
                }
            }
        }
    }
}

/// Dashboard metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub airspeed_knots: u32,
    pub lap: u32,
    pub total_laps: u32,
    pub score: u64,
    pub level: u32,
    pub max_level: u32,
    pub shield_active: bool,
    pub distance_remaining: f32,
    /// Seconds since the race started
    pub elapsed: f32,
    /// 1-based standing among all craft
    pub rank: usize,
    pub field_size: usize,
    /// Seconds until the campaign restarts (campaign-complete screen only)
    pub restart_countdown: Option<f32>,
    pub theme: &'static str,
    pub camera: &'static str,
}

impl Hud {
    pub fn from_context(ctx: &SimContext) -> Self {
        let player = ctx.player();
        Self {
            airspeed_knots: (player.speed * KNOTS_PER_UNIT) as u32,
            lap: ctx.current_lap(),
            total_laps: ctx.race.total_laps,
            score: ctx.campaign.score,
            level: ctx.campaign.level,
            max_level: ctx.max_level(),
            shield_active: player.has_shield,
            distance_remaining: (ctx.race.track.finish_line - player.pos.y).max(0.0),
            elapsed: ctx.race_clock,
            rank: rank(player, ctx.ai_crafts()),
            field_size: ctx.crafts.len(),
            restart_countdown: ctx.restart_countdown(),
            theme: ctx.settings.theme.as_str(),
            camera: ctx.settings.camera.as_str(),
        }
    }
}

/// 1 + intact AI craft ahead of the player (more laps, or further down the same lap)
pub fn rank(player: &Craft, ai: &[Craft]) -> usize {
    let progress = |c: &Craft| (c.laps_completed, c.pos.y);
    let ahead = ai
        .iter()
        .filter(|c| !c.crashed && progress(c) > progress(player))
        .count();
    1 + ahead
}

/// Everything a frame needs
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub phase: RacePhase,
    pub theme: Theme,
    pub camera_mode: CameraMode,
    pub camera: Camera,
    pub crafts: Vec<CraftView>,
    /// Uncollected coins only
    pub coins: Vec<Vec3>,
    /// Present until collected
    pub shield: Option<Vec3>,
    /// Live obstacles only
    pub obstacles: Vec<ObstacleView>,
    pub projectiles: Vec<Vec3>,
    pub track_width: f32,
    pub track_length: f32,
    pub finish_line: f32,
    pub hud: Hud,
    pub outcome: Option<RaceOutcome>,
    pub sim_time: f32,
}

impl RenderSnapshot {
    pub fn capture(ctx: &SimContext) -> Self {
        let player = &ctx.crafts[PLAYER_INDEX];
        let track = ctx.race.track;

        Self {
            phase: ctx.phase,
            theme: ctx.settings.theme,
            camera_mode: ctx.settings.camera,
            camera: Camera::follow(ctx.settings.camera, player),
            crafts: ctx.crafts.iter().map(CraftView::from).collect(),
            coins: ctx
                .coins
                .iter()
                .filter(|c| !c.collected)
                .map(|c| c.pos)
                .collect(),
            shield: ctx
                .shield
                .as_ref()
                .filter(|s| !s.collected)
                .map(|s| s.pos),
            obstacles: ctx
                .obstacles
                .iter()
                .filter(|o| o.is_live())
                .map(|o| ObstacleView {
                    id: o.id,
                    pos: o.pos,
                    shape: o.shape,
                })
                .collect(),
            projectiles: ctx.projectiles.iter().map(|p| p.pos).collect(),
            track_width: track.width,
            track_length: track.length,
            finish_line: track.finish_line,
            hud: Hud::from_context(ctx),
            outcome: ctx.outcome,
            sim_time: ctx.sim_time,
        }
    }

    /// Serialize for an external frontend
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
