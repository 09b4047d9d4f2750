//! Heuristic throttle and steering for computer-controlled craft

use glam::Vec3;

use super::physics::FlightEnv;
use super::state::{Craft, PLAYER_INDEX, SimContext, Track};
use crate::settings::Difficulty;
use crate::tuning::AiTuning;

/// Throttle multiplier for a difficulty tier and campaign level
pub fn throttle_multiplier(tuning: &AiTuning, difficulty: Difficulty, level: u32) -> f32 {
    let tier = tuning.base_factor + difficulty.tier() as f32 * tuning.tier_step;
    tier + level.saturating_sub(1) as f32 * tuning.level_bonus
}

/// Coarse periodic gate for idle centering, staggered per craft
#[inline]
fn idle_gate_open(tuning: &AiTuning, sim_time: f32, ai_index: usize) -> bool {
    let slot = (sim_time * tuning.idle_gate_rate + ai_index as f32).floor() as i64;
    slot.rem_euclid(tuning.idle_gate_period) == 0
}

/// Apply one tick of AI decisions to a craft (before physics integration).
///
/// `ai_index` is the craft's position among AI craft, used to desynchronize
/// the idle gate.
pub fn steer_ai(
    craft: &mut Craft,
    ai_index: usize,
    player_pos: Vec3,
    throttle: f32,
    track: &Track,
    sim_time: f32,
    tuning: &AiTuning,
) {
    craft.accelerate_scaled(throttle);

    let dx = craft.pos.x - player_pos.x;
    let dy = craft.pos.y - player_pos.y;

    if dy.abs() < tuning.near_band {
        // Give the player room
        if dx.abs() < tuning.risk_band {
            craft.vel.x += if dx > 0.0 {
                tuning.avoid_nudge
            } else {
                -tuning.avoid_nudge
            };
        }
    } else if idle_gate_open(tuning, sim_time, ai_index) {
        let x = craft.pos.x;
        if x.abs() > tuning.idle_deadband && x.abs() < track.width / 3.0 {
            craft.vel.x -= x.signum() * tuning.idle_nudge;
        }
    }

    // Hard recentering near the walls
    if craft.pos.x.abs() > track.half_width() * tuning.hard_recenter_fraction {
        craft.vel.x -= craft.pos.x * tuning.hard_pull;
    }

    craft.refresh_speed();
}

/// AI step for the simulation tick: steer then integrate every AI craft
pub fn run_ai(ctx: &mut SimContext, env: &FlightEnv, dt: f32) {
    let throttle = throttle_multiplier(
        &ctx.tuning.ai_behavior,
        ctx.race.difficulty,
        ctx.campaign.level,
    );
    let player_pos = ctx.player().pos;

    let SimContext {
        crafts,
        rng,
        tuning,
        events,
        ..
    } = ctx;

    for (index, craft) in crafts.iter_mut().enumerate().skip(PLAYER_INDEX + 1) {
        if craft.finished {
            continue;
        }
        if !craft.crashed {
            let ai_index = index - (PLAYER_INDEX + 1);
            steer_ai(
                craft,
                ai_index,
                player_pos,
                throttle,
                &env.track,
                env.sim_time,
                &tuning.ai_behavior,
            );
        }
        // Crashed craft still play out their fall
        craft.integrate(index, env, dt, rng, events);
    }
}
