//! Per-craft flight integration and steering response
//!
//! Velocities are expressed per reference frame (60 Hz). Damping is applied
//! once per tick; positions integrate as `vel * dt * FRAME_REFERENCE_RATE`.

use rand::Rng;

use super::state::{Craft, GameEvent, Track};
use crate::consts::*;

/// Race parameters a craft needs to integrate one tick
#[derive(Debug, Clone, Copy)]
pub struct FlightEnv {
    pub track: Track,
    pub total_laps: u32,
    /// Race clock, recorded as the finish time
    pub race_clock: f32,
    /// Simulation time, drives the hover bob
    pub sim_time: f32,
}

impl Craft {
    /// Open the throttle (no effect when crashed or at max speed)
    pub fn accelerate(&mut self) {
        if !self.crashed && self.speed < self.config.max_speed {
            self.vel.y += self.config.acceleration;
            self.refresh_speed();
        }
    }

    /// Throttle scaled by `factor` (AI throttle)
    pub fn accelerate_scaled(&mut self, factor: f32) {
        if !self.crashed && self.speed < self.config.max_speed {
            self.vel.y += self.config.acceleration * factor;
            self.refresh_speed();
        }
    }

    pub fn brake(&mut self) {
        if !self.crashed && self.speed > self.config.min_brake_speed {
            self.vel *= self.config.braking_factor;
            self.refresh_speed();
        }
    }

    pub fn steer_left(&mut self) {
        self.steer(-1.0);
    }

    pub fn steer_right(&mut self) {
        self.steer(1.0);
    }

    fn steer(&mut self, direction: f32) {
        if self.crashed || self.speed <= self.config.min_steer_speed {
            return;
        }
        let cfg = self.config;
        self.vel.x += direction * cfg.steering_power * cfg.steering_response;
        self.heading = (self.heading + direction * cfg.heading_step)
            .clamp(-cfg.heading_limit, cfg.heading_limit);
        self.refresh_speed();
    }

    /// Relax heading toward straight ahead (call when no steering input)
    pub fn center_heading(&mut self) {
        let step = self.config.heading_recenter_step;
        if self.heading > 0.0 {
            self.heading = (self.heading - step).max(0.0);
        } else if self.heading < 0.0 {
            self.heading = (self.heading + step).min(0.0);
        }
    }

    /// Advance one tick: damping, banking, integration, wall bounce and lap detection.
    ///
    /// `index` identifies the craft in emitted events.
    pub fn integrate<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        env: &FlightEnv,
        dt: f32,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        if self.crashed {
            // Falling wreck
            if self.pos.z > 0.0 {
                self.pos.z = (self.pos.z - CRASH_FALL_RATE).max(0.0);
                self.heading += CRASH_SPIN_RATE;
            }
            return;
        }

        // Stabilization
        self.vel.x *= LATERAL_DAMPING;
        self.vel.y *= AIR_RESISTANCE;

        // Banking (cosmetic)
        let target_bank = -self.vel.x * BANK_PER_LATERAL;
        self.bank += (target_bank - self.bank) * BANK_SMOOTHING;

        // Position
        let step = self.vel * dt * FRAME_REFERENCE_RATE;
        self.pos.x += step.x;
        self.pos.y += step.y;
        self.pos.z =
            HOVER_ALTITUDE + (env.sim_time * HOVER_FREQUENCY + self.pos.x).sin() * HOVER_AMPLITUDE;

        // Wall bounce with speed scrub
        let limit = env.track.lateral_limit();
        if self.pos.x.abs() > limit {
            self.pos.x = limit.copysign(self.pos.x);
            self.vel.x *= BOUNDARY_BOUNCE;
            self.vel *= BOUNDARY_SCRUB;
        }

        self.refresh_speed();

        self.detect_lap(index, env, rng, events);
    }

    fn detect_lap<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        env: &FlightEnv,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        if self.finished || self.pos.y < env.track.finish_line {
            return;
        }

        self.laps_completed += 1;
        events.push(GameEvent::LapCompleted {
            craft: index,
            lap: self.laps_completed,
        });

        if self.laps_completed >= env.total_laps {
            self.finished = true;
            self.race_time = Some(env.race_clock);
            events.push(GameEvent::CraftFinished {
                craft: index,
                time: env.race_clock,
            });
            log::debug!("Craft {} finished in {:.2}s", index, env.race_clock);
        } else {
            // Back to just past the start line for the next pass
            self.pos.y = if self.is_player() {
                PLAYER_LAP_RESET_Y
            } else {
                rng.random_range(AI_LAP_RESET_MIN_Y..=AI_LAP_RESET_MAX_Y)
            };
            log::debug!("Craft {} completed lap {}", index, self.laps_completed);
        }
    }
}
