//! Simulation tick
//!
//! Core game loop step: resolves commands, then advances every system once
//! in a fixed order using a clamped delta time.

use super::ai::run_ai;
use super::collision::run_collisions;
use super::physics::FlightEnv;
use super::projectile::{fire, run_projectiles};
use super::state::{PLAYER_INDEX, RacePhase, SimContext};
use crate::consts::MAX_TICK_DT;

/// Discrete (edge-triggered) commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Fire,
    TogglePause,
    ToggleCamera,
    ToggleTheme,
    /// Start a race from the menu or confirm custom setup
    MenuConfirm,
    /// Back out of the current screen
    MenuCancel,
    /// Open custom race setup from the menu
    OpenSetup,
    /// Restart the current race
    Retry,
    SelectLaps(u32),
    SelectDifficulty(u32),
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Continuous controls, active while held
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    /// Discrete commands, applied in order before the simulation step
    pub commands: Vec<Command>,
}

/// Clamp a raw frame delta to `[0, MAX_TICK_DT]`; NaN and negatives become 0
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, MAX_TICK_DT)
}

impl SimContext {
    /// Apply one discrete command against the current phase
    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::Fire => {
                fire(self);
            }
            Command::TogglePause => self.toggle_pause(),
            Command::ToggleCamera => {
                if self.phase == RacePhase::Racing {
                    self.settings.camera = self.settings.camera.toggled();
                }
            }
            Command::ToggleTheme => self.settings.theme = self.settings.theme.toggled(),
            Command::MenuConfirm => match self.phase {
                RacePhase::Menu => self.start_quick_race(),
                RacePhase::CustomRaceSetup => self.confirm_setup(),
                _ => {}
            },
            Command::MenuCancel => self.abort(),
            Command::OpenSetup => self.open_setup(),
            Command::Retry => self.retry(),
            Command::SelectLaps(laps) => self.select_laps(laps),
            Command::SelectDifficulty(tier) => self.select_difficulty(tier),
        }
    }

    fn flight_env(&self) -> FlightEnv {
        FlightEnv {
            track: self.race.track,
            total_laps: self.race.total_laps,
            race_clock: self.race_clock,
            sim_time: self.sim_time,
        }
    }
}

/// Advance the simulation by one tick
pub fn tick(ctx: &mut SimContext, input: &TickInput, dt: f32) {
    let dt = clamp_dt(dt);
    debug_assert!(dt.is_finite());

    for &command in &input.commands {
        ctx.apply_command(command);
    }

    match ctx.phase {
        RacePhase::Racing => {}
        RacePhase::CampaignComplete => {
            ctx.sim_time += dt;
            ctx.update_campaign_complete(dt);
            return;
        }
        RacePhase::Paused => return,
        RacePhase::Menu | RacePhase::CustomRaceSetup | RacePhase::Finished => {
            ctx.sim_time += dt;
            return;
        }
    }

    ctx.sim_time += dt;
    ctx.race_clock += dt;

    // Player controls
    {
        let player = ctx.player_mut();
        if input.accelerate {
            player.accelerate();
        }
        if input.brake {
            player.brake();
        }
        if input.steer_left {
            player.steer_left();
        }
        if input.steer_right {
            player.steer_right();
        }
        if !input.steer_left && !input.steer_right {
            player.center_heading();
        }
    }

    // Player physics
    let env = ctx.flight_env();
    {
        let SimContext {
            crafts,
            rng,
            events,
            ..
        } = ctx;
        crafts[PLAYER_INDEX].integrate(PLAYER_INDEX, &env, dt, rng, events);
    }

    run_projectiles(ctx, dt);
    run_ai(ctx, &env, dt);
    run_collisions(ctx);
    ctx.evaluate_race();
}
