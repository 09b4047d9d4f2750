//! Jet Racer entry point
//!
//! Native headless driver: runs a campaign race under autopilot through the
//! same input path a windowed frontend would use, then prints the final HUD.
//!
//! Usage: `jet-racer [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;

    use jet_racer::Tuning;
    use jet_racer::platform::{InputAdapter, Key};
    use jet_racer::renderer::{RenderSnapshot, as_bytes, build_instances, build_scene};
    use jet_racer::sim::{GameEvent, RacePhase, SimContext, tick};

    const SIM_DT: f32 = 1.0 / 60.0;
    /// Give up on a race after this much simulated time
    const MAX_RACE_SECONDS: f32 = 180.0;
    /// How far ahead the autopilot looks for obstacles
    const SCAN_AHEAD: f32 = 450.0;
    /// Obstacles closer than this laterally are in our lane
    const LANE_HALF_WIDTH: f32 = 90.0;
    /// Ticks between shots
    const FIRE_INTERVAL: u32 = 12;

    /// Scripted pilot: full throttle, shoot what is in the lane, steer around the rest
    struct Autopilot {
        cooldown: u32,
    }

    impl Autopilot {
        fn drive(&mut self, ctx: &SimContext, input: &mut InputAdapter) {
            let player = ctx.player();
            input.key_down(Key::Char('w'), ctx.phase);

            let threat = ctx
                .obstacles
                .iter()
                .filter(|o| o.is_live())
                .filter(|o| {
                    let dy = o.pos.y - player.pos.y;
                    dy > 0.0 && dy < SCAN_AHEAD && (o.pos.x - player.pos.x).abs() < LANE_HALF_WIDTH
                })
                .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

            let (left, right) = match threat {
                Some(obstacle) if obstacle.pos.x >= player.pos.x => (true, false),
                Some(_) => (false, true),
                None => (player.pos.x > LANE_HALF_WIDTH, player.pos.x < -LANE_HALF_WIDTH),
            };
            set_held(input, Key::Char('a'), left, ctx.phase);
            set_held(input, Key::Char('d'), right, ctx.phase);

            self.cooldown = self.cooldown.saturating_sub(1);
            if threat.is_some() && self.cooldown == 0 {
                input.mouse_click();
                self.cooldown = FIRE_INTERVAL;
            }
        }
    }

    fn set_held(input: &mut InputAdapter, key: Key, held: bool, phase: RacePhase) {
        if held {
            input.key_down(key, phase);
        } else {
            input.key_up(key);
        }
    }

    fn parse_args() -> Result<(u64, Tuning), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(arg) => arg.parse()?,
            None => rand::random(),
        };
        let tuning = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                log::info!("Loaded tuning from {}", path);
                Tuning::from_json(&json)?
            }
            None => Tuning::default(),
        };
        Ok((seed, tuning))
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let (seed, tuning) = parse_args()?;
        log::info!("Jet Racer (native) starting with seed {}", seed);

        let mut ctx = SimContext::with_tuning(seed, tuning)?;
        let mut input = InputAdapter::new();
        let mut pilot = Autopilot { cooldown: 0 };

        // Menu -> race
        input.key_down(Key::Char(' '), ctx.phase);
        tick(&mut ctx, &input.take_input(), 0.0);
        input.key_up(Key::Char(' '));

        let mut coins = 0;
        let mut shots = 0;
        while ctx.phase == RacePhase::Racing && ctx.race_clock < MAX_RACE_SECONDS {
            pilot.drive(&ctx, &mut input);
            tick(&mut ctx, &input.take_input(), SIM_DT);
            for event in ctx.drain_events() {
                match event {
                    GameEvent::CoinCollected { .. } => coins += 1,
                    GameEvent::ProjectileFired { .. } => shots += 1,
                    GameEvent::LapCompleted { craft: 0, lap } => {
                        log::info!("Lap {} at {:.1}s", lap, ctx.race_clock)
                    }
                    _ => {}
                }
            }
        }

        match ctx.outcome {
            Some(outcome) => log::info!(
                "Race over: {:?} in {:.1}s ({} coins, {} shots)",
                outcome,
                ctx.race_clock,
                coins,
                shots
            ),
            None => log::warn!("Race still running after {:.0}s, stopping", MAX_RACE_SECONDS),
        }

        let snapshot = RenderSnapshot::capture(&ctx);
        let instances = build_instances(&snapshot);
        let scene = build_scene(&snapshot);
        log::info!(
            "Final frame: {} instances ({} bytes), {} theme, {} camera, background {:?}",
            instances.len(),
            as_bytes(&instances).len(),
            snapshot.hud.theme,
            snapshot.hud.camera,
            scene.background
        );
        println!("{}", serde_json::to_string_pretty(&snapshot.hud)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by a web frontend on wasm
}
