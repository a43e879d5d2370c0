//! Merge Runner headless driver
//!
//! Runs the simulation with a simple autopilot at the fixed timestep and
//! logs how the run goes. Usage: `merge-runner [seed] [seconds] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use merge_runner::consts::*;
    use merge_runner::format_value;
    use merge_runner::platform::{self, InputEvent};
    use merge_runner::settings::GameConfig;
    use merge_runner::sim::{GameEvent, GameRunState, Lane, TickInput, World, tick};

    /// Irregular host frame times, to exercise the accumulator
    const FRAME_TIMES: [f32; 4] = [1.0 / 60.0, 1.0 / 45.0, 1.0 / 75.0, 1.0 / 30.0];
    /// How far ahead the autopilot looks for the next obstacle
    const LOOKAHEAD: f32 = 14.0;

    struct Driver {
        world: World,
        accumulator: f32,
        input: TickInput,
        runs: u32,
    }

    impl Driver {
        fn new(world: World) -> Self {
            Self {
                world,
                accumulator: 0.0,
                input: TickInput::default(),
                runs: 1,
            }
        }

        /// Run simulation ticks for one host frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.autopilot();
                let input = std::mem::take(&mut self.input);
                tick(&mut self.world, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                for event in self.world.drain_events() {
                    self.report(event);
                }
            }
        }

        /// Tap to start, steer toward matching values, restart on failure
        fn autopilot(&mut self) {
            match self.world.phase() {
                GameRunState::Failed => {
                    self.input.restart = true;
                    self.runs += 1;
                    return;
                }
                GameRunState::Playing => {}
                _ => return,
            }
            let Some(player) = self.world.player.as_ref() else {
                return;
            };
            if player.controller.is_waiting_for_input() {
                self.input.events.push(InputEvent::TapToStart);
                return;
            }

            let z = player.forward_position();
            let value = player.progression.value();
            let lane_offset = self.world.config.lanes.lane_offset();
            let current = player.controller.lane();

            // Nearest unresolved obstacle ahead in each lane
            let mut nearest: [Option<(f32, u32)>; 2] = [None, None];
            for (_, obstacle) in self.world.spawner.active() {
                let ahead = obstacle.position.z - z;
                if obstacle.hit || !(0.0..LOOKAHEAD).contains(&ahead) {
                    continue;
                }
                let lane = if obstacle.position.x < 0.0 { Lane::Left } else { Lane::Right };
                let slot = &mut nearest[usize::from(lane == Lane::Right)];
                if slot.is_none_or(|(d, _)| ahead < d) {
                    *slot = Some((ahead, obstacle.value()));
                }
            }

            let score = |lane: Lane| match nearest[usize::from(lane == Lane::Right)] {
                Some((_, v)) if v == value => 2,
                None => 1,
                Some(_) => 0,
            };
            let other = if current == Lane::Left { Lane::Right } else { Lane::Left };
            if score(other) > score(current) {
                let swipe = if other.offset(lane_offset) > current.offset(lane_offset) {
                    InputEvent::SwipeRight
                } else {
                    InputEvent::SwipeLeft
                };
                self.input.events.push(swipe);
            }
        }

        fn report(&self, event: GameEvent) {
            match event {
                GameEvent::ScoreChanged(score) => {
                    log::info!(
                        "[run {}] score {} (top {}), {} segments active",
                        self.runs,
                        format_value(score),
                        format_value(self.world.top_score.top()),
                        self.world.track.active_count()
                    );
                }
                GameEvent::HealthChanged(health) => {
                    log::info!("[run {}] health {health}", self.runs);
                }
                GameEvent::RunFailed => {
                    let z = self
                        .world
                        .player
                        .as_ref()
                        .map_or(0.0, |p| p.forward_position());
                    log::info!("[run {}] failed at z = {z:.1}", self.runs);
                }
                _ => log::debug!("{}", event.topic()),
            }
        }
    }

    pub fn run() -> merge_runner::Result<()> {
        platform::init_logging();

        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
        let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0f32);
        let config = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    merge_runner::SimError::InvalidConfig(format!("{path}: {e}"))
                })?;
                GameConfig::from_json(&json)?
            }
            None => GameConfig::default(),
        };

        log::info!("Merge Runner (headless) starting: seed {seed}, {seconds} s");
        let mut world = World::new(config, seed)?;
        world.boot();

        let mut driver = Driver::new(world);
        let mut elapsed = 0.0;
        let mut frame = 0;
        while elapsed < seconds {
            let dt = FRAME_TIMES[frame % FRAME_TIMES.len()];
            driver.update(dt);
            elapsed += dt;
            frame += 1;
        }

        let world = &driver.world;
        log::info!(
            "Done after {} ticks over {} run(s): top score {}, {} obstacles live of {} pooled",
            world.time_ticks,
            driver.runs,
            format_value(world.top_score.top()),
            world.spawner.active_count(),
            world.spawner.pool_size()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `merge_runner::sim::tick` itself
}
