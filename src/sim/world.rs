//! The world: sole owner of every piece of mutable simulation state
//!
//! Pools, the active segment list, the player, the event bus and the
//! scheduler are plain fields here. Nothing is shared; the tick borrows
//! what it needs field by field.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::catalog::VisualHandle;
use super::events::{EventBus, GameEvent};
use super::lane::Locomotion;
use super::player::PlayerVehicle;
use super::progression::PlayerProgressionState;
use super::run::{GameRunState, RunManager};
use super::schedule::{Scheduler, TimerAction};
use super::spawner::ObstacleSpawner;
use super::track::TrackGenerator;
use crate::error::Result;
use crate::highscores::TopScore;
use crate::persistence::TopScoreStore;
use crate::platform::InputEvent;
use crate::settings::GameConfig;

/// What a render request draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Player,
    Obstacle,
}

/// Ready-to-draw snapshot of one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub kind: RenderKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub visual: VisualHandle,
    pub value: u32,
}

#[derive(Debug)]
pub struct World {
    pub config: GameConfig,
    /// RNG seed for this world
    pub seed: u64,
    /// RNG state (deterministic)
    pub rng: Pcg32,
    /// Simulation ticks since creation
    pub time_ticks: u64,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    pub run: RunManager,
    pub track: TrackGenerator,
    pub spawner: ObstacleSpawner,
    /// None until the run is booted
    pub player: Option<PlayerVehicle>,
    pub top_score: TopScore,
}

impl World {
    /// Build an idle world from a validated config
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;

        let track = TrackGenerator::new(config.track.clone(), config.lanes.lane_offset());
        let spawner = ObstacleSpawner::new(config.catalog.clone(), config.track.obstacle_pool_size);

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            run: RunManager::new(),
            track,
            spawner,
            player: None,
            top_score: TopScore::default(),
            config,
        })
    }

    /// Swap in a top score store (browser storage, tests)
    pub fn with_store(mut self, store: Box<dyn TopScoreStore>) -> Self {
        self.top_score = TopScore::new(store);
        self
    }

    /// Spawn the player and start the first run
    pub fn boot(&mut self) {
        if self.run.state() != GameRunState::WaitingToStart {
            log::warn!("Boot ignored in {:?}", self.run.state());
            return;
        }
        let player = self
            .player
            .get_or_insert_with(|| PlayerVehicle::spawn(&self.config));
        player.reset(&mut self.bus);
        self.bus.publish(GameEvent::RunStarted);
        self.pump_events();
    }

    pub fn phase(&self) -> GameRunState {
        self.run.state()
    }

    pub fn progression(&self) -> Option<PlayerProgressionState> {
        self.player.as_ref().map(|p| p.progression.state())
    }

    /// Pause while playing, resume while paused
    pub fn toggle_pause(&mut self) -> bool {
        let accepted = self.run.request_toggle_pause(&mut self.bus);
        self.pump_events();
        accepted
    }

    /// Start a fresh run after a failure; a no-op in any other state
    pub fn restart(&mut self) -> bool {
        if !self.run.can_restart() {
            log::debug!("Restart ignored in {:?}", self.run.state());
            return false;
        }
        let Some(player) = self.player.as_mut() else {
            return false;
        };

        log::info!("Restarting run");
        player.reset(&mut self.bus);
        self.bus.publish(GameEvent::RunRestarted);
        self.bus.publish(GameEvent::RunStarted);
        self.pump_events();
        true
    }

    /// Route one platform input to the lane controller
    pub fn handle_input(&mut self, input: InputEvent) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        match input.steer_direction() {
            Some(direction) => {
                player.controller.steer(direction);
            }
            None => {
                player.controller.tap_to_start();
            }
        }
    }

    /// Deliver pending notifications, including any raised while delivering
    pub fn pump_events(&mut self) {
        while let Some(event) = self.bus.next_pending() {
            self.run.handle(event);
            self.track.handle_event(event, &mut self.spawner);

            if let GameEvent::PlayerValueChanged(value) = event {
                self.spawner.set_player_value(value);
            }
            if let Some(player) = self.player.as_mut() {
                player.handle_event(event, self.spawner.catalog(), &mut self.scheduler);
            }
            if event == GameEvent::RunFailed {
                self.scheduler.cancel(TimerAction::RearmInputWait);
            }

            self.top_score.handle_event(event);
        }
    }

    pub fn run_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::RearmInputWait => {
                if let Some(player) = self.player.as_mut() {
                    player.controller.rearm_input_wait();
                }
            }
        }
    }

    /// Resolve every fresh player/obstacle overlap; returns the hit count
    ///
    /// Footprints are axis-aligned on x/z and share the player's
    /// half-extents. Obstacles resolve in ascending handle order and each
    /// is hit at most once per spawn. A player holding position for the
    /// start tap is not in play.
    pub fn resolve_collisions(&mut self) -> usize {
        let Some(player) = self.player.as_mut() else {
            return 0;
        };
        if player.controller.locomotion() == Locomotion::Idle {
            return 0;
        }
        let reach = self.config.player.half_extents * 2.0;
        let origin = player.transform.position;

        let mut hits = Vec::new();
        for (handle, obstacle) in self.spawner.active_mut() {
            if obstacle.hit {
                continue;
            }
            let dx = (obstacle.position.x - origin.x).abs();
            let dz = (obstacle.position.z - origin.z).abs();
            if dx < reach.x && dz < reach.y {
                obstacle.hit = true;
                hits.push((handle, obstacle.value()));
            }
        }
        hits.sort_by_key(|&(handle, _)| handle);

        for &(handle, value) in &hits {
            let outcome = player.progression.on_collision(value, &mut self.bus);
            log::debug!("Collision with {handle:?} (value {value}): {outcome:?}");
        }
        hits.len()
    }

    /// Snapshot for the renderer: the player first, then obstacles by handle
    pub fn render_list(&self) -> Vec<RenderRequest> {
        let mut list = Vec::with_capacity(self.spawner.active_count() + 1);
        if let Some(player) = &self.player {
            list.push(RenderRequest {
                kind: RenderKind::Player,
                position: player.transform.position,
                rotation: player.transform.rotation,
                visual: player.visual,
                value: player.progression.value(),
            });
        }
        for (_, obstacle) in self.spawner.active() {
            let Some(config) = obstacle.config else {
                continue;
            };
            list.push(RenderRequest {
                kind: RenderKind::Obstacle,
                position: obstacle.position,
                rotation: Quat::IDENTITY,
                visual: config.visual,
                value: config.value,
            });
        }
        list
    }

    /// Notifications delivered since the last drain, in order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.bus.drain_delivered()
    }
}
