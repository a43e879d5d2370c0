//! The player vehicle: transform, lane controller and progression

use glam::Vec3;

use super::catalog::{ObstacleCatalog, VisualHandle};
use super::events::{EventBus, GameEvent};
use super::lane::{LaneController, Transform};
use super::progression::Progression;
use super::schedule::{Scheduler, TimerAction};
use crate::settings::GameConfig;

#[derive(Debug, Clone)]
pub struct PlayerVehicle {
    pub transform: Transform,
    pub controller: LaneController,
    pub progression: Progression,
    /// Appearance for the current value
    pub visual: VisualHandle,
    spawn_point: Vec3,
    speed_scale: f32,
    rearm_delay: f32,
}

impl PlayerVehicle {
    /// Place a fresh vehicle at the configured spawn point
    pub fn spawn(config: &GameConfig) -> Self {
        let mut transform = Transform::at(config.player.spawn_point);
        let mut controller = LaneController::new(config.lanes.clone());
        controller.reset(&mut transform);
        log::info!("Player spawned at {}", transform.position);

        Self {
            transform,
            controller,
            progression: Progression::new(config.player.initial_health),
            visual: VisualHandle::default(),
            spawn_point: config.player.spawn_point,
            speed_scale: config.player.speed_scale,
            rearm_delay: config.lanes.rearm_delay,
        }
    }

    /// Back to the spawn point with fresh progression and controller
    pub fn reset(&mut self, bus: &mut EventBus) {
        self.transform = Transform::at(self.spawn_point);
        self.progression.reset_state(bus);
        self.controller.reset(&mut self.transform);
    }

    pub fn forward_position(&self) -> f32 {
        self.transform.position.z
    }

    pub fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.transform, dt);
    }

    /// React to a bus notification
    pub fn handle_event(
        &mut self,
        event: GameEvent,
        catalog: &ObstacleCatalog,
        scheduler: &mut Scheduler,
    ) {
        match event {
            GameEvent::RunStarted => {
                self.controller.on_run_started();
                scheduler.schedule_in(self.rearm_delay, TimerAction::RearmInputWait);
            }
            GameEvent::RunFailed => self.controller.on_run_failed(),
            GameEvent::RunPaused => self.controller.on_paused(),
            GameEvent::RunResumed => self.controller.on_resumed(),
            GameEvent::PlayerValueChanged(value) => self.apply_value_appearance(value, catalog),
            _ => {}
        }
    }

    /// Speed and visual follow the catalog entry for the current value
    fn apply_value_appearance(&mut self, value: u32, catalog: &ObstacleCatalog) {
        match catalog.find(value) {
            Some(config) => {
                self.visual = config.visual;
                self.controller
                    .set_forward_speed(config.speed * self.speed_scale);
            }
            None => log::warn!("No appearance for player value {value}"),
        }
    }
}
