//! Browser host bindings
//!
//! The page owns the canvas, the requestAnimationFrame loop and raw
//! pointer handling; it feeds frame times and discrete inputs in here and
//! reads back a flat render snapshot plus the notifications of the frame.

use wasm_bindgen::prelude::*;

use super::InputEvent;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::LocalStorageStore;
use crate::settings::GameConfig;
use crate::sim::{GameRunState, RenderKind, TickInput, World, tick};

/// Floats per entity in [`WebGame::render_snapshot`]:
/// kind, x, y, z, qx, qy, qz, qw, visual, value
pub const RENDER_STRIDE: usize = 10;

#[wasm_bindgen]
pub struct WebGame {
    world: World,
    accumulator: f32,
    input: TickInput,
    topics: Vec<&'static str>,
}

#[wasm_bindgen]
impl WebGame {
    /// Boot a run; `config_json` may be empty for the default tuning
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, config_json: &str) -> Result<WebGame, JsValue> {
        super::init_logging();

        let config = if config_json.is_empty() {
            GameConfig::default()
        } else {
            GameConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let store = LocalStorageStore::load(LocalStorageStore::DEFAULT_KEY);
        let mut world = World::new(config, seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .with_store(Box::new(store));
        world.boot();
        log::info!("Merge Runner starting (seed {seed})");

        Ok(WebGame {
            world,
            accumulator: 0.0,
            input: TickInput::default(),
            topics: Vec::new(),
        })
    }

    /// Run simulation ticks for one animation frame
    pub fn frame(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.world, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.topics
            .extend(self.world.drain_events().iter().map(|e| e.topic()));
    }

    /// Tap or click that did not land on UI
    pub fn tap(&mut self) {
        self.input.events.push(InputEvent::TapToStart);
    }

    /// Horizontal swipe or arrow key; negative is left
    pub fn steer(&mut self, direction: i32) {
        let event = if direction < 0 {
            InputEvent::SwipeLeft
        } else {
            InputEvent::SwipeRight
        };
        self.input.events.push(event);
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn is_failed(&self) -> bool {
        self.world.phase() == GameRunState::Failed
    }

    pub fn is_paused(&self) -> bool {
        self.world.phase() == GameRunState::Paused
    }

    pub fn health(&self) -> u32 {
        self.world.progression().map_or(0, |p| p.health)
    }

    /// HUD text for the current value ("2", "1K", "262.1K")
    pub fn value_label(&self) -> String {
        crate::format_value(self.world.progression().map_or(0, |p| p.value))
    }

    pub fn top_score_label(&self) -> String {
        crate::format_value(self.world.top_score.top())
    }

    /// Notification topics since the last call, oldest first
    pub fn drain_topics(&mut self) -> js_sys::Array {
        self.topics.drain(..).map(JsValue::from_str).collect()
    }

    /// Flat render snapshot, [`RENDER_STRIDE`] floats per entity
    pub fn render_snapshot(&self) -> js_sys::Float32Array {
        let list = self.world.render_list();
        let mut flat = Vec::with_capacity(list.len() * RENDER_STRIDE);
        for request in &list {
            let kind = match request.kind {
                RenderKind::Player => 0.0,
                RenderKind::Obstacle => 1.0,
            };
            flat.push(kind);
            flat.extend_from_slice(&request.position.to_array());
            flat.extend_from_slice(&request.rotation.to_array());
            flat.push(request.visual.0 as f32);
            flat.push(request.value as f32);
        }
        js_sys::Float32Array::from(flat.as_slice())
    }
}
