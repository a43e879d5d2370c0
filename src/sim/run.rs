//! Process-wide run state

use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameEvent};

/// Phase of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameRunState {
    #[default]
    WaitingToStart,
    Playing,
    Paused,
    Failed,
}

/// Owns [`GameRunState`]; moves only on bus notifications
#[derive(Debug, Default)]
pub struct RunManager {
    state: GameRunState,
}

impl RunManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GameRunState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameRunState::Playing
    }

    pub fn handle(&mut self, event: GameEvent) {
        let next = match (self.state, event) {
            (GameRunState::WaitingToStart, GameEvent::RunStarted) => GameRunState::Playing,
            (GameRunState::Playing, GameEvent::RunPaused) => GameRunState::Paused,
            (GameRunState::Paused, GameEvent::RunResumed) => GameRunState::Playing,
            (GameRunState::Playing | GameRunState::Paused, GameEvent::RunFailed) => {
                GameRunState::Failed
            }
            (GameRunState::Failed, GameEvent::RunRestarted) => GameRunState::WaitingToStart,
            _ => return,
        };
        log::info!("Run state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Pause toggle from the UI: pause while playing, resume while paused
    pub fn request_toggle_pause(&self, bus: &mut EventBus) -> bool {
        match self.state {
            GameRunState::Playing => bus.publish(GameEvent::RunPaused),
            GameRunState::Paused => bus.publish(GameEvent::RunResumed),
            _ => return false,
        }
        true
    }

    /// Restart is only meaningful after a failed run
    pub fn can_restart(&self) -> bool {
        self.state == GameRunState::Failed
    }
}
