//! Notification bus
//!
//! An explicit dispatcher owned by the world. Components publish into it
//! while handling a tick; the world pumps it to every subscriber in FIFO
//! order before the tick returns, so notifications always land in the same
//! tick as their cause. Everything delivered is also kept for external
//! collaborators (HUD, audio, renderer) to drain after the tick.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Notifications exchanged between the core and its collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    RunPaused,
    RunResumed,
    RunFailed,
    RunRestarted,
    ScoreChanged(u32),
    HealthChanged(u32),
    PlayerValueChanged(u32),
}

impl GameEvent {
    /// Topic name as seen by external collaborators
    pub fn topic(&self) -> &'static str {
        match self {
            GameEvent::RunStarted => "run-started",
            GameEvent::RunPaused => "run-paused",
            GameEvent::RunResumed => "run-resumed",
            GameEvent::RunFailed => "run-failed",
            GameEvent::RunRestarted => "run-restarted",
            GameEvent::ScoreChanged(_) => "score-changed",
            GameEvent::HealthChanged(_) => "health-changed",
            GameEvent::PlayerValueChanged(_) => "player-value-changed",
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    pending: VecDeque<GameEvent>,
    delivered: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification for delivery in the current tick
    pub fn publish(&mut self, event: GameEvent) {
        log::trace!("publish {}", event.topic());
        self.pending.push_back(event);
    }

    /// Take the next pending notification; it moves to the delivered log
    pub fn next_pending(&mut self) -> Option<GameEvent> {
        let event = self.pending.pop_front()?;
        self.delivered.push(event);
        Some(event)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Notifications delivered since the last drain, in delivery order
    pub fn delivered(&self) -> &[GameEvent] {
        &self.delivered
    }

    /// Hand the delivered log to external collaborators
    pub fn drain_delivered(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.delivered)
    }
}
