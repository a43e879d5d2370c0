//! Health and value of the player vehicle; resolves collisions into
//! merge-or-damage outcomes.

use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameEvent};
use crate::consts::STARTING_VALUE;

/// Snapshot of the player's progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgressionState {
    pub health: u32,
    pub value: u32,
}

/// What a collision did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Values matched; player value doubled
    Merged { value: u32 },
    /// Mismatch; one unit of damage taken
    Damaged { health: u32 },
    /// Mismatch that emptied health; the run has failed
    Failed,
    /// Run already failed, nothing changes
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Progression {
    initial_health: u32,
    state: PlayerProgressionState,
    failed: bool,
}

impl Progression {
    pub fn new(initial_health: u32) -> Self {
        Self {
            initial_health,
            state: PlayerProgressionState {
                health: initial_health,
                value: STARTING_VALUE,
            },
            failed: false,
        }
    }

    pub fn state(&self) -> PlayerProgressionState {
        self.state
    }

    pub fn health(&self) -> u32 {
        self.state.health
    }

    pub fn value(&self) -> u32 {
        self.state.value
    }

    pub fn initial_health(&self) -> u32 {
        self.initial_health
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Resolve a collision with an obstacle of `obstacle_value`
    pub fn on_collision(&mut self, obstacle_value: u32, bus: &mut EventBus) -> CollisionOutcome {
        if self.failed {
            return CollisionOutcome::Ignored;
        }

        if obstacle_value == self.state.value {
            let Some(doubled) = self.state.value.checked_mul(2) else {
                log::warn!("Player value {} cannot double further", self.state.value);
                return CollisionOutcome::Ignored;
            };
            self.state.value = doubled;
            bus.publish(GameEvent::PlayerValueChanged(doubled));
            bus.publish(GameEvent::ScoreChanged(doubled));
            return CollisionOutcome::Merged { value: doubled };
        }

        self.state.health = self.state.health.saturating_sub(1);
        bus.publish(GameEvent::HealthChanged(self.state.health));

        if self.state.health == 0 {
            self.failed = true;
            log::info!("Health depleted at value {}", self.state.value);
            bus.publish(GameEvent::RunFailed);
            return CollisionOutcome::Failed;
        }
        CollisionOutcome::Damaged {
            health: self.state.health,
        }
    }

    /// Back to full health and the starting value; re-announces everything so
    /// displays resynchronize
    pub fn reset_state(&mut self, bus: &mut EventBus) {
        self.state = PlayerProgressionState {
            health: self.initial_health,
            value: STARTING_VALUE,
        };
        self.failed = false;
        bus.publish(GameEvent::HealthChanged(self.state.health));
        bus.publish(GameEvent::PlayerValueChanged(self.state.value));
        bus.publish(GameEvent::ScoreChanged(self.state.value));
    }
}
