//! Top score tracking
//!
//! Watches `ScoreChanged` notifications and raises the stored top score
//! whenever a run beats it. The stored value never goes down.

use crate::persistence::{MemoryStore, TopScoreStore};
use crate::sim::GameEvent;

#[derive(Debug)]
pub struct TopScore {
    store: Box<dyn TopScoreStore>,
    /// Score of the run in progress
    current: u32,
}

impl Default for TopScore {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }
}

impl TopScore {
    pub fn new(store: Box<dyn TopScoreStore>) -> Self {
        Self { store, current: 0 }
    }

    pub fn top(&self) -> u32 {
        self.store.top_score()
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Record a score; returns true if it set a new top score
    pub fn submit(&mut self, score: u32) -> bool {
        self.current = score;
        if score <= self.store.top_score() {
            return false;
        }
        self.store.set_top_score(score);
        log::info!("New top score: {}", crate::format_value(score));
        true
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        if let GameEvent::ScoreChanged(score) = event {
            self.submit(score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_raises() {
        let mut top = TopScore::new(Box::new(MemoryStore::with_top_score(16)));
        assert!(!top.submit(8));
        assert_eq!(top.top(), 16);
        assert_eq!(top.current(), 8);

        assert!(top.submit(32));
        assert_eq!(top.top(), 32);

        // A restart announces the starting value; the top score stays
        top.handle_event(GameEvent::ScoreChanged(2));
        assert_eq!(top.top(), 32);
        assert_eq!(top.current(), 2);
    }

    #[test]
    fn test_ignores_other_events() {
        let mut top = TopScore::default();
        top.handle_event(GameEvent::HealthChanged(64));
        top.handle_event(GameEvent::PlayerValueChanged(64));
        assert_eq!(top.top(), 0);
    }
}
