//! Delayed one-shot callbacks on the simulation clock
//!
//! Timers are keyed by tick count, never by wall-clock time, so a replay of
//! the same inputs fires them on the same ticks.

use crate::consts::SIM_DT;

/// Deferred work the world knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Re-arm the controller's "waiting for start tap" flag if nothing set it
    RearmInputWait,
}

#[derive(Debug, Clone)]
struct Timer {
    due_tick: u64,
    seq: u64,
    action: TimerAction,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    tick: u64,
    next_seq: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation tick
    pub fn now(&self) -> u64 {
        self.tick
    }

    /// Fire `action` after `delay_secs` of simulated time (at least one tick)
    pub fn schedule_in(&mut self, delay_secs: f32, action: TimerAction) {
        let ticks = ((delay_secs / SIM_DT).round() as u64).max(1);
        self.timers.push(Timer {
            due_tick: self.tick + ticks,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Drop every pending timer for `action`; returns how many were dropped
    pub fn cancel(&mut self, action: TimerAction) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.action != action);
        before - self.timers.len()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Advance one tick and return the actions now due, in scheduling order
    pub fn advance(&mut self) -> Vec<TimerAction> {
        self.tick += 1;
        let now = self.tick;

        let mut due: Vec<Timer> = Vec::new();
        self.timers.retain(|t| {
            if t.due_tick <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due_tick, t.seq));
        due.into_iter().map(|t| t.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_one_second_of_ticks() {
        let mut s = Scheduler::new();
        s.schedule_in(1.0, TimerAction::RearmInputWait);
        let ticks_per_sec = (1.0 / SIM_DT).round() as u64;

        for _ in 1..ticks_per_sec {
            assert!(s.advance().is_empty());
        }
        assert_eq!(s.advance(), vec![TimerAction::RearmInputWait]);
        assert_eq!(s.pending(), 0);
        assert!(s.advance().is_empty());
    }

    #[test]
    fn test_zero_delay_waits_one_tick() {
        let mut s = Scheduler::new();
        s.schedule_in(0.0, TimerAction::RearmInputWait);
        assert_eq!(s.advance().len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        s.schedule_in(0.5, TimerAction::RearmInputWait);
        s.schedule_in(1.0, TimerAction::RearmInputWait);
        assert_eq!(s.cancel(TimerAction::RearmInputWait), 2);
        for _ in 0..200 {
            assert!(s.advance().is_empty());
        }
    }
}
