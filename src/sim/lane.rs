//! Two-lane controller: discrete lane changes with interpolated lateral
//! motion and banking, plus the tap-to-start locomotion gate.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::LANE_EPSILON;
use crate::settings::LaneConfig;

/// Lateral movement below this counts as "not moving" for banking
const BANK_MOVE_EPSILON: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Right,
}

impl Lane {
    pub fn index(self) -> i32 {
        match self {
            Lane::Left => 0,
            Lane::Right => 1,
        }
    }

    /// Lane for a raw index; None outside the lane envelope
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Lane::Left),
            1 => Some(Lane::Right),
            _ => None,
        }
    }

    /// Lateral coordinate of this lane's centre
    pub fn offset(self, lane_offset: f32) -> f32 {
        match self {
            Lane::Left => -lane_offset,
            Lane::Right => lane_offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    Idle,
    ChangingLane,
}

/// Forward locomotion gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locomotion {
    Idle,
    Moving,
}

/// Position + rotation of a vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

#[derive(Debug, Clone)]
pub struct LaneController {
    config: LaneConfig,
    lane: Lane,
    target_offset: f32,
    state: LaneState,
    locomotion: Locomotion,
    can_control: bool,
    waiting_for_input: bool,
    forward_speed: f32,
}

impl LaneController {
    pub fn new(config: LaneConfig) -> Self {
        let forward_speed = config.forward_speed;
        let target_offset = Lane::Left.offset(config.lane_offset());
        Self {
            config,
            lane: Lane::Left,
            target_offset,
            state: LaneState::Idle,
            locomotion: Locomotion::Idle,
            can_control: false,
            waiting_for_input: false,
            forward_speed,
        }
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn state(&self) -> LaneState {
        self.state
    }

    pub fn locomotion(&self) -> Locomotion {
        self.locomotion
    }

    pub fn target_offset(&self) -> f32 {
        self.target_offset
    }

    pub fn can_control(&self) -> bool {
        self.can_control
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting_for_input
    }

    pub fn forward_speed(&self) -> f32 {
        self.forward_speed
    }

    pub fn set_forward_speed(&mut self, speed: f32) {
        self.forward_speed = speed;
    }

    /// Snap to the left lane, upright, with every gate closed
    pub fn reset(&mut self, transform: &mut Transform) {
        self.lane = Lane::Left;
        self.target_offset = Lane::Left.offset(self.config.lane_offset());
        transform.position.x = self.target_offset;
        transform.rotation = Quat::IDENTITY;

        self.state = LaneState::Idle;
        self.locomotion = Locomotion::Idle;
        self.can_control = false;
        self.waiting_for_input = false;
    }

    /// Request a lane change (-1 = left, +1 = right)
    ///
    /// Ignored mid-change or when the destination is outside the two lanes.
    pub fn try_change_lane(&mut self, direction: i32) -> bool {
        if self.state != LaneState::Idle {
            return false;
        }
        let Some(lane) = Lane::from_index(self.lane.index() + direction) else {
            return false;
        };
        self.lane = lane;
        self.target_offset = lane.offset(self.config.lane_offset());
        self.state = LaneState::ChangingLane;
        true
    }

    /// First confirmed tap after a run starts releases the vehicle
    pub fn tap_to_start(&mut self) -> bool {
        if !self.waiting_for_input {
            return false;
        }
        self.waiting_for_input = false;
        self.locomotion = Locomotion::Moving;
        self.can_control = true;
        true
    }

    /// Steering input; only honoured while the player has control
    pub fn steer(&mut self, direction: i32) -> bool {
        self.can_control && self.try_change_lane(direction)
    }

    pub fn on_run_started(&mut self) {
        self.can_control = false;
        self.waiting_for_input = true;
        self.locomotion = Locomotion::Idle;
    }

    pub fn on_run_failed(&mut self) {
        self.can_control = false;
        self.locomotion = Locomotion::Idle;
        self.waiting_for_input = false;
    }

    pub fn on_paused(&mut self) {
        self.can_control = false;
        self.locomotion = Locomotion::Idle;
    }

    pub fn on_resumed(&mut self) {
        self.can_control = true;
        self.locomotion = Locomotion::Moving;
    }

    /// Delayed check after a run starts: wait for a tap again if nothing else
    /// has claimed the controller
    pub fn rearm_input_wait(&mut self) {
        if !self.waiting_for_input && self.locomotion == Locomotion::Idle {
            self.waiting_for_input = true;
        }
    }

    /// Advance one tick
    pub fn update(&mut self, transform: &mut Transform, dt: f32) {
        if !self.can_control {
            return;
        }

        if self.locomotion == Locomotion::Moving {
            transform.position.z += self.forward_speed * dt;
        }

        let half = self.config.lane_offset();
        let previous_x = transform.position.x;
        let new_x = move_towards(
            previous_x,
            self.target_offset,
            self.config.lane_change_speed * dt,
        )
        .clamp(-half, half);
        transform.position.x = new_x;

        let progress =
            (1.0 - (new_x - self.target_offset).abs() / self.config.lane_distance).clamp(0.0, 1.0);

        let bank_rate = (dt * self.config.lane_change_speed).min(1.0);
        let reset_rate = (dt * self.config.rotation_reset_speed).min(1.0);

        match self.state {
            LaneState::ChangingLane => {
                let movement = new_x - previous_x;
                if movement.abs() > BANK_MOVE_EPSILON {
                    if progress < self.config.rotation_reset_threshold {
                        let yaw = movement.signum() * self.config.bank_angle_deg.to_radians();
                        transform.rotation =
                            transform.rotation.lerp(Quat::from_rotation_y(yaw), bank_rate);
                    } else {
                        transform.rotation = transform.rotation.lerp(Quat::IDENTITY, reset_rate);
                    }
                }
            }
            LaneState::Idle => {
                transform.rotation = transform.rotation.lerp(Quat::IDENTITY, reset_rate);
            }
        }

        if (transform.position.x - self.target_offset).abs() < LANE_EPSILON {
            self.state = LaneState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn started() -> (LaneController, Transform) {
        let mut c = LaneController::new(LaneConfig::default());
        let mut t = Transform::at(Vec3::ZERO);
        c.reset(&mut t);
        c.on_run_started();
        assert!(c.tap_to_start());
        (c, t)
    }

    #[test]
    fn test_reset_places_vehicle_in_left_lane() {
        let mut c = LaneController::new(LaneConfig::default());
        let mut t = Transform::at(Vec3::new(1.0, 0.0, 9.0));
        t.rotation = Quat::from_rotation_y(0.3);
        c.reset(&mut t);
        assert_eq!(t.position.x, -2.5);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(c.lane(), Lane::Left);
        assert!(!c.can_control());
    }

    #[test]
    fn test_lane_bounds_reject_out_of_envelope() {
        let (mut c, mut t) = started();
        assert!(!c.try_change_lane(-1));
        assert_eq!(c.lane(), Lane::Left);
        assert_eq!(c.state(), LaneState::Idle);

        assert!(c.try_change_lane(1));
        for _ in 0..120 {
            c.update(&mut t, SIM_DT);
        }
        assert_eq!(c.state(), LaneState::Idle);
        assert_eq!(c.lane(), Lane::Right);

        let target = c.target_offset();
        assert!(!c.try_change_lane(1));
        assert_eq!(c.lane(), Lane::Right);
        assert_eq!(c.target_offset(), target);
    }

    #[test]
    fn test_change_runs_to_completion_and_ignores_new_requests() {
        let (mut c, mut t) = started();
        assert!(c.try_change_lane(1));
        c.update(&mut t, SIM_DT);
        assert_eq!(c.state(), LaneState::ChangingLane);
        // Mid-change requests are debounced
        assert!(!c.try_change_lane(-1));
        assert_eq!(c.lane(), Lane::Right);

        // 5 units at 10 units/s is half a second
        for _ in 0..70 {
            c.update(&mut t, SIM_DT);
            assert!(t.position.x >= -2.5 && t.position.x <= 2.5);
        }
        assert_eq!(c.state(), LaneState::Idle);
        assert!((t.position.x - 2.5).abs() < LANE_EPSILON);
    }

    #[test]
    fn test_banks_toward_movement_then_settles() {
        let (mut c, mut t) = started();
        c.try_change_lane(1);
        for _ in 0..10 {
            c.update(&mut t, SIM_DT);
        }
        // Nose turned toward +x while moving right
        assert!((t.rotation * Vec3::Z).x > 0.05);

        for _ in 0..240 {
            c.update(&mut t, SIM_DT);
        }
        assert!((t.rotation * Vec3::Z).x.abs() < 1e-3);
    }

    #[test]
    fn test_moves_forward_only_after_tap() {
        let mut c = LaneController::new(LaneConfig::default());
        let mut t = Transform::at(Vec3::ZERO);
        c.reset(&mut t);
        c.on_run_started();

        c.update(&mut t, SIM_DT);
        assert_eq!(t.position.z, 0.0);
        assert!(!c.steer(1));

        assert!(c.tap_to_start());
        assert!(!c.tap_to_start());
        c.update(&mut t, 1.0);
        assert!((t.position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pause_resume_and_fail_gates() {
        let (mut c, mut t) = started();
        c.on_paused();
        c.update(&mut t, 1.0);
        assert_eq!(t.position.z, 0.0);

        c.on_resumed();
        c.update(&mut t, 0.5);
        assert!((t.position.z - 5.0).abs() < 1e-4);

        c.on_run_failed();
        assert!(!c.is_waiting_for_input());
        assert!(!c.steer(1));
        c.update(&mut t, 1.0);
        assert!((t.position.z - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_rearm_only_when_nothing_claimed_controller() {
        let mut c = LaneController::new(LaneConfig::default());
        c.rearm_input_wait();
        assert!(c.is_waiting_for_input());

        let (mut moving, _) = started();
        moving.rearm_input_wait();
        assert!(!moving.is_waiting_for_input());
    }

    #[test]
    fn test_move_towards() {
        assert_eq!(move_towards(0.0, 1.0, 0.25), 0.25);
        assert_eq!(move_towards(0.0, -1.0, 0.25), -0.25);
        assert_eq!(move_towards(0.9, 1.0, 0.25), 1.0);
    }
}
