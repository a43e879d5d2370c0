//! Game tuning
//!
//! Every tunable the simulation reads lives here. Loaded from JSON by the
//! host (or taken as defaults) and validated once before the world is built.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::sim::ObstacleCatalog;

/// Procedural track parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Segments laid down synchronously when a run starts
    pub initial_segment_count: usize,
    /// Length of one segment along the forward axis
    pub segment_length: f32,
    /// Spawn trigger distance = segment_length * clip_value
    pub clip_value: f32,
    /// Despawn distance = segment_length * despawn_multiplier
    pub despawn_multiplier: f32,
    /// Gap kept between an obstacle band and its neighbours
    pub obstacle_margin: f32,
    pub min_obstacles: u32,
    pub max_obstacles: u32,
    pub segment_pool_size: usize,
    pub obstacle_pool_size: usize,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            initial_segment_count: 8,
            segment_length: 10.0,
            clip_value: 3.0,
            despawn_multiplier: 1.2,
            obstacle_margin: 2.0,
            min_obstacles: 1,
            max_obstacles: 3,
            segment_pool_size: 8,
            obstacle_pool_size: 15,
        }
    }
}

impl TrackConfig {
    pub fn spawn_trigger_distance(&self) -> f32 {
        self.segment_length * self.clip_value
    }

    pub fn despawn_distance(&self) -> f32 {
        self.segment_length * self.despawn_multiplier
    }
}

/// Lane-change and locomotion parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Distance between the two lane centres
    pub lane_distance: f32,
    /// Lateral speed while changing lanes (units/s)
    pub lane_change_speed: f32,
    /// Forward speed before the first merge (units/s)
    pub forward_speed: f32,
    /// Peak banking yaw while changing lanes (degrees)
    pub bank_angle_deg: f32,
    pub rotation_reset_speed: f32,
    /// Lane-change progress after which banking eases back to neutral
    pub rotation_reset_threshold: f32,
    /// Delay before re-arming the start-tap wait (seconds)
    pub rearm_delay: f32,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lane_distance: 5.0,
            lane_change_speed: 10.0,
            forward_speed: 10.0,
            bank_angle_deg: 15.0,
            rotation_reset_speed: 20.0,
            rotation_reset_threshold: 0.8,
            rearm_delay: 1.0,
        }
    }
}

impl LaneConfig {
    /// Lateral coordinate of the right lane (left is the negation)
    pub fn lane_offset(&self) -> f32 {
        self.lane_distance / 2.0
    }
}

/// Player vehicle parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub initial_health: u32,
    pub spawn_point: Vec3,
    /// Forward speed = catalog speed * speed_scale after a merge
    pub speed_scale: f32,
    /// Footprint half-extents (x = lateral, y = forward), shared with obstacles
    pub half_extents: Vec2,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_health: 3,
            spawn_point: Vec3::ZERO,
            speed_scale: 3.0,
            half_extents: Vec2::new(0.9, 2.0),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub track: TrackConfig,
    pub lanes: LaneConfig,
    pub player: PlayerConfig,
    pub catalog: ObstacleCatalog,
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded config: {} obstacle tiers, segment length {}",
            config.catalog.len(),
            config.track.segment_length
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tunings the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let t = &self.track;
        let invalid = |msg: &str| Err(SimError::InvalidConfig(msg.to_string()));

        if !(t.segment_length > 0.0) {
            return invalid("segment_length must be positive");
        }
        if !(t.clip_value > 0.0) || !(t.despawn_multiplier > 0.0) {
            return invalid("clip_value and despawn_multiplier must be positive");
        }
        if t.min_obstacles == 0 || t.max_obstacles < t.min_obstacles {
            return invalid("obstacle count range must be 1 <= min <= max");
        }
        if t.obstacle_margin < 0.0 {
            return invalid("obstacle_margin must not be negative");
        }
        if t.segment_pool_size == 0 || t.obstacle_pool_size == 0 {
            return invalid("pool sizes must be non-zero");
        }
        if !(self.lanes.lane_distance > 0.0) || !(self.lanes.lane_change_speed > 0.0) {
            return invalid("lane_distance and lane_change_speed must be positive");
        }
        if self.player.initial_health == 0 {
            return invalid("initial_health must be non-zero");
        }
        if self.catalog.is_empty() {
            return invalid("obstacle catalog is empty");
        }
        if self.catalog.index_of(crate::consts::STARTING_VALUE).is_none() {
            log::warn!(
                "Catalog has no entry for the starting value {}",
                crate::consts::STARTING_VALUE
            );
        }

        let band = t.segment_length / t.max_obstacles as f32;
        if band <= 2.0 * t.obstacle_margin {
            log::warn!(
                "Obstacle bands ({band}) narrower than twice the margin; obstacles stay near band centres"
            );
        }
        Ok(())
    }
}
