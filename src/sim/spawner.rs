//! Obstacle spawner: catalog + pool
//!
//! Draws a value from the catalog around the current player value, checks
//! an instance out of the obstacle pool and places it.

use glam::Vec3;
use rand::Rng;

use super::catalog::{ObstacleCatalog, ObstacleConfig};
use super::pool::{Pool, PoolHandle};
use super::segment::SegmentHandle;
use crate::consts::STARTING_VALUE;
use crate::error::Result;

pub type ObstacleHandle = PoolHandle<Obstacle>;

/// A pooled obstacle vehicle
#[derive(Debug, Clone, Default)]
pub struct Obstacle {
    /// None until first spawned
    pub config: Option<ObstacleConfig>,
    pub position: Vec3,
    /// Segment this obstacle is attached to (non-owning)
    pub segment: Option<SegmentHandle>,
    /// Already resolved against the player this spawn
    pub hit: bool,
}

impl Obstacle {
    /// Obstacle value, 0 before the first spawn
    pub fn value(&self) -> u32 {
        self.config.map_or(0, |c| c.value)
    }

    fn reset(&mut self, config: ObstacleConfig, position: Vec3) {
        self.config = Some(config);
        self.position = position;
        self.segment = None;
        self.hit = false;
    }
}

/// Produces and recycles obstacles
#[derive(Debug)]
pub struct ObstacleSpawner {
    catalog: ObstacleCatalog,
    pool: Pool<Obstacle>,
    /// Mirrors the last `PlayerValueChanged` notification
    player_value: u32,
}

impl ObstacleSpawner {
    pub fn new(catalog: ObstacleCatalog, warm_up: usize) -> Self {
        Self {
            catalog,
            pool: Pool::with_warm_up("obstacles", Obstacle::default, warm_up),
            player_value: STARTING_VALUE,
        }
    }

    pub fn catalog(&self) -> &ObstacleCatalog {
        &self.catalog
    }

    pub fn player_value(&self) -> u32 {
        self.player_value
    }

    pub fn set_player_value(&mut self, value: u32) {
        self.player_value = value;
    }

    /// Spawn an obstacle at `position`; None if the catalog has no entry
    /// for the selected value (logged, never fatal)
    pub fn create_obstacle<R: Rng + ?Sized>(
        &mut self,
        position: Vec3,
        rng: &mut R,
    ) -> Option<ObstacleHandle> {
        let value = self.catalog.select_value(self.player_value, rng);
        let Some(config) = self.catalog.find(value).copied() else {
            log::error!("No obstacle configuration found for value {value}");
            return None;
        };

        let handle = self.pool.acquire();
        if let Some(obstacle) = self.pool.get_mut(handle) {
            obstacle.reset(config, position);
        }
        Some(handle)
    }

    /// Give an obstacle back to the pool
    pub fn return_obstacle(&mut self, handle: ObstacleHandle) -> Result<()> {
        self.pool.release(handle)
    }

    pub fn get(&self, handle: ObstacleHandle) -> Option<&Obstacle> {
        self.pool.get(handle)
    }

    pub fn get_mut(&mut self, handle: ObstacleHandle) -> Option<&mut Obstacle> {
        self.pool.get_mut(handle)
    }

    pub fn is_active(&self, handle: ObstacleHandle) -> bool {
        self.pool.is_active(handle)
    }

    /// Live obstacles in handle order
    pub fn active(&self) -> impl Iterator<Item = (ObstacleHandle, &Obstacle)> {
        self.pool.iter_active()
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = (ObstacleHandle, &mut Obstacle)> {
        self.pool.iter_active_mut()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}
