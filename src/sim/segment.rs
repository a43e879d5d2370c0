//! Fixed-length track strip and the obstacles spawned onto it

use glam::Vec3;

use super::pool::PoolHandle;
use super::spawner::{ObstacleHandle, ObstacleSpawner};

pub type SegmentHandle = PoolHandle<TrackSegment>;

/// A pooled road segment. Obstacle handles are held for recycling only;
/// the obstacles themselves belong to the spawner's pool.
#[derive(Debug, Clone, Default)]
pub struct TrackSegment {
    pub position: Vec3,
    obstacles: Vec<ObstacleHandle>,
}

impl TrackSegment {
    /// Move the segment to `z` on the forward axis
    pub fn place(&mut self, z: f32) {
        self.position = Vec3::new(0.0, 0.0, z);
    }

    pub fn obstacles(&self) -> &[ObstacleHandle] {
        &self.obstacles
    }

    /// Attach a spawned obstacle to this segment
    pub fn add_obstacle(
        &mut self,
        this: SegmentHandle,
        obstacle: ObstacleHandle,
        spawner: &mut ObstacleSpawner,
    ) {
        if let Some(o) = spawner.get_mut(obstacle) {
            o.segment = Some(this);
        }
        self.obstacles.push(obstacle);
    }

    /// Release every attached obstacle back to the spawner; returns how many
    /// were released. Handles that are no longer live are skipped.
    pub fn clear_obstacles(&mut self, spawner: &mut ObstacleSpawner) -> usize {
        let mut released = 0;
        for handle in self.obstacles.drain(..) {
            if !spawner.is_active(handle) {
                continue;
            }
            match spawner.return_obstacle(handle) {
                Ok(()) => released += 1,
                Err(e) => log::error!("Segment failed to release obstacle: {e}"),
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::ObstacleCatalog;
    use crate::sim::pool::Pool;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_clear_returns_obstacles_to_pool() {
        let mut segments: Pool<TrackSegment> = Pool::with_warm_up("segments", TrackSegment::default, 1);
        let mut spawner = ObstacleSpawner::new(ObstacleCatalog::doubling(4), 4);
        let mut rng = Pcg32::seed_from_u64(11);

        let seg = segments.acquire();
        let segment = segments.get_mut(seg).unwrap();
        segment.place(20.0);
        for i in 0..3 {
            let o = spawner
                .create_obstacle(Vec3::new(0.0, 0.0, 20.0 + i as f32), &mut rng)
                .unwrap();
            segment.add_obstacle(seg, o, &mut spawner);
        }

        assert_eq!(segment.obstacles().len(), 3);
        for &o in segment.obstacles() {
            assert_eq!(spawner.get(o).unwrap().segment, Some(seg));
        }

        assert_eq!(segment.clear_obstacles(&mut spawner), 3);
        assert!(segment.obstacles().is_empty());
        assert_eq!(spawner.active_count(), 0);
    }

    #[test]
    fn test_clear_skips_dead_references() {
        let mut segment = TrackSegment::default();
        let mut spawner = ObstacleSpawner::new(ObstacleCatalog::doubling(4), 2);
        let mut rng = Pcg32::seed_from_u64(11);
        let this = {
            let mut p: Pool<TrackSegment> = Pool::new("segments", TrackSegment::default);
            p.acquire()
        };

        let a = spawner.create_obstacle(Vec3::ZERO, &mut rng).unwrap();
        let b = spawner.create_obstacle(Vec3::ZERO, &mut rng).unwrap();
        segment.add_obstacle(this, a, &mut spawner);
        segment.add_obstacle(this, b, &mut spawner);
        spawner.return_obstacle(a).unwrap();

        assert_eq!(segment.clear_obstacles(&mut spawner), 1);
        assert_eq!(spawner.active_count(), 0);
    }
}
