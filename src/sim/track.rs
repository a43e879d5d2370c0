//! Procedural track generator
//!
//! Keeps a moving window of segments around the player: lays down the
//! initial strip when a run starts, then each tick spawns at most one new
//! segment ahead and sheds segments that fell too far behind. Segments and
//! their obstacles are recycled through pools, never dropped.

use glam::Vec3;
use rand::Rng;

use super::events::GameEvent;
use super::player::PlayerVehicle;
use super::pool::Pool;
use super::run::GameRunState;
use super::segment::{SegmentHandle, TrackSegment};
use super::spawner::ObstacleSpawner;
use crate::error::SimError;
use crate::settings::TrackConfig;

/// Source of the player's forward-axis position
///
/// `None` means the player is not placed yet; the generator retries once on
/// the following tick.
pub trait PlayerLocator {
    fn forward_position(&self) -> Option<f32>;
}

impl PlayerLocator for PlayerVehicle {
    fn forward_position(&self) -> Option<f32> {
        Some(self.transform.position.z)
    }
}

impl<L: PlayerLocator> PlayerLocator for Option<L> {
    fn forward_position(&self) -> Option<f32> {
        self.as_ref().and_then(|l| l.forward_position())
    }
}

/// Where the generator is in bringing up a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackInit {
    /// No run in progress (or it failed)
    Idle,
    /// Waiting to find the player; `retried` once the single retry is spent
    Locating { retried: bool },
    /// Window is being maintained
    Ready,
    /// Player never showed up; generator stays inert until restart
    Inert,
}

/// What a maintenance tick changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackTick {
    pub spawned: usize,
    pub despawned: usize,
}

#[derive(Debug)]
pub struct TrackGenerator {
    config: TrackConfig,
    lane_offset: f32,
    spawn_trigger_distance: f32,
    despawn_distance: f32,
    segments: Pool<TrackSegment>,
    /// Active segments, oldest first
    active: Vec<SegmentHandle>,
    last_spawn_z: f32,
    phase: GameRunState,
    init: TrackInit,
}

impl TrackGenerator {
    pub fn new(config: TrackConfig, lane_offset: f32) -> Self {
        let segments = Pool::with_warm_up(
            "segments",
            TrackSegment::default,
            config.segment_pool_size,
        );
        Self {
            spawn_trigger_distance: config.spawn_trigger_distance(),
            despawn_distance: config.despawn_distance(),
            config,
            lane_offset,
            segments,
            active: Vec::new(),
            last_spawn_z: 0.0,
            phase: GameRunState::WaitingToStart,
            init: TrackInit::Idle,
        }
    }

    pub fn last_spawn_z(&self) -> f32 {
        self.last_spawn_z
    }

    pub fn init_state(&self) -> TrackInit {
        self.init
    }

    pub fn is_initialized(&self) -> bool {
        self.init == TrackInit::Ready
    }

    pub fn phase(&self) -> GameRunState {
        self.phase
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn spawn_trigger_distance(&self) -> f32 {
        self.spawn_trigger_distance
    }

    pub fn despawn_distance(&self) -> f32 {
        self.despawn_distance
    }

    pub fn segment_length(&self) -> f32 {
        self.config.segment_length
    }

    /// Segments ever created by the pool
    pub fn segment_pool_size(&self) -> usize {
        self.segments.len()
    }

    /// Active segments, oldest first
    pub fn active_segments(&self) -> impl Iterator<Item = (SegmentHandle, &TrackSegment)> {
        self.active
            .iter()
            .filter_map(|&h| self.segments.get(h).map(|s| (h, s)))
    }

    /// React to a run notification
    pub fn handle_event(&mut self, event: GameEvent, spawner: &mut ObstacleSpawner) {
        match event {
            GameEvent::RunStarted => {
                self.phase = GameRunState::Playing;
                if self.init == TrackInit::Idle {
                    self.last_spawn_z = 0.0;
                    self.init = TrackInit::Locating { retried: false };
                }
            }
            GameEvent::RunPaused => {
                if self.phase == GameRunState::Playing {
                    self.phase = GameRunState::Paused;
                }
            }
            GameEvent::RunResumed => {
                if self.phase == GameRunState::Paused {
                    self.phase = GameRunState::Playing;
                }
            }
            GameEvent::RunFailed => {
                // Segments stay on screen until the restart clears them
                self.phase = GameRunState::Failed;
                self.init = TrackInit::Idle;
            }
            GameEvent::RunRestarted => {
                self.phase = GameRunState::WaitingToStart;
                self.init = TrackInit::Idle;
                self.clear(spawner);
            }
            _ => {}
        }
    }

    /// Per-tick maintenance; does nothing unless the run is playing
    pub fn tick<L, R>(&mut self, locator: &L, spawner: &mut ObstacleSpawner, rng: &mut R) -> TrackTick
    where
        L: PlayerLocator + ?Sized,
        R: Rng + ?Sized,
    {
        if self.phase != GameRunState::Playing {
            return TrackTick::default();
        }

        match self.init {
            TrackInit::Locating { retried } => {
                match locator.forward_position() {
                    Some(_) => {
                        let spawned = self.populate_initial(spawner, rng);
                        self.init = TrackInit::Ready;
                        TrackTick {
                            spawned,
                            despawned: 0,
                        }
                    }
                    None if !retried => {
                        log::debug!(
                            "{}; retrying next tick",
                            SimError::TransientUnavailable { what: "player" }
                        );
                        self.init = TrackInit::Locating { retried: true };
                        TrackTick::default()
                    }
                    None => {
                        log::error!(
                            "{}; track generator stays inert",
                            SimError::ResourceUnavailable { what: "player" }
                        );
                        self.init = TrackInit::Inert;
                        TrackTick::default()
                    }
                }
            }
            TrackInit::Ready => match locator.forward_position() {
                Some(player_z) => self.maintain(player_z, spawner, rng),
                None => TrackTick::default(),
            },
            TrackInit::Idle | TrackInit::Inert => TrackTick::default(),
        }
    }

    fn populate_initial<R: Rng + ?Sized>(&mut self, spawner: &mut ObstacleSpawner, rng: &mut R) -> usize {
        self.last_spawn_z = 0.0;
        for _ in 0..self.config.initial_segment_count {
            self.spawn_segment(spawner, rng);
        }
        log::info!(
            "Track initialized with {} segments (last z = {})",
            self.active.len(),
            self.last_spawn_z
        );
        self.config.initial_segment_count
    }

    fn maintain<R: Rng + ?Sized>(
        &mut self,
        player_z: f32,
        spawner: &mut ObstacleSpawner,
        rng: &mut R,
    ) -> TrackTick {
        let mut result = TrackTick::default();

        // At most one segment per tick
        if player_z + self.spawn_trigger_distance > self.last_spawn_z - self.config.segment_length {
            self.spawn_segment(spawner, rng);
            result.spawned = 1;
        }

        let despawn_distance = self.despawn_distance;
        let segments = &mut self.segments;
        self.active.retain(|&handle| {
            let Some(segment) = segments.get_mut(handle) else {
                return false;
            };
            if player_z - segment.position.z <= despawn_distance {
                return true;
            }
            segment.clear_obstacles(spawner);
            if let Err(e) = segments.release(handle) {
                log::error!("Failed to recycle segment: {e}");
            }
            result.despawned += 1;
            false
        });

        result
    }

    fn spawn_segment<R: Rng + ?Sized>(&mut self, spawner: &mut ObstacleSpawner, rng: &mut R) {
        let handle = self.segments.acquire();
        let Some(segment) = self.segments.get_mut(handle) else {
            return;
        };
        segment.place(self.last_spawn_z);
        place_obstacles(&self.config, self.lane_offset, handle, segment, spawner, rng);
        self.active.push(handle);
        self.last_spawn_z += self.config.segment_length;
    }

    /// Tear down every active segment immediately
    fn clear(&mut self, spawner: &mut ObstacleSpawner) {
        let count = self.active.len();
        for handle in self.active.drain(..) {
            if let Some(segment) = self.segments.get_mut(handle) {
                segment.clear_obstacles(spawner);
            }
            if let Err(e) = self.segments.release(handle) {
                log::error!("Failed to recycle segment: {e}");
            }
        }
        self.last_spawn_z = 0.0;
        log::info!("Track cleared ({count} segments recycled)");
    }
}

/// Scatter obstacles over a segment
///
/// The segment is split into one band per obstacle so they can never stack
/// into an unavoidable wall; each obstacle sits in a random lane somewhere
/// inside its band, `margin` away from the band edges.
fn place_obstacles<R: Rng + ?Sized>(
    config: &TrackConfig,
    lane_offset: f32,
    handle: SegmentHandle,
    segment: &mut TrackSegment,
    spawner: &mut ObstacleSpawner,
    rng: &mut R,
) {
    let count = rng.random_range(config.min_obstacles..=config.max_obstacles);
    let length = config.segment_length;

    for i in 0..count {
        let x = if rng.random_bool(0.5) {
            -lane_offset
        } else {
            lane_offset
        };

        let lo = length * i as f32 / count as f32 + config.obstacle_margin;
        let hi = length * (i + 1) as f32 / count as f32 - config.obstacle_margin;
        // Margins wider than half a band invert the range; draw from the
        // narrowed centre instead
        let z = rng.random_range(lo.min(hi)..=lo.max(hi));

        let position = segment.position + Vec3::new(x, 0.0, z);
        if let Some(obstacle) = spawner.create_obstacle(position, rng) {
            segment.add_obstacle(handle, obstacle, spawner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::ObstacleCatalog;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::cell::Cell;

    fn setup() -> (TrackGenerator, ObstacleSpawner, Pcg32) {
        let config = TrackConfig::default();
        let spawner = ObstacleSpawner::new(ObstacleCatalog::default(), config.obstacle_pool_size);
        (TrackGenerator::new(config, 2.5), spawner, Pcg32::seed_from_u64(42))
    }

    fn started() -> (TrackGenerator, ObstacleSpawner, Pcg32) {
        let (mut track, mut spawner, mut rng) = setup();
        track.handle_event(GameEvent::RunStarted, &mut spawner);
        track.tick(&0.0f32, &mut spawner, &mut rng);
        assert!(track.is_initialized());
        (track, spawner, rng)
    }

    impl PlayerLocator for f32 {
        fn forward_position(&self) -> Option<f32> {
            Some(*self)
        }
    }

    /// Reports no player for the first `misses` lookups
    struct LateLocator {
        misses: Cell<u32>,
    }

    impl PlayerLocator for LateLocator {
        fn forward_position(&self) -> Option<f32> {
            if self.misses.get() > 0 {
                self.misses.set(self.misses.get() - 1);
                None
            } else {
                Some(0.0)
            }
        }
    }

    #[test]
    fn test_initial_strip() {
        let (track, spawner, _) = started();
        assert_eq!(track.active_count(), 8);
        assert_eq!(track.last_spawn_z(), 80.0);

        let positions: Vec<f32> = track.active_segments().map(|(_, s)| s.position.z).collect();
        assert_eq!(positions, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);

        let attached: usize = track.active_segments().map(|(_, s)| s.obstacles().len()).sum();
        assert!((8..=24).contains(&attached));
        assert_eq!(spawner.active_count(), attached);
    }

    #[test]
    fn test_obstacles_sit_in_their_bands_and_lanes() {
        let (track, spawner, _) = started();
        for (handle, segment) in track.active_segments() {
            let n = segment.obstacles().len();
            assert!((1..=3).contains(&n));
            for (i, &o) in segment.obstacles().iter().enumerate() {
                let obstacle = spawner.get(o).unwrap();
                assert_eq!(obstacle.segment, Some(handle));
                assert_eq!(obstacle.position.x.abs(), 2.5);

                let local = obstacle.position.z - segment.position.z;
                let a = 10.0 * i as f32 / n as f32 + 2.0;
                let b = 10.0 * (i + 1) as f32 / n as f32 - 2.0;
                let (lo, hi) = (a.min(b), a.max(b));
                assert!(local >= lo - 1e-4 && local <= hi + 1e-4, "{local} not in [{lo}, {hi}]");
                // Bands never overlap
                assert!(local >= 10.0 * i as f32 / n as f32);
                assert!(local <= 10.0 * (i + 1) as f32 / n as f32);
            }
        }
    }

    #[test]
    fn test_spawns_one_segment_when_player_nears_the_end() {
        let (mut track, mut spawner, mut rng) = started();

        // 0 + 30 > 80 - 10 is false: nothing to do
        assert_eq!(track.tick(&0.0f32, &mut spawner, &mut rng), TrackTick::default());

        let result = track.tick(&75.0f32, &mut spawner, &mut rng);
        assert_eq!(result.spawned, 1);
        assert_eq!(track.last_spawn_z(), 90.0);
    }

    #[test]
    fn test_despawns_segments_behind_player() {
        let (mut track, mut spawner, mut rng) = started();
        let result = track.tick(&25.0f32, &mut spawner, &mut rng);

        // 25 - 0 and 25 - 10 exceed 12; 25 - 20 does not
        assert_eq!(result.despawned, 2);
        assert_eq!(result.spawned, 0);
        let first = track.active_segments().next().unwrap().1.position.z;
        assert_eq!(first, 20.0);
    }

    #[test]
    fn test_window_invariant_while_driving() {
        let (mut track, mut spawner, mut rng) = started();
        let len = track.segment_length();
        let n = 8.0;
        let mut z = 0.0f32;

        for _ in 0..5000 {
            z += 0.1;
            track.tick(&z, &mut spawner, &mut rng);

            let last = track.last_spawn_z();
            for (_, segment) in track.active_segments() {
                let p = segment.position.z;
                assert!(p >= last - n * len && p <= last);
                assert!(z - p <= track.despawn_distance());
            }
            // Always covers the trigger distance ahead of the player
            assert!(last - len >= z + track.spawn_trigger_distance() - 1e-3);
        }

        // Steady state recycles instead of growing without bound
        assert!(track.segment_pool_size() <= 10);
        assert!(spawner.pool_size() <= 40);
    }

    #[test]
    fn test_paused_and_failed_runs_are_frozen() {
        let (mut track, mut spawner, mut rng) = started();

        track.handle_event(GameEvent::RunPaused, &mut spawner);
        assert_eq!(track.tick(&500.0f32, &mut spawner, &mut rng), TrackTick::default());
        track.handle_event(GameEvent::RunResumed, &mut spawner);
        assert_eq!(track.tick(&25.0f32, &mut spawner, &mut rng).despawned, 2);

        track.handle_event(GameEvent::RunFailed, &mut spawner);
        let count = track.active_count();
        assert_eq!(track.tick(&500.0f32, &mut spawner, &mut rng), TrackTick::default());
        assert_eq!(track.active_count(), count);
    }

    #[test]
    fn test_restart_clears_everything() {
        let (mut track, mut spawner, mut rng) = started();
        track.handle_event(GameEvent::RunFailed, &mut spawner);
        track.handle_event(GameEvent::RunRestarted, &mut spawner);

        assert_eq!(track.active_count(), 0);
        assert_eq!(track.last_spawn_z(), 0.0);
        assert_eq!(spawner.active_count(), 0);
        assert!(!track.is_initialized());

        track.handle_event(GameEvent::RunStarted, &mut spawner);
        track.tick(&0.0f32, &mut spawner, &mut rng);
        assert_eq!(track.active_count(), 8);
        assert_eq!(track.last_spawn_z(), 80.0);
        // Second run reused the first run's segments
        assert_eq!(track.segment_pool_size(), 8);
    }

    #[test]
    fn test_player_lookup_retries_once() {
        let (mut track, mut spawner, mut rng) = setup();
        track.handle_event(GameEvent::RunStarted, &mut spawner);

        let late = LateLocator {
            misses: Cell::new(1),
        };
        track.tick(&late, &mut spawner, &mut rng);
        assert_eq!(track.init_state(), TrackInit::Locating { retried: true });
        track.tick(&late, &mut spawner, &mut rng);
        assert!(track.is_initialized());
        assert_eq!(track.active_count(), 8);
    }

    #[test]
    fn test_missing_player_leaves_generator_inert() {
        let (mut track, mut spawner, mut rng) = setup();
        track.handle_event(GameEvent::RunStarted, &mut spawner);

        let absent: Option<PlayerVehicle> = None;
        track.tick(&absent, &mut spawner, &mut rng);
        track.tick(&absent, &mut spawner, &mut rng);
        assert_eq!(track.init_state(), TrackInit::Inert);
        track.tick(&0.0f32, &mut spawner, &mut rng);
        assert_eq!(track.active_count(), 0);
    }
}
