//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool handle)
//! - No rendering or platform dependencies beyond input events

pub mod catalog;
pub mod events;
pub mod lane;
pub mod player;
pub mod pool;
pub mod progression;
pub mod run;
pub mod schedule;
pub mod segment;
pub mod spawner;
pub mod tick;
pub mod track;
pub mod world;

pub use catalog::{ObstacleCatalog, ObstacleConfig, SELECTION_RADIUS, VisualHandle};
pub use events::{EventBus, GameEvent};
pub use lane::{Lane, LaneController, LaneState, Locomotion, Transform};
pub use player::PlayerVehicle;
pub use pool::{Pool, PoolHandle};
pub use progression::{CollisionOutcome, PlayerProgressionState, Progression};
pub use run::{GameRunState, RunManager};
pub use schedule::{Scheduler, TimerAction};
pub use segment::{SegmentHandle, TrackSegment};
pub use spawner::{Obstacle, ObstacleHandle, ObstacleSpawner};
pub use tick::{TickInput, tick};
pub use track::{PlayerLocator, TrackGenerator, TrackInit, TrackTick};
pub use world::{RenderKind, RenderRequest, World};
