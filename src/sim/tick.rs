//! Fixed timestep simulation tick
//!
//! One pass per frame. Timers fire on the tick clock, then host commands,
//! then input, then (while playing) movement, track upkeep and collisions.
//! Every notification raised in a tick is delivered before it returns.

use super::world::World;
use crate::platform::InputEvent;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Taps and swipes collected since the last tick, in arrival order
    pub events: Vec<InputEvent>,
    /// Pause toggle
    pub pause: bool,
    /// Restart after a failed run
    pub restart: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    world.time_ticks += 1;

    for action in world.scheduler.advance() {
        world.run_timer(action);
    }

    if input.restart {
        world.restart();
    }
    if input.pause {
        world.toggle_pause();
    }
    world.pump_events();

    for &event in &input.events {
        world.handle_input(event);
    }

    if !world.run.is_playing() {
        return;
    }

    if let Some(player) = world.player.as_mut() {
        player.update(dt);
    }

    let upkeep = world
        .track
        .tick(&world.player, &mut world.spawner, &mut world.rng);
    if upkeep.spawned > 0 || upkeep.despawned > 0 {
        log::trace!(
            "Track upkeep at tick {}: +{} -{}",
            world.time_ticks,
            upkeep.spawned,
            upkeep.despawned
        );
    }

    world.resolve_collisions();
    world.pump_events();
}
