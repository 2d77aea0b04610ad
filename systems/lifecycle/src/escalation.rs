//! Nest rebuilding and megabeast escalation.

use std::time::Duration;

use chrobry_core::{Command, SpeciesId, Torus};
use chrobry_world::{query, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::placement;

const NEST_MIN_DISTANCE: f32 = 800.0;
const NEST_MAX_DISTANCE: f32 = 1_500.0;
const NEST_RESPAWN_DELAY: Duration = Duration::from_secs(30);
/// Every this many destroyed nests of one species also wakes an ultra.
const ULTRA_EVERY: u32 = 3;
/// Distance between a fallen nest and the ultra megabeast it releases.
const ULTRA_OFFSET: f32 = 80.0;

/// Randomised time until a nest's next guard, `U(7 s, 21 s)`.
pub(crate) fn spawn_interval(rng: &mut ChaCha8Rng) -> Duration {
    Duration::from_millis(rng.gen_range(7_000..=21_000))
}

/// Places the species' nest well away from the player.
pub(crate) fn rebuild_nest(
    world: &World,
    species: SpeciesId,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    let position = placement::ring(
        query::torus(world),
        query::player(world).position,
        NEST_MIN_DISTANCE,
        NEST_MAX_DISTANCE,
        rng,
    );
    out.push(Command::SpawnNest {
        species,
        position,
        spawn_interval: spawn_interval(rng),
    });
}

/// Releases megabeasts from a fallen nest and schedules its return.
pub(crate) fn escalate(
    torus: &Torus,
    species: SpeciesId,
    position: Vec2,
    destroyed: u32,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    out.push(Command::SpawnMegabeast {
        species,
        position,
        ultra: false,
    });
    if destroyed > 0 && destroyed % ULTRA_EVERY == 0 {
        tracing::info!(%species, destroyed, "nest escalation released an ultra megabeast");
        out.push(Command::SpawnMegabeast {
            species,
            position: placement::ring(torus, position, ULTRA_OFFSET, ULTRA_OFFSET, rng),
            ultra: true,
        });
    }
    out.push(Command::ScheduleNestRespawn {
        species,
        delay: NEST_RESPAWN_DELAY,
    });
}
