//! Seeding, guards, roamers and ambient pickups.

use std::f32::consts::TAU;

use chrobry_core::{Command, EnemyMode, GuardState, GuardTether, Nest, PickupKind, SpeciesId};
use chrobry_world::{query, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{escalation, orchard, placement, Population};

const ROAMER_MIN_DISTANCE: f32 = 400.0;
const ROAMER_MAX_DISTANCE: f32 = 900.0;
const GUARD_MIN_DISTANCE: f32 = 30.0;
const GUARD_SPREAD: f32 = 0.8;

/// Fills a freshly configured world: one nest per species, roamers, food and
/// trees.
pub(crate) fn seed(
    world: &World,
    population: &Population,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    tracing::info!(
        roamers = population.initial_roamers,
        pickups = population.initial_pickups,
        trees = population.initial_trees,
        "seeding world"
    );
    for species in SpeciesId::ALL {
        escalation::rebuild_nest(world, species, rng, out);
    }
    for _ in 0..population.initial_roamers {
        roamer(world, None, rng, out);
    }
    let torus = query::torus(world);
    for _ in 0..population.initial_pickups {
        let kind = food(rng);
        out.push(Command::SpawnPickup {
            kind,
            position: placement::anywhere(torus, rng),
            value: kind.default_value().roll(rng),
            toss: None,
        });
    }
    orchard::grove(world, population.initial_trees, rng, out);
}

/// Spawns one guard inside the nest's territory.
pub(crate) fn guard(world: &World, nest: &Nest, rng: &mut ChaCha8Rng, out: &mut Vec<Command>) {
    let position = placement::ring(
        query::torus(world),
        nest.position,
        GUARD_MIN_DISTANCE,
        nest.guard_radius * GUARD_SPREAD,
        rng,
    );
    out.push(Command::SpawnEnemy {
        species: nest.species,
        position,
        mode: EnemyMode::Guard(GuardTether {
            nest: nest.id,
            state: GuardState::Guarding,
            flank_angle: rng.gen_range(0.0..TAU),
        }),
        summoned: false,
    });
    out.push(Command::RescheduleNest {
        nest: nest.id,
        spawn_interval: escalation::spawn_interval(rng),
    });
}

/// Spawns a free-roamer of `species`, or of a random species, near the player.
pub(crate) fn roamer(
    world: &World,
    species: Option<SpeciesId>,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    let species =
        species.unwrap_or_else(|| SpeciesId::ALL[rng.gen_range(0..SpeciesId::ALL.len())]);
    let position = placement::ring(
        query::torus(world),
        query::player(world).position,
        ROAMER_MIN_DISTANCE,
        ROAMER_MAX_DISTANCE,
        rng,
    );
    out.push(Command::SpawnEnemy {
        species,
        position,
        mode: EnemyMode::Roam,
        summoned: false,
    });
}

/// Periodic wave of roamers.
pub(crate) fn burst(
    world: &World,
    population: &Population,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    let (min, max) = population.burst_size;
    let count = rng.gen_range(min.min(max)..=max.max(min));
    tracing::info!(count, "roamer burst");
    for _ in 0..count {
        roamer(world, None, rng, out);
    }
}

/// Per-tick rolls keeping roamers and food around.
pub(crate) fn top_up(
    world: &World,
    population: &Population,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    if query::enemy_count(world) < population.roamer_cap
        && rng.gen_bool(population.top_up_chance.clamp(0.0, 1.0))
    {
        roamer(world, None, rng, out);
    }
    if rng.gen_bool(population.ambient_pickup_chance.clamp(0.0, 1.0)) {
        let kind = food(rng);
        let position = placement::anywhere(query::torus(world), rng);
        let toss = Vec2::new(rng.gen_range(-0.5..=0.5), -0.5);
        out.push(Command::SpawnPickup {
            kind,
            position,
            value: kind.default_value().roll(rng),
            toss: Some(toss),
        });
    }
}

/// Occasionally drops a seed next to the player after an apple is picked up.
pub(crate) fn apple_seed(
    world: &World,
    chance: f64,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    if !rng.gen_bool(chance) {
        return;
    }
    let player = query::player(world);
    let sideways = if player.facing.x != 0.0 {
        player.facing.x
    } else {
        rng.gen_range(-0.5..=0.5)
    };
    out.push(Command::SpawnPickup {
        kind: PickupKind::Seed,
        position: player.position,
        value: 1,
        toss: Some(Vec2::new(sideways, -0.5)),
    });
}

fn food(rng: &mut ChaCha8Rng) -> PickupKind {
    if rng.gen_bool(0.5) {
        PickupKind::Meat
    } else {
        PickupKind::Mead
    }
}
