//! Trees and the apples they drop.

use chrobry_core::{
    entities::{TREE_APPLE_CAP, TREE_APPLE_RADIUS},
    Command, PickupKind, Tree,
};
use chrobry_world::{query, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::placement;

/// Scatters `count` trees over the map.
pub(crate) fn grove(world: &World, count: usize, rng: &mut ChaCha8Rng, out: &mut Vec<Command>) {
    let torus = query::torus(world);
    for _ in 0..count {
        let position = placement::anywhere(torus, rng);
        let (hp, size) = Tree::sapling(rng);
        out.push(Command::SpawnTree { position, hp, size });
    }
}

/// Drops an apple under `tree` unless enough already lie around it.
pub(crate) fn fruit(world: &World, tree: &Tree, rng: &mut ChaCha8Rng, out: &mut Vec<Command>) {
    let torus = query::torus(world);
    let fallen = query::pickups(world)
        .filter(|pickup| pickup.kind == PickupKind::Apple)
        .filter(|pickup| torus.distance(pickup.position, tree.position) < TREE_APPLE_RADIUS)
        .count();
    if fallen >= TREE_APPLE_CAP {
        tracing::trace!(tree = tree.id.get(), fallen, "tree skipped its apple");
        return;
    }
    out.push(Command::SpawnPickup {
        kind: PickupKind::Apple,
        position: tree.position,
        value: PickupKind::Apple.default_value().roll(rng),
        toss: Some(Vec2::new(rng.gen_range(-0.5..=0.5), 1.0)),
    });
}
