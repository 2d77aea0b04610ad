use chrobry_core::{
    entities::{ENEMY_RADIUS, MEGABEAST_RADIUS},
    Command, MeleeSwing, TargetId, Torus,
};
use chrobry_world::{query, World};
use glam::Vec2;

/// Megabeasts are larger than regular enemies and easier to reach.
const MEGABEAST_REACH_BONUS: f32 = MEGABEAST_RADIUS - ENEMY_RADIUS;

pub(crate) fn resolve(world: &World, out: &mut Vec<Command>) {
    let torus = *query::torus(world);
    let player = query::player(world);
    if let Some(swing) = &player.swing {
        sweep(world, &torus, swing, player.position, true, out);
    }
    for companion in query::companions(world) {
        if let Some(swing) = &companion.swing {
            sweep(world, &torus, swing, companion.position, false, out);
        }
    }
}

fn sweep(
    world: &World,
    torus: &Torus,
    swing: &MeleeSwing,
    owner_position: Vec2,
    by_player: bool,
    out: &mut Vec<Command>,
) {
    let blade = swing.blade_position(torus, owner_position);
    let within = |position: Vec2, radius: f32| torus.distance(blade, position) < radius;

    let enemies = query::enemies(world)
        .filter(|enemy| within(enemy.position, swing.hit_radius))
        .map(|enemy| TargetId::Enemy(enemy.id));
    let megabeasts = query::megabeasts(world)
        .filter(|beast| within(beast.position, swing.hit_radius + MEGABEAST_REACH_BONUS))
        .map(|beast| TargetId::Megabeast(beast.id));
    let nests = query::nests(world)
        .filter(|nest| by_player && within(nest.position, swing.hit_radius))
        .map(|nest| TargetId::Nest(nest.id));
    let trees = query::trees(world)
        .filter(|tree| by_player && within(tree.position, swing.hit_radius))
        .map(|tree| TargetId::Tree(tree.id));

    for target in enemies.chain(megabeasts).chain(nests).chain(trees) {
        if swing.has_hit(target) {
            continue;
        }
        out.push(Command::Strike {
            owner: swing.owner,
            target,
        });
    }
}
