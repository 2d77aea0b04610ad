use std::time::Duration;

use chrobry_core::{
    entities::{Impulse, ENEMY_RADIUS, MEGABEAST_CONTACT_RADIUS, PLAYER_RADIUS},
    Command,
};
use chrobry_world::{query, World};
use glam::Vec2;

/// Centre distance at which a regular enemy bites the player.
const CONTACT_RADIUS: f32 = PLAYER_RADIUS + ENEMY_RADIUS + 8.0;
const CONTACT_KNOCKBACK: f32 = 15.0;
const CONTACT_KNOCKBACK_DURATION: Duration = Duration::from_millis(350);

/// Attacker touching the player this tick.
struct Contact {
    distance: f32,
    offset: Vec2,
    damage: u32,
}

pub(crate) fn resolve(world: &World, out: &mut Vec<Command>) {
    let player = query::player(world);
    if player.hp == 0 || !player.hurt_cooldown.is_zero() {
        return;
    }
    let torus = query::torus(world);

    let enemies = query::enemies(world).filter_map(|enemy| {
        let species = enemy.species.definition()?;
        let offset = torus.delta(enemy.position, player.position);
        let distance = offset.length();
        (distance < CONTACT_RADIUS).then_some(Contact {
            distance,
            offset,
            damage: species.attack,
        })
    });
    let megabeasts = query::megabeasts(world)
        .filter(|beast| !beast.is_telegraphing())
        .filter_map(|beast| {
            let species = beast.species.definition()?;
            let offset = torus.delta(beast.position, player.position);
            let distance = offset.length();
            (distance < MEGABEAST_CONTACT_RADIUS).then_some(Contact {
                distance,
                offset,
                damage: beast.scaled_damage(species.attack, 1.0),
            })
        });

    let Some(closest) = enemies
        .chain(megabeasts)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
    else {
        return;
    };
    tracing::debug!(damage = closest.damage, "contact attack");
    out.push(Command::StrikePlayer {
        damage: closest.damage,
        impulse: Some(Impulse::new(
            closest.offset,
            CONTACT_KNOCKBACK,
            CONTACT_KNOCKBACK_DURATION,
        )),
        poison: None,
        contact: true,
    });
}

#[cfg(test)]
mod tests {
    use chrobry_core::{EnemyMode, SpeciesId};
    use chrobry_world::apply;

    use super::*;

    fn world_with_enemy(offset: Vec2) -> World {
        let mut world = World::new();
        let player = query::player(&world).position;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                species: SpeciesId::CORPSE,
                position: player + offset,
                mode: EnemyMode::Roam,
                summoned: false,
            },
            &mut events,
        );
        world
    }

    #[test]
    fn touching_enemy_bites_and_pushes_the_player_away() {
        let world = world_with_enemy(Vec2::new(-40.0, 0.0));
        let mut out = Vec::new();

        resolve(&world, &mut out);

        let [Command::StrikePlayer {
            damage,
            impulse: Some(impulse),
            contact: true,
            ..
        }] = out.as_slice()
        else {
            panic!("unexpected commands: {out:?}");
        };
        assert_eq!(*damage, 12);
        assert!(impulse.velocity.x > 0.0);
    }

    #[test]
    fn enemy_outside_contact_range_is_harmless() {
        let world = world_with_enemy(Vec2::new(47.0, 0.0));
        let mut out = Vec::new();

        resolve(&world, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn hurt_cooldown_suppresses_further_contacts() {
        let mut world = world_with_enemy(Vec2::new(30.0, 0.0));
        let mut out = Vec::new();
        resolve(&world, &mut out);
        let mut events = Vec::new();
        for command in out.drain(..) {
            apply(&mut world, command, &mut events);
        }

        resolve(&world, &mut out);

        assert!(out.is_empty());
    }
}
