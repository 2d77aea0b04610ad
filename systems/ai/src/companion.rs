//! Companions follow the player and join fights near them.

use std::f32::consts::TAU;

use chrobry_core::{Command, Companion, CompanionStyle, SwingOwner};
use chrobry_world::{query, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::Context;

/// Companions only fight while this close to the player.
const ESCORT_RANGE: f32 = 100.0;
/// Enemies farther than this from the companion are ignored.
const ENGAGE_RANGE: f32 = 100.0;

pub(crate) fn steer(
    companion: &Companion,
    world: &World,
    player_swinging: bool,
    context: &Context,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    let torus = &context.torus;
    let to_player = torus.delta(companion.position, context.player);
    let displacement = context.step(to_player, companion.speed);
    if to_player.length() > 0.0 {
        out.push(Command::MoveCompanion {
            companion: companion.id,
            displacement,
        });
    }

    let position = torus.offset(companion.position, displacement);
    let near_player = torus.distance(position, context.player) < ESCORT_RANGE;
    if !companion.reached_player || !near_player {
        return;
    }

    let Some((_, target)) = query::enemies(world)
        .map(|enemy| (torus.distance(position, enemy.position), enemy.position))
        .filter(|(distance, _)| *distance < ENGAGE_RANGE)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
    else {
        return;
    };

    let owner = SwingOwner::Companion(companion.id);
    let idle = companion.swing.is_none();
    if player_swinging {
        if idle {
            out.push(Command::StartSwing {
                owner,
                start_angle: rng.gen_range(0.0..TAU),
            });
        }
        return;
    }

    match companion.style {
        CompanionStyle::Melee if idle => out.push(Command::StartSwing {
            owner,
            start_angle: rng.gen_range(0.0..TAU),
        }),
        CompanionStyle::Ranged if companion.fire_cooldown.is_zero() => {
            out.push(Command::CompanionFire {
                companion: companion.id,
                direction: torus.delta(position, target),
            });
        }
        _ => {}
    }
}
