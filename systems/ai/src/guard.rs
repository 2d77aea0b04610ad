//! Nest guard state machine.
//!
//! Guards patrol their nest until the player comes close, spread out along a
//! flank angle, circle to a point beside the player and finally charge.

use std::f32::consts::FRAC_PI_2;

use chrobry_core::{heading, Command, Enemy, EnemyMode, GuardState, GuardTether, Nest};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::Context;

const SPOT_DISTANCE: f32 = 400.0;
const PATROL_RADIUS_FACTOR: f32 = 0.6;
const LEASH_FACTOR: f32 = 1.2;
const FLANK_DISTANCE: f32 = 150.0;
const FLANK_ARRIVAL: f32 = 30.0;
const POUNCE_DISTANCE: f32 = 100.0;
const LOSE_DISTANCE: f32 = 250.0;
/// Flanking guards give up once the player is well outside spotting range.
const DISENGAGE_DISTANCE: f32 = SPOT_DISTANCE * 1.5;
const CHASE_SPREAD: f32 = 0.4;
const REFLANK_SPREAD: f32 = 0.5;

pub(crate) fn steer(
    enemy: &Enemy,
    tether: GuardTether,
    nest: &Nest,
    context: &Context,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    let Some(species) = enemy.species.definition() else {
        return;
    };
    let torus = &context.torus;
    let speed = species.speed;
    let to_player = torus.delta(enemy.position, context.player);
    let player_distance = to_player.length();
    let nest_distance = torus.distance(enemy.position, nest.position);

    let mut next = tether;
    let displacement = match tether.state {
        GuardState::Guarding => {
            if player_distance < SPOT_DISTANCE {
                next.state = GuardState::Chasing;
                next.flank_angle = torus.angle_to(enemy.position, context.player)
                    + rng.gen_range(-CHASE_SPREAD..=CHASE_SPREAD);
                Vec2::ZERO
            } else if nest_distance > nest.guard_radius {
                let home = torus.delta(enemy.position, nest.position);
                context.step(home, speed * 0.8)
            } else {
                let phase = enemy.elapsed.as_secs_f32() + patrol_offset(enemy);
                let post = torus.offset(
                    nest.position,
                    heading(phase) * nest.guard_radius * PATROL_RADIUS_FACTOR,
                );
                let to_post = torus.delta(enemy.position, post);
                if to_post.length() > 5.0 {
                    context.step(to_post, speed * 0.5)
                } else {
                    Vec2::ZERO
                }
            }
        }
        GuardState::Chasing => {
            if nest_distance > nest.guard_radius * LEASH_FACTOR {
                next.state = GuardState::Flanking;
                Vec2::ZERO
            } else {
                context.step(heading(tether.flank_angle), speed * 0.7)
                    + context.step(to_player, speed * 0.3)
            }
        }
        GuardState::Flanking => {
            let around =
                torus.angle_to(enemy.position, context.player) + tether.flank_angle + FRAC_PI_2;
            let flank_point = torus.offset(context.player, heading(around) * FLANK_DISTANCE);
            let to_flank = torus.delta(enemy.position, flank_point);

            if player_distance > DISENGAGE_DISTANCE {
                next.state = GuardState::Guarding;
                Vec2::ZERO
            } else if to_flank.length() <= FLANK_ARRIVAL || player_distance < POUNCE_DISTANCE {
                next.state = GuardState::Attacking;
                Vec2::ZERO
            } else {
                context.step(to_flank, speed * 0.8)
            }
        }
        GuardState::Attacking => {
            if player_distance > LOSE_DISTANCE {
                next.state = GuardState::Flanking;
                next.flank_angle = torus.angle_to(enemy.position, context.player)
                    + rng.gen_range(-REFLANK_SPREAD..=REFLANK_SPREAD);
            }
            context.step(to_player, speed)
        }
    };

    if next != tether {
        tracing::debug!(
            enemy = enemy.id.get(),
            from = ?tether.state,
            to = ?next.state,
            "guard changed state"
        );
        out.push(Command::SetEnemyMode {
            enemy: enemy.id,
            mode: EnemyMode::Guard(next),
        });
    }
    if displacement != Vec2::ZERO {
        out.push(Command::MoveEnemy {
            enemy: enemy.id,
            displacement,
        });
    }
}

/// Per-guard phase offset so siblings spread around the patrol ring.
fn patrol_offset(enemy: &Enemy) -> f32 {
    (enemy.id.get() % 64) as f32 * 0.1
}
