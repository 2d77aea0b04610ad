//! Free-roaming hunters and foragers.

use chrobry_core::{Command, Enemy};
use chrobry_world::{query, World};
use glam::Vec2;

use crate::Context;

/// Distance inside which a forager eats the pickup it walked to.
const BITE_RADIUS: f32 = 25.0;
const DRIFT_SPEED: f32 = 0.4;

pub(crate) fn steer(enemy: &Enemy, world: &World, context: &Context, out: &mut Vec<Command>) {
    let Some(species) = enemy.species.definition() else {
        return;
    };
    let torus = &context.torus;

    if let Some(food) = species.forages {
        let meal = query::pickups(world)
            .filter(|pickup| pickup.kind == food)
            .map(|pickup| (pickup, torus.delta(enemy.position, pickup.position)))
            .filter(|(_, delta)| delta.length() < species.reach)
            .min_by(|(_, a), (_, b)| a.length().total_cmp(&b.length()));
        if let Some((pickup, delta)) = meal {
            if delta.length() < BITE_RADIUS {
                out.push(Command::EatPickup {
                    enemy: enemy.id,
                    pickup: pickup.id,
                });
            } else {
                out.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    displacement: context.step(delta, species.speed),
                });
            }
            return;
        }
    }

    let to_player = torus.delta(enemy.position, context.player);
    let displacement = if to_player.length() < species.aggro_range {
        context.step(to_player, species.speed)
    } else {
        let t = enemy.elapsed.as_millis() as f32;
        let drift = Vec2::new(
            (t * 0.002 + enemy.position.x * 0.001).cos(),
            (t * 0.002 + enemy.position.y * 0.001).sin(),
        );
        drift * DRIFT_SPEED * context.frames
    };
    out.push(Command::MoveEnemy {
        enemy: enemy.id,
        displacement,
    });
}
