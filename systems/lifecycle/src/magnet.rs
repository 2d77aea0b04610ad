//! Pickup magnetism.
//!
//! The magnet range is `level + bonus`. While it exceeds the collect radius,
//! pickups between the two radii are pulled and only pickups inside the
//! collect radius are collected. A magnet at or below the collect radius falls
//! back to the base regime, collecting anything closer than the base radius.

use chrobry_core::Command;
use chrobry_world::{query, World};

/// Distance at which a magnetised pickup is collected.
const COLLECT_RADIUS: f32 = 15.0;
/// Collection distance when the magnet is too weak to pull.
const BASE_COLLECT_RADIUS: f32 = 100.0;
/// Pull speed in units per frame at the edge of the magnet range.
const PULL_SPEED: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Regime {
    Idle,
    Pulled,
    Collected,
}

fn regime(magnet: f32, distance: f32) -> Regime {
    if magnet > COLLECT_RADIUS {
        if distance <= COLLECT_RADIUS {
            Regime::Collected
        } else if distance <= magnet {
            Regime::Pulled
        } else {
            Regime::Idle
        }
    } else if distance < BASE_COLLECT_RADIUS {
        Regime::Collected
    } else {
        Regime::Idle
    }
}

/// Speed ramps from 5 at the magnet edge to 15 at the collect radius.
fn pull_speed(magnet: f32, distance: f32) -> f32 {
    let reach = (distance - COLLECT_RADIUS) / (magnet - COLLECT_RADIUS);
    PULL_SPEED * (1.0 + 2.0 * (1.0 - reach.clamp(0.0, 1.0)))
}

pub(crate) fn attract(world: &World, out: &mut Vec<Command>) {
    let torus = query::torus(world);
    let player = query::player(world);
    let magnet = player.magnet_range();
    let frames = chrobry_core::frames(query::tick_dt(world));

    for pickup in query::pickups(world) {
        if pickup.bounce.is_some() {
            continue;
        }
        let delta = torus.delta(pickup.position, player.position);
        let distance = delta.length();
        match regime(magnet, distance) {
            Regime::Idle => {}
            Regime::Collected => out.push(Command::CollectPickup { pickup: pickup.id }),
            Regime::Pulled => {
                let step = (pull_speed(magnet, distance) * frames).min(distance);
                out.push(Command::PullPickup {
                    pickup: pickup.id,
                    displacement: delta.normalize_or_zero() * step,
                });
            }
        }
    }
}
