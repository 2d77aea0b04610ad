#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic behaviour system steering enemies, megabeasts and companions.
//!
//! The system never touches the world directly. Each tick it inspects the
//! world through read-only queries and proposes movement, mode changes and
//! attacks as [`Command`] values. Random choices such as flank spreads or
//! swing angles come from a dedicated seeded stream so replays stay exact.

mod companion;
mod guard;
mod megabeast;
mod roam;

use chrobry_core::{rng, Command, EnemyMode, Torus};
use chrobry_world::{query, World};
use glam::Vec2;
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the behaviour system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    master_seed: u64,
}

impl Config {
    /// Creates a new configuration deriving the AI stream from `master_seed`.
    #[must_use]
    pub const fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }
}

/// Pure system that reads the world and emits behaviour commands.
#[derive(Debug)]
pub struct Ai {
    rng: ChaCha8Rng,
}

impl Ai {
    /// Creates a new behaviour system from the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: rng::stream(config.master_seed, rng::RNG_STREAM_AI),
        }
    }

    /// Proposes this tick's behaviour for every actor in the world.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) {
        let context = Context::capture(world);
        if context.frames <= 0.0 {
            return;
        }

        for enemy in query::enemies(world) {
            match enemy.mode {
                EnemyMode::Guard(tether) => match query::nest(world, tether.nest) {
                    Some(nest) => guard::steer(enemy, tether, nest, &context, &mut self.rng, out),
                    None => {
                        tracing::debug!(enemy = enemy.id.get(), "guard lost its nest");
                        out.push(Command::SetEnemyMode {
                            enemy: enemy.id,
                            mode: EnemyMode::Roam,
                        });
                        roam::steer(enemy, world, &context, out);
                    }
                },
                EnemyMode::Roam => roam::steer(enemy, world, &context, out),
            }
        }

        for beast in query::megabeasts(world) {
            megabeast::drive(beast, &context, &mut self.rng, out);
        }

        let player_swinging = query::player(world).swing.is_some();
        for companion in query::companions(world) {
            companion::steer(companion, world, player_swinging, &context, &mut self.rng, out);
        }
    }
}

/// Per-tick facts shared by every behaviour.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Context {
    pub(crate) torus: Torus,
    pub(crate) player: Vec2,
    pub(crate) facing: Vec2,
    pub(crate) frames: f32,
}

impl Context {
    fn capture(world: &World) -> Self {
        let player = query::player(world);
        Self {
            torus: *query::torus(world),
            player: player.position,
            facing: player.facing,
            frames: chrobry_core::frames(query::tick_dt(world)),
        }
    }

    /// Displacement of `speed` units per frame along `direction` for this tick.
    pub(crate) fn step(&self, direction: Vec2, speed: f32) -> Vec2 {
        direction.normalize_or_zero() * speed * self.frames
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrobry_core::{Event, SpeciesId};
    use chrobry_world::apply;

    use super::*;

    #[test]
    fn idle_world_produces_no_commands() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        let mut ai = Ai::new(Config::new(7));
        let mut out = Vec::new();
        ai.handle(&world, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn zero_dt_suppresses_behaviour() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                species: SpeciesId::WOLF,
                position: Vec2::new(100.0, 100.0),
                mode: EnemyMode::Roam,
                summoned: false,
            },
            &mut events,
        );
        assert!(matches!(events.as_slice(), [Event::EnemySpawned { .. }]));

        let mut ai = Ai::new(Config::new(7));
        let mut out = Vec::new();
        ai.handle(&world, &mut out);
        assert!(out.is_empty());
    }
}
