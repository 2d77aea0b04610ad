#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn and lifecycle manager.
//!
//! Populates fresh worlds, answers nest, respawn and apple timers announced by
//! the world, escalates destroyed nests into megabeasts, keeps the roaming
//! population topped up and pulls pickups toward the player.

mod escalation;
mod magnet;
mod orchard;
mod placement;
mod population;

use std::time::Duration;

use chrobry_core::{rng, Command, Event, PickupKind};
use chrobry_world::{query, World};
use rand_chacha::ChaCha8Rng;

/// Population targets and rates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Population {
    /// Free-roamers placed when a world is seeded.
    pub initial_roamers: usize,
    /// Food pickups scattered when a world is seeded.
    pub initial_pickups: usize,
    /// Apple trees grown when a world is seeded.
    pub initial_trees: usize,
    /// Top-ups stop once this many enemies are alive.
    pub roamer_cap: usize,
    /// Time between roamer bursts.
    pub burst_interval: Duration,
    /// Inclusive range of roamers added by a burst.
    pub burst_size: (u32, u32),
    /// Per-tick chance to add a roamer while under the cap.
    pub top_up_chance: f64,
    /// Per-tick chance to drop an ambient food pickup.
    pub ambient_pickup_chance: f64,
}

impl Population {
    /// Rates used by a regular game.
    pub const DEFAULT: Self = Self {
        initial_roamers: 28,
        initial_pickups: 40,
        initial_trees: 60,
        roamer_cap: 26,
        burst_interval: Duration::from_secs(60),
        burst_size: (5, 12),
        top_up_chance: 0.03,
        ambient_pickup_chance: 0.02,
    };
}

impl Default for Population {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration parameters required to construct the lifecycle manager.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    master_seed: u64,
    population: Population,
}

impl Config {
    /// Creates a new configuration from the master seed and population rates.
    #[must_use]
    pub const fn new(master_seed: u64, population: Population) -> Self {
        Self {
            master_seed,
            population,
        }
    }
}

/// Chance that collecting an apple shakes loose a seed.
const APPLE_SEED_CHANCE: f64 = 0.1;

/// Lifecycle system that spawns, respawns and escalates.
#[derive(Debug)]
pub struct Lifecycle {
    rng: ChaCha8Rng,
    population: Population,
    burst_elapsed: Duration,
}

impl Lifecycle {
    /// Creates a lifecycle manager seeded from the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: rng::stream(config.master_seed, rng::RNG_STREAM_LIFECYCLE),
            population: config.population,
            burst_elapsed: Duration::ZERO,
        }
    }

    /// Reacts to world events with spawn commands.
    pub fn handle(&mut self, world: &World, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match *event {
                Event::WorldConfigured { .. } | Event::GameOver => {
                    self.burst_elapsed = Duration::ZERO;
                    population::seed(world, &self.population, &mut self.rng, out);
                }
                Event::TreeFruited { tree } => {
                    if let Some(tree) = query::tree(world, tree) {
                        orchard::fruit(world, tree, &mut self.rng, out);
                    }
                }
                Event::NestSpawnDue { nest } => {
                    if let Some(nest) = query::nest(world, nest) {
                        population::guard(world, nest, &mut self.rng, out);
                    }
                }
                Event::EnemyRespawnDue { species } => {
                    population::roamer(world, Some(species), &mut self.rng, out);
                }
                Event::NestRespawnDue { species } => {
                    escalation::rebuild_nest(world, species, &mut self.rng, out);
                }
                Event::NestDestroyed {
                    species,
                    position,
                    destroyed,
                    ..
                } => escalation::escalate(
                    query::torus(world),
                    species,
                    position,
                    destroyed,
                    &mut self.rng,
                    out,
                ),
                Event::PickupCollected {
                    kind: PickupKind::Apple,
                    ..
                } => population::apple_seed(world, APPLE_SEED_CHANCE, &mut self.rng, out),
                _ => {}
            }
        }
    }

    /// Runs the per-tick population rolls.
    pub fn regulate(&mut self, world: &World, out: &mut Vec<Command>) {
        let dt = query::tick_dt(world);
        if dt.is_zero() {
            return;
        }
        self.burst_elapsed = self.burst_elapsed.saturating_add(dt);
        if self.burst_elapsed >= self.population.burst_interval {
            self.burst_elapsed = Duration::ZERO;
            population::burst(world, &self.population, &mut self.rng, out);
        }
        population::top_up(world, &self.population, &mut self.rng, out);
    }

    /// Pulls pickups inside the magnet range and collects those in reach.
    pub fn attract_pickups(&self, world: &World, out: &mut Vec<Command>) {
        magnet::attract(world, out);
    }
}
