#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver for the Chrobry simulation.
//!
//! A [`Simulation`] owns the world and every system. Each call to
//! [`Simulation::step`] runs one ordered pass: player intent, swings, timers,
//! behaviour, contacts, projectiles, pickups and finally death and population
//! bookkeeping. Every phase is settled: the events it produces are fed to the
//! reactive loot and lifecycle systems until no further commands remain.

mod config;
mod intent;

use std::{f32::consts::TAU, time::Duration};

use chrobry_core::{heading, rng, Command, Consumable, Event, Snapshot, SwingOwner, Tree};
use chrobry_system_ai::{self as ai, Ai};
use chrobry_system_combat::{self as combat, Combat, Loot};
use chrobry_system_lifecycle::{self as lifecycle, Lifecycle};
use chrobry_world::{self as world, query, World};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub use config::{PopulationConfig, SimulationConfig};
pub use intent::{Control, Intent, RangedAim};

/// Chance that eating an apple yields a seed.
const APPLE_SEED_CHANCE: f64 = 0.1;
/// Distance from the player at which recruited companions appear.
const COMPANION_SPAWN_OFFSET: f32 = 40.0;

/// World plus the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    max_step: Duration,
    ai: Ai,
    combat: Combat,
    loot: Loot,
    lifecycle: Lifecycle,
    control_rng: ChaCha8Rng,
    pending: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a freshly seeded session.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        let mut simulation = Self::with_world(config, World::new());
        let mut history = Vec::new();
        simulation.settle(
            vec![Command::ConfigureWorld {
                torus: config.torus(),
            }],
            &mut history,
        );
        tracing::info!(
            seed = config.master_seed,
            enemies = query::enemy_count(&simulation.world),
            "simulation ready"
        );
        simulation
    }

    /// Resumes a session from a snapshot; random streams restart from the seed.
    #[must_use]
    pub fn from_snapshot(config: &SimulationConfig, snapshot: &Snapshot) -> Self {
        Self::with_world(config, World::from_snapshot(snapshot))
    }

    fn with_world(config: &SimulationConfig, world: World) -> Self {
        let seed = config.master_seed;
        Self {
            world,
            max_step: config.max_step(),
            ai: Ai::new(ai::Config::new(seed)),
            combat: Combat::new(),
            loot: Loot::new(combat::Config::new(seed)),
            lifecycle: Lifecycle::new(lifecycle::Config::new(
                seed,
                config.population.into(),
            )),
            control_rng: rng::stream(seed, rng::RNG_STREAM_CONTROL),
            pending: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Read-only access to the world for rendering and inspection.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Captures the persistent state of the session.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        query::snapshot(&self.world)
    }

    /// Runs one tick and returns every event it produced.
    ///
    /// `dt` is clamped to the configured maximum step. A paused simulation
    /// does nothing and returns no events.
    pub fn step(&mut self, intent: &Intent, dt: Duration) -> Vec<Event> {
        let mut history = Vec::new();
        if query::is_paused(&self.world) {
            return history;
        }
        let dt = dt.min(self.max_step);

        self.settle(
            vec![
                Command::Tick { dt },
                Command::MovePlayer {
                    movement: intent.movement,
                },
            ],
            &mut history,
        );
        let mut attacks = Vec::new();
        if intent.melee {
            attacks.push(Command::StartSwing {
                owner: SwingOwner::Player,
                start_angle: self.control_rng.gen_range(0.0..TAU),
            });
        }
        if let Some(aim) = intent.ranged {
            attacks.push(Command::FireArrow {
                direction: self.aim(aim),
            });
        }
        self.settle(attacks, &mut history);

        self.settle(vec![Command::AdvanceSwings], &mut history);
        let mut strikes = Vec::new();
        self.combat.resolve_swings(&self.world, &mut strikes);
        self.settle(strikes, &mut history);
        self.settle(vec![Command::ExpireSwings], &mut history);

        self.settle(vec![Command::AdvanceTimers], &mut history);

        let mut behaviour = Vec::new();
        self.ai.handle(&self.world, &mut behaviour);
        self.settle(behaviour, &mut history);

        self.settle(
            vec![Command::IntegrateKnockback, Command::SeparateBodies],
            &mut history,
        );
        let mut contacts = Vec::new();
        self.combat.resolve_contacts(&self.world, &mut contacts);
        self.settle(contacts, &mut history);

        self.settle(vec![Command::AdvanceProjectiles], &mut history);
        let mut hits = Vec::new();
        self.combat.resolve_projectiles(&self.world, &mut hits);
        hits.push(Command::ExpireProjectiles);
        self.settle(hits, &mut history);

        let mut magnetism = Vec::new();
        self.lifecycle.attract_pickups(&self.world, &mut magnetism);
        self.settle(magnetism, &mut history);

        self.settle(vec![Command::ResolvePlayerDeath], &mut history);
        if !query::is_paused(&self.world) {
            let mut population = Vec::new();
            self.lifecycle.regulate(&self.world, &mut population);
            self.settle(population, &mut history);
        }

        tracing::trace!(events = history.len(), "tick complete");
        history
    }

    /// Applies an out-of-tick request and returns the resulting events.
    pub fn control(&mut self, control: Control) -> Vec<Event> {
        let command = match control {
            Control::Pause(paused) => Command::SetPaused { paused },
            Control::Planting(enabled) => Command::SetPlanting { enabled },
            Control::Interaction(enabled) => Command::SetInteraction { enabled },
            Control::SpendPoint(stat) => Command::SpendLevelUpPoint { stat },
            Control::Consume(item) => {
                let (min, max) = item.restore_range();
                let restore = self.control_rng.gen_range(min..=max);
                let seed_found =
                    item == Consumable::Apple && self.control_rng.gen_bool(APPLE_SEED_CHANCE);
                Command::ConsumeItem {
                    item,
                    restore,
                    seed_found,
                }
            }
            Control::SpawnCompanion(style) => {
                let angle = self.control_rng.gen_range(0.0..TAU);
                let position = query::torus(&self.world).offset(
                    query::player(&self.world).position,
                    heading(angle) * COMPANION_SPAWN_OFFSET,
                );
                Command::SpawnCompanion { style, position }
            }
            Control::Plant(position) => {
                let (hp, size) = Tree::sapling(&mut self.control_rng);
                Command::PlantTree { position, hp, size }
            }
        };
        let mut history = Vec::new();
        self.settle(vec![command], &mut history);
        history
    }

    fn aim(&self, aim: RangedAim) -> Vec2 {
        let torus = query::torus(&self.world);
        let player = query::player(&self.world).position;
        match aim {
            RangedAim::Facing => Vec2::ZERO,
            RangedAim::Position(target) => {
                if target.is_finite() {
                    torus.delta(player, target)
                } else {
                    Vec2::ZERO
                }
            }
            RangedAim::Enemy(enemy) => query::enemy(&self.world, enemy)
                .map_or(Vec2::ZERO, |enemy| torus.delta(player, enemy.position)),
        }
    }

    /// Applies `commands` and lets the reactive systems answer until quiet.
    fn settle(&mut self, commands: Vec<Command>, history: &mut Vec<Event>) {
        self.pending.extend(commands);
        while !self.pending.is_empty() {
            self.events.clear();
            for command in self.pending.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
            self.loot
                .handle(&self.world, &self.events, &mut self.pending);
            self.lifecycle
                .handle(&self.world, &self.events, &mut self.pending);
            history.append(&mut self.events);
        }
    }
}
