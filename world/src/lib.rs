#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Chrobry.

mod damage;
mod player;
mod snapshot;
mod spawn;
mod timers;
mod trees;

use std::{collections::BTreeMap, time::Duration};

use chrobry_core::{
    Command, Companion, CompanionId, Enemy, EnemyId, Event, Megabeast, MegabeastId, Nest, NestId,
    Pickup, PickupId, Player, Progression, Projectile, ProjectileId, Respawn, Torus, Tree, TreeId,
};
use glam::Vec2;

/// Represents the authoritative Chrobry world state.
#[derive(Clone, Debug)]
pub struct World {
    torus: Torus,
    elapsed: Duration,
    dt: Duration,
    paused: bool,
    planting: bool,
    interaction: bool,
    player: Player,
    enemies: BTreeMap<EnemyId, Enemy>,
    nests: BTreeMap<NestId, Nest>,
    megabeasts: BTreeMap<MegabeastId, Megabeast>,
    pickups: BTreeMap<PickupId, Pickup>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    companions: BTreeMap<CompanionId, Companion>,
    trees: BTreeMap<TreeId, Tree>,
    nest_respawns: Vec<Respawn>,
    enemy_respawns: Vec<Respawn>,
    progression: Progression,
    ids: IdAllocator,
}

impl World {
    /// Creates an empty world on the default map with the player at its centre.
    #[must_use]
    pub fn new() -> Self {
        Self::with_torus(Torus::default())
    }

    /// Creates an empty world on the provided map.
    #[must_use]
    pub fn with_torus(torus: Torus) -> Self {
        Self {
            torus,
            elapsed: Duration::ZERO,
            dt: Duration::ZERO,
            paused: false,
            planting: false,
            interaction: false,
            player: Player::new(torus.center()),
            enemies: BTreeMap::new(),
            nests: BTreeMap::new(),
            megabeasts: BTreeMap::new(),
            pickups: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            companions: BTreeMap::new(),
            trees: BTreeMap::new(),
            nest_respawns: Vec::new(),
            enemy_respawns: Vec::new(),
            progression: Progression::default(),
            ids: IdAllocator::default(),
        }
    }

    fn integrate_knockback(&mut self) {
        let torus = self.torus;
        let dt = self.dt;
        for enemy in self.enemies.values_mut() {
            if let Some(knockback) = enemy.knockback.as_mut() {
                enemy.position = torus.offset(enemy.position, knockback.step(dt));
                if knockback.is_spent() {
                    enemy.knockback = None;
                }
            }
        }
        for megabeast in self.megabeasts.values_mut() {
            if let Some(knockback) = megabeast.knockback.as_mut() {
                megabeast.position = torus.offset(megabeast.position, knockback.step(dt));
                if knockback.is_spent() {
                    megabeast.knockback = None;
                }
            }
        }
    }

    fn separate_bodies(&mut self) {
        use chrobry_core::entities::{
            Impulse, Knockback, ENEMY_RADIUS, PLAYER_KNOCKBACK_FRICTION, PLAYER_RADIUS,
        };

        let torus = self.torus;
        let player_reach = PLAYER_RADIUS + ENEMY_RADIUS;
        for enemy in self.enemies.values_mut() {
            let delta = torus.delta(self.player.position, enemy.position);
            let distance = delta.length();
            if distance > 0.0 && distance < player_reach {
                let normal = delta / distance;
                let push = (player_reach - distance) + 0.01;
                enemy.position = torus.offset(enemy.position, normal * push);
                if self.player.knockback.is_none() {
                    let impulse = Impulse::new(-normal, 6.0, Duration::from_millis(150));
                    self.player.knockback = Knockback::new(impulse, PLAYER_KNOCKBACK_FRICTION);
                }
            }
        }

        let spacing = ENEMY_RADIUS * 2.0;
        let mut bodies: Vec<(EnemyId, Vec2)> = self
            .enemies
            .values()
            .map(|enemy| (enemy.id, enemy.position))
            .collect();
        for first in 0..bodies.len() {
            for second in (first + 1)..bodies.len() {
                let delta = torus.delta(bodies[first].1, bodies[second].1);
                let distance = delta.length();
                if distance <= 0.0 || distance >= spacing {
                    continue;
                }
                let normal = delta / distance;
                let push = (spacing - distance) / 2.0 + 0.01;
                bodies[first].1 = torus.offset(bodies[first].1, -normal * push);
                bodies[second].1 = torus.offset(bodies[second].1, normal * push);
            }
        }
        for (id, position) in bodies {
            if let Some(enemy) = self.enemies.get_mut(&id) {
                enemy.position = position;
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureWorld { torus } => {
            *world = World::with_torus(torus);
            tracing::debug!(
                width = torus.width(),
                height = torus.height(),
                "world configured"
            );
            out_events.push(Event::WorldConfigured { torus });
        }
        Command::Tick { dt } => {
            world.dt = dt;
            world.elapsed = world.elapsed.saturating_add(dt);
            let player = &mut world.player;
            player.attack_ready_in = player.attack_ready_in.saturating_sub(dt);
            player.hurt_cooldown = player.hurt_cooldown.saturating_sub(dt);
            player.hit_flash = player.hit_flash.saturating_sub(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { movement } => world.move_player(movement),
        Command::StartSwing { owner, start_angle } => {
            world.start_swing(owner, start_angle, out_events);
        }
        Command::FireArrow { direction } => world.fire_arrow(direction, out_events),
        Command::AdvanceSwings => {
            let dt = world.dt;
            if let Some(swing) = world.player.swing.as_mut() {
                swing.elapsed = swing.elapsed.saturating_add(dt);
            }
            for companion in world.companions.values_mut() {
                if let Some(swing) = companion.swing.as_mut() {
                    swing.elapsed = swing.elapsed.saturating_add(dt);
                }
            }
        }
        Command::Strike { owner, target } => world.strike(owner, target, out_events),
        Command::ExpireSwings => {
            if world
                .player
                .swing
                .as_ref()
                .is_some_and(|swing| swing.is_finished())
            {
                world.player.swing = None;
            }
            for companion in world.companions.values_mut() {
                if companion
                    .swing
                    .as_ref()
                    .is_some_and(|swing| swing.is_finished())
                {
                    companion.swing = None;
                }
            }
        }
        Command::AdvanceTimers => world.advance_timers(out_events),
        Command::SetEnemyMode { enemy, mode } => {
            if let Some(enemy) = world.enemies.get_mut(&enemy) {
                enemy.mode = mode;
            }
        }
        Command::MoveEnemy {
            enemy,
            displacement,
        } => {
            let torus = world.torus;
            if let Some(enemy) = world.enemies.get_mut(&enemy) {
                if let Some(displacement) = finite(displacement, "enemy displacement") {
                    enemy.position = torus.offset(enemy.position, displacement);
                }
            }
        }
        Command::EatPickup { enemy, pickup } => world.eat_pickup(enemy, pickup, out_events),
        Command::UpdateMegabeast {
            megabeast,
            brain,
            displacement,
        } => {
            let torus = world.torus;
            if let Some(beast) = world.megabeasts.get_mut(&megabeast) {
                if beast.brain.phase != brain.phase {
                    out_events.push(Event::MegabeastPhaseChanged {
                        megabeast,
                        phase: brain.phase,
                    });
                }
                beast.brain = brain;
                if let Some(displacement) = finite(displacement, "megabeast displacement") {
                    beast.position = torus.offset(beast.position, displacement);
                }
            }
        }
        Command::TeleportMegabeast {
            megabeast,
            position,
        } => {
            let torus = world.torus;
            if let Some(beast) = world.megabeasts.get_mut(&megabeast) {
                if let Some(position) = finite(position, "teleport destination") {
                    beast.position = torus.wrap(position);
                }
            }
        }
        Command::MoveCompanion {
            companion,
            displacement,
        } => world.move_companion(companion, displacement),
        Command::CompanionFire {
            companion,
            direction,
        } => world.companion_fire(companion, direction, out_events),
        Command::FireProjectile {
            origin,
            velocity,
            damage,
            ttl,
            faction,
            poison,
            knockback,
        } => {
            let Some(velocity) = finite(velocity, "projectile velocity") else {
                return;
            };
            let projectile = Projectile {
                id: ProjectileId::new(0),
                position: world.torus.wrap(origin),
                velocity,
                damage,
                ttl,
                faction,
                poison,
                knockback,
            };
            world.launch_projectile(projectile, out_events);
        }
        Command::IntegrateKnockback => world.integrate_knockback(),
        Command::SeparateBodies => world.separate_bodies(),
        Command::StrikePlayer {
            damage,
            impulse,
            poison,
            contact,
        } => world.strike_player(damage, impulse, poison, contact, out_events),
        Command::AdvanceProjectiles => {
            let torus = world.torus;
            let dt = world.dt;
            let step = chrobry_core::frames(dt);
            for projectile in world.projectiles.values_mut() {
                projectile.position = torus.offset(projectile.position, projectile.velocity * step);
                projectile.ttl = projectile.ttl.saturating_sub(dt);
            }
        }
        Command::ProjectileHit { projectile, target } => {
            world.projectile_hit(projectile, target, out_events);
        }
        Command::ExpireProjectiles => world
            .projectiles
            .retain(|_, projectile| !projectile.ttl.is_zero()),
        Command::PullPickup {
            pickup,
            displacement,
        } => {
            let torus = world.torus;
            if let Some(pickup) = world.pickups.get_mut(&pickup) {
                if let Some(displacement) = finite(displacement, "pickup displacement") {
                    pickup.position = torus.offset(pickup.position, displacement);
                    pickup.being_pulled = true;
                }
            }
        }
        Command::CollectPickup { pickup } => world.collect_pickup(pickup, out_events),
        Command::ResolvePlayerDeath => world.resolve_player_death(out_events),
        Command::SpawnEnemy {
            species,
            position,
            mode,
            summoned,
        } => world.spawn_enemy(species, position, mode, summoned, out_events),
        Command::SpawnNest {
            species,
            position,
            spawn_interval,
        } => world.spawn_nest(species, position, spawn_interval, out_events),
        Command::RescheduleNest {
            nest,
            spawn_interval,
        } => {
            if let Some(nest) = world.nests.get_mut(&nest) {
                nest.spawn_elapsed = Duration::ZERO;
                nest.spawn_interval = spawn_interval;
            }
        }
        Command::SpawnMegabeast {
            species,
            position,
            ultra,
        } => world.spawn_megabeast(species, position, ultra, out_events),
        Command::SpawnPickup {
            kind,
            position,
            value,
            toss,
        } => world.spawn_pickup(kind, position, value, toss, out_events),
        Command::ScheduleNestRespawn { species, delay } => world.nest_respawns.push(Respawn {
            species,
            remaining: delay,
        }),
        Command::ScheduleEnemyRespawn { species, delay } => world.enemy_respawns.push(Respawn {
            species,
            remaining: delay,
        }),
        Command::SpawnCompanion { style, position } => {
            world.spawn_companion(style, position, out_events);
        }
        Command::SetPaused { paused } => world.set_paused(paused, out_events),
        Command::SetPlanting { enabled } => world.set_planting(enabled, out_events),
        Command::SetInteraction { enabled } => {
            if world.interaction != enabled {
                world.interaction = enabled;
                out_events.push(Event::InteractionChanged { enabled });
            }
        }
        Command::SpawnTree { position, hp, size } => {
            world.spawn_tree(position, hp, size, false, out_events);
        }
        Command::PlantTree { position, hp, size } => {
            world.plant_tree(position, hp, size, out_events);
        }
        Command::SpendLevelUpPoint { stat } => world.spend_level_up_point(stat, out_events),
        Command::ConsumeItem {
            item,
            restore,
            seed_found,
        } => world.consume_item(item, restore, seed_found, out_events),
    }
}

/// Drops non-finite vectors so malformed input never poisons positions.
fn finite(value: Vec2, what: &'static str) -> Option<Vec2> {
    if value.is_finite() {
        Some(value)
    } else {
        tracing::warn!(what, "ignoring non-finite vector");
        None
    }
}

#[derive(Clone, Debug, Default)]
struct IdAllocator {
    enemy: u32,
    nest: u32,
    megabeast: u32,
    pickup: u32,
    projectile: u32,
    companion: u32,
    tree: u32,
}

impl IdAllocator {
    fn enemy(&mut self) -> EnemyId {
        self.enemy = self.enemy.wrapping_add(1);
        EnemyId::new(self.enemy)
    }

    fn nest(&mut self) -> NestId {
        self.nest = self.nest.wrapping_add(1);
        NestId::new(self.nest)
    }

    fn megabeast(&mut self) -> MegabeastId {
        self.megabeast = self.megabeast.wrapping_add(1);
        MegabeastId::new(self.megabeast)
    }

    fn pickup(&mut self) -> PickupId {
        self.pickup = self.pickup.wrapping_add(1);
        PickupId::new(self.pickup)
    }

    fn projectile(&mut self) -> ProjectileId {
        self.projectile = self.projectile.wrapping_add(1);
        ProjectileId::new(self.projectile)
    }

    fn companion(&mut self) -> CompanionId {
        self.companion = self.companion.wrapping_add(1);
        CompanionId::new(self.companion)
    }

    fn tree(&mut self) -> TreeId {
        self.tree = self.tree.wrapping_add(1);
        TreeId::new(self.tree)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use chrobry_core::{
        Companion, CompanionId, Enemy, EnemyId, Megabeast, MegabeastId, Nest, NestId, Pickup,
        PickupId, Player, Progression, Projectile, Respawn, Snapshot, SpeciesId, Torus, Tree,
        TreeId,
    };

    use super::World;

    /// Map the world lives on.
    #[must_use]
    pub fn torus(world: &World) -> &Torus {
        &world.torus
    }

    /// Simulated time since the world was configured.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Duration of the tick currently being processed.
    #[must_use]
    pub fn tick_dt(world: &World) -> Duration {
        world.dt
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether planting mode is active.
    #[must_use]
    pub fn planting_mode(world: &World) -> bool {
        world.planting
    }

    /// Reports whether interaction mode is active.
    #[must_use]
    pub fn interaction_mode(world: &World) -> bool {
        world.interaction
    }

    /// The player character.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Regular enemies in identifier order.
    pub fn enemies(world: &World) -> impl Iterator<Item = &Enemy> {
        world.enemies.values()
    }

    /// Looks up a single enemy.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<&Enemy> {
        world.enemies.get(&id)
    }

    /// Number of regular enemies alive.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Live nests in identifier order.
    pub fn nests(world: &World) -> impl Iterator<Item = &Nest> {
        world.nests.values()
    }

    /// Looks up a single nest.
    #[must_use]
    pub fn nest(world: &World, id: NestId) -> Option<&Nest> {
        world.nests.get(&id)
    }

    /// Live nest of the provided species, if any.
    #[must_use]
    pub fn nest_of_species(world: &World, species: SpeciesId) -> Option<&Nest> {
        world.nests.values().find(|nest| nest.species == species)
    }

    /// Live megabeasts in identifier order.
    pub fn megabeasts(world: &World) -> impl Iterator<Item = &Megabeast> {
        world.megabeasts.values()
    }

    /// Looks up a single megabeast.
    #[must_use]
    pub fn megabeast(world: &World, id: MegabeastId) -> Option<&Megabeast> {
        world.megabeasts.get(&id)
    }

    /// Pickups lying on the ground in identifier order.
    pub fn pickups(world: &World) -> impl Iterator<Item = &Pickup> {
        world.pickups.values()
    }

    /// Looks up a single pickup.
    #[must_use]
    pub fn pickup(world: &World, id: PickupId) -> Option<&Pickup> {
        world.pickups.get(&id)
    }

    /// Projectiles in flight in identifier order.
    pub fn projectiles(world: &World) -> impl Iterator<Item = &Projectile> {
        world.projectiles.values()
    }

    /// Companions in identifier order.
    pub fn companions(world: &World) -> impl Iterator<Item = &Companion> {
        world.companions.values()
    }

    /// Looks up a single companion.
    #[must_use]
    pub fn companion(world: &World, id: CompanionId) -> Option<&Companion> {
        world.companions.get(&id)
    }

    /// Standing trees in identifier order.
    pub fn trees(world: &World) -> impl Iterator<Item = &Tree> {
        world.trees.values()
    }

    /// Looks up a single tree.
    #[must_use]
    pub fn tree(world: &World, id: TreeId) -> Option<&Tree> {
        world.trees.get(&id)
    }

    /// Pending nest respawns.
    #[must_use]
    pub fn nest_respawns(world: &World) -> &[Respawn] {
        &world.nest_respawns
    }

    /// Pending enemy respawns.
    #[must_use]
    pub fn enemy_respawns(world: &World) -> &[Respawn] {
        &world.enemy_respawns
    }

    /// Lifetime counters.
    #[must_use]
    pub fn progression(world: &World) -> &Progression {
        &world.progression
    }

    /// Captures the persistent state of the world.
    #[must_use]
    pub fn snapshot(world: &World) -> Snapshot {
        super::snapshot::capture(world)
    }
}
