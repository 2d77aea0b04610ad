#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Chrobry simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The driver submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems read the world through immutable
//! queries and respond exclusively with new command batches.

pub mod entities;
pub mod items;
pub mod rng;
pub mod snapshot;
pub mod species;
pub mod torus;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use entities::{
    xp_required, Bounce, Companion, CompanionStyle, Enemy, EnemyMode, Faction, GuardState,
    GuardTether, Impulse, Knockback, MeleeSwing, Megabeast, MegabeastBrain, MegabeastPhase, Nest,
    Pickup, Player, Poison, Progression, Projectile, Respawn, Stat, SwingOwner, Tree,
};
pub use items::{Consumable, DropValue, Inventory, PickupKind, UnknownPickupKind};
pub use snapshot::Snapshot;
pub use species::{DropRule, MegabeastKind, SpeciesDefinition, SpeciesId};
pub use torus::{heading, Torus};

/// Reference frame length; per-frame speeds are scaled by `dt / FRAME`.
pub const FRAME: Duration = Duration::from_millis(16);

/// Largest time step the simulation integrates in a single tick.
pub const MAX_STEP: Duration = Duration::from_millis(50);

/// Number of reference frames covered by `dt`.
#[must_use]
pub fn frames(dt: Duration) -> f32 {
    dt.as_secs_f32() / FRAME.as_secs_f32()
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world with an empty map of the provided size.
    ConfigureWorld {
        /// Extents of the new map.
        torus: Torus,
    },
    /// Advances the simulation clock and the player's cooldowns.
    Tick {
        /// Duration of simulated time covered by the tick.
        dt: Duration,
    },
    /// Steers the player using a movement intent; zero lets velocity decay.
    MovePlayer {
        /// Desired movement direction; its length is ignored.
        movement: Vec2,
    },
    /// Starts a melee swing for the player or a companion.
    StartSwing {
        /// Entity performing the swing.
        owner: SwingOwner,
        /// Angle of the blade when the swing starts.
        start_angle: f32,
    },
    /// Fires the player's arrow; a zero direction uses the facing vector.
    FireArrow {
        /// Flight direction of the arrow.
        direction: Vec2,
    },
    /// Advances every active swing by the tick's duration.
    AdvanceSwings,
    /// Applies a swing hit; ignored when the target was already struck.
    Strike {
        /// Entity whose swing landed.
        owner: SwingOwner,
        /// Target touched by the blade.
        target: TargetId,
    },
    /// Removes swings that completed their revolution.
    ExpireSwings,
    /// Advances nest, respawn, status and pickup bounce timers.
    AdvanceTimers,
    /// Replaces the behaviour mode of an enemy.
    SetEnemyMode {
        /// Enemy to update.
        enemy: EnemyId,
        /// New behaviour mode.
        mode: EnemyMode,
    },
    /// Moves an enemy by the provided displacement.
    MoveEnemy {
        /// Enemy to move.
        enemy: EnemyId,
        /// Displacement for this tick.
        displacement: Vec2,
    },
    /// Lets a foraging enemy eat a pickup.
    EatPickup {
        /// Enemy doing the eating.
        enemy: EnemyId,
        /// Pickup being eaten.
        pickup: PickupId,
    },
    /// Stores a megabeast's updated brain and moves it.
    UpdateMegabeast {
        /// Megabeast to update.
        megabeast: MegabeastId,
        /// Brain state after the AI decision.
        brain: MegabeastBrain,
        /// Displacement for this tick.
        displacement: Vec2,
    },
    /// Places a megabeast at an absolute position.
    TeleportMegabeast {
        /// Megabeast to move.
        megabeast: MegabeastId,
        /// Destination on the torus.
        position: Vec2,
    },
    /// Moves a companion toward the player.
    MoveCompanion {
        /// Companion to move.
        companion: CompanionId,
        /// Displacement for this tick.
        displacement: Vec2,
    },
    /// Fires a companion's arrow and restarts its cooldown.
    CompanionFire {
        /// Companion firing.
        companion: CompanionId,
        /// Flight direction of the arrow.
        direction: Vec2,
    },
    /// Launches a free-standing projectile.
    FireProjectile {
        /// Launch position.
        origin: Vec2,
        /// Displacement per frame.
        velocity: Vec2,
        /// Damage dealt on contact.
        damage: u32,
        /// Lifetime of the projectile.
        ttl: Duration,
        /// Side the projectile fights for.
        faction: Faction,
        /// Applies poison on contact.
        poison: bool,
        /// Knockback strength applied on contact.
        knockback: f32,
    },
    /// Integrates knockback of enemies and megabeasts.
    IntegrateKnockback,
    /// Pushes overlapping bodies apart.
    SeparateBodies,
    /// Damages the player.
    StrikePlayer {
        /// Health removed by the hit.
        damage: u32,
        /// Knockback applied to the player.
        impulse: Option<Impulse>,
        /// Poison applied or refreshed by the hit.
        poison: Option<Poison>,
        /// Contact attacks respect the hurt cooldown.
        contact: bool,
    },
    /// Moves projectiles and counts down their lifetime.
    AdvanceProjectiles,
    /// Resolves a projectile touching a target.
    ProjectileHit {
        /// Projectile that connected.
        projectile: ProjectileId,
        /// Entity that was hit.
        target: ProjectileTarget,
    },
    /// Removes projectiles whose lifetime ran out.
    ExpireProjectiles,
    /// Moves a pickup toward the player under magnetism.
    PullPickup {
        /// Pickup being pulled.
        pickup: PickupId,
        /// Displacement for this tick.
        displacement: Vec2,
    },
    /// Moves a pickup into the player's inventory.
    CollectPickup {
        /// Pickup being collected.
        pickup: PickupId,
    },
    /// Spends a life or ends the game once health reached zero.
    ResolvePlayerDeath,
    /// Creates a regular enemy.
    SpawnEnemy {
        /// Species of the new enemy.
        species: SpeciesId,
        /// Location on the torus.
        position: Vec2,
        /// Initial behaviour mode.
        mode: EnemyMode,
        /// Marks megabeast minions that spawn at half health and never respawn.
        summoned: bool,
    },
    /// Creates a nest; rejected when the species already has one.
    SpawnNest {
        /// Species spawned by the nest.
        species: SpeciesId,
        /// Location on the torus.
        position: Vec2,
        /// Interval until the first guard spawns.
        spawn_interval: Duration,
    },
    /// Restarts a nest's guard spawn timer with a new interval.
    RescheduleNest {
        /// Nest to update.
        nest: NestId,
        /// Interval until the next guard spawns.
        spawn_interval: Duration,
    },
    /// Creates a megabeast.
    SpawnMegabeast {
        /// Species the megabeast belongs to.
        species: SpeciesId,
        /// Location on the torus.
        position: Vec2,
        /// Escalated variant.
        ultra: bool,
    },
    /// Places a pickup on the ground.
    SpawnPickup {
        /// Kind of item.
        kind: PickupKind,
        /// Location on the torus.
        position: Vec2,
        /// Amount granted on collection.
        value: u32,
        /// Direction of the initial toss, if the pickup bounces in.
        toss: Option<Vec2>,
    },
    /// Queues the re-creation of a destroyed nest.
    ScheduleNestRespawn {
        /// Species of the nest.
        species: SpeciesId,
        /// Delay until the nest returns.
        delay: Duration,
    },
    /// Queues a free-roaming replacement for a killed enemy.
    ScheduleEnemyRespawn {
        /// Species of the replacement.
        species: SpeciesId,
        /// Delay until the replacement appears.
        delay: Duration,
    },
    /// Adds a companion next to the player.
    SpawnCompanion {
        /// Fighting style of the companion.
        style: CompanionStyle,
        /// Location on the torus.
        position: Vec2,
    },
    /// Pauses or resumes the simulation.
    SetPaused {
        /// Desired pause flag.
        paused: bool,
    },
    /// Toggles the planting mode flag.
    SetPlanting {
        /// Desired planting flag.
        enabled: bool,
    },
    /// Toggles the interaction mode flag.
    SetInteraction {
        /// Desired interaction flag.
        enabled: bool,
    },
    /// Grows a tree during seeding.
    SpawnTree {
        /// Location on the torus.
        position: Vec2,
        /// Chops the tree withstands.
        hp: u32,
        /// Size relative to a standard sprite.
        size: f32,
    },
    /// Plants a tree from a seed; requires planting mode and a seed.
    PlantTree {
        /// Location on the torus.
        position: Vec2,
        /// Chops the tree withstands.
        hp: u32,
        /// Size relative to a standard sprite.
        size: f32,
    },
    /// Spends one level-up point on a stat.
    SpendLevelUpPoint {
        /// Stat to raise.
        stat: Stat,
    },
    /// Consumes an inventory item with pre-rolled effects.
    ConsumeItem {
        /// Item to consume.
        item: Consumable,
        /// Health or mana restored.
        restore: u32,
        /// Whether eating yielded a seed.
        seed_found: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the world was replaced by an empty map.
    WorldConfigured {
        /// Extents of the new map.
        torus: Torus,
    },
    /// Announces a change of the pause flag.
    PauseChanged {
        /// Pause flag after the change.
        paused: bool,
    },
    /// Announces a change of the planting mode flag.
    PlantingChanged {
        /// Flag after the change.
        enabled: bool,
    },
    /// Announces a change of the interaction mode flag.
    InteractionChanged {
        /// Flag after the change.
        enabled: bool,
    },
    /// Confirms that a melee swing started.
    SwingStarted {
        /// Entity performing the swing.
        owner: SwingOwner,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Side the projectile fights for.
        faction: Faction,
    },
    /// Reports damage dealt to an enemy, nest or megabeast.
    TargetDamaged {
        /// Entity that took damage.
        target: TargetId,
        /// Health removed.
        damage: u32,
    },
    /// Reports damage dealt to the player.
    PlayerDamaged {
        /// Health removed.
        damage: u32,
        /// Health left afterwards.
        hp: u32,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Species of the enemy.
        species: SpeciesId,
    },
    /// Reports that an enemy died.
    EnemyKilled {
        /// Identifier of the dead enemy.
        enemy: EnemyId,
        /// Species of the dead enemy.
        species: SpeciesId,
        /// Location of death.
        position: Vec2,
        /// Whether the enemy was a megabeast minion.
        summoned: bool,
    },
    /// Confirms that a nest was created.
    NestSpawned {
        /// Identifier of the nest.
        nest: NestId,
        /// Species of the nest.
        species: SpeciesId,
    },
    /// Reports that a nest was destroyed.
    NestDestroyed {
        /// Identifier of the destroyed nest.
        nest: NestId,
        /// Species of the nest.
        species: SpeciesId,
        /// Location of the nest.
        position: Vec2,
        /// Cumulative number of destroyed nests of this species.
        destroyed: u32,
    },
    /// Confirms that a megabeast was created.
    MegabeastSpawned {
        /// Identifier of the megabeast.
        megabeast: MegabeastId,
        /// Species of the megabeast.
        species: SpeciesId,
        /// Escalated variant.
        ultra: bool,
    },
    /// Reports a megabeast phase transition.
    MegabeastPhaseChanged {
        /// Identifier of the megabeast.
        megabeast: MegabeastId,
        /// Phase entered.
        phase: MegabeastPhase,
    },
    /// Reports that a megabeast died.
    MegabeastKilled {
        /// Identifier of the dead megabeast.
        megabeast: MegabeastId,
        /// Species of the megabeast.
        species: SpeciesId,
        /// Escalated variant.
        ultra: bool,
        /// Location of death.
        position: Vec2,
    },
    /// Confirms that a pickup was placed.
    PickupSpawned {
        /// Identifier of the pickup.
        pickup: PickupId,
        /// Kind of item.
        kind: PickupKind,
    },
    /// Reports that the player collected a pickup.
    PickupCollected {
        /// Identifier of the pickup.
        pickup: PickupId,
        /// Kind of item.
        kind: PickupKind,
        /// Amount granted.
        value: u32,
    },
    /// Reports that a foraging enemy ate a pickup.
    PickupEaten {
        /// Enemy doing the eating.
        enemy: EnemyId,
        /// Pickup that was eaten.
        pickup: PickupId,
    },
    /// Confirms that a companion joined the player.
    CompanionSpawned {
        /// Identifier of the companion.
        companion: CompanionId,
        /// Fighting style of the companion.
        style: CompanionStyle,
    },
    /// Confirms that a tree was created.
    TreeSpawned {
        /// Identifier of the tree.
        tree: TreeId,
        /// Whether the player planted it from a seed.
        planted: bool,
    },
    /// Signals that a tree is ready to drop an apple.
    TreeFruited {
        /// Tree bearing the apple.
        tree: TreeId,
    },
    /// Reports that a tree was chopped down.
    TreeFelled {
        /// Identifier of the felled tree.
        tree: TreeId,
        /// Location of the stump.
        position: Vec2,
    },
    /// Signals that a nest's guard spawn timer elapsed.
    NestSpawnDue {
        /// Nest ready to spawn a guard.
        nest: NestId,
    },
    /// Signals that a destroyed nest is ready to return.
    NestRespawnDue {
        /// Species of the nest.
        species: SpeciesId,
    },
    /// Signals that a killed enemy's replacement is due.
    EnemyRespawnDue {
        /// Species of the replacement.
        species: SpeciesId,
    },
    /// Confirms that an inventory item was consumed.
    ItemConsumed {
        /// Item consumed.
        item: Consumable,
        /// Health or mana restored.
        restored: u32,
    },
    /// Announces a level-up.
    LevelUp {
        /// Level reached.
        level: u32,
    },
    /// Confirms that a level-up point was spent.
    StatUpgraded {
        /// Stat that was raised.
        stat: Stat,
    },
    /// Reports that the player lost a life.
    PlayerDied {
        /// Lives left afterwards.
        lives: u32,
    },
    /// Reports that the last life was lost and the world was reset.
    GameOver,
    /// Short notification for the HUD.
    Toast {
        /// Message to display.
        message: String,
    },
    /// Transient text anchored to a world position.
    FloatingText {
        /// Anchor on the torus.
        position: Vec2,
        /// Colour of the text.
        color: TextColor,
        /// Text to display.
        text: String,
    },
    /// Reports that a requested action was refused.
    ActionRejected {
        /// Action that was attempted.
        action: Action,
        /// Reason for refusal.
        reason: RejectReason,
    },
}

/// Actions that can be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Melee swing.
    Melee,
    /// Ranged attack.
    Ranged,
    /// Spending a level-up point.
    SpendPoint,
    /// Consuming an inventory item.
    Consume,
    /// Creating a nest.
    SpawnNest,
    /// Resuming the simulation.
    Resume,
    /// Entering planting mode.
    Planting,
    /// Planting a tree.
    Plant,
}

/// Reasons an action was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The attack countdown has not elapsed.
    Cooldown,
    /// Not enough mana.
    InsufficientMana,
    /// No level-up points are available.
    NoLevelUpPoints,
    /// Level-up points must be spent first.
    LevelUpPending,
    /// The inventory slot is empty.
    EmptyInventory,
    /// The species already has a live nest.
    NestAlreadyPresent,
    /// A swing is already in progress.
    SwingInProgress,
    /// The referenced entity does not exist.
    MissingEntity,
    /// Planting mode is off.
    PlantingDisabled,
}

/// Entity a melee swing can strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetId {
    /// Regular enemy.
    Enemy(EnemyId),
    /// Nest.
    Nest(NestId),
    /// Megabeast.
    Megabeast(MegabeastId),
    /// Tree; only the player's blade chops trees.
    Tree(TreeId),
}

/// Entity a projectile can hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileTarget {
    /// Regular enemy, hit by friendly projectiles.
    Enemy(EnemyId),
    /// Megabeast, hit by friendly projectiles.
    Megabeast(MegabeastId),
    /// The player, hit by hostile projectiles.
    Player,
}

/// Colour of notification text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TextColor {
    /// Damage dealt to enemies and megabeasts.
    pub const ENEMY_DAMAGE: TextColor = TextColor::from_rgb(0xff, 0x6a, 0x6a);
    /// Damage dealt to nests.
    pub const NEST_DAMAGE: TextColor = TextColor::from_rgb(0x8b, 0x45, 0x13);
    /// Damage suffered by the player.
    pub const PLAYER_DAMAGE: TextColor = TextColor::from_rgb(0xff, 0xb3, 0xb3);
    /// Poison ticks.
    pub const POISON: TextColor = TextColor::from_rgb(0x7c, 0xd9, 0x5a);
    /// Healing and restored mana.
    pub const RESTORE: TextColor = TextColor::from_rgb(0x6a, 0xc8, 0xff);

    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a nest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NestId(u32);

impl NestId {
    /// Creates a new nest identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a megabeast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MegabeastId(u32);

impl MegabeastId {
    /// Creates a new megabeast identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a companion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanionId(u32);

impl CompanionId {
    /// Creates a new companion identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(u32);

impl TreeId {
    /// Creates a new tree identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{
        frames, CompanionStyle, EnemyId, GuardState, Inventory, MegabeastPhase, PickupKind,
        Progression, SpeciesId, Stat, Torus,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn frames_scale_with_reference_frame() {
        assert!((frames(Duration::from_millis(16)) - 1.0).abs() < 1.0e-6);
        assert!((frames(Duration::from_millis(40)) - 2.5).abs() < 1.0e-6);
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(42));
    }

    #[test]
    fn torus_round_trips_through_bincode() {
        assert_round_trip(&Torus::new(320.0, 240.0).expect("valid torus"));
    }

    #[test]
    fn enums_round_trip_through_bincode() {
        assert_round_trip(&GuardState::Flanking);
        assert_round_trip(&MegabeastPhase::Recovering);
        assert_round_trip(&CompanionStyle::Ranged);
        assert_round_trip(&Stat::Magnet);
        assert_round_trip(&PickupKind::Wood);
    }

    #[test]
    fn progression_round_trips_through_bincode() {
        let mut progression = Progression {
            kills: 12,
            max_level: 4,
            ..Progression::default()
        };
        let _ = progression
            .nests_destroyed_by_species
            .insert(SpeciesId::BOAR, 3);
        let _ = progression.items_collected.insert(PickupKind::Gold, 9);
        assert_round_trip(&progression);
        assert_round_trip(&Inventory {
            apples: 2,
            seeds: 1,
            ..Inventory::default()
        });
    }
}
