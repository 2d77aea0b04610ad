//! Entity records owned by the world.
//!
//! Transient combat state such as knockback, hit flashes, swings and poison
//! lives directly on the entity that carries it so it disappears together with
//! its owner.

use std::{collections::BTreeMap, collections::BTreeSet, f32::consts::TAU, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    frames,
    items::{Inventory, PickupKind},
    species::{MegabeastKind, SpeciesId},
    torus::{heading, Torus},
    CompanionId, EnemyId, MegabeastId, NestId, PickupId, ProjectileId, TargetId, TreeId,
};

/// Collision radius of the player.
pub const PLAYER_RADIUS: f32 = 20.0;
/// Collision radius of a regular enemy.
pub const ENEMY_RADIUS: f32 = 18.0;
/// Hit radius of a megabeast for friendly projectiles.
pub const MEGABEAST_RADIUS: f32 = 36.0;
/// Contact radius inside which a megabeast strikes the player.
pub const MEGABEAST_CONTACT_RADIUS: f32 = 56.0;
/// Friction applied each frame to the player's knockback vector.
pub const PLAYER_KNOCKBACK_FRICTION: f32 = 0.92;
/// Friction applied each frame to enemy and megabeast knockback vectors.
pub const ENEMY_KNOCKBACK_FRICTION: f32 = 0.9;
/// Duration of the red flash shown after an entity takes damage.
pub const HIT_FLASH: Duration = Duration::from_millis(120);
/// Invulnerability window after the player suffers a contact attack.
pub const HURT_COOLDOWN: Duration = Duration::from_millis(800);
/// Interval between poison damage pulses.
pub const POISON_PULSE: Duration = Duration::from_millis(500);
/// Number of lives a fresh player starts with.
pub const STARTING_LIVES: u32 = 3;
/// Mana consumed by one ranged attack.
pub const RANGED_MANA_COST: u32 = 3;

/// Experience required to advance past `level`.
#[must_use]
pub const fn xp_required(level: u32) -> u32 {
    let step = level.saturating_sub(1);
    50 + step.saturating_mul(step).saturating_mul(8)
}

/// Velocity and duration of a knockback about to be applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impulse {
    /// Displacement per frame at the start of the knockback.
    pub velocity: Vec2,
    /// Total duration of the knockback.
    pub duration: Duration,
}

impl Impulse {
    /// Builds an impulse pushing along `direction` with the provided strength.
    #[must_use]
    pub fn new(direction: Vec2, strength: f32, duration: Duration) -> Self {
        Self {
            velocity: direction.normalize_or_zero() * strength,
            duration,
        }
    }
}

/// Decaying displacement applied to an entity after a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Knockback {
    /// Current displacement per frame before time decay.
    pub velocity: Vec2,
    /// Time left before the knockback ends.
    pub remaining: Duration,
    /// Total duration the knockback started with.
    pub initial: Duration,
    /// Per-frame damping applied to the velocity.
    pub friction: f32,
}

impl Knockback {
    /// Starts a knockback from an impulse; zero-length impulses yield `None`.
    #[must_use]
    pub fn new(impulse: Impulse, friction: f32) -> Option<Self> {
        if impulse.duration.is_zero() || !impulse.velocity.is_finite() {
            return None;
        }
        Some(Self {
            velocity: impulse.velocity,
            remaining: impulse.duration,
            initial: impulse.duration,
            friction,
        })
    }

    /// Advances the knockback and returns the displacement for this step.
    pub fn step(&mut self, dt: Duration) -> Vec2 {
        self.remaining = self.remaining.saturating_sub(dt);
        let decay = if self.initial.is_zero() {
            0.0
        } else {
            (self.remaining.as_secs_f32() / self.initial.as_secs_f32()).min(1.0)
        };
        let displacement = self.velocity * decay * frames(dt);
        self.velocity *= self.friction;
        displacement
    }

    /// Reports whether the knockback has run its course.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Damage-over-time status applied by venomous attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Poison {
    /// Time left before the poison wears off.
    pub remaining: Duration,
    /// Damage dealt per pulse.
    pub damage: u32,
    /// Time accumulated toward the next pulse.
    pub pulse_elapsed: Duration,
}

impl Poison {
    /// Creates a fresh poison status.
    #[must_use]
    pub const fn new(duration: Duration, damage: u32) -> Self {
        Self {
            remaining: duration,
            damage,
            pulse_elapsed: Duration::ZERO,
        }
    }
}

/// Entity that owns a melee swing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SwingOwner {
    /// The player character.
    Player,
    /// One of the player's companions.
    Companion(CompanionId),
}

/// Full-circle melee sweep whose blade point orbits the owner.
#[derive(Clone, Debug, PartialEq)]
pub struct MeleeSwing {
    /// Entity performing the swing.
    pub owner: SwingOwner,
    /// Time since the swing started.
    pub elapsed: Duration,
    /// Time needed for a full revolution.
    pub duration: Duration,
    /// Angle of the blade when the swing started.
    pub start_angle: f32,
    /// Distance between the owner and the blade point.
    pub radius: f32,
    /// Distance from the blade point inside which targets are struck.
    pub hit_radius: f32,
    /// Damage applied to each struck target.
    pub damage: u32,
    /// Knockback strength applied to struck enemies.
    pub knockback: f32,
    /// Knockback duration applied to struck enemies.
    pub knockback_duration: Duration,
    /// Targets already struck by this swing.
    pub hits: BTreeSet<TargetId>,
}

/// Time a melee swing takes to complete a revolution.
pub const SWING_DURATION: Duration = Duration::from_millis(450);

impl MeleeSwing {
    /// Swing performed by the player.
    #[must_use]
    pub fn for_player(start_angle: f32, damage: u32) -> Self {
        Self {
            owner: SwingOwner::Player,
            elapsed: Duration::ZERO,
            duration: SWING_DURATION,
            start_angle,
            radius: 90.0,
            hit_radius: 30.0,
            damage,
            knockback: 8.0,
            knockback_duration: Duration::from_millis(200),
            hits: BTreeSet::new(),
        }
    }

    /// Smaller swing performed by a companion.
    #[must_use]
    pub fn for_companion(companion: CompanionId, start_angle: f32, damage: u32) -> Self {
        Self {
            owner: SwingOwner::Companion(companion),
            elapsed: Duration::ZERO,
            duration: SWING_DURATION,
            start_angle,
            radius: 60.0,
            hit_radius: 25.0,
            damage,
            knockback: 4.0,
            knockback_duration: Duration::from_millis(200),
            hits: BTreeSet::new(),
        }
    }

    /// Fraction of the revolution completed, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Location of the blade point for an owner standing at `owner_position`.
    #[must_use]
    pub fn blade_position(&self, torus: &Torus, owner_position: Vec2) -> Vec2 {
        let angle = self.start_angle + self.progress() * TAU;
        torus.offset(owner_position, heading(angle) * self.radius)
    }

    /// Reports whether the revolution has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Reports whether `target` was already struck by this swing.
    #[must_use]
    pub fn has_hit(&self, target: TargetId) -> bool {
        self.hits.contains(&target)
    }
}

/// Attribute raised by spending a level-up point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Maximum health, refilled on upgrade.
    Health,
    /// Maximum mana, refilled on upgrade.
    Mana,
    /// Movement speed.
    Speed,
    /// Melee cooldown.
    MeleeSpeed,
    /// Melee damage.
    MeleeDamage,
    /// Ranged cooldown.
    RangedSpeed,
    /// Ranged damage.
    RangedDamage,
    /// Pickup magnet bonus.
    Magnet,
}

/// The player character.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Location on the torus.
    pub position: Vec2,
    /// Movement per frame.
    pub velocity: Vec2,
    /// Unit vector the player last moved along.
    pub facing: Vec2,
    /// Current health.
    pub hp: u32,
    /// Maximum health.
    pub hp_max: u32,
    /// Current mana.
    pub mp: u32,
    /// Maximum mana.
    pub mp_max: u32,
    /// Character level, starting at one.
    pub level: u32,
    /// Experience gathered toward the next level.
    pub xp: u32,
    /// Gold carried.
    pub gold: u32,
    /// Lives left before the game is over.
    pub lives: u32,
    /// Movement speed in world units per frame.
    pub speed: f32,
    /// Damage of a melee swing.
    pub melee_damage: u32,
    /// Damage of an arrow.
    pub ranged_damage: u32,
    /// Cooldown started by a melee swing.
    pub melee_cooldown: Duration,
    /// Cooldown started by a ranged attack.
    pub ranged_cooldown: Duration,
    /// Shared countdown until the next attack is allowed.
    pub attack_ready_in: Duration,
    /// Bonus added to the level when computing the magnet range.
    pub magnet_bonus: u32,
    /// Active knockback, if any.
    pub knockback: Option<Knockback>,
    /// Active melee swing, if any.
    pub swing: Option<MeleeSwing>,
    /// Active poison, if any.
    pub poison: Option<Poison>,
    /// Remaining invulnerability against contact attacks.
    pub hurt_cooldown: Duration,
    /// Remaining hit flash.
    pub hit_flash: Duration,
    /// Level-up points waiting to be spent.
    pub level_up_points: u32,
    /// Goods carried.
    pub inventory: Inventory,
}

impl Player {
    /// Fresh level-one character standing at `position`.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            hp: 100,
            hp_max: 100,
            mp: 50,
            mp_max: 50,
            level: 1,
            xp: 0,
            gold: 0,
            lives: STARTING_LIVES,
            speed: 2.8,
            melee_damage: 18,
            ranged_damage: 16,
            melee_cooldown: Duration::from_millis(400),
            ranged_cooldown: Duration::from_millis(300),
            attack_ready_in: Duration::ZERO,
            magnet_bonus: 0,
            knockback: None,
            swing: None,
            poison: None,
            hurt_cooldown: Duration::ZERO,
            hit_flash: Duration::ZERO,
            level_up_points: 0,
            inventory: Inventory::default(),
        }
    }

    /// Range inside which pickups are pulled toward the player.
    #[must_use]
    pub fn magnet_range(&self) -> f32 {
        self.level.saturating_add(self.magnet_bonus) as f32
    }

    /// Reports whether the shared attack countdown has elapsed.
    #[must_use]
    pub fn attack_ready(&self) -> bool {
        self.attack_ready_in.is_zero()
    }

    /// Applies one level-up upgrade to the provided stat.
    pub fn upgrade(&mut self, stat: Stat) {
        match stat {
            Stat::Health => {
                self.hp_max = scale_floor(self.hp_max, 1.1);
                self.hp = self.hp_max;
            }
            Stat::Mana => {
                self.mp_max = scale_floor(self.mp_max, 1.1);
                self.mp = self.mp_max;
            }
            Stat::Speed => self.speed *= 1.1,
            Stat::MeleeSpeed => {
                self.melee_cooldown = self
                    .melee_cooldown
                    .mul_f32(0.9)
                    .max(Duration::from_millis(160));
            }
            Stat::MeleeDamage => self.melee_damage = scale_floor(self.melee_damage, 1.1),
            Stat::RangedSpeed => {
                self.ranged_cooldown = self
                    .ranged_cooldown
                    .mul_f32(0.9)
                    .max(Duration::from_millis(120));
            }
            Stat::RangedDamage => self.ranged_damage = scale_floor(self.ranged_damage, 1.1),
            Stat::Magnet => self.magnet_bonus = self.magnet_bonus.saturating_add(1),
        }
    }
}

fn scale_floor(value: u32, factor: f32) -> u32 {
    (value as f32 * factor).floor() as u32
}

/// Guard state of an enemy tethered to a nest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Patrolling around the nest.
    Guarding,
    /// Leaving the nest along a spread angle.
    Chasing,
    /// Circling toward a point beside the player.
    Flanking,
    /// Closing in on the player at full speed.
    Attacking,
}

/// Link between a guard and the nest it protects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardTether {
    /// Nest being protected; resolved against the nest map every tick.
    pub nest: NestId,
    /// Current guard state.
    pub state: GuardState,
    /// Spread or flank angle in radians.
    pub flank_angle: f32,
}

/// Behaviour mode of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyMode {
    /// Free-roaming hunter.
    Roam,
    /// Guard bound to a nest.
    Guard(GuardTether),
}

impl EnemyMode {
    /// Tether of a guard, or `None` for free-roamers.
    #[must_use]
    pub fn tether(&self) -> Option<&GuardTether> {
        match self {
            Self::Roam => None,
            Self::Guard(tether) => Some(tether),
        }
    }
}

/// Regular hostile creature.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Identifier assigned by the world.
    pub id: EnemyId,
    /// Species of the creature.
    pub species: SpeciesId,
    /// Location on the torus.
    pub position: Vec2,
    /// Current health.
    pub hp: u32,
    /// Maximum health.
    pub hp_max: u32,
    /// Behaviour mode.
    pub mode: EnemyMode,
    /// Time since the enemy spawned; drives the roaming drift.
    pub elapsed: Duration,
    /// Active knockback, if any.
    pub knockback: Option<Knockback>,
    /// Remaining hit flash.
    pub hit_flash: Duration,
    /// Summoned by a megabeast; summoned minions never respawn.
    pub summoned: bool,
}

/// Spawner guarding a species' territory.
#[derive(Clone, Debug, PartialEq)]
pub struct Nest {
    /// Identifier assigned by the world.
    pub id: NestId,
    /// Species spawned by the nest.
    pub species: SpeciesId,
    /// Location on the torus.
    pub position: Vec2,
    /// Current health.
    pub hp: u32,
    /// Maximum health.
    pub hp_max: u32,
    /// Time accumulated toward the next guard spawn.
    pub spawn_elapsed: Duration,
    /// Randomised interval between guard spawns.
    pub spawn_interval: Duration,
    /// Radius guards patrol within.
    pub guard_radius: f32,
}

/// Radius guards patrol around their nest.
pub const NEST_GUARD_RADIUS: f32 = 200.0;

/// Interval between a tree's apple drops.
pub const APPLE_DROP_INTERVAL: Duration = Duration::from_secs(10);
/// Trees stop dropping once this many apples lie around them.
pub const TREE_APPLE_CAP: usize = 7;
/// Radius around a tree in which fallen apples are counted.
pub const TREE_APPLE_RADIUS: f32 = 80.0;

/// Apple tree; felled by the player's blade into wood.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    /// Identifier assigned by the world.
    pub id: TreeId,
    /// Location on the torus.
    pub position: Vec2,
    /// Chops left before the tree falls.
    pub hp: u32,
    /// Chops the tree started with.
    pub hp_max: u32,
    /// Size relative to a standard sprite.
    pub size: f32,
    /// Time accumulated toward the next apple drop.
    pub drop_elapsed: Duration,
}

impl Tree {
    /// Rolls the chops and size of a new tree.
    pub fn sapling<R: rand::Rng + ?Sized>(rng: &mut R) -> (u32, f32) {
        (rng.gen_range(2..=3), rng.gen_range(2.2..2.7))
    }
}

/// Pending timer that recreates a destroyed nest or a killed enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Respawn {
    /// Species to recreate.
    pub species: SpeciesId,
    /// Time left before the respawn is due.
    pub remaining: Duration,
}

/// Phase of a megabeast's shared state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MegabeastPhase {
    /// Dormant until the player comes close.
    Idle,
    /// Hunting the player and running secondary patterns.
    Chasing,
    /// Telegraphing the primary attack; no burst damage occurs.
    Preparing,
    /// Executing the primary attack.
    Attacking,
    /// Vulnerable pause after an attack.
    Recovering,
}

/// Mutable decision state of a megabeast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MegabeastBrain {
    /// Current phase.
    pub phase: MegabeastPhase,
    /// Time spent in the current phase.
    pub phase_elapsed: Duration,
    /// Countdown until the primary attack may start.
    pub primary_cooldown: Duration,
    /// Countdown until the projectile pattern may fire.
    pub volley_cooldown: Duration,
    /// Countdown until minions may be summoned.
    pub summon_cooldown: Duration,
    /// Unit direction of an ongoing lunge or charge.
    pub charge_direction: Vec2,
    /// Speed of an ongoing lunge or charge in units per frame.
    pub charge_speed: f32,
    /// Time since the megabeast spawned.
    pub elapsed: Duration,
    /// Whether the current attack already landed.
    pub struck: bool,
}

impl MegabeastBrain {
    /// Brain of a freshly spawned megabeast.
    #[must_use]
    pub const fn new(volley_cooldown: Duration, summon_cooldown: Duration) -> Self {
        Self {
            phase: MegabeastPhase::Idle,
            phase_elapsed: Duration::ZERO,
            primary_cooldown: Duration::ZERO,
            volley_cooldown,
            summon_cooldown,
            charge_direction: Vec2::ZERO,
            charge_speed: 0.0,
            elapsed: Duration::ZERO,
            struck: false,
        }
    }

    /// Switches to `phase`, restarting the phase clock.
    pub fn enter(&mut self, phase: MegabeastPhase) {
        self.phase = phase;
        self.phase_elapsed = Duration::ZERO;
        self.struck = false;
    }
}

/// Boss creature spawned when a nest falls.
#[derive(Clone, Debug, PartialEq)]
pub struct Megabeast {
    /// Identifier assigned by the world.
    pub id: MegabeastId,
    /// Species the megabeast belongs to.
    pub species: SpeciesId,
    /// Behaviour family.
    pub kind: MegabeastKind,
    /// Escalated variant with doubled health and boosted damage.
    pub ultra: bool,
    /// Location on the torus.
    pub position: Vec2,
    /// Current health.
    pub hp: u32,
    /// Maximum health.
    pub hp_max: u32,
    /// Decision state.
    pub brain: MegabeastBrain,
    /// Active knockback, if any.
    pub knockback: Option<Knockback>,
    /// Remaining hit flash.
    pub hit_flash: Duration,
}

impl Megabeast {
    /// Health multiplier over the species' base health.
    #[must_use]
    pub const fn health_multiplier(ultra: bool) -> u32 {
        if ultra {
            20
        } else {
            10
        }
    }

    /// Damage multiplier applied to every attack.
    #[must_use]
    pub const fn damage_multiplier(&self) -> f32 {
        if self.ultra {
            1.5
        } else {
            1.0
        }
    }

    /// Scales base species damage by `factor` and the ultra multiplier.
    #[must_use]
    pub fn scaled_damage(&self, base: u32, factor: f32) -> u32 {
        (base as f32 * factor * self.damage_multiplier()).round() as u32
    }

    /// True while the primary attack is being telegraphed.
    #[must_use]
    pub fn is_telegraphing(&self) -> bool {
        self.brain.phase == MegabeastPhase::Preparing
    }
}

/// Side a projectile fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Faction {
    /// Fired by the player or companions; hits enemies and megabeasts.
    Friendly,
    /// Fired by megabeasts; hits the player.
    Hostile,
}

/// Straight-flying projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Identifier assigned by the world.
    pub id: ProjectileId,
    /// Location on the torus.
    pub position: Vec2,
    /// Displacement per frame.
    pub velocity: Vec2,
    /// Damage dealt on contact.
    pub damage: u32,
    /// Time left before the projectile expires.
    pub ttl: Duration,
    /// Side the projectile fights for.
    pub faction: Faction,
    /// Applies poison on contact.
    pub poison: bool,
    /// Knockback strength applied on contact.
    pub knockback: f32,
}

/// Settling motion of a freshly tossed pickup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounce {
    /// Displacement per frame.
    pub velocity: Vec2,
    /// Number of bounces performed so far.
    pub count: u8,
    /// Vertical coordinate of the first landing.
    pub ground: Option<f32>,
}

impl Bounce {
    /// Gravity added to the vertical velocity each frame.
    pub const GRAVITY: f32 = 0.15;

    /// Starts a toss along `direction`.
    #[must_use]
    pub fn toss(direction: Vec2) -> Self {
        let horizontal = direction.normalize_or_zero().x * 3.5;
        Self {
            velocity: Vec2::new(horizontal, -4.5),
            count: 0,
            ground: None,
        }
    }

    /// Advances the toss and returns the displacement; `None` once settled.
    pub fn step(&mut self, frames: f32) -> Option<Vec2> {
        self.velocity.y += Self::GRAVITY * frames;
        let displacement = self.velocity * frames;
        if self.velocity.y > 0.0 {
            if self.count == 0 {
                self.velocity.y = -self.velocity.y * 0.7;
                self.velocity.x *= 0.8;
                self.count = 1;
                return Some(displacement);
            }
            if self.count < 4 && self.velocity.y.abs() > 0.3 {
                self.velocity.y = -self.velocity.y * 0.5;
                self.velocity.x *= 0.7;
                self.count += 1;
                return Some(displacement);
            }
            return None;
        }
        Some(displacement)
    }
}

/// Item lying on the ground.
#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    /// Identifier assigned by the world.
    pub id: PickupId,
    /// Kind of item.
    pub kind: PickupKind,
    /// Location on the torus.
    pub position: Vec2,
    /// Amount granted on collection.
    pub value: u32,
    /// Settling motion while the pickup is still bouncing.
    pub bounce: Option<Bounce>,
    /// Pulled toward the player this tick.
    pub being_pulled: bool,
}

/// Fighting style of a companion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionStyle {
    /// Mirrors the player's melee swings.
    Melee,
    /// Shoots arrows at nearby enemies.
    Ranged,
}

/// Allied character following the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Companion {
    /// Identifier assigned by the world.
    pub id: CompanionId,
    /// Location on the torus.
    pub position: Vec2,
    /// Movement speed in world units per frame.
    pub speed: f32,
    /// Set once the companion first reached the player.
    pub reached_player: bool,
    /// Active melee swing, if any.
    pub swing: Option<MeleeSwing>,
    /// Fighting style.
    pub style: CompanionStyle,
    /// Countdown until the next arrow may be fired.
    pub fire_cooldown: Duration,
}

/// Lifetime counters exposed to progression collaborators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    /// Enemies killed.
    pub kills: u32,
    /// Nests destroyed in total.
    pub nests_destroyed: u32,
    /// Nests destroyed per species; drives megabeast escalation.
    pub nests_destroyed_by_species: BTreeMap<SpeciesId, u32>,
    /// Megabeasts slain.
    pub megabeasts_slain: u32,
    /// Items collected per kind.
    pub items_collected: BTreeMap<PickupKind, u32>,
    /// Companions that joined the player.
    pub children_born: u32,
    /// Trees planted from seeds.
    pub trees_planted: u32,
    /// Highest level reached.
    pub max_level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_curve_grows_quadratically() {
        assert_eq!(xp_required(1), 50);
        assert_eq!(xp_required(2), 58);
        assert_eq!(xp_required(5), 178);
    }

    #[test]
    fn knockback_decays_and_expires() {
        let impulse = Impulse::new(Vec2::X, 8.0, Duration::from_millis(200));
        let mut knockback =
            Knockback::new(impulse, ENEMY_KNOCKBACK_FRICTION).expect("non-empty impulse");
        let step = Duration::from_millis(16);

        let mut previous = f32::INFINITY;
        let mut steps = 0;
        while !knockback.is_spent() {
            let displacement = knockback.step(step);
            assert!(displacement.x < previous);
            assert!(displacement.y.abs() < f32::EPSILON);
            previous = displacement.x;
            steps += 1;
        }
        assert_eq!(steps, 13);
        assert!(previous.abs() < 1.0e-6);
    }

    #[test]
    fn first_knockback_step_matches_decay_formula() {
        let impulse = Impulse::new(Vec2::Y, 8.0, Duration::from_millis(200));
        let mut knockback = Knockback::new(impulse, 0.9).expect("non-empty impulse");
        let displacement = knockback.step(Duration::from_millis(16));
        assert!((displacement.y - 8.0 * (184.0 / 200.0)).abs() < 1.0e-4);
        assert!((knockback.velocity.y - 7.2).abs() < 1.0e-4);
    }

    #[test]
    fn zero_duration_impulse_is_ignored() {
        let impulse = Impulse::new(Vec2::X, 5.0, Duration::ZERO);
        assert!(Knockback::new(impulse, 0.9).is_none());
    }

    #[test]
    fn upgrades_respect_cooldown_floors() {
        let mut player = Player::new(Vec2::ZERO);
        for _ in 0..40 {
            player.upgrade(Stat::MeleeSpeed);
            player.upgrade(Stat::RangedSpeed);
        }
        assert_eq!(player.melee_cooldown, Duration::from_millis(160));
        assert_eq!(player.ranged_cooldown, Duration::from_millis(120));

        player.upgrade(Stat::Health);
        assert_eq!(player.hp_max, 110);
        assert_eq!(player.hp, 110);
        player.upgrade(Stat::MeleeDamage);
        assert_eq!(player.melee_damage, 19);
    }

    #[test]
    fn magnet_range_combines_level_and_bonus() {
        let mut player = Player::new(Vec2::ZERO);
        player.level = 7;
        player.upgrade(Stat::Magnet);
        assert!((player.magnet_range() - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn swing_blade_completes_a_revolution() {
        let torus = Torus::new(1_000.0, 1_000.0).expect("valid torus");
        let owner = Vec2::new(500.0, 500.0);
        let mut swing = MeleeSwing::for_player(0.0, 18);
        let start = swing.blade_position(&torus, owner);
        assert!((start - Vec2::new(590.0, 500.0)).length() < 1.0e-3);

        swing.elapsed = swing.duration / 2;
        let half = swing.blade_position(&torus, owner);
        assert!((half - Vec2::new(410.0, 500.0)).length() < 1.0e-2);

        swing.elapsed = swing.duration;
        assert!(swing.is_finished());
    }

    #[test]
    fn toss_eventually_settles() {
        let mut bounce = Bounce::toss(Vec2::new(0.5, -0.5));
        let mut frames_taken = 0;
        while bounce.step(1.0).is_some() {
            frames_taken += 1;
            assert!(frames_taken < 1_000, "toss never settled");
        }
        assert!(bounce.count >= 1);
    }

    #[test]
    fn ultra_megabeasts_hit_harder() {
        let brain = MegabeastBrain::new(Duration::from_secs(4), Duration::from_secs(8));
        let mut beast = Megabeast {
            id: MegabeastId::new(1),
            species: SpeciesId::WOLF,
            kind: MegabeastKind::Skirmisher,
            ultra: false,
            position: Vec2::ZERO,
            hp: 300,
            hp_max: 300,
            brain,
            knockback: None,
            hit_flash: Duration::ZERO,
        };
        assert_eq!(beast.scaled_damage(8, 2.0), 16);
        beast.ultra = true;
        assert_eq!(beast.scaled_damage(8, 2.0), 24);
        assert_eq!(Megabeast::health_multiplier(true), 20);
    }
}
