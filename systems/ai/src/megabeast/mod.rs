//! Megabeast phase machine with per-kind tactics.
//!
//! Every megabeast shares the `idle → chasing → preparing → attacking →
//! recovering` cycle. What happens inside each phase is delegated to a
//! [`Tactics`] implementation selected by the beast's kind. Burst damage is
//! only ever proposed from [`Tactics::attack`], which the machine reaches
//! after the telegraph has run its full length.

mod bruiser;
mod colossus;
mod skirmisher;
mod stalker;

use std::{f32::consts::TAU, time::Duration};

use chrobry_core::{
    heading, Command, EnemyMode, Faction, Impulse, Megabeast, MegabeastBrain, MegabeastKind,
    MegabeastPhase, Poison, SpeciesDefinition,
};
use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::Context;

const WAKE_DISTANCE: f32 = 700.0;
const SLEEP_DISTANCE: f32 = 1_400.0;
const PROJECTILE_SPEED: f32 = 5.0;
const PROJECTILE_TTL: Duration = Duration::from_secs(3);
const PROJECTILE_KNOCKBACK: f32 = 4.0;

/// Venom applied by stalker bites and poison rings.
pub(crate) const VENOM: Poison = Poison::new(Duration::from_secs(3), 2);

/// Behaviour of one megabeast family inside the shared phase machine.
pub(crate) trait Tactics {
    /// Chase speed relative to the species' speed.
    fn chase_factor(&self) -> f32;

    /// Cooldowns armed when the beast starts hunting.
    fn arm(&self, brain: &mut MegabeastBrain);

    /// Runs while chasing; may start the telegraph or fire secondary patterns.
    fn engage(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>);

    /// Time spent telegraphing before the primary attack starts.
    fn telegraph_length(&self) -> Duration;

    /// Runs while telegraphing; returns the displacement for this tick.
    fn telegraph(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2;

    /// Executes the primary attack; returns the displacement for this tick.
    fn attack(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2;

    /// Length of the vulnerable pause after an attack.
    fn recovery(&self) -> Duration;
}

fn tactics(kind: MegabeastKind) -> &'static dyn Tactics {
    match kind {
        MegabeastKind::Skirmisher => &skirmisher::Skirmisher,
        MegabeastKind::Bruiser => &bruiser::Bruiser,
        MegabeastKind::Stalker => &stalker::Stalker,
        MegabeastKind::Colossus => &colossus::Colossus,
    }
}

/// Read-only view of a megabeast's surroundings plus the command sink.
pub(crate) struct Plan<'a> {
    pub(crate) context: &'a Context,
    pub(crate) beast: &'a Megabeast,
    pub(crate) species: &'static SpeciesDefinition,
    /// Shortest vector from the beast to the player.
    pub(crate) to_player: Vec2,
    rng: &'a mut ChaCha8Rng,
    out: &'a mut Vec<Command>,
}

impl Plan<'_> {
    pub(crate) fn distance(&self) -> f32 {
        self.to_player.length()
    }

    pub(crate) fn toward_player(&self) -> Vec2 {
        self.to_player.normalize_or_zero()
    }

    /// Displacement at `factor` times the species speed along `direction`.
    pub(crate) fn step(&self, direction: Vec2, factor: f32) -> Vec2 {
        self.context.step(direction, self.species.speed * factor)
    }

    /// Damages the player with a burst attack.
    pub(crate) fn strike(
        &mut self,
        factor: f32,
        knockback: f32,
        duration: Duration,
        poison: Option<Poison>,
    ) {
        let damage = self.beast.scaled_damage(self.species.attack, factor);
        let impulse = Impulse::new(self.toward_player(), knockback, duration);
        self.out.push(Command::StrikePlayer {
            damage,
            impulse: Some(impulse),
            poison,
            contact: false,
        });
    }

    /// Fires hostile projectiles from `origin` along each angle.
    pub(crate) fn fire<I>(&mut self, origin: Vec2, angles: I, poison: bool)
    where
        I: IntoIterator<Item = f32>,
    {
        let damage = self.beast.scaled_damage(self.species.attack, 1.0);
        for angle in angles {
            self.out.push(Command::FireProjectile {
                origin,
                velocity: heading(angle) * PROJECTILE_SPEED,
                damage,
                ttl: PROJECTILE_TTL,
                faction: Faction::Hostile,
                poison,
                knockback: PROJECTILE_KNOCKBACK,
            });
        }
    }

    /// Fires `count` projectiles evenly spread around `origin`.
    pub(crate) fn fire_ring(&mut self, origin: Vec2, count: u16, poison: bool) {
        let step = TAU / f32::from(count);
        self.fire(origin, (0..count).map(|index| f32::from(index) * step), poison);
    }

    /// Calls weakened minions of the beast's species around it.
    pub(crate) fn summon(&mut self, count: usize) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let distance = self.rng.gen_range(40.0..80.0);
            let position = self
                .context
                .torus
                .offset(self.beast.position, heading(angle) * distance);
            self.out.push(Command::SpawnEnemy {
                species: self.beast.species,
                position,
                mode: EnemyMode::Roam,
                summoned: true,
            });
        }
    }

    pub(crate) fn teleport(&mut self, position: Vec2) {
        self.out.push(Command::TeleportMegabeast {
            megabeast: self.beast.id,
            position,
        });
    }
}

pub(crate) fn drive(
    beast: &Megabeast,
    context: &Context,
    rng: &mut ChaCha8Rng,
    out: &mut Vec<Command>,
) {
    let Some(species) = beast.species.definition() else {
        return;
    };
    let tactics = tactics(beast.kind);
    let mut brain = beast.brain;
    let mut plan = Plan {
        context,
        beast,
        species,
        to_player: context.torus.delta(beast.position, context.player),
        rng,
        out,
    };

    let displacement = match brain.phase {
        MegabeastPhase::Idle => {
            if plan.distance() < WAKE_DISTANCE {
                brain.enter(MegabeastPhase::Chasing);
                tactics.arm(&mut brain);
            }
            Vec2::ZERO
        }
        MegabeastPhase::Chasing => {
            if plan.distance() > SLEEP_DISTANCE {
                brain.enter(MegabeastPhase::Idle);
                Vec2::ZERO
            } else {
                let chase = plan.step(plan.toward_player(), tactics.chase_factor());
                tactics.engage(&mut brain, &mut plan);
                if brain.phase == MegabeastPhase::Chasing {
                    chase
                } else {
                    Vec2::ZERO
                }
            }
        }
        MegabeastPhase::Preparing => tactics.telegraph(&mut brain, &mut plan),
        MegabeastPhase::Attacking => tactics.attack(&mut brain, &mut plan),
        MegabeastPhase::Recovering => {
            if brain.phase_elapsed >= tactics.recovery() {
                brain.enter(MegabeastPhase::Chasing);
            }
            Vec2::ZERO
        }
    };

    plan.out.push(Command::UpdateMegabeast {
        megabeast: beast.id,
        brain,
        displacement,
    });
}
