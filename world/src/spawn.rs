use std::time::Duration;

use chrobry_core::{
    entities::NEST_GUARD_RADIUS, heading, Action, Bounce, Companion, CompanionStyle, Enemy,
    EnemyMode, Event, Megabeast, MegabeastBrain, Nest, Pickup, PickupKind, RejectReason,
    SpeciesId,
};
use glam::Vec2;

use crate::{finite, World};

/// Nest health relative to the species' base health.
const NEST_HEALTH_FACTOR: u32 = 5;
/// Companion walking speed in units per frame.
const COMPANION_SPEED: f32 = 2.0;
/// Pickups closer than this are stacked on top of each other.
const PICKUP_SPACING: f32 = 40.0;
/// Alternative spots tried around a crowded drop point.
const PICKUP_SPOT_ATTEMPTS: u16 = 20;
const GOLDEN_ANGLE: f32 = 2.399_963;

impl World {
    pub(crate) fn spawn_enemy(
        &mut self,
        species: SpeciesId,
        position: Vec2,
        mode: EnemyMode,
        summoned: bool,
        out: &mut Vec<Event>,
    ) {
        let Some(definition) = species.definition() else {
            tracing::warn!(species = species.get(), "ignoring enemy of unknown species");
            return;
        };
        let Some(position) = finite(position, "enemy position") else {
            return;
        };
        let mode = match mode {
            EnemyMode::Guard(tether) if !self.nests.contains_key(&tether.nest) => EnemyMode::Roam,
            other => other,
        };
        let hp_max = if summoned {
            (definition.hp / 2).max(1)
        } else {
            definition.hp
        };

        let id = self.ids.enemy();
        let _ = self.enemies.insert(
            id,
            Enemy {
                id,
                species,
                position: self.torus.wrap(position),
                hp: hp_max,
                hp_max,
                mode,
                elapsed: Duration::ZERO,
                knockback: None,
                hit_flash: Duration::ZERO,
                summoned,
            },
        );
        out.push(Event::EnemySpawned { enemy: id, species });
    }

    pub(crate) fn spawn_nest(
        &mut self,
        species: SpeciesId,
        position: Vec2,
        spawn_interval: Duration,
        out: &mut Vec<Event>,
    ) {
        let Some(definition) = species.definition() else {
            tracing::warn!(species = species.get(), "ignoring nest of unknown species");
            return;
        };
        let Some(position) = finite(position, "nest position") else {
            return;
        };
        if self.nests.values().any(|nest| nest.species == species) {
            out.push(Event::ActionRejected {
                action: Action::SpawnNest,
                reason: RejectReason::NestAlreadyPresent,
            });
            return;
        }

        let hp_max = definition.hp.saturating_mul(NEST_HEALTH_FACTOR);
        let id = self.ids.nest();
        let _ = self.nests.insert(
            id,
            Nest {
                id,
                species,
                position: self.torus.wrap(position),
                hp: hp_max,
                hp_max,
                spawn_elapsed: Duration::ZERO,
                spawn_interval,
                guard_radius: NEST_GUARD_RADIUS,
            },
        );
        tracing::debug!(species = %species, "nest spawned");
        out.push(Event::NestSpawned { nest: id, species });
    }

    pub(crate) fn spawn_megabeast(
        &mut self,
        species: SpeciesId,
        position: Vec2,
        ultra: bool,
        out: &mut Vec<Event>,
    ) {
        let Some(definition) = species.definition() else {
            tracing::warn!(species = species.get(), "ignoring megabeast of unknown species");
            return;
        };
        let Some(position) = finite(position, "megabeast position") else {
            return;
        };

        let hp_max = definition
            .hp
            .saturating_mul(Megabeast::health_multiplier(ultra));
        let id = self.ids.megabeast();
        let _ = self.megabeasts.insert(
            id,
            Megabeast {
                id,
                species,
                kind: definition.megabeast,
                ultra,
                position: self.torus.wrap(position),
                hp: hp_max,
                hp_max,
                brain: MegabeastBrain::new(Duration::ZERO, Duration::ZERO),
                knockback: None,
                hit_flash: Duration::ZERO,
            },
        );
        tracing::info!(species = %species, ultra, "megabeast spawned");
        out.push(Event::MegabeastSpawned {
            megabeast: id,
            species,
            ultra,
        });
        let prefix = if ultra { "An ultra" } else { "A" };
        out.push(Event::Toast {
            message: format!("{prefix} mega {} has appeared!", definition.name),
        });
    }

    pub(crate) fn spawn_pickup(
        &mut self,
        kind: PickupKind,
        position: Vec2,
        value: u32,
        toss: Option<Vec2>,
        out: &mut Vec<Event>,
    ) {
        let Some(position) = finite(position, "pickup position") else {
            return;
        };
        let bounce = toss
            .and_then(|direction| finite(direction, "toss direction"))
            .map(Bounce::toss);

        let position = self.free_pickup_spot(self.torus.wrap(position));
        let id = self.ids.pickup();
        let _ = self.pickups.insert(
            id,
            Pickup {
                id,
                kind,
                position,
                value,
                bounce,
                being_pulled: false,
            },
        );
        out.push(Event::PickupSpawned { pickup: id, kind });
    }

    /// Walks a spiral around `position` until no pickup lies within
    /// [`PICKUP_SPACING`]; the last candidate is kept when every spot is taken.
    fn free_pickup_spot(&self, position: Vec2) -> Vec2 {
        let crowded = |spot: Vec2| {
            self.pickups
                .values()
                .any(|pickup| self.torus.distance(pickup.position, spot) < PICKUP_SPACING)
        };
        let mut spot = position;
        for attempt in 1..=PICKUP_SPOT_ATTEMPTS {
            if !crowded(spot) {
                break;
            }
            let turn = f32::from(attempt) * GOLDEN_ANGLE;
            let reach =
                PICKUP_SPACING * (1.0 + f32::from(attempt) / f32::from(PICKUP_SPOT_ATTEMPTS));
            spot = self.torus.offset(position, heading(turn) * reach);
        }
        spot
    }

    pub(crate) fn spawn_companion(
        &mut self,
        style: CompanionStyle,
        position: Vec2,
        out: &mut Vec<Event>,
    ) {
        let Some(position) = finite(position, "companion position") else {
            return;
        };
        let id = self.ids.companion();
        let _ = self.companions.insert(
            id,
            Companion {
                id,
                position: self.torus.wrap(position),
                speed: COMPANION_SPEED,
                reached_player: false,
                swing: None,
                style,
                fire_cooldown: Duration::ZERO,
            },
        );
        self.progression.children_born = self.progression.children_born.saturating_add(1);
        out.push(Event::CompanionSpawned {
            companion: id,
            style,
        });
        out.push(Event::Toast {
            message: "A child joins your journey!".to_owned(),
        });
    }
}
