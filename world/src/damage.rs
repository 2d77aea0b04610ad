use std::time::Duration;

use chrobry_core::{
    entities::{
        Impulse, Knockback, ENEMY_KNOCKBACK_FRICTION, HIT_FLASH, PLAYER_RADIUS, POISON_PULSE,
    },
    EnemyId, Event, Faction, PickupId, Poison, ProjectileId, ProjectileTarget, SwingOwner,
    TargetId, TextColor,
};
use glam::Vec2;

use crate::World;

/// Knockback applied when a friendly projectile connects.
const PROJECTILE_KNOCKBACK_DURATION: Duration = Duration::from_millis(250);
/// Knockback applied to the player by hostile projectiles.
const PLAYER_PROJECTILE_KNOCKBACK_DURATION: Duration = Duration::from_millis(150);
/// Venom carried by poisoned projectiles.
const PROJECTILE_VENOM: Poison = Poison::new(Duration::from_secs(3), 2);
/// Distance inside which a forager can eat a pickup.
const BITE_RADIUS: f32 = 25.0;

/// Knockback parameters carried by a hit.
#[derive(Clone, Copy, Debug)]
struct Push {
    source: Vec2,
    strength: f32,
    duration: Duration,
}

impl World {
    pub(crate) fn strike(&mut self, owner: SwingOwner, target: TargetId, out: &mut Vec<Event>) {
        let torus = self.torus;
        let (swing, owner_position) = match owner {
            SwingOwner::Player => (self.player.swing.as_mut(), self.player.position),
            SwingOwner::Companion(id) => match self.companions.get_mut(&id) {
                Some(companion) => (companion.swing.as_mut(), companion.position),
                None => return,
            },
        };
        let Some(swing) = swing else {
            return;
        };
        if !swing.hits.insert(target) {
            return;
        }

        let push = Push {
            source: swing.blade_position(&torus, owner_position),
            strength: swing.knockback,
            duration: swing.knockback_duration,
        };
        let damage = swing.damage;
        self.damage_target(target, damage, Some(push), out);
    }

    pub(crate) fn projectile_hit(
        &mut self,
        id: ProjectileId,
        target: ProjectileTarget,
        out: &mut Vec<Event>,
    ) {
        let Some(projectile) = self.projectiles.get_mut(&id) else {
            return;
        };
        if projectile.ttl.is_zero() {
            return;
        }
        let valid = matches!(
            (projectile.faction, target),
            (Faction::Friendly, ProjectileTarget::Enemy(_))
                | (Faction::Friendly, ProjectileTarget::Megabeast(_))
                | (Faction::Hostile, ProjectileTarget::Player)
        );
        if !valid {
            tracing::debug!(?target, "projectile ignored target of its own side");
            return;
        }
        projectile.ttl = Duration::ZERO;
        let projectile = projectile.clone();

        let push = Push {
            source: self.torus.offset(projectile.position, -projectile.velocity),
            strength: projectile.knockback,
            duration: PROJECTILE_KNOCKBACK_DURATION,
        };
        match target {
            ProjectileTarget::Enemy(enemy) => {
                self.damage_target(TargetId::Enemy(enemy), projectile.damage, Some(push), out);
            }
            ProjectileTarget::Megabeast(megabeast) => self.damage_target(
                TargetId::Megabeast(megabeast),
                projectile.damage,
                Some(push),
                out,
            ),
            ProjectileTarget::Player => {
                let impulse = Impulse::new(
                    projectile.velocity,
                    projectile.knockback,
                    PLAYER_PROJECTILE_KNOCKBACK_DURATION,
                );
                let poison = projectile.poison.then_some(PROJECTILE_VENOM);
                self.strike_player(projectile.damage, Some(impulse), poison, false, out);
            }
        }
    }

    fn damage_target(
        &mut self,
        target: TargetId,
        damage: u32,
        push: Option<Push>,
        out: &mut Vec<Event>,
    ) {
        let torus = self.torus;
        let knockback = |position: Vec2| {
            push.and_then(|push| {
                let direction = torus.delta(push.source, position);
                Knockback::new(
                    Impulse::new(direction, push.strength, push.duration),
                    ENEMY_KNOCKBACK_FRICTION,
                )
            })
        };

        match target {
            TargetId::Enemy(id) => {
                let Some(enemy) = self.enemies.get_mut(&id) else {
                    return;
                };
                enemy.hp = enemy.hp.saturating_sub(damage);
                enemy.hit_flash = HIT_FLASH;
                enemy.knockback = knockback(enemy.position).or(enemy.knockback);
                push_damage_events(target, damage, enemy.position, TextColor::ENEMY_DAMAGE, out);
                if enemy.hp == 0 {
                    self.kill_enemy(id, out);
                }
            }
            TargetId::Nest(id) => {
                let Some(nest) = self.nests.get_mut(&id) else {
                    return;
                };
                nest.hp = nest.hp.saturating_sub(damage);
                push_damage_events(target, damage, nest.position, TextColor::NEST_DAMAGE, out);
                if nest.hp > 0 {
                    return;
                }
                let Some(nest) = self.nests.remove(&id) else {
                    return;
                };
                self.progression.nests_destroyed = self.progression.nests_destroyed.saturating_add(1);
                let destroyed = self
                    .progression
                    .nests_destroyed_by_species
                    .entry(nest.species)
                    .or_insert(0);
                *destroyed = destroyed.saturating_add(1);
                let destroyed = *destroyed;
                tracing::info!(species = %nest.species, destroyed, "nest destroyed");
                out.push(Event::NestDestroyed {
                    nest: id,
                    species: nest.species,
                    position: nest.position,
                    destroyed,
                });
                out.push(Event::Toast {
                    message: format!("{} nest destroyed!", species_name(nest.species)),
                });
            }
            TargetId::Tree(id) => self.chop_tree(id, out),
            TargetId::Megabeast(id) => {
                let Some(beast) = self.megabeasts.get_mut(&id) else {
                    return;
                };
                beast.hp = beast.hp.saturating_sub(damage);
                beast.hit_flash = HIT_FLASH;
                beast.knockback = knockback(beast.position).or(beast.knockback);
                push_damage_events(target, damage, beast.position, TextColor::ENEMY_DAMAGE, out);
                if beast.hp > 0 {
                    return;
                }
                let Some(beast) = self.megabeasts.remove(&id) else {
                    return;
                };
                self.progression.megabeasts_slain =
                    self.progression.megabeasts_slain.saturating_add(1);
                tracing::info!(species = %beast.species, ultra = beast.ultra, "megabeast slain");
                out.push(Event::MegabeastKilled {
                    megabeast: id,
                    species: beast.species,
                    ultra: beast.ultra,
                    position: beast.position,
                });
                out.push(Event::Toast {
                    message: format!("Mega {} slain!", species_name(beast.species)),
                });
            }
        }
    }

    fn kill_enemy(&mut self, id: EnemyId, out: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.remove(&id) else {
            return;
        };
        self.progression.kills = self.progression.kills.saturating_add(1);
        tracing::debug!(enemy = id.get(), species = %enemy.species, "enemy killed");
        out.push(Event::EnemyKilled {
            enemy: id,
            species: enemy.species,
            position: enemy.position,
            summoned: enemy.summoned,
        });
    }

    pub(crate) fn eat_pickup(&mut self, enemy: EnemyId, pickup: PickupId, out: &mut Vec<Event>) {
        let (Some(eater), Some(food)) = (self.enemies.get(&enemy), self.pickups.get(&pickup)) else {
            return;
        };
        if self.torus.distance(eater.position, food.position) > BITE_RADIUS {
            return;
        }
        let _ = self.pickups.remove(&pickup);
        out.push(Event::PickupEaten { enemy, pickup });
    }

    pub(crate) fn pulse_poison(&mut self, out: &mut Vec<Event>) {
        let dt = self.dt;
        let player = &mut self.player;
        let Some(poison) = player.poison.as_mut() else {
            return;
        };

        let mut pulses = 0_u32;
        poison.pulse_elapsed = poison.pulse_elapsed.saturating_add(dt);
        while poison.pulse_elapsed >= POISON_PULSE {
            poison.pulse_elapsed -= POISON_PULSE;
            pulses += 1;
        }
        poison.remaining = poison.remaining.saturating_sub(dt);
        let damage = poison.damage.saturating_mul(pulses);
        if poison.remaining.is_zero() {
            player.poison = None;
        }
        if damage == 0 {
            return;
        }

        player.hp = player.hp.saturating_sub(damage);
        player.hit_flash = HIT_FLASH;
        out.push(Event::PlayerDamaged {
            damage,
            hp: player.hp,
        });
        out.push(Event::FloatingText {
            position: player.position + Vec2::new(0.0, -PLAYER_RADIUS),
            color: TextColor::POISON,
            text: format!("-{damage}"),
        });
    }
}

fn push_damage_events(
    target: TargetId,
    damage: u32,
    position: Vec2,
    color: TextColor,
    out: &mut Vec<Event>,
) {
    out.push(Event::TargetDamaged { target, damage });
    out.push(Event::FloatingText {
        position,
        color,
        text: format!("-{damage}"),
    });
}

fn species_name(species: chrobry_core::SpeciesId) -> &'static str {
    species
        .definition()
        .map_or("Unknown", |definition| definition.name)
}
