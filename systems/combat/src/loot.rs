//! Loot rolls reacting to kills and felled trees.

use std::{f32::consts::TAU, time::Duration};

use chrobry_core::{rng, Command, DropValue, Event, PickupKind, SpeciesDefinition, SpeciesId};
use chrobry_world::{query, World};
use glam::Vec2;
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng,
};
use rand_chacha::ChaCha8Rng;

/// Delay before a killed free-roamer is replaced.
const ENEMY_RESPAWN_DELAY: Duration = Duration::from_millis(500);
/// Experience granted when a table unexpectedly rolls none.
const FALLBACK_EXPERIENCE: DropValue = DropValue::Range(10, 20);
const NEST_BUNDLE: usize = 10;
/// Chance per player level of one extra item from a destroyed nest.
const NEST_BONUS_CHANCE: f64 = 0.1;
/// Wood pickups left by a felled tree.
const WOOD_PER_TREE: usize = 2;
const NEST_BUNDLE_KINDS: [PickupKind; 5] = [
    PickupKind::Meat,
    PickupKind::Apple,
    PickupKind::Mead,
    PickupKind::Gold,
    PickupKind::Seed,
];

/// Configuration parameters required to construct the loot system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    master_seed: u64,
}

impl Config {
    /// Creates a new configuration deriving the loot stream from `master_seed`.
    #[must_use]
    pub const fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }
}

/// Reactive system that turns kill events into pickups and respawns.
#[derive(Debug)]
pub struct Loot {
    rng: ChaCha8Rng,
}

impl Loot {
    /// Creates a loot system seeded from the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: rng::stream(config.master_seed, rng::RNG_STREAM_LOOT),
        }
    }

    /// Consumes kill events and emits the resulting drops.
    pub fn handle(&mut self, world: &World, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match *event {
                Event::EnemyKilled {
                    species,
                    position,
                    summoned,
                    ..
                } => {
                    self.enemy_drops(species, position, out);
                    if !summoned {
                        out.push(Command::ScheduleEnemyRespawn {
                            species,
                            delay: ENEMY_RESPAWN_DELAY,
                        });
                    }
                }
                Event::NestDestroyed { position, .. } => {
                    let level = query::player(world).level;
                    self.nest_bundle(position, level, out);
                }
                Event::MegabeastKilled {
                    position, ultra, ..
                } => self.megabeast_bundle(position, ultra, out),
                Event::TreeFelled { position, .. } => self.timber(position, out),
                _ => {}
            }
        }
    }

    fn enemy_drops(&mut self, species: SpeciesId, position: Vec2, out: &mut Vec<Command>) {
        let Some(definition) = species.definition() else {
            tracing::warn!(%species, "no drop table for species");
            return;
        };
        let drops = roll_drops(definition, &mut self.rng);
        tracing::debug!(%species, count = drops.len(), "rolled loot");
        let count = drops.len();
        for (index, (kind, value)) in drops.into_iter().enumerate() {
            let angle = index as f32 / count as f32 * TAU;
            let toss = Vec2::new(
                angle.cos() * 0.8 + self.rng.gen_range(-0.2..=0.2),
                angle.sin() * 0.8 - 0.5,
            );
            out.push(Command::SpawnPickup {
                kind,
                position,
                value,
                toss: Some(toss),
            });
        }
    }

    fn nest_bundle(&mut self, position: Vec2, level: u32, out: &mut Vec<Command>) {
        let bonus = (0..level)
            .filter(|_| self.rng.gen_bool(NEST_BONUS_CHANCE))
            .count();
        if bonus > 0 {
            tracing::info!(bonus, "nest dropped bonus loot");
        }
        for _ in 0..NEST_BUNDLE + bonus {
            let kind = NEST_BUNDLE_KINDS[self.rng.gen_range(0..NEST_BUNDLE_KINDS.len())];
            let toss = Vec2::new(self.rng.gen_range(-0.8..=0.8), -0.5);
            out.push(Command::SpawnPickup {
                kind,
                position,
                value: kind.default_value().roll(&mut self.rng),
                toss: Some(toss),
            });
        }
    }

    fn timber(&mut self, position: Vec2, out: &mut Vec<Command>) {
        for _ in 0..WOOD_PER_TREE {
            let toss = Vec2::new(self.rng.gen_range(-0.8..=0.8), -0.5);
            out.push(Command::SpawnPickup {
                kind: PickupKind::Wood,
                position,
                value: PickupKind::Wood.default_value().roll(&mut self.rng),
                toss: Some(toss),
            });
        }
    }

    fn megabeast_bundle(&mut self, position: Vec2, ultra: bool, out: &mut Vec<Command>) {
        let scale = if ultra { 2 } else { 1 };
        let mut bundle = vec![(PickupKind::Experience, 60 * scale)];
        for kind in [PickupKind::Gold, PickupKind::Gold, PickupKind::Meat, PickupKind::Mead] {
            for _ in 0..scale {
                bundle.push((kind, kind.default_value().roll(&mut self.rng)));
            }
        }
        let count = bundle.len();
        for (index, (kind, value)) in bundle.into_iter().enumerate() {
            let angle = index as f32 / count as f32 * TAU;
            out.push(Command::SpawnPickup {
                kind,
                position,
                value,
                toss: Some(Vec2::new(angle.cos(), angle.sin() * 0.8 - 0.5)),
            });
        }
    }
}

/// Rolls a species' drop table into `(kind, value)` pairs.
///
/// Experience always comes first. The remaining rolled items are shuffled and
/// truncated so the total matches the rolled drop count; when too few items
/// were rolled the shortfall is filled by weighted picks from the
/// non-experience rules.
pub(crate) fn roll_drops<R: Rng + ?Sized>(
    species: &SpeciesDefinition,
    rng: &mut R,
) -> Vec<(PickupKind, u32)> {
    let (min, max) = species.drop_count;
    let count = rng.gen_range(min.min(max)..=max.max(min)).max(1) as usize;

    let mut experience = None;
    let mut others = Vec::new();
    for rule in species.drops {
        if rng.gen::<f32>() >= rule.chance {
            continue;
        }
        let value = rule.value.roll(rng);
        if rule.kind == PickupKind::Experience {
            experience = Some(value);
        } else {
            others.push((rule.kind, value));
        }
    }
    let experience = experience.unwrap_or_else(|| FALLBACK_EXPERIENCE.roll(rng));

    others.shuffle(rng);
    others.truncate(count - 1);

    let secondary: Vec<_> = species.secondary_drops().collect();
    if let Ok(weights) = WeightedIndex::new(secondary.iter().map(|rule| rule.chance)) {
        while others.len() < count - 1 {
            let rule = secondary[weights.sample(rng)];
            others.push((rule.kind, rule.value.roll(rng)));
        }
    }

    let mut drops = Vec::with_capacity(count);
    drops.push((PickupKind::Experience, experience));
    drops.extend(others);
    drops
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn drop_counts_stay_within_species_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for species in SpeciesId::ALL {
            let definition = species.definition().expect("known species");
            let (min, max) = definition.drop_count;
            for _ in 0..200 {
                let drops = roll_drops(definition, &mut rng);
                let count = drops.len() as u32;
                assert!((min..=max).contains(&count), "{species}: {count}");
                assert_eq!(drops[0].0, PickupKind::Experience);
                assert_eq!(
                    drops
                        .iter()
                        .filter(|(kind, _)| *kind == PickupKind::Experience)
                        .count(),
                    1
                );
            }
        }
    }

    #[test]
    fn summoned_kills_do_not_respawn() {
        let world = World::new();
        let mut loot = Loot::new(Config::new(1));
        let mut out = Vec::new();
        let kill = |summoned| Event::EnemyKilled {
            enemy: chrobry_core::EnemyId::new(4),
            species: SpeciesId::BOAR,
            position: Vec2::new(10.0, 10.0),
            summoned,
        };

        loot.handle(&world, &[kill(true)], &mut out);
        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::ScheduleEnemyRespawn { .. })));

        out.clear();
        loot.handle(&world, &[kill(false)], &mut out);
        assert!(out.iter().any(|command| matches!(
            command,
            Command::ScheduleEnemyRespawn {
                species: SpeciesId::BOAR,
                delay,
            } if *delay == ENEMY_RESPAWN_DELAY
        )));
    }

    #[test]
    fn nest_bundle_scales_with_player_level() {
        let mut loot = Loot::new(Config::new(3));
        for level in [1, 10, 40] {
            let mut out = Vec::new();
            loot.nest_bundle(Vec2::ZERO, level, &mut out);
            assert!((NEST_BUNDLE..=NEST_BUNDLE + level as usize).contains(&out.len()));
            assert!(out.iter().all(|command| matches!(
                command,
                Command::SpawnPickup { kind, .. } if NEST_BUNDLE_KINDS.contains(kind)
            )));
        }
    }

    #[test]
    fn ultra_megabeast_bundle_is_larger() {
        let mut loot = Loot::new(Config::new(3));
        let mut normal = Vec::new();
        let mut ultra = Vec::new();

        loot.megabeast_bundle(Vec2::ZERO, false, &mut normal);
        loot.megabeast_bundle(Vec2::ZERO, true, &mut ultra);

        assert_eq!(normal.len(), 5);
        assert_eq!(ultra.len(), 9);
    }

    #[test]
    fn felled_tree_leaves_wood() {
        let world = World::new();
        let mut loot = Loot::new(Config::new(8));
        let mut out = Vec::new();

        loot.handle(
            &world,
            &[Event::TreeFelled {
                tree: chrobry_core::TreeId::new(1),
                position: Vec2::new(40.0, 40.0),
            }],
            &mut out,
        );

        assert_eq!(out.len(), WOOD_PER_TREE);
        assert!(out.iter().all(|command| matches!(
            command,
            Command::SpawnPickup {
                kind: PickupKind::Wood,
                value: 1,
                toss: Some(_),
                ..
            }
        )));
    }
}
