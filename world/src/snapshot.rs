//! Conversion between the live world and its persistent snapshot.

use std::{collections::BTreeMap, time::Duration};

use chrobry_core::{
    snapshot::{
        CompanionRecord, EnemyRecord, GuardRecord, MegabeastRecord, NestRecord, PickupRecord,
        PlayerRecord, RespawnRecord, TreeRecord, SNAPSHOT_VERSION,
    },
    Companion, CompanionId, Enemy, EnemyId, EnemyMode, GuardTether, Megabeast, MegabeastBrain,
    MegabeastId, Nest, NestId, Pickup, PickupId, PickupKind, Player, Respawn, Snapshot,
    SpeciesId, Torus, Tree, TreeId,
};

/// Chops restored for trees saved without health.
const SAPLING_HP: u32 = 2;
/// Size restored for trees saved without one.
const TREE_SIZE: f32 = 2.5;

use crate::World;

pub(crate) fn capture(world: &World) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        width: world.torus.width(),
        height: world.torus.height(),
        elapsed_ms: millis(world.elapsed),
        paused: world.paused,
        planting: world.planting,
        interaction: world.interaction,
        player: PlayerRecord::from(&world.player),
        enemies: world
            .enemies
            .values()
            .map(|enemy| EnemyRecord {
                id: enemy.id.get(),
                species: enemy.species.to_string(),
                position: enemy.position,
                hp: enemy.hp,
                hp_max: enemy.hp_max,
                guard: enemy.mode.tether().map(|tether| GuardRecord {
                    nest: tether.nest.get(),
                    state: tether.state,
                    flank_angle: tether.flank_angle,
                }),
                summoned: enemy.summoned,
            })
            .collect(),
        nests: world
            .nests
            .values()
            .map(|nest| NestRecord {
                id: nest.id.get(),
                species: nest.species.to_string(),
                position: nest.position,
                hp: nest.hp,
                hp_max: nest.hp_max,
                spawn_elapsed_ms: millis(nest.spawn_elapsed),
                spawn_interval_ms: millis(nest.spawn_interval),
                guard_radius: nest.guard_radius,
            })
            .collect(),
        nest_respawns: world.nest_respawns.iter().map(respawn_record).collect(),
        enemy_respawns: world.enemy_respawns.iter().map(respawn_record).collect(),
        megabeasts: world
            .megabeasts
            .values()
            .map(|beast| MegabeastRecord {
                id: beast.id.get(),
                species: beast.species.to_string(),
                ultra: beast.ultra,
                position: beast.position,
                hp: beast.hp,
                hp_max: beast.hp_max,
            })
            .collect(),
        pickups: world
            .pickups
            .values()
            .map(|pickup| PickupRecord {
                id: pickup.id.get(),
                kind: pickup.kind.label().to_owned(),
                position: pickup.position,
                value: pickup.value,
            })
            .collect(),
        companions: world
            .companions
            .values()
            .map(|companion| CompanionRecord {
                id: companion.id.get(),
                position: companion.position,
                style: companion.style,
                reached_player: companion.reached_player,
            })
            .collect(),
        trees: world
            .trees
            .values()
            .map(|tree| TreeRecord {
                id: tree.id.get(),
                position: tree.position,
                hp: tree.hp,
                hp_max: tree.hp_max,
                size: tree.size,
                drop_elapsed_ms: millis(tree.drop_elapsed),
            })
            .collect(),
        progression: world.progression.clone(),
    }
}

impl World {
    /// Rebuilds a world from a snapshot.
    ///
    /// Records naming unknown species or pickup kinds are skipped with a
    /// warning, zeroed stats fall back to their defaults and every position is
    /// wrapped onto the restored map. Projectiles and swings are not persisted,
    /// and megabeasts resume from an idle brain.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        if snapshot.version > SNAPSHOT_VERSION {
            tracing::warn!(
                version = snapshot.version,
                supported = SNAPSHOT_VERSION,
                "loading snapshot written by a newer build"
            );
        }
        let torus = Torus::new(snapshot.width, snapshot.height).unwrap_or_else(|| {
            tracing::warn!(
                width = snapshot.width,
                height = snapshot.height,
                "invalid map size in snapshot, using defaults"
            );
            Torus::default()
        });

        let mut world = World::with_torus(torus);
        world.elapsed = Duration::from_millis(snapshot.elapsed_ms);
        world.paused = snapshot.paused;
        world.planting = snapshot.planting;
        world.interaction = snapshot.interaction;
        world.player = restore_player(&snapshot.player, &torus);
        world.progression = snapshot.progression.clone();

        for record in &snapshot.nests {
            let Some(species) = species_of(&record.species) else {
                continue;
            };
            if world.nests.values().any(|nest| nest.species == species) {
                tracing::warn!(%species, "dropping duplicate nest from snapshot");
                continue;
            }
            let base = species.definition().map_or(1, |definition| definition.hp * 5);
            let hp_max = non_zero(record.hp_max, base);
            let id = NestId::new(record.id);
            let _ = world.nests.insert(
                id,
                Nest {
                    id,
                    species,
                    position: torus.wrap(record.position),
                    hp: non_zero(record.hp, hp_max).min(hp_max),
                    hp_max,
                    spawn_elapsed: Duration::from_millis(record.spawn_elapsed_ms),
                    spawn_interval: Duration::from_millis(record.spawn_interval_ms),
                    guard_radius: record.guard_radius,
                },
            );
        }

        for record in &snapshot.enemies {
            let Some(species) = species_of(&record.species) else {
                continue;
            };
            let base = species.definition().map_or(1, |definition| definition.hp);
            let hp_max = non_zero(record.hp_max, base);
            let mode = match record.guard {
                Some(guard) if world.nests.contains_key(&NestId::new(guard.nest)) => {
                    EnemyMode::Guard(GuardTether {
                        nest: NestId::new(guard.nest),
                        state: guard.state,
                        flank_angle: guard.flank_angle,
                    })
                }
                _ => EnemyMode::Roam,
            };
            let id = EnemyId::new(record.id);
            let _ = world.enemies.insert(
                id,
                Enemy {
                    id,
                    species,
                    position: torus.wrap(record.position),
                    hp: non_zero(record.hp, hp_max).min(hp_max),
                    hp_max,
                    mode,
                    elapsed: Duration::ZERO,
                    knockback: None,
                    hit_flash: Duration::ZERO,
                    summoned: record.summoned,
                },
            );
        }

        world.nest_respawns = restore_respawns(&snapshot.nest_respawns);
        world.enemy_respawns = restore_respawns(&snapshot.enemy_respawns);

        for record in &snapshot.megabeasts {
            let Some(species) = species_of(&record.species) else {
                continue;
            };
            let Some(definition) = species.definition() else {
                continue;
            };
            let base = definition.hp * Megabeast::health_multiplier(record.ultra);
            let hp_max = non_zero(record.hp_max, base);
            let id = MegabeastId::new(record.id);
            let _ = world.megabeasts.insert(
                id,
                Megabeast {
                    id,
                    species,
                    kind: definition.megabeast,
                    ultra: record.ultra,
                    position: torus.wrap(record.position),
                    hp: non_zero(record.hp, hp_max).min(hp_max),
                    hp_max,
                    brain: MegabeastBrain::new(Duration::ZERO, Duration::ZERO),
                    knockback: None,
                    hit_flash: Duration::ZERO,
                },
            );
        }

        for record in &snapshot.pickups {
            let kind = match record.kind.parse::<PickupKind>() {
                Ok(kind) => kind,
                Err(error) => {
                    tracing::warn!(%error, "dropping pickup from snapshot");
                    continue;
                }
            };
            let id = PickupId::new(record.id);
            let _ = world.pickups.insert(
                id,
                Pickup {
                    id,
                    kind,
                    position: torus.wrap(record.position),
                    value: non_zero(record.value, kind.default_value().bounds().0),
                    bounce: None,
                    being_pulled: false,
                },
            );
        }

        for record in &snapshot.companions {
            let id = CompanionId::new(record.id);
            let _ = world.companions.insert(
                id,
                Companion {
                    id,
                    position: torus.wrap(record.position),
                    speed: 2.0,
                    reached_player: record.reached_player,
                    swing: None,
                    style: record.style,
                    fire_cooldown: Duration::ZERO,
                },
            );
        }

        for record in &snapshot.trees {
            let hp_max = non_zero(record.hp_max, SAPLING_HP);
            let id = TreeId::new(record.id);
            let _ = world.trees.insert(
                id,
                Tree {
                    id,
                    position: torus.wrap(record.position),
                    hp: non_zero(record.hp, hp_max).min(hp_max),
                    hp_max,
                    size: if record.size.is_finite() && record.size > 0.0 {
                        record.size
                    } else {
                        TREE_SIZE
                    },
                    drop_elapsed: Duration::from_millis(record.drop_elapsed_ms),
                },
            );
        }

        world.ids.enemy = max_key(&world.enemies, EnemyId::get);
        world.ids.nest = max_key(&world.nests, NestId::get);
        world.ids.megabeast = max_key(&world.megabeasts, MegabeastId::get);
        world.ids.pickup = max_key(&world.pickups, PickupId::get);
        world.ids.companion = max_key(&world.companions, CompanionId::get);
        world.ids.tree = max_key(&world.trees, TreeId::get);
        tracing::info!(
            enemies = world.enemies.len(),
            nests = world.nests.len(),
            pickups = world.pickups.len(),
            trees = world.trees.len(),
            "world restored from snapshot"
        );
        world
    }
}

fn restore_player(record: &PlayerRecord, torus: &Torus) -> Player {
    let mut player = Player::new(torus.wrap(record.position));
    let defaults = player.clone();
    if record.facing.is_finite() && record.facing.length_squared() > 0.0 {
        player.facing = record.facing.normalize();
    }
    player.hp_max = non_zero(record.hp_max, defaults.hp_max);
    player.hp = non_zero(record.hp, player.hp_max).min(player.hp_max);
    player.mp_max = non_zero(record.mp_max, defaults.mp_max);
    player.mp = record.mp.min(player.mp_max);
    player.level = non_zero(record.level, defaults.level);
    player.xp = record.xp;
    player.gold = record.gold;
    player.lives = non_zero(record.lives, defaults.lives);
    if record.speed.is_finite() && record.speed > 0.0 {
        player.speed = record.speed;
    }
    player.melee_damage = non_zero(record.melee_damage, defaults.melee_damage);
    player.ranged_damage = non_zero(record.ranged_damage, defaults.ranged_damage);
    if record.melee_cooldown_ms > 0 {
        player.melee_cooldown = Duration::from_millis(record.melee_cooldown_ms);
    }
    if record.ranged_cooldown_ms > 0 {
        player.ranged_cooldown = Duration::from_millis(record.ranged_cooldown_ms);
    }
    player.magnet_bonus = record.magnet_bonus;
    player.level_up_points = record.level_up_points;
    player.inventory = record.inventory;
    player
}

fn restore_respawns(records: &[RespawnRecord]) -> Vec<Respawn> {
    records
        .iter()
        .filter_map(|record| {
            species_of(&record.species).map(|species| Respawn {
                species,
                remaining: Duration::from_millis(record.remaining_ms),
            })
        })
        .collect()
}

fn respawn_record(respawn: &Respawn) -> RespawnRecord {
    RespawnRecord {
        species: respawn.species.to_string(),
        remaining_ms: millis(respawn.remaining),
    }
}

fn species_of(label: &str) -> Option<SpeciesId> {
    let species = SpeciesId::from_label(label);
    if species.is_none() {
        tracing::warn!(label, "dropping record of unknown species from snapshot");
    }
    species
}

fn non_zero(value: u32, fallback: u32) -> u32 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

fn max_key<K: Copy, V>(map: &BTreeMap<K, V>, get: fn(&K) -> u32) -> u32 {
    map.keys().next_back().map_or(0, get)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use chrobry_core::{Command, Event, GuardState};
    use glam::Vec2;

    use crate::{apply, query, World};

    use super::*;

    #[test]
    fn snapshot_restores_entities_and_identifiers() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnNest {
                species: SpeciesId::WOLF,
                position: Vec2::new(400.0, 400.0),
                spawn_interval: Duration::from_secs(9),
            },
            &mut events,
        );
        let nest = query::nests(&world).next().expect("nest").id;
        apply(
            &mut world,
            Command::SpawnEnemy {
                species: SpeciesId::WOLF,
                position: Vec2::new(420.0, 400.0),
                mode: EnemyMode::Guard(GuardTether {
                    nest,
                    state: GuardState::Flanking,
                    flank_angle: 1.0,
                }),
                summoned: false,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnPickup {
                kind: PickupKind::Gold,
                position: Vec2::new(10.0, 10.0),
                value: 3,
                toss: None,
            },
            &mut events,
        );

        let snapshot = query::snapshot(&world);
        let mut restored = World::from_snapshot(&snapshot);

        assert_eq!(query::snapshot(&restored), snapshot);
        let guard = query::enemies(&restored).next().expect("guard");
        assert_eq!(guard.mode.tether().map(|tether| tether.nest), Some(nest));

        events.clear();
        apply(
            &mut restored,
            Command::SpawnPickup {
                kind: PickupKind::Meat,
                position: Vec2::ZERO,
                value: 20,
                toss: None,
            },
            &mut events,
        );
        assert!(events.contains(&Event::PickupSpawned {
            pickup: PickupId::new(2),
            kind: PickupKind::Meat,
        }));
    }

    #[test]
    fn legacy_json_with_missing_fields_loads() {
        let json = r#"{
            "player": { "hp": 40, "level": 3 },
            "enemies": [
                { "id": 7, "species": "boar", "position": [10.0, 20.0] },
                { "id": 8, "species": "dragon", "position": [0.0, 0.0] }
            ],
            "pickups": [
                { "id": 2, "kind": "xp", "position": [5.0, 5.0] },
                { "id": 3, "kind": "crystal", "position": [5.0, 5.0] }
            ]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).expect("legacy snapshot parses");
        let world = World::from_snapshot(&snapshot);

        let player = query::player(&world);
        assert_eq!(player.hp, 40);
        assert_eq!(player.hp_max, 100);
        assert_eq!(player.level, 3);
        assert_eq!(query::enemy_count(&world), 1);
        let boar = query::enemy(&world, EnemyId::new(7)).expect("boar");
        assert_eq!(boar.hp, 40);
        assert_eq!(query::pickups(&world).count(), 1);
        let xp = query::pickup(&world, PickupId::new(2)).expect("experience");
        assert_eq!(xp.kind, PickupKind::Experience);
        assert_eq!(xp.value, 12);
    }

    #[test]
    fn positions_outside_the_map_are_wrapped() {
        let snapshot = Snapshot {
            width: 100.0,
            height: 100.0,
            player: PlayerRecord {
                position: Vec2::new(-10.0, 250.0),
                ..PlayerRecord::default()
            },
            ..Snapshot::default()
        };
        let world = World::from_snapshot(&snapshot);
        assert_eq!(query::player(&world).position, Vec2::new(90.0, 50.0));
    }

    #[test]
    fn trees_survive_a_round_trip_and_old_records_are_repaired() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnTree {
                position: Vec2::new(700.0, 800.0),
                hp: 3,
                size: 2.6,
            },
            &mut events,
        );
        let mut snapshot = query::snapshot(&world);
        assert_eq!(query::snapshot(&World::from_snapshot(&snapshot)), snapshot);

        snapshot.trees.push(TreeRecord {
            id: 9,
            position: Vec2::new(50.0, 60.0),
            ..TreeRecord::default()
        });
        let mut restored = World::from_snapshot(&snapshot);
        let old = query::tree(&restored, TreeId::new(9)).expect("old tree");
        assert_eq!((old.hp, old.hp_max), (SAPLING_HP, SAPLING_HP));
        assert_eq!(old.size, TREE_SIZE);

        events.clear();
        apply(
            &mut restored,
            Command::SpawnTree {
                position: Vec2::ZERO,
                hp: 2,
                size: 2.5,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TreeSpawned {
                tree: TreeId::new(10),
                planted: false,
            }]
        );
    }
}
