use std::time::Duration;

use chrobry_core::{Command, EnemyMode, Event, PickupKind, SpeciesId, SwingOwner, TargetId};
use chrobry_system_combat::{Combat, Config, Loot};
use chrobry_world::{self as world, query, World};
use glam::Vec2;

const TICK: Duration = Duration::from_millis(16);

struct Bench {
    world: World,
    combat: Combat,
    loot: Loot,
    events: Vec<Event>,
}

impl Bench {
    fn new(seed: u64) -> Self {
        Self {
            world: World::new(),
            combat: Combat::new(),
            loot: Loot::new(Config::new(seed)),
            events: Vec::new(),
        }
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut generated = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut generated);
        }
        self.events.extend(generated.iter().cloned());
        generated
    }

    /// One tick of the melee and loot portion of the pass.
    fn tick(&mut self) {
        let _ = self.apply_all(vec![
            Command::Tick { dt: TICK },
            Command::AdvanceTimers,
            Command::AdvanceSwings,
        ]);

        let mut strikes = Vec::new();
        self.combat.resolve_swings(&self.world, &mut strikes);
        let mut generated = self.apply_all(strikes);
        generated.extend(self.apply_all(vec![Command::ExpireSwings]));

        let mut drops = Vec::new();
        self.loot.handle(&self.world, &generated, &mut drops);
        let _ = self.apply_all(drops);
    }

    fn swing_when_ready(&mut self) {
        let player = query::player(&self.world);
        if player.swing.is_none() && player.attack_ready() {
            let _ = self.apply_all(vec![Command::StartSwing {
                owner: SwingOwner::Player,
                start_angle: 0.0,
            }]);
        }
    }
}

#[test]
fn two_swings_kill_a_wolf_and_roll_loot_once() {
    let mut bench = Bench::new(0x5eed);
    let player = query::player(&bench.world).position;
    let _ = bench.apply_all(vec![Command::SpawnEnemy {
        species: SpeciesId::WOLF,
        position: player + Vec2::new(90.0, 0.0),
        mode: EnemyMode::Roam,
        summoned: false,
    }]);

    for _ in 0..80 {
        bench.swing_when_ready();
        bench.tick();
    }

    let hits = bench
        .events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::TargetDamaged {
                    target: TargetId::Enemy(_),
                    damage: 18,
                }
            )
        })
        .count();
    let kills = bench
        .events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    let experience = bench
        .events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::PickupSpawned {
                    kind: PickupKind::Experience,
                    ..
                }
            )
        })
        .count();

    assert_eq!(hits, 2);
    assert_eq!(kills, 1);
    assert_eq!(experience, 1, "exactly one loot roll");
    assert_eq!(query::enemy_count(&bench.world), 0);
    assert_eq!(query::progression(&bench.world).kills, 1);
}

#[test]
fn loot_replays_identically_for_the_same_seed() {
    let run = |seed| {
        let mut bench = Bench::new(seed);
        let mut out = Vec::new();
        let kills: Vec<_> = (0..20)
            .map(|index| Event::EnemyKilled {
                enemy: chrobry_core::EnemyId::new(index),
                species: SpeciesId::ALL[index as usize % 4],
                position: Vec2::new(100.0, 100.0),
                summoned: false,
            })
            .collect();
        bench.loot.handle(&bench.world, &kills, &mut out);
        out
    };

    assert_eq!(run(7), run(7));
    assert_ne!(run(7), run(8));
}
