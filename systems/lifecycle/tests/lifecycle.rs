use std::time::Duration;

use chrobry_core::{Command, Event, SpeciesId, SwingOwner, TargetId, Torus};
use chrobry_system_lifecycle::{Config, Lifecycle, Population};
use chrobry_world::{self as world, query, World};
use glam::Vec2;

fn settle(world: &mut World, lifecycle: &mut Lifecycle, commands: Vec<Command>) -> Vec<Event> {
    let mut pending = commands;
    let mut history = Vec::new();
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        lifecycle.handle(world, &events, &mut pending);
        history.extend(events);
    }
    history
}

#[test]
fn configuring_a_world_seeds_it() {
    let mut world = World::new();
    let mut lifecycle = Lifecycle::new(Config::new(42, Population::DEFAULT));

    let _ = settle(
        &mut world,
        &mut lifecycle,
        vec![Command::ConfigureWorld {
            torus: Torus::default(),
        }],
    );

    assert_eq!(query::nests(&world).count(), 4);
    assert_eq!(query::enemy_count(&world), 28);
    assert_eq!(query::pickups(&world).count(), 40);
    assert_eq!(query::trees(&world).count(), 60);
    for species in SpeciesId::ALL {
        assert!(query::nest_of_species(&world, species).is_some());
    }
}

#[test]
fn third_destruction_releases_a_normal_and_an_ultra_megabeast() {
    let mut world = World::new();
    let player = query::player(&world).position;
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnNest {
            species: SpeciesId::CORPSE,
            position: player + Vec2::new(90.0, 0.0),
            spawn_interval: Duration::from_secs(20),
        },
        &mut events,
    );
    let mut snapshot = query::snapshot(&world);
    snapshot.nests[0].hp = 1;
    let _ = snapshot
        .progression
        .nests_destroyed_by_species
        .insert(SpeciesId::CORPSE, 2);
    let mut world = World::from_snapshot(&snapshot);
    let nest = query::nests(&world).next().expect("nest").id;
    let mut lifecycle = Lifecycle::new(Config::new(9, Population::DEFAULT));

    let history = settle(
        &mut world,
        &mut lifecycle,
        vec![
            Command::StartSwing {
                owner: SwingOwner::Player,
                start_angle: 0.0,
            },
            Command::Strike {
                owner: SwingOwner::Player,
                target: TargetId::Nest(nest),
            },
        ],
    );

    assert!(history.iter().any(|event| matches!(
        event,
        Event::NestDestroyed { destroyed: 3, .. }
    )));
    let mut ultras: Vec<_> = query::megabeasts(&world).map(|beast| beast.ultra).collect();
    ultras.sort_unstable();
    assert_eq!(ultras, vec![false, true]);
    assert_eq!(query::nest_respawns(&world).len(), 1);
    assert!(query::nest_of_species(&world, SpeciesId::CORPSE).is_none());
}

#[test]
fn due_nest_respawn_rebuilds_far_from_the_player() {
    let mut world = World::new();
    let player = query::player(&world).position;
    let mut lifecycle = Lifecycle::new(Config::new(5, Population::DEFAULT));

    let _ = settle(
        &mut world,
        &mut lifecycle,
        vec![
            Command::ScheduleNestRespawn {
                species: SpeciesId::VIPER,
                delay: Duration::from_millis(10),
            },
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            Command::AdvanceTimers,
        ],
    );

    let nest = query::nest_of_species(&world, SpeciesId::VIPER).expect("nest rebuilt");
    let distance = query::torus(&world).distance(player, nest.position);
    assert!((799.9..1_500.1).contains(&distance));
}

#[test]
fn seeding_is_deterministic_per_seed() {
    let seeded = |seed| {
        let mut world = World::new();
        let mut lifecycle = Lifecycle::new(Config::new(seed, Population::DEFAULT));
        let _ = settle(
            &mut world,
            &mut lifecycle,
            vec![Command::ConfigureWorld {
                torus: Torus::default(),
            }],
        );
        query::snapshot(&world)
    };

    assert_eq!(seeded(3), seeded(3));
}
