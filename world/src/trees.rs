use std::time::Duration;

use chrobry_core::{
    entities::APPLE_DROP_INTERVAL, Action, Event, RejectReason, TargetId, TextColor, Tree, TreeId,
};
use glam::Vec2;

use crate::{finite, World};

/// Size used when a tree is requested with a degenerate size.
const DEFAULT_TREE_SIZE: f32 = 2.5;

impl World {
    pub(crate) fn spawn_tree(
        &mut self,
        position: Vec2,
        hp: u32,
        size: f32,
        planted: bool,
        out: &mut Vec<Event>,
    ) {
        let Some(position) = finite(position, "tree position") else {
            return;
        };
        let hp = hp.max(1);
        let size = if size.is_finite() && size > 0.0 {
            size
        } else {
            DEFAULT_TREE_SIZE
        };
        let id = self.ids.tree();
        let _ = self.trees.insert(
            id,
            Tree {
                id,
                position: self.torus.wrap(position),
                hp,
                hp_max: hp,
                size,
                drop_elapsed: Duration::ZERO,
            },
        );
        out.push(Event::TreeSpawned { tree: id, planted });
    }

    pub(crate) fn plant_tree(&mut self, position: Vec2, hp: u32, size: f32, out: &mut Vec<Event>) {
        let reason = if !self.planting {
            Some(RejectReason::PlantingDisabled)
        } else if self.player.inventory.seeds == 0 {
            Some(RejectReason::EmptyInventory)
        } else {
            None
        };
        if let Some(reason) = reason {
            out.push(Event::ActionRejected {
                action: Action::Plant,
                reason,
            });
            return;
        }
        if !position.is_finite() {
            tracing::warn!("ignoring tree planted at a non-finite position");
            return;
        }

        self.player.inventory.seeds -= 1;
        self.progression.trees_planted = self.progression.trees_planted.saturating_add(1);
        tracing::debug!(planted = self.progression.trees_planted, "tree planted");
        self.spawn_tree(position, hp, size, true, out);
        out.push(Event::Toast {
            message: "Tree planted!".to_owned(),
        });
    }

    /// Takes one chop off a tree, whatever the blade's damage.
    pub(crate) fn chop_tree(&mut self, id: TreeId, out: &mut Vec<Event>) {
        let Some(tree) = self.trees.get_mut(&id) else {
            return;
        };
        tree.hp = tree.hp.saturating_sub(1);
        out.push(Event::TargetDamaged {
            target: TargetId::Tree(id),
            damage: 1,
        });
        out.push(Event::FloatingText {
            position: tree.position,
            color: TextColor::NEST_DAMAGE,
            text: "-1".to_owned(),
        });
        if tree.hp > 0 {
            return;
        }
        let Some(tree) = self.trees.remove(&id) else {
            return;
        };
        tracing::debug!(tree = id.get(), "tree felled");
        out.push(Event::TreeFelled {
            tree: id,
            position: tree.position,
        });
    }

    pub(crate) fn advance_trees(&mut self, out: &mut Vec<Event>) {
        let dt = self.dt;
        for tree in self.trees.values_mut() {
            tree.drop_elapsed = tree.drop_elapsed.saturating_add(dt);
            if tree.drop_elapsed >= APPLE_DROP_INTERVAL {
                tree.drop_elapsed = Duration::ZERO;
                out.push(Event::TreeFruited { tree: tree.id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrobry_core::{Command, MeleeSwing, SwingOwner};

    use super::*;
    use crate::{apply, query};

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn grow(world: &mut World, position: Vec2, hp: u32) -> TreeId {
        let events = run(
            world,
            Command::SpawnTree {
                position,
                hp,
                size: 2.4,
            },
        );
        match events.as_slice() {
            [Event::TreeSpawned {
                tree,
                planted: false,
            }] => *tree,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn planting_spends_a_seed_only_in_planting_mode() {
        let mut world = World::new();
        world.player.inventory.seeds = 1;
        let plant = Command::PlantTree {
            position: Vec2::new(400.0, 400.0),
            hp: 3,
            size: 2.5,
        };

        assert_eq!(
            run(&mut world, plant.clone()),
            vec![Event::ActionRejected {
                action: Action::Plant,
                reason: RejectReason::PlantingDisabled,
            }]
        );

        let _ = run(&mut world, Command::SetPlanting { enabled: true });
        let events = run(&mut world, plant.clone());
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TreeSpawned { planted: true, .. })));
        assert_eq!(world.player.inventory.seeds, 0);
        assert_eq!(query::progression(&world).trees_planted, 1);

        assert_eq!(
            run(&mut world, plant),
            vec![Event::ActionRejected {
                action: Action::Plant,
                reason: RejectReason::EmptyInventory,
            }]
        );
        assert_eq!(query::trees(&world).count(), 1);
    }

    #[test]
    fn trees_fruit_every_ten_seconds() {
        let mut world = World::new();
        let tree = grow(&mut world, Vec2::new(100.0, 100.0), 2);

        let mut fruited = 0;
        for _ in 0..500 {
            let _ = run(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
            );
            fruited += run(&mut world, Command::AdvanceTimers)
                .iter()
                .filter(|event| **event == Event::TreeFruited { tree })
                .count();
        }

        assert_eq!(fruited, 2);
    }

    #[test]
    fn each_swing_takes_one_chop() {
        let mut world = World::new();
        let position = world.player.position + Vec2::new(80.0, 0.0);
        let tree = grow(&mut world, position, 2);
        let chop = Command::Strike {
            owner: SwingOwner::Player,
            target: TargetId::Tree(tree),
        };

        world.player.swing = Some(MeleeSwing::for_player(0.0, 40));
        let first = run(&mut world, chop.clone());
        assert!(first.contains(&Event::TargetDamaged {
            target: TargetId::Tree(tree),
            damage: 1,
        }));
        assert!(run(&mut world, chop.clone()).is_empty());
        assert_eq!(query::tree(&world, tree).map(|tree| tree.hp), Some(1));

        world.player.swing = Some(MeleeSwing::for_player(0.0, 40));
        let felled = run(&mut world, chop);
        assert!(felled.contains(&Event::TreeFelled { tree, position }));
        assert!(query::tree(&world, tree).is_none());
    }

    #[test]
    fn degenerate_trees_are_repaired() {
        let mut world = World::new();
        let tree = grow(&mut world, Vec2::new(-10.0, 5.0), 0);

        let tree = query::tree(&world, tree).expect("tree");
        assert_eq!(tree.hp, 1);
        assert_eq!(tree.position, Vec2::new(5_990.0, 5.0));
        assert!(run(
            &mut world,
            Command::SpawnTree {
                position: Vec2::NAN,
                hp: 2,
                size: 2.0,
            }
        )
        .is_empty());
    }
}
