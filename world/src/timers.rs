use std::time::Duration;

use chrobry_core::{Event, Respawn, SpeciesId};

use crate::World;

impl World {
    /// Advances every countdown owned by the world.
    ///
    /// Due nest spawns, respawns and apple drops are announced through events; lifecycle
    /// collaborators decide where the replacement appears.
    pub(crate) fn advance_timers(&mut self, out: &mut Vec<Event>) {
        let dt = self.dt;
        let step = chrobry_core::frames(dt);
        let torus = self.torus;

        for enemy in self.enemies.values_mut() {
            enemy.elapsed = enemy.elapsed.saturating_add(dt);
            enemy.hit_flash = enemy.hit_flash.saturating_sub(dt);
        }

        for beast in self.megabeasts.values_mut() {
            let brain = &mut beast.brain;
            brain.elapsed = brain.elapsed.saturating_add(dt);
            brain.phase_elapsed = brain.phase_elapsed.saturating_add(dt);
            brain.primary_cooldown = brain.primary_cooldown.saturating_sub(dt);
            brain.volley_cooldown = brain.volley_cooldown.saturating_sub(dt);
            brain.summon_cooldown = brain.summon_cooldown.saturating_sub(dt);
            beast.hit_flash = beast.hit_flash.saturating_sub(dt);
        }

        for nest in self.nests.values_mut() {
            nest.spawn_elapsed = nest.spawn_elapsed.saturating_add(dt);
            if nest.spawn_elapsed >= nest.spawn_interval {
                nest.spawn_elapsed = Duration::ZERO;
                out.push(Event::NestSpawnDue { nest: nest.id });
            }
        }

        for species in drain_due(&mut self.nest_respawns, dt) {
            out.push(Event::NestRespawnDue { species });
        }
        for species in drain_due(&mut self.enemy_respawns, dt) {
            out.push(Event::EnemyRespawnDue { species });
        }

        for pickup in self.pickups.values_mut() {
            pickup.being_pulled = false;
            let Some(bounce) = pickup.bounce.as_mut() else {
                continue;
            };
            match bounce.step(step) {
                Some(displacement) => {
                    let landed = bounce.count > 0;
                    pickup.position = torus.offset(pickup.position, displacement);
                    if landed && bounce.ground.is_none() {
                        bounce.ground = Some(pickup.position.y);
                    }
                }
                None => {
                    if let Some(ground) = bounce.ground {
                        pickup.position.y = ground;
                    }
                    pickup.bounce = None;
                }
            }
        }

        for companion in self.companions.values_mut() {
            companion.fire_cooldown = companion.fire_cooldown.saturating_sub(dt);
        }

        self.advance_trees(out);

        self.pulse_poison(out);
    }
}

/// Counts down respawn timers, removing and returning the ones that are due.
fn drain_due(respawns: &mut Vec<Respawn>, dt: Duration) -> Vec<SpeciesId> {
    let mut due = Vec::new();
    respawns.retain_mut(|respawn| {
        respawn.remaining = respawn.remaining.saturating_sub(dt);
        if respawn.remaining.is_zero() {
            due.push(respawn.species);
            false
        } else {
            true
        }
    });
    due
}

#[cfg(test)]
mod tests {
    use chrobry_core::{Command, PickupKind};
    use glam::Vec2;

    use super::*;
    use crate::{apply, query};

    fn advance(world: &mut World, millis: u64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
        events.clear();
        apply(world, Command::AdvanceTimers, &mut events);
        events
    }

    #[test]
    fn respawn_timers_fire_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ScheduleEnemyRespawn {
                species: SpeciesId::BOAR,
                delay: Duration::from_millis(500),
            },
            &mut events,
        );

        assert!(advance(&mut world, 400).is_empty());
        assert_eq!(
            advance(&mut world, 100),
            vec![Event::EnemyRespawnDue {
                species: SpeciesId::BOAR
            }]
        );
        assert!(query::enemy_respawns(&world).is_empty());
        assert!(advance(&mut world, 1_000).is_empty());
    }

    #[test]
    fn nest_spawn_timer_restarts_after_firing() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnNest {
                species: SpeciesId::WOLF,
                position: Vec2::new(100.0, 100.0),
                spawn_interval: Duration::from_millis(300),
            },
            &mut events,
        );

        assert!(advance(&mut world, 200).is_empty());
        let due = advance(&mut world, 200);
        assert!(matches!(due.as_slice(), [Event::NestSpawnDue { .. }]));
        let nest = query::nests(&world).next().expect("nest");
        assert_eq!(nest.spawn_elapsed, Duration::ZERO);
    }

    #[test]
    fn tossed_pickup_settles_on_its_first_landing_height() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPickup {
                kind: PickupKind::Meat,
                position: Vec2::new(500.0, 500.0),
                value: 20,
                toss: Some(Vec2::new(1.0, -1.0)),
            },
            &mut events,
        );

        for _ in 0..400 {
            let _ = advance(&mut world, 16);
        }

        let pickup = query::pickups(&world).next().expect("pickup");
        assert!(pickup.bounce.is_none());
        assert!(pickup.position.x > 500.0);
    }
}
