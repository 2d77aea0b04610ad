//! Input for unattended sessions.
//!
//! A scripted pilot replays a fixed list of intents in a loop. Without a
//! script the pilot wanders in a slow spiral, swings at anything in blade
//! reach and shoots the nearest enemy when mana allows.

use chrobry_core::{entities::RANGED_MANA_COST, heading, Stat};
use chrobry_simulation::{Control, Intent, RangedAim};
use chrobry_world::{query, World};

/// Enemies closer than this are worth a swing.
const MELEE_REACH: f32 = 120.0;
/// Enemies closer than this are worth an arrow.
const RANGED_REACH: f32 = 400.0;
/// Heading change per tick while wandering, in radians.
const TURN_RATE: f32 = 0.004;
/// Stats raised in turn whenever a level-up point is pending.
const UPGRADES: [Stat; 4] = [Stat::Health, Stat::MeleeDamage, Stat::Magnet, Stat::Speed];

#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    script: Vec<Intent>,
    tick: usize,
    upgrades: usize,
}

impl Autopilot {
    pub(crate) fn scripted(script: Vec<Intent>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Intent for the next tick.
    pub(crate) fn next(&mut self, world: &World) -> Intent {
        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);
        if !self.script.is_empty() {
            return self.script[tick % self.script.len()];
        }

        let torus = query::torus(world);
        let player = query::player(world);
        let nearest = query::enemies(world)
            .map(|enemy| (enemy.id, torus.distance(player.position, enemy.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let mut intent = Intent::moving(heading(tick as f32 * TURN_RATE));
        if let Some((enemy, distance)) = nearest {
            if distance < MELEE_REACH {
                intent.melee = true;
            } else if distance < RANGED_REACH && player.mp >= RANGED_MANA_COST {
                intent.ranged = Some(RangedAim::Enemy(enemy));
            }
        }
        intent
    }

    /// Request that gets a paused session going again, if any.
    pub(crate) fn recover(&mut self, world: &World) -> Option<Control> {
        if !query::is_paused(world) {
            return None;
        }
        if query::player(world).level_up_points > 0 {
            let stat = UPGRADES[self.upgrades % UPGRADES.len()];
            self.upgrades += 1;
            return Some(Control::SpendPoint(stat));
        }
        Some(Control::Pause(false))
    }
}

#[cfg(test)]
mod tests {
    use chrobry_core::{Command, EnemyMode, SpeciesId};
    use chrobry_world::apply;
    use glam::Vec2;

    use super::*;

    fn world_with_enemy_at(offset: Vec2) -> World {
        let mut world = World::new();
        let player = query::player(&world).position;
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                species: SpeciesId::WOLF,
                position: player + offset,
                mode: EnemyMode::Roam,
                summoned: false,
            },
            &mut events,
        );
        world
    }

    #[test]
    fn script_is_replayed_in_a_loop() {
        let first = Intent::moving(Vec2::X);
        let second = Intent::moving(Vec2::Y);
        let mut pilot = Autopilot::scripted(vec![first, second]);
        let world = World::new();

        let replay: Vec<_> = (0..3).map(|_| pilot.next(&world)).collect();

        assert_eq!(replay, vec![first, second, first]);
    }

    #[test]
    fn wanderer_swings_at_close_enemies_and_shoots_distant_ones() {
        let mut pilot = Autopilot::default();

        let close = pilot.next(&world_with_enemy_at(Vec2::new(60.0, 0.0)));
        assert!(close.melee);
        assert_eq!(close.ranged, None);

        let far = pilot.next(&world_with_enemy_at(Vec2::new(300.0, 0.0)));
        assert!(!far.melee);
        assert!(matches!(far.ranged, Some(RangedAim::Enemy(_))));
    }

    #[test]
    fn running_session_needs_no_recovery() {
        let mut pilot = Autopilot::default();

        assert_eq!(pilot.recover(&World::new()), None);
    }
}
