//! Viper megabeast: venomous bites and an ambush from behind the player.

use std::time::Duration;

use chrobry_core::{entities::MEGABEAST_CONTACT_RADIUS, MegabeastBrain, MegabeastPhase};
use glam::Vec2;

use super::{Plan, Tactics, VENOM};

const BITE_COOLDOWN: Duration = Duration::from_millis(2_500);
const AMBUSH_INTERVAL: Duration = Duration::from_secs(6);
const AMBUSH_TELEGRAPH: Duration = Duration::from_millis(800);
/// Distance behind the player the stalker reappears at.
const AMBUSH_OFFSET: f32 = 120.0;
const RING: u16 = 8;

pub(crate) struct Stalker;

impl Tactics for Stalker {
    fn chase_factor(&self) -> f32 {
        1.8
    }

    fn arm(&self, brain: &mut MegabeastBrain) {
        brain.volley_cooldown = AMBUSH_INTERVAL;
    }

    fn engage(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) {
        if brain.primary_cooldown.is_zero() && plan.distance() <= MEGABEAST_CONTACT_RADIUS {
            plan.strike(1.5, 6.0, Duration::from_millis(200), Some(VENOM));
            brain.primary_cooldown = BITE_COOLDOWN;
        }
        if brain.volley_cooldown.is_zero() {
            brain.volley_cooldown = AMBUSH_INTERVAL;
            brain.enter(MegabeastPhase::Preparing);
        }
    }

    fn telegraph_length(&self) -> Duration {
        AMBUSH_TELEGRAPH
    }

    fn telegraph(&self, brain: &mut MegabeastBrain, _plan: &mut Plan<'_>) -> Vec2 {
        if brain.phase_elapsed >= self.telegraph_length() {
            brain.enter(MegabeastPhase::Attacking);
        }
        Vec2::ZERO
    }

    fn attack(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2 {
        let behind = plan
            .context
            .torus
            .offset(plan.context.player, -plan.context.facing * AMBUSH_OFFSET);
        plan.teleport(behind);
        plan.fire_ring(behind, RING, true);
        brain.enter(MegabeastPhase::Recovering);
        Vec2::ZERO
    }

    fn recovery(&self) -> Duration {
        Duration::from_millis(800)
    }
}

#[cfg(test)]
mod tests {
    use chrobry_core::{Command, SpeciesId};

    use super::super::tests::{beast, brain_after, decide, strikes};
    use super::*;

    #[test]
    fn bite_poisons_and_starts_its_cooldown() {
        let mut viper = beast(SpeciesId::VIPER, MegabeastPhase::Chasing, 40.0);
        viper.brain.primary_cooldown = Duration::ZERO;

        let commands = decide(&viper);

        let bite = commands.iter().find_map(|command| match command {
            Command::StrikePlayer {
                damage,
                poison,
                contact,
                ..
            } => Some((*damage, *poison, *contact)),
            _ => None,
        });
        assert_eq!(bite, Some((9, Some(VENOM), false)));
        assert_eq!(brain_after(&commands).primary_cooldown, BITE_COOLDOWN);
    }

    #[test]
    fn bite_waits_for_its_cooldown() {
        let mut viper = beast(SpeciesId::VIPER, MegabeastPhase::Chasing, 40.0);
        viper.brain.primary_cooldown = Duration::from_secs(1);

        assert_eq!(strikes(&decide(&viper)), 0);
    }

    #[test]
    fn ambush_teleports_behind_the_player_and_fires_a_poison_ring() {
        let viper = beast(SpeciesId::VIPER, MegabeastPhase::Attacking, 300.0);

        let commands = decide(&viper);

        let destination = commands.iter().find_map(|command| match command {
            Command::TeleportMegabeast { position, .. } => Some(*position),
            _ => None,
        });
        assert_eq!(destination, Some(Vec2::new(880.0, 1_000.0)));
        let ring = commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    Command::FireProjectile {
                        poison: true,
                        origin,
                        ..
                    } if *origin == Vec2::new(880.0, 1_000.0)
                )
            })
            .count();
        assert_eq!(ring, 8);
        assert_eq!(
            brain_after(&commands).phase,
            MegabeastPhase::Recovering
        );
    }
}
