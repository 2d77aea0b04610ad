//! Wolf megabeast: quick lunges and a triple spread shot.

use std::time::Duration;

use chrobry_core::{entities::MEGABEAST_CONTACT_RADIUS, MegabeastBrain, MegabeastPhase};
use glam::Vec2;

use super::{Plan, Tactics};

const LUNGE_RANGE: f32 = 220.0;
const LUNGE_TELEGRAPH: Duration = Duration::from_millis(600);
const LUNGE_DURATION: Duration = Duration::from_millis(400);
const LUNGE_SPEED: f32 = 4.0;
const VOLLEY_RANGE: f32 = 400.0;
const VOLLEY_INTERVAL: Duration = Duration::from_secs(4);
const SPREAD: f32 = 0.5;

pub(crate) struct Skirmisher;

impl Tactics for Skirmisher {
    fn chase_factor(&self) -> f32 {
        1.2
    }

    fn arm(&self, brain: &mut MegabeastBrain) {
        brain.volley_cooldown = VOLLEY_INTERVAL;
    }

    fn engage(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) {
        if brain.volley_cooldown.is_zero() && plan.distance() <= VOLLEY_RANGE {
            let aim = plan.to_player.y.atan2(plan.to_player.x);
            plan.fire(
                plan.beast.position,
                [aim - SPREAD, aim, aim + SPREAD],
                false,
            );
            brain.volley_cooldown = VOLLEY_INTERVAL;
        }
        if plan.distance() <= LUNGE_RANGE {
            brain.enter(MegabeastPhase::Preparing);
        }
    }

    fn telegraph_length(&self) -> Duration {
        LUNGE_TELEGRAPH
    }

    fn telegraph(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2 {
        brain.charge_direction = plan.toward_player();
        if brain.phase_elapsed >= self.telegraph_length() {
            brain.charge_speed = plan.species.speed * LUNGE_SPEED;
            brain.enter(MegabeastPhase::Attacking);
        }
        Vec2::ZERO
    }

    fn attack(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2 {
        if !brain.struck && plan.distance() <= MEGABEAST_CONTACT_RADIUS {
            plan.strike(2.0, 12.0, Duration::from_millis(300), None);
            brain.struck = true;
        }
        if brain.phase_elapsed >= LUNGE_DURATION {
            brain.enter(MegabeastPhase::Recovering);
            return Vec2::ZERO;
        }
        plan.context.step(brain.charge_direction, brain.charge_speed)
    }

    fn recovery(&self) -> Duration {
        Duration::from_secs(1)
    }
}

#[cfg(test)]
mod tests {
    use chrobry_core::{Command, SpeciesId};

    use super::super::tests::{beast, brain_after, decide, strikes};
    use super::*;

    #[test]
    fn close_player_triggers_the_lunge_telegraph() {
        let commands = decide(&beast(SpeciesId::WOLF, MegabeastPhase::Chasing, 200.0));

        let brain = brain_after(&commands);
        assert_eq!(brain.phase, MegabeastPhase::Preparing);
        assert_eq!(strikes(&commands), 0);
    }

    #[test]
    fn volley_fires_three_spread_shots() {
        let mut wolf = beast(SpeciesId::WOLF, MegabeastPhase::Chasing, 350.0);
        wolf.brain.volley_cooldown = Duration::ZERO;

        let commands = decide(&wolf);

        let shots = commands
            .iter()
            .filter(|command| matches!(command, Command::FireProjectile { .. }))
            .count();
        assert_eq!(shots, 3);
        assert_eq!(brain_after(&commands).volley_cooldown, VOLLEY_INTERVAL);
    }

    #[test]
    fn lunge_lands_only_once() {
        let mut wolf = beast(SpeciesId::WOLF, MegabeastPhase::Attacking, 30.0);
        wolf.brain.phase_elapsed = Duration::from_millis(100);

        let first = decide(&wolf);
        assert_eq!(strikes(&first), 1);

        wolf.brain = brain_after(&first);
        assert_eq!(strikes(&decide(&wolf)), 0);
    }

    #[test]
    fn lunge_ends_in_recovery() {
        let mut wolf = beast(SpeciesId::WOLF, MegabeastPhase::Attacking, 300.0);
        wolf.brain.phase_elapsed = LUNGE_DURATION;

        assert_eq!(
            brain_after(&decide(&wolf)).phase,
            MegabeastPhase::Recovering
        );
    }
}
