//! Boar megabeast: winds up by backing off, then charges through the player.

use std::time::Duration;

use chrobry_core::{entities::MEGABEAST_CONTACT_RADIUS, MegabeastBrain, MegabeastPhase};
use glam::Vec2;

use super::{Plan, Tactics};

const CHARGE_RANGE: f32 = 260.0;
const WIND_UP: Duration = Duration::from_secs(1);
const CHARGE_DURATION: Duration = Duration::from_millis(800);
const CHARGE_SPEED: f32 = 3.5;
const BACK_OFF_SPEED: f32 = 0.5;
const SUMMON_INTERVAL: Duration = Duration::from_secs(8);
const MINIONS: usize = 2;

pub(crate) struct Bruiser;

impl Tactics for Bruiser {
    fn chase_factor(&self) -> f32 {
        0.9
    }

    fn arm(&self, brain: &mut MegabeastBrain) {
        brain.summon_cooldown = SUMMON_INTERVAL;
    }

    fn engage(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) {
        if brain.summon_cooldown.is_zero() {
            plan.summon(MINIONS);
            brain.summon_cooldown = SUMMON_INTERVAL;
        }
        if plan.distance() <= CHARGE_RANGE {
            brain.enter(MegabeastPhase::Preparing);
        }
    }

    fn telegraph_length(&self) -> Duration {
        WIND_UP
    }

    fn telegraph(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2 {
        brain.charge_direction = plan.toward_player();
        if brain.phase_elapsed >= self.telegraph_length() {
            brain.charge_speed = plan.species.speed * CHARGE_SPEED;
            brain.enter(MegabeastPhase::Attacking);
            return Vec2::ZERO;
        }
        plan.step(-brain.charge_direction, BACK_OFF_SPEED)
    }

    fn attack(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2 {
        if !brain.struck && plan.distance() <= MEGABEAST_CONTACT_RADIUS {
            plan.strike(3.0, 20.0, Duration::from_millis(400), None);
            brain.struck = true;
        }
        if brain.phase_elapsed >= CHARGE_DURATION {
            brain.enter(MegabeastPhase::Recovering);
            return Vec2::ZERO;
        }
        plan.context.step(brain.charge_direction, brain.charge_speed)
    }

    fn recovery(&self) -> Duration {
        Duration::from_millis(1_500)
    }
}
