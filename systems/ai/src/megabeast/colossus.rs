//! Corpse megabeast: slow, with ground slams, projectile rings and minions.

use std::time::Duration;

use chrobry_core::{MegabeastBrain, MegabeastPhase};
use glam::Vec2;

use super::{Plan, Tactics};

const SLAM_TRIGGER: f32 = 140.0;
const SLAM_RADIUS: f32 = 160.0;
const SLAM_TELEGRAPH: Duration = Duration::from_secs(1);
const RING_INTERVAL: Duration = Duration::from_secs(5);
const RING: u16 = 12;
const SUMMON_INTERVAL: Duration = Duration::from_secs(10);
const MINIONS: usize = 3;

pub(crate) struct Colossus;

impl Tactics for Colossus {
    fn chase_factor(&self) -> f32 {
        0.7
    }

    fn arm(&self, brain: &mut MegabeastBrain) {
        brain.volley_cooldown = RING_INTERVAL;
        brain.summon_cooldown = SUMMON_INTERVAL;
    }

    fn engage(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) {
        if brain.volley_cooldown.is_zero() {
            plan.fire_ring(plan.beast.position, RING, false);
            brain.volley_cooldown = RING_INTERVAL;
        }
        if brain.summon_cooldown.is_zero() {
            plan.summon(MINIONS);
            brain.summon_cooldown = SUMMON_INTERVAL;
        }
        if plan.distance() <= SLAM_TRIGGER {
            brain.enter(MegabeastPhase::Preparing);
        }
    }

    fn telegraph_length(&self) -> Duration {
        SLAM_TELEGRAPH
    }

    fn telegraph(&self, brain: &mut MegabeastBrain, _plan: &mut Plan<'_>) -> Vec2 {
        if brain.phase_elapsed >= self.telegraph_length() {
            brain.enter(MegabeastPhase::Attacking);
        }
        Vec2::ZERO
    }

    fn attack(&self, brain: &mut MegabeastBrain, plan: &mut Plan<'_>) -> Vec2 {
        if plan.distance() <= SLAM_RADIUS {
            plan.strike(3.0, 20.0, Duration::from_millis(400), None);
        }
        brain.enter(MegabeastPhase::Recovering);
        Vec2::ZERO
    }

    fn recovery(&self) -> Duration {
        Duration::from_secs(2)
    }
}
