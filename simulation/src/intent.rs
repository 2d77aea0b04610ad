//! Player input expressed independently of any device.

use chrobry_core::{CompanionStyle, Consumable, EnemyId, Stat};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    /// Desired movement direction; zero lets the player coast to a stop.
    pub movement: Vec2,
    /// Starts a melee swing when the attack is ready.
    pub melee: bool,
    /// Fires an arrow when the attack is ready and mana allows.
    pub ranged: Option<RangedAim>,
}

impl Intent {
    /// Intent that only moves the player.
    #[must_use]
    pub const fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            melee: false,
            ranged: None,
        }
    }
}

/// Where a ranged attack is aimed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RangedAim {
    /// Along the player's facing.
    Facing,
    /// Toward a point on the map.
    Position(Vec2),
    /// Toward an enemy; falls back to the facing when it is gone.
    Enemy(EnemyId),
}

/// Out-of-tick requests; applied even while the simulation is paused.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Control {
    /// Pauses or resumes the simulation.
    Pause(bool),
    /// Enters or leaves planting mode.
    Planting(bool),
    /// Enters or leaves interaction mode.
    Interaction(bool),
    /// Spends a level-up point.
    SpendPoint(Stat),
    /// Eats or drinks an inventory item.
    Consume(Consumable),
    /// Recruits a companion next to the player.
    SpawnCompanion(CompanionStyle),
    /// Plants a seed at a world position.
    Plant(Vec2),
}
