//! Persistence contract for saving and restoring a session.
//!
//! Every record defaults missing fields so that saves written by older builds
//! keep loading. Species and pickup kinds are stored as labels; entries whose
//! label is unknown are dropped by the loader.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    entities::{CompanionStyle, GuardState, Player, Progression, NEST_GUARD_RADIUS},
    items::Inventory,
    torus::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH},
};

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Complete persistent state of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Layout version the snapshot was written with.
    pub version: u32,
    /// Horizontal extent of the map.
    pub width: f32,
    /// Vertical extent of the map.
    pub height: f32,
    /// Simulated time since the session started, in milliseconds.
    pub elapsed_ms: u64,
    /// Pause flag.
    pub paused: bool,
    /// Planting mode flag.
    pub planting: bool,
    /// Interaction mode flag.
    pub interaction: bool,
    /// The player character.
    pub player: PlayerRecord,
    /// Regular enemies.
    pub enemies: Vec<EnemyRecord>,
    /// Live nests.
    pub nests: Vec<NestRecord>,
    /// Pending nest respawns.
    pub nest_respawns: Vec<RespawnRecord>,
    /// Pending enemy respawns.
    pub enemy_respawns: Vec<RespawnRecord>,
    /// Live megabeasts.
    pub megabeasts: Vec<MegabeastRecord>,
    /// Pickups lying on the ground.
    pub pickups: Vec<PickupRecord>,
    /// Companions following the player.
    pub companions: Vec<CompanionRecord>,
    /// Standing trees.
    pub trees: Vec<TreeRecord>,
    /// Lifetime counters.
    pub progression: Progression,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            elapsed_ms: 0,
            paused: false,
            planting: false,
            interaction: false,
            player: PlayerRecord::default(),
            enemies: Vec::new(),
            nests: Vec::new(),
            nest_respawns: Vec::new(),
            enemy_respawns: Vec::new(),
            megabeasts: Vec::new(),
            pickups: Vec::new(),
            companions: Vec::new(),
            trees: Vec::new(),
            progression: Progression::default(),
        }
    }
}

/// Persistent part of the player character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    /// Location on the torus.
    pub position: Vec2,
    /// Unit vector the player last moved along.
    pub facing: Vec2,
    /// Current health.
    pub hp: u32,
    /// Maximum health.
    pub hp_max: u32,
    /// Current mana.
    pub mp: u32,
    /// Maximum mana.
    pub mp_max: u32,
    /// Character level.
    pub level: u32,
    /// Experience toward the next level.
    pub xp: u32,
    /// Gold carried.
    pub gold: u32,
    /// Lives left.
    pub lives: u32,
    /// Movement speed.
    pub speed: f32,
    /// Melee damage.
    pub melee_damage: u32,
    /// Ranged damage.
    pub ranged_damage: u32,
    /// Melee cooldown in milliseconds.
    pub melee_cooldown_ms: u64,
    /// Ranged cooldown in milliseconds.
    pub ranged_cooldown_ms: u64,
    /// Pickup magnet bonus.
    pub magnet_bonus: u32,
    /// Unspent level-up points.
    pub level_up_points: u32,
    /// Goods carried.
    pub inventory: Inventory,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        let player = Player::new(Vec2::new(
            DEFAULT_WORLD_WIDTH * 0.5,
            DEFAULT_WORLD_HEIGHT * 0.5,
        ));
        Self::from(&player)
    }
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        Self {
            position: player.position,
            facing: player.facing,
            hp: player.hp,
            hp_max: player.hp_max,
            mp: player.mp,
            mp_max: player.mp_max,
            level: player.level,
            xp: player.xp,
            gold: player.gold,
            lives: player.lives,
            speed: player.speed,
            melee_damage: player.melee_damage,
            ranged_damage: player.ranged_damage,
            melee_cooldown_ms: duration_ms(player.melee_cooldown),
            ranged_cooldown_ms: duration_ms(player.ranged_cooldown),
            magnet_bonus: player.magnet_bonus,
            level_up_points: player.level_up_points,
            inventory: player.inventory,
        }
    }
}

/// Guard link of a persisted enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardRecord {
    /// Identifier of the protected nest.
    pub nest: u32,
    /// Guard state.
    pub state: GuardState,
    /// Spread or flank angle.
    #[serde(default)]
    pub flank_angle: f32,
}

/// Persisted regular enemy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRecord {
    /// Identifier of the enemy.
    pub id: u32,
    /// Species label.
    pub species: String,
    /// Location on the torus.
    pub position: Vec2,
    /// Current health; zero restores the species default.
    pub hp: u32,
    /// Maximum health; zero restores the species default.
    pub hp_max: u32,
    /// Guard link, absent for free-roamers.
    pub guard: Option<GuardRecord>,
    /// Megabeast minion flag.
    pub summoned: bool,
}

/// Persisted nest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestRecord {
    /// Identifier of the nest.
    pub id: u32,
    /// Species label.
    pub species: String,
    /// Location on the torus.
    pub position: Vec2,
    /// Current health; zero restores the species default.
    pub hp: u32,
    /// Maximum health; zero restores the species default.
    pub hp_max: u32,
    /// Time accumulated toward the next guard spawn.
    pub spawn_elapsed_ms: u64,
    /// Interval between guard spawns.
    pub spawn_interval_ms: u64,
    /// Guard patrol radius.
    pub guard_radius: f32,
}

impl Default for NestRecord {
    fn default() -> Self {
        Self {
            id: 0,
            species: String::new(),
            position: Vec2::ZERO,
            hp: 0,
            hp_max: 0,
            spawn_elapsed_ms: 0,
            spawn_interval_ms: 14_000,
            guard_radius: NEST_GUARD_RADIUS,
        }
    }
}

/// Persisted respawn timer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnRecord {
    /// Species label.
    pub species: String,
    /// Time left in milliseconds.
    pub remaining_ms: u64,
}

/// Persisted megabeast; its brain restarts idle on load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MegabeastRecord {
    /// Identifier of the megabeast.
    pub id: u32,
    /// Species label.
    pub species: String,
    /// Escalated variant.
    pub ultra: bool,
    /// Location on the torus.
    pub position: Vec2,
    /// Current health; zero restores the default.
    pub hp: u32,
    /// Maximum health; zero restores the default.
    pub hp_max: u32,
}

/// Persisted pickup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupRecord {
    /// Identifier of the pickup.
    pub id: u32,
    /// Pickup kind label.
    pub kind: String,
    /// Location on the torus.
    pub position: Vec2,
    /// Amount granted on collection; zero restores the kind's minimum.
    pub value: u32,
}

/// Persisted companion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionRecord {
    /// Identifier of the companion.
    pub id: u32,
    /// Location on the torus.
    pub position: Vec2,
    /// Fighting style.
    pub style: CompanionStyle,
    /// Whether the companion already reached the player.
    pub reached_player: bool,
}

impl Default for CompanionRecord {
    fn default() -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            style: CompanionStyle::Melee,
            reached_player: false,
        }
    }
}

/// Persisted tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeRecord {
    /// Identifier of the tree.
    pub id: u32,
    /// Location on the torus.
    pub position: Vec2,
    /// Chops left; zero restores a sapling's two.
    pub hp: u32,
    /// Chops the tree started with.
    pub hp_max: u32,
    /// Size relative to a standard sprite; zero restores the default.
    pub size: f32,
    /// Time accumulated toward the next apple drop.
    pub drop_elapsed_ms: u64,
}

fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let mut snapshot = Snapshot::default();
        snapshot.enemies.push(EnemyRecord {
            id: 3,
            species: "wolf".to_owned(),
            position: Vec2::new(10.0, 20.0),
            hp: 12,
            hp_max: 30,
            guard: Some(GuardRecord {
                nest: 1,
                state: GuardState::Chasing,
                flank_angle: 0.5,
            }),
            summoned: false,
        });
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: Snapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn default_player_record_matches_fresh_character() {
        let record = PlayerRecord::default();
        assert_eq!(record.hp, 100);
        assert_eq!(record.mp_max, 50);
        assert_eq!(record.lives, 3);
        assert_eq!(record.melee_cooldown_ms, 400);
        assert_eq!(record.position, Vec2::new(3_000.0, 3_000.0));
    }
}
