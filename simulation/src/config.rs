//! Tunables for a simulation session.

use std::time::Duration;

use chrobry_core::{
    torus::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH},
    Torus, MAX_STEP,
};
use chrobry_system_lifecycle::Population;
use serde::{Deserialize, Serialize};

/// Session parameters; every field falls back to the regular game's value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Horizontal extent of the map.
    pub width: f32,
    /// Vertical extent of the map.
    pub height: f32,
    /// Seed every random stream is derived from.
    pub master_seed: u64,
    /// Largest step integrated per tick, in milliseconds.
    pub max_step_ms: u64,
    /// Population targets and rates.
    pub population: PopulationConfig,
}

impl SimulationConfig {
    /// Map extents, or the default map when the configured size is unusable.
    #[must_use]
    pub fn torus(&self) -> Torus {
        Torus::new(self.width, self.height).unwrap_or_else(|| {
            tracing::warn!(
                width = self.width,
                height = self.height,
                "invalid map size, using the default map"
            );
            Torus::default()
        })
    }

    /// Clamp applied to every tick's delta time.
    #[must_use]
    pub fn max_step(&self) -> Duration {
        match self.max_step_ms {
            0 => MAX_STEP,
            ms => Duration::from_millis(ms),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            master_seed: 0,
            max_step_ms: MAX_STEP.as_millis() as u64,
            population: PopulationConfig::default(),
        }
    }
}

/// Serializable mirror of the lifecycle manager's [`Population`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Free-roamers placed when a world is seeded.
    pub initial_roamers: usize,
    /// Food pickups scattered when a world is seeded.
    pub initial_pickups: usize,
    /// Apple trees grown when a world is seeded.
    pub initial_trees: usize,
    /// Top-ups stop once this many enemies are alive.
    pub roamer_cap: usize,
    /// Seconds between roamer bursts.
    pub burst_interval_secs: u64,
    /// Fewest roamers added by a burst.
    pub burst_min: u32,
    /// Most roamers added by a burst.
    pub burst_max: u32,
    /// Per-tick chance to add a roamer while under the cap.
    pub top_up_chance: f64,
    /// Per-tick chance to drop an ambient food pickup.
    pub ambient_pickup_chance: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        let population = Population::DEFAULT;
        Self {
            initial_roamers: population.initial_roamers,
            initial_pickups: population.initial_pickups,
            initial_trees: population.initial_trees,
            roamer_cap: population.roamer_cap,
            burst_interval_secs: population.burst_interval.as_secs(),
            burst_min: population.burst_size.0,
            burst_max: population.burst_size.1,
            top_up_chance: population.top_up_chance,
            ambient_pickup_chance: population.ambient_pickup_chance,
        }
    }
}

impl From<PopulationConfig> for Population {
    fn from(config: PopulationConfig) -> Self {
        Self {
            initial_roamers: config.initial_roamers,
            initial_pickups: config.initial_pickups,
            initial_trees: config.initial_trees,
            roamer_cap: config.roamer_cap,
            burst_interval: Duration::from_secs(config.burst_interval_secs.max(1)),
            burst_size: (
                config.burst_min.min(config.burst_max),
                config.burst_max.max(config.burst_min),
            ),
            top_up_chance: config.top_up_chance,
            ambient_pickup_chance: config.ambient_pickup_chance,
        }
    }
}
