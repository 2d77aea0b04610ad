#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Chrobry sessions.

mod autopilot;
mod config;
mod transfer;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context as _, Result};
use chrobry_core::Event;
use chrobry_simulation::{Intent, Simulation, SimulationConfig};
use chrobry_world::query;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::autopilot::Autopilot;

/// Runs a Chrobry session without a renderer and reports how it went.
#[derive(Debug, Parser)]
#[command(name = "chrobry", version, about)]
struct Cli {
    /// TOML or JSON session configuration; absent fields keep the regular game's values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Master seed overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Length of a tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,
    /// JSON list of intents replayed in a loop instead of the autopilot.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Transfer string file to resume from.
    #[arg(long)]
    load: Option<PathBuf>,
    /// File receiving the final state as a transfer string.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Logs per-phase diagnostics.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Chrobry command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => config::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.master_seed = seed;
    }

    let mut simulation = match &cli.load {
        Some(path) => {
            let encoded = fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            let snapshot = transfer::decode(&encoded)?;
            Simulation::from_snapshot(&config, &snapshot)
        }
        None => Simulation::new(&config),
    };
    let mut pilot = match &cli.script {
        Some(path) => Autopilot::scripted(read_script(path)?),
        None => Autopilot::default(),
    };

    let dt = Duration::from_millis(cli.step_ms);
    let mut tally = Tally::default();
    for _ in 0..cli.ticks {
        if let Some(control) = pilot.recover(simulation.world()) {
            tally.record(&simulation.control(control));
        }
        let intent = pilot.next(simulation.world());
        tally.record(&simulation.step(&intent, dt));
    }

    print_summary(&simulation, &tally);

    if let Some(path) = &cli.save {
        let encoded = transfer::encode(&simulation.snapshot())?;
        fs::write(path, encoded + "\n")
            .with_context(|| format!("could not write {}", path.display()))?;
        tracing::info!(path = %path.display(), "session saved");
    }
    Ok(())
}

fn install_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_script(path: &Path) -> Result<Vec<Intent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("could not parse {}", path.display()))
}

/// Event counts gathered over a session.
#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    nests: u32,
    megabeasts: u32,
    pickups: u32,
    deaths: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::NestDestroyed { .. } => self.nests += 1,
                Event::MegabeastKilled { .. } => self.megabeasts += 1,
                Event::PickupCollected { .. } => self.pickups += 1,
                Event::PlayerDied { .. } | Event::GameOver => self.deaths += 1,
                _ => {}
            }
        }
    }
}

fn print_summary(simulation: &Simulation, tally: &Tally) {
    let world = simulation.world();
    let player = query::player(world);
    println!(
        "elapsed {:.1}s | level {} | hp {}/{} | lives {} | gold {}",
        query::elapsed(world).as_secs_f32(),
        player.level,
        player.hp,
        player.hp_max,
        player.lives,
        player.gold,
    );
    println!(
        "kills {} | nests {} | megabeasts {} | pickups {} | deaths {}",
        tally.kills, tally.nests, tally.megabeasts, tally.pickups, tally.deaths,
    );
    println!(
        "alive: enemies {} | nests {} | megabeasts {} | pickups {}",
        query::enemy_count(world),
        query::nests(world).count(),
        query::megabeasts(world).count(),
        query::pickups(world).count(),
    );
}
