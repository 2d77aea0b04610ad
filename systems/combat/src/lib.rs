#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure systems that detect hits and roll loot.
//!
//! [`Combat`] inspects the world after movement and proposes `Strike`,
//! `StrikePlayer` and `ProjectileHit` commands. The world applies the damage,
//! enforces swing hit sets and hurt cooldowns, and reports kills as events.
//! [`Loot`] consumes those kill events and answers with pickups and respawns.

mod contact;
mod loot;
mod melee;
mod projectiles;

use chrobry_core::Command;
use chrobry_world::World;

pub use loot::{Config, Loot};

/// Hit detection for swings, body contact and projectiles.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Strike` commands for targets under an active blade.
    pub fn resolve_swings(&mut self, world: &World, out: &mut Vec<Command>) {
        self.scratch.clear();
        melee::resolve(world, &mut self.scratch);
        self.flush(out);
    }

    /// Emits at most one contact attack against the player.
    pub fn resolve_contacts(&mut self, world: &World, out: &mut Vec<Command>) {
        self.scratch.clear();
        contact::resolve(world, &mut self.scratch);
        self.flush(out);
    }

    /// Emits `ProjectileHit` commands for projectiles touching a valid target.
    pub fn resolve_projectiles(&mut self, world: &World, out: &mut Vec<Command>) {
        self.scratch.clear();
        projectiles::resolve(world, &mut self.scratch);
        self.flush(out);
    }

    fn flush(&mut self, out: &mut Vec<Command>) {
        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
