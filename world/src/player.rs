use std::time::Duration;

use chrobry_core::{
    entities::{
        Impulse, Knockback, HIT_FLASH, HURT_COOLDOWN, PLAYER_KNOCKBACK_FRICTION, RANGED_MANA_COST,
    },
    xp_required, Action, CompanionId, Consumable, Event, Faction, MeleeSwing, PickupId,
    PickupKind, Player, Poison, Projectile, ProjectileId, RejectReason, Stat, SwingOwner,
    TextColor,
};
use glam::Vec2;

use crate::{finite, World};

const VELOCITY_DECAY: f32 = 0.9;
const ARROW_SPEED: f32 = 6.0;
const ARROW_TTL: Duration = Duration::from_secs(6);
const ARROW_KNOCKBACK: f32 = 10.0;
const COMPANION_ARROW_SPEED: f32 = 5.0;
const COMPANION_FIRE_COOLDOWN: Duration = Duration::from_millis(400);
const COMPANION_REACH: f32 = 50.0;

impl World {
    pub(crate) fn move_player(&mut self, movement: Vec2) {
        let movement = finite(movement, "player movement").unwrap_or(Vec2::ZERO);
        let torus = self.torus;
        let dt = self.dt;
        let step = chrobry_core::frames(dt);
        let player = &mut self.player;

        if movement.length_squared() > 0.0 {
            let direction = movement.normalize();
            player.velocity = direction * player.speed;
            player.facing = direction;
        } else {
            player.velocity *= VELOCITY_DECAY.powf(step);
        }

        let mut position = player.position + player.velocity * step;
        if let Some(knockback) = player.knockback.as_mut() {
            position += knockback.step(dt);
            if knockback.is_spent() {
                player.knockback = None;
            }
        }
        player.position = torus.wrap(position);
    }

    pub(crate) fn start_swing(
        &mut self,
        owner: SwingOwner,
        start_angle: f32,
        out_events: &mut Vec<Event>,
    ) {
        let start_angle = if start_angle.is_finite() {
            start_angle
        } else {
            0.0
        };

        match owner {
            SwingOwner::Player => {
                let player = &mut self.player;
                if !player.attack_ready() {
                    out_events.push(Event::ActionRejected {
                        action: Action::Melee,
                        reason: RejectReason::Cooldown,
                    });
                    return;
                }
                player.attack_ready_in = player.melee_cooldown;
                player.swing = Some(MeleeSwing::for_player(start_angle, player.melee_damage));
            }
            SwingOwner::Companion(id) => {
                let damage = self.player.level;
                let Some(companion) = self.companions.get_mut(&id) else {
                    return;
                };
                if companion.swing.is_some() {
                    return;
                }
                companion.swing = Some(MeleeSwing::for_companion(id, start_angle, damage));
            }
        }
        out_events.push(Event::SwingStarted { owner });
    }

    pub(crate) fn fire_arrow(&mut self, direction: Vec2, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        if !player.attack_ready() {
            out_events.push(Event::ActionRejected {
                action: Action::Ranged,
                reason: RejectReason::Cooldown,
            });
            return;
        }
        if player.mp < RANGED_MANA_COST {
            out_events.push(Event::ActionRejected {
                action: Action::Ranged,
                reason: RejectReason::InsufficientMana,
            });
            return;
        }

        let direction = finite(direction, "arrow direction")
            .map(Vec2::normalize_or_zero)
            .filter(|direction| *direction != Vec2::ZERO)
            .unwrap_or(player.facing);
        player.mp -= RANGED_MANA_COST;
        player.attack_ready_in = player.ranged_cooldown;

        let projectile = Projectile {
            id: ProjectileId::new(0),
            position: player.position,
            velocity: direction * ARROW_SPEED,
            damage: player.ranged_damage,
            ttl: ARROW_TTL,
            faction: Faction::Friendly,
            poison: false,
            knockback: ARROW_KNOCKBACK,
        };
        self.launch_projectile(projectile, out_events);
    }

    pub(crate) fn launch_projectile(
        &mut self,
        mut projectile: Projectile,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.ids.projectile();
        projectile.id = id;
        let faction = projectile.faction;
        let _ = self.projectiles.insert(id, projectile);
        out_events.push(Event::ProjectileFired {
            projectile: id,
            faction,
        });
    }

    pub(crate) fn strike_player(
        &mut self,
        damage: u32,
        impulse: Option<Impulse>,
        poison: Option<Poison>,
        contact: bool,
        out_events: &mut Vec<Event>,
    ) {
        let player = &mut self.player;
        if contact && !player.hurt_cooldown.is_zero() {
            return;
        }
        if contact {
            player.hurt_cooldown = HURT_COOLDOWN;
        }

        player.hp = player.hp.saturating_sub(damage);
        player.hit_flash = HIT_FLASH;
        if let Some(impulse) = impulse {
            player.knockback = Knockback::new(impulse, PLAYER_KNOCKBACK_FRICTION);
        }
        if let Some(poison) = poison {
            // Refreshing keeps the running pulse phase.
            let pulse_elapsed = player
                .poison
                .map_or(Duration::ZERO, |active| active.pulse_elapsed);
            player.poison = Some(Poison {
                pulse_elapsed,
                ..poison
            });
        }

        out_events.push(Event::PlayerDamaged {
            damage,
            hp: player.hp,
        });
        out_events.push(Event::FloatingText {
            position: player.position,
            color: TextColor::PLAYER_DAMAGE,
            text: format!("-{damage}"),
        });
    }

    pub(crate) fn collect_pickup(&mut self, id: PickupId, out_events: &mut Vec<Event>) {
        let Some(pickup) = self.pickups.remove(&id) else {
            return;
        };

        let inventory = &mut self.player.inventory;
        match pickup.kind {
            PickupKind::Meat => inventory.meat = inventory.meat.saturating_add(1),
            PickupKind::Mead => inventory.mead = inventory.mead.saturating_add(1),
            PickupKind::Apple => inventory.apples = inventory.apples.saturating_add(1),
            PickupKind::Seed => inventory.seeds = inventory.seeds.saturating_add(1),
            PickupKind::Wood => inventory.wood = inventory.wood.saturating_add(1),
            PickupKind::Gold => self.player.gold = self.player.gold.saturating_add(pickup.value),
            PickupKind::Experience => {}
        }
        let collected = self
            .progression
            .items_collected
            .entry(pickup.kind)
            .or_insert(0);
        *collected = collected.saturating_add(1);

        out_events.push(Event::PickupCollected {
            pickup: id,
            kind: pickup.kind,
            value: pickup.value,
        });
        out_events.push(Event::FloatingText {
            position: pickup.position,
            color: TextColor::RESTORE,
            text: format!("+{} {}", pickup.value, pickup.kind),
        });

        if pickup.kind == PickupKind::Experience {
            self.gain_experience(pickup.value, out_events);
        }
    }

    fn gain_experience(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        player.xp = player.xp.saturating_add(amount);
        if player.xp < xp_required(player.level) {
            return;
        }

        player.level = player.level.saturating_add(1);
        player.xp = 0;
        player.lives = player.lives.saturating_add(1);
        player.level_up_points = player.level_up_points.saturating_add(1);
        let level = player.level;
        self.progression.max_level = self.progression.max_level.max(level);
        tracing::info!(level, "player levelled up");

        out_events.push(Event::LevelUp { level });
        out_events.push(Event::Toast {
            message: format!("Level up! You reached level {level}."),
        });
        if !self.paused {
            self.paused = true;
            out_events.push(Event::PauseChanged { paused: true });
        }
    }

    pub(crate) fn resolve_player_death(&mut self, out_events: &mut Vec<Event>) {
        if self.player.hp > 0 {
            return;
        }

        let lives = self.player.lives.saturating_sub(1);
        let centre = self.torus.center();
        if lives > 0 {
            let player = &mut self.player;
            player.lives = lives;
            player.hp = player.hp_max;
            player.mp = player.mp_max;
            player.position = centre;
            player.velocity = Vec2::ZERO;
            player.knockback = None;
            player.swing = None;
            player.poison = None;
            player.hurt_cooldown = Duration::ZERO;
            self.enemies.clear();
            self.pickups.clear();
            self.projectiles.clear();
            self.companions.clear();
            self.megabeasts.clear();
            tracing::info!(lives, "player lost a life");
            out_events.push(Event::PlayerDied { lives });
            out_events.push(Event::Toast {
                message: format!("You died! {lives} lives left."),
            });
        } else {
            self.player = Player::new(centre);
            self.enemies.clear();
            self.nests.clear();
            self.megabeasts.clear();
            self.pickups.clear();
            self.projectiles.clear();
            self.companions.clear();
            self.trees.clear();
            self.nest_respawns.clear();
            self.enemy_respawns.clear();
            self.planting = false;
            self.interaction = false;
            tracing::info!("game over");
            out_events.push(Event::GameOver);
            out_events.push(Event::Toast {
                message: "Game over! The world starts anew.".to_owned(),
            });
        }

        if !self.paused {
            self.paused = true;
            out_events.push(Event::PauseChanged { paused: true });
        }
    }

    pub(crate) fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        if !paused && self.player.level_up_points > 0 {
            out_events.push(Event::ActionRejected {
                action: Action::Resume,
                reason: RejectReason::LevelUpPending,
            });
            return;
        }
        if self.paused != paused {
            self.paused = paused;
            out_events.push(Event::PauseChanged { paused });
        }
    }

    pub(crate) fn set_planting(&mut self, enabled: bool, out_events: &mut Vec<Event>) {
        if enabled && self.player.inventory.seeds == 0 {
            out_events.push(Event::ActionRejected {
                action: Action::Planting,
                reason: RejectReason::EmptyInventory,
            });
            return;
        }
        if self.planting != enabled {
            self.planting = enabled;
            out_events.push(Event::PlantingChanged { enabled });
        }
    }

    pub(crate) fn spend_level_up_point(&mut self, stat: Stat, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        if player.level_up_points == 0 {
            out_events.push(Event::ActionRejected {
                action: Action::SpendPoint,
                reason: RejectReason::NoLevelUpPoints,
            });
            return;
        }
        player.upgrade(stat);
        player.level_up_points -= 1;
        out_events.push(Event::StatUpgraded { stat });

        if player.level_up_points == 0 && self.paused {
            self.paused = false;
            out_events.push(Event::PauseChanged { paused: false });
        }
    }

    pub(crate) fn consume_item(
        &mut self,
        item: Consumable,
        restore: u32,
        seed_found: bool,
        out_events: &mut Vec<Event>,
    ) {
        let player = &mut self.player;
        let slot = player.inventory.slot_mut(item);
        if *slot == 0 {
            out_events.push(Event::ActionRejected {
                action: Action::Consume,
                reason: RejectReason::EmptyInventory,
            });
            return;
        }
        *slot -= 1;

        let restored = match item {
            Consumable::Apple | Consumable::Meat => {
                let before = player.hp;
                player.hp = player.hp.saturating_add(restore).min(player.hp_max);
                player.hp - before
            }
            Consumable::Mead => {
                let before = player.mp;
                player.mp = player.mp.saturating_add(restore).min(player.mp_max);
                player.mp - before
            }
        };
        if item == Consumable::Apple && seed_found {
            player.inventory.seeds = player.inventory.seeds.saturating_add(1);
            out_events.push(Event::Toast {
                message: "You found a seed!".to_owned(),
            });
        }

        out_events.push(Event::ItemConsumed { item, restored });
        out_events.push(Event::FloatingText {
            position: player.position,
            color: TextColor::RESTORE,
            text: format!("+{restored}"),
        });
    }

    pub(crate) fn move_companion(&mut self, id: CompanionId, displacement: Vec2) {
        let Some(displacement) = finite(displacement, "companion displacement") else {
            return;
        };
        let torus = self.torus;
        let target = self.player.position;
        if let Some(companion) = self.companions.get_mut(&id) {
            companion.position = torus.offset(companion.position, displacement);
            if torus.distance(companion.position, target) < COMPANION_REACH {
                companion.reached_player = true;
            }
        }
    }

    pub(crate) fn companion_fire(
        &mut self,
        id: CompanionId,
        direction: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let Some(direction) = finite(direction, "companion aim").map(Vec2::normalize_or_zero)
        else {
            return;
        };
        if direction == Vec2::ZERO {
            return;
        }
        let damage = self.player.level;
        let Some(companion) = self.companions.get_mut(&id) else {
            return;
        };
        if !companion.fire_cooldown.is_zero() {
            return;
        }
        companion.fire_cooldown = COMPANION_FIRE_COOLDOWN;

        let projectile = Projectile {
            id: ProjectileId::new(0),
            position: companion.position,
            velocity: direction * COMPANION_ARROW_SPEED,
            damage,
            ttl: ARROW_TTL,
            faction: Faction::Friendly,
            poison: false,
            knockback: ARROW_KNOCKBACK,
        };
        self.launch_projectile(projectile, out_events);
    }
}
