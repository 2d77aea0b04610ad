use chrobry_core::{Command, Faction, Projectile, ProjectileTarget, Torus};
use chrobry_world::{query, World};

/// Centre distance at which a projectile touches a regular body.
const BODY_HIT_RADIUS: f32 = 20.0;
/// Centre distance at which a projectile touches a megabeast.
const MEGABEAST_HIT_RADIUS: f32 = 36.0;

pub(crate) fn resolve(world: &World, out: &mut Vec<Command>) {
    let torus = query::torus(world);
    for projectile in query::projectiles(world) {
        if projectile.ttl.is_zero() {
            continue;
        }
        let target = match projectile.faction {
            Faction::Friendly => friendly_target(world, torus, projectile),
            Faction::Hostile => {
                let player = query::player(world);
                (torus.distance(projectile.position, player.position) < BODY_HIT_RADIUS)
                    .then_some(ProjectileTarget::Player)
            }
        };
        if let Some(target) = target {
            out.push(Command::ProjectileHit {
                projectile: projectile.id,
                target,
            });
        }
    }
}

/// Closest enemy or megabeast touched by a friendly projectile.
fn friendly_target(
    world: &World,
    torus: &Torus,
    projectile: &Projectile,
) -> Option<ProjectileTarget> {
    let enemies = query::enemies(world).map(|enemy| {
        (
            torus.distance(projectile.position, enemy.position),
            BODY_HIT_RADIUS,
            ProjectileTarget::Enemy(enemy.id),
        )
    });
    let megabeasts = query::megabeasts(world).map(|beast| {
        (
            torus.distance(projectile.position, beast.position),
            MEGABEAST_HIT_RADIUS,
            ProjectileTarget::Megabeast(beast.id),
        )
    });
    enemies
        .chain(megabeasts)
        .filter(|(distance, radius, _)| distance < radius)
        .min_by(|(a, ..), (b, ..)| a.total_cmp(b))
        .map(|(.., target)| target)
}
