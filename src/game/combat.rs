//! Projectiles fired by attacking enemies

use glam::Vec2;
use hecs::{Entity, World};

use crate::core::{EventQueue, GameEvent};
use crate::ecs::{Actor, Name, Player, Projectile};
use crate::map::Map;
use crate::physics::Rect;

/// Spawn a projectile and announce it
pub fn spawn_projectile(
    world: &mut World,
    events: &mut EventQueue,
    shooter: Entity,
    origin: Vec2,
    velocity: Vec2,
    radius: f32,
) -> Entity {
    let entity = world.spawn((
        Projectile {
            position: origin,
            velocity,
            radius,
        },
        Name::new("Projectile"),
    ));
    log::debug!("{shooter:?} fired from {origin} with velocity {velocity}");
    events.push(GameEvent::ProjectileFired {
        shooter,
        origin,
        velocity,
    });
    entity
}

/// Move projectiles and resolve what they hit.
///
/// A projectile overlapping the player's circle counts as a hit on the
/// player. One whose footprint touches a barrier, or leaves the map, is
/// destroyed. Either way it is despawned.
pub fn projectile_system(
    world: &mut World,
    events: &mut EventQueue,
    map: &Map,
    player: Option<Entity>,
    dt: f32,
) {
    let target = player.and_then(|p| world.get::<&Actor>(p).ok().map(|actor| actor.circle()));
    let bounds = map.grid().bounds();

    let mut spent = Vec::new();
    let mut hits = 0;
    for (entity, projectile) in world.query_mut::<&mut Projectile>() {
        projectile.position += projectile.velocity * dt;
        let position = projectile.position;

        if target.is_some_and(|circle| projectile.circle().overlaps(&circle)) {
            log::debug!("Player hit by {entity:?} at {position}");
            events.push(GameEvent::PlayerHit {
                damage_source: entity,
                position,
            });
            hits += 1;
            spent.push(entity);
        } else {
            let diameter = projectile.radius * 2.0;
            let footprint = Rect::from_center(position, diameter, diameter);
            if footprint.is_inside(&bounds)
                && !map.collides_with_barrier(position, diameter, diameter)
            {
                continue;
            }
            events.push(GameEvent::ProjectileDestroyed { entity, position });
            spent.push(entity);
        }
    }

    for entity in spent {
        if let Err(err) = world.despawn(entity) {
            log::trace!("Projectile {entity:?} already gone: {err}");
        }
    }

    if hits > 0
        && let Some(player) = player
        && let Ok(mut stats) = world.get::<&mut Player>(player)
    {
        stats.hits += hits;
    }
}
