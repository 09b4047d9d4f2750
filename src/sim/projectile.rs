//! Player-fired projectiles
//!
//! Rounds fly along the craft heading at a fixed speed, destroy the first live
//! obstacle they pass within range of, and despawn once they leave the track.

use super::state::{
    Craft, DestroyCause, GameEvent, Obstacle, Projectile, RacePhase, SimContext, Track,
};
use crate::consts::*;
use crate::{heading_forward, planar_distance};

/// Build a projectile at the craft's muzzle, flying along its heading
pub fn spawn_projectile(id: u32, craft: &Craft) -> Projectile {
    let forward = heading_forward(craft.heading);
    let muzzle = forward * PROJECTILE_MUZZLE_DISTANCE;
    Projectile {
        id,
        pos: craft.pos + muzzle.extend(PROJECTILE_MUZZLE_HEIGHT),
        vel: forward * PROJECTILE_SPEED,
    }
}

/// Fire from the player craft. Only allowed while racing and not crashed.
///
/// Returns the new projectile's ID.
pub fn fire(ctx: &mut SimContext) -> Option<u32> {
    if ctx.phase != RacePhase::Racing || ctx.player().crashed {
        return None;
    }
    let id = ctx.next_entity_id();
    let projectile = spawn_projectile(id, ctx.player());
    ctx.projectiles.push(projectile);
    ctx.emit(GameEvent::ProjectileFired { id });
    Some(id)
}

#[inline]
fn in_flight_range(projectile: &Projectile, track: &Track) -> bool {
    projectile.pos.y > 0.0 && projectile.pos.y < track.length + PROJECTILE_DESPAWN_MARGIN
}

/// Advance all projectiles one tick, resolving obstacle hits.
///
/// Returns the IDs of obstacles destroyed.
pub fn update_projectiles(
    projectiles: &mut Vec<Projectile>,
    obstacles: &mut [Obstacle],
    track: &Track,
    dt: f32,
) -> Vec<u32> {
    let mut destroyed = Vec::new();

    projectiles.retain_mut(|projectile| {
        projectile.pos.x += projectile.vel.x * dt;
        projectile.pos.y += projectile.vel.y * dt;

        let target = obstacles.iter_mut().find(|obstacle| {
            obstacle.is_live()
                && planar_distance(projectile.pos, obstacle.pos) < PROJECTILE_HIT_RADIUS
        });
        if let Some(obstacle) = target {
            obstacle.destroy();
            destroyed.push(obstacle.id);
            return false;
        }

        in_flight_range(projectile, track)
    });

    destroyed
}

/// Projectile step for the simulation tick
pub fn run_projectiles(ctx: &mut SimContext, dt: f32) {
    let track = ctx.race.track;
    let destroyed = update_projectiles(&mut ctx.projectiles, &mut ctx.obstacles, &track, dt);
    for id in destroyed {
        log::debug!("Projectile destroyed obstacle {}", id);
        ctx.emit(GameEvent::ObstacleDestroyed {
            id,
            cause: DestroyCause::Projectile,
        });
    }
}
