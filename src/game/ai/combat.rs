use bevy::log::info;
use bevy::math::Vec3;
use smallvec::SmallVec;

use super::{AiContext, Maneuver, Pilot};
use crate::game::ecs::Projectile;
use crate::game::flight::{self, DestroyCause, ShipDestroyed};
use crate::game::world::ShipView;

/// Squared distance from `point` to the segment `a..b`.
pub fn segment_distance_sq(a: Vec3, b: Vec3, point: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return point.distance_squared(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance_squared(a + ab * t)
}

/// The pilot's current target if it is still alive and visible, otherwise
/// the nearest other live ship.
fn resolve_target(ctx: &AiContext, pilot: &Pilot) -> Option<ShipView> {
    let current = pilot
        .controller
        .target
        .and_then(|key| ctx.world.live_ships().find(|ship| ship.key == key));
    current.or_else(|| ctx.world.nearest_ship(pilot.transform.position, pilot.key, None))
}

/// Close in on the target and shoot once inside firing range.
///
/// A kill is pushed onto `destroyed` and sends the pilot back to roaming.
pub(super) fn chase(
    ctx: &mut AiContext,
    pilot: &mut Pilot,
    dt: f32,
    destroyed: &mut SmallVec<[ShipDestroyed; 2]>,
) -> Option<Maneuver> {
    let tuning = ctx.tuning;
    let turn_rate = tuning.chase_turn_rate;

    let Some(target) = resolve_target(ctx, pilot) else {
        pilot.return_to_roaming();
        return Some(Maneuver::hold(turn_rate));
    };
    let distance = pilot.transform.position.distance(target.position);
    if distance > tuning.attack_radius {
        pilot.return_to_roaming();
        return Some(Maneuver::hold(turn_rate));
    }
    pilot.controller.target = Some(target.key);

    let motion = &mut pilot.controller.motion;
    motion.current_speed = flight::ease_speed(motion.current_speed, tuning.chase_speed, 2.0, dt);
    let stick = flight::steer_toward(&pilot.transform, target.position);

    pilot.controller.is_shooting = distance <= tuning.firing_range;
    if pilot.controller.is_shooting {
        if let Some(victim) = fire(ctx, pilot, dt) {
            info!(
                "[AI] Enemy {} shot down {:?} {}",
                pilot.id, victim.kind, victim.id
            );
            destroyed.push(ShipDestroyed {
                key: victim.key,
                id: victim.id,
                kind: victim.kind,
                cause: DestroyCause::Projectile { shooter: pilot.id },
            });
            pilot.return_to_roaming();
        }
    } else {
        pilot.controller.projectiles.iter_mut().for_each(Projectile::reset);
    }

    Some(Maneuver { stick, turn_rate })
}

/// Run from the threat until it is out of flee range.
pub(super) fn flee(ctx: &mut AiContext, pilot: &mut Pilot, dt: f32) -> Maneuver {
    let tuning = ctx.tuning;
    let turn_rate = tuning.flee_turn_rate;

    pilot.controller.is_shooting = false;
    pilot.controller.projectiles.iter_mut().for_each(Projectile::reset);

    let Some(threat) = resolve_target(ctx, pilot) else {
        pilot.return_to_roaming();
        return Maneuver::hold(turn_rate);
    };
    if pilot.transform.position.distance(threat.position) > tuning.flee_radius {
        pilot.return_to_roaming();
        return Maneuver::hold(turn_rate);
    }
    pilot.controller.target = Some(threat.key);

    let motion = &mut pilot.controller.motion;
    motion.current_speed = flight::ease_speed(motion.current_speed, tuning.flee_speed, 2.0, dt);
    Maneuver {
        stick: flight::steer_away(&pilot.transform, threat.position),
        turn_rate,
    }
}

/// Advance both cannon shots by one tick. Inactive shots are launched from
/// the muzzles along the nose; a shot that passes within the hit radius of
/// another live ship kills it.
fn fire(ctx: &AiContext, pilot: &mut Pilot, dt: f32) -> Option<ShipView> {
    let tuning = ctx.tuning;
    let muzzles = flight::cannon_origins(&pilot.transform, &pilot.emitters);
    let forward = pilot.transform.forward();
    let step = tuning.projectile_speed * dt;
    let hit_sq = tuning.hit_radius * tuning.hit_radius;

    for (shot, muzzle) in pilot.controller.projectiles.iter_mut().zip(muzzles) {
        if !shot.active {
            *shot = Projectile {
                position: muzzle,
                direction: forward,
                traveled: 0.0,
                active: true,
            };
        }

        let from = shot.position;
        let to = from + shot.direction * step;
        shot.position = to;
        shot.traveled += step;

        let victim = ctx
            .world
            .live_ships()
            .filter(|ship| ship.key != pilot.key)
            .map(|ship| (ship, segment_distance_sq(from, to, ship.position)))
            .filter(|(_, d2)| *d2 <= hit_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(ship, _)| ship);
        if victim.is_some() {
            return victim;
        }

        if shot.traveled > tuning.max_projectile_travel {
            shot.reset();
        }
    }
    None
}
