//! Enemy pilot state machine.
//!
//! Each enemy ship is in one of three [`AiState`]s:
//!
//! ```text
//! Roaming --(ship detected, p)----> ChasingEnemy --(target lost / out of range)--> Roaming
//! Roaming --(ship detected, 1-p)--> Fleeing      --(threat lost / out of range)--> Roaming
//! ChasingEnemy --(kill)--> Roaming
//! ```
//!
//! A tick works on a [`Pilot`], a copy of the ship's components taken out of
//! the [`World`]. The world is only read while the pilot thinks; the caller
//! writes the pilot back and applies any [`ShipDestroyed`] events after the
//! whole ship pass, so no container is mutated mid-iteration.

mod combat;
mod roaming;


use bevy::color::Color;
use bevy::log::{info, warn};
use bevy::math::Vec3;
use rand::rngs::StdRng;
use smallvec::SmallVec;

use crate::game::config::AiTuning;
use crate::game::cvar::{CVar, CVarStore};
use crate::game::ecs::{
    AiControllerComponent, AiState, CameraComponent, ColliderComponent, EntityId, EntityKey,
    EntityType, ParticleEmitterComponent, PathStateComponent, TransformComponent,
};
use crate::game::error::WorldError;
use crate::game::external::{PhysicsBackend, RenderSink};
use crate::game::flight::{self, DestroyCause, FlightProfile, ShipDestroyed, Stick};
use crate::game::navigation::Pathfinder;
use crate::game::world::World;

pub use combat::segment_distance_sq;

const SPEED_COLOR: Color = Color::srgb(0.9, 0.9, 1.0);

/// Everything an AI tick may touch besides the pilot itself.
pub struct AiContext<'a> {
    pub world: &'a World,
    pub pathfinder: &'a mut Pathfinder,
    pub physics: &'a dyn PhysicsBackend,
    pub render: &'a mut dyn RenderSink,
    pub cvars: &'a CVarStore,
    pub rng: &'a mut StdRng,
    pub tuning: &'a AiTuning,
}

/// Working copy of an enemy ship's components for one tick.
#[derive(Debug, Clone)]
pub struct Pilot {
    pub key: EntityKey,
    pub id: EntityId,
    pub transform: TransformComponent,
    pub controller: AiControllerComponent,
    pub path: PathStateComponent,
    pub camera: CameraComponent,
    pub emitters: ParticleEmitterComponent,
    pub probes: SmallVec<[Vec3; 17]>,
}

impl Pilot {
    pub fn load(world: &World, key: EntityKey) -> Result<Self, WorldError> {
        let id = world.entity(key).ok_or(WorldError::StaleKey(key))?.id;
        Ok(Self {
            key,
            id,
            transform: *world.require::<TransformComponent>(key)?,
            controller: *world.require::<AiControllerComponent>(key)?,
            path: world.require::<PathStateComponent>(key)?.clone(),
            camera: *world.require::<CameraComponent>(key)?,
            emitters: *world.require::<ParticleEmitterComponent>(key)?,
            probes: world.require::<ColliderComponent>(key)?.end_points.clone(),
        })
    }

    pub fn store(self, world: &mut World) -> Result<(), WorldError> {
        world.store(self.key, self.transform)?;
        world.store(self.key, self.controller)?;
        world.store(self.key, self.path)?;
        world.store(self.key, self.camera)?;
        world.store(self.key, self.emitters)?;
        Ok(())
    }

    fn destroyed(&self, cause: DestroyCause) -> ShipDestroyed {
        ShipDestroyed {
            key: self.key,
            id: self.id,
            kind: EntityType::EnemyShip,
            cause,
        }
    }

    /// Drop target, weapons and path and go back to roaming.
    fn return_to_roaming(&mut self) {
        self.controller.state = AiState::Roaming;
        self.controller.target = None;
        self.controller.is_shooting = false;
        self.controller.projectiles.iter_mut().for_each(|p| p.reset());
        self.path.reset();
    }
}

/// Steering decided by the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maneuver {
    pub stick: Stick,
    pub turn_rate: f32,
}

impl Maneuver {
    pub fn hold(turn_rate: f32) -> Self {
        Self {
            stick: Stick::default(),
            turn_rate,
        }
    }
}

/// Advance one enemy ship by `dt`.
///
/// Returns the ships that must be destroyed and respawned because of this
/// tick: the pilot itself (asteroid, lost navigation, bad pose) and/or a ship
/// it shot down.
pub fn update_ai_ship(ctx: &mut AiContext, pilot: &mut Pilot, dt: f32) -> SmallVec<[ShipDestroyed; 2]> {
    let mut destroyed = SmallVec::new();

    if !pilot.transform.position.is_finite() {
        warn!("[AI] Enemy {} has a non-finite position, respawning", pilot.id);
        destroyed.push(pilot.destroyed(DestroyCause::InvalidPose));
        return destroyed;
    }

    let maneuver = match pilot.controller.state {
        AiState::Roaming => roaming::roam(ctx, pilot, dt),
        AiState::ChasingEnemy => combat::chase(ctx, pilot, dt, &mut destroyed),
        AiState::Fleeing => Some(combat::flee(ctx, pilot, dt)),
    };
    let Some(maneuver) = maneuver else {
        destroyed.push(pilot.destroyed(DestroyCause::LostNavigation));
        return destroyed;
    };

    let profile = FlightProfile::from_tuning(ctx.tuning, maneuver.turn_rate);
    flight::fly(
        &mut pilot.transform,
        &mut pilot.controller.motion,
        maneuver.stick,
        &profile,
        dt,
    );
    if !pilot.transform.position.is_finite() || !pilot.transform.orientation.is_finite() {
        warn!("[AI] Enemy {} integrated to a non-finite pose, respawning", pilot.id);
        destroyed.push(pilot.destroyed(DestroyCause::InvalidPose));
        return destroyed;
    }

    let speed_ratio = pilot.controller.motion.current_speed / pilot.controller.normal_speed;
    flight::update_emitters(
        &mut pilot.emitters,
        &pilot.transform,
        speed_ratio,
        pilot.controller.is_shooting,
    );
    flight::follow_camera(&mut pilot.camera, &pilot.transform, dt);

    if ctx.cvars.enabled(CVar::DrawPath) {
        ctx.render.draw_text(
            &format!("{:.2}", pilot.controller.motion.current_speed),
            pilot.transform.position,
            SPEED_COLOR,
        );
    }

    if flight::asteroid_nearby(ctx.world, pilot.transform.position, ctx.tuning.asteroid_probe_radius) {
        let debug = if ctx.cvars.enabled(CVar::DrawRaycasts) {
            Some(&mut *ctx.render)
        } else {
            None
        };
        if flight::probe_hull(ctx.physics, &pilot.transform, &pilot.probes, debug).is_some() {
            info!("[AI] Enemy {} hit an asteroid", pilot.id);
            destroyed.push(pilot.destroyed(DestroyCause::Asteroid));
        }
    }

    destroyed
}

/// Roaming speed ramp toward a waypoint `distance_sq` away: full speed while
/// far, easing down to a fifth of it on final approach.
fn approach_speed(controller: &mut AiControllerComponent, tuning: &AiTuning, distance_sq: f32, dt: f32) {
    let motion = &mut controller.motion;
    if distance_sq > tuning.slow_down_distance_sq {
        motion.current_speed = (motion.current_speed + dt).min(tuning.roam_speed);
    } else if distance_sq > tuning.arrival_threshold_sq {
        let span = tuning.slow_down_distance_sq - tuning.arrival_threshold_sq;
        let t = ((distance_sq - tuning.arrival_threshold_sq) / span).clamp(0.0, 1.0);
        let target = (0.2 + 0.8 * t) * tuning.roam_speed;
        motion.current_speed = flight::ease_speed(motion.current_speed, target, 2.0, dt);
    }
}
