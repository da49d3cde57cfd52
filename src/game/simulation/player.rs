use bevy::log::{info, warn};
use smallvec::{smallvec, SmallVec};

use super::Simulation;
use crate::game::cvar::CVar;
use crate::game::ecs::{
    CameraComponent, ColliderComponent, EntityKey, EntityType, ParticleEmitterComponent,
    PlayerInputComponent, TransformComponent,
};
use crate::game::error::WorldError;
use crate::game::external::RenderSink;
use crate::game::flight::{self, DestroyCause, FlightProfile, ShipDestroyed, Stick};

/// Radians per second at full stick deflection.
const PLAYER_TURN_RATE: f32 = 1.8;
const BOOST_EASE_RATE: f32 = 30.0;
const THRUST_EASE_RATE: f32 = 90.0;

impl Simulation {
    /// Fly the player ship from the latest [`ShipInput`](crate::game::ecs::ShipInput).
    ///
    /// Hull probes run every tick; touching an asteroid destroys the ship.
    pub(super) fn update_player(
        &mut self,
        key: EntityKey,
        dt: f32,
    ) -> Result<SmallVec<[ShipDestroyed; 2]>, WorldError> {
        let id = self.world.entity(key).ok_or(WorldError::StaleKey(key))?.id;
        let destroyed = |cause| ShipDestroyed {
            key,
            id,
            kind: EntityType::SpaceShip,
            cause,
        };

        let mut transform = *self.world.require::<TransformComponent>(key)?;
        let mut controls = *self.world.require::<PlayerInputComponent>(key)?;
        let mut camera = *self.world.require::<CameraComponent>(key)?;
        let mut emitters = *self.world.require::<ParticleEmitterComponent>(key)?;

        let input = self.player_input;
        controls.input = input;
        let motion = &mut controls.motion;
        motion.current_speed = match (input.thrust, input.boost) {
            (true, true) => flight::ease_speed(motion.current_speed, controls.boost_speed, BOOST_EASE_RATE, dt),
            (true, false) => {
                let target = controls.normal_speed * controls.acceleration_factor;
                flight::ease_speed(motion.current_speed, target, THRUST_EASE_RATE, dt)
            }
            (false, _) => 0.0,
        };

        let stick = Stick {
            pitch: input.pitch.clamp(-1.0, 1.0),
            yaw: input.yaw.clamp(-1.0, 1.0),
            roll: input.roll.clamp(-1.0, 1.0),
        };
        let profile = FlightProfile {
            smoothing: camera.smooth_factor,
            ..FlightProfile::from_tuning(&self.config.ai, PLAYER_TURN_RATE)
        };
        flight::fly(&mut transform, &mut controls.motion, stick, &profile, dt);
        if !transform.position.is_finite() || !transform.orientation.is_finite() {
            warn!("[WORLD] Player ship {} integrated to a non-finite pose, respawning", id);
            return Ok(smallvec![destroyed(DestroyCause::InvalidPose)]);
        }

        let speed_ratio = controls.motion.current_speed / controls.normal_speed;
        flight::update_emitters(&mut emitters, &transform, speed_ratio, input.fire);
        flight::follow_camera(&mut camera, &transform, dt);

        let probes = self.world.require::<ColliderComponent>(key)?.end_points.clone();
        let debug = if self.cvars.enabled(CVar::DrawRaycasts) {
            Some(&mut self.render as &mut dyn RenderSink)
        } else {
            None
        };
        if flight::probe_hull(&self.physics, &transform, &probes, debug).is_some() {
            info!("[WORLD] Player ship {} hit an asteroid", id);
            return Ok(smallvec![destroyed(DestroyCause::Asteroid)]);
        }

        self.world.store(key, transform)?;
        self.world.store(key, controls)?;
        self.world.store(key, camera)?;
        self.world.store(key, emitters)?;
        Ok(SmallVec::new())
    }
}
