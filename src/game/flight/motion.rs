use bevy::math::{EulerRot, Mat4, Quat, Vec3};

use crate::game::config::AiTuning;
use crate::game::ecs::{CameraComponent, ParticleEmitterComponent, ShipMotion, TransformComponent};

/// Lateral distance of thrusters and cannons from the ship's centre line.
pub const GUN_SPACING: f32 = 0.365;

/// Fraction of the velocity error left after one second.
const VELOCITY_DECAY: f32 = 0.0001;

const CANNON_PARTICLE_SPEED: f32 = -500.0;

/// Control deflection, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stick {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightProfile {
    /// Radians per second at full deflection.
    pub turn_rate: f32,
    pub smoothing: f32,
    /// Degrees.
    pub roll_clamp: f32,
    pub movement_scale: f32,
}

impl FlightProfile {
    pub fn from_tuning(tuning: &AiTuning, turn_rate: f32) -> Self {
        Self {
            turn_rate,
            smoothing: tuning.smoothing,
            roll_clamp: tuning.roll_clamp,
            movement_scale: tuning.movement_scale,
        }
    }
}

/// Deflection that swings the nose toward `target`.
pub fn steer_toward(transform: &TransformComponent, target: Vec3) -> Stick {
    let local = transform.orientation.inverse() * (target - transform.position);
    let yaw = local.x.atan2(local.z);
    let pitch = -local.y.atan2(local.x.hypot(local.z));
    Stick {
        pitch: pitch.clamp(-1.0, 1.0),
        yaw: yaw.clamp(-1.0, 1.0),
        roll: 0.0,
    }
}

/// Deflection that swings the tail toward `threat`.
pub fn steer_away(transform: &TransformComponent, threat: Vec3) -> Stick {
    steer_toward(transform, 2.0 * transform.position - threat)
}

/// Framerate-independent exponential approach of `current` to `target`.
pub fn ease_speed(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}

/// Integrate one tick of flight: smoothed small-angle rotation, visual bank
/// and velocity easing toward `motion.current_speed` along the nose.
pub fn fly(
    transform: &mut TransformComponent,
    motion: &mut ShipMotion,
    stick: Stick,
    profile: &FlightProfile,
    dt: f32,
) {
    let k = (dt * profile.smoothing).min(1.0);
    let step = profile.turn_rate * dt;
    motion.pitch_smooth += (stick.pitch * step - motion.pitch_smooth) * k;
    motion.yaw_smooth += (stick.yaw * step - motion.yaw_smooth) * k;
    motion.roll_smooth += (stick.roll * step - motion.roll_smooth) * k;

    let delta = Quat::from_euler(
        EulerRot::YXZ,
        motion.yaw_smooth,
        motion.pitch_smooth,
        motion.roll_smooth,
    );
    transform.orientation = (transform.orientation * delta).normalize();

    // Bank into the turn, then relax back toward level.
    transform.roll = (transform.roll - motion.yaw_smooth.to_degrees())
        .clamp(-profile.roll_clamp, profile.roll_clamp);
    transform.roll -= transform.roll * k;

    let desired = transform.orientation * Vec3::Z * motion.current_speed;
    let blend = 1.0 - VELOCITY_DECAY.powf(dt);
    transform.linear_velocity = transform.linear_velocity.lerp(desired, blend);
    transform.position += transform.linear_velocity * dt * profile.movement_scale;
}

/// World-space muzzle positions, left then right.
pub fn cannon_origins(transform: &TransformComponent, emitters: &ParticleEmitterComponent) -> [Vec3; 2] {
    let right = transform.right() * GUN_SPACING;
    let ahead = transform.position + transform.forward() * emitters.cannon_offset;
    [ahead - right, ahead + right]
}

/// Re-pose the thruster and cannon emitters. Thruster particle speed grows
/// with `speed_ratio` (current over normal speed).
pub fn update_emitters(
    emitters: &mut ParticleEmitterComponent,
    transform: &TransformComponent,
    speed_ratio: f32,
    shooting: bool,
) {
    let right = transform.right() * GUN_SPACING;
    let back = -transform.forward();
    let tail = transform.position + transform.forward() * emitters.emitter_offset;

    for (emitter, origin) in [
        (&mut emitters.thruster_left, tail - right),
        (&mut emitters.thruster_right, tail + right),
    ] {
        emitter.origin = origin;
        emitter.direction = back;
        emitter.start_speed = 1.2 + 3.0 * speed_ratio;
        emitter.end_speed = 3.0 * speed_ratio;
    }

    let [left, right_gun] = cannon_origins(transform, emitters);
    for (emitter, origin) in [
        (&mut emitters.cannon_left, left),
        (&mut emitters.cannon_right, right_gun),
    ] {
        emitter.origin = origin;
        emitter.direction = back;
        emitter.looping = shooting;
        if shooting {
            emitter.start_speed = CANNON_PARTICLE_SPEED;
            emitter.end_speed = CANNON_PARTICLE_SPEED;
        }
    }
}

/// Ease the chase camera toward its spot above and behind the ship.
pub fn follow_camera(camera: &mut CameraComponent, transform: &TransformComponent, dt: f32) {
    let offset = transform.render_rotation() * Vec3::new(0.0, camera.offset_y, -camera.follow_distance);
    let desired = transform.position + offset;
    let k = (dt * camera.smooth_factor).min(1.0);
    camera.position = camera.position.lerp(desired, k);
}

pub fn camera_view(camera: &CameraComponent, transform: &TransformComponent) -> Mat4 {
    Mat4::look_at_rh(
        camera.position,
        camera.position + transform.forward(),
        transform.up(),
    )
}
