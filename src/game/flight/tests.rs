use super::*;
use crate::game::ecs::{CameraComponent, ParticleEmitterComponent, ShipMotion, TransformComponent};
use crate::game::external::{ColliderMeshId, DrawList, PhysicsBackend, SpherePhysics};
use bevy::math::{Mat4, Quat, Vec3};

const DT: f32 = 1.0 / 60.0;

fn profile() -> FlightProfile {
    FlightProfile {
        turn_rate: 1.8,
        smoothing: 10.0,
        roll_clamp: 45.0,
        movement_scale: 10.0,
    }
}

#[test]
fn test_straight_flight_moves_along_nose() {
    let mut transform = TransformComponent::default();
    let mut motion = ShipMotion {
        current_speed: 1.0,
        ..ShipMotion::default()
    };

    for _ in 0..120 {
        fly(&mut transform, &mut motion, Stick::default(), &profile(), DT);
    }

    assert!(transform.position.z > 5.0, "Ship should have moved forward: {:?}", transform.position);
    assert!(transform.position.x.abs() < 1e-4);
    assert!(transform.position.y.abs() < 1e-4);
    assert!((transform.linear_velocity.z - 1.0).abs() < 0.01, "Velocity converges to speed");
}

#[test]
fn test_steer_toward_signs() {
    let transform = TransformComponent::default();

    let right = steer_toward(&transform, Vec3::new(10.0, 0.0, 1.0));
    assert!(right.yaw > 0.0);
    assert_eq!(right.pitch, 0.0);

    let above = steer_toward(&transform, Vec3::new(0.0, 10.0, 1.0));
    assert!(above.pitch < 0.0, "Climbing is a negative pitch about +X");

    let ahead = steer_toward(&transform, Vec3::new(0.0, 0.0, 10.0));
    assert_eq!(ahead, Stick::default());

    let away = steer_away(&transform, Vec3::new(10.0, 0.0, 1.0));
    assert!(away.yaw < 0.0, "Fleeing turns the other way");
}

#[test]
fn test_steering_converges_on_target() {
    let mut transform = TransformComponent::default();
    let mut motion = ShipMotion::default();
    let target = Vec3::new(50.0, 20.0, 0.0);

    for _ in 0..600 {
        let stick = steer_toward(&transform, target);
        fly(&mut transform, &mut motion, stick, &profile(), DT);
    }

    let to_target = (target - transform.position).normalize();
    let facing = transform.orientation * Vec3::Z;
    assert!(facing.dot(to_target) > 0.95, "Nose should point at the target, got {:?}", facing);
}

#[test]
fn test_roll_is_clamped_and_decays() {
    let mut transform = TransformComponent::default();
    let mut motion = ShipMotion::default();
    let hard_right = Stick {
        yaw: 1.0,
        ..Stick::default()
    };
    let tight = FlightProfile {
        turn_rate: 200.0,
        ..profile()
    };

    for _ in 0..30 {
        fly(&mut transform, &mut motion, hard_right, &tight, DT);
        assert!(transform.roll.abs() <= 45.0, "Roll {} exceeds clamp", transform.roll);
    }
    assert!(transform.roll < 0.0);

    for _ in 0..300 {
        fly(&mut transform, &mut motion, Stick::default(), &profile(), DT);
    }
    assert!(transform.roll.abs() < 0.5, "Roll should settle near level, got {}", transform.roll);
}

#[test]
fn test_ease_speed() {
    assert_eq!(ease_speed(0.0, 1.0, 2.0, 0.25), 0.5);
    assert_eq!(ease_speed(0.0, 1.0, 90.0, 0.5), 1.0, "Rate is capped at a full step");
}

#[test]
fn test_emitters_follow_pose_and_fire_state() {
    let transform = TransformComponent::at(Vec3::new(0.0, 0.0, 10.0));
    let mut emitters = ParticleEmitterComponent::default();

    update_emitters(&mut emitters, &transform, 1.0, true);
    assert!(emitters.cannon_left.looping && emitters.cannon_right.looping);
    assert!((emitters.thruster_left.start_speed - 4.2).abs() < 1e-5);
    assert_eq!(emitters.thruster_left.direction, Vec3::NEG_Z);
    assert!(emitters.thruster_left.origin.x < emitters.thruster_right.origin.x);

    let [left, right] = cannon_origins(&transform, &emitters);
    assert!((left - Vec3::new(-GUN_SPACING, 0.0, 11.2)).length() < 1e-5);
    assert!((right - Vec3::new(GUN_SPACING, 0.0, 11.2)).length() < 1e-5);

    update_emitters(&mut emitters, &transform, 0.0, false);
    assert!(!emitters.cannon_left.looping);
    assert_eq!(emitters.thruster_right.end_speed, 0.0);
}

#[test]
fn test_camera_eases_behind_ship() {
    let transform = TransformComponent::at(Vec3::new(0.0, 0.0, 20.0));
    let mut camera = CameraComponent::default();
    for _ in 0..200 {
        follow_camera(&mut camera, &transform, DT);
    }
    assert!((camera.position - Vec3::new(0.0, 1.0, 16.0)).length() < 1e-3);

    let view = camera_view(&camera, &transform);
    let ship_in_view = view.transform_point3(transform.position);
    assert!(ship_in_view.z < 0.0, "Ship must be in front of the camera");
}

#[test]
fn test_probe_hull_reports_asteroid_hit() {
    let mut physics = SpherePhysics::new(1.0);
    let mesh: ColliderMeshId = physics.load_collider_mesh("rock");
    physics.create_collider(mesh, Mat4::from_translation(Vec3::new(0.0, 0.0, 1.5)));

    let points = [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0)];
    let mut transform = TransformComponent::default();
    let mut draw = DrawList::new();

    let hit = probe_hull(&physics, &transform, &points, Some(&mut draw));
    assert!(hit.is_some_and(|h| h.hit), "Nose probe reaches the sphere");
    assert_eq!(draw.lines().count(), 2, "Every probe is drawn");

    // Turned around, no probe reaches the sphere.
    transform.orientation = Quat::from_rotation_y(std::f32::consts::PI);
    assert!(probe_hull(&physics, &transform, &points, None).is_none());
}
