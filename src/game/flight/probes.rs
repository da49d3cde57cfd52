use bevy::color::Color;
use bevy::math::Vec3;

use crate::game::ecs::TransformComponent;
use crate::game::external::{PhysicsBackend, RaycastHit, RenderSink};
use crate::game::world::World;

const PROBE_COLOR: Color = Color::srgb(0.0, 1.0, 0.0);
const HIT_COLOR: Color = Color::WHITE;

/// True if any asteroid centre lies within `radius` of `position`.
pub fn asteroid_nearby(world: &World, position: Vec3, radius: f32) -> bool {
    let limit = radius * radius;
    world
        .asteroids()
        .iter()
        .filter_map(|key| world.position(*key))
        .any(|p| p.distance_squared(position) <= limit)
}

/// Cast one ray per hull probe point from the ship centre and report the
/// first hit. Every probe is cast; rays are drawn when `debug` is given.
pub fn probe_hull(
    physics: &dyn PhysicsBackend,
    transform: &TransformComponent,
    end_points: &[Vec3],
    mut debug: Option<&mut (dyn RenderSink + '_)>,
) -> Option<RaycastHit> {
    let origin = transform.position;
    let rotation = transform.render_rotation();
    let mut first = None;

    for point in end_points {
        let length = point.length();
        if length <= f32::EPSILON {
            continue;
        }
        let direction = rotation * (*point / length);
        let hit = physics.raycast(origin, direction, length);

        if let Some(sink) = debug.as_deref_mut() {
            sink.draw_line(origin, origin + direction * length, PROBE_COLOR);
            if hit.hit {
                sink.draw_text("HIT", hit.point, HIT_COLOR);
            }
        }
        if hit.hit && first.is_none() {
            first = Some(hit);
        }
    }
    first
}
