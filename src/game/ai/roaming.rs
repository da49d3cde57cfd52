use bevy::color::Color;
use bevy::log::{debug, warn};
use bevy::math::Vec3;
use rand::Rng;

use super::{approach_speed, AiContext, Maneuver, Pilot};
use crate::game::cvar::CVar;
use crate::game::ecs::{AiState, NodeId};
use crate::game::flight;
use crate::game::navigation::NavGraph;

const WAYPOINT_COLOR: Color = Color::srgb(1.0, 1.0, 0.0);

/// Wander between random navigation nodes until another ship comes close.
///
/// Returns `None` when no navigation node can be found at all; the caller
/// then destroys and respawns the ship.
pub(super) fn roam(ctx: &mut AiContext, pilot: &mut Pilot, dt: f32) -> Option<Maneuver> {
    let tuning = ctx.tuning;
    let turn_rate = tuning.roam_turn_rate;
    let position = pilot.transform.position;

    if let Some(ship) = ctx.world.nearest_ship(position, pilot.key, Some(tuning.detection_radius)) {
        pilot.path.reset();
        pilot.controller.target = Some(ship.key);
        pilot.controller.state = if ctx.rng.random_bool(tuning.chase_probability.clamp(0.0, 1.0)) {
            AiState::ChasingEnemy
        } else {
            AiState::Fleeing
        };
        debug!(
            "[AI] Enemy {} spotted {:?} {} -> {:?}",
            pilot.id, ship.kind, ship.id, pilot.controller.state
        );
        return Some(Maneuver::hold(turn_rate));
    }

    if !pilot.path.closest_node_called {
        let Some(start) = ctx.world.grid().nearest(position).or_else(|| random_node(ctx)) else {
            warn!("[NAV] Navigation grid is empty, enemy {} cannot roam", pilot.id);
            return None;
        };
        pilot.path.closest_start_node = Some(start);
        pilot.path.closest_node_called = true;
    }

    if !pilot.path.has_reached_start_node {
        let Some(start) = pilot.path.closest_start_node else {
            pilot.path.reset();
            return Some(Maneuver::hold(turn_rate));
        };
        let Some(start_pos) = ctx.world.grid().position(start) else {
            // The node vanished since it was picked.
            pilot.path.reset();
            return Some(Maneuver::hold(turn_rate));
        };
        draw_waypoint(ctx, position, start_pos);

        let distance_sq = position.distance_squared(start_pos);
        if distance_sq <= tuning.arrival_threshold_sq && pilot.path.path.is_empty() {
            pilot.path.has_reached_start_node = true;
            if let Some(goal) = random_node(ctx) {
                pilot.path.path = ctx.pathfinder.find_path(ctx.world.grid(), start, goal);
                pilot.path.path_index = 0;
                debug!(
                    "[ASTAR] Enemy {} routed {} -> {} in {} steps",
                    pilot.id,
                    start,
                    goal,
                    pilot.path.path.len()
                );
            }
            return Some(Maneuver::hold(turn_rate));
        }

        approach_speed(&mut pilot.controller, tuning, distance_sq, dt);
        return Some(Maneuver {
            stick: flight::steer_toward(&pilot.transform, start_pos),
            turn_rate,
        });
    }

    let Some(&waypoint) = pilot.path.remaining().first() else {
        // Route finished (or empty): pick a new start node next tick.
        pilot.path.reset();
        return Some(Maneuver::hold(turn_rate));
    };
    let Some(waypoint_pos) = ctx.world.grid().position(waypoint) else {
        pilot.path.reset();
        return Some(Maneuver::hold(turn_rate));
    };
    draw_waypoint(ctx, position, waypoint_pos);

    let distance_sq = position.distance_squared(waypoint_pos);
    if distance_sq <= tuning.arrival_threshold_sq {
        pilot.path.arrival_timer += dt;
        if pilot.path.arrival_timer >= tuning.arrival_delay {
            pilot.path.path_index += 1;
            pilot.path.arrival_timer = 0.0;
        }
        return Some(Maneuver::hold(turn_rate));
    }

    approach_speed(&mut pilot.controller, tuning, distance_sq, dt);
    Some(Maneuver {
        stick: flight::steer_toward(&pilot.transform, waypoint_pos),
        turn_rate,
    })
}

/// Uniformly random existing node, `None` on an empty grid.
fn random_node(ctx: &mut AiContext) -> Option<NodeId> {
    let grid = ctx.world.grid();
    if grid.is_empty() {
        return None;
    }
    let index = ctx.rng.random_range(0..grid.len());
    grid.ids().nth(index)
}

fn draw_waypoint(ctx: &mut AiContext, from: Vec3, to: Vec3) {
    if ctx.cvars.enabled(CVar::DrawPath) {
        ctx.render.draw_line(from, to, WAYPOINT_COLOR);
    }
}
