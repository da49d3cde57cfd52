use bevy::color::Color;
use bevy::math::Vec3;

use super::Simulation;
use crate::game::cvar::CVar;
use crate::game::ecs::{
    AiNavNodeComponent, CameraComponent, EntityKey, EntityType, PathStateComponent,
    RenderableComponent, TransformComponent,
};
use crate::game::external::RenderSink;
use crate::game::flight;
use crate::game::navigation::NavGraph;

const PATH_COLOR: Color = Color::srgb(0.0, 1.0, 1.0);
const NODE_COLOR: Color = Color::srgb(0.4, 0.4, 0.4);
const BLOCKED_NODE_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
const LABEL_COLOR: Color = Color::WHITE;

/// Half length of a node's axis cross.
const NODE_AXIS_LENGTH: f32 = 1.0;

impl Simulation {
    /// Submit this tick's models, debug overlays and camera view.
    pub(super) fn draw_frame(&mut self) {
        self.draw_models();
        if self.cvars.enabled(CVar::DrawPath) {
            self.draw_paths();
        }
        if self.cvars.enabled(CVar::DrawNodeAxis) {
            self.draw_node_axes();
        }
        self.submit_camera();
    }

    fn draw_models(&mut self) {
        for key in self.world.entities() {
            let Some(model) = self.world.component::<RenderableComponent>(*key).map(|r| r.model) else {
                continue;
            };
            if let Some(transform) = self.world.component::<TransformComponent>(*key) {
                self.render.draw(model, transform.matrix());
            }
        }
    }

    /// Every enemy's remaining route, starting from the ship itself.
    fn draw_paths(&mut self) {
        let grid = self.world.grid();
        for key in self.world.ships() {
            let (Some(path), Some(mut from)) = (
                self.world.component::<PathStateComponent>(*key),
                self.world.position(*key),
            ) else {
                continue;
            };
            for node in path.remaining() {
                let Some(to) = grid.position(*node) else {
                    break;
                };
                self.render.draw_line(from, to, PATH_COLOR);
                from = to;
            }
        }
    }

    fn draw_node_axes(&mut self) {
        let selected = self.cvars.selected_id(CVar::DrawNodeAxisId);
        let nodes: Vec<EntityKey> = match selected {
            Some(id) => self.world.node_entity(id).into_iter().collect(),
            None => self.world.nodes().to_vec(),
        };

        for key in nodes {
            let (Some(node), Some(transform)) = (
                self.world.component::<AiNavNodeComponent>(key),
                self.world.component::<TransformComponent>(key),
            ) else {
                continue;
            };
            let color = if node.blocked_by_asteroid {
                BLOCKED_NODE_COLOR
            } else {
                NODE_COLOR
            };
            let centre = transform.position;
            for axis in node.end_points {
                self.render.draw_line(centre, centre + axis * NODE_AXIS_LENGTH, color);
            }
            if selected.is_some() {
                if let Some(entity) = self.world.entity(key) {
                    self.render.draw_text(&entity.id.to_string(), centre + Vec3::Y, LABEL_COLOR);
                }
            }
        }
    }

    fn submit_camera(&mut self) {
        let Some(owner) = self.camera_owner() else {
            return;
        };
        let (Some(camera), Some(transform)) = (
            self.world.component::<CameraComponent>(owner),
            self.world.component::<TransformComponent>(owner),
        ) else {
            return;
        };
        self.render.set_camera_view(flight::camera_view(camera, transform));
    }

    /// Ship that owns the main camera: the selected ship while camera
    /// selection is on (enemy ids win over the player's), else the player.
    pub fn camera_owner(&self) -> Option<EntityKey> {
        if self.cvars.enabled(CVar::CameraSelect) {
            let picked = self.cvars.selected_id(CVar::CameraSelectId).and_then(|id| {
                self.world
                    .find(id, EntityType::EnemyShip)
                    .or_else(|| self.world.find(id, EntityType::SpaceShip))
            });
            if picked.is_some() {
                return picked;
            }
        }
        self.world.player_ship()
    }
}
