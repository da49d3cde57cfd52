use bevy::prelude::*;

use crate::game::external::DrawCommand;
use crate::game::simulation::Simulation;

const MODEL_COLOR: Color = Color::srgb(0.7, 0.7, 0.75);
const MODEL_RADIUS: f32 = 1.0;

/// Renders the simulation's draw list with gizmos and follows its camera.
pub struct DebugDrawPlugin;

impl Plugin for DebugDrawPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, (draw_frame, follow_sim_camera));
    }
}

#[derive(Component)]
pub struct SimCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 20.0, -30.0).looking_at(Vec3::ZERO, Vec3::Y),
        SimCamera,
    ));
}

fn draw_frame(sim: Option<Res<Simulation>>, mut gizmos: Gizmos) {
    let Some(sim) = sim else { return };

    for command in sim.render.commands() {
        match command {
            DrawCommand::Model { transform, .. } => {
                let (_, rotation, translation) = transform.to_scale_rotation_translation();
                gizmos.sphere(Isometry3d::new(translation, rotation), MODEL_RADIUS, MODEL_COLOR);
            }
            DrawCommand::Line { from, to, color } => gizmos.line(*from, *to, *color),
            // Gizmos have no text; labels only show up in the draw list.
            DrawCommand::Text { .. } => {}
        }
    }
}

fn follow_sim_camera(sim: Option<Res<Simulation>>, mut cameras: Query<&mut Transform, With<SimCamera>>) {
    let Some(view) = sim.and_then(|sim| sim.render.camera_view()) else {
        return;
    };
    let Ok(mut transform) = cameras.single_mut() else { return };
    *transform = Transform::from_matrix(view.inverse());
}
