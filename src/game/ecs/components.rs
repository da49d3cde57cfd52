use bevy::math::{Mat4, Quat, Vec3, Vec4};
use smallvec::SmallVec;

use super::types::{EntityKey, NodeId};
use crate::game::external::{ColliderId, ColliderMeshId, ModelId};

// ============================================================================
// Spatial
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    pub position: Vec3,
    pub orientation: Quat,
    /// Visual bank in degrees, applied after `orientation`.
    pub roll: f32,
    pub linear_velocity: Vec3,
    pub rotation_axis: Vec3,
    /// Degrees per second about `rotation_axis`.
    pub rotation_speed: f32,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            roll: 0.0,
            linear_velocity: Vec3::ZERO,
            rotation_axis: Vec3::Y,
            rotation_speed: 0.0,
        }
    }
}

impl TransformComponent {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// World matrix including the visual roll.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.render_rotation(), self.position)
    }

    pub fn render_rotation(&self) -> Quat {
        self.orientation * Quat::from_rotation_z(self.roll.to_radians())
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vec3 {
        self.render_rotation() * Vec3::Z
    }

    /// Local +X in world space.
    pub fn right(&self) -> Vec3 {
        self.render_rotation() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.render_rotation() * Vec3::Y
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColliderComponent {
    pub mesh: Option<ColliderMeshId>,
    pub collider: Option<ColliderId>,
    /// Local-space probe endpoints; each one becomes a ray from the centre.
    pub end_points: SmallVec<[Vec3; 17]>,
}

#[derive(Debug, Clone, Copy)]
pub struct RigidBodyComponent {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
        }
    }
}

/// Constant acceleration applied every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousForceComponent {
    pub force: Vec3,
}

// ============================================================================
// Presentation
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct CameraComponent {
    pub position: Vec3,
    pub offset_y: f32,
    pub follow_distance: f32,
    pub smooth_factor: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, -2.0),
            offset_y: 1.0,
            follow_distance: 4.0,
            smooth_factor: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderableComponent {
    pub model: ModelId,
}

/// Parameters handed to the particle renderer. Only pose, speed and looping
/// change at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterParams {
    pub origin: Vec3,
    pub direction: Vec3,
    pub start_color: Vec4,
    pub start_speed: f32,
    pub end_speed: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub decay_time: f32,
    pub looping: bool,
}

impl EmitterParams {
    pub fn thruster() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            start_color: Vec4::new(0.38, 0.76, 0.95, 1.0) * 2.0,
            start_speed: 1.2,
            end_speed: 0.0,
            start_scale: 0.01,
            end_scale: 0.0,
            decay_time: 2.58,
            looping: true,
        }
    }

    pub fn cannon() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            start_color: Vec4::new(0.0, 1.0, 0.0, 1.0) * 3.0,
            start_speed: 0.0,
            end_speed: 0.0,
            start_scale: 0.02,
            end_scale: 0.015,
            decay_time: 0.5,
            looping: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParticleEmitterComponent {
    pub thruster_left: EmitterParams,
    pub thruster_right: EmitterParams,
    pub cannon_left: EmitterParams,
    pub cannon_right: EmitterParams,
    /// Offset along local Z of the thruster emitters.
    pub emitter_offset: f32,
    /// Offset along local Z of the cannon emitters.
    pub cannon_offset: f32,
}

impl Default for ParticleEmitterComponent {
    fn default() -> Self {
        Self {
            thruster_left: EmitterParams::thruster(),
            thruster_right: EmitterParams::thruster(),
            cannon_left: EmitterParams::cannon(),
            cannon_right: EmitterParams::cannon(),
            emitter_offset: -0.5,
            cannon_offset: 1.2,
        }
    }
}

// ============================================================================
// Control
// ============================================================================

/// One frame of pilot input. Axes are in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipInput {
    pub thrust: bool,
    pub boost: bool,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub fire: bool,
}

/// Smoothed flight state shared by player and AI pilots.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipMotion {
    pub current_speed: f32,
    pub pitch_smooth: f32,
    pub yaw_smooth: f32,
    pub roll_smooth: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerInputComponent {
    pub normal_speed: f32,
    pub boost_speed: f32,
    pub acceleration_factor: f32,
    pub motion: ShipMotion,
    pub input: ShipInput,
}

impl Default for PlayerInputComponent {
    fn default() -> Self {
        Self {
            normal_speed: 1.0,
            boost_speed: 10.0,
            acceleration_factor: 1.0,
            motion: ShipMotion::default(),
            input: ShipInput::default(),
        }
    }
}

// ============================================================================
// AI
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct AiNavNodeComponent {
    /// Local axis directions drawn by the node debug view: -X, +X, -Y, +Y, -Z, +Z.
    pub end_points: [Vec3; 6],
    pub blocked_by_asteroid: bool,
}

impl Default for AiNavNodeComponent {
    fn default() -> Self {
        Self {
            end_points: [
                Vec3::NEG_X,
                Vec3::X,
                Vec3::NEG_Y,
                Vec3::Y,
                Vec3::NEG_Z,
                Vec3::Z,
            ],
            blocked_by_asteroid: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Roaming,
    ChasingEnemy,
    Fleeing,
}

/// Kinematic cannon shot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projectile {
    pub position: Vec3,
    pub direction: Vec3,
    pub traveled: f32,
    pub active: bool,
}

impl Projectile {
    pub fn reset(&mut self) {
        *self = Projectile::default();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AiControllerComponent {
    pub state: AiState,
    /// Ship being chased or fled from. Resolving a stale key yields nothing.
    pub target: Option<EntityKey>,
    pub motion: ShipMotion,
    pub normal_speed: f32,
    pub is_shooting: bool,
    /// Left and right cannon.
    pub projectiles: [Projectile; 2],
}

impl Default for AiControllerComponent {
    fn default() -> Self {
        Self {
            state: AiState::Roaming,
            target: None,
            motion: ShipMotion::default(),
            normal_speed: 1.0,
            is_shooting: false,
            projectiles: [Projectile::default(); 2],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStateComponent {
    pub closest_start_node: Option<NodeId>,
    pub closest_node_called: bool,
    pub has_reached_start_node: bool,
    /// Nodes after the start node, ending at the destination.
    pub path: Vec<NodeId>,
    pub path_index: usize,
    pub arrival_timer: f32,
}

impl PathStateComponent {
    pub fn reset(&mut self) {
        self.closest_start_node = None;
        self.closest_node_called = false;
        self.has_reached_start_node = false;
        self.path.clear();
        self.path_index = 0;
        self.arrival_timer = 0.0;
    }

    /// Remaining nodes, starting at the current waypoint.
    pub fn remaining(&self) -> &[NodeId] {
        self.path.get(self.path_index..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleComponent {
    pub is_destroyed: bool,
    pub is_respawning: bool,
}
