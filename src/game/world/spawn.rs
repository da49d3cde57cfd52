use bevy::log::{info, warn};
use bevy::math::{Quat, Vec3};
use rand::Rng;
use smallvec::SmallVec;

use super::World;
use crate::game::ecs::{
    AiControllerComponent, AiNavNodeComponent, CameraComponent, ColliderComponent,
    ContinuousForceComponent, EntityKey, EntityType, LifecycleComponent,
    ParticleEmitterComponent, PathStateComponent, PlayerInputComponent, RenderableComponent,
    RigidBodyComponent, TransformComponent,
};
use crate::game::error::WorldError;
use crate::game::external::{ColliderMeshId, ModelId, PhysicsBackend, RenderSink};
use crate::game::navigation::{lattice_capacity, NavGrid};

pub const SHIP_MODEL: &str = "assets/space/spaceship.glb";
pub const ASTEROID_VARIANTS: usize = 6;
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 10.0, 0.0);

/// Hull probe endpoints in ship-local space (wings, engines, weapons, nose,
/// canopy, fin, belly). Each becomes a ray from the ship centre.
pub const SHIP_PROBE_POINTS: [Vec3; 17] = [
    Vec3::new(1.40173, 0.0, -0.225342),
    Vec3::new(1.33578, 0.0, 0.088893),
    Vec3::new(0.227107, -0.200232, -0.588618),
    Vec3::new(0.227107, 0.228809, -0.588618),
    Vec3::new(0.391073, -0.130853, 1.28339),
    Vec3::new(0.134787, 0.0, 1.68965),
    Vec3::new(0.134787, 0.250728, 0.647422),
    Vec3::new(-1.40173, 0.0, -0.225342),
    Vec3::new(-1.33578, 0.0, 0.088893),
    Vec3::new(-0.227107, -0.200232, -0.588618),
    Vec3::new(-0.227107, 0.228809, -0.588618),
    Vec3::new(-0.391073, -0.130853, 1.28339),
    Vec3::new(-0.134787, 0.0, 1.68965),
    Vec3::new(-0.134787, 0.250728, 0.647422),
    Vec3::new(0.0, 0.525049, -0.392836),
    Vec3::new(0.0, 0.739624, 0.102582),
    Vec3::new(0.0, -0.244758, 0.284825),
];

/// Model and collider-mesh ids resolved once at startup.
#[derive(Debug, Clone, Copy)]
pub struct ShipAssets {
    pub ship_model: ModelId,
    pub asteroid_models: [ModelId; ASTEROID_VARIANTS],
    pub asteroid_meshes: [ColliderMeshId; ASTEROID_VARIANTS],
}

impl ShipAssets {
    pub fn load(render: &mut dyn RenderSink, physics: &mut dyn PhysicsBackend) -> Self {
        let ship_model = render.load_model(SHIP_MODEL);
        let asteroid_models = std::array::from_fn(|i| {
            render.load_model(&format!("assets/space/Asteroid_{}.glb", i + 1))
        });
        let asteroid_meshes = std::array::from_fn(|i| {
            physics.load_collider_mesh(&format!("assets/space/Asteroid_{}_physics.glb", i + 1))
        });
        Self {
            ship_model,
            asteroid_models,
            asteroid_meshes,
        }
    }
}

fn ship_collider() -> ColliderComponent {
    ColliderComponent {
        mesh: None,
        collider: None,
        end_points: SmallVec::from_slice(&SHIP_PROBE_POINTS),
    }
}

impl World {
    /// The pilot-controlled ship. A respawn reuses the queued player id.
    pub fn create_player_ship(&mut self, respawning: bool) -> Result<EntityKey, WorldError> {
        let key = self.create_entity(EntityType::SpaceShip, respawning);
        let model = self.assets.ship_model;

        self.add_component(key, TransformComponent::at(PLAYER_SPAWN))?;
        self.add_component(key, RenderableComponent { model })?;
        self.add_component(key, ship_collider())?;
        self.add_component(key, CameraComponent::default())?;
        self.add_component(key, RigidBodyComponent::default())?;
        self.add_component(key, PlayerInputComponent::default())?;
        self.add_component(key, ParticleEmitterComponent::default())?;
        self.add_component(key, LifecycleComponent {
            is_destroyed: false,
            is_respawning: respawning,
        })?;
        Ok(key)
    }

    /// An AI ship at `position`, starting in the roaming state.
    pub fn create_enemy_ship(&mut self, position: Vec3, respawning: bool) -> Result<EntityKey, WorldError> {
        let key = self.create_entity(EntityType::EnemyShip, respawning);
        let model = self.assets.ship_model;

        self.add_component(key, TransformComponent::at(position))?;
        self.add_component(key, RenderableComponent { model })?;
        self.add_component(key, ship_collider())?;
        self.add_component(key, AiControllerComponent::default())?;
        self.add_component(key, CameraComponent::default())?;
        self.add_component(key, ParticleEmitterComponent::default())?;
        self.add_component(key, PathStateComponent::default())?;
        self.add_component(key, LifecycleComponent {
            is_destroyed: false,
            is_respawning: respawning,
        })?;
        Ok(key)
    }

    /// A randomly placed, randomly spinning asteroid registered with physics.
    pub fn create_asteroid<R: Rng>(
        &mut self,
        physics: &mut dyn PhysicsBackend,
        rng: &mut R,
        spread: f32,
    ) -> Result<EntityKey, WorldError> {
        let key = self.create_entity(EntityType::Asteroid, false);
        let variant = rng.random_range(0..ASTEROID_VARIANTS);

        let position = Vec3::new(
            rng.random_range(-1.0..=1.0) * spread,
            rng.random_range(-1.0..=1.0) * spread,
            rng.random_range(-1.0..=1.0) * spread,
        );
        let mut sign = || if rng.random_bool(0.5) { 2.0 } else { -2.0 };
        let rotation_axis = Vec3::new(sign(), sign(), sign()).normalize();
        let drift = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        )
        .normalize_or_zero();

        let transform = TransformComponent {
            position,
            orientation: Quat::IDENTITY,
            roll: 0.0,
            linear_velocity: drift,
            rotation_axis,
            rotation_speed: rng.random_range(10.0..100.0),
        };
        let mesh = self.assets.asteroid_meshes[variant];
        let model = self.assets.asteroid_models[variant];
        let collider = physics.create_collider(mesh, transform.matrix());

        self.add_component(key, transform)?;
        self.add_component(key, RenderableComponent { model })?;
        self.add_component(key, ColliderComponent {
            mesh: Some(mesh),
            collider: Some(collider),
            end_points: SmallVec::new(),
        })?;
        self.add_component(key, RigidBodyComponent {
            mass: rng.random_range(50.0..500.0),
            ..RigidBodyComponent::default()
        })?;
        self.add_component(key, ContinuousForceComponent::default())?;
        Ok(key)
    }

    /// Node entity for lattice point `(x, y, z)`; its id is the linear node id.
    ///
    /// Returns `Ok(None)` for coordinates outside the grid.
    pub fn create_path_node(&mut self, x: u32, y: u32, z: u32) -> Result<Option<EntityKey>, WorldError> {
        let Some(id) = self.grid.insert_at(x, y, z) else {
            return Ok(None);
        };
        let position = self.grid.lattice_position(x, y, z);

        if let Some(old) = self.node_map.get(&id).copied() {
            self.destroy_key(old)?;
            self.grid.insert_at(x, y, z);
        }

        let key = self.insert_entity(id, EntityType::Node);
        let counter = &mut self.next_id[EntityType::Node.index()];
        *counter = (*counter).max(id + 1);

        self.add_component(key, TransformComponent::at(position))?;
        self.add_component(key, AiNavNodeComponent::default())?;
        self.node_map.insert(id, key);
        Ok(Some(key))
    }

    /// Replace the navigation grid with a fully populated `side^3` lattice.
    pub fn build_nav_grid(&mut self, side: u32, spacing: f32, origin: Vec3) -> Result<(), WorldError> {
        if lattice_capacity(side).is_none() {
            warn!("[NAV] Grid side {} overflows the node id range, keeping the current grid", side);
            return Err(WorldError::GridTooLarge { side });
        }
        let old: Vec<_> = self.nodes.clone();
        for key in old {
            self.destroy_key(key)?;
        }
        self.grid = NavGrid::new(side, spacing, origin);

        for z in 0..side {
            for y in 0..side {
                for x in 0..side {
                    self.create_path_node(x, y, z)?;
                }
            }
        }

        info!(
            "[NAV] Built {}x{}x{} navigation grid ({} nodes, spacing {}, origin {:?})",
            side,
            side,
            side,
            self.grid.len(),
            spacing,
            origin
        );
        Ok(())
    }
}
