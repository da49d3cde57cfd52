//! Simulation layer: the explicit context that owns the world and every
//! collaborator, advanced once per fixed tick.
//!
//! Tick order is fixed: asteroids, ships, nodes, then draw submission. Ships
//! never destroy each other mid-pass; destructions are collected, the victims
//! are hidden from the remaining ships, and teardown plus respawn happen
//! after every ship has been updated.

mod debug;
mod player;
mod systems;


use bevy::log::info;
use bevy::math::{Quat, Vec3};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::game::ai::{self, AiContext, Pilot};
use crate::game::config::InitialConfig;
use crate::game::cvar::CVarStore;
use crate::game::ecs::{
    AiNavNodeComponent, ColliderComponent, ContinuousForceComponent, EntityId, EntityKey,
    EntityType, LifecycleComponent, RigidBodyComponent, ShipInput, TransformComponent,
};
use crate::game::error::WorldError;
use crate::game::external::{DrawList, PhysicsBackend, SpherePhysics};
use crate::game::flight::ShipDestroyed;
use crate::game::navigation::Pathfinder;
use crate::game::world::{ShipAssets, World};

pub use systems::{apply_game_config, setup_simulation, tick_simulation};

/// Fixed ticks elapsed since startup.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SimTick(pub u64);

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimTick>()
            .add_systems(Startup, setup_simulation)
            .add_systems(FixedUpdate, tick_simulation)
            .add_systems(Update, apply_game_config);
    }
}

#[derive(Resource)]
pub struct Simulation {
    pub world: World,
    pub pathfinder: Pathfinder,
    pub physics: SpherePhysics,
    pub render: DrawList,
    pub cvars: CVarStore,
    /// Latest pilot input for the player ship.
    pub player_input: ShipInput,
    rng: StdRng,
    config: InitialConfig,
    doomed: Vec<ShipDestroyed>,
}

impl Simulation {
    /// Build the world described by `config`: navigation grid, asteroid
    /// field, the player ship and the enemy squadron.
    pub fn new(config: InitialConfig) -> Result<Self, WorldError> {
        let mut render = DrawList::new();
        let mut physics = SpherePhysics::new(config.asteroid_radius);
        let assets = ShipAssets::load(&mut render, &mut physics);
        let mut world = World::new(assets);
        let mut rng = StdRng::seed_from_u64(config.rng_seed);

        world.build_nav_grid(config.grid_side, config.grid_spacing, config.grid_origin)?;
        for _ in 0..config.asteroid_count {
            world.create_asteroid(&mut physics, &mut rng, config.asteroid_spread)?;
        }
        world.create_player_ship(false)?;
        for _ in 0..config.enemy_count {
            let position = random_point(&mut rng, config.enemy_spawn_spread);
            world.create_enemy_ship(position, false)?;
        }

        let stats = world.stats();
        info!(
            "[WORLD] Spawned {} player ship(s), {} enemies, {} asteroids, {} nodes ({} entity chunks, {} component chunks)",
            stats.player_ships,
            stats.enemy_ships,
            stats.asteroids,
            stats.nodes,
            stats.entity_chunks,
            stats.component_chunks()
        );

        Ok(Self {
            world,
            pathfinder: Pathfinder::new(),
            physics,
            render,
            cvars: CVarStore::new(),
            player_input: ShipInput::default(),
            rng,
            config,
            doomed: Vec::new(),
        })
    }

    pub fn config(&self) -> &InitialConfig {
        &self.config
    }

    /// Advance everything by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> Result<(), WorldError> {
        self.render.clear();
        self.update_asteroids(dt);
        self.update_ships(dt)?;
        self.update_nodes();
        self.draw_frame();
        Ok(())
    }

    // ========================================================================
    // Asteroids
    // ========================================================================

    fn update_asteroids(&mut self, dt: f32) {
        let keys = self.world.asteroids().to_vec();
        for key in keys {
            let force = self
                .world
                .component::<ContinuousForceComponent>(key)
                .map_or(Vec3::ZERO, |f| f.force);
            let velocity = match self.world.component_mut::<RigidBodyComponent>(key) {
                Some(body) => {
                    body.velocity += force / body.mass.max(f32::EPSILON) * dt;
                    body.velocity
                }
                None => Vec3::ZERO,
            };

            let Some(transform) = self.world.component_mut::<TransformComponent>(key) else {
                continue;
            };
            let spin = Quat::from_axis_angle(transform.rotation_axis, (transform.rotation_speed * dt).to_radians());
            transform.orientation = (transform.orientation * spin).normalize();
            transform.position += velocity * dt;
            let matrix = transform.matrix();

            if let Some(collider) = self.world.component::<ColliderComponent>(key).and_then(|c| c.collider) {
                self.physics.set_transform(collider, matrix);
            }
        }
    }

    // ========================================================================
    // Ships
    // ========================================================================

    fn update_ships(&mut self, dt: f32) -> Result<(), WorldError> {
        self.doomed.clear();
        let keys = self.world.ships().to_vec();

        for key in keys {
            let Some(kind) = self.world.entity(key).map(|e| e.kind) else {
                continue;
            };
            match self.world.component_mut::<LifecycleComponent>(key) {
                Some(lifecycle) if lifecycle.is_destroyed => continue,
                // Visible to everyone again from this tick on.
                Some(lifecycle) => lifecycle.is_respawning = false,
                None => {}
            }

            let destroyed = match kind {
                EntityType::SpaceShip => self.update_player(key, dt)?,
                EntityType::EnemyShip => self.update_enemy(key, dt)?,
                _ => continue,
            };
            for event in destroyed {
                self.schedule_destroy(event);
            }
        }

        let doomed = std::mem::take(&mut self.doomed);
        for event in &doomed {
            self.world.destroy_ship(event.id, event.kind)?;
            self.respawn(event.kind)?;
            info!("[WORLD] {:?} {} destroyed ({:?}), respawned", event.kind, event.id, event.cause);
        }
        self.doomed = doomed;
        Ok(())
    }

    fn update_enemy(&mut self, key: EntityKey, dt: f32) -> Result<SmallVec<[ShipDestroyed; 2]>, WorldError> {
        let mut pilot = Pilot::load(&self.world, key)?;
        let destroyed = {
            let mut ctx = AiContext {
                world: &self.world,
                pathfinder: &mut self.pathfinder,
                physics: &self.physics,
                render: &mut self.render,
                cvars: &self.cvars,
                rng: &mut self.rng,
                tuning: &self.config.ai,
            };
            ai::update_ai_ship(&mut ctx, &mut pilot, dt)
        };
        if !destroyed.iter().any(|d| d.key == key) {
            pilot.store(&mut self.world)?;
        }
        Ok(destroyed)
    }

    /// Flag a ship destroyed now so later ships ignore it; teardown waits
    /// for the end of the pass.
    fn schedule_destroy(&mut self, event: ShipDestroyed) {
        if self.doomed.iter().any(|d| d.key == event.key) {
            return;
        }
        if let Some(lifecycle) = self.world.component_mut::<LifecycleComponent>(event.key) {
            lifecycle.is_destroyed = true;
        }
        self.doomed.push(event);
    }

    fn respawn(&mut self, kind: EntityType) -> Result<EntityKey, WorldError> {
        match kind {
            EntityType::SpaceShip => self.world.create_player_ship(true),
            _ => {
                let position = random_point(&mut self.rng, self.config.enemy_spawn_spread);
                self.world.create_enemy_ship(position, true)
            }
        }
    }

    /// Ships destroyed during the last tick.
    pub fn last_destroyed(&self) -> &[ShipDestroyed] {
        &self.doomed
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Remove an asteroid from the world and its collider from physics.
    pub fn destroy_asteroid(&mut self, id: EntityId) -> Result<(), WorldError> {
        if let Some(collider) = self.world.destroy_entity(id, EntityType::Asteroid)? {
            self.physics.remove_collider(collider);
        }
        Ok(())
    }

    /// Release the whole world along with every collider it registered.
    pub fn cleanup(&mut self) {
        for collider in self.world.cleanup() {
            self.physics.remove_collider(collider);
        }
        self.doomed.clear();
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Recompute which nodes currently have an asteroid on top of them.
    fn update_nodes(&mut self) {
        let reach = self.world.grid().spacing() * 0.5;
        let reach_sq = reach * reach;
        let rocks: Vec<Vec3> = self
            .world
            .asteroids()
            .iter()
            .filter_map(|key| self.world.position(*key))
            .collect();

        let nodes = self.world.nodes().to_vec();
        for key in nodes {
            let Some(position) = self.world.position(key) else {
                continue;
            };
            let blocked = rocks.iter().any(|rock| rock.distance_squared(position) <= reach_sq);
            if let Some(node) = self.world.component_mut::<AiNavNodeComponent>(key) {
                node.blocked_by_asteroid = blocked;
            }
        }
    }
}

fn random_point<R: Rng>(rng: &mut R, spread: f32) -> Vec3 {
    Vec3::new(
        rng.random_range(-1.0..=1.0),
        rng.random_range(-1.0..=1.0),
        rng.random_range(-1.0..=1.0),
    ) * spread
}
