//! Entity registry.
//!
//! [`World`] owns the entity pool, every component pool, the category lists
//! (ships, asteroids, nodes), the navigation grid and the respawn queues. It is
//! an ordinary value: the simulation context constructs one at startup and
//! drops it at shutdown.
//!
//! Ids are unique per [`EntityType`] only. Fresh entities take the next value
//! of a per-type counter; respawned ships take the oldest id from their
//! category's respawn queue, so a ship keeps its identity across deaths.

mod spawn;

#[cfg(test)]
mod tests;

pub use spawn::{ShipAssets, ASTEROID_VARIANTS, PLAYER_SPAWN, SHIP_PROBE_POINTS};

use bevy::log::{info, warn};
use bevy::math::Vec3;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::game::ecs::{
    ColliderComponent, Component, ComponentKind, ComponentStore, Entity, EntityId, EntityKey,
    EntityType, LifecycleComponent, NodeId, TransformComponent,
};
use crate::game::error::WorldError;
use crate::game::external::ColliderId;
use crate::game::memory::ChunkAllocator;
use crate::game::navigation::NavGrid;

/// Live counts, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub player_ships: usize,
    pub enemy_ships: usize,
    pub asteroids: usize,
    pub nodes: usize,
    pub entity_chunks: usize,
    /// `(kind, live components, chunks)` per pool.
    pub component_pools: Vec<(ComponentKind, usize, usize)>,
}

impl WorldStats {
    pub fn component_chunks(&self) -> usize {
        self.component_pools.iter().map(|(_, _, chunks)| chunks).sum()
    }
}

/// A ship as seen by other ships: only live, non-respawning ones are listed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipView {
    pub key: EntityKey,
    pub id: EntityId,
    pub kind: EntityType,
    pub position: Vec3,
}

pub struct World {
    pub components: ComponentStore,
    entities: ChunkAllocator<Entity>,
    next_serial: u64,
    next_id: [EntityId; 4],
    respawn_ids: [VecDeque<EntityId>; 2],

    all: Vec<EntityKey>,
    ships: Vec<EntityKey>,
    asteroids: Vec<EntityKey>,
    nodes: Vec<EntityKey>,
    node_map: FxHashMap<NodeId, EntityKey>,
    grid: NavGrid,

    assets: ShipAssets,
}

impl World {
    pub fn new(assets: ShipAssets) -> Self {
        Self {
            components: ComponentStore::new(),
            entities: ChunkAllocator::new(),
            next_serial: 0,
            next_id: [0; 4],
            respawn_ids: [VecDeque::new(), VecDeque::new()],
            all: Vec::new(),
            ships: Vec::new(),
            asteroids: Vec::new(),
            nodes: Vec::new(),
            node_map: FxHashMap::default(),
            grid: NavGrid::new(0, 1.0, Vec3::ZERO),
            assets,
        }
    }

    pub fn assets(&self) -> &ShipAssets {
        &self.assets
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Allocate an entity record and give it an id.
    ///
    /// Respawning ships reuse the oldest queued id of their category. An empty
    /// queue is logged and the next fresh id is used instead.
    pub fn create_entity(&mut self, kind: EntityType, respawning: bool) -> EntityKey {
        let id = match (respawning, respawn_queue(kind)) {
            (true, Some(queue)) => match self.respawn_ids[queue].pop_front() {
                Some(id) => id,
                None => {
                    let id = self.fresh_id(kind);
                    warn!(
                        "[WORLD] Respawn requested for {:?} with an empty id queue, using fresh id {}",
                        kind, id
                    );
                    id
                }
            },
            _ => self.fresh_id(kind),
        };
        self.insert_entity(id, kind)
    }

    fn fresh_id(&mut self, kind: EntityType) -> EntityId {
        let counter = &mut self.next_id[kind.index()];
        let id = *counter;
        *counter += 1;
        id
    }

    pub(crate) fn insert_entity(&mut self, id: EntityId, kind: EntityType) -> EntityKey {
        let serial = self.next_serial;
        self.next_serial += 1;
        let slot = self.entities.allocate(Entity::new(id, kind, serial));
        let key = EntityKey { slot, serial };

        self.all.push(key);
        match kind {
            EntityType::SpaceShip | EntityType::EnemyShip => self.ships.push(key),
            EntityType::Asteroid => self.asteroids.push(key),
            EntityType::Node => self.nodes.push(key),
        }
        key
    }

    /// Allocate `value` and attach it to the entity behind `key`.
    pub fn add_component<T: Component>(&mut self, key: EntityKey, value: T) -> Result<(), WorldError> {
        let entity = self
            .entities
            .get_mut(key.slot)
            .filter(|e| e.serial == key.serial)
            .ok_or(WorldError::StaleKey(key))?;
        entity.add_component(&mut self.components, value);
        Ok(())
    }

    // ========================================================================
    // Destruction
    // ========================================================================

    /// Destroy a ship and queue its id for the next respawn of its category.
    ///
    /// The ship's lifecycle component is flagged destroyed before teardown.
    pub fn destroy_ship(&mut self, id: EntityId, kind: EntityType) -> Result<(), WorldError> {
        let Some(key) = self.find(id, kind) else {
            warn!("[WORLD] destroy_ship: no live {:?} with id {}", kind, id);
            return Err(WorldError::EntityNotFound { id, kind });
        };

        if let Some(lifecycle) = self.component_mut::<LifecycleComponent>(key) {
            lifecycle.is_destroyed = true;
        }
        if let Some(queue) = respawn_queue(kind) {
            self.respawn_ids[queue].push_back(id);
        }
        self.destroy_key(key).map(|_| ())
    }

    /// Destroy an entity and free every component it owns. Ids are not queued.
    ///
    /// Returns the physics collider the entity owned, which the caller must
    /// remove from its physics backend.
    pub fn destroy_entity(&mut self, id: EntityId, kind: EntityType) -> Result<Option<ColliderId>, WorldError> {
        let Some(key) = self.find(id, kind) else {
            warn!("[WORLD] destroy_entity: no live {:?} with id {}", kind, id);
            return Err(WorldError::EntityNotFound { id, kind });
        };
        self.destroy_key(key)
    }

    fn destroy_key(&mut self, key: EntityKey) -> Result<Option<ColliderId>, WorldError> {
        let collider = self.component::<ColliderComponent>(key).and_then(|c| c.collider);
        let mut entity = match self.entities.deallocate(key.slot)? {
            Some(entity) => entity,
            None => return Ok(None),
        };
        entity.release_all(&mut self.components)?;

        self.all.retain(|k| *k != key);
        match entity.kind {
            EntityType::SpaceShip | EntityType::EnemyShip => self.ships.retain(|k| *k != key),
            EntityType::Asteroid => self.asteroids.retain(|k| *k != key),
            EntityType::Node => {
                self.nodes.retain(|k| *k != key);
                self.node_map.remove(&entity.id);
                self.grid.remove(entity.id);
            }
        }
        Ok(collider)
    }

    /// Release every entity, component and chunk. Queued respawn ids and id
    /// counters are dropped too.
    ///
    /// Returns the physics colliders that were owned by the released entities.
    pub fn cleanup(&mut self) -> Vec<ColliderId> {
        let colliders: Vec<ColliderId> = self
            .all
            .iter()
            .filter_map(|key| self.component::<ColliderComponent>(*key)?.collider)
            .collect();
        let released = self.entities.len();
        self.components.clear();
        self.entities.clear();
        self.all.clear();
        self.ships.clear();
        self.asteroids.clear();
        self.nodes.clear();
        self.node_map.clear();
        self.grid = NavGrid::new(0, 1.0, Vec3::ZERO);
        self.next_id = [0; 4];
        self.respawn_ids.iter_mut().for_each(VecDeque::clear);
        info!(
            "[WORLD] Cleanup released {} entities and {} colliders",
            released,
            colliders.len()
        );
        colliders
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key.slot).filter(|e| e.serial == key.serial)
    }

    pub fn is_live(&self, key: EntityKey) -> bool {
        self.entity(key).is_some()
    }

    /// First live entity with `id`, any type, in creation order.
    pub fn get_entity(&self, id: EntityId) -> Option<EntityKey> {
        self.all
            .iter()
            .copied()
            .find(|key| self.entity(*key).is_some_and(|e| e.id == id))
    }

    pub fn find(&self, id: EntityId, kind: EntityType) -> Option<EntityKey> {
        let list = match kind {
            EntityType::SpaceShip | EntityType::EnemyShip => &self.ships,
            EntityType::Asteroid => &self.asteroids,
            EntityType::Node => return self.node_map.get(&id).copied(),
        };
        list.iter()
            .copied()
            .find(|key| self.entity(*key).is_some_and(|e| e.id == id && e.kind == kind))
    }

    pub fn component<T: Component>(&self, key: EntityKey) -> Option<&T> {
        self.entity(key)?.get_component(&self.components)
    }

    pub fn component_mut<T: Component>(&mut self, key: EntityKey) -> Option<&mut T> {
        let entity = self.entities.get(key.slot).filter(|e| e.serial == key.serial)?;
        entity.get_component_mut(&mut self.components)
    }

    /// Like [`World::component`], but a missing component is an error.
    pub fn require<T: Component>(&self, key: EntityKey) -> Result<&T, WorldError> {
        let entity = self.entity(key).ok_or(WorldError::StaleKey(key))?;
        entity
            .get_component(&self.components)
            .ok_or(WorldError::MissingComponent {
                id: entity.id,
                kind: entity.kind,
                component: T::KIND,
            })
    }

    /// Write `value` over the entity's existing component of that kind.
    pub fn store<T: Component>(&mut self, key: EntityKey, value: T) -> Result<(), WorldError> {
        let (id, kind) = match self.entity(key) {
            Some(entity) => (entity.id, entity.kind),
            None => return Ok(()),
        };
        match self.component_mut::<T>(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(WorldError::MissingComponent {
                id,
                kind,
                component: T::KIND,
            }),
        }
    }

    pub fn position(&self, key: EntityKey) -> Option<Vec3> {
        self.component::<TransformComponent>(key).map(|t| t.position)
    }

    pub fn entities(&self) -> &[EntityKey] {
        &self.all
    }

    pub fn ships(&self) -> &[EntityKey] {
        &self.ships
    }

    pub fn asteroids(&self) -> &[EntityKey] {
        &self.asteroids
    }

    pub fn nodes(&self) -> &[EntityKey] {
        &self.nodes
    }

    pub fn node_entity(&self, node: NodeId) -> Option<EntityKey> {
        self.node_map.get(&node).copied()
    }

    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    pub fn player_ship(&self) -> Option<EntityKey> {
        self.ships
            .iter()
            .copied()
            .find(|key| self.entity(*key).is_some_and(|e| e.kind == EntityType::SpaceShip))
    }

    /// Ships that are alive and not flagged destroyed or respawning.
    pub fn live_ships(&self) -> impl Iterator<Item = ShipView> + '_ {
        self.ships.iter().filter_map(move |key| {
            let entity = self.entity(*key)?;
            let lifecycle = entity.get_component::<LifecycleComponent>(&self.components);
            if lifecycle.is_some_and(|l| l.is_destroyed || l.is_respawning) {
                return None;
            }
            let position = entity
                .get_component::<TransformComponent>(&self.components)?
                .position;
            Some(ShipView {
                key: *key,
                id: entity.id,
                kind: entity.kind,
                position,
            })
        })
    }

    /// Nearest live ship other than `exclude`, optionally limited to `radius`.
    pub fn nearest_ship(&self, from: Vec3, exclude: EntityKey, radius: Option<f32>) -> Option<ShipView> {
        let limit = radius.map(|r| r * r);
        self.live_ships()
            .filter(|ship| ship.key != exclude)
            .map(|ship| (ship, ship.position.distance_squared(from)))
            .filter(|(_, d2)| limit.map_or(true, |limit| *d2 <= limit))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(ship, _)| ship)
    }

    pub fn queued_respawns(&self, kind: EntityType) -> usize {
        respawn_queue(kind).map_or(0, |q| self.respawn_ids[q].len())
    }

    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            entity_chunks: self.entities.chunk_count(),
            component_pools: self.components.pool_stats(),
            ..WorldStats::default()
        };
        for (_, entity) in self.entities.iter() {
            match entity.kind {
                EntityType::SpaceShip => stats.player_ships += 1,
                EntityType::EnemyShip => stats.enemy_ships += 1,
                EntityType::Asteroid => stats.asteroids += 1,
                EntityType::Node => stats.nodes += 1,
            }
        }
        stats
    }
}

fn respawn_queue(kind: EntityType) -> Option<usize> {
    match kind {
        EntityType::SpaceShip => Some(0),
        EntityType::EnemyShip => Some(1),
        _ => None,
    }
}
