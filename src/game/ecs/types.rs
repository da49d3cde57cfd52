use serde::{Deserialize, Serialize};

use crate::game::memory::SlotHandle;

/// Entity id, unique within its [`EntityType`] only.
pub type EntityId = u32;

/// Linear navigation node id: `x + y*S + z*S*S`.
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    SpaceShip,
    EnemyShip,
    Asteroid,
    Node,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::SpaceShip,
        EntityType::EnemyShip,
        EntityType::Asteroid,
        EntityType::Node,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            EntityType::SpaceShip => 0,
            EntityType::EnemyShip => 1,
            EntityType::Asteroid => 2,
            EntityType::Node => 3,
        }
    }

    pub fn is_ship(self) -> bool {
        matches!(self, EntityType::SpaceShip | EntityType::EnemyShip)
    }
}

/// Closed set of component kinds. [`ComponentKind::bit`] gives the mask value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    RigidBody,
    Collider,
    Camera,
    ContinuousForce,
    Renderable,
    PlayerInput,
    ParticleEmitter,
    AiNavNode,
    AiController,
    PathState,
    Lifecycle,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 12] = [
        ComponentKind::Transform,
        ComponentKind::RigidBody,
        ComponentKind::Collider,
        ComponentKind::Camera,
        ComponentKind::ContinuousForce,
        ComponentKind::Renderable,
        ComponentKind::PlayerInput,
        ComponentKind::ParticleEmitter,
        ComponentKind::AiNavNode,
        ComponentKind::AiController,
        ComponentKind::PathState,
        ComponentKind::Lifecycle,
    ];

    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Generational reference to a live entity record.
///
/// Entity slots are reused, so the serial distinguishes a new occupant from the
/// entity that was destroyed. Resolving a stale key yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub slot: SlotHandle,
    pub serial: u64,
}
