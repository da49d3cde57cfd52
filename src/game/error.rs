//! Error types for the simulation core.
//!
//! Only programmer errors surface here (bad handles, destroying something that
//! was never created). Gameplay anomalies such as a lost target or an empty
//! navigation grid are recovered in place by the AI and never become errors.

use thiserror::Error;

use crate::game::ecs::{ComponentKind, EntityId, EntityKey, EntityType};

/// Failure raised by a [`ChunkAllocator`](crate::game::memory::ChunkAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The handle names a chunk that does not exist (never allocated or already released).
    #[error("invalid slot handle: chunk {chunk} slot {slot} is not owned by this allocator")]
    InvalidHandle { chunk: u32, slot: u8 },
}

/// Failure raised by [`World`](crate::game::world::World) bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("no live {kind:?} entity with id {id}")]
    EntityNotFound { id: EntityId, kind: EntityType },

    #[error("entity key {0:?} does not resolve to a live entity")]
    StaleKey(EntityKey),

    #[error("{kind:?} entity {id} has no {component:?} component")]
    MissingComponent {
        id: EntityId,
        kind: EntityType,
        component: ComponentKind,
    },

    #[error("navigation grid side {side} gives more lattice positions than node ids")]
    GridTooLarge { side: u32 },

    #[error(transparent)]
    Alloc(#[from] AllocError),
}
