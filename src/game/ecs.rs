//! Entity/component storage.
//!
//! Component kinds form a closed set. Each kind has its own
//! [`ChunkAllocator`](crate::game::memory::ChunkAllocator) inside
//! [`ComponentStore`]; an [`Entity`] only keeps a short list of
//! `(kind, slot)` handles and resolves them through the store on access.

mod components;
mod entity;
mod storage;
mod types;

#[cfg(test)]
mod tests;

pub use components::{
    AiControllerComponent, AiNavNodeComponent, AiState, CameraComponent, ColliderComponent,
    ContinuousForceComponent, EmitterParams, LifecycleComponent, ParticleEmitterComponent,
    PathStateComponent, PlayerInputComponent, Projectile, RenderableComponent, ShipMotion,
    RigidBodyComponent, ShipInput, TransformComponent,
};
pub use entity::{ComponentHandle, Entity};
pub use storage::{Component, ComponentStore, Stored};
pub use types::{ComponentKind, EntityId, EntityKey, EntityType, NodeId};
