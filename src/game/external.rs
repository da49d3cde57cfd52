//! Seams to the outside world.
//!
//! The simulation only ever talks to physics and rendering through the
//! [`PhysicsBackend`] and [`RenderSink`] traits. The concrete types here are
//! small in-process stand-ins: enough physics for ray probes against
//! asteroids, and a draw list the binary turns into gizmos.

mod physics;
mod render;

pub use physics::{ColliderId, ColliderMeshId, PhysicsBackend, RaycastHit, SpherePhysics};
pub use render::{DrawCommand, DrawList, ModelId, RenderSink};
