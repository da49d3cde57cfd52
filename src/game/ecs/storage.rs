use super::components::*;
use super::types::{ComponentKind, EntityId};
use crate::game::error::AllocError;
use crate::game::memory::{ChunkAllocator, SlotHandle};

/// A component value as it sits in its pool, tagged with owner and kind mask.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub owner: EntityId,
    pub mask: u32,
    pub value: T,
}

/// Ties a component type to its kind tag and its pool in [`ComponentStore`].
pub trait Component: Sized {
    const KIND: ComponentKind;

    fn pool(store: &ComponentStore) -> &ChunkAllocator<Stored<Self>>;
    fn pool_mut(store: &mut ComponentStore) -> &mut ChunkAllocator<Stored<Self>>;
}

macro_rules! component_store {
    ($($field:ident: $ty:ty => $kind:ident,)*) => {
        /// One chunk allocator per component kind.
        #[derive(Default)]
        pub struct ComponentStore {
            $(pub $field: ChunkAllocator<Stored<$ty>>,)*
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn pool(store: &ComponentStore) -> &ChunkAllocator<Stored<Self>> {
                    &store.$field
                }

                fn pool_mut(store: &mut ComponentStore) -> &mut ChunkAllocator<Stored<Self>> {
                    &mut store.$field
                }
            }
        )*

        impl ComponentStore {
            /// Free the slot behind `handle` in the pool selected by `kind`.
            pub fn release(&mut self, kind: ComponentKind, slot: SlotHandle) -> Result<(), AllocError> {
                match kind {
                    $(ComponentKind::$kind => self.$field.deallocate(slot).map(drop),)*
                }
            }

            /// `(kind, live objects, chunks)` for every pool.
            pub fn pool_stats(&self) -> Vec<(ComponentKind, usize, usize)> {
                vec![$((ComponentKind::$kind, self.$field.len(), self.$field.chunk_count()),)*]
            }

            pub fn clear(&mut self) {
                $(self.$field.clear();)*
            }
        }
    };
}

component_store! {
    transforms: TransformComponent => Transform,
    rigid_bodies: RigidBodyComponent => RigidBody,
    colliders: ColliderComponent => Collider,
    cameras: CameraComponent => Camera,
    forces: ContinuousForceComponent => ContinuousForce,
    renderables: RenderableComponent => Renderable,
    player_inputs: PlayerInputComponent => PlayerInput,
    emitters: ParticleEmitterComponent => ParticleEmitter,
    nav_nodes: AiNavNodeComponent => AiNavNode,
    ai_controllers: AiControllerComponent => AiController,
    path_states: PathStateComponent => PathState,
    lifecycles: LifecycleComponent => Lifecycle,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Component>(&self, slot: SlotHandle) -> Option<&T> {
        T::pool(self).get(slot).map(|stored| &stored.value)
    }

    pub fn get_mut<T: Component>(&mut self, slot: SlotHandle) -> Option<&mut T> {
        T::pool_mut(self).get_mut(slot).map(|stored| &mut stored.value)
    }

    pub fn owner_of<T: Component>(&self, slot: SlotHandle) -> Option<EntityId> {
        T::pool(self).get(slot).map(|stored| stored.owner)
    }
}
