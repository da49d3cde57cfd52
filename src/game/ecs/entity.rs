use smallvec::SmallVec;

use super::storage::{Component, ComponentStore, Stored};
use super::types::{ComponentKind, EntityId, EntityType};
use crate::game::error::AllocError;
use crate::game::memory::SlotHandle;

/// Where one attached component lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentHandle {
    pub kind: ComponentKind,
    pub slot: SlotHandle,
}

/// An id, a type tag, and the handles of the attached components.
///
/// Ships carry eight components, so the list stays inline.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityType,
    pub(crate) serial: u64,
    components: SmallVec<[ComponentHandle; 8]>,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityType, serial: u64) -> Self {
        Self {
            id,
            kind,
            serial,
            components: SmallVec::new(),
        }
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn components(&self) -> &[ComponentHandle] {
        &self.components
    }

    /// Allocate `value` in its pool and attach it.
    ///
    /// At most one component per kind may be attached; this is the caller's
    /// responsibility and is only checked in debug builds.
    pub fn add_component<T: Component>(&mut self, store: &mut ComponentStore, value: T) -> ComponentHandle {
        debug_assert!(
            !self.has_component(T::KIND),
            "entity {} already has a {:?} component",
            self.id,
            T::KIND
        );
        let slot = T::pool_mut(store).allocate(Stored {
            owner: self.id,
            mask: T::KIND.bit(),
            value,
        });
        let handle = ComponentHandle { kind: T::KIND, slot };
        self.components.push(handle);
        handle
    }

    /// Detach and free the first component whose mask includes `kind`.
    ///
    /// Returns `Ok(false)` when no such component is attached.
    pub fn remove_component(&mut self, store: &mut ComponentStore, kind: ComponentKind) -> Result<bool, AllocError> {
        let Some(index) = self
            .components
            .iter()
            .position(|h| h.kind.bit() & kind.bit() != 0)
        else {
            return Ok(false);
        };
        let handle = self.components.remove(index);
        store.release(handle.kind, handle.slot)?;
        Ok(true)
    }

    pub fn handle_of(&self, kind: ComponentKind) -> Option<SlotHandle> {
        self.components
            .iter()
            .find(|h| h.kind == kind)
            .map(|h| h.slot)
    }

    pub fn get_component<'s, T: Component>(&self, store: &'s ComponentStore) -> Option<&'s T> {
        store.get::<T>(self.handle_of(T::KIND)?)
    }

    pub fn get_component_mut<'s, T: Component>(&self, store: &'s mut ComponentStore) -> Option<&'s mut T> {
        store.get_mut::<T>(self.handle_of(T::KIND)?)
    }

    /// OR of every attached component's kind bit.
    pub fn mask(&self) -> u32 {
        self.components.iter().fold(0, |mask, h| mask | h.kind.bit())
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.mask() & kind.bit() != 0
    }

    /// Free every attached component. Stops at the first bad handle.
    pub(crate) fn release_all(&mut self, store: &mut ComponentStore) -> Result<(), AllocError> {
        for handle in self.components.drain(..) {
            store.release(handle.kind, handle.slot)?;
        }
        Ok(())
    }
}
