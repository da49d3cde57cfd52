use fixedbitset::FixedBitSet;

use crate::game::error::AllocError;

/// Number of slots in every chunk.
pub const CHUNK_SIZE: usize = 64;

/// Stable address of an object inside a [`ChunkAllocator`].
///
/// `chunk` is the allocator-unique id of the owning chunk (never reused), not
/// its position in the chunk list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle {
    pub chunk: u32,
    pub slot: u8,
}

struct Chunk<T> {
    id: u32,
    slots: Box<[Option<T>]>,
    occupied: FixedBitSet,
    live: usize,
}

impl<T> Chunk<T> {
    fn new(id: u32) -> Self {
        Self {
            id,
            slots: (0..CHUNK_SIZE).map(|_| None).collect(),
            occupied: FixedBitSet::with_capacity(CHUNK_SIZE),
            live: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.live == CHUNK_SIZE
    }
}

/// Fixed-capacity object pool that grows one 64-slot chunk at a time.
///
/// Allocation takes the first free slot of the first chunk that has one and
/// only creates a chunk when every existing chunk is full. A chunk is dropped
/// the moment its last live object is deallocated.
pub struct ChunkAllocator<T> {
    chunks: Vec<Chunk<T>>,
    next_chunk_id: u32,
    len: usize,
}

impl<T> Default for ChunkAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChunkAllocator<T> {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            next_chunk_id: 0,
            len: 0,
        }
    }

    /// Place `value` in the first free slot, creating a chunk if needed.
    pub fn allocate(&mut self, value: T) -> SlotHandle {
        let index = match self.chunks.iter().position(|c| !c.is_full()) {
            Some(index) => index,
            None => {
                let id = self.next_chunk_id;
                self.next_chunk_id += 1;
                self.chunks.push(Chunk::new(id));
                self.chunks.len() - 1
            }
        };

        let chunk = &mut self.chunks[index];
        // A non-full chunk always has a zero bit.
        let slot = chunk.occupied.zeroes().next().unwrap_or(chunk.live);
        chunk.occupied.insert(slot);
        chunk.slots[slot] = Some(value);
        chunk.live += 1;
        self.len += 1;

        SlotHandle {
            chunk: chunk.id,
            slot: slot as u8,
        }
    }

    /// Release the object at `handle` and return it.
    ///
    /// Freeing an already free slot is a no-op returning `Ok(None)`. A handle
    /// whose chunk does not exist is an [`AllocError::InvalidHandle`].
    pub fn deallocate(&mut self, handle: SlotHandle) -> Result<Option<T>, AllocError> {
        let index = self.chunk_index(handle)?;
        let slot = handle.slot as usize;

        let chunk = &mut self.chunks[index];
        if !chunk.occupied.contains(slot) {
            return Ok(None);
        }

        chunk.occupied.set(slot, false);
        chunk.live -= 1;
        self.len -= 1;
        let value = chunk.slots[slot].take();

        if chunk.live == 0 {
            // Chunk ids grow monotonically, so removal keeps the list sorted.
            self.chunks.remove(index);
        }

        Ok(value)
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        let index = self.chunk_index(handle).ok()?;
        self.chunks[index].slots[handle.slot as usize].as_ref()
    }

    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        let index = self.chunk_index(handle).ok()?;
        self.chunks[index].slots[handle.slot as usize].as_mut()
    }

    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Live objects in chunk order, then slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &T)> + '_ {
        self.chunks.iter().flat_map(|chunk| {
            chunk.occupied.ones().filter_map(move |slot| {
                chunk.slots[slot].as_ref().map(|value| {
                    (
                        SlotHandle {
                            chunk: chunk.id,
                            slot: slot as u8,
                        },
                        value,
                    )
                })
            })
        })
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chunks currently backing the pool.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Drop every object and every chunk. Chunk ids keep counting up.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }

    fn chunk_index(&self, handle: SlotHandle) -> Result<usize, AllocError> {
        let invalid = AllocError::InvalidHandle {
            chunk: handle.chunk,
            slot: handle.slot,
        };
        if handle.slot as usize >= CHUNK_SIZE {
            return Err(invalid);
        }
        self.chunks
            .binary_search_by_key(&handle.chunk, |c| c.id)
            .map_err(|_| invalid)
    }
}
