//! Chunked object pools.
//!
//! Every component kind (and the entity records themselves) lives in a
//! [`ChunkAllocator`]: a list of fixed 64-slot chunks with an occupancy bitmap.
//! Chunks are created on demand and released as soon as their last object is
//! freed, so memory is reclaimed at chunk granularity only.
//!
//! Objects are addressed by a [`SlotHandle`] (chunk id + slot index) instead of
//! a pointer. Chunk ids are never reused, so a handle into a released chunk is
//! detected and reported instead of silently aliasing new storage.

mod chunk;


pub use chunk::{ChunkAllocator, SlotHandle, CHUNK_SIZE};
