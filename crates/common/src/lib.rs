//! Shared types: world coordinates at every level of the hierarchy, seeds,
//! deterministic entity ids and the FNV-1a hasher they are built on.
//!
//! # Invariants
//! - Every conversion between pixel, tile, chunk and section space floors
//!   toward negative infinity, so negative coordinates partition cleanly.
//! - Nothing in here allocates or touches global state.

pub mod coords;
pub mod hash;
pub mod types;

pub use coords::{
    CHUNK_PIXELS, CHUNK_TILES, ChunkCoord, CoordError, SECTION_CHUNKS, SECTION_PIXELS,
    SECTION_TILES, SectionCoord, TILE_PIXELS, TileCoord, TileRect,
};
pub use hash::Fnv1a;
pub use types::{EntityId, Seed};
