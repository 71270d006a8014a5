//! Streaming: sections, chunks and the world streamer.
//!
//! # Invariants
//! - A section's content is a pure function of `(seed, section coordinate)`;
//!   evicting and regenerating it reproduces it exactly.
//! - At most one resident section per coordinate, and every visible section
//!   is resident.
//! - A section is generated whole or not at all, and a chunk never exists
//!   half-filled. In synchronous mode only generated sections are resident;
//!   in background mode a resident section may still be waiting for its
//!   content.
//! - Queries never generate. Only `update` and `get_section` create sections.
//!
//! Generation runs on the calling thread by default. With
//! [`GenerationMode::Background`] visible sections are requested from a
//! worker pool and adopted on later updates; until then they render as empty
//! and report no collision.

mod arena;
mod chunk;
mod config;
mod context;
mod error;
mod features;
mod generator;
mod object;
mod section;
mod stats;
mod streamer;
mod worker;

pub use arena::{SectionArena, SectionHandle};
pub use chunk::Chunk;
pub use config::{ConfigError, GenerationMode, StreamConfig};
pub use context::{
    ActiveBosses, BossRegistry, DroppedItem, FixedObserver, ItemSink, MovementHint, Observer,
    WorldContext,
};
pub use error::StreamError;
pub use features::{
    BASE_CHESTS, Boss, BossKind, BossStats, Chest, MINI_BOSS_CEILING, MINI_BOSS_CHESTS,
    NORMAL_BOSS_CHANCE, NORMAL_BOSS_CHESTS,
};
pub use generator::SectionGenerator;
pub use object::{ObjectKind, WorldObject};
pub use section::Section;
pub use stats::{StreamStats, UpdateTimings};
pub use streamer::WorldStreamer;
pub use worker::{Completed, GenerationPool};

pub fn crate_info() -> &'static str {
    "delve-stream v0.1.0"
}
