//! Save collaborator for the streamer.
//!
//! The streamer itself never persists anything: eviction throws sections away
//! and regeneration rebuilds them from the seed. What a save has to carry is
//! therefore only what generation cannot reproduce: objects placed on chunks,
//! bosses that were defeated and chests that were opened.
//!
//! # Invariants
//! - A save is only applied to a streamer built from the same seed.
//! - Every saved file is listed in a SHA-256 hash-chained manifest; loads fail
//!   closed on a mismatch.

pub mod defeated;
pub mod error;
pub mod record;
pub mod save;
pub mod store;

pub use defeated::DefeatedBosses;
pub use error::PersistError;
pub use record::ChunkRecord;
pub use save::{ChunkSelection, OpenedChest, RestoreReport, SAVE_SCHEMA_VERSION, WorldSave};
pub use store::{IntegrityManifest, ManifestEntry, SaveMeta, SaveStore};

pub fn crate_info() -> &'static str {
    "delve-persist v0.1.0"
}
