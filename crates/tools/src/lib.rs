//! Developer tooling: read-only inspection of a running streamer.
//!
//! # Invariants
//! - Inspection never creates, generates or evicts sections.

pub mod inspector;

pub use inspector::{BiomeSurvey, SectionInfo, StreamerSummary, WorldInspector};

pub fn crate_info() -> &'static str {
    "delve-tools v0.1.0"
}
