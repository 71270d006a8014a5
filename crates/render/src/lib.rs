//! Rendering capabilities: what the world streamer needs from a renderer.
//!
//! # Invariants
//! - Rendering reads world data and never mutates it.
//! - Anything not on screen, or not generated yet, is skipped rather than drawn.
//!
//! The traits are the contract; `AsciiCanvas` + `FollowCamera` are a debug
//! backend used by the CLI and tests. A GPU backend implements the same traits.

mod ascii;
mod camera;
mod canvas;

pub use ascii::{AsciiCanvas, sprite_glyph, tile_glyph};
pub use camera::FollowCamera;
pub use canvas::{Camera, Canvas, Render, Sprite};

pub fn crate_info() -> &'static str {
    "delve-render v0.1.0"
}
