//! Generation kernel: seeded random streams, noise fields, biome classification, tiles.
//!
//! # Invariants
//! - Every output is a pure function of `(seed, coordinate, salt)`.
//! - No global state; two classifiers built from the same seed agree everywhere.
//! - The biome band ladder covers the whole real line with no gap or overlap.

pub mod biome;
pub mod error;
pub mod field;
pub mod rng;
pub mod tile;

pub use biome::{Biome, BiomeClassifier, BiomeSample};
pub use error::KernelError;
pub use field::NoiseField;
pub use rng::{RandomStream, SeededRandom};
pub use tile::{Tile, TileEffect, TileKind};
