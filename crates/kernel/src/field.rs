use noise::{NoiseFn, Simplex};
use std::fmt;

/// A continuous 2D simplex field sampled at integer tile coordinates.
///
/// `sample` returns roughly `[-1, 1]`; `sample_unit` remaps that to `[0, 1]`.
#[derive(Clone)]
pub struct NoiseField {
    source: Simplex,
    frequency: f64,
    offset: [f64; 2],
}

impl NoiseField {
    pub fn new(seed: u32, frequency: f64) -> Self {
        Self::with_offset(seed, frequency, [0.0, 0.0])
    }

    /// Field whose input is shifted by `offset` tiles before scaling.
    pub fn with_offset(seed: u32, frequency: f64, offset: [f64; 2]) -> Self {
        Self {
            source: Simplex::new(seed),
            frequency,
            offset,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn sample(&self, x: i32, y: i32) -> f64 {
        self.source.get([
            (x as f64 + self.offset[0]) * self.frequency,
            (y as f64 + self.offset[1]) * self.frequency,
        ])
    }

    pub fn sample_unit(&self, x: i32, y: i32) -> f64 {
        ((self.sample(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField")
            .field("frequency", &self.frequency)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
