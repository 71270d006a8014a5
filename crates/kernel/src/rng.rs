use delve_common::{EntityId, Fnv1a, Seed};

/// Multiplier and increment of Knuth's MMIX linear congruential generator.
const LCG_MUL: u64 = 6_364_136_223_846_793_005;
const LCG_INC: u64 = 1_442_695_040_888_963_407;

/// Factory for reproducible random streams.
///
/// A stream is identified by `(seed, salt)`. The same pair always yields the
/// same sequence; different salts yield independent sequences. Nothing is
/// shared between streams, so the order in which callers open or advance them
/// cannot influence each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededRandom {
    seed: Seed,
}

impl SeededRandom {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Open the stream for `salt`.
    pub fn stream(&self, salt: &str) -> RandomStream {
        RandomStream::from_state(self.derive_u64(salt))
    }

    /// Open the stream for an integer key inside a namespace, e.g. `("chest", 127)`.
    pub fn keyed_stream(&self, namespace: &str, key: i64) -> RandomStream {
        self.stream(&format!("{namespace}:{key}"))
    }

    /// A well-mixed 64-bit value for `salt`.
    pub fn derive_u64(&self, salt: &str) -> u64 {
        let mut h = Fnv1a::new();
        h.write_u64(self.seed.value());
        h.write(b":");
        h.write(salt.as_bytes());
        splitmix64(h.finish())
    }

    /// Stable entity id for `salt`.
    pub fn derive_id(&self, salt: &str) -> EntityId {
        let high = self.derive_u64(salt);
        EntityId::from_parts(high, splitmix64(high ^ LCG_INC))
    }

    /// A 32-bit seed for a noise source, distinct per `purpose`.
    pub fn derive_noise_seed(&self, purpose: &str) -> u32 {
        (self.derive_u64(purpose) >> 32) as u32
    }
}

/// One deterministic sequence of floats in `[0, 1)`.
///
/// Also an endless `Iterator<Item = f64>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    state: u64,
    draws: u64,
}

impl RandomStream {
    fn from_state(state: u64) -> Self {
        Self { state, draws: 0 }
    }

    /// Advance the generator and return the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        self.draws += 1;
        // Top 53 bits: the low bits of an LCG have short periods.
        (self.state >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Next value scaled to `0..bound` (returns 0 when `bound` is 0).
    pub fn next_below(&mut self, bound: u32) -> u32 {
        ((self.next_f64() * bound as f64) as u32).min(bound.saturating_sub(1))
    }

    /// How many values have been drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Iterator for RandomStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// Splitmix64 finaliser: spreads FNV output across all 64 bits.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
