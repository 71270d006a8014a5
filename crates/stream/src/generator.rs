use delve_common::{SectionCoord, Seed};
use delve_kernel::{BiomeClassifier, SeededRandom};

use crate::error::StreamError;
use crate::section::Section;

/// Everything section generation reads, derived once from the seed.
///
/// Immutable after construction, so worker threads share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SectionGenerator {
    random: SeededRandom,
    classifier: BiomeClassifier,
}

impl SectionGenerator {
    pub fn new(seed: Seed) -> Self {
        Self {
            random: SeededRandom::new(seed),
            classifier: BiomeClassifier::new(seed),
        }
    }

    pub fn seed(&self) -> Seed {
        self.random.seed()
    }

    pub fn random(&self) -> &SeededRandom {
        &self.random
    }

    pub fn classifier(&self) -> &BiomeClassifier {
        &self.classifier
    }

    /// A fully generated section at `coord`.
    pub fn generate(&self, coord: SectionCoord) -> Result<Section, StreamError> {
        let mut section = Section::new(coord);
        section.generate(self)?;
        Ok(section)
    }
}
