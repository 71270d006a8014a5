use delve_common::{SectionCoord, Seed};
use delve_kernel::{Biome, BiomeClassifier, TileKind};
use delve_stream::{BossKind, WorldStreamer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Read-only queries against the streamer for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    pub fn summary(streamer: &WorldStreamer) -> StreamerSummary {
        let stats = streamer.stats();
        StreamerSummary {
            seed: streamer.seed(),
            center: streamer.center(),
            resident: streamer.resident_count(),
            visible: streamer.visible_count(),
            pending: streamer.pending_count(),
            total_generated: stats.total_generated,
            total_evicted: stats.total_evicted,
            average_update: streamer.timings().average(),
        }
    }

    /// Report on a resident section; `None` if it is not resident.
    pub fn inspect_section(streamer: &WorldStreamer, coord: SectionCoord) -> Option<SectionInfo> {
        let section = streamer.section(coord)?;
        let mut tiles = BTreeMap::new();
        for chunk in section.chunks() {
            for (_, tile) in chunk.tiles() {
                *tiles.entry(tile.kind()).or_insert(0) += 1;
            }
        }
        Some(SectionInfo {
            coord,
            generated: section.is_generated(),
            biome: section.biome(),
            tiles,
            bosses: section.entities().iter().map(|b| b.kind).collect(),
            chests: section.chests().len(),
            opened_chests: section.chests().iter().filter(|c| c.is_opened()).count(),
            fingerprint: section.fingerprint(),
        })
    }

    /// Count section biomes over a square of sections around `center`
    /// without generating any of them.
    pub fn survey(seed: Seed, center: SectionCoord, radius: i32) -> BiomeSurvey {
        let classifier = BiomeClassifier::new(seed);
        let radius = radius.max(0);
        let mut counts = BTreeMap::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let Some(origin) = center
                    .checked_offset(dx, dy)
                    .and_then(|c| c.origin_tile().ok())
                else {
                    continue;
                };
                *counts
                    .entry(classifier.biome_at(origin.x, origin.y))
                    .or_insert(0) += 1;
            }
        }
        tracing::debug!(?center, radius, kinds = counts.len(), "biome survey");
        BiomeSurvey { counts }
    }
}

#[derive(Debug, Clone)]
pub struct StreamerSummary {
    pub seed: Seed,
    pub center: Option<SectionCoord>,
    pub resident: usize,
    pub visible: usize,
    pub pending: usize,
    pub total_generated: u64,
    pub total_evicted: u64,
    pub average_update: Duration,
}

impl fmt::Display for StreamerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self
            .center
            .map_or_else(|| "-".to_string(), |c| format!("({}, {})", c.x, c.y));
        write!(
            f,
            "Streamer: seed={} center={} resident={} visible={} pending={} generated={} evicted={} avg_update={:?}",
            self.seed,
            center,
            self.resident,
            self.visible,
            self.pending,
            self.total_generated,
            self.total_evicted,
            self.average_update
        )
    }
}

#[derive(Debug, Clone)]
pub struct SectionInfo {
    pub coord: SectionCoord,
    pub generated: bool,
    pub biome: Option<Biome>,
    /// Tile count per kind; sums to 6400 once generated.
    pub tiles: BTreeMap<TileKind, usize>,
    pub bosses: Vec<BossKind>,
    pub chests: usize,
    pub opened_chests: usize,
    pub fingerprint: u64,
}

impl fmt::Display for SectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let biome = self.biome.map_or("-", Biome::name);
        writeln!(
            f,
            "Section ({}, {}) biome={} generated={} fingerprint={:016x}",
            self.coord.x, self.coord.y, biome, self.generated, self.fingerprint
        )?;
        for (kind, count) in &self.tiles {
            writeln!(f, "  {:<9} {count}", kind.name())?;
        }
        let bosses: Vec<&str> = self.bosses.iter().map(|k| k.name()).collect();
        write!(
            f,
            "  bosses=[{}] chests={} opened={}",
            bosses.join(", "),
            self.chests,
            self.opened_chests
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct BiomeSurvey {
    pub counts: BTreeMap<Biome, usize>,
}

impl BiomeSurvey {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Fraction of surveyed sections in `biome`.
    pub fn share(&self, biome: Biome) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(&biome).copied().unwrap_or(0) as f64 / total as f64
    }
}

impl fmt::Display for BiomeSurvey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Biome survey over {} sections:", self.total())?;
        for biome in Biome::ALL {
            writeln!(
                f,
                "  {:<16} {:>5.1}%",
                biome.name(),
                self.share(biome) * 100.0
            )?;
        }
        Ok(())
    }
}
