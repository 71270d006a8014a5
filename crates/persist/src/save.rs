use delve_common::{EntityId, SectionCoord, Seed, TileCoord};
use delve_stream::{MovementHint, WorldStreamer};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::defeated::DefeatedBosses;
use crate::error::PersistError;
use crate::record::ChunkRecord;

pub const SAVE_SCHEMA_VERSION: u32 = 1;

/// Which resident chunks a capture records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkSelection {
    /// Only chunks carrying placed objects.
    #[default]
    Edited,
    /// Every generated chunk currently resident.
    AllResident,
}

/// A chest opened in a section, located by the section it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpenedChest {
    pub section: SectionCoord,
    pub id: EntityId,
}

/// Everything needed to bring a regenerated world back to a saved state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSave {
    pub version: u32,
    pub seed: Seed,
    pub observer: TileCoord,
    pub defeated_bosses: DefeatedBosses,
    #[serde(default)]
    pub opened_chests: Vec<OpenedChest>,
    pub chunks: Vec<ChunkRecord>,
}

/// Outcome of [`WorldSave::restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub chunks: usize,
    pub objects: usize,
    pub chests_opened: usize,
    pub bosses_removed: usize,
    /// Chunks whose regenerated terrain no longer matches the record.
    pub divergent_chunks: usize,
}

impl WorldSave {
    pub fn capture(
        streamer: &WorldStreamer,
        observer: TileCoord,
        defeated: &DefeatedBosses,
        selection: ChunkSelection,
    ) -> Self {
        let mut coords: Vec<SectionCoord> = streamer.resident_coords().collect();
        coords.sort();

        let mut chunks = Vec::new();
        let mut opened_chests = Vec::new();
        for section in coords.iter().filter_map(|c| streamer.section(*c)) {
            chunks.extend(
                section
                    .chunks()
                    .iter()
                    .filter(|c| selection == ChunkSelection::AllResident || !c.objects().is_empty())
                    .map(ChunkRecord::capture),
            );
            opened_chests.extend(section.chests().iter().filter(|c| c.is_opened()).map(|c| {
                OpenedChest {
                    section: section.coord(),
                    id: c.id,
                }
            }));
        }
        tracing::debug!(
            chunks = chunks.len(),
            opened = opened_chests.len(),
            defeated = defeated.len(),
            "captured world save"
        );
        Self {
            version: SAVE_SCHEMA_VERSION,
            seed: streamer.seed(),
            observer,
            defeated_bosses: defeated.clone(),
            opened_chests,
            chunks,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let save: WorldSave = serde_json::from_str(json)?;
        if save.version != SAVE_SCHEMA_VERSION {
            return Err(PersistError::SchemaMismatch {
                file_version: save.version,
                expected_version: SAVE_SCHEMA_VERSION,
            });
        }
        Ok(save)
    }

    /// SHA-256 of the JSON encoding, as lowercase hex.
    pub fn checksum(&self) -> Result<String, PersistError> {
        Ok(sha256_hex(self.to_json()?.as_bytes()))
    }

    /// Apply the save to a streamer built from the same seed.
    ///
    /// Streams around the saved observer, regenerates every section a record
    /// refers to, then re-applies objects, opened chests and defeated bosses.
    pub fn restore(&self, streamer: &mut WorldStreamer) -> Result<RestoreReport, PersistError> {
        if streamer.seed() != self.seed {
            return Err(PersistError::SeedMismatch {
                saved: self.seed,
                current: streamer.seed(),
            });
        }
        streamer.update_at(self.observer, MovementHint::NONE);

        let mut report = RestoreReport::default();
        for record in &self.chunks {
            let tile = record.coord.origin_tile()?;
            let Some(chunk) = streamer
                .get_section(record.coord.section())
                .and_then(|s| s.chunk_containing(tile))
            else {
                tracing::warn!(chunk = ?record.coord, "no section for saved chunk, skipping");
                continue;
            };
            if !record.matches(chunk) {
                tracing::warn!(chunk = ?record.coord, "saved terrain differs from generated terrain");
                report.divergent_chunks += 1;
            }
            for object in &record.objects {
                match streamer.place_object(object.clone()) {
                    Ok(()) => report.objects += 1,
                    Err(err) => {
                        tracing::warn!(object = %object.id.short(), %err, "could not restore object")
                    }
                }
            }
            report.chunks += 1;
        }

        for chest in &self.opened_chests {
            if streamer.get_section(chest.section).is_none() {
                continue;
            }
            let opened = streamer
                .section_mut(chest.section)
                .and_then(|s| s.chest_mut(chest.id))
                .and_then(|c| c.open());
            if opened.is_some() {
                report.chests_opened += 1;
            }
        }

        report.bosses_removed = self.defeated_bosses.prune(streamer);
        tracing::info!(
            chunks = report.chunks,
            objects = report.objects,
            chests = report.chests_opened,
            bosses = report.bosses_removed,
            "restored world save"
        );
        Ok(report)
    }
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
