//! Directory-backed save slots.
//!
//! Layout inside the store directory:
//! ```text
//! saves.meta.json          - schema version and save counter
//! saves/
//!   000001.save.json       - one WorldSave per file
//! integrity/
//!   manifest.json          - hash chain over every save file
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::PersistError;
use crate::save::{SAVE_SCHEMA_VERSION, WorldSave, sha256_hex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMeta {
    pub save_schema_version: u32,
    pub save_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
    pub prev_hash: Option<String>,
}

/// Hash chain over the save files, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

pub struct SaveStore {
    root: PathBuf,
    meta: SaveMeta,
    manifest: IntegrityManifest,
}

impl SaveStore {
    /// Open the store at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("saves"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join("saves.meta.json");
        let manifest_path = root.join("integrity").join("manifest.json");

        let (meta, manifest) = if meta_path.exists() {
            let meta: SaveMeta = serde_json::from_reader(File::open(&meta_path)?)?;
            if meta.save_schema_version != SAVE_SCHEMA_VERSION {
                return Err(PersistError::SchemaMismatch {
                    file_version: meta.save_schema_version,
                    expected_version: SAVE_SCHEMA_VERSION,
                });
            }
            let manifest = if manifest_path.exists() {
                serde_json::from_reader(File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            (meta, manifest)
        } else {
            let meta = SaveMeta {
                save_schema_version: SAVE_SCHEMA_VERSION,
                save_count: 0,
            };
            let manifest = IntegrityManifest::default();
            serde_json::to_writer_pretty(File::create(&meta_path)?, &meta)?;
            serde_json::to_writer_pretty(File::create(&manifest_path)?, &manifest)?;
            (meta, manifest)
        };

        Ok(Self {
            root,
            meta,
            manifest,
        })
    }

    /// Write `save` as the next slot and return its index.
    pub fn write(&mut self, save: &WorldSave) -> Result<u32, PersistError> {
        let index = self.meta.save_count + 1;
        let filename = Self::filename(index);
        let bytes = save.to_json()?.into_bytes();
        let hash = sha256_hex(&bytes);
        let prev_hash = self.manifest.entries.last().map(|e| e.sha256.clone());

        std::fs::write(self.root.join("saves").join(&filename), &bytes)?;
        self.manifest.entries.push(ManifestEntry {
            filename,
            sha256: hash,
            prev_hash,
        });
        self.meta.save_count = index;

        self.write_meta()?;
        self.write_manifest()?;
        tracing::info!(index, chunks = save.chunks.len(), "wrote save");
        Ok(index)
    }

    pub fn load(&self, index: u32) -> Result<WorldSave, PersistError> {
        if index == 0 || index > self.meta.save_count {
            return Err(PersistError::MissingSave(index));
        }
        let filename = Self::filename(index);
        let bytes = std::fs::read(self.root.join("saves").join(&filename))?;
        self.verify_file_hash(&filename, &bytes)?;
        let json = String::from_utf8_lossy(&bytes);
        WorldSave::from_json(&json)
    }

    pub fn load_latest(&self) -> Result<WorldSave, PersistError> {
        if self.meta.save_count == 0 {
            return Err(PersistError::NoSaves);
        }
        self.load(self.meta.save_count)
    }

    /// Check the manifest chain and every listed file's hash.
    pub fn verify_integrity(&self) -> Result<(), PersistError> {
        let mut prev_hash: Option<String> = None;
        for entry in &self.manifest.entries {
            if entry.prev_hash != prev_hash {
                return Err(PersistError::IntegrityMismatch {
                    expected: prev_hash.unwrap_or_else(|| "None".into()),
                    actual: entry.prev_hash.clone().unwrap_or_else(|| "None".into()),
                });
            }
            let data = std::fs::read(self.root.join("saves").join(&entry.filename))?;
            let actual = sha256_hex(&data);
            if actual != entry.sha256 {
                return Err(PersistError::IntegrityMismatch {
                    expected: entry.sha256.clone(),
                    actual,
                });
            }
            prev_hash = Some(entry.sha256.clone());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &SaveMeta {
        &self.meta
    }

    pub fn manifest(&self) -> &IntegrityManifest {
        &self.manifest
    }

    fn filename(index: u32) -> String {
        format!("{index:06}.save.json")
    }

    fn verify_file_hash(&self, filename: &str, data: &[u8]) -> Result<(), PersistError> {
        let entry = self
            .manifest
            .entries
            .iter()
            .find(|e| e.filename == filename)
            .ok_or_else(|| PersistError::IntegrityMismatch {
                expected: format!("manifest entry for {filename}"),
                actual: "none".into(),
            })?;
        let actual = sha256_hex(data);
        if entry.sha256 != actual {
            return Err(PersistError::IntegrityMismatch {
                expected: entry.sha256.clone(),
                actual,
            });
        }
        Ok(())
    }

    fn write_meta(&self) -> Result<(), PersistError> {
        let path = self.root.join("saves.meta.json");
        serde_json::to_writer_pretty(File::create(path)?, &self.meta)?;
        Ok(())
    }

    fn write_manifest(&self) -> Result<(), PersistError> {
        let path = self.root.join("integrity").join("manifest.json");
        serde_json::to_writer_pretty(File::create(path)?, &self.manifest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkSelection, DefeatedBosses};
    use delve_common::{EntityId, TileCoord};
    use delve_stream::{MovementHint, WorldStreamer};

    fn sample_save(observer: TileCoord) -> WorldSave {
        let mut streamer = WorldStreamer::with_seed(7u64);
        streamer.update_at(observer, MovementHint::NONE);
        let defeated: DefeatedBosses = [EntityId::from_parts(1, 1)].into_iter().collect();
        WorldSave::capture(&streamer, observer, &defeated, ChunkSelection::Edited)
    }

    #[test]
    fn open_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SaveStore::open(tmp.path().join("slots")).unwrap();
        assert_eq!(store.meta().save_count, 0);
        assert!(store.root().join("saves").is_dir());
        assert!(store.root().join("integrity").is_dir());
        assert!(matches!(store.load_latest(), Err(PersistError::NoSaves)));
    }

    #[test]
    fn write_and_reload_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("slots");
        let first = sample_save(TileCoord::new(0, 0));
        let second = sample_save(TileCoord::new(200, 40));
        {
            let mut store = SaveStore::open(&path).unwrap();
            assert_eq!(store.write(&first).unwrap(), 1);
            assert_eq!(store.write(&second).unwrap(), 2);
        }

        let store = SaveStore::open(&path).unwrap();
        assert_eq!(store.meta().save_count, 2);
        assert_eq!(store.load_latest().unwrap(), second);
        assert_eq!(store.load(1).unwrap(), first);
        assert!(matches!(store.load(3), Err(PersistError::MissingSave(3))));
        store.verify_integrity().unwrap();
    }

    #[test]
    fn manifest_chains_hashes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SaveStore::open(tmp.path()).unwrap();
        store.write(&sample_save(TileCoord::new(0, 0))).unwrap();
        store.write(&sample_save(TileCoord::new(1, 0))).unwrap();
        let entries = &store.manifest().entries;
        assert_eq!(entries[0].prev_hash, None);
        assert_eq!(entries[1].prev_hash.as_deref(), Some(entries[0].sha256.as_str()));
    }

    #[test]
    fn corruption_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = SaveStore::open(tmp.path()).unwrap();
        store.write(&sample_save(TileCoord::new(0, 0))).unwrap();

        let file = store.root().join("saves").join("000001.save.json");
        let mut bytes = std::fs::read(&file).unwrap();
        bytes.push(b' ');
        std::fs::write(&file, bytes).unwrap();

        assert!(matches!(
            store.verify_integrity(),
            Err(PersistError::IntegrityMismatch { .. })
        ));
        assert!(matches!(
            store.load_latest(),
            Err(PersistError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn rejects_newer_schema() {
        let tmp = tempfile::tempdir().unwrap();
        SaveStore::open(tmp.path()).unwrap();
        let meta = SaveMeta {
            save_schema_version: SAVE_SCHEMA_VERSION + 1,
            save_count: 0,
        };
        let meta_path = tmp.path().join("saves.meta.json");
        serde_json::to_writer(File::create(meta_path).unwrap(), &meta).unwrap();
        assert!(matches!(
            SaveStore::open(tmp.path()),
            Err(PersistError::SchemaMismatch { .. })
        ));
    }
}
