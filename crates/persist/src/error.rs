use delve_common::{CoordError, Seed};

/// Errors from building, applying or storing saves.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("coordinate error: {0}")]
    Coord(#[from] CoordError),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("save was made with seed {saved:?}, world uses {current:?}")]
    SeedMismatch { saved: Seed, current: Seed },
    #[error("no saves found")]
    NoSaves,
    #[error("save {0} does not exist")]
    MissingSave(u32),
}
