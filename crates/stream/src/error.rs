use delve_common::{CoordError, SectionCoord};

/// Failures surfaced by the streaming layer.
///
/// Per-section failures during `update` are logged and absorbed; these only
/// reach callers from construction, explicit queries, or object placement.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Coord(#[from] CoordError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("section ({}, {}) is not resident", .0.x, .0.y)]
    NotResident(SectionCoord),
    #[error("section ({}, {}) has not been generated", .0.x, .0.y)]
    NotGenerated(SectionCoord),
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("generation workers have shut down")]
    PoolDisconnected,
}
