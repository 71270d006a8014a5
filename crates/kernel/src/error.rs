/// Errors from decoding kernel values that arrive from outside (save data, CLI input).
///
/// Generation itself never fails; these only surface when a name or id does not
/// match the closed biome/tile enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    #[error("unknown biome name: {0:?}")]
    UnknownBiome(String),
    #[error("unknown biome id: {0}")]
    UnknownBiomeId(u8),
    #[error("unknown tile kind: {0:?}")]
    UnknownTileKind(String),
}
