use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KernelError;

/// Concrete terrain type of one tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    #[default]
    Floor,
    Wall,
    Crystal,
    Mushroom,
    Chasm,
    Lava,
    Pillar,
    Rubble,
}

impl TileKind {
    pub const ALL: [TileKind; 8] = [
        TileKind::Floor,
        TileKind::Wall,
        TileKind::Crystal,
        TileKind::Mushroom,
        TileKind::Chasm,
        TileKind::Lava,
        TileKind::Pillar,
        TileKind::Rubble,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TileKind::Floor => "floor",
            TileKind::Wall => "wall",
            TileKind::Crystal => "crystal",
            TileKind::Mushroom => "mushroom",
            TileKind::Chasm => "chasm",
            TileKind::Lava => "lava",
            TileKind::Pillar => "pillar",
            TileKind::Rubble => "rubble",
        }
    }

    /// Decode a kind from save data, substituting the safe default for
    /// anything unrecognised.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            tracing::warn!(%err, "substituting floor for unrecognised tile kind");
            TileKind::default()
        })
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TileKind {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| KernelError::UnknownTileKind(s.to_string()))
    }
}

/// What standing on a tile does to an entity, per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileEffect {
    pub damage_per_second: f32,
    pub speed_multiplier: f32,
    pub deadly: bool,
}

impl TileEffect {
    pub const NONE: TileEffect = TileEffect {
        damage_per_second: 0.0,
        speed_multiplier: 1.0,
        deadly: false,
    };
}

/// One tile of generated terrain.
///
/// Physical properties are derived from the kind alone; a tile carries no
/// position (its chunk knows where it is).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tile {
    kind: TileKind,
}

impl Tile {
    pub const fn new(kind: TileKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Blocks movement.
    pub fn collidable(&self) -> bool {
        matches!(
            self.kind,
            TileKind::Wall | TileKind::Chasm | TileKind::Pillar
        )
    }

    /// Damage per second dealt while standing on the tile.
    pub fn hazard_damage(&self) -> f32 {
        match self.kind {
            TileKind::Lava => 8.0,
            _ => 0.0,
        }
    }

    /// Speed multiplier applied while on the tile, if any.
    pub fn movement_modifier(&self) -> Option<f32> {
        match self.kind {
            TileKind::Mushroom => Some(0.5),
            TileKind::Rubble => Some(0.75),
            _ => None,
        }
    }

    /// Falling in is fatal regardless of hit points.
    pub fn is_deadly(&self) -> bool {
        self.kind == TileKind::Chasm
    }

    pub fn is_hazard(&self) -> bool {
        self.hazard_damage() > 0.0 || self.is_deadly()
    }

    /// Emits light; renderers draw a halo.
    pub fn glowing(&self) -> bool {
        matches!(self.kind, TileKind::Crystal | TileKind::Lava)
    }

    pub fn effect(&self) -> TileEffect {
        TileEffect {
            damage_per_second: self.hazard_damage(),
            speed_multiplier: self.movement_modifier().unwrap_or(1.0),
            deadly: self.is_deadly(),
        }
    }
}

impl From<TileKind> for Tile {
    fn from(kind: TileKind) -> Self {
        Self::new(kind)
    }
}
