//! Biome classification.
//!
//! Three independent simplex fields (base, temperature, moisture) are combined
//! as `base + 0.5 * temperature + 0.5 * moisture` and the result is looked up
//! in an ordered band ladder, from enclosed biomes at the low end to open and
//! hazardous ones at the high end. A fourth, higher-frequency detail field
//! then picks the concrete tile inside the biome.

use delve_common::{Seed, TileCoord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KernelError;
use crate::field::NoiseField;
use crate::rng::SeededRandom;
use crate::tile::{Tile, TileKind};

/// Terrain style of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    NarrowTunnels,
    OpenCaverns,
    CrystalDepths,
    MushroomCaverns,
    AbyssChasm,
    ForgottenRuins,
    LavaHollows,
}

impl Biome {
    pub const ALL: [Biome; 7] = [
        Biome::NarrowTunnels,
        Biome::OpenCaverns,
        Biome::CrystalDepths,
        Biome::MushroomCaverns,
        Biome::AbyssChasm,
        Biome::ForgottenRuins,
        Biome::LavaHollows,
    ];

    /// Used when the combined noise is not a number.
    pub const FALLBACK: Biome = Biome::OpenCaverns;

    /// Inclusive lower bound of each band, ascending.
    const BANDS: [(f64, Biome); 7] = [
        (f64::NEG_INFINITY, Biome::NarrowTunnels),
        (-0.6, Biome::OpenCaverns),
        (-0.3, Biome::CrystalDepths),
        (0.0, Biome::MushroomCaverns),
        (0.2, Biome::AbyssChasm),
        (0.4, Biome::ForgottenRuins),
        (0.6, Biome::LavaHollows),
    ];

    /// Map a combined noise value to its band. `None` only for NaN.
    pub fn classify(combined: f64) -> Option<Biome> {
        if combined.is_nan() {
            return None;
        }
        Self::BANDS
            .iter()
            .rev()
            .find(|(lower, _)| combined >= *lower)
            .map(|(_, biome)| *biome)
    }

    /// Half-open range `[lower, upper)` of combined values mapping to this biome.
    pub fn band(self) -> (f64, f64) {
        let i = self as usize;
        let lower = Self::BANDS[i].0;
        let upper = Self::BANDS.get(i + 1).map_or(f64::INFINITY, |b| b.0);
        (lower, upper)
    }

    /// Pick a tile kind from a detail sample in `[0, 1]` and the base sample in `[-1, 1]`.
    ///
    /// Every ladder is checked top to bottom; thresholds are inclusive.
    pub fn tile_kind(self, detail: f64, base: f64) -> TileKind {
        match self {
            Biome::NarrowTunnels => {
                if detail >= 0.7 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
            Biome::OpenCaverns => {
                if detail >= 0.85 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
            Biome::CrystalDepths => {
                if detail >= 0.75 {
                    TileKind::Crystal
                } else if detail >= 0.6 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
            Biome::MushroomCaverns => {
                if detail >= 0.7 && base > 0.0 {
                    TileKind::Mushroom
                } else if detail >= 0.8 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
            Biome::AbyssChasm => {
                if detail < 0.35 {
                    TileKind::Chasm
                } else if detail >= 0.85 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
            Biome::ForgottenRuins => {
                if detail >= 0.9 {
                    TileKind::Pillar
                } else if detail >= 0.85 {
                    TileKind::Rubble
                } else if detail >= 0.7 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
            Biome::LavaHollows => {
                // Pools widen where the base field dips.
                if detail < 0.45 - base * 0.15 {
                    TileKind::Lava
                } else if detail >= 0.8 {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::NarrowTunnels => "NarrowTunnels",
            Biome::OpenCaverns => "OpenCaverns",
            Biome::CrystalDepths => "CrystalDepths",
            Biome::MushroomCaverns => "MushroomCaverns",
            Biome::AbyssChasm => "AbyssChasm",
            Biome::ForgottenRuins => "ForgottenRuins",
            Biome::LavaHollows => "LavaHollows",
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Biome {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Biome::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| KernelError::UnknownBiome(s.to_string()))
    }
}

impl TryFrom<u8> for Biome {
    type Error = KernelError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Biome::ALL
            .get(id as usize)
            .copied()
            .ok_or(KernelError::UnknownBiomeId(id))
    }
}

/// All noise values that went into classifying one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeSample {
    pub base: f64,
    pub temperature: f64,
    pub moisture: f64,
    /// Detail field remapped to `[0, 1]`.
    pub detail: f64,
}

impl BiomeSample {
    pub fn combined(&self) -> f64 {
        self.base + 0.5 * self.temperature + 0.5 * self.moisture
    }
}

/// Maps tile coordinates to biomes and tile kinds for one seed.
#[derive(Debug, Clone)]
pub struct BiomeClassifier {
    base: NoiseField,
    temperature: NoiseField,
    moisture: NoiseField,
    detail: NoiseField,
}

impl BiomeClassifier {
    /// Biome-scale fields vary over a few sections; detail varies per tile.
    pub const BASE_FREQUENCY: f64 = 0.006;
    pub const CLIMATE_FREQUENCY: f64 = 0.004;
    pub const DETAIL_FREQUENCY: f64 = 0.2;
    /// Shift of the climate fields so the origin is not a shared zero crossing.
    const CLIMATE_OFFSET: f64 = 1000.0;

    pub fn new(seed: Seed) -> Self {
        let rng = SeededRandom::new(seed);
        Self {
            base: NoiseField::new(rng.derive_noise_seed("biome-base"), Self::BASE_FREQUENCY),
            temperature: NoiseField::with_offset(
                rng.derive_noise_seed("biome-temperature"),
                Self::CLIMATE_FREQUENCY,
                [Self::CLIMATE_OFFSET, Self::CLIMATE_OFFSET],
            ),
            moisture: NoiseField::with_offset(
                rng.derive_noise_seed("biome-moisture"),
                Self::CLIMATE_FREQUENCY,
                [-Self::CLIMATE_OFFSET, -Self::CLIMATE_OFFSET],
            ),
            detail: NoiseField::new(rng.derive_noise_seed("tile-detail"), Self::DETAIL_FREQUENCY),
        }
    }

    pub fn sample(&self, x: i32, y: i32) -> BiomeSample {
        BiomeSample {
            base: self.base.sample(x, y),
            temperature: self.temperature.sample(x, y),
            moisture: self.moisture.sample(x, y),
            detail: self.detail.sample_unit(x, y),
        }
    }

    pub fn biome_at(&self, x: i32, y: i32) -> Biome {
        self.biome_for(&self.sample(x, y))
    }

    pub fn tile_kind_at(&self, x: i32, y: i32) -> TileKind {
        let s = self.sample(x, y);
        self.biome_for(&s).tile_kind(s.detail, s.base)
    }

    pub fn tile_at(&self, coord: TileCoord) -> Tile {
        Tile::new(self.tile_kind_at(coord.x, coord.y))
    }

    fn biome_for(&self, sample: &BiomeSample) -> Biome {
        let combined = sample.combined();
        Biome::classify(combined).unwrap_or_else(|| {
            tracing::warn!(combined, "biome classification fell through; using fallback");
            Biome::FALLBACK
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_inclusive_below() {
        assert_eq!(Biome::classify(-0.6), Some(Biome::OpenCaverns));
        assert_eq!(Biome::classify(-0.600_000_1), Some(Biome::NarrowTunnels));
        assert_eq!(Biome::classify(0.0), Some(Biome::MushroomCaverns));
        assert_eq!(Biome::classify(-0.0), Some(Biome::MushroomCaverns));
        assert_eq!(Biome::classify(0.6), Some(Biome::LavaHollows));
    }

    #[test]
    fn infinities_land_in_outer_bands() {
        assert_eq!(Biome::classify(f64::NEG_INFINITY), Some(Biome::NarrowTunnels));
        assert_eq!(Biome::classify(f64::INFINITY), Some(Biome::LavaHollows));
        assert_eq!(Biome::classify(f64::NAN), None);
    }

    #[test]
    fn bands_cover_range_without_gap_or_overlap() {
        // The three fields each span about [-1, 1], so combined spans [-2, 2];
        // sweep well past that.
        let steps = 200_000;
        for i in 0..=steps {
            let v = -3.0 + 6.0 * i as f64 / steps as f64;
            let containing: Vec<Biome> = Biome::ALL
                .into_iter()
                .filter(|b| {
                    let (lo, hi) = b.band();
                    v >= lo && v < hi
                })
                .collect();
            assert_eq!(containing.len(), 1, "value {v} in bands {containing:?}");
            assert_eq!(Biome::classify(v), Some(containing[0]));
        }
    }

    #[test]
    fn synthetic_noise_triples_always_classify() {
        let grid = [-1.0, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75, 1.0];
        for base in grid {
            for temperature in grid {
                for moisture in grid {
                    let s = BiomeSample {
                        base,
                        temperature,
                        moisture,
                        detail: 0.5,
                    };
                    assert!(Biome::classify(s.combined()).is_some());
                }
            }
        }
    }

    #[test]
    fn bands_are_ordered_and_contiguous() {
        let mut prev_upper = f64::NEG_INFINITY;
        for b in Biome::ALL {
            let (lo, hi) = b.band();
            assert_eq!(lo, prev_upper);
            assert!(lo < hi);
            prev_upper = hi;
        }
        assert_eq!(prev_upper, f64::INFINITY);
    }

    #[test]
    fn tile_ladders() {
        assert_eq!(Biome::NarrowTunnels.tile_kind(0.7, 0.0), TileKind::Wall);
        assert_eq!(Biome::NarrowTunnels.tile_kind(0.69, 0.0), TileKind::Floor);
        assert_eq!(Biome::CrystalDepths.tile_kind(0.8, 0.0), TileKind::Crystal);
        assert_eq!(Biome::CrystalDepths.tile_kind(0.65, 0.0), TileKind::Wall);
        assert_eq!(Biome::MushroomCaverns.tile_kind(0.75, 0.1), TileKind::Mushroom);
        assert_eq!(Biome::MushroomCaverns.tile_kind(0.75, -0.1), TileKind::Floor);
        assert_eq!(Biome::MushroomCaverns.tile_kind(0.85, -0.1), TileKind::Wall);
        assert_eq!(Biome::AbyssChasm.tile_kind(0.2, 0.0), TileKind::Chasm);
        assert_eq!(Biome::AbyssChasm.tile_kind(0.35, 0.0), TileKind::Floor);
        assert_eq!(Biome::ForgottenRuins.tile_kind(0.95, 0.0), TileKind::Pillar);
        assert_eq!(Biome::ForgottenRuins.tile_kind(0.87, 0.0), TileKind::Rubble);
        assert_eq!(Biome::LavaHollows.tile_kind(0.5, -1.0), TileKind::Lava);
        assert_eq!(Biome::LavaHollows.tile_kind(0.5, 1.0), TileKind::Floor);
        assert_eq!(Biome::LavaHollows.tile_kind(0.9, 0.0), TileKind::Wall);
    }

    #[test]
    fn every_ladder_is_total_over_unit_detail() {
        for b in Biome::ALL {
            for i in 0..=100 {
                for base in [-1.0, 0.0, 1.0] {
                    // Must not panic.
                    let _ = b.tile_kind(i as f64 / 100.0, base);
                }
            }
        }
    }

    #[test]
    fn classifier_is_deterministic_across_instances() {
        let a = BiomeClassifier::new(Seed::from("test-seed"));
        let b = BiomeClassifier::new(Seed::from("test-seed"));
        for x in (-400..400).step_by(37) {
            for y in (-400..400).step_by(41) {
                assert_eq!(a.biome_at(x, y), b.biome_at(x, y));
                assert_eq!(a.tile_kind_at(x, y), b.tile_kind_at(x, y));
            }
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let c = BiomeClassifier::new(Seed::new(7));
        let first = c.tile_kind_at(12, -99);
        for _ in 0..10 {
            assert_eq!(c.tile_kind_at(12, -99), first);
        }
    }

    #[test]
    fn large_area_produces_several_biomes() {
        let c = BiomeClassifier::new(Seed::new(1234));
        let mut seen = std::collections::BTreeSet::new();
        for x in (-4000..4000).step_by(40) {
            for y in (-4000..4000).step_by(40) {
                seen.insert(c.biome_at(x, y));
            }
        }
        assert!(seen.len() >= 4, "only saw {seen:?}");
    }

    #[test]
    fn biome_names_and_ids_round_trip() {
        for b in Biome::ALL {
            assert_eq!(b.name().parse::<Biome>().unwrap(), b);
            assert_eq!(Biome::try_from(b.id()).unwrap(), b);
        }
        assert!(matches!(
            Biome::try_from(7),
            Err(KernelError::UnknownBiomeId(7))
        ));
        assert!("Swamp".parse::<Biome>().is_err());
    }
}
