//! Bosses and chests placed by section generation.

use delve_common::{EntityId, SECTION_TILES, SectionCoord, TILE_PIXELS, TileCoord, TileRect};
use delve_kernel::SeededRandom;
use delve_render::Sprite;
use serde::{Deserialize, Serialize};

/// Roll below this spawns a normal boss.
pub const NORMAL_BOSS_CHANCE: f64 = 0.11;
/// Roll below this (and not below `NORMAL_BOSS_CHANCE`) spawns a mini boss.
pub const MINI_BOSS_CEILING: f64 = 0.36;
/// Chests every section gets.
pub const BASE_CHESTS: usize = 2;
pub const NORMAL_BOSS_CHESTS: usize = 5;
pub const MINI_BOSS_CHESTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossKind {
    Mini,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossStats {
    pub max_hp: u32,
    pub strength: u32,
    pub defense: u32,
}

impl BossKind {
    /// Size of a normal boss from its sub-roll.
    pub fn from_size_roll(roll: f64) -> Self {
        if roll < 0.4 {
            BossKind::Small
        } else if roll < 0.8 {
            BossKind::Medium
        } else {
            BossKind::Large
        }
    }

    /// Edge length of the boss footprint in tiles.
    pub fn size_tiles(self) -> u8 {
        match self {
            BossKind::Mini | BossKind::Small => 2,
            BossKind::Medium => 3,
            BossKind::Large => 4,
        }
    }

    pub fn stats(self) -> BossStats {
        let (max_hp, strength, defense) = match self {
            BossKind::Mini => (200, 15, 8),
            BossKind::Small => (400, 25, 12),
            BossKind::Medium => (800, 35, 18),
            BossKind::Large => (1500, 50, 25),
        };
        BossStats {
            max_hp,
            strength,
            defense,
        }
    }

    pub fn is_mini(self) -> bool {
        self == BossKind::Mini
    }

    pub fn name(self) -> &'static str {
        match self {
            BossKind::Mini => "mini",
            BossKind::Small => "small",
            BossKind::Medium => "medium",
            BossKind::Large => "large",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub kind: BossKind,
    pub section: SectionCoord,
    /// Tile the boss is centred on.
    pub center: TileCoord,
}

impl Boss {
    pub fn stats(&self) -> BossStats {
        self.kind.stats()
    }

    /// Tiles covered by the boss body.
    pub fn footprint(&self) -> TileRect {
        let size = self.kind.size_tiles() as i32;
        let min = TileCoord::new(self.center.x - size / 2, self.center.y - size / 2);
        TileRect {
            min,
            max: TileCoord::new(min.x + size - 1, min.y + size - 1),
        }
    }

    pub fn sprite(&self) -> Sprite {
        if self.kind.is_mini() {
            Sprite::MiniBoss
        } else {
            Sprite::Boss {
                size_tiles: self.kind.size_tiles(),
            }
        }
    }

    /// Edge length of the sprite in world pixels.
    pub fn pixel_size(&self) -> f32 {
        (self.kind.size_tiles() as i32 * TILE_PIXELS) as f32
    }
}

/// A treasure chest. Its loot is fixed at generation time by `loot_seed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chest {
    pub id: EntityId,
    pub position: TileCoord,
    loot_seed: u64,
    opened: bool,
}

impl Chest {
    pub fn new(id: EntityId, position: TileCoord, loot_seed: u64) -> Self {
        Self {
            id,
            position,
            loot_seed,
            opened: false,
        }
    }

    pub fn loot_seed(&self) -> u64 {
        self.loot_seed
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Open the chest, yielding its loot seed the first time only.
    pub fn open(&mut self) -> Option<u64> {
        if self.opened {
            return None;
        }
        self.opened = true;
        Some(self.loot_seed)
    }

    pub fn sprite(&self) -> Sprite {
        if self.opened {
            Sprite::ChestOpen
        } else {
            Sprite::ChestClosed
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Features {
    pub bosses: Vec<Boss>,
    pub chests: Vec<Chest>,
}

/// Roll bosses and chests for one section.
///
/// Order is fixed: the base chests, then the section roll, then the boss size
/// sub-roll and bonus chests. Each chest slot draws from its own stream keyed
/// by the number of chests placed before it.
pub(crate) fn place_features(coord: SectionCoord, origin: TileCoord, rng: &SeededRandom) -> Features {
    let (x, y) = (coord.x as i64, coord.y as i64);
    let mut features = Features::default();

    place_chests(&mut features.chests, BASE_CHESTS, coord, origin, rng);

    let roll = rng.keyed_stream("section", x * 31 + y).next_f64();
    let boss = if roll < NORMAL_BOSS_CHANCE {
        let size_roll = rng.keyed_stream("boss-size", x * 73 + y).next_f64();
        Some((BossKind::from_size_roll(size_roll), NORMAL_BOSS_CHESTS))
    } else if roll < MINI_BOSS_CEILING {
        Some((BossKind::Mini, MINI_BOSS_CHESTS))
    } else {
        None
    };

    if let Some((kind, bonus_chests)) = boss {
        let half = SECTION_TILES / 2;
        features.bosses.push(Boss {
            id: rng.derive_id(&format!("boss:{x}:{y}")),
            kind,
            section: coord,
            center: TileCoord::new(origin.x + half, origin.y + half),
        });
        place_chests(&mut features.chests, bonus_chests, coord, origin, rng);
    }
    features
}

fn place_chests(
    chests: &mut Vec<Chest>,
    count: usize,
    coord: SectionCoord,
    origin: TileCoord,
    rng: &SeededRandom,
) {
    let (x, y) = (coord.x as i64, coord.y as i64);
    for _ in 0..count {
        let index = chests.len();
        let mut stream = rng.keyed_stream("chest", x * 127 + y + index as i64);
        let dx = stream.next_below(SECTION_TILES as u32) as i32;
        let dy = stream.next_below(SECTION_TILES as u32) as i32;
        chests.push(Chest::new(
            rng.derive_id(&format!("chest:{x}:{y}:{index}")),
            TileCoord::new(origin.x + dx, origin.y + dy),
            rng.derive_u64(&format!("loot:{x}:{y}:{index}")),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_common::Seed;

    fn rng() -> SeededRandom {
        SeededRandom::new(Seed::from("test-seed"))
    }

    fn features_at(x: i32, y: i32) -> Features {
        let coord = SectionCoord::new(x, y);
        place_features(coord, coord.origin_tile().unwrap(), &rng())
    }

    #[test]
    fn size_roll_thresholds() {
        assert_eq!(BossKind::from_size_roll(0.0), BossKind::Small);
        assert_eq!(BossKind::from_size_roll(0.399), BossKind::Small);
        assert_eq!(BossKind::from_size_roll(0.4), BossKind::Medium);
        assert_eq!(BossKind::from_size_roll(0.8), BossKind::Large);
    }

    #[test]
    fn chest_count_follows_boss_outcome() {
        for x in -10..10 {
            for y in -10..10 {
                let f = features_at(x, y);
                let expected = match f.bosses.first().map(|b| b.kind) {
                    None => BASE_CHESTS,
                    Some(BossKind::Mini) => BASE_CHESTS + MINI_BOSS_CHESTS,
                    Some(_) => BASE_CHESTS + NORMAL_BOSS_CHESTS,
                };
                assert_eq!(f.chests.len(), expected, "section ({x}, {y})");
                assert!(f.bosses.len() <= 1);
            }
        }
    }

    #[test]
    fn features_stay_inside_their_section() {
        for (x, y) in [(0, 0), (-1, -1), (7, -3), (-20, 15)] {
            let coord = SectionCoord::new(x, y);
            let f = features_at(x, y);
            for chest in &f.chests {
                assert_eq!(chest.position.section(), coord);
            }
            for boss in &f.bosses {
                assert_eq!(boss.center.section(), coord);
                assert_eq!(boss.footprint().min.section(), coord);
                assert_eq!(boss.footprint().max.section(), coord);
            }
        }
    }

    #[test]
    fn boss_sits_at_section_centre() {
        let hit = (-30..30)
            .flat_map(|x| (-30..30).map(move |y| (x, y)))
            .find_map(|(x, y)| features_at(x, y).bosses.into_iter().next());
        let boss = hit.expect("some section in 3600 has a boss");
        let origin = boss.section.origin_tile().unwrap();
        assert_eq!(boss.center, TileCoord::new(origin.x + 40, origin.y + 40));
    }

    #[test]
    fn boss_rates_converge() {
        let (mut normal, mut mini, mut total) = (0usize, 0usize, 0usize);
        for x in -50..50 {
            for y in -50..50 {
                total += 1;
                match features_at(x, y).bosses.first().map(|b| b.kind) {
                    Some(BossKind::Mini) => mini += 1,
                    Some(_) => normal += 1,
                    None => {}
                }
            }
        }
        let normal_rate = normal as f64 / total as f64;
        let mini_rate = mini as f64 / total as f64;
        assert!((normal_rate - NORMAL_BOSS_CHANCE).abs() < 0.03, "normal {normal_rate}");
        assert!(
            (mini_rate - (MINI_BOSS_CEILING - NORMAL_BOSS_CHANCE)).abs() < 0.03,
            "mini {mini_rate}"
        );
    }

    #[test]
    fn placement_is_deterministic() {
        let a = features_at(3, -8);
        let b = features_at(3, -8);
        assert_eq!(a.bosses, b.bosses);
        assert_eq!(a.chests, b.chests);
    }

    #[test]
    fn base_chests_do_not_depend_on_boss_roll() {
        // The first chests come from slots 0 and 1 regardless of what follows.
        let coord = SectionCoord::new(12, 4);
        let origin = coord.origin_tile().unwrap();
        let mut only_base = Vec::new();
        place_chests(&mut only_base, BASE_CHESTS, coord, origin, &rng());
        let full = features_at(12, 4);
        assert_eq!(&full.chests[..BASE_CHESTS], &only_base[..]);
    }

    #[test]
    fn chests_open_once() {
        let mut chest = features_at(0, 0).chests.remove(0);
        let seed = chest.loot_seed();
        assert_eq!(chest.sprite(), Sprite::ChestClosed);
        assert_eq!(chest.open(), Some(seed));
        assert_eq!(chest.open(), None);
        assert!(chest.is_opened());
        assert_eq!(chest.sprite(), Sprite::ChestOpen);
    }

    #[test]
    fn ids_are_unique_within_a_section() {
        let f = features_at(1, 2);
        let mut ids: Vec<EntityId> = f.chests.iter().map(|c| c.id).collect();
        ids.extend(f.bosses.iter().map(|b| b.id));
        let n = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn footprints_match_kind_sizes() {
        for kind in [BossKind::Mini, BossKind::Small, BossKind::Medium, BossKind::Large] {
            let boss = Boss {
                id: EntityId::from_parts(0, 1),
                kind,
                section: SectionCoord::new(0, 0),
                center: TileCoord::new(40, 40),
            };
            let r = boss.footprint();
            let size = kind.size_tiles() as i32;
            assert_eq!(r.max.x - r.min.x + 1, size);
            assert!(r.contains(boss.center));
        }
    }

    #[test]
    fn stats_grow_with_size() {
        let hp: Vec<u32> = [BossKind::Mini, BossKind::Small, BossKind::Medium, BossKind::Large]
            .iter()
            .map(|k| k.stats().max_hp)
            .collect();
        assert!(hp.windows(2).all(|w| w[0] < w[1]));
    }
}
