use delve_common::ChunkCoord;
use delve_kernel::TileKind;
use delve_stream::{Chunk, WorldObject};
use serde::{Deserialize, Serialize};

/// Saved state of one chunk, keyed by its global coordinate.
///
/// Terrain is stored by tile name so a load can tell whether the generator
/// still produces the same chunk. Unknown names decode as floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub coord: ChunkCoord,
    terrain: Vec<String>,
    pub objects: Vec<WorldObject>,
}

impl ChunkRecord {
    pub fn capture(chunk: &Chunk) -> Self {
        Self {
            coord: chunk.coord(),
            terrain: chunk
                .tiles()
                .map(|(_, tile)| tile.kind().name().to_string())
                .collect(),
            objects: chunk.objects().to_vec(),
        }
    }

    /// Saved tile kinds in row-major order.
    pub fn terrain(&self) -> impl Iterator<Item = TileKind> + '_ {
        self.terrain
            .iter()
            .map(|name| TileKind::from_name_or_default(name))
    }

    /// Tiles of `chunk` whose kind differs from the saved terrain.
    ///
    /// A record of the wrong length counts every missing or extra tile.
    pub fn divergent_tiles(&self, chunk: &Chunk) -> usize {
        let current: Vec<TileKind> = chunk.tiles().map(|(_, t)| t.kind()).collect();
        let length_gap = current.len().abs_diff(self.terrain.len());
        let differing = self
            .terrain()
            .zip(current)
            .filter(|(saved, now)| saved != now)
            .count();
        differing + length_gap
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        self.coord == chunk.coord() && self.divergent_tiles(chunk) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_common::{EntityId, Seed, TileCoord};
    use delve_kernel::BiomeClassifier;

    fn chunk_at(x: i32, y: i32) -> Chunk {
        let classifier = BiomeClassifier::new(Seed::from("test-seed"));
        Chunk::generate(ChunkCoord::new(x, y), &classifier).unwrap()
    }

    #[test]
    fn capture_matches_regenerated_chunk() {
        let record = ChunkRecord::capture(&chunk_at(3, -2));
        assert_eq!(record.terrain().count(), 256);
        assert!(record.matches(&chunk_at(3, -2)));
        assert!(!record.matches(&chunk_at(4, -2)));
    }

    #[test]
    fn objects_are_captured() {
        let mut chunk = chunk_at(0, 0);
        chunk.add_object(WorldObject::door(EntityId::from_parts(0, 1), TileCoord::new(2, 3)));
        let record = ChunkRecord::capture(&chunk);
        assert_eq!(record.objects.len(), 1);
        assert_eq!(record.objects[0].id, EntityId::from_parts(0, 1));
    }

    #[test]
    fn unknown_tile_names_decode_as_floor() {
        let mut record = ChunkRecord::capture(&chunk_at(0, 0));
        record.terrain[0] = "magma".into();
        assert_eq!(record.terrain().next(), Some(TileKind::Floor));
    }

    #[test]
    fn truncated_terrain_is_divergent() {
        let chunk = chunk_at(1, 1);
        let mut record = ChunkRecord::capture(&chunk);
        record.terrain.truncate(200);
        assert_eq!(record.divergent_tiles(&chunk), 56);
        assert!(!record.matches(&chunk));
    }
}
