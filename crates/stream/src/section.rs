use delve_common::{
    ChunkCoord, EntityId, Fnv1a, SECTION_CHUNKS, SECTION_TILES, SectionCoord, TileCoord, TileRect,
};
use delve_kernel::{Biome, Tile};
use delve_render::{Camera, Canvas, Render};
use glam::Vec2;

use crate::chunk::Chunk;
use crate::context::{BossRegistry, DroppedItem, ItemSink};
use crate::error::StreamError;
use crate::features::{Boss, Chest, place_features};
use crate::generator::SectionGenerator;

/// A 5×5 block of chunks and the unit of feature placement and eviction.
///
/// Created empty; `generate` fills biome, chunks, bosses and chests in one
/// step and is a no-op afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    coord: SectionCoord,
    biome: Option<Biome>,
    /// Row-major, `SECTION_CHUNKS` per row. Empty until generated.
    chunks: Vec<Chunk>,
    bosses: Vec<Boss>,
    chests: Vec<Chest>,
    generated: bool,
}

impl Section {
    pub fn new(coord: SectionCoord) -> Self {
        Self {
            coord,
            biome: None,
            chunks: Vec::new(),
            bosses: Vec::new(),
            chests: Vec::new(),
            generated: false,
        }
    }

    /// Generate content on first call; later calls return immediately.
    ///
    /// Everything is built before any field is written, so a failure leaves
    /// the section untouched and ungenerated.
    pub fn generate(&mut self, generator: &SectionGenerator) -> Result<(), StreamError> {
        if self.generated {
            return Ok(());
        }
        let origin = self.coord.origin_tile()?;
        let origin_chunk = origin.chunk();
        let classifier = generator.classifier();

        let biome = classifier.biome_at(origin.x, origin.y);
        let mut chunks = Vec::with_capacity((SECTION_CHUNKS * SECTION_CHUNKS) as usize);
        for cy in 0..SECTION_CHUNKS {
            for cx in 0..SECTION_CHUNKS {
                let coord = ChunkCoord::new(origin_chunk.x + cx, origin_chunk.y + cy);
                chunks.push(Chunk::generate(coord, classifier)?);
            }
        }
        let features = place_features(self.coord, origin, generator.random());

        tracing::debug!(
            section = ?self.coord,
            %biome,
            bosses = features.bosses.len(),
            chests = features.chests.len(),
            "generated section"
        );
        self.biome = Some(biome);
        self.chunks = chunks;
        self.bosses = features.bosses;
        self.chests = features.chests;
        self.generated = true;
        Ok(())
    }

    pub fn coord(&self) -> SectionCoord {
        self.coord
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// `None` until generated.
    pub fn biome(&self) -> Option<Biome> {
        self.biome
    }

    /// Tile rectangle covered by this section; `None` if it overflows.
    pub fn bounds(&self) -> Option<TileRect> {
        let min = self.coord.origin_tile().ok()?;
        Some(TileRect {
            min,
            max: TileCoord::new(min.x + SECTION_TILES - 1, min.y + SECTION_TILES - 1),
        })
    }

    pub fn contains_tile(&self, tile: TileCoord) -> bool {
        tile.section() == self.coord
    }

    /// Chunk at a local offset in `0..5`; `None` out of range or before generation.
    pub fn chunk(&self, local_x: i32, local_y: i32) -> Option<&Chunk> {
        self.chunks.get(Self::chunk_index(local_x, local_y)?)
    }

    pub fn chunk_mut(&mut self, local_x: i32, local_y: i32) -> Option<&mut Chunk> {
        self.chunks.get_mut(Self::chunk_index(local_x, local_y)?)
    }

    fn chunk_index(local_x: i32, local_y: i32) -> Option<usize> {
        let range = 0..SECTION_CHUNKS;
        (range.contains(&local_x) && range.contains(&local_y))
            .then(|| (local_y * SECTION_CHUNKS + local_x) as usize)
    }

    /// All chunks, row-major; empty before generation.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_containing(&self, tile: TileCoord) -> Option<&Chunk> {
        self.chunk_for(tile.chunk())
    }

    pub fn chunk_containing_mut(&mut self, tile: TileCoord) -> Option<&mut Chunk> {
        if !self.contains_tile(tile) {
            return None;
        }
        let (lx, ly) = tile.chunk().local_in_section();
        self.chunk_mut(lx as i32, ly as i32)
    }

    fn chunk_for(&self, chunk: ChunkCoord) -> Option<&Chunk> {
        if chunk.section() != self.coord {
            return None;
        }
        let (lx, ly) = chunk.local_in_section();
        self.chunk(lx as i32, ly as i32)
    }

    /// Chunks overlapping `rect`.
    pub fn chunks_in_rect(&self, rect: TileRect) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks
            .iter()
            .filter(move |c| c.bounds().intersects(&rect))
    }

    pub fn tile_at(&self, tile: TileCoord) -> Option<&Tile> {
        self.chunk_containing(tile)?.tile_at(tile)
    }

    pub fn has_collision_at(&self, pixel: Vec2) -> bool {
        let Ok(tile) = TileCoord::from_pixels(pixel) else {
            return false;
        };
        self.chunk_containing(tile)
            .is_some_and(|c| c.has_collision_at(pixel))
    }

    /// Bosses placed in this section.
    pub fn entities(&self) -> &[Boss] {
        &self.bosses
    }

    pub fn boss(&self, id: EntityId) -> Option<&Boss> {
        self.bosses.iter().find(|b| b.id == id)
    }

    pub fn chests(&self) -> &[Chest] {
        &self.chests
    }

    pub fn chest_mut(&mut self, id: EntityId) -> Option<&mut Chest> {
        self.chests.iter_mut().find(|c| c.id == id)
    }

    /// Remove a boss from the section and from the active registry.
    ///
    /// Returns `false` if the section has no boss with that id.
    pub fn remove_boss(&mut self, id: EntityId, registry: &mut dyn BossRegistry) -> bool {
        let Some(index) = self.bosses.iter().position(|b| b.id == id) else {
            return false;
        };
        let boss = self.bosses.remove(index);
        registry.deactivate(boss.id);
        tracing::debug!(section = ?self.coord, boss = %boss.id.short(), "removed boss");
        true
    }

    /// Drop an item into the engine item collection, tagged with this section.
    pub fn add_item(&self, sink: &mut dyn ItemSink, item: impl Into<String>, position: Vec2) -> bool {
        sink.push(DroppedItem {
            item: item.into(),
            position,
            section: self.coord,
        })
    }

    /// Stable hash of the generated content: biome, tiles, bosses and chests.
    ///
    /// Placed objects and chest open state are runtime edits and excluded.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a::new();
        h.write_i32(self.coord.x);
        h.write_i32(self.coord.y);
        h.write(&[self.biome.map_or(u8::MAX, Biome::id)]);
        for chunk in &self.chunks {
            chunk.fingerprint_into(&mut h);
        }
        for boss in &self.bosses {
            h.write(boss.id.0.as_bytes());
            h.write(&[boss.kind as u8]);
            h.write_i32(boss.center.x);
            h.write_i32(boss.center.y);
        }
        for chest in &self.chests {
            h.write(chest.id.0.as_bytes());
            h.write_i32(chest.position.x);
            h.write_i32(chest.position.y);
            h.write_u64(chest.loot_seed());
        }
        h.finish()
    }
}

impl Render for Section {
    /// Terrain first, then chests, then bosses. Ungenerated sections draw nothing.
    fn render(&self, canvas: &mut dyn Canvas, camera: &dyn Camera) {
        if !self.generated {
            return;
        }
        for chunk in &self.chunks {
            chunk.render(canvas, camera);
        }
        let scale = camera.scale();
        for chest in &self.chests {
            let screen = camera.world_to_screen(chest.position.to_pixels());
            let size = delve_common::TILE_PIXELS as f32 * scale;
            if camera.is_on_screen(screen, size) {
                canvas.draw_sprite(screen, size, chest.sprite());
            }
        }
        for boss in &self.bosses {
            let screen = camera.world_to_screen(boss.footprint().min.to_pixels());
            let size = boss.pixel_size() * scale;
            if camera.is_on_screen(screen, size) {
                canvas.draw_sprite(screen, size, boss.sprite());
            }
        }
    }
}
