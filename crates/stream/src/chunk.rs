use delve_common::{
    CHUNK_PIXELS, CHUNK_TILES, ChunkCoord, CoordError, EntityId, Fnv1a, TILE_PIXELS, TileCoord,
    TileRect,
};
use delve_kernel::{BiomeClassifier, Tile};
use delve_render::{Camera, Canvas, Render};
use glam::Vec2;

use crate::object::WorldObject;

const TILE_COUNT: usize = (CHUNK_TILES * CHUNK_TILES) as usize;

/// A 16×16 block of generated tiles plus any objects placed on it.
///
/// Chunks only exist fully generated: `generate` fills every tile before the
/// chunk is handed out, so no query can observe a partial grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    coord: ChunkCoord,
    origin: TileCoord,
    tiles: Box<[Tile; TILE_COUNT]>,
    objects: Vec<WorldObject>,
}

impl Chunk {
    /// Sample the classifier for every tile of the chunk at `coord`.
    pub fn generate(coord: ChunkCoord, classifier: &BiomeClassifier) -> Result<Self, CoordError> {
        let origin = coord.origin_tile()?;
        let mut tiles = Box::new([Tile::default(); TILE_COUNT]);
        for ly in 0..CHUNK_TILES {
            for lx in 0..CHUNK_TILES {
                let t = TileCoord::new(origin.x + lx, origin.y + ly);
                tiles[(ly * CHUNK_TILES + lx) as usize] = classifier.tile_at(t);
            }
        }
        Ok(Self {
            coord,
            origin,
            tiles,
            objects: Vec::new(),
        })
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn origin_tile(&self) -> TileCoord {
        self.origin
    }

    pub fn pixel_origin(&self) -> Vec2 {
        self.origin.to_pixels()
    }

    pub fn bounds(&self) -> TileRect {
        TileRect {
            min: self.origin,
            max: TileCoord::new(
                self.origin.x + CHUNK_TILES - 1,
                self.origin.y + CHUNK_TILES - 1,
            ),
        }
    }

    /// Tile at a local offset; `None` outside `0..16` on either axis.
    pub fn tile(&self, local_x: i32, local_y: i32) -> Option<&Tile> {
        if !(0..CHUNK_TILES).contains(&local_x) || !(0..CHUNK_TILES).contains(&local_y) {
            return None;
        }
        self.tiles.get((local_y * CHUNK_TILES + local_x) as usize)
    }

    /// Tile at an absolute coordinate, if this chunk covers it.
    pub fn tile_at(&self, coord: TileCoord) -> Option<&Tile> {
        self.tile(coord.x - self.origin.x, coord.y - self.origin.y)
    }

    pub fn contains_tile(&self, coord: TileCoord) -> bool {
        self.bounds().contains(coord)
    }

    /// Every tile with its absolute coordinate, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            let i = i as i32;
            let coord = TileCoord::new(
                self.origin.x + i % CHUNK_TILES,
                self.origin.y + i / CHUNK_TILES,
            );
            (coord, tile)
        })
    }

    /// Whether the pixel is blocked by a collidable tile or a collidable object.
    ///
    /// Pixels outside this chunk, or not finite, report no collision.
    pub fn has_collision_at(&self, pixel: Vec2) -> bool {
        let Ok(coord) = TileCoord::from_pixels(pixel) else {
            return false;
        };
        let Some(tile) = self.tile_at(coord) else {
            return false;
        };
        tile.collidable()
            || self
                .objects
                .iter()
                .any(|o| o.collidable() && o.contains_point(pixel))
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut WorldObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Place an object; an object with the same id is replaced.
    pub fn add_object(&mut self, object: WorldObject) {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    pub fn remove_object(&mut self, id: EntityId) -> Option<WorldObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    /// Feed the generated terrain (not placed objects) into `hasher`.
    pub fn fingerprint_into(&self, hasher: &mut Fnv1a) {
        hasher.write_i32(self.coord.x);
        hasher.write_i32(self.coord.y);
        for tile in self.tiles.iter() {
            hasher.write(&[tile.kind() as u8]);
        }
    }
}

impl Render for Chunk {
    fn render(&self, canvas: &mut dyn Canvas, camera: &dyn Camera) {
        let scale = camera.scale();
        let chunk_screen = camera.world_to_screen(self.pixel_origin());
        if !camera.is_on_screen(chunk_screen, CHUNK_PIXELS as f32 * scale) {
            return;
        }
        let size = TILE_PIXELS as f32 * scale;
        for (coord, tile) in self.tiles() {
            let screen = camera.world_to_screen(coord.to_pixels());
            if camera.is_on_screen(screen, size) {
                canvas.draw_tile(screen, size, *tile);
            }
        }
        for object in &self.objects {
            let screen = camera.world_to_screen(object.origin);
            let extent = object.size.max_element() * scale;
            if camera.is_on_screen(screen, extent) {
                canvas.draw_sprite(screen, extent, object.sprite());
            }
        }
    }
}
