use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Edge length of a tile in world pixels.
pub const TILE_PIXELS: i32 = 32;
/// Edge length of a chunk in tiles.
pub const CHUNK_TILES: i32 = 16;
/// Edge length of a section in chunks.
pub const SECTION_CHUNKS: i32 = 5;
/// Edge length of a section in tiles (80).
pub const SECTION_TILES: i32 = CHUNK_TILES * SECTION_CHUNKS;
/// Edge length of a chunk in world pixels (512).
pub const CHUNK_PIXELS: i32 = CHUNK_TILES * TILE_PIXELS;
/// Edge length of a section in world pixels (2560).
pub const SECTION_PIXELS: i32 = SECTION_TILES * TILE_PIXELS;

/// Coordinates that cannot be mapped into the addressable world.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordError {
    #[error("pixel position ({x}, {y}) is not finite")]
    NonFinite { x: f32, y: f32 },
    #[error("pixel position ({x}, {y}) lies outside the addressable world")]
    PixelOutOfRange { x: f32, y: f32 },
    #[error("section ({x}, {y}) lies outside the addressable world")]
    SectionOutOfRange { x: i32, y: i32 },
    #[error("chunk ({x}, {y}) lies outside the addressable world")]
    ChunkOutOfRange { x: i32, y: i32 },
}

/// Absolute tile coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Resolve a world-pixel position to the tile containing it.
    pub fn from_pixels(pos: Vec2) -> Result<Self, CoordError> {
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return Err(CoordError::NonFinite { x: pos.x, y: pos.y });
        }
        let tx = (pos.x / TILE_PIXELS as f32).floor();
        let ty = (pos.y / TILE_PIXELS as f32).floor();
        let range = i32::MIN as f32..i32::MAX as f32;
        if !range.contains(&tx) || !range.contains(&ty) {
            return Err(CoordError::PixelOutOfRange { x: pos.x, y: pos.y });
        }
        Ok(Self::new(tx as i32, ty as i32))
    }

    /// Top-left corner of this tile in world pixels.
    pub fn to_pixels(self) -> Vec2 {
        Vec2::new(
            self.x as f32 * TILE_PIXELS as f32,
            self.y as f32 * TILE_PIXELS as f32,
        )
    }

    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord::new(
            self.x.div_euclid(CHUNK_TILES),
            self.y.div_euclid(CHUNK_TILES),
        )
    }

    pub fn section(self) -> SectionCoord {
        SectionCoord::new(
            self.x.div_euclid(SECTION_TILES),
            self.y.div_euclid(SECTION_TILES),
        )
    }

    /// Position of this tile inside its chunk, each axis in `0..CHUNK_TILES`.
    pub fn local_in_chunk(self) -> (usize, usize) {
        (
            self.x.rem_euclid(CHUNK_TILES) as usize,
            self.y.rem_euclid(CHUNK_TILES) as usize,
        )
    }
}

/// Global chunk index (not local to a section).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn section(self) -> SectionCoord {
        SectionCoord::new(
            self.x.div_euclid(SECTION_CHUNKS),
            self.y.div_euclid(SECTION_CHUNKS),
        )
    }

    /// Position of this chunk inside its section, each axis in `0..SECTION_CHUNKS`.
    pub fn local_in_section(self) -> (usize, usize) {
        (
            self.x.rem_euclid(SECTION_CHUNKS) as usize,
            self.y.rem_euclid(SECTION_CHUNKS) as usize,
        )
    }

    /// First tile covered by this chunk.
    pub fn origin_tile(self) -> Result<TileCoord, CoordError> {
        let err = CoordError::ChunkOutOfRange {
            x: self.x,
            y: self.y,
        };
        let x = self.x.checked_mul(CHUNK_TILES).ok_or(err)?;
        let y = self.y.checked_mul(CHUNK_TILES).ok_or(err)?;
        // The last tile must be addressable too.
        x.checked_add(CHUNK_TILES - 1).ok_or(err)?;
        y.checked_add(CHUNK_TILES - 1).ok_or(err)?;
        Ok(TileCoord::new(x, y))
    }
}

/// Section index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SectionCoord {
    pub x: i32,
    pub y: i32,
}

impl SectionCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// First tile covered by this section.
    pub fn origin_tile(self) -> Result<TileCoord, CoordError> {
        let err = CoordError::SectionOutOfRange {
            x: self.x,
            y: self.y,
        };
        let x = self.x.checked_mul(SECTION_TILES).ok_or(err)?;
        let y = self.y.checked_mul(SECTION_TILES).ok_or(err)?;
        x.checked_add(SECTION_TILES - 1).ok_or(err)?;
        y.checked_add(SECTION_TILES - 1).ok_or(err)?;
        Ok(TileCoord::new(x, y))
    }

    /// First chunk covered by this section.
    pub fn origin_chunk(self) -> Result<ChunkCoord, CoordError> {
        // Tile range is the stricter bound; chunk range follows from it.
        self.origin_tile().map(TileCoord::chunk)
    }

    /// Signed offset `self - other` along each axis, widened so it never overflows.
    pub fn offset_from(self, other: SectionCoord) -> (i64, i64) {
        (
            self.x as i64 - other.x as i64,
            self.y as i64 - other.y as i64,
        )
    }

    /// Chebyshev (square-ring) distance between two sections.
    pub fn chebyshev(self, other: SectionCoord) -> i64 {
        let (dx, dy) = self.offset_from(other);
        dx.abs().max(dy.abs())
    }

    /// Neighbour at the given offset, or `None` if it would leave the i32 range.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<SectionCoord> {
        Some(SectionCoord::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
        ))
    }
}

/// Inclusive rectangle of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRect {
    pub min: TileCoord,
    pub max: TileCoord,
}

impl TileRect {
    /// Rectangle spanning both corners regardless of their order.
    pub fn spanning(a: TileCoord, b: TileCoord) -> Self {
        Self {
            min: TileCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: TileCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Smallest tile rectangle covering a pixel-space rectangle.
    pub fn from_pixel_rect(origin: Vec2, size: Vec2) -> Result<Self, CoordError> {
        let a = TileCoord::from_pixels(origin)?;
        let b = TileCoord::from_pixels(origin + size)?;
        Ok(Self::spanning(a, b))
    }

    pub fn contains(&self, t: TileCoord) -> bool {
        t.x >= self.min.x && t.x <= self.max.x && t.y >= self.min.y && t.y <= self.max.y
    }

    pub fn intersects(&self, other: &TileRect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_sizes() {
        assert_eq!(SECTION_TILES, 80);
        assert_eq!(CHUNK_PIXELS, 512);
        assert_eq!(SECTION_PIXELS, 2560);
    }

    #[test]
    fn pixel_to_tile_floors_negative() {
        let t = TileCoord::from_pixels(Vec2::new(31.9, -0.5)).unwrap();
        assert_eq!(t, TileCoord::new(0, -1));
        let t = TileCoord::from_pixels(Vec2::new(-32.0, 64.0)).unwrap();
        assert_eq!(t, TileCoord::new(-1, 2));
    }

    #[test]
    fn non_finite_pixels_are_rejected() {
        assert!(matches!(
            TileCoord::from_pixels(Vec2::new(f32::NAN, 0.0)),
            Err(CoordError::NonFinite { .. })
        ));
        assert!(matches!(
            TileCoord::from_pixels(Vec2::new(1e30, 0.0)),
            Err(CoordError::PixelOutOfRange { .. })
        ));
    }

    #[test]
    fn tile_to_chunk_and_section() {
        let t = TileCoord::new(-1, 80);
        assert_eq!(t.chunk(), ChunkCoord::new(-1, 5));
        assert_eq!(t.section(), SectionCoord::new(-1, 1));
        assert_eq!(t.local_in_chunk(), (15, 0));
    }

    #[test]
    fn chunk_local_in_section_wraps_negative() {
        let c = ChunkCoord::new(-1, 7);
        assert_eq!(c.section(), SectionCoord::new(-1, 1));
        assert_eq!(c.local_in_section(), (4, 2));
    }

    #[test]
    fn section_origin_roundtrips_through_tile() {
        let s = SectionCoord::new(-3, 2);
        let origin = s.origin_tile().unwrap();
        assert_eq!(origin, TileCoord::new(-240, 160));
        assert_eq!(origin.section(), s);
        assert_eq!(s.origin_chunk().unwrap(), ChunkCoord::new(-15, 10));
    }

    #[test]
    fn section_origin_overflow_is_an_error() {
        let s = SectionCoord::new(i32::MAX, 0);
        assert!(matches!(
            s.origin_tile(),
            Err(CoordError::SectionOutOfRange { .. })
        ));
    }

    #[test]
    fn chebyshev_distance() {
        let a = SectionCoord::new(0, 0);
        assert_eq!(a.chebyshev(SectionCoord::new(3, -7)), 7);
        assert_eq!(
            SectionCoord::new(i32::MIN, 0).chebyshev(SectionCoord::new(i32::MAX, 0)),
            u32::MAX as i64
        );
    }

    #[test]
    fn tile_rect_intersection() {
        let a = TileRect::spanning(TileCoord::new(0, 0), TileCoord::new(15, 15));
        let b = TileRect::spanning(TileCoord::new(15, 20), TileCoord::new(10, 15));
        let c = TileRect::spanning(TileCoord::new(16, 0), TileCoord::new(31, 15));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(b.contains(TileCoord::new(12, 18)));
    }
}
