use delve_kernel::{Tile, TileKind};
use glam::Vec2;

use crate::canvas::{Canvas, Sprite};

/// Character-grid canvas for terminals, logs and tests.
///
/// Each cell covers `cell_size` screen pixels. Later draws overwrite earlier
/// ones, so callers draw terrain first and sprites on top.
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    cell_size: f32,
    cells: Vec<char>,
    draw_calls: usize,
}

impl AsciiCanvas {
    pub const EMPTY: char = ' ';

    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size: cell_size.max(1.0),
            cells: vec![Self::EMPTY; width * height],
            draw_calls: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Screen size this canvas represents, for sizing a camera viewport.
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.cell_size
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        (col < self.width && row < self.height).then(|| self.cells[row * self.width + col])
    }

    /// Number of draw calls received, including fully clipped ones.
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn clear(&mut self) {
        self.cells.fill(Self::EMPTY);
        self.draw_calls = 0;
    }

    /// Grid rows joined by newlines.
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn fill(&mut self, screen: Vec2, size: f32, glyph: char) {
        self.draw_calls += 1;
        let c0 = (screen.x / self.cell_size).floor();
        let r0 = (screen.y / self.cell_size).floor();
        let c1 = ((screen.x + size) / self.cell_size).ceil();
        let r1 = ((screen.y + size) / self.cell_size).ceil();
        let clamp_col = |v: f32| v.clamp(0.0, self.width as f32) as usize;
        let clamp_row = |v: f32| v.clamp(0.0, self.height as f32) as usize;
        let (c0, c1) = (clamp_col(c0), clamp_col(c1));
        let (r0, r1) = (clamp_row(r0), clamp_row(r1));
        for row in r0..r1 {
            for col in c0..c1 {
                self.cells[row * self.width + col] = glyph;
            }
        }
    }
}

pub fn tile_glyph(tile: Tile) -> char {
    match tile.kind() {
        TileKind::Floor => '.',
        TileKind::Wall => '#',
        TileKind::Crystal => '*',
        TileKind::Mushroom => '"',
        TileKind::Chasm => '_',
        TileKind::Lava => '~',
        TileKind::Pillar => 'I',
        TileKind::Rubble => ',',
    }
}

pub fn sprite_glyph(sprite: Sprite) -> char {
    match sprite {
        Sprite::Boss { .. } => 'B',
        Sprite::MiniBoss => 'b',
        Sprite::ChestClosed => 'C',
        Sprite::ChestOpen => 'c',
        Sprite::DoorClosed => '+',
        Sprite::DoorOpen => '/',
        Sprite::Barricade => 'X',
        Sprite::Placeholder => '?',
    }
}

impl Canvas for AsciiCanvas {
    fn draw_tile(&mut self, screen: Vec2, size: f32, tile: Tile) {
        self.fill(screen, size, tile_glyph(tile));
    }

    fn draw_sprite(&mut self, screen: Vec2, size: f32, sprite: Sprite) {
        self.fill(screen, size, sprite_glyph(sprite));
    }
}
