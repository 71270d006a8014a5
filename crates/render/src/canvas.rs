use delve_kernel::Tile;
use glam::Vec2;

/// Maps world pixels to screen pixels.
pub trait Camera {
    /// Screen position of a world-pixel position.
    fn world_to_screen(&self, world: Vec2) -> Vec2;

    /// Whether a square of `size` screen pixels with top-left corner at
    /// `screen` overlaps the viewport.
    fn is_on_screen(&self, screen: Vec2, size: f32) -> bool;

    /// Screen pixels per world pixel.
    fn scale(&self) -> f32 {
        1.0
    }
}

/// Non-tile things a world can ask a canvas to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Boss { size_tiles: u8 },
    MiniBoss,
    ChestClosed,
    ChestOpen,
    DoorClosed,
    DoorOpen,
    Barricade,
    /// Drawn when content exists but cannot be resolved to anything better.
    Placeholder,
}

/// Drawing surface. Coordinates are screen pixels, top-left anchored.
pub trait Canvas {
    fn draw_tile(&mut self, screen: Vec2, size: f32, tile: Tile);

    fn draw_sprite(&mut self, screen: Vec2, size: f32, sprite: Sprite);
}

/// Anything that can draw itself through a camera onto a canvas.
pub trait Render {
    fn render(&self, canvas: &mut dyn Canvas, camera: &dyn Camera);
}
