use delve_common::{EntityId, TileCoord, TileRect};
use delve_render::Sprite;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Non-tile thing placed into a chunk after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    Door { open: bool },
    Barricade,
}

/// A placed object with a pixel-space bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: EntityId,
    pub kind: ObjectKind,
    /// Top-left corner in world pixels.
    pub origin: Vec2,
    pub size: Vec2,
}

impl WorldObject {
    pub fn new(id: EntityId, kind: ObjectKind, origin: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            origin,
            size,
        }
    }

    /// A one-tile closed door on `tile`.
    pub fn door(id: EntityId, tile: TileCoord) -> Self {
        let edge = delve_common::TILE_PIXELS as f32;
        Self::new(
            id,
            ObjectKind::Door { open: false },
            tile.to_pixels(),
            Vec2::splat(edge),
        )
    }

    pub fn collidable(&self) -> bool {
        match self.kind {
            ObjectKind::Door { open } => !open,
            ObjectKind::Barricade => true,
        }
    }

    /// Half-open containment: the right and bottom edges belong to the neighbour.
    pub fn contains_point(&self, p: Vec2) -> bool {
        let max = self.origin + self.size;
        p.x >= self.origin.x && p.y >= self.origin.y && p.x < max.x && p.y < max.y
    }

    /// Flip a door; returns the new open state, or `None` for non-doors.
    pub fn toggle(&mut self) -> Option<bool> {
        match &mut self.kind {
            ObjectKind::Door { open } => {
                *open = !*open;
                Some(*open)
            }
            ObjectKind::Barricade => None,
        }
    }

    pub fn tile_bounds(&self) -> Option<TileRect> {
        // Last covered pixel, not the exclusive edge.
        let inner = (self.size - Vec2::ONE).max(Vec2::ZERO);
        TileRect::from_pixel_rect(self.origin, inner).ok()
    }

    pub fn sprite(&self) -> Sprite {
        match self.kind {
            ObjectKind::Door { open: false } => Sprite::DoorClosed,
            ObjectKind::Door { open: true } => Sprite::DoorOpen,
            ObjectKind::Barricade => Sprite::Barricade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> EntityId {
        EntityId::from_parts(1, 2)
    }

    #[test]
    fn closed_door_blocks_open_door_does_not() {
        let mut door = WorldObject::door(id(), TileCoord::new(3, 4));
        assert!(door.collidable());
        assert_eq!(door.toggle(), Some(true));
        assert!(!door.collidable());
        assert_eq!(door.sprite(), Sprite::DoorOpen);
    }

    #[test]
    fn barricade_cannot_toggle() {
        let mut b = WorldObject::new(id(), ObjectKind::Barricade, Vec2::ZERO, Vec2::splat(64.0));
        assert_eq!(b.toggle(), None);
        assert!(b.collidable());
    }

    #[test]
    fn containment_excludes_far_edges() {
        let door = WorldObject::door(id(), TileCoord::new(1, 1));
        assert!(door.contains_point(Vec2::new(32.0, 32.0)));
        assert!(door.contains_point(Vec2::new(63.9, 63.9)));
        assert!(!door.contains_point(Vec2::new(64.0, 40.0)));
    }

    #[test]
    fn one_tile_object_covers_one_tile() {
        let door = WorldObject::door(id(), TileCoord::new(-2, 5));
        let r = door.tile_bounds().unwrap();
        assert_eq!(r.min, TileCoord::new(-2, 5));
        assert_eq!(r.max, TileCoord::new(-2, 5));
    }
}
