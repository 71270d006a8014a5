//! What the streamer needs from the rest of the game, passed in explicitly.

use delve_common::{EntityId, SectionCoord, Seed, TileCoord};
use glam::Vec2;
use std::collections::BTreeMap;

use crate::features::Boss;

/// Supplies the observer position each frame.
pub trait Observer {
    /// Position in world pixels.
    fn position(&self) -> Vec2;

    /// Recent movement direction; zero when standing still.
    fn movement(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// Observer with a fixed position and movement, for tools and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedObserver {
    pub position: Vec2,
    pub movement: Vec2,
}

impl FixedObserver {
    pub fn at_tile(tile: TileCoord) -> Self {
        Self {
            position: tile.to_pixels(),
            movement: Vec2::ZERO,
        }
    }

    pub fn moving(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }
}

impl Observer for FixedObserver {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn movement(&self) -> Vec2 {
        self.movement
    }
}

/// Per-axis direction of travel in sections: each component is -1, 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MovementHint {
    pub x: i32,
    pub y: i32,
}

impl MovementHint {
    pub const NONE: MovementHint = MovementHint { x: 0, y: 0 };

    /// Components smaller than this are treated as no movement.
    const DEADZONE: f32 = 1e-3;

    pub fn from_vector(v: Vec2) -> Self {
        let axis = |c: f32| {
            if !c.is_finite() || c.abs() < Self::DEADZONE {
                0
            } else {
                c.signum() as i32
            }
        };
        Self {
            x: axis(v.x),
            y: axis(v.y),
        }
    }

    pub fn is_moving(self) -> bool {
        self != Self::NONE
    }

    /// Whether a section at offset `(dx, dy)` from the observer lies ahead.
    pub fn is_ahead(self, dx: i64, dy: i64) -> bool {
        dx * self.x as i64 + dy * self.y as i64 > 0
    }
}

/// A loot drop handed to the item system.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub item: String,
    /// World pixels.
    pub position: Vec2,
    pub section: SectionCoord,
}

/// Engine-level collection loot is dropped into.
pub trait ItemSink {
    /// Returns `false` when the sink refuses the item.
    fn push(&mut self, item: DroppedItem) -> bool;
}

impl ItemSink for Vec<DroppedItem> {
    fn push(&mut self, item: DroppedItem) -> bool {
        Vec::push(self, item);
        true
    }
}

/// Engine-level registry of bosses currently fighting the player.
pub trait BossRegistry {
    fn activate(&mut self, boss: &Boss);

    /// Returns whether the boss was active.
    fn deactivate(&mut self, id: EntityId) -> bool;

    fn clear(&mut self);

    fn is_active(&self, id: EntityId) -> bool;

    fn active_count(&self) -> usize;
}

/// Default registry: active bosses keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ActiveBosses {
    bosses: BTreeMap<EntityId, Boss>,
}

impl ActiveBosses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Boss> {
        self.bosses.values()
    }
}

impl BossRegistry for ActiveBosses {
    fn activate(&mut self, boss: &Boss) {
        self.bosses.insert(boss.id, boss.clone());
    }

    fn deactivate(&mut self, id: EntityId) -> bool {
        self.bosses.remove(&id).is_some()
    }

    fn clear(&mut self) {
        self.bosses.clear();
    }

    fn is_active(&self, id: EntityId) -> bool {
        self.bosses.contains_key(&id)
    }

    fn active_count(&self) -> usize {
        self.bosses.len()
    }
}

/// Seed plus collaborator sinks, handed to the streamer at construction.
pub struct WorldContext {
    pub seed: Seed,
    pub items: Box<dyn ItemSink + Send>,
    pub bosses: Box<dyn BossRegistry + Send>,
}

impl WorldContext {
    /// Context with the default in-memory sinks.
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            items: Box::new(Vec::<DroppedItem>::new()),
            bosses: Box::new(ActiveBosses::new()),
        }
    }

    pub fn with_items(mut self, items: impl ItemSink + Send + 'static) -> Self {
        self.items = Box::new(items);
        self
    }

    pub fn with_bosses(mut self, bosses: impl BossRegistry + Send + 'static) -> Self {
        self.bosses = Box::new(bosses);
        self
    }
}

impl std::fmt::Debug for WorldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldContext")
            .field("seed", &self.seed)
            .field("active_bosses", &self.bosses.active_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::BossKind;

    #[test]
    fn hint_takes_sign_per_axis() {
        assert_eq!(
            MovementHint::from_vector(Vec2::new(0.7, -0.7)),
            MovementHint { x: 1, y: -1 }
        );
        assert_eq!(MovementHint::from_vector(Vec2::new(0.0, 2.0)), MovementHint { x: 0, y: 1 });
        assert!(!MovementHint::from_vector(Vec2::new(1e-6, f32::NAN)).is_moving());
    }

    #[test]
    fn ahead_uses_dot_product() {
        let east = MovementHint { x: 1, y: 0 };
        assert!(east.is_ahead(3, 5));
        assert!(!east.is_ahead(0, 5));
        assert!(!east.is_ahead(-2, 0));
        assert!(!MovementHint::NONE.is_ahead(4, 4));
    }

    #[test]
    fn active_bosses_track_membership() {
        let boss = Boss {
            id: EntityId::from_parts(4, 2),
            kind: BossKind::Medium,
            section: SectionCoord::new(0, 0),
            center: TileCoord::new(40, 40),
        };
        let mut reg = ActiveBosses::new();
        reg.activate(&boss);
        reg.activate(&boss);
        assert_eq!(reg.active_count(), 1);
        assert!(reg.is_active(boss.id));
        assert!(reg.deactivate(boss.id));
        assert!(!reg.deactivate(boss.id));
        assert_eq!(reg.iter().count(), 0);
    }

    #[test]
    fn vec_sink_accepts_items() {
        let mut sink: Vec<DroppedItem> = Vec::new();
        let accepted = ItemSink::push(
            &mut sink,
            DroppedItem {
                item: "potion".into(),
                position: Vec2::new(5.0, 5.0),
                section: SectionCoord::new(0, 0),
            },
        );
        assert!(accepted);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn fixed_observer_reports_tile_origin() {
        let o = FixedObserver::at_tile(TileCoord::new(2, -1)).moving(Vec2::X);
        assert_eq!(o.position(), Vec2::new(64.0, -32.0));
        assert_eq!(o.movement(), Vec2::X);
    }
}
