use delve_common::EntityId;
use delve_stream::WorldStreamer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids of bosses the player has beaten.
///
/// Boss ids are derived from the seed and section, so the set stays valid
/// after a section is evicted and regenerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefeatedBosses(BTreeSet<EntityId>);

impl DefeatedBosses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the boss was already recorded.
    pub fn record(&mut self, id: EntityId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }

    /// Remove every defeated boss still present in a resident section.
    ///
    /// Call after each update: a regenerated section brings its bosses back.
    pub fn prune(&self, streamer: &mut WorldStreamer) -> usize {
        if self.is_empty() {
            return 0;
        }
        let targets: Vec<_> = streamer
            .resident_coords()
            .filter_map(|c| streamer.section(c))
            .flat_map(|s| s.entities().iter().map(move |b| (s.coord(), b.id)))
            .filter(|(_, id)| self.contains(*id))
            .collect();
        targets
            .into_iter()
            .filter(|&(coord, id)| streamer.remove_boss(coord, id))
            .count()
    }
}

impl FromIterator<EntityId> for DefeatedBosses {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
