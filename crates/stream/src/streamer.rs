use delve_common::{ChunkCoord, EntityId, SectionCoord, Seed, TileCoord};
use delve_kernel::{Tile, TileEffect};
use delve_render::{Camera, Canvas, Render};
use glam::Vec2;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::arena::{SectionArena, SectionHandle};
use crate::chunk::Chunk;
use crate::config::{GenerationMode, StreamConfig};
use crate::context::{BossRegistry, MovementHint, Observer, WorldContext};
use crate::error::StreamError;
use crate::features::Boss;
use crate::generator::SectionGenerator;
use crate::object::WorldObject;
use crate::section::Section;
use crate::stats::{StreamStats, UpdateTimings};
use crate::worker::{Completed, GenerationPool};

/// Outcome of folding one background result into the arena.
enum Adoption {
    Adopted,
    Discarded,
    Failed,
}

/// Owns every resident section and decides, per observer update, which
/// sections exist, which are visible, and which are evicted.
///
/// Sections live in a generational arena; the visible set holds handles into
/// it, so it can never name a section that is not resident. Eviction needs
/// `&mut self`, which the borrow checker forbids while any render or
/// collision query still holds a reference into the arena.
#[derive(Debug)]
pub struct WorldStreamer {
    config: StreamConfig,
    generator: Arc<SectionGenerator>,
    context: WorldContext,
    sections: SectionArena,
    visible: Vec<SectionHandle>,
    center: Option<SectionCoord>,
    hint: MovementHint,
    pool: Option<GenerationPool>,
    pending: HashSet<SectionCoord>,
    stats: StreamStats,
    timings: UpdateTimings,
}

impl WorldStreamer {
    pub fn new(context: WorldContext, config: StreamConfig) -> Result<Self, StreamError> {
        config.validate()?;
        let generator = Arc::new(SectionGenerator::new(context.seed));
        let pool = match config.mode {
            GenerationMode::Synchronous => None,
            GenerationMode::Background { workers } => {
                Some(GenerationPool::spawn(Arc::clone(&generator), workers)?)
            }
        };
        Ok(Self {
            config,
            generator,
            context,
            sections: SectionArena::new(),
            visible: Vec::new(),
            center: None,
            hint: MovementHint::NONE,
            pool,
            pending: HashSet::new(),
            stats: StreamStats::default(),
            timings: UpdateTimings::default(),
        })
    }

    /// Synchronous streamer with default radii and in-memory sinks.
    pub fn with_seed(seed: impl Into<Seed>) -> Self {
        let seed = seed.into();
        Self {
            config: StreamConfig::default(),
            generator: Arc::new(SectionGenerator::new(seed)),
            context: WorldContext::new(seed),
            sections: SectionArena::new(),
            visible: Vec::new(),
            center: None,
            hint: MovementHint::NONE,
            pool: None,
            pending: HashSet::new(),
            stats: StreamStats::default(),
            timings: UpdateTimings::default(),
        }
    }

    pub fn seed(&self) -> Seed {
        self.generator.seed()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn generator(&self) -> &SectionGenerator {
        &self.generator
    }

    pub fn context(&self) -> &WorldContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut WorldContext {
        &mut self.context
    }

    pub fn bosses(&self) -> &dyn BossRegistry {
        self.context.bosses.as_ref()
    }

    /// Stream around the observer's current pixel position.
    ///
    /// Fails only when the position cannot be mapped to a tile; nothing is
    /// changed in that case.
    pub fn update(&mut self, observer: &dyn Observer) -> Result<&StreamStats, StreamError> {
        let tile = TileCoord::from_pixels(observer.position())?;
        let hint = MovementHint::from_vector(observer.movement());
        Ok(self.update_at(tile, hint))
    }

    /// Stream around an observer standing on `observer`, moving along `hint`.
    pub fn update_at(&mut self, observer: TileCoord, hint: MovementHint) -> &StreamStats {
        let center = observer.section();
        let _span = tracing::info_span!("stream_update", x = center.x, y = center.y).entered();
        let start = Instant::now();
        let mut stats = StreamStats {
            center,
            total_generated: self.stats.total_generated,
            total_evicted: self.stats.total_evicted,
            ..StreamStats::default()
        };

        for outcome in self.adopt_completed() {
            match outcome {
                Adoption::Adopted => {
                    stats.adopted_this_update += 1;
                    stats.total_generated += 1;
                }
                Adoption::Failed => stats.failed_this_update += 1,
                Adoption::Discarded => {}
            }
        }

        let (visible, preload) = self.collect_candidates(center, hint, &mut stats);
        let preload: Vec<SectionCoord> = preload
            .into_iter()
            .filter(|c| !self.pending.contains(c))
            .filter(|c| !self.sections.by_coord(*c).is_some_and(Section::is_generated))
            .take(self.config.preload_budget)
            .collect();
        match self.config.mode {
            GenerationMode::Synchronous => {
                for &coord in visible.iter().chain(&preload) {
                    self.generate_now(coord, &mut stats);
                }
            }
            GenerationMode::Background { .. } => {
                for &coord in visible.iter().chain(&preload) {
                    let handle = self
                        .sections
                        .get_or_insert_with(coord, || Section::new(coord));
                    self.request(handle, &mut stats);
                }
            }
        }

        self.visible = visible
            .iter()
            .filter_map(|c| self.sections.handle_of(*c))
            .collect();
        self.center = Some(center);
        self.hint = hint;

        self.evict_distant(center, hint, &mut stats);

        stats.resident = self.sections.len();
        stats.visible = self.visible.len();
        stats.pending = self.pending.len();
        stats.update_time = start.elapsed();
        self.timings.record(stats.update_time);
        tracing::trace!(
            generated = stats.generated_this_update,
            adopted = stats.adopted_this_update,
            evicted = stats.evicted_this_update,
            resident = stats.resident,
            visible = stats.visible,
            "stream update complete"
        );
        self.stats = stats;
        &self.stats
    }

    /// Every addressable section within load distance, split into visible
    /// coordinates (scan order) and the rest (nearest first). Nothing is
    /// created here.
    fn collect_candidates(
        &self,
        center: SectionCoord,
        hint: MovementHint,
        stats: &mut StreamStats,
    ) -> (Vec<SectionCoord>, Vec<SectionCoord>) {
        let view = self.config.view_distance;
        let load = self.config.load_distance;
        let mut visible = Vec::new();
        let mut preload = Vec::new();
        for dy in -load..=load {
            for dx in -load..=load {
                let Some(coord) = center.checked_offset(dx, dy) else {
                    stats.failed_this_update += 1;
                    continue;
                };
                if let Err(err) = coord.origin_tile() {
                    tracing::warn!(section = ?coord, %err, "skipping section");
                    stats.failed_this_update += 1;
                    continue;
                }
                if in_view(dx, dy, hint, view) {
                    visible.push(coord);
                } else {
                    preload.push((dx.abs().max(dy.abs()), coord));
                }
            }
        }
        preload.sort_by_key(|(distance, _)| *distance);
        (visible, preload.into_iter().map(|(_, c)| c).collect())
    }

    fn generate_now(&mut self, coord: SectionCoord, stats: &mut StreamStats) {
        match self.ensure_generated(coord) {
            Ok((_, true)) => {
                stats.generated_this_update += 1;
                stats.total_generated += 1;
            }
            Ok((_, false)) => {}
            Err(err) => {
                tracing::warn!(section = ?coord, %err, "section generation failed, treating as absent");
                stats.failed_this_update += 1;
            }
        }
    }

    /// Generate `coord` outside the arena and store the finished section.
    ///
    /// Returns its handle and whether it was generated by this call. On
    /// failure nothing is stored, and an ungenerated placeholder is dropped.
    fn ensure_generated(&mut self, coord: SectionCoord) -> Result<(SectionHandle, bool), StreamError> {
        let existing = self.sections.handle_of(coord);
        if let Some(handle) = existing {
            if self.sections.get(handle).is_some_and(Section::is_generated) {
                return Ok((handle, false));
            }
        }
        let section = match self.generator.generate(coord) {
            Ok(section) => section,
            Err(err) => {
                if let Some(handle) = existing {
                    self.sections.remove(handle);
                    self.visible.retain(|h| *h != handle);
                }
                return Err(err);
            }
        };
        let handle = match existing {
            Some(handle) => {
                self.sections.replace(handle, section);
                handle
            }
            None => self.sections.get_or_insert_with(coord, || section),
        };
        Ok((handle, true))
    }

    fn request(&mut self, handle: SectionHandle, stats: &mut StreamStats) {
        let Some(section) = self.sections.get(handle) else {
            return;
        };
        let coord = section.coord();
        if section.is_generated() || self.pending.contains(&coord) {
            return;
        }
        let Some(pool) = &self.pool else {
            return;
        };
        match pool.request(coord) {
            Ok(()) => {
                self.pending.insert(coord);
                stats.requested_this_update += 1;
            }
            Err(err) => {
                tracing::warn!(section = ?coord, %err, "could not request section");
                stats.failed_this_update += 1;
            }
        }
    }

    fn adopt_completed(&mut self) -> Vec<Adoption> {
        let completed = match &self.pool {
            Some(pool) => pool.drain(),
            None => return Vec::new(),
        };
        completed.into_iter().map(|done| self.adopt(done)).collect()
    }

    /// Results for evicted or already generated sections are dropped.
    fn adopt(&mut self, done: Completed) -> Adoption {
        let Completed { coord, result } = done;
        self.pending.remove(&coord);
        match result {
            Ok(section) => match self.sections.handle_of(coord) {
                Some(handle) if !self.sections.get(handle).is_some_and(Section::is_generated) => {
                    self.sections.replace(handle, section);
                    tracing::debug!(section = ?coord, "adopted generated section");
                    Adoption::Adopted
                }
                Some(_) => Adoption::Discarded,
                None => {
                    tracing::debug!(section = ?coord, "discarding generation for evicted section");
                    Adoption::Discarded
                }
            },
            Err(err) => {
                tracing::warn!(section = ?coord, %err, "background generation failed, treating as absent");
                if let Some(handle) = self.sections.handle_of(coord) {
                    if self.sections.get(handle).is_some_and(|s| !s.is_generated()) {
                        self.sections.remove(handle);
                        self.visible.retain(|h| *h != handle);
                    }
                }
                Adoption::Failed
            }
        }
    }

    /// Block until every requested section has come back from the pool.
    ///
    /// Returns how many were adopted. A no-op in synchronous mode.
    pub fn finish_pending(&mut self) -> Result<usize, StreamError> {
        let mut adopted = 0;
        while !self.pending.is_empty() {
            let next = match &self.pool {
                Some(pool) => pool.wait(Duration::from_millis(250))?,
                None => break,
            };
            if let Some(done) = next {
                if let Adoption::Adopted = self.adopt(done) {
                    adopted += 1;
                    self.stats.total_generated += 1;
                }
            }
        }
        self.stats.pending = self.pending.len();
        Ok(adopted)
    }

    fn evict_distant(&mut self, center: SectionCoord, hint: MovementHint, stats: &mut StreamStats) {
        let doomed: Vec<SectionHandle> = self
            .sections
            .iter()
            .filter(|(_, s)| should_evict(&self.config, s.coord(), center, hint))
            .map(|(h, _)| h)
            .collect();
        for handle in doomed {
            if let Some(section) = self.sections.remove(handle) {
                tracing::debug!(section = ?section.coord(), "evicting section");
                stats.evicted_this_update += 1;
                stats.total_evicted += 1;
            }
        }
    }

    /// Get-or-create the section at `coord` and generate it on this thread.
    ///
    /// `None` when the coordinate lies outside the addressable world.
    pub fn get_section(&mut self, coord: SectionCoord) -> Option<&Section> {
        if let Err(err) = coord.origin_tile() {
            tracing::debug!(section = ?coord, %err, "no section here");
            return None;
        }
        match self.ensure_generated(coord) {
            Ok((handle, _)) => self.sections.get(handle),
            Err(err) => {
                tracing::warn!(section = ?coord, %err, "section generation failed, treating as absent");
                None
            }
        }
    }

    /// Resident section at `coord`, generated or not. Never creates anything.
    pub fn section(&self, coord: SectionCoord) -> Option<&Section> {
        self.sections.by_coord(coord)
    }

    pub fn section_mut(&mut self, coord: SectionCoord) -> Option<&mut Section> {
        self.sections.by_coord_mut(coord)
    }

    pub fn section_at(&self, tile: TileCoord) -> Option<&Section> {
        self.section(tile.section())
    }

    pub fn chunk_at(&self, tile: TileCoord) -> Option<&Chunk> {
        self.section_at(tile)?.chunk_containing(tile)
    }

    fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        let (lx, ly) = coord.local_in_section();
        self.section(coord.section())?.chunk(lx as i32, ly as i32)
    }

    /// Tile at `tile` if its section is resident and generated.
    pub fn tile_at(&self, tile: TileCoord) -> Option<Tile> {
        self.chunk_at(tile)?.tile_at(tile).copied()
    }

    /// Whether a world-pixel position is blocked. Absent terrain never blocks.
    pub fn collision_at(&self, pixel: Vec2) -> bool {
        let Ok(tile) = TileCoord::from_pixels(pixel) else {
            return false;
        };
        self.chunk_at(tile).is_some_and(|c| c.has_collision_at(pixel))
    }

    /// Hazard and slowdown applying at a world-pixel position.
    pub fn tile_effect_at(&self, pixel: Vec2) -> TileEffect {
        TileCoord::from_pixels(pixel)
            .ok()
            .and_then(|t| self.tile_at(t))
            .map_or(TileEffect::NONE, |t| t.effect())
    }

    /// Resident, generated chunks within `radius` chunks of a pixel position.
    pub fn nearby_chunks(&self, pixel: Vec2, radius: i32) -> Vec<&Chunk> {
        let Ok(tile) = TileCoord::from_pixels(pixel) else {
            return Vec::new();
        };
        let center = tile.chunk();
        let radius = radius.max(0);
        let mut out = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (Some(x), Some(y)) = (center.x.checked_add(dx), center.y.checked_add(dy))
                else {
                    continue;
                };
                if let Some(chunk) = self.chunk(ChunkCoord::new(x, y)) {
                    out.push(chunk);
                }
            }
        }
        out
    }

    /// Bosses of a resident section; empty when the section is absent.
    pub fn entities_for_section(&self, coord: SectionCoord) -> &[Boss] {
        self.section(coord)
            .map(Section::entities)
            .unwrap_or_default()
    }

    /// Make `coord` the current section: replace the active boss registry
    /// with its bosses, skipping those `is_defeated` reports. Returns how many
    /// were activated.
    pub fn activate_section(
        &mut self,
        coord: SectionCoord,
        is_defeated: impl Fn(EntityId) -> bool,
    ) -> usize {
        self.context.bosses.clear();
        let Some(section) = self.sections.by_coord(coord) else {
            return 0;
        };
        let mut activated = 0;
        for boss in section.entities().iter().filter(|b| !is_defeated(b.id)) {
            self.context.bosses.activate(boss);
            activated += 1;
        }
        tracing::debug!(section = ?coord, activated, "activated section bosses");
        activated
    }

    pub fn remove_boss(&mut self, coord: SectionCoord, id: EntityId) -> bool {
        match self.sections.by_coord_mut(coord) {
            Some(section) => section.remove_boss(id, self.context.bosses.as_mut()),
            None => false,
        }
    }

    /// Drop an item at a world-pixel position into the context's item sink.
    ///
    /// Refused when the position is not inside a resident section.
    pub fn add_item(&mut self, item: impl Into<String>, position: Vec2) -> bool {
        let Ok(tile) = TileCoord::from_pixels(position) else {
            return false;
        };
        match self.sections.by_coord(tile.section()) {
            Some(section) => section.add_item(self.context.items.as_mut(), item, position),
            None => false,
        }
    }

    /// Place an object into the generated chunk under its origin.
    ///
    /// Objects are runtime edits: evicting the section discards them.
    pub fn place_object(&mut self, object: WorldObject) -> Result<(), StreamError> {
        let tile = TileCoord::from_pixels(object.origin)?;
        let coord = tile.section();
        let section = self
            .sections
            .by_coord_mut(coord)
            .ok_or(StreamError::NotResident(coord))?;
        let chunk = section
            .chunk_containing_mut(tile)
            .ok_or(StreamError::NotGenerated(coord))?;
        chunk.add_object(object);
        Ok(())
    }

    /// Toggle the door `id` placed in the chunk under `at`.
    pub fn toggle_door(&mut self, id: EntityId, at: Vec2) -> Option<bool> {
        let tile = TileCoord::from_pixels(at).ok()?;
        self.sections
            .by_coord_mut(tile.section())?
            .chunk_containing_mut(tile)?
            .object_mut(id)?
            .toggle()
    }

    pub fn remove_object(&mut self, id: EntityId, at: Vec2) -> Option<WorldObject> {
        let tile = TileCoord::from_pixels(at).ok()?;
        self.sections
            .by_coord_mut(tile.section())?
            .chunk_containing_mut(tile)?
            .remove_object(id)
    }

    pub fn is_resident(&self, coord: SectionCoord) -> bool {
        self.sections.contains(coord)
    }

    pub fn is_visible(&self, coord: SectionCoord) -> bool {
        self.sections
            .handle_of(coord)
            .is_some_and(|h| self.visible.contains(&h))
    }

    pub fn resident_count(&self) -> usize {
        self.sections.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn resident_coords(&self) -> impl Iterator<Item = SectionCoord> + '_ {
        self.sections.coords()
    }

    /// Visible sections in scan order.
    pub fn visible_sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.visible.iter().filter_map(|h| self.sections.get(*h))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Section the observer was in at the last update.
    pub fn center(&self) -> Option<SectionCoord> {
        self.center
    }

    pub fn hint(&self) -> MovementHint {
        self.hint
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn timings(&self) -> &UpdateTimings {
        &self.timings
    }
}

impl Render for WorldStreamer {
    /// Only visible sections are drawn; ungenerated ones are skipped.
    fn render(&self, canvas: &mut dyn Canvas, camera: &dyn Camera) {
        for section in self.visible_sections() {
            section.render(canvas, camera);
        }
    }
}

/// Inside the static view square, or inside the same square shifted one
/// section along the movement hint.
fn in_view(dx: i32, dy: i32, hint: MovementHint, view: i32) -> bool {
    let static_view = dx.abs() <= view && dy.abs() <= view;
    let ahead_view = (dx - hint.x).abs() <= view && (dy - hint.y).abs() <= view;
    static_view || ahead_view
}

/// Beyond `max_distance` always goes; beyond `save_distance` goes unless it
/// lies in the direction of travel.
fn should_evict(
    config: &StreamConfig,
    coord: SectionCoord,
    center: SectionCoord,
    hint: MovementHint,
) -> bool {
    let distance = coord.chebyshev(center);
    if distance > config.max_distance as i64 {
        return true;
    }
    if distance <= config.save_distance as i64 {
        return false;
    }
    let (dx, dy) = coord.offset_from(center);
    !hint.is_ahead(dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FixedObserver;

    fn tiny() -> StreamConfig {
        StreamConfig {
            view_distance: 1,
            load_distance: 1,
            save_distance: 2,
            max_distance: 3,
            preload_budget: 0,
            mode: GenerationMode::Synchronous,
        }
    }

    fn streamer(config: StreamConfig) -> WorldStreamer {
        WorldStreamer::new(WorldContext::new(Seed::from("test-seed")), config).unwrap()
    }

    #[test]
    fn view_square_shifts_with_hint() {
        let east = MovementHint { x: 1, y: 0 };
        assert!(in_view(3, 0, MovementHint::NONE, 3));
        assert!(!in_view(4, 0, MovementHint::NONE, 3));
        assert!(in_view(4, 0, east, 3));
        assert!(in_view(4, 3, east, 3));
        assert!(!in_view(-4, 0, east, 3));
        assert!(!in_view(4, 4, east, 3));
    }

    #[test]
    fn eviction_keeps_sections_ahead() {
        let c = StreamConfig::default();
        let center = SectionCoord::new(0, 0);
        let east = MovementHint { x: 1, y: 0 };
        assert!(!should_evict(&c, SectionCoord::new(6, 6), center, MovementHint::NONE));
        assert!(should_evict(&c, SectionCoord::new(7, 0), center, MovementHint::NONE));
        assert!(!should_evict(&c, SectionCoord::new(7, 0), center, east));
        assert!(should_evict(&c, SectionCoord::new(-7, 0), center, east));
        assert!(should_evict(&c, SectionCoord::new(9, 0), center, east));
    }

    #[test]
    fn update_creates_load_square_and_visible_subset() {
        let mut s = streamer(tiny());
        let stats = s.update_at(TileCoord::new(0, 0), MovementHint::NONE).clone();
        assert_eq!(stats.resident, 9);
        assert_eq!(stats.visible, 9);
        assert_eq!(stats.generated_this_update, 9);
        for section in s.visible_sections() {
            assert!(section.is_generated());
            assert!(s.is_resident(section.coord()));
        }
    }

    #[test]
    fn preload_budget_limits_extra_generation() {
        let config = StreamConfig {
            load_distance: 2,
            preload_budget: 3,
            ..tiny()
        };
        let mut s = streamer(config);
        let stats = s.update_at(TileCoord::new(0, 0), MovementHint::NONE).clone();
        assert_eq!(stats.resident, 9 + 3);
        assert_eq!(stats.visible, 9);
        assert_eq!(stats.generated_this_update, 9 + 3);
        // Nearest non-visible sections come first: all at distance 2.
        let generated_outside = s
            .resident_coords()
            .filter(|c| !s.is_visible(*c))
            .filter(|c| s.section(*c).is_some_and(Section::is_generated))
            .count();
        assert_eq!(generated_outside, 3);
    }

    #[test]
    fn synchronous_update_stores_only_generated_sections() {
        let mut s = streamer(StreamConfig::default());
        let stats = s.update_at(TileCoord::new(0, 0), MovementHint::NONE).clone();
        assert_eq!(stats.visible, 49);
        assert_eq!(stats.resident, 49 + 8);
        assert_eq!(stats.generated_this_update, 49 + 8);
        for coord in s.resident_coords() {
            let section = s.section(coord).unwrap();
            assert!(section.is_generated(), "{coord:?}");
            assert!(section.biome().is_some());
            assert_eq!(section.chunks().len(), 25);
        }

        // Beyond the preload budget: absent, not an empty stand-in.
        let skipped = SectionCoord::new(4, 4);
        assert!(!s.is_resident(skipped));
        assert!(s.section(skipped).is_none());

        // A later update tops up the next nearest sections.
        let stats = s.update_at(TileCoord::new(0, 0), MovementHint::NONE).clone();
        assert_eq!(stats.generated_this_update, 8);
        assert!(s.resident_coords().all(|c| s.section(c).is_some_and(Section::is_generated)));
    }

    #[test]
    fn queries_do_not_create_sections() {
        let s = streamer(tiny());
        assert!(s.section(SectionCoord::new(0, 0)).is_none());
        assert!(s.tile_at(TileCoord::new(5, 5)).is_none());
        assert!(!s.collision_at(Vec2::new(5.0, 5.0)));
        assert_eq!(s.tile_effect_at(Vec2::new(5.0, 5.0)), TileEffect::NONE);
        assert!(s.entities_for_section(SectionCoord::new(0, 0)).is_empty());
        assert_eq!(s.resident_count(), 0);
    }

    #[test]
    fn get_section_generates_on_demand() {
        let mut s = streamer(tiny());
        let fp = s.get_section(SectionCoord::new(20, 20)).unwrap().fingerprint();
        assert!(s.is_resident(SectionCoord::new(20, 20)));
        let expected = s.generator().generate(SectionCoord::new(20, 20)).unwrap();
        assert_eq!(fp, expected.fingerprint());
        assert!(s.get_section(SectionCoord::new(i32::MAX, 0)).is_none());
    }

    #[test]
    fn tile_queries_match_classifier() {
        let mut s = streamer(tiny());
        s.update_at(TileCoord::new(0, 0), MovementHint::NONE);
        for (x, y) in [(0, 0), (-1, -1), (79, 80), (-80, 100)] {
            let tile = s.tile_at(TileCoord::new(x, y)).unwrap();
            assert_eq!(tile.kind(), s.generator().classifier().tile_kind_at(x, y));
            let pixel = TileCoord::new(x, y).to_pixels() + Vec2::splat(16.0);
            assert_eq!(s.collision_at(pixel), tile.collidable());
            assert_eq!(s.tile_effect_at(pixel), tile.effect());
        }
    }

    #[test]
    fn nearby_chunks_only_reports_generated_ones() {
        let mut s = streamer(tiny());
        s.update_at(TileCoord::new(40, 40), MovementHint::NONE);
        assert_eq!(s.nearby_chunks(Vec2::new(1280.0, 1280.0), 1).len(), 9);
        assert!(s.nearby_chunks(Vec2::new(1.0e6, 1.0e6), 2).is_empty());
    }

    #[test]
    fn non_finite_observer_is_rejected_without_changes() {
        let mut s = streamer(tiny());
        let observer = FixedObserver {
            position: Vec2::new(f32::NAN, 0.0),
            movement: Vec2::ZERO,
        };
        assert!(s.update(&observer).is_err());
        assert_eq!(s.resident_count(), 0);
        assert!(s.center().is_none());
    }

    #[test]
    fn objects_collide_until_opened() {
        let mut s = streamer(tiny());
        s.update_at(TileCoord::new(0, 0), MovementHint::NONE);
        let free = (0..80)
            .map(|x| TileCoord::new(x, 3))
            .find(|t| s.tile_at(*t).is_some_and(|tile| !tile.collidable()))
            .expect("a walkable tile on row 3");
        let pixel = free.to_pixels() + Vec2::splat(8.0);
        let id = EntityId::from_parts(7, 7);
        s.place_object(WorldObject::door(id, free)).unwrap();
        assert!(s.collision_at(pixel));
        assert_eq!(s.toggle_door(id, pixel), Some(true));
        assert!(!s.collision_at(pixel));
        assert!(s.remove_object(id, pixel).is_some());

        let far = WorldObject::door(id, TileCoord::new(10_000, 0));
        assert!(matches!(s.place_object(far), Err(StreamError::NotResident(_))));
    }

    #[test]
    fn items_go_to_the_context_sink() {
        let mut s = streamer(tiny());
        assert!(!s.add_item("gem", Vec2::new(10.0, 10.0)));
        s.update_at(TileCoord::new(0, 0), MovementHint::NONE);
        assert!(s.add_item("gem", Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn activation_skips_defeated_bosses() {
        let mut s = streamer(tiny());
        let coord = (-40..40)
            .map(|x| SectionCoord::new(x, -2))
            .find(|c| {
                s.generator()
                    .generate(*c)
                    .is_ok_and(|sec| !sec.entities().is_empty())
            })
            .expect("a boss among 80 sections");
        let boss_id = s.get_section(coord).unwrap().entities()[0].id;

        assert_eq!(s.activate_section(coord, |_| false), 1);
        assert!(s.bosses().is_active(boss_id));
        assert_eq!(s.activate_section(coord, |id| id == boss_id), 0);
        assert_eq!(s.bosses().active_count(), 0);

        s.activate_section(coord, |_| false);
        assert!(s.remove_boss(coord, boss_id));
        assert!(!s.bosses().is_active(boss_id));
        assert!(s.entities_for_section(coord).is_empty());
    }

    #[test]
    fn render_draws_visible_terrain() {
        let mut s = streamer(tiny());
        s.update_at(TileCoord::new(40, 40), MovementHint::NONE);
        let mut canvas = delve_render::AsciiCanvas::new(20, 10, 32.0);
        let mut camera = delve_render::FollowCamera::new(canvas.viewport());
        camera.follow(TileCoord::new(40, 40).to_pixels(), true);
        s.render(&mut canvas, &camera);
        assert!(!canvas.to_text().contains(delve_render::AsciiCanvas::EMPTY));
    }
}
