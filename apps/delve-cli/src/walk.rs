//! Scripted walks: a key script drives input, input drives the observer.

use anyhow::{Context, bail};
use delve_common::{SectionCoord, TILE_PIXELS, TileCoord, TileRect};
use delve_input::{Action, InputState};
use delve_persist::DefeatedBosses;
use delve_stream::{FixedObserver, WorldStreamer};
use glam::Vec2;

/// Keys held together for a number of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub keys: Vec<String>,
    pub frames: u32,
}

/// Parse a script such as `"d120 sd40 !w60 e"`.
///
/// Each token is a run of keys followed by an optional frame count (default
/// 1). Letters are keys, `!` holds Shift, `.` holds nothing.
pub fn parse_script(script: &str) -> anyhow::Result<Vec<Step>> {
    script
        .split_whitespace()
        .map(|token| -> anyhow::Result<Step> {
            let split = token
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(token.len());
            let (keys, count) = token.split_at(split);
            let frames = if count.is_empty() {
                1
            } else {
                count
                    .parse::<u32>()
                    .with_context(|| format!("bad frame count in step {token:?}"))?
            };
            let keys = keys
                .chars()
                .filter(|c| *c != '.')
                .map(|c| -> anyhow::Result<String> {
                    match c {
                        '!' => Ok("Shift".to_string()),
                        c if c.is_ascii_alphabetic() => Ok(c.to_string()),
                        c => bail!("unexpected {c:?} in step {token:?}"),
                    }
                })
                .collect::<anyhow::Result<_>>()?;
            Ok(Step { keys, frames })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub frames: u64,
    pub blocked: u64,
    pub sections_entered: u64,
    pub chests_opened: u64,
    pub bosses_defeated: u64,
}

/// Moves an observer through the streamed world one frame at a time.
pub struct Walker {
    pub position: Vec2,
    /// Pixels per frame at walking pace.
    pub speed: f32,
    /// Ignore collision.
    pub ghost: bool,
    input: InputState,
    section: Option<SectionCoord>,
}

impl Walker {
    pub const SPRINT_FACTOR: f32 = 2.0;

    /// Start in the middle of `tile`.
    pub fn at_tile(tile: TileCoord, speed: f32) -> Self {
        Self {
            position: tile.to_pixels() + Vec2::splat(TILE_PIXELS as f32 * 0.5),
            speed,
            ghost: false,
            input: InputState::default(),
            section: None,
        }
    }

    pub fn tile(&self) -> anyhow::Result<TileCoord> {
        Ok(TileCoord::from_pixels(self.position)?)
    }

    /// Run every step of a script. `on_frame` sees the streamer after each update.
    pub fn run(
        &mut self,
        streamer: &mut WorldStreamer,
        defeated: &mut DefeatedBosses,
        steps: &[Step],
        mut on_frame: impl FnMut(u64, &WorldStreamer),
    ) -> anyhow::Result<WalkReport> {
        let mut report = WalkReport::default();
        for step in steps {
            self.input.release_all();
            for key in &step.keys {
                self.input.key_down(key);
            }
            for _ in 0..step.frames {
                self.frame(streamer, defeated, &mut report)?;
                report.frames += 1;
                on_frame(report.frames, streamer);
            }
        }
        self.input.release_all();
        Ok(report)
    }

    fn frame(
        &mut self,
        streamer: &mut WorldStreamer,
        defeated: &mut DefeatedBosses,
        report: &mut WalkReport,
    ) -> anyhow::Result<()> {
        let direction = self.input.movement_vector();
        let speed = if self.input.is_action_pressed(Action::Sprint) {
            self.speed * Self::SPRINT_FACTOR
        } else {
            self.speed
        };
        let next = self.position + direction * speed;
        if self.ghost || !streamer.collision_at(next) {
            self.position = next;
        } else if direction != Vec2::ZERO {
            report.blocked += 1;
        }

        streamer.update(&FixedObserver {
            position: self.position,
            movement: direction,
        })?;
        defeated.prune(streamer);

        let current = streamer.center();
        if current != self.section {
            if let Some(coord) = current {
                let active = streamer.activate_section(coord, |id| defeated.contains(id));
                tracing::info!(x = coord.x, y = coord.y, bosses = active, "entered section");
                report.sections_entered += 1;
            }
            self.section = current;
        }

        if self.input.is_action_pressed(Action::Interact) {
            self.interact(streamer, defeated, report)?;
        }
        Ok(())
    }

    /// Open chests and defeat bosses within one tile of the observer.
    fn interact(
        &self,
        streamer: &mut WorldStreamer,
        defeated: &mut DefeatedBosses,
        report: &mut WalkReport,
    ) -> anyhow::Result<()> {
        let here = self.tile()?;
        let coord = here.section();
        let reach = TileRect::spanning(
            TileCoord::new(here.x.saturating_sub(1), here.y.saturating_sub(1)),
            TileCoord::new(here.x.saturating_add(1), here.y.saturating_add(1)),
        );

        let bosses: Vec<_> = streamer
            .entities_for_section(coord)
            .iter()
            .filter(|b| b.footprint().intersects(&reach))
            .map(|b| b.id)
            .collect();
        for id in bosses {
            if streamer.remove_boss(coord, id) && defeated.record(id) {
                tracing::info!(boss = %id.short(), "boss defeated");
                report.bosses_defeated += 1;
            }
        }

        let Some(section) = streamer.section_mut(coord) else {
            return Ok(());
        };
        let chests: Vec<_> = section
            .chests()
            .iter()
            .filter(|c| reach.contains(c.position))
            .map(|c| c.id)
            .collect();
        for id in chests {
            if let Some(loot) = section.chest_mut(id).and_then(|c| c.open()) {
                tracing::info!(chest = %id.short(), loot, "opened chest");
                report.chests_opened += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_stream::MovementHint;

    #[test]
    fn parses_keys_and_counts() {
        let steps = parse_script("d120 sd40 !w e .5").unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], Step { keys: vec!["d".into()], frames: 120 });
        assert_eq!(steps[1].keys, vec!["s".to_string(), "d".to_string()]);
        assert_eq!(steps[2].keys, vec!["Shift".to_string(), "w".to_string()]);
        assert_eq!(steps[2].frames, 1);
        assert!(steps[4].keys.is_empty());
        assert_eq!(steps[4].frames, 5);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_script("d1x").is_err());
        assert!(parse_script("?4").is_err());
    }

    #[test]
    fn ghost_walk_east_moves_the_center() {
        let mut streamer = WorldStreamer::with_seed("test-seed");
        streamer.update_at(TileCoord::new(0, 0), MovementHint::NONE);
        let mut walker = Walker::at_tile(TileCoord::new(40, 40), 32.0);
        walker.ghost = true;
        let mut defeated = DefeatedBosses::new();

        // 100 frames at one tile per frame crosses one section boundary.
        let steps = parse_script("d100").unwrap();
        let report = walker
            .run(&mut streamer, &mut defeated, &steps, |_, _| {})
            .unwrap();
        assert_eq!(report.frames, 100);
        assert_eq!(report.blocked, 0);
        assert_eq!(walker.tile().unwrap(), TileCoord::new(140, 40));
        assert_eq!(streamer.center(), Some(SectionCoord::new(1, 0)));
        assert_eq!(report.sections_entered, 2);
    }
}
