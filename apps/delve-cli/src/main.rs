mod walk;

use anyhow::Context;
use clap::{Parser, Subcommand};
use delve_common::{SectionCoord, Seed, TILE_PIXELS, TileCoord};
use delve_persist::{ChunkSelection, DefeatedBosses, SaveStore, WorldSave};
use delve_render::{AsciiCanvas, FollowCamera, Render};
use delve_stream::{GenerationMode, MovementHint, StreamConfig, WorldContext, WorldStreamer};
use delve_tools::WorldInspector;
use glam::Vec2;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::walk::{Walker, parse_script};

#[derive(Parser)]
#[command(name = "delve", about = "Stream, inspect and walk a procedural cave world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World seed: an integer or any text
    #[arg(short, long, default_value = "test-seed", global = true)]
    seed: String,

    /// Stream configuration as JSON; defaults apply to omitted fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Generate one section and print its report
    Section {
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        y: i32,
    },
    /// Count section biomes around a section without generating terrain
    Survey {
        #[arg(short, long, default_value = "10")]
        radius: i32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: i32,
    },
    /// Draw the terrain around a tile as text
    View {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: i32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: i32,
        #[arg(long, default_value = "80")]
        width: usize,
        #[arg(long, default_value = "40")]
        height: usize,
        /// Screen pixels per world pixel; below 1 fits more tiles per cell
        #[arg(long, default_value = "1.0")]
        zoom: f32,
    },
    /// Walk a key script, e.g. "d400 s200 e"
    Walk {
        script: String,
        /// Start tile x
        #[arg(long, default_value = "40", allow_hyphen_values = true)]
        x: i32,
        /// Start tile y
        #[arg(long, default_value = "40", allow_hyphen_values = true)]
        y: i32,
        /// Pixels per frame at walking pace
        #[arg(long, default_value = "8.0")]
        speed: f32,
        /// Walk through walls
        #[arg(long)]
        ghost: bool,
        /// Print a streamer summary every N frames
        #[arg(long, default_value = "100")]
        report_every: u64,
        /// Write a save into this directory when the walk ends
        #[arg(long)]
        save_dir: Option<PathBuf>,
        /// Record every resident chunk, not just edited ones
        #[arg(long)]
        all_chunks: bool,
    },
    /// Restore the latest save from a directory
    Load {
        save_dir: PathBuf,
        /// Also check the hash chain of every save in the directory
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let seed = Seed::from(cli.seed.as_str());
    let config = match &cli.config {
        Some(path) => StreamConfig::from_json_file(path)
            .with_context(|| format!("reading stream config {}", path.display()))?,
        None => StreamConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("delve v{}", env!("CARGO_PKG_VERSION"));
            println!("seed: {seed} ({:?})", cli.seed);
            println!("persist: {}", delve_persist::crate_info());
            println!("render: {}", delve_render::crate_info());
            println!("stream: {}", delve_stream::crate_info());
            println!("tools: {}", delve_tools::crate_info());
            println!(
                "stream config: view={} load={} save={} max={} mode={:?}",
                config.view_distance,
                config.load_distance,
                config.save_distance,
                config.max_distance,
                config.mode
            );
        }
        Commands::Section { x, y } => {
            let mut streamer = build_streamer(seed, config)?;
            let coord = SectionCoord::new(x, y);
            if streamer.get_section(coord).is_none() {
                anyhow::bail!("section ({x}, {y}) lies outside the world");
            }
            let info = WorldInspector::inspect_section(&streamer, coord)
                .context("section vanished after generation")?;
            println!("{info}");
            for boss in streamer.entities_for_section(coord) {
                let stats = boss.stats();
                println!(
                    "  boss {} {} at ({}, {}) hp={} str={} def={}",
                    boss.id.short(),
                    boss.kind.name(),
                    boss.center.x,
                    boss.center.y,
                    stats.max_hp,
                    stats.strength,
                    stats.defense
                );
            }
            if let Some(section) = streamer.section(coord) {
                for chest in section.chests() {
                    println!(
                        "  chest {} at ({}, {}) loot={:016x}",
                        chest.id.short(),
                        chest.position.x,
                        chest.position.y,
                        chest.loot_seed()
                    );
                }
            }
        }
        Commands::Survey { radius, x, y } => {
            let survey = WorldInspector::survey(seed, SectionCoord::new(x, y), radius);
            print!("{survey}");
        }
        Commands::View {
            x,
            y,
            width,
            height,
            zoom,
        } => {
            let mut streamer = build_streamer(seed, config)?;
            let tile = TileCoord::new(x, y);
            streamer.update_at(tile, MovementHint::NONE);
            settle(&mut streamer)?;
            println!("{}", render_view(&streamer, tile, width, height, zoom));
            println!("{}", WorldInspector::summary(&streamer));
        }
        Commands::Walk {
            script,
            x,
            y,
            speed,
            ghost,
            report_every,
            save_dir,
            all_chunks,
        } => {
            let steps = parse_script(&script)?;
            let mut streamer = build_streamer(seed, config)?;
            let mut defeated = DefeatedBosses::new();
            let mut walker = Walker::at_tile(TileCoord::new(x, y), speed);
            walker.ghost = ghost;

            let report_every = report_every.max(1);
            let report = walker.run(&mut streamer, &mut defeated, &steps, |frame, s| {
                if frame % report_every == 0 {
                    println!("[{frame:>6}] {}", WorldInspector::summary(s));
                }
            })?;
            settle(&mut streamer)?;

            let end = walker.tile()?;
            println!(
                "Walked {} frames to ({}, {}): blocked={} sections={} chests={} bosses={}",
                report.frames,
                end.x,
                end.y,
                report.blocked,
                report.sections_entered,
                report.chests_opened,
                report.bosses_defeated
            );
            println!("{}", WorldInspector::summary(&streamer));

            if let Some(dir) = save_dir {
                let selection = if all_chunks {
                    ChunkSelection::AllResident
                } else {
                    ChunkSelection::Edited
                };
                let save = WorldSave::capture(&streamer, end, &defeated, selection);
                let index = SaveStore::open(&dir)?.write(&save)?;
                println!("Saved slot {index} to {}", dir.display());
            }
        }
        Commands::Load { save_dir, verify } => {
            let save = load_latest(&save_dir, verify)?;
            let mut streamer = build_streamer(save.seed, config)?;
            let report = save.restore(&mut streamer)?;
            settle(&mut streamer)?;
            println!(
                "Restored at ({}, {}): chunks={} objects={} chests={} bosses_removed={} divergent={}",
                save.observer.x,
                save.observer.y,
                report.chunks,
                report.objects,
                report.chests_opened,
                report.bosses_removed,
                report.divergent_chunks
            );
            println!("{}", WorldInspector::summary(&streamer));
        }
    }

    Ok(())
}

fn build_streamer(seed: Seed, config: StreamConfig) -> anyhow::Result<WorldStreamer> {
    let mode = config.mode;
    let streamer = WorldStreamer::new(WorldContext::new(seed), config)?;
    if let GenerationMode::Background { workers } = mode {
        tracing::info!(workers, "generating sections in the background");
    }
    Ok(streamer)
}

/// Wait for background generation so reports see every requested section.
fn settle(streamer: &mut WorldStreamer) -> anyhow::Result<()> {
    let adopted = streamer.finish_pending()?;
    if adopted > 0 {
        tracing::debug!(adopted, "adopted pending sections");
    }
    Ok(())
}

fn render_view(
    streamer: &WorldStreamer,
    center: TileCoord,
    width: usize,
    height: usize,
    zoom: f32,
) -> String {
    let mut canvas = AsciiCanvas::new(width, height, TILE_PIXELS as f32);
    let mut camera = FollowCamera::new(canvas.viewport());
    camera.zoom(zoom, true);
    camera.follow(center.to_pixels() + Vec2::splat(TILE_PIXELS as f32 * 0.5), true);
    streamer.render(&mut canvas, &camera);
    tracing::debug!(draw_calls = canvas.draw_calls(), "rendered view");
    canvas.to_text()
}

fn load_latest(dir: &Path, verify: bool) -> anyhow::Result<WorldSave> {
    let store = SaveStore::open(dir).with_context(|| format!("opening saves in {}", dir.display()))?;
    if verify {
        store.verify_integrity()?;
        println!("Integrity OK ({} saves)", store.manifest().entries.len());
    }
    Ok(store.load_latest()?)
}
