//! Space-Time Cube Viewer CLI
//!
//! Load a recorded match, build the cube for a step window, export it
//! and/or stream it to Rerun.

use clap::Parser;
use stc_core::MatchLog;
use stc_viewer::{RerunScene, SceneBuilder, SceneConfig, SceneExport};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Build and export space-time cubes from recorded Pommerman matches
#[derive(Parser, Debug)]
#[command(name = "stc-viewer")]
#[command(about = "Build a space-time cube from a recorded match log", long_about = None)]
struct Args {
    /// Path to the recorded match log (JSON)
    log: String,

    /// First step of the window (default: the automatic midgame window)
    #[arg(long)]
    from: Option<usize>,

    /// Last step of the window, inclusive
    #[arg(long)]
    to: Option<usize>,

    /// World-space footprint of the board
    #[arg(long, default_value = "5.0")]
    width: f32,

    /// World-space height of the step window
    #[arg(long, default_value = "7.5")]
    height: f32,

    /// Trajectory tube radius in board units
    #[arg(long, default_value = "1.0")]
    thickness: f32,

    /// Trajectory tube cross-section vertex count
    #[arg(long, default_value = "8")]
    roundness: usize,

    /// Board step to lay out blocks for (default: window start)
    #[arg(long)]
    board_step: Option<usize>,

    /// Skip bomb and flame markers
    #[arg(long)]
    no_bombs: bool,

    /// Skip pickup markers
    #[arg(long)]
    no_pickups: bool,

    /// Write the assembled scene to a JSON file
    #[arg(short, long)]
    export: Option<String>,

    /// Spawn the Rerun viewer and stream the scene to it
    #[arg(long)]
    spawn_viewer: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout for scripting
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let log = match MatchLog::load(&args.log) {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to load {}: {}", args.log, e);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded game {} ({} steps, {}x{} board)",
        log.game_id(),
        log.len(),
        log.board_size(),
        log.board_size()
    );

    let (auto_from, auto_to) = SceneConfig::auto_window(&log);
    let from = args.from.unwrap_or(auto_from);
    let to = args.to.unwrap_or(auto_to);
    debug!("Window {}..={} (auto {}..={})", from, to, auto_from, auto_to);

    let mut config = SceneConfig::new(from, to);
    config.width = args.width;
    config.height = args.height;
    config.thickness = args.thickness;
    config.roundness = args.roundness;
    config.board_step = args.board_step;
    config.draw_bombs = !args.no_bombs;
    config.draw_pickups = !args.no_pickups;

    let builder = SceneBuilder::new(&log, config);
    let scene = match builder.build() {
        Ok(scene) => scene,
        Err(e) => {
            error!("Failed to build scene: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Built cube {}..={}: {} tubes, {} bomb tracks, {} flames, {} pickups, {} deaths",
        scene.from,
        scene.to,
        scene.agents.len(),
        scene.bombs.len(),
        scene.flames.len(),
        scene.pickups.len(),
        scene.deaths.len()
    );

    if args.json {
        let summary = serde_json::json!({
            "game_id": log.game_id(),
            "steps": log.len(),
            "from": scene.from,
            "to": scene.to,
            "agents": scene.agents.len(),
            "bomb_tracks": scene.bombs.len(),
            "flames": scene.flames.len(),
            "pickups": scene.pickups.len(),
            "deaths": scene.deaths.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    }

    if let Some(path) = &args.export {
        let export = SceneExport::new(&args.log, &log, scene.clone());
        if let Err(e) = export.write_to_file(path) {
            error!("Failed to write export: {:?}", e);
            std::process::exit(1);
        }
        info!("Exported scene to {}", path);
    }

    if args.spawn_viewer {
        let viz = RerunScene::new("stc_viewer");
        if viz.is_enabled() {
            viz.log_scene(&scene);

            // Replay the board along the step timeline.
            for step in scene.from..=scene.to {
                match builder.board_blocks(step) {
                    Ok(blocks) => viz.log_board_level(step, &blocks),
                    Err(e) => {
                        error!("Failed to build board level {}: {}", step, e);
                        break;
                    }
                }
            }
        }
    }
}
