//! Space-time cube scene assembly.
//!
//! Projects a step window of a recorded match into plain renderable data:
//! one trajectory tube per surviving agent, board blocks for a chosen
//! step, bomb tracks with their connecting polylines, flame and pickup
//! markers, death markers, and the bomb-density heatmap. Everything here
//! is data; streaming it to a renderer lives in
//! [`visualizer`](crate::visualizer).

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stc_core::{
    build_heatmap, GeometryError, GridMesh, HeatmapStyle, MatchLog, PathPoint, PowerUp,
    QueryError, TubeMesh, TubeMeshBuilder, PLAYER_COUNT,
};
use stc_core::match_log::{CELL_RIGID, CELL_WOODEN};

/// Marker footprints never grow past this height, or long windows would
/// produce markers taller than a board cell.
const MARKER_MAX_HEIGHT: f32 = 0.3;

/// Errors raised while assembling a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    #[error("invalid tube configuration: {0}")]
    Geometry(#[from] GeometryError),
}

/// Mapping from board/step coordinates into cube world space.
///
/// The cube base sits at the window's `from` step; the vertical axis is
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeScale {
    pub x_scale: f32,
    pub y_scale: f32,
    pub from: usize,
}

impl CubeScale {
    /// Scales a `width`-wide, `height`-tall cube over the window
    /// `from..=to`. The board spans ten cell strides across `width`.
    pub fn new(width: f32, height: f32, from: usize, to: usize) -> Self {
        Self {
            x_scale: width / 10.0,
            y_scale: height / (to.saturating_sub(from)).max(1) as f32,
            from,
        }
    }

    /// World-space position of a path point. Steps before `from` land
    /// below the cube base at negative height.
    pub fn world(&self, point: &PathPoint) -> Point3<f32> {
        Point3::new(
            point.x as f32 * self.x_scale,
            (point.step as f32 - self.from as f32) * self.y_scale,
            point.z as f32 * self.x_scale,
        )
    }
}

/// Parameters of one scene build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    pub from: usize,
    pub to: usize,
    /// World-space footprint of the board
    pub width: f32,
    /// World-space height of the full step window
    pub height: f32,
    /// Tube radius in board units
    pub thickness: f32,
    /// Tube cross-section vertex count
    pub roundness: usize,
    /// Board step to lay out blocks for; defaults to `from`
    pub board_step: Option<usize>,
    pub draw_bombs: bool,
    pub draw_pickups: bool,
}

impl SceneConfig {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            width: 5.0,
            height: 7.5,
            thickness: 1.0,
            roundness: 8,
            board_step: None,
            draw_bombs: true,
            draw_pickups: true,
        }
    }

    /// The default viewing window: centered just before the midgame,
    /// fifty steps long, clipped to the log.
    pub fn auto_window(log: &MatchLog) -> (usize, usize) {
        let last = log.len() - 1;
        let from = (last as f32 * 0.45).round() as usize;
        let to = (from + 50).min(last);
        (from, to)
    }
}

/// Board block kinds that produce geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Rigid,
    Wooden,
}

/// One board cell block at a given step level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardBlock {
    pub kind: BlockKind,
    pub position: Point3<f32>,
    pub size: f32,
}

/// A surviving agent's trajectory tube.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTrack {
    pub player: usize,
    pub mesh: TubeMesh,
}

/// All sightings of one bomb, in step order. Consecutive markers of a
/// persisting bomb are joined by a polyline when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombTrack {
    pub player: usize,
    pub bomb_id: u32,
    pub markers: Vec<Point3<f32>>,
    pub footprint: f32,
    pub height: f32,
}

/// One flame sighting, sized by remaining life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameMarker {
    pub position: Point3<f32>,
    pub footprint: f32,
    pub height: f32,
}

/// A collected power-up at its first-contact position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupMarker {
    pub kind: PowerUp,
    pub position: Point3<f32>,
}

/// A player's death, marked at their last live position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathMarker {
    pub player: usize,
    pub position: Point3<f32>,
}

/// A fully assembled space-time cube, ready for export or streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeScene {
    pub from: usize,
    pub to: usize,
    pub scale: CubeScale,
    pub agents: Vec<AgentTrack>,
    pub blocks: Vec<BoardBlock>,
    pub bombs: Vec<BombTrack>,
    pub flames: Vec<FlameMarker>,
    pub pickups: Vec<PickupMarker>,
    pub deaths: Vec<DeathMarker>,
    pub heatmap: GridMesh,
}

/// Assembles [`CubeScene`]s from a match log and a [`SceneConfig`].
pub struct SceneBuilder<'a> {
    log: &'a MatchLog,
    config: SceneConfig,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(log: &'a MatchLog, config: SceneConfig) -> Self {
        Self { log, config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Builds the whole scene for the configured window.
    pub fn build(&self) -> Result<CubeScene, SceneError> {
        let cfg = &self.config;
        let scale = CubeScale::new(cfg.width, cfg.height, cfg.from, cfg.to);
        let tube = TubeMeshBuilder::new(cfg.roundness, cfg.thickness)?;

        let mut agents = Vec::new();
        for player in 0..PLAYER_COUNT {
            let path = self.log.trajectory(player, cfg.from, cfg.to)?;
            if path.is_empty() {
                // Dead before the window opens; nothing to sweep.
                continue;
            }
            let world: Vec<Point3<f32>> = path.iter().map(|p| scale.world(p)).collect();
            agents.push(AgentTrack {
                player,
                mesh: tube.build(&world),
            });
        }

        let blocks = self.board_blocks(cfg.board_step.unwrap_or(cfg.from))?;

        let mut bombs = Vec::new();
        let mut flames = Vec::new();
        if cfg.draw_bombs {
            let footprint = 0.35 * scale.x_scale;
            let height = (0.75 * scale.y_scale).min(MARKER_MAX_HEIGHT);
            for player in 0..PLAYER_COUNT {
                for (bomb_id, points) in self.log.bombs_by_bomber(player, cfg.from, cfg.to)? {
                    bombs.push(BombTrack {
                        player,
                        bomb_id,
                        markers: points.iter().map(|p| scale.world(p)).collect(),
                        footprint,
                        height,
                    });
                }
            }

            let flame_height = scale.y_scale.min(MARKER_MAX_HEIGHT);
            for (life, points) in self.log.flames_by_life(cfg.from, cfg.to)? {
                let footprint = flame_footprint(life, scale.x_scale);
                flames.extend(points.iter().map(|p| FlameMarker {
                    position: scale.world(p),
                    footprint,
                    height: flame_height,
                }));
            }
        }

        let mut pickups = Vec::new();
        if cfg.draw_pickups {
            for (point, code) in self.log.first_pickup_contacts(cfg.from, cfg.to)? {
                // Reserved item codes carry no icon.
                let Some(kind) = PowerUp::from_code(code) else {
                    continue;
                };
                pickups.push(PickupMarker {
                    kind,
                    position: scale.world(&point),
                });
            }
        }

        let deaths = self
            .log
            .death_events(cfg.from, cfg.to)?
            .into_iter()
            .map(|event| DeathMarker {
                player: event.player,
                position: scale.world(&event.last_position),
            })
            .collect();

        let heatmap = build_heatmap(
            &self.log.bomb_density(cfg.from, cfg.to)?,
            &HeatmapStyle {
                cell_size: scale.x_scale,
                ..Default::default()
            },
        );

        Ok(CubeScene {
            from: cfg.from,
            to: cfg.to,
            scale,
            agents,
            blocks,
            bombs,
            flames,
            pickups,
            deaths,
            heatmap,
        })
    }

    /// Block layout of one board level within the window, for step
    /// scrubbing.
    pub fn board_blocks(&self, step: usize) -> Result<Vec<BoardBlock>, SceneError> {
        let cfg = &self.config;
        let scale = CubeScale::new(cfg.width, cfg.height, cfg.from, cfg.to);
        let board = self.log.board_slice(step, step)?[0];

        let level = (step as f32 - cfg.from as f32) * scale.y_scale;
        let mut blocks = Vec::new();
        for (row, cells) in board.iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                let kind = match cell {
                    CELL_RIGID => BlockKind::Rigid,
                    CELL_WOODEN => BlockKind::Wooden,
                    _ => continue,
                };
                blocks.push(BoardBlock {
                    kind,
                    position: Point3::new(
                        row as f32 * scale.x_scale,
                        level,
                        col as f32 * scale.x_scale,
                    ),
                    size: scale.x_scale,
                });
            }
        }
        Ok(blocks)
    }
}

/// Flame footprint by remaining life: fresher flames draw bigger.
fn flame_footprint(life: u32, x_scale: f32) -> f32 {
    match life {
        2 => 0.9 * x_scale,
        1 => 0.6 * x_scale,
        0 => 0.3 * x_scale,
        _ => x_scale,
    }
}
