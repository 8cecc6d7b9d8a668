//! Rerun streaming for assembled scenes.
//!
//! Optional: only available with the `visualization` feature. Without it
//! every method compiles to a no-op so callers never need their own
//! feature gates.
//!
//! # What Gets Logged
//!
//! - Agent trajectory tubes as colored meshes
//! - Bomb sightings as points, with polylines joining persisting bombs
//! - Flames as life-scaled points, pickups and deaths as labeled points
//! - Board blocks as boxes, scrubbed along a `step` timeline
//! - The bomb-density heatmap as a vertex-colored grid mesh

#[cfg(feature = "visualization")]
use rerun::{
    Boxes3D, Color, LineStrips3D, Mesh3D, Points3D, Position3D, Radius, RecordingStream,
};

#[cfg(feature = "visualization")]
use crate::scene::{BlockKind, CubeScene};
#[cfg(not(feature = "visualization"))]
use crate::scene::CubeScene;
use crate::scene::BoardBlock;

/// Rerun logger for space-time cube scenes.
pub struct RerunScene {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunScene {
    /// Creates a logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a logger that spawns the Rerun viewer.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to see the cube");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self {
                    rec: None,
                    enabled: false,
                }
            }
        }
    }

    /// Creates a logger - returns disabled if the feature is off.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs the full static cube: tubes, markers, heatmap, base board.
    #[cfg(feature = "visualization")]
    pub fn log_scene(&self, scene: &CubeScene) {
        let Some(ref rec) = self.rec else {
            return;
        };

        for track in &scene.agents {
            let positions: Vec<Position3D> = track
                .mesh
                .vertices
                .iter()
                .map(|v| Position3D::new(v.x, v.y, v.z))
                .collect();
            let color = player_color(track.player);

            let _ = rec.log(
                format!("cube/agents/{}/tube", track.player),
                &Mesh3D::new(positions)
                    .with_triangle_indices(track.mesh.triangles.iter().copied())
                    .with_vertex_colors(vec![color; track.mesh.vertex_count()]),
            );
        }

        for track in &scene.bombs {
            let color = player_color(track.player);
            let path = format!("cube/bombs/p{}/b{}", track.player, track.bomb_id);

            let points: Vec<Position3D> = track
                .markers
                .iter()
                .map(|m| Position3D::new(m.x, m.y, m.z))
                .collect();
            let _ = rec.log(
                format!("{}/markers", path),
                &Points3D::new(points)
                    .with_colors([color])
                    .with_radii([Radius::new_scene_units(track.footprint / 2.0)]),
            );

            // A persisting bomb draws the line between its sightings.
            if track.markers.len() > 1 {
                let strip: Vec<[f32; 3]> = track
                    .markers
                    .iter()
                    .map(|m| [m.x, m.y, m.z])
                    .collect();
                let _ = rec.log(
                    format!("{}/line", path),
                    &LineStrips3D::new([strip]).with_colors([color]),
                );
            }
        }

        if !scene.flames.is_empty() {
            let points: Vec<Position3D> = scene
                .flames
                .iter()
                .map(|f| Position3D::new(f.position.x, f.position.y, f.position.z))
                .collect();
            let radii: Vec<Radius> = scene
                .flames
                .iter()
                .map(|f| Radius::new_scene_units(f.footprint / 2.0))
                .collect();
            let _ = rec.log(
                "cube/flames",
                &Points3D::new(points)
                    .with_colors([Color::from_rgb(255, 120, 0)])
                    .with_radii(radii),
            );
        }

        if !scene.pickups.is_empty() {
            let points: Vec<Position3D> = scene
                .pickups
                .iter()
                .map(|p| Position3D::new(p.position.x, p.position.y, p.position.z))
                .collect();
            let labels: Vec<String> = scene
                .pickups
                .iter()
                .map(|p| format!("{:?}", p.kind))
                .collect();
            let _ = rec.log(
                "cube/pickups",
                &Points3D::new(points)
                    .with_colors([Color::from_rgb(255, 255, 255)])
                    .with_labels(labels),
            );
        }

        for death in &scene.deaths {
            let _ = rec.log(
                format!("cube/deaths/{}", death.player),
                &Points3D::new([Position3D::new(
                    death.position.x,
                    death.position.y,
                    death.position.z,
                )])
                .with_colors([player_color(death.player)])
                .with_labels([format!("player {} down", death.player)]),
            );
        }

        {
            let positions: Vec<Position3D> = scene
                .heatmap
                .vertices
                .iter()
                .map(|v| Position3D::new(v.x, v.y, v.z))
                .collect();
            let colors: Vec<Color> = scene
                .heatmap
                .colors
                .iter()
                .map(|c| {
                    Color::from_rgb(
                        (c.r * 255.0) as u8,
                        (c.g * 255.0) as u8,
                        (c.b * 255.0) as u8,
                    )
                })
                .collect();
            let _ = rec.log(
                "cube/heatmap",
                &Mesh3D::new(positions)
                    .with_triangle_indices(scene.heatmap.triangles.iter().copied())
                    .with_vertex_colors(colors),
            );
        }

        self.log_board_level(scene.from, &scene.blocks);
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_scene(&self, _scene: &CubeScene) {}

    /// Logs one board level on the `step` timeline, so scrubbing the
    /// timeline replays the board.
    #[cfg(feature = "visualization")]
    pub fn log_board_level(&self, step: usize, blocks: &[BoardBlock]) {
        let Some(ref rec) = self.rec else {
            return;
        };
        rec.set_time_sequence("step", step as i64);

        let centers: Vec<[f32; 3]> = blocks
            .iter()
            .map(|b| [b.position.x, b.position.y, b.position.z])
            .collect();
        let sizes: Vec<[f32; 3]> = blocks.iter().map(|b| [b.size, b.size, b.size]).collect();
        let colors: Vec<Color> = blocks
            .iter()
            .map(|b| match b.kind {
                BlockKind::Rigid => Color::from_rgb(90, 90, 90),
                BlockKind::Wooden => Color::from_rgb(150, 100, 40),
            })
            .collect();

        let _ = rec.log(
            "cube/board",
            &Boxes3D::from_centers_and_sizes(centers, sizes).with_colors(colors),
        );
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_board_level(&self, _step: usize, _blocks: &[BoardBlock]) {}
}

/// Fixed per-player palette, matching marker and tube colors.
#[cfg(feature = "visualization")]
fn player_color(player: usize) -> Color {
    match player % 4 {
        0 => Color::from_rgb(255, 100, 100), // Red
        1 => Color::from_rgb(100, 100, 255), // Blue
        2 => Color::from_rgb(255, 255, 100), // Yellow
        _ => Color::from_rgb(100, 255, 100), // Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logger_is_a_no_op() {
        let logger = RerunScene::disabled();
        assert!(!logger.is_enabled());

        logger.log_board_level(0, &[]);
    }
}
