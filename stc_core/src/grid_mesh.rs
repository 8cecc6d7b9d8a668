//! Heatmap grid meshes.
//!
//! Turns a square grid of per-cell counts (typically
//! [`bomb_density`](crate::match_log::MatchLog::bomb_density) output)
//! into a flat quad mesh with one color per cell, baked into the vertex
//! colors for a vertex-color material.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Componentwise linear interpolation towards `other`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Gradient endpoint for unvisited cells.
pub const HEAT_LOW: Color = Color::rgb(0.8, 0.8, 0.8);
/// Gradient endpoint for the hottest cell.
pub const HEAT_HIGH: Color = Color::rgb(0.4, 0.0, 0.6);

/// Visual parameters of a heatmap grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapStyle {
    pub low: Color,
    pub high: Color,
    /// Edge length of one cell quad in world units
    pub cell_size: f32,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            low: HEAT_LOW,
            high: HEAT_HIGH,
            cell_size: 1.0,
        }
    }
}

/// A flat grid mesh with per-vertex colors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridMesh {
    pub vertices: Vec<Point3<f32>>,
    pub triangles: Vec<[u32; 3]>,
    /// One entry per vertex
    pub colors: Vec<Color>,
}

impl GridMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Builds a quad-per-cell mesh in the XZ plane from a square grid of
/// counts, `cells[x][z]`.
///
/// Cell color is `lerp(low, high, (value / max)^0.5)` with `max` the
/// largest count in the grid; an all-zero grid maps every cell to the low
/// color exactly, with no division by zero.
pub fn build_heatmap(cells: &[Vec<u32>], style: &HeatmapStyle) -> GridMesh {
    let size = cells.len();
    let max = cells.iter().flatten().copied().max().unwrap_or(0);

    let cell_size = style.cell_size;
    let half = cell_size / 2.0;

    let mut mesh = GridMesh {
        vertices: Vec::with_capacity(size * size * 4),
        triangles: Vec::with_capacity(size * size * 2),
        colors: Vec::with_capacity(size * size * 4),
    };

    for z in 0..size {
        for x in 0..size {
            let base = mesh.vertices.len() as u32;
            let x0 = x as f32 * cell_size - half;
            let z0 = z as f32 * cell_size - half;

            mesh.vertices.push(Point3::new(x0, 0.0, z0));
            mesh.vertices.push(Point3::new(x0 + cell_size, 0.0, z0));
            mesh.vertices.push(Point3::new(x0, 0.0, z0 + cell_size));
            mesh.vertices.push(Point3::new(x0 + cell_size, 0.0, z0 + cell_size));

            let color = cell_color(cells[x][z], max, style);
            mesh.colors.extend([color; 4]);

            mesh.triangles.push([base, base + 3, base + 1]);
            mesh.triangles.push([base, base + 2, base + 3]);
        }
    }

    mesh
}

fn cell_color(value: u32, max: u32, style: &HeatmapStyle) -> Color {
    if max == 0 {
        return style.low;
    }
    let ratio = (value as f32 / max as f32).sqrt();
    style.low.lerp(style.high, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quad_and_triangle_counts() {
        let cells = vec![vec![0u32; 3]; 3];
        let mesh = build_heatmap(&cells, &HeatmapStyle::default());

        assert_eq!(mesh.vertex_count(), 9 * 4);
        assert_eq!(mesh.triangle_count(), 9 * 2);
        assert_eq!(mesh.colors.len(), mesh.vertex_count());
    }

    #[test]
    fn test_all_zero_grid_is_uniformly_low() {
        let cells = vec![vec![0u32; 4]; 4];
        let style = HeatmapStyle::default();
        let mesh = build_heatmap(&cells, &style);

        for color in &mesh.colors {
            assert_eq!(*color, style.low);
        }
    }

    #[test]
    fn test_hottest_cell_reaches_high_color() {
        let mut cells = vec![vec![0u32; 2]; 2];
        cells[1][0] = 5;
        let style = HeatmapStyle::default();
        let mesh = build_heatmap(&cells, &style);

        // Cells are emitted z-major: (0,0) (1,0) (0,1) (1,1); cell (1,0)
        // is the second quad.
        let hot = &mesh.colors[4..8];
        for color in hot {
            assert_relative_eq!(color.r, style.high.r);
            assert_relative_eq!(color.g, style.high.g);
            assert_relative_eq!(color.b, style.high.b);
        }
        // Everything else sits at the low end.
        assert_eq!(mesh.colors[0], style.low);
    }

    #[test]
    fn test_sqrt_curve_brightens_midrange() {
        let style = HeatmapStyle::default();
        // value/max = 1/4 gives ratio 0.5, not 0.25.
        let color = cell_color(1, 4, &style);
        let expected = style.low.lerp(style.high, 0.5);
        assert_relative_eq!(color.r, expected.r);
        assert_relative_eq!(color.g, expected.g);
        assert_relative_eq!(color.b, expected.b);
    }

    #[test]
    fn test_cells_centered_on_coordinates() {
        let cells = vec![vec![1u32]];
        let style = HeatmapStyle {
            cell_size: 2.0,
            ..Default::default()
        };
        let mesh = build_heatmap(&cells, &style);

        // A single cell spans [-1, 1] in both axes, centered on (0, 0).
        assert_eq!(mesh.vertices[0], Point3::new(-1.0, 0.0, -1.0));
        assert_eq!(mesh.vertices[3], Point3::new(1.0, 0.0, 1.0));
    }
}
