//! Trajectory tube meshes.
//!
//! Sweeps a circular cross-section along an ordered path of world-space
//! points and produces flat vertex/index buffers for a renderer. Every
//! ring shares one fixed orientation: the tube does not rotate to follow
//! path curvature, which suits the mostly-vertical paths of a space-time
//! cube.

use std::f32::consts::TAU;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Tube radii are authored in board units; the world-space circle is a
/// tenth of that.
const RADIUS_DIVISOR: f32 = 10.0;

/// A closed tube surface: vertex positions plus triangle index triples.
///
/// Rebuilds are whole-mesh: a changed path produces a fresh `TubeMesh`,
/// never an incremental patch, so callers can swap buffers atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TubeMesh {
    pub vertices: Vec<Point3<f32>>,
    pub triangles: Vec<[u32; 3]>,
}

impl TubeMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when there is no surface to draw.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Builds tube meshes from world-space paths.
///
/// The cross-section is a circle of `sides` vertices. The final ring is
/// closed with a triangle fan; the first ring stays open since tubes are
/// anchored at their start.
#[derive(Debug, Clone)]
pub struct TubeMeshBuilder {
    sides: usize,
    radius: f32,
    ring_orientation: UnitQuaternion<f32>,
}

impl TubeMeshBuilder {
    /// Creates a builder with the default ring orientation: the circle
    /// plane tilted -90 degrees about X, so rings face along the vertical
    /// time axis.
    pub fn new(sides: usize, radius: f32) -> Result<Self, GeometryError> {
        if sides < 3 {
            return Err(GeometryError::CrossSectionTooSmall { sides });
        }
        if radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius { radius });
        }
        Ok(Self {
            sides,
            radius,
            ring_orientation: UnitQuaternion::from_euler_angles(
                -std::f32::consts::FRAC_PI_2,
                0.0,
                0.0,
            ),
        })
    }

    /// Overrides the fixed orientation shared by every ring.
    pub fn with_ring_orientation(mut self, orientation: UnitQuaternion<f32>) -> Self {
        self.ring_orientation = orientation;
        self
    }

    pub fn sides(&self) -> usize {
        self.sides
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sweeps the cross-section along `path`.
    ///
    /// A path of fewer than two points yields its rings but an empty
    /// triangle list; with `k >= 2` points and `n` sides the mesh has
    /// exactly `k*n` vertices and `(k-1)*n*2 + (n-2)` triangles.
    pub fn build(&self, path: &[Point3<f32>]) -> TubeMesh {
        TubeMesh {
            vertices: self.ring_vertices(path),
            triangles: self.triangle_indices(path.len()),
        }
    }

    // One ring of vertices around each path point, all sharing the fixed
    // orientation.
    fn ring_vertices(&self, path: &[Point3<f32>]) -> Vec<Point3<f32>> {
        let radius = self.radius / RADIUS_DIVISOR;
        let mut vertices = Vec::with_capacity(path.len() * self.sides);
        for center in path {
            for i in 0..self.sides {
                let theta = TAU * i as f32 / self.sides as f32;
                let local = Vector3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
                vertices.push(center + self.ring_orientation * local);
            }
        }
        vertices
    }

    fn triangle_indices(&self, rings: usize) -> Vec<[u32; 3]> {
        if rings < 2 {
            return Vec::new();
        }

        let n = self.sides;
        let mut triangles = Vec::with_capacity((rings - 1) * n * 2 + (n - 2));

        // Side walls: one quad (two triangles) per edge between
        // consecutive rings, wound outward.
        for ring in 0..rings - 1 {
            let first = ring * n;
            let next = (ring + 1) * n;
            for i in 0..n {
                let a = (first + i) as u32;
                let b = (first + (i + 1) % n) as u32;
                let c = (next + i) as u32;
                let d = (next + (i + 1) % n) as u32;
                triangles.push([a, d, c]);
                triangles.push([a, b, d]);
            }
        }

        // Fan cap over the final ring.
        let last = ((rings - 1) * n) as u32;
        for i in 0..n as u32 - 2 {
            triangles.push([last, last + i + 1, last + i + 2]);
        }

        triangles
    }
}
