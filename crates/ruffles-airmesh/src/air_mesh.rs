//! The air mesh: a triangulation of the strip and the air around it.
//!
//! Vertices mirror the simulation mesh one-to-one (same order), segments are
//! constraint edges. As long as every finite triangle keeps a non-negative
//! signed area the strip cannot pass through itself, so inverted triangles
//! are penalized in the energy and repaired by [`AirMesh::project`].

use glam::DVec2;
use ruffles_geometry::predicates::cross;
use ruffles_types::constants::{OUTER_FACE_QUALITY, PROJECTION_MIN_AREA};
use serde::{Deserialize, Serialize};

use crate::triangulation::{is_outer, Triangulation};

/// Passes over all edges before `relax` gives up.
const MAX_RELAX_PASSES: usize = 1000;

/// Passes over all triangles before `project` gives up.
const MAX_PROJECT_PASSES: usize = 100;

/// Where an air-mesh vertex takes its position from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AirVertex {
    /// Pinned position.
    Fixed(DVec2),
    /// Index of the vertex in the DOF vector (`x[2i]`, `x[2i + 1]`).
    Dof(usize),
}

impl AirVertex {
    #[inline]
    pub fn position(&self, x: &[f64]) -> DVec2 {
        match *self {
            AirVertex::Fixed(p) => p,
            AirVertex::Dof(i) => DVec2::new(x[2 * i], x[2 * i + 1]),
        }
    }

    #[inline]
    fn dof(&self) -> Option<usize> {
        match *self {
            AirVertex::Fixed(_) => None,
            AirVertex::Dof(i) => Some(i),
        }
    }
}

/// Constrained triangulation over the simulation-mesh vertices.
#[derive(Debug, Clone, Default)]
pub struct AirMesh {
    vertices: Vec<AirVertex>,
    triangulation: Triangulation,
}

impl AirMesh {
    /// An empty air mesh; [`AirMesh::is_empty`] returns true.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulates `vertices` at their positions in `x`, with every
    /// `(start, end)` vertex-index pair as a constraint, then relaxes.
    pub fn build(vertices: Vec<AirVertex>, constraints: &[(usize, usize)], x: &[f64]) -> Self {
        let points: Vec<DVec2> = vertices.iter().map(|v| v.position(x)).collect();
        let triangulation = Triangulation::build(&points, constraints);
        let mut mesh = Self {
            vertices,
            triangulation,
        };
        let flipped = mesh.relax(x);
        tracing::debug!(
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            flipped,
            "air mesh generated"
        );
        mesh
    }

    pub fn is_empty(&self) -> bool {
        self.triangulation.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangulation = Triangulation::default();
    }

    pub fn vertices(&self) -> &[AirVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles not touching the outer face.
    pub fn triangle_count(&self) -> usize {
        self.triangulation.finite_triangles().count()
    }

    /// Vertex-index triples of the finite triangles.
    pub fn finite_triangles(&self) -> Vec<[usize; 3]> {
        self.triangulation.finite_triangles().collect()
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// True if the edge between vertices `a` and `b` is a constraint.
    pub fn is_constrained(&self, a: usize, b: usize) -> bool {
        self.triangulation.is_constrained(a, b)
    }

    fn quality(&self, tri: [usize; 3], x: &[f64]) -> f64 {
        if tri.iter().any(|&v| is_outer(v)) {
            return OUTER_FACE_QUALITY;
        }
        let [a, b, c] = tri.map(|v| self.vertices[v].position(x));
        let area = 0.5 * cross(a, b, c);
        if area < 0.0 {
            return f64::NEG_INFINITY;
        }
        area / ((b - a).length_squared() + (c - a).length_squared() + (c - b).length_squared())
    }

    /// Flips unconstrained edges while that raises the worse of the two
    /// adjacent triangle qualities, until no such edge is left.
    ///
    /// Returns true if any edge was flipped.
    pub fn relax(&mut self, x: &[f64]) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut any_flips = false;
        for _ in 0..MAX_RELAX_PASSES {
            let mut has_flips = false;
            for t in 0..self.triangulation.triangles.len() {
                for i in 0..3 {
                    let tri = &self.triangulation.triangles[t];
                    let Some(u) = tri.neighbors[i] else {
                        continue;
                    };
                    if u < t || tri.constrained[i] {
                        continue;
                    }
                    let (q, r) = tri.edge(i);
                    if is_outer(q) || is_outer(r) {
                        continue;
                    }
                    let Some((_, j)) = self.triangulation.opposite(t, i) else {
                        continue;
                    };
                    let p = tri.vertices[i];
                    let d = self.triangulation.triangles[u].vertices[j];

                    let old = self.quality([p, q, r], x).min(self.quality([q, d, r], x));
                    let new = self.quality([p, q, d], x).min(self.quality([p, d, r], x));
                    if old.is_finite() && new > old {
                        self.triangulation.flip(t, i);
                        has_flips = true;
                        any_flips = true;
                    }
                }
            }
            if !has_flips {
                return any_flips;
            }
        }
        tracing::warn!(passes = MAX_RELAX_PASSES, "air mesh relaxation hit its pass limit");
        any_flips
    }

    /// Sums `k · (−area)` over inverted finite triangles, where `area` is the
    /// doubled signed area, and accumulates its gradient into `grad`.
    pub fn penalty(&self, k: f64, x: &[f64], mut grad: Option<&mut [f64]>) -> f64 {
        let mut res = 0.0;
        for tri in self.triangulation.finite_triangles() {
            let [va, vb, vc] = tri.map(|v| self.vertices[v]);
            let (a, b, c) = (va.position(x), vb.position(x), vc.position(x));
            let area = cross(a, b, c);
            if area >= 0.0 {
                continue;
            }
            res += -k * area;

            if let Some(g) = grad.as_deref_mut() {
                let darea = area_gradient(a, b, c);
                for (vertex, d) in [va, vb, vc].iter().zip(darea) {
                    if let Some(ix) = vertex.dof() {
                        g[2 * ix] -= k * d.x;
                        g[2 * ix + 1] -= k * d.y;
                    }
                }
            }
        }
        res
    }

    /// Pushes the movable vertices of every triangle whose doubled area is
    /// below a small positive threshold along the area gradient, one
    /// Newton step per triangle, until all triangles pass.
    pub fn project(&self, x: &mut [f64]) {
        if self.is_empty() {
            return;
        }
        let triangles = self.finite_triangles();
        for _ in 0..MAX_PROJECT_PASSES {
            let mut changed = false;
            for tri in &triangles {
                let [va, vb, vc] = tri.map(|v| self.vertices[v]);
                let (a, b, c) = (va.position(x), vb.position(x), vc.position(x));
                let constraint = cross(a, b, c) - PROJECTION_MIN_AREA;
                if constraint >= 0.0 {
                    continue;
                }
                let darea = area_gradient(a, b, c);
                let movable = [va, vb, vc].map(|v| v.dof());
                let sqnorm: f64 = movable
                    .iter()
                    .zip(darea)
                    .filter(|(ix, _)| ix.is_some())
                    .map(|(_, d)| d.length_squared())
                    .sum();
                if sqnorm == 0.0 {
                    continue;
                }
                changed = true;
                let fac = -constraint / sqnorm;
                for (ix, d) in movable.iter().zip(darea) {
                    if let Some(ix) = *ix {
                        x[2 * ix] += fac * d.x;
                        x[2 * ix + 1] += fac * d.y;
                    }
                }
            }
            if !changed {
                return;
            }
        }
        tracing::warn!(passes = MAX_PROJECT_PASSES, "air mesh projection hit its pass limit");
    }

    /// Inserts `vertex` (appended at the end) into the edge between `start`
    /// and `end` without re-triangulating. Returns false if that edge does
    /// not exist, in which case nothing changes.
    pub fn split_segment(&mut self, start: usize, end: usize, vertex: AirVertex) -> bool {
        let m = self.vertices.len();
        if !self.triangulation.split_edge(start, end, m) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Renumbers DOF indices after the simulation mesh compacted its DOF vector.
    pub fn remap_dofs(&mut self, map: impl Fn(usize) -> usize) {
        for v in &mut self.vertices {
            if let AirVertex::Dof(ix) = v {
                *ix = map(*ix);
            }
        }
    }

    /// Number of finite triangles with negative signed area at `x`.
    pub fn inverted_count(&self, x: &[f64]) -> usize {
        self.triangulation
            .finite_triangles()
            .filter(|tri| {
                let [a, b, c] = tri.map(|v| self.vertices[v].position(x));
                cross(a, b, c) < 0.0
            })
            .count()
    }
}

/// Gradient of the doubled signed area `(b − a) × (c − a)`.
#[inline]
fn area_gradient(a: DVec2, b: DVec2, c: DVec2) -> [DVec2; 3] {
    let ab = b - a;
    let ac = c - a;
    let bc = c - b;
    [
        DVec2::new(-bc.y, bc.x),
        DVec2::new(ac.y, -ac.x),
        DVec2::new(-ab.y, ab.x),
    ]
}
