//! Vertices and segments of the simulation mesh.

use glam::DVec2;
use ruffles_airmesh::AirVertex;
use ruffles_types::VertexId;
use serde::{Deserialize, Serialize};

/// Where a vertex takes its position from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VertexKind {
    /// Pinned at a position.
    Fixed(DVec2),
    /// Movable, stored at `x[2i]`, `x[2i + 1]` of the DOF vector.
    Dof(usize),
}

/// A strip vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub kind: VertexKind,
    /// Out-of-plane width of the strip at this vertex.
    pub width: f64,
    /// Lumped mass, see `SimulationMesh::update_vertex_mass`.
    pub mass: f64,
    /// Out-of-plane extent `[z_min, z_max]`, used for export only.
    pub z: Option<[f64; 2]>,
}

impl Vertex {
    pub fn new(kind: VertexKind) -> Self {
        Self {
            kind,
            width: 1.0,
            mass: 0.0,
            z: Some([0.0, 1.0]),
        }
    }

    /// DOF index if the vertex is movable.
    #[inline]
    pub fn dof(&self) -> Option<usize> {
        match self.kind {
            VertexKind::Fixed(_) => None,
            VertexKind::Dof(i) => Some(i),
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self.kind, VertexKind::Fixed(_))
    }

    /// Position of the vertex in the configuration `x`.
    #[inline]
    pub fn position(&self, x: &[f64]) -> DVec2 {
        match self.kind {
            VertexKind::Fixed(p) => p,
            VertexKind::Dof(i) => DVec2::new(x[2 * i], x[2 * i + 1]),
        }
    }
}

impl From<&Vertex> for AirVertex {
    fn from(v: &Vertex) -> Self {
        match v.kind {
            VertexKind::Fixed(p) => AirVertex::Fixed(p),
            VertexKind::Dof(i) => AirVertex::Dof(i),
        }
    }
}

/// A strip segment from `start` to `end` with a rest length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: VertexId,
    pub end: VertexId,
    pub length: f64,
}

impl Segment {
    pub fn new(start: VertexId, end: VertexId, length: f64) -> Self {
        Self { start, end, length }
    }

    /// True if `v` is one of the endpoints.
    #[inline]
    pub fn touches(&self, v: VertexId) -> bool {
        self.start == v || self.end == v
    }

    /// The shared vertex and the two outer vertices of a bend between two
    /// segments meeting at exactly one vertex: `[outer of self, shared, outer of other]`.
    pub fn bend_with(&self, other: &Segment) -> Option<[VertexId; 3]> {
        let shared = if other.touches(self.end) {
            self.end
        } else if other.touches(self.start) {
            self.start
        } else {
            return None;
        };
        let a = if self.start == shared { self.end } else { self.start };
        let c = if other.start == shared { other.end } else { other.start };
        if a == shared || c == shared || a == c {
            return None;
        }
        Some([a, shared, c])
    }
}
