//! Target outline and its queries.

use glam::{DVec2, DVec3};
use ruffles_airmesh::Triangulation;
use ruffles_geometry::polygon::SimplePolygon;
use ruffles_geometry::predicates::ray_segment_distance;
use ruffles_topology::{Raycast, Ruffle};
use ruffles_types::{RuffleError, RuffleResult};
use serde::{Deserialize, Serialize};

/// Plane a 3D cut is projected onto: `origin` plus two orthonormal
/// in-plane directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionFrame {
    pub origin: DVec3,
    pub u: DVec3,
    pub v: DVec3,
}

impl Default for ProjectionFrame {
    fn default() -> Self {
        Self {
            origin: DVec3::ZERO,
            u: DVec3::X,
            v: DVec3::Y,
        }
    }
}

impl ProjectionFrame {
    /// In-plane coordinates of `p`.
    pub fn project(&self, p: DVec3) -> DVec2 {
        let rel = p - self.origin;
        DVec2::new(rel.dot(self.u), rel.dot(self.v))
    }
}

/// A closed target polygon with its interior triangulation.
#[derive(Debug, Clone)]
pub struct TargetShape {
    polygon: SimplePolygon,
    triangles: Vec<[usize; 3]>,
    frame: ProjectionFrame,
    /// Weight of target area not covered by the ruffle.
    pub k: f64,
    /// Weight of ruffle area outside the target.
    pub lambda: f64,
}

impl TargetShape {
    /// Target from a closed boundary (closing edge implicit).
    pub fn from_polygon(points: Vec<DVec2>) -> RuffleResult<Self> {
        Self::build(points, ProjectionFrame::default())
    }

    /// Target from a 3D cut polyline projected onto `frame`.
    pub fn from_cut(cut: &[DVec3], frame: ProjectionFrame) -> RuffleResult<Self> {
        let points = cut.iter().map(|&p| frame.project(p)).collect();
        Self::build(points, frame)
    }

    fn build(points: Vec<DVec2>, frame: ProjectionFrame) -> RuffleResult<Self> {
        if points.len() < 3 {
            return Err(RuffleError::InvalidInput(format!(
                "target polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(RuffleError::InvalidInput("target polygon has non-finite points".into()));
        }
        let polygon = SimplePolygon::new(points);
        let triangles = triangulate_interior(&polygon);
        tracing::debug!(
            vertices = polygon.len(),
            triangles = triangles.len(),
            area = polygon.area(),
            "target shape built"
        );
        Ok(Self {
            polygon,
            triangles,
            frame,
            k: 1.0,
            lambda: 1e3,
        })
    }

    pub fn vertices(&self) -> &[DVec2] {
        self.polygon.points()
    }

    /// Interior triangles as indices into [`TargetShape::vertices`].
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn frame(&self) -> &ProjectionFrame {
        &self.frame
    }

    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    /// Vertical extent above the floor `y = 0`.
    pub fn height(&self) -> f64 {
        let (lo, hi) = self
            .vertices()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        hi - lo.max(0.0)
    }

    pub fn avg_width(&self) -> f64 {
        self.area() / self.height()
    }

    /// Distance to the boundary, positive outside and negative inside.
    pub fn signed_distance(&self, p: DVec2) -> f64 {
        let distance = self.polygon.boundary_distance(p);
        if self.polygon.contains(p) {
            -distance
        } else {
            distance
        }
    }

    /// Distance along `direction` to the nearest boundary edge,
    /// `f64::INFINITY` if the ray misses.
    pub fn raycast(&self, origin: DVec2, direction: DVec2) -> f64 {
        self.polygon
            .edges()
            .filter_map(|(a, b)| ray_segment_distance(origin, direction, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Smallest and largest x where the line `y = height` meets the
    /// boundary, `None` if it misses the target.
    pub fn intersect_horizontal(&self, height: f64) -> Option<[f64; 2]> {
        let mut extent: Option<[f64; 2]> = None;
        let mut include = |x: f64| {
            extent = Some(match extent {
                Some([lo, hi]) => [lo.min(x), hi.max(x)],
                None => [x, x],
            });
        };
        for (a, b) in self.polygon.edges() {
            let (da, db) = (a.y - height, b.y - height);
            if da * db > 0.0 {
                continue;
            }
            if da == db {
                include(a.x);
                include(b.x);
            } else {
                include(a.x + da / (da - db) * (b.x - a.x));
            }
        }
        extent
    }

    /// Fit energy of a ruffle outline:
    /// `k (target - overlap) + lambda (outline - overlap)` over areas.
    pub fn energy(&self, ruffle: &Ruffle) -> f64 {
        let outline = SimplePolygon::new(ruffle.outline_polygon());
        let overlap = self.polygon.intersection_area(&outline);
        self.k * (self.area() - overlap) + self.lambda * (outline.area() - overlap)
    }
}

impl Raycast for TargetShape {
    fn raycast(&self, origin: DVec2, direction: DVec2) -> f64 {
        TargetShape::raycast(self, origin, direction)
    }
}

/// Constrained triangulation of the polygon, keeping the triangles whose
/// centroid lies inside.
fn triangulate_interior(polygon: &SimplePolygon) -> Vec<[usize; 3]> {
    let points = polygon.points();
    let n = points.len();
    let constraints: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    Triangulation::build(points, &constraints)
        .finite_triangles()
        .filter(|t| {
            let centroid = (points[t[0]] + points[t[1]] + points[t[2]]) / 3.0;
            polygon.contains(centroid)
        })
        .collect()
}
