//! Simple polygons backed by `geo`.
//!
//! [`SimplePolygon`] keeps the vertex list for edge queries and a
//! `geo::Polygon` for area, containment and boolean intersection.

use geo::{Area, BooleanOps, Centroid, Contains};
use glam::DVec2;

use crate::predicates::point_segment_distance;

/// A closed polygon without holes.
#[derive(Debug, Clone)]
pub struct SimplePolygon {
    points: Vec<DVec2>,
    shape: geo::Polygon<f64>,
}

impl SimplePolygon {
    /// Builds a polygon from its boundary. The closing edge is implicit.
    pub fn new(points: Vec<DVec2>) -> Self {
        let ring: Vec<geo::Coord<f64>> = points
            .iter()
            .map(|p| geo::Coord { x: p.x, y: p.y })
            .collect();
        let shape = geo::Polygon::new(geo::LineString::new(ring), Vec::new());
        Self { points, shape }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Boundary edges including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Signed area, positive for counter-clockwise boundaries.
    pub fn signed_area(&self) -> f64 {
        self.shape.signed_area()
    }

    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// True if `p` lies strictly inside the polygon.
    pub fn contains(&self, p: DVec2) -> bool {
        self.shape.contains(&geo::Point::new(p.x, p.y))
    }

    /// Area of the boolean intersection with `other`.
    pub fn intersection_area(&self, other: &SimplePolygon) -> f64 {
        if self.points.len() < 3 || other.points.len() < 3 {
            return 0.0;
        }
        self.shape.intersection(&other.shape).unsigned_area()
    }

    pub fn centroid(&self) -> Option<DVec2> {
        self.shape.centroid().map(|c| DVec2::new(c.x(), c.y()))
    }

    /// Unsigned distance from `p` to the boundary.
    pub fn boundary_distance(&self, p: DVec2) -> f64 {
        self.edges()
            .map(|(a, b)| point_segment_distance(p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Axis-aligned bounds `(min, max)`, or `None` for an empty polygon.
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}
