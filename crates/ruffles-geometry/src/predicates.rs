//! Geometric predicates and primitive intersections.
//!
//! Orientation is evaluated with the adaptive-precision kernel of `geo`,
//! so the sign is exact for every finite input. The in-circle test is a
//! plain determinant; it only steers Delaunay legalization, never validity.

use geo::kernels::{Kernel, RobustKernel};
use glam::DVec2;

/// Orientation of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

#[inline]
fn coord(p: DVec2) -> geo::Coord<f64> {
    geo::Coord { x: p.x, y: p.y }
}

/// Exact orientation of `(a, b, c)`.
pub fn orient2d(a: DVec2, b: DVec2, c: DVec2) -> Orientation {
    match <RobustKernel as Kernel<f64>>::orient2d(coord(a), coord(b), coord(c)) {
        geo::kernels::Orientation::CounterClockwise => Orientation::CounterClockwise,
        geo::kernels::Orientation::Clockwise => Orientation::Clockwise,
        geo::kernels::Orientation::Collinear => Orientation::Collinear,
    }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
#[inline]
pub fn cross(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Positive when `d` lies inside the circumcircle of the counter-clockwise
/// triangle `(a, b, c)`, negative outside, zero on the circle.
pub fn in_circle(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> f64 {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;
    let ad2 = ad.length_squared();
    let bd2 = bd.length_squared();
    let cd2 = cd.length_squared();
    ad.x * (bd.y * cd2 - bd2 * cd.y) - ad.y * (bd.x * cd2 - bd2 * cd.x)
        + ad2 * (bd.x * cd.y - bd.y * cd.x)
}

/// True when the open segments `ab` and `cd` cross at a single interior point.
pub fn segments_cross(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    let o1 = orient2d(a, b, c);
    let o2 = orient2d(a, b, d);
    let o3 = orient2d(c, d, a);
    let o4 = orient2d(c, d, b);
    o1 != Orientation::Collinear
        && o2 != Orientation::Collinear
        && o3 != Orientation::Collinear
        && o4 != Orientation::Collinear
        && o1 != o2
        && o3 != o4
}

/// True when the quadrilateral `a, b, c, d` (in this cyclic order) is strictly convex.
pub fn is_convex_quad(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    let pts = [a, b, c, d];
    let first = orient2d(pts[0], pts[1], pts[2]);
    if first == Orientation::Collinear {
        return false;
    }
    (1..4).all(|i| orient2d(pts[i], pts[(i + 1) % 4], pts[(i + 2) % 4]) == first)
}

/// Distance from `origin` along `direction` to the first point of segment
/// `ab`, or `None` if the ray misses. `direction` need not be normalized;
/// the returned value is a Euclidean distance.
pub fn ray_segment_distance(origin: DVec2, direction: DVec2, a: DVec2, b: DVec2) -> Option<f64> {
    let len = direction.length();
    if len == 0.0 {
        return None;
    }
    let dir = direction / len;
    let e = b - a;
    let denom = dir.perp_dot(e);
    let w = a - origin;

    if denom.abs() <= f64::EPSILON * e.length().max(1.0) {
        // parallel: only a collinear overlap counts
        if w.perp_dot(dir).abs() > 1e-12 * w.length().max(1.0) {
            return None;
        }
        let ta = w.dot(dir);
        let tb = (b - origin).dot(dir);
        let (lo, hi) = if ta <= tb { (ta, tb) } else { (tb, ta) };
        if hi < 0.0 {
            return None;
        }
        return Some(lo.max(0.0));
    }

    let t = w.perp_dot(e) / denom;
    let s = w.perp_dot(dir) / denom;
    if t >= 0.0 && (0.0..=1.0).contains(&s) {
        Some(t)
    } else {
        None
    }
}

/// Distance from `p` to the closed segment `ab`.
pub fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let e = b - a;
    let len_sq = e.length_squared();
    if len_sq == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(e) / len_sq).clamp(0.0, 1.0);
    (p - (a + t * e)).length()
}

/// Intersection point of the lines through `ab` and `cd`, if not parallel.
pub fn line_intersection(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> Option<DVec2> {
    let r = b - a;
    let s = d - c;
    let denom = r.perp_dot(s);
    if denom == 0.0 {
        return None;
    }
    let t = (c - a).perp_dot(s) / denom;
    Some(a + t * r)
}
