//! Integration tests for ruffles-geometry.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ruffles_geometry::polygon::SimplePolygon;
use ruffles_geometry::predicates::{
    cross, in_circle, is_convex_quad, orient2d, point_segment_distance, ray_segment_distance,
    segments_cross,
};
use ruffles_geometry::{turn_angle, turn_angle_with_gradient, ArcLengthTable, CubicBezier, DVec2, Orientation};

fn square(side: f64) -> SimplePolygon {
    SimplePolygon::new(vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(side, 0.0),
        DVec2::new(side, side),
        DVec2::new(0.0, side),
    ])
}

// ─── Angle Tests ──────────────────────────────────────────────

#[test]
fn collinear_points_are_straight() {
    let theta = turn_angle(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(3.0, 0.0));
    assert!((theta - PI).abs() < 1e-4);
}

#[test]
fn right_angle() {
    let theta = turn_angle(DVec2::new(1.0, 0.0), DVec2::ZERO, DVec2::new(0.0, 2.0));
    assert!((theta - 0.5 * PI).abs() < 1e-9);
}

#[test]
fn full_fold_is_zero() {
    let theta = turn_angle(DVec2::new(1.0, 0.0), DVec2::ZERO, DVec2::new(2.0, 0.0));
    assert!(theta.abs() < 1e-6);
}

#[test]
fn angle_stays_in_range_for_random_triangles() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let p: Vec<DVec2> = (0..3)
            .map(|_| DVec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)))
            .collect();
        let theta = turn_angle(p[0], p[1], p[2]);
        assert!((0.0..=PI).contains(&theta));
    }
}

#[test]
fn collinear_gradient_is_finite() {
    let (theta, grad) =
        turn_angle_with_gradient(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0));
    assert!((theta - PI).abs() < 1e-4);
    assert!(grad.iter().all(|g| g.is_finite()));
}

#[test]
fn angle_gradient_is_translation_invariant() {
    let (_, grad) =
        turn_angle_with_gradient(DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.3), DVec2::new(1.2, 1.4));
    let sum = grad[0] + grad[1] + grad[2];
    assert!(sum.length() < 1e-9);
}

#[test]
fn degenerate_edge_reports_straight() {
    let (theta, grad) = turn_angle_with_gradient(DVec2::ONE, DVec2::ONE, DVec2::new(2.0, 0.0));
    assert_eq!(theta, PI);
    assert!(grad.iter().all(|g| *g == DVec2::ZERO));
}

// ─── Predicate Tests ──────────────────────────────────────────

#[test]
fn orientation_signs() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(1.0, 0.0);
    assert_eq!(orient2d(a, b, DVec2::new(0.0, 1.0)), Orientation::CounterClockwise);
    assert_eq!(orient2d(a, b, DVec2::new(0.0, -1.0)), Orientation::Clockwise);
    assert_eq!(orient2d(a, b, DVec2::new(5.0, 0.0)), Orientation::Collinear);
    assert!((cross(a, b, DVec2::new(0.0, 1.0)) - 1.0).abs() < 1e-12);
}

#[test]
fn in_circle_sign() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(1.0, 0.0);
    let c = DVec2::new(0.0, 1.0);
    assert!(in_circle(a, b, c, DVec2::new(0.5, 0.5)) > 0.0);
    assert!(in_circle(a, b, c, DVec2::new(3.0, 3.0)) < 0.0);
}

#[test]
fn crossing_segments() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(2.0, 2.0);
    assert!(segments_cross(a, b, DVec2::new(0.0, 2.0), DVec2::new(2.0, 0.0)));
    assert!(!segments_cross(a, b, DVec2::new(3.0, 0.0), DVec2::new(4.0, 1.0)));
    // touching at an endpoint is not a proper crossing
    assert!(!segments_cross(a, b, b, DVec2::new(3.0, 0.0)));
}

#[test]
fn convex_quad_detection() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(1.0, 0.0);
    let c = DVec2::new(1.0, 1.0);
    assert!(is_convex_quad(a, b, c, DVec2::new(0.0, 1.0)));
    assert!(!is_convex_quad(a, b, c, DVec2::new(0.8, 0.5)));
}

#[test]
fn ray_hits_segment() {
    let d = ray_segment_distance(
        DVec2::ZERO,
        DVec2::new(2.0, 0.0),
        DVec2::new(3.0, -1.0),
        DVec2::new(3.0, 1.0),
    );
    assert!((d.unwrap() - 3.0).abs() < 1e-12);
}

#[test]
fn ray_behind_origin_misses() {
    let d = ray_segment_distance(
        DVec2::ZERO,
        DVec2::X,
        DVec2::new(-3.0, -1.0),
        DVec2::new(-3.0, 1.0),
    );
    assert!(d.is_none());
}

#[test]
fn ray_along_collinear_segment() {
    let d = ray_segment_distance(DVec2::ZERO, DVec2::X, DVec2::new(4.0, 0.0), DVec2::new(2.0, 0.0));
    assert!((d.unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn point_to_segment_distance() {
    let d = point_segment_distance(DVec2::new(1.0, 2.0), DVec2::ZERO, DVec2::new(2.0, 0.0));
    assert!((d - 2.0).abs() < 1e-12);
    let d = point_segment_distance(DVec2::new(-1.0, 0.0), DVec2::ZERO, DVec2::new(2.0, 0.0));
    assert!((d - 1.0).abs() < 1e-12);
}

// ─── Polygon Tests ────────────────────────────────────────────

#[test]
fn square_area_and_orientation() {
    let sq = square(2.0);
    assert!((sq.area() - 4.0).abs() < 1e-12);
    assert!(sq.signed_area() > 0.0);
    assert_eq!(sq.edges().count(), 4);
}

#[test]
fn containment() {
    let sq = square(2.0);
    assert!(sq.contains(DVec2::new(1.0, 1.0)));
    assert!(!sq.contains(DVec2::new(3.0, 1.0)));
}

#[test]
fn intersection_of_overlapping_squares() {
    let a = square(2.0);
    let b = SimplePolygon::new(
        square(2.0)
            .points()
            .iter()
            .map(|p| *p + DVec2::new(1.0, 1.0))
            .collect(),
    );
    assert!((a.intersection_area(&b) - 1.0).abs() < 1e-9);
}

#[test]
fn centroid_and_bounds() {
    let sq = square(2.0);
    let c = sq.centroid().unwrap();
    assert!((c - DVec2::ONE).length() < 1e-12);
    let (lo, hi) = sq.bounds().unwrap();
    assert_eq!(lo, DVec2::ZERO);
    assert_eq!(hi, DVec2::new(2.0, 2.0));
    assert!((sq.boundary_distance(DVec2::new(1.0, 0.5)) - 0.5).abs() < 1e-12);
}

// ─── Bézier Tests ─────────────────────────────────────────────

#[test]
fn bezier_endpoints() {
    let curve = CubicBezier::new(DVec2::ZERO, DVec2::new(4.0, 0.0), DVec2::Y, DVec2::Y);
    assert_eq!(curve.eval(0.0), DVec2::ZERO);
    assert_eq!(curve.eval(1.0), DVec2::new(4.0, 0.0));
}

#[test]
fn straight_bezier_arclength() {
    let curve = CubicBezier::new(DVec2::ZERO, DVec2::new(3.0, 0.0), DVec2::ZERO, DVec2::ZERO);
    let table = ArcLengthTable::new(curve, 100);
    assert!((table.length() - 3.0).abs() < 1e-9);
    assert_eq!(table.point_at(table.length()), DVec2::new(3.0, 0.0));
    assert_eq!(table.point_at(-1.0), DVec2::ZERO);
}

#[test]
fn arclength_lookup_is_near_uniform() {
    let curve = CubicBezier::new(
        DVec2::ZERO,
        DVec2::new(2.0, 0.0),
        DVec2::new(0.0, 1.5),
        DVec2::new(0.0, 1.5),
    );
    let table = ArcLengthTable::new(curve, 100);
    let n = 10;
    let step = table.length() / n as f64;
    let pts: Vec<DVec2> = (0..=n).map(|i| table.point_at(i as f64 * step)).collect();
    for w in pts.windows(2) {
        let chord = (w[1] - w[0]).length();
        assert!((chord - step).abs() < 0.05 * step);
    }
}
