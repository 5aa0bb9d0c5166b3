//! Integration tests for ruffles-target.

use glam::{DVec2, DVec3};
use ruffles_geometry::polygon::SimplePolygon;
use ruffles_target::{ProjectionFrame, TargetShape};
use ruffles_topology::Ruffle;
use ruffles_types::RuffleError;

fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> TargetShape {
    TargetShape::from_polygon(vec![
        DVec2::new(x0, y0),
        DVec2::new(x1, y0),
        DVec2::new(x1, y1),
        DVec2::new(x0, y1),
    ])
    .expect("rectangle")
}

// ─── Construction Tests ───────────────────────────────────────

#[test]
fn polygon_needs_three_points() {
    let result = TargetShape::from_polygon(vec![DVec2::ZERO, DVec2::X]);
    assert!(matches!(result, Err(RuffleError::InvalidInput(_))));
    let result = TargetShape::from_polygon(vec![DVec2::ZERO, DVec2::X, DVec2::new(f64::NAN, 1.0)]);
    assert!(result.is_err());
}

#[test]
fn interior_triangulation_covers_area() {
    let target = rectangle(0.0, 0.0, 4.0, 2.0);
    assert_eq!(target.triangles().len(), 2);
    let v = target.vertices();
    let covered: f64 = target
        .triangles()
        .iter()
        .map(|t| 0.5 * (v[t[1]] - v[t[0]]).perp_dot(v[t[2]] - v[t[0]]).abs())
        .sum();
    assert!((covered - 8.0).abs() < 1e-9);
}

#[test]
fn concave_triangulation_skips_notch() {
    // L shape, area 3
    let target = TargetShape::from_polygon(vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(2.0, 0.0),
        DVec2::new(2.0, 1.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(1.0, 2.0),
        DVec2::new(0.0, 2.0),
    ])
    .expect("L shape");
    let v = target.vertices();
    let covered: f64 = target
        .triangles()
        .iter()
        .map(|t| 0.5 * (v[t[1]] - v[t[0]]).perp_dot(v[t[2]] - v[t[0]]).abs())
        .sum();
    assert!((covered - 3.0).abs() < 1e-9);
    assert!((target.area() - 3.0).abs() < 1e-12);
}

#[test]
fn cut_is_projected_onto_frame() {
    let frame = ProjectionFrame {
        origin: DVec3::new(1.0, 0.0, 0.0),
        u: DVec3::X,
        v: DVec3::Z,
    };
    let cut = [
        DVec3::new(1.0, 7.0, 0.0),
        DVec3::new(5.0, 7.0, 0.0),
        DVec3::new(5.0, 7.0, 2.0),
        DVec3::new(1.0, 7.0, 2.0),
    ];
    let target = TargetShape::from_cut(&cut, frame).expect("cut");
    assert!((target.vertices()[0] - DVec2::ZERO).length() < 1e-12);
    assert!((target.vertices()[2] - DVec2::new(4.0, 2.0)).length() < 1e-12);
    assert!((target.area() - 8.0).abs() < 1e-12);
    assert_eq!(target.frame(), &frame);
}

#[test]
fn frame_serde_roundtrip() {
    let frame = ProjectionFrame::default();
    let json = serde_json::to_string(&frame).expect("serialize");
    let back: ProjectionFrame = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, frame);
}

// ─── Query Tests ──────────────────────────────────────────────

#[test]
fn signed_distance_positive_outside() {
    let target = rectangle(0.0, 0.0, 4.0, 2.0);
    assert!((target.signed_distance(DVec2::new(2.0, 1.0)) + 1.0).abs() < 1e-12);
    assert!((target.signed_distance(DVec2::new(6.0, 1.0)) - 2.0).abs() < 1e-12);
    assert!((target.signed_distance(DVec2::new(3.5, 1.0)) + 0.5).abs() < 1e-12);
}

#[test]
fn raycast_hits_nearest_edge() {
    let target = rectangle(0.0, 0.0, 4.0, 2.0);
    let origin = DVec2::new(1.0, 1.0);
    assert!((target.raycast(origin, DVec2::X) - 3.0).abs() < 1e-12);
    assert!((target.raycast(origin, -DVec2::X) - 1.0).abs() < 1e-12);
    assert!((target.raycast(origin, 2.0 * DVec2::Y) - 1.0).abs() < 1e-12);
    assert!(target.raycast(DVec2::new(6.0, 1.0), DVec2::X).is_infinite());
}

#[test]
fn horizontal_extent() {
    let target = TargetShape::from_polygon(vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(4.0, 0.0),
        DVec2::new(2.0, 4.0),
    ])
    .expect("triangle");
    let [lo, hi] = target.intersect_horizontal(2.0).expect("hit");
    assert!((lo - 1.0).abs() < 1e-12);
    assert!((hi - 3.0).abs() < 1e-12);
    let [lo, hi] = target.intersect_horizontal(0.0).expect("base");
    assert!(lo.abs() < 1e-12 && (hi - 4.0).abs() < 1e-12);
    assert!(target.intersect_horizontal(5.0).is_none());
}

#[test]
fn height_ignores_area_below_floor() {
    let target = rectangle(0.0, -1.0, 4.0, 2.0);
    assert!((target.height() - 2.0).abs() < 1e-12);
    assert!((target.avg_width() - 6.0).abs() < 1e-12);
}

// ─── Ruffle Fit Tests ─────────────────────────────────────────

#[test]
fn energy_of_enclosed_ruffle_counts_uncovered_area() {
    let ruffle = Ruffle::create_ruffle_stack(1, 5.0, 3.0, 0.5).expect("stack");
    let target = rectangle(-100.0, -100.0, 100.0, 100.0);
    let outline_area = SimplePolygon::new(ruffle.outline_polygon()).area();
    assert!(outline_area > 15.0);
    let expected = target.k * (target.area() - outline_area);
    assert!((target.energy(&ruffle) - expected).abs() < 1e-6 * target.area());
}

#[test]
fn energy_penalizes_overhang() {
    let ruffle = Ruffle::create_ruffle_stack(1, 5.0, 3.0, 0.5).expect("stack");
    let loose = rectangle(-100.0, -100.0, 100.0, 100.0);
    let tight = rectangle(0.0, 0.0, 3.0, 5.0);
    // the two semicircles, about 19.6 in area, stick out of the tight box
    assert!(tight.energy(&ruffle) > 10.0 * tight.lambda);
    assert!(loose.energy(&ruffle) >= 0.0);
}

#[test]
fn stack_along_curve_inside_target() {
    let target = rectangle(0.0, -2.0, 10.0, 2.0);
    let guide = [DVec2::new(0.5, 0.0), DVec2::new(9.5, 0.0)];
    let ruffle = Ruffle::create_stack_along_curve(&guide, &target, 0.5).expect("stack");
    assert_eq!(ruffle.connection_points().len(), 10);
    ruffle.verify().expect("verify");
    assert!(target.energy(&ruffle).is_finite());
}
