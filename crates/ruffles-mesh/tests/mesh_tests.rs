//! Integration tests for ruffles-mesh.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ruffles_mesh::generators::generate_horizontal_strip;
use ruffles_mesh::{MeshParams, SimulationMesh, VertexKind};
use ruffles_types::{SegmentId, VertexId};

/// Open zig-zag chain with a fixed first vertex and slightly stretched segments.
fn zigzag(n: usize, params: MeshParams) -> (SimulationMesh, Vec<VertexId>, Vec<SegmentId>) {
    let mut mesh = SimulationMesh::with_params(params);
    let mut vertices = vec![mesh.push_vertex(DVec2::ZERO, true)];
    let mut segments = Vec::new();
    for i in 1..n {
        let p = DVec2::new(i as f64 * 0.8, if i % 2 == 0 { 0.0 } else { 0.5 });
        let v = mesh.push_vertex(p, false);
        segments.push(mesh.push_segment(vertices[i - 1], v, 0.85));
        vertices.push(v);
    }
    mesh.update_vertex_mass();
    (mesh, vertices, segments)
}

fn soft_params() -> MeshParams {
    MeshParams {
        k_global: 1.0,
        k_bend: 2.0,
        density: 0.5,
        lambda_membrane: 10.0,
        lambda_air_mesh: 5.0,
        ..MeshParams::unbounded()
    }
}

fn assert_gradient_matches(mesh: &SimulationMesh) {
    let x = mesh.x.clone();
    let mut grad = vec![0.0; x.len()];
    mesh.energy(&x, Some(grad.as_mut_slice()));
    let h = 1e-6;
    for i in 0..x.len() {
        let mut plus = x.clone();
        let mut minus = x.clone();
        plus[i] += h;
        minus[i] -= h;
        let fd = (mesh.energy(&plus, None) - mesh.energy(&minus, None)) / (2.0 * h);
        assert!(
            (fd - grad[i]).abs() < 1e-4 * grad[i].abs().max(1.0),
            "dof {i}: analytic {} vs numeric {fd}",
            grad[i]
        );
    }
}

// ─── Construction Tests ───────────────────────────────────────

#[test]
fn push_vertex_appends_dofs() {
    let mut mesh = SimulationMesh::new();
    let a = mesh.push_vertex(DVec2::new(1.0, 2.0), true);
    let b = mesh.push_vertex(DVec2::new(3.0, 4.0), false);
    assert_eq!(mesh.dof(), 2);
    assert_eq!(mesh.m, vec![1.0, 1.0]);
    assert_eq!(mesh.get_vertex_position(a), DVec2::new(1.0, 2.0));
    assert_eq!(mesh.get_vertex_position(b), DVec2::new(3.0, 4.0));
    assert_eq!(mesh.vertex(b).map(|v| v.kind), Some(VertexKind::Dof(0)));
}

#[test]
fn insert_segment_keeps_chain_order() {
    let mut mesh = SimulationMesh::new();
    let a = mesh.push_vertex(DVec2::ZERO, true);
    let b = mesh.push_vertex(DVec2::X, false);
    let c = mesh.push_vertex(DVec2::new(2.0, 0.0), false);
    let last = mesh.push_segment(b, c, 1.0);
    let first = mesh.insert_segment(Some(last), a, b, 1.0);
    let order: Vec<SegmentId> = mesh.segments().keys().collect();
    assert_eq!(order, vec![first, last]);
    assert!(mesh.verify().is_ok());
}

#[test]
fn strip_has_expected_segments() {
    let mesh = generate_horizontal_strip(20.0, 0.1);
    assert_eq!(mesh.segment_count(), 200);
    for seg in mesh.segments().values() {
        assert!((seg.length - 0.1).abs() < 1e-12);
    }
    assert!(mesh.consistent_lengths());
    assert!(mesh.verify().is_ok());
    assert_eq!(mesh.dof(), 2 * mesh.movable_vertex_count());
}

// ─── Split Tests ──────────────────────────────────────────────

#[test]
fn split_halves_length_and_averages_width() {
    let (mut mesh, vertices, segments) = zigzag(4, MeshParams::default());
    mesh.vertex_mut(vertices[1]).expect("vertex").width = 2.0;
    mesh.vertex_mut(vertices[2]).expect("vertex").width = 4.0;
    mesh.vertex_mut(vertices[2]).expect("vertex").z = Some([1.0, 3.0]);

    let [first, second] = mesh.split_segment(segments[1]).expect("split");
    let a = *mesh.segment(first).expect("first half");
    let b = *mesh.segment(second).expect("second half");
    assert!((a.length - 0.425).abs() < 1e-12);
    assert!((b.length - 0.425).abs() < 1e-12);
    assert_eq!(a.end, b.start);

    let center = mesh.vertex(a.end).expect("center");
    assert!((center.width - 3.0).abs() < 1e-12);
    assert_eq!(center.z, Some([0.5, 2.0]));
    let expected = 0.5 * (mesh.get_vertex_position(vertices[1]) + mesh.get_vertex_position(vertices[2]));
    assert!((mesh.get_vertex_position(a.end) - expected).length() < 1e-12);

    assert!(mesh.segment(segments[1]).is_none());
    assert_eq!(mesh.segment_count(), 4);
    assert!(mesh.verify().is_ok());
}

#[test]
fn split_updates_air_mesh_in_place() {
    let (mut mesh, _, segments) = zigzag(6, soft_params());
    mesh.generate_air_mesh();
    let triangles = mesh.air_mesh().triangle_count();
    assert!(triangles > 0);

    mesh.split_segment(segments[2]).expect("split");
    assert!(!mesh.air_mesh().is_empty());
    assert_eq!(mesh.air_mesh().vertex_count(), mesh.vertex_count());
    assert_eq!(mesh.air_mesh().inverted_count(&mesh.x), 0);
}

#[test]
fn repeated_splits_keep_air_indices() {
    let (mut mesh, _, segments) = zigzag(6, soft_params());
    mesh.generate_air_mesh();
    let [first, _] = mesh.split_segment(segments[1]).expect("split");
    let [_, second] = mesh.split_segment(first).expect("split");
    mesh.split_segment(second).expect("split");
    mesh.split_segment(segments[4]).expect("split");

    assert_eq!(mesh.air_mesh().vertex_count(), mesh.vertex_count());
    for v in mesh.vertices().keys() {
        let index = mesh.air_vertex_index(v).expect("indexed vertex");
        let air = mesh.air_mesh().vertices()[index].position(&mesh.x);
        assert!((air - mesh.get_vertex_position(v)).length() < 1e-12);
    }
    for seg in mesh.segments().values() {
        let (a, b) = (
            mesh.air_vertex_index(seg.start).expect("start"),
            mesh.air_vertex_index(seg.end).expect("end"),
        );
        assert!(mesh.air_mesh().is_constrained(a, b));
    }

    mesh.clear_air_mesh();
    assert!(mesh.vertices().keys().all(|v| mesh.air_vertex_index(v).is_none()));
}

#[test]
fn split_of_removed_segment_fails() {
    let (mut mesh, _, segments) = zigzag(3, MeshParams::default());
    mesh.remove_segment(segments[0]);
    assert!(mesh.split_segment(segments[0]).is_err());
}

// ─── Cleanup Tests ────────────────────────────────────────────

#[test]
fn cleanup_compacts_dofs() {
    let (mut mesh, vertices, segments) = zigzag(6, MeshParams::default());
    let kept = mesh.get_vertex_position(vertices[2]);
    mesh.remove_segment(segments[4]);
    mesh.remove_segment(segments[3]);
    mesh.add_extra_mass(vertices[5], 1.0);
    mesh.cleanup();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.dof(), 2 * mesh.movable_vertex_count());
    assert_eq!(mesh.m.len(), mesh.x.len());
    assert!(mesh.extra_mass.is_empty());
    assert_eq!(mesh.get_vertex_position(vertices[2]), kept);
    assert!(mesh.verify().is_ok());
}

#[test]
fn cleanup_keeps_dof_order() {
    let (mut mesh, vertices, segments) = zigzag(5, MeshParams::default());
    // Drop the first movable vertex from the chain.
    mesh.remove_segment(segments[0]);
    mesh.remove_segment(segments[1]);
    mesh.push_segment(vertices[0], vertices[2], 1.0);
    mesh.cleanup();

    let dofs: Vec<usize> = [vertices[2], vertices[3], vertices[4]]
        .iter()
        .filter_map(|v| mesh.vertex(*v).and_then(|v| v.dof()))
        .collect();
    assert_eq!(dofs, vec![0, 1, 2]);
}

#[test]
fn cleanup_is_idempotent() {
    let (mut mesh, _, segments) = zigzag(8, MeshParams::default());
    mesh.remove_segment(segments[6]);
    mesh.cleanup();
    let x = mesh.x.clone();
    let kinds: Vec<VertexKind> = mesh.vertices().values().map(|v| v.kind).collect();

    mesh.cleanup();
    assert_eq!(mesh.x, x);
    let again: Vec<VertexKind> = mesh.vertices().values().map(|v| v.kind).collect();
    assert_eq!(again, kinds);
}

#[test]
fn cleanup_remaps_air_mesh_dofs() {
    let (mut mesh, vertices, segments) = zigzag(5, soft_params());
    mesh.generate_air_mesh();
    mesh.cleanup();
    assert!(!mesh.air_mesh().is_empty());

    mesh.remove_segment(segments[3]);
    mesh.cleanup();
    assert!(mesh.air_mesh().is_empty());
    assert!(mesh.vertex(vertices[4]).is_none());
}

// ─── Mass Tests ───────────────────────────────────────────────

#[test]
fn lumped_mass_is_trapezoidal() {
    let mesh = generate_horizontal_strip(2.0, 0.5);
    // width 1, length 2, density 0.08
    assert!((mesh.total_mass() - 0.16).abs() < 1e-12);
    let interior = mesh.vertices().values().nth(2).expect("interior vertex");
    assert!((interior.mass - 0.04).abs() < 1e-12);
    let last = mesh.vertices().values().last().expect("tip");
    assert!((last.mass - 0.02).abs() < 1e-12);
}

#[test]
fn mass_vector_follows_vertex_mass() {
    let mesh = generate_horizontal_strip(2.0, 0.5);
    for v in mesh.vertices().values() {
        if let Some(i) = v.dof() {
            assert_eq!(mesh.m[2 * i], v.mass);
            assert_eq!(mesh.m[2 * i + 1], v.mass);
        }
    }
}

#[test]
fn total_mass_includes_extra_mass() {
    let mut mesh = generate_horizontal_strip(2.0, 0.5);
    let tip = mesh.vertices().last().expect("tip");
    mesh.add_extra_mass(tip, 0.5);
    assert!((mesh.total_mass() - 0.66).abs() < 1e-12);
}

// ─── Energy Tests ─────────────────────────────────────────────

#[test]
fn straight_strip_at_rest_has_only_gravity() {
    let mut params = MeshParams::unbounded();
    params.gravity = DVec2::ZERO;
    let mut mesh = generate_horizontal_strip(3.0, 0.5);
    mesh.params = params;
    let mut grad = vec![1.0; mesh.dof()];
    let e = mesh.energy(&mesh.x, Some(grad.as_mut_slice()));
    assert!(e.abs() < 1e-6);
    assert!(grad.iter().all(|g| g.abs() < 1e-3));
}

#[test]
fn membrane_penalizes_stretch() {
    let (mesh, _, _) = zigzag(3, soft_params());
    let mut stretched = mesh.x.clone();
    let last = stretched.len() - 2;
    stretched[last] += 0.5;
    assert!(mesh.energy(&stretched, None) > mesh.energy(&mesh.x, None));
}

#[test]
fn gradient_matches_finite_differences() {
    let (mesh, _, _) = zigzag(6, soft_params());
    assert_gradient_matches(&mesh);
}

#[test]
fn gradient_with_bends_masses_and_forces() {
    let (mut mesh, vertices, segments) = zigzag(7, soft_params());
    mesh.connection_bends.push([segments[1], segments[0]]);
    mesh.connection_bends.push([segments[4], segments[3]]);
    mesh.add_extra_mass(vertices[3], 0.7);
    mesh.add_external_force(vertices[5], DVec2::new(0.3, -1.2));
    mesh.add_external_force(vertices[0], DVec2::new(5.0, 5.0));
    assert_gradient_matches(&mesh);
}

#[test]
fn gradient_with_inverted_air_mesh() {
    let (mut mesh, _, _) = zigzag(6, soft_params());
    mesh.generate_air_mesh();
    // Fold the tip back through the strip.
    let n = mesh.x.len();
    mesh.x[n - 1] = -0.6;
    mesh.x[n - 2] -= 1.2;
    assert!(mesh.air_mesh().inverted_count(&mesh.x) > 0);
    assert_gradient_matches(&mesh);
}

#[test]
fn gravity_pulls_down() {
    let (mut mesh, _, _) = zigzag(4, MeshParams::unbounded());
    mesh.params.k_bend = 0.0;
    mesh.params.lambda_membrane = 0.0;
    let mut grad = vec![0.0; mesh.dof()];
    mesh.energy(&mesh.x, Some(grad.as_mut_slice()));
    for i in 0..mesh.dof() / 2 {
        assert!(grad[2 * i].abs() < 1e-9);
        assert!(grad[2 * i + 1] > 0.0);
    }
}

// ─── Verify Tests ─────────────────────────────────────────────

#[test]
fn verify_rejects_zero_length_segment() {
    let (mut mesh, _, segments) = zigzag(3, MeshParams::default());
    mesh.segment_mut(segments[0]).expect("segment").length = 0.0;
    assert!(mesh.verify().is_err());
}

#[test]
fn verify_rejects_broken_chain() {
    let (mut mesh, _, segments) = zigzag(5, MeshParams::default());
    mesh.remove_segment(segments[1]);
    assert!(mesh.verify().is_err());
}

#[test]
fn verify_rejects_dangling_bend() {
    let (mut mesh, _, segments) = zigzag(5, MeshParams::default());
    mesh.connection_bends.push([segments[0], segments[3]]);
    assert!(mesh.verify().is_ok());
    mesh.remove_segment(segments[3]);
    assert!(mesh.verify().is_err());
}

#[test]
fn verify_rejects_negative_params() {
    let (mut mesh, _, _) = zigzag(3, MeshParams::default());
    mesh.params.density = -1.0;
    assert!(mesh.verify().is_err());
}

// ─── Utility Tests ────────────────────────────────────────────

#[test]
fn consistent_lengths_detects_stretch() {
    let mut mesh = generate_horizontal_strip(1.0, 0.25);
    assert!(mesh.consistent_lengths());
    let n = mesh.x.len();
    mesh.x[n - 2] += 0.1;
    assert!(!mesh.consistent_lengths());
}

#[test]
fn perturb_stays_within_epsilon() {
    let mut mesh = generate_horizontal_strip(2.0, 0.1);
    let before = mesh.x.clone();
    let mut rng = StdRng::seed_from_u64(7);
    mesh.perturb(1e-3, &mut rng);
    assert!(before.iter().zip(&mesh.x).all(|(a, b)| (a - b).abs() <= 1e-3));
    assert!(before != mesh.x);
}

#[test]
fn interpolates_missing_z() {
    let mut mesh = SimulationMesh::new();
    let a = mesh.push_vertex(DVec2::ZERO, true);
    let b = mesh.push_vertex(DVec2::X, false);
    let c = mesh.push_vertex(DVec2::new(2.0, 0.0), false);
    mesh.push_segment(a, b, 1.0);
    mesh.push_segment(b, c, 1.0);
    mesh.vertex_mut(a).expect("vertex").z = Some([0.0, 1.0]);
    mesh.vertex_mut(b).expect("vertex").z = None;
    mesh.vertex_mut(c).expect("vertex").z = Some([0.0, 3.0]);

    mesh.interpolate_missing_z();
    let z = mesh.vertex(b).and_then(|v| v.z).expect("interpolated");
    assert!(z[0].abs() < 1e-12);
    assert!((z[1] - 2.0).abs() < 1e-12);
}

// ─── Serialization Tests ──────────────────────────────────────

#[test]
fn params_toml_roundtrip() {
    let params = MeshParams::default();
    let text = toml::to_string(&params).expect("serialize");
    let back: MeshParams = toml::from_str(&text).expect("deserialize");
    assert_eq!(back, params);
}

#[test]
fn params_partial_toml_uses_defaults() {
    let params: MeshParams = toml::from_str("k_bend = 1.0").expect("deserialize");
    assert_eq!(params.k_bend, 1.0);
    assert_eq!(params.k_global, MeshParams::default().k_global);
}

#[test]
fn mesh_json_roundtrip_drops_air_mesh() {
    let (mut mesh, _, _) = zigzag(5, soft_params());
    mesh.generate_air_mesh();
    let json = serde_json::to_string(&mesh).expect("serialize");
    let back: SimulationMesh = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.x, mesh.x);
    assert_eq!(back.segment_count(), mesh.segment_count());
    assert!(back.air_mesh().is_empty());
    assert!(back.verify().is_ok());
}
