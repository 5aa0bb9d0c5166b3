//! Procedural strips for benchmarks and testing.

use glam::DVec2;
use ruffles_types::constants::EPSILON;

use crate::mesh::SimulationMesh;
use crate::params::MeshParams;

/// Generates a straight horizontal strip of `ceil(length / h)` segments of
/// rest length `h`, clamped at its left end.
///
/// The first segment runs from a fixed anchor at `(-h, 0)` to a fixed vertex
/// at the origin, so the strip behaves as a cantilever. Both axes are
/// unbounded.
///
/// # Example
/// ```
/// use ruffles_mesh::generators::generate_horizontal_strip;
/// let mesh = generate_horizontal_strip(2.0, 0.5);
/// assert_eq!(mesh.segment_count(), 4);
/// assert_eq!(mesh.dof(), 6);
/// ```
pub fn generate_horizontal_strip(length: f64, h: f64) -> SimulationMesh {
    let n = (length / h - EPSILON).ceil().max(1.0) as usize;
    let mut mesh = SimulationMesh::with_params(MeshParams::unbounded());

    let mut prev = mesh.push_vertex(DVec2::new(-h, 0.0), true);
    for i in 0..n {
        let v = mesh.push_vertex(DVec2::new(i as f64 * h, 0.0), i == 0);
        mesh.push_segment(prev, v, h);
        prev = v;
    }
    mesh.update_vertex_mass();
    mesh
}
