//! Energy and gradient of a simulation mesh configuration.
//!
//! ```text
//! E(x) = Σ_bends   k·k_bend·w/l̄·(θ − π)²
//!      + Σ_segs    k·λ_membrane·(‖p_e − p_s‖ − L)²
//!      − Σ_verts   k·m·g·p  − Σ_extra k·m·g·p  − Σ_forces k·f·p
//!      + air-mesh penalty with weight k·λ_air
//! ```
//! where `k = k_global`, `w` the width at the bend vertex and `l̄` the mean
//! rest length of the two bent segments.

use std::f64::consts::PI;

use glam::DVec2;
use ruffles_geometry::turn_angle_with_gradient;
use ruffles_types::VertexId;

use crate::element::Segment;
use crate::mesh::SimulationMesh;

impl SimulationMesh {
    /// Position of `vertex` in an arbitrary configuration `x`.
    #[inline]
    pub fn position_in(&self, x: &[f64], vertex: VertexId) -> DVec2 {
        self.vertices()[vertex].position(x)
    }

    /// Total energy at `x`. When `grad` is given it is overwritten with the
    /// gradient (`grad.len() == x.len()`).
    pub fn energy(&self, x: &[f64], mut grad: Option<&mut [f64]>) -> f64 {
        if let Some(g) = grad.as_deref_mut() {
            g.fill(0.0);
        }
        let k = self.params.k_global;
        let mut energy = 0.0;

        // Bending along the chain
        let mut prev: Option<&Segment> = None;
        for seg in self.segments().values() {
            if let Some(p) = prev.filter(|p| p.end == seg.start) {
                let avg_length = 0.5 * (p.length + seg.length);
                energy += self.bend_energy(x, [p.start, p.end, seg.end], avg_length, grad.as_deref_mut());
            }
            prev = Some(seg);
        }

        // Bending across connection points
        for [s0, s1] in &self.connection_bends {
            let (Some(a), Some(b)) = (self.segment(*s0), self.segment(*s1)) else {
                continue;
            };
            if let Some(bend) = a.bend_with(b) {
                let avg_length = 0.5 * (a.length + b.length);
                energy += self.bend_energy(x, bend, avg_length, grad.as_deref_mut());
            }
        }

        // Membrane
        let k_membrane = k * self.params.lambda_membrane;
        for seg in self.segments().values() {
            let d = self.position_in(x, seg.end) - self.position_in(x, seg.start);
            let len = d.length();
            let stretch = len - seg.length;
            energy += k_membrane * stretch * stretch;
            if let Some(g) = grad.as_deref_mut() {
                if len > 0.0 {
                    let dir = 2.0 * k_membrane * stretch * d / len;
                    self.scatter(g, seg.start, -dir);
                    self.scatter(g, seg.end, dir);
                }
            }
        }

        // Gravity
        let gravity = self.params.gravity;
        for v in self.vertices().values() {
            let p = v.position(x);
            energy -= k * v.mass * gravity.dot(p);
            if let (Some(g), Some(i)) = (grad.as_deref_mut(), v.dof()) {
                add(g, i, -k * v.mass * gravity);
            }
        }
        for &(v, mass) in &self.extra_mass {
            if self.vertex(v).is_none() {
                continue;
            }
            energy -= k * mass * gravity.dot(self.position_in(x, v));
            if let Some(g) = grad.as_deref_mut() {
                self.scatter(g, v, -k * mass * gravity);
            }
        }

        // External forces
        for &(v, force) in &self.external_forces {
            if self.vertex(v).is_none() {
                continue;
            }
            energy -= k * force.dot(self.position_in(x, v));
            if let Some(g) = grad.as_deref_mut() {
                self.scatter(g, v, -k * force);
            }
        }

        energy += self
            .air_mesh()
            .penalty(k * self.params.lambda_air_mesh, x, grad);
        energy
    }

    fn bend_energy(
        &self,
        x: &[f64],
        [a, b, c]: [VertexId; 3],
        avg_length: f64,
        grad: Option<&mut [f64]>,
    ) -> f64 {
        let width = self.vertices()[b].width;
        let fac = self.params.k_global * self.params.k_bend * width / avg_length;
        let (theta, dtheta) = turn_angle_with_gradient(
            self.position_in(x, a),
            self.position_in(x, b),
            self.position_in(x, c),
        );
        let dev = theta - PI;
        if let Some(g) = grad {
            let scale = 2.0 * fac * dev;
            for (v, d) in [a, b, c].into_iter().zip(dtheta) {
                self.scatter(g, v, scale * d);
            }
        }
        fac * dev * dev
    }

    #[inline]
    fn scatter(&self, grad: &mut [f64], vertex: VertexId, value: DVec2) {
        if let Some(i) = self.vertices()[vertex].dof() {
            add(grad, i, value);
        }
    }
}

#[inline]
fn add(grad: &mut [f64], dof: usize, value: DVec2) {
    grad[2 * dof] += value.x;
    grad[2 * dof + 1] += value.y;
}
