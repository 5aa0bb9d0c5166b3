//! Dynamics state: per-DOF buffers carried between explicit steps.

use ruffles_mesh::SimulationMesh;

/// Velocity, gradient and acceleration buffers, one entry per DOF.
///
/// The buffers are sized to the mesh's DOF vector and resized (with
/// velocities reset to rest) whenever a topology edit changes its length.
#[derive(Debug, Clone, Default)]
pub struct DynamicsState {
    pub vel: Vec<f64>,
    pub grad: Vec<f64>,
    pub acc: Vec<f64>,
}

impl DynamicsState {
    /// State at rest for `mesh`.
    pub fn from_mesh(mesh: &SimulationMesh) -> Self {
        let n = mesh.dof();
        Self {
            vel: vec![0.0; n],
            grad: vec![0.0; n],
            acc: vec![0.0; n],
        }
    }

    #[inline]
    pub fn dof(&self) -> usize {
        self.vel.len()
    }

    /// Resets to rest if the DOF count changed. Returns true if it did.
    pub fn ensure_size(&mut self, mesh: &SimulationMesh) -> bool {
        if self.dof() == mesh.dof() {
            return false;
        }
        *self = Self::from_mesh(mesh);
        true
    }

    /// `0.5 · Σ m_i · v_i²`.
    pub fn kinetic_energy(&self, mass: &[f64]) -> f64 {
        self.vel
            .iter()
            .zip(mass)
            .map(|(v, m)| 0.5 * m * v * v)
            .sum()
    }

    /// `|a|² + |v|²`, the explicit solver's convergence measure.
    pub fn residual(&self) -> f64 {
        let a: f64 = self.acc.iter().map(|a| a * a).sum();
        let v: f64 = self.vel.iter().map(|v| v * v).sum();
        a + v
    }
}
