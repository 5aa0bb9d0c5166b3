//! Material and environment parameters of a simulation mesh.

use glam::DVec2;
use ruffles_types::constants::GRAVITY;
use ruffles_types::{RuffleError, RuffleResult};
use serde::{Deserialize, Serialize};

/// Energy weights, density, gravity and per-axis position bounds.
///
/// Unbounded axes use `±f64::MAX` so the struct survives JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Scale applied to every energy term.
    pub k_global: f64,
    /// Bending stiffness.
    pub k_bend: f64,
    /// Mass per unit area of the strip.
    pub density: f64,
    /// Weight of the segment-length penalty.
    pub lambda_membrane: f64,
    /// Weight of the inverted-triangle penalty.
    pub lambda_air_mesh: f64,
    /// Gravitational acceleration.
    pub gravity: DVec2,
    /// Lower position bound per axis.
    pub lower_bound: DVec2,
    /// Upper position bound per axis.
    pub upper_bound: DVec2,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            k_global: 10000.0,
            k_bend: 14500.0,
            density: 0.080,
            lambda_membrane: 5e5,
            lambda_air_mesh: 1e4,
            gravity: DVec2::new(0.0, -GRAVITY),
            lower_bound: DVec2::new(-f64::MAX, 0.0),
            upper_bound: DVec2::new(f64::MAX, f64::MAX),
        }
    }
}

impl MeshParams {
    /// No floor: both axes unbounded.
    pub fn unbounded() -> Self {
        Self {
            lower_bound: DVec2::splat(-f64::MAX),
            ..Default::default()
        }
    }

    /// Rejects negative weights and inverted bounds.
    pub fn validate(&self) -> RuffleResult<()> {
        let weights = [
            ("k_global", self.k_global),
            ("k_bend", self.k_bend),
            ("density", self.density),
            ("lambda_membrane", self.lambda_membrane),
            ("lambda_air_mesh", self.lambda_air_mesh),
        ];
        for (name, value) in weights {
            if !(value >= 0.0) {
                return Err(RuffleError::InvalidConfig(format!("{name} must be non-negative, got {value}")));
            }
        }
        if self.lower_bound.cmpgt(self.upper_bound).any() {
            return Err(RuffleError::InvalidConfig(format!(
                "lower bound {} exceeds upper bound {}",
                self.lower_bound, self.upper_bound
            )));
        }
        Ok(())
    }

    /// Clamps `p` into the box, returning the clamped point and which axes moved.
    #[inline]
    pub fn clamp(&self, p: DVec2) -> (DVec2, [bool; 2]) {
        let c = p.clamp(self.lower_bound, self.upper_bound);
        (c, [c.x != p.x, c.y != p.y])
    }
}
