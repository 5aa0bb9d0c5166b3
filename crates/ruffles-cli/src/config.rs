//! Run configuration loaded from TOML.
//!
//! ```toml
//! [ruffle]
//! layout = "vertical"
//! steps = 2
//! height = 5.0
//! width = 3.0
//! h = 0.5
//!
//! [mesh]
//! k_bend = 14500.0
//!
//! [solver]
//! kind = "hybrid"
//! ```

use ruffles_mesh::MeshParams;
use ruffles_solver::SolverConfig;
use ruffles_topology::Ruffle;
use ruffles_types::{RuffleError, RuffleResult};
use serde::{Deserialize, Serialize};

/// Which stack constructor builds the ruffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
}

/// Stack dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub layout: Layout,
    pub steps: usize,
    pub height: f64,
    pub width: f64,
    /// Target mesh edge length.
    pub h: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Vertical,
            steps: 2,
            height: 5.0,
            width: 3.0,
            h: 0.5,
        }
    }
}

/// A complete run: ruffle layout, material parameters and solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub ruffle: StackConfig,
    pub mesh: MeshParams,
    pub solver: SolverConfig,
}

impl RunConfig {
    pub fn from_toml(content: &str) -> RuffleResult<Self> {
        toml::from_str(content).map_err(|e| RuffleError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> RuffleResult<()> {
        self.mesh.validate()?;
        self.solver.validate()
    }

    /// Builds the ruffle with this config's parameters and solver.
    pub fn build(&self) -> RuffleResult<Ruffle> {
        self.validate()?;
        let StackConfig {
            layout,
            steps,
            height,
            width,
            h,
        } = self.ruffle;
        let mut ruffle = match layout {
            Layout::Vertical => Ruffle::create_ruffle_stack(steps, height, width, h)?,
            Layout::Horizontal => Ruffle::create_horizontal_stack(steps, height, width, h)?,
        };
        let mesh = ruffle.simulation_mesh_mut();
        mesh.params = self.mesh.clone();
        mesh.update_vertex_mass();
        ruffle.configure_solver(&self.solver);
        Ok(ruffle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = RunConfig::from_toml("").expect("parse");
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn partial_tables_fill_defaults() {
        let config = RunConfig::from_toml(
            "[ruffle]\nlayout = \"horizontal\"\nsteps = 1\n\n[solver]\nkind = \"quasi_newton\"\nmax_steps = 10\n",
        )
        .expect("parse");
        assert_eq!(config.ruffle.layout, Layout::Horizontal);
        assert_eq!(config.ruffle.steps, 1);
        assert!((config.ruffle.h - 0.5).abs() < 1e-12);
        assert_eq!(config.solver.max_steps, 10);
        assert_eq!(config.mesh, MeshParams::default());
    }

    #[test]
    fn build_applies_mesh_params() {
        let mut config = RunConfig::default();
        config.ruffle.steps = 1;
        config.mesh.density = 0.16;
        let ruffle = config.build().expect("build");
        let default_mass = RunConfig {
            ruffle: config.ruffle.clone(),
            ..RunConfig::default()
        }
        .build()
        .expect("build")
        .simulation_mesh()
        .total_mass();
        let mass = ruffle.simulation_mesh().total_mass();
        assert!((mass - 2.0 * default_mass).abs() < 1e-9 * mass);
    }

    #[test]
    fn invalid_values_rejected() {
        let config = RunConfig::from_toml("[solver]\nmax_steps = 0\n").expect("parse");
        assert!(config.validate().is_err());
        assert!(RunConfig::from_toml("[ruffle]\nsteps = \"two\"\n").is_err());
    }
}
