//! Procedural benchmark scenarios.

use ruffles_mesh::generators::generate_horizontal_strip;
use ruffles_mesh::SimulationMesh;
use ruffles_solver::SolverConfig;
use ruffles_topology::Ruffle;
use ruffles_types::{RuffleError, RuffleResult};
use serde::{Deserialize, Serialize};

/// Available benchmark scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Two-step vertical stack standing on the floor.
    RuffleStack,
    /// Two-step stack lying on its side.
    HorizontalStack,
    /// Plain strip pinned at one end, sagging under gravity.
    HorizontalStrip,
    /// One-step vertical stack with its right junction densified.
    DensifiedStack,
}

impl ScenarioKind {
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::RuffleStack,
            ScenarioKind::HorizontalStack,
            ScenarioKind::HorizontalStrip,
            ScenarioKind::DensifiedStack,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::RuffleStack => "ruffle_stack",
            ScenarioKind::HorizontalStack => "horizontal_stack",
            ScenarioKind::HorizontalStrip => "horizontal_strip",
            ScenarioKind::DensifiedStack => "densified_stack",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// What a scenario solves: a full ruffle or a bare simulation mesh.
#[derive(Debug, Clone)]
pub enum Subject {
    Ruffle(Box<Ruffle>),
    Mesh(SimulationMesh),
}

impl Subject {
    pub fn mesh(&self) -> &SimulationMesh {
        match self {
            Subject::Ruffle(ruffle) => ruffle.simulation_mesh(),
            Subject::Mesh(mesh) => mesh,
        }
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub subject: Subject,
    pub config: SolverConfig,
    /// Number of physics solves to time.
    pub solves: u32,
}

impl Scenario {
    /// `create_ruffle_stack(2, 5.0, 3.0, 0.5)`.
    pub fn ruffle_stack() -> RuffleResult<Self> {
        let ruffle = Ruffle::create_ruffle_stack(2, 5.0, 3.0, 0.5)?;
        Ok(Self::with_ruffle(ScenarioKind::RuffleStack, ruffle))
    }

    /// `create_horizontal_stack(2, 5.0, 3.0, 0.5)`.
    pub fn horizontal_stack() -> RuffleResult<Self> {
        let ruffle = Ruffle::create_horizontal_stack(2, 5.0, 3.0, 0.5)?;
        Ok(Self::with_ruffle(ScenarioKind::HorizontalStack, ruffle))
    }

    /// A 20 unit strip at `h = 0.5`.
    pub fn horizontal_strip() -> Self {
        Self {
            kind: ScenarioKind::HorizontalStrip,
            subject: Subject::Mesh(generate_horizontal_strip(20.0, 0.5)),
            config: SolverConfig::default(),
            solves: 1,
        }
    }

    /// One-step stack whose right semicircle is densified into a loop.
    pub fn densified_stack() -> RuffleResult<Self> {
        let mut ruffle = Ruffle::create_ruffle_stack(1, 5.0, 3.0, 0.5)?;
        let junction = ruffle
            .sections()
            .keys()
            .nth(1)
            .ok_or_else(|| RuffleError::invariant("stack without a right semicircle"))?;
        ruffle.densify(junction)?;
        ruffle.update_simulation_mesh()?;
        Ok(Self::with_ruffle(ScenarioKind::DensifiedStack, ruffle))
    }

    pub fn from_kind(kind: ScenarioKind) -> RuffleResult<Self> {
        match kind {
            ScenarioKind::RuffleStack => Self::ruffle_stack(),
            ScenarioKind::HorizontalStack => Self::horizontal_stack(),
            ScenarioKind::HorizontalStrip => Ok(Self::horizontal_strip()),
            ScenarioKind::DensifiedStack => Self::densified_stack(),
        }
    }

    /// Replaces the solver configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_solves(mut self, solves: u32) -> Self {
        self.solves = solves;
        self
    }

    fn with_ruffle(kind: ScenarioKind, ruffle: Ruffle) -> Self {
        Self {
            kind,
            subject: Subject::Ruffle(Box::new(ruffle)),
            config: SolverConfig::default(),
            solves: 1,
        }
    }
}
