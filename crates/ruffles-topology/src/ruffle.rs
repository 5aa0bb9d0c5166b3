//! The ruffle: topology graph over a simulation mesh.
//!
//! Connection points and sections describe the pleated structure; the
//! simulation mesh holds the actual vertices and segments. Sections own
//! runs of mesh segments, connection points record which segments touch
//! them on either side. Every structural change goes through `Ruffle`
//! methods so the two layers and the outline loop stay consistent.

use std::collections::HashSet;

use glam::DVec2;
use ruffles_geometry::{ArcLengthTable, CubicBezier};
use ruffles_mesh::{MeshParams, SimulationMesh};
use ruffles_solver::{Solver, SolverConfig};
use ruffles_types::constants::{BEZIER_SAMPLES, MAX_SOLVE_STEPS, MIN_SECTION_SEGMENTS};
use ruffles_types::{
    ConnectionPointId, OrderedArena, RuffleError, RuffleResult, SectionId, SegmentId, VertexId,
};
use serde::{Deserialize, Serialize};

use crate::elements::{ConnectionPoint, OutlineSection, Section, SectionKind};
use crate::solve::SolveStats;

/// Relative tolerance for matching a section shape to its end points.
const SHAPE_TOLERANCE: f64 = 1e-6;

fn default_solver() -> Box<dyn Solver> {
    SolverConfig::default().build()
}

fn default_max_steps() -> u32 {
    MAX_SOLVE_STEPS
}

/// A pleated strip: simulation mesh, solver and topology graph.
///
/// Cloning is deep: the clone owns its own mesh, solver state and
/// topology, and edits to one never show up in the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruffle {
    pub(crate) simulation_mesh: SimulationMesh,
    #[serde(skip, default = "default_solver")]
    pub(crate) solver: Box<dyn Solver>,
    #[serde(default = "default_max_steps")]
    pub(crate) max_steps: u32,
    pub(crate) connection_points: OrderedArena<ConnectionPointId, ConnectionPoint>,
    pub(crate) sections: OrderedArena<SectionId, Section>,
    pub(crate) outline_sections: Vec<OutlineSection>,
    /// Target mesh edge length.
    pub(crate) h: f64,
    #[serde(skip)]
    pub(crate) stats: SolveStats,
}

impl Ruffle {
    /// Empty ruffle with target edge length `h` and default mesh parameters.
    pub fn new(h: f64) -> Self {
        Self::with_params(h, MeshParams::default())
    }

    pub fn with_params(h: f64, params: MeshParams) -> Self {
        Self {
            simulation_mesh: SimulationMesh::with_params(params),
            solver: default_solver(),
            max_steps: MAX_SOLVE_STEPS,
            connection_points: OrderedArena::new(),
            sections: OrderedArena::new(),
            outline_sections: Vec::new(),
            h,
            stats: SolveStats::default(),
        }
    }

    // --- Access -------------------------------------------------------

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn simulation_mesh(&self) -> &SimulationMesh {
        &self.simulation_mesh
    }

    /// Mutable mesh access for positions, parameters and attached loads.
    /// Topology must only change through `Ruffle` methods.
    pub fn simulation_mesh_mut(&mut self) -> &mut SimulationMesh {
        &mut self.simulation_mesh
    }

    pub fn connection_points(&self) -> &OrderedArena<ConnectionPointId, ConnectionPoint> {
        &self.connection_points
    }

    pub fn connection_point(&self, id: ConnectionPointId) -> Option<&ConnectionPoint> {
        self.connection_points.get(id)
    }

    pub fn sections(&self) -> &OrderedArena<SectionId, Section> {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn outline_sections(&self) -> &[OutlineSection] {
        &self.outline_sections
    }

    pub fn solver(&self) -> &dyn Solver {
        self.solver.as_ref()
    }

    pub fn set_solver(&mut self, solver: Box<dyn Solver>) {
        self.solver = solver;
    }

    /// Installs the solver described by `config`, including its step cap.
    pub fn configure_solver(&mut self, config: &SolverConfig) {
        self.solver = config.build();
        self.max_steps = config.max_steps;
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Sets the rest length of a section. Takes effect on the mesh with the
    /// next [`Ruffle::update_simulation_mesh`].
    pub fn set_section_length(&mut self, id: SectionId, length: f64) -> RuffleResult<()> {
        if !(length > 0.0 && length.is_finite()) {
            return Err(RuffleError::InvalidInput(format!("section length {length}")));
        }
        self.section_mut(id)?.length = length;
        Ok(())
    }

    pub fn set_section_kind(&mut self, id: SectionId, kind: SectionKind) -> RuffleResult<()> {
        self.section_mut(id)?.kind = kind;
        Ok(())
    }

    pub(crate) fn section_mut(&mut self, id: SectionId) -> RuffleResult<&mut Section> {
        self.sections
            .get_mut(id)
            .ok_or_else(|| RuffleError::topology("unknown section"))
    }

    pub(crate) fn point_vertex(&self, id: ConnectionPointId) -> RuffleResult<VertexId> {
        self.connection_points
            .get(id)
            .map(|p| p.mesh_vertex)
            .ok_or_else(|| RuffleError::topology("unknown connection point"))
    }

    /// Current position of a connection point's mesh vertex.
    pub fn point_position(&self, id: ConnectionPointId) -> RuffleResult<DVec2> {
        Ok(self.simulation_mesh.get_vertex_position(self.point_vertex(id)?))
    }

    // --- Building blocks ----------------------------------------------

    /// Adds a connection point backed by a new mesh vertex.
    pub fn push_connection_point(&mut self, position: DVec2, fixed: bool) -> ConnectionPointId {
        let vertex = self.simulation_mesh.push_vertex(position, fixed);
        self.connection_points
            .push_back(ConnectionPoint::new(position, vertex))
    }

    /// Samples `shape` (arclength parameter in `[0, length]`) into at least
    /// three segments of about `h` from `a` to `b`, appending them to the
    /// mesh and registering the end segments at both points.
    ///
    /// The section is returned, not inserted; see [`Ruffle::push_section`].
    pub fn create_section(
        &mut self,
        a: ConnectionPointId,
        b: ConnectionPointId,
        length: f64,
        shape: impl Fn(f64) -> DVec2,
    ) -> RuffleResult<Section> {
        self.create_section_at(a, b, length, shape, None, [true, true])
    }

    /// Like [`Ruffle::create_section`], with mesh segments inserted before
    /// `before` and optional registration at either end point.
    pub(crate) fn create_section_at(
        &mut self,
        a: ConnectionPointId,
        b: ConnectionPointId,
        length: f64,
        shape: impl Fn(f64) -> DVec2,
        before: Option<SegmentId>,
        register: [bool; 2],
    ) -> RuffleResult<Section> {
        if !(length > 0.0 && length.is_finite()) {
            return Err(RuffleError::InvalidInput(format!("section length {length}")));
        }
        let va = self.point_vertex(a)?;
        let vb = self.point_vertex(b)?;
        let pa = self.simulation_mesh.get_vertex_position(va);
        let pb = self.simulation_mesh.get_vertex_position(vb);
        for (expected, actual, which) in [(pa, shape(0.0), "start"), (pb, shape(length), "end")] {
            if (expected - actual).length() > SHAPE_TOLERANCE * expected.length().max(1.0) {
                return Err(RuffleError::topology(format!(
                    "section shape {which} {actual} does not match connection point at {expected}"
                )));
            }
        }

        let count = ((length / self.h).round() as usize).max(MIN_SECTION_SEGMENTS);
        let segment_length = length / count as f64;
        let mut section = Section::new(a, b, length);
        let mut prev = va;
        for i in 0..count {
            let next = if i + 1 == count {
                vb
            } else {
                self.simulation_mesh
                    .push_vertex(shape((i + 1) as f64 * segment_length), false)
            };
            let segment = self
                .simulation_mesh
                .insert_segment(before, prev, next, segment_length);
            section.mesh_segments.push(segment);
            prev = next;
        }

        if let Some((first, last)) = section.boundary_segments() {
            if register[0] {
                let p = &mut self.connection_points[a];
                let side = p.last_direction;
                p.connecting_segments[side].push(first);
            }
            if register[1] {
                let p = &mut self.connection_points[b];
                let side = p.last_direction;
                p.connecting_segments[side].push(last);
                p.last_direction = 1 - side;
            }
        }
        Ok(section)
    }

    /// Section along the cubic Bézier from `a` to `b` with end tangents
    /// `ta`, `tb`, resampled by arclength into near-equal segments.
    pub fn create_bezier_section(
        &mut self,
        a: ConnectionPointId,
        b: ConnectionPointId,
        before: Option<SegmentId>,
        ta: DVec2,
        tb: DVec2,
    ) -> RuffleResult<Section> {
        self.create_bezier_section_at(a, b, before, ta, tb, [true, true])
    }

    pub(crate) fn create_bezier_section_at(
        &mut self,
        a: ConnectionPointId,
        b: ConnectionPointId,
        before: Option<SegmentId>,
        ta: DVec2,
        tb: DVec2,
        register: [bool; 2],
    ) -> RuffleResult<Section> {
        let curve = CubicBezier::new(self.point_position(a)?, self.point_position(b)?, ta, tb);
        let table = ArcLengthTable::new(curve, BEZIER_SAMPLES);
        let length = table.length();
        self.create_section_at(a, b, length, |s| table.point_at(s), before, register)
    }

    /// Appends a section to the section list.
    pub fn push_section(&mut self, section: Section) -> SectionId {
        self.sections.push_back(section)
    }

    /// Rebuilds the connection bends: every pair of segments on opposite
    /// sides of a connection point, unless they already follow each other
    /// in the segment chain.
    pub fn create_connection_bends(&mut self) {
        let segments = self.simulation_mesh.segments();
        let mut bends = Vec::new();
        for point in self.connection_points.values() {
            for &a in &point.connecting_segments[0] {
                for &b in &point.connecting_segments[1] {
                    let adjacent = a == b || segments.next(a) == Some(b) || segments.prev(a) == Some(b);
                    if !adjacent {
                        bends.push([a, b]);
                    }
                }
            }
        }
        self.simulation_mesh.connection_bends = bends;
    }

    /// Average direction of the segments at a connection point, oriented so
    /// side-1 segments point away from it and side-0 segments into it.
    /// Zero if nothing is connected.
    pub fn get_tangent(&self, point: ConnectionPointId) -> DVec2 {
        let Some(p) = self.connection_points.get(point) else {
            return DVec2::ZERO;
        };
        let mesh = &self.simulation_mesh;
        let mut tangent = DVec2::ZERO;
        let mut count = 0;
        for (side, segments) in p.connecting_segments.iter().enumerate() {
            for seg in segments.iter().filter_map(|s| mesh.segment(*s)) {
                let dir = (mesh.get_vertex_position(seg.end) - mesh.get_vertex_position(seg.start))
                    .normalize_or_zero();
                let flip = (seg.end == p.mesh_vertex) ^ (side == 0);
                tangent += if flip { -dir } else { dir };
                count += 1;
            }
        }
        if count == 0 {
            return DVec2::ZERO;
        }
        (tangent / count as f64).normalize_or_zero()
    }

    // --- Mesh synchronization -----------------------------------------

    /// Pushes section rest lengths down to their segments, splitting every
    /// segment of a section once when its share exceeds `2h`, then
    /// recomputes vertex masses.
    pub fn update_simulation_mesh(&mut self) -> RuffleResult<()> {
        let ids: Vec<SectionId> = self.sections.keys().collect();
        for id in ids {
            let section = &self.sections[id];
            if section.mesh_segments.is_empty() {
                continue;
            }
            let segment_length = section.length / section.mesh_segments.len() as f64;
            let old = section.mesh_segments.clone();
            let (start, end) = (section.start, section.end);
            for &s in &old {
                if let Some(seg) = self.simulation_mesh.segment_mut(s) {
                    seg.length = segment_length;
                }
            }
            if segment_length <= 2.0 * self.h {
                continue;
            }

            let mut split = Vec::with_capacity(2 * old.len());
            for &s in &old {
                split.extend(self.simulation_mesh.split_segment(s)?);
            }
            if let (Some(&old_first), Some(&old_last), Some(&first), Some(&last)) =
                (old.first(), old.last(), split.first(), split.last())
            {
                if let Some(p) = self.connection_points.get_mut(start) {
                    p.replace_segment(old_first, first);
                }
                if let Some(p) = self.connection_points.get_mut(end) {
                    p.replace_segment(old_last, last);
                }
            }
            tracing::debug!(segments = split.len(), "section resampled");
            self.sections[id].mesh_segments = split;
            self.simulation_mesh.relax_air_mesh();
            self.create_connection_bends();
        }
        self.simulation_mesh.update_vertex_mass();
        Ok(())
    }

    /// Triangulates the air mesh for the current layout.
    pub fn generate_air_mesh(&mut self) {
        self.simulation_mesh.generate_air_mesh();
    }

    /// Vertex chain of a section from its start to its end point.
    pub fn section_vertices(&self, id: SectionId) -> Vec<VertexId> {
        let Some(section) = self.sections.get(id) else {
            return Vec::new();
        };
        let mesh = &self.simulation_mesh;
        let mut vertices = Vec::with_capacity(section.mesh_segments.len() + 1);
        for seg in section.mesh_segments.iter().filter_map(|s| mesh.segment(*s)) {
            if vertices.is_empty() {
                vertices.push(seg.start);
            }
            vertices.push(seg.end);
        }
        vertices
    }

    /// Current outline as a closed polygon (first point not repeated).
    pub fn outline_polygon(&self) -> Vec<DVec2> {
        let mut points = Vec::new();
        for entry in &self.outline_sections {
            let mut vertices = self.section_vertices(entry.section);
            if entry.reversed {
                vertices.reverse();
            }
            vertices.pop();
            points.extend(
                vertices
                    .into_iter()
                    .map(|v| self.simulation_mesh.get_vertex_position(v)),
            );
        }
        points
    }

    // --- Invariants ---------------------------------------------------

    /// Checks the mesh, connection-point segment ownership, section chain
    /// contiguity and positive lengths, and that the outline is one closed
    /// loop over live sections.
    pub fn verify(&self) -> RuffleResult<()> {
        let mesh = &self.simulation_mesh;
        mesh.verify()?;

        for point in self.connection_points.values() {
            if mesh.vertex(point.mesh_vertex).is_none() {
                return Err(RuffleError::invariant("connection point lost its mesh vertex"));
            }
            for &s in point.connecting_segments.iter().flatten() {
                match mesh.segment(s) {
                    Some(seg) if seg.touches(point.mesh_vertex) => {}
                    Some(_) => {
                        return Err(RuffleError::invariant(
                            "connecting segment does not touch its connection point",
                        ))
                    }
                    None => return Err(RuffleError::invariant("connecting segment was removed")),
                }
            }
        }

        let mut prev_end: Option<ConnectionPointId> = None;
        let mut owned = HashSet::new();
        for section in self.sections.values() {
            if !(section.length > 0.0) {
                return Err(RuffleError::invariant(format!(
                    "section length {} is not positive",
                    section.length
                )));
            }
            if prev_end.is_some_and(|end| end != section.start) {
                return Err(RuffleError::invariant("sections are not contiguous"));
            }
            prev_end = Some(section.end);

            let start = self.point_vertex(section.start).map_err(|_| {
                RuffleError::invariant("section starts at a removed connection point")
            })?;
            let end = self.point_vertex(section.end).map_err(|_| {
                RuffleError::invariant("section ends at a removed connection point")
            })?;
            let segments: Vec<_> = section
                .mesh_segments
                .iter()
                .map(|s| mesh.segment(*s).copied())
                .collect::<Option<_>>()
                .ok_or_else(|| RuffleError::invariant("section references a removed segment"))?;
            let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
                return Err(RuffleError::invariant("section without segments"));
            };
            if first.start != start || last.end != end {
                return Err(RuffleError::invariant(
                    "section segments do not span its connection points",
                ));
            }
            if segments.windows(2).any(|w| w[0].end != w[1].start) {
                return Err(RuffleError::invariant("section segments are not contiguous"));
            }
            if !section.mesh_segments.iter().all(|s| owned.insert(*s)) {
                return Err(RuffleError::invariant("segment owned by two sections"));
            }
        }

        let mut ends = Vec::with_capacity(self.outline_sections.len());
        for entry in &self.outline_sections {
            let section = self
                .sections
                .get(entry.section)
                .ok_or_else(|| RuffleError::invariant("outline references a removed section"))?;
            ends.push((entry.start(section), entry.end(section)));
        }
        if let Some(&(_, mut prev)) = ends.last() {
            for &(start, end) in &ends {
                if start != prev {
                    return Err(RuffleError::invariant("outline is not a closed loop"));
                }
                prev = end;
            }
        }
        Ok(())
    }
}
