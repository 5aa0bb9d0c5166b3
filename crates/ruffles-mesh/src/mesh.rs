//! Core simulation mesh type.
//!
//! Vertices and segments live in ordered arenas, so handles stay valid
//! while the strip is edited around them. Movable vertices own two entries
//! of the flat DOF vector `x`; fixed vertices carry their position inline.
//! The air mesh mirrors the vertex list in order and is cleared whenever
//! that correspondence breaks.

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use rand::Rng;
use ruffles_airmesh::{AirMesh, AirVertex};
use ruffles_types::constants::LENGTH_RATIO_BAND;
use ruffles_types::{OrderedArena, RuffleError, RuffleResult, SegmentId, VertexId};
use serde::{Deserialize, Serialize};

use crate::element::{Segment, Vertex, VertexKind};
use crate::params::MeshParams;

/// A strip of segments with its degrees of freedom and energy model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationMesh {
    /// DOF vector: `[x0, y0, x1, y1, ...]` of the movable vertices.
    pub x: Vec<f64>,
    /// Per-DOF mass, kept in step with `x`.
    pub m: Vec<f64>,
    /// Extra bends across topology junctions, rebuilt by the owning ruffle.
    pub connection_bends: Vec<[SegmentId; 2]>,
    /// Point masses attached to vertices.
    pub extra_mass: Vec<(VertexId, f64)>,
    /// Point forces applied to vertices.
    pub external_forces: Vec<(VertexId, DVec2)>,
    pub params: MeshParams,
    vertices: OrderedArena<VertexId, Vertex>,
    segments: OrderedArena<SegmentId, Segment>,
    #[serde(skip)]
    air_mesh: AirMesh,
    /// Air-mesh vertex index of each vertex, while the air mesh exists.
    #[serde(skip)]
    air_index: HashMap<VertexId, usize>,
}

impl SimulationMesh {
    /// Creates an empty mesh with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with the given parameters.
    pub fn with_params(params: MeshParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    // --- Access -------------------------------------------------------

    pub fn vertices(&self) -> &OrderedArena<VertexId, Vertex> {
        &self.vertices
    }

    pub fn segments(&self) -> &OrderedArena<SegmentId, Segment> {
        &self.segments
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(id)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of scalar degrees of freedom.
    #[inline]
    pub fn dof(&self) -> usize {
        self.x.len()
    }

    /// Number of vertices backed by the DOF vector.
    pub fn movable_vertex_count(&self) -> usize {
        self.vertices.values().filter(|v| !v.is_fixed()).count()
    }

    /// Current position of `vertex`.
    ///
    /// # Panics
    /// If `vertex` has been removed.
    #[inline]
    pub fn get_vertex_position(&self, vertex: VertexId) -> DVec2 {
        self.vertices[vertex].position(&self.x)
    }

    /// Current length of a segment.
    pub fn segment_current_length(&self, segment: &Segment) -> f64 {
        (self.get_vertex_position(segment.end) - self.get_vertex_position(segment.start)).length()
    }

    // --- Construction -------------------------------------------------

    fn append_vertex(&mut self, position: DVec2, fixed: bool) -> VertexId {
        let kind = if fixed {
            VertexKind::Fixed(position)
        } else {
            let index = self.x.len() / 2;
            self.x.extend([position.x, position.y]);
            self.m.extend([1.0, 1.0]);
            VertexKind::Dof(index)
        };
        self.vertices.push_back(Vertex::new(kind))
    }

    /// Appends a vertex. Movable vertices get two new DOFs with unit mass.
    /// Invalidates the air mesh.
    pub fn push_vertex(&mut self, position: DVec2, fixed: bool) -> VertexId {
        self.clear_air_mesh();
        self.append_vertex(position, fixed)
    }

    /// Removes a vertex; its DOFs are reclaimed by [`Self::cleanup`].
    /// Invalidates the air mesh.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Option<Vertex> {
        let removed = self.vertices.remove(vertex)?;
        self.clear_air_mesh();
        Some(removed)
    }

    /// Appends a segment at the end of the chain.
    pub fn push_segment(&mut self, start: VertexId, end: VertexId, length: f64) -> SegmentId {
        self.insert_segment(None, start, end, length)
    }

    /// Inserts a segment right before `before`, or at the end for `None`.
    pub fn insert_segment(
        &mut self,
        before: Option<SegmentId>,
        start: VertexId,
        end: VertexId,
        length: f64,
    ) -> SegmentId {
        self.segments
            .insert_before(before, Segment::new(start, end, length))
    }

    pub fn remove_segment(&mut self, segment: SegmentId) -> Option<Segment> {
        self.segments.remove(segment)
    }

    /// Replaces `segment` by two halves meeting at a new movable midpoint
    /// whose width and z-range average those of the endpoints.
    ///
    /// An existing air mesh is updated in place by splitting the matching
    /// constraint edge.
    pub fn split_segment(&mut self, segment: SegmentId) -> RuffleResult<[SegmentId; 2]> {
        let seg = *self
            .segments
            .get(segment)
            .ok_or_else(|| RuffleError::InvalidMesh("split of a removed segment".into()))?;
        let start = self.vertices[seg.start].clone();
        let end = self.vertices[seg.end].clone();
        let center_pos = 0.5 * (start.position(&self.x) + end.position(&self.x));

        let center = self.append_vertex(center_pos, false);
        {
            let v = &mut self.vertices[center];
            v.width = 0.5 * (start.width + end.width);
            v.z = match (start.z, end.z) {
                (Some(s), Some(e)) => Some([0.5 * (s[0] + e[0]), 0.5 * (s[1] + e[1])]),
                _ => None,
            };
        }
        let first = self.insert_segment(Some(segment), seg.start, center, 0.5 * seg.length);
        let second = self.insert_segment(Some(segment), center, seg.end, 0.5 * seg.length);

        if !self.air_mesh.is_empty() {
            self.split_air_edge(seg.start, seg.end, center);
        }
        self.segments.remove(segment);
        Ok([first, second])
    }

    fn split_air_edge(&mut self, start: VertexId, end: VertexId, center: VertexId) {
        let aligned = self.air_mesh.vertex_count() + 1 == self.vertices.len();
        let indices = (self.air_index.get(&start), self.air_index.get(&end));
        let air_vertex = AirVertex::from(&self.vertices[center]);
        let split = match (aligned, indices) {
            (true, (Some(&s), Some(&e))) => self.air_mesh.split_segment(s, e, air_vertex),
            _ => false,
        };
        if split {
            self.air_index.insert(center, self.air_mesh.vertex_count() - 1);
        } else {
            tracing::warn!("air mesh edge for split segment not found, clearing air mesh");
            self.clear_air_mesh();
        }
    }

    /// Removes vertices no longer referenced by any segment and compacts
    /// the DOF vector, keeping the relative order of surviving DOFs.
    pub fn cleanup(&mut self) {
        let referenced: HashSet<VertexId> = self
            .segments
            .values()
            .flat_map(|s| [s.start, s.end])
            .collect();
        let orphans: Vec<VertexId> = self
            .vertices
            .keys()
            .filter(|v| !referenced.contains(v))
            .collect();
        if !orphans.is_empty() {
            for v in orphans {
                self.vertices.remove(v);
            }
            self.clear_air_mesh();
        }
        let vertices = &self.vertices;
        self.extra_mass.retain(|(v, _)| vertices.contains(*v));
        self.external_forces.retain(|(v, _)| vertices.contains(*v));

        let old_count = self.x.len() / 2;
        let mut used = vec![false; old_count];
        for v in self.vertices.values() {
            if let Some(i) = v.dof() {
                if i < old_count {
                    used[i] = true;
                }
            }
        }
        let mut new_index = vec![usize::MAX; old_count];
        let mut new_x = Vec::with_capacity(self.x.len());
        let mut new_m = Vec::with_capacity(self.m.len());
        for i in (0..old_count).filter(|&i| used[i]) {
            new_index[i] = new_x.len() / 2;
            new_x.extend_from_slice(&self.x[2 * i..2 * i + 2]);
            new_m.extend_from_slice(&self.m[2 * i..2 * i + 2]);
        }
        for v in self.vertices.values_mut() {
            if let VertexKind::Dof(i) = &mut v.kind {
                *i = new_index[*i];
            }
        }
        self.air_mesh.remap_dofs(|i| new_index.get(i).copied().unwrap_or(i));
        self.x = new_x;
        self.m = new_m;
    }

    /// Recomputes lumped vertex masses: each segment gives each endpoint the
    /// trapezoid between the endpoint width and the mid width over half its
    /// rest length, times the density.
    pub fn update_vertex_mass(&mut self) {
        let density = self.params.density;
        for v in self.vertices.values_mut() {
            v.mass = 0.0;
        }
        let segments: Vec<Segment> = self.segments.values().copied().collect();
        for seg in segments {
            let half_length = 0.5 * seg.length;
            let start_width = self.vertices[seg.start].width;
            let end_width = self.vertices[seg.end].width;
            let center_width = 0.5 * (start_width + end_width);
            self.vertices[seg.start].mass += 0.5 * (start_width + center_width) * half_length * density;
            self.vertices[seg.end].mass += 0.5 * (end_width + center_width) * half_length * density;
        }
        for v in self.vertices.values() {
            if let Some(i) = v.dof() {
                self.m[2 * i] = v.mass;
                self.m[2 * i + 1] = v.mass;
            }
        }
    }

    /// Vertex masses plus attached point masses.
    pub fn total_mass(&self) -> f64 {
        self.vertices.values().map(|v| v.mass).sum::<f64>()
            + self.extra_mass.iter().map(|(_, m)| m).sum::<f64>()
    }

    pub fn add_extra_mass(&mut self, vertex: VertexId, mass: f64) {
        self.extra_mass.push((vertex, mass));
    }

    pub fn add_external_force(&mut self, vertex: VertexId, force: DVec2) {
        self.external_forces.push((vertex, force));
    }

    // --- Queries ------------------------------------------------------

    /// True if every segment's current length is within 10% of its rest length.
    pub fn consistent_lengths(&self) -> bool {
        let (lo, hi) = LENGTH_RATIO_BAND;
        self.segments.values().all(|seg| {
            let f = self.segment_current_length(seg) / seg.length;
            (lo..=hi).contains(&f)
        })
    }

    /// Adds uniform noise in `[-epsilon, epsilon]` to every DOF.
    pub fn perturb<R: Rng>(&mut self, epsilon: f64, rng: &mut R) {
        for v in self.x.iter_mut() {
            *v += epsilon * rng.gen_range(-1.0..=1.0);
        }
    }

    /// Fills missing z-ranges with the inverse-distance weighted average of
    /// the nearest vertices that have one, walking along segments.
    pub fn interpolate_missing_z(&mut self) {
        let ids: Vec<VertexId> = self.vertices.keys().collect();
        let index: HashMap<VertexId, usize> = ids.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let mut edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        for seg in self.segments.values() {
            let (Some(&a), Some(&b)) = (index.get(&seg.start), index.get(&seg.end)) else {
                continue;
            };
            edges[a].push((b, seg.length));
            edges[b].push((a, seg.length));
        }

        for i in 0..ids.len() {
            if self.vertices[ids[i]].z.is_some() {
                continue;
            }
            let mut stack = vec![(i, 0.0)];
            let mut visited = vec![false; ids.len()];
            let mut total = [0.0, 0.0];
            let mut weights = 0.0;
            while let Some((ix, dist)) = stack.pop() {
                if std::mem::replace(&mut visited[ix], true) {
                    continue;
                }
                match self.vertices[ids[ix]].z {
                    Some(z) if dist > 0.0 => {
                        let w = 1.0 / dist;
                        total[0] += w * z[0];
                        total[1] += w * z[1];
                        weights += w;
                    }
                    _ => stack.extend(edges[ix].iter().map(|&(n, l)| (n, dist + l))),
                }
            }
            if weights > 0.0 {
                self.vertices[ids[i]].z = Some([total[0] / weights, total[1] / weights]);
            }
        }
    }

    /// Checks DOF indices, segment chain contiguity, positive rest lengths,
    /// live connection bends and non-negative parameters.
    pub fn verify(&self) -> RuffleResult<()> {
        if self.x.len() % 2 != 0 || self.m.len() != self.x.len() {
            return Err(RuffleError::invariant(format!(
                "DOF vector of length {} with {} masses",
                self.x.len(),
                self.m.len()
            )));
        }
        let mut seen = HashSet::new();
        for v in self.vertices.values() {
            if let Some(i) = v.dof() {
                if 2 * i + 1 >= self.x.len() {
                    return Err(RuffleError::invariant(format!("DOF index {i} out of range")));
                }
                if !seen.insert(i) {
                    return Err(RuffleError::invariant(format!("DOF index {i} used twice")));
                }
            }
        }

        let mut prev: Option<&Segment> = None;
        for seg in self.segments.values() {
            if !(seg.length > 0.0) {
                return Err(RuffleError::invariant(format!(
                    "segment rest length {} is not positive",
                    seg.length
                )));
            }
            if !self.vertices.contains(seg.start) || !self.vertices.contains(seg.end) {
                return Err(RuffleError::invariant("segment references a removed vertex"));
            }
            if let Some(p) = prev {
                if p.end != seg.start {
                    return Err(RuffleError::invariant("segment chain is not contiguous"));
                }
            }
            prev = Some(seg);
        }

        if self
            .connection_bends
            .iter()
            .flatten()
            .any(|s| !self.segments.contains(*s))
        {
            return Err(RuffleError::invariant("connection bend references a removed segment"));
        }
        self.params.validate().map_err(|e| RuffleError::invariant(e.to_string()))
    }

    // --- Air mesh -----------------------------------------------------

    pub fn air_mesh(&self) -> &AirMesh {
        &self.air_mesh
    }

    /// Triangulates the current layout with all segments as constraints.
    pub fn generate_air_mesh(&mut self) {
        let index: HashMap<VertexId, usize> = self
            .vertices
            .keys()
            .enumerate()
            .map(|(i, v)| (v, i))
            .collect();
        let air_vertices: Vec<AirVertex> = self.vertices.values().map(AirVertex::from).collect();
        let constraints: Vec<(usize, usize)> = self
            .segments
            .values()
            .filter_map(|s| Some((*index.get(&s.start)?, *index.get(&s.end)?)))
            .collect();
        self.air_mesh = AirMesh::build(air_vertices, &constraints, &self.x);
        self.air_index = index;
    }

    /// Air-mesh vertex index of `vertex`, if the air mesh is present.
    pub fn air_vertex_index(&self, vertex: VertexId) -> Option<usize> {
        if self.air_mesh.is_empty() {
            return None;
        }
        self.air_index.get(&vertex).copied()
    }

    /// Relaxes the air mesh at the current positions. Returns true if the
    /// triangulation changed.
    pub fn relax_air_mesh(&mut self) -> bool {
        if self.air_mesh.is_empty() {
            return false;
        }
        if self.air_mesh.vertex_count() != self.vertices.len() {
            tracing::warn!("air mesh out of sync with vertices, regenerating");
            self.generate_air_mesh();
            return true;
        }
        self.air_mesh.relax(&self.x)
    }

    /// Pushes vertices out of inverted air-mesh triangles.
    pub fn project_air_mesh(&mut self) {
        self.air_mesh.project(&mut self.x);
    }

    pub fn clear_air_mesh(&mut self) {
        self.air_mesh.clear();
        self.air_index.clear();
    }
}
