//! Topology surgery: subdivision, densification and their inverses.
//!
//! Every operation validates its preconditions before touching the mesh,
//! so an `Err` leaves the ruffle exactly as it was.

use std::collections::HashSet;

use glam::DVec2;
use ruffles_geometry::{ArcLengthTable, CubicBezier};
use ruffles_types::constants::{BEZIER_SAMPLES, EPSILON, TANGENT_CHORD_RATIO};
use ruffles_types::{ConnectionPointId, RuffleError, RuffleResult, SectionId, SegmentId};

use crate::elements::{ConnectionPoint, OutlineSection, Section, SectionKind};
use crate::ruffle::Ruffle;

/// Rest length of the loop inserted by [`Ruffle::densify2`].
const LOOP_LENGTH: f64 = 5.137;

/// How an end of the new inner section is obtained.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// Midpoint of a neighbouring section.
    Subdivide(SectionId),
    /// An existing connection point.
    Existing(ConnectionPointId),
}

/// End tangents of a junction about to be densified.
#[derive(Debug, Clone, Copy)]
struct Junction {
    start: ConnectionPointId,
    end: ConnectionPointId,
    t0: DVec2,
    t1: DVec2,
    tc: DVec2,
}

impl Ruffle {
    /// Splits a section at its middle mesh vertex, which becomes a new
    /// degree-1/1 connection point. Returns the first half; the second half
    /// follows it in the section list.
    pub fn subdivide(&mut self, id: SectionId) -> RuffleResult<SectionId> {
        let section = self
            .sections
            .get(id)
            .cloned()
            .ok_or_else(|| RuffleError::topology("subdivide of an unknown section"))?;
        if section.mesh_segments.len() < 2 {
            return Err(RuffleError::topology(
                "subdivide needs a section with at least two segments",
            ));
        }
        let split = section.mesh_segments.len() / 2;
        let (before, after) = section.mesh_segments.split_at(split);
        let mesh = &self.simulation_mesh;
        let rest = |segments: &[SegmentId]| -> RuffleResult<f64> {
            segments
                .iter()
                .map(|s| mesh.segment(*s).map(|seg| seg.length))
                .sum::<Option<f64>>()
                .ok_or_else(|| RuffleError::invariant("section references a removed segment"))
        };
        let (rest_before, rest_after) = (rest(before)?, rest(after)?);
        let first_length = section.length * rest_before / (rest_before + rest_after);
        let center_vertex = mesh
            .segment(after[0])
            .map(|seg| seg.start)
            .ok_or_else(|| RuffleError::invariant("section references a removed segment"))?;
        let position = mesh.get_vertex_position(center_vertex);

        let mut center = ConnectionPoint::new(position, center_vertex);
        center.connecting_segments = [vec![before[split - 1]], vec![after[0]]];
        center.last_direction = 1;
        let center = self.connection_points.push_back(center);

        let mut first = Section::new(section.start, center, first_length);
        first.mesh_segments = before.to_vec();
        let mut second = Section::new(center, section.end, section.length - first_length);
        second.mesh_segments = after.to_vec();
        let first = self.sections.insert_before(Some(id), first);
        let second = self.sections.insert_before(Some(id), second);
        self.splice_outline(id, &[first, second]);
        self.sections.remove(id);
        Ok(first)
    }

    /// Replaces a sharp junction by a curved loop.
    ///
    /// The section's neighbours must meet at a common apex. Both are
    /// subdivided; the section is replaced by two Bézier halves through a
    /// new center point plus a triangle of sections between the center and
    /// the two new midpoints. Returns the first replacement section, which
    /// [`Ruffle::undensify`] accepts.
    pub fn densify(&mut self, id: SectionId) -> RuffleResult<SectionId> {
        let section = self
            .sections
            .get(id)
            .cloned()
            .ok_or_else(|| RuffleError::topology("densify of an unknown section"))?;
        let (prev, next) = self.neighbours(id)?;
        if self.sections[prev].start != self.sections[next].end {
            return Err(RuffleError::topology(
                "densify needs neighbours that meet at a common apex",
            ));
        }
        for s in [prev, next] {
            if self.sections[s].mesh_segments.len() < 2 {
                return Err(RuffleError::topology(
                    "densify needs neighbours with at least two segments",
                ));
            }
        }
        let junction = self.junction(&section)?;
        let kind = section.kind;
        self.replace_junction(
            id,
            junction,
            Anchor::Subdivide(prev),
            Anchor::Subdivide(next),
            [kind, kind],
        )
    }

    /// Densification for junctions whose neighbours reach the apex through
    /// several sections. The apex is the unique connection point that starts
    /// a section before `id` and ends one after it; the loop ends are picked
    /// near half the walked distance on either side.
    pub fn densify3(&mut self, id: SectionId) -> RuffleResult<SectionId> {
        let section = self
            .sections
            .get(id)
            .cloned()
            .ok_or_else(|| RuffleError::topology("densify3 of an unknown section"))?;
        let (prev, next) = self.neighbours(id)?;
        let apex = self.find_apex(id)?;

        let a = self.pick_anchor(prev, apex, Walk::Backward)?;
        let b = self.pick_anchor(next, apex, Walk::Forward)?;
        let junction = self.junction(&section)?;
        let outer = if section.kind == SectionKind::Outline {
            SectionKind::Outline
        } else {
            SectionKind::Regular
        };
        self.replace_junction(id, junction, a, b, [outer, outer])
    }

    /// Inserts a small loop at the middle of a section that bulges to one
    /// side. Returns the first half of the split section.
    pub fn densify2(&mut self, id: SectionId) -> RuffleResult<SectionId> {
        let section = self
            .sections
            .get(id)
            .cloned()
            .ok_or_else(|| RuffleError::topology("densify2 of an unknown section"))?;
        if section.mesh_segments.len() < 2 {
            return Err(RuffleError::topology(
                "densify2 needs a section with at least two segments",
            ));
        }
        let mesh = &self.simulation_mesh;
        let middle = section.mesh_segments[section.mesh_segments.len() / 2];
        let xb = mesh
            .segment(middle)
            .map(|seg| mesh.get_vertex_position(seg.start))
            .ok_or_else(|| RuffleError::invariant("section references a removed segment"))?;
        let xa = self.point_position(section.start)?;
        let xc = self.point_position(section.end)?;
        let left = if xb.x < xa.x && xb.x < xc.x {
            true
        } else if xb.x > xa.x && xb.x > xc.x {
            false
        } else {
            return Err(RuffleError::topology(
                "densify2 needs a section bulging to the left or right",
            ));
        };

        self.simulation_mesh.clear_air_mesh();
        let first = self.subdivide(id)?;
        let second = self
            .sections
            .next(first)
            .ok_or_else(|| RuffleError::invariant("subdivide left no second half"))?;
        let b = self.sections[first].end;
        {
            let p = &mut self.connection_points[b];
            p.connecting_segments = [Vec::new(), Vec::new()];
            p.last_direction = 1;
        }

        let before = self.sections[second].mesh_segments.first().copied();
        let loop_shape = |t: f64| {
            let t = t * std::f64::consts::TAU / LOOP_LENGTH;
            let dx = if left { 1.0 - t.cos() } else { t.cos() - 1.0 };
            xb + DVec2::new(dx, -t.sin() * (t / 2.0).sin().powi(2))
        };
        let mut ring = self.create_section_at(b, b, LOOP_LENGTH, loop_shape, before, [true, true])?;
        ring.kind = SectionKind::DensifiedCurved;
        self.sections.insert_before(Some(second), ring);

        let first_back = self.sections[first].mesh_segments.last().copied();
        let second_front = self.sections[second].mesh_segments.first().copied();
        let p = &mut self.connection_points[b];
        p.connecting_segments[0].extend(first_back);
        p.connecting_segments[0].extend(second_front);

        self.create_connection_bends();
        tracing::info!(sections = self.sections.len(), "densify2");
        Ok(first)
    }

    /// Merges the section starting at a degree-1/1 point into the section
    /// before it and removes the point. Returns the merged section.
    pub fn dissolve_connection_point(&mut self, point: ConnectionPointId) -> RuffleResult<SectionId> {
        let (prev, next) = self.dissolvable(point)?;
        let removed = self
            .sections
            .remove(next)
            .ok_or_else(|| RuffleError::invariant("dissolved section vanished"))?;
        let merged = &mut self.sections[prev];
        merged.end = removed.end;
        merged.length += removed.length;
        if removed.kind == SectionKind::Outline {
            merged.kind = SectionKind::Outline;
        }
        merged.mesh_segments.extend(removed.mesh_segments);
        self.outline_sections.retain(|o| o.section != next);
        self.connection_points.remove(point);
        self.create_connection_bends();
        Ok(prev)
    }

    /// Checks that `point` can be dissolved and returns the section ending
    /// there and the one starting there.
    fn dissolvable(&self, point: ConnectionPointId) -> RuffleResult<(SectionId, SectionId)> {
        let p = self
            .connection_points
            .get(point)
            .ok_or_else(|| RuffleError::topology("dissolve of an unknown connection point"))?;
        if p.degree() != [1, 1] {
            return Err(RuffleError::topology(format!(
                "dissolve needs a degree 1/1 connection point, found {:?}",
                p.degree()
            )));
        }
        let next = self
            .sections
            .iter()
            .find(|(_, s)| s.start == point)
            .map(|(k, _)| k)
            .ok_or_else(|| RuffleError::topology("no section starts at the dissolved point"))?;
        let prev = self
            .sections
            .prev(next)
            .filter(|&k| self.sections[k].end == point)
            .ok_or_else(|| RuffleError::topology("no section ends at the dissolved point"))?;
        if !self.outline_mergeable(prev, next) {
            return Err(RuffleError::topology(
                "dissolve would break the outline at this point",
            ));
        }
        Ok((prev, next))
    }

    /// Two sections can merge if both or neither are on the outline, walked
    /// in the same direction.
    fn outline_mergeable(&self, prev: SectionId, next: SectionId) -> bool {
        let find = |s: SectionId| self.outline_sections.iter().find(|o| o.section == s);
        match (find(prev), find(next)) {
            (None, None) => true,
            (Some(a), Some(b)) => a.reversed == b.reversed,
            _ => false,
        }
    }

    /// Removes a section with its mesh segments and interior vertices.
    pub fn delete_section(&mut self, id: SectionId) -> RuffleResult<()> {
        let section = self
            .sections
            .get(id)
            .cloned()
            .ok_or_else(|| RuffleError::topology("delete of an unknown section"))?;
        if let Some((front, back)) = section.boundary_segments() {
            if let Some(p) = self.connection_points.get_mut(section.start) {
                p.remove_segment(front);
            }
            if let Some(p) = self.connection_points.get_mut(section.end) {
                p.remove_segment(back);
            }
        }
        self.remove_section_mesh(&section);
        self.sections.remove(id);
        self.outline_sections.retain(|o| o.section != id);
        self.create_connection_bends();
        Ok(())
    }

    /// Reverts [`Ruffle::densify`]: `id` must be the first of the five
    /// sections it created. The triangle is deleted, the center is dissolved,
    /// and loop ends that densification created by subdividing are
    /// dissolved again. Loop ends that existed before are kept.
    pub fn undensify(&mut self, id: SectionId) -> RuffleResult<SectionId> {
        let mut chain = [id; 5];
        for i in 1..5 {
            chain[i] = self
                .sections
                .next(chain[i - 1])
                .ok_or_else(|| RuffleError::topology("undensify needs five consecutive sections"))?;
        }
        let [s0, s1, s2, s3, s4] = chain.map(|s| self.sections[s].clone());
        let c = s0.end;
        let (a, b) = (s1.end, s2.end);
        let shaped = s1.start == c
            && s2.start == a
            && s3.start == b
            && s3.end == c
            && s4.start == c;
        if !shaped {
            return Err(RuffleError::topology(
                "sections do not form a densified junction",
            ));
        }
        let (Some((s1_front, _)), Some((_, s3_back))) =
            (s1.boundary_segments(), s3.boundary_segments())
        else {
            return Err(RuffleError::invariant("densified section without segments"));
        };
        let center = &self.connection_points[c];
        let remaining = |side: usize| {
            center.connecting_segments[side]
                .iter()
                .filter(|s| **s != s1_front && **s != s3_back)
                .count()
        };
        if remaining(0) != 2 || remaining(1) != 0 {
            return Err(RuffleError::topology(
                "densified center has unexpected connections",
            ));
        }
        if !self.outline_mergeable(chain[0], chain[4]) {
            return Err(RuffleError::topology(
                "outer sections of the junction disagree on the outline",
            ));
        }

        for s in [chain[1], chain[2], chain[3]] {
            self.delete_section(s)?;
        }
        let p = &mut self.connection_points[c];
        if let Some(seg) = p.connecting_segments[0].pop() {
            p.connecting_segments[1].push(seg);
        }
        let merged = self.dissolve_connection_point(c)?;
        for point in [a, b] {
            let created = self.connection_points.get(point).is_some_and(|p| p.loop_end);
            if created && self.dissolvable(point).is_ok() {
                self.dissolve_connection_point(point)?;
            }
        }
        tracing::info!(sections = self.sections.len(), "undensify");
        Ok(merged)
    }

    // --- Helpers ------------------------------------------------------

    fn neighbours(&self, id: SectionId) -> RuffleResult<(SectionId, SectionId)> {
        let prev = self
            .sections
            .prev(id)
            .ok_or_else(|| RuffleError::topology("section has no predecessor"))?;
        let next = self
            .sections
            .next(id)
            .ok_or_else(|| RuffleError::topology("section has no successor"))?;
        Ok((prev, next))
    }

    fn junction(&self, section: &Section) -> RuffleResult<Junction> {
        let x0 = self.point_position(section.start)?;
        let x1 = self.point_position(section.end)?;
        if (x1 - x0).length() < EPSILON {
            return Err(RuffleError::topology("densify of a closed section"));
        }
        let t0 = self.get_tangent(section.start);
        let t1 = self.get_tangent(section.end);
        let tc = (t0 + t1).normalize_or_zero();
        if tc == DVec2::ZERO {
            return Err(RuffleError::topology(
                "junction tangents cancel, cannot place the loop",
            ));
        }
        Ok(Junction {
            start: section.start,
            end: section.end,
            t0,
            t1,
            tc,
        })
    }

    fn find_apex(&self, id: SectionId) -> RuffleResult<ConnectionPointId> {
        let mut ends = HashSet::new();
        let mut cursor = self.sections.next(id);
        while let Some(k) = cursor {
            ends.insert(self.sections[k].end);
            cursor = self.sections.next(k);
        }
        let mut candidates = Vec::new();
        let mut cursor = self.sections.prev(id);
        while let Some(k) = cursor {
            let start = self.sections[k].start;
            if ends.contains(&start) {
                candidates.push(start);
            }
            cursor = self.sections.prev(k);
        }
        match candidates.as_slice() {
            [apex] => Ok(*apex),
            _ => Err(RuffleError::AmbiguousApex {
                candidates: candidates.len(),
            }),
        }
    }

    /// Walks from `from` toward `apex` and picks the loop end for that side.
    fn pick_anchor(
        &self,
        from: SectionId,
        apex: ConnectionPointId,
        walk: Walk,
    ) -> RuffleResult<Anchor> {
        let near = |s: &Section| match walk {
            Walk::Backward => s.start,
            Walk::Forward => s.end,
        };
        let step = |k: SectionId| match walk {
            Walk::Backward => self.sections.prev(k),
            Walk::Forward => self.sections.next(k),
        };

        if near(&self.sections[from]) == apex {
            if self.sections[from].mesh_segments.len() < 2 {
                return Err(RuffleError::topology(
                    "densify3 needs a neighbour with at least two segments",
                ));
            }
            return Ok(Anchor::Subdivide(from));
        }

        let mut path = Vec::new();
        let mut cursor = Some(from);
        while let Some(k) = cursor {
            let s = &self.sections[k];
            path.push((s.length, near(s)));
            if near(s) == apex {
                break;
            }
            cursor = step(k);
        }
        let distance: f64 = path.iter().map(|(len, _)| len).sum();
        let mut walked = 0.0;
        let mut best: Option<(f64, ConnectionPointId)> = None;
        for &(len, point) in &path {
            walked += len;
            let delta = (walked - 0.5 * distance).abs();
            if best.map_or(true, |(d, _)| delta < d) {
                best = Some((delta, point));
            }
        }
        match best {
            Some((_, point)) if point != apex => Ok(Anchor::Existing(point)),
            _ => Err(RuffleError::topology("densify3 found no loop end besides the apex")),
        }
    }

    /// Position and tangent an anchor will have once resolved, without
    /// resolving it.
    fn anchor_frame(&self, anchor: Anchor) -> RuffleResult<(DVec2, DVec2)> {
        match anchor {
            Anchor::Existing(point) => Ok((self.point_position(point)?, self.get_tangent(point))),
            Anchor::Subdivide(id) => {
                let section = self
                    .sections
                    .get(id)
                    .ok_or_else(|| RuffleError::topology("loop end on an unknown section"))?;
                let segments = &section.mesh_segments;
                if segments.len() < 2 {
                    return Err(RuffleError::topology(
                        "loop end needs a section with at least two segments",
                    ));
                }
                let mesh = &self.simulation_mesh;
                let ends = |s: SegmentId| {
                    mesh.segment(s)
                        .map(|seg| (seg.start, seg.end))
                        .ok_or_else(|| RuffleError::invariant("section references a removed segment"))
                };
                let split = segments.len() / 2;
                let (before, after) = (ends(segments[split - 1])?, ends(segments[split])?);
                let dir = |(s, e)| (mesh.get_vertex_position(e) - mesh.get_vertex_position(s)).normalize_or_zero();
                let tangent = (0.5 * (dir(before) + dir(after))).normalize_or_zero();
                Ok((mesh.get_vertex_position(after.0), tangent))
            }
        }
    }

    fn resolve_anchor(&mut self, anchor: Anchor) -> RuffleResult<ConnectionPointId> {
        match anchor {
            Anchor::Existing(point) => Ok(point),
            Anchor::Subdivide(section) => {
                let first = self.subdivide(section)?;
                let point = self.sections[first].end;
                self.connection_points[point].loop_end = true;
                Ok(point)
            }
        }
    }

    /// Replaces section `id` by the five-section loop through a new center
    /// point and the anchors `a` and `b`.
    fn replace_junction(
        &mut self,
        id: SectionId,
        junction: Junction,
        a: Anchor,
        b: Anchor,
        outer_kinds: [SectionKind; 2],
    ) -> RuffleResult<SectionId> {
        let Junction {
            start,
            end,
            t0,
            t1,
            tc,
        } = junction;
        let section = self
            .sections
            .get(id)
            .cloned()
            .ok_or_else(|| RuffleError::topology("densify of an unknown section"))?;
        let (old_front, old_back) = section
            .boundary_segments()
            .ok_or_else(|| RuffleError::invariant("densified section without segments"))?;

        // all five curves are laid out before the ruffle is touched
        let x0 = self.point_position(start)?;
        let x1 = self.point_position(end)?;
        let xc = 0.5 * (x0 + x1);
        let (xa, ta) = self.anchor_frame(a)?;
        let ta = -ta;
        let (xb, tb) = self.anchor_frame(b)?;
        let outer = TANGENT_CHORD_RATIO * (x1 - x0).length();
        let middle = TANGENT_CHORD_RATIO * 0.5 * ((xa - xc).length() + (xb - xc).length());
        let inner = TANGENT_CHORD_RATIO * (xa - xb).length();
        let curves = [
            loop_curve(x0, xc, -outer * t0, -outer * tc)?,
            loop_curve(xc, xa, middle * tc, -middle * ta)?,
            loop_curve(xa, xb, inner * ta, inner * tb)?,
            loop_curve(xb, xc, -middle * tb, middle * tc)?,
            loop_curve(xc, x1, -outer * tc, -outer * t1)?,
        ];

        self.simulation_mesh.clear_air_mesh();
        let c = self.push_connection_point(xc, false);
        let a = self.resolve_anchor(a)?;
        let b = self.resolve_anchor(b)?;
        let [mut s0, mut s1, mut s2, mut s3, mut s4] = {
            let ends = [(start, c), (c, a), (a, b), (b, c), (c, end)];
            let mut built = Vec::with_capacity(5);
            for ((p, q), curve) in ends.into_iter().zip(&curves) {
                let sampled = |s: f64| curve.point_at(s);
                built.push(self.create_section_at(
                    p,
                    q,
                    curve.length(),
                    sampled,
                    Some(old_front),
                    [false, false],
                )?);
            }
            <[Section; 5]>::try_from(built)
                .map_err(|_| RuffleError::invariant("densify built the wrong number of sections"))?
        };
        s0.kind = outer_kinds[0];
        s4.kind = outer_kinds[1];
        s1.kind = SectionKind::DensifiedStraight;
        s3.kind = SectionKind::DensifiedStraight;
        s2.kind = SectionKind::DensifiedCurved;

        let ends = |s: &Section| s.boundary_segments().map_or([None, None], |(f, l)| [Some(f), Some(l)]);
        let [s0_front, s0_back] = ends(&s0);
        let [s1_front, s1_back] = ends(&s1);
        let [s2_front, s2_back] = ends(&s2);
        let [s3_front, s3_back] = ends(&s3);
        let [s4_front, s4_back] = ends(&s4);

        let center = &mut self.connection_points[c];
        center.connecting_segments = [
            s0_back.into_iter().chain(s4_front).collect(),
            s1_front.into_iter().chain(s3_back).collect(),
        ];
        center.last_direction = 0;
        let p = &mut self.connection_points[a];
        p.connecting_segments[1].extend(s1_back);
        p.connecting_segments[0].extend(s2_front);
        let p = &mut self.connection_points[b];
        p.connecting_segments[1].extend(s2_back);
        p.connecting_segments[0].extend(s3_front);
        if let (Some(p), Some(new)) = (self.connection_points.get_mut(start), s0_front) {
            p.replace_segment(old_front, new);
        }
        if let (Some(p), Some(new)) = (self.connection_points.get_mut(end), s4_back) {
            p.replace_segment(old_back, new);
        }

        let ids = [s0, s1, s2, s3, s4].map(|s| self.sections.insert_before(Some(id), s));
        self.remove_section_mesh(&section);
        self.splice_outline(id, &[ids[0], ids[4]]);
        self.sections.remove(id);
        self.create_connection_bends();
        self.simulation_mesh.clear_air_mesh();
        debug_assert!(self.verify().is_ok(), "densify broke the ruffle: {:?}", self.verify());
        tracing::info!(sections = self.sections.len(), "densify");
        Ok(ids[0])
    }

    /// Replaces the outline entry of `old` by `replacement`, keeping the
    /// traversal direction.
    fn splice_outline(&mut self, old: SectionId, replacement: &[SectionId]) {
        let Some(index) = self.outline_sections.iter().position(|o| o.section == old) else {
            return;
        };
        let reversed = self.outline_sections[index].reversed;
        let mut entries: Vec<_> = replacement
            .iter()
            .map(|&s| OutlineSection::new(s, reversed))
            .collect();
        if reversed {
            entries.reverse();
        }
        self.outline_sections.splice(index..=index, entries);
    }

    /// Removes a section's segments and the vertices strictly inside it,
    /// then compacts the mesh.
    fn remove_section_mesh(&mut self, section: &Section) {
        for (i, &s) in section.mesh_segments.iter().enumerate() {
            if i > 0 {
                if let Some(start) = self.simulation_mesh.segment(s).map(|seg| seg.start) {
                    self.simulation_mesh.remove_vertex(start);
                }
            }
            self.simulation_mesh.remove_segment(s);
        }
        self.simulation_mesh.cleanup();
    }
}

#[derive(Debug, Clone, Copy)]
enum Walk {
    Backward,
    Forward,
}

/// Arclength table of one loop section, rejecting curves with no usable length.
fn loop_curve(start: DVec2, end: DVec2, ta: DVec2, tb: DVec2) -> RuffleResult<ArcLengthTable> {
    let table = ArcLengthTable::new(CubicBezier::new(start, end, ta, tb), BEZIER_SAMPLES);
    let length = table.length();
    if !(length > 0.0 && length.is_finite()) {
        return Err(RuffleError::topology(format!(
            "densified loop would contain a section of length {length}"
        )));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undensify_checks_outline_before_deleting() {
        let mut ruffle = Ruffle::create_ruffle_stack(1, 5.0, 3.0, 0.5).expect("stack");
        let junction = ruffle.sections.keys().nth(1).expect("junction");
        let s0 = ruffle.densify(junction).expect("densify");
        let s4 = (0..4)
            .try_fold(s0, |s, _| ruffle.sections.next(s))
            .expect("five sections");
        ruffle.outline_sections.retain(|o| o.section != s4);
        let counts = |r: &Ruffle| {
            (
                r.sections.len(),
                r.connection_points.len(),
                r.simulation_mesh.segment_count(),
            )
        };
        let before = counts(&ruffle);

        assert!(ruffle.undensify(s0).is_err());
        assert_eq!(counts(&ruffle), before);
        assert!(ruffle.sections.contains(s0));
    }

    #[test]
    fn loop_curve_rejects_degenerate_sections() {
        let p = DVec2::new(1.0, 2.0);
        assert!(loop_curve(p, p, DVec2::ZERO, DVec2::ZERO).is_err());
        assert!(loop_curve(p, DVec2::new(f64::NAN, 0.0), DVec2::X, DVec2::X).is_err());
        let table = loop_curve(DVec2::ZERO, DVec2::X, DVec2::ZERO, DVec2::ZERO).expect("line");
        assert!((table.length() - 1.0).abs() < 1e-9);
    }
}
