//! Connection points, sections and outline entries.

use glam::DVec2;
use ruffles_types::{ConnectionPointId, SectionId, SegmentId, VertexId};
use serde::{Deserialize, Serialize};

/// A junction where sections meet, pinned to one mesh vertex.
///
/// The segments touching the point are split into two sides; bends are
/// only formed between segments on opposite sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPoint {
    /// Position at creation time.
    pub position: DVec2,
    pub mesh_vertex: VertexId,
    pub connecting_segments: [Vec<SegmentId>; 2],
    /// Side that receives the next section ending here.
    pub last_direction: usize,
    /// Created by densification as an end of the inner loop section.
    #[serde(default)]
    pub loop_end: bool,
}

impl ConnectionPoint {
    pub fn new(position: DVec2, mesh_vertex: VertexId) -> Self {
        Self {
            position,
            mesh_vertex,
            connecting_segments: [Vec::new(), Vec::new()],
            last_direction: 0,
            loop_end: false,
        }
    }

    /// Number of connecting segments per side.
    pub fn degree(&self) -> [usize; 2] {
        [
            self.connecting_segments[0].len(),
            self.connecting_segments[1].len(),
        ]
    }

    pub fn connects(&self, segment: SegmentId) -> bool {
        self.connecting_segments.iter().any(|side| side.contains(&segment))
    }

    /// Replaces every occurrence of `old` by `new` on both sides.
    pub(crate) fn replace_segment(&mut self, old: SegmentId, new: SegmentId) {
        for side in &mut self.connecting_segments {
            for s in side.iter_mut().filter(|s| **s == old) {
                *s = new;
            }
        }
    }

    /// Removes every occurrence of `segment` on both sides.
    pub(crate) fn remove_segment(&mut self, segment: SegmentId) {
        for side in &mut self.connecting_segments {
            side.retain(|s| *s != segment);
        }
    }
}

/// Role of a section, read by the shape optimizer to pick what to grow or shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionKind {
    /// Unknown role, left alone by the optimizer.
    #[default]
    Regular,
    /// Part of the outline.
    Outline,
    /// Interior section created by a constructor.
    Interior,
    /// One of the two near-straight sections of a densified junction.
    DensifiedStraight,
    /// The curved inner section of a densified junction.
    DensifiedCurved,
}

/// A run of mesh segments between two connection points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub start: ConnectionPointId,
    pub end: ConnectionPointId,
    /// Rest length, distributed evenly over the segments.
    pub length: f64,
    pub kind: SectionKind,
    pub mesh_segments: Vec<SegmentId>,
}

impl Section {
    pub fn new(start: ConnectionPointId, end: ConnectionPointId, length: f64) -> Self {
        Self {
            start,
            end,
            length,
            kind: SectionKind::Regular,
            mesh_segments: Vec::new(),
        }
    }

    /// First and last mesh segment.
    pub fn boundary_segments(&self) -> Option<(SegmentId, SegmentId)> {
        Some((*self.mesh_segments.first()?, *self.mesh_segments.last()?))
    }
}

/// A section traversed as part of the outline loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub section: SectionId,
    /// Traversed from `end` to `start`.
    pub reversed: bool,
}

impl OutlineSection {
    pub fn new(section: SectionId, reversed: bool) -> Self {
        Self { section, reversed }
    }

    /// Connection point where the traversal enters the section.
    pub fn start(&self, section: &Section) -> ConnectionPointId {
        if self.reversed {
            section.end
        } else {
            section.start
        }
    }

    /// Connection point where the traversal leaves the section.
    pub fn end(&self, section: &Section) -> ConnectionPointId {
        if self.reversed {
            section.start
        } else {
            section.end
        }
    }
}
