//! Constrained triangulation with edge flips and in-place edge splits.
//!
//! The triangulation is built inside a large enclosing triangle whose three
//! corners play the role of the point at infinity: every triangle touching
//! one of them belongs to the outer face. Each triangle stores its vertices
//! counter-clockwise, the neighbour across the edge opposite each vertex,
//! and a constraint flag for that edge.
//!
//! Construction is incremental (point location, split, Lawson flips) followed
//! by constraint recovery through flips of the crossing edges. Points are
//! located by walking from the last insertion, and edges are found by
//! rotating around an endpoint, starting from an incident triangle kept per
//! vertex.

use std::collections::{HashMap, VecDeque};

use glam::DVec2;
use ruffles_geometry::predicates::{in_circle, is_convex_quad, orient2d, segments_cross};
use ruffles_geometry::Orientation;

/// First vertex id of the outer corners; ids at or above it are outer.
pub const OUTER_BASE: usize = usize::MAX - 2;

/// Returns true if `v` is one of the outer corners.
#[inline]
pub fn is_outer(v: usize) -> bool {
    v >= OUTER_BASE
}

/// One triangle of the triangulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Vertex ids, counter-clockwise.
    pub vertices: [usize; 3],
    /// Neighbour across the edge opposite `vertices[i]`.
    pub neighbors: [Option<usize>; 3],
    /// Constraint flag of the edge opposite `vertices[i]`.
    pub constrained: [bool; 3],
}

impl Triangle {
    fn new(vertices: [usize; 3]) -> Self {
        Self {
            vertices,
            neighbors: [None; 3],
            constrained: [false; 3],
        }
    }

    /// Endpoints of the edge opposite `vertices[i]`, in counter-clockwise order.
    #[inline]
    pub fn edge(&self, i: usize) -> (usize, usize) {
        (self.vertices[(i + 1) % 3], self.vertices[(i + 2) % 3])
    }

    /// True if no vertex is an outer corner.
    pub fn is_finite(&self) -> bool {
        !self.vertices.iter().any(|&v| is_outer(v))
    }

    fn index_of_neighbor(&self, t: usize) -> Option<usize> {
        self.neighbors.iter().position(|&n| n == Some(t))
    }
}

enum Location {
    Inside(usize),
    OnEdge(usize, usize),
    OnVertex,
    Outside,
}

/// A triangulation of a point set with constrained edges.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    pub(crate) triangles: Vec<Triangle>,
    outer: [DVec2; 3],
    /// Some triangle containing each vertex.
    incident: HashMap<usize, usize>,
    /// Where the next point location starts.
    last: usize,
}

impl Triangulation {
    /// Triangulates `points` and recovers every `(a, b)` constraint as an edge.
    ///
    /// Non-finite and duplicate points are left out of the triangulation.
    pub fn build(points: &[DVec2], constraints: &[(usize, usize)]) -> Self {
        let finite: Vec<DVec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
        if finite.is_empty() {
            return Self::default();
        }
        let (lo, hi) = finite
            .iter()
            .fold((finite[0], finite[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let center = 0.5 * (lo + hi);
        let extent = (hi - lo).max_element().max(1.0);
        let outer = [
            center + extent * DVec2::new(-40.0, -20.0),
            center + extent * DVec2::new(40.0, -20.0),
            center + extent * DVec2::new(0.0, 40.0),
        ];

        let mut tri = Self {
            outer,
            ..Self::default()
        };
        tri.put(0, Triangle::new([OUTER_BASE, OUTER_BASE + 1, OUTER_BASE + 2]));

        let mut inserted = vec![false; points.len()];
        for (v, p) in points.iter().enumerate() {
            if p.is_finite() {
                inserted[v] = tri.insert_point(points, v);
            }
        }
        for &(a, b) in constraints {
            if a != b && inserted.get(a) == Some(&true) && inserted.get(b) == Some(&true) {
                tri.insert_constraint(points, a, b);
            }
        }
        tri
    }

    /// True if nothing has been triangulated.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Vertex triples of all triangles not touching the outer face.
    pub fn finite_triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triangles
            .iter()
            .filter(|t| t.is_finite())
            .map(|t| t.vertices)
    }

    #[inline]
    fn position(&self, points: &[DVec2], v: usize) -> DVec2 {
        if is_outer(v) {
            self.outer[v - OUTER_BASE]
        } else {
            points[v]
        }
    }

    /// Stores `tri` at index `t` (appending when `t` is one past the end)
    /// and records it as incident to its vertices.
    fn put(&mut self, t: usize, tri: Triangle) {
        for &v in &tri.vertices {
            self.incident.insert(v, t);
        }
        if t == self.triangles.len() {
            self.triangles.push(tri);
        } else {
            self.triangles[t] = tri;
        }
    }

    fn rebuild_incidence(&mut self) {
        self.incident.clear();
        for (t, tri) in self.triangles.iter().enumerate() {
            for &v in &tri.vertices {
                self.incident.insert(v, t);
            }
        }
    }

    /// Orientation of `p` against the edge opposite each vertex of `t`.
    fn orientations(&self, points: &[DVec2], t: usize, p: DVec2) -> [Orientation; 3] {
        let [a, b, c] = self.triangles[t].vertices.map(|v| self.position(points, v));
        [orient2d(b, c, p), orient2d(c, a, p), orient2d(a, b, p)]
    }

    fn classify(t: usize, orient: [Orientation; 3]) -> Location {
        let collinear: Vec<usize> = (0..3)
            .filter(|&i| orient[i] == Orientation::Collinear)
            .collect();
        match collinear.len() {
            0 => Location::Inside(t),
            1 => Location::OnEdge(t, collinear[0]),
            _ => Location::OnVertex,
        }
    }

    /// Visibility walk from the last located triangle. Falls back to a scan
    /// if the walk does not settle within one step per triangle.
    fn locate(&self, points: &[DVec2], p: DVec2) -> Location {
        if self.triangles.is_empty() {
            return Location::Outside;
        }
        let mut t = self.last.min(self.triangles.len() - 1);
        for _ in 0..self.triangles.len() {
            let orient = self.orientations(points, t, p);
            match (0..3).find(|&i| orient[i] == Orientation::Clockwise) {
                None => return Self::classify(t, orient),
                Some(i) => match self.triangles[t].neighbors[i] {
                    Some(u) => t = u,
                    None => return Location::Outside,
                },
            }
        }
        tracing::debug!("point location walk did not settle, scanning");
        self.locate_by_scan(points, p)
    }

    fn locate_by_scan(&self, points: &[DVec2], p: DVec2) -> Location {
        for t in (0..self.triangles.len()).rev() {
            let orient = self.orientations(points, t, p);
            if !orient.contains(&Orientation::Clockwise) {
                return Self::classify(t, orient);
            }
        }
        Location::Outside
    }

    fn insert_point(&mut self, points: &[DVec2], v: usize) -> bool {
        let p = points[v];
        let mut stack = Vec::new();
        match self.locate(points, p) {
            Location::Inside(t) => {
                let [a, b, c] = self.triangles[t].vertices;
                let [na, nb, nc] = self.triangles[t].neighbors;
                let [ca, cb, cc] = self.triangles[t].constrained;
                let t1 = self.triangles.len();
                let t2 = t1 + 1;
                self.put(
                    t,
                    Triangle {
                        vertices: [v, b, c],
                        neighbors: [na, Some(t1), Some(t2)],
                        constrained: [ca, false, false],
                    },
                );
                self.put(
                    t1,
                    Triangle {
                        vertices: [v, c, a],
                        neighbors: [nb, Some(t2), Some(t)],
                        constrained: [cb, false, false],
                    },
                );
                self.put(
                    t2,
                    Triangle {
                        vertices: [v, a, b],
                        neighbors: [nc, Some(t), Some(t1)],
                        constrained: [cc, false, false],
                    },
                );
                self.last = t;
                self.replace_neighbor(nb, t, t1);
                self.replace_neighbor(nc, t, t2);
                stack.extend([(t, 0), (t1, 0), (t2, 0)]);
            }
            Location::OnEdge(t, i) => match self.split_at(t, i, v) {
                Some(parts) => {
                    self.last = t;
                    stack.extend(parts);
                }
                None => return false,
            },
            Location::OnVertex => {
                tracing::debug!(vertex = v, "duplicate air-mesh vertex left out");
                return false;
            }
            Location::Outside => return false,
        }
        self.legalize(points, stack);
        true
    }

    /// Lawson flips around freshly inserted vertices. Each stack entry is a
    /// triangle and the index of the new vertex in it.
    fn legalize(&mut self, points: &[DVec2], mut stack: Vec<(usize, usize)>) {
        while let Some((t, i)) = stack.pop() {
            let Some((u, j)) = self.opposite(t, i) else {
                continue;
            };
            if self.triangles[t].constrained[i] {
                continue;
            }
            let p = self.triangles[t].vertices[i];
            let (q, r) = self.triangles[t].edge(i);
            let d = self.triangles[u].vertices[j];
            let (pp, pq, pr, pd) = (
                self.position(points, p),
                self.position(points, q),
                self.position(points, r),
                self.position(points, d),
            );
            if in_circle(pp, pq, pr, pd) > 0.0 && is_convex_quad(pp, pq, pd, pr) {
                let (t1, t2) = self.flip(t, i);
                stack.push((t1, 0));
                stack.push((t2, 0));
            }
        }
    }

    /// The triangle across the edge opposite `vertices[i]` of `t`, and the
    /// index of its vertex opposite that edge.
    pub fn opposite(&self, t: usize, i: usize) -> Option<(usize, usize)> {
        let u = self.triangles[t].neighbors[i]?;
        let j = self.triangles[u].index_of_neighbor(t)?;
        Some((u, j))
    }

    fn replace_neighbor(&mut self, tri: Option<usize>, old: usize, new: usize) {
        if let Some(x) = tri {
            if let Some(k) = self.triangles[x].index_of_neighbor(old) {
                self.triangles[x].neighbors[k] = Some(new);
            }
        }
    }

    /// Flips the edge opposite `vertices[i]` of `t`.
    ///
    /// With `t = (p, q, r)` and the neighbour `u = (d, r, q)`, the result is
    /// `t = (p, q, d)` and `u = (p, d, r)`; both indices are returned. The
    /// caller is responsible for convexity of `p, q, d, r`.
    pub fn flip(&mut self, t: usize, i: usize) -> (usize, usize) {
        let Some((u, j)) = self.opposite(t, i) else {
            return (t, t);
        };
        let p = self.triangles[t].vertices[i];
        let (q, r) = self.triangles[t].edge(i);
        let d = self.triangles[u].vertices[j];

        let n_rp = self.triangles[t].neighbors[(i + 1) % 3];
        let n_pq = self.triangles[t].neighbors[(i + 2) % 3];
        let c_rp = self.triangles[t].constrained[(i + 1) % 3];
        let c_pq = self.triangles[t].constrained[(i + 2) % 3];
        let n_qd = self.triangles[u].neighbors[(j + 1) % 3];
        let n_dr = self.triangles[u].neighbors[(j + 2) % 3];
        let c_qd = self.triangles[u].constrained[(j + 1) % 3];
        let c_dr = self.triangles[u].constrained[(j + 2) % 3];

        self.put(
            t,
            Triangle {
                vertices: [p, q, d],
                neighbors: [n_qd, Some(u), n_pq],
                constrained: [c_qd, false, c_pq],
            },
        );
        self.put(
            u,
            Triangle {
                vertices: [p, d, r],
                neighbors: [n_dr, n_rp, Some(t)],
                constrained: [c_dr, c_rp, false],
            },
        );
        self.replace_neighbor(n_qd, u, t);
        self.replace_neighbor(n_rp, t, u);
        (t, u)
    }

    /// Splits the edge opposite `vertices[i]` of `t` at the new vertex `m`.
    /// Returns the four resulting triangles with the index of `m` in each.
    fn split_at(&mut self, t: usize, i: usize, m: usize) -> Option<[(usize, usize); 4]> {
        let (u, j) = self.opposite(t, i)?;
        let p = self.triangles[t].vertices[i];
        let (q, r) = self.triangles[t].edge(i);
        let d = self.triangles[u].vertices[j];
        let c_qr = self.triangles[t].constrained[i];

        let n_rp = self.triangles[t].neighbors[(i + 1) % 3];
        let n_pq = self.triangles[t].neighbors[(i + 2) % 3];
        let c_rp = self.triangles[t].constrained[(i + 1) % 3];
        let c_pq = self.triangles[t].constrained[(i + 2) % 3];
        let n_qd = self.triangles[u].neighbors[(j + 1) % 3];
        let n_dr = self.triangles[u].neighbors[(j + 2) % 3];
        let c_qd = self.triangles[u].constrained[(j + 1) % 3];
        let c_dr = self.triangles[u].constrained[(j + 2) % 3];

        let t2 = self.triangles.len();
        let u2 = t2 + 1;
        self.put(
            t,
            Triangle {
                vertices: [p, q, m],
                neighbors: [Some(u2), Some(t2), n_pq],
                constrained: [c_qr, false, c_pq],
            },
        );
        self.put(
            u,
            Triangle {
                vertices: [d, r, m],
                neighbors: [Some(t2), Some(u2), n_dr],
                constrained: [c_qr, false, c_dr],
            },
        );
        self.put(
            t2,
            Triangle {
                vertices: [p, m, r],
                neighbors: [Some(u), n_rp, Some(t)],
                constrained: [c_qr, c_rp, false],
            },
        );
        self.put(
            u2,
            Triangle {
                vertices: [d, m, q],
                neighbors: [Some(t), n_qd, Some(u)],
                constrained: [c_qr, c_qd, false],
            },
        );
        self.replace_neighbor(n_rp, t, t2);
        self.replace_neighbor(n_qd, u, u2);
        Some([(t, 2), (t2, 1), (u, 2), (u2, 1)])
    }

    /// Inserts vertex `m` into the existing edge `ab`, keeping the
    /// constraint flag on both halves. Returns false if `ab` is not an edge.
    pub fn split_edge(&mut self, a: usize, b: usize, m: usize) -> bool {
        match self.find_edge(a, b) {
            Some((t, i)) => self.split_at(t, i, m).is_some(),
            None => false,
        }
    }

    /// Locates the edge between `a` and `b` in either orientation.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<(usize, usize)> {
        let edge_in = |t: usize| {
            let tri = &self.triangles[t];
            (0..3)
                .find(|&i| {
                    let (q, r) = tri.edge(i);
                    (q == a && r == b) || (q == b && r == a)
                })
                .map(|i| (t, i))
        };
        match self.fan(a) {
            Some(fan) => fan.into_iter().find_map(edge_in),
            None => (0..self.triangles.len()).find_map(edge_in),
        }
    }

    /// Triangles around vertex `v`, rotating from its incident triangle.
    /// `None` if `v` is unknown or the incidence entry is stale.
    pub fn fan(&self, v: usize) -> Option<Vec<usize>> {
        let start = *self.incident.get(&v)?;
        let k0 = self.triangles.get(start)?.vertices.iter().position(|&w| w == v)?;
        let mut fan = vec![start];
        // one way round; if the fan is open at the outer boundary, the other way too
        for turn in [1, 2] {
            let (mut t, mut k) = (start, k0);
            while let Some(u) = self.triangles[t].neighbors[(k + turn) % 3] {
                if u == start {
                    return Some(fan);
                }
                if fan.len() > self.triangles.len() {
                    return None;
                }
                k = self.triangles[u].vertices.iter().position(|&w| w == v)?;
                fan.push(u);
                t = u;
            }
        }
        Some(fan)
    }

    fn set_constrained(&mut self, t: usize, i: usize, value: bool) {
        self.triangles[t].constrained[i] = value;
        if let Some((u, j)) = self.opposite(t, i) {
            self.triangles[u].constrained[j] = value;
        }
    }

    /// True if the edge between `a` and `b` exists and is constrained.
    pub fn is_constrained(&self, a: usize, b: usize) -> bool {
        self.find_edge(a, b)
            .map(|(t, i)| self.triangles[t].constrained[i])
            .unwrap_or(false)
    }

    fn insert_constraint(&mut self, points: &[DVec2], a: usize, b: usize) -> bool {
        if let Some((t, i)) = self.find_edge(a, b) {
            self.set_constrained(t, i, true);
            return true;
        }
        let (pa, pb) = (points[a], points[b]);

        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        for (t, tri) in self.triangles.iter().enumerate() {
            for i in 0..3 {
                if tri.neighbors[i].map_or(true, |u| u < t) {
                    continue;
                }
                let (q, r) = tri.edge(i);
                if q == a || q == b || r == a || r == b {
                    continue;
                }
                if segments_cross(pa, pb, self.position(points, q), self.position(points, r)) {
                    queue.push_back((q, r));
                }
            }
        }

        let limit = 1000 + 100 * (queue.len() + 1) * (queue.len() + 1);
        let mut iterations = 0;
        while let Some((q, r)) = queue.pop_front() {
            iterations += 1;
            if iterations > limit {
                tracing::warn!(a, b, "constraint recovery did not finish");
                break;
            }
            let Some((t, i)) = self.find_edge(q, r) else {
                continue;
            };
            if self.triangles[t].constrained[i] {
                tracing::warn!(a, b, q, r, "constraint crosses another constraint");
                return false;
            }
            let Some((u, j)) = self.opposite(t, i) else {
                continue;
            };
            let p = self.triangles[t].vertices[i];
            let d = self.triangles[u].vertices[j];
            let (pp, pq, pr, pd) = (
                self.position(points, p),
                self.position(points, q),
                self.position(points, r),
                self.position(points, d),
            );
            if is_convex_quad(pp, pq, pd, pr) {
                self.flip(t, i);
                let touches = p == a || p == b || d == a || d == b;
                if !touches && segments_cross(pa, pb, pp, pd) {
                    queue.push_back((p, d));
                }
            } else {
                queue.push_back((q, r));
            }
        }

        match self.find_edge(a, b) {
            Some((t, i)) => {
                self.set_constrained(t, i, true);
                true
            }
            None => {
                tracing::warn!(a, b, "constraint edge could not be recovered");
                false
            }
        }
    }

    /// Renumbers real vertices through `map`; outer corners are untouched.
    pub fn remap_vertices(&mut self, map: impl Fn(usize) -> usize) {
        for tri in &mut self.triangles {
            for v in &mut tri.vertices {
                if !is_outer(*v) {
                    *v = map(*v);
                }
            }
        }
        self.rebuild_incidence();
    }

    /// Checks neighbour symmetry and shared-edge consistency.
    pub fn is_consistent(&self) -> bool {
        self.triangles.iter().enumerate().all(|(t, tri)| {
            (0..3).all(|i| match tri.neighbors[i] {
                None => true,
                Some(u) => match self.opposite(t, i) {
                    Some((u2, j)) if u2 == u => {
                        let (q, r) = tri.edge(i);
                        let (s, w) = self.triangles[u].edge(j);
                        q == w && r == s && tri.constrained[i] == self.triangles[u].constrained[j]
                    }
                    _ => false,
                },
            })
        })
    }
}
