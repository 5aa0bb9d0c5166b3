//! Ruffle constructors: vertical and horizontal stacks, and stacks laid out
//! along a guide polyline inside a target outline.

use std::f64::consts::PI;

use glam::DVec2;
use ruffles_types::{ConnectionPointId, RuffleError, RuffleResult, SectionId};

use crate::elements::{OutlineSection, SectionKind};
use crate::ruffle::Ruffle;

/// Distance queries against a target outline.
pub trait Raycast {
    /// Distance from `origin` along `direction` to the nearest outline
    /// edge, `f64::INFINITY` when nothing is hit.
    fn raycast(&self, origin: DVec2, direction: DVec2) -> f64;
}

/// Sample spacing as a fraction of the local target width.
const HEIGHT_WIDTH_RATIO: f64 = 0.5;
/// Rung width as a fraction of the local half-widths.
const INNER_WIDTH_RATIO: f64 = 0.6;
const OUTER_CONTROL_RATIO: f64 = 0.8;
const INNER_CONTROL_RATIO: f64 = 0.4;

fn check_dimensions(steps: usize, height: f64, width: f64, h: f64) -> RuffleResult<()> {
    if steps == 0 {
        return Err(RuffleError::InvalidInput("a stack needs at least one step".into()));
    }
    for (name, value) in [("height", height), ("width", width), ("h", h)] {
        if !(value > 0.0 && value.is_finite()) {
            return Err(RuffleError::InvalidInput(format!("{name} must be positive, got {value}")));
        }
    }
    Ok(())
}

/// Builds the outline from the right-hand run (forward) followed by the
/// left-hand run walked back.
fn close_outline(right: Vec<SectionId>, left: Vec<SectionId>) -> Vec<OutlineSection> {
    right
        .into_iter()
        .map(|s| OutlineSection::new(s, false))
        .chain(left.into_iter().rev().map(|s| OutlineSection::new(s, true)))
        .collect()
}

impl Ruffle {
    /// Vertical stack of `steps` pleats, each `height` tall and `width`
    /// wide, standing on the floor with the bottom-left corner pinned.
    ///
    /// Every step adds a semicircle on the right, a diagonal, a semicircle
    /// on the left and a top rung.
    pub fn create_ruffle_stack(steps: usize, height: f64, width: f64, h: f64) -> RuffleResult<Self> {
        check_dimensions(steps, height, width, h)?;
        let mut res = Ruffle::new(h);
        let diagonal = width.hypot(height);
        let semicircle = 0.5 * PI * height;
        let r = 0.5 * height;

        let mut bl = res.push_connection_point(DVec2::ZERO, true);
        res.connection_points[bl].last_direction = 1;
        let mut br = res.push_connection_point(DVec2::new(width, 0.0), false);
        res.connection_points[br].last_direction = 1;

        let mut right = Vec::new();
        let mut left = Vec::new();
        let mut bottom = res.create_section(bl, br, width, |s| DVec2::new(s, 0.0))?;
        bottom.kind = SectionKind::Outline;
        right.push(res.push_section(bottom));

        for i in 0..steps {
            let y0 = i as f64 * height;
            let y1 = y0 + height;
            let tl = res.push_connection_point(DVec2::new(0.0, y1), false);
            let tr = res.push_connection_point(DVec2::new(width, y1), false);

            let mut outer_right = res.create_section(br, tr, semicircle, |s| {
                let phi = PI * s / semicircle;
                DVec2::new(width + r * phi.sin(), y0 + r * (1.0 - phi.cos()))
            })?;
            outer_right.kind = SectionKind::Outline;
            right.push(res.push_section(outer_right));

            let mut cross = res.create_section(tr, bl, diagonal, |s| {
                let a = 1.0 - s / diagonal;
                DVec2::new(a * width, y0 + a * height)
            })?;
            cross.kind = SectionKind::Interior;
            res.push_section(cross);

            let mut outer_left = res.create_section(bl, tl, semicircle, |s| {
                let phi = PI * s / semicircle;
                DVec2::new(-r * phi.sin(), y0 + r * (1.0 - phi.cos()))
            })?;
            outer_left.kind = SectionKind::Outline;
            left.push(res.push_section(outer_left));

            let mut rung = res.create_section(tl, tr, width, |s| DVec2::new(s, y1))?;
            rung.kind = if i + 1 == steps {
                SectionKind::Outline
            } else {
                SectionKind::Interior
            };
            let rung = res.push_section(rung);
            if i + 1 == steps {
                left.push(rung);
            }

            bl = tl;
            br = tr;
        }
        res.outline_sections = close_outline(right, left);
        res.create_connection_bends();
        res.update_simulation_mesh()?;
        tracing::info!(
            steps,
            sections = res.sections.len(),
            dof = res.simulation_mesh.dof(),
            "ruffle stack created"
        );
        Ok(res)
    }

    /// The stack turned on its side: pleats of `width` follow each other
    /// along x between the heights `0.5 height` and `1.5 height`. The left
    /// end is pinned; the two corner points of degree 1/1 are dissolved.
    pub fn create_horizontal_stack(
        steps: usize,
        height: f64,
        width: f64,
        h: f64,
    ) -> RuffleResult<Self> {
        check_dimensions(steps, height, width, h)?;
        let mut res = Ruffle::new(h);
        let diagonal = width.hypot(height);
        let semicircle = 0.5 * PI * width;
        let r = 0.5 * width;
        let (low, high) = (0.5 * height, 1.5 * height);

        let mut bl = res.push_connection_point(DVec2::new(0.0, low), true);
        res.connection_points[bl].last_direction = 1;
        let mut br = res.push_connection_point(DVec2::new(0.0, high), false);
        let first_br = br;

        let mut right = Vec::new();
        let mut left = Vec::new();
        let start = res.create_section(bl, br, height, |s| DVec2::new(0.0, low + s))?;
        right.push(res.push_section(start));

        for i in 0..steps {
            let x0 = i as f64 * width;
            let x1 = x0 + width;
            let tl = res.push_connection_point(DVec2::new(x1, low), false);
            let tr = res.push_connection_point(DVec2::new(x1, high), false);

            let mut upper = res.create_section(br, tr, semicircle, |s| {
                let phi = PI * s / semicircle;
                DVec2::new(x0 + r * (1.0 - phi.cos()), high + r * phi.sin())
            })?;
            upper.kind = SectionKind::Outline;
            right.push(res.push_section(upper));

            let mut cross = res.create_section(tr, bl, diagonal, |s| {
                let a = 1.0 - s / diagonal;
                DVec2::new(x0 + a * width, low + a * height)
            })?;
            cross.kind = SectionKind::Interior;
            res.push_section(cross);

            let mut lower = res.create_section(bl, tl, semicircle, |s| {
                let phi = PI * s / semicircle;
                DVec2::new(x0 + r * (1.0 - phi.cos()), low - r * phi.sin())
            })?;
            lower.kind = SectionKind::Outline;
            left.push(res.push_section(lower));

            let mut rung = res.create_section(tl, tr, height, |s| DVec2::new(x1, low + s))?;
            rung.kind = if i + 1 == steps {
                SectionKind::Outline
            } else {
                SectionKind::Interior
            };
            let rung = res.push_section(rung);
            if i + 1 == steps {
                left.push(rung);
            }

            bl = tl;
            br = tr;
        }
        res.outline_sections = close_outline(right, left);
        res.dissolve_connection_point(bl)?;
        res.dissolve_connection_point(first_br)?;
        res.create_connection_bends();
        res.update_simulation_mesh()?;
        tracing::info!(steps, sections = res.sections.len(), "horizontal stack created");
        Ok(res)
    }

    /// Lays a stack along the guide polyline `points`, sized to `target`.
    ///
    /// Rungs are placed at spacings proportional to the local target width,
    /// measured by raycasting to both sides of the curve, then rescaled to
    /// cover the whole curve. The first and last rung are pinned.
    pub fn create_stack_along_curve(
        points: &[DVec2],
        target: &dyn Raycast,
        h: f64,
    ) -> RuffleResult<Self> {
        if !(h > 0.0 && h.is_finite()) {
            return Err(RuffleError::InvalidInput(format!("h must be positive, got {h}")));
        }
        let guide = Guide::new(points)?;
        let samples = guide.samples(target)?;
        let mut res = Ruffle::new(h);

        let mut rungs = Vec::with_capacity(samples.len());
        let mut right_run = Vec::new();
        let mut left_run = Vec::new();
        let mut prev: Option<(ConnectionPointId, ConnectionPointId, DVec2)> = None;
        let mut dists = (0.5, 0.5);
        let mut segment = 0;
        for (i, &t) in samples.iter().enumerate() {
            segment = guide.segment_at(t, segment);
            let (xy, normal) = guide.frame(segment, t);
            dists = (
                finite_or(target.raycast(xy, normal), dists.0),
                finite_or(target.raycast(xy, -normal), dists.1),
            );
            let (right_dist, left_dist) = dists;

            let fixed = i == 0 || i + 1 == samples.len();
            let nleft = res.push_connection_point(xy - INNER_WIDTH_RATIO * left_dist * normal, fixed);
            let nright = res.push_connection_point(xy + INNER_WIDTH_RATIO * right_dist * normal, fixed);
            if let Some((left, right, prev_normal)) = prev {
                let rd = (res.point_position(nright)? - res.point_position(right)?).length();
                let ld = (res.point_position(nleft)? - res.point_position(left)?).length();
                let mut outer_right = res.create_bezier_section(
                    right,
                    nright,
                    None,
                    rd * OUTER_CONTROL_RATIO * prev_normal,
                    rd * OUTER_CONTROL_RATIO * normal,
                )?;
                outer_right.kind = SectionKind::Outline;
                right_run.push(res.push_section(outer_right));

                let mut cross = res.create_bezier_section(
                    nright,
                    left,
                    None,
                    -rd * INNER_CONTROL_RATIO * normal,
                    ld * INNER_CONTROL_RATIO * prev_normal,
                )?;
                cross.kind = SectionKind::Interior;
                res.push_section(cross);

                let mut outer_left = res.create_bezier_section(
                    left,
                    nleft,
                    None,
                    -ld * OUTER_CONTROL_RATIO * prev_normal,
                    -ld * OUTER_CONTROL_RATIO * normal,
                )?;
                outer_left.kind = SectionKind::Outline;
                left_run.push(res.push_section(outer_left));
            } else {
                res.connection_points[nleft].last_direction = 1;
                res.connection_points[nright].last_direction = 1;
            }
            let mut rung = res.create_bezier_section(nleft, nright, None, DVec2::ZERO, DVec2::ZERO)?;
            rung.kind = SectionKind::Interior;
            rungs.push(res.push_section(rung));
            prev = Some((nleft, nright, normal));
        }

        if let (Some(&first), Some(&last)) = (rungs.first(), rungs.last()) {
            res.sections[first].kind = SectionKind::Outline;
            res.sections[last].kind = SectionKind::Outline;
            let mut right = vec![first];
            right.extend(right_run);
            left_run.push(last);
            res.outline_sections = close_outline(right, left_run);
        }
        res.create_connection_bends();
        res.update_simulation_mesh()?;
        tracing::info!(
            rungs = rungs.len(),
            mass = res.simulation_mesh.total_mass(),
            "stack laid along curve"
        );
        Ok(res)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Arclength-parameterized guide polyline.
struct Guide<'a> {
    points: &'a [DVec2],
    lengths: Vec<f64>,
}

impl<'a> Guide<'a> {
    fn new(points: &'a [DVec2]) -> RuffleResult<Self> {
        if points.len() < 2 {
            return Err(RuffleError::InvalidInput(
                "guide curve needs at least two points".into(),
            ));
        }
        let lengths: Vec<f64> = points.windows(2).map(|w| (w[1] - w[0]).length()).collect();
        if lengths.iter().any(|l| !(*l > 0.0 && l.is_finite())) {
            return Err(RuffleError::InvalidInput(
                "guide curve has a degenerate segment".into(),
            ));
        }
        Ok(Self { points, lengths })
    }

    fn total_length(&self) -> f64 {
        self.lengths.iter().sum()
    }

    fn segment_start(&self, segment: usize) -> f64 {
        self.lengths[..segment].iter().sum()
    }

    /// Segment containing arclength `t`, searching forward from `from` and
    /// staying on the last segment past the end.
    fn segment_at(&self, t: f64, from: usize) -> usize {
        let mut segment = from;
        let mut start = self.segment_start(segment);
        while segment + 1 < self.lengths.len() && t - start > self.lengths[segment] {
            start += self.lengths[segment];
            segment += 1;
        }
        segment
    }

    /// Point at arclength `t` on `segment` and the right-pointing normal.
    fn frame(&self, segment: usize, t: f64) -> (DVec2, DVec2) {
        let (a, b) = (self.points[segment], self.points[segment + 1]);
        let len = self.lengths[segment];
        let alpha = (t - self.segment_start(segment)) / len;
        let tangent = (b - a) / len;
        (a.lerp(b, alpha), DVec2::new(tangent.y, -tangent.x))
    }

    /// Rung positions: spaced by half the local target width until the
    /// curve leaves the target, then stretched to span the whole curve.
    fn samples(&self, target: &dyn Raycast) -> RuffleResult<Vec<f64>> {
        let mut samples = Vec::new();
        let mut position = 0.0;
        let mut segment = 0;
        let mut start = 0.0;
        while segment < self.lengths.len() {
            let (xy, normal) = self.frame(segment, position);
            let width = (target.raycast(xy, normal) + target.raycast(xy, -normal)).max(1.0);
            if !width.is_finite() {
                break;
            }
            samples.push(position);
            position += HEIGHT_WIDTH_RATIO * width;
            while segment < self.lengths.len() && position - start > self.lengths[segment] {
                start += self.lengths[segment];
                segment += 1;
            }
        }
        let last = samples.last().copied().unwrap_or(0.0);
        if samples.len() < 2 || last <= 0.0 {
            return Err(RuffleError::InvalidInput(
                "guide curve does not cross the target far enough for two rungs".into(),
            ));
        }
        let scale = self.total_length() / last;
        Ok(samples.into_iter().map(|t| t * scale).collect())
    }
}
