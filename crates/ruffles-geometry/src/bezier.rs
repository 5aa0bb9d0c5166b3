//! Cubic Bézier curves re-parametrized by arclength.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A cubic Bézier given by its end points and end tangents.
///
/// The inner control points are `start + start_tangent` and
/// `end + end_tangent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: DVec2,
    pub start_tangent: DVec2,
    pub end_tangent: DVec2,
    pub end: DVec2,
}

impl CubicBezier {
    pub fn new(start: DVec2, end: DVec2, start_tangent: DVec2, end_tangent: DVec2) -> Self {
        Self {
            start,
            start_tangent,
            end_tangent,
            end,
        }
    }

    /// Evaluates the curve at `t ∈ [0, 1]`.
    pub fn eval(&self, t: f64) -> DVec2 {
        let s = 1.0 - t;
        s * s * s * self.start
            + 3.0 * s * s * t * (self.start + self.start_tangent)
            + 3.0 * s * t * t * (self.end + self.end_tangent)
            + t * t * t * self.end
    }
}

/// Cumulative chord lengths of a curve sampled at uniform parameters.
///
/// Lookups invert the table with a binary search and interpolate the
/// parameter linearly inside the bracketing sample interval.
#[derive(Debug, Clone)]
pub struct ArcLengthTable {
    curve: CubicBezier,
    cumulative: Vec<f64>,
    dt: f64,
}

impl ArcLengthTable {
    /// Samples `curve` at `samples` uniform parameters (at least 2).
    pub fn new(curve: CubicBezier, samples: usize) -> Self {
        let samples = samples.max(2);
        let dt = 1.0 / (samples - 1) as f64;
        let mut cumulative = Vec::with_capacity(samples);
        cumulative.push(0.0);
        let mut last = curve.eval(0.0);
        let mut length = 0.0;
        for i in 1..samples {
            let pos = curve.eval(i as f64 * dt);
            length += (pos - last).length();
            cumulative.push(length);
            last = pos;
        }
        Self {
            curve,
            cumulative,
            dt,
        }
    }

    /// Approximate total arclength.
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point at arclength `s` from the start; clamps outside `[0, length]`.
    pub fn point_at(&self, s: f64) -> DVec2 {
        // first sample strictly greater than `s`
        let index = self.cumulative.partition_point(|&c| c <= s);
        if index == 0 {
            return self.curve.eval(0.0);
        }
        if index == self.cumulative.len() {
            return self.curve.eval(1.0);
        }
        let lo = self.cumulative[index - 1];
        let hi = self.cumulative[index];
        let frac = if hi > lo { (s - lo) / (hi - lo) } else { 0.0 };
        self.curve.eval(self.dt * ((index - 1) as f64 + frac))
    }
}
