//! Turn angle at the middle vertex of three points.
//!
//! The angle is computed with the law of cosines on the edge lengths, so a
//! straight continuation yields π and a full fold yields 0. The gradient is
//! the analytic derivative of `acos` with `sin θ` clamped away from zero.

use glam::DVec2;
use ruffles_types::constants::ANGLE_SIN_EPSILON;

/// Interior angle at `b` of the polyline `a → b → c`, in `[0, π]`.
///
/// A zero-length edge has no defined angle; it is reported as straight.
pub fn turn_angle(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    let l1 = (b - a).length();
    let l2 = (c - b).length();
    if l1 == 0.0 || l2 == 0.0 {
        return std::f64::consts::PI;
    }
    let l3_sq = (c - a).length_squared();
    let cos = ((l1 * l1 + l2 * l2 - l3_sq) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
    cos.acos()
}

/// Turn angle at `b` together with its gradient w.r.t. `[a, b, c]`.
pub fn turn_angle_with_gradient(a: DVec2, b: DVec2, c: DVec2) -> (f64, [DVec2; 3]) {
    let d1 = b - a;
    let d2 = c - b;
    let d3 = c - a;

    let l1_sq = d1.length_squared();
    let l2_sq = d2.length_squared();
    let l3_sq = d3.length_squared();
    let l1 = l1_sq.sqrt();
    let l2 = l2_sq.sqrt();
    if l1 == 0.0 || l2 == 0.0 {
        return (std::f64::consts::PI, [DVec2::ZERO; 3]);
    }

    let num = l1_sq + l2_sq - l3_sq;
    let den = 2.0 * l1 * l2;
    let cos = (num / den).clamp(-1.0, 1.0);
    let theta = cos.acos();

    // d(l²) for each edge, per point
    let dl1_sq = [-2.0 * d1, 2.0 * d1, DVec2::ZERO];
    let dl2_sq = [DVec2::ZERO, -2.0 * d2, 2.0 * d2];
    let dl3_sq = [-2.0 * d3, DVec2::ZERO, 2.0 * d3];

    let sin = (1.0 - cos * cos).max(0.0).sqrt().max(ANGLE_SIN_EPSILON);

    let mut grad = [DVec2::ZERO; 3];
    for i in 0..3 {
        let dnum = dl1_sq[i] + dl2_sq[i] - dl3_sq[i];
        let dl1 = dl1_sq[i] / (2.0 * l1);
        let dl2 = dl2_sq[i] / (2.0 * l2);
        let dden = 2.0 * l1 * dl2 + 2.0 * l2 * dl1;
        let dcos = dnum / den - num * dden / (den * den);
        grad[i] = -dcos / sin;
    }
    (theta, grad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_matches_finite_differences() {
        let pts = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.2), DVec2::new(1.5, 1.1)];
        let (_, grad) = turn_angle_with_gradient(pts[0], pts[1], pts[2]);
        let h = 1e-6;
        for i in 0..3 {
            for axis in 0..2 {
                let mut plus = pts;
                let mut minus = pts;
                plus[i][axis] += h;
                minus[i][axis] -= h;
                let fd = (turn_angle(plus[0], plus[1], plus[2])
                    - turn_angle(minus[0], minus[1], minus[2]))
                    / (2.0 * h);
                assert!((fd - grad[i][axis]).abs() < 1e-5, "point {i} axis {axis}");
            }
        }
    }
}
