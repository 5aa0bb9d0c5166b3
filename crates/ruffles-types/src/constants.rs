//! Physical constants and simulation defaults.

/// Gravitational acceleration (cm/s²), pointing towards negative y.
pub const GRAVITY: f64 = 981.0;

/// Hard cap on solver steps in a single physics solve.
pub const MAX_SOLVE_STEPS: u32 = 1000;

/// Minimum number of segments a freshly created section is sampled with.
pub const MIN_SECTION_SEGMENTS: usize = 3;

/// Number of samples of the arclength table of a Bézier section.
pub const BEZIER_SAMPLES: usize = 100;

/// Control-point tangent length as a fraction of the relevant chord.
pub const TANGENT_CHORD_RATIO: f64 = 0.4;

/// Quality assigned to air-mesh triangles touching the outer face.
pub const OUTER_FACE_QUALITY: f64 = 0.05;

/// Smallest (doubled) triangle area accepted by the air-mesh projection.
pub const PROJECTION_MIN_AREA: f64 = 1.0e-3;

/// Guard on `sin θ` in the turn-angle gradient.
pub const ANGLE_SIN_EPSILON: f64 = 1.0e-6;

/// Accepted ratio band of current/rest length for `consistent_lengths`.
pub const LENGTH_RATIO_BAND: (f64, f64) = (0.9, 1.1);

/// Epsilon for floating-point comparisons of positions.
pub const EPSILON: f64 = 1.0e-9;
