//! Quadratic curve fill

use quill_core::Point;

use crate::error::Result;
use crate::shape::ShapeAccumulator;

/// Canonical parabola coordinates for `p0`, `p1`, `p2`
pub const QUADRATIC_COEFFS: [[f32; 4]; 3] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.5, 0.0, 0.5, 1.0],
    [1.0, 1.0, 1.0, 1.0],
];

/// Emit the single curve triangle of a quadratic segment
///
/// The triangle covers the region between the curve and its chord. The
/// interior between the chord and the rest of the path comes from the path
/// fill's fan triangles.
pub fn fill_quadratic(acc: &mut ShapeAccumulator<'_>, p: [Point; 3]) -> Result<()> {
    acc.emit_triangle(p, QUADRATIC_COEFFS)
}
