//! Path fill driver
//!
//! A path is filled as a triangle fan from the subpath's start point through
//! every element's endpoints, plus the curve triangles of each element. Fan
//! triangles overlap for concave paths; resolving coverage is left to the
//! backend's shaders.

use quill_core::{PathElement, Point};

use crate::config::RasterConfig;
use crate::cubic::fill_cubic;
use crate::error::Result;
use crate::quadratic::fill_quadratic;
use crate::shape::ShapeAccumulator;

/// Fill a run of path elements starting at `start_point`
///
/// The shape must already be open. Moves start a new subpath without emitting
/// anything; lines only contribute their fan triangle.
pub fn fill_path(
    acc: &mut ShapeAccumulator<'_>,
    elements: &[PathElement],
    start_point: Point,
    config: &RasterConfig,
) -> Result<()> {
    let mut start = start_point;
    let mut current = start_point;

    for element in elements {
        let end = match *element {
            PathElement::Move(p) => {
                start = p;
                current = p;
                continue;
            }
            PathElement::Line(p) => p,
            PathElement::Quadratic(c, p) => {
                fill_quadratic(acc, [current, c, p])?;
                p
            }
            PathElement::Cubic(c1, c2, p) => {
                fill_cubic(acc, [current, c1, c2, p], config)?;
                p
            }
        };
        acc.emit_flat_triangle([start, current, end])?;
        current = end;
    }
    Ok(())
}
