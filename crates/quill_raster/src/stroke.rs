//! Stroke offset engine
//!
//! A stroked curve is drawn as the region between its two offset curves at
//! `±width/2`. Offset curves are approximated by offsetting the control
//! polygon (see [`offset_hull`]), which is only accurate for gently bending
//! segments, so each segment is first subdivided until both approximations stay
//! inside a tolerance band around the true offset distance:
//!
//! ```text
//! (w/2 - tolerance)² <= |c(t) - offset(t)|² <= (w/2 + tolerance)²
//! ```
//!
//! checked at a fixed set of curve parameters. Planning ([`plan_quadratic`],
//! [`plan_cubic`]) is separate from emission so the subdivision can be
//! inspected without a backend.

use quill_core::{Attributes, CapKind, PathElement, Point, Vec2};
use smallvec::SmallVec;
use tracing::debug;

use crate::bezier;
use crate::config::RasterConfig;
use crate::cubic::fill_cubic;
use crate::error::{RasterError, Result};
use crate::joint::{stroke_cap, stroke_joint};
use crate::offset::offset_hull;
use crate::quadratic::fill_quadratic;
use crate::shape::ShapeAccumulator;

// ═══════════════════════════════════════════════════════════════════════════
// Stroke plan
// ═══════════════════════════════════════════════════════════════════════════

/// One piece of a stroked segment, drawn in its own shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokePiece {
    /// Straight stroke between two points
    Line([Point; 2]),
    /// Band between two offset quadratics around `center`
    Quadratic {
        center: [Point; 3],
        positive: [Point; 3],
        negative: [Point; 3],
    },
    /// Band between two offset cubics around `center`
    Cubic {
        center: [Point; 4],
        positive: [Point; 4],
        negative: [Point; 4],
    },
}

/// Subdivision result for one path element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokePlan {
    pub pieces: SmallVec<[StrokePiece; 4]>,
    /// Number of times a segment was split in two
    pub subdivisions: u32,
    pub max_depth: u32,
}

/// Admissible squared distances between a curve and its offsets
#[derive(Clone, Copy, Debug)]
struct ToleranceBand {
    half_width: f32,
    low: f32,
    high: f32,
}

impl ToleranceBand {
    fn new(width: f32, tolerance: f32) -> Self {
        let half_width = 0.5 * width;
        let tolerance = tolerance.min(half_width);
        Self {
            half_width,
            low: (half_width - tolerance).powi(2),
            high: (half_width + tolerance).powi(2),
        }
    }

    /// Distance past the nearest bound; positive when outside the band
    fn overshoot(&self, distance_squared: f32) -> f32 {
        (distance_squared - self.high).max(self.low - distance_squared)
    }
}

/// Quadratic and cubic control point arrays, as far as stroking is concerned
trait StrokeSegment: Copy {
    /// Straight line this segment degenerates to, if its control points coincide
    fn collapse(&self, epsilon: f32) -> Option<[Point; 2]>;
    fn offset(&self, offset: f32, config: &RasterConfig) -> Option<Self>;
    fn point_at(&self, t: f32) -> Point;
    fn split(&self, t: f32) -> (Self, Self);
    fn band(self, positive: Self, negative: Self) -> StrokePiece;
}

impl StrokeSegment for [Point; 3] {
    fn collapse(&self, epsilon: f32) -> Option<[Point; 2]> {
        let [p0, p1, p2] = *self;
        if p0.close_to(p1, epsilon) {
            Some([p1, p2])
        } else if p1.close_to(p2, epsilon) {
            Some([p0, p1])
        } else {
            None
        }
    }

    fn offset(&self, offset: f32, config: &RasterConfig) -> Option<Self> {
        offset_hull(self, offset, config)
    }

    fn point_at(&self, t: f32) -> Point {
        bezier::point_at(self, t)
    }

    fn split(&self, t: f32) -> (Self, Self) {
        bezier::split(self, t)
    }

    fn band(self, positive: Self, negative: Self) -> StrokePiece {
        StrokePiece::Quadratic {
            center: self,
            positive,
            negative,
        }
    }
}

impl StrokeSegment for [Point; 4] {
    fn collapse(&self, epsilon: f32) -> Option<[Point; 2]> {
        let [p0, p1, p2, p3] = *self;
        let close = |a: Point, b: Point| a.close_to(b, epsilon);

        if (close(p0, p1) && close(p2, p3))
            || (close(p0, p1) && close(p1, p2))
            || (close(p1, p2) && close(p2, p3))
        {
            Some([p0, p3])
        } else if close(p0, p1) && close(p1, p3) {
            // The curve runs out to its extremum toward p2 and back
            Some([p0, p0 + (p2 - p0) * (4.0 / 9.0)])
        } else if close(p0, p2) && close(p2, p3) {
            Some([p0, p0 + (p1 - p0) * (4.0 / 9.0)])
        } else {
            None
        }
    }

    fn offset(&self, offset: f32, config: &RasterConfig) -> Option<Self> {
        offset_hull(self, offset, config)
    }

    fn point_at(&self, t: f32) -> Point {
        bezier::point_at(self, t)
    }

    fn split(&self, t: f32) -> (Self, Self) {
        bezier::split(self, t)
    }

    fn band(self, positive: Self, negative: Self) -> StrokePiece {
        StrokePiece::Cubic {
            center: self,
            positive,
            negative,
        }
    }
}

/// Plan the stroke of a quadratic segment
pub fn plan_quadratic(
    p: [Point; 3],
    width: f32,
    tolerance: f32,
    config: &RasterConfig,
) -> Result<StrokePlan> {
    let mut plan = StrokePlan::default();
    plan_segment(p, &ToleranceBand::new(width, tolerance), config, 0, &mut plan)?;
    Ok(plan)
}

/// Plan the stroke of a cubic segment
pub fn plan_cubic(
    p: [Point; 4],
    width: f32,
    tolerance: f32,
    config: &RasterConfig,
) -> Result<StrokePlan> {
    let mut plan = StrokePlan::default();
    plan_segment(p, &ToleranceBand::new(width, tolerance), config, 0, &mut plan)?;
    Ok(plan)
}

fn plan_segment<S: StrokeSegment>(
    p: S,
    band: &ToleranceBand,
    config: &RasterConfig,
    depth: u32,
    plan: &mut StrokePlan,
) -> Result<()> {
    if let Some(line) = p.collapse(config.point_equal_epsilon) {
        plan.pieces.push(StrokePiece::Line(line));
        return Ok(());
    }

    let offsets = p
        .offset(band.half_width, config)
        .zip(p.offset(-band.half_width, config));

    let split_at = match offsets {
        None => {
            debug!(depth, "offset hull failed, bisecting");
            Some(0.5)
        }
        Some((positive, negative)) => {
            let split_at = worst_sample(&p, &positive, &negative, band, &config.check_samples);
            if split_at.is_none() {
                plan.pieces.push(p.band(positive, negative));
            }
            split_at
        }
    };

    let Some(t) = split_at else {
        return Ok(());
    };
    if depth >= config.max_stroke_subdivision_depth {
        return Err(RasterError::SubdivisionDepthExceeded {
            operation: "stroke subdivision",
            max_depth: config.max_stroke_subdivision_depth,
        });
    }
    debug!(t, depth, "stroke offset out of tolerance, subdividing");
    plan.subdivisions += 1;
    plan.max_depth = plan.max_depth.max(depth + 1);

    let (low, high) = p.split(t);
    plan_segment(low, band, config, depth + 1, plan)?;
    plan_segment(high, band, config, depth + 1, plan)
}

/// Sample parameter where the offsets leave the band by the most, if any does
fn worst_sample<S: StrokeSegment>(
    p: &S,
    positive: &S,
    negative: &S,
    band: &ToleranceBand,
    samples: &[f32],
) -> Option<f32> {
    let mut worst = 0.0;
    let mut worst_t = None;
    for &t in samples {
        let c = p.point_at(t);
        let overshoot = band
            .overshoot(c.distance_squared(positive.point_at(t)))
            .max(band.overshoot(c.distance_squared(negative.point_at(t))));
        if overshoot > worst {
            worst = overshoot;
            worst_t = Some(t);
        }
    }
    worst_t
}

// ═══════════════════════════════════════════════════════════════════════════
// Emission
// ═══════════════════════════════════════════════════════════════════════════

/// Rectangle of a straight stroke: `p0 + n, p1 + n, p1 - n, p0 - n`
pub fn line_quad(p: [Point; 2], width: f32) -> Option<[Point; 4]> {
    let n = (p[1] - p[0]).perp();
    let length = n.length();
    if length == 0.0 {
        return None;
    }
    let n = n * (0.5 * width / length);
    Some([p[0] + n, p[1] + n, p[1] - n, p[0] - n])
}

/// Emit the rectangle of a straight stroke into the open shape
pub fn stroke_line(acc: &mut ShapeAccumulator<'_>, p: [Point; 2], width: f32) -> Result<()> {
    match line_quad(p, width) {
        Some(quad) => acc.emit_flat_quad(quad),
        None => Ok(()),
    }
}

/// Emit every piece of a plan, each in its own shape
pub fn emit_plan(
    acc: &mut ShapeAccumulator<'_>,
    plan: &StrokePlan,
    attributes: &Attributes,
    config: &RasterConfig,
) -> Result<()> {
    for piece in &plan.pieces {
        match *piece {
            StrokePiece::Line(line) => {
                if let Some(quad) = line_quad(line, attributes.width) {
                    acc.next_shape(attributes)?;
                    acc.emit_flat_quad(quad)?;
                }
            }
            StrokePiece::Quadratic {
                positive, negative, ..
            } => {
                acc.next_shape(attributes)?;
                fill_quadratic(acc, positive)?;
                fill_quadratic(acc, negative)?;
                acc.emit_flat_quad([positive[0], positive[2], negative[2], negative[0]])?;
            }
            StrokePiece::Cubic {
                positive, negative, ..
            } => {
                acc.next_shape(attributes)?;
                fill_cubic(acc, positive, config)?;
                fill_cubic(acc, negative, config)?;
                acc.emit_flat_quad([positive[0], positive[3], negative[3], negative[0]])?;
            }
        }
    }

    acc.stats_mut().stroke_subdivisions += plan.subdivisions;
    acc.record_depth(plan.max_depth);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Elements and subpaths
// ═══════════════════════════════════════════════════════════════════════════

/// Tangents at both ends of a segment, skipping coincident control points
///
/// `None` when all the points coincide.
pub fn segment_tangents(points: &[Point]) -> Option<(Vec2, Vec2)> {
    let (&first, &last) = (points.first()?, points.last()?);
    let start = points[1..].iter().find(|p| **p != first)?;
    let end = points[..points.len() - 1].iter().rev().find(|p| **p != last)?;
    Some((*start - first, last - *end))
}

/// Stroke one element from `current`, returning its end tangents
pub fn stroke_element(
    acc: &mut ShapeAccumulator<'_>,
    current: Point,
    element: &PathElement,
    attributes: &Attributes,
    config: &RasterConfig,
) -> Result<Option<(Vec2, Vec2)>> {
    let (plan, points): (StrokePlan, SmallVec<[Point; 4]>) = match *element {
        PathElement::Move(_) => return Ok(None),
        PathElement::Line(p) => {
            let mut plan = StrokePlan::default();
            plan.pieces.push(StrokePiece::Line([current, p]));
            (plan, SmallVec::from_slice(&[current, p]))
        }
        PathElement::Quadratic(c, p) => {
            let points = [current, c, p];
            let plan = plan_quadratic(points, attributes.width, attributes.tolerance, config)?;
            (plan, SmallVec::from_slice(&points))
        }
        PathElement::Cubic(c1, c2, p) => {
            let points = [current, c1, c2, p];
            let plan = plan_cubic(points, attributes.width, attributes.tolerance, config)?;
            (plan, SmallVec::from_slice(&points))
        }
    };

    emit_plan(acc, &plan, attributes, config)?;
    Ok(segment_tangents(&points))
}

/// Stroke a run of path elements starting at `start_point`
///
/// Leading moves are skipped; every subsequent move starts a new subpath.
pub fn stroke_path(
    acc: &mut ShapeAccumulator<'_>,
    elements: &[PathElement],
    start_point: Point,
    attributes: &Attributes,
    config: &RasterConfig,
) -> Result<()> {
    let mut start = start_point;
    let mut index = 0;

    while index < elements.len() {
        while let Some(PathElement::Move(p)) = elements.get(index) {
            start = *p;
            index += 1;
        }
        if index < elements.len() {
            index = stroke_subpath(acc, elements, index, start, attributes, config)?;
        }
    }
    Ok(())
}

/// Stroke elements from `first` up to the next move, returning where it stopped
fn stroke_subpath(
    acc: &mut ShapeAccumulator<'_>,
    elements: &[PathElement],
    first: usize,
    start: Point,
    attributes: &Attributes,
    config: &RasterConfig,
) -> Result<usize> {
    let mut current = start;
    let mut first_tangent = None;
    let mut last_tangent: Option<Vec2> = None;
    let mut index = first;

    while let Some(element) = elements.get(index).filter(|e| !e.is_move()) {
        if let Some((start_tangent, end_tangent)) =
            stroke_element(acc, current, element, attributes, config)?
        {
            if let Some(previous) = last_tangent {
                stroke_joint(acc, current, previous, start_tangent, attributes)?;
            }
            first_tangent.get_or_insert(start_tangent);
            last_tangent = Some(end_tangent);
        }
        current = element.end_point();
        index += 1;
    }

    let (Some(first_tangent), Some(last_tangent)) = (first_tangent, last_tangent) else {
        return Ok(index);
    };

    if index - first > 1 && current == start {
        stroke_joint(acc, current, last_tangent, first_tangent, attributes)?;
    } else if attributes.cap == CapKind::Square {
        stroke_cap(acc, start, -first_tangent, attributes)?;
        stroke_cap(acc, current, last_tangent, attributes)?;
    }
    Ok(index)
}
