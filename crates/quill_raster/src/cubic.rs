//! Cubic curve classification and triangulation (Loop–Blinn)
//!
//! A cubic is converted to the power basis, from which the coefficients
//! `d1, d2, d3` of its inflection point polynomial are computed. The sign of the
//! polynomial's discriminant tells serpentines from loops, and each category has
//! a closed-form set of implicit coordinates `(k, l, m)` per control point such
//! that the curve is the zero set of `k³ - l·m`.
//!
//! The control polygon's convex hull is then triangulated, and every triangle
//! gets an orientation sign so that the covered area lies between the curve and
//! the chord `p0-p3`.
//!
//! Loops whose double point falls inside the curve are split there first,
//! otherwise the implicit function changes sign across the hull.

use quill_core::Point;
use tracing::{debug, warn};

use crate::bezier;
use crate::config::RasterConfig;
use crate::error::{RasterError, Result};
use crate::hull::convex_hull;
use crate::layout::FLAT_COEFFS;
use crate::quadratic::fill_quadratic;
use crate::shape::ShapeAccumulator;

/// Curve category derived from the inflection polynomial
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubicKind {
    /// Three collinear inflection points, or a cusp whose inflection is at infinity
    Serpentine,
    /// Self-intersecting curve
    Loop,
    /// Cusp with the remaining inflection at infinity
    Cusp,
}

/// Result of analysing one cubic
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CubicAnalysis {
    /// Degree-elevated quadratic, drawn with this middle control point
    Quadratic(Point),
    /// Loop whose double point lies at this parameter; split before filling
    Split(f32),
    /// Implicit `(k, l, m)` coordinates per control point
    Implicit {
        kind: CubicKind,
        coords: [[f32; 3]; 4],
    },
    /// Line or point, no curved boundary
    Empty,
}

/// Inflection polynomial coefficients of a cubic
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inflection {
    pub d1: f32,
    pub d2: f32,
    pub d3: f32,
    /// Second factor of the discriminant, `3·d2² - 4·d3·d1`
    pub discriminant: f32,
}

impl Inflection {
    pub fn of(p: &[Point; 4], coefficient_scale: f32) -> Self {
        let [p0, p1, p2, p3] = p.map(Point::to_vec2);

        // Power basis, scaled down to keep the cubic terms in range
        let c1 = (p1 - p0) * 3.0 * (1.0 / coefficient_scale);
        let c2 = (p0 * 3.0 - p1 * 6.0 + p2 * 3.0) * (1.0 / coefficient_scale);
        let c3 = (p1 * 3.0 - p2 * 3.0 + p3 - p0) * (1.0 / coefficient_scale);

        let d1 = c3.y * c2.x - c3.x * c2.y;
        let d2 = c3.x * c1.y - c3.y * c1.x;
        let d3 = c2.y * c1.x - c2.x * c1.y;

        Self {
            d1,
            d2,
            d3,
            discriminant: 3.0 * d2 * d2 - 4.0 * d3 * d1,
        }
    }
}

/// Classify a cubic and compute its implicit coordinates
pub fn analyze(p: &[Point; 4], config: &RasterConfig) -> CubicAnalysis {
    let Inflection {
        d1,
        d2,
        d3,
        discriminant,
    } = Inflection::of(p, config.coefficient_scale);

    let threshold = config.quadratic_degenerate_threshold;
    if d1.abs() < threshold && d2.abs() < threshold && d3 != 0.0 {
        let control = p[0] + (p[1] - p[0]) * 1.5;
        return CubicAnalysis::Quadratic(control);
    }

    if discriminant >= 0.0 && d1 != 0.0 {
        let root = (discriminant / 3.0).sqrt();
        let (tl, tm) = (d2 + root, d2 - root);
        let s = 2.0 * d1;
        return CubicAnalysis::Implicit {
            kind: CubicKind::Serpentine,
            coords: serpentine_coords(tl, s, tm, s),
        };
    }

    if discriminant < 0.0 && d1 != 0.0 {
        let root = (-discriminant).sqrt();
        let (td, te) = (d2 + root, d2 - root);
        let s = 2.0 * d1;
        for t in [td / s, te / s] {
            if t > config.loop_split_min && t < config.loop_split_max {
                return CubicAnalysis::Split(t);
            }
        }
        return CubicAnalysis::Implicit {
            kind: CubicKind::Loop,
            coords: loop_coords(td, s, te, s),
        };
    }

    if d1 == 0.0 && d2 != 0.0 {
        return CubicAnalysis::Implicit {
            kind: CubicKind::Cusp,
            coords: cusp_coords(d3, 3.0 * d2),
        };
    }

    if d1 != 0.0 || d2 != 0.0 || d3 != 0.0 {
        // Only reachable with non-finite control points
        warn!(d1, d2, d3, "unclassifiable cubic skipped");
    }
    CubicAnalysis::Empty
}

/// Serpentine basis change, rows of F multiplied by the inverse of M3
fn serpentine_coords(tl: f32, sl: f32, tm: f32, sm: f32) -> [[f32; 3]; 4] {
    let cross = sm * tl + sl * tm;
    [
        [tl * tm, tl.powi(3), tm.powi(3)],
        [
            tl * tm - cross / 3.0,
            tl.powi(3) - sl * tl * tl,
            tm.powi(3) - sm * tm * tm,
        ],
        [
            tl * tm - cross * 2.0 / 3.0 + sl * sm / 3.0,
            tl.powi(3) - 2.0 * sl * tl * tl + sl * sl * tl,
            tm.powi(3) - 2.0 * sm * tm * tm + sm * sm * tm,
        ],
        [
            tl * tm - cross + sl * sm,
            tl.powi(3) - 3.0 * sl * tl * tl + 3.0 * sl * sl * tl - sl.powi(3),
            tm.powi(3) - 3.0 * sm * tm * tm + 3.0 * sm * sm * tm - sm.powi(3),
        ],
    ]
}

fn loop_coords(td: f32, sd: f32, te: f32, se: f32) -> [[f32; 3]; 4] {
    let k1 = se * td + sd * te;
    let l1 = se * td * td + 2.0 * sd * te * td;
    let m1 = sd * te * te + 2.0 * se * td * te;
    let l2 = te * sd * sd + 2.0 * se * td * sd;
    let m2 = td * se * se + 2.0 * sd * te * se;
    [
        [td * te, td * td * te, td * te * te],
        [
            td * te - k1 / 3.0,
            td * td * te - l1 / 3.0,
            td * te * te - m1 / 3.0,
        ],
        [
            td * te - 2.0 * k1 / 3.0 + sd * se / 3.0,
            td * td * te - 2.0 * l1 / 3.0 + l2 / 3.0,
            td * te * te - 2.0 * m1 / 3.0 + m2 / 3.0,
        ],
        [
            td * te - k1 + sd * se,
            td * td * te - l1 + l2 - sd * sd * se,
            td * te * te - m1 + m2 - sd * se * se,
        ],
    ]
}

fn cusp_coords(tl: f32, sl: f32) -> [[f32; 3]; 4] {
    [
        [tl, tl.powi(3), 1.0],
        [tl - sl / 3.0, tl.powi(3) - sl * tl * tl, 1.0],
        [
            tl - sl * 2.0 / 3.0,
            tl.powi(3) - 2.0 * sl * tl * tl + sl * sl * tl,
            1.0,
        ],
        [
            tl - sl,
            tl.powi(3) - 3.0 * sl * tl * tl + 3.0 * sl * sl * tl - sl.powi(3),
            1.0,
        ],
    ]
}

/// Orientation sign for a triangle, from one of its interior control points
pub fn outside_test(c: [f32; 3]) -> f32 {
    if c[0] * c[0] * c[0] - c[1] * c[2] < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Fill a cubic segment
pub fn fill_cubic(
    acc: &mut ShapeAccumulator<'_>,
    p: [Point; 4],
    config: &RasterConfig,
) -> Result<()> {
    fill_cubic_at_depth(acc, p, config, 0)
}

fn fill_cubic_at_depth(
    acc: &mut ShapeAccumulator<'_>,
    p: [Point; 4],
    config: &RasterConfig,
    depth: u32,
) -> Result<()> {
    match analyze(&p, config) {
        CubicAnalysis::Quadratic(control) => {
            debug!("cubic degenerates to a quadratic");
            fill_quadratic(acc, [p[0], control, p[3]])
        }
        CubicAnalysis::Split(t) => {
            if depth >= config.max_cubic_split_depth {
                return Err(RasterError::SubdivisionDepthExceeded {
                    operation: "cubic loop split",
                    max_depth: config.max_cubic_split_depth,
                });
            }
            debug!(t, depth, "splitting loop at its double point");
            acc.stats_mut().cubic_splits += 1;
            acc.record_depth(depth + 1);

            let (low, high) = bezier::split(&p, t);
            // The sub-curves only cover their own hulls; this closes the gap between their chords
            acc.emit_flat_triangle([p[0], low[3], p[3]])?;
            fill_cubic_at_depth(acc, low, config, depth + 1)?;
            fill_cubic_at_depth(acc, high, config, depth + 1)
        }
        CubicAnalysis::Implicit { kind, coords } => {
            debug!(?kind, "classified cubic");
            triangulate(acc, &p, &coords)
        }
        CubicAnalysis::Empty => Ok(()),
    }
}

fn with_sign(c: [f32; 3], sign: f32) -> [f32; 4] {
    [c[0], c[1], c[2], sign]
}

/// Triangulate the control polygon's hull with the implicit coordinates
fn triangulate(
    acc: &mut ShapeAccumulator<'_>,
    p: &[Point; 4],
    coords: &[[f32; 3]; 4],
) -> Result<()> {
    let hull = convex_hull(p);
    let vertex = |i: usize, sign: f32| (p[i], with_sign(coords[i], sign));

    match hull.len() {
        3 if p[0] == p[3] => {
            // Closed curve, a single triangle over p0 p1 p2
            let sign = outside_test(coords[1]);
            acc.emit_triangle_list(&[vertex(0, sign), vertex(1, sign), vertex(2, sign)])
        }
        3 => {
            let Some(inside) = (0..4).find(|i| !hull.contains(i)) else {
                return Ok(());
            };
            if inside == 0 || inside == 3 {
                // An endpoint is inside the hull: fan both interior points off the chord
                let s0 = outside_test(coords[1]);
                let s1 = outside_test(coords[2]);
                acc.emit_triangle_list(&[
                    vertex(0, s0),
                    vertex(3, s0),
                    vertex(1, s0),
                    vertex(0, s1),
                    vertex(3, s1),
                    vertex(2, s1),
                ])
            } else {
                let test = if inside == 1 { 2 } else { 1 };
                let sign = outside_test(coords[test]);
                acc.emit_triangle_list(&[
                    vertex(hull[0], sign),
                    vertex(hull[1], sign),
                    vertex(hull[2], sign),
                ])
            }
        }
        4 => {
            let Some(e) = hull.iter().position(|&i| i == 0 || i == 3) else {
                return Ok(());
            };
            let fan = [
                hull[e],
                hull[(e + 1) % 4],
                hull[(e + 2) % 4],
                hull[e],
                hull[(e + 2) % 4],
                hull[(e + 3) % 4],
            ];
            // Fan triangles are (0 1 2) and (0 2 3); if the shared vertex is an
            // interior point it orients both, otherwise each uses its own
            let (s0, s1) = if fan[2] == 1 || fan[2] == 2 {
                let s = outside_test(coords[fan[2]]);
                (s, s)
            } else {
                (outside_test(coords[fan[1]]), outside_test(coords[fan[5]]))
            };
            acc.emit_triangle_list(&[
                vertex(fan[0], s0),
                vertex(fan[1], s0),
                vertex(fan[2], s0),
                vertex(fan[3], s1),
                vertex(fan[4], s1),
                vertex(fan[5], s1),
            ])
        }
        // Two points or fewer: a degenerate hull covers nothing
        _ => Ok(()),
    }
}
