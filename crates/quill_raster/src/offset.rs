//! Control polygon offsetting
//!
//! The offset of a Bézier curve is approximated by the curve whose control
//! polygon is the input polygon with every leg pushed out along its normal.
//! Consecutive pushed legs are intersected to recover the interior control
//! points.

use quill_core::Point;

use crate::config::RasterConfig;

/// Intersection of the lines through `a0-a1` and `b0-b1`
///
/// `None` when the lines are parallel within `parallel_epsilon`.
pub fn intersect_legs(
    a0: Point,
    a1: Point,
    b0: Point,
    b1: Point,
    parallel_epsilon: f32,
) -> Option<Point> {
    let den = (a0.x - a1.x) * (b0.y - b1.y) - (a0.y - a1.y) * (b0.x - b1.x);
    if den.abs() <= parallel_epsilon {
        return None;
    }
    let u = ((a0.x - b0.x) * (b0.y - b1.y) - (a0.y - b0.y) * (b0.x - b1.x)) / den;
    Some(a0.lerp(a1, u))
}

/// Offset a control polygon by `offset` along its left-hand normals
///
/// Legs shorter than `leg_length_epsilon` cannot be offset; the points around
/// them come from intersecting the nearest usable legs on either side. Returns `None` when fewer than two
/// legs are usable, or when two consecutive legs are parallel and point in
/// opposite directions. The caller subdivides the curve in that case.
pub fn offset_hull<const N: usize>(
    p: &[Point; N],
    offset: f32,
    config: &RasterConfig,
) -> Option<[Point; N]> {
    if N < 3 {
        return None;
    }

    let mut legs: [Option<[Point; 2]>; N] = [None; N];
    for i in 0..N - 1 {
        let n = (p[i + 1] - p[i]).perp();
        let norm = n.length();
        if norm >= config.leg_length_epsilon {
            let n = n * (offset / norm);
            legs[i] = Some([p[i] + n, p[i + 1] + n]);
        }
    }
    if legs.iter().flatten().count() < 2 {
        return None;
    }

    let mut result = [Point::ZERO; N];
    result[0] = legs[0].or(legs[1])?[0];

    for i in 1..N - 1 {
        // Nearest usable legs ending at or before p[i] and starting at or after it
        let prev = legs[..i].iter().rev().flatten().next();
        let next = legs[i..N - 1].iter().flatten().next();
        result[i] = match (prev, next) {
            (None, Some(leg)) => leg[0],
            (Some(prev), None) => prev[1],
            (Some(prev), Some(leg)) => {
                match intersect_legs(prev[0], prev[1], leg[0], leg[1], config.leg_parallel_epsilon)
                {
                    Some(point) => point,
                    // Collinear legs running the same way meet where they touch
                    None if (prev[1] - prev[0]).dot(leg[1] - leg[0]) > 0.0 => {
                        prev[1].lerp(leg[0], 0.5)
                    }
                    None => return None,
                }
            }
            (None, None) => return None,
        };
    }

    result[N - 1] = legs[N - 2].or(legs[N - 3])?[1];
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RasterConfig {
        RasterConfig::standard()
    }

    #[test]
    fn test_intersect_perpendicular_legs() {
        let hit = intersect_legs(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, -5.0),
            Point::new(5.0, 5.0),
            1e-4,
        )
        .unwrap();
        assert!(hit.close_to(Point::new(5.0, 0.0), 1e-5));
    }

    #[test]
    fn test_parallel_legs_do_not_intersect() {
        assert!(intersect_legs(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
            1e-4,
        )
        .is_none());
    }

    #[test]
    fn test_offset_quadratic() {
        let p = [Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(20.0, 0.0)];
        let hull = offset_hull(&p, 1.0, &config()).unwrap();

        // Endpoints move along the leg normals
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!(hull[0].close_to(Point::new(-s, s), 1e-5));
        assert!(hull[2].close_to(Point::new(20.0 + s, s), 1e-5));
        // The apex moves straight up by 1/cos(45°)
        assert!(hull[1].close_to(Point::new(10.0, 10.0 + 2.0 * s), 1e-4));

        let inner = offset_hull(&p, -1.0, &config()).unwrap();
        assert!(inner[1].close_to(Point::new(10.0, 10.0 - 2.0 * s), 1e-4));
    }

    #[test]
    fn test_offset_skips_zero_length_middle_leg() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        let hull = offset_hull(&p, 1.0, &config()).unwrap();
        // Left normals: the first leg goes up so it moves left, the last goes right so it moves up
        assert_eq!(hull[0], Point::new(-1.0, 0.0));
        // Both interior points sit on the corner where the outer legs meet
        assert!(hull[1].close_to(Point::new(-1.0, 11.0), 1e-4));
        assert!(hull[2].close_to(Point::new(-1.0, 11.0), 1e-4));
        assert_eq!(hull[3], Point::new(10.0, 11.0));
    }

    #[test]
    fn test_offset_skips_zero_length_first_leg() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let hull = offset_hull(&p, 1.0, &config()).unwrap();
        assert_eq!(hull[0], Point::new(0.0, 1.0));
        assert_eq!(hull[1], Point::new(0.0, 1.0));
        assert!(hull[2].close_to(Point::new(9.0, 1.0), 1e-5));
        assert_eq!(hull[3], Point::new(9.0, 10.0));
    }

    #[test]
    fn test_collinear_legs_join_at_shared_point() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 10.0),
        ];
        let hull = offset_hull(&p, 2.0, &config()).unwrap();
        assert_eq!(hull[1], Point::new(10.0, 2.0));
    }

    #[test]
    fn test_reversing_legs_fail() {
        let p = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 0.0)];
        assert!(offset_hull(&p, 1.0, &config()).is_none());
    }

    #[test]
    fn test_single_usable_leg_fails() {
        let p = [Point::new(0.0, 0.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert!(offset_hull(&p, 1.0, &config()).is_none());
    }
}
