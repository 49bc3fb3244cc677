//! Bézier evaluation and subdivision
//!
//! Both work on control point arrays of any order with de Casteljau's
//! algorithm, so lines, quadratics and cubics share one implementation.

use quill_core::Point;

/// Point on the curve at parameter `t`
pub fn point_at<const N: usize>(p: &[Point; N], t: f32) -> Point {
    let mut work = *p;
    for level in 1..N {
        for i in 0..N - level {
            work[i] = work[i].lerp(work[i + 1], t);
        }
    }
    work[0]
}

/// Split a curve at `t` into the `[0, t]` and `[t, 1]` halves
pub fn split<const N: usize>(p: &[Point; N], t: f32) -> ([Point; N], [Point; N]) {
    let mut left = *p;
    let mut right = *p;
    let mut work = *p;
    for level in 0..N {
        left[level] = work[0];
        right[N - 1 - level] = work[N - 1 - level];
        for i in 0..N - 1 - level {
            work[i] = work[i].lerp(work[i + 1], t);
        }
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.close_to(b, 1e-4)
    }

    #[test]
    fn test_quadratic_point() {
        let p = [Point::new(0.0, 0.0), Point::new(1.0, 2.0), Point::new(2.0, 0.0)];
        assert!(close(point_at(&p, 0.0), p[0]));
        assert!(close(point_at(&p, 1.0), p[2]));
        assert!(close(point_at(&p, 0.5), Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_cubic_point_matches_bernstein_form() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 30.0),
            Point::new(30.0, -10.0),
            Point::new(20.0, 20.0),
        ];
        let t: f32 = 0.3;
        let m = 1.0 - t;
        let expected = Point::new(
            m * m * m * p[0].x + 3.0 * m * m * t * p[1].x + 3.0 * m * t * t * p[2].x + t * t * t * p[3].x,
            m * m * m * p[0].y + 3.0 * m * m * t * p[1].y + 3.0 * m * t * t * p[2].y + t * t * t * p[3].y,
        );
        assert!(close(point_at(&p, t), expected));
    }

    #[test]
    fn test_split_halves_share_split_point() {
        let p = [
            Point::new(0.0, 0.0),
            Point::new(-300.0, -200.0),
            Point::new(0.0, 200.0),
            Point::new(200.0, 0.0),
        ];
        let (lo, hi) = split(&p, 0.25);
        assert_eq!(lo[0], p[0]);
        assert_eq!(hi[3], p[3]);
        assert_eq!(lo[3], hi[0]);
        assert!(lo[3].close_to(point_at(&p, 0.25), 1e-3));

        // The halves trace the unsplit curve
        assert!(point_at(&lo, 0.5).close_to(point_at(&p, 0.125), 1e-3));
        assert!(point_at(&hi, 0.5).close_to(point_at(&p, 0.625), 1e-3));
    }

    #[test]
    fn test_split_quadratic() {
        let p = [Point::new(0.0, 0.0), Point::new(1.0, 2.0), Point::new(2.0, 0.0)];
        let (lo, hi) = split(&p, 0.5);
        assert!(close(lo[1], Point::new(0.5, 1.0)));
        assert!(close(lo[2], Point::new(1.0, 1.0)));
        assert!(close(hi[1], Point::new(1.5, 1.0)));
    }
}
