//! Path outlines of common shapes
//!
//! Each builder returns a start point and the elements of one closed subpath.
//! Circular arcs are approximated with one cubic per quarter turn or less,
//! using control handles of length `4/3·tan(θ/4)·r`.

use std::f32::consts::FRAC_PI_2;

use quill_core::{PathElement, Point, Rect};
use smallvec::SmallVec;

/// Elements of one shape outline
pub type Outline = SmallVec<[PathElement; 9]>;

/// Handle length of a cubic approximating a unit arc of `angle` radians
pub fn arc_handle(angle: f32) -> f32 {
    4.0 / 3.0 * (angle / 4.0).tan()
}

/// Rectangle, clockwise on screen from the top-left corner
pub fn rectangle(rect: Rect) -> (Point, Outline) {
    let (x0, y0, x1, y1) = (rect.x(), rect.y(), rect.max_x(), rect.max_y());
    let start = Point::new(x0, y0);
    let outline = SmallVec::from_slice(&[
        PathElement::Line(Point::new(x1, y0)),
        PathElement::Line(Point::new(x1, y1)),
        PathElement::Line(Point::new(x0, y1)),
        PathElement::Line(start),
    ]);
    (start, outline)
}

/// Rectangle with circular corners; the radius is clamped to half the shorter side
pub fn rounded_rectangle(rect: Rect, radius: f32) -> (Point, Outline) {
    let r = radius.min(0.5 * rect.width().min(rect.height())).max(0.0);
    if r == 0.0 {
        return rectangle(rect);
    }
    let (x0, y0, x1, y1) = (rect.x(), rect.y(), rect.max_x(), rect.max_y());
    let k = arc_handle(FRAC_PI_2) * r;

    let start = Point::new(x0 + r, y0);
    let outline = SmallVec::from_slice(&[
        PathElement::Line(Point::new(x1 - r, y0)),
        PathElement::Cubic(
            Point::new(x1 - r + k, y0),
            Point::new(x1, y0 + r - k),
            Point::new(x1, y0 + r),
        ),
        PathElement::Line(Point::new(x1, y1 - r)),
        PathElement::Cubic(
            Point::new(x1, y1 - r + k),
            Point::new(x1 - r + k, y1),
            Point::new(x1 - r, y1),
        ),
        PathElement::Line(Point::new(x0 + r, y1)),
        PathElement::Cubic(
            Point::new(x0 + r - k, y1),
            Point::new(x0, y1 - r + k),
            Point::new(x0, y1 - r),
        ),
        PathElement::Line(Point::new(x0, y0 + r)),
        PathElement::Cubic(
            Point::new(x0, y0 + r - k),
            Point::new(x0 + r - k, y0),
            start,
        ),
    ]);
    (start, outline)
}

/// Ellipse centered at `center` as four quarter arcs
pub fn ellipse(center: Point, rx: f32, ry: f32) -> (Point, Outline) {
    let (cx, cy) = (center.x, center.y);
    let kx = arc_handle(FRAC_PI_2) * rx;
    let ky = arc_handle(FRAC_PI_2) * ry;

    let start = Point::new(cx + rx, cy);
    let outline = SmallVec::from_slice(&[
        PathElement::Cubic(
            Point::new(cx + rx, cy + ky),
            Point::new(cx + kx, cy + ry),
            Point::new(cx, cy + ry),
        ),
        PathElement::Cubic(
            Point::new(cx - kx, cy + ry),
            Point::new(cx - rx, cy + ky),
            Point::new(cx - rx, cy),
        ),
        PathElement::Cubic(
            Point::new(cx - rx, cy - ky),
            Point::new(cx - kx, cy - ry),
            Point::new(cx, cy - ry),
        ),
        PathElement::Cubic(
            Point::new(cx + kx, cy - ry),
            Point::new(cx + rx, cy - ky),
            start,
        ),
    ]);
    (start, outline)
}

/// Circular arc of `sweep` radians from `start_angle`, as cubics
///
/// Returns the arc's first point and one cubic per quarter turn or less.
/// A negative sweep runs clockwise in a y-up frame. Sweeps under a
/// thousandth of a radian produce no elements.
pub fn arc(center: Point, radius: f32, sweep: f32, start_angle: f32) -> (Point, Outline) {
    let at = |angle: f32| Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
    let start = at(start_angle);
    let mut outline = Outline::new();
    if sweep.abs() < 1e-3 {
        return (start, outline);
    }

    let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / segments as f32;
    let handle = arc_handle(step) * radius;

    for i in 0..segments {
        let a0 = start_angle + step * i as f32;
        let a1 = a0 + step;
        let (p0, p3) = (at(a0), at(a1));
        let p1 = Point::new(p0.x - handle * a0.sin(), p0.y + handle * a0.cos());
        let p2 = Point::new(p3.x + handle * a1.sin(), p3.y - handle * a1.cos());
        outline.push(PathElement::Cubic(p1, p2, p3));
    }
    (start, outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_quarter_arc_handle() {
        assert!((arc_handle(FRAC_PI_2) - 0.552_284_8).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_closes() {
        let (start, outline) = rectangle(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(start, Point::new(1.0, 2.0));
        assert_eq!(outline.len(), 4);
        assert_eq!(outline[3].end_point(), start);
        assert_eq!(outline[1].end_point(), Point::new(4.0, 6.0));
    }

    #[test]
    fn test_rounded_rectangle_clamps_radius() {
        let (start, outline) = rounded_rectangle(Rect::new(0.0, 0.0, 20.0, 10.0), 50.0);
        assert_eq!(start, Point::new(5.0, 0.0));
        assert_eq!(outline.len(), 8);
        assert_eq!(outline[7].end_point(), start);
        assert_eq!(outline[1].end_point(), Point::new(20.0, 5.0));

        let (_, square) = rounded_rectangle(Rect::new(0.0, 0.0, 20.0, 10.0), 0.0);
        assert_eq!(square.len(), 4);
    }

    #[test]
    fn test_ellipse_passes_through_axes() {
        let (start, outline) = ellipse(Point::new(10.0, 10.0), 4.0, 2.0);
        assert_eq!(start, Point::new(14.0, 10.0));
        let ends: Vec<_> = outline.iter().map(|e| e.end_point()).collect();
        assert_eq!(
            ends,
            vec![
                Point::new(10.0, 12.0),
                Point::new(6.0, 10.0),
                Point::new(10.0, 8.0),
                Point::new(14.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_arc_segments_stay_on_circle() {
        let center = Point::new(0.0, 0.0);
        let (start, outline) = arc(center, 10.0, 1.5 * PI, 0.0);
        assert!(start.close_to(Point::new(10.0, 0.0), 1e-5));
        assert_eq!(outline.len(), 3);

        let mut from = start;
        for element in &outline {
            let PathElement::Cubic(c1, c2, to) = *element else {
                panic!("arcs are made of cubics");
            };
            let mid = quill_raster::bezier::point_at(&[from, c1, c2, to], 0.5);
            assert!((mid.to_vec2().length() - 10.0).abs() < 0.01);
            from = to;
        }
        assert!(from.close_to(Point::new(0.0, -10.0), 1e-4));
    }

    #[test]
    fn test_negative_and_tiny_sweeps() {
        let (_, outline) = arc(Point::ZERO, 5.0, -FRAC_PI_2, 0.0);
        assert_eq!(outline.len(), 1);
        assert!(outline[0].end_point().close_to(Point::new(0.0, -5.0), 1e-5));

        let (_, empty) = arc(Point::ZERO, 5.0, 1e-4, 0.0);
        assert!(empty.is_empty());
    }
}
