//! Stroke joints and caps
//!
//! Both are emitted as separate shapes on top of the stroked segments.

use quill_core::{Attributes, JointKind, Point, Vec2};

use crate::error::Result;
use crate::shape::ShapeAccumulator;

/// Joint geometry between two segments meeting at a point
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JointGeometry {
    /// `(p0, p0 + n0·w/2, miter point, p0 + n1·w/2)`
    Miter([Point; 4]),
    /// `(p0, p0 + n0·w/2, p0 + n1·w/2)`
    Bevel([Point; 3]),
}

/// Compute the joint at `p0` from the incoming tangent `t0` to the outgoing `t1`
///
/// Returns `None` for [`JointKind::None`] or a zero tangent.
pub fn joint_geometry(p0: Point, t0: Vec2, t1: Vec2, attributes: &Attributes) -> Option<JointGeometry> {
    if attributes.joint == JointKind::None {
        return None;
    }
    let (l0, l1) = (t0.length(), t1.length());
    if l0 == 0.0 || l1 == 0.0 {
        return None;
    }

    let mut n0 = t0.perp() * (1.0 / l0);
    let mut n1 = t1.perp() * (1.0 / l1);
    // Make the normals face the outside of the turn
    if n0.cross(n1) > 0.0 {
        n0 = -n0;
        n1 = -n1;
    }

    let width = attributes.width;
    let half_width = 0.5 * width;
    let u = n0 + n1;
    let u_norm_squared = u.length_squared();
    let alpha = width / u_norm_squared;
    let excursion_squared = u_norm_squared * (alpha - width / 4.0).powi(2);

    let outer0 = p0 + n0 * half_width;
    let outer1 = p0 + n1 * half_width;

    if attributes.joint == JointKind::Miter
        && excursion_squared <= attributes.max_joint_excursion.powi(2)
    {
        let miter = p0 + u * alpha;
        Some(JointGeometry::Miter([p0, outer0, miter, outer1]))
    } else {
        Some(JointGeometry::Bevel([p0, outer0, outer1]))
    }
}

/// Emit the joint at `p0` in its own shape
pub fn stroke_joint(
    acc: &mut ShapeAccumulator<'_>,
    p0: Point,
    t0: Vec2,
    t1: Vec2,
    attributes: &Attributes,
) -> Result<()> {
    let Some(geometry) = joint_geometry(p0, t0, t1, attributes) else {
        return Ok(());
    };
    acc.next_shape(attributes)?;
    match geometry {
        JointGeometry::Miter(quad) => acc.emit_flat_quad(quad),
        JointGeometry::Bevel(triangle) => acc.emit_flat_triangle(triangle),
    }
}

/// Square cap corners at `p0`, extending half the width along `direction`
pub fn cap_geometry(p0: Point, direction: Vec2, width: f32) -> Option<[Point; 4]> {
    let length = direction.length();
    if length == 0.0 {
        return None;
    }
    let alpha = 0.5 * width / length;
    let n = direction.perp() * alpha;
    let m = direction * alpha;
    Some([p0 + n, p0 + n + m, p0 - n + m, p0 - n])
}

/// Emit a square cap in its own shape
pub fn stroke_cap(
    acc: &mut ShapeAccumulator<'_>,
    p0: Point,
    direction: Vec2,
    attributes: &Attributes,
) -> Result<()> {
    let Some(quad) = cap_geometry(p0, direction, attributes.width) else {
        return Ok(());
    };
    acc.next_shape(attributes)?;
    acc.emit_flat_quad(quad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use quill_core::Color;

    fn attrs(joint: JointKind, excursion: f32) -> Attributes {
        Attributes::default().with_width(2.0).with_joint(joint, excursion)
    }

    #[test]
    fn test_right_angle_miter() {
        // Heading right, then up: the outside of the turn is below and to the right
        let geometry = joint_geometry(
            Point::new(10.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            &attrs(JointKind::Miter, 10.0),
        );
        let Some(JointGeometry::Miter(quad)) = geometry else {
            panic!("expected a miter, got {:?}", geometry);
        };
        assert_eq!(quad[0], Point::new(10.0, 0.0));
        assert!(quad[1].close_to(Point::new(10.0, -1.0), 1e-6));
        assert!(quad[2].close_to(Point::new(11.0, -1.0), 1e-6));
        assert!(quad[3].close_to(Point::new(11.0, 0.0), 1e-6));
    }

    #[test]
    fn test_miter_past_excursion_limit_bevels() {
        // A right angle at width 2 has a squared excursion of 0.5
        let limited = joint_geometry(
            Point::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            &attrs(JointKind::Miter, 0.7),
        );
        assert!(matches!(limited, Some(JointGeometry::Bevel(_))));

        let allowed = joint_geometry(
            Point::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            &attrs(JointKind::Miter, 0.71),
        );
        assert!(matches!(allowed, Some(JointGeometry::Miter(_))));
    }

    #[test]
    fn test_bevel_and_none() {
        let bevel = joint_geometry(
            Point::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            &attrs(JointKind::Bevel, 10.0),
        );
        let Some(JointGeometry::Bevel(tri)) = bevel else {
            panic!("expected a bevel, got {:?}", bevel);
        };
        // Turning right: the outside is above and to the right
        assert!(tri[1].close_to(Point::new(0.0, 1.0), 1e-6));
        assert!(tri[2].close_to(Point::new(1.0, 0.0), 1e-6));

        let none = joint_geometry(
            Point::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            &attrs(JointKind::None, 10.0),
        );
        assert!(none.is_none());
    }

    #[test]
    fn test_square_cap() {
        let quad = cap_geometry(Point::new(5.0, 5.0), Vec2::new(2.0, 0.0), 4.0).unwrap();
        assert_eq!(
            quad,
            [
                Point::new(5.0, 7.0),
                Point::new(7.0, 7.0),
                Point::new(7.0, 3.0),
                Point::new(5.0, 3.0),
            ]
        );
        assert!(cap_geometry(Point::ZERO, Vec2::ZERO, 4.0).is_none());
    }

    #[test]
    fn test_joint_and_cap_open_shapes() {
        let mut backend = RecordingBackend::with_capacity(64, 64, 8);
        {
            let mut acc = ShapeAccumulator::new(&mut backend);
            acc.begin_frame(Color::WHITE);
            let attributes = attrs(JointKind::Bevel, 0.0);
            stroke_joint(&mut acc, Point::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), &attributes)
                .unwrap();
            stroke_cap(&mut acc, Point::ZERO, Vec2::new(1.0, 0.0), &attributes).unwrap();
            stroke_cap(&mut acc, Point::ZERO, Vec2::ZERO, &attributes).unwrap();
            let stats = acc.end_frame();
            assert_eq!(stats.shapes, 2);
        }
        assert_eq!(backend.triangle_count(), 3);
    }
}
