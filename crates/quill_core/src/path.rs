//! Path elements
//!
//! Paths are stored flat: every primitive references a run of elements inside
//! one shared element array, plus the point the run starts from.

use crate::geometry::Point;

/// One segment of a path
///
/// Control points do not include the segment's start, which is the end point
/// of the previous element (or the path's start point).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathElement {
    /// Start a new subpath
    Move(Point),
    Line(Point),
    Quadratic(Point, Point),
    Cubic(Point, Point, Point),
}

impl PathElement {
    /// The point the cursor sits on after this element
    pub fn end_point(&self) -> Point {
        match *self {
            PathElement::Move(p) | PathElement::Line(p) => p,
            PathElement::Quadratic(_, p) => p,
            PathElement::Cubic(_, _, p) => p,
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, PathElement::Move(_))
    }
}

/// A run of elements inside a shared element array
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathDescriptor {
    pub start_index: u32,
    pub count: u32,
    pub start_point: Point,
}

impl PathDescriptor {
    pub fn new(start_index: u32, count: u32, start_point: Point) -> Self {
        Self {
            start_index,
            count,
            start_point,
        }
    }

    /// Resolve the run against the element array
    ///
    /// Returns `None` if the run does not fit inside `elements`.
    pub fn elements<'a>(&self, elements: &'a [PathElement]) -> Option<&'a [PathElement]> {
        let start = self.start_index as usize;
        let end = start.checked_add(self.count as usize)?;
        elements.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_point() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(PathElement::Line(p).end_point(), p);
        assert_eq!(PathElement::Quadratic(Point::ZERO, p).end_point(), p);
        assert_eq!(PathElement::Cubic(Point::ZERO, Point::ZERO, p).end_point(), p);
        assert!(PathElement::Move(p).is_move());
    }

    #[test]
    fn test_descriptor_resolves_run() {
        let elements = vec![
            PathElement::Line(Point::new(1.0, 0.0)),
            PathElement::Line(Point::new(1.0, 1.0)),
            PathElement::Line(Point::new(0.0, 1.0)),
        ];
        let desc = PathDescriptor::new(1, 2, Point::ZERO);
        assert_eq!(desc.elements(&elements).map(|e| e.len()), Some(2));

        let overrun = PathDescriptor::new(2, 5, Point::ZERO);
        assert!(overrun.elements(&elements).is_none());
    }
}
