//! Quill Core
//!
//! Value types shared by every Quill crate:
//!
//! - **Geometry**: points, vectors, rectangles, affine transforms and colors
//! - **Paths**: flat path element arrays and the descriptors referencing them
//! - **Primitives**: fill/stroke/jump commands with their paint attributes
//!
//! # Example
//!
//! ```rust
//! use quill_core::{Attributes, CommandStream, Color, PathElement, Point, Primitive};
//!
//! let mut stream = CommandStream::new(Color::WHITE);
//! let path = stream.push_path(
//!     Point::new(0.0, 0.0),
//!     &[
//!         PathElement::Line(Point::new(100.0, 0.0)),
//!         PathElement::Line(Point::new(100.0, 100.0)),
//!     ],
//! );
//! stream.push(Primitive::fill(path, Attributes::default().with_color(Color::RED)));
//! stream.terminate();
//! assert_eq!(stream.primitives.len(), 2);
//! ```

pub mod geometry;
pub mod path;
pub mod primitive;

pub use geometry::{Affine2D, Color, Point, Rect, Size, Vec2};
pub use path::{PathDescriptor, PathElement};
pub use primitive::{
    Attributes, CapKind, Command, CommandStream, ImageId, JointKind, Primitive, END_OF_STREAM,
};
