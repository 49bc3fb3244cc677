//! Quill Paint/Canvas API
//!
//! A stateful 2D drawing API that records into a
//! [`CommandStream`](quill_core::CommandStream) for the rasterizer.
//!
//! # Features
//!
//! - Path drawing (lines, quadratics, cubics, arcs)
//! - Shape primitives (rect, rounded rect, ellipse, circle)
//! - Fills and strokes with joints, caps and images
//! - Transform and clip stacks
//!
//! # Example
//!
//! ```rust
//! use quill_paint::{Canvas, Color, RecordingBackend, Rasterizer};
//!
//! let mut canvas = Canvas::new(Color::WHITE);
//! canvas.set_color(Color::BLUE);
//! canvas.move_to(10.0, 10.0);
//! canvas.cubic_to(40.0, -20.0, 60.0, 40.0, 90.0, 10.0);
//! canvas.set_width(3.0);
//! canvas.stroke();
//! canvas.circle_fill(50.0, 50.0, 20.0);
//!
//! let mut backend = RecordingBackend::default();
//! let stats = canvas.render(&Rasterizer::default(), &mut backend).unwrap();
//! assert_eq!(stats.primitives, 2);
//! ```

pub mod context;
pub mod shapes;

pub use context::{Canvas, CanvasDefaults, MAX_STACK_DEPTH};

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports for convenience
// ─────────────────────────────────────────────────────────────────────────────

pub use quill_core::{
    Affine2D, Attributes, CapKind, Color, CommandStream, ImageId, JointKind, PathElement, Point,
    Rect,
};
pub use quill_raster::{Backend, FrameStats, RasterError, Rasterizer, RecordingBackend};
