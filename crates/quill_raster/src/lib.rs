//! Quill Raster
//!
//! Turns a [`CommandStream`](quill_core::CommandStream) of filled and stroked
//! paths into GPU triangle batches with analytic curve coverage.
//!
//! # Features
//!
//! - Loop–Blinn cubic classification (serpentine, loop, cusp) with per-vertex
//!   implicit coordinates, splitting loops at their double point
//! - Quadratic fills with the canonical `(0, 0) (½, 0) (1, 1)` parameterization
//! - Stroking by control polygon offsetting with adaptive subdivision
//! - Miter and bevel joints, square caps
//! - Batching into caller-provided buffers with early flushes on overflow
//!
//! # Example
//!
//! ```rust
//! use quill_core::{Attributes, Color, CommandStream, PathElement, Point, Primitive};
//! use quill_raster::{Rasterizer, RecordingBackend};
//!
//! let mut stream = CommandStream::new(Color::WHITE);
//! let path = stream.push_path(
//!     Point::new(0.0, 0.0),
//!     &[PathElement::Quadratic(Point::new(50.0, 100.0), Point::new(100.0, 0.0))],
//! );
//! stream.push(Primitive::fill(path, Attributes::default().with_color(Color::RED)));
//! stream.terminate();
//!
//! let mut backend = RecordingBackend::default();
//! let stats = Rasterizer::default().render(&stream, &mut backend).unwrap();
//! assert_eq!(stats.batches, 1);
//! assert_eq!(backend.triangle_count(), 2);
//! ```

pub mod backend;
pub mod bezier;
pub mod config;
pub mod cubic;
pub mod error;
pub mod fill;
pub mod hull;
pub mod joint;
pub mod layout;
pub mod offset;
pub mod quadratic;
pub mod shape;
pub mod stream;
pub mod stroke;

pub use backend::{Backend, RecordedBatch, RecordingBackend};
pub use config::RasterConfig;
pub use cubic::{CubicAnalysis, CubicKind};
pub use error::{BufferKind, ConfigError, RasterError, Result};
pub use layout::{GpuShape, GpuVertex, VertexLayout};
pub use shape::{Checkpoint, FrameStats, ShapeAccumulator};
pub use stream::Rasterizer;
pub use stroke::{StrokePiece, StrokePlan};
