//! Quill Raster Test Suite
//!
//! Headless regression testing for the Quill rasterizer. Every test case
//! draws on a [`Canvas`](quill_paint::Canvas), the frame is rasterized into a
//! recording backend, and a summary of the produced geometry is compared
//! against a stored reference.
//!
//! # Test Categories
//!
//! - **Fills**: polygons, quadratic and cubic curves of every class
//! - **Strokes**: joints, caps and curve offsetting
//! - **Curves**: arcs and degenerate control polygons
//! - **Stream**: transforms, clips, images and buffer overflow

pub mod harness;
pub mod runner;
pub mod tests;

pub use harness::{FrameSnapshot, TestContext, TestHarness, TestHarnessConfig, TestResult};
pub use runner::TestRunner;
