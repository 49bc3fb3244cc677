//! Test harness for geometry regression tests
//!
//! Provides infrastructure for running rasterizer tests, including:
//! - Canvas setup and frame rasterization into a recording backend
//! - Structural checks on the produced batches
//! - Snapshot comparison against stored references

use anyhow::{Context, Result};
use quill_paint::Canvas;
use quill_raster::{FrameStats, RasterConfig, Rasterizer, RecordingBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of a regression test
#[derive(Debug)]
pub enum TestResult {
    /// Test passed
    Passed,
    /// Test passed but the reference snapshot was created
    PassedWithNewReference,
    /// Test failed
    Failed { reason: String, output_path: PathBuf },
}

impl TestResult {
    pub fn is_passed(&self) -> bool {
        matches!(
            self,
            TestResult::Passed | TestResult::PassedWithNewReference
        )
    }
}

/// Summary of one rasterized frame, stored as the reference
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub primitives: u32,
    pub shapes: u32,
    pub batches: u32,
    pub early_flushes: u32,
    pub cubic_splits: u32,
    pub stroke_subdivisions: u32,
    pub max_depth_reached: u32,
    pub triangles: usize,
    /// Bytes of vertex, index and shape data uploaded for the frame
    pub upload_bytes: usize,
    /// Vertex bounds `[x0, y0, x1, y1]`, rounded to hundredths
    pub bounds: [f32; 4],
    /// Display form of the error that aborted the frame
    pub error: Option<String>,
}

impl FrameSnapshot {
    fn new(stats: FrameStats, backend: &RecordingBackend, error: Option<String>) -> Self {
        let round = |v: f32| (v * 100.0).round() / 100.0;
        let mut bounds = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
        for point in backend.batches.iter().flat_map(|b| b.indexed_points()) {
            bounds[0] = bounds[0].min(point.x);
            bounds[1] = bounds[1].min(point.y);
            bounds[2] = bounds[2].max(point.x);
            bounds[3] = bounds[3].max(point.y);
        }
        if bounds[0] > bounds[2] {
            bounds = [0.0; 4];
        }

        Self {
            primitives: stats.primitives,
            shapes: stats.shapes,
            batches: stats.batches,
            early_flushes: stats.early_flushes,
            cubic_splits: stats.cubic_splits,
            stroke_subdivisions: stats.stroke_subdivisions,
            max_depth_reached: stats.max_depth_reached,
            triangles: backend.triangle_count(),
            upload_bytes: backend.uploaded_bytes,
            bounds: bounds.map(round),
            error,
        }
    }
}

/// Context for a single test
#[derive(Default)]
pub struct TestContext {
    /// Canvas the test draws on
    pub canvas: Canvas,
    expect_error: bool,
}

impl TestContext {

    /// Get the canvas
    pub fn ctx(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Mark the frame as expected to abort with an error
    pub fn expect_error(&mut self) {
        self.expect_error = true;
    }
}

/// Regression test harness
pub struct TestHarness {
    rasterizer: Rasterizer,
    /// Output directory for snapshots
    pub output_dir: PathBuf,
    /// Reference snapshot directory
    pub reference_dir: PathBuf,
    buffer_capacity: (usize, usize, usize),
}

impl TestHarness {
    /// Create a new test harness with custom config
    pub fn with_config(config: TestHarnessConfig) -> Result<Self> {
        config
            .raster
            .validate()
            .context("Invalid rasterizer config")?;
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
        std::fs::create_dir_all(&config.reference_dir)
            .with_context(|| format!("Failed to create {}", config.reference_dir.display()))?;

        Ok(Self {
            rasterizer: Rasterizer::new(config.raster),
            output_dir: config.output_dir,
            reference_dir: config.reference_dir,
            buffer_capacity: (config.max_vertices, config.max_indices, config.max_shapes),
        })
    }

    /// Rasterize the context's frame and summarize it
    pub fn render(&self, ctx: &mut TestContext) -> (FrameSnapshot, RecordingBackend) {
        let (vertices, indices, shapes) = self.buffer_capacity;
        let mut backend = RecordingBackend::with_capacity(vertices, indices, shapes);
        let stream = ctx.canvas.finish();

        let snapshot = match self.rasterizer.render(&stream, &mut backend) {
            Ok(stats) => FrameSnapshot::new(stats, &backend, None),
            Err(err) => FrameSnapshot::new(FrameStats::default(), &backend, Some(err.to_string())),
        };
        (snapshot, backend)
    }

    /// Run a test and compare its snapshot with the reference
    pub fn run_test<F>(&self, name: &str, test_fn: F) -> Result<(TestResult, FrameSnapshot)>
    where
        F: FnOnce(&mut TestContext),
    {
        let mut ctx = TestContext::default();
        test_fn(&mut ctx);
        let expect_error = ctx.expect_error;

        let (snapshot, backend) = self.render(&mut ctx);
        let output_path = self.output_path(name);
        let reference_path = self.reference_path(name);

        tracing::info!(
            "Test '{}': {} primitives, {} shapes, {} batches, {} triangles",
            name,
            snapshot.primitives,
            snapshot.shapes,
            snapshot.batches,
            snapshot.triangles
        );
        write_snapshot(&output_path, &snapshot)?;

        if let Some(reason) = check_frame(&backend, &snapshot, expect_error) {
            tracing::warn!("Test '{}' FAILED: {}", name, reason);
            let result = TestResult::Failed {
                reason,
                output_path,
            };
            return Ok((result, snapshot));
        }

        let result = if reference_path.exists() {
            let reference = read_snapshot(&reference_path)?;
            if reference == snapshot {
                tracing::info!("Test '{}' PASSED", name);
                TestResult::Passed
            } else {
                tracing::warn!("Test '{}' FAILED: snapshot differs from reference", name);
                TestResult::Failed {
                    reason: format!("expected {:?}, got {:?}", reference, snapshot),
                    output_path,
                }
            }
        } else {
            std::fs::copy(&output_path, &reference_path)
                .context("Failed to create reference snapshot")?;
            tracing::info!(
                "Test '{}' created new reference at {:?}",
                name,
                reference_path
            );
            TestResult::PassedWithNewReference
        };
        Ok((result, snapshot))
    }

    /// Get the reference snapshot path for a test
    pub fn reference_path(&self, name: &str) -> PathBuf {
        self.reference_dir.join(format!("{}.toml", snapshot_file_stem(name)))
    }

    /// Get the output snapshot path for a test
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.toml", snapshot_file_stem(name)))
    }
}

fn snapshot_file_stem(name: &str) -> String {
    name.replace("::", "_")
}

fn write_snapshot(path: &Path, snapshot: &FrameSnapshot) -> Result<()> {
    let text = toml::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn read_snapshot(path: &Path) -> Result<FrameSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Structural checks every frame must pass, independent of the reference
fn check_frame(backend: &RecordingBackend, snapshot: &FrameSnapshot, expect_error: bool) -> Option<String> {
    match (&snapshot.error, expect_error) {
        (Some(err), false) => return Some(format!("frame aborted: {}", err)),
        (None, true) => return Some("frame was expected to abort".to_string()),
        _ => {}
    }
    if backend.frames_begun != 1 || backend.frames_ended != 1 {
        return Some(format!(
            "frame begun {} times and ended {} times",
            backend.frames_begun, backend.frames_ended
        ));
    }

    for (i, batch) in backend.batches.iter().enumerate() {
        if batch.indices.is_empty() || batch.indices.len() % 3 != 0 {
            return Some(format!("batch {} has {} indices", i, batch.indices.len()));
        }
        if let Some(index) = batch.indices.iter().find(|&&ix| ix as usize >= batch.vertices.len()) {
            return Some(format!("batch {} indexes vertex {} past the end", i, index));
        }
        for vertex in &batch.vertices {
            if vertex.shape_index as usize >= batch.shapes.len() {
                return Some(format!("batch {} vertex references shape {}", i, vertex.shape_index));
            }
            if !vertex.position.iter().chain(&vertex.cubic).all(|v| v.is_finite()) {
                return Some(format!("batch {} has a non-finite vertex {:?}", i, vertex));
            }
        }
    }
    None
}

/// Configuration for test harness
#[derive(Debug, Clone)]
pub struct TestHarnessConfig {
    /// Output directory for test results
    pub output_dir: PathBuf,
    /// Reference snapshot directory
    pub reference_dir: PathBuf,
    /// Vertex buffer capacity of the recording backend
    pub max_vertices: usize,
    /// Index buffer capacity of the recording backend
    pub max_indices: usize,
    /// Shape buffer capacity of the recording backend
    pub max_shapes: usize,
    /// Rasterizer tuning
    pub raster: RasterConfig,
}

impl Default for TestHarnessConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test_output"),
            reference_dir: PathBuf::from("test_output/references"),
            max_vertices: 4096,
            max_indices: 8192,
            max_shapes: 256,
            raster: RasterConfig::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_harness(tag: &str) -> TestHarness {
        let root = std::env::temp_dir().join(format!("quill_harness_{}_{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        TestHarness::with_config(TestHarnessConfig {
            output_dir: root.clone(),
            reference_dir: root.join("references"),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_output_snapshot_written() {
        let harness = temp_harness("output");
        harness
            .run_test("suite::case", |ctx| ctx.ctx().circle_fill(10.0, 10.0, 5.0))
            .unwrap();
        let path = harness.output_path("suite::case");
        assert!(path.ends_with("suite_case.toml"));
        assert_eq!(read_snapshot(&path).unwrap().primitives, 1);
    }

    #[test]
    fn test_reference_created_then_matched() {
        let harness = temp_harness("reference");
        let draw = |ctx: &mut TestContext| ctx.ctx().rectangle_fill(100.0, 100.0, 200.0, 100.0);

        let (first, _) = harness.run_test("simple_rect", draw).unwrap();
        assert!(matches!(first, TestResult::PassedWithNewReference));
        let (second, snapshot) = harness.run_test("simple_rect", draw).unwrap();
        assert!(matches!(second, TestResult::Passed));
        assert_eq!(snapshot.shapes, 1);

        let snapshot = read_snapshot(&harness.reference_path("simple_rect")).unwrap();
        assert_eq!(snapshot.triangles, 4);
        // Four flat fan triangles over twelve vertices and one shape
        assert_eq!(snapshot.upload_bytes, 12 * 28 + 12 * 4 + 60);
        assert_eq!(snapshot.bounds, [100.0, 100.0, 300.0, 200.0]);
    }

    #[test]
    fn test_changed_geometry_fails() {
        let harness = temp_harness("changed");
        harness
            .run_test("rect", |ctx| ctx.ctx().rectangle_fill(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let (result, _) = harness
            .run_test("rect", |ctx| ctx.ctx().rectangle_fill(0.0, 0.0, 20.0, 10.0))
            .unwrap();
        assert!(!result.is_passed());
    }

    #[test]
    fn test_unexpected_error_fails() {
        let harness = temp_harness("error");
        let (result, _) = harness
            .run_test("expected", |ctx| {
                ctx.ctx().circle_fill(10.0, 10.0, 5.0);
                ctx.expect_error();
            })
            .unwrap();
        assert!(matches!(result, TestResult::Failed { .. }));
    }
}
