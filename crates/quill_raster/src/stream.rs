//! Command stream driver
//!
//! Walks a [`CommandStream`] with an explicit cursor, so jumps can move it
//! forward or backward, and turns each fill or stroke into shapes through a
//! [`ShapeAccumulator`].

use quill_core::{Command, CommandStream, Primitive, END_OF_STREAM};
use tracing::{debug, error, warn};

use crate::backend::Backend;
use crate::config::RasterConfig;
use crate::error::{RasterError, Result};
use crate::fill::fill_path;
use crate::shape::{FrameStats, ShapeAccumulator};
use crate::stroke::stroke_path;

/// Where the cursor goes after a primitive
enum Flow {
    Next,
    Jump(usize),
    Stop,
}

/// Rasterizes command streams into a backend's buffers
#[derive(Clone, Debug, Default)]
pub struct Rasterizer {
    config: RasterConfig,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Render one frame
    ///
    /// On error the failing primitive's geometry is discarded (unless part of
    /// it already went out with an early flush), everything before it is
    /// flushed, and the frame is ended before the error is returned.
    pub fn render(&self, stream: &CommandStream, backend: &mut dyn Backend) -> Result<FrameStats> {
        let mut acc = ShapeAccumulator::new(backend);
        acc.begin_frame(stream.clear_color);

        let count = stream.primitives.len();
        let mut cursor = 0;
        while let Some(primitive) = stream.primitives.get(cursor) {
            match self.execute(&mut acc, stream, primitive) {
                Ok(Flow::Next) => cursor += 1,
                Ok(Flow::Jump(target)) => cursor = target,
                Ok(Flow::Stop) => break,
                Err(err) => {
                    error!(primitive = cursor, primitive_count = count, %err, "aborting command stream");
                    acc.end_frame();
                    return Err(err);
                }
            }
        }

        let stats = acc.end_frame();
        debug!(
            primitives = stats.primitives,
            shapes = stats.shapes,
            batches = stats.batches,
            "frame rendered"
        );
        Ok(stats)
    }

    fn execute(
        &self,
        acc: &mut ShapeAccumulator<'_>,
        stream: &CommandStream,
        primitive: &Primitive,
    ) -> Result<Flow> {
        let attributes = &primitive.attributes;
        let path = match primitive.command {
            Command::Jump(END_OF_STREAM) => return Ok(Flow::Stop),
            Command::Jump(target) => {
                let primitive_count = stream.primitives.len();
                if target as usize >= primitive_count {
                    return Err(RasterError::InvalidJump {
                        target,
                        primitive_count,
                    });
                }
                return Ok(Flow::Jump(target as usize));
            }
            Command::Fill(path) | Command::Stroke(path) => path,
        };

        let Some(elements) = path.elements(&stream.elements) else {
            warn!(
                start = path.start_index,
                count = path.count,
                elements = stream.elements.len(),
                "path outside the element array, skipped"
            );
            return Ok(Flow::Next);
        };

        acc.stats_mut().primitives += 1;
        // An image change flushes, so the checkpoint must come after it
        acc.bind_image(attributes.image);
        let checkpoint = acc.checkpoint();

        let drawn = match primitive.command {
            Command::Fill(_) => acc
                .next_shape(attributes)
                .and_then(|_| fill_path(acc, elements, path.start_point, &self.config)),
            _ => stroke_path(acc, elements, path.start_point, attributes, &self.config),
        };
        if let Err(err) = drawn {
            if !acc.rollback(checkpoint) {
                warn!("failed primitive was partially flushed");
            }
            return Err(err);
        }
        Ok(Flow::Next)
    }
}
