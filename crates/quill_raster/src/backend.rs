//! Backend contract
//!
//! The rasterizer never talks to a graphics API. It writes into the buffers a
//! [`Backend`] exposes through [`Backend::layout`] and asks the backend to draw
//! whatever has been written so far. A GPU backend uploads the first
//! `vertex_count`/`index_count`/`shape_count` entries and issues one draw call.

use std::collections::HashMap;

use quill_core::{Color, ImageId, Point, Size};

use crate::layout::{GpuShape, GpuVertex, VertexLayout};

/// A frame sink for rasterized batches
pub trait Backend {
    /// Start a frame
    fn begin(&mut self, clear_color: Color);

    /// Buffers the rasterizer writes batches into
    fn layout(&mut self) -> &mut VertexLayout;

    /// Draw the first `shape_count`/`vertex_count`/`index_count` entries of the layout
    ///
    /// Only called with a non-zero `index_count`. The buffers are reused for the
    /// next batch as soon as this returns.
    fn draw_batch(
        &mut self,
        image: Option<ImageId>,
        shape_count: u32,
        vertex_count: u32,
        index_count: u32,
    );

    /// Finish the frame
    fn end(&mut self);

    /// Pixel size of an image, used to build texture coordinates
    fn image_size(&self, _image: ImageId) -> Size {
        Size::new(1.0, 1.0)
    }
}

/// A copy of one drawn batch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedBatch {
    pub image: Option<ImageId>,
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
    pub shapes: Vec<GpuShape>,
}

impl RecordedBatch {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as vertex triples, resolved through the index buffer
    pub fn triangles(&self) -> impl Iterator<Item = [GpuVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Positions referenced by the index buffer, in index order
    pub fn indexed_points(&self) -> Vec<Point> {
        self.indices
            .iter()
            .map(|i| self.vertices[*i as usize].point())
            .collect()
    }
}

/// Headless backend that keeps a copy of every batch
///
/// Used by the unit tests and the scenario runner to inspect emitted geometry.
#[derive(Debug)]
pub struct RecordingBackend {
    layout: VertexLayout,
    image_sizes: HashMap<ImageId, Size>,
    pub clear_color: Option<Color>,
    pub batches: Vec<RecordedBatch>,
    pub frames_begun: u32,
    pub frames_ended: u32,
    /// Buffer bytes a GPU backend would have uploaded for the recorded batches
    pub uploaded_bytes: usize,
}

impl RecordingBackend {
    pub fn new(layout: VertexLayout) -> Self {
        Self {
            layout,
            image_sizes: HashMap::new(),
            clear_color: None,
            batches: Vec::new(),
            frames_begun: 0,
            frames_ended: 0,
            uploaded_bytes: 0,
        }
    }

    pub fn with_capacity(max_vertices: usize, max_indices: usize, max_shapes: usize) -> Self {
        Self::new(VertexLayout::new(max_vertices, max_indices, max_shapes))
    }

    /// Register the pixel size reported for `image`
    pub fn with_image(mut self, image: ImageId, size: Size) -> Self {
        self.image_sizes.insert(image, size);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.batches.iter().map(RecordedBatch::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }

    /// All triangles of the frame, in draw order
    pub fn triangles(&self) -> Vec<[GpuVertex; 3]> {
        self.batches.iter().flat_map(|b| b.triangles()).collect()
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new(VertexLayout::default())
    }
}

impl Backend for RecordingBackend {
    fn begin(&mut self, clear_color: Color) {
        self.frames_begun += 1;
        self.clear_color = Some(clear_color);
    }

    fn layout(&mut self) -> &mut VertexLayout {
        &mut self.layout
    }

    fn draw_batch(
        &mut self,
        image: Option<ImageId>,
        shape_count: u32,
        vertex_count: u32,
        index_count: u32,
    ) {
        self.uploaded_bytes += self.layout.vertex_bytes(vertex_count as usize).len()
            + self.layout.index_bytes(index_count as usize).len()
            + self.layout.shape_bytes(shape_count as usize).len();
        self.batches.push(RecordedBatch {
            image,
            vertices: self.layout.vertices[..vertex_count as usize].to_vec(),
            indices: self.layout.indices[..index_count as usize].to_vec(),
            shapes: self.layout.shapes[..shape_count as usize].to_vec(),
        });
    }

    fn end(&mut self) {
        self.frames_ended += 1;
    }

    fn image_size(&self, image: ImageId) -> Size {
        self.image_sizes
            .get(&image)
            .copied()
            .unwrap_or(Size::new(1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend_copies_batches() {
        let mut backend = RecordingBackend::with_capacity(8, 8, 2);
        backend.begin(Color::WHITE);
        {
            let layout = backend.layout();
            layout.vertices[0] = GpuVertex::new(Point::new(1.0, 2.0), [0.0; 4], 0);
            layout.vertices[1] = GpuVertex::new(Point::new(3.0, 4.0), [0.0; 4], 0);
            layout.vertices[2] = GpuVertex::new(Point::new(5.0, 6.0), [0.0; 4], 0);
            layout.indices[..3].copy_from_slice(&[0, 1, 2]);
        }
        backend.draw_batch(None, 1, 3, 3);
        backend.end();

        assert_eq!(backend.frames_begun, 1);
        assert_eq!(backend.frames_ended, 1);
        assert_eq!(backend.clear_color, Some(Color::WHITE));
        assert_eq!(backend.triangle_count(), 1);
        // Three vertices, three indices and one shape
        assert_eq!(backend.uploaded_bytes, 3 * 28 + 3 * 4 + 60);
        assert_eq!(
            backend.batches[0].indexed_points(),
            vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)]
        );
    }

    #[test]
    fn test_image_size_lookup() {
        let backend = RecordingBackend::default().with_image(ImageId(7), Size::new(64.0, 32.0));
        assert_eq!(backend.image_size(ImageId(7)), Size::new(64.0, 32.0));
        assert_eq!(backend.image_size(ImageId(8)), Size::new(1.0, 1.0));
    }
}
