//! Shape accumulation and batch flushing
//!
//! [`ShapeAccumulator`] is the single mutable context of a rasterization pass.
//! It owns the write cursors into the backend's [`VertexLayout`], the state of
//! the shape currently being emitted, and the frame statistics. Every curve
//! filler and stroker writes its triangles through it.
//!
//! A shape is finalized lazily: its clip rectangle and texture transform depend
//! on the extents of all of its vertices, so they are written when the next
//! shape opens or the batch is flushed.

use quill_core::{Affine2D, Attributes, Color, ImageId, Point, Rect, Size};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::{BufferKind, RasterError, Result};
use crate::layout::{GpuShape, GpuVertex, FLAT_COEFFS};

/// Counters collected over one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Primitives executed (jumps excluded)
    pub primitives: u32,
    /// Shapes opened, including shapes re-opened after an early flush
    pub shapes: u32,
    /// Batches handed to the backend
    pub batches: u32,
    /// Batches flushed because a buffer ran out of room
    pub early_flushes: u32,
    /// Loop curves split at their double point
    pub cubic_splits: u32,
    /// Stroke segments subdivided because their offset left the tolerance band
    pub stroke_subdivisions: u32,
    /// Deepest recursion reached by either subdivision
    pub max_depth_reached: u32,
}

/// Running min/max of a set of points
#[derive(Clone, Copy, Debug, PartialEq)]
struct Extents {
    min: Point,
    max: Point,
}

impl Extents {
    const EMPTY: Extents = Extents {
        min: Point::new(f32::MAX, f32::MAX),
        max: Point::new(-f32::MAX, -f32::MAX),
    };

    fn include(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    fn to_rect(self) -> Option<Rect> {
        (self.min.x <= self.max.x && self.min.y <= self.max.y)
            .then(|| Rect::from_points(self.min, self.max))
    }
}

#[derive(Clone, Copy, Debug)]
struct ShapeState {
    attributes: Attributes,
    image_size: Size,
    user_extents: Extents,
    screen_extents: Extents,
}

impl ShapeState {
    fn new(attributes: Attributes, image_size: Size) -> Self {
        Self {
            attributes,
            image_size,
            user_extents: Extents::EMPTY,
            screen_extents: Extents::EMPTY,
        }
    }

    /// Screen position to texture coordinates
    ///
    /// The image's source region is stretched over the shape's user-space
    /// bounding box. Untextured and empty shapes get the identity.
    fn uv_transform(&self) -> Affine2D {
        if self.attributes.image.is_none() {
            return Affine2D::IDENTITY;
        }
        let Some(dest) = self.user_extents.to_rect() else {
            return Affine2D::IDENTITY;
        };
        let tex = self.image_size;
        if dest.width() <= 0.0 || dest.height() <= 0.0 || tex.width <= 0.0 || tex.height <= 0.0 {
            return Affine2D::IDENTITY;
        }
        let src = self
            .attributes
            .source_region
            .unwrap_or(Rect::new(0.0, 0.0, tex.width, tex.height));

        let src_to_image = Affine2D::scale(1.0 / tex.width, 1.0 / tex.height)
            .then(&Affine2D::translation(src.x(), src.y()));
        let dest_to_src = Affine2D::scale(src.width() / dest.width(), src.height() / dest.height());
        let user_to_dest = Affine2D::translation(-dest.x(), -dest.y());

        src_to_image
            .then(&dest_to_src)
            .then(&user_to_dest)
            .then(&self.attributes.transform.inverse())
    }

    fn clip(&self) -> Rect {
        match self.screen_extents.to_rect() {
            Some(extents) => self.attributes.clip.intersection_clamped(&extents),
            None => Rect::ZERO,
        }
    }
}

/// Cursor snapshot taken before a primitive, see [`ShapeAccumulator::rollback`]
#[derive(Clone, Copy, Debug)]
pub struct Checkpoint {
    vertex_count: usize,
    index_count: usize,
    shape_count: usize,
    generation: u64,
    current: Option<ShapeState>,
}

/// Writes shapes, vertices and indices into a backend's buffers
pub struct ShapeAccumulator<'a> {
    backend: &'a mut dyn Backend,
    vertex_count: usize,
    index_count: usize,
    shape_count: usize,
    image: Option<ImageId>,
    current: Option<ShapeState>,
    /// Bumped on every flush, so checkpoints know whether their cursors are stale
    generation: u64,
    stats: FrameStats,
}

impl<'a> ShapeAccumulator<'a> {
    pub fn new(backend: &'a mut dyn Backend) -> Self {
        Self {
            backend,
            vertex_count: 0,
            index_count: 0,
            shape_count: 0,
            image: None,
            current: None,
            generation: 0,
            stats: FrameStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Frame and batch lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    pub fn begin_frame(&mut self, clear_color: Color) {
        self.backend.begin(clear_color);
        self.vertex_count = 0;
        self.index_count = 0;
        self.shape_count = 0;
        self.image = None;
        self.current = None;
        self.stats = FrameStats::default();
    }

    /// Flush the last batch and finish the frame
    pub fn end_frame(&mut self) -> FrameStats {
        self.flush();
        self.backend.end();
        self.stats
    }

    /// Bind the image for subsequent shapes, flushing if it changes
    pub fn bind_image(&mut self, image: Option<ImageId>) {
        if image != self.image {
            self.flush();
            self.image = image;
        }
    }

    /// Finalize the open shape and hand the batch to the backend
    ///
    /// The backend is only called when the batch holds triangles. Cursors are
    /// reset either way.
    pub fn flush(&mut self) {
        self.finalize_shape();
        if self.index_count > 0 {
            debug!(
                shapes = self.shape_count,
                vertices = self.vertex_count,
                indices = self.index_count,
                "drawing batch"
            );
            self.backend.draw_batch(
                self.image,
                self.shape_count as u32,
                self.vertex_count as u32,
                self.index_count as u32,
            );
            self.stats.batches += 1;
        }
        self.vertex_count = 0;
        self.index_count = 0;
        self.shape_count = 0;
        self.current = None;
        self.generation += 1;
    }

    /// Flush because a buffer is full, then re-open the current shape
    fn flush_early(&mut self, buffer: BufferKind) {
        let reopen = self.current;
        self.flush();
        warn!(%buffer, "batch capacity exceeded, flushed early");
        self.stats.early_flushes += 1;
        if let Some(state) = reopen {
            self.open_shape(ShapeState::new(state.attributes, state.image_size));
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Shapes
    // ═══════════════════════════════════════════════════════════════════════

    /// Close the current shape and open a new one for `attributes`
    pub fn next_shape(&mut self, attributes: &Attributes) -> Result<u32> {
        self.finalize_shape();
        self.current = None;

        let max_shapes = self.backend.layout().max_shape_count();
        if max_shapes == 0 {
            return Err(RasterError::CapacityExceeded {
                buffer: BufferKind::Shape,
                requested: 1,
                capacity: 0,
            });
        }
        if self.shape_count >= max_shapes {
            self.flush_early(BufferKind::Shape);
        }

        let image_size = attributes
            .image
            .map(|image| self.backend.image_size(image))
            .unwrap_or(Size::new(1.0, 1.0));
        Ok(self.open_shape(ShapeState::new(*attributes, image_size)))
    }

    fn open_shape(&mut self, state: ShapeState) -> u32 {
        let index = self.shape_count;
        self.backend.layout().shapes[index] =
            GpuShape::new(state.attributes.color, state.attributes.image.is_some());
        self.shape_count += 1;
        self.current = Some(state);
        self.stats.shapes += 1;
        index as u32
    }

    fn finalize_shape(&mut self) {
        let Some(state) = self.current else {
            return;
        };
        let index = self.shape_count - 1;
        let shape = &mut self.backend.layout().shapes[index];
        shape.uv_transform = state.uv_transform().to_rows();
        shape.clip = state.clip().to_corners();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Vertices and indices
    // ═══════════════════════════════════════════════════════════════════════

    /// Make room for a group of vertices and the indices referencing them
    ///
    /// Returns the buffer index of the first vertex. A group never straddles two
    /// batches: if it does not fit, the batch is flushed first.
    pub fn reserve(&mut self, vertices: usize, indices: usize) -> Result<u32> {
        let layout = self.backend.layout();
        let (max_vertices, max_indices) = (layout.max_vertex_count(), layout.max_index_count());

        if vertices > max_vertices {
            return Err(RasterError::CapacityExceeded {
                buffer: BufferKind::Vertex,
                requested: vertices,
                capacity: max_vertices,
            });
        }
        if indices > max_indices {
            return Err(RasterError::CapacityExceeded {
                buffer: BufferKind::Index,
                requested: indices,
                capacity: max_indices,
            });
        }

        if self.vertex_count + vertices > max_vertices {
            self.flush_early(BufferKind::Vertex);
        } else if self.index_count + indices > max_indices {
            self.flush_early(BufferKind::Index);
        }
        Ok(self.vertex_count as u32)
    }

    /// Append a vertex given in user space
    ///
    /// Callers must have reserved room with [`reserve`](Self::reserve).
    pub(crate) fn push_vertex(&mut self, pos: Point, cubic: [f32; 4]) {
        let shape_index = self.shape_count.saturating_sub(1) as u32;
        let screen = match self.current.as_mut() {
            Some(state) => {
                let screen = state.attributes.transform.transform_point(pos);
                state.user_extents.include(pos);
                state.screen_extents.include(screen);
                screen
            }
            None => pos,
        };
        let index = self.vertex_count;
        self.backend.layout().vertices[index] = GpuVertex::new(screen, cubic, shape_index);
        self.vertex_count += 1;
    }

    pub(crate) fn push_indices(&mut self, base: u32, offsets: &[u32]) {
        let start = self.index_count;
        let slots = &mut self.backend.layout().indices[start..start + offsets.len()];
        for (slot, offset) in slots.iter_mut().zip(offsets) {
            *slot = base + offset;
        }
        self.index_count += offsets.len();
    }

    /// One triangle with per-vertex implicit coefficients
    pub fn emit_triangle(&mut self, points: [Point; 3], cubic: [[f32; 4]; 3]) -> Result<()> {
        let base = self.reserve(3, 3)?;
        for (p, c) in points.into_iter().zip(cubic) {
            self.push_vertex(p, c);
        }
        self.push_indices(base, &[0, 1, 2]);
        Ok(())
    }

    /// Independent triangles, three consecutive vertices each
    pub fn emit_triangle_list(&mut self, vertices: &[(Point, [f32; 4])]) -> Result<()> {
        let base = self.reserve(vertices.len(), vertices.len())?;
        for (p, c) in vertices {
            self.push_vertex(*p, *c);
        }
        let offsets: SmallVec<[u32; 6]> = (0..vertices.len() as u32).collect();
        self.push_indices(base, &offsets);
        Ok(())
    }

    /// One fully covered triangle
    pub fn emit_flat_triangle(&mut self, points: [Point; 3]) -> Result<()> {
        self.emit_triangle(points, [FLAT_COEFFS; 3])
    }

    /// A fully covered quad, split along its `0-2` diagonal
    pub fn emit_flat_quad(&mut self, points: [Point; 4]) -> Result<()> {
        let base = self.reserve(4, 6)?;
        for p in points {
            self.push_vertex(p, FLAT_COEFFS);
        }
        self.push_indices(base, &[0, 1, 2, 0, 2, 3]);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Error recovery and statistics
    // ═══════════════════════════════════════════════════════════════════════

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            vertex_count: self.vertex_count,
            index_count: self.index_count,
            shape_count: self.shape_count,
            generation: self.generation,
            current: self.current,
        }
    }

    /// Drop everything emitted since `checkpoint`
    ///
    /// Returns `false` when a flush happened in between; flushed geometry has
    /// already reached the backend and cannot be taken back.
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> bool {
        if checkpoint.generation != self.generation {
            return false;
        }
        self.vertex_count = checkpoint.vertex_count;
        self.index_count = checkpoint.index_count;
        self.shape_count = checkpoint.shape_count;
        self.current = checkpoint.current;
        true
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut FrameStats {
        &mut self.stats
    }

    pub(crate) fn record_depth(&mut self, depth: u32) {
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn shape_count(&self) -> usize {
        self.shape_count
    }
}
