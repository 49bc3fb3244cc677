//! GPU buffer layout written by the rasterizer
//!
//! Buffers are owned by the backend and pre-sized to their capacities. The
//! rasterizer only writes into slots below the current cursors, and the backend
//! uploads `[..count]` of each buffer when a batch is drawn.

use quill_core::{Affine2D, Color, Point};

/// Implicit coefficients for straight (fully inside) triangles
pub const FLAT_COEFFS: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A vertex of a curve or interior triangle
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    /// Screen-space position
    pub position: [f32; 2],
    /// Implicit test `(k, l, m, sign)`, interpolated and evaluated as `sign * (k³ - l·m)`
    pub cubic: [f32; 4],
    /// Index of the owning shape in the shape buffer
    pub shape_index: u32,
}

impl GpuVertex {
    pub fn new(position: Point, cubic: [f32; 4], shape_index: u32) -> Self {
        Self {
            position: position.to_array(),
            cubic,
            shape_index,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.position[0], self.position[1])
    }
}

/// Per-shape data shared by all of a shape's vertices
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuShape {
    pub color: [f32; 4],
    /// Screen-space clip `[x0, y0, x1, y1]`
    pub clip: [f32; 4],
    /// Screen to texture coordinates, row-major 2x3
    pub uv_transform: [f32; 6],
    /// Non-zero when an image is bound for this shape
    pub textured: u32,
}

impl GpuShape {
    pub fn new(color: Color, textured: bool) -> Self {
        Self {
            color: color.to_array(),
            clip: [0.0; 4],
            uv_transform: Affine2D::IDENTITY.to_rows(),
            textured: textured as u32,
        }
    }
}

/// Backend-owned, pre-sized vertex, index and shape buffers
#[derive(Clone, Debug)]
pub struct VertexLayout {
    pub vertices: Vec<GpuVertex>,
    pub indices: Vec<u32>,
    pub shapes: Vec<GpuShape>,
}

impl VertexLayout {
    /// Allocate zeroed buffers of the given capacities
    pub fn new(max_vertex_count: usize, max_index_count: usize, max_shape_count: usize) -> Self {
        Self {
            vertices: vec![GpuVertex::default(); max_vertex_count],
            indices: vec![0; max_index_count],
            shapes: vec![GpuShape::default(); max_shape_count],
        }
    }

    pub fn max_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn max_index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn max_shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Raw bytes of the first `count` vertices, ready for upload
    pub fn vertex_bytes(&self, count: usize) -> &[u8] {
        bytemuck::cast_slice(&self.vertices[..count.min(self.vertices.len())])
    }

    /// Raw bytes of the first `count` indices
    pub fn index_bytes(&self, count: usize) -> &[u8] {
        bytemuck::cast_slice(&self.indices[..count.min(self.indices.len())])
    }

    /// Raw bytes of the first `count` shapes
    pub fn shape_bytes(&self, count: usize) -> &[u8] {
        bytemuck::cast_slice(&self.shapes[..count.min(self.shapes.len())])
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        // 64k vertices, 3 indices per vertex on average
        Self::new(1 << 16, 3 << 16, 1 << 12)
    }
}
