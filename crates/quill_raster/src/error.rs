//! Rasterizer error types

use thiserror::Error;

/// Which backend buffer ran out of room
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
    Shape,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BufferKind::Vertex => "vertex",
            BufferKind::Index => "index",
            BufferKind::Shape => "shape",
        };
        f.write_str(name)
    }
}

/// Errors that stop the rasterization of a frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    /// A single reservation is larger than the whole buffer, so flushing cannot help
    #[error("{buffer} buffer capacity exceeded: requested {requested}, capacity {capacity}")]
    CapacityExceeded {
        buffer: BufferKind,
        requested: usize,
        capacity: usize,
    },

    /// Recursive subdivision did not converge within its depth cap
    #[error("{operation} exceeded maximum subdivision depth {max_depth}")]
    SubdivisionDepthExceeded {
        operation: &'static str,
        max_depth: u32,
    },

    /// A jump command points outside the primitive array
    #[error("invalid jump target {target} (stream has {primitive_count} primitives)")]
    InvalidJump { target: u32, primitive_count: usize },
}

/// Errors raised while loading a [`RasterConfig`](crate::RasterConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML parsing error
    #[error("config parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values that parse but cannot be used
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, RasterError>;
