//! Primitive records and command streams
//!
//! A frame is described by two flat arrays: the path elements and the
//! primitives referencing runs of them. The rasterizer walks the primitive
//! array with a cursor, so `Jump` commands can chain streams recorded
//! separately.

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine2D, Color, Point, Rect};
use crate::path::{PathDescriptor, PathElement};

/// Jump target that terminates a command stream
pub const END_OF_STREAM: u32 = u32::MAX;

/// Opaque handle to a backend-owned image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

/// How consecutive stroked segments are joined
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    /// Sharp corner, falling back to bevel past the excursion limit
    #[default]
    Miter,
    /// Single triangle cutting the corner
    Bevel,
    /// Segments are left unjoined
    None,
}

/// How open subpath ends are finished
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapKind {
    /// Flat end at the endpoint
    #[default]
    None,
    /// Half-width square extension past the endpoint
    Square,
}

/// Paint state snapshotted into every primitive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attributes {
    pub color: Color,
    /// Clip in screen space
    pub clip: Rect,
    /// User space to screen space
    pub transform: Affine2D,
    pub image: Option<ImageId>,
    /// Region of the image mapped onto the shape, `None` for the whole image
    pub source_region: Option<Rect>,
    pub width: f32,
    pub tolerance: f32,
    pub joint: JointKind,
    /// Maximum distance a miter tip may extend past the half-width circle
    pub max_joint_excursion: f32,
    pub cap: CapKind,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            clip: Rect::INFINITE,
            transform: Affine2D::IDENTITY,
            image: None,
            source_region: None,
            width: 1.0,
            tolerance: 1.0,
            joint: JointKind::Miter,
            max_joint_excursion: 0.0,
            cap: CapKind::None,
        }
    }
}

impl Attributes {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_joint(mut self, joint: JointKind, max_excursion: f32) -> Self {
        self.joint = joint;
        self.max_joint_excursion = max_excursion;
        self
    }

    pub fn with_cap(mut self, cap: CapKind) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_transform(mut self, transform: Affine2D) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_image(mut self, image: ImageId, source_region: Option<Rect>) -> Self {
        self.image = Some(image);
        self.source_region = source_region;
        self
    }
}

/// What a primitive asks the rasterizer to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Fill(PathDescriptor),
    Stroke(PathDescriptor),
    /// Continue at another primitive index, or stop at [`END_OF_STREAM`]
    Jump(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive {
    pub command: Command,
    pub attributes: Attributes,
}

impl Primitive {
    pub fn fill(path: PathDescriptor, attributes: Attributes) -> Self {
        Self {
            command: Command::Fill(path),
            attributes,
        }
    }

    pub fn stroke(path: PathDescriptor, attributes: Attributes) -> Self {
        Self {
            command: Command::Stroke(path),
            attributes,
        }
    }

    pub fn jump(target: u32) -> Self {
        Self {
            command: Command::Jump(target),
            attributes: Attributes::default(),
        }
    }
}

/// One frame's worth of recorded geometry
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandStream {
    pub clear_color: Color,
    pub elements: Vec<PathElement>,
    pub primitives: Vec<Primitive>,
}

impl CommandStream {
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            elements: Vec::new(),
            primitives: Vec::new(),
        }
    }

    /// Append a path and return the descriptor referencing it
    pub fn push_path(&mut self, start_point: Point, path: &[PathElement]) -> PathDescriptor {
        let start_index = self.elements.len() as u32;
        self.elements.extend_from_slice(path);
        PathDescriptor::new(start_index, path.len() as u32, start_point)
    }

    pub fn push(&mut self, primitive: Primitive) -> u32 {
        self.primitives.push(primitive);
        (self.primitives.len() - 1) as u32
    }

    /// Terminate the stream with the end-of-stream jump
    pub fn terminate(&mut self) {
        self.primitives.push(Primitive::jump(END_OF_STREAM));
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
