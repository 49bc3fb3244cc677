//! Canvas - stateful drawing API recording into a command stream
//!
//! The canvas keeps the current paint attributes, a transform stack and a
//! clip stack, and builds paths element by element. Every `fill`/`stroke`
//! snapshots the attributes into a primitive, so later state changes never
//! affect geometry already recorded.

use quill_core::{
    Affine2D, Attributes, CapKind, Color, CommandStream, ImageId, JointKind, PathDescriptor,
    PathElement, Point, Primitive, Rect,
};
use quill_raster::{Backend, FrameStats, RasterError, Rasterizer};
use smallvec::{smallvec, SmallVec};
use tracing::warn;

use crate::shapes::{self, Outline};

/// Maximum number of pushed transforms or clips
pub const MAX_STACK_DEPTH: usize = 64;

/// Initial paint state of a [`Canvas`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasDefaults {
    pub color: Color,
    pub width: f32,
    pub tolerance: f32,
    pub joint: JointKind,
    pub max_joint_excursion: f32,
    pub cap: CapKind,
    pub clear_color: Color,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            tolerance: 1.0,
            joint: JointKind::Miter,
            max_joint_excursion: 0.0,
            cap: CapKind::None,
            clear_color: Color::WHITE,
        }
    }
}

impl CanvasDefaults {
    fn attributes(&self) -> Attributes {
        Attributes {
            color: self.color,
            width: self.width,
            tolerance: self.tolerance,
            joint: self.joint,
            max_joint_excursion: self.max_joint_excursion,
            cap: self.cap,
            ..Attributes::default()
        }
    }
}

/// Records drawing calls into a [`CommandStream`]
#[derive(Clone, Debug)]
pub struct Canvas {
    stream: CommandStream,
    /// Elements of the path under construction
    path: Vec<PathElement>,
    path_start: Point,
    subpath_start: Point,
    last_point: Point,
    attributes: Attributes,
    /// Composed transforms, the bottom entry is the identity
    matrix_stack: SmallVec<[Affine2D; 8]>,
    /// Screen space clips, the bottom entry is unbounded
    clip_stack: SmallVec<[Rect; 8]>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::with_defaults(CanvasDefaults::default())
    }
}

impl Canvas {
    /// Create an empty canvas clearing to `clear_color`
    pub fn new(clear_color: Color) -> Self {
        Self::with_defaults(CanvasDefaults {
            clear_color,
            ..CanvasDefaults::default()
        })
    }

    pub fn with_defaults(defaults: CanvasDefaults) -> Self {
        Self {
            stream: CommandStream::new(defaults.clear_color),
            path: Vec::new(),
            path_start: Point::ZERO,
            subpath_start: Point::ZERO,
            last_point: Point::ZERO,
            attributes: defaults.attributes(),
            matrix_stack: smallvec![Affine2D::IDENTITY],
            clip_stack: smallvec![Rect::INFINITE],
        }
    }

    /// Primitives and elements recorded so far
    pub fn stream(&self) -> &CommandStream {
        &self.stream
    }

    /// Current attributes, without the stack state
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Attributes
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn set_color(&mut self, color: Color) {
        self.attributes.color = color;
    }

    pub fn set_width(&mut self, width: f32) {
        self.attributes.width = width;
    }

    pub fn set_tolerance(&mut self, tolerance: f32) {
        self.attributes.tolerance = tolerance;
    }

    pub fn set_joint(&mut self, joint: JointKind) {
        self.attributes.joint = joint;
    }

    pub fn set_max_joint_excursion(&mut self, max_excursion: f32) {
        self.attributes.max_joint_excursion = max_excursion;
    }

    pub fn set_cap(&mut self, cap: CapKind) {
        self.attributes.cap = cap;
    }

    /// Attach an image to subsequent shapes; the whole image is used
    pub fn set_image(&mut self, image: Option<ImageId>) {
        self.attributes.image = image;
        self.attributes.source_region = None;
    }

    pub fn set_image_source_region(&mut self, region: Option<Rect>) {
        self.attributes.source_region = region;
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.stream.clear_color = color;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Transform and clip stacks
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current user space to screen space transform
    pub fn transform(&self) -> Affine2D {
        self.matrix_stack.last().copied().unwrap_or_default()
    }

    /// Current clip in screen space
    pub fn clip(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or(Rect::INFINITE)
    }

    /// Push `matrix`, applied before the current transform
    pub fn matrix_push(&mut self, matrix: Affine2D) {
        if self.matrix_stack.len() > MAX_STACK_DEPTH {
            warn!(depth = MAX_STACK_DEPTH, "matrix stack overflow, push ignored");
            return;
        }
        let composed = self.transform().then(&matrix);
        self.matrix_stack.push(composed);
    }

    pub fn matrix_pop(&mut self) {
        if self.matrix_stack.len() <= 1 {
            warn!("matrix stack underflow, pop ignored");
            return;
        }
        self.matrix_stack.pop();
    }

    /// Intersect the clip with a user space rectangle
    ///
    /// The rectangle's corners are transformed to screen space and their
    /// bounding box is intersected with the current clip.
    pub fn clip_push(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if self.clip_stack.len() > MAX_STACK_DEPTH {
            warn!(depth = MAX_STACK_DEPTH, "clip stack overflow, push ignored");
            return;
        }
        let transform = self.transform();
        let corners = [
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ];
        let bounds = Rect::bounding(corners.map(|p| transform.transform_point(p)))
            .unwrap_or(Rect::ZERO);
        let clip = bounds.intersection_clamped(&self.clip());
        self.clip_stack.push(clip);
    }

    pub fn clip_pop(&mut self) {
        if self.clip_stack.len() <= 1 {
            warn!("clip stack underflow, pop ignored");
            return;
        }
        self.clip_stack.pop();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Path construction
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current point
    pub fn position(&self) -> Point {
        self.last_point
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        self.path.push(PathElement::Move(p));
        self.subpath_start = p;
        self.last_point = p;
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        self.path.push(PathElement::Line(p));
        self.last_point = p;
    }

    pub fn quadratic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let p = Point::new(x2, y2);
        self.path.push(PathElement::Quadratic(Point::new(x1, y1), p));
        self.last_point = p;
    }

    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        let p = Point::new(x3, y3);
        self.path
            .push(PathElement::Cubic(Point::new(x1, y1), Point::new(x2, y2), p));
        self.last_point = p;
    }

    /// Line back to the subpath start unless already there
    pub fn close_path(&mut self) {
        if self.last_point != self.subpath_start {
            let start = self.subpath_start;
            self.line_to(start.x, start.y);
        }
        self.subpath_start = self.last_point;
    }

    /// Append a circular arc of `sweep` radians centered at `(x, y)`
    ///
    /// The arc starts with a move when the path is empty and with a line
    /// from the current point otherwise.
    pub fn arc(&mut self, x: f32, y: f32, radius: f32, sweep: f32, start_angle: f32) {
        let (start, outline) = shapes::arc(Point::new(x, y), radius, sweep, start_angle);
        if outline.is_empty() {
            return;
        }
        if self.path.is_empty() {
            self.move_to(start.x, start.y);
        } else {
            self.line_to(start.x, start.y);
        }
        self.path.extend_from_slice(&outline);
        self.last_point = outline.last().map_or(start, |e| e.end_point());
    }

    /// Fill the current path and start a new one
    pub fn fill(&mut self) {
        if let Some(primitive) = self.take_path(Primitive::fill) {
            self.stream.push(primitive);
        }
    }

    /// Stroke the current path and start a new one
    pub fn stroke(&mut self) {
        if let Some(primitive) = self.take_path(Primitive::stroke) {
            self.stream.push(primitive);
        }
    }

    fn take_path(
        &mut self,
        command: fn(PathDescriptor, Attributes) -> Primitive,
    ) -> Option<Primitive> {
        if self.path.is_empty() {
            return None;
        }
        let descriptor = self.stream.push_path(self.path_start, &self.path);
        self.path.clear();
        self.subpath_start = self.last_point;
        self.path_start = self.last_point;
        Some(command(descriptor, self.snapshot()))
    }

    /// Attributes with the current transform and clip
    fn snapshot(&self) -> Attributes {
        Attributes {
            transform: self.transform(),
            clip: self.clip(),
            ..self.attributes
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Shapes
    // ═══════════════════════════════════════════════════════════════════════════

    fn push_outline(&mut self, (start, outline): (Point, Outline), attributes: Attributes, stroke: bool) {
        let descriptor = self.stream.push_path(start, &outline);
        let primitive = if stroke {
            Primitive::stroke(descriptor, attributes)
        } else {
            Primitive::fill(descriptor, attributes)
        };
        self.stream.push(primitive);
    }

    pub fn rectangle_fill(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let outline = shapes::rectangle(Rect::new(x, y, width, height));
        self.push_outline(outline, self.snapshot(), false);
    }

    pub fn rectangle_stroke(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let outline = shapes::rectangle(Rect::new(x, y, width, height));
        self.push_outline(outline, self.snapshot(), true);
    }

    pub fn rounded_rectangle_fill(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let outline = shapes::rounded_rectangle(Rect::new(x, y, width, height), radius);
        self.push_outline(outline, self.snapshot(), false);
    }

    pub fn rounded_rectangle_stroke(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let outline = shapes::rounded_rectangle(Rect::new(x, y, width, height), radius);
        self.push_outline(outline, self.snapshot(), true);
    }

    pub fn ellipse_fill(&mut self, x: f32, y: f32, rx: f32, ry: f32) {
        let outline = shapes::ellipse(Point::new(x, y), rx, ry);
        self.push_outline(outline, self.snapshot(), false);
    }

    pub fn ellipse_stroke(&mut self, x: f32, y: f32, rx: f32, ry: f32) {
        let outline = shapes::ellipse(Point::new(x, y), rx, ry);
        self.push_outline(outline, self.snapshot(), true);
    }

    pub fn circle_fill(&mut self, x: f32, y: f32, r: f32) {
        self.ellipse_fill(x, y, r, r);
    }

    pub fn circle_stroke(&mut self, x: f32, y: f32, r: f32) {
        self.ellipse_stroke(x, y, r, r);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Images
    // ═══════════════════════════════════════════════════════════════════════════

    /// Draw the whole of `image` stretched over `rect`
    pub fn image_draw(&mut self, image: ImageId, rect: Rect) {
        self.draw_image(image, None, rect);
    }

    /// Draw the `source` region of `image` stretched over `destination`
    pub fn image_draw_region(&mut self, image: ImageId, source: Rect, destination: Rect) {
        self.draw_image(image, Some(source), destination);
    }

    fn draw_image(&mut self, image: ImageId, source: Option<Rect>, destination: Rect) {
        // Images are drawn untinted, without touching the current attributes
        let attributes = self
            .snapshot()
            .with_color(Color::WHITE)
            .with_image(image, source);
        self.push_outline(shapes::rectangle(destination), attributes, false);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Frame
    // ═══════════════════════════════════════════════════════════════════════════

    /// Discard everything recorded and clear to the current color
    pub fn clear(&mut self) {
        self.stream.primitives.clear();
        self.stream.elements.clear();
        self.path.clear();
        self.path_start = self.last_point;
        self.stream.clear_color = self.attributes.color;
    }

    /// Terminate and take the recorded stream, leaving the canvas empty
    ///
    /// Attributes and stacks carry over to the next frame.
    pub fn finish(&mut self) -> CommandStream {
        self.stream.terminate();
        let clear_color = self.stream.clear_color;
        self.path.clear();
        self.path_start = self.last_point;
        std::mem::replace(&mut self.stream, CommandStream::new(clear_color))
    }

    /// Finish the frame and rasterize it into `backend`
    pub fn render(
        &mut self,
        rasterizer: &Rasterizer,
        backend: &mut dyn Backend,
    ) -> Result<FrameStats, RasterError> {
        let stream = self.finish();
        rasterizer.render(&stream, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Command, END_OF_STREAM};
    use quill_raster::RecordingBackend;

    fn last_attributes(canvas: &Canvas) -> Attributes {
        canvas.stream().primitives.last().unwrap().attributes
    }

    #[test]
    fn test_fill_snapshots_attributes() {
        let mut canvas = Canvas::default();
        canvas.set_color(Color::RED);
        canvas.matrix_push(Affine2D::translation(10.0, 0.0));
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 0.0);
        canvas.line_to(10.0, 10.0);
        canvas.fill();
        canvas.set_color(Color::BLUE);

        let stream = canvas.stream();
        assert_eq!(stream.primitives.len(), 1);
        assert_eq!(stream.elements.len(), 3);
        let primitive = stream.primitives[0];
        assert!(matches!(primitive.command, Command::Fill(p) if p.count == 3));
        assert_eq!(primitive.attributes.color, Color::RED);
        assert_eq!(primitive.attributes.transform, Affine2D::translation(10.0, 0.0));
    }

    #[test]
    fn test_defaults_seed_attributes() {
        let canvas = Canvas::with_defaults(CanvasDefaults {
            width: 3.0,
            cap: CapKind::Square,
            ..CanvasDefaults::default()
        });
        assert_eq!(canvas.attributes().width, 3.0);
        assert_eq!(canvas.attributes().cap, CapKind::Square);
        assert_eq!(canvas.attributes().clip, Rect::INFINITE);
        assert_eq!(canvas.stream().clear_color, Color::WHITE);
    }

    #[test]
    fn test_empty_path_records_nothing() {
        let mut canvas = Canvas::default();
        canvas.fill();
        canvas.stroke();
        assert!(canvas.stream().is_empty());
    }

    #[test]
    fn test_new_path_starts_at_last_point() {
        let mut canvas = Canvas::default();
        canvas.move_to(5.0, 5.0);
        canvas.line_to(15.0, 5.0);
        canvas.stroke();
        canvas.line_to(15.0, 15.0);
        canvas.stroke();

        let stream = canvas.stream();
        let Command::Stroke(second) = stream.primitives[1].command else {
            panic!("expected a stroke");
        };
        assert_eq!(second.start_point, Point::new(15.0, 5.0));
        assert_eq!(second.start_index, 2);
    }

    #[test]
    fn test_close_path_adds_line_when_open() {
        let mut canvas = Canvas::default();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 0.0);
        canvas.line_to(10.0, 10.0);
        canvas.close_path();
        assert_eq!(canvas.path.last(), Some(&PathElement::Line(Point::ZERO)));
        assert_eq!(canvas.position(), Point::ZERO);

        // Already closed
        canvas.close_path();
        assert_eq!(canvas.path.len(), 4);
    }

    #[test]
    fn test_matrix_stack_composes_and_guards() {
        let mut canvas = Canvas::default();
        canvas.matrix_push(Affine2D::translation(10.0, 0.0));
        canvas.matrix_push(Affine2D::scale(2.0, 2.0));
        let p = canvas.transform().transform_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(12.0, 2.0));

        canvas.matrix_pop();
        canvas.matrix_pop();
        canvas.matrix_pop();
        assert_eq!(canvas.transform(), Affine2D::IDENTITY);

        for _ in 0..100 {
            canvas.matrix_push(Affine2D::translation(1.0, 0.0));
        }
        assert_eq!(canvas.matrix_stack.len(), MAX_STACK_DEPTH + 1);
    }

    #[test]
    fn test_clip_push_transforms_and_intersects() {
        let mut canvas = Canvas::default();
        canvas.clip_push(0.0, 0.0, 100.0, 100.0);
        canvas.matrix_push(Affine2D::translation(50.0, 50.0));
        canvas.clip_push(0.0, 0.0, 100.0, 100.0);
        assert_eq!(canvas.clip(), Rect::new(50.0, 50.0, 50.0, 50.0));

        canvas.rectangle_fill(0.0, 0.0, 10.0, 10.0);
        assert_eq!(last_attributes(&canvas).clip, Rect::new(50.0, 50.0, 50.0, 50.0));

        canvas.clip_pop();
        canvas.clip_pop();
        canvas.clip_pop();
        assert_eq!(canvas.clip(), Rect::INFINITE);
    }

    #[test]
    fn test_shapes_leave_pending_path_alone() {
        let mut canvas = Canvas::default();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(1.0, 1.0);
        canvas.circle_stroke(50.0, 50.0, 10.0);
        assert_eq!(canvas.path.len(), 2);

        let stream = canvas.stream();
        assert!(matches!(stream.primitives[0].command, Command::Stroke(p) if p.count == 4));
        assert_eq!(stream.elements.len(), 4);
    }

    #[test]
    fn test_arc_starts_with_move_then_line() {
        let mut canvas = Canvas::default();
        canvas.arc(0.0, 0.0, 10.0, std::f32::consts::PI, 0.0);
        assert!(matches!(canvas.path[0], PathElement::Move(p) if p.close_to(Point::new(10.0, 0.0), 1e-5)));
        assert_eq!(canvas.path.len(), 3);
        assert!(canvas.position().close_to(Point::new(-10.0, 0.0), 1e-4));

        canvas.arc(0.0, 0.0, 5.0, std::f32::consts::FRAC_PI_2, 0.0);
        assert!(matches!(canvas.path[3], PathElement::Line(_)));
    }

    #[test]
    fn test_image_draw_keeps_current_attributes() {
        let mut canvas = Canvas::default();
        canvas.set_color(Color::RED);
        canvas.image_draw_region(ImageId(3), Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(0.0, 0.0, 64.0, 64.0));

        let attributes = last_attributes(&canvas);
        assert_eq!(attributes.color, Color::WHITE);
        assert_eq!(attributes.image, Some(ImageId(3)));
        assert_eq!(attributes.source_region, Some(Rect::new(0.0, 0.0, 8.0, 8.0)));
        assert_eq!(canvas.attributes().color, Color::RED);
        assert_eq!(canvas.attributes().image, None);
    }

    #[test]
    fn test_clear_discards_and_sets_clear_color() {
        let mut canvas = Canvas::default();
        canvas.rectangle_fill(0.0, 0.0, 10.0, 10.0);
        canvas.set_color(Color::GREEN);
        canvas.clear();
        assert!(canvas.stream().is_empty());
        assert!(canvas.stream().elements.is_empty());
        assert_eq!(canvas.stream().clear_color, Color::GREEN);
    }

    #[test]
    fn test_finish_terminates_and_resets() {
        let mut canvas = Canvas::new(Color::BLUE);
        canvas.rectangle_fill(0.0, 0.0, 10.0, 10.0);
        let stream = canvas.finish();
        assert_eq!(stream.primitives.len(), 2);
        assert_eq!(stream.primitives[1].command, Command::Jump(END_OF_STREAM));
        assert!(canvas.stream().is_empty());
        assert_eq!(canvas.stream().clear_color, Color::BLUE);
    }

    #[test]
    fn test_render_through_rasterizer() {
        let mut canvas = Canvas::default();
        canvas.set_width(4.0);
        canvas.rectangle_fill(0.0, 0.0, 10.0, 10.0);
        canvas.set_image(Some(ImageId(1)));
        canvas.rectangle_fill(20.0, 0.0, 10.0, 10.0);

        let mut backend = RecordingBackend::with_capacity(256, 512, 16);
        let stats = canvas.render(&Rasterizer::default(), &mut backend).unwrap();
        assert_eq!(stats.primitives, 2);
        assert_eq!(stats.batches, 2);
        assert_eq!(backend.triangle_count(), 8);
    }
}
