//! Node properties and node content.
//!
//! Every node in a [`SceneTree`](crate::tree::SceneTree) pairs a
//! [`DisplayObject`] (transform, visual and interaction state shared by all
//! node kinds) with a [`Content`] describing what the node draws.

mod bitmap;
mod sprite;

use std::fmt;
use std::sync::Arc;

pub use bitmap::Bitmap;
pub use sprite::{Frame, FrameSource, Sprite};

use crate::cursor::CursorIcon;
use crate::event::Tick;
use crate::filter::Filter;
use crate::geom::Rect;
use crate::graphics::Graphics;
use crate::matrix::Matrix2D;
use crate::style::{CompositeOperation, Shadow};
use crate::surface::Surface;
use crate::tree::NodeId;

/// Transform, visual and interaction state of a node.
#[derive(Debug, Clone)]
pub struct DisplayObject {
    /// Optional name for lookups with `child_by_name`.
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    /// Registration point: the local point placed at `(x, y)`, and the pivot
    /// for rotation and scale.
    pub reg_x: f64,
    pub reg_y: f64,
    pub alpha: f64,
    pub visible: bool,
    pub shadow: Option<Shadow>,
    pub composite_operation: Option<CompositeOperation>,
    /// Round the final translation to whole pixels when the stage enables it.
    pub snap_to_pixel: bool,
    /// Whether pointer events can target this node.
    pub mouse_enabled: bool,
    pub tick_enabled: bool,
    pub cursor: Option<CursorIcon>,
    /// A shape node whose path clips this node. The mask is positioned in
    /// the coordinate space of this node's parent and is never drawn itself.
    pub mask: Option<NodeId>,
    /// Stand-in geometry for hit tests, positioned in this node's local space.
    pub hit_area: Option<NodeId>,
    /// Applied in order when the node is cached.
    pub filters: Vec<Arc<dyn Filter>>,
    pub(crate) bounds: Option<Rect>,
}

impl DisplayObject {
    pub fn new() -> Self {
        Self {
            name: None,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            reg_x: 0.0,
            reg_y: 0.0,
            alpha: 1.0,
            visible: true,
            shadow: None,
            composite_operation: None,
            snap_to_pixel: true,
            mouse_enabled: true,
            tick_enabled: true,
            cursor: None,
            mask: None,
            hit_area: None,
            filters: Vec::new(),
            bounds: None,
        }
    }

    /// Set all transform properties at once.
    #[allow(clippy::too_many_arguments)]
    pub fn set_transform(
        &mut self,
        x: f64,
        y: f64,
        scale_x: f64,
        scale_y: f64,
        rotation: f64,
        skew_x: f64,
        skew_y: f64,
        reg_x: f64,
        reg_y: f64,
    ) -> &mut Self {
        self.x = x;
        self.y = y;
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.rotation = rotation;
        self.skew_x = skew_x;
        self.skew_y = skew_y;
        self.reg_x = reg_x;
        self.reg_y = reg_y;
        self
    }

    /// Local matrix, carrying this node's alpha, shadow, composite
    /// operation and visibility.
    pub fn matrix(&self) -> Matrix2D {
        let mut m = Matrix2D::identity();
        m.append_transform(
            self.x,
            self.y,
            self.scale_x,
            self.scale_y,
            self.rotation,
            self.skew_x,
            self.skew_y,
            self.reg_x,
            self.reg_y,
        )
        .append_properties(
            self.alpha,
            self.shadow,
            self.composite_operation,
            self.visible,
        );
        m
    }

    /// Fix the local bounds instead of computing them. `None` restores
    /// computed bounds.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }

    pub fn explicit_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Whether the node would paint anything at all, ignoring its content.
    pub fn is_drawn(&self) -> bool {
        self.visible && self.alpha > 0.0 && self.scale_x != 0.0 && self.scale_y != 0.0
    }
}

impl Default for DisplayObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Child handling flags of a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerProps {
    /// When false, hits on any descendant resolve to the container itself.
    pub mouse_children: bool,
    /// When false, ticks stop at the container.
    pub tick_children: bool,
}

impl Default for ContainerProps {
    fn default() -> Self {
        Self {
            mouse_children: true,
            tick_children: true,
        }
    }
}

/// A node that draws vector graphics.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub graphics: Graphics,
}

impl Shape {
    pub fn new(graphics: Graphics) -> Self {
        Self { graphics }
    }
}

/// User-defined node content.
///
/// ```
/// use tableau::display::Drawable;
/// use tableau::surface::Surface;
///
/// #[derive(Debug, Clone)]
/// struct Dot;
///
/// impl Drawable for Dot {
///     fn draw(&self, surface: &mut Surface) -> bool {
///         surface.fill_rect(0.0, 0.0, 1.0, 1.0);
///         true
///     }
///
///     fn clone_box(&self) -> Box<dyn Drawable> {
///         Box::new(self.clone())
///     }
/// }
/// ```
pub trait Drawable: fmt::Debug + Send + Sync {
    /// Paint in local coordinates. Returns whether anything was handled.
    fn draw(&self, surface: &mut Surface) -> bool;

    fn has_content(&self) -> bool {
        true
    }

    /// Local bounds, if they can be known.
    fn bounds(&self) -> Option<Rect> {
        None
    }

    fn tick(&mut self, _tick: &Tick) {}

    fn clone_box(&self) -> Box<dyn Drawable>;
}

impl Clone for Box<dyn Drawable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// What a node draws.
#[derive(Debug, Clone)]
pub enum Content {
    Container(ContainerProps),
    Shape(Shape),
    Bitmap(Bitmap),
    Sprite(Sprite),
    Custom(Box<dyn Drawable>),
}

impl Content {
    pub fn is_container(&self) -> bool {
        matches!(self, Content::Container(_))
    }

    pub fn container(&self) -> Option<&ContainerProps> {
        match self {
            Content::Container(props) => Some(props),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut ContainerProps> {
        match self {
            Content::Container(props) => Some(props),
            _ => None,
        }
    }

    pub fn graphics(&self) -> Option<&Graphics> {
        match self {
            Content::Shape(shape) => Some(&shape.graphics),
            _ => None,
        }
    }

    pub fn graphics_mut(&mut self) -> Option<&mut Graphics> {
        match self {
            Content::Shape(shape) => Some(&mut shape.graphics),
            _ => None,
        }
    }

    /// Draw leaf content. Containers draw their children through the tree.
    pub(crate) fn draw(&self, surface: &mut Surface) -> bool {
        match self {
            Content::Container(_) => false,
            Content::Shape(shape) => {
                shape.graphics.draw(surface);
                true
            }
            Content::Bitmap(bitmap) => bitmap.draw(surface),
            Content::Sprite(sprite) => sprite.draw(surface),
            Content::Custom(drawable) => drawable.draw(surface),
        }
    }

    pub(crate) fn has_content(&self) -> bool {
        match self {
            Content::Container(_) => true,
            Content::Shape(shape) => !shape.graphics.is_empty(),
            Content::Bitmap(bitmap) => bitmap.has_content(),
            Content::Sprite(sprite) => sprite.has_content(),
            Content::Custom(drawable) => drawable.has_content(),
        }
    }

    /// Bounds of leaf content. Shapes do not compute bounds.
    pub(crate) fn bounds(&self) -> Option<Rect> {
        match self {
            Content::Container(_) | Content::Shape(_) => None,
            Content::Bitmap(bitmap) => bitmap.bounds(),
            Content::Sprite(sprite) => sprite.bounds(),
            Content::Custom(drawable) => drawable.bounds(),
        }
    }

    pub(crate) fn tick(&mut self, tick: &Tick) {
        match self {
            // Without a delta the sprite steps one frame.
            Content::Sprite(sprite) => sprite.tick((tick.delta > 0.0).then_some(tick.delta)),
            Content::Custom(drawable) => drawable.tick(tick),
            _ => {}
        }
    }
}

impl From<Graphics> for Content {
    fn from(graphics: Graphics) -> Self {
        Content::Shape(Shape::new(graphics))
    }
}

impl From<Bitmap> for Content {
    fn from(bitmap: Bitmap) -> Self {
        Content::Bitmap(bitmap)
    }
}

impl From<Sprite> for Content {
    fn from(sprite: Sprite) -> Self {
        Content::Sprite(sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_matrix_carries_properties() {
        let mut display = DisplayObject::new();
        display.set_transform(10.0, 20.0, 2.0, 2.0, 0.0, 0.0, 0.0, 1.0, 1.0);
        display.alpha = 0.5;
        display.visible = false;

        let m = display.matrix();
        let p = m.transform_point(1.0, 1.0);
        assert!(approx_eq(p.x, 10.0) && approx_eq(p.y, 20.0));
        assert!(approx_eq(m.alpha, 0.5));
        assert!(!m.visible);
    }

    #[test]
    fn test_is_drawn() {
        let mut display = DisplayObject::new();
        assert!(display.is_drawn());
        display.scale_x = 0.0;
        assert!(!display.is_drawn());
    }

    #[test]
    fn test_shape_content_emptiness() {
        let mut content = Content::from(Graphics::new());
        assert!(!content.has_content());
        content
            .graphics_mut()
            .unwrap()
            .begin_fill(Color::RED)
            .draw_rect(0.0, 0.0, 1.0, 1.0);
        assert!(content.has_content());
        assert_eq!(content.bounds(), None);
    }

    #[derive(Debug, Clone)]
    struct Counter(u32);

    impl Drawable for Counter {
        fn draw(&self, _surface: &mut Surface) -> bool {
            true
        }

        fn tick(&mut self, _tick: &Tick) {
            self.0 += 1;
        }

        fn clone_box(&self) -> Box<dyn Drawable> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_custom_content_clones_and_ticks() {
        let mut content = Content::Custom(Box::new(Counter(0)));
        content.tick(&Tick::default());
        let copy = content.clone();
        content.tick(&Tick::default());
        assert_eq!(format!("{copy:?}"), "Custom(Counter(1))");
        assert_eq!(format!("{content:?}"), "Custom(Counter(2))");
    }
}
