pub mod color;
pub mod cursor;
pub mod display;
pub mod error;
pub mod event;
pub mod filter;
pub mod geom;
pub mod graphics;
pub mod hit;
pub mod image_source;
pub mod matrix;
pub mod render;
pub mod stage;
pub mod style;
pub mod surface;
pub mod tree;

pub use error::{Result, SceneError};

pub mod prelude {
    pub use crate::color::Color;
    pub use crate::cursor::CursorIcon;
    pub use crate::display::{
        Bitmap, Content, ContainerProps, DisplayObject, Drawable, Frame, FrameSource, Shape,
        Sprite,
    };
    pub use crate::error::{DecodeError, Result, SceneError};
    pub use crate::event::{EventPhase, EventType, ListenerId, PointerData, SceneEvent, Tick};
    pub use crate::filter::{BlurFilter, ColorFilter, ColorMatrixFilter, Filter};
    pub use crate::geom::{Point, Rect};
    pub use crate::graphics::Graphics;
    pub use crate::hit::{HitFilter, HitTester};
    pub use crate::image_source::Image;
    pub use crate::matrix::Matrix2D;
    pub use crate::render::RenderContext;
    pub use crate::stage::{Stage, StageConfig};
    pub use crate::style::{
        CompositeOperation, LineCap, LineJoin, PaintStyle, Repetition, Shadow,
    };
    pub use crate::surface::Surface;
    pub use crate::tree::{NodeId, SceneTree};
}
