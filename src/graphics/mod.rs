//! Deferred vector drawing.
//!
//! [`Graphics`] records path and paint commands and replays them onto a
//! [`Surface`] when the owning shape is drawn. Path commands accumulate in an
//! open sub-path; starting a new fill, stroke or stroke style closes it and
//! commits it to the instruction buffer together with the paint that was
//! active at that moment. The open sub-path is painted on every draw with the
//! current paint, so a shape can be drawn while it is still being built.

mod command;
mod decode;

pub use command::{Command, StrokeStyle};
pub use decode::decode_path;

use crate::color::Color;
use crate::error::DecodeError;
use crate::image_source::Image;
use crate::matrix::Matrix2D;
use crate::style::{LineCap, LineJoin, PaintStyle, Repetition};
use crate::surface::Surface;

static BEGIN_PATH: Command = Command::BeginPath;

/// A queue of drawing commands.
///
/// Every method returns `&mut Self` so calls can be chained:
///
/// ```
/// use tableau::color::Color;
/// use tableau::graphics::Graphics;
///
/// let mut g = Graphics::new();
/// g.begin_fill(Color::RED).draw_circle(0.0, 0.0, 10.0);
/// assert!(!g.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graphics {
    /// Finalized commands, replayed as-is.
    committed: Vec<Command>,
    /// The open sub-path.
    active: Vec<Command>,
    /// Set when the open sub-path holds something worth painting.
    dirty: bool,
    fill: Option<Command>,
    stroke: Option<Command>,
    stroke_style: Option<Command>,
    stroke_dash: Option<Command>,
    /// Stroke style and dash only need emitting again after they change.
    stroke_style_changed: bool,
    stroke_dash_changed: bool,
    stroke_ignore_scale: bool,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been recorded, committed or open.
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.active.is_empty()
    }

    /// Queue a raw command into the open sub-path. A clean command (such as
    /// a bare move) does not by itself make the sub-path paintable.
    pub fn append(&mut self, command: Command, clean: bool) -> &mut Self {
        self.active.push(command);
        self.dirty = self.dirty || !clean;
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.append(Command::MoveTo { x, y }, true)
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.append(Command::LineTo { x, y }, false)
    }

    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> &mut Self {
        self.append(
            Command::ArcTo {
                x1,
                y1,
                x2,
                y2,
                radius,
            },
            false,
        )
    }

    /// Angles are in radians.
    pub fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> &mut Self {
        self.append(
            Command::Arc {
                x,
                y,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
            },
            false,
        )
    }

    pub fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) -> &mut Self {
        self.append(Command::QuadraticCurveTo { cpx, cpy, x, y }, false)
    }

    pub fn bezier_curve_to(
        &mut self,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        self.append(
            Command::BezierCurveTo {
                cp1x,
                cp1y,
                cp2x,
                cp2y,
                x,
                y,
            },
            false,
        )
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        self.append(Command::Rect { x, y, w, h }, false)
    }

    /// Close the open sub-path. Does nothing when no path has been started.
    pub fn close_path(&mut self) -> &mut Self {
        if self.active.is_empty() {
            return self;
        }
        self.append(Command::ClosePath, false)
    }

    /// Drop every command and reset all paint state.
    pub fn clear(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    pub fn begin_fill(&mut self, style: impl Into<PaintStyle>) -> &mut Self {
        self.set_fill(Some(style.into()), None)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn begin_linear_gradient_fill(
        &mut self,
        colors: &[Color],
        ratios: &[f64],
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    ) -> &mut Self {
        self.begin_fill(PaintStyle::linear(colors, ratios, x0, y0, x1, y1))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn begin_radial_gradient_fill(
        &mut self,
        colors: &[Color],
        ratios: &[f64],
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    ) -> &mut Self {
        self.begin_fill(PaintStyle::radial(colors, ratios, x0, y0, r0, x1, y1, r1))
    }

    /// Fill with a tiled image. `matrix` positions the pattern relative to
    /// the shape's local space.
    pub fn begin_bitmap_fill(
        &mut self,
        image: Image,
        repetition: Repetition,
        matrix: Option<Matrix2D>,
    ) -> &mut Self {
        self.set_fill(Some(PaintStyle::pattern(image, repetition)), matrix)
    }

    /// Stop filling. Sub-paths drawn from here on get no fill command.
    pub fn end_fill(&mut self) -> &mut Self {
        self.set_fill(None, None)
    }

    fn set_fill(&mut self, style: Option<PaintStyle>, matrix: Option<Matrix2D>) -> &mut Self {
        self.commit();
        self.fill = style.map(|style| Command::Fill { style, matrix });
        self
    }

    pub fn begin_stroke(&mut self, style: impl Into<PaintStyle>) -> &mut Self {
        self.set_stroke(Some(style.into()))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn begin_linear_gradient_stroke(
        &mut self,
        colors: &[Color],
        ratios: &[f64],
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    ) -> &mut Self {
        self.begin_stroke(PaintStyle::linear(colors, ratios, x0, y0, x1, y1))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn begin_radial_gradient_stroke(
        &mut self,
        colors: &[Color],
        ratios: &[f64],
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    ) -> &mut Self {
        self.begin_stroke(PaintStyle::radial(colors, ratios, x0, y0, r0, x1, y1, r1))
    }

    pub fn begin_bitmap_stroke(&mut self, image: Image, repetition: Repetition) -> &mut Self {
        self.begin_stroke(PaintStyle::pattern(image, repetition))
    }

    pub fn end_stroke(&mut self) -> &mut Self {
        self.set_stroke(None)
    }

    fn set_stroke(&mut self, style: Option<PaintStyle>) -> &mut Self {
        self.commit();
        let ignore_scale = self.stroke_ignore_scale;
        self.stroke = style.map(|style| Command::Stroke {
            style,
            ignore_scale,
        });
        self
    }

    /// Set stroke geometry for subsequent strokes. With `ignore_scale` the
    /// width is measured in surface pixels whatever the shape's scale.
    pub fn set_stroke_style(
        &mut self,
        width: f64,
        caps: LineCap,
        joints: LineJoin,
        miter_limit: f64,
        ignore_scale: bool,
    ) -> &mut Self {
        self.commit();
        self.stroke_style = Some(Command::StrokeStyle(StrokeStyle {
            width,
            caps,
            joints,
            miter_limit,
        }));
        self.stroke_style_changed = true;
        if let Some(Command::Stroke {
            ignore_scale: current,
            ..
        }) = &mut self.stroke
        {
            *current = ignore_scale;
        }
        self.stroke_ignore_scale = ignore_scale;
        self
    }

    /// Width only, with default caps, joints and miter limit.
    pub fn set_stroke_width(&mut self, width: f64) -> &mut Self {
        let defaults = StrokeStyle::default();
        self.set_stroke_style(
            width,
            defaults.caps,
            defaults.joints,
            defaults.miter_limit,
            false,
        )
    }

    /// Dash pattern for subsequent strokes. An empty list draws solid lines.
    pub fn set_stroke_dash(&mut self, segments: Vec<f64>, offset: f64) -> &mut Self {
        self.commit();
        self.stroke_dash = Some(Command::StrokeDash { segments, offset });
        self.stroke_dash_changed = true;
        self
    }

    pub fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        self.rect(x, y, w, h)
    }

    pub fn draw_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) -> &mut Self {
        self.draw_round_rect_complex(x, y, w, h, radius, radius, radius, radius)
    }

    /// Rounded rectangle with independent corner radii, clockwise from the
    /// top left. Negative radii give concave corners.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_round_rect_complex(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius_tl: f64,
        radius_tr: f64,
        radius_br: f64,
        radius_bl: f64,
    ) -> &mut Self {
        self.append(
            Command::RoundRect {
                x,
                y,
                w,
                h,
                radius_tl,
                radius_tr,
                radius_br,
                radius_bl,
            },
            false,
        )
    }

    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.append(Command::Circle { x, y, radius }, false)
    }

    pub fn draw_ellipse(&mut self, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        self.append(Command::Ellipse { x, y, w, h }, false)
    }

    /// Regular polygon, or a star when `point_size > 0`. `angle` rotates the
    /// first point, in degrees.
    pub fn draw_poly_star(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        sides: u32,
        point_size: f64,
        angle: f64,
    ) -> &mut Self {
        self.append(
            Command::PolyStar {
                x,
                y,
                radius,
                sides,
                point_size: point_size.clamp(0.0, 1.0),
                angle,
            },
            false,
        )
    }

    /// Append the primitives of a compact encoded path.
    ///
    /// On error the graphics is left untouched.
    pub fn decode_path(&mut self, encoded: &str) -> Result<&mut Self, DecodeError> {
        for command in decode_path(encoded)? {
            let clean = matches!(command, Command::MoveTo { .. });
            self.append(command, clean);
        }
        Ok(self)
    }

    /// The full instruction list as it would be replayed right now.
    pub fn instructions(&self) -> Vec<Command> {
        self.committed
            .iter()
            .chain(self.pending())
            .cloned()
            .collect()
    }

    /// Replay every instruction onto the surface.
    pub fn draw(&self, surface: &mut Surface) {
        for command in self.committed.iter().chain(self.pending()) {
            command.exec(surface);
        }
    }

    /// Replay path geometry only, skipping paint. Used for clipping to a
    /// mask and for hit areas.
    pub fn draw_as_path(&self, surface: &mut Surface) {
        for command in self.committed.iter().chain(self.pending()) {
            if command.is_path() {
                command.exec(surface);
            }
        }
    }

    /// Commands that paint the open sub-path with the current paint state.
    fn pending(&self) -> impl Iterator<Item = &Command> + '_ {
        let open = self.dirty && !self.active.is_empty();
        let active: &[Command] = if open { &self.active } else { &[] };
        let fill = self.fill.as_ref().filter(|_| open);
        let stroke = self.stroke.as_ref().filter(|_| open);
        let dash = stroke.and(
            self.stroke_dash
                .as_ref()
                .filter(|_| self.stroke_dash_changed),
        );
        let style = stroke.and(
            self.stroke_style
                .as_ref()
                .filter(|_| self.stroke_style_changed),
        );

        open.then_some(&BEGIN_PATH)
            .into_iter()
            .chain(active)
            .chain(fill)
            .chain(dash)
            .chain(style)
            .chain(stroke)
    }

    fn commit(&mut self) {
        if self.dirty && !self.active.is_empty() {
            let pending: Vec<Command> = self.pending().cloned().collect();
            self.committed.extend(pending);
            if self.stroke.is_some() {
                self.stroke_style_changed = false;
                self.stroke_dash_changed = false;
            }
        }
        self.active.clear();
        self.dirty = false;
    }
}
