//! Paint command definitions for the deferred drawing queue.

use std::f64::consts::{PI, TAU};

use crate::matrix::Matrix2D;
use crate::style::{LineCap, LineJoin, PaintStyle};
use crate::surface::Surface;

/// Stroke geometry applied before a stroke command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Line width in local units
    pub width: f64,
    pub caps: LineCap,
    pub joints: LineJoin,
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            caps: LineCap::Butt,
            joints: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}

/// A single recorded drawing operation.
///
/// All coordinates are in the owning shape's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a fresh path. Marks a sub-path boundary.
    BeginPath,

    MoveTo {
        x: f64,
        y: f64,
    },

    LineTo {
        x: f64,
        y: f64,
    },

    /// Rounded corner through `(x1, y1)` towards `(x2, y2)`.
    ArcTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        radius: f64,
    },

    /// Circular arc; angles in radians.
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },

    QuadraticCurveTo {
        cpx: f64,
        cpy: f64,
        x: f64,
        y: f64,
    },

    BezierCurveTo {
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    },

    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },

    ClosePath,

    /// Rectangle with per-corner radii. A negative radius draws a concave
    /// (inverted) corner.
    RoundRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius_tl: f64,
        radius_tr: f64,
        radius_br: f64,
        radius_bl: f64,
    },

    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },

    /// Ellipse inscribed in the given box.
    Ellipse {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },

    /// Regular polygon or star. `point_size` in `0..1` pulls every other
    /// vertex inward; `angle` is in degrees.
    PolyStar {
        x: f64,
        y: f64,
        radius: f64,
        sides: u32,
        point_size: f64,
        angle: f64,
    },

    /// Fill the current path. An optional matrix repositions the paint.
    Fill {
        style: PaintStyle,
        matrix: Option<Matrix2D>,
    },

    /// Stroke the current path. With `ignore_scale` the stroke width is
    /// applied in surface pixels regardless of the transform.
    Stroke {
        style: PaintStyle,
        ignore_scale: bool,
    },

    StrokeStyle(StrokeStyle),

    StrokeDash {
        segments: Vec<f64>,
        offset: f64,
    },
}

impl Command {
    /// Whether this command only builds path geometry.
    pub fn is_path(&self) -> bool {
        !matches!(
            self,
            Command::BeginPath
                | Command::Fill { .. }
                | Command::Stroke { .. }
                | Command::StrokeStyle(_)
                | Command::StrokeDash { .. }
        )
    }

    /// Replay onto a surface.
    pub fn exec(&self, surface: &mut Surface) {
        match self {
            Command::BeginPath => surface.begin_path(),
            Command::MoveTo { x, y } => surface.move_to(*x, *y),
            Command::LineTo { x, y } => surface.line_to(*x, *y),
            Command::ArcTo {
                x1,
                y1,
                x2,
                y2,
                radius,
            } => surface.arc_to(*x1, *y1, *x2, *y2, *radius),
            Command::Arc {
                x,
                y,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
            } => surface.arc(*x, *y, *radius, *start_angle, *end_angle, *anticlockwise),
            Command::QuadraticCurveTo { cpx, cpy, x, y } => {
                surface.quadratic_curve_to(*cpx, *cpy, *x, *y)
            }
            Command::BezierCurveTo {
                cp1x,
                cp1y,
                cp2x,
                cp2y,
                x,
                y,
            } => surface.bezier_curve_to(*cp1x, *cp1y, *cp2x, *cp2y, *x, *y),
            Command::Rect { x, y, w, h } => surface.rect(*x, *y, *w, *h),
            Command::ClosePath => surface.close_path(),
            Command::RoundRect {
                x,
                y,
                w,
                h,
                radius_tl,
                radius_tr,
                radius_br,
                radius_bl,
            } => round_rect(
                surface,
                (*x, *y, *w, *h),
                [*radius_tl, *radius_tr, *radius_br, *radius_bl],
            ),
            Command::Circle { x, y, radius } => surface.arc(*x, *y, *radius, 0.0, TAU, false),
            Command::Ellipse { x, y, w, h } => ellipse(surface, *x, *y, *w, *h),
            Command::PolyStar {
                x,
                y,
                radius,
                sides,
                point_size,
                angle,
            } => poly_star(surface, *x, *y, *radius, *sides, *point_size, *angle),
            Command::Fill { style, matrix } => {
                surface.set_fill_style(style.clone());
                match matrix {
                    Some(m) => {
                        surface.save();
                        surface.transform(m);
                        surface.fill();
                        surface.restore();
                    }
                    None => surface.fill(),
                }
            }
            Command::Stroke {
                style,
                ignore_scale,
            } => {
                surface.set_stroke_style(style.clone());
                if *ignore_scale {
                    surface.save();
                    surface.reset_transform();
                    surface.stroke();
                    surface.restore();
                } else {
                    surface.stroke();
                }
            }
            Command::StrokeStyle(style) => {
                surface.set_line_width(style.width);
                surface.set_line_cap(style.caps);
                surface.set_line_join(style.joints);
                surface.set_miter_limit(style.miter_limit);
            }
            Command::StrokeDash { segments, offset } => surface.set_line_dash(segments, *offset),
        }
    }
}

fn round_rect(surface: &mut Surface, (x, y, w, h): (f64, f64, f64, f64), radii: [f64; 4]) {
    let max = w.min(h) / 2.0;
    // Concave corners flip their control point outward.
    let [(tl, m_tl), (tr, m_tr), (br, m_br), (bl, m_bl)] = radii.map(|r| {
        let sign = if r < 0.0 { -1.0 } else { 0.0 };
        (r.abs().min(max), sign)
    });

    surface.move_to(x + w - tr, y);
    surface.arc_to(x + w + tr * m_tr, y - tr * m_tr, x + w, y + tr, tr);
    surface.line_to(x + w, y + h - br);
    surface.arc_to(x + w + br * m_br, y + h + br * m_br, x + w - br, y + h, br);
    surface.line_to(x + bl, y + h);
    surface.arc_to(x - bl * m_bl, y + h + bl * m_bl, x, y + h - bl, bl);
    surface.line_to(x, y + tl);
    surface.arc_to(x - tl * m_tl, y - tl * m_tl, x + tl, y, tl);
    surface.close_path();
}

fn ellipse(surface: &mut Surface, x: f64, y: f64, w: f64, h: f64) {
    const KAPPA: f64 = 0.552_284_8;
    let ox = w / 2.0 * KAPPA;
    let oy = h / 2.0 * KAPPA;
    let xe = x + w;
    let ye = y + h;
    let xm = x + w / 2.0;
    let ym = y + h / 2.0;

    surface.move_to(x, ym);
    surface.bezier_curve_to(x, ym - oy, xm - ox, y, xm, y);
    surface.bezier_curve_to(xm + ox, y, xe, ym - oy, xe, ym);
    surface.bezier_curve_to(xe, ym + oy, xm + ox, ye, xm, ye);
    surface.bezier_curve_to(xm - ox, ye, x, ym + oy, x, ym);
}

fn poly_star(
    surface: &mut Surface,
    x: f64,
    y: f64,
    radius: f64,
    sides: u32,
    point_size: f64,
    angle: f64,
) {
    if sides == 0 {
        return;
    }
    let mut angle = angle / 180.0 * PI;
    let inner = 1.0 - point_size;
    let step = PI / f64::from(sides);

    surface.move_to(x + angle.cos() * radius, y + angle.sin() * radius);
    for _ in 0..sides {
        angle += step;
        if inner != 1.0 {
            surface.line_to(x + angle.cos() * radius * inner, y + angle.sin() * radius * inner);
        }
        angle += step;
        surface.line_to(x + angle.cos() * radius, y + angle.sin() * radius);
    }
    surface.close_path();
}
