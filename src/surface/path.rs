//! Device-space path storage and curve helpers.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use resvg::tiny_skia;

use crate::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Segment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// The current path of a surface, already mapped through the transform that
/// was active when each point was added.
#[derive(Debug, Clone, Default)]
pub(crate) struct PathData {
    segments: Vec<Segment>,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl PathData {
    pub fn clear(&mut self) {
        self.segments.clear();
        self.current = None;
        self.subpath_start = None;
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(Segment::MoveTo(p));
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.segments.push(Segment::LineTo(p));
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, c: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c);
        }
        self.segments.push(Segment::QuadTo(c, p));
        self.current = Some(p);
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        self.segments.push(Segment::CubicTo(c1, c2, p));
        self.current = Some(p);
    }

    pub fn close(&mut self) {
        if self.current.is_some() {
            self.segments.push(Segment::Close);
            self.current = self.subpath_start;
        }
    }

    pub fn extend_polygon(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.close();
    }

    /// Build a rasterizer path. Degenerate input yields `None`.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut builder = tiny_skia::PathBuilder::new();
        let mut segments = self.segments.iter().peekable();
        while let Some(segment) = segments.next() {
            let next_starts_subpath = matches!(segments.peek(), None | Some(Segment::MoveTo(_)));
            if matches!(segment, Segment::MoveTo(_)) && next_starts_subpath {
                // A lone move contributes nothing.
                continue;
            }
            match *segment {
                Segment::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
                Segment::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
                Segment::QuadTo(c, p) => {
                    builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
                }
                Segment::CubicTo(c1, c2, p) => builder.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    p.x as f32,
                    p.y as f32,
                ),
                Segment::Close => builder.close(),
            }
        }
        builder.finish()
    }
}

/// Sweep of a canvas-style `arc` call, in radians. Positive is clockwise in
/// y-down space.
pub(crate) fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if !anticlockwise {
        if end - start >= TAU {
            TAU
        } else {
            (end - start).rem_euclid(TAU)
        }
    } else if start - end >= TAU {
        -TAU
    } else {
        -(start - end).rem_euclid(TAU)
    }
}

/// Approximate a circular arc with cubic Béziers of at most a quarter turn.
///
/// Returns the arc's start point and one `[c1, c2, end]` triple per segment.
pub(crate) fn arc_to_cubics(
    center: Point,
    radius: f64,
    start: f64,
    sweep: f64,
) -> (Point, Vec<[Point; 3]>) {
    let on_circle = |angle: f64| {
        Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    };
    let first = on_circle(start);
    if sweep == 0.0 || radius == 0.0 {
        return (first, Vec::new());
    }

    let count = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / count as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;

    let mut curves = Vec::with_capacity(count);
    let mut a0 = start;
    for _ in 0..count {
        let a1 = a0 + step;
        let p0 = on_circle(a0);
        let p3 = on_circle(a1);
        let c1 = Point::new(p0.x - k * a0.sin(), p0.y + k * a0.cos());
        let c2 = Point::new(p3.x + k * a1.sin(), p3.y - k * a1.cos());
        curves.push([c1, c2, p3]);
        a0 = a1;
    }
    (first, curves)
}

/// Geometry of a canvas-style `arcTo` corner.
pub(crate) enum Corner {
    /// Draw a straight line to the point.
    Line(Point),
    /// Line to `tangent`, then arc around `center` by `sweep` from `start`.
    Arc {
        tangent: Point,
        center: Point,
        start: f64,
        sweep: f64,
    },
}

/// Resolve the rounded corner from `p0` through `p1` towards `p2`.
pub(crate) fn arc_corner(p0: Point, p1: Point, p2: Point, radius: f64) -> Corner {
    let (v1x, v1y) = (p0.x - p1.x, p0.y - p1.y);
    let (v2x, v2y) = (p2.x - p1.x, p2.y - p1.y);
    let len1 = v1x.hypot(v1y);
    let len2 = v2x.hypot(v2y);
    let cross = v1x * v2y - v1y * v2x;

    if radius <= 0.0 || len1 == 0.0 || len2 == 0.0 || cross.abs() < 1e-12 {
        return Corner::Line(p1);
    }

    let (u1x, u1y) = (v1x / len1, v1y / len1);
    let (u2x, u2y) = (v2x / len2, v2y / len2);
    let cos = (u1x * u2x + u1y * u2y).clamp(-1.0, 1.0);
    let angle = cos.acos();
    let tangent_len = radius / (angle / 2.0).tan();
    let center_len = radius / (angle / 2.0).sin();

    let t1 = Point::new(p1.x + u1x * tangent_len, p1.y + u1y * tangent_len);
    let t2 = Point::new(p1.x + u2x * tangent_len, p1.y + u2y * tangent_len);
    let (bx, by) = (u1x + u2x, u1y + u2y);
    let blen = bx.hypot(by);
    let center = Point::new(p1.x + bx / blen * center_len, p1.y + by / blen * center_len);

    let start = (t1.y - center.y).atan2(t1.x - center.x);
    let end = (t2.y - center.y).atan2(t2.x - center.x);
    let mut sweep = end - start;
    if sweep > PI {
        sweep -= TAU;
    } else if sweep < -PI {
        sweep += TAU;
    }

    Corner::Arc {
        tangent: t1,
        center,
        start,
        sweep,
    }
}
