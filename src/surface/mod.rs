//! Software raster surface.
//!
//! A small immediate-mode 2D context over a `tiny_skia` pixmap: a save/restore
//! state stack, an affine transform, a current path, fill/stroke with solid,
//! gradient and pattern paints, clipping, global alpha, composite modes,
//! shadows, image blits and pixel read/write.
//!
//! Path points are mapped through the transform at the moment they are added,
//! so changing the transform between building a path and filling it only
//! affects how paints are positioned. Strokes are widened in the space of the
//! transform active when `stroke` is called.

mod blur;
mod path;

use std::sync::Arc;

use resvg::tiny_skia::{self, FillRule, Mask, Paint, Pixmap, Shader, Transform};

use crate::color::Color;
use crate::error::{Result, SceneError, SurfaceError};
use crate::geom::{Point, Rect};
use crate::image_source::Image;
use crate::matrix::Matrix2D;
use crate::style::{CompositeOperation, LineCap, LineJoin, PaintStyle, Shadow};

pub(crate) use blur::box_blur;
use path::{arc_corner, arc_sweep, arc_to_cubics, Corner, PathData};

/// Straight-alpha RGBA pixels copied out of (or into) a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(at..at + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[derive(Clone)]
struct DrawState {
    transform: Matrix2D,
    global_alpha: f64,
    composite: CompositeOperation,
    shadow: Option<Shadow>,
    fill_style: PaintStyle,
    stroke_style: PaintStyle,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    line_dash: Vec<f64>,
    line_dash_offset: f64,
    clip: Option<Arc<Mask>>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Matrix2D::identity(),
            global_alpha: 1.0,
            composite: CompositeOperation::SourceOver,
            shadow: None,
            fill_style: PaintStyle::default(),
            stroke_style: PaintStyle::default(),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            clip: None,
        }
    }
}

pub struct Surface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
    path: PathData,
    read_protected: bool,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SceneError::SurfaceAllocation { width, height })?;
        log::debug!("Allocated {}x{} surface", width, height);
        Ok(Self {
            pixmap,
            state: DrawState::default(),
            stack: Vec::new(),
            path: PathData::default(),
            read_protected: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reallocate at a new size. Pixels, drawing state and read protection
    /// are all reset.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Reallocate at the current size.
    pub fn reset(&mut self) -> Result<()> {
        self.resize(self.width(), self.height())
    }

    pub fn is_read_protected(&self) -> bool {
        self.read_protected
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    // ---- state ----

    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    /// Multiply the current transform by `m` (`m` applies first).
    pub fn transform(&mut self, m: &Matrix2D) {
        self.state.transform.append(m.a, m.b, m.c, m.d, m.tx, m.ty);
    }

    pub fn set_transform(&mut self, m: &Matrix2D) {
        self.state.transform = Matrix2D::new(m.a, m.b, m.c, m.d, m.tx, m.ty);
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Matrix2D::identity();
    }

    pub fn current_transform(&self) -> &Matrix2D {
        &self.state.transform
    }

    pub fn global_alpha(&self) -> f64 {
        self.state.global_alpha
    }

    /// Values outside `0..=1` are ignored.
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    pub fn composite_operation(&self) -> CompositeOperation {
        self.state.composite
    }

    pub fn set_composite_operation(&mut self, op: CompositeOperation) {
        self.state.composite = op;
    }

    pub fn shadow(&self) -> Option<Shadow> {
        self.state.shadow
    }

    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    pub fn fill_style(&self) -> &PaintStyle {
        &self.state.fill_style
    }

    pub fn set_fill_style(&mut self, style: impl Into<PaintStyle>) {
        self.state.fill_style = style.into();
    }

    pub fn stroke_style(&self) -> &PaintStyle {
        &self.state.stroke_style
    }

    pub fn set_stroke_style(&mut self, style: impl Into<PaintStyle>) {
        self.state.stroke_style = style.into();
    }

    pub fn line_width(&self) -> f64 {
        self.state.line_width
    }

    /// Non-positive and non-finite widths are ignored.
    pub fn set_line_width(&mut self, width: f64) {
        if width > 0.0 && width.is_finite() {
            self.state.line_width = width;
        }
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        if limit > 0.0 && limit.is_finite() {
            self.state.miter_limit = limit;
        }
    }

    /// Dash pattern in user units; an empty list draws solid lines.
    pub fn set_line_dash(&mut self, segments: &[f64], offset: f64) {
        if segments.iter().any(|s| *s < 0.0 || !s.is_finite()) {
            return;
        }
        self.state.line_dash = segments.to_vec();
        self.state.line_dash_offset = offset;
    }

    // ---- path ----

    fn map(&self, x: f64, y: f64) -> Point {
        self.state.transform.transform_point(x, y)
    }

    pub fn begin_path(&mut self) {
        self.path.clear();
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = self.map(x, y);
        self.path.move_to(p);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let p = self.map(x, y);
        self.path.line_to(p);
    }

    pub fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        let c = self.map(cpx, cpy);
        let p = self.map(x, y);
        self.path.quad_to(c, p);
    }

    pub fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        let c1 = self.map(cp1x, cp1y);
        let c2 = self.map(cp2x, cp2y);
        let p = self.map(x, y);
        self.path.cubic_to(c1, c2, p);
    }

    /// Circular arc around `(x, y)`; angles in radians, clockwise unless
    /// `anticlockwise`. Connects to the current point with a line.
    pub fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        if radius < 0.0 || !radius.is_finite() {
            return;
        }
        let sweep = arc_sweep(start_angle, end_angle, anticlockwise);
        let (first, curves) = arc_to_cubics(Point::new(x, y), radius, start_angle, sweep);
        let first = self.map(first.x, first.y);
        if self.path.current_point().is_some() {
            self.path.line_to(first);
        } else {
            self.path.move_to(first);
        }
        self.push_curves(&curves);
    }

    /// Rounded corner from the current point through `(x1, y1)` towards
    /// `(x2, y2)`.
    pub fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        let Some(current) = self.path.current_point() else {
            self.move_to(x1, y1);
            return;
        };
        let Some(inverse) = self.state.transform.inverse() else {
            return;
        };
        let p0 = inverse.transform_point(current.x, current.y);
        match arc_corner(p0, Point::new(x1, y1), Point::new(x2, y2), radius) {
            Corner::Line(p) => self.line_to(p.x, p.y),
            Corner::Arc {
                tangent,
                center,
                start,
                sweep,
            } => {
                self.line_to(tangent.x, tangent.y);
                let (_, curves) = arc_to_cubics(center, radius, start, sweep);
                self.push_curves(&curves);
            }
        }
    }

    fn push_curves(&mut self, curves: &[[Point; 3]]) {
        for [c1, c2, p] in curves {
            let c1 = self.map(c1.x, c1.y);
            let c2 = self.map(c2.x, c2.y);
            let p = self.map(p.x, p.y);
            self.path.cubic_to(c1, c2, p);
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let corners = self.rect_corners(x, y, w, h);
        self.path.extend_polygon(&corners);
        self.move_to(x, y);
    }

    pub fn close_path(&mut self) {
        self.path.close();
    }

    fn rect_corners(&self, x: f64, y: f64, w: f64, h: f64) -> [Point; 4] {
        [
            self.map(x, y),
            self.map(x + w, y),
            self.map(x + w, y + h),
            self.map(x, y + h),
        ]
    }

    fn rect_path(&self, x: f64, y: f64, w: f64, h: f64) -> Option<tiny_skia::Path> {
        let mut path = PathData::default();
        path.extend_polygon(&self.rect_corners(x, y, w, h));
        path.to_skia()
    }

    // ---- painting ----

    pub fn fill(&mut self) {
        if let Some(path) = self.path.to_skia() {
            let style = self.state.fill_style.clone();
            self.fill_device_path(&path, &style);
        }
    }

    pub fn stroke(&mut self) {
        if let Some(path) = self.path.to_skia() {
            let style = self.state.stroke_style.clone();
            self.stroke_device_path(path, &style);
        }
    }

    /// Intersect the clip region with the current path.
    pub fn clip(&mut self) {
        let (width, height) = (self.width(), self.height());
        let mask = match (self.path.to_skia(), &self.state.clip) {
            (Some(path), Some(existing)) => {
                let mut mask = Mask::clone(existing);
                mask.intersect_path(&path, FillRule::Winding, true, Transform::identity());
                Some(mask)
            }
            (Some(path), None) => Mask::new(width, height).map(|mut mask| {
                mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
                mask
            }),
            // An empty path clips everything away.
            (None, _) => Mask::new(width, height),
        };
        if let Some(mask) = mask {
            self.state.clip = Some(Arc::new(mask));
        }
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if let Some(path) = self.rect_path(x, y, w, h) {
            let style = self.state.fill_style.clone();
            self.fill_device_path(&path, &style);
        }
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if let Some(path) = self.rect_path(x, y, w, h) {
            let style = self.state.stroke_style.clone();
            self.stroke_device_path(path, &style);
        }
    }

    /// Make a (transformed, clipped) rectangle fully transparent.
    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let Some(path) = self.rect_path(x, y, w, h) else {
            return;
        };
        let paint = Paint {
            blend_mode: tiny_skia::BlendMode::Clear,
            ..Paint::default()
        };
        let clip = self.state.clip.clone();
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            clip.as_deref(),
        );
    }

    /// Clear every pixel, ignoring transform and clip.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn fill_device_path(&mut self, path: &tiny_skia::Path, style: &PaintStyle) {
        let Some(shader) = make_shader(style, &self.state.transform, self.state.global_alpha)
        else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.paint_with_shadow(|pixmap, clip, blend_mode| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), clip);
        });
        if style.is_tainted() {
            self.taint();
        }
    }

    fn stroke_device_path(&mut self, path: tiny_skia::Path, style: &PaintStyle) {
        let transform = self.state.transform.clone();
        let Some(inverse) = transform.inverse() else {
            return;
        };
        let Some(local) = path.transform(inverse.to_transform()) else {
            return;
        };
        // The stroke transform also positions the shader.
        let Some(shader) = make_shader(style, &Matrix2D::identity(), self.state.global_alpha)
        else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        let stroke = self.skia_stroke();
        let ts = transform.to_transform();
        self.paint_with_shadow(|pixmap, clip, blend_mode| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            pixmap.stroke_path(&local, &paint, &stroke, ts, clip);
        });
        if style.is_tainted() {
            self.taint();
        }
    }

    fn skia_stroke(&self) -> tiny_skia::Stroke {
        let state = &self.state;
        let dash = if state.line_dash.is_empty() {
            None
        } else {
            let mut intervals: Vec<f32> = state.line_dash.iter().map(|v| *v as f32).collect();
            if intervals.len() % 2 == 1 {
                intervals.extend_from_within(..);
            }
            tiny_skia::StrokeDash::new(intervals, state.line_dash_offset as f32)
        };
        tiny_skia::Stroke {
            width: state.line_width as f32,
            miter_limit: state.miter_limit as f32,
            line_cap: state.line_cap.to_skia(),
            line_join: state.line_join.to_skia(),
            dash,
        }
    }

    /// Run `draw` for the shadow layer (when a visible shadow is set) and then
    /// onto the surface itself.
    fn paint_with_shadow(&mut self, draw: impl Fn(&mut Pixmap, Option<&Mask>, tiny_skia::BlendMode)) {
        let clip = self.state.clip.clone();
        let blend_mode = self.state.composite.blend_mode();

        if let Some(shadow) = self.state.shadow.filter(Shadow::is_visible) {
            let (width, height) = (self.width(), self.height());
            if let Some(mut layer) = Pixmap::new(width, height) {
                draw(&mut layer, None, tiny_skia::BlendMode::SourceOver);
                tint(&mut layer, shadow.color);
                if shadow.blur > 0.0 {
                    let radius = (shadow.blur / 2.0).round() as usize;
                    box_blur(
                        layer.data_mut(),
                        width as usize,
                        height as usize,
                        radius,
                        radius,
                        3,
                    );
                }
                let whole_pixels = shadow.offset_x.fract() == 0.0 && shadow.offset_y.fract() == 0.0;
                let paint = tiny_skia::PixmapPaint {
                    opacity: 1.0,
                    blend_mode,
                    quality: if whole_pixels {
                        tiny_skia::FilterQuality::Nearest
                    } else {
                        tiny_skia::FilterQuality::Bilinear
                    },
                };
                self.pixmap.draw_pixmap(
                    0,
                    0,
                    layer.as_ref(),
                    &paint,
                    Transform::from_translate(shadow.offset_x as f32, shadow.offset_y as f32),
                    clip.as_deref(),
                );
            }
        }

        draw(&mut self.pixmap, clip.as_deref(), blend_mode);
    }

    fn taint(&mut self) {
        if !self.read_protected {
            log::debug!("Surface became read-protected");
        }
        self.read_protected = true;
    }

    // ---- images ----

    /// Draw a whole image with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &Image, x: f64, y: f64) {
        let src = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
        let dst = Rect::new(x, y, src.width, src.height);
        self.blit(image.pixmap().as_ref(), image.is_tainted(), src, dst);
    }

    /// Draw the `src` region of an image scaled into `dst`.
    pub fn draw_image_rect(&mut self, image: &Image, src: Rect, dst: Rect) {
        self.blit(image.pixmap().as_ref(), image.is_tainted(), src, dst);
    }

    /// Draw the `src` region of another surface scaled into `dst`.
    pub fn draw_surface(&mut self, source: &Surface, src: Rect, dst: Rect) {
        self.blit(source.pixmap.as_ref(), source.read_protected, src, dst);
    }

    fn blit(&mut self, pixmap: tiny_skia::PixmapRef<'_>, tainted: bool, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let sx = dst.width / src.width;
        let sy = dst.height / src.height;
        let mut m = self.state.transform.clone();
        m.append(sx, 0.0, 0.0, sy, dst.x - src.x * sx, dst.y - src.y * sy);

        let pixel_aligned = m.a == 1.0
            && m.b == 0.0
            && m.c == 0.0
            && m.d == 1.0
            && m.tx.fract() == 0.0
            && m.ty.fract() == 0.0;
        let quality = if pixel_aligned {
            tiny_skia::FilterQuality::Nearest
        } else {
            tiny_skia::FilterQuality::Bilinear
        };

        let Some(path) = self.rect_path(dst.x, dst.y, dst.width, dst.height) else {
            return;
        };
        let paint = Paint {
            shader: tiny_skia::Pattern::new(
                pixmap,
                tiny_skia::SpreadMode::Pad,
                quality,
                self.state.global_alpha as f32,
                m.to_transform(),
            ),
            anti_alias: !pixel_aligned,
            ..Paint::default()
        };
        self.paint_with_shadow(|target, clip, blend_mode| {
            let mut paint = paint.clone();
            paint.blend_mode = blend_mode;
            target.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), clip);
        });
        if tainted {
            self.taint();
        }
    }

    // ---- pixels ----

    fn check_region(&self, x: i32, y: i32, width: u32, height: u32) -> std::result::Result<(), SurfaceError> {
        let fits = x >= 0
            && y >= 0
            && width > 0
            && height > 0
            && x as u64 + u64::from(width) <= u64::from(self.width())
            && y as u64 + u64::from(height) <= u64::from(self.height());
        if fits {
            Ok(())
        } else {
            Err(SurfaceError::OutOfBounds {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Copy a region out as straight-alpha RGBA.
    pub fn get_image_data(
        &self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> std::result::Result<ImageData, SurfaceError> {
        if self.read_protected {
            return Err(SurfaceError::ReadProtected);
        }
        self.check_region(x, y, width, height)?;

        let stride = self.width() as usize;
        let pixels = self.pixmap.pixels();
        let mut out = ImageData::new(width, height);
        for row in 0..height as usize {
            for col in 0..width as usize {
                let src = pixels[(y as usize + row) * stride + x as usize + col].demultiply();
                let at = (row * width as usize + col) * 4;
                out.data[at..at + 4]
                    .copy_from_slice(&[src.red(), src.green(), src.blue(), src.alpha()]);
            }
        }
        Ok(out)
    }

    /// Write straight-alpha RGBA pixels, ignoring transform, clip and alpha.
    pub fn put_image_data(
        &mut self,
        data: &ImageData,
        x: i32,
        y: i32,
    ) -> std::result::Result<(), SurfaceError> {
        self.check_region(x, y, data.width, data.height)?;
        let stride = self.width() as usize;
        let pixels = self.pixmap.pixels_mut();
        for (i, px) in data.data.chunks_exact(4).enumerate() {
            let row = i / data.width as usize;
            let col = i % data.width as usize;
            pixels[(y as usize + row) * stride + x as usize + col] =
                tiny_skia::ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        }
        Ok(())
    }

    /// Alpha of a single pixel.
    pub fn pixel_alpha(&self, x: u32, y: u32) -> std::result::Result<u8, SurfaceError> {
        if self.read_protected {
            return Err(SurfaceError::ReadProtected);
        }
        self.pixmap
            .pixel(x, y)
            .map(|p| p.alpha())
            .ok_or(SurfaceError::OutOfBounds {
                x: x as i32,
                y: y as i32,
                width: 1,
                height: 1,
            })
    }

    /// Encode the whole surface as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let data = self.get_image_data(0, 0, self.width(), self.height())?;
        let image = image::RgbaImage::from_raw(data.width, data.height, data.data)
            .ok_or_else(|| SceneError::Encode("pixel buffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| SceneError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("depth", &self.stack.len())
            .field("read_protected", &self.read_protected)
            .finish()
    }
}

/// Replace color with `color`, keeping coverage.
fn tint(layer: &mut Pixmap, color: Color) {
    for px in layer.data_mut().chunks_exact_mut(4) {
        let a = f32::from(px[3]) / 255.0 * color.a.clamp(0.0, 1.0);
        px[0] = (color.r.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        px[1] = (color.g.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        px[2] = (color.b.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        px[3] = (a * 255.0).round() as u8;
    }
}

fn skia_stops(stops: &[crate::style::GradientStop], alpha: f32, remap: impl Fn(f64) -> f64) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|stop| {
            let color = stop.color.with_alpha(stop.color.a * alpha);
            tiny_skia::GradientStop::new(remap(stop.offset) as f32, color.to_skia())
        })
        .collect()
}

/// Build a shader for `style` positioned by `transform`.
fn make_shader<'a>(style: &'a PaintStyle, transform: &Matrix2D, alpha: f64) -> Option<Shader<'a>> {
    let alpha = alpha.clamp(0.0, 1.0) as f32;
    let ts = transform.to_transform();
    match style {
        PaintStyle::Color(color) => Some(Shader::SolidColor(
            color.with_alpha(color.a * alpha).to_skia(),
        )),
        PaintStyle::LinearGradient {
            stops,
            x0,
            y0,
            x1,
            y1,
        } => tiny_skia::LinearGradient::new(
            tiny_skia::Point::from_xy(*x0 as f32, *y0 as f32),
            tiny_skia::Point::from_xy(*x1 as f32, *y1 as f32),
            skia_stops(stops, alpha, |t| t),
            tiny_skia::SpreadMode::Pad,
            ts,
        ),
        PaintStyle::RadialGradient {
            stops,
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
        } => {
            // The inner circle is folded into the stop offsets.
            let inner = if *r1 > 0.0 { (r0 / r1).clamp(0.0, 1.0) } else { 0.0 };
            tiny_skia::RadialGradient::new(
                tiny_skia::Point::from_xy(*x0 as f32, *y0 as f32),
                tiny_skia::Point::from_xy(*x1 as f32, *y1 as f32),
                *r1 as f32,
                skia_stops(stops, alpha, |t| inner + t * (1.0 - inner)),
                tiny_skia::SpreadMode::Pad,
                ts,
            )
        }
        PaintStyle::Pattern { image, repetition } => Some(tiny_skia::Pattern::new(
            image.pixmap().as_ref(),
            repetition.spread_mode(),
            tiny_skia::FilterQuality::Bilinear,
            alpha,
            ts,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(surface: &Surface, x: u32, y: u32) -> u8 {
        surface.pixel_alpha(x, y).unwrap()
    }

    #[test]
    fn test_fill_rect_respects_transform() {
        let mut surface = Surface::new(20, 20).unwrap();
        surface.set_fill_style(Color::RED);
        surface.transform(&Matrix2D::new(1.0, 0.0, 0.0, 1.0, 10.0, 10.0));
        surface.fill_rect(0.0, 0.0, 5.0, 5.0);

        assert_eq!(alpha_at(&surface, 2, 2), 0);
        assert_eq!(alpha_at(&surface, 12, 12), 255);
        let data = surface.get_image_data(12, 12, 1, 1).unwrap();
        assert_eq!(data.pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_save_restore_transform_and_alpha() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.save();
        surface.transform(&Matrix2D::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        surface.set_global_alpha(0.5);
        surface.restore();
        assert!(surface.current_transform().is_identity());
        assert_eq!(surface.global_alpha(), 1.0);

        // Unbalanced restore is ignored.
        surface.restore();
        assert!(surface.current_transform().is_identity());
    }

    #[test]
    fn test_clip_limits_fill() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.begin_path();
        surface.rect(0.0, 0.0, 5.0, 10.0);
        surface.clip();
        surface.set_fill_style(Color::BLUE);
        surface.fill_rect(0.0, 0.0, 10.0, 10.0);

        assert_eq!(alpha_at(&surface, 2, 5), 255);
        assert_eq!(alpha_at(&surface, 7, 5), 0);
    }

    #[test]
    fn test_arc_fills_circle() {
        let mut surface = Surface::new(30, 30).unwrap();
        surface.set_fill_style(Color::BLACK);
        surface.begin_path();
        surface.arc(15.0, 15.0, 10.0, 0.0, std::f64::consts::TAU, false);
        surface.fill();

        assert_eq!(alpha_at(&surface, 15, 15), 255);
        assert_eq!(alpha_at(&surface, 1, 1), 0);
        assert_eq!(alpha_at(&surface, 27, 15), 0);
    }

    #[test]
    fn test_clear_rect_and_global_alpha() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.set_global_alpha(0.5);
        surface.fill_rect(0.0, 0.0, 4.0, 4.0);
        let a = alpha_at(&surface, 1, 1);
        assert!((126..=129).contains(&a), "alpha {a}");

        surface.clear_rect(0.0, 0.0, 2.0, 4.0);
        assert_eq!(alpha_at(&surface, 1, 1), 0);
        assert!(alpha_at(&surface, 3, 1) > 0);
    }

    #[test]
    fn test_tainted_image_blocks_reads() {
        let mut surface = Surface::new(4, 4).unwrap();
        let image = Image::solid(2, 2, Color::RED).unwrap().with_tainted(true);
        surface.draw_image(&image, 0.0, 0.0);

        assert!(surface.is_read_protected());
        assert_eq!(
            surface.get_image_data(0, 0, 1, 1),
            Err(SurfaceError::ReadProtected)
        );
        assert!(surface.to_png().is_err());

        surface.reset().unwrap();
        assert!(!surface.is_read_protected());
    }

    #[test]
    fn test_draw_image_rect_scales_source() {
        let mut surface = Surface::new(8, 8).unwrap();
        let image = Image::solid(2, 2, Color::GREEN).unwrap();
        surface.draw_image_rect(
            &image,
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(0.0, 0.0, 4.0, 4.0),
        );
        assert_eq!(alpha_at(&surface, 3, 3), 255);
        assert_eq!(alpha_at(&surface, 5, 5), 0);
    }

    #[test]
    fn test_put_and_get_image_data() {
        let mut surface = Surface::new(3, 3).unwrap();
        let mut data = ImageData::new(1, 2);
        data.data.copy_from_slice(&[10, 20, 30, 255, 0, 0, 255, 255]);
        surface.put_image_data(&data, 2, 1).unwrap();

        let back = surface.get_image_data(2, 1, 1, 2).unwrap();
        assert_eq!(back, data);
        assert!(matches!(
            surface.get_image_data(2, 2, 2, 2),
            Err(SurfaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_shadow_draws_offset_copy() {
        let mut surface = Surface::new(20, 20).unwrap();
        surface.set_shadow(Some(Shadow::new(Color::BLACK, 10.0, 0.0, 0.0)));
        surface.set_fill_style(Color::RED);
        surface.fill_rect(0.0, 0.0, 5.0, 5.0);

        let shadow = surface.get_image_data(12, 2, 1, 1).unwrap();
        assert_eq!(shadow.pixel(0, 0), Some([0, 0, 0, 255]));
        let body = surface.get_image_data(2, 2, 1, 1).unwrap();
        assert_eq!(body.pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_png_encoding() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.fill_rect(0.0, 0.0, 1.0, 1.0);
        let png = surface.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
