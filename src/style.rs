//! Paint and drawing-state descriptors shared by the surface, graphics and nodes.

use std::fmt;
use std::str::FromStr;

use resvg::tiny_skia;

use crate::color::Color;
use crate::image_source::Image;

/// Drop shadow applied to everything drawn while it is active.
///
/// Offsets are in surface pixels and are not affected by the current
/// transform. `blur` is the blur extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
}

impl Shadow {
    pub const fn new(color: Color, offset_x: f64, offset_y: f64, blur: f64) -> Self {
        Self {
            color,
            offset_x,
            offset_y,
            blur,
        }
    }

    /// A shadow that draws nothing.
    pub fn is_visible(&self) -> bool {
        !self.color.is_transparent()
            && (self.blur > 0.0 || self.offset_x != 0.0 || self.offset_y != 0.0)
    }
}

/// How new pixels combine with the pixels already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeOperation {
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl CompositeOperation {
    const NAMES: [(CompositeOperation, &'static str); 26] = [
        (Self::SourceOver, "source-over"),
        (Self::SourceIn, "source-in"),
        (Self::SourceOut, "source-out"),
        (Self::SourceAtop, "source-atop"),
        (Self::DestinationOver, "destination-over"),
        (Self::DestinationIn, "destination-in"),
        (Self::DestinationOut, "destination-out"),
        (Self::DestinationAtop, "destination-atop"),
        (Self::Lighter, "lighter"),
        (Self::Copy, "copy"),
        (Self::Xor, "xor"),
        (Self::Multiply, "multiply"),
        (Self::Screen, "screen"),
        (Self::Overlay, "overlay"),
        (Self::Darken, "darken"),
        (Self::Lighten, "lighten"),
        (Self::ColorDodge, "color-dodge"),
        (Self::ColorBurn, "color-burn"),
        (Self::HardLight, "hard-light"),
        (Self::SoftLight, "soft-light"),
        (Self::Difference, "difference"),
        (Self::Exclusion, "exclusion"),
        (Self::Hue, "hue"),
        (Self::Saturation, "saturation"),
        (Self::Color, "color"),
        (Self::Luminosity, "luminosity"),
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(op, _)| op == self)
            .map(|(_, name)| *name)
            .unwrap_or("source-over")
    }

    pub(crate) fn blend_mode(&self) -> tiny_skia::BlendMode {
        use tiny_skia::BlendMode;
        match self {
            Self::SourceOver => BlendMode::SourceOver,
            Self::SourceIn => BlendMode::SourceIn,
            Self::SourceOut => BlendMode::SourceOut,
            Self::SourceAtop => BlendMode::SourceAtop,
            Self::DestinationOver => BlendMode::DestinationOver,
            Self::DestinationIn => BlendMode::DestinationIn,
            Self::DestinationOut => BlendMode::DestinationOut,
            Self::DestinationAtop => BlendMode::DestinationAtop,
            Self::Lighter => BlendMode::Plus,
            Self::Copy => BlendMode::Source,
            Self::Xor => BlendMode::Xor,
            Self::Multiply => BlendMode::Multiply,
            Self::Screen => BlendMode::Screen,
            Self::Overlay => BlendMode::Overlay,
            Self::Darken => BlendMode::Darken,
            Self::Lighten => BlendMode::Lighten,
            Self::ColorDodge => BlendMode::ColorDodge,
            Self::ColorBurn => BlendMode::ColorBurn,
            Self::HardLight => BlendMode::HardLight,
            Self::SoftLight => BlendMode::SoftLight,
            Self::Difference => BlendMode::Difference,
            Self::Exclusion => BlendMode::Exclusion,
            Self::Hue => BlendMode::Hue,
            Self::Saturation => BlendMode::Saturation,
            Self::Color => BlendMode::Color,
            Self::Luminosity => BlendMode::Luminosity,
        }
    }
}

impl fmt::Display for CompositeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompositeOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(op, _)| *op)
            .ok_or_else(|| format!("unknown composite operation: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Numeric shorthand: 0 butt, 1 round, 2 square.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Butt),
            1 => Some(Self::Round),
            2 => Some(Self::Square),
            _ => None,
        }
    }

    pub(crate) fn to_skia(self) -> tiny_skia::LineCap {
        match self {
            Self::Butt => tiny_skia::LineCap::Butt,
            Self::Round => tiny_skia::LineCap::Round,
            Self::Square => tiny_skia::LineCap::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    /// Numeric shorthand: 0 miter, 1 round, 2 bevel.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Miter),
            1 => Some(Self::Round),
            2 => Some(Self::Bevel),
            _ => None,
        }
    }

    pub(crate) fn to_skia(self) -> tiny_skia::LineJoin {
        match self {
            Self::Miter => tiny_skia::LineJoin::Miter,
            Self::Round => tiny_skia::LineJoin::Round,
            Self::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

/// Tiling of a pattern paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Repetition {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

impl Repetition {
    pub(crate) fn spread_mode(self) -> tiny_skia::SpreadMode {
        match self {
            Self::NoRepeat => tiny_skia::SpreadMode::Pad,
            // Single-axis tiling is not available in the rasterizer.
            Self::Repeat | Self::RepeatX | Self::RepeatY => tiny_skia::SpreadMode::Repeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `0..=1`.
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Build stops from parallel color and ratio lists; extra entries are ignored.
pub fn gradient_stops(colors: &[Color], ratios: &[f64]) -> Vec<GradientStop> {
    colors
        .iter()
        .zip(ratios)
        .map(|(color, ratio)| GradientStop::new(ratio.clamp(0.0, 1.0), *color))
        .collect()
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintStyle {
    Color(Color),
    LinearGradient {
        stops: Vec<GradientStop>,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    /// Two-circle radial gradient from `(x0, y0, r0)` to `(x1, y1, r1)`.
    RadialGradient {
        stops: Vec<GradientStop>,
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    },
    Pattern {
        image: Image,
        repetition: Repetition,
    },
}

impl PaintStyle {
    pub fn linear(colors: &[Color], ratios: &[f64], x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::LinearGradient {
            stops: gradient_stops(colors, ratios),
            x0,
            y0,
            x1,
            y1,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn radial(
        colors: &[Color],
        ratios: &[f64],
        x0: f64,
        y0: f64,
        r0: f64,
        x1: f64,
        y1: f64,
        r1: f64,
    ) -> Self {
        Self::RadialGradient {
            stops: gradient_stops(colors, ratios),
            x0,
            y0,
            r0,
            x1,
            y1,
            r1,
        }
    }

    pub fn pattern(image: Image, repetition: Repetition) -> Self {
        Self::Pattern { image, repetition }
    }

    /// True if painting with this style can mark a surface read-protected.
    pub fn is_tainted(&self) -> bool {
        matches!(self, Self::Pattern { image, .. } if image.is_tainted())
    }
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self::Color(Color::BLACK)
    }
}

impl From<Color> for PaintStyle {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}
