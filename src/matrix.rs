//! Affine 2D transform with carried visual state.
//!
//! The matrix maps a point as
//!
//! ```text
//! | a  c  tx |   | x |
//! | b  d  ty | * | y |
//! | 0  0  1  |   | 1 |
//! ```
//!
//! `prepend` multiplies the new transform in front (`M * self`): the existing
//! content is applied first. This is how a child's matrix accumulates its
//! ancestors walking up the tree. `append` multiplies behind (`self * M`): the
//! new transform is applied first. This is how a node's local matrix is built
//! from its primitive properties walking down.

use resvg::tiny_skia;

use crate::geom::Point;
use crate::style::{CompositeOperation, Shadow};

pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Result of [`Matrix2D::decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decomposed {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub skew_x: f64,
    pub skew_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
    /// Multiplicative opacity carried along with the transform.
    pub alpha: f64,
    pub shadow: Option<Shadow>,
    pub composite_operation: Option<CompositeOperation>,
    pub visible: bool,
}

impl Matrix2D {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
        alpha: 1.0,
        shadow: None,
        composite_operation: None,
        visible: true,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self {
            a,
            b,
            c,
            d,
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Reset to the neutral transform, clearing shadow and composite mode.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    /// `self = M * self`, where `M` is built from the given coefficients.
    pub fn prepend(&mut self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> &mut Self {
        let tx1 = self.tx;
        if a != 1.0 || b != 0.0 || c != 0.0 || d != 1.0 {
            let a1 = self.a;
            let c1 = self.c;
            self.a = a1 * a + self.b * c;
            self.b = a1 * b + self.b * d;
            self.c = c1 * a + self.d * c;
            self.d = c1 * b + self.d * d;
        }
        self.tx = tx1 * a + self.ty * c + tx;
        self.ty = tx1 * b + self.ty * d + ty;
        self
    }

    /// `self = self * M`, where `M` is built from the given coefficients.
    pub fn append(&mut self, a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> &mut Self {
        let a1 = self.a;
        let b1 = self.b;
        let c1 = self.c;
        let d1 = self.d;
        self.a = a * a1 + b * c1;
        self.b = a * b1 + b * d1;
        self.c = c * a1 + d * c1;
        self.d = c * b1 + d * d1;
        self.tx = tx * a1 + ty * c1 + self.tx;
        self.ty = tx * b1 + ty * d1 + self.ty;
        self
    }

    /// Prepend `other`'s transform and combine its visual properties.
    pub fn prepend_matrix(&mut self, other: &Matrix2D) -> &mut Self {
        self.prepend(other.a, other.b, other.c, other.d, other.tx, other.ty);
        self.prepend_properties(
            other.alpha,
            other.shadow,
            other.composite_operation,
            other.visible,
        )
    }

    /// Append `other`'s transform and combine its visual properties.
    pub fn append_matrix(&mut self, other: &Matrix2D) -> &mut Self {
        self.append(other.a, other.b, other.c, other.d, other.tx, other.ty);
        self.append_properties(
            other.alpha,
            other.shadow,
            other.composite_operation,
            other.visible,
        )
    }

    /// Build a transform from display properties and append it.
    ///
    /// Angles are in degrees; `(reg_x, reg_y)` is the pivot point.
    #[allow(clippy::too_many_arguments)]
    pub fn append_transform(
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
        let (sin, cos) = rotation_sin_cos(rotation);

        if skew_x != 0.0 || skew_y != 0.0 {
            let skew_x = skew_x * DEG_TO_RAD;
            let skew_y = skew_y * DEG_TO_RAD;
            self.append(skew_y.cos(), skew_y.sin(), -skew_x.sin(), skew_x.cos(), x, y);
            self.append(cos * scale_x, sin * scale_x, -sin * scale_y, cos * scale_y, 0.0, 0.0);
        } else {
            self.append(cos * scale_x, sin * scale_x, -sin * scale_y, cos * scale_y, x, y);
        }

        if reg_x != 0.0 || reg_y != 0.0 {
            // Applied in the already-transformed space.
            self.tx -= reg_x * self.a + reg_y * self.c;
            self.ty -= reg_x * self.b + reg_y * self.d;
        }
        self
    }

    /// Build a transform from display properties and prepend it.
    #[allow(clippy::too_many_arguments)]
    pub fn prepend_transform(
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
        let (sin, cos) = rotation_sin_cos(rotation);

        if reg_x != 0.0 || reg_y != 0.0 {
            self.tx -= reg_x;
            self.ty -= reg_y;
        }
        if skew_x != 0.0 || skew_y != 0.0 {
            let skew_x = skew_x * DEG_TO_RAD;
            let skew_y = skew_y * DEG_TO_RAD;
            self.prepend(cos * scale_x, sin * scale_x, -sin * scale_y, cos * scale_y, 0.0, 0.0);
            self.prepend(skew_y.cos(), skew_y.sin(), -skew_x.sin(), skew_x.cos(), x, y);
        } else {
            self.prepend(cos * scale_x, sin * scale_x, -sin * scale_y, cos * scale_y, x, y);
        }
        self
    }

    /// Rotate by `angle` degrees.
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let (sin, cos) = rotation_sin_cos(angle);
        self.append(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Skew by the given angles in degrees.
    pub fn skew(&mut self, skew_x: f64, skew_y: f64) -> &mut Self {
        let skew_x = skew_x * DEG_TO_RAD;
        let skew_y = skew_y * DEG_TO_RAD;
        self.append(skew_y.cos(), skew_y.sin(), -skew_x.sin(), skew_x.cos(), 0.0, 0.0)
    }

    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.a *= x;
        self.b *= x;
        self.c *= y;
        self.d *= y;
        self
    }

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += self.a * x + self.c * y;
        self.ty += self.b * x + self.d * y;
        self
    }

    /// Invert in place.
    ///
    /// This is the plain algebraic inverse: a zero determinant leaves
    /// non-finite coefficients behind. Use [`Matrix2D::inverse`] when the
    /// matrix may be degenerate.
    pub fn invert(&mut self) -> &mut Self {
        let a1 = self.a;
        let b1 = self.b;
        let c1 = self.c;
        let d1 = self.d;
        let tx1 = self.tx;
        let n = a1 * d1 - b1 * c1;

        self.a = d1 / n;
        self.b = -b1 / n;
        self.c = -c1 / n;
        self.d = a1 / n;
        self.tx = (c1 * self.ty - d1 * tx1) / n;
        self.ty = -(a1 * self.ty - b1 * tx1) / n;
        self
    }

    /// The inverse transform, or `None` when the determinant is zero.
    pub fn inverse(&self) -> Option<Matrix2D> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let mut out = self.clone();
        out.invert();
        Some(out)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn transform_point(&self, x: f64, y: f64) -> Point {
        Point::new(
            x * self.a + y * self.c + self.tx,
            x * self.b + y * self.d + self.ty,
        )
    }

    /// Extract translation, scale, rotation and (when needed) skew.
    ///
    /// Equal skew angles are reported as a pure rotation; a flipped x axis
    /// with an unflipped y axis resolves the 180 degree ambiguity by
    /// rotating the other way.
    pub fn decompose(&self) -> Decomposed {
        let mut out = Decomposed {
            x: self.tx,
            y: self.ty,
            scale_x: (self.a * self.a + self.b * self.b).sqrt(),
            scale_y: (self.c * self.c + self.d * self.d).sqrt(),
            ..Decomposed::default()
        };

        let skew_x = (-self.c).atan2(self.d);
        let skew_y = self.b.atan2(self.a);

        if (skew_x - skew_y).abs() < 1e-12 {
            out.rotation = skew_y / DEG_TO_RAD;
            if self.a < 0.0 && self.d >= 0.0 {
                out.rotation += if out.rotation <= 0.0 { 180.0 } else { -180.0 };
            }
        } else {
            out.skew_x = skew_x / DEG_TO_RAD;
            out.skew_y = skew_y / DEG_TO_RAD;
        }
        out
    }

    /// Combine visual state walking down the tree: the newest non-`None` wins.
    pub fn append_properties(
        &mut self,
        alpha: f64,
        shadow: Option<Shadow>,
        composite_operation: Option<CompositeOperation>,
        visible: bool,
    ) -> &mut Self {
        self.alpha *= alpha;
        self.shadow = shadow.or(self.shadow);
        self.composite_operation = composite_operation.or(self.composite_operation);
        self.visible = self.visible && visible;
        self
    }

    /// Combine visual state walking up the tree: the existing value wins.
    pub fn prepend_properties(
        &mut self,
        alpha: f64,
        shadow: Option<Shadow>,
        composite_operation: Option<CompositeOperation>,
        visible: bool,
    ) -> &mut Self {
        self.alpha *= alpha;
        self.shadow = self.shadow.or(shadow);
        self.composite_operation = self.composite_operation.or(composite_operation);
        self.visible = self.visible && visible;
        self
    }

    /// True if the affine part is the identity (visual state is ignored).
    pub fn is_identity(&self) -> bool {
        self.tx == 0.0
            && self.ty == 0.0
            && self.a == 1.0
            && self.b == 0.0
            && self.c == 0.0
            && self.d == 1.0
    }

    /// Affine equality (visual state is ignored).
    pub fn equals(&self, other: &Matrix2D) -> bool {
        self.tx == other.tx
            && self.ty == other.ty
            && self.a == other.a
            && self.b == other.b
            && self.c == other.c
            && self.d == other.d
    }

    pub(crate) fn to_transform(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.a as f32,
            self.b as f32,
            self.c as f32,
            self.d as f32,
            self.tx as f32,
            self.ty as f32,
        )
    }
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn rotation_sin_cos(degrees: f64) -> (f64, f64) {
    if degrees % 360.0 != 0.0 {
        (degrees * DEG_TO_RAD).sin_cos()
    } else {
        (0.0, 1.0)
    }
}
