//! Post-processing pixel filters applied to cached nodes.
//!
//! A filter only runs when its node is cached: the cache is painted first,
//! then every filter rewrites the cache pixels in order. [`Filter::bounds`]
//! reports how far a filter spreads content so the cache can be grown to fit.

use std::fmt;

use crate::error::{Result, SceneError};
use crate::geom::Rect;
use crate::surface::{box_blur, ImageData, Surface};

pub trait Filter: fmt::Debug + Send + Sync {
    /// Margin this filter adds around drawn content, as a rectangle relative
    /// to the content (a negative origin grows the top-left edge). `None`
    /// when the filter does not spread.
    fn bounds(&self) -> Option<Rect> {
        None
    }

    /// Rewrite straight-alpha pixels in place. Returns false if nothing was
    /// applied.
    fn apply_filter(&self, data: &mut ImageData) -> bool;

    /// Run the filter over a region of a surface.
    ///
    /// Empty regions and read-protected surfaces leave the pixels untouched
    /// and report false.
    fn apply(&self, surface: &mut Surface, x: i32, y: i32, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let mut data = match surface.get_image_data(x, y, width, height) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", self, e);
                return false;
            }
        };
        if !self.apply_filter(&mut data) {
            return false;
        }
        surface.put_image_data(&data, x, y).is_ok()
    }
}

/// Combined margin of a filter list, or `None` if no filter spreads.
pub fn filter_bounds(filters: &[std::sync::Arc<dyn Filter>]) -> Option<Rect> {
    filters
        .iter()
        .filter_map(|f| f.bounds())
        .reduce(|acc, b| Rect::new(acc.x + b.x, acc.y + b.y, acc.width + b.width, acc.height + b.height))
}

/// Box blur approximating a gaussian; `quality` is the number of passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurFilter {
    pub blur_x: f64,
    pub blur_y: f64,
    pub quality: u32,
}

impl BlurFilter {
    pub fn new(blur_x: f64, blur_y: f64, quality: u32) -> Self {
        Self {
            blur_x: blur_x.max(0.0),
            blur_y: blur_y.max(0.0),
            quality: quality.max(1),
        }
    }

    fn radii(&self) -> (usize, usize) {
        (
            (self.blur_x / 2.0).round() as usize,
            (self.blur_y / 2.0).round() as usize,
        )
    }
}

impl Filter for BlurFilter {
    fn bounds(&self) -> Option<Rect> {
        let (x, y) = (self.blur_x.trunc(), self.blur_y.trunc());
        if x <= 0.0 && y <= 0.0 {
            return None;
        }
        let q = f64::from(self.quality).powf(0.2);
        let (mx, my) = (x * q + 1.0, y * q + 1.0);
        Some(Rect::new(-mx, -my, 2.0 * mx, 2.0 * my))
    }

    fn apply_filter(&self, data: &mut ImageData) -> bool {
        let (rx, ry) = self.radii();
        if rx == 0 && ry == 0 {
            return false;
        }
        box_blur(
            &mut data.data,
            data.width as usize,
            data.height as usize,
            rx,
            ry,
            self.quality as usize,
        );
        true
    }
}

/// Per-channel multiply then offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFilter {
    /// RGBA multipliers.
    pub multipliers: [f64; 4],
    /// RGBA offsets in `-255..=255`.
    pub offsets: [f64; 4],
}

impl ColorFilter {
    pub fn new(multipliers: [f64; 4], offsets: [f64; 4]) -> Self {
        Self {
            multipliers,
            offsets,
        }
    }
}

impl Default for ColorFilter {
    fn default() -> Self {
        Self::new([1.0; 4], [0.0; 4])
    }
}

impl Filter for ColorFilter {
    fn apply_filter(&self, data: &mut ImageData) -> bool {
        for px in data.data.chunks_exact_mut(4) {
            for (c, value) in px.iter_mut().enumerate() {
                let v = f64::from(*value) * self.multipliers[c] + self.offsets[c];
                *value = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        true
    }
}

/// 5x5 color matrix over `(r, g, b, a, 1)`, row-major. Only the first four
/// rows affect output.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatrixFilter {
    matrix: [f64; 25],
}

impl ColorMatrixFilter {
    pub const IDENTITY: [f64; 25] = [
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    /// Accepts 20 values (the last row is implied) or the full 25.
    pub fn new(values: &[f64]) -> Result<Self> {
        let mut matrix = Self::IDENTITY;
        match values.len() {
            20 | 25 => matrix[..values.len()].copy_from_slice(values),
            len => return Err(SceneError::InvalidColorMatrix { len }),
        }
        Ok(Self { matrix })
    }

    pub fn matrix(&self) -> &[f64; 25] {
        &self.matrix
    }
}

impl Filter for ColorMatrixFilter {
    fn apply_filter(&self, data: &mut ImageData) -> bool {
        let m = &self.matrix;
        for px in data.data.chunks_exact_mut(4) {
            let src = [
                f64::from(px[0]),
                f64::from(px[1]),
                f64::from(px[2]),
                f64::from(px[3]),
            ];
            for (row, out) in px.iter_mut().enumerate() {
                let r = &m[row * 5..row * 5 + 5];
                let v = src[0] * r[0] + src[1] * r[1] + src[2] * r[2] + src[3] * r[3] + r[4];
                *out = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::color::Color;
    use crate::image_source::Image;

    #[test]
    fn test_blur_bounds_margin() {
        let blur = BlurFilter::new(4.0, 0.0, 1);
        assert_eq!(blur.bounds(), Some(Rect::new(-5.0, -1.0, 10.0, 2.0)));
        assert_eq!(BlurFilter::new(0.0, 0.0, 1).bounds(), None);
    }

    #[test]
    fn test_filter_bounds_accumulate() {
        let filters: Vec<Arc<dyn Filter>> = vec![
            Arc::new(BlurFilter::new(4.0, 4.0, 1)),
            Arc::new(ColorFilter::default()),
            Arc::new(BlurFilter::new(2.0, 2.0, 1)),
        ];
        assert_eq!(
            filter_bounds(&filters),
            Some(Rect::new(-8.0, -8.0, 16.0, 16.0))
        );
        assert_eq!(filter_bounds(&[]), None);
    }

    #[test]
    fn test_color_filter_applies_to_surface() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.set_fill_style(Color::WHITE);
        surface.fill_rect(0.0, 0.0, 2.0, 2.0);

        let filter = ColorFilter::new([0.0, 1.0, 1.0, 1.0], [0.0, 0.0, -255.0, 0.0]);
        assert!(filter.apply(&mut surface, 0, 0, 2, 2));
        let px = surface.get_image_data(1, 1, 1, 1).unwrap().pixel(0, 0);
        assert_eq!(px, Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_read_protected_surface_is_left_alone() {
        let mut surface = Surface::new(2, 2).unwrap();
        let image = Image::solid(2, 2, Color::RED).unwrap().with_tainted(true);
        surface.draw_image(&image, 0.0, 0.0);

        assert!(!ColorFilter::default().apply(&mut surface, 0, 0, 2, 2));
        assert!(!ColorFilter::default().apply(&mut surface, 0, 0, 0, 2));
    }

    #[test]
    fn test_color_matrix_shape_is_checked() {
        assert!(ColorMatrixFilter::new(&ColorMatrixFilter::IDENTITY).is_ok());
        assert!(ColorMatrixFilter::new(&ColorMatrixFilter::IDENTITY[..20]).is_ok());
        assert_eq!(
            ColorMatrixFilter::new(&[1.0; 16]),
            Err(SceneError::InvalidColorMatrix { len: 16 })
        );
    }

    #[test]
    fn test_color_matrix_swaps_channels() {
        #[rustfmt::skip]
        let swap = [
            0.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0,
            1.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ];
        let filter = ColorMatrixFilter::new(&swap).unwrap();
        let mut data = ImageData::new(1, 1);
        data.data.copy_from_slice(&[200, 10, 0, 255]);
        assert!(filter.apply_filter(&mut data));
        assert_eq!(data.data, vec![0, 10, 200, 255]);
    }
}
