//! Raster image sources for bitmaps, sprites and pattern paints.
//!
//! Images are decoded through the `image` crate or rasterized from SVG with
//! `resvg`, then held as a premultiplied `tiny_skia` pixmap behind an `Arc` so
//! clones are cheap and share pixels.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use resvg::tiny_skia::{self, Pixmap};

use crate::color::Color;
use crate::error::{Result, SceneError};

#[derive(Clone)]
pub struct Image {
    pixmap: Arc<Pixmap>,
    tainted: bool,
}

impl Image {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
            tainted: false,
        }
    }

    /// Convert straight-alpha RGBA pixels.
    pub fn from_rgba(rgba: &image::RgbaImage) -> Result<Self> {
        let (width, height) = rgba.dimensions();
        let mut pixmap =
            Pixmap::new(width, height).ok_or(SceneError::SurfaceAllocation { width, height })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self::from_pixmap(pixmap))
    }

    /// Decode PNG, JPEG, GIF or WebP data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| SceneError::ImageDecode(e.to_string()))?;
        Self::from_rgba(&decoded.to_rgba8())
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading image from {}", path.display());
        let decoded = image::open(path).map_err(|e| SceneError::ImageDecode(e.to_string()))?;
        Self::from_rgba(&decoded.to_rgba8())
    }

    /// Rasterize an SVG document at the given scale.
    pub fn from_svg(bytes: &[u8], scale: f32) -> Result<Self> {
        let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
            .map_err(|e| SceneError::ImageDecode(e.to_string()))?;
        let size = tree.size();

        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;
        let mut pixmap =
            Pixmap::new(width, height).ok_or(SceneError::SurfaceAllocation { width, height })?;

        let transform = tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(Self::from_pixmap(pixmap))
    }

    /// A uniformly colored image, mostly useful for placeholders and tests.
    pub fn solid(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(SceneError::SurfaceAllocation { width, height })?;
        pixmap.fill(color.to_skia());
        Ok(Self::from_pixmap(pixmap))
    }

    /// Mark the image as coming from an untrusted origin. Surfaces it is
    /// drawn into refuse pixel reads afterwards.
    pub fn with_tainted(mut self, tainted: bool) -> Self {
        self.tainted = tainted;
        self
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixmap, &other.pixmap) && self.tainted == other.tainted
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("tainted", &self.tainted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_premultiplies() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([255, 0, 0, 128]));
        let image = Image::from_rgba(&rgba).unwrap();

        let pixel = image.pixmap().pixel(0, 0).unwrap();
        assert_eq!(pixel.alpha(), 128);
        assert_eq!(pixel.red(), 128);
        assert_eq!(image.pixmap().pixel(1, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn test_zero_sized_image_is_an_error() {
        let rgba = image::RgbaImage::new(0, 4);
        assert!(matches!(
            Image::from_rgba(&rgba),
            Err(SceneError::SurfaceAllocation { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_svg_rasterization() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
            <rect width="8" height="4" fill="#00f"/></svg>"##;
        let image = Image::from_svg(svg, 2.0).unwrap();
        assert_eq!((image.width(), image.height()), (16, 8));
        assert_eq!(image.pixmap().pixel(3, 3).unwrap().blue(), 255);
    }

    #[test]
    fn test_clones_share_pixels() {
        let image = Image::solid(2, 2, Color::RED).unwrap();
        let copy = image.clone();
        assert_eq!(image, copy);
        assert_ne!(image, copy.clone().with_tainted(true));
    }
}
