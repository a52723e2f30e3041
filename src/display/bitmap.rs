use crate::geom::Rect;
use crate::image_source::Image;
use crate::surface::Surface;

/// An image, or a region of one, drawn at the node's origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bitmap {
    pub image: Option<Image>,
    /// Region of the image to draw. Parts outside the image are skipped
    /// without shifting the rest.
    pub source_rect: Option<Rect>,
}

impl Bitmap {
    pub fn new(image: Image) -> Self {
        Self {
            image: Some(image),
            source_rect: None,
        }
    }

    pub fn with_source_rect(mut self, rect: Rect) -> Self {
        self.source_rect = Some(rect);
        self
    }

    pub(crate) fn draw(&self, surface: &mut Surface) -> bool {
        let Some(image) = &self.image else {
            return false;
        };
        match self.source_rect {
            Some(rect) => {
                let (w, h) = (f64::from(image.width()), f64::from(image.height()));
                let (mut x1, mut y1) = (rect.x, rect.y);
                let x2 = (x1 + rect.width).min(w);
                let y2 = (y1 + rect.height).min(h);
                let (mut x, mut y) = (0.0, 0.0);
                if x1 < 0.0 {
                    x -= x1;
                    x1 = 0.0;
                }
                if y1 < 0.0 {
                    y -= y1;
                    y1 = 0.0;
                }
                let src = Rect::new(x1, y1, x2 - x1, y2 - y1);
                surface.draw_image_rect(image, src, Rect::new(x, y, src.width, src.height));
            }
            None => surface.draw_image(image, 0.0, 0.0),
        }
        true
    }

    pub(crate) fn has_content(&self) -> bool {
        self.image.is_some()
    }

    pub(crate) fn bounds(&self) -> Option<Rect> {
        let image = self.image.as_ref()?;
        Some(match self.source_rect {
            Some(rect) => Rect::new(0.0, 0.0, rect.width, rect.height),
            None => Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height())),
        })
    }
}
