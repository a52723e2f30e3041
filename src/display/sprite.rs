//! Frame-sequence animation.

use std::fmt;
use std::sync::Arc;

use crate::geom::Rect;
use crate::image_source::Image;
use crate::surface::Surface;

/// One animation frame: a region of an image and its registration point.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: Image,
    pub rect: Rect,
    pub reg_x: f64,
    pub reg_y: f64,
}

impl Frame {
    pub fn new(image: Image, rect: Rect, reg_x: f64, reg_y: f64) -> Self {
        Self {
            image,
            rect,
            reg_x,
            reg_y,
        }
    }

    /// The whole image as a single frame.
    pub fn whole(image: Image) -> Self {
        let rect = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
        Self::new(image, rect, 0.0, 0.0)
    }

    /// Bounds relative to the registration point.
    pub fn bounds(&self) -> Rect {
        Rect::new(-self.reg_x, -self.reg_y, self.rect.width, self.rect.height)
    }
}

/// Supplies frames to a [`Sprite`]. Loading and slicing sprite sheets is up
/// to the implementor.
pub trait FrameSource: fmt::Debug + Send + Sync {
    fn frame(&self, index: usize) -> Option<Frame>;

    fn num_frames(&self) -> usize;

    /// False while frames are still loading. Sprites draw nothing until ready.
    fn is_ready(&self) -> bool {
        true
    }

    /// Default playback rate in frames per second. Zero advances one frame
    /// per tick.
    fn framerate(&self) -> f64 {
        0.0
    }
}

impl FrameSource for Vec<Frame> {
    fn frame(&self, index: usize) -> Option<Frame> {
        self.get(index).cloned()
    }

    fn num_frames(&self) -> usize {
        self.len()
    }
}

/// Plays the frames of a [`FrameSource`] in a loop.
#[derive(Debug, Clone)]
pub struct Sprite {
    source: Arc<dyn FrameSource>,
    current_frame: usize,
    /// Overrides the source framerate when non-zero.
    pub framerate: f64,
    paused: bool,
    /// Fractional frames carried between ticks.
    elapsed: f64,
    skip_advance: bool,
}

impl Sprite {
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self {
            source,
            current_frame: 0,
            framerate: 0.0,
            paused: true,
            elapsed: 0.0,
            skip_advance: false,
        }
    }

    pub fn source(&self) -> &Arc<dyn FrameSource> {
        &self.source
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn stop(&mut self) {
        self.paused = true;
    }

    /// Jump to a frame and keep playing from there. The next tick shows the
    /// requested frame instead of advancing past it.
    pub fn goto_and_play(&mut self, frame: usize) {
        self.paused = false;
        self.skip_advance = true;
        self.goto(frame);
    }

    pub fn goto_and_stop(&mut self, frame: usize) {
        self.paused = true;
        self.goto(frame);
    }

    fn goto(&mut self, frame: usize) {
        self.elapsed = 0.0;
        let count = self.source.num_frames();
        self.current_frame = if count == 0 { 0 } else { frame % count };
    }

    /// Move the playhead. With a framerate and a `time` delta in
    /// milliseconds the step is time based, otherwise one frame.
    pub fn advance(&mut self, time: Option<f64>) {
        let fps = if self.framerate > 0.0 {
            self.framerate
        } else {
            self.source.framerate()
        };
        let step = match time {
            Some(time) if fps > 0.0 => time / (1000.0 / fps),
            _ => 1.0,
        };
        let count = self.source.num_frames();
        if count == 0 {
            return;
        }
        self.elapsed += step;
        let whole = self.elapsed.floor();
        self.elapsed -= whole;
        self.current_frame = (self.current_frame + whole as usize) % count;
    }

    pub(crate) fn tick(&mut self, delta: Option<f64>) {
        if self.paused {
            return;
        }
        if !self.skip_advance {
            self.advance(delta);
        }
        self.skip_advance = false;
    }

    pub(crate) fn draw(&self, surface: &mut Surface) -> bool {
        let Some(frame) = self.source.frame(self.current_frame) else {
            return false;
        };
        let rect = frame.rect;
        if !rect.is_empty() {
            let dst = Rect::new(-frame.reg_x, -frame.reg_y, rect.width, rect.height);
            surface.draw_image_rect(&frame.image, rect, dst);
        }
        true
    }

    pub(crate) fn has_content(&self) -> bool {
        self.source.is_ready()
    }

    pub(crate) fn bounds(&self) -> Option<Rect> {
        self.source.frame(self.current_frame).map(|f| f.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn frames(count: usize) -> Arc<dyn FrameSource> {
        let image = Image::solid(4, 4, Color::RED).unwrap();
        Arc::new(
            (0..count)
                .map(|_| Frame::new(image.clone(), Rect::new(0.0, 0.0, 4.0, 4.0), 2.0, 2.0))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_paused_sprite_does_not_advance() {
        let mut sprite = Sprite::new(frames(3));
        sprite.tick(None);
        assert_eq!(sprite.current_frame(), 0);

        sprite.play();
        sprite.tick(None);
        sprite.tick(None);
        sprite.tick(None);
        assert_eq!(sprite.current_frame(), 0);
    }

    #[test]
    fn test_goto_and_play_shows_requested_frame_first() {
        let mut sprite = Sprite::new(frames(4));
        sprite.goto_and_play(2);
        sprite.tick(None);
        assert_eq!(sprite.current_frame(), 2);
        sprite.tick(None);
        assert_eq!(sprite.current_frame(), 3);
    }

    #[test]
    fn test_time_based_advance() {
        let mut sprite = Sprite::new(frames(10));
        sprite.framerate = 10.0;
        sprite.advance(Some(50.0));
        assert_eq!(sprite.current_frame(), 0);
        sprite.advance(Some(50.0));
        assert_eq!(sprite.current_frame(), 1);
        sprite.advance(Some(250.0));
        assert_eq!(sprite.current_frame(), 3);
    }

    #[test]
    fn test_bounds_use_registration_point() {
        let sprite = Sprite::new(frames(1));
        assert_eq!(sprite.bounds(), Some(Rect::new(-2.0, -2.0, 4.0, 4.0)));
        let empty = Sprite::new(frames(0));
        assert_eq!(empty.bounds(), None);
    }

    #[test]
    fn test_draw_centers_on_registration_point() {
        let sprite = Sprite::new(frames(1));
        let mut surface = Surface::new(4, 4).unwrap();
        surface.transform(&crate::matrix::Matrix2D::new(1.0, 0.0, 0.0, 1.0, 2.0, 2.0));
        assert!(sprite.draw(&mut surface));
        assert_eq!(surface.pixel_alpha(0, 0).unwrap(), 255);
        assert_eq!(surface.pixel_alpha(3, 3).unwrap(), 255);
    }
}
