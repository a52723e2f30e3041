//! Plain geometry value types shared by the scene graph.

/// A point in either local, parent or stage space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Grow this rect so it also covers `(x, y, width, height)`.
    pub fn extend(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        if x + width > self.x + self.width {
            self.width = x + width - self.x;
        }
        if y + height > self.y + self.height {
            self.height = y + height - self.y;
        }
        if x < self.x {
            self.width += self.x - x;
            self.x = x;
        }
        if y < self.y {
            self.height += self.y - y;
            self.y = y;
        }
        self
    }

    /// Smallest rect covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let mut out = *self;
        out.extend(other.x, other.y, other.width, other.height);
        out
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
