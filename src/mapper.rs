use serde::Serialize;

/// A point in either coordinate space. Stored points are always in original space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A size that can be mapped against: both axes finite and non-zero.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<egui::Vec2> for Size {
    fn from(v: egui::Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Linear scale pair between the image's native pixel space and the
/// size it is currently displayed at.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateMapper {
    original: Size,
}

impl CoordinateMapper {
    pub fn new(original: Size) -> Self {
        Self { original }
    }

    pub fn original_size(&self) -> Size {
        self.original
    }

    /// Per-axis `display / original` factors, or `None` if either size
    /// has not been laid out yet.
    pub fn scale_factors(&self, display: Size) -> Option<(f32, f32)> {
        if !display.is_drawable() || !self.original.is_drawable() {
            return None;
        }
        Some((
            display.width / self.original.width,
            display.height / self.original.height,
        ))
    }

    /// Display-space click (relative to the image's top-left) to original space,
    /// using the display size in effect at click time.
    pub fn to_original(&self, p: Point, display: Size) -> Option<Point> {
        let (sx, sy) = self.scale_factors(display)?;
        Some(Point::new(p.x / sx, p.y / sy))
    }

    /// Original-space point to the current display space.
    pub fn to_displayed(&self, p: Point, display: Size) -> Option<Point> {
        let (sx, sy) = self.scale_factors(display)?;
        Some(Point::new(p.x * sx, p.y * sy))
    }
}
