use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// On-screen stroke width in viewport pixels. Baking rescales it to native resolution.
pub const BASE_STROKE_WIDTH: f32 = 12.0;
pub const STROKE_COLOR: Color = Color::rgba(255, 0, 0, 255);

/// The current image. Replaced wholesale on load and bake, never mutated in place.
pub type ImageHandle = Arc<RgbaImage>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: BASE_STROKE_WIDTH,
            color: STROKE_COLOR,
        }
    }
}

impl StrokeStyle {
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            ..self
        }
    }
}

/// A freehand path in image-space coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Stroke {
        Stroke {
            points: self.points.iter().copied().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_is_average_of_both_points() {
        let mid = Point::new(10.0, 20.0).midpoint(Point::new(30.0, 60.0));
        assert_eq!(mid, Point::new(20.0, 40.0));
    }

    #[test]
    fn scaled_style_keeps_color() {
        let style = StrokeStyle::default().scaled(2.0);
        assert_eq!(style.width, BASE_STROKE_WIDTH * 2.0);
        assert_eq!(style.color, STROKE_COLOR);
    }

    #[test]
    fn map_points_preserves_order_and_count() {
        let stroke = Stroke::from_points(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        let doubled = stroke.map_points(|p| Point::new(p.x * 2.0, p.y * 2.0));
        assert_eq!(
            doubled.points(),
            &[Point::new(2.0, 4.0), Point::new(6.0, 8.0)]
        );
    }
}
