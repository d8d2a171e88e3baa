//! Primitive geometry value types in absolute screen coordinates.

use serde::{Deserialize, Serialize};

/// A point in virtual screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in absolute screen coordinates.
///
/// Width and height are unsigned, so a rectangle can never have a negative
/// extent. Rectangles are plain values: every "mutation" returns a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add_unsigned(self.width / 2),
            self.y.saturating_add_unsigned(self.height / 2),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Area of the overlap with `other` (0 when disjoint).
    pub fn intersection_area(&self, other: &Rectangle) -> u64 {
        let left = i64::from(self.x.max(other.x));
        let top = i64::from(self.y.max(other.y));
        let right = i64::from(self.right().min(other.right()));
        let bottom = i64::from(self.bottom().min(other.bottom()));
        if right <= left || bottom <= top {
            return 0;
        }
        // Both spans fit in u32, so the product fits in u64.
        (right - left).unsigned_abs() * (bottom - top).unsigned_abs()
    }

    pub fn with_origin(&self, x: i32, y: i32) -> Self {
        Self { x, y, ..*self }
    }

    /// Clamp this rectangle so it fits inside `area` and keeps at least
    /// `min_visible` pixels of itself on screen along each axis.
    pub fn clamp_within(&self, area: &Rectangle, min_visible: u32) -> Self {
        let width = self.width.min(area.width);
        let height = self.height.min(area.height);
        let min_visible = i64::from(min_visible.min(width).min(height));

        let x = i64::from(self.x)
            .max(i64::from(area.x) - i64::from(width) + min_visible)
            .min(i64::from(area.right()) - min_visible);
        let y = i64::from(self.y)
            .max(i64::from(area.y) - i64::from(height) + min_visible)
            .min(i64::from(area.bottom()) - min_visible);

        Self::new(saturate_i32(x), saturate_i32(y), width, height)
    }
}

fn saturate_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_and_center() {
        let r = Rectangle::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert_eq!(r.center(), Point::new(60, 45));
        assert!(!r.is_empty());
        assert!(Rectangle::new(0, 0, 0, 10).is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rectangle::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(9, 9)));
        assert!(!r.contains(Point::new(10, 5)));
        assert!(!r.contains(Point::new(-1, 5)));
    }

    #[test]
    fn test_intersection_area() {
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(50, 50, 100, 100);
        assert_eq!(a.intersection_area(&b), 2500);
        let c = Rectangle::new(200, 200, 10, 10);
        assert_eq!(a.intersection_area(&c), 0);
    }

    #[test]
    fn test_clamp_within_bounds_is_identity() {
        let area = Rectangle::new(0, 0, 1920, 1080);
        let r = Rectangle::new(100, 100, 800, 600);
        assert_eq!(r.clamp_within(&area, 100), r);
    }

    #[test]
    fn test_clamp_shrinks_oversized_window() {
        let area = Rectangle::new(0, 0, 1920, 1080);
        let r = Rectangle::new(0, 0, 3000, 2000).clamp_within(&area, 100);
        assert_eq!((r.width, r.height), (1920, 1080));
    }

    #[test]
    fn test_clamp_pulls_offscreen_window_back() {
        let area = Rectangle::new(0, 0, 1920, 1080);
        let right = Rectangle::new(5000, 0, 800, 600).clamp_within(&area, 100);
        assert_eq!(right.x, 1920 - 100);
        let left = Rectangle::new(-5000, 0, 800, 600).clamp_within(&area, 100);
        assert_eq!(left.x, -800 + 100);
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let huge = Rectangle::new(i32::MIN, i32::MIN, u32::MAX, u32::MAX);
        let far = Rectangle::new(i32::MAX - 10, i32::MAX - 10, u32::MAX, u32::MAX);
        assert_eq!(huge.intersection_area(&huge), u64::from(u32::MAX) * u64::from(u32::MAX));
        assert_eq!(huge.intersection_area(&far), 100);

        let everything = Rectangle::new(i32::MIN, 0, u32::MAX, 10);
        let window = Rectangle::new(-5, 0, 10, 10);
        assert_eq!(everything.intersection_area(&window), 100);

        let area = Rectangle::new(i32::MIN, i32::MIN, u32::MAX, u32::MAX);
        let r = Rectangle::new(i32::MAX, i32::MAX, u32::MAX, u32::MAX).clamp_within(&area, 100);
        assert_eq!((r.width, r.height), (u32::MAX, u32::MAX));
        assert!(r.x <= area.right() - 100);

        let small = Rectangle::new(0, 0, 1920, 1080);
        let r = Rectangle::new(i32::MIN, i32::MAX, 800, 600).clamp_within(&small, 100);
        assert_eq!((r.x, r.y), (-800 + 100, 1080 - 100));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Rectangle::new(1, 2, 3, 4)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"x": 1, "y": 2, "width": 3, "height": 4})
        );
    }
}
