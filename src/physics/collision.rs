//! 2D overlap tests used by the barrier query and combat

use glam::Vec2;

/// Axis-aligned rectangle stored as its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner in world space
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from its top-left corner
    #[must_use]
    pub fn from_top_left(min: Vec2, width: f32, height: f32) -> Self {
        Self {
            min,
            size: Vec2::new(width, height),
        }
    }

    /// Create a rectangle centered on a point
    #[must_use]
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        let size = Vec2::new(width, height);
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    /// Bottom-right corner
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap test. Rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();

        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    /// Check whether this rectangle lies entirely inside `bounds`
    #[must_use]
    pub fn is_inside(&self, bounds: &Rect) -> bool {
        let max = self.max();
        let bounds_max = bounds.max();

        self.min.x >= bounds.min.x
            && self.min.y >= bounds.min.y
            && max.x <= bounds_max.x
            && max.y <= bounds_max.y
    }
}

/// Circle collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    #[must_use]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Touching circles count as overlapping
    #[must_use]
    pub fn overlaps(&self, other: &Circle) -> bool {
        let radii = self.radius + other.radius;
        self.center.distance_squared(other.center) <= radii * radii
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::from_top_left(Vec2::ZERO, 10.0, 10.0);
        let b = Rect::from_top_left(Vec2::new(5.0, 5.0), 10.0, 10.0);
        let c = Rect::from_top_left(Vec2::new(20.0, 0.0), 5.0, 5.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_rect_touching_edges_do_not_overlap() {
        let a = Rect::from_top_left(Vec2::ZERO, 10.0, 10.0);
        let b = Rect::from_top_left(Vec2::new(10.0, 0.0), 10.0, 10.0);

        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center(Vec2::new(50.0, 50.0), 20.0, 10.0);

        assert_eq!(rect.min, Vec2::new(40.0, 45.0));
        assert_eq!(rect.max(), Vec2::new(60.0, 55.0));
        assert_eq!(rect.center(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_rect_inside_bounds() {
        let bounds = Rect::from_top_left(Vec2::ZERO, 100.0, 100.0);

        assert!(Rect::from_center(Vec2::new(50.0, 50.0), 10.0, 10.0).is_inside(&bounds));
        assert!(!Rect::from_center(Vec2::new(2.0, 50.0), 10.0, 10.0).is_inside(&bounds));
    }

    #[test]
    fn test_circle_overlap() {
        let a = Circle::new(Vec2::ZERO, 1.0);
        let touching = Circle::new(Vec2::new(2.0, 0.0), 1.0);
        let apart = Circle::new(Vec2::new(3.0, 0.0), 1.0);

        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
    }
}
