//! Screen-space primitives shared by the layout, the detector and the tiles.
//!
//! All coordinates are image pixels: origin at the top-left, `y` growing
//! downward, so "above" means a *smaller* `y`.

/// A 2D point in image pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn left(&self)   -> f32 { self.x }
    pub fn right(&self)  -> f32 { self.x + self.w }
    pub fn top(&self)    -> f32 { self.y }
    pub fn bottom(&self) -> f32 { self.y + self.h }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Point-in-rectangle test. Inclusive on all four edges.
    pub fn contains(&self, p: Point) -> bool {
        self.left() <= p.x && p.x <= self.right() && self.top() <= p.y && p.y <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(50.0, 50.0)));
        assert!(r.contains(Point::new(25.0, 49.9)));
        assert!(!r.contains(Point::new(50.1, 10.0)));
        assert!(!r.contains(Point::new(10.0, -0.1)));
    }

    #[test]
    fn center_and_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
    }
}
