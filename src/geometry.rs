/// Integer point in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle `[left, right] x [top, bottom]`.
///
/// Coordinates may lie outside an image; consumers such as the integral
/// image clamp or zero them as they need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Rect {
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Square window of the given radius centred on `(x, y)`.
    pub fn around(x: i32, y: i32, radius: i32) -> Self {
        Self::new(y - radius, x - radius, y + radius, x + radius)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// True if the rectangle is well formed and lies fully inside a
    /// `width x height` image.
    pub fn check(&self, width: u32, height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.left <= self.right
            && self.top <= self.bottom
            && (self.right as i64) < width as i64
            && (self.bottom as i64) < height as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_around_point() {
        let r = Rect::around(5, 7, 2);
        assert_eq!(r, Rect::new(5, 3, 9, 7));
        assert_eq!((r.width(), r.height()), (5, 5));
        assert!(r.contains(Point::new(3, 9)));
        assert!(!r.contains(Point::new(2, 9)));
    }

    #[test]
    fn check_against_image_bounds() {
        assert!(Rect::new(0, 0, 9, 9).check(10, 10));
        assert!(!Rect::new(0, 0, 10, 9).check(10, 10));
        assert!(!Rect::new(-1, 0, 3, 3).check(10, 10));
        assert!(!Rect::new(4, 4, 3, 3).check(10, 10));
    }
}
