/// Width/height pair in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// A size is known once both dimensions are strictly positive.
    ///
    /// Zero (or negative, or NaN) shows up before first layout and before the
    /// image asset has loaded.
    pub fn is_known(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A 2D point. Depending on context this is either pixels or percentages.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Clamps both coordinates into the `[0, 100]` percentage range.
    pub fn clamp_pct(self) -> Point {
        Point {
            x: clamp_pct(self.x),
            y: clamp_pct(self.y),
        }
    }
}

/// Axis-aligned rectangle, as returned by `getBoundingClientRect`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Rect::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x <= self.left + self.width
            && p.y >= self.top
            && p.y <= self.top + self.height
    }
}

/// Clamps a percentage into `[0, 100]`. NaN maps to `0`.
pub fn clamp_pct(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_known_requires_both_dimensions() {
        assert!(Size::new(10.0, 5.0).is_known());
        assert!(!Size::new(0.0, 5.0).is_known());
        assert!(!Size::new(10.0, 0.0).is_known());
        assert!(!Size::default().is_known());
    }

    #[test]
    fn clamp_pct_bounds_and_nan() {
        assert_eq!(clamp_pct(150.0), 100.0);
        assert_eq!(clamp_pct(-10.0), 0.0);
        assert_eq!(clamp_pct(42.5), 42.5);
        assert_eq!(clamp_pct(f64::NAN), 0.0);
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(Point::new(10.0, 20.0)));
        assert!(r.contains(Point::new(110.0, 70.0)));
        assert!(!r.contains(Point::new(111.0, 70.0)));
    }
}
