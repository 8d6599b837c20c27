use serde::{Deserialize, Serialize};

pub type Point = [f32; 2];

pub fn distance(a: Point, b: Point) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Axis-aligned proximity: both deltas strictly below `threshold`.
pub fn near_point(p: Point, target: Point, threshold: f32) -> bool {
    (p[0] - target[0]).abs() < threshold && (p[1] - target[1]).abs() < threshold
}

/// `c` lies on segment `ab` when `|ab|` equals `|ac| + |cb|` within `threshold`.
///
/// A zero-length segment degrades to a point-distance test.
pub fn on_segment(a: Point, b: Point, c: Point, threshold: f32) -> bool {
    let ab = distance(a, b);
    if ab <= f32::EPSILON {
        return distance(a, c) < threshold;
    }
    let offset = ab - (distance(a, c) + distance(b, c));
    offset.abs() < threshold
}

pub fn in_rect(p: Point, coords: &Coords) -> bool {
    let (min, max) = (coords.min(), coords.max());
    p[0] >= min[0] && p[0] <= max[0] && p[1] >= min[1] && p[1] <= max[1]
}

pub fn bounds_of(points: &[Point]) -> Option<Coords> {
    let first = *points.first()?;
    let mut bounds = Coords::from_points(first, first);
    for p in &points[1..] {
        bounds.x1 = bounds.x1.min(p[0]);
        bounds.y1 = bounds.y1.min(p[1]);
        bounds.x2 = bounds.x2.max(p[0]);
        bounds.y2 = bounds.y2.max(p[1]);
    }
    Some(bounds)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Coords {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start[0], start[1], end[0], end[1])
    }

    pub fn start(&self) -> Point {
        [self.x1, self.y1]
    }

    pub fn end(&self) -> Point {
        [self.x2, self.y2]
    }

    pub fn min(&self) -> Point {
        [self.x1.min(self.x2), self.y1.min(self.y2)]
    }

    pub fn max(&self) -> Point {
        [self.x1.max(self.x2), self.y1.max(self.y2)]
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Same extent, with `(x1, y1)` moved to `origin`.
    pub fn translated_to(&self, origin: Point) -> Self {
        Self::new(
            origin[0],
            origin[1],
            origin[0] + self.width(),
            origin[1] + self.height(),
        )
    }

    /// Box canonical form: top-left to bottom-right.
    pub fn ordered_box(&self) -> Self {
        Self::from_points(self.min(), self.max())
    }

    /// Line canonical form: left to right, vertical ties keep the lower `y2` first.
    /// The flag reports whether the endpoints were swapped.
    pub fn ordered_line(&self) -> (Self, bool) {
        if self.x1 < self.x2 || (self.x1 == self.x2 && self.y2 <= self.y1) {
            (*self, false)
        } else {
            (Self::from_points(self.end(), self.start()), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_point_is_strict() {
        assert!(near_point([11.0, 11.0], [10.0, 10.0], 5.0));
        assert!(!near_point([15.0, 10.0], [10.0, 10.0], 5.0));
    }

    #[test]
    fn test_on_segment() {
        assert!(on_segment([0.0, 0.0], [10.0, 0.0], [5.0, 0.0], 2.0));
        assert!(on_segment([0.0, 0.0], [10.0, 0.0], [5.0, 0.5], 2.0));
        assert!(!on_segment([0.0, 0.0], [10.0, 0.0], [5.0, 6.0], 2.0));
        assert!(!on_segment([0.0, 0.0], [10.0, 0.0], [20.0, 0.0], 2.0));
    }

    #[test]
    fn test_zero_length_segment_has_no_nan() {
        let p = [3.0, 3.0];
        assert!(on_segment(p, p, [3.5, 3.0], 2.0));
        assert!(!on_segment(p, p, [8.0, 3.0], 2.0));
    }

    #[test]
    fn test_ordering_is_idempotent() {
        let coords = Coords::new(50.0, 40.0, 10.0, 5.0);
        let once = coords.ordered_box();
        assert_eq!(once, Coords::new(10.0, 5.0, 50.0, 40.0));
        assert_eq!(once.ordered_box(), once);

        let (line, swapped) = coords.ordered_line();
        assert!(swapped);
        assert_eq!(line, Coords::new(10.0, 5.0, 50.0, 40.0));
        assert_eq!(line.ordered_line(), (line, false));

        let vertical = Coords::new(0.0, 0.0, 0.0, 10.0);
        let (ordered, swapped) = vertical.ordered_line();
        assert!(swapped);
        assert_eq!(ordered.ordered_line(), (ordered, false));
    }

    #[test]
    fn test_bounds_of() {
        assert_eq!(bounds_of(&[]), None);
        let bounds = bounds_of(&[[3.0, 9.0], [-1.0, 4.0], [7.0, 2.0]]).unwrap();
        assert_eq!(bounds, Coords::new(-1.0, 2.0, 7.0, 9.0));
    }
}
