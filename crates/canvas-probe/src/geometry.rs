//! Pixel geometry for synthetic elements.
//!
//! Contours are closed polygons in canvas pixel space (y grows downwards).
//! Centroids are derived from polygon image moments and truncated toward zero,
//! which keeps click coordinates identical to previously recorded runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A pixel coordinate inside the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create a new size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in pixels
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Size of the rectangle
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether a point lies inside the rectangle or on its boundary
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let right = i64::from(self.x) + i64::from(self.width);
        let bottom = i64::from(self.y) + i64::from(self.height);
        point.x >= self.x
            && point.y >= self.y
            && i64::from(point.x) <= right
            && i64::from(point.y) <= bottom
    }

    /// Smallest upright rectangle containing every point, counting pixels
    /// inclusively on both ends (`max - min + 1`)
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(
            min_x,
            min_y,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        ))
    }
}

/// Spatial moments of a polygon (orders 0 and 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Signed area
    pub m00: f64,
    /// First moment about the y axis
    pub m10: f64,
    /// First moment about the x axis
    pub m01: f64,
}

impl Moments {
    /// Compute moments of a closed polygon with Green's theorem
    #[must_use]
    pub fn of_polygon(points: &[Point]) -> Self {
        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            let (x0, y0) = (f64::from(p.x), f64::from(p.y));
            let (x1, y1) = (f64::from(q.x), f64::from(q.y));
            let cross = x0 * y1 - x1 * y0;
            m00 += cross;
            m10 += (x0 + x1) * cross;
            m01 += (y0 + y1) * cross;
        }
        Self {
            m00: m00 / 2.0,
            m10: m10 / 6.0,
            m01: m01 / 6.0,
        }
    }

    /// Centroid truncated toward zero, `None` for a zero-area polygon
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}

/// Rectangle contour: top-left, top-right, bottom-right, bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour(pub [Point; 4]);

impl Contour {
    /// Contour of the rectangle at `location` with `size`
    #[must_use]
    pub fn rectangle(location: Point, size: Size) -> Self {
        let right = location.x + size.width as i32;
        let bottom = location.y + size.height as i32;
        Self([
            location,
            Point::new(right, location.y),
            Point::new(right, bottom),
            Point::new(location.x, bottom),
        ])
    }

    /// Contour points in order
    #[must_use]
    pub const fn points(&self) -> &[Point; 4] {
        &self.0
    }

    /// Polygon moments
    #[must_use]
    pub fn moments(&self) -> Moments {
        Moments::of_polygon(&self.0)
    }

    /// Absolute polygon area
    #[must_use]
    pub fn area(&self) -> f64 {
        self.moments().m00.abs()
    }

    /// Bounding rectangle over the contour points
    #[must_use]
    pub fn bounding_rect(&self) -> PixelRect {
        let [a, b, c, d] = self.0;
        PixelRect::bounding(&[a, b, c, d]).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod contour_tests {
        use super::*;

        #[test]
        fn test_rectangle_corner_order() {
            let c = Contour::rectangle(Point::new(10, 20), Size::new(30, 40));
            assert_eq!(
                c.points(),
                &[
                    Point::new(10, 20),
                    Point::new(40, 20),
                    Point::new(40, 60),
                    Point::new(10, 60),
                ]
            );
        }

        #[test]
        fn test_area() {
            let c = Contour::rectangle(Point::new(3, 4), Size::new(7, 9));
            assert_eq!(c.area(), 63.0);
        }

        #[test]
        fn test_bounding_rect_is_inclusive() {
            let c = Contour::rectangle(Point::new(5, 6), Size::new(10, 20));
            assert_eq!(c.bounding_rect(), PixelRect::new(5, 6, 11, 21));
        }
    }

    mod moments_tests {
        use super::*;

        #[test]
        fn test_centroid_even_size() {
            let c = Contour::rectangle(Point::new(0, 0), Size::new(10, 20));
            assert_eq!(c.moments().centroid(), Some(Point::new(5, 10)));
        }

        #[test]
        fn test_centroid_truncates() {
            let c = Contour::rectangle(Point::new(1, 1), Size::new(5, 7));
            // 3.5 and 4.5 truncate to 3 and 4
            assert_eq!(c.moments().centroid(), Some(Point::new(3, 4)));
        }

        #[test]
        fn test_zero_area_has_no_centroid() {
            let c = Contour::rectangle(Point::new(4, 4), Size::new(0, 10));
            assert_eq!(c.moments().centroid(), None);
        }

        #[test]
        fn test_triangle_centroid() {
            let m = Moments::of_polygon(&[Point::new(0, 0), Point::new(6, 0), Point::new(0, 6)]);
            assert_eq!(m.m00.abs(), 18.0);
            assert_eq!(m.centroid(), Some(Point::new(2, 2)));
        }
    }

    mod rect_tests {
        use super::*;

        #[test]
        fn test_contains_boundary() {
            let r = PixelRect::new(10, 10, 5, 5);
            assert!(r.contains(Point::new(10, 10)));
            assert!(r.contains(Point::new(15, 15)));
            assert!(!r.contains(Point::new(16, 12)));
            assert!(!r.contains(Point::new(9, 12)));
        }

        #[test]
        fn test_bounding_empty() {
            assert_eq!(PixelRect::bounding(&[]), None);
        }

        #[test]
        fn test_display() {
            assert_eq!(Point::new(3, -2).to_string(), "(3, -2)");
            assert_eq!(Size::new(640, 480).to_string(), "640x480");
        }
    }

    proptest! {
        #[test]
        fn prop_contour_area_is_width_times_height(
            x in 0i32..4000, y in 0i32..4000, w in 1u32..2000, h in 1u32..2000
        ) {
            let size = Size::new(w, h);
            let c = Contour::rectangle(Point::new(x, y), size);
            prop_assert_eq!(c.area(), size.area() as f64);
            let [tl, tr, br, bl] = *c.points();
            prop_assert_eq!(tl.y, tr.y);
            prop_assert_eq!(bl.y, br.y);
            prop_assert_eq!(tl.x, bl.x);
            prop_assert_eq!(tr.x, br.x);
        }

        #[test]
        fn prop_centroid_is_integer_half(
            x in 0i32..4000, y in 0i32..4000, w in 1u32..2000, h in 1u32..2000
        ) {
            let location = Point::new(x, y);
            let c = Contour::rectangle(location, Size::new(w, h));
            let centroid = c.moments().centroid().unwrap();
            prop_assert_eq!(centroid, Point::new(x + (w / 2) as i32, y + (h / 2) as i32));
            prop_assert!(PixelRect::new(x, y, w, h).contains(centroid));
        }
    }
}
