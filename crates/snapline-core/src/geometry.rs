//! Small geometric helpers shared by the lattice, guideline and source code.

use kurbo::{Point, Rect, Vec2};

/// Segments shorter than this are treated as degenerate.
pub const DEGENERATE_LENGTH: f64 = 1e-10;

/// Normal returned for degenerate segments.
pub const FALLBACK_NORMAL: Vec2 = Vec2::new(0.0, -1.0);

/// Check the bounds invariant: finite corners, `x0 <= x1`, `y0 <= y1`.
///
/// Boxes failing this check must be discarded before any matching.
pub fn bounds_are_valid(bounds: Rect) -> bool {
    bounds.x0.is_finite()
        && bounds.y0.is_finite()
        && bounds.x1.is_finite()
        && bounds.y1.is_finite()
        && bounds.x0 <= bounds.x1
        && bounds.y0 <= bounds.y1
}

/// Unit normal of the segment `a -> b` (direction rotated by -90°).
pub fn segment_normal(a: Point, b: Point) -> Vec2 {
    let seg = b - a;
    let len = seg.hypot();
    if len < DEGENERATE_LENGTH {
        return FALLBACK_NORMAL;
    }
    Vec2::new(seg.y / len, -seg.x / len)
}

/// Closest point to `point` on the segment `a -> b`.
pub fn closest_point_on_segment(point: Point, a: Point, b: Point) -> Point {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
        return a;
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// The four outline segments of a box, clockwise from the top-left corner.
pub fn outline_segments(bounds: Rect) -> [(Point, Point); 4] {
    let tl = Point::new(bounds.x0, bounds.y0);
    let tr = Point::new(bounds.x1, bounds.y0);
    let br = Point::new(bounds.x1, bounds.y1);
    let bl = Point::new(bounds.x0, bounds.y1);
    [(tl, tr), (tr, br), (br, bl), (bl, tl)]
}

/// Round `value` to the nearest multiple of `step`.
#[inline]
pub fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_validity() {
        assert!(bounds_are_valid(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(bounds_are_valid(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(!bounds_are_valid(Rect::new(10.0, 0.0, 0.0, 10.0)));
        assert!(!bounds_are_valid(Rect::new(0.0, f64::NAN, 10.0, 10.0)));
        assert!(!bounds_are_valid(Rect::new(0.0, 0.0, f64::INFINITY, 10.0)));
    }

    #[test]
    fn test_segment_normal() {
        let n = segment_normal(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!((n.x - 0.0).abs() < 1e-12);
        assert!((n.y + 1.0).abs() < 1e-12);

        let n = segment_normal(Point::new(0.0, 0.0), Point::new(0.0, 5.0));
        assert!((n.x - 1.0).abs() < 1e-12);
        assert!(n.y.abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segment_normal_falls_back() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(segment_normal(p, p), FALLBACK_NORMAL);
        assert_eq!(segment_normal(p, Point::new(3.0 + 1e-12, 4.0)), FALLBACK_NORMAL);
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Point::new(4.0, 3.0), a, b), Point::new(4.0, 0.0));
        assert_eq!(closest_point_on_segment(Point::new(-4.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Point::new(14.0, -3.0), a, b), b);
        assert_eq!(closest_point_on_segment(Point::new(1.0, 1.0), a, a), a);
    }

    #[test]
    fn test_round_to_step() {
        assert_eq!(round_to_step(23.0, 20.0), 20.0);
        assert_eq!(round_to_step(31.0, 20.0), 40.0);
        assert_eq!(round_to_step(-31.0, 20.0), -40.0);
    }
}
