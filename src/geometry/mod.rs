//! Geometric primitives for diagram layout analysis.
//!
//! All geometry operates on inclusive integer pixel rectangles: a
//! rectangle `[x1, y1, x2, y2]` covers the pixels `x1..=x2` and
//! `y1..=y2`, so its width is `x2 - x1 + 1`. This matches the raster
//! component statistics the rectangles are derived from.

use serde::{Deserialize, Serialize};

/// An inclusive rectangle in raster space (origin top-left, pixels).
///
/// Invariant: `x1 <= x2` and `y1 <= y2`; width and height are always
/// positive after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct PixelRect {
    /// Left edge column
    pub x1: i32,
    /// Top edge row
    pub y1: i32,
    /// Right edge column (inclusive)
    pub x2: i32,
    /// Bottom edge row (inclusive)
    pub y2: i32,
}

impl From<[i32; 4]> for PixelRect {
    fn from(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<PixelRect> for [i32; 4] {
    fn from(r: PixelRect) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

impl PixelRect {
    /// Create a rectangle from two corners, normalizing their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ladder_oxide::geometry::PixelRect;
    ///
    /// let r = PixelRect::new(10, 5, 0, 0);
    /// assert_eq!(r.x1, 0);
    /// assert_eq!(r.x2, 10);
    /// assert_eq!(r.width(), 11);
    /// ```
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Width in pixels (inclusive).
    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    /// Height in pixels (inclusive).
    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// Center point `(cx, cy)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 + self.x2) as f64 / 2.0,
            (self.y1 + self.y2) as f64 / 2.0,
        )
    }

    /// Vertical center row.
    pub fn center_y(&self) -> f64 {
        (self.y1 + self.y2) as f64 / 2.0
    }

    /// Whether the rectangle contains the pixel `(x, y)`.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        PixelRect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Bounding box of a non-empty slice of rectangles.
    ///
    /// Returns `[0,0,0,0]` for an empty slice.
    pub fn union_all(rects: &[PixelRect]) -> PixelRect {
        match rects.split_first() {
            None => PixelRect::new(0, 0, 0, 0),
            Some((first, rest)) => rest.iter().fold(*first, |acc, r| acc.union(r)),
        }
    }

    /// Horizontal overlap with another rectangle, in pixels.
    pub fn x_overlap(&self, other: &PixelRect) -> i32 {
        let left = self.x1.max(other.x1);
        let right = self.x2.min(other.x2);
        (right - left + 1).max(0)
    }

    /// Vertical overlap with another rectangle, in pixels.
    pub fn y_overlap(&self, other: &PixelRect) -> i32 {
        let top = self.y1.max(other.y1);
        let bot = self.y2.min(other.y2);
        (bot - top + 1).max(0)
    }

    /// Horizontal overlap as a ratio of the narrower rectangle's width.
    pub fn x_overlap_ratio(&self, other: &PixelRect) -> f64 {
        let base = self.width().min(other.width());
        if base <= 0 {
            return 0.0;
        }
        self.x_overlap(other) as f64 / base as f64
    }

    /// Vertical overlap as a ratio of the shorter rectangle's height.
    pub fn y_overlap_ratio(&self, other: &PixelRect) -> f64 {
        let base = self.height().min(other.height());
        if base <= 0 {
            return 0.0;
        }
        self.y_overlap(other) as f64 / base as f64
    }

    /// Intersection-over-Union with another rectangle, in `[0, 1]`.
    ///
    /// Symmetric; `iou(r, r) == 1.0` for any valid rectangle.
    pub fn iou(&self, other: &PixelRect) -> f64 {
        let iw = self.x_overlap(other) as f64;
        let ih = self.y_overlap(other) as f64;
        let inter = iw * ih;
        let area_a = self.width() as f64 * self.height() as f64;
        let area_b = other.width() as f64 * other.height() as f64;
        let union = area_a + area_b - inter;
        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

/// Whether two widths agree within a relative or absolute tolerance.
///
/// Used by the OR pass to decide that two blocks sit on the same branch.
pub fn similar_width(w_ref: i32, w_test: i32, rel_tol: f64, abs_tol: i32) -> bool {
    let abs_diff = (w_test - w_ref).abs();
    if w_ref <= 0 {
        return abs_diff <= abs_tol;
    }
    let rel_diff = abs_diff as f64 / w_ref as f64;
    rel_diff <= rel_tol || abs_diff <= abs_tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = PixelRect::new(10, 20, 0, 5);
        assert_eq!(r, PixelRect::new(0, 5, 10, 20));
        assert!(r.width() > 0 && r.height() > 0);
    }

    #[test]
    fn test_width_height_inclusive() {
        let r = PixelRect::new(0, 0, 0, 0);
        assert_eq!(r.width(), 1);
        assert_eq!(r.height(), 1);
    }

    #[test]
    fn test_iou_identity() {
        let r = PixelRect::new(5, 5, 50, 30);
        assert_eq!(r.iou(&r), 1.0);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = PixelRect::new(0, 0, 9, 9);
        let b = PixelRect::new(20, 20, 29, 29);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial() {
        // 10x10 squares overlapping in a 5x10 strip
        let a = PixelRect::new(0, 0, 9, 9);
        let b = PixelRect::new(5, 0, 14, 9);
        let inter = 5.0 * 10.0;
        let union = 100.0 + 100.0 - inter;
        assert!((a.iou(&b) - inter / union).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_ratios() {
        let a = PixelRect::new(0, 0, 99, 9);
        let b = PixelRect::new(50, 0, 99, 9);
        // b is fully overlapped horizontally; ratio over narrower (b)
        assert_eq!(a.x_overlap_ratio(&b), 1.0);
        assert_eq!(a.y_overlap_ratio(&b), 1.0);
    }

    #[test]
    fn test_union_all() {
        let rects = [
            PixelRect::new(0, 10, 5, 20),
            PixelRect::new(3, 0, 9, 15),
        ];
        assert_eq!(PixelRect::union_all(&rects), PixelRect::new(0, 0, 9, 20));
        assert_eq!(PixelRect::union_all(&[]), PixelRect::new(0, 0, 0, 0));
    }

    #[test]
    fn test_similar_width() {
        assert!(similar_width(100, 109, 0.10, 12));
        assert!(similar_width(100, 112, 0.10, 12)); // abs tolerance
        assert!(!similar_width(100, 120, 0.10, 12));
        assert!(similar_width(0, 10, 0.10, 12)); // degenerate reference
    }

    proptest! {
        #[test]
        fn prop_iou_symmetric_and_bounded(
            ax1 in -200i32..200, ay1 in -200i32..200,
            aw in 0i32..100, ah in 0i32..100,
            bx1 in -200i32..200, by1 in -200i32..200,
            bw in 0i32..100, bh in 0i32..100,
        ) {
            let a = PixelRect::new(ax1, ay1, ax1 + aw, ay1 + ah);
            let b = PixelRect::new(bx1, by1, bx1 + bw, by1 + bh);
            let ab = a.iou(&b);
            let ba = b.iou(&a);
            prop_assert!((ab - ba).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&ab));
            prop_assert!((a.iou(&a) - 1.0).abs() < 1e-12);
        }
    }
}
