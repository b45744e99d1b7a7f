//! Rail Extractor: isolates vertical and horizontal wire runs from a
//! binarized diagram raster.
//!
//! Orientation-specific opening keeps long straight runs, a small
//! dilation reconnects anti-aliased breaks, connected-component length
//! filters drop noise, and per-row gap closing bridges rendering
//! artifacts in horizontals. "True" verticals additionally pass aspect
//! and size gates before they are used as cut lines and topology
//! anchors.

use serde::{Deserialize, Serialize};

use crate::config::RailConfig;
use crate::geometry::PixelRect;
use crate::raster::{
    component_stats, dilate_rect, filter_components, open_line, BinaryMask, Orientation,
};

/// A validated vertical wire, used for topology lookups by the grouping
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalRail {
    /// Stable id within one image (component order).
    pub id: usize,
    /// Center column of the wire.
    pub x: i32,
    /// Top row of the wire's extent.
    pub y1: i32,
    /// Bottom row of the wire's extent (inclusive).
    pub y2: i32,
}

impl VerticalRail {
    /// Derive rails from true-vertical bounding boxes, ids in box order.
    pub fn from_boxes(boxes: &[PixelRect]) -> Vec<VerticalRail> {
        boxes
            .iter()
            .enumerate()
            .map(|(id, b)| VerticalRail {
                id,
                x: b.x1 + b.width() / 2,
                y1: b.y1,
                y2: b.y2,
            })
            .collect()
    }

    /// Whether this rail crosses a rectangle: its column lies within the
    /// rectangle's x-range expanded by `halo`, with positive y-overlap.
    pub fn crosses(&self, rect: &PixelRect, halo: i32) -> bool {
        if self.x < rect.x1 - halo || self.x > rect.x2 + halo {
            return false;
        }
        let top = rect.y1.max(self.y1);
        let bot = rect.y2.min(self.y2);
        bot - top + 1 > 0
    }
}

/// Extracts filtered wire masks from a binary raster.
pub struct RailExtractor {
    config: RailConfig,
}

impl Default for RailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RailExtractor {
    /// Create an extractor with default calibration.
    pub fn new() -> Self {
        Self::with_config(RailConfig::default())
    }

    /// Create an extractor with explicit settings.
    pub fn with_config(config: RailConfig) -> Self {
        Self { config }
    }

    fn kernel_len(&self, dimension: u32) -> u32 {
        self.config
            .kernel_min_len
            .max(dimension / self.config.kernel_divisor)
    }

    /// Isolate vertical runs: 1×k opening plus a 3×5 dilation.
    pub fn extract_vertical(&self, binary: &BinaryMask) -> BinaryMask {
        let klen = self.kernel_len(binary.height());
        let opened = open_line(binary, Orientation::Vertical, klen);
        dilate_rect(&opened, 3, 5)
    }

    /// Isolate horizontal runs: k×1 opening plus a 5×3 dilation.
    pub fn extract_horizontal(&self, binary: &BinaryMask) -> BinaryMask {
        let klen = self.kernel_len(binary.width());
        let opened = open_line(binary, Orientation::Horizontal, klen);
        dilate_rect(&opened, 5, 3)
    }

    /// Drop vertical components below the minimum height.
    pub fn filter_vertical_by_length(&self, mask: &BinaryMask) -> BinaryMask {
        let min = self.config.v_min_px as i32;
        filter_components(mask, |s| s.bbox.height() >= min)
    }

    /// Drop horizontal components above the maximum width (they likely
    /// span unrelated rows).
    pub fn filter_horizontal_by_length(&self, mask: &BinaryMask) -> BinaryMask {
        let max = self.config.h_max_px as i32;
        filter_components(mask, |s| s.bbox.width() <= max)
    }

    /// Bridge small gaps between horizontal runs.
    ///
    /// Each iteration scans every row and fills gaps of at most
    /// `gap_max_px` pixels, also painting the rows directly above and
    /// below; a final 3×1 dilation smooths the result.
    pub fn close_horizontal_gaps(&self, mask: &BinaryMask) -> BinaryMask {
        if mask.is_empty() {
            return mask.clone();
        }
        let mut m = mask.clone();
        for _ in 0..self.config.gap_close_iters {
            m = self.fill_gaps_once(&m);
        }
        dilate_rect(&m, 3, 1)
    }

    fn fill_gaps_once(&self, src: &BinaryMask) -> BinaryMask {
        let gap_max = self.config.gap_max_px as i32;
        let mut dst = src.clone();
        for y in 0..src.height() {
            let runs = src.row_runs(y);
            for pair in runs.windows(2) {
                let (_, e1) = pair[0];
                let (s2, _) = pair[1];
                let gap = s2 as i32 - e1 as i32 - 1;
                if gap > 0 && gap <= gap_max {
                    for x in (e1 as i32 + 1)..(s2 as i32) {
                        dst.set(x, y as i32, true);
                        dst.set(x, y as i32 - 1, true);
                        dst.set(x, y as i32 + 1, true);
                    }
                }
            }
        }
        dst
    }

    /// Select true verticals by aspect ratio and absolute size.
    ///
    /// Returns the filtered mask together with the bounding boxes of the
    /// accepted components (in component order).
    pub fn select_true_verticals(&self, vert_mask: &BinaryMask) -> (BinaryMask, Vec<PixelRect>) {
        if vert_mask.is_empty() {
            return (vert_mask.clone(), Vec::new());
        }
        let min_height = self.config.v_min_px.max(self.config.vert_min_height) as i32;
        let min_width = self.config.vert_min_width as i32;
        let min_aspect = self.config.vert_min_aspect;
        let accept = |bbox: &PixelRect| {
            if bbox.height() < min_height || bbox.width() < min_width {
                return false;
            }
            let aspect = bbox.height() as f64 / bbox.width().max(1) as f64;
            aspect >= min_aspect
        };
        let boxes: Vec<PixelRect> = component_stats(vert_mask)
            .iter()
            .map(|s| s.bbox)
            .filter(accept)
            .collect();
        let mask = filter_components(vert_mask, |s| accept(&s.bbox));
        (mask, boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::component_stats;

    fn vertical_line(mask: &mut BinaryMask, x: i32, y1: i32, y2: i32) {
        for y in y1..=y2 {
            mask.set(x, y, true);
        }
    }

    fn horizontal_line(mask: &mut BinaryMask, y: i32, x1: i32, x2: i32) {
        for x in x1..=x2 {
            mask.set(x, y, true);
        }
    }

    #[test]
    fn test_extract_vertical_keeps_long_drops_short() {
        let mut m = BinaryMask::new(100, 120);
        vertical_line(&mut m, 20, 10, 110); // 101 px tall
        vertical_line(&mut m, 60, 10, 15); // 6 px: below kernel
        let extractor = RailExtractor::new();
        let v = extractor.extract_vertical(&m);
        assert!(v.is_set(20, 50));
        assert!(!v.is_set(60, 12));
    }

    #[test]
    fn test_extraction_is_idempotent_over_input() {
        let mut m = BinaryMask::new(200, 100);
        horizontal_line(&mut m, 40, 10, 180);
        vertical_line(&mut m, 10, 5, 95);
        let extractor = RailExtractor::new();
        let first = extractor.extract_horizontal(&m);
        let second = extractor.extract_horizontal(&m);
        assert_eq!(first, second);
        let v1 = extractor.extract_vertical(&m);
        let v2 = extractor.extract_vertical(&m);
        assert_eq!(v1, v2);
    }

    #[test]
    fn test_empty_mask_yields_empty_everything() {
        let m = BinaryMask::new(50, 50);
        let extractor = RailExtractor::new();
        assert!(extractor.extract_vertical(&m).is_empty());
        assert!(extractor.extract_horizontal(&m).is_empty());
        let (mask, boxes) = extractor.select_true_verticals(&m);
        assert!(mask.is_empty());
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_gap_closing_boundary() {
        let extractor = RailExtractor::new();
        // gap of exactly gap_max_px (35): bridged into one component
        let mut m = BinaryMask::new(300, 9);
        horizontal_line(&mut m, 4, 0, 99);
        horizontal_line(&mut m, 4, 135, 250);
        let closed = extractor.close_horizontal_gaps(&m);
        assert_eq!(component_stats(&closed).len(), 1);

        // gap of gap_max_px + 1 (36): stays split
        let mut m = BinaryMask::new(300, 9);
        horizontal_line(&mut m, 4, 0, 99);
        horizontal_line(&mut m, 4, 136, 250);
        let closed = extractor.close_horizontal_gaps(&m);
        assert_eq!(component_stats(&closed).len(), 2);
    }

    #[test]
    fn test_filter_horizontal_drops_overlong() {
        let mut m = BinaryMask::new(900, 10);
        horizontal_line(&mut m, 2, 0, 800); // 801 px: over h_max_px
        horizontal_line(&mut m, 7, 0, 400);
        let extractor = RailExtractor::new();
        let f = extractor.filter_horizontal_by_length(&m);
        assert!(!f.is_set(100, 2));
        assert!(f.is_set(100, 7));
    }

    #[test]
    fn test_true_verticals_reject_blobs() {
        let mut m = BinaryMask::new(100, 100);
        vertical_line(&mut m, 10, 5, 80); // tall, thin: accepted
        // 20x20 blob: aspect 1, rejected
        for y in 40..60 {
            horizontal_line(&mut m, y, 50, 69);
        }
        let extractor = RailExtractor::new();
        let (mask, boxes) = extractor.select_true_verticals(&m);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0], PixelRect::new(10, 5, 10, 80));
        assert!(mask.is_set(10, 40));
        assert!(!mask.is_set(55, 45));
    }

    #[test]
    fn test_rail_from_boxes_and_crossing() {
        let rails = VerticalRail::from_boxes(&[PixelRect::new(38, 10, 42, 200)]);
        assert_eq!(rails.len(), 1);
        assert_eq!(rails[0], VerticalRail { id: 0, x: 40, y1: 10, y2: 200 });
        assert!(rails[0].crosses(&PixelRect::new(30, 50, 100, 80), 0));
        assert!(!rails[0].crosses(&PixelRect::new(50, 50, 100, 80), 0));
        assert!(rails[0].crosses(&PixelRect::new(50, 50, 100, 80), 10));
        // no y-overlap
        assert!(!rails[0].crosses(&PixelRect::new(30, 300, 100, 350), 0));
    }
}
