//! Block Synthesizer: expands horizontal fragments into padded
//! rectangular rung segments.
//!
//! A [`Block`] is the unit every later stage operates on: the Tag
//! Associator fills its tag list and expression, the Grouping Engine
//! composes new blocks out of old ones. Geometry is never mutated after
//! construction.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::BlockConfig;
use crate::expr::ExprNode;
use crate::geometry::PixelRect;
use crate::raster::{component_stats, BinaryMask};
use crate::tags::TagRecord;

/// One rung segment: a rectangle plus the boolean logic attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Rectangle covering the fragment and the tag text above it.
    pub rect: PixelRect,

    /// Tags associated with this block (empty after grouping begins).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagRecord>,

    /// Composed boolean expression; persisted as its canonical string
    /// (empty string when absent).
    #[serde(default, with = "crate::expr::expr_string")]
    pub expression: Option<ExprNode>,

    /// Whether the block reaches the right-hand bus (coil column).
    #[serde(default)]
    pub touches_right_bus: bool,

    /// Vertical center used for deterministic ordering; defaults to the
    /// rect center but survives merges as the member mean.
    pub cy: f64,
}

impl Block {
    /// Create an empty block anchored at `rect`.
    pub fn new(rect: PixelRect) -> Self {
        Self {
            rect,
            tags: Vec::new(),
            expression: None,
            touches_right_bus: false,
            cy: rect.center_y(),
        }
    }

    /// Whether the block carries a non-empty expression.
    pub fn has_expression(&self) -> bool {
        self.expression.is_some()
    }

    /// Interchange string form of the expression (empty when absent).
    pub fn expression_string(&self) -> String {
        self.expression
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_default()
    }
}

/// Builds blocks from a fragmented horizontal mask.
pub struct BlockSynthesizer {
    config: BlockConfig,
}

impl Default for BlockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSynthesizer {
    /// Create a synthesizer with default calibration.
    pub fn new() -> Self {
        Self::with_config(BlockConfig::default())
    }

    /// Create a synthesizer with explicit settings.
    pub fn with_config(config: BlockConfig) -> Self {
        Self { config }
    }

    /// Synthesize one block per sufficiently wide fragment.
    ///
    /// `coil_cut_x` is the coil boundary column; a block whose right
    /// edge reaches it (within `cut_margin_x`) is flagged as touching
    /// the right bus.
    pub fn synthesize(
        &self,
        fragmented: &BinaryMask,
        coil_cut_x: i32,
        cut_margin_x: i32,
    ) -> Vec<Block> {
        let cfg = &self.config;
        let (w, h) = (fragmented.width() as i32, fragmented.height() as i32);
        let mut rects = Vec::new();
        for stats in component_stats(fragmented) {
            let b = stats.bbox;
            if b.width() < cfg.min_width as i32 {
                continue;
            }
            let cy = (b.y1 + b.height() / 2 + cfg.center_offset_y).clamp(0, h - 1);
            let x1 = (b.x1 - cfg.pad_x).max(0);
            let x2 = (b.x2 + cfg.pad_x).min(w - 1);
            let y1 = (cy - cfg.pad_y).max(0);
            let y2 = (cy + cfg.pad_y).min(h - 1);
            // trim after padding, never inverting the box
            let y1 = (y1 + cfg.trim_top.max(0)).min(y2);
            let y2 = (y2 - cfg.trim_bottom.max(0)).max(y1);
            rects.push(PixelRect::new(x1, y1, x2, y2));
        }

        if cfg.enable_rect_merge {
            rects = merge_rectangles(rects, cfg.merge_iou_thresh);
        }

        debug!("synthesized {} blocks (coil cut at x={})", rects.len(), coil_cut_x);
        rects
            .into_iter()
            .map(|rect| {
                let mut block = Block::new(rect);
                block.touches_right_bus = rect.x2 >= coil_cut_x - cut_margin_x;
                block
            })
            .collect()
    }
}

/// Greedily merge rectangles whose IoU meets the threshold.
///
/// Kept for tuning; disabled by default in [`BlockConfig`].
pub fn merge_rectangles(rects: Vec<PixelRect>, iou_thresh: f64) -> Vec<PixelRect> {
    if rects.is_empty() {
        return rects;
    }
    let mut sorted = rects;
    sorted.sort_by_key(|r| (r.y1, r.x1));
    let mut merged: Vec<PixelRect> = Vec::new();
    for r in sorted {
        let mut absorbed = false;
        for m in merged.iter_mut() {
            if r.iou(m) >= iou_thresh {
                *m = m.union(&r);
                absorbed = true;
                break;
            }
        }
        if !absorbed {
            merged.push(r);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment_mask(runs: &[(i32, i32, i32)]) -> BinaryMask {
        // (y, x1, x2) runs on a 400x200 canvas
        let mut m = BinaryMask::new(400, 200);
        for &(y, x1, x2) in runs {
            for x in x1..=x2 {
                m.set(x, y, true);
            }
        }
        m
    }

    #[test]
    fn test_synthesize_pads_and_trims() {
        let m = fragment_mask(&[(100, 50, 149)]); // width 100 at y=100
        let blocks = BlockSynthesizer::new().synthesize(&m, 399, 2);
        assert_eq!(blocks.len(), 1);
        let r = blocks[0].rect;
        // cy = 100 + 0 - 6 = 94; pad 50 then trim 10/16
        assert_eq!(r, PixelRect::new(44, 94 - 50 + 10, 155, 94 + 50 - 16));
        assert_eq!(blocks[0].cy, r.center_y());
        assert!(!blocks[0].has_expression());
    }

    #[test]
    fn test_narrow_fragments_dropped() {
        let m = fragment_mask(&[(100, 50, 88)]); // width 39 < 40
        let blocks = BlockSynthesizer::new().synthesize(&m, 399, 2);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_touches_right_bus_flag() {
        let m = fragment_mask(&[(60, 20, 140), (60, 200, 290)]);
        // coil cut just right of the second fragment's padded edge
        let blocks = BlockSynthesizer::new().synthesize(&m, 298, 2);
        assert_eq!(blocks.len(), 2);
        let left = blocks.iter().find(|b| b.rect.x1 < 100).unwrap();
        let right = blocks.iter().find(|b| b.rect.x1 >= 100).unwrap();
        assert!(!left.touches_right_bus);
        assert!(right.touches_right_bus);
    }

    #[test]
    fn test_merge_rectangles_threshold() {
        let a = PixelRect::new(0, 0, 99, 99);
        let b = PixelRect::new(50, 0, 149, 99); // substantial overlap
        let c = PixelRect::new(300, 300, 320, 320);
        let merged = merge_rectangles(vec![a, b, c], 0.05);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&PixelRect::new(0, 0, 149, 99)));
        assert!(merged.contains(&c));
    }

    #[test]
    fn test_merge_disabled_by_default() {
        let cfg = BlockConfig::default();
        assert!(!cfg.enable_rect_merge);
    }

    #[test]
    fn test_block_serialization_contract() {
        let mut b = Block::new(PixelRect::new(1, 2, 30, 40));
        b.expression = Some(ExprNode::var("%I0.0"));
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["rect"], serde_json::json!([1, 2, 30, 40]));
        assert_eq!(json["expression"], "%I0.0");
        assert_eq!(json["touches_right_bus"], false);
        // round trip restores the AST
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back.expression, Some(ExprNode::var("%I0.0")));
    }
}
