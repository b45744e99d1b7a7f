//! Tag Associator: maps recognized tags onto the blocks they
//! geometrically belong to and composes per-block expressions.
//!
//! Assignment is by best IoU above a minimum, falling back to
//! tag-center containment; a tag matching no block is dropped with a
//! warning (logged, not fatal). Coils never participate.

use log::{debug, warn};

use crate::config::AssociationConfig;
use crate::expr::ExprNode;
use crate::extract::Block;

use super::TagRecord;

/// Assigns tags to blocks and synthesizes per-block AND expressions.
pub struct TagAssociator {
    config: AssociationConfig,
}

impl Default for TagAssociator {
    fn default() -> Self {
        Self::new()
    }
}

impl TagAssociator {
    /// Create an associator with default thresholds.
    pub fn new() -> Self {
        Self::with_config(AssociationConfig::default())
    }

    /// Create an associator with explicit thresholds.
    pub fn with_config(config: AssociationConfig) -> Self {
        Self { config }
    }

    /// Assign every non-coil tag to its block and compose expressions.
    pub fn associate(&self, mut blocks: Vec<Block>, tags: &[TagRecord]) -> Vec<Block> {
        for tag in tags.iter().filter(|t| !t.is_coil) {
            match self.find_block(&blocks, tag) {
                Some(i) => blocks[i].tags.push(tag.clone()),
                None => warn!("tag '{}' matched no block; dropped", tag.text),
            }
        }
        for block in blocks.iter_mut() {
            block.expression = compose_block_expression(&block.tags);
        }
        debug!(
            "associated {} tags across {} blocks",
            blocks.iter().map(|b| b.tags.len()).sum::<usize>(),
            blocks.len()
        );
        blocks
    }

    fn find_block(&self, blocks: &[Block], tag: &TagRecord) -> Option<usize> {
        let tbox = tag.bbox();

        // 1) best IoU above the minimum
        let mut best: Option<(usize, f64)> = None;
        for (i, block) in blocks.iter().enumerate() {
            let v = tbox.iou(&block.rect);
            if best.map_or(v > 0.0, |(_, bv)| v > bv) {
                best = Some((i, v));
            }
        }
        if let Some((i, v)) = best {
            if v >= self.config.min_iou {
                return Some(i);
            }
        }

        // 2) first block containing the tag's center
        let (cx, cy) = tbox.center();
        blocks
            .iter()
            .position(|b| b.rect.contains_point(cx as i32, cy as i32))
    }
}

/// Conjunction of a block's tag terms.
///
/// Texts are deduplicated and sorted lexicographically for determinism;
/// each text is parsed into its term once, here at the boundary. A term
/// that fails to parse is dropped with a warning.
pub fn compose_block_expression(tags: &[TagRecord]) -> Option<ExprNode> {
    let mut names: Vec<&str> = tags
        .iter()
        .map(|t| t.text.trim())
        .filter(|t| !t.is_empty())
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut terms = Vec::with_capacity(names.len());
    for name in names {
        match crate::expr::parse(name) {
            Ok(term) => terms.push(term),
            Err(e) => warn!("unparseable tag text '{}': {}; dropped", name, e),
        }
    }
    match terms.len() {
        0 => None,
        1 => Some(terms.remove(0)),
        _ => Some(ExprNode::and(terms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PixelRect;

    fn tag(text: &str, x: i32, y: i32, w: i32, h: i32) -> TagRecord {
        TagRecord {
            text: text.to_string(),
            x,
            y,
            w,
            h,
            conf: 95.0,
            is_coil: false,
        }
    }

    fn block(x1: i32, y1: i32, x2: i32, y2: i32) -> Block {
        Block::new(PixelRect::new(x1, y1, x2, y2))
    }

    #[test]
    fn test_best_iou_wins() {
        let blocks = vec![block(0, 0, 100, 100), block(90, 0, 200, 100)];
        // tag mostly inside the second block
        let tags = vec![tag("%I0.0", 120, 40, 40, 20)];
        let out = TagAssociator::new().associate(blocks, &tags);
        assert!(out[0].tags.is_empty());
        assert_eq!(out[1].tags.len(), 1);
        assert_eq!(out[1].expression, Some(ExprNode::var("%I0.0")));
    }

    #[test]
    fn test_center_containment_fallback() {
        // huge block, tiny tag: IoU below 0.01 but center inside
        let blocks = vec![block(0, 0, 999, 999)];
        let tags = vec![tag("%I0.0", 500, 500, 2, 2)];
        let out = TagAssociator::new().associate(blocks, &tags);
        assert_eq!(out[0].tags.len(), 1);
    }

    #[test]
    fn test_unmatched_tag_dropped() {
        let blocks = vec![block(0, 0, 50, 50)];
        let tags = vec![tag("%I0.0", 500, 500, 20, 20)];
        let out = TagAssociator::new().associate(blocks, &tags);
        assert!(out[0].tags.is_empty());
        assert_eq!(out[0].expression, None);
    }

    #[test]
    fn test_coils_excluded() {
        let blocks = vec![block(0, 0, 100, 100)];
        let mut coil = tag("%Q0.0", 10, 10, 40, 20);
        coil.is_coil = true;
        let out = TagAssociator::new().associate(blocks, &[coil]);
        assert!(out[0].tags.is_empty());
    }

    #[test]
    fn test_expression_sorted_and_deduplicated() {
        let tags = vec![
            tag("%I0.1", 0, 0, 1, 1),
            tag("%I0.0", 0, 0, 1, 1),
            tag("%I0.1", 0, 0, 1, 1),
        ];
        let expr = compose_block_expression(&tags).unwrap();
        assert_eq!(expr.to_string(), "AND(%I0.0, %I0.1)");
    }

    #[test]
    fn test_single_tag_is_bare_term() {
        let tags = vec![tag("NOT(%I0.3)", 0, 0, 1, 1)];
        let expr = compose_block_expression(&tags).unwrap();
        assert_eq!(expr, ExprNode::not(ExprNode::var("%I0.3")));
    }

    #[test]
    fn test_unparseable_text_skipped() {
        let tags = vec![tag("%I0.0", 0, 0, 1, 1), tag("AND(", 0, 0, 1, 1)];
        let expr = compose_block_expression(&tags).unwrap();
        assert_eq!(expr, ExprNode::var("%I0.0"));
    }
}
