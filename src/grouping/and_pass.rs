//! Series (AND) pairing.
//!
//! Blocks left after OR stacking are paired greedily by weighted center
//! distance: the scan walks blocks in reading order (cy, then cx) and
//! joins each unused block with its nearest eligible later neighbor.
//! Vertical displacement is weighted double since rungs read
//! left-to-right along a row. A candidate pair must overlap vertically;
//! the bar is raised when either side carries no expression yet, to
//! keep unrelated empty placeholders from chaining.

use log::debug;

use crate::config::GroupingConfig;
use crate::expr::ExprNode;
use crate::extract::Block;
use crate::geometry::PixelRect;

use super::snapshot::{AndPairDebug, PairSideDebug};

/// Weighted center distance between two rectangles.
///
/// Infinite when the displacement caps or the vertical-overlap gate
/// fail, which removes the pair from consideration.
pub fn pair_distance(a: &PixelRect, b: &PixelRect, config: &GroupingConfig) -> f64 {
    if a.y_overlap_ratio(b) < config.min_v_overlap_ratio {
        return f64::INFINITY;
    }
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dx = (bx - ax).abs();
    let dy = (by - ay).abs();
    if dx > config.max_dx || dy > config.max_dy {
        return f64::INFINITY;
    }
    let wx = config.weight_x * dx;
    let wy = config.weight_y * dy;
    (wx * wx + wy * wy).sqrt()
}

/// One greedy pairing sweep.
///
/// Returns `None` when no pair is eligible, otherwise the new block
/// list (merged pairs plus untouched singles) and one debug record per
/// pair.
pub fn pair_blocks_and(
    blocks: &[Block],
    config: &GroupingConfig,
) -> Option<(Vec<Block>, Vec<AndPairDebug>)> {
    let n = blocks.len();
    if n < 2 {
        return None;
    }

    // reading order: top-to-bottom, then left-to-right, then stable
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        let (cix, _) = blocks[i].rect.center();
        let (cjx, _) = blocks[j].rect.center();
        blocks[i]
            .cy
            .total_cmp(&blocks[j].cy)
            .then(cix.total_cmp(&cjx))
            .then(i.cmp(&j))
    });

    let mut used = vec![false; n];
    let mut out = Vec::new();
    let mut pairs = Vec::new();

    for (pos, &i) in order.iter().enumerate() {
        if used[i] {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for &j in &order[pos + 1..] {
            if used[j] {
                continue;
            }
            let either_empty =
                !blocks[i].has_expression() || !blocks[j].has_expression();
            let required = if either_empty {
                config.min_v_overlap_ratio_empty
            } else {
                config.min_v_overlap_ratio
            };
            if blocks[i].rect.y_overlap_ratio(&blocks[j].rect) < required {
                continue;
            }
            let d = pair_distance(&blocks[i].rect, &blocks[j].rect, config);
            if d.is_finite() && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        match best {
            Some((j, d)) => {
                used[i] = true;
                used[j] = true;
                let (merged, record) = merge_pair(&blocks[i], &blocks[j], d);
                out.push(merged);
                pairs.push(record);
            },
            None => {
                used[i] = true;
                out.push(blocks[i].clone());
            },
        }
    }

    if pairs.is_empty() {
        return None;
    }
    debug!("AND pass: {} blocks -> {} ({} pairs)", n, out.len(), pairs.len());
    Some((out, pairs))
}

fn merge_pair(a: &Block, b: &Block, distance: f64) -> (Block, AndPairDebug) {
    let union = a.rect.union(&b.rect);
    // an empty side contributes no term, so a lone expression passes
    // through without an AND wrapper
    let expression = match (a.expression.clone(), b.expression.clone()) {
        (Some(ea), Some(eb)) => Some(ExprNode::and(vec![ea, eb])),
        (Some(e), None) | (None, Some(e)) => Some(e),
        (None, None) => None,
    };

    let mut merged = Block::new(union);
    merged.expression = expression;
    merged.touches_right_bus = a.touches_right_bus || b.touches_right_bus;
    merged.cy = (a.cy + b.cy) / 2.0;

    let record = AndPairDebug {
        a: PairSideDebug { rect: a.rect, expr: a.expression_string() },
        b: PairSideDebug { rect: b.rect, expr: b.expression_string() },
        distance,
        union_rect: union,
        and_expression: merged.expression_string(),
    };
    (merged, record)
}
