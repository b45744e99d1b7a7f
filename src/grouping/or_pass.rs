//! Parallel-branch (OR) merging.
//!
//! Two blocks belong to the same parallel group when they have similar
//! widths, overlap horizontally, share at least one vertical rail, and
//! (by default) agree on right-bus contact. Grouping is transitive:
//! connected components over the pairwise relation are merged in one
//! shot, so a three-way branch collapses in a single pass.

use std::collections::VecDeque;

use log::debug;

use crate::config::GroupingConfig;
use crate::expr::ExprNode;
use crate::extract::{Block, VerticalRail};
use crate::geometry::{similar_width, PixelRect};

use super::snapshot::{OrGroupDebug, OrMemberDebug};

/// Whether two blocks sit on the same parallel branch.
pub fn can_or_together(
    a: &Block,
    b: &Block,
    verticals: &[VerticalRail],
    config: &GroupingConfig,
) -> bool {
    if config.require_same_bus_touch && a.touches_right_bus != b.touches_right_bus {
        return false;
    }
    if !similar_width(
        a.rect.width(),
        b.rect.width(),
        config.width_rel_tol,
        config.width_abs_tol,
    ) {
        return false;
    }
    if a.rect.x_overlap_ratio(&b.rect) < config.min_x_overlap_ratio {
        return false;
    }
    let halo = config.vertical_x_halo;
    verticals
        .iter()
        .any(|r| r.crosses(&a.rect, halo) && r.crosses(&b.rect, halo))
}

/// Merge every parallel group into a single block.
///
/// Returns the new block list (one block per connected component of the
/// pairing relation, singletons passed through unchanged) and one debug
/// record per actual merge.
pub fn group_by_or(
    blocks: &[Block],
    verticals: &[VerticalRail],
    config: &GroupingConfig,
) -> (Vec<Block>, Vec<OrGroupDebug>) {
    let n = blocks.len();
    let mut visited = vec![false; n];
    let mut out = Vec::with_capacity(n);
    let mut groups = Vec::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(i) = queue.pop_front() {
            for j in 0..n {
                if !visited[j] && can_or_together(&blocks[i], &blocks[j], verticals, config) {
                    visited[j] = true;
                    members.push(j);
                    queue.push_back(j);
                }
            }
        }

        if members.len() == 1 {
            out.push(blocks[seed].clone());
            continue;
        }
        let (merged, group_debug) = merge_group(blocks, &members, config);
        out.push(merged);
        groups.push(group_debug);
    }

    debug!("OR pass: {} blocks -> {} ({} merges)", n, out.len(), groups.len());
    (out, groups)
}

fn merge_group(
    blocks: &[Block],
    members: &[usize],
    config: &GroupingConfig,
) -> (Block, OrGroupDebug) {
    let rects: Vec<PixelRect> = members.iter().map(|&i| blocks[i].rect).collect();
    let union_full = PixelRect::union_all(&rects);

    let or_rect = if config.or_anchor_topmost {
        // keep the merged branch at the topmost member's row so later
        // AND pairing sees the rung where it was drawn
        let top = rects.iter().min_by_key(|r| r.y1).copied().unwrap_or(union_full);
        PixelRect::new(
            rects.iter().map(|r| r.x1).min().unwrap_or(top.x1),
            top.y1,
            rects.iter().map(|r| r.x2).max().unwrap_or(top.x2),
            top.y1 + top.height() - 1,
        )
    } else {
        union_full
    };

    let mut exprs: Vec<ExprNode> = members
        .iter()
        .filter_map(|&i| blocks[i].expression.clone())
        .collect();
    let expression = match exprs.len() {
        0 => None,
        1 => Some(exprs.remove(0)),
        _ => Some(ExprNode::or(exprs)),
    };

    let mut merged = Block::new(or_rect);
    merged.expression = expression;
    merged.touches_right_bus = members.iter().any(|&i| blocks[i].touches_right_bus);
    merged.cy = members.iter().map(|&i| blocks[i].cy).sum::<f64>() / members.len() as f64;

    let debug = OrGroupDebug {
        union_rect_full: union_full,
        or_rect,
        members: members
            .iter()
            .map(|&i| OrMemberDebug {
                rect: blocks[i].rect,
                expr: blocks[i].expression_string(),
                touches_right_bus: blocks[i].touches_right_bus,
                cy: blocks[i].cy,
                width: blocks[i].rect.width(),
            })
            .collect(),
        or_expression: merged.expression_string(),
    };
    (merged, debug)
}
