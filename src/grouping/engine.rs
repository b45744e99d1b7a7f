//! Alternating OR/AND reduction loop.

use log::{debug, info, warn};

use crate::config::GroupingConfig;
use crate::extract::{Block, VerticalRail};

use super::and_pass::pair_blocks_and;
use super::or_pass::group_by_or;
use super::snapshot::{PassDebug, PassSnapshot, Phase};

/// Runs OR and AND passes until the block list stops shrinking.
///
/// Each outer iteration repeats the OR pass to a fixpoint, then runs a
/// single AND pass. Blocks whose expression is still empty are pruned
/// once the total pass count reaches the configured threshold, so
/// bookkeeping fragments cannot survive into the result. A hard
/// iteration cap guards against oscillation.
pub struct GroupingEngine {
    config: GroupingConfig,
}

/// Result of a grouping run.
#[derive(Debug, Clone)]
pub struct GroupingOutcome {
    /// Final block list; a single block means full reconstruction.
    pub blocks: Vec<Block>,
    /// Outer iterations actually executed.
    pub iterations: u32,
    /// Whether the loop reached a fixed point (as opposed to hitting
    /// the iteration cap while still shrinking).
    pub converged: bool,
    /// One snapshot per executed pass, in order.
    pub snapshots: Vec<PassSnapshot>,
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupingEngine {
    /// Create an engine with default calibration.
    pub fn new() -> Self {
        Self::with_config(GroupingConfig::default())
    }

    /// Create an engine with explicit settings.
    pub fn with_config(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Reduce `blocks` against the vertical-rail topology.
    pub fn run(&self, mut blocks: Vec<Block>, verticals: &[VerticalRail]) -> GroupingOutcome {
        let cfg = &self.config;
        let mut snapshots = Vec::new();
        let mut op_count: u32 = 0;
        let mut iteration: u32 = 0;
        let mut changed = true;

        while changed && iteration < cfg.max_iterations {
            changed = false;
            iteration += 1;

            // OR to fixpoint: a merge can create a new stack candidate
            let mut subpass = 0;
            loop {
                subpass += 1;
                op_count += 1;
                let (new_blocks, or_debug) = group_by_or(&blocks, verticals, cfg);
                snapshots.push(PassSnapshot {
                    iteration,
                    phase: Phase::Or,
                    subpass,
                    blocks: new_blocks.clone(),
                    debug: PassDebug::Or(or_debug),
                });
                let mut new_blocks = new_blocks;
                if op_count >= cfg.remove_empty_after_ops {
                    new_blocks.retain(Block::has_expression);
                }
                let reduced = new_blocks.len() < blocks.len();
                blocks = new_blocks;
                if !reduced {
                    break;
                }
                changed = true;
                if blocks.len() <= 1 {
                    break;
                }
            }
            if blocks.len() <= 1 {
                break;
            }

            op_count += 1;
            match pair_blocks_and(&blocks, cfg) {
                Some((mut new_blocks, and_debug)) => {
                    if op_count >= cfg.remove_empty_after_ops {
                        new_blocks.retain(Block::has_expression);
                    }
                    if new_blocks.len() < blocks.len() {
                        blocks = new_blocks;
                        changed = true;
                    }
                    snapshots.push(PassSnapshot {
                        iteration,
                        phase: Phase::And,
                        subpass: 1,
                        blocks: blocks.clone(),
                        debug: PassDebug::And(and_debug),
                    });
                },
                None => {
                    debug!("iteration {}: no AND pair eligible", iteration);
                    snapshots.push(PassSnapshot {
                        iteration,
                        phase: Phase::And,
                        subpass: 1,
                        blocks: blocks.clone(),
                        debug: PassDebug::And(Vec::new()),
                    });
                },
            }
            if blocks.len() <= 1 {
                break;
            }
        }

        let converged = !changed || blocks.len() <= 1;
        if converged {
            info!(
                "grouping converged after {} iteration(s): {} block(s)",
                iteration,
                blocks.len()
            );
        } else {
            warn!(
                "grouping hit the {}-iteration cap with {} blocks remaining",
                cfg.max_iterations,
                blocks.len()
            );
        }
        GroupingOutcome { blocks, iterations: iteration, converged, snapshots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PixelRect;

    fn block_with(rect: PixelRect, expr: Option<&str>) -> Block {
        let mut b = Block::new(rect);
        b.expression = expr.map(|e| crate::expr::parse(e).unwrap());
        b
    }

    fn rail(x: i32, y1: i32, y2: i32) -> VerticalRail {
        VerticalRail { id: 0, x, y1, y2 }
    }

    #[test]
    fn test_or_then_and_composes_nested_expression() {
        // two stacked branches joined by a rail, then a series neighbor
        let a = block_with(PixelRect::new(50, 10, 149, 40), Some("%I0.0"));
        let b = block_with(PixelRect::new(50, 60, 149, 90), Some("%I0.1"));
        let c = block_with(PixelRect::new(200, 10, 299, 40), Some("%I0.2"));
        let rails = vec![rail(55, 0, 100)];

        let outcome = GroupingEngine::new().run(vec![a, b, c], &rails);
        assert!(outcome.converged);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(
            outcome.blocks[0].expression_string(),
            "AND(%I0.2, OR(%I0.0, %I0.1))"
        );
    }

    #[test]
    fn test_series_chain_reduces_pairwise() {
        let a = block_with(PixelRect::new(0, 10, 99, 60), Some("%I0.0"));
        let b = block_with(PixelRect::new(150, 10, 249, 60), Some("%I0.1"));
        let c = block_with(PixelRect::new(300, 10, 399, 60), Some("%I0.2"));

        let outcome = GroupingEngine::new().run(vec![a, b, c], &[]);
        assert!(outcome.converged);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(
            outcome.blocks[0].expression_string(),
            "AND(AND(%I0.0, %I0.1), %I0.2)"
        );
        assert!(outcome.iterations >= 2);
    }

    #[test]
    fn test_empty_blocks_pruned_after_threshold() {
        let a = block_with(PixelRect::new(50, 10, 149, 40), Some("%I0.0"));
        let b = block_with(PixelRect::new(50, 60, 149, 90), Some("%I0.1"));
        let orphan = block_with(PixelRect::new(500, 300, 599, 340), None);
        let rails = vec![rail(55, 0, 100)];

        let outcome = GroupingEngine::new().run(vec![a, b, orphan], &rails);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].expression_string(), "OR(%I0.0, %I0.1)");
    }

    #[test]
    fn test_disconnected_blocks_stay_apart() {
        // no rail, no vertical overlap: nothing can merge
        let a = block_with(PixelRect::new(0, 0, 99, 40), Some("%I0.0"));
        let b = block_with(PixelRect::new(300, 200, 399, 240), Some("%I0.1"));
        let outcome = GroupingEngine::new().run(vec![a, b], &[]);
        assert!(outcome.converged);
        assert_eq!(outcome.blocks.len(), 2);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn test_single_block_is_trivial() {
        let a = block_with(PixelRect::new(0, 0, 99, 40), Some("%I0.0"));
        let outcome = GroupingEngine::new().run(vec![a], &[]);
        assert!(outcome.converged);
        assert_eq!(outcome.blocks.len(), 1);
    }

    #[test]
    fn test_iteration_cap_bounds_the_run() {
        let a = block_with(PixelRect::new(0, 10, 99, 60), Some("%I0.0"));
        let b = block_with(PixelRect::new(150, 10, 249, 60), Some("%I0.1"));
        let c = block_with(PixelRect::new(300, 10, 399, 60), Some("%I0.2"));
        let engine = GroupingEngine::with_config(GroupingConfig {
            max_iterations: 1,
            ..GroupingConfig::default()
        });
        let outcome = engine.run(vec![a, b, c], &[]);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.blocks.len(), 2);
        // still shrinking when the cap hit
        assert!(!outcome.converged);
    }

    #[test]
    fn test_snapshots_record_every_pass() {
        let a = block_with(PixelRect::new(0, 10, 99, 60), Some("%I0.0"));
        let b = block_with(PixelRect::new(150, 10, 249, 60), Some("%I0.1"));
        let outcome = GroupingEngine::new().run(vec![a, b], &[]);
        assert!(!outcome.snapshots.is_empty());
        assert_eq!(outcome.snapshots[0].phase, Phase::Or);
        assert_eq!(outcome.snapshots[0].stem(), "iter0001_01_OR");
        let last = outcome.snapshots.last().unwrap();
        assert_eq!(last.phase, Phase::And);
        assert_eq!(last.blocks.len(), 1);
    }
}
