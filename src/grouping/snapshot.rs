//! Per-pass snapshots of the grouping state.
//!
//! Every OR subpass and AND pass records the full block list plus a
//! debug record per merge decision. Snapshots are write-only audit
//! artifacts; nothing downstream deserializes them.

use serde::Serialize;

use crate::extract::Block;
use crate::geometry::PixelRect;

/// Which kind of merge a pass performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Parallel-branch stacking.
    #[serde(rename = "OR")]
    Or,
    /// Series pairing.
    #[serde(rename = "AND")]
    And,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Or => write!(f, "OR"),
            Phase::And => write!(f, "AND"),
        }
    }
}

/// One member of an OR group as it looked before the merge.
#[derive(Debug, Clone, Serialize)]
pub struct OrMemberDebug {
    /// Member rectangle.
    pub rect: PixelRect,
    /// Member expression string (empty when absent).
    pub expr: String,
    /// Right-bus contact flag.
    pub touches_right_bus: bool,
    /// Ordering center.
    pub cy: f64,
    /// Rectangle width.
    pub width: i32,
}

/// Audit record for one OR group merge.
#[derive(Debug, Clone, Serialize)]
pub struct OrGroupDebug {
    /// Naive bounding box over all members.
    pub union_rect_full: PixelRect,
    /// Rectangle actually assigned to the merged block.
    pub or_rect: PixelRect,
    /// Members in discovery order.
    pub members: Vec<OrMemberDebug>,
    /// Composed expression string.
    pub or_expression: String,
}

/// One side of an AND pair as it looked before the merge.
#[derive(Debug, Clone, Serialize)]
pub struct PairSideDebug {
    /// Side rectangle.
    pub rect: PixelRect,
    /// Side expression string (empty when absent).
    pub expr: String,
}

/// Audit record for one AND pair merge.
#[derive(Debug, Clone, Serialize)]
pub struct AndPairDebug {
    /// First side (scan order).
    pub a: PairSideDebug,
    /// Second side.
    pub b: PairSideDebug,
    /// Weighted center distance that selected the pair.
    pub distance: f64,
    /// Rectangle assigned to the merged block.
    pub union_rect: PixelRect,
    /// Composed expression string.
    pub and_expression: String,
}

/// Debug payload of a pass, shaped by its phase.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PassDebug {
    /// OR pass: one record per merged group.
    Or(Vec<OrGroupDebug>),
    /// AND pass: one record per accepted pair.
    And(Vec<AndPairDebug>),
}

/// Full state after one pass of the grouping engine.
#[derive(Debug, Clone, Serialize)]
pub struct PassSnapshot {
    /// Outer iteration number (1-based).
    pub iteration: u32,
    /// Merge kind of this pass.
    pub phase: Phase,
    /// Subpass number within the iteration (1-based; OR repeats to
    /// fixpoint, AND runs once).
    pub subpass: u32,
    /// Block list as of the end of the pass.
    pub blocks: Vec<Block>,
    /// Merge decisions made during the pass.
    pub debug: PassDebug,
}

impl PassSnapshot {
    /// Artifact stem for this pass, e.g. `iter0001_02_OR`.
    pub fn stem(&self) -> String {
        format!("iter{:04}_{:02}_{}", self.iteration, self.subpass, self.phase)
    }
}
