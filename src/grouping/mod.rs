//! Grouping Engine: collapses tagged blocks into boolean expressions by
//! alternating parallel-branch (OR) and series-pairing (AND) merges.
//!
//! ```text
//! tagged blocks + vertical rails
//!     ↓
//! [OR pass]   stack blocks on the same branch  (repeat to fixpoint)
//!     ↓
//! [AND pass]  pair series-connected neighbors  (greedy nearest)
//!     ↓                                         ↺ until stable or cap
//! final blocks, each carrying a composed expression
//! ```
//!
//! Merges are heuristic and irreversible, so every pass records a full
//! snapshot (blocks plus per-group/per-pair debug records) for audit.
//! Convergence to a single block is not forced: a non-singleton result
//! signals disconnected or ambiguous topology and is reported as-is.

pub mod and_pass;
pub mod engine;
pub mod or_pass;
pub mod snapshot;

pub use and_pass::pair_blocks_and;
pub use engine::{GroupingEngine, GroupingOutcome};
pub use or_pass::group_by_or;
pub use snapshot::{AndPairDebug, OrGroupDebug, PassDebug, PassSnapshot, Phase};
