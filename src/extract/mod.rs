//! Geometric extraction stages: wire masks, fragments, and blocks.
//!
//! ```text
//! binary raster
//!     ↓
//! [RailExtractor]     vertical/horizontal wire masks + true verticals
//!     ↓
//! [fragment]          horizontals cut at rail crossings + coil column
//!     ↓
//! [BlockSynthesizer]  one padded Block rectangle per fragment
//! ```
//!
//! Masks are derived once and immutable afterwards; each stage consumes
//! the previous stage's output and nothing else.

pub mod blocks;
pub mod fragment;
pub mod rails;

pub use blocks::{merge_rectangles, Block, BlockSynthesizer};
pub use fragment::{coil_cut_x, fragment_horizontals, inject_coil_boundary};
pub use rails::{RailExtractor, VerticalRail};
