#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

//! # Ladder Oxide
//!
//! Geometric reconstruction of ladder-logic networks from rasterized
//! diagram images: wire geometry in, boolean expression out.
//!
//! ## Core Features
//!
//! - **Wire Extraction**: orientation-specific morphology isolates
//!   vertical and horizontal wire runs from a binarized diagram
//! - **Fragmentation**: horizontals are cut at every genuine vertical
//!   crossing and at the injected coil column boundary
//! - **Block Synthesis**: each fragment becomes a padded rung segment
//!   covering both the wire and the tag text above it
//! - **Tag Association**: recognized contact tags are assigned to blocks
//!   by IoU with a center-containment fallback
//! - **Grouping**: alternating OR (parallel branch) and AND (series)
//!   merges reduce the network to a single expression tree
//! - **Emission**: expression trees render to canonical `AND`/`OR`/`NOT`
//!   strings and to evaluable Python boolean expressions
//!
//! Every stage can persist its intermediate output (masks as PNG,
//! structured results as JSON with human-readable companions) through an
//! [`artifacts::ArtifactStore`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use ladder_oxide::pipeline::LadderPipeline;
//! use ladder_oxide::raster::BinaryMask;
//! use ladder_oxide::tags::load_tags;
//!
//! # fn main() -> ladder_oxide::error::Result<()> {
//! let mask = BinaryMask::load("network_0001.png")?;
//! let tags = load_tags("network_0001_tags_with_nf.json")?;
//!
//! let result = LadderPipeline::new().process("network_0001", &mask, &tags, None)?;
//! for expr in &result.expressions {
//!     println!("{:?}", expr.python_expression);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry primitives
pub mod geometry;

// Raster masks and morphology
pub mod raster;

// Wire extraction and block synthesis
pub mod extract;

// Tag ingestion and association
pub mod tags;

// Expression trees, parsing, Python emission
pub mod expr;

// OR/AND grouping
pub mod grouping;

// Artifact persistence
pub mod artifacts;

// End-to-end pipeline
pub mod pipeline;

pub use artifacts::ArtifactStore;
pub use config::ReconstructionConfig;
pub use error::{Error, Result};
pub use expr::{ConvertedExpression, ExprNode};
pub use extract::Block;
pub use pipeline::{LadderPipeline, ReconstructionResult};
pub use raster::BinaryMask;
pub use tags::TagRecord;
