//! End-to-end reconstruction pipeline.
//!
//! ```text
//! binary mask ─┬─> vertical mask ──> length filter ──> rails
//!              └─> horizontal mask ─> length filter ─> gap closing
//!                      ↓
//!            coil cut injection + fragmentation
//!                      ↓
//!            block synthesis ─> tag association ─> grouping
//!                      ↓
//!            converted (Python) expressions
//! ```
//!
//! The pipeline is pure with respect to its inputs; attaching an
//! [`ArtifactStore`] adds persistence of every intermediate stage but
//! never changes the result.

use log::info;

use crate::artifacts::ArtifactStore;
use crate::config::ReconstructionConfig;
use crate::error::Result;
use crate::expr::ConvertedExpression;
use crate::extract::{
    coil_cut_x, fragment_horizontals, inject_coil_boundary, Block, BlockSynthesizer,
    RailExtractor, VerticalRail,
};
use crate::grouping::GroupingEngine;
use crate::raster::BinaryMask;
use crate::tags::{TagAssociator, TagRecord};

/// Outcome of reconstructing one diagram image.
#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    /// Base name of the processed image.
    pub image_base: String,
    /// Blocks remaining after grouping; one block means the network
    /// reduced to a single expression.
    pub final_blocks: Vec<Block>,
    /// One converted expression per final block with an expression.
    pub expressions: Vec<ConvertedExpression>,
    /// Grouping iterations executed.
    pub iterations: u32,
    /// Whether grouping reached a fixed point.
    pub converged: bool,
}

/// Runs every reconstruction stage in order.
pub struct LadderPipeline {
    config: ReconstructionConfig,
}

impl Default for LadderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl LadderPipeline {
    /// Create a pipeline with default calibration.
    pub fn new() -> Self {
        Self::with_config(ReconstructionConfig::default())
    }

    /// Create a pipeline with explicit settings.
    pub fn with_config(config: ReconstructionConfig) -> Self {
        Self { config }
    }

    /// Reconstruct one diagram from its binary mask and recognized tags.
    pub fn process(
        &self,
        image_base: &str,
        binary: &BinaryMask,
        tags: &[TagRecord],
        store: Option<&ArtifactStore>,
    ) -> Result<ReconstructionResult> {
        let cfg = &self.config;
        info!("processing '{}' ({}x{})", image_base, binary.width(), binary.height());
        if let Some(s) = store {
            s.save_mask(image_base, "binary", binary)?;
        }

        let extractor = RailExtractor::with_config(cfg.rails.clone());
        let vert = extractor.extract_vertical(binary);
        let horiz = extractor.extract_horizontal(binary);
        let vert_filtered = extractor.filter_vertical_by_length(&vert);
        let horiz_filtered = extractor.filter_horizontal_by_length(&horiz);
        let horiz_closed = extractor.close_horizontal_gaps(&horiz_filtered);

        // topology rails come from the mask before the artificial coil
        // column is injected
        let (_, rail_boxes) = extractor.select_true_verticals(&vert_filtered);
        let rails = VerticalRail::from_boxes(&rail_boxes);
        if let Some(s) = store {
            s.save_mask(image_base, "vert_filtered", &vert_filtered)?;
            s.save_mask(image_base, "horiz_closed", &horiz_closed)?;
            s.save_verticals(image_base, &rails)?;
        }

        let cut_x = coil_cut_x(tags, binary.width(), &cfg.fragment);
        let vert_with_cut = inject_coil_boundary(&vert_filtered, cut_x);
        let (fragmented, vert_true) =
            fragment_horizontals(&horiz_closed, &vert_with_cut, &extractor, &cfg.fragment);
        if let Some(s) = store {
            s.save_mask(image_base, "horiz_fragmented", &fragmented)?;
            s.save_mask(image_base, "vert_true", &vert_true)?;
        }

        let synthesizer = BlockSynthesizer::with_config(cfg.blocks.clone());
        let blocks = synthesizer.synthesize(&fragmented, cut_x, cfg.fragment.cut_margin_x);
        if let Some(s) = store {
            s.save_blocks(image_base, &blocks)?;
        }

        let associator = TagAssociator::with_config(cfg.association.clone());
        let tagged = associator.associate(blocks, tags);
        if let Some(s) = store {
            s.save_tagged_blocks(image_base, &tagged)?;
        }

        let engine = GroupingEngine::with_config(cfg.grouping.clone());
        let outcome = engine.run(tagged, &rails);
        if let Some(s) = store {
            for snapshot in &outcome.snapshots {
                s.save_snapshot(image_base, snapshot)?;
            }
            s.save_final(image_base, &outcome.blocks)?;
        }

        let expressions: Vec<ConvertedExpression> = outcome
            .blocks
            .iter()
            .filter_map(|b| b.expression.as_ref())
            .map(ConvertedExpression::from_node)
            .collect();
        if let Some(s) = store {
            s.save_converted(image_base, &expressions)?;
        }

        info!(
            "'{}': {} final block(s), {} expression(s), {} iteration(s)",
            image_base,
            outcome.blocks.len(),
            expressions.len(),
            outcome.iterations
        );
        Ok(ReconstructionResult {
            image_base: image_base.to_string(),
            final_blocks: outcome.blocks,
            expressions,
            iterations: outcome.iterations,
            converged: outcome.converged,
        })
    }
}
