//! Configuration for the reconstruction pipeline.
//!
//! Every numeric tolerance used by the geometric stages lives here as a
//! documented, named default instead of a constant buried in an
//! algorithm. All pixel values are calibrated against 300 DPI renderings
//! of single-network ladder diagrams; uncalibrated fallbacks are marked
//! as such.

/// Rail Extractor settings (vertical/horizontal wire mask extraction).
#[derive(Debug, Clone)]
pub struct RailConfig {
    /// Minimum line-kernel length in pixels (default: 10).
    /// The effective kernel is `max(kernel_min_len, dimension / kernel_divisor)`.
    pub kernel_min_len: u32,

    /// Divisor applied to the image dimension to size the line kernel
    /// (default: 60).
    pub kernel_divisor: u32,

    /// Maximum horizontal component width in pixels; wider components
    /// likely span unrelated rows and are discarded (default: 700).
    pub h_max_px: u32,

    /// Minimum vertical component height in pixels; shorter components
    /// are wire noise (default: 30).
    pub v_min_px: u32,

    /// Maximum bridgeable gap between two horizontal runs in the same
    /// row (default: 35).
    pub gap_max_px: u32,

    /// Number of gap-closing iterations (default: 2). Each iteration
    /// also paints the rows above and below a bridged gap to tolerate
    /// anti-aliasing.
    pub gap_close_iters: u32,

    /// Minimum height/width aspect ratio for a true vertical
    /// (default: 6.0). Rejects blob-like false positives.
    pub vert_min_aspect: f64,

    /// Minimum width in pixels for a true vertical (default: 1).
    pub vert_min_width: u32,

    /// Minimum height in pixels for a true vertical (default: 25).
    /// Combined with `v_min_px` via `max`.
    pub vert_min_height: u32,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            kernel_min_len: 10,
            kernel_divisor: 60,
            h_max_px: 700,
            v_min_px: 30,
            gap_max_px: 35,
            gap_close_iters: 2,
            vert_min_aspect: 6.0,
            vert_min_width: 1,
            vert_min_height: 25,
        }
    }
}

/// Fragmenter settings (cutting horizontals at vertical crossings and at
/// the coil column boundary).
#[derive(Debug, Clone)]
pub struct FragmentConfig {
    /// Horizontal margin added to a vertical's bounding box when cutting
    /// (default: 2).
    pub cut_margin_x: i32,

    /// Vertical margin added to a vertical's bounding box when cutting
    /// (default: 2).
    pub cut_margin_y: i32,

    /// Offset in pixels applied left of the leftmost coil tag to place
    /// the coil cut column (default: 25).
    pub coil_offset_left: i32,

    /// Distance from the right image edge used for the coil cut column
    /// when no coil tag was recognized (default: 220). Uncalibrated
    /// fallback.
    pub default_right_margin_px: i32,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            cut_margin_x: 2,
            cut_margin_y: 2,
            coil_offset_left: 25,
            default_right_margin_px: 220,
        }
    }
}

/// Block Synthesizer settings (fragments to padded rectangles).
#[derive(Debug, Clone)]
pub struct BlockConfig {
    /// Horizontal padding around a fragment (default: 6).
    pub pad_x: i32,

    /// Vertical padding around a fragment's center row, sized to cover
    /// the tag text above the wire (default: 50).
    pub pad_y: i32,

    /// Minimum fragment width; narrower fragments are dropped as noise
    /// (default: 40).
    pub min_width: u32,

    /// Offset applied to the fragment's vertical center before padding
    /// (default: -6).
    pub center_offset_y: i32,

    /// Pixels trimmed from the top of the padded box (default: 10).
    pub trim_top: i32,

    /// Pixels trimmed from the bottom of the padded box (default: 16).
    pub trim_bottom: i32,

    /// Merge overlapping rectangles by IoU (default: false). Kept for
    /// tuning; not required for correctness.
    pub enable_rect_merge: bool,

    /// IoU threshold for rectangle merging when enabled (default: 0.05).
    pub merge_iou_thresh: f64,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            pad_x: 6,
            pad_y: 50,
            min_width: 40,
            center_offset_y: -6,
            trim_top: 10,
            trim_bottom: 16,
            enable_rect_merge: false,
            merge_iou_thresh: 0.05,
        }
    }
}

/// Tag Associator settings.
#[derive(Debug, Clone)]
pub struct AssociationConfig {
    /// Minimum IoU between a tag box and a block rectangle for
    /// IoU-based assignment (default: 0.01). Below this, assignment
    /// falls back to tag-center containment.
    pub min_iou: f64,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self { min_iou: 0.01 }
    }
}

/// Grouping Engine settings (alternating OR/AND reduction).
#[derive(Debug, Clone)]
pub struct GroupingConfig {
    /// Cap on outer OR/AND alternation iterations (default: 20).
    /// Correctness safeguard against non-convergence.
    pub max_iterations: u32,

    /// Total pass count after which empty-expression blocks are pruned
    /// (default: 2). Lets early bookkeeping blocks survive the first
    /// passes.
    pub remove_empty_after_ops: u32,

    /// Relative width tolerance for OR merging (default: 0.10).
    pub width_rel_tol: f64,

    /// Absolute width tolerance in pixels for OR merging (default: 12).
    pub width_abs_tol: i32,

    /// Minimum horizontal overlap ratio (over the narrower block) for
    /// OR merging (default: 0.40).
    pub min_x_overlap_ratio: f64,

    /// Require both blocks of an OR merge to agree on right-bus contact
    /// (default: true).
    pub require_same_bus_touch: bool,

    /// Anchor the merged OR rectangle at the topmost member's position
    /// and height instead of the naive bounding box (default: true).
    /// Preserves the input rung's vertical position.
    pub or_anchor_topmost: bool,

    /// Horizontal halo in pixels when testing whether a vertical rail
    /// crosses a block rectangle (default: 0).
    pub vertical_x_halo: i32,

    /// Horizontal weight of the AND pairing distance (default: 1.0).
    pub weight_x: f64,

    /// Vertical weight of the AND pairing distance (default: 2.0).
    /// Rungs read top-to-bottom, so vertical displacement costs more.
    pub weight_y: f64,

    /// Maximum horizontal center displacement for AND pairing
    /// (default: 9999, effectively unbounded).
    pub max_dx: f64,

    /// Maximum vertical center displacement for AND pairing
    /// (default: 9999, effectively unbounded).
    pub max_dy: f64,

    /// Minimum vertical overlap ratio for AND pairing (default: 0.40).
    pub min_v_overlap_ratio: f64,

    /// Stricter vertical overlap ratio when either side of a candidate
    /// pair has an empty expression (default: 0.80). Avoids chaining
    /// unrelated empty placeholders.
    pub min_v_overlap_ratio_empty: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            remove_empty_after_ops: 2,
            width_rel_tol: 0.10,
            width_abs_tol: 12,
            min_x_overlap_ratio: 0.40,
            require_same_bus_touch: true,
            or_anchor_topmost: true,
            vertical_x_halo: 0,
            weight_x: 1.0,
            weight_y: 2.0,
            max_dx: 9999.0,
            max_dy: 9999.0,
            min_v_overlap_ratio: 0.40,
            min_v_overlap_ratio_empty: 0.80,
        }
    }
}

/// Unified configuration for the whole reconstruction pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReconstructionConfig {
    /// Rail Extractor settings.
    pub rails: RailConfig,
    /// Fragmenter settings.
    pub fragment: FragmentConfig,
    /// Block Synthesizer settings.
    pub blocks: BlockConfig,
    /// Tag Associator settings.
    pub association: AssociationConfig,
    /// Grouping Engine settings.
    pub grouping: GroupingConfig,
}

impl ReconstructionConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the grouping iteration cap.
    pub fn with_max_iterations(mut self, cap: u32) -> Self {
        self.grouping.max_iterations = cap;
        self
    }

    /// Override the fallback coil margin.
    pub fn with_default_right_margin(mut self, px: i32) -> Self {
        self.fragment.default_right_margin_px = px;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_calibration() {
        let cfg = ReconstructionConfig::default();
        assert_eq!(cfg.rails.h_max_px, 700);
        assert_eq!(cfg.rails.gap_max_px, 35);
        assert_eq!(cfg.blocks.min_width, 40);
        assert_eq!(cfg.grouping.max_iterations, 20);
        assert!(!cfg.blocks.enable_rect_merge);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = ReconstructionConfig::new()
            .with_max_iterations(5)
            .with_default_right_margin(100);
        assert_eq!(cfg.grouping.max_iterations, 5);
        assert_eq!(cfg.fragment.default_right_margin_px, 100);
    }
}
