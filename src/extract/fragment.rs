//! Fragmenter: cuts horizontal wires at every genuine vertical crossing
//! and at the coil column boundary.
//!
//! After fragmentation each remaining horizontal component corresponds
//! to exactly one rung segment between two rails, which is the
//! geometric basis for block boundaries. The coil boundary is injected as an artificial
//! one-pixel vertical so coil wiring never merges with contact wiring.

use log::debug;

use crate::config::FragmentConfig;
use crate::geometry::PixelRect;
use crate::raster::BinaryMask;
use crate::tags::TagRecord;

use super::rails::RailExtractor;

/// Column of the coil cut boundary.
///
/// Taken from the leftmost coil tag, offset left by
/// `coil_offset_left`; falls back to `width - default_right_margin_px`
/// when no coil tag was recognized (uncalibrated fallback).
pub fn coil_cut_x(tags: &[TagRecord], image_width: u32, config: &FragmentConfig) -> i32 {
    if image_width == 0 {
        return 0;
    }
    let min_coil_x = tags.iter().filter(|t| t.is_coil).map(|t| t.x).min();
    let x = match min_coil_x {
        Some(x) => x - config.coil_offset_left,
        None => {
            debug!(
                "no coil tag found; using fallback right margin of {} px",
                config.default_right_margin_px
            );
            image_width as i32 - config.default_right_margin_px
        },
    };
    x.clamp(0, image_width as i32 - 1)
}

/// Inject a one-pixel-wide full-height cut column into the vertical
/// mask at `cut_x`.
///
/// The injected column passes the true-vertical gates by construction
/// (full height, width 1), so fragmentation treats the coil boundary
/// exactly like a real rail.
pub fn inject_coil_boundary(vert_mask: &BinaryMask, cut_x: i32) -> BinaryMask {
    if vert_mask.width() == 0 {
        return vert_mask.clone();
    }
    let mut out = vert_mask.clone();
    let x = cut_x.clamp(0, vert_mask.width() as i32 - 1);
    for y in 0..vert_mask.height() as i32 {
        out.set(x, y, true);
    }
    out
}

/// Zero the horizontal mask wherever a true vertical's bounding box,
/// expanded by the cut margins, overlaps it.
///
/// Returns the fragmented horizontal mask together with the
/// true-vertical mask derived from `vert_mask`.
pub fn fragment_horizontals(
    horiz_mask: &BinaryMask,
    vert_mask: &BinaryMask,
    extractor: &RailExtractor,
    config: &FragmentConfig,
) -> (BinaryMask, BinaryMask) {
    let (vert_true, boxes) = extractor.select_true_verticals(vert_mask);
    if horiz_mask.is_empty() || boxes.is_empty() {
        return (horiz_mask.clone(), vert_true);
    }
    let mut fragmented = horiz_mask.clone();
    for b in &boxes {
        let cut = PixelRect::new(
            b.x1 - config.cut_margin_x,
            b.y1 - config.cut_margin_y,
            b.x2 + config.cut_margin_x,
            b.y2 + config.cut_margin_y,
        );
        fragmented.fill_rect(&cut, false);
    }
    debug!("fragmented horizontals across {} vertical cuts", boxes.len());
    (fragmented, vert_true)
}
