//! Connected-component statistics over binary masks.
//!
//! Thin wrapper around `imageproc`'s 8-connected labelling that reduces
//! the label image to per-component bounding boxes and areas, plus a
//! predicate-driven component filter used by the length filters.

use image::Luma;
use imageproc::region_labelling::{connected_components, Connectivity};

use super::BinaryMask;
use crate::geometry::PixelRect;

/// Bounding box and pixel count of one 8-connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStats {
    /// Label assigned by the labelling pass (1-based; 0 is background).
    pub label: u32,
    /// Tight bounding box of the component.
    pub bbox: PixelRect,
    /// Number of on-pixels in the component.
    pub area: u32,
}

fn label_stats(mask: &BinaryMask) -> (image::ImageBuffer<Luma<u32>, Vec<u32>>, Vec<ComponentStats>) {
    let labels = connected_components(mask.as_image(), Connectivity::Eight, Luma([0u8]));
    let mut by_label: Vec<Option<(i32, i32, i32, i32, u32)>> = Vec::new();
    for (x, y, p) in labels.enumerate_pixels() {
        let l = p.0[0] as usize;
        if l == 0 {
            continue;
        }
        if by_label.len() < l {
            by_label.resize(l, None);
        }
        let (x, y) = (x as i32, y as i32);
        let entry = &mut by_label[l - 1];
        match entry {
            None => *entry = Some((x, y, x, y, 1)),
            Some((x1, y1, x2, y2, area)) => {
                *x1 = (*x1).min(x);
                *y1 = (*y1).min(y);
                *x2 = (*x2).max(x);
                *y2 = (*y2).max(y);
                *area += 1;
            },
        }
    }
    let stats = by_label
        .into_iter()
        .enumerate()
        .filter_map(|(i, e)| {
            e.map(|(x1, y1, x2, y2, area)| ComponentStats {
                label: i as u32 + 1,
                bbox: PixelRect::new(x1, y1, x2, y2),
                area,
            })
        })
        .collect();
    (labels, stats)
}

/// Compute per-component statistics for every 8-connected component.
///
/// Components are returned in label order, which is deterministic for a
/// given mask (top-to-bottom, left-to-right discovery).
pub fn component_stats(mask: &BinaryMask) -> Vec<ComponentStats> {
    if mask.is_empty() {
        return Vec::new();
    }
    label_stats(mask).1
}

/// Rebuild a mask keeping only the components accepted by `keep`.
pub fn filter_components<F>(mask: &BinaryMask, keep: F) -> BinaryMask
where
    F: Fn(&ComponentStats) -> bool,
{
    if mask.is_empty() {
        return mask.clone();
    }
    let (labels, stats) = label_stats(mask);
    let kept: Vec<bool> = {
        let max_label = stats.iter().map(|s| s.label).max().unwrap_or(0) as usize;
        let mut v = vec![false; max_label + 1];
        for s in &stats {
            v[s.label as usize] = keep(s);
        }
        v
    };
    let mut out = BinaryMask::new(mask.width(), mask.height());
    for (x, y, p) in labels.enumerate_pixels() {
        let l = p.0[0] as usize;
        if l != 0 && kept[l] {
            out.set(x as i32, y as i32, true);
        }
    }
    out
}
