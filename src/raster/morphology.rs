//! Morphological operations specialized for wire extraction.
//!
//! Opening with a 1×k line structuring element keeps exactly the runs of
//! length ≥ k and erases shorter ones, so [`open_line`] implements it
//! directly as run-length filtering instead of erode-then-dilate over
//! the full grid.

use super::BinaryMask;

/// Scan orientation for line-shaped structuring elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Rows (k×1 kernel): isolates horizontal wires.
    Horizontal,
    /// Columns (1×k kernel): isolates vertical wires.
    Vertical,
}

/// Morphological opening with a line kernel of the given length.
///
/// Keeps every run of on-pixels (along the kernel orientation) whose
/// length is at least `min_run`; shorter runs are erased.
pub fn open_line(mask: &BinaryMask, orientation: Orientation, min_run: u32) -> BinaryMask {
    let (w, h) = (mask.width(), mask.height());
    let mut out = BinaryMask::new(w, h);
    if min_run == 0 {
        return mask.clone();
    }
    match orientation {
        Orientation::Horizontal => {
            for y in 0..h {
                for (s, e) in mask.row_runs(y) {
                    if e - s + 1 >= min_run {
                        for x in s..=e {
                            out.set(x as i32, y as i32, true);
                        }
                    }
                }
            }
        },
        Orientation::Vertical => {
            for x in 0..w {
                let mut start: Option<u32> = None;
                for y in 0..=h {
                    let on = y < h && mask.is_set(x as i32, y as i32);
                    match (on, start) {
                        (true, None) => start = Some(y),
                        (false, Some(s)) => {
                            if y - s >= min_run {
                                for yy in s..y {
                                    out.set(x as i32, yy as i32, true);
                                }
                            }
                            start = None;
                        },
                        _ => {},
                    }
                }
            }
        },
    }
    out
}

/// Dilation with a rectangular kernel of odd size `kw × kh`, anchored at
/// the kernel center.
pub fn dilate_rect(mask: &BinaryMask, kw: u32, kh: u32) -> BinaryMask {
    let (w, h) = (mask.width(), mask.height());
    let mut out = BinaryMask::new(w, h);
    let ax = (kw / 2) as i32;
    let ay = (kh / 2) as i32;
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            if !mask.is_set(x, y) {
                continue;
            }
            for dy in -ay..=ay {
                for dx in -ax..=ax {
                    out.set(x + dx, y + dy, true);
                }
            }
        }
    }
    out
}
