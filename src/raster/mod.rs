//! Binary raster masks and the low-level operations the wire extractor
//! is built on.
//!
//! A [`BinaryMask`] is a 0/255 grid backed by [`image::GrayImage`]; any
//! nonzero pixel counts as "on". Masks are derived once per source image
//! and treated as immutable by later stages.

pub mod components;
pub mod morphology;

pub use components::{component_stats, filter_components, ComponentStats};
pub use morphology::{dilate_rect, open_line, Orientation};

use std::path::Path;

use image::{GrayImage, Luma};

use crate::error::Result;
use crate::geometry::PixelRect;

/// A binary raster mask (0 = background, 255 = ink/wire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    img: GrayImage,
}

impl BinaryMask {
    /// Create an all-background mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: GrayImage::new(width, height),
        }
    }

    /// Wrap a grayscale image, normalizing every nonzero pixel to 255.
    pub fn from_image(img: GrayImage) -> Self {
        let mut img = img;
        for p in img.pixels_mut() {
            if p.0[0] != 0 {
                p.0[0] = 255;
            }
        }
        Self { img }
    }

    /// Load a mask from a PNG file, thresholding at 128.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path)?.into_luma8();
        let mut mask = Self { img };
        for p in mask.img.pixels_mut() {
            p.0[0] = if p.0[0] >= 128 { 255 } else { 0 };
        }
        Ok(mask)
    }

    /// Save the mask as a PNG file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.img.save(path)?;
        Ok(())
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Whether the pixel at `(x, y)` is on. Out-of-bounds reads are off.
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return false;
        }
        self.img.get_pixel(x as u32, y as u32).0[0] != 0
    }

    /// Set or clear the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        self.img
            .put_pixel(x as u32, y as u32, Luma([if on { 255u8 } else { 0 }]));
    }

    /// Whether the mask has no ink at all.
    pub fn is_empty(&self) -> bool {
        self.img.pixels().all(|p| p.0[0] == 0)
    }

    /// Fill (or clear) a rectangle, clamped to the mask bounds.
    pub fn fill_rect(&mut self, rect: &PixelRect, on: bool) {
        let x1 = rect.x1.max(0);
        let y1 = rect.y1.max(0);
        let x2 = rect.x2.min(self.width() as i32 - 1);
        let y2 = rect.y2.min(self.height() as i32 - 1);
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set(x, y, on);
            }
        }
    }

    /// Maximal runs of on-pixels in row `y`, as inclusive `(start, end)`
    /// column pairs in left-to-right order.
    pub fn row_runs(&self, y: u32) -> Vec<(u32, u32)> {
        let mut runs = Vec::new();
        let mut start: Option<u32> = None;
        for x in 0..self.width() {
            let on = self.img.get_pixel(x, y).0[0] != 0;
            match (on, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, x - 1));
                    start = None;
                },
                _ => {},
            }
        }
        if let Some(s) = start {
            runs.push((s, self.width() - 1));
        }
        runs
    }

    /// Borrow the underlying grayscale image.
    pub fn as_image(&self) -> &GrayImage {
        &self.img
    }
}
