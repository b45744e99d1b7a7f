//! Recognized tag records and their ingestion boundary.
//!
//! Tags arrive from the external recognition collaborators as JSON
//! lists. They are deserialized into typed records and validated here:
//! malformed records are rejected with a warning at load time, never
//! deep inside an algorithm.

pub mod associate;

pub use associate::TagAssociator;

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{parse, ExprNode, ParseError};
use crate::geometry::PixelRect;

/// One recognized symbol from the tag/NF collaborators.
///
/// `text` is a normalized operand reference beginning with `%`
/// (normally-closed contacts arrive pre-wrapped as `NOT(%...)`); `conf`
/// is a recognition confidence in `[0, 100]`. Coils are carried through
/// but excluded from contact-logic composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Normalized operand text, e.g. `%I0.0` or `NOT(%I0.1)`.
    pub text: String,
    /// Left edge of the recognized box.
    pub x: i32,
    /// Top edge of the recognized box.
    pub y: i32,
    /// Box width in pixels.
    pub w: i32,
    /// Box height in pixels.
    pub h: i32,
    /// Recognition confidence in `[0, 100]`.
    pub conf: f64,
    /// Whether the symbol is an output coil.
    #[serde(default)]
    pub is_coil: bool,
}

impl TagRecord {
    /// Inclusive bounding box of the recognized symbol.
    pub fn bbox(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.x + self.w - 1, self.y + self.h - 1)
    }

    /// Parse the tag text into its expression term.
    pub fn term(&self) -> std::result::Result<ExprNode, ParseError> {
        parse(&self.text)
    }

    fn validation_error(&self) -> Option<String> {
        if self.text.trim().is_empty() {
            return Some("empty text".to_string());
        }
        if self.w <= 0 || self.h <= 0 {
            return Some(format!("non-positive box {}x{}", self.w, self.h));
        }
        if !(0.0..=100.0).contains(&self.conf) {
            return Some(format!("confidence {} outside [0, 100]", self.conf));
        }
        None
    }
}

/// Validate records at the ingestion boundary, dropping malformed ones
/// with a warning.
pub fn validate_records(records: Vec<TagRecord>) -> Vec<TagRecord> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match record.validation_error() {
            None => Some(record),
            Some(reason) => {
                warn!("rejecting tag record #{}: {} ({:?})", index, reason, record.text);
                None
            },
        })
        .collect()
}

/// Load and validate a tag list from a JSON file.
pub fn load_tags<P: AsRef<Path>>(path: P) -> Result<Vec<TagRecord>> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<TagRecord> = serde_json::from_str(&raw)?;
    Ok(validate_records(records))
}
