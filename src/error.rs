//! Error types for ladder-logic reconstruction.
//!
//! This module defines all error types that can occur while extracting
//! wire topology and composing boolean expressions from a diagram raster.

use crate::expr::ParseError;

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raster decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON artifact error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected per-image artifact file was not found
    #[error("Missing artifact for '{base}': {kind}")]
    MissingArtifact {
        /// Image base name the artifact belongs to
        base: String,
        /// Artifact kind (e.g. "tags", "blocks")
        kind: String,
    },

    /// A tag record failed ingestion validation
    #[error("Malformed tag record #{index}: {reason}")]
    MalformedTag {
        /// Position of the record in the input list
        index: usize,
        /// Reason the record was rejected
        reason: String,
    },

    /// Expression parse failure
    #[error("Expression parse error: {0}")]
    Expression(#[from] ParseError),

    /// Operator name outside {AND, OR, NOT} during evaluable emission
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
}
