//! # Error Types
//!
//! Error types used throughout the quire library.
//!
//! [`QuireError`] covers failures that abort an operation. [`Skip`] is the
//! softer outcome of a content processor that chose to contribute nothing:
//! the story logs the reason and moves on.

use std::fmt;

use thiserror::Error;

/// Main error type for quire operations
#[derive(Debug, Error)]
pub enum QuireError {
    /// Configuration could not be derived (bad template, non-positive content width)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A request failed pre-flight validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote resource could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Chart could not be built or rasterized
    #[error("Chart error: {0}")]
    Chart(String),

    /// Layout could not place the story
    #[error("Layout error: {0}")]
    Layout(String),

    /// PDF object model error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for QuireError {
    fn from(e: image::ImageError) -> Self {
        QuireError::Image(e.to_string())
    }
}

/// A content processor declined to emit anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip(pub String);

impl Skip {
    pub fn new(reason: impl Into<String>) -> Self {
        Skip(reason.into())
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<QuireError> for Skip {
    fn from(e: QuireError) -> Self {
        Skip(e.to_string())
    }
}
