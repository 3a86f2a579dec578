//! Error types for diagram construction.

use crate::bed::BedError;
use std::io;
use thiserror::Error;

/// Errors raised while building a diagram.
///
/// `Configuration` is raised before any computation; `Render` when the
/// computed geometry cannot be drawn. Neither leaves a partial result.
#[derive(Error, Debug)]
pub enum OverlapError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Bed(#[from] BedError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OverlapError {
    pub fn config(message: impl Into<String>) -> Self {
        OverlapError::Configuration(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        OverlapError::Render(message.into())
    }

    /// True for errors the caller fixes by changing arguments.
    pub fn is_configuration(&self) -> bool {
        matches!(self, OverlapError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, OverlapError>;
