//! Error types for the editor

use crate::component::ComponentId;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid range: start {start}, end {end} (size {size})")]
    InvalidRange { start: isize, end: isize, size: usize },

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Component not found: {0}")]
    NotFound(ComponentId),

    #[error("Unknown component type: {0}")]
    UnknownType(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn invalid_range(start: isize, end: isize, size: usize) -> Self {
        Self::InvalidRange { start, end, size }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Whether the error is a caller precondition violation on indices.
    pub fn is_range_error(&self) -> bool {
        matches!(self, EditorError::InvalidRange { .. })
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, EditorError::Structural(_))
    }
}
