// src/error.rs
//! Error taxonomy shared by the playback, analysis and settings layers.

use std::fmt;

use thiserror::Error;

/// A single rejected settings field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised by the visualizer core.
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// The selected file is not an audio asset.
    #[error("file must be audio (detected {mime})")]
    InvalidInput { mime: String },

    /// The byte stream is not a recognized or valid audio encoding.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// One or more settings fields were rejected.
    #[error("invalid settings: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// Operation on a graph with no loaded session, or after teardown.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to persist settings: {0}")]
    Persist(#[from] serde_json::Error),
}

impl VisualizerError {
    /// Field-level errors when this is a validation failure.
    pub fn fields(&self) -> &[FieldError] {
        match self {
            VisualizerError::Validation(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, VisualizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let err = VisualizerError::Validation(vec![
            FieldError::new("fft_size", "must be a power of two"),
            FieldError::new("fps", "must be between 1 and 240"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid settings: fft_size: must be a power of two, fps: must be between 1 and 240"
        );
        assert_eq!(err.fields().len(), 2);
    }

    #[test]
    fn non_validation_errors_have_no_fields() {
        let err = VisualizerError::InvalidState("no session loaded");
        assert!(err.fields().is_empty());
    }
}
