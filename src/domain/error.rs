//! Error taxonomy for the training orchestrator and its artifact writers.
//!
//! Application and CLI code wraps these in `anyhow` with context; the
//! orchestrator itself returns them unchanged so callers can match on
//! the failure kind.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a phase, a training run, or an artifact write.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("label {label} is outside the {num_classes}-class range")]
    LabelOutOfRange { label: i64, num_classes: usize },

    #[error("prediction shape {actual:?} does not match target shape {expected:?}")]
    ShapeMismatch { expected: [usize; 2], actual: [usize; 2] },

    #[error("skeleton sequence of shape {shape:?} needs {expected} values, found {found}")]
    SequenceLength { shape: [usize; 4], expected: usize, found: usize },

    #[error("could not read tensor data: {0}")]
    TensorData(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode checkpoint: {0}")]
    CheckpointEncode(String),

    #[error("could not decode checkpoint '{path}': {message}")]
    CheckpointDecode { path: PathBuf, message: String },

    #[error("checkpoint '{path}' does not fit the model: {message}")]
    CheckpointMismatch { path: PathBuf, message: String },

    #[error("could not access metric array '{path}': {message}")]
    MetricArray { path: PathBuf, message: String },

    #[error("could not render '{path}': {message}")]
    Render { path: PathBuf, message: String },
}

pub type TrainResult<T> = Result<T, TrainError>;

impl TrainError {
    /// Attach a path to an `std::io::Error`.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TrainError::Io { path, source }
    }

    /// Build a render error from any displayable backend error.
    pub fn render<E: std::fmt::Display>(path: impl Into<PathBuf>) -> impl FnOnce(E) -> Self {
        let path = path.into();
        move |e| TrainError::Render { path, message: e.to_string() }
    }
}
