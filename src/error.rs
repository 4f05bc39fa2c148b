//! Custom error types for catsdogs.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the catsdogs library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The model artifact does not exist at the given path.
    #[error("model file not found: {path}")]
    ModelMissing { path: PathBuf },

    /// Failed to load the ONNX model into the inference engine.
    #[error("failed to load model {name}: {source}")]
    ModelLoad {
        name: String,
        #[source]
        source: ort::Error,
    },

    /// Model inference failed.
    #[error("model inference failed: {source}")]
    Inference {
        #[source]
        source: ort::Error,
    },

    /// Shape mismatch between a tensor and what the model expects.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// The label list does not fit the model's output convention.
    #[error("invalid label list: {reason}")]
    InvalidLabels { reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for catsdogs operations.
pub type Result<T> = std::result::Result<T, Error>;
