//! Error types for the crate

use crate::matrix::Dim2;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A matrix operation was called with operands of incompatible shapes
    #[error("dimension mismatch in {op}: {lhs} vs {rhs}")]
    DimensionMismatch {
        op: &'static str,
        lhs: Dim2,
        rhs: Dim2,
    },

    /// Persisted network with an unknown format tag or version
    #[error("unsupported model format {format:?} version {version}")]
    UnsupportedFormat { format: String, version: u32 },

    /// Persisted network whose declared sizes and matrices disagree
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The classifier is in the middle of a training epoch
    #[error("classifier is busy training")]
    Busy,

    /// Sample label outside of the network's output range
    #[error("label {label} out of range for {classes} classes")]
    InvalidLabel { label: usize, classes: usize },
}

impl Error {
    pub(crate) fn mismatch(op: &'static str, lhs: Dim2, rhs: Dim2) -> Self {
        Error::DimensionMismatch { op, lhs, rhs }
    }
}
