//! Error types for climstress

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for climstress operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    /// Same shape, different georeference. Resampling is the caller's job.
    #[error("Grids are not aligned: {0}")]
    GridMisaligned(String),

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A reducer sampled no valid pixels and has no result to give.
    #[error("Reduction produced no result: {0}")]
    EmptyReduction(String),

    #[error("Timestep {date} is missing required metadata: {field}")]
    MissingMetadata { date: NaiveDate, field: &'static str },

    /// Failure reported by an external archive. Terminal for the run.
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_param(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for climstress operations
pub type Result<T> = std::result::Result<T, Error>;
