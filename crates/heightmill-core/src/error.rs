//! Error handling for the Heightmill data model
//!
//! Covers construction of the leaf data structures. Everything downstream
//! assumes a `Heightmap` that passed these checks.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Heightmap construction error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Width or height is zero
    #[error("Invalid heightmap dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Number of samples along X.
        width: usize,
        /// Number of samples along Y.
        height: usize,
    },

    /// Sample buffer does not hold exactly `width * height` values
    #[error("Heightmap data length mismatch: expected {expected} samples, got {actual}")]
    DataLengthMismatch {
        /// The required sample count.
        expected: usize,
        /// The provided sample count.
        actual: usize,
    },

    /// Sample spacing is zero, negative or not finite
    #[error("Invalid sample resolution: {0}")]
    InvalidResolution(f64),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
