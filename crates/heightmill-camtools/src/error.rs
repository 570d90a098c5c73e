//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for toolpath parameter
//! validation, heightmap decoding and G-code output.

use heightmill_core::CoreError;
use std::io;
use thiserror::Error;

/// Errors that can occur during toolpath synthesis.
#[derive(Error, Debug)]
pub enum CamError {
    /// Invalid parameters were provided to a generator.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The input image uses a pixel format the decoder cannot map to heights.
    #[error("Unsupported image bit depth: {0} (only 8-bit and 16-bit grayscale are supported)")]
    UnsupportedBitDepth(String),

    /// Image decoding failed.
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    /// I/O error while reading input or writing G-code.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// The decoded image could not form a valid heightmap.
    #[error("Heightmap error: {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for CAM tool operations.
pub type CamResult<T> = Result<T, CamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cam_error_display() {
        let err = CamError::InvalidParameters("stepover must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid parameters: stepover must be positive");

        let err = CamError::UnsupportedBitDepth("Rgb8".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported image bit depth: Rgb8 (only 8-bit and 16-bit grayscale are supported)"
        );
    }

    #[test]
    fn test_error_conversion() {
        let core_err = CoreError::InvalidResolution(0.0);
        let cam_err: CamError = core_err.into();
        assert!(matches!(cam_err, CamError::Core(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let cam_err: CamError = io_err.into();
        assert!(matches!(cam_err, CamError::IoError(_)));
    }
}
