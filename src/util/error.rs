//! Error types for canopydiff.

use thiserror::Error;

/// Result alias for canopydiff operations.
pub type CanopyDiffResult<T> = std::result::Result<T, CanopyDiffError>;

/// Errors raised on structural contract violations.
///
/// Numeric edge cases (constant bands, zero-variance change arrays, empty
/// point sets) are never errors; they resolve to documented fallback values
/// or empty outputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanopyDiffError {
    /// A raster with a zero width or height was requested.
    #[error("invalid raster dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the raster width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing slice is too short for the requested view.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Two rasters that must share a shape do not.
    #[error(
        "shape mismatch for {context}: expected {expected_width}x{expected_height}, \
         got {width}x{height}"
    )]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
        context: &'static str,
    },
    /// A tunable parameter is outside its valid domain.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}
