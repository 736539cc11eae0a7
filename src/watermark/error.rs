//! Watermark error types.

use std::fmt;

/// Errors that can occur while building the watermark composite.
#[derive(Debug, Clone)]
pub enum WatermarkError {
    /// Resampling the emblem to the tile size failed.
    ResampleError(String),

    /// Encoding the composited image failed.
    EncodeError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResampleError(msg) => write!(f, "Failed to resample emblem: {}", msg),
            Self::EncodeError(msg) => write!(f, "Failed to encode composite: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatermarkError::ResampleError("source width is 0".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to resample emblem: source width is 0"
        );

        let err = WatermarkError::EncodeError("buffer too small".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to encode composite: buffer too small"
        );
    }
}
