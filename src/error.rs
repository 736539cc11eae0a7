// Error types module

use crate::fetcher::{Asset, FetchError};
use crate::watermark::WatermarkError;
use std::fmt;

/// Terminal failure for one submission.
///
/// Every failure is local to the submission that raised it; there is no
/// global circuit breaking or backoff. Operators get the cause via logs,
/// callers only see `user_message()`.
#[derive(Debug)]
pub enum SubmissionError {
    /// Transport failure or non-2xx status fetching one of the two assets.
    Fetch { asset: Asset, cause: FetchError },

    /// The host community has no emblem configured. Reported distinctly
    /// because it is a configuration gap, not a transient fault; no fetch is
    /// attempted in this state.
    MissingEmblem,

    /// The fetched bytes did not decode as a raster image.
    Decode { asset: Asset, cause: String },

    /// Compositing or encoding failed.
    Watermark(WatermarkError),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::Fetch { asset, cause } => {
                write!(f, "Failed to fetch {}: {}", asset, cause)
            }
            SubmissionError::MissingEmblem => {
                write!(f, "Community has no emblem configured")
            }
            SubmissionError::Decode { asset, cause } => {
                write!(f, "Failed to decode {}: {}", asset, cause)
            }
            SubmissionError::Watermark(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SubmissionError {}

impl From<WatermarkError> for SubmissionError {
    fn from(err: WatermarkError) -> Self {
        SubmissionError::Watermark(err)
    }
}

impl SubmissionError {
    /// Short user-facing failure string. Never exposes internal causes or
    /// structured codes.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Fetch {
                asset: Asset::Submission,
                ..
            } => "❌ Failed to download image.".to_string(),
            SubmissionError::Fetch {
                asset: Asset::Emblem,
                ..
            } => "❌ Failed to retrieve the community emblem.".to_string(),
            SubmissionError::MissingEmblem => {
                "❌ This community has no emblem configured.".to_string()
            }
            SubmissionError::Decode { .. } | SubmissionError::Watermark(_) => {
                "❌ An error occurred processing the image.".to_string()
            }
        }
    }

    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Fetch {
                asset: Asset::Submission,
                ..
            } => "fetch_submission",
            SubmissionError::Fetch {
                asset: Asset::Emblem,
                ..
            } => "fetch_emblem",
            SubmissionError::MissingEmblem => "missing_emblem",
            SubmissionError::Decode { .. } => "decode",
            SubmissionError::Watermark(_) => "watermark",
        }
    }
}
