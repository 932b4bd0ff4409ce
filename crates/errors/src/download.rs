//! Asset download error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DownloadError {
    #[error("failed to download {category}/{asset}: {message}")]
    AssetFailed {
        category: String,
        asset: String,
        message: String,
    },

    #[error("invalid asset name {name:?}: {reason}")]
    InvalidAssetName { name: String, reason: String },

    #[error("download of {category} cancelled after {completed}/{total} assets")]
    Cancelled {
        category: String,
        completed: usize,
        total: usize,
    },

    #[error("worker task failed: {message}")]
    WorkerFailed { message: String },
}

impl UserFacingError for DownloadError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::AssetFailed { .. } => {
                Some("Re-run the dump; use the isolate failure policy to keep sibling assets.")
            }
            Self::InvalidAssetName { .. } => {
                Some("The manifest lists a name that would escape the dump directory.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::AssetFailed { .. } | Self::Cancelled { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::AssetFailed { .. } => "download.asset_failed",
            Self::InvalidAssetName { .. } => "download.invalid_asset_name",
            Self::Cancelled { .. } => "download.cancelled",
            Self::WorkerFailed { .. } => "download.worker_failed",
        };
        Some(code)
    }
}
