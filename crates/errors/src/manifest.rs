//! Manifest retrieval error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ManifestError {
    #[error("failed to decompress manifest from {url}: {message}")]
    Decompress { url: String, message: String },

    #[error("failed to parse manifest from {url}: {message}")]
    Parse { url: String, message: String },
}

impl UserFacingError for ManifestError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The manifest format may have changed; inspect the raw response.")
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Decompress { .. } => "manifest.decompress",
            Self::Parse { .. } => "manifest.parse",
        };
        Some(code)
    }
}
