//! Protocol client error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("handshake failed: {reason}")]
    HandshakeFailed { reason: String },

    #[error("client is not ready; bootstrap must complete before sending {route}")]
    NotReady { route: String },

    #[error("response to {route} carried no body")]
    EmptyBody { route: String },

    #[error("failed to decompress response to {route}: {message}")]
    Decompress { route: String, message: String },

    #[error("failed to decode response to {route}: {message}")]
    Decode { route: String, message: String },

    #[error("failed to encode request for {route}: {message}")]
    Encode { route: String, message: String },

    #[error("invalid response envelope from {route}: {message}")]
    InvalidEnvelope { route: String, message: String },
}

impl UserFacingError for ProtocolError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::HandshakeFailed { .. } => Some(
                "The game server rejected the handshake; check app_version and the default key.",
            ),
            Self::NotReady { .. } => Some("Call bootstrap before issuing requests."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::HandshakeFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::HandshakeFailed { .. } => "protocol.handshake_failed",
            Self::NotReady { .. } => "protocol.not_ready",
            Self::EmptyBody { .. } => "protocol.empty_body",
            Self::Decompress { .. } => "protocol.decompress",
            Self::Decode { .. } => "protocol.decode",
            Self::Encode { .. } => "protocol.encode",
            Self::InvalidEnvelope { .. } => "protocol.invalid_envelope",
        };
        Some(code)
    }
}
