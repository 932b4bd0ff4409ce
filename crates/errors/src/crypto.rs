//! Envelope cipher error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failures while encrypting or decrypting an envelope body.
///
/// The cipher carries no authentication tag, so a wrong key shows up as a
/// padding failure rather than an integrity failure.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CryptoError {
    #[error("invalid key length: {length} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength { length: usize },

    #[error("ciphertext is not valid base64: {message}")]
    InvalidBase64 { message: String },

    #[error("ciphertext length {length} is not a multiple of the block size")]
    InvalidBlockLength { length: usize },

    #[error("invalid padding after decryption")]
    InvalidPadding,
}

impl UserFacingError for CryptoError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidKeyLength { .. } => {
                Some("The encryption key must be 16, 24 or 32 bytes long.")
            }
            Self::InvalidPadding => {
                Some("The session key is probably out of sync; restart to renegotiate.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidKeyLength { .. } => "crypto.invalid_key_length",
            Self::InvalidBase64 { .. } => "crypto.invalid_base64",
            Self::InvalidBlockLength { .. } => "crypto.invalid_block_length",
            Self::InvalidPadding => "crypto.invalid_padding",
        };
        Some(code)
    }
}
