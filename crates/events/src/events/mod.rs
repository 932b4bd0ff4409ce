use serde::{Deserialize, Serialize};

use lwdump_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod manifest;
pub mod protocol;

pub use download::*;
pub use general::*;
pub use manifest::*;
pub use protocol::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Handshake and request/response exchanges
    Protocol(ProtocolEvent),

    /// Category manifest retrieval
    Manifest(ManifestEvent),

    /// Bulk asset transfer
    Download(DownloadEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::General(GeneralEvent::OperationFailed { .. })
            | Self::Download(
                DownloadEvent::AssetFailed { .. } | DownloadEvent::BatchAborted { .. },
            ) => Level::ERROR,

            // Warning-level events
            Self::General(GeneralEvent::Warning { .. })
            | Self::Protocol(
                ProtocolEvent::ResponseDropped { .. } | ProtocolEvent::ServerMessage { .. },
            )
            | Self::Manifest(ManifestEvent::PersistFailed { .. }) => Level::WARN,

            // Debug-level events (per-request chatter)
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Protocol(
                ProtocolEvent::RequestSent { .. } | ProtocolEvent::ResponseDecoded { .. },
            )
            | Self::Manifest(ManifestEvent::FetchStarted { .. }) => Level::DEBUG,

            // Default to INFO for most events
            _ => Level::INFO,
        }
    }
}
