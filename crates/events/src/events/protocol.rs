use serde::{Deserialize, Serialize};

/// Protocol client events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProtocolEvent {
    /// Handshake sent to the bootstrap address
    HandshakeStarted { api_base: String },

    /// Handshake succeeded and the real API base was adopted
    HandshakeCompleted {
        api_base: String,
        resource_server: Option<String>,
    },

    /// Request posted
    RequestSent { route: String, url: String },

    /// Response decoded and session state advanced
    ResponseDecoded {
        route: String,
        status: i64,
        session_changed: bool,
        key_rotated: bool,
    },

    /// Response could not be turned into a payload
    ResponseDropped { route: String, reason: String },

    /// Server attached an error message to the envelope
    ServerMessage {
        route: String,
        status: i64,
        message: String,
    },
}
