//! Outer transport envelopes exchanged as JSON

use serde::{Deserialize, Serialize};

/// Envelope posted to the API
///
/// Absent ids serialize as `null`, which is what the server expects before
/// the first session is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    pub device_id: Option<String>,
    pub session_id: Option<String>,
    pub resource_version: i32,
    pub app_version: i32,
    /// Base64 ciphertext of the request payload JSON
    pub body: String,
}

/// Envelope returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InboundEnvelope {
    #[serde(default)]
    pub status: i64,
    #[serde(rename = "now", default)]
    pub server_time: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Base64 ciphertext of the response payload
    #[serde(default)]
    pub body: Option<String>,
}
