//! Request and response payloads carried inside envelope bodies
//!
//! Each payload variant maps to one row of a static descriptor table that
//! fixes its route, whether its response rotates the session key, and
//! whether its response body is zlib compressed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::{PLATFORM_TYPE, ROUTE_GAME_INIT, ROUTE_VERSION_GET};

/// Payload variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Init,
    Version,
    Generic,
}

/// Static per-variant protocol properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadDescriptor {
    pub kind: PayloadKind,
    /// Fixed route, `None` when the request carries its own
    pub route: Option<&'static str>,
    /// Whether a response of this kind replaces the session key
    pub rotates_key: bool,
    /// Whether the decrypted response body is zlib compressed
    pub compressed: bool,
}

static DESCRIPTORS: [PayloadDescriptor; 3] = [
    PayloadDescriptor {
        kind: PayloadKind::Init,
        route: Some(ROUTE_GAME_INIT),
        rotates_key: false,
        compressed: false,
    },
    PayloadDescriptor {
        kind: PayloadKind::Version,
        route: Some(ROUTE_VERSION_GET),
        rotates_key: false,
        compressed: true,
    },
    PayloadDescriptor {
        kind: PayloadKind::Generic,
        route: None,
        rotates_key: true,
        compressed: true,
    },
];

impl PayloadKind {
    /// Look up the descriptor row for this variant
    #[must_use]
    pub fn descriptor(self) -> &'static PayloadDescriptor {
        &DESCRIPTORS[self as usize]
    }

    #[must_use]
    pub fn rotates_key(self) -> bool {
        self.descriptor().rotates_key
    }

    #[must_use]
    pub fn is_compressed(self) -> bool {
        self.descriptor().compressed
    }
}

fn default_platform_type() -> i32 {
    PLATFORM_TYPE
}

/// Handshake request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    #[serde(default = "default_platform_type")]
    pub platform_type: i32,
}

impl Default for InitRequest {
    fn default() -> Self {
        Self {
            platform_type: PLATFORM_TYPE,
        }
    }
}

/// Content version request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequest {
    #[serde(default = "default_platform_type")]
    pub platform_type: i32,
}

impl Default for VersionRequest {
    fn default() -> Self {
        Self {
            platform_type: PLATFORM_TYPE,
        }
    }
}

/// Any other API call: a route plus free-form parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenericRequest {
    #[serde(skip)]
    pub route: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl GenericRequest {
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter to the request body
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Request payload; serializes as the bare inner object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    Init(InitRequest),
    Version(VersionRequest),
    Generic(GenericRequest),
}

impl RequestPayload {
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Init(_) => PayloadKind::Init,
            Self::Version(_) => PayloadKind::Version,
            Self::Generic(_) => PayloadKind::Generic,
        }
    }

    /// Route appended verbatim to the API base address
    #[must_use]
    pub fn route(&self) -> &str {
        match self {
            Self::Generic(request) => &request.route,
            other => other.kind().descriptor().route.unwrap_or_default(),
        }
    }

    /// Serialize to the JSON text that gets encrypted into the envelope body
    ///
    /// # Errors
    ///
    /// Returns an error if a generic request holds a value JSON cannot represent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<InitRequest> for RequestPayload {
    fn from(request: InitRequest) -> Self {
        Self::Init(request)
    }
}

impl From<VersionRequest> for RequestPayload {
    fn from(request: VersionRequest) -> Self {
        Self::Version(request)
    }
}

impl From<GenericRequest> for RequestPayload {
    fn from(request: GenericRequest) -> Self {
        Self::Generic(request)
    }
}

/// Fields common to every response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseHeader {
    #[serde(default)]
    pub session_id: Option<String>,
    /// New session key; only adopted for kinds that rotate the key
    #[serde(default)]
    pub encryption_key: Option<String>,
    #[serde(default)]
    pub response_time: i64,
}

/// Handshake response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    #[serde(flatten)]
    pub header: ResponseHeader,
    /// Real API base address, base64 encoded
    pub api_server: String,
    #[serde(default)]
    pub resource_server: Option<String>,
}

/// Content version response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    #[serde(flatten)]
    pub header: ResponseHeader,
    #[serde(default)]
    pub version: i64,
    pub resource_path: String,
    pub master_path: String,
    pub assetbundle_path: String,
    #[serde(default)]
    pub resource_version: i64,
}

impl VersionResponse {
    /// Category name and remote base path of every content category
    #[must_use]
    pub fn content_paths(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("resource", self.resource_path.as_str()),
            ("master", self.master_path.as_str()),
            ("assetbundle", self.assetbundle_path.as_str()),
        ]
    }
}

/// Response to any other request; unknown fields are kept verbatim
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenericResponse {
    #[serde(flatten)]
    pub header: ResponseHeader,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Decoded response payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Init(InitResponse),
    Version(VersionResponse),
    Generic(GenericResponse),
}

impl ResponsePayload {
    /// Decode the JSON text of a response of the given kind
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or does not match the kind's shape.
    pub fn decode(kind: PayloadKind, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            PayloadKind::Init => Self::Init(serde_json::from_str(json)?),
            PayloadKind::Version => Self::Version(serde_json::from_str(json)?),
            PayloadKind::Generic => Self::Generic(serde_json::from_str(json)?),
        })
    }

    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Init(_) => PayloadKind::Init,
            Self::Version(_) => PayloadKind::Version,
            Self::Generic(_) => PayloadKind::Generic,
        }
    }

    #[must_use]
    pub fn header(&self) -> &ResponseHeader {
        match self {
            Self::Init(response) => &response.header,
            Self::Version(response) => &response.header,
            Self::Generic(response) => &response.header,
        }
    }

    #[must_use]
    pub fn rotates_key(&self) -> bool {
        self.kind().rotates_key()
    }

    #[must_use]
    pub fn into_init(self) -> Option<InitResponse> {
        match self {
            Self::Init(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_version(self) -> Option<VersionResponse> {
        match self {
            Self::Version(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_generic(self) -> Option<GenericResponse> {
        match self {
            Self::Generic(response) => Some(response),
            _ => None,
        }
    }
}
