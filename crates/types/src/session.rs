//! Session state owned by the protocol client
//!
//! `SessionState` is an immutable value. Every successful exchange produces a
//! new state from the previous one, so transitions can be exercised without a
//! network.

use base64::{engine::general_purpose, Engine as _};
use lwdump_errors::{Error, ProtocolError};
use url::Url;

use crate::payload::{InitResponse, ResponsePayload};

/// Lifecycle of a protocol client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Handshake not yet completed
    Uninitialized,
    /// Real API base address adopted; requests may be sent
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    device_id: Option<String>,
    session_id: Option<String>,
    encryption_key: String,
    api_base: Url,
}

impl SessionState {
    /// Fresh state with no device or session id
    #[must_use]
    pub fn new(api_base: Url, encryption_key: impl Into<String>) -> Self {
        Self {
            device_id: None,
            session_id: None,
            encryption_key: encryption_key.into(),
            api_base,
        }
    }

    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn encryption_key(&self) -> &str {
        &self.encryption_key
    }

    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Full URL of a route under the current base address
    #[must_use]
    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{route}", self.api_base)
    }

    /// State after a successfully decoded response
    ///
    /// The session id is always replaced, even by an absent one. The key is
    /// replaced only when the response kind rotates keys and carries a key.
    #[must_use]
    pub fn apply_response(&self, response: &ResponsePayload) -> Self {
        let header = response.header();
        let mut next = self.clone();
        next.session_id.clone_from(&header.session_id);

        if response.rotates_key() {
            if let Some(key) = &header.encryption_key {
                next.encryption_key.clone_from(key);
            }
        }

        next
    }

    /// State using a different session key
    #[must_use]
    pub fn with_encryption_key(&self, encryption_key: impl Into<String>) -> Self {
        Self {
            encryption_key: encryption_key.into(),
            ..self.clone()
        }
    }

    /// State pointing at a new API base address
    #[must_use]
    pub fn with_api_base(&self, api_base: Url) -> Self {
        Self {
            api_base,
            ..self.clone()
        }
    }
}

impl InitResponse {
    /// Decode the base64 `api_server` field into the real API base address
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::HandshakeFailed` if the field is not base64,
    /// not UTF-8, or not an absolute URL.
    pub fn api_base(&self) -> Result<Url, Error> {
        let handshake = |reason: String| ProtocolError::HandshakeFailed { reason };

        let raw = general_purpose::STANDARD
            .decode(self.api_server.trim())
            .map_err(|e| handshake(format!("api_server is not base64: {e}")))?;
        let text = String::from_utf8(raw)
            .map_err(|e| handshake(format!("api_server is not UTF-8: {e}")))?;
        let url = Url::parse(&text)
            .map_err(|e| handshake(format!("api_server {text:?} is not a URL: {e}")))?;

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{
        GenericResponse, PayloadKind, ResponseHeader, VersionResponse,
    };

    fn base_state() -> SessionState {
        SessionState::new(
            Url::parse("https://g-api.touhoulostword.com/app/").unwrap(),
            "TpzWfhPBWtcNbUScHM2hM6bpw58Tm3Ji",
        )
    }

    fn header(session: &str, key: Option<&str>) -> ResponseHeader {
        ResponseHeader {
            session_id: Some(session.to_string()),
            encryption_key: key.map(ToString::to_string),
            response_time: 0,
        }
    }

    fn init_response(session: &str, key: Option<&str>, api_server: &str) -> ResponsePayload {
        ResponsePayload::Init(InitResponse {
            header: header(session, key),
            api_server: general_purpose::STANDARD.encode(api_server),
            resource_server: None,
        })
    }

    #[test]
    fn test_endpoint_joins_route() {
        assert_eq!(
            base_state().endpoint("version_get"),
            "https://g-api.touhoulostword.com/app/version_get"
        );
    }

    #[test]
    fn test_init_never_rotates_key() {
        let state = base_state();
        let next = state.apply_response(&init_response(
            "s-1",
            Some("0123456789abcdef"),
            "https://example.test/app2/",
        ));
        assert_eq!(next.encryption_key(), state.encryption_key());
        assert_eq!(next.session_id(), Some("s-1"));
    }

    #[test]
    fn test_version_never_rotates_key() {
        let state = base_state();
        let response = ResponsePayload::Version(VersionResponse {
            header: header("s-2", Some("0123456789abcdef")),
            version: 1,
            resource_path: String::new(),
            master_path: String::new(),
            assetbundle_path: String::new(),
            resource_version: 0,
        });
        let next = state.apply_response(&response);
        assert_eq!(next.encryption_key(), state.encryption_key());
        assert_eq!(next.session_id(), Some("s-2"));
    }

    #[test]
    fn test_generic_rotates_key_when_present() {
        let state = base_state();
        let response = ResponsePayload::Generic(GenericResponse {
            header: header("s-3", Some("0123456789abcdef")),
            ..GenericResponse::default()
        });
        let next = state.apply_response(&response);
        assert_eq!(next.encryption_key(), "0123456789abcdef");
        assert_eq!(next.session_id(), Some("s-3"));

        // Original value is untouched
        assert_eq!(state.encryption_key(), "TpzWfhPBWtcNbUScHM2hM6bpw58Tm3Ji");
        assert_eq!(state.session_id(), None);
    }

    #[test]
    fn test_generic_without_key_keeps_key() {
        let state = base_state();
        let response = ResponsePayload::Generic(GenericResponse {
            header: header("s-4", None),
            ..GenericResponse::default()
        });
        let next = state.apply_response(&response);
        assert_eq!(next.encryption_key(), state.encryption_key());
        assert!(PayloadKind::Generic.rotates_key());
    }

    #[test]
    fn test_session_id_replaced_even_when_absent() {
        let state = base_state().apply_response(&ResponsePayload::Generic(GenericResponse {
            header: header("s-5", None),
            ..GenericResponse::default()
        }));
        let next = state.apply_response(&ResponsePayload::Generic(GenericResponse::default()));
        assert_eq!(next.session_id(), None);
    }

    #[test]
    fn test_device_id_survives_transitions() {
        let state = base_state().with_device_id("device-1");
        let next = state
            .apply_response(&init_response("s", None, "https://example.test/app2/"))
            .with_api_base(Url::parse("https://example.test/app2/").unwrap());
        assert_eq!(next.device_id(), Some("device-1"));
        assert_eq!(next.api_base().as_str(), "https://example.test/app2/");

        let rekeyed = next.with_encryption_key("0123456789abcdef");
        assert_eq!(rekeyed.encryption_key(), "0123456789abcdef");
        assert_eq!(rekeyed.session_id(), next.session_id());
    }

    #[test]
    fn test_init_api_base_decoding() {
        let response = init_response("s", None, "https://example.test/app2/")
            .into_init()
            .unwrap();
        let url = response.api_base().unwrap();
        assert_eq!(url.as_str(), "https://example.test/app2/");

        let state = base_state().with_api_base(url);
        assert_eq!(
            state.endpoint("version_get"),
            "https://example.test/app2/version_get"
        );
    }

    #[test]
    fn test_init_api_base_rejects_garbage() {
        let response = InitResponse {
            header: ResponseHeader::default(),
            api_server: "%%%".to_string(),
            resource_server: None,
        };
        assert!(matches!(
            response.api_base(),
            Err(Error::Protocol(ProtocolError::HandshakeFailed { .. }))
        ));

        let response = InitResponse {
            header: ResponseHeader::default(),
            api_server: general_purpose::STANDARD.encode("not a url"),
            resource_server: None,
        };
        assert!(response.api_base().is_err());
    }
}
