//! Stateful client for the encrypted game API

use std::io::Read;

use flate2::read::ZlibDecoder;
use lwdump_crypto::KeySize;
use lwdump_config::Config;
use lwdump_errors::{Error, ProtocolError};
use lwdump_events::{AppEvent, EventEmitter, EventSender, ProtocolEvent};
use lwdump_types::{
    ClientState, InboundEnvelope, InitRequest, InitResponse, OutboundEnvelope, PayloadKind,
    RequestPayload, ResponsePayload, SessionState, VersionRequest, VersionResponse,
};

use crate::client::{NetClient, NetConfig};
use crate::validation::validate_response;

/// Client for the game API
///
/// Owns one [`SessionState`] and replaces it wholesale after every decoded
/// response. Calls take `&mut self`, so a single instance can never run two
/// exchanges at once; concurrent callers need their own instances.
pub struct ProtocolClient {
    client: NetClient,
    state: ClientState,
    session: SessionState,
    initial: SessionState,
    app_version: i32,
    resource_version: i32,
    platform_type: i32,
    tx: Option<EventSender>,
}

impl EventEmitter for ProtocolClient {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl ProtocolClient {
    /// Create an uninitialized client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API base is not an http(s) URL or
    /// the HTTP client cannot be built.
    pub fn new(config: &Config, tx: Option<EventSender>) -> Result<Self, Error> {
        let client = NetClient::new(NetConfig::from(config))?;
        Self::with_client(client, config, tx)
    }

    /// Create an uninitialized client around an existing HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the configured API base is not an http(s) URL.
    pub fn with_client(
        client: NetClient,
        config: &Config,
        tx: Option<EventSender>,
    ) -> Result<Self, Error> {
        let mut session = SessionState::new(config.api_base()?, &config.protocol.encryption_key);
        if let Some(device_id) = &config.protocol.device_id {
            session = session.with_device_id(device_id);
        }

        Ok(Self {
            client,
            state: ClientState::Uninitialized,
            initial: session.clone(),
            session,
            app_version: config.protocol.app_version,
            resource_version: config.protocol.resource_version,
            platform_type: config.protocol.platform_type,
            tx,
        })
    }

    /// Create a client and complete the handshake
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::HandshakeFailed` if the handshake fails.
    pub async fn connect(config: &Config, tx: Option<EventSender>) -> Result<Self, Error> {
        let mut client = Self::new(config, tx)?;
        client.bootstrap().await?;
        Ok(client)
    }

    #[must_use]
    pub fn state(&self) -> ClientState {
        self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ClientState::Ready
    }

    /// Current session snapshot
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Perform the handshake and switch to the API base the server assigns
    ///
    /// Always starts from the configured key and base address, so calling it
    /// again on a ready client opens a fresh session. There is no retry: any
    /// failure leaves the client uninitialized.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::HandshakeFailed` wrapping the underlying cause.
    pub async fn bootstrap(&mut self) -> Result<InitResponse, Error> {
        self.state = ClientState::Uninitialized;
        self.session = self.initial.clone();

        self.emit(AppEvent::Protocol(ProtocolEvent::HandshakeStarted {
            api_base: self.session.api_base().to_string(),
        }));

        let request = InitRequest {
            platform_type: self.platform_type,
        };
        let init = match self.exchange(request.into()).await {
            Ok(response) => response.into_init().ok_or_else(|| {
                Error::from(ProtocolError::HandshakeFailed {
                    reason: "handshake returned a non-init response".to_string(),
                })
            })?,
            Err(e) => return Err(handshake_failed(e)),
        };

        let api_base = init.api_base()?;
        self.session = self.session.with_api_base(api_base);
        self.state = ClientState::Ready;

        self.emit(AppEvent::Protocol(ProtocolEvent::HandshakeCompleted {
            api_base: self.session.api_base().to_string(),
            resource_server: init.resource_server.clone(),
        }));

        Ok(init)
    }

    /// Send a request and decode its response
    ///
    /// Returns `Ok(None)` when the response has no body or the body cannot be
    /// decrypted, decompressed or decoded. The session is left untouched in
    /// that case.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NotReady` before the handshake, and transport
    /// errors as they occur.
    pub async fn send(
        &mut self,
        request: RequestPayload,
    ) -> Result<Option<ResponsePayload>, Error> {
        let route = request.route().to_string();

        match self.send_checked(request).await {
            Ok(response) => Ok(Some(response)),
            Err(e) if e.is_absent_response() => {
                self.emit(AppEvent::Protocol(ProtocolEvent::ResponseDropped {
                    route,
                    reason: e.to_string(),
                }));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`send`](Self::send) but reports decode failures as errors
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NotReady` before the handshake, transport
    /// errors, and crypto or decode errors for unusable bodies.
    pub async fn send_checked(&mut self, request: RequestPayload) -> Result<ResponsePayload, Error> {
        if !self.is_ready() {
            return Err(ProtocolError::NotReady {
                route: request.route().to_string(),
            }
            .into());
        }

        self.exchange(request).await
    }

    /// Fetch the current content version and per-category paths
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn version_get(&mut self) -> Result<Option<VersionResponse>, Error> {
        let request = VersionRequest {
            platform_type: self.platform_type,
        };
        let response = self.send(request.into()).await?;
        Ok(response.and_then(ResponsePayload::into_version))
    }

    async fn exchange(&mut self, request: RequestPayload) -> Result<ResponsePayload, Error> {
        let kind = request.kind();
        let route = request.route().to_string();

        let plaintext = request.to_json().map_err(|e| ProtocolError::Encode {
            route: route.clone(),
            message: e.to_string(),
        })?;
        let body = lwdump_crypto::encrypt(plaintext.as_bytes(), self.session.encryption_key())?;

        let envelope = OutboundEnvelope {
            device_id: self.session.device_id().map(str::to_string),
            session_id: self.session.session_id().map(str::to_string),
            resource_version: self.resource_version,
            app_version: self.app_version,
            body,
        };

        let url = self.session.endpoint(&route);
        self.emit(AppEvent::Protocol(ProtocolEvent::RequestSent {
            route: route.clone(),
            url: url.clone(),
        }));

        let response = self.client.post_json(&url, &envelope).await?;
        validate_response(&response)?;

        let text = response.text().await.map_err(|e| ProtocolError::InvalidEnvelope {
            route: route.clone(),
            message: e.to_string(),
        })?;
        let inbound: InboundEnvelope =
            serde_json::from_str(&text).map_err(|e| ProtocolError::InvalidEnvelope {
                route: route.clone(),
                message: e.to_string(),
            })?;

        if let Some(message) = &inbound.error_message {
            self.emit(AppEvent::Protocol(ProtocolEvent::ServerMessage {
                route: route.clone(),
                status: inbound.status,
                message: message.clone(),
            }));
        }

        let Some(ciphertext) = inbound.body.as_deref() else {
            return Err(ProtocolError::EmptyBody { route }.into());
        };
        let decrypted = lwdump_crypto::decrypt(ciphertext, self.session.encryption_key())?;
        let payload = decode_body(kind, &route, &decrypted)?;

        let next = self.checked_rotation(&route, self.session.apply_response(&payload));
        let session_changed = next.session_id() != self.session.session_id();
        let key_rotated = next.encryption_key() != self.session.encryption_key();
        self.session = next;

        self.emit(AppEvent::Protocol(ProtocolEvent::ResponseDecoded {
            route,
            status: inbound.status,
            session_changed,
            key_rotated,
        }));

        Ok(payload)
    }

    /// Keep the current key when a rotated one cannot drive the cipher
    fn checked_rotation(&self, route: &str, next: SessionState) -> SessionState {
        if next.encryption_key() == self.session.encryption_key() {
            return next;
        }

        match KeySize::for_key(next.encryption_key().as_bytes()) {
            Ok(size) => {
                self.emit_debug(format!("{route}: session key rotated (AES-{})", size.bits()));
                next
            }
            Err(e) => {
                self.emit_warning(format!(
                    "{route}: rotated session key rejected, keeping the current key: {e}"
                ));
                next.with_encryption_key(self.session.encryption_key())
            }
        }
    }
}

/// Turn decrypted body bytes into a typed response
///
/// Init bodies are plain JSON; every other kind is zlib-compressed JSON.
///
/// # Errors
///
/// Returns `ProtocolError::Decompress` or `ProtocolError::Decode`.
pub fn decode_body(kind: PayloadKind, route: &str, bytes: &[u8]) -> Result<ResponsePayload, Error> {
    let inflated;
    let json_bytes = if kind.is_compressed() {
        let mut out = Vec::new();
        ZlibDecoder::new(bytes)
            .read_to_end(&mut out)
            .map_err(|e| ProtocolError::Decompress {
                route: route.to_string(),
                message: e.to_string(),
            })?;
        inflated = out;
        inflated.as_slice()
    } else {
        bytes
    };

    let decode_error = |message: String| ProtocolError::Decode {
        route: route.to_string(),
        message,
    };
    let text = std::str::from_utf8(json_bytes).map_err(|e| decode_error(e.to_string()))?;
    ResponsePayload::decode(kind, text)
        .map_err(|e| decode_error(e.to_string()))
        .map_err(Into::into)
}

fn handshake_failed(error: Error) -> Error {
    match error {
        Error::Protocol(ProtocolError::HandshakeFailed { .. }) => error,
        other => ProtocolError::HandshakeFailed {
            reason: other.to_string(),
        }
        .into(),
    }
}
