#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for lwdump
//!
//! This crate provides the data shapes shared by the protocol client, the
//! manifest fetcher and the asset downloader: payloads and their descriptor
//! table, transport envelopes, the session state value, manifest records and
//! download tasks.

pub mod download;
pub mod envelope;
pub mod manifest;
pub mod payload;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use download::{DownloadTask, FailurePolicy, MAX_CONCURRENT_DOWNLOADS};
pub use envelope::{InboundEnvelope, OutboundEnvelope};
pub use manifest::{
    AssetEntry, AssetKind, DownloadKey, Manifest, MasterEntry, ResourceEntry,
};
pub use payload::{
    GenericRequest, GenericResponse, InitRequest, InitResponse, PayloadDescriptor, PayloadKind,
    RequestPayload, ResponseHeader, ResponsePayload, VersionRequest, VersionResponse,
};
pub use session::{ClientState, SessionState};
pub use url::Url;
