#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for lwdump
//!
//! This crate holds everything that talks to a server: the shared HTTP
//! client, the encrypted API client, the manifest fetcher and the bulk asset
//! downloader.

mod client;
mod download;
mod manifest;
mod protocol;
mod validation;

pub use client::{NetClient, NetConfig};
pub use download::{AssetDownloader, AssetFailure, DownloadReport, DEFAULT_MAX_CONCURRENT};
pub use manifest::{parse_manifest, ManifestFetcher};
pub use protocol::{decode_body, ProtocolClient};
pub use tokio_util::sync::CancellationToken;
