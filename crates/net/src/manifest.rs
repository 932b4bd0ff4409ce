//! Category manifest retrieval

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use lwdump_errors::{Error, ManifestError, NetworkError};
use lwdump_events::{AppEvent, EventEmitter, EventSender, ManifestEvent};
use lwdump_types::protocol::MANIFEST_RESOURCE;
use lwdump_types::Manifest;

use crate::client::NetClient;
use crate::validation::{validate_response, validate_url};

/// Stateless manifest fetcher, safe to share across categories
#[derive(Clone)]
pub struct ManifestFetcher {
    client: NetClient,
    tx: Option<EventSender>,
}

impl EventEmitter for ManifestFetcher {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl ManifestFetcher {
    #[must_use]
    pub fn new(client: NetClient, tx: Option<EventSender>) -> Self {
        Self { client, tx }
    }

    /// URL of the manifest below a category's remote base path
    #[must_use]
    pub fn manifest_url(remote_base: &str) -> String {
        format!("{remote_base}{MANIFEST_RESOURCE}")
    }

    /// Download and decode the manifest of one category
    ///
    /// # Errors
    ///
    /// Network failures propagate as `NetworkError`; a body that is not
    /// gzip or not a manifest document is a `ManifestError`.
    pub async fn fetch(&self, remote_base: &str) -> Result<Manifest, Error> {
        let url = Self::manifest_url(remote_base);
        validate_url(&url)?;

        self.emit(AppEvent::Manifest(ManifestEvent::FetchStarted { url: url.clone() }));

        let response = self.client.get(&url).await?;
        validate_response(&response)?;
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

        let manifest = parse_manifest(&url, &body)?;

        self.emit(AppEvent::Manifest(ManifestEvent::Fetched {
            url,
            compressed_bytes: body.len() as u64,
            asset_count: manifest.asset_entries.len(),
            resource_count: manifest.resource_entries.len(),
            master_count: manifest.master_entries().count(),
        }));

        Ok(manifest)
    }

    /// Write a pretty-printed copy to `<dump_root>/<category>.json`
    ///
    /// Best effort: failures are reported as events and `None` is returned.
    pub async fn persist(
        &self,
        category: &str,
        manifest: &Manifest,
        dump_root: &Path,
    ) -> Option<PathBuf> {
        let path = dump_root.join(format!("{category}.json"));

        match write_pretty(manifest, &path).await {
            Ok(()) => {
                self.emit(AppEvent::Manifest(ManifestEvent::Persisted {
                    category: category.to_string(),
                    path: path.display().to_string(),
                }));
                Some(path)
            }
            Err(e) => {
                self.emit(AppEvent::Manifest(ManifestEvent::PersistFailed {
                    category: category.to_string(),
                    path: path.display().to_string(),
                    error: e.to_string(),
                }));
                None
            }
        }
    }

    /// [`fetch`](Self::fetch) followed by a best-effort [`persist`](Self::persist)
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch); persisting never fails the call.
    pub async fn fetch_and_persist(
        &self,
        category: &str,
        remote_base: &str,
        dump_root: &Path,
    ) -> Result<Manifest, Error> {
        let manifest = self.fetch(remote_base).await?;
        self.persist(category, &manifest, dump_root).await;
        Ok(manifest)
    }
}

/// Gunzip and parse a manifest body
///
/// # Errors
///
/// Returns `ManifestError::Decompress` or `ManifestError::Parse`.
pub fn parse_manifest(url: &str, body: &[u8]) -> Result<Manifest, Error> {
    let mut json = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut json)
        .map_err(|e| ManifestError::Decompress {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    serde_json::from_slice(&json)
        .map_err(|e| ManifestError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
        .map_err(Into::into)
}

async fn write_pretty(manifest: &Manifest, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_with_path(&e, parent))?;
    }
    let json = serde_json::to_vec_pretty(manifest)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}
