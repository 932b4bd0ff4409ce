//! Bounded-concurrency bulk asset download

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use lwdump_errors::{DownloadError, Error, NetworkError};
use lwdump_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use lwdump_types::{AssetEntry, DownloadTask, FailurePolicy, Manifest, MAX_CONCURRENT_DOWNLOADS};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::client::NetClient;
use crate::validation::{validate_response, validate_url};

/// Default ceiling on simultaneous transfers
pub const DEFAULT_MAX_CONCURRENT: usize = MAX_CONCURRENT_DOWNLOADS;

/// Per-batch directory under the target root holding in-progress transfers
const STAGING_PREFIX: &str = ".lwdump-staging-";

/// One asset that did not make it to disk
#[derive(Debug, Clone)]
pub struct AssetFailure {
    pub asset: String,
    pub error: Error,
}

/// Outcome of a batch that ran to the end
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub category: String,
    pub total: usize,
    pub successful: usize,
    pub failures: Vec<AssetFailure>,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

impl DownloadReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Downloads every asset of a manifest with at most `max_concurrent`
/// transfers in flight
#[derive(Clone)]
pub struct AssetDownloader {
    client: NetClient,
    max_concurrent: usize,
    policy: FailurePolicy,
    cancel: CancellationToken,
    tx: Option<EventSender>,
}

impl EventEmitter for AssetDownloader {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

struct Batch<'a> {
    category: &'a str,
    target_root: &'a Path,
    staging: TempDir,
    total: usize,
    semaphore: Semaphore,
    completed: AtomicUsize,
    token: CancellationToken,
}

impl AssetDownloader {
    #[must_use]
    pub fn new(client: NetClient, tx: Option<EventSender>) -> Self {
        Self {
            client,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            policy: FailurePolicy::default(),
            cancel: CancellationToken::new(),
            tx,
        }
    }

    /// Set the concurrency limit, clamped to `1..=16`
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.clamp(1, DEFAULT_MAX_CONCURRENT);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Tie the downloader to an outside cancellation signal
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops every running batch when cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Fetch `{remote_base}{name}` into `{target_root}/{category}/{name}` for
    /// every asset entry of `manifest`
    ///
    /// Transfers are written to a staging directory under `target_root` and
    /// moved into place when complete, so a partial file never takes a name
    /// an asset could use. Repeated names are fetched once.
    ///
    /// Under [`FailurePolicy::Isolate`] failed assets are listed in the
    /// report and the others keep going. Under [`FailurePolicy::Abort`] the
    /// first failure cancels the rest of the batch.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::AssetFailed` for the first failure under
    /// `Abort`, and `DownloadError::Cancelled` when the downloader's token
    /// is cancelled from outside.
    pub async fn download_all(
        &self,
        category: &str,
        remote_base: &str,
        manifest: &Manifest,
        target_root: &Path,
    ) -> Result<DownloadReport, Error> {
        let start = Instant::now();
        let entries = self.unique_entries(category, manifest);
        let total = entries.len();

        self.emit(AppEvent::Download(DownloadEvent::BatchStarted {
            category: category.to_string(),
            total_items: total,
            total_estimated_size: Some(manifest.total_size()),
            concurrent_limit: self.max_concurrent,
        }));

        tokio::fs::create_dir_all(target_root)
            .await
            .map_err(|e| Error::io_with_path(&e, target_root))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(target_root)
            .map_err(|e| Error::io_with_path(&e, target_root))?;

        let batch = Batch {
            category,
            target_root,
            staging,
            total,
            semaphore: Semaphore::new(self.max_concurrent),
            completed: AtomicUsize::new(0),
            token: self.cancel.child_token(),
        };

        let mut transfers: FuturesUnordered<_> = entries
            .into_iter()
            .map(|entry| {
                let batch = &batch;
                let task = DownloadTask::new(category, remote_base, &entry.name);
                async move { (entry.name.as_str(), self.run_task(task, batch).await) }
            })
            .collect();

        let mut successful = 0;
        let mut total_bytes = 0;
        let mut failures = Vec::new();
        let mut abort_error = None;

        while let Some((asset, result)) = transfers.next().await {
            match result {
                Ok(bytes) => {
                    successful += 1;
                    total_bytes += bytes;
                }
                Err(Error::Cancelled) => {}
                Err(error) => {
                    self.emit(AppEvent::Download(DownloadEvent::AssetFailed {
                        category: category.to_string(),
                        asset: asset.to_string(),
                        failure: FailureContext::from_error(&error),
                    }));

                    if self.policy == FailurePolicy::Abort && abort_error.is_none() {
                        abort_error = Some(DownloadError::AssetFailed {
                            category: category.to_string(),
                            asset: asset.to_string(),
                            message: error.to_string(),
                        });
                        batch.token.cancel();
                    }

                    failures.push(AssetFailure {
                        asset: asset.to_string(),
                        error,
                    });
                }
            }
        }
        drop(transfers);

        let completed = batch.completed.load(Ordering::SeqCst);

        if let Some(error) = abort_error {
            self.emit(AppEvent::Download(DownloadEvent::BatchAborted {
                category: category.to_string(),
                completed,
                total,
                reason: error.to_string(),
            }));
            return Err(error.into());
        }

        if self.cancel.is_cancelled() && completed + failures.len() < total {
            self.emit(AppEvent::Download(DownloadEvent::BatchAborted {
                category: category.to_string(),
                completed,
                total,
                reason: "cancelled".to_string(),
            }));
            return Err(DownloadError::Cancelled {
                category: category.to_string(),
                completed,
                total,
            }
            .into());
        }

        let elapsed = start.elapsed();
        self.emit(AppEvent::Download(DownloadEvent::BatchCompleted {
            category: category.to_string(),
            successful,
            failed: failures.len(),
            total_bytes,
            total_time: elapsed,
        }));

        Ok(DownloadReport {
            category: category.to_string(),
            total,
            successful,
            failures,
            total_bytes,
            elapsed,
        })
    }

    /// Manifest entries with repeated names dropped, first occurrence kept
    fn unique_entries<'m>(&self, category: &str, manifest: &'m Manifest) -> Vec<&'m AssetEntry> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(manifest.asset_entries.len());

        for entry in &manifest.asset_entries {
            if seen.insert(entry.name.as_str()) {
                entries.push(entry);
            } else {
                self.emit_warning_with_context(
                    format!("duplicate asset {} listed again, fetching once", entry.name),
                    category,
                );
            }
        }

        entries
    }

    async fn run_task(
        &self,
        task: Result<DownloadTask, Error>,
        batch: &Batch<'_>,
    ) -> Result<u64, Error> {
        let task = task?;

        let _permit = tokio::select! {
            biased;
            () = batch.token.cancelled() => return Err(Error::Cancelled),
            permit = batch.semaphore.acquire() => permit.map_err(|e| DownloadError::WorkerFailed {
                message: e.to_string(),
            })?,
        };

        let bytes = self.fetch_asset(&task, batch).await?;

        let completed = batch.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit(AppEvent::Download(DownloadEvent::AssetCompleted {
            category: batch.category.to_string(),
            asset: task.asset_name.clone(),
            bytes,
            completed,
            total: batch.total,
        }));

        Ok(bytes)
    }

    /// Stream one asset to a staged file and move it into place
    ///
    /// The staged file is deleted when the transfer fails.
    async fn fetch_asset(&self, task: &DownloadTask, batch: &Batch<'_>) -> Result<u64, Error> {
        let url = task.url();
        validate_url(&url)?;

        let dest = task.destination(batch.target_root);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }

        let staging = batch.staging.path();
        let (file, partial) = tempfile::Builder::new()
            .tempfile_in(staging)
            .map_err(|e| Error::io_with_path(&e, staging))?
            .into_parts();

        let bytes = self
            .stream_to_file(&url, File::from_std(file), &partial, &batch.token)
            .await?;

        tokio::fs::rename(&partial, &dest)
            .await
            .map_err(|e| Error::io_with_path(&e, &dest))?;
        // moved into place, nothing left to delete
        let _ = partial.keep();

        Ok(bytes)
    }

    async fn stream_to_file(
        &self,
        url: &str,
        mut file: File,
        path: &Path,
        token: &CancellationToken,
    ) -> Result<u64, Error> {
        let response = tokio::select! {
            biased;
            () = token.cancelled() => return Err(Error::Cancelled),
            response = self.client.get(url) => response?,
        };
        validate_response(&response)?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        loop {
            let chunk = tokio::select! {
                biased;
                () = token.cancelled() => return Err(Error::Cancelled),
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };
            let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;

            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        Ok(written)
    }
}
