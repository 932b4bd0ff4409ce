//! Full dump workflow: handshake, version lookup, then every category

use lwdump_config::Config;
use lwdump_errors::{Error, ProtocolError};
use lwdump_events::{EventEmitter, EventSender};
use lwdump_net::{
    AssetDownloader, CancellationToken, DownloadReport, ManifestFetcher, NetClient, NetConfig,
    ProtocolClient,
};
use lwdump_types::protocol::ROUTE_VERSION_GET;
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;

/// Outcome of one category
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub assets: usize,
    pub downloaded: usize,
    pub failed_assets: Vec<String>,
    pub bytes: u64,
    /// Set when the category could not be completed at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategorySummary {
    fn from_report(report: &DownloadReport) -> Self {
        Self {
            category: report.category.clone(),
            assets: report.total,
            downloaded: report.successful,
            failed_assets: report.failures.iter().map(|f| f.asset.clone()).collect(),
            bytes: report.total_bytes,
            error: None,
        }
    }

    fn failed(category: &str, error: &Error) -> Self {
        Self {
            category: category.to_string(),
            assets: 0,
            downloaded: 0,
            failed_assets: Vec::new(),
            bytes: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Result of a whole run
#[derive(Debug, Serialize)]
pub struct DumpSummary {
    pub version: i64,
    pub dump_dir: PathBuf,
    pub categories: Vec<CategorySummary>,
}

impl DumpSummary {
    pub fn failed_categories(&self) -> usize {
        self.categories.iter().filter(|c| c.error.is_some()).count()
    }

    pub fn failed_assets(&self) -> usize {
        self.categories.iter().map(|c| c.failed_assets.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_categories() == 0 && self.failed_assets() == 0
    }
}

/// Run the dump described by `config`
///
/// Handshake and version lookup failures abort the run. Category failures
/// are recorded in the summary and the next category is attempted.
#[instrument(skip_all, fields(dump_dir = %config.general.dump_dir.display()))]
pub async fn run_dump(
    config: &Config,
    tx: EventSender,
    cancel: CancellationToken,
) -> Result<DumpSummary, Error> {
    tx.emit_operation_started("dump");

    let client = NetClient::new(NetConfig::from(config))?;
    let mut api = ProtocolClient::with_client(client.clone(), config, Some(tx.clone()))?;
    api.bootstrap().await?;

    let version = api
        .version_get()
        .await?
        .ok_or_else(|| ProtocolError::Decode {
            route: ROUTE_VERSION_GET.to_string(),
            message: "no usable response".to_string(),
        })?;

    let fetcher = ManifestFetcher::new(client.clone(), Some(tx.clone()));
    let downloader = AssetDownloader::new(client, Some(tx.clone()))
        .with_max_concurrent(config.download.max_concurrent)
        .with_policy(config.download.failure_policy)
        .with_cancellation(cancel.clone());

    let dump_dir = config.general.dump_dir.clone();
    let paths = version.content_paths();
    let mut categories = Vec::new();

    for category in &config.download.categories {
        if cancel.is_cancelled() {
            categories.push(CategorySummary::failed(category, &Error::Cancelled));
            continue;
        }

        let Some((_, remote_base)) = paths.iter().find(|(name, _)| *name == category.as_str()) else {
            tx.emit_warning_with_context(
                format!("unknown category {category}"),
                "expected one of resource, master, assetbundle",
            );
            categories.push(CategorySummary::failed(
                category,
                &Error::internal(format!("unknown category {category}")),
            ));
            continue;
        };

        let result = async {
            let manifest = fetcher
                .fetch_and_persist(category, remote_base, &dump_dir)
                .await?;
            downloader
                .download_all(category, remote_base, &manifest, &dump_dir)
                .await
        }
        .await;

        match result {
            Ok(report) => categories.push(CategorySummary::from_report(&report)),
            Err(e) => {
                tx.emit_operation_failed(format!("dump {category}"), e.to_string());
                categories.push(CategorySummary::failed(category, &e));
            }
        }
    }

    let summary = DumpSummary {
        version: version.version,
        dump_dir,
        categories,
    };
    tx.emit_operation_completed("dump", summary.is_success());

    Ok(summary)
}
