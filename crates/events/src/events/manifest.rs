use serde::{Deserialize, Serialize};

/// Manifest retrieval events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ManifestEvent {
    /// Manifest request issued
    FetchStarted { url: String },

    /// Manifest decompressed and parsed
    Fetched {
        url: String,
        compressed_bytes: u64,
        asset_count: usize,
        resource_count: usize,
        master_count: usize,
    },

    /// Readable copy written for inspection
    Persisted { category: String, path: String },

    /// Readable copy could not be written; the fetch still succeeded
    PersistFailed {
        category: String,
        path: String,
        error: String,
    },
}
