use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Asset download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Batch for one category scheduled
    BatchStarted {
        category: String,
        total_items: usize,
        total_estimated_size: Option<u64>,
        concurrent_limit: usize,
    },

    /// Single asset written to disk; `completed` only ever grows
    AssetCompleted {
        category: String,
        asset: String,
        bytes: u64,
        completed: usize,
        total: usize,
    },

    /// Single asset failed
    AssetFailed {
        category: String,
        asset: String,
        failure: FailureContext,
    },

    /// Batch finished (with or without failures)
    BatchCompleted {
        category: String,
        successful: usize,
        failed: usize,
        total_bytes: u64,
        total_time: Duration,
    },

    /// Batch stopped before all assets were attempted
    BatchAborted {
        category: String,
        completed: usize,
        total: usize,
        reason: String,
    },
}
