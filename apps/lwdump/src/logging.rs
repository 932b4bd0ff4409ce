//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields. The
//! level of every record comes from [`AppEvent::log_level`]. The per-asset
//! line keeps the familiar `(<completed>/<total>) <category>/<asset>` shape.

use lwdump_events::{AppEvent, DownloadEvent, GeneralEvent, ManifestEvent, ProtocolEvent};
use tracing::{debug, error, info, trace, warn, Level};

/// Emit one record at a level only known at runtime
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => error!($($arg)+),
            Level::WARN => warn!($($arg)+),
            Level::INFO => info!($($arg)+),
            Level::DEBUG => debug!($($arg)+),
            _ => trace!($($arg)+),
        }
    };
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let level = event.log_level();
    match event {
        AppEvent::General(general) => log_general(level, general),
        AppEvent::Protocol(protocol) => log_protocol(level, protocol),
        AppEvent::Manifest(manifest) => log_manifest(level, manifest),
        AppEvent::Download(download) => log_download(level, download),
    }
}

fn log_general(level: Level, event: &GeneralEvent) {
    match event {
        GeneralEvent::Warning { message, context } => {
            log_at!(level, target: "lwdump::events::general", context = ?context, "{message}");
        }
        GeneralEvent::DebugLog { message, context } => {
            log_at!(level, target: "lwdump::events::general", context = ?context, "{message}");
        }
        GeneralEvent::OperationStarted { operation } => {
            log_at!(
                level,
                target: "lwdump::events::general",
                operation = %operation,
                "Operation started"
            );
        }
        GeneralEvent::OperationCompleted { operation, success } => {
            log_at!(
                level,
                target: "lwdump::events::general",
                operation = %operation,
                success = success,
                "Operation completed"
            );
        }
        GeneralEvent::OperationFailed { operation, error } => {
            log_at!(
                level,
                target: "lwdump::events::general",
                operation = %operation,
                error = %error,
                "Operation failed"
            );
        }
    }
}

fn log_protocol(level: Level, event: &ProtocolEvent) {
    match event {
        ProtocolEvent::HandshakeStarted { api_base } => {
            log_at!(
                level,
                target: "lwdump::events::protocol",
                api_base = %api_base,
                "Handshake started"
            );
        }
        ProtocolEvent::HandshakeCompleted {
            api_base,
            resource_server,
        } => {
            log_at!(
                level,
                target: "lwdump::events::protocol",
                api_base = %api_base,
                resource_server = ?resource_server,
                "Handshake completed"
            );
        }
        ProtocolEvent::RequestSent { route, url } => {
            log_at!(
                level,
                target: "lwdump::events::protocol",
                route = %route,
                url = %url,
                "Request sent"
            );
        }
        ProtocolEvent::ResponseDecoded {
            route,
            status,
            session_changed,
            key_rotated,
        } => {
            log_at!(
                level,
                target: "lwdump::events::protocol",
                route = %route,
                status = status,
                session_changed = session_changed,
                key_rotated = key_rotated,
                "Response decoded"
            );
        }
        ProtocolEvent::ResponseDropped { route, reason } => {
            log_at!(
                level,
                target: "lwdump::events::protocol",
                route = %route,
                reason = %reason,
                "Response dropped"
            );
        }
        ProtocolEvent::ServerMessage {
            route,
            status,
            message,
        } => {
            log_at!(
                level,
                target: "lwdump::events::protocol",
                route = %route,
                status = status,
                "Server message: {message}"
            );
        }
    }
}

fn log_manifest(level: Level, event: &ManifestEvent) {
    match event {
        ManifestEvent::FetchStarted { url } => {
            log_at!(level, target: "lwdump::events::manifest", url = %url, "Fetching manifest");
        }
        ManifestEvent::Fetched {
            url,
            compressed_bytes,
            asset_count,
            resource_count,
            master_count,
        } => {
            log_at!(
                level,
                target: "lwdump::events::manifest",
                url = %url,
                compressed_bytes = compressed_bytes,
                resource_count = resource_count,
                master_count = master_count,
                "Manifest fetched: {asset_count} assets"
            );
        }
        ManifestEvent::Persisted { category, path } => {
            log_at!(
                level,
                target: "lwdump::events::manifest",
                category = %category,
                path = %path,
                "Manifest copy written"
            );
        }
        ManifestEvent::PersistFailed {
            category,
            path,
            error,
        } => {
            log_at!(
                level,
                target: "lwdump::events::manifest",
                category = %category,
                path = %path,
                error = %error,
                "Manifest copy not written"
            );
        }
    }
}

fn log_download(level: Level, event: &DownloadEvent) {
    match event {
        DownloadEvent::BatchStarted {
            category,
            total_items,
            total_estimated_size,
            concurrent_limit,
        } => {
            log_at!(
                level,
                target: "lwdump::events::download",
                category = %category,
                total_items = total_items,
                total_estimated_size = ?total_estimated_size,
                concurrent_limit = concurrent_limit,
                "Downloading {category}"
            );
        }
        DownloadEvent::AssetCompleted {
            category,
            asset,
            bytes,
            completed,
            total,
        } => {
            log_at!(
                level,
                target: "lwdump::events::download",
                bytes = bytes,
                "{}",
                progress_line(*completed, *total, category, asset)
            );
        }
        DownloadEvent::AssetFailed {
            category,
            asset,
            failure,
        } => {
            log_at!(
                level,
                target: "lwdump::events::download",
                category = %category,
                asset = %asset,
                retryable = failure.retryable,
                code = ?failure.code,
                hint = ?failure.hint,
                "Asset failed: {}",
                failure.message
            );
        }
        DownloadEvent::BatchCompleted {
            category,
            successful,
            failed,
            total_bytes,
            total_time,
        } => {
            log_at!(
                level,
                target: "lwdump::events::download",
                category = %category,
                successful = successful,
                failed = failed,
                total_bytes = total_bytes,
                elapsed_ms = u64::try_from(total_time.as_millis()).unwrap_or(u64::MAX),
                "Finished {category}"
            );
        }
        DownloadEvent::BatchAborted {
            category,
            completed,
            total,
            reason,
        } => {
            log_at!(
                level,
                target: "lwdump::events::download",
                category = %category,
                completed = completed,
                total = total,
                "Aborted {category}: {reason}"
            );
        }
    }
}

/// `(<completed>/<total>) <category>/<asset>`
pub fn progress_line(completed: usize, total: usize, category: &str, asset: &str) -> String {
    format!("({completed}/{total}) {category}/{asset}")
}
