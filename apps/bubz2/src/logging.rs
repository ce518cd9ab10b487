//! Structured logging integration for events
//!
//! Every event the CLI receives is also written to the tracing subscriber
//! with structured fields, so `--debug` log files hold the full run.

use bubz2_events::{AppEvent, GeneralEvent, SyncEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let target = event.log_target();
    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                warn!(target: "bubz2::events", domain = target, context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(target: "bubz2::events", domain = target, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    target: "bubz2::events",
                    domain = target,
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, error } => {
                error!(
                    target: "bubz2::events",
                    domain = target,
                    operation = %operation,
                    error = %error,
                    "Operation failed"
                );
            }
        },

        AppEvent::Sync(sync) => match sync {
            SyncEvent::ScanStarted {
                source,
                destination,
            } => {
                info!(
                    target: "bubz2::events",
                    domain = target,
                    source = %source.display(),
                    destination = %destination.display(),
                    "Scan started"
                );
            }
            SyncEvent::FileIgnored { path } => {
                debug!(target: "bubz2::events", domain = target, path = %path.display(), "File ignored");
            }
            SyncEvent::FileUpToDate { path } => {
                debug!(target: "bubz2::events", domain = target, path = %path.display(), "File up to date");
            }
            SyncEvent::CompressionQueued {
                files,
                jobs,
                dry_run,
            } => {
                info!(
                    target: "bubz2::events",
                    domain = target,
                    files = files,
                    jobs = jobs,
                    dry_run = dry_run,
                    "Compression queued"
                );
            }
            SyncEvent::FileCompressed {
                source,
                destination,
                bytes_in,
                bytes_out,
            } => {
                info!(
                    target: "bubz2::events",
                    domain = target,
                    source = %source.display(),
                    destination = %destination.display(),
                    bytes_in = bytes_in,
                    bytes_out = bytes_out,
                    "File compressed"
                );
            }
            SyncEvent::CompressionFailed { source, failure } => {
                error!(
                    target: "bubz2::events",
                    domain = target,
                    source = %source.display(),
                    retryable = failure.retryable,
                    code = ?failure.code,
                    error = %failure.message,
                    hint = ?failure.hint,
                    "Compression failed"
                );
            }
            SyncEvent::StateSaved {
                path,
                records,
                pruned,
            } => {
                info!(
                    target: "bubz2::events",
                    domain = target,
                    path = %path.display(),
                    records = records,
                    pruned = pruned,
                    "State saved"
                );
            }
            SyncEvent::Completed {
                compressed,
                failed,
                up_to_date,
                ignored,
                duration_ms,
            } => {
                info!(
                    target: "bubz2::events",
                    domain = target,
                    compressed = compressed,
                    failed = failed,
                    up_to_date = up_to_date,
                    ignored = ignored,
                    duration_ms = duration_ms,
                    "Sync completed"
                );
            }
        },
    }
}
