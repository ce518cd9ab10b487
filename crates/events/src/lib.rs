#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in bubz2
//!
//! Library crates report what they do by sending events over a channel; the
//! CLI decides how to print them. Nothing outside the CLI writes to stdout.

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, SyncEvent};

use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for the event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented for the raw [`EventSender`] and for any struct that carries
/// one, so helpers are available wherever events are produced.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit an operation failed event
    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    /// Emit a file ignored event
    fn emit_file_ignored(&self, path: impl Into<PathBuf>) {
        self.emit(AppEvent::Sync(SyncEvent::FileIgnored { path: path.into() }));
    }

    /// Emit a file up-to-date event
    fn emit_file_up_to_date(&self, path: impl Into<PathBuf>) {
        self.emit(AppEvent::Sync(SyncEvent::FileUpToDate { path: path.into() }));
    }

    /// Emit a file compressed event
    fn emit_file_compressed(
        &self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        bytes_in: u64,
        bytes_out: u64,
    ) {
        self.emit(AppEvent::Sync(SyncEvent::FileCompressed {
            source: source.into(),
            destination: destination.into(),
            bytes_in,
            bytes_out,
        }));
    }

    /// Emit a compression failed event
    fn emit_compression_failed(&self, source: impl Into<PathBuf>, failure: FailureContext) {
        self.emit(AppEvent::Sync(SyncEvent::CompressionFailed {
            source: source.into(),
            failure,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
