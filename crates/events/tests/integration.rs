//! Integration tests for events

#[cfg(test)]
mod tests {
    use bubz2_errors::OpsError;
    use bubz2_events::*;

    #[tokio::test]
    async fn test_event_emitter_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_warning_with_context("state not recorded", "sound/caf\u{e9}.wav");
        tx.emit_file_ignored("maps/dm_flood.nav");

        let event1 = rx.recv().await.unwrap();
        match event1 {
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                assert_eq!(message, "state not recorded");
                assert_eq!(context.as_deref(), Some("sound/caf\u{e9}.wav"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let event2 = rx.recv().await.unwrap();
        match event2 {
            AppEvent::Sync(SyncEvent::FileIgnored { path }) => {
                assert_eq!(path, std::path::Path::new("maps/dm_flood.nav"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_file_ignored("maps/dm_flood.nav");
    }

    #[test]
    fn test_log_levels() {
        let failed = AppEvent::Sync(SyncEvent::CompressionFailed {
            source: "a.bsp".into(),
            failure: FailureContext::new(None::<String>, "boom", None::<String>, false),
        });
        assert_eq!(failed.log_level(), tracing::Level::ERROR);

        let ignored = AppEvent::Sync(SyncEvent::FileIgnored { path: "a.nav".into() });
        assert_eq!(ignored.log_level(), tracing::Level::DEBUG);
        assert_eq!(ignored.log_target(), "bubz2::events::sync");

        let warning = AppEvent::General(GeneralEvent::warning_with_context("careful", "a.bsp"));
        assert_eq!(warning.log_level(), tracing::Level::WARN);
        assert!(warning.log_level() <= tracing::Level::WARN);
        assert!(ignored.log_level() > tracing::Level::WARN);
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = OpsError::PartialFailure { failed: 2, total: 3 };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("ops.partial_failure"));
        assert_eq!(failure.message, "2 of 3 files failed to compress");
        assert!(!failure.retryable);
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Sync(SyncEvent::FileUpToDate { path: "a.txt".into() });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"domain":"sync","event":{"type":"FileUpToDate","path":"a.txt"}}"#
        );
    }
}
