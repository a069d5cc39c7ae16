//! Integration tests for the logging setup

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::log::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

#[test]
fn test_config_builder_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_secrets);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
    assert!(config.display_target);
}

#[test]
fn test_credentials_are_redacted() {
    assert_eq!(redact_if_sensitive("session_key", "d580d57f32848f5d"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("auth_token", "d41d8cd98f00b204"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("Api_Key", "b25b959554ed7605"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("SK", "d580d57f32848f5d"), "[REDACTED]");
}

#[test]
fn test_protocol_fields_pass_through() {
    assert_eq!(redact_if_sensitive("artist", "Cher"), "Cher");
    assert_eq!(
        redact_if_sensitive("submission_url", "http://post2.audioscrobbler.com:80/protocol_1.2"),
        "http://post2.audioscrobbler.com:80/protocol_1.2"
    );
    // "skip" is a rating, not a session key.
    assert_eq!(redact_if_sensitive("skip", "S"), "S");
}

#[test]
fn test_strip_path_keeps_file_name() {
    assert_eq!(strip_path("/var/cache/lfm/submissions.json"), "submissions.json");
}

#[test]
fn test_invalid_filter_is_config_error() {
    let config = LoggingConfig::default().with_filter("core_radio=loud");
    assert!(init_logging(config).is_err());
}

// Only one global subscriber per process, so everything that needs it lives
// in this single test.
#[tokio::test]
async fn test_global_init_forwards_to_sink() {
    let sink = Arc::new(CollectingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).unwrap();
    assert!(init_logging(LoggingConfig::default()).is_err());

    tracing::debug!(target: "core_radio::tuner", "below sink level");
    tracing::info!(
        target: "core_scrobble::scrobbler",
        session_id = "17E61E13454CDD8B",
        "Handshake succeeded"
    );

    // Delivery is spawned on the runtime.
    for _ in 0..50 {
        if !sink.entries.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let entries = sink.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Handshake succeeded");
    assert_eq!(
        entries[0].fields.get("session_id").map(String::as_str),
        Some("[REDACTED]")
    );
}
