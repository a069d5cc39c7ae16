//! Logging setup demonstration
//!
//! Initializes the subscriber the way a host application would and emits the
//! kind of events the radio and scrobble controllers produce.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run -p core-runtime --example logging_demo
//!
//! # JSON format, forwarding to the console sink as well
//! cargo run -p core-runtime --example logging_demo -- json
//!
//! # Compact format with a custom filter
//! cargo run -p core-runtime --example logging_demo -- compact "core_scrobble=trace"
//! ```

use bridge_traits::log::{ConsoleLogger, LogLevel};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};
use std::env;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, instrument, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug)
        .with_spans(true);

    if format == LogFormat::Json {
        config = config.with_logger_sink(Arc::new(ConsoleLogger::default()));
    }
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(e) = init_logging(config) {
        eprintln!("{}", e);
        return;
    }

    info!("Logging initialized");

    tune("lastfm://globaltags/jazz").await;
    handshake("17E61E13454CDD8B68E8D7DEEEDF6170").await;
    flush_cache("/home/rj/.cache/lfm/submissions.json");

    info!("Demo finished");
}

#[instrument(target = "core_radio::tuner")]
async fn tune(station: &str) {
    info!(target: "core_radio::tuner", "Tuning radio station");

    let span = info_span!(target: "core_radio::tuner", "playlist_fetch", attempt = 1);
    let _guard = span.enter();
    debug!(target: "core_radio::tuner", queued = 5, "Playlist batch queued");
    warn!(
        target: "core_radio::tuner",
        attempt = 2,
        max = 5,
        "Service asked to try again later"
    );
}

async fn handshake(session_id: &str) {
    info!(
        target: "core_scrobble::scrobbler",
        session_id = %redact_if_sensitive("session_id", session_id),
        "Handshake succeeded"
    );
    error!(
        target: "core_scrobble::scrobbler",
        status = "bad_time",
        "Scrobbling suspended until rehandshake"
    );
}

fn flush_cache(path: &str) {
    warn!(
        target: "core_scrobble::cache",
        file = strip_path(path),
        "Failed to persist scrobble cache"
    );
}
