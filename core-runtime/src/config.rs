//! # Core Configuration Module
//!
//! Provides configuration management for the radio and scrobble controllers.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every injected capability and protocol setting. It
//! enforces fail-fast validation so that a misconfigured host finds out at
//! startup rather than on the first failed handshake.
//!
//! ## Required Settings
//!
//! - `WsConfig::api_key` - identifies the client to the web service
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `Clock` - time source (default: system clock)
//!
//! When the `desktop-shims` feature is disabled and no `HttpClient` is
//! injected, `build()` fails with [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ScrobblerConfig};
//!
//! let config = CoreConfig::builder()
//!     .api_key("b25b959554ed76058ac220b7b2e0a026")
//!     .scrobbler(ScrobblerConfig::new("tst", "1.0").with_username("rj"))
//!     .max_retries(5)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Missing API key
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - no api key");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use crate::retry::DEFAULT_MAX_RETRIES;
use bridge_traits::{Clock, HttpClient, SystemClock};
use std::sync::Arc;

/// Default web-service API root.
pub const DEFAULT_API_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

/// Default Audioscrobbler handshake endpoint.
pub const DEFAULT_HANDSHAKE_URL: &str = "http://post.audioscrobbler.com/";

/// Protocol ceiling on entries per submission request.
pub const MAX_SUBMISSION_BATCH: usize = 50;

/// Consecutive hard failures before the scrobbler gives up.
pub const DEFAULT_HARD_FAILURE_LIMIT: u32 = 3;

/// Core configuration.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client shared by the web-service transport and the scrobbler
    pub http_client: Arc<dyn HttpClient>,

    /// Time source for handshake timestamps
    pub clock: Arc<dyn Clock>,

    pub ws: WsConfig,

    pub radio: RadioConfig,

    pub scrobbler: ScrobblerConfig,

    /// Per-subscriber buffer of the event bus
    pub event_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("clock", &"Clock { ... }")
            .field("ws", &self.ws)
            .field("radio", &self.radio)
            .field("scrobbler", &self.scrobbler)
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

/// Web-service endpoint settings.
#[derive(Clone, PartialEq, Eq)]
pub struct WsConfig {
    /// API root every method call is sent to
    pub api_root: String,

    /// Client API key, sent as `api_key` on every call
    pub api_key: String,

    /// Optional authenticated session key, sent as `sk`
    pub session_key: Option<String>,

    /// Optional `User-Agent` override
    pub user_agent: Option<String>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            api_key: String::new(),
            session_key: None,
            user_agent: None,
        }
    }
}

impl std::fmt::Debug for WsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConfig")
            .field("api_root", &self.api_root)
            .field("api_key", &"[REDACTED]")
            .field("session_key", &self.session_key.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl WsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "API key is required. Use .api_key() to set it.".to_string(),
            ));
        }

        if !(self.api_root.starts_with("http://") || self.api_root.starts_with("https://")) {
            return Err(Error::Config(format!(
                "API root must be an http(s) URL, got '{}'",
                self.api_root
            )));
        }

        Ok(())
    }
}

/// Radio session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioConfig {
    /// Consecutive recoverable playlist failures tolerated before giving up
    pub max_retries: u32,

    /// Ask for tracks suitable for real-time playback (`rtp=1`)
    pub rtp: bool,

    /// Ask the service for discovery mode (`discovery=1`)
    pub discovery: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            rtp: true,
            discovery: false,
        }
    }
}

impl RadioConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_rtp(mut self, rtp: bool) -> Self {
        self.rtp = rtp;
        self
    }

    pub fn with_discovery(mut self, discovery: bool) -> Self {
        self.discovery = discovery;
        self
    }
}

/// Audioscrobbler submission settings.
///
/// The client id is the three-letter identifier issued to a player; `tst` is
/// the protocol's reserved test id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrobblerConfig {
    pub handshake_url: String,
    pub client_id: String,
    pub client_version: String,
    pub username: String,
    /// Hard failures in a row that stop submission until a rehandshake
    pub hard_failure_limit: u32,
    /// Entries per submission request, capped at [`MAX_SUBMISSION_BATCH`]
    pub batch_size: usize,
}

impl Default for ScrobblerConfig {
    fn default() -> Self {
        Self::new("tst", "1.0")
    }
}

impl ScrobblerConfig {
    pub fn new(client_id: impl Into<String>, client_version: impl Into<String>) -> Self {
        Self {
            handshake_url: DEFAULT_HANDSHAKE_URL.to_string(),
            client_id: client_id.into(),
            client_version: client_version.into(),
            username: String::new(),
            hard_failure_limit: DEFAULT_HARD_FAILURE_LIMIT,
            batch_size: MAX_SUBMISSION_BATCH,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_handshake_url(mut self, url: impl Into<String>) -> Self {
        self.handshake_url = url.into();
        self
    }

    pub fn with_hard_failure_limit(mut self, limit: u32) -> Self {
        self.hard_failure_limit = limit;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_version.is_empty() {
            return Err(Error::Config(
                "Scrobbler client id and version must both be set".to_string(),
            ));
        }

        if self.hard_failure_limit == 0 {
            return Err(Error::Config(
                "Hard failure limit must be greater than 0".to_string(),
            ));
        }

        if self.batch_size == 0 || self.batch_size > MAX_SUBMISSION_BATCH {
            return Err(Error::Config(format!(
                "Submission batch size must be between 1 and {}",
                MAX_SUBMISSION_BATCH
            )));
        }

        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.ws.validate()?;
        self.scrobbler.validate()?;

        if self.event_capacity == 0 {
            return Err(Error::Config(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: format!("Failed to create the default reqwest client: {}", e),
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for web-service calls. \
                 Desktop: enable the 'desktop-shims' feature to use the default reqwest client. \
                 Mobile: inject the platform networking stack."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<dyn Clock>>,
    ws: WsConfig,
    radio: RadioConfig,
    scrobbler: Option<ScrobblerConfig>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.ws.api_key = api_key.into();
        self
    }

    pub fn session_key(mut self, session_key: impl Into<String>) -> Self {
        self.ws.session_key = Some(session_key.into());
        self
    }

    pub fn api_root(mut self, api_root: impl Into<String>) -> Self {
        self.ws.api_root = api_root.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.ws.user_agent = Some(user_agent.into());
        self
    }

    /// Replaces all radio settings at once.
    pub fn radio(mut self, radio: RadioConfig) -> Self {
        self.radio = radio;
        self
    }

    /// Sets the playlist retry ceiling. Default: 5.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.radio.max_retries = max_retries;
        self
    }

    pub fn discovery(mut self, enabled: bool) -> Self {
        self.radio.discovery = enabled;
        self
    }

    pub fn scrobbler(mut self, scrobbler: ScrobblerConfig) -> Self {
        self.scrobbler = Some(scrobbler);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - No `HttpClient` was injected and no desktop default is available
    /// - The API key is missing or the API root is not a URL
    /// - Scrobbler limits are out of range
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        let config = CoreConfig {
            http_client,
            clock,
            ws: self.ws,
            radio: self.radio,
            scrobbler: self.scrobbler.unwrap_or_default(),
            event_capacity: self.event_capacity.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{FixedClock, HttpRequest, HttpResponse};

    struct NullHttpClient;

    #[async_trait]
    impl HttpClient for NullHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse::new(200, "OK\n"))
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .http_client(Arc::new(NullHttpClient))
            .api_key("b25b959554ed76058ac220b7b2e0a026")
    }

    #[test]
    fn test_builder_with_required_fields() {
        let config = builder().build().unwrap();

        assert_eq!(config.ws.api_root, DEFAULT_API_ROOT);
        assert_eq!(config.radio, RadioConfig::default());
        assert_eq!(config.radio.max_retries, 5);
        assert!(config.radio.rtp);
        assert_eq!(config.scrobbler.handshake_url, DEFAULT_HANDSHAKE_URL);
        assert_eq!(config.scrobbler.hard_failure_limit, 3);
        assert_eq!(config.scrobbler.batch_size, 50);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(NullHttpClient))
            .build();

        match result {
            Err(Error::Config(message)) => assert!(message.contains("API key")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_builder_rejects_non_url_api_root() {
        let result = builder().api_root("ws.audioscrobbler.com").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_overrides_radio_settings() {
        let config = builder().max_retries(2).discovery(true).build().unwrap();
        assert_eq!(config.radio.max_retries, 2);
        assert!(config.radio.discovery);

        let config = builder()
            .radio(RadioConfig::default().with_rtp(false))
            .build()
            .unwrap();
        assert!(!config.radio.rtp);
    }

    #[test]
    fn test_scrobbler_batch_size_is_capped() {
        let result = builder()
            .scrobbler(ScrobblerConfig::new("tst", "1.0").with_batch_size(51))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));

        let result = builder()
            .scrobbler(ScrobblerConfig::new("tst", "1.0").with_hard_failure_limit(0))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_event_capacity() {
        let result = builder().event_capacity(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_injected_clock_is_used() {
        let config = builder()
            .clock(Arc::new(FixedClock::at_unix(1_200_000_000)))
            .build()
            .unwrap();
        assert_eq!(config.clock.unix_timestamp(), 1_200_000_000);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = builder().session_key("d580d57f32848f5dcf574d1ce18d78b2").build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("b25b959554ed"));
        assert!(!rendered.contains("d580d57f"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_is_capability_error() {
        let result = CoreConfig::builder().api_key("key").build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_default_http_client() {
        let config = CoreConfig::builder().api_key("key").build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.ws, config.ws);
        assert!(Arc::ptr_eq(&cloned.http_client, &config.http_client));
    }
}
