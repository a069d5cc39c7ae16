//! # Host Bridge Traits
//!
//! What the radio and scrobble cores need from the host application but do
//! not implement themselves.
//!
//! Neither controller opens sockets or reads the system clock. Everything
//! that touches the outside world comes in through these traits, so a host can
//! plug in its own networking stack and tests can script every reply.
//!
//! | Trait | Used for | Desktop implementation |
//! |-------|----------|------------------------|
//! | [`HttpClient`] | web-service calls, Audioscrobbler handshake and submissions | `bridge_desktop::ReqwestHttpClient` |
//! | [`Clock`] | handshake timestamps | [`SystemClock`] |
//! | [`LoggerSink`] | mirroring core logs into the host's logger | [`ConsoleLogger`] |
//!
//! All traits are `Send + Sync`: the controllers share them with the request
//! tasks they spawn.
//!
//! ## Errors
//!
//! Implementations report failures as [`BridgeError`]. Keep timeouts and
//! refused connections in their own variants; the web-service transport maps
//! them to a transport failure instead of a service error.
//!
//! ## Implementing `HttpClient`
//!
//! ```ignore
//! use async_trait::async_trait;
//! use bridge_traits::error::Result;
//! use bridge_traits::{HttpClient, HttpRequest, HttpResponse};
//!
//! struct PlatformHttp;
//!
//! #[async_trait]
//! impl HttpClient for PlatformHttp {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         platform_fetch(request).await
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod log;
pub mod time;

pub use error::BridgeError;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use time::{Clock, FixedClock, SystemClock};
