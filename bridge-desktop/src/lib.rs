//! Desktop implementations of the bridge traits.
//!
//! Only the HTTP seam needs a platform implementation; clocks and log sinks
//! ship with `bridge-traits` itself.
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .build()?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
