//! Workspace facade crate.
//!
//! Re-exports the protocol controllers behind feature flags so host
//! applications can depend on `lfm-workspace` alone:
//!
//! - `radio`: [`core_radio`] station tuning and playlist queue
//! - `scrobble`: [`core_scrobble`] Audioscrobbler session
//! - `desktop-shims`: [`bridge_desktop`] reqwest transport wired in as the
//!   default `HttpClient`

pub use core_runtime as runtime;
pub use core_ws as ws;

#[cfg(feature = "radio")]
pub use core_radio as radio;

#[cfg(feature = "scrobble")]
pub use core_scrobble as scrobble;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop as desktop;
