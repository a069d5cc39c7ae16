//! # Scrobble Core
//!
//! Audioscrobbler 1.2.1 submission for a single user.
//!
//! [`Audioscrobbler`] owns the session: it handshakes on demand, forwards
//! now-playing notifications and submits cached [`Scrobble`]s in batches.
//! Progress and soft errors are reported as [`ScrobbleStatus`] values through
//! a [`ScrobbleObserver`].
//!
//! ## Collaborators
//!
//! - [`HttpClient`](bridge_traits::HttpClient) carries the plain-text protocol
//! - [`HandshakeAuth`] supplies the authentication token for each handshake
//! - [`ScrobbleCache`] keeps plays until the server acknowledges them;
//!   [`FileScrobbleCache`] persists them across restarts

pub mod auth;
pub mod cache;
pub mod error;
pub mod observer;
pub mod protocol;
pub mod scrobble;
pub mod scrobbler;
pub mod status;

pub use auth::{HandshakeAuth, StaticHandshakeAuth};
pub use cache::{FileScrobbleCache, MemoryScrobbleCache, ScrobbleCache};
pub use error::{Result, ScrobbleError};
pub use observer::{EventBusScrobbleObserver, NullScrobbleObserver, ScrobbleObserver};
pub use scrobble::{PlaySource, Rating, Scrobble};
pub use scrobbler::Audioscrobbler;
pub use status::ScrobbleStatus;
