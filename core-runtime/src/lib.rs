//! Shared runtime pieces for the Last.fm controllers.
//!
//! [`config`] holds the settings the radio and scrobble crates read,
//! [`logging`] installs the `tracing` subscriber, [`events`] fans controller
//! notifications out to hosts and [`retry`] is the bounded retry counter the
//! radio tuner drives.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod retry;

pub use error::{Error, Result};
pub use retry::BoundedRetry;
