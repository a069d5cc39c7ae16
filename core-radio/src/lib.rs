//! # Radio Core
//!
//! Radio session controller for `lastfm://` stations.
//!
//! A [`RadioTuner`] tunes one [`RadioStation`] and then keeps fetching XSPF
//! playlist batches into a forward queue that the player drains with
//! [`RadioTuner::take_next_track`]. Transient service failures are retried
//! through a [`BoundedRetry`](core_runtime::retry::BoundedRetry); everything
//! the session cannot recover from is reported once to its [`RadioObserver`].

pub mod error;
pub mod observer;
pub mod station;
pub mod tuner;
pub mod xspf;

pub use error::{RadioError, Result};
pub use observer::{EventBusRadioObserver, NullRadioObserver, RadioObserver};
pub use station::RadioStation;
pub use tuner::{RadioState, RadioTuner};
