use crate::tuner::RadioState;
use thiserror::Error;

/// Caller misuse of a [`RadioTuner`](crate::RadioTuner).
///
/// Service failures are never returned here; they reach the observer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    #[error("A station can only be tuned once per session (session is {0:?})")]
    AlreadyTuned(RadioState),
}

pub type Result<T> = std::result::Result<T, RadioError>;
