use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Failures the scrobbler handles internally.
///
/// Request failures travel back to the controller as data and end up as hard
/// failures or statuses; only cache construction returns them to the caller.
#[derive(Error, Debug)]
pub enum ScrobbleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] BridgeError),

    #[error("Server answered with HTTP status {0}")]
    HttpStatus(u16),

    #[error("Request aborted before producing a reply")]
    Aborted,

    #[error("Scrobble cache I/O failed: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("Scrobble cache is unreadable: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrobbleError>;
