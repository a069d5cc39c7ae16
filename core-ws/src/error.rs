use bridge_traits::BridgeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome classification of a web-service call.
///
/// Service codes mirror the `<error code="N">` values of the `lfm` envelope;
/// the codes from 100 up are produced locally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WsError {
    #[error("No error")]
    NoError,
    #[error("This service does not exist")]
    InvalidService,
    #[error("No method with that name in this package")]
    InvalidMethod,
    #[error("You do not have permissions to access the service")]
    AuthenticationFailed,
    #[error("This service doesn't exist in that format")]
    InvalidFormat,
    #[error("Your request is missing a required parameter")]
    InvalidParameters,
    #[error("Invalid resource specified")]
    InvalidResourceSpecified,
    #[error("Something else went wrong")]
    OperationFailed,
    #[error("Invalid session key, please re-authenticate")]
    InvalidSessionKey,
    #[error("You must be granted a valid key by Last.fm")]
    InvalidApiKey,
    #[error("This service is temporarily offline, try again later")]
    ServiceOffline,
    #[error("This station is only available to paid subscribers")]
    SubscribersOnly,
    #[error("There was a temporary error processing your request")]
    TryAgainLater,
    #[error("There is not enough content to play this station")]
    NotEnoughContent,
    #[error("This group does not have enough members for radio")]
    NotEnoughMembers,
    #[error("This artist does not have enough fans for radio")]
    NotEnoughFans,
    #[error("There are not enough neighbours for radio")]
    NotEnoughNeighbours,
    #[error("The service returned an unknown error code")]
    UnknownError,
    #[error("The service response could not be understood")]
    MalformedResponse,
    #[error("The request never reached the service")]
    TransportFailure,
    #[error("The request was aborted")]
    Aborted,
}

impl WsError {
    /// Maps a service `<error code>` onto the taxonomy.
    ///
    /// Codes the client does not know become [`WsError::UnknownError`].
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => WsError::NoError,
            2 => WsError::InvalidService,
            3 => WsError::InvalidMethod,
            4 => WsError::AuthenticationFailed,
            5 => WsError::InvalidFormat,
            6 => WsError::InvalidParameters,
            7 => WsError::InvalidResourceSpecified,
            8 => WsError::OperationFailed,
            9 => WsError::InvalidSessionKey,
            10 => WsError::InvalidApiKey,
            11 => WsError::ServiceOffline,
            12 => WsError::SubscribersOnly,
            16 => WsError::TryAgainLater,
            20 => WsError::NotEnoughContent,
            21 => WsError::NotEnoughMembers,
            22 => WsError::NotEnoughFans,
            23 => WsError::NotEnoughNeighbours,
            101 => WsError::MalformedResponse,
            102 => WsError::TransportFailure,
            200 => WsError::Aborted,
            _ => WsError::UnknownError,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            WsError::NoError => 1,
            WsError::InvalidService => 2,
            WsError::InvalidMethod => 3,
            WsError::AuthenticationFailed => 4,
            WsError::InvalidFormat => 5,
            WsError::InvalidParameters => 6,
            WsError::InvalidResourceSpecified => 7,
            WsError::OperationFailed => 8,
            WsError::InvalidSessionKey => 9,
            WsError::InvalidApiKey => 10,
            WsError::ServiceOffline => 11,
            WsError::SubscribersOnly => 12,
            WsError::TryAgainLater => 16,
            WsError::NotEnoughContent => 20,
            WsError::NotEnoughMembers => 21,
            WsError::NotEnoughFans => 22,
            WsError::NotEnoughNeighbours => 23,
            WsError::UnknownError => 100,
            WsError::MalformedResponse => 101,
            WsError::TransportFailure => 102,
            WsError::Aborted => 200,
        }
    }

    pub fn is_error(self) -> bool {
        self != WsError::NoError
    }

    /// True only for the code the service uses to ask for a later retry.
    pub fn is_transient(self) -> bool {
        self == WsError::TryAgainLater
    }
}

/// A document field that was absent or had empty text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing or empty field '{path}'")]
pub struct MissingField {
    pub path: String,
}

impl MissingField {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Failures inside [`HttpWsTransport`](crate::HttpWsTransport) before a reply
/// could be classified.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP transport failed: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Response is not a well-formed XML document: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
