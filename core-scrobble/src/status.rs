use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress and error codes reported by an [`Audioscrobbler`](crate::Audioscrobbler).
///
/// The first four are progress. The rest are soft errors: while one is in
/// effect nothing is sent to the server (now-playing included), but tracks
/// keep being cached until [`rehandshake`](crate::Audioscrobbler::rehandshake)
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrobbleStatus {
    Connecting,
    Handshaken,
    Scrobbling,
    TracksScrobbled,

    BadSession,
    BannedClientVersion,
    InvalidSessionKey,
    BadTime,
    ThreeHardFailures,
}

impl ScrobbleStatus {
    /// Stable numeric code; error codes start where progress codes end.
    pub fn code(self) -> u32 {
        match self {
            ScrobbleStatus::Connecting => 0,
            ScrobbleStatus::Handshaken => 1,
            ScrobbleStatus::Scrobbling => 2,
            ScrobbleStatus::TracksScrobbled => 3,
            ScrobbleStatus::BadSession => 4,
            ScrobbleStatus::BannedClientVersion => 5,
            ScrobbleStatus::InvalidSessionKey => 6,
            ScrobbleStatus::BadTime => 7,
            ScrobbleStatus::ThreeHardFailures => 8,
        }
    }

    pub fn is_error(self) -> bool {
        self.code() >= ScrobbleStatus::BadSession.code()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScrobbleStatus::Connecting => "connecting",
            ScrobbleStatus::Handshaken => "handshaken",
            ScrobbleStatus::Scrobbling => "scrobbling",
            ScrobbleStatus::TracksScrobbled => "tracks_scrobbled",
            ScrobbleStatus::BadSession => "bad_session",
            ScrobbleStatus::BannedClientVersion => "banned_client_version",
            ScrobbleStatus::InvalidSessionKey => "invalid_session_key",
            ScrobbleStatus::BadTime => "bad_time",
            ScrobbleStatus::ThreeHardFailures => "three_hard_failures",
        }
    }
}

impl fmt::Display for ScrobbleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
