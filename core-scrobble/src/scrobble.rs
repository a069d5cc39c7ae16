use chrono::{DateTime, Utc};
use core_ws::Track;
use serde::{Deserialize, Serialize};

/// Where a played track came from, as reported in the `o[i]` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaySource {
    /// Chosen by the user.
    #[default]
    UserChosen,
    /// Non-personalised broadcast, e.g. a shoutcast stream.
    Broadcast,
    /// Personalised recommendation other than Last.fm radio.
    Recommendation,
    /// Last.fm radio; submitted with the track's auth code.
    LastFm,
    Unknown,
}

impl PlaySource {
    fn code(self) -> char {
        match self {
            PlaySource::UserChosen => 'P',
            PlaySource::Broadcast => 'R',
            PlaySource::Recommendation => 'E',
            PlaySource::LastFm => 'L',
            PlaySource::Unknown => 'U',
        }
    }
}

/// User feedback given while the track played (`r[i]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Love,
    /// Only valid for Last.fm radio tracks.
    Ban,
    /// Only valid for Last.fm radio tracks.
    Skip,
}

impl Rating {
    pub fn code(self) -> &'static str {
        match self {
            Rating::Love => "L",
            Rating::Ban => "B",
            Rating::Skip => "S",
        }
    }
}

/// A finished play waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scrobble {
    pub track: Track,
    /// When playback started.
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub source: PlaySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Scrobble {
    /// A play of `track` that started at `started_at`.
    ///
    /// Tracks carrying a radio auth code default to [`PlaySource::LastFm`].
    pub fn new(track: Track, started_at: DateTime<Utc>) -> Self {
        let source = if track.auth_code().is_some() {
            PlaySource::LastFm
        } else {
            PlaySource::UserChosen
        };
        Self {
            track,
            started_at,
            source,
            rating: None,
        }
    }

    pub fn with_source(mut self, source: PlaySource) -> Self {
        self.source = source;
        self
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Wire value of `o[i]`: the source letter, followed by the auth code for
    /// Last.fm radio.
    pub fn source_code(&self) -> String {
        let mut code = self.source.code().to_string();
        if self.source == PlaySource::LastFm {
            code.push_str(self.track.auth_code().unwrap_or_default());
        }
        code
    }
}
