use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A playable (or scrobblable) track.
///
/// Tracks are built once, either by a playlist parser or by the host for
/// scrobbling, and never mutated afterwards.
///
/// ```
/// use core_ws::Track;
/// use std::time::Duration;
///
/// let track = Track::new("Cher", "Believe")
///     .with_album("Believe")
///     .with_duration(Duration::from_secs(239));
/// assert_eq!(track.to_string(), "Cher - Believe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Track {
    artist: String,
    title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    album: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    identifier: String,
    #[serde(default)]
    duration_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mbid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_code: Option<String>,
}

impl Track {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Service-side track identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Whole seconds are kept; sub-second precision is dropped.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_secs = u32::try_from(duration.as_secs()).unwrap_or(u32::MAX);
        self
    }

    pub fn with_track_number(mut self, number: u32) -> Self {
        self.track_number = Some(number);
        self
    }

    pub fn with_mbid(mut self, mbid: impl Into<String>) -> Self {
        self.mbid = Some(mbid.into());
        self
    }

    /// Appends a stream location. The first one added is preferred.
    pub fn with_location(mut self, url: impl Into<String>) -> Self {
        self.locations.push(url.into());
        self
    }

    /// Authorisation code the radio service attaches to each streamed track.
    pub fn with_auth_code(mut self, code: impl Into<String>) -> Self {
        self.auth_code = Some(code.into());
        self
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    pub fn track_number(&self) -> Option<u32> {
        self.track_number
    }

    pub fn mbid(&self) -> Option<&str> {
        self.mbid.as_deref()
    }

    /// Preferred stream location.
    pub fn location(&self) -> Option<&str> {
        self.locations.first().map(String::as_str)
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn auth_code(&self) -> Option<&str> {
        self.auth_code.as_deref()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_location_is_preferred() {
        let track = Track::new("Sigur Rós", "Hoppípolla")
            .with_location("http://play.last.fm/a.mp3")
            .with_location("http://play.last.fm/b.mp3");

        assert_eq!(track.location(), Some("http://play.last.fm/a.mp3"));
        assert_eq!(track.locations().len(), 2);
    }

    #[test]
    fn test_duration_keeps_whole_seconds() {
        let track = Track::new("Cher", "Believe").with_duration(Duration::from_millis(239_800));
        assert_eq!(track.duration(), Duration::from_secs(239));
    }

    #[test]
    fn test_serde_omits_empty_optionals() {
        let track = Track::new("Cher", "Believe");
        let json = serde_json::to_string(&track).unwrap();
        assert_eq!(json, r#"{"artist":"Cher","title":"Believe","duration_secs":0}"#);

        let restored: Track = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, track);
    }
}
