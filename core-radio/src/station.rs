use serde::{Deserialize, Serialize};
use std::fmt;

/// A radio station locator (`lastfm://...`) with an optional display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioStation {
    url: String,
    title: Option<String>,
}

impl RadioStation {
    /// Station from an already-formed `lastfm://` URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    pub fn similar_artists(artist: &str) -> Self {
        Self::new(format!("lastfm://artist/{}/similarartists", artist))
    }

    pub fn artist_fans(artist: &str) -> Self {
        Self::new(format!("lastfm://artist/{}/fans", artist))
    }

    pub fn global_tag(tag: &str) -> Self {
        Self::new(format!("lastfm://globaltags/{}", tag))
    }

    pub fn library(user: &str) -> Self {
        Self::new(format!("lastfm://user/{}/personal", user))
    }

    pub fn neighbourhood(user: &str) -> Self {
        Self::new(format!("lastfm://user/{}/neighbours", user))
    }

    pub fn loved_tracks(user: &str) -> Self {
        Self::new(format!("lastfm://user/{}/loved", user))
    }

    pub fn recommendations(user: &str) -> Self {
        Self::new(format!("lastfm://user/{}/recommended", user))
    }

    pub fn playlist(playlist_id: u64) -> Self {
        Self::new(format!("lastfm://playlist/{}", playlist_id))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }
}

impl fmt::Display for RadioStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} ({})", title, self.url),
            None => f.write_str(&self.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_urls() {
        assert_eq!(
            RadioStation::similar_artists("Cher").url(),
            "lastfm://artist/Cher/similarartists"
        );
        assert_eq!(RadioStation::artist_fans("Björk").url(), "lastfm://artist/Björk/fans");
        assert_eq!(RadioStation::global_tag("jazz").url(), "lastfm://globaltags/jazz");
        assert_eq!(RadioStation::library("rj").url(), "lastfm://user/rj/personal");
        assert_eq!(RadioStation::neighbourhood("rj").url(), "lastfm://user/rj/neighbours");
        assert_eq!(RadioStation::loved_tracks("rj").url(), "lastfm://user/rj/loved");
        assert_eq!(RadioStation::recommendations("rj").url(), "lastfm://user/rj/recommended");
        assert_eq!(RadioStation::playlist(2_612_216).url(), "lastfm://playlist/2612216");
    }

    #[test]
    fn test_display_prefers_title() {
        let station = RadioStation::global_tag("jazz");
        assert_eq!(station.to_string(), "lastfm://globaltags/jazz");

        let station = station.with_title("Jazz Tag Radio");
        assert_eq!(station.to_string(), "Jazz Tag Radio (lastfm://globaltags/jazz)");
    }
}
