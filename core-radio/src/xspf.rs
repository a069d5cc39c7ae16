//! XSPF playlist parsing.
//!
//! `radio.getPlaylist` answers with an XSPF document inside the `lfm`
//! envelope:
//!
//! ```text
//! <playlist>
//!   <title>Cher Similar Artists</title>
//!   <trackList>
//!     <track>
//!       <location>http://play.last.fm/user/....mp3</location>
//!       <title>Believe</title>
//!       <identifier>8212510</identifier>
//!       <album>Believe</album>
//!       <creator>Cher</creator>
//!       <duration>239000</duration>
//!       <extension application="http://www.last.fm">
//!         <trackauth>ad3b3</trackauth>
//!       </extension>
//!     </track>
//!   </trackList>
//! </playlist>
//! ```

use core_ws::{MissingField, Track, WsElement};
use std::time::Duration;
use tracing::warn;

/// Tracks of a `<playlist>` element, in document order.
///
/// A missing `trackList` is an error. Individual tracks without a playable
/// location are skipped, so the result may be empty.
pub fn parse_playlist(playlist: WsElement<'_>) -> Result<Vec<Track>, MissingField> {
    let track_list = playlist.child("trackList")?;

    let tracks = track_list
        .children("track")
        .filter_map(|element| {
            let track = parse_track(element);
            if track.is_none() {
                warn!(
                    title = %element.optional_field("title").unwrap_or_default(),
                    "Skipping playlist entry without a location"
                );
            }
            track
        })
        .collect();

    Ok(tracks)
}

fn parse_track(element: WsElement<'_>) -> Option<Track> {
    let locations: Vec<String> = element
        .children("location")
        .filter_map(|location| location.text().ok())
        .collect();
    if locations.is_empty() {
        return None;
    }

    let mut track = Track::new(
        element.optional_field("creator").unwrap_or_default(),
        element.optional_field("title").unwrap_or_default(),
    );

    for location in locations {
        track = track.with_location(location);
    }
    if let Some(album) = element.optional_field("album") {
        track = track.with_album(album);
    }
    if let Some(identifier) = element.optional_field("identifier") {
        track = track.with_identifier(identifier);
    }
    if let Some(ms) = element
        .optional_field("duration")
        .and_then(|d| d.parse::<u64>().ok())
    {
        track = track.with_duration(Duration::from_millis(ms));
    }
    if let Some(auth) = element.optional_field("extension/trackauth") {
        track = track.with_auth_code(auth);
    }

    Some(track)
}
