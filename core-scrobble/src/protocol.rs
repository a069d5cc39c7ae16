//! Audioscrobbler Realtime Submissions Protocol 1.2.1 codec.
//!
//! Three exchanges, all answered with newline-separated plain text:
//!
//! | Exchange    | Request                                  | Reply first line                                |
//! |-------------|------------------------------------------|-------------------------------------------------|
//! | handshake   | `GET ?hs=true&p=1.2.1&c&v&u&t&a`         | `OK`, `BANNED`, `BADAUTH`, `BADTIME`, `FAILED …` |
//! | now playing | `POST s,a,t,b,l,n,m`                     | `OK`, `BADSESSION`, `FAILED …`                   |
//! | submission  | `POST s` + `a[i] t[i] i[i] o[i] r[i] …`  | `OK`, `BADSESSION`, `FAILED …`                   |
//!
//! Everything here is pure: building [`HttpRequest`]s and classifying bodies.

use crate::scrobble::Scrobble;
use bridge_traits::error::Result;
use bridge_traits::{HttpMethod, HttpRequest};
use core_runtime::config::ScrobblerConfig;
use core_ws::Track;

pub const PROTOCOL_VERSION: &str = "1.2.1";

/// Endpoints and id granted by a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub now_playing_url: String,
    pub submission_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeReply {
    Ok(Session),
    /// The client id/version pair has been banned.
    Banned,
    /// Authentication token or session key rejected.
    BadAuth,
    /// The handshake timestamp is too far from server time.
    BadTime,
    /// `FAILED <reason>` or anything unrecognised.
    Failed(String),
}

impl HandshakeReply {
    pub fn parse(body: &str) -> Self {
        let mut lines = body.lines().map(str::trim);

        match lines.next().unwrap_or_default() {
            "OK" => match (lines.next(), lines.next(), lines.next()) {
                (Some(id), Some(np), Some(submit))
                    if !id.is_empty() && !np.is_empty() && !submit.is_empty() =>
                {
                    HandshakeReply::Ok(Session {
                        id: id.to_string(),
                        now_playing_url: np.to_string(),
                        submission_url: submit.to_string(),
                    })
                }
                _ => HandshakeReply::Failed("truncated handshake response".to_string()),
            },
            "BANNED" => HandshakeReply::Banned,
            "BADAUTH" => HandshakeReply::BadAuth,
            "BADTIME" => HandshakeReply::BadTime,
            other => HandshakeReply::Failed(failure_reason(other)),
        }
    }
}

/// Reply to a now-playing notification or a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    Ok,
    BadSession,
    Failed(String),
}

impl SubmitReply {
    pub fn parse(body: &str) -> Self {
        match body.lines().next().map(str::trim).unwrap_or_default() {
            "OK" => SubmitReply::Ok,
            "BADSESSION" => SubmitReply::BadSession,
            other => SubmitReply::Failed(failure_reason(other)),
        }
    }
}

fn failure_reason(line: &str) -> String {
    match line.strip_prefix("FAILED") {
        Some(reason) => reason.trim().to_string(),
        None if line.is_empty() => "empty response".to_string(),
        None => format!("unexpected response: {}", line),
    }
}

/// Handshake request for `timestamp`, with `auth` appended verbatim.
pub fn handshake_request(
    config: &ScrobblerConfig,
    timestamp: i64,
    auth: Vec<(String, String)>,
) -> Result<HttpRequest> {
    let mut params: Vec<(String, String)> = vec![
        ("hs".into(), "true".into()),
        ("p".into(), PROTOCOL_VERSION.into()),
        ("c".into(), config.client_id.clone()),
        ("v".into(), config.client_version.clone()),
        ("u".into(), config.username.clone()),
        ("t".into(), timestamp.to_string()),
    ];
    params.extend(auth);

    HttpRequest::new(HttpMethod::Get, config.handshake_url.as_str()).query(&params)
}

pub fn now_playing_request(session: &Session, track: &Track) -> Result<HttpRequest> {
    let params: Vec<(&str, String)> = vec![
        ("s", session.id.clone()),
        ("a", track.artist().to_string()),
        ("t", track.title().to_string()),
        ("b", track.album().to_string()),
        ("l", seconds(track)),
        ("n", track_number(track)),
        ("m", track.mbid().unwrap_or_default().to_string()),
    ];

    HttpRequest::new(HttpMethod::Post, session.now_playing_url.as_str()).form(&params)
}

/// Submission of `batch`, indexed from zero in cache order.
pub fn submission_request(session: &Session, batch: &[Scrobble]) -> Result<HttpRequest> {
    let mut params: Vec<(String, String)> = Vec::with_capacity(1 + batch.len() * 9);
    params.push(("s".into(), session.id.clone()));

    for (i, scrobble) in batch.iter().enumerate() {
        let track = &scrobble.track;
        params.extend([
            (format!("a[{}]", i), track.artist().to_string()),
            (format!("t[{}]", i), track.title().to_string()),
            (format!("i[{}]", i), scrobble.started_at.timestamp().to_string()),
            (format!("o[{}]", i), scrobble.source_code()),
            (
                format!("r[{}]", i),
                scrobble.rating.map(|r| r.code()).unwrap_or_default().to_string(),
            ),
            (format!("l[{}]", i), seconds(track)),
            (format!("b[{}]", i), track.album().to_string()),
            (format!("n[{}]", i), track_number(track)),
            (format!("m[{}]", i), track.mbid().unwrap_or_default().to_string()),
        ]);
    }

    HttpRequest::new(HttpMethod::Post, session.submission_url.as_str()).form(&params)
}

fn seconds(track: &Track) -> String {
    match track.duration().as_secs() {
        0 => String::new(),
        secs => secs.to_string(),
    }
}

fn track_number(track: &Track) -> String {
    track.track_number().map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrobble::Rating;
    use chrono::DateTime;
    use std::time::Duration;

    fn session() -> Session {
        Session {
            id: "17E61E13454CDD8B68E8D7DEEEDF6170".to_string(),
            now_playing_url: "http://post.audioscrobbler.com:80/np_1.2".to_string(),
            submission_url: "http://post2.audioscrobbler.com:80/protocol_1.2".to_string(),
        }
    }

    #[test]
    fn test_handshake_ok() {
        let reply = HandshakeReply::parse(
            "OK\n17E61E13454CDD8B68E8D7DEEEDF6170\nhttp://post.audioscrobbler.com:80/np_1.2\nhttp://post2.audioscrobbler.com:80/protocol_1.2\n",
        );
        assert_eq!(reply, HandshakeReply::Ok(session()));
    }

    #[test]
    fn test_handshake_errors() {
        assert_eq!(HandshakeReply::parse("BANNED\n"), HandshakeReply::Banned);
        assert_eq!(HandshakeReply::parse("BADAUTH\n"), HandshakeReply::BadAuth);
        assert_eq!(HandshakeReply::parse("BADTIME\n"), HandshakeReply::BadTime);
        assert_eq!(
            HandshakeReply::parse("FAILED Database unavailable\n"),
            HandshakeReply::Failed("Database unavailable".to_string())
        );
        assert_eq!(
            HandshakeReply::parse("OK\nsessionid\n"),
            HandshakeReply::Failed("truncated handshake response".to_string())
        );
        assert!(matches!(
            HandshakeReply::parse("<html>Bad Gateway</html>"),
            HandshakeReply::Failed(_)
        ));
    }

    #[test]
    fn test_submit_reply() {
        assert_eq!(SubmitReply::parse("OK\n"), SubmitReply::Ok);
        assert_eq!(SubmitReply::parse("BADSESSION\n"), SubmitReply::BadSession);
        assert_eq!(
            SubmitReply::parse("FAILED Plugin bug: Not all request variables are set"),
            SubmitReply::Failed("Plugin bug: Not all request variables are set".to_string())
        );
        assert_eq!(
            SubmitReply::parse(""),
            SubmitReply::Failed("empty response".to_string())
        );
    }

    #[test]
    fn test_handshake_request_url() {
        let config = ScrobblerConfig::new("tst", "1.0").with_username("rj");
        let request =
            handshake_request(&config, 1_230_000_000, vec![("a".into(), "d41d8cd9".into())])
                .unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "http://post.audioscrobbler.com/?hs=true&p=1.2.1&c=tst&v=1.0&u=rj&t=1230000000&a=d41d8cd9"
        );
    }

    #[test]
    fn test_now_playing_body() {
        let track = Track::new("Cher", "Believe")
            .with_album("Believe")
            .with_duration(Duration::from_secs(239))
            .with_track_number(1);
        let request = now_playing_request(&session(), &track).unwrap();

        assert_eq!(request.url, "http://post.audioscrobbler.com:80/np_1.2");
        assert_eq!(
            request.body_text(),
            "s=17E61E13454CDD8B68E8D7DEEEDF6170&a=Cher&t=Believe&b=Believe&l=239&n=1&m="
        );
    }

    #[test]
    fn test_submission_body_is_indexed() {
        let started = DateTime::from_timestamp(1_230_000_000, 0).unwrap();
        let batch = vec![
            Scrobble::new(Track::new("Cher", "Believe"), started).with_rating(Rating::Love),
            Scrobble::new(Track::new("Björk", "Jóga").with_auth_code("ad3b3"), started),
        ];
        let request = submission_request(&session(), &batch).unwrap();
        let body = request.body_text();

        assert!(body.starts_with("s=17E61E13454CDD8B68E8D7DEEEDF6170&a%5B0%5D=Cher&t%5B0%5D=Believe"));
        assert!(body.contains("&i%5B0%5D=1230000000&o%5B0%5D=P&r%5B0%5D=L&l%5B0%5D=&"));
        assert!(body.contains("&a%5B1%5D=Bj%C3%B6rk"));
        assert!(body.contains("&o%5B1%5D=Lad3b3&r%5B1%5D=&"));
        assert!(!body.contains("%5B2%5D"));
    }
}
