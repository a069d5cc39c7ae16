//! Integration tests for issuing web-service calls through the dispatcher
//!
//! These tests drive `HttpWsTransport` with a scripted HTTP client and verify:
//! - Completions come back tagged with the kind they were dispatched as
//! - A kind cannot be dispatched twice while pending
//! - Service error documents and transport failures are both plain replies

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_ws::{
    Dispatcher, HttpWsTransport, StaticKeySigner, WsError, WsReply, WsRequest, WsTransport,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// HTTP client answering from a script, recording every request it sees.
#[derive(Default)]
struct ScriptedHttp {
    replies: Mutex<VecDeque<BridgeResult<HttpResponse>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttp {
    fn push_body(&self, status: u16, body: &'static str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, Bytes::from_static(body.as_bytes()))));
    }

    fn push_error(&self, error: BridgeError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    fn methods_seen(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|req| {
                let text = if req.body.is_some() {
                    req.body_text()
                } else {
                    req.url.clone()
                };
                text.split(|c| c == '?' || c == '&')
                    .find_map(|pair| pair.strip_prefix("method="))
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BridgeError::NotAvailable("script exhausted".to_string())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Call {
    Tune,
    Playlist,
}

fn transport(http: Arc<ScriptedHttp>) -> Arc<HttpWsTransport> {
    Arc::new(HttpWsTransport::new(
        http,
        "https://ws.audioscrobbler.com/2.0/",
        Arc::new(StaticKeySigner::new("apikey")),
    ))
}

#[tokio::test]
async fn test_completions_are_tagged_with_their_kind() {
    let http = Arc::new(ScriptedHttp::default());
    http.push_body(
        200,
        r#"<lfm status="ok"><station><name>Cher Similar Artists</name></station></lfm>"#,
    );
    let transport = transport(Arc::clone(&http));

    let mut dispatcher = Dispatcher::new(|_: Call| WsReply::failed(WsError::TransportFailure));
    let ws = Arc::clone(&transport);
    assert!(dispatcher.dispatch(Call::Tune, async move {
        ws.issue(WsRequest::post("radio.tune").param("station", "lastfm://artist/Cher/similarartists"))
            .await
    }));

    let ws = Arc::clone(&transport);
    assert!(!dispatcher.dispatch(Call::Tune, async move {
        ws.issue(WsRequest::post("radio.tune")).await
    }));

    let (kind, reply) = dispatcher.next().await.unwrap();
    assert_eq!(kind, Call::Tune);
    assert_eq!(reply.error(), WsError::NoError);
    assert_eq!(
        reply.lfm().unwrap().field("station/name").unwrap(),
        "Cher Similar Artists"
    );
    assert_eq!(http.methods_seen(), vec!["radio.tune"]);
}

#[tokio::test]
async fn test_failures_arrive_as_replies() {
    let http = Arc::new(ScriptedHttp::default());
    http.push_body(
        503,
        r#"<lfm status="failed"><error code="11">Service temporarily unavailable</error></lfm>"#,
    );
    http.push_error(BridgeError::Timeout("30s elapsed".to_string()));
    let transport = transport(Arc::clone(&http));

    let mut dispatcher = Dispatcher::new(|_: Call| WsReply::failed(WsError::TransportFailure));

    let ws = Arc::clone(&transport);
    dispatcher.dispatch(Call::Tune, async move {
        ws.issue(WsRequest::post("radio.tune")).await
    });
    let (_, reply) = dispatcher.next().await.unwrap();
    assert_eq!(reply.error(), WsError::ServiceOffline);
    assert_eq!(reply.message(), Some("Service temporarily unavailable"));

    let ws = Arc::clone(&transport);
    dispatcher.dispatch(Call::Playlist, async move {
        ws.issue(WsRequest::get("radio.getPlaylist").flag("rtp", true))
            .await
    });
    let (kind, reply) = dispatcher.next().await.unwrap();
    assert_eq!(kind, Call::Playlist);
    assert_eq!(reply.error(), WsError::TransportFailure);

    assert_eq!(http.methods_seen(), vec!["radio.tune", "radio.getPlaylist"]);
}
