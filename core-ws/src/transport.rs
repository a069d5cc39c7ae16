//! Web-service transport.
//!
//! Controllers talk to the service only through [`WsTransport`]. The
//! production implementation, [`HttpWsTransport`], turns a [`WsRequest`] into
//! an HTTP call, parses the `lfm` envelope and classifies the outcome. It never
//! fails: every problem is folded into the reply's [`WsError`].

use crate::dom::WsDocument;
use crate::error::{Result, TransportError, WsError};
use crate::reply::WsReply;
use crate::request::WsRequest;
use async_trait::async_trait;
use bridge_traits::{HttpClient, HttpMethod, HttpRequest};
use core_runtime::config::{CoreConfig, WsConfig};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Issues web-service calls.
#[async_trait]
pub trait WsTransport: Send + Sync {
    /// Performs the call and classifies the result.
    ///
    /// Timeouts belong to the implementation; the reply for a request that
    /// never reached the service is [`WsError::TransportFailure`].
    async fn issue(&self, request: WsRequest) -> WsReply;
}

/// Adds authentication parameters to an outgoing call.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, method: &str, params: &mut Vec<(String, String)>);
}

/// Signs every call with a fixed API key and optional session key.
#[derive(Clone)]
pub struct StaticKeySigner {
    api_key: String,
    session_key: Option<String>,
}

impl StaticKeySigner {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            session_key: None,
        }
    }

    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn from_config(config: &WsConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            session_key: config.session_key.clone(),
        }
    }
}

impl RequestSigner for StaticKeySigner {
    fn sign(&self, _method: &str, params: &mut Vec<(String, String)>) {
        params.push(("api_key".to_string(), self.api_key.clone()));
        if let Some(sk) = &self.session_key {
            params.push(("sk".to_string(), sk.clone()));
        }
    }
}

/// [`WsTransport`] over an injected [`HttpClient`].
pub struct HttpWsTransport {
    http: Arc<dyn HttpClient>,
    api_root: String,
    signer: Arc<dyn RequestSigner>,
    user_agent: Option<String>,
}

impl HttpWsTransport {
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_root: impl Into<String>,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self {
            http,
            api_root: api_root.into(),
            signer,
            user_agent: None,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            http: Arc::clone(&config.http_client),
            api_root: config.ws.api_root.clone(),
            signer: Arc::new(StaticKeySigner::from_config(&config.ws)),
            user_agent: config.ws.user_agent.clone(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn build_request(&self, request: &WsRequest) -> Result<HttpRequest> {
        let mut params = request.wire_params();
        self.signer.sign(request.method(), &mut params);

        let http_request = HttpRequest::new(request.verb(), self.api_root.as_str());
        let mut http_request = match request.verb() {
            HttpMethod::Get => http_request.query(&params)?,
            HttpMethod::Post => http_request.form(&params)?,
        };

        if let Some(agent) = &self.user_agent {
            http_request = http_request.header("User-Agent", agent.as_str());
        }

        Ok(http_request)
    }

    async fn fetch(&self, request: &WsRequest) -> Result<WsReply> {
        let http_request = self.build_request(request)?;
        let response = self.http.execute(http_request).await?;

        debug!(
            method = request.method(),
            status = response.status,
            bytes = response.body.len(),
            "Web-service response received"
        );

        match WsDocument::parse(&response.body) {
            Ok(document) => Ok(WsReply::from_document(document)),
            // Error documents arrive with 4xx/5xx; anything else unparseable
            // from a failing status is a gateway page, not the service.
            Err(_) if !response.is_success() => Ok(WsReply::failed(WsError::TransportFailure)),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl WsTransport for HttpWsTransport {
    #[instrument(skip(self, request), fields(method = request.method()))]
    async fn issue(&self, request: WsRequest) -> WsReply {
        match self.fetch(&request).await {
            Ok(reply) => {
                if reply.error().is_error() {
                    debug!(error = ?reply.error(), message = reply.message(), "Service reported an error");
                }
                reply
            }
            Err(TransportError::Parse(e)) => {
                warn!(error = %e, "Unparseable web-service response");
                WsReply::failed(WsError::MalformedResponse)
            }
            Err(e) => {
                warn!(error = %e, "Web-service call failed");
                WsReply::failed(WsError::TransportFailure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::HttpResponse;
    use mockall::mock;

    mock! {
        pub Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn transport(http: MockHttp) -> HttpWsTransport {
        HttpWsTransport::new(
            Arc::new(http),
            "https://ws.audioscrobbler.com/2.0/",
            Arc::new(StaticKeySigner::new("apikey").with_session_key("sessionkey")),
        )
    }

    #[tokio::test]
    async fn test_get_sends_signed_query() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.url
                        == "https://ws.audioscrobbler.com/2.0/?method=radio.getPlaylist&rtp=1&api_key=apikey&sk=sessionkey"
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"<lfm status="ok"><playlist/></lfm>"#)));

        let reply = transport(http)
            .issue(WsRequest::get("radio.getPlaylist").flag("rtp", true))
            .await;

        assert_eq!(reply.error(), WsError::NoError);
        assert!(reply.lfm().unwrap().child("playlist").is_ok());
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url == "https://ws.audioscrobbler.com/2.0/"
                    && req.body_text()
                        == "method=radio.tune&station=lastfm%3A%2F%2Fglobaltags%2Fjazz&api_key=apikey&sk=sessionkey"
            })
            .times(1)
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"<lfm status="ok"><station><name>Jazz</name></station></lfm>"#,
                ))
            });

        let reply = transport(http)
            .issue(WsRequest::post("radio.tune").param("station", "lastfm://globaltags/jazz"))
            .await;

        assert_eq!(reply.error(), WsError::NoError);
    }

    #[tokio::test]
    async fn test_error_document_on_http_error_status() {
        let mut http = MockHttp::new();
        http.expect_execute().returning(|_| {
            Ok(HttpResponse::new(
                400,
                r#"<lfm status="failed"><error code="9">Invalid session key</error></lfm>"#,
            ))
        });

        let reply = transport(http).issue(WsRequest::post("radio.tune")).await;
        assert_eq!(reply.error(), WsError::InvalidSessionKey);
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_failure() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::ConnectionFailed("refused".to_string())));

        let reply = transport(http).issue(WsRequest::get("radio.getPlaylist")).await;
        assert_eq!(reply.error(), WsError::TransportFailure);
    }

    #[tokio::test]
    async fn test_gateway_page_and_garbage() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(502, "<html><body>Bad Gateway")));
        let reply = transport(http).issue(WsRequest::get("radio.getPlaylist")).await;
        assert_eq!(reply.error(), WsError::TransportFailure);

        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "not xml at all")));
        let reply = transport(http).issue(WsRequest::get("radio.getPlaylist")).await;
        assert_eq!(reply.error(), WsError::MalformedResponse);
    }

    #[tokio::test]
    async fn test_user_agent_header() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| req.headers.get("User-Agent").map(String::as_str) == Some("lfm-test/1.0"))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"<lfm status="ok"/>"#)));

        let reply = transport(http)
            .with_user_agent("lfm-test/1.0")
            .issue(WsRequest::get("radio.getPlaylist"))
            .await;
        assert_eq!(reply.error(), WsError::NoError);
    }
}
