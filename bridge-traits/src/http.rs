//! HTTP seam between the protocol crates and the host's network stack.
//!
//! The web-service transport and the scrobble protocol build [`HttpRequest`]s
//! and hand them to whatever [`HttpClient`] the host installed. TLS, pooling
//! and timeouts live in the implementation.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Overrides the client-wide timeout for this request only.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Appends `params` to the URL, url-encoded, after `?` or `&`.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self> {
        let encoded = url_encode(params)?;
        if !encoded.is_empty() {
            self.url.push(if self.url.contains('?') { '&' } else { '?' });
            self.url.push_str(&encoded);
        }
        Ok(self)
    }

    /// Replaces the body with `params` as `application/x-www-form-urlencoded`.
    pub fn form<T: Serialize + ?Sized>(self, params: &T) -> Result<Self> {
        let encoded = url_encode(params)?;
        Ok(self
            .header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(encoded))
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Lossy UTF-8 view of the body; empty when there is none.
    pub fn body_text(&self) -> String {
        match &self.body {
            Some(body) => String::from_utf8_lossy(body).into_owned(),
            None => String::new(),
        }
    }
}

fn url_encode<T: Serialize + ?Sized>(params: &T) -> Result<String> {
    serde_urlencoded::to_string(params)
        .map_err(|e| BridgeError::OperationFailed(format!("URL encoding failed: {}", e)))
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Strict UTF-8 decode of the body.
    pub fn text(&self) -> Result<String> {
        std::str::from_utf8(&self.body)
            .map(str::to_owned)
            .map_err(|e| BridgeError::OperationFailed(format!("Response is not UTF-8: {}", e)))
    }
}

/// Retries for failures that happened before any response arrived.
///
/// Anything the server answered goes back to the caller untouched; retrying
/// a protocol-level refusal is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Double the delay after every retry, capped at `max_delay`.
    pub exponential: bool,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Pause before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        if !self.exponential {
            return self.base_delay.min(self.max_delay);
        }
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            exponential: true,
        }
    }
}

/// Executes requests on behalf of the protocol crates.
///
/// A non-2xx status is a successful call: the web service puts its error
/// documents in 4xx/5xx bodies and the caller needs to read them. Only
/// failures without a response (refused, timed out, TLS) are errors.
///
/// ```ignore
/// let request = HttpRequest::new(HttpMethod::Get, "https://ws.audioscrobbler.com/2.0/")
///     .query(&[("method", "radio.getPlaylist")])?;
/// let body = client.execute(request).await?.text()?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_appended_and_encoded() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com/2.0/")
            .query(&[("method", "radio.tune"), ("station", "lastfm://artist/Sigur Rós")])
            .unwrap();
        assert_eq!(
            request.url,
            "https://example.com/2.0/?method=radio.tune&station=lastfm%3A%2F%2Fartist%2FSigur+R%C3%B3s"
        );

        let request = request.query(&[("rtp", "1")]).unwrap();
        assert!(request.url.ends_with("&rtp=1"));

        let empty: [(&str, &str); 0] = [];
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com/")
            .query(&empty)
            .unwrap();
        assert_eq!(request.url, "https://example.com/");
    }

    #[test]
    fn test_form_sets_body_and_content_type() {
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com")
            .timeout(Duration::from_secs(5))
            .form(&[("s", "abc"), ("a[0]", "Cher")])
            .unwrap();

        assert_eq!(request.body_text(), "s=abc&a%5B0%5D=Cher");
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_response_text_rejects_invalid_utf8() {
        assert_eq!(HttpResponse::new(200, "OK\n").text().unwrap(), "OK\n");
        assert!(HttpResponse::new(200, vec![0xff, 0xfe]).text().is_err());
        assert!(!HttpResponse::new(503, "").is_success());
    }

    #[test]
    fn test_backoff_doubles_up_to_the_cap() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            exponential: true,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
        assert_eq!(policy.delay_for(40), Duration::from_millis(300));

        let flat = RetryPolicy {
            exponential: false,
            ..policy
        };
        assert_eq!(flat.delay_for(4), Duration::from_millis(100));
    }
}
