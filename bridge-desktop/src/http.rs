//! `reqwest`-backed [`HttpClient`].

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("lfm-core/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled HTTPS client. Connection-level failures are retried according to
/// its [`RetryPolicy`]; every answered request comes back as a response,
/// whatever the status.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()
            .map(Self::from_client)
            .map_err(|e| BridgeError::NotAvailable(format!("HTTP client unavailable: {}", e)))
    }

    /// Wraps a caller-configured client (proxies, custom roots).
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn prepare(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let builder = request
            .headers
            .into_iter()
            .fold(self.client.request(method, &request.url), |b, (name, value)| {
                b.header(name, value)
            });
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };
        match request.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    async fn attempt(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.prepare(request).send().await.map_err(to_bridge_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response.bytes().await.map_err(to_bridge_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_bridge_error(error: reqwest::Error) -> BridgeError {
    if error.is_timeout() {
        BridgeError::Timeout(error.to_string())
    } else if error.is_connect() {
        BridgeError::ConnectionFailed(error.to_string())
    } else {
        BridgeError::OperationFailed(error.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let attempts = self.retry.max_attempts.max(1);

        for retry in 1..attempts {
            match self.attempt(request.clone()).await {
                Err(e) if e.is_connection_level() => {
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        error = %e,
                        attempt = retry,
                        delay_ms = delay.as_millis() as u64,
                        "No response from server, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }

        debug!(url = %request.url, attempts, "Final HTTP attempt");
        self.attempt(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_can_be_replaced() {
        let client = ReqwestHttpClient::new().unwrap();
        assert_eq!(client.retry, RetryPolicy::default());

        let client = client.with_retry_policy(RetryPolicy::none());
        assert_eq!(client.retry.max_attempts, 1);
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_level() {
        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(2))
            .unwrap()
            .with_retry_policy(RetryPolicy::none());

        // Nothing listens on the discard port on build hosts.
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/");
        let error = client.execute(request).await.unwrap_err();
        assert!(error.is_connection_level(), "unexpected error: {error}");
    }
}
