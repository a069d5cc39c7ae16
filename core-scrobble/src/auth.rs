//! Handshake authentication.
//!
//! The protocol authenticates with `a=md5(md5(password) + t)` for standard
//! clients, or additionally `api_key` and `sk` for web-service authenticated
//! ones. Computing the token is the host's business; the scrobbler only asks
//! for the parameters matching the handshake timestamp.

/// Supplies the authentication parameters of a handshake.
pub trait HandshakeAuth: Send + Sync {
    /// Parameters for a handshake stamped with `timestamp` (Unix seconds).
    fn params(&self, timestamp: i64) -> Vec<(String, String)>;
}

impl<F> HandshakeAuth for F
where
    F: Fn(i64) -> Vec<(String, String)> + Send + Sync,
{
    fn params(&self, timestamp: i64) -> Vec<(String, String)> {
        self(timestamp)
    }
}

/// Fixed, precomputed credentials.
#[derive(Clone)]
pub struct StaticHandshakeAuth {
    token: String,
    api_key: Option<String>,
    session_key: Option<String>,
}

impl StaticHandshakeAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_key: None,
            session_key: None,
        }
    }

    /// Adds web-service credentials (`api_key` and `sk`).
    pub fn with_web_service_keys(
        mut self,
        api_key: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.session_key = Some(session_key.into());
        self
    }
}

impl std::fmt::Debug for StaticHandshakeAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticHandshakeAuth")
            .field("token", &"[REDACTED]")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("session_key", &self.session_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HandshakeAuth for StaticHandshakeAuth {
    fn params(&self, _timestamp: i64) -> Vec<(String, String)> {
        let mut params = vec![("a".to_string(), self.token.clone())];
        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        if let Some(sk) = &self.session_key {
            params.push(("sk".to_string(), sk.clone()));
        }
        params
    }
}
