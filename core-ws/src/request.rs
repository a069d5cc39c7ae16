//! Web-service method calls.

use bridge_traits::HttpMethod;

/// A single web-service method invocation.
///
/// ```
/// use core_ws::WsRequest;
///
/// let request = WsRequest::post("radio.tune").param("station", "lastfm://globaltags/jazz");
/// assert_eq!(request.method(), "radio.tune");
/// assert_eq!(request.get_param("station"), Some("lastfm://globaltags/jazz"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsRequest {
    method: String,
    verb: HttpMethod,
    params: Vec<(String, String)>,
}

impl WsRequest {
    /// A read-only call, sent as a query string.
    pub fn get(method: impl Into<String>) -> Self {
        Self::new(method, HttpMethod::Get)
    }

    /// A call with side effects, sent as a form body.
    pub fn post(method: impl Into<String>) -> Self {
        Self::new(method, HttpMethod::Post)
    }

    fn new(method: impl Into<String>, verb: HttpMethod) -> Self {
        Self {
            method: method.into(),
            verb,
            params: Vec::new(),
        }
    }

    /// Appends a parameter. Later values for the same key are sent too.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends `key=1` when `flag` is set.
    pub fn flag(self, key: impl Into<String>, flag: bool) -> Self {
        if flag {
            self.param(key, "1")
        } else {
            self
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn verb(&self) -> HttpMethod {
        self.verb
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parameters as sent on the wire: `method` first, then the call's own.
    pub(crate) fn wire_params(&self) -> Vec<(String, String)> {
        let mut wire = Vec::with_capacity(self.params.len() + 1);
        wire.push(("method".to_string(), self.method.clone()));
        wire.extend(self.params.iter().cloned());
        wire
    }
}
