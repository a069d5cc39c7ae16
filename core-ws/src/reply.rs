use crate::dom::{WsDocument, WsElement};
use crate::error::{MissingField, WsError};

/// Classified result of a web-service call.
///
/// A reply always carries a classification. The parsed `lfm` envelope is
/// present whenever the service answered with a well-formed document, which
/// includes documents with `status="failed"`.
#[derive(Debug, Clone)]
pub struct WsReply {
    error: WsError,
    message: Option<String>,
    document: Option<WsDocument>,
}

impl WsReply {
    /// Classifies a parsed envelope by its `status` attribute and error code.
    pub fn from_document(document: WsDocument) -> Self {
        let root = document.root();
        if root.name() != "lfm" {
            return Self::failed(WsError::MalformedResponse);
        }

        let (error, message) = match root.attribute("status") {
            Some("ok") => (WsError::NoError, None),
            Some("failed") => match root.child("error") {
                Ok(error) => {
                    let code = error
                        .attribute("code")
                        .and_then(|c| c.trim().parse::<u16>().ok());
                    match code.map(WsError::from_code) {
                        // A failed envelope is never a success, whatever its code says.
                        Some(WsError::NoError) => (WsError::UnknownError, error.text().ok()),
                        Some(mapped) => (mapped, error.text().ok()),
                        None => (WsError::MalformedResponse, None),
                    }
                }
                Err(_) => (WsError::MalformedResponse, None),
            },
            _ => (WsError::MalformedResponse, None),
        };

        Self {
            error,
            message,
            document: Some(document),
        }
    }

    /// A reply that carries no document.
    pub fn failed(error: WsError) -> Self {
        Self {
            error,
            message: None,
            document: None,
        }
    }

    pub fn error(&self) -> WsError {
        self.error
    }

    /// Human-readable message the service attached to its error, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The `lfm` root element.
    pub fn lfm(&self) -> Result<WsElement<'_>, MissingField> {
        self.document
            .as_ref()
            .map(WsDocument::root)
            .ok_or_else(|| MissingField::new("lfm"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(xml: &str) -> WsReply {
        WsReply::from_document(WsDocument::parse(xml.as_bytes()).unwrap())
    }

    #[test]
    fn test_ok_envelope() {
        let reply = reply(
            r#"<lfm status="ok"><station><name>Jazz Tag Radio</name></station></lfm>"#,
        );
        assert_eq!(reply.error(), WsError::NoError);
        assert_eq!(reply.lfm().unwrap().field("station/name").unwrap(), "Jazz Tag Radio");
    }

    #[test]
    fn test_failed_envelope_maps_code() {
        let reply = reply(
            r#"<lfm status="failed"><error code="16">There was a temporary error processing your request</error></lfm>"#,
        );
        assert_eq!(reply.error(), WsError::TryAgainLater);
        assert_eq!(
            reply.message(),
            Some("There was a temporary error processing your request")
        );
        assert!(reply.lfm().is_ok());
    }

    #[test]
    fn test_failed_envelope_with_success_code_is_an_error() {
        let reply = reply(r#"<lfm status="failed"><error code="1">Odd</error></lfm>"#);
        assert_eq!(reply.error(), WsError::UnknownError);
        assert!(reply.error().is_error());
        assert_eq!(reply.message(), Some("Odd"));
    }

    #[test]
    fn test_envelope_without_code_is_malformed() {
        assert_eq!(
            reply(r#"<lfm status="failed"><error>oops</error></lfm>"#).error(),
            WsError::MalformedResponse
        );
        assert_eq!(
            reply(r#"<lfm><station/></lfm>"#).error(),
            WsError::MalformedResponse
        );
        assert_eq!(
            reply(r#"<html><body>502</body></html>"#).error(),
            WsError::MalformedResponse
        );
    }

    #[test]
    fn test_failed_reply_has_no_document() {
        let reply = WsReply::failed(WsError::TransportFailure);
        assert_eq!(reply.lfm().unwrap_err(), MissingField::new("lfm"));
    }
}
