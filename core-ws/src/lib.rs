//! # Web-Service Core
//!
//! Shared plumbing for the radio and scrobble controllers:
//!
//! - [`WsError`] - error taxonomy of the `lfm` web service
//! - [`WsRequest`] / [`WsReply`] - a method call and its classified result
//! - [`WsElement`] - path-based read access to the parsed `lfm` document
//! - [`WsTransport`] - the seam controllers issue calls through, with
//!   [`HttpWsTransport`] as the production implementation
//! - [`Track`] - the unit both controllers deal in
//! - [`Dispatcher`] - single-flight, cancellable request runner
//!
//! XML parsing is delegated to `xmltree`; this crate only navigates the tree.

pub mod dispatch;
pub mod dom;
pub mod error;
pub mod reply;
pub mod request;
pub mod track;
pub mod transport;

pub use dispatch::Dispatcher;
pub use dom::{WsDocument, WsElement};
pub use error::{MissingField, TransportError, WsError};
pub use reply::WsReply;
pub use request::WsRequest;
pub use track::Track;
pub use transport::{HttpWsTransport, RequestSigner, StaticKeySigner, WsTransport};
