//! # Event Bus
//!
//! Fan-out of controller notifications over `tokio::sync::broadcast`.
//!
//! Controllers talk to one observer trait object each. Hosts that want
//! several listeners install the event-bus observers from `core-radio` and
//! `core-scrobble`; those turn every callback into a [`CoreEvent`] and emit
//! it here.
//!
//! ```text
//! RadioTuner ──────┐                          ┌──> subscriber
//!                  ├─> EventBus*Observer ──> EventBus
//! Audioscrobbler ──┘                          └──> subscriber
//! ```
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, RadioEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::default();
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Radio(RadioEvent::TitleResolved {
//!     title: "Cher Similar Artists".to_string(),
//! }))
//! .ok();
//!
//! assert_eq!(rx.recv().await.unwrap().description(), "Station title resolved");
//! # }
//! ```
//!
//! A receiver that falls behind gets `RecvError::Lagged(n)` and keeps going;
//! `RecvError::Closed` means every bus clone was dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Per-subscriber buffer used by [`EventBus::default`].
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Radio(RadioEvent),
    Scrobble(ScrobbleEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &'static str {
        match self {
            CoreEvent::Radio(RadioEvent::TitleResolved { .. }) => "Station title resolved",
            CoreEvent::Radio(RadioEvent::TracksAvailable { .. }) => "Tracks available",
            CoreEvent::Radio(RadioEvent::FatalError { .. }) => "Radio session failed",
            CoreEvent::Scrobble(ScrobbleEvent::StatusChanged { is_error: true, .. }) => {
                "Scrobbler error"
            }
            CoreEvent::Scrobble(ScrobbleEvent::StatusChanged { .. }) => "Scrobbler status changed",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Radio(RadioEvent::FatalError { .. }) => EventSeverity::Error,
            CoreEvent::Radio(RadioEvent::TracksAvailable { .. }) => EventSeverity::Debug,
            CoreEvent::Scrobble(ScrobbleEvent::StatusChanged { is_error: true, .. }) => {
                EventSeverity::Warning
            }
            _ => EventSeverity::Info,
        }
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RadioEvent {
    TitleResolved { title: String },
    /// `queued` is the queue length after the append.
    TracksAvailable { queued: usize },
    /// No further tracks will be fetched for this station.
    FatalError { code: u16, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ScrobbleEvent {
    /// `status` is the snake_case status name, e.g. `"bad_time"`.
    StatusChanged { status: String, is_error: bool },
}

/// Cloneable broadcast handle. Every clone emits into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// `capacity` is the number of events a subscriber may lag behind
    /// before it starts missing some. Zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of receivers reached; errors when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// New receivers only see events emitted after this call.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
