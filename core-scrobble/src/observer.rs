//! Scrobble status notifications.

use crate::status::ScrobbleStatus;
use core_runtime::events::{CoreEvent, EventBus, ScrobbleEvent};
use tracing::trace;

/// Receives every status the scrobbler reports.
///
/// Called on the task driving the scrobbler; must not block.
pub trait ScrobbleObserver: Send + Sync {
    fn on_status_changed(&self, _status: ScrobbleStatus) {}
}

/// Observer that ignores everything.
pub struct NullScrobbleObserver;

impl ScrobbleObserver for NullScrobbleObserver {}

/// Publishes statuses on the runtime [`EventBus`].
#[derive(Debug, Clone)]
pub struct EventBusScrobbleObserver {
    bus: EventBus,
}

impl EventBusScrobbleObserver {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl ScrobbleObserver for EventBusScrobbleObserver {
    fn on_status_changed(&self, status: ScrobbleStatus) {
        let event = ScrobbleEvent::StatusChanged {
            status: status.as_str().to_string(),
            is_error: status.is_error(),
        };
        if self.bus.emit(CoreEvent::Scrobble(event)).is_err() {
            trace!("No event subscribers for scrobble status");
        }
    }
}
