//! Radio session notifications.

use core_runtime::events::{CoreEvent, EventBus, RadioEvent};
use core_ws::WsError;
use tracing::trace;

/// Receives the outcome of a radio session.
///
/// Callbacks run on the task that drives the tuner and must not block.
pub trait RadioObserver: Send + Sync {
    /// The service resolved the station's display name.
    fn on_title_resolved(&self, _title: &str) {}

    /// A batch was appended; `queued` tracks are now waiting.
    fn on_tracks_available(&self, _queued: usize) {}

    /// The session stopped fetching for good.
    fn on_fatal_error(&self, _error: WsError) {}
}

/// Observer that ignores everything.
pub struct NullRadioObserver;

impl RadioObserver for NullRadioObserver {}

/// Publishes radio notifications on the runtime [`EventBus`].
#[derive(Debug, Clone)]
pub struct EventBusRadioObserver {
    bus: EventBus,
}

impl EventBusRadioObserver {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    fn publish(&self, event: RadioEvent) {
        if self.bus.emit(CoreEvent::Radio(event)).is_err() {
            trace!("No event subscribers for radio notification");
        }
    }
}

impl RadioObserver for EventBusRadioObserver {
    fn on_title_resolved(&self, title: &str) {
        self.publish(RadioEvent::TitleResolved {
            title: title.to_string(),
        });
    }

    fn on_tracks_available(&self, queued: usize) {
        self.publish(RadioEvent::TracksAvailable { queued });
    }

    fn on_fatal_error(&self, error: WsError) {
        self.publish(RadioEvent::FatalError {
            code: error.code(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_observer_publishes() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let observer = EventBusRadioObserver::new(bus.clone());

        observer.on_title_resolved("Jazz Tag Radio");
        observer.on_tracks_available(5);
        observer.on_fatal_error(WsError::NotEnoughContent);

        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Radio(RadioEvent::TitleResolved {
                title: "Jazz Tag Radio".to_string()
            })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Radio(RadioEvent::TracksAvailable { queued: 5 })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Radio(RadioEvent::FatalError {
                code: 20,
                message: "There is not enough content to play this station".to_string()
            })
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let observer = EventBusRadioObserver::new(EventBus::new(1));
        observer.on_tracks_available(1);
    }
}
