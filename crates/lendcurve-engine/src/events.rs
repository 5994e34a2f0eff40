//! Event publishers.
//!
//! - [`EventLog`]: keeps every event in memory, for tests and audits
//! - [`TracingPublisher`]: logs each event through `tracing`
//! - [`BroadcastPublisher`]: fans events out to [`EventReceiver`]s

use lendcurve_traits::{EventPublisher, EventReceiver, LendingEvent};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Records published events in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<LendingEvent>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event so far, oldest first.
    pub fn events(&self) -> Vec<LendingEvent> {
        self.events.lock().clone()
    }

    /// Number of events of the given kind (see [`LendingEvent::kind`]).
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<LendingEvent> {
        self.events.lock().last().cloned()
    }

    /// Forgets every event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for EventLog {
    fn publish(&self, event: LendingEvent) {
        self.events.lock().push(event);
    }
}

/// Logs events at `info`, with the full payload at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: LendingEvent) {
        match event.instrument() {
            Some(instrument) => info!(kind = event.kind(), instrument = %instrument, "lending event"),
            None => info!(kind = event.kind(), "lending event"),
        }
        debug!(event = ?event, "lending event payload");
    }
}

/// Broadcasts events to any number of subscribers.
///
/// Slow subscribers lose the oldest events once `capacity` is exceeded.
#[derive(Debug)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<LendingEvent>,
}

impl BroadcastPublisher {
    /// Creates a publisher buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.tx.subscribe())
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(1_024)
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: LendingEvent) {
        // No subscribers is not an error.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendcurve_core::InstrumentId;

    fn cap_set(cap: u128) -> LendingEvent {
        LendingEvent::LendingCapSet {
            instrument: InstrumentId::new("DAI"),
            cap,
        }
    }

    #[test]
    fn test_event_log_counts_by_kind() {
        let log = EventLog::new();
        log.publish(cap_set(1));
        log.publish(cap_set(2));
        log.publish(LendingEvent::RuntimeBoundsSet {
            min_runtime: 1,
            max_runtime: 2,
        });

        assert_eq!(log.count("lending_cap_set"), 2);
        assert_eq!(log.count("runtime_bounds_set"), 1);
        assert_eq!(log.events().len(), 3);

        log.clear();
        assert!(log.last().is_none());
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let publisher = BroadcastPublisher::new(4);
        publisher.publish(cap_set(1));
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_subscribers() {
        let publisher = BroadcastPublisher::new(4);
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();
        publisher.publish(cap_set(7));

        assert_eq!(first.drain(), vec![cap_set(7)]);
        assert_eq!(second.try_recv(), Some(cap_set(7)));
        assert_eq!(second.try_recv(), None);
    }
}
