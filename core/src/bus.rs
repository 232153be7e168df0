//! Non-blocking fan-out of per-tick results to downstream subscribers.
//!
//! Built on `tokio::sync::broadcast`: any number of receivers, and a lagging
//! or absent subscriber never blocks the producing tick.

use crate::schema::{NormalizedDetection, TrackSnapshot};
use crate::telemetry::MetricsSnapshot;
use std::sync::Arc;
use tokio::sync::broadcast;

/// One tick's published result. Payloads are shared so fan-out never copies
/// per receiver.
#[derive(Debug, Clone)]
pub struct TickUpdate {
    pub timestamp: f64,
    pub detections: Arc<Vec<NormalizedDetection>>,
    pub tracks: Arc<Vec<TrackSnapshot>>,
    pub status: MetricsSnapshot,
}

pub struct TickBroadcaster {
    sender: broadcast::Sender<TickUpdate>,
}

impl TickBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TickUpdate> {
        self.sender.subscribe()
    }

    /// Publish this tick's result. Returns the number of receivers reached;
    /// publishing with no subscribers is not an error.
    pub fn publish(&self, update: TickUpdate) -> usize {
        self.sender.send(update).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(timestamp: f64) -> TickUpdate {
        TickUpdate {
            timestamp,
            detections: Arc::new(Vec::new()),
            tracks: Arc::new(Vec::new()),
            status: MetricsSnapshot::default(),
        }
    }

    #[test]
    fn subscribers_receive_published_ticks() {
        let bus = TickBroadcaster::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.publish(update(0.1)), 2);
        assert_eq!(first.try_recv().unwrap().timestamp, 0.1);
        assert_eq!(second.try_recv().unwrap().timestamp, 0.1);
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let bus = TickBroadcaster::new(8);
        assert_eq!(bus.publish(update(0.0)), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
