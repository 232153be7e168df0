use radfusecore::bus::TickUpdate;
use radfusecore::schema::{NormalizedDetection, TrackSnapshot};
use radfusecore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Detections served per tick are capped to keep response payloads bounded.
pub const MAX_DETECTIONS_SERVED: usize = 50;

/// Snapshot of the latest completed tick, served by the HTTP bridge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TickSnapshot {
    pub timestamp: f64,
    pub detections: Vec<NormalizedDetection>,
    pub tracks: Vec<TrackSnapshot>,
    pub status: MetricsSnapshot,
}

impl From<&TickUpdate> for TickSnapshot {
    fn from(update: &TickUpdate) -> Self {
        Self {
            timestamp: update.timestamp,
            detections: update
                .detections
                .iter()
                .take(MAX_DETECTIONS_SERVED)
                .cloned()
                .collect(),
            tracks: update.tracks.as_ref().clone(),
            status: update.status.clone(),
        }
    }
}
