use crate::schema::detection::NormalizedDetection;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Lifecycle state of a live track. LOST is terminal: a lost track is
/// removed from the set, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackState {
    #[serde(rename = "TENTATIVE")]
    Tentative,
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    #[serde(rename = "COASTING")]
    Coasting,
}

/// One tracked object. Mutated exclusively by `Tracker::update`.
#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: u64,
    pub state: TrackState,
    pub position_enu: [f64; 3],
    pub velocity_enu: [f64; 3],
    /// Contributing detections, newest first, capped by the tracker config.
    pub history: VecDeque<NormalizedDetection>,
    pub detection_count: u64,
    /// Consecutive ticks without an association.
    pub misses: u32,
    pub last_updated: f64,
}

impl Track {
    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            track_id: self.track_id,
            state: self.state,
            position_enu: self.position_enu,
            velocity_enu: self.velocity_enu,
            detection_count: self.detection_count,
            last_updated: self.last_updated,
        }
    }
}

/// Read-only serializable view of a track handed to external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub track_id: u64,
    pub state: TrackState,
    pub position_enu: [f64; 3],
    pub velocity_enu: [f64; 3],
    pub detection_count: u64,
    pub last_updated: f64,
}
