//! Read-only ML dataset extraction over detections and track history. The
//! track set is never mutated here; mutation stays inside the tracker.

use radfusecore::schema::{NormalizedDetection, Track};
use serde_json::{json, Value};

pub struct DatasetExtractor;

impl DatasetExtractor {
    /// One flat feature row per detection.
    pub fn extract_tabular(detections: &[NormalizedDetection]) -> Vec<Value> {
        detections
            .iter()
            .map(|detection| {
                json!({
                    "timestamp": detection.timestamp,
                    "sensor_id": detection.sensor_id,
                    "range_m": detection.range_m,
                    "azimuth_deg": detection.azimuth_deg,
                    "elevation_deg": detection.elevation_deg,
                    "doppler_mps": detection.doppler_mps,
                    "snr_db": detection.snr_db,
                    "x": detection.position_enu[0],
                    "y": detection.position_enu[1],
                    "z": detection.position_enu[2],
                    "vx": detection.velocity_enu[0],
                    "vy": detection.velocity_enu[1],
                    "vz": detection.velocity_enu[2],
                })
            })
            .collect()
    }

    /// Sliding windows over each track's detection history for sequence
    /// models, oldest-first within a window. Tracks shorter than the window
    /// are skipped.
    pub fn extract_sequences<'a, I>(tracks: I, window: usize, stride: usize) -> Vec<Value>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut rows = Vec::new();
        if window == 0 {
            return rows;
        }
        for track in tracks {
            if track.history.len() < window {
                continue;
            }
            // History is stored newest-first; sequences read oldest-first.
            let ordered: Vec<&NormalizedDetection> = track.history.iter().rev().collect();
            let mut start = 0;
            while start + window <= ordered.len() {
                for detection in &ordered[start..start + window] {
                    rows.push(json!({
                        "track_id": track.track_id,
                        "window_start": start,
                        "timestamp": detection.timestamp,
                        "x": detection.position_enu[0],
                        "y": detection.position_enu[1],
                        "z": detection.position_enu[2],
                        "vx": detection.velocity_enu[0],
                        "vy": detection.velocity_enu[1],
                        "vz": detection.velocity_enu[2],
                        "range_m": detection.range_m,
                        "doppler_mps": detection.doppler_mps,
                        "snr_db": detection.snr_db,
                        "track_state": track.state,
                    }));
                }
                start += stride.max(1);
            }
        }
        rows
    }
}
