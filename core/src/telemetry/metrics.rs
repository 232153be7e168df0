use crate::math::stats::StatsHelper;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

const TICK_RATE_WINDOW: usize = 32;

/// Point-in-time pipeline counters reported to status consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub total_detections: u64,
    pub dropped_detections: u64,
    pub sensor_errors: u64,
    pub active_tracks: usize,
    /// Achieved tick rate over a sliding window, Hz.
    pub tick_rate_hz: f64,
}

/// Thread-safe pipeline counters, shared between the runner and any status
/// readers.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    ticks: u64,
    total_detections: u64,
    dropped_detections: u64,
    sensor_errors: u64,
    active_tracks: usize,
    intervals_s: VecDeque<f64>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                ticks: 0,
                total_detections: 0,
                dropped_detections: 0,
                sensor_errors: 0,
                active_tracks: 0,
                intervals_s: VecDeque::with_capacity(TICK_RATE_WINDOW),
            }),
        }
    }

    pub fn record_tick(&self, detections: usize, active_tracks: usize, interval_s: f64) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.ticks += 1;
            metrics.total_detections += detections as u64;
            metrics.active_tracks = active_tracks;
            if interval_s > 0.0 {
                metrics.intervals_s.push_back(interval_s);
                if metrics.intervals_s.len() > TICK_RATE_WINDOW {
                    metrics.intervals_s.pop_front();
                }
            }
        }
    }

    pub fn record_dropped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.dropped_detections += 1;
        }
    }

    pub fn record_sensor_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.sensor_errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(mut metrics) = self.inner.lock() {
            let mean_interval = StatsHelper::mean(metrics.intervals_s.make_contiguous());
            MetricsSnapshot {
                ticks: metrics.ticks,
                total_detections: metrics.total_detections,
                dropped_detections: metrics.dropped_detections,
                sensor_errors: metrics.sensor_errors,
                active_tracks: metrics.active_tracks,
                tick_rate_hz: if mean_interval > 0.0 {
                    1.0 / mean_interval
                } else {
                    0.0
                },
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
