//! Greedy nearest-neighbor multi-target tracker with a lifecycle state
//! machine. Optimal assignment and multi-hypothesis association are out of
//! scope; the greedy semantics and their tie-break order are deliberate.

use crate::math::geometry::{add, norm, scale, sub};
use crate::schema::{NormalizedDetection, Track, TrackSnapshot, TrackState};
use crate::telemetry::LogManager;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Tracker tuning. An association gate of zero or below disables association
/// entirely; every detection then spawns a fresh track, which is a valid
/// configuration rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub association_gate_m: f64,
    /// Associated detections required before a tentative track confirms.
    pub confirmation_hits: u32,
    /// Ticks a tentative track may miss before it is dropped.
    pub init_timeout_ticks: u32,
    /// Ticks without association before a coasting track is dropped.
    pub coast_timeout_ticks: u32,
    pub history_cap: usize,
    /// Weight kept on the previous velocity estimate during smoothing.
    pub velocity_smoothing: f64,
    /// Advance the predicted position by the velocity estimate before gating.
    pub predict_with_velocity: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            association_gate_m: 100.0,
            confirmation_hits: 3,
            init_timeout_ticks: 3,
            coast_timeout_ticks: 5,
            history_cap: 50,
            velocity_smoothing: 0.7,
            predict_with_velocity: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    track_id: u64,
    detection_index: usize,
}

/// Keep the first assignment per side in tie-break order and report how many
/// duplicates were dropped. A nonzero count is a programming-contract
/// violation upstream, never a property of the data.
pub fn enforce_unique_assignments(assignments: &[(u64, usize)]) -> (Vec<(u64, usize)>, usize) {
    let mut used_tracks = BTreeSet::new();
    let mut used_detections = BTreeSet::new();
    let mut unique = Vec::with_capacity(assignments.len());
    let mut violations = 0;
    for &(track_id, detection_index) in assignments {
        if used_tracks.contains(&track_id) || used_detections.contains(&detection_index) {
            violations += 1;
        } else {
            used_tracks.insert(track_id);
            used_detections.insert(detection_index);
            unique.push((track_id, detection_index));
        }
    }
    (unique, violations)
}

/// Owns the live track set. `update` is the single serialized mutation point;
/// everything else is read-only.
pub struct Tracker {
    config: TrackerConfig,
    tracks: BTreeMap<u64, Track>,
    next_track_id: u64,
    logger: LogManager,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            tracks: BTreeMap::new(),
            next_track_id: 1,
            logger: LogManager::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn tracks(&self) -> &BTreeMap<u64, Track> {
        &self.tracks
    }

    pub fn track(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Confirmed or coasting tracks.
    pub fn active_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .values()
            .filter(|track| matches!(track.state, TrackState::Confirmed | TrackState::Coasting))
    }

    pub fn snapshots(&self) -> Vec<TrackSnapshot> {
        self.tracks.values().map(Track::snapshot).collect()
    }

    /// One tracker step over a tick's complete detection batch. Given an
    /// identical batch and prior track set the outcome is fully
    /// deterministic.
    pub fn update(&mut self, detections: &[NormalizedDetection], timestamp: f64) {
        let proposed = self.associate(detections, timestamp);
        let (assignments, violations) = enforce_unique_assignments(&proposed);
        if violations > 0 {
            if cfg!(debug_assertions) {
                panic!("tracker invariant violated: {violations} duplicate assignments in one tick");
            }
            log::error!(
                "tracker invariant violated: dropping {violations} duplicate assignments, keeping first by tie-break order"
            );
        }

        let mut assigned_tracks = BTreeSet::new();
        let mut assigned_detections = BTreeSet::new();
        for &(track_id, detection_index) in &assignments {
            self.apply_assignment(track_id, &detections[detection_index], timestamp);
            assigned_tracks.insert(track_id);
            assigned_detections.insert(detection_index);
        }

        let mut lost = Vec::new();
        for (id, track) in self.tracks.iter_mut() {
            if assigned_tracks.contains(id) {
                continue;
            }
            track.misses += 1;
            match track.state {
                TrackState::Tentative if track.misses > self.config.init_timeout_ticks => {
                    lost.push(*id);
                }
                TrackState::Confirmed => {
                    track.state = TrackState::Coasting;
                }
                TrackState::Coasting if track.misses > self.config.coast_timeout_ticks => {
                    lost.push(*id);
                }
                _ => {}
            }
        }
        for id in &lost {
            self.tracks.remove(id);
        }

        let mut spawned = 0;
        for (index, detection) in detections.iter().enumerate() {
            if !assigned_detections.contains(&index) {
                self.spawn_track(detection, timestamp);
                spawned += 1;
            }
        }

        self.logger.record(&format!(
            "tracker t={:.1}: {} assigned, {} spawned, {} lost, {} live",
            timestamp,
            assignments.len(),
            spawned,
            lost.len(),
            self.tracks.len()
        ));
    }

    /// Gate, sort, and greedily assign. Ties break by ascending distance,
    /// then track id, then detection index.
    fn associate(&self, detections: &[NormalizedDetection], timestamp: f64) -> Vec<(u64, usize)> {
        if self.config.association_gate_m <= 0.0 {
            return Vec::new();
        }
        let mut candidates = Vec::new();
        for (id, track) in &self.tracks {
            let dt = (timestamp - track.last_updated).max(0.0);
            let predicted = if self.config.predict_with_velocity {
                add(track.position_enu, scale(track.velocity_enu, dt))
            } else {
                track.position_enu
            };
            for (index, detection) in detections.iter().enumerate() {
                let distance = norm(sub(detection.position_enu, predicted));
                if distance <= self.config.association_gate_m {
                    candidates.push(Candidate {
                        distance,
                        track_id: *id,
                        detection_index: index,
                    });
                }
            }
        }
        candidates.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.track_id.cmp(&b.track_id))
                .then(a.detection_index.cmp(&b.detection_index))
        });

        let mut used_tracks = BTreeSet::new();
        let mut used_detections = BTreeSet::new();
        let mut assignments = Vec::new();
        for candidate in candidates {
            if used_tracks.contains(&candidate.track_id)
                || used_detections.contains(&candidate.detection_index)
            {
                continue;
            }
            used_tracks.insert(candidate.track_id);
            used_detections.insert(candidate.detection_index);
            assignments.push((candidate.track_id, candidate.detection_index));
        }
        assignments
    }

    fn apply_assignment(
        &mut self,
        track_id: u64,
        detection: &NormalizedDetection,
        timestamp: f64,
    ) {
        let Some(track) = self.tracks.get_mut(&track_id) else {
            return;
        };
        let dt = timestamp - track.last_updated;
        if dt > 0.0 {
            let measured = scale(sub(detection.position_enu, track.position_enu), 1.0 / dt);
            let alpha = self.config.velocity_smoothing;
            track.velocity_enu = add(
                scale(track.velocity_enu, alpha),
                scale(measured, 1.0 - alpha),
            );
        }
        track.position_enu = detection.position_enu;
        track.history.push_front(detection.clone());
        track.history.truncate(self.config.history_cap);
        track.detection_count += 1;
        track.misses = 0;
        track.last_updated = timestamp;
        match track.state {
            TrackState::Tentative
                if track.detection_count >= u64::from(self.config.confirmation_hits) =>
            {
                track.state = TrackState::Confirmed;
            }
            TrackState::Coasting => {
                track.state = TrackState::Confirmed;
            }
            _ => {}
        }
    }

    fn spawn_track(&mut self, detection: &NormalizedDetection, timestamp: f64) {
        let track_id = self.next_track_id;
        self.next_track_id += 1;
        let mut history = VecDeque::new();
        history.push_front(detection.clone());
        history.truncate(self.config.history_cap.max(1));
        self.tracks.insert(
            track_id,
            Track {
                track_id,
                state: TrackState::Tentative,
                position_enu: detection.position_enu,
                velocity_enu: detection.velocity_enu,
                history,
                detection_count: 1,
                misses: 0,
                last_updated: timestamp,
            },
        );
    }
}
