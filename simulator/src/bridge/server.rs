use crate::bridge::model::TickSnapshot;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::thread;
use tokio::runtime::Builder;
use warp::Filter;

/// Hosts the read-only telemetry endpoints over the latest tick snapshot:
/// `GET /status`, `GET /detections`, `GET /tracks`.
#[derive(Clone)]
pub struct Bridge {
    state: Arc<RwLock<TickSnapshot>>,
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(TickSnapshot::default())),
        }
    }

    /// Replace the served state with the latest tick's snapshot.
    pub fn publish(&self, snapshot: TickSnapshot) {
        if let Ok(mut guard) = self.state.write() {
            *guard = snapshot;
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> TickSnapshot {
        self.state.read().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Spawn the HTTP server on its own thread with a current-thread
    /// runtime, leaving the caller's runtime to the simulation loop.
    pub fn serve(&self, addr: SocketAddr) {
        let state = self.state.clone();
        thread::spawn(move || {
            let status_state = state.clone();
            let status_route = warp::path("status").and(warp::get()).map(move || {
                warp::reply::json(
                    &status_state
                        .read()
                        .map(|guard| guard.status.clone())
                        .unwrap_or_default(),
                )
            });

            let detection_state = state.clone();
            let detections_route = warp::path("detections").and(warp::get()).map(move || {
                warp::reply::json(
                    &detection_state
                        .read()
                        .map(|guard| guard.detections.clone())
                        .unwrap_or_default(),
                )
            });

            let track_state = state.clone();
            let tracks_route = warp::path("tracks").and(warp::get()).map(move || {
                warp::reply::json(
                    &track_state
                        .read()
                        .map(|guard| guard.tracks.clone())
                        .unwrap_or_default(),
                )
            });

            let routes = status_route.or(detections_route).or(tracks_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build bridge runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(addr).await;
            });
        });
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
