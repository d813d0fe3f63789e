//! Bounded history of periodic dashboard snapshots.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::monitor::{Dashboard, Monitor};

const MAX_SNAPSHOTS: usize = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub dashboard: Dashboard,
}

/// A ring buffer of dashboard snapshots, recorded on a periodic ticker
/// it owns itself. Oldest entries are dropped once the buffer reaches
/// [`MAX_SNAPSHOTS`].
pub struct MetricsHistory {
    entries: RwLock<VecDeque<HistoryEntry>>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(MAX_SNAPSHOTS)),
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    pub fn record(&self, dashboard: Dashboard) {
        let mut entries = self.entries.write();
        if entries.len() >= MAX_SNAPSHOTS {
            entries.pop_front();
        }
        entries.push_back(HistoryEntry {
            recorded_at: Utc::now(),
            dashboard,
        });
    }

    pub fn snapshots(&self) -> Vec<HistoryEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start snapshotting `monitor.dashboard()` on `interval` until
    /// `stop` is called.
    pub async fn start(self: &Arc<Self>, monitor: Arc<Monitor>, interval: Duration) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let history = self.clone();
        let running = self.running.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                history.record(monitor.dashboard());
            }
        });

        *self.handle.lock().await = Some(handle);
    }

    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new()
    }
}
