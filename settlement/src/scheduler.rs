//! The periodic settlement tick.
//!
//! Mirrors the teacher's lock-cleanup background loop: a cancellable
//! tokio task sleeping between ticks, with start/stop driven by a flag
//! the loop checks rather than by aborting the task outright, so a tick
//! already in flight finishes cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::engine::SettlementEngine;

/// Drives [`SettlementEngine::scan_and_trigger`] on a fixed interval
/// until stopped.
pub struct Scheduler {
    engine: Arc<SettlementEngine>,
    interval: Duration,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(engine: Arc<SettlementEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the ticker. A no-op if already running.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(interval_ms = %self.interval.as_millis(), "starting settlement scheduler");

        let engine = self.engine.clone();
        let running = self.running.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                engine.scan_and_trigger().await;
            }
        });

        *self.handle.lock().await = Some(handle);
    }

    /// Signal the ticker to stop and wait for the in-flight tick, if
    /// any, to finish. Does not interrupt an outstanding `Signer` call.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("settlement scheduler stopped");
    }
}
