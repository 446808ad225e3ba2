//! Position source: one-shot acquisition and continuous watch.
//!
//! Wraps a platform location backend behind the `LocationBackend` trait and
//! fans delivered fixes out on a broadcast channel so the session controller
//! and the map surface consume one stream instead of threading a raw
//! callback through every consumer.

use crate::position::types::{PositionConfig, PositionError, PositionFix, PositionSourceState};
use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex as TokioMutex};

/// Capacity of the fix broadcast channel. Consumers that lag behind simply
/// miss old fixes; only the freshest matter.
const FIX_CHANNEL_CAPACITY: usize = 32;

/// A platform location capability: produces one fresh fix per request.
pub trait LocationBackend: Send + 'static {
    /// Request a fresh fix. Never returns a cached position.
    fn acquire_fix(
        &mut self,
    ) -> impl Future<Output = Result<PositionFix, PositionError>> + Send;
}

/// Owns position acquisition, the active watch, and the shared
/// latest-fix observable.
pub struct PositionSource<B: LocationBackend> {
    config: PositionConfig,
    backend: Arc<TokioMutex<B>>,
    state: Arc<Mutex<PositionSourceState>>,
    latest: Arc<Mutex<Option<PositionFix>>>,
    fix_tx: broadcast::Sender<PositionFix>,
    /// Bumped on every watch start/stop; a watch task only delivers while
    /// its captured generation is still current.
    watch_generation: Arc<AtomicU64>,
}

impl<B: LocationBackend> PositionSource<B> {
    /// Create a position source over a backend.
    pub fn new(config: PositionConfig, backend: B) -> Self {
        let (fix_tx, _) = broadcast::channel(FIX_CHANNEL_CAPACITY);
        Self {
            config,
            backend: Arc::new(TokioMutex::new(backend)),
            state: Arc::new(Mutex::new(PositionSourceState::Idle)),
            latest: Arc::new(Mutex::new(None)),
            fix_tx,
            watch_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PositionSourceState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The most recently delivered fix, if any.
    pub fn latest_fix(&self) -> Option<PositionFix> {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to the continuous fix stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PositionFix> {
        self.fix_tx.subscribe()
    }

    /// Request a single fresh fix with a bounded timeout.
    ///
    /// Never serves a cached fix: the backend is asked every time.
    pub async fn get_current_position(&self) -> Result<PositionFix, PositionError> {
        self.set_state(PositionSourceState::Acquiring);
        tracing::debug!("Acquiring one-shot position fix");

        let timeout = Duration::from_secs(self.config.acquire_timeout_secs);
        let result = {
            let mut backend = self.backend.lock().await;
            tokio::time::timeout(timeout, backend.acquire_fix()).await
        };

        match result {
            Ok(Ok(fix)) => {
                self.store_fix(fix);
                self.set_state(PositionSourceState::Available);
                Ok(fix)
            }
            Ok(Err(err)) => {
                tracing::warn!("Position acquisition failed: {}", err);
                self.set_state(PositionSourceState::Error);
                Err(err)
            }
            Err(_) => {
                tracing::warn!(
                    "Position acquisition timed out after {}s",
                    self.config.acquire_timeout_secs
                );
                self.set_state(PositionSourceState::Error);
                Err(PositionError::Timeout)
            }
        }
    }

    /// Begin continuous fix delivery on the broadcast channel.
    ///
    /// Only one watch is active per source; starting a new one implicitly
    /// cancels any prior. Returns a receiver for the stream.
    pub fn watch(&self) -> broadcast::Receiver<PositionFix> {
        let generation = self.watch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(PositionSourceState::Watching);
        tracing::info!("Starting position watch (generation {})", generation);

        // Subscribe before spawning so the first fix cannot be missed
        let rx = self.fix_tx.subscribe();

        let backend = self.backend.clone();
        let state = self.state.clone();
        let latest = self.latest.clone();
        let fix_tx = self.fix_tx.clone();
        let watch_generation = self.watch_generation.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let per_fix_timeout = Duration::from_secs(config.watch_timeout_secs);
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let max_staleness = chrono::Duration::seconds(config.max_staleness_secs as i64);

            loop {
                if watch_generation.load(Ordering::SeqCst) != generation {
                    tracing::debug!("Watch generation {} superseded, exiting", generation);
                    break;
                }

                let result = {
                    let mut backend = backend.lock().await;
                    tokio::time::timeout(per_fix_timeout, backend.acquire_fix()).await
                };

                // Re-check after the await: stop_watching() may have run
                // while the fix was in flight. No delivery after stop.
                if watch_generation.load(Ordering::SeqCst) != generation {
                    break;
                }

                match result {
                    Ok(Ok(fix)) => {
                        if Utc::now() - fix.timestamp > max_staleness {
                            tracing::debug!("Dropping stale fix from {}", fix.timestamp);
                        } else {
                            *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(fix);
                            let _ = fix_tx.send(fix);
                        }
                    }
                    Ok(Err(PositionError::PermissionDenied)) => {
                        tracing::warn!("Location permission revoked, stopping watch");
                        *state.lock().unwrap_or_else(|e| e.into_inner()) =
                            PositionSourceState::Error;
                        break;
                    }
                    Ok(Err(err)) => {
                        // Transient platform failure: keep watching
                        tracing::warn!("Watch fix failed: {}", err);
                    }
                    Err(_) => {
                        tracing::warn!("Watch fix timed out after {:?}", per_fix_timeout);
                    }
                }

                tokio::time::sleep(poll_interval).await;
            }
        });

        rx
    }

    /// Stop the active watch. Idempotent; safe when not watching.
    pub fn stop_watching(&self) {
        self.watch_generation.fetch_add(1, Ordering::SeqCst);
        if self.state() == PositionSourceState::Watching {
            self.set_state(PositionSourceState::Stopped);
            tracing::info!("Position watch stopped");
        }
    }

    fn store_fix(&self, fix: PositionFix) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(fix);
    }

    fn set_state(&self, next: PositionSourceState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }
}
