//! Session Controller
//!
//! Owns the keep-awake session and performs every mode transition:
//!
//! ```text
//! Idle --start(ok)--> NativeLock --stop / revoke--> Idle
//! Idle --start(fail)--> Fallback --stop--> Idle
//! ```
//!
//! Platform calls are awaited outside the state lock. A `pending` marker is set
//! before each await so overlapping `start()`/`stop()` calls cannot interleave.

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::events::{Notice, SessionEvent};
use super::state::{Mode, Pending, SessionState, StatusSnapshot};
use crate::config::{FallbackConfig, KeepAwakeConfig};
use crate::error::WakeError;
use crate::fallback::{ActivitySimulator, ScrollOffset, Viewport};
use crate::platform::{Capability, CapabilityProvider, LockKind, WakeLockSentinel};

struct Inner {
    state: Mutex<SessionState>,
    capability: Arc<dyn CapabilityProvider>,
    activity: ActivitySimulator,
    fallback_config: FallbackConfig,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Inner {
    fn transition(&self, state: &mut SessionState, mode: Mode) {
        let old_mode = state.mode;
        state.set_mode(mode);
        info!("Session {} -> {} ({})", old_mode, mode, mode.status_text());

        let _ = self.event_tx.send(SessionEvent::StatusChanged {
            old_mode,
            new_mode: mode,
            status: mode.status_text().to_string(),
        });
    }
}

/// Controller for the single keep-awake session. Clones share the session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Create a controller whose viewport nudges are published as events
    pub fn new(config: &KeepAwakeConfig, capability: Arc<dyn CapabilityProvider>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let viewport = Arc::new(ScrollOffset::new(event_tx.clone()));
        Self::build(config, capability, viewport, event_tx)
    }

    /// Create a controller with a custom viewport sink
    pub fn with_viewport(
        config: &KeepAwakeConfig,
        capability: Arc<dyn CapabilityProvider>,
        viewport: Arc<dyn Viewport>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self::build(config, capability, viewport, event_tx)
    }

    fn build(
        config: &KeepAwakeConfig,
        capability: Arc<dyn CapabilityProvider>,
        viewport: Arc<dyn Viewport>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let activity = ActivitySimulator::new(&config.fallback.pattern, viewport, event_tx.clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::new()),
                capability,
                activity,
                fallback_config: config.fallback.clone(),
                event_tx,
            }),
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn mode(&self) -> Mode {
        self.inner.state.lock().mode
    }

    pub fn status(&self) -> &'static str {
        self.mode().status_text()
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().is_active()
    }

    /// Current activity log text
    pub fn log_text(&self) -> String {
        self.inner.activity.text()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let log = self.inner.activity.text();
        let read_position = self.inner.activity.read_position();
        let state = self.inner.state.lock();
        StatusSnapshot::new(&state, log, read_position)
    }

    /// Start keeping the display awake. No effect unless idle.
    pub async fn start(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.mode != Mode::Idle || state.pending.is_some() {
                debug!(
                    "Ignoring start: mode={} pending={:?}",
                    state.mode, state.pending
                );
                return;
            }
            state.pending = Some(Pending::Starting {
                cancel_requested: false,
            });
        }

        let capability = self.inner.capability.resolve();
        debug!("Resolved capability: {:?}", capability);

        let outcome = match capability {
            Capability::Available(api) => api.request(LockKind::Screen).await,
            Capability::Unavailable => Err(WakeError::CapabilityUnavailable),
        };

        match outcome {
            Ok(sentinel) => self.enter_native(sentinel).await,
            Err(e) => self.enter_fallback(e),
        }
    }

    /// Stop whichever strategy is active. Safe to call from any mode.
    pub async fn stop(&self) {
        let sentinel = {
            let mut state = self.inner.state.lock();
            let pending = state.pending;
            match pending {
                Some(Pending::Starting { .. }) => {
                    debug!("Stop requested while start is pending");
                    state.pending = Some(Pending::Starting {
                        cancel_requested: true,
                    });
                    return;
                }
                Some(Pending::Stopping) => {
                    debug!("Ignoring stop: release already in flight");
                    return;
                }
                None => {}
            }

            match state.mode {
                Mode::Idle => {
                    debug!("Ignoring stop: session is idle");
                    return;
                }
                Mode::Fallback => {
                    state.fallback.stop();
                    self.inner.activity.reset();
                    self.inner.transition(&mut state, Mode::Idle);
                    return;
                }
                Mode::NativeLock => {
                    if let Some(listener) = state.revocation.take() {
                        listener.abort();
                    }
                    state.pending = Some(Pending::Stopping);
                    state.sentinel.take()
                }
            }
        };

        self.finish_native_stop(sentinel).await;
    }

    /// `stop()` if active, otherwise `start()`
    pub async fn toggle(&self) {
        if self.is_active() {
            self.stop().await;
        } else {
            self.start().await;
        }
    }

    /// Teardown hook: release everything the session holds
    pub async fn shutdown(&self) {
        info!("Shutting down keep-awake session");
        self.stop().await;
    }

    async fn enter_native(&self, sentinel: Arc<dyn WakeLockSentinel>) {
        {
            let mut state = self.inner.state.lock();
            let cancelled = matches!(
                state.pending,
                Some(Pending::Starting {
                    cancel_requested: true
                })
            );

            if !cancelled {
                state.pending = None;
                state.generation += 1;
                let listener = self.spawn_revocation_listener(sentinel.clone(), state.generation);
                state.sentinel = Some(sentinel);
                state.revocation = Some(listener);
                self.inner.transition(&mut state, Mode::NativeLock);
                return;
            }

            state.pending = Some(Pending::Stopping);
        }

        info!("Start was cancelled while pending, releasing the acquired lock");
        self.finish_native_stop(Some(sentinel)).await;
    }

    fn enter_fallback(&self, err: WakeError) {
        match &err {
            WakeError::CapabilityUnavailable => info!("{}, using fallback activity", err),
            _ => warn!("Wake lock failed: {}", err),
        }

        let mut state = self.inner.state.lock();
        let cancelled = matches!(
            state.pending,
            Some(Pending::Starting {
                cancel_requested: true
            })
        );
        state.pending = None;

        if cancelled {
            debug!("Start was cancelled while pending");
            self.inner.transition(&mut state, Mode::Idle);
            return;
        }

        let period = self.inner.fallback_config.draw_interval();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        state.fallback.start(period, move || {
            if let Some(inner) = weak.upgrade() {
                // A tick racing a stop must not touch the cleared log
                let state = inner.state.lock();
                if state.mode == Mode::Fallback {
                    inner.activity.tick();
                }
            }
        });
        info!("Fallback activity every {}ms", period.as_millis());

        self.inner.transition(&mut state, Mode::Fallback);
    }

    async fn finish_native_stop(&self, sentinel: Option<Arc<dyn WakeLockSentinel>>) {
        if let Some(sentinel) = sentinel {
            if sentinel.released() {
                debug!("Wake lock already released");
            } else if let Err(e) = sentinel.release().await {
                error!("Error releasing wake lock: {}", e);
            }
        }

        let mut state = self.inner.state.lock();
        state.pending = None;
        self.inner.transition(&mut state, Mode::Idle);
    }

    /// Listen for release notifications on one acquisition. The subscription
    /// is taken before returning so no notification is missed.
    fn spawn_revocation_listener(
        &self,
        sentinel: Arc<dyn WakeLockSentinel>,
        generation: u64,
    ) -> JoinHandle<()> {
        let mut rx = sentinel.subscribe();
        let weak = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(_) => {
                        if !sentinel.released() {
                            debug!("Ignoring release notification for a held lock");
                            continue;
                        }
                        if let Some(inner) = weak.upgrade() {
                            SessionController { inner }.handle_revocation(generation).await;
                        }
                        break;
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn handle_revocation(&self, generation: u64) {
        let sentinel = {
            let mut state = self.inner.state.lock();
            if state.mode != Mode::NativeLock
                || state.generation != generation
                || state.pending.is_some()
            {
                debug!("Ignoring stale revocation for acquisition {}", generation);
                return;
            }
            // Detach rather than abort: this runs on the listener task itself
            drop(state.revocation.take());
            state.pending = Some(Pending::Stopping);
            state.sentinel.take()
        };

        warn!("Wake lock released externally");
        self.finish_native_stop(sentinel).await;
        let _ = self
            .inner
            .event_tx
            .send(SessionEvent::Notice(Notice::released_externally()));
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.inner.state.lock().is_consistent()
    }
}
