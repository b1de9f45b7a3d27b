//! Scripted platform doubles for controller tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};

use super::{
    Capability, CapabilityProvider, LockKind, ReleaseNotification, WakeLockApi, WakeLockSentinel,
};
use crate::error::{WakeError, WakeResult};

pub struct FakeSentinel {
    released: AtomicBool,
    fail_release: bool,
    release_calls: AtomicUsize,
    release_tx: broadcast::Sender<ReleaseNotification>,
}

impl FakeSentinel {
    fn new(fail_release: bool) -> Self {
        let (release_tx, _) = broadcast::channel(8);
        Self {
            released: AtomicBool::new(false),
            fail_release,
            release_calls: AtomicUsize::new(0),
            release_tx,
        }
    }

    /// Platform-initiated release
    pub fn revoke(&self) {
        self.released.store(true, Ordering::SeqCst);
        let _ = self.release_tx.send(ReleaseNotification);
    }

    /// Notification that arrives while the lock is still held
    pub fn notify_spuriously(&self) {
        let _ = self.release_tx.send(ReleaseNotification);
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.release_tx.receiver_count()
    }
}

#[async_trait]
impl WakeLockSentinel for FakeSentinel {
    fn kind(&self) -> LockKind {
        LockKind::Screen
    }

    fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    async fn release(&self) -> WakeResult<()> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(WakeError::ReleaseFailed("simulated release failure".to_string()));
        }
        if !self.released.swap(true, Ordering::SeqCst) {
            let _ = self.release_tx.send(ReleaseNotification);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ReleaseNotification> {
        self.release_tx.subscribe()
    }
}

/// Lock API whose outcome is scripted per test
pub struct FakeWakeLock {
    reject: Option<String>,
    fail_release: bool,
    gate: Option<Arc<Notify>>,
    requests: AtomicUsize,
    issued: Mutex<Vec<Arc<FakeSentinel>>>,
}

impl FakeWakeLock {
    pub fn granting() -> Self {
        Self {
            reject: None,
            fail_release: false,
            gate: None,
            requests: AtomicUsize::new(0),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_string()),
            ..Self::granting()
        }
    }

    pub fn with_failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    /// Hold every request until the gate is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn last_sentinel(&self) -> Option<Arc<FakeSentinel>> {
        self.issued.lock().last().cloned()
    }
}

#[async_trait]
impl WakeLockApi for FakeWakeLock {
    async fn request(&self, _kind: LockKind) -> WakeResult<Arc<dyn WakeLockSentinel>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(reason) = &self.reject {
            return Err(WakeError::AcquisitionFailed(reason.clone()));
        }

        let sentinel = Arc::new(FakeSentinel::new(self.fail_release));
        self.issued.lock().push(sentinel.clone());
        Ok(sentinel)
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

/// Provider that always resolves to the wrapped API
pub struct FakeCapability(pub Arc<FakeWakeLock>);

impl CapabilityProvider for FakeCapability {
    fn resolve(&self) -> Capability {
        Capability::Available(self.0.clone())
    }
}
