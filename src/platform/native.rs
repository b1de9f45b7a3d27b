//! Native screen lock backed by the OS power management API.
//!
//! - **macOS**: IOPMAssertion
//! - **Windows**: SetThreadExecutionState
//! - **Linux**: D-Bus screensaver / login1 inhibitors
//!
//! The lock is held by a `keepawake::KeepAwake` guard and released by dropping it.

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{
    Capability, CapabilityProvider, LockKind, ReleaseNotification, WakeLockApi, WakeLockSentinel,
};
use crate::config::KeepAwakeConfig;
use crate::error::{WakeError, WakeResult};

/// Lock request surface for the native backend
#[derive(Debug, Clone)]
pub struct NativeWakeLock {
    app_name: String,
    reason: String,
}

impl NativeWakeLock {
    pub fn new(app_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            reason: reason.into(),
        }
    }

    fn reverse_domain(&self) -> String {
        format!("io.pseudosap.{}", self.app_name.to_lowercase().replace(' ', "-"))
    }
}

#[async_trait]
impl WakeLockApi for NativeWakeLock {
    async fn request(&self, kind: LockKind) -> WakeResult<Arc<dyn WakeLockSentinel>> {
        let app_name = self.app_name.clone();
        let reason = self.reason.clone();
        let reverse_domain = self.reverse_domain();

        // D-Bus and IOKit calls block
        let guard = tokio::task::spawn_blocking(move || {
            keepawake::Builder::default()
                .display(true)
                .idle(true)
                .reason(reason)
                .app_name(app_name)
                .app_reverse_domain(reverse_domain)
                .create()
                .map_err(|e| WakeError::AcquisitionFailed(e.to_string()))
        })
        .await
        .map_err(|e| WakeError::AcquisitionFailed(e.to_string()))??;

        info!("Native {} lock acquired", kind);
        Ok(Arc::new(NativeSentinel::new(kind, guard)))
    }

    fn backend_name(&self) -> &'static str {
        "keepawake"
    }
}

/// A held native lock
pub struct NativeSentinel {
    kind: LockKind,
    guard: Mutex<Option<keepawake::KeepAwake>>,
    released: AtomicBool,
    release_tx: broadcast::Sender<ReleaseNotification>,
}

impl NativeSentinel {
    fn new(kind: LockKind, guard: keepawake::KeepAwake) -> Self {
        let (release_tx, _) = broadcast::channel(4);
        Self {
            kind,
            guard: Mutex::new(Some(guard)),
            released: AtomicBool::new(false),
            release_tx,
        }
    }
}

#[async_trait]
impl WakeLockSentinel for NativeSentinel {
    fn kind(&self) -> LockKind {
        self.kind
    }

    fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    async fn release(&self) -> WakeResult<()> {
        let guard = self.guard.lock().take();
        let Some(guard) = guard else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || drop(guard))
            .await
            .map_err(|e| WakeError::ReleaseFailed(e.to_string()))?;

        self.released.store(true, Ordering::SeqCst);
        let _ = self.release_tx.send(ReleaseNotification);
        debug!("Native {} lock released", self.kind);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ReleaseNotification> {
        self.release_tx.subscribe()
    }
}

/// Capability provider for the native backend
#[derive(Debug, Clone)]
pub struct NativeCapability {
    api: Arc<NativeWakeLock>,
    enabled: bool,
}

impl NativeCapability {
    pub fn new(api: NativeWakeLock, enabled: bool) -> Self {
        Self {
            api: Arc::new(api),
            enabled,
        }
    }

    pub fn from_config(config: &KeepAwakeConfig) -> Self {
        Self::new(
            NativeWakeLock::new(&config.app_name, &config.reason),
            config.native,
        )
    }
}

impl CapabilityProvider for NativeCapability {
    fn resolve(&self) -> Capability {
        if self.enabled && cfg!(any(target_os = "linux", target_os = "macos", target_os = "windows")) {
            Capability::Available(self.api.clone())
        } else {
            Capability::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_native_is_unavailable() {
        let mut config = KeepAwakeConfig::default();
        config.native = false;
        let capability = NativeCapability::from_config(&config).resolve();
        assert!(!capability.is_available());
    }

    #[test]
    fn test_reverse_domain() {
        let api = NativeWakeLock::new("Pseudo SAP", "testing");
        assert_eq!(api.reverse_domain(), "io.pseudosap.pseudo-sap");
        assert_eq!(api.backend_name(), "keepawake");
    }

    #[tokio::test]
    async fn test_request_does_not_panic() {
        // CI machines often lack a session bus; either outcome is fine
        let api = NativeWakeLock::new("PseudoSAP", "test run");
        if let Ok(sentinel) = api.request(LockKind::Screen).await {
            let mut rx = sentinel.subscribe();
            assert!(!sentinel.released());
            sentinel.release().await.unwrap();
            assert!(sentinel.released());
            assert!(rx.try_recv().is_ok());
            // Second release is a no-op
            sentinel.release().await.unwrap();
        }
    }
}
