//! Platform Capability Abstraction
//!
//! The session controller only talks to the platform through these traits:
//! - `CapabilityProvider` decides once per `start()` whether a lock can be requested
//! - `WakeLockApi` requests a lock of a given kind
//! - `WakeLockSentinel` is the held lock, with release and release notifications

pub mod native;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::WakeResult;

pub use native::{NativeCapability, NativeWakeLock};

/// Kind of lock requested from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKind {
    /// Keep the display on
    Screen,
}

impl std::fmt::Display for LockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Screen => write!(f, "screen"),
        }
    }
}

/// Fired by a sentinel whenever it transitions to released.
///
/// Receivers must re-check `WakeLockSentinel::released` before acting; a
/// notification may arrive while the sentinel still reports itself held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseNotification;

/// A held platform lock
#[async_trait]
pub trait WakeLockSentinel: Send + Sync {
    /// Kind of lock this sentinel holds
    fn kind(&self) -> LockKind;

    /// Live released flag
    fn released(&self) -> bool;

    /// Release the lock. Releasing an already released sentinel is a no-op.
    async fn release(&self) -> WakeResult<()>;

    /// Subscribe to release notifications
    fn subscribe(&self) -> broadcast::Receiver<ReleaseNotification>;
}

/// Platform lock request surface
#[async_trait]
pub trait WakeLockApi: Send + Sync {
    /// Request a lock; may reject on permission or policy grounds
    async fn request(&self, kind: LockKind) -> WakeResult<Arc<dyn WakeLockSentinel>>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Result of capability detection
#[derive(Clone)]
pub enum Capability {
    Available(Arc<dyn WakeLockApi>),
    Unavailable,
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(api) => write!(f, "Available({})", api.backend_name()),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Resolves the platform capability
pub trait CapabilityProvider: Send + Sync {
    fn resolve(&self) -> Capability;
}

/// Provider for environments with no lock capability at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapability;

impl CapabilityProvider for NoCapability {
    fn resolve(&self) -> Capability {
        Capability::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_capability_is_unavailable() {
        let capability = NoCapability.resolve();
        assert!(!capability.is_available());
        assert_eq!(format!("{:?}", capability), "Unavailable");
    }

    #[test]
    fn test_lock_kind_serialization() {
        assert_eq!(serde_json::to_string(&LockKind::Screen).unwrap(), "\"screen\"");
        assert_eq!(LockKind::Screen.to_string(), "screen");
    }
}
