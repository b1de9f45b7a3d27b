//! Session State Management
//!
//! Tracks the mode of the single keep-awake session and the resources it holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::fallback::FallbackDriver;
use crate::platform::WakeLockSentinel;

/// Strategy currently keeping the display awake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Nothing held
    Idle,
    /// Holding a native screen lock
    NativeLock,
    /// Simulating activity
    Fallback,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle
    }
}

impl Mode {
    /// Human readable status shown by front ends
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Idle => "Stopped",
            Self::NativeLock => "Wake Lock Active",
            Self::Fallback => "Fallback Active",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::NativeLock => write!(f, "native_lock"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Transition awaiting the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pending {
    /// Lock request outstanding; `stop()` may have asked to cancel it
    Starting { cancel_requested: bool },
    /// Lock release outstanding
    Stopping,
}

/// State of the keep-awake session
pub struct SessionState {
    pub mode: Mode,
    pub pending: Option<Pending>,
    /// Incremented on every native acquisition
    pub generation: u64,
    pub sentinel: Option<Arc<dyn WakeLockSentinel>>,
    /// Revocation listener for the current acquisition
    pub revocation: Option<JoinHandle<()>>,
    pub fallback: FallbackDriver,
    /// When the current mode was entered
    pub since: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            pending: None,
            generation: 0,
            sentinel: None,
            revocation: None,
            fallback: FallbackDriver::new(),
            since: Utc::now(),
        }
    }

    /// Update mode and reset the mode timestamp
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.since = Utc::now();
    }

    /// Mode is active or a start is outstanding
    pub fn is_active(&self) -> bool {
        self.mode != Mode::Idle || matches!(self.pending, Some(Pending::Starting { .. }))
    }

    /// Never a lock and a timer at once, and each resource only in its own mode.
    /// A pending stop may have already detached the lock.
    pub fn is_consistent(&self) -> bool {
        let timer = self.fallback.is_running();
        let lock = self.sentinel.is_some();
        if lock && timer {
            return false;
        }
        match self.mode {
            Mode::Idle => !lock && !timer && self.revocation.is_none(),
            Mode::NativeLock => !timer && (lock || self.pending == Some(Pending::Stopping)),
            Mode::Fallback => timer && !lock,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionState {
    fn drop(&mut self) {
        if let Some(listener) = self.revocation.take() {
            listener.abort();
        }
    }
}

/// Serializable snapshot for front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub mode: Mode,
    pub status: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<Pending>,
    /// Fallback tick period in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    pub log: String,
    pub read_position: usize,
    pub since: String,
}

impl StatusSnapshot {
    pub fn new(state: &SessionState, log: String, read_position: usize) -> Self {
        Self {
            mode: state.mode,
            status: state.mode.status_text().to_string(),
            is_active: state.is_active(),
            pending: state.pending,
            interval_ms: state.fallback.period().map(|p| p.as_millis() as u64),
            log,
            read_position,
            since: state.since.to_rfc3339(),
        }
    }
}
