//! Keep-Awake Error Types
//!
//! Platform failures are converted into mode transitions by the session
//! controller; these types never reach the presentation layer as errors.

use thiserror::Error;

/// Errors raised by the platform capability and the activity simulator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WakeError {
    /// The platform has no screen lock capability at all
    #[error("Wake lock capability not available on this platform")]
    CapabilityUnavailable,

    /// The capability exists but the request was rejected (permission, policy)
    #[error("Wake lock request rejected: {0}")]
    AcquisitionFailed(String),

    /// Releasing a held lock failed
    #[error("Wake lock release failed: {0}")]
    ReleaseFailed(String),

    /// The viewport nudge could not be performed
    #[error("Viewport nudge failed: {0}")]
    Viewport(String),
}

impl From<WakeError> for String {
    fn from(err: WakeError) -> String {
        err.to_string()
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid fallback interval: {0}")]
    InvalidInterval(String),

    #[error("Activity pattern cannot be empty")]
    EmptyPattern,
}

/// Result type alias for keep-awake operations
pub type WakeResult<T> = Result<T, WakeError>;
