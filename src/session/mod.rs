//! Keep-Awake Session
//!
//! A single session owned by one `SessionController`:
//! - Native screen lock when the platform grants one
//! - Fallback activity simulation otherwise
//! - Revocation detection with a one-time user notice
//! - Explicit `shutdown()` teardown that releases every held resource

pub mod controller;
pub mod events;
pub mod state;

pub use controller::SessionController;
pub use events::{Notice, SessionEvent, Severity};
pub use state::{Mode, Pending, SessionState, StatusSnapshot};
