//! Fallback Activity Simulation
//!
//! Used when no native screen lock can be obtained:
//! - periodic tick on a randomized, bounded interval
//! - small reversible viewport nudge
//! - one character appended per tick to a bounded activity log

pub mod activity;
pub mod driver;
pub mod viewport;

pub use activity::{ActivityLog, LOG_CEILING, LOG_RETAIN};
pub use driver::{ActivitySimulator, FallbackDriver};
pub use viewport::{ScrollOffset, Viewport};
