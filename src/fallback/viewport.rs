//! Viewport nudge sink

use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::broadcast;

use crate::error::WakeResult;
use crate::session::SessionEvent;

/// Receives the small reversible displacement performed on every tick
pub trait Viewport: Send + Sync {
    fn scroll_by(&self, dy: i32) -> WakeResult<()>;
}

/// Tracked scroll offset, published so a presentation layer can mirror it
pub struct ScrollOffset {
    offset: AtomicI64,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ScrollOffset {
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            offset: AtomicI64::new(0),
            event_tx,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }
}

impl Viewport for ScrollOffset {
    fn scroll_by(&self, dy: i32) -> WakeResult<()> {
        let offset = self.offset.fetch_add(dy as i64, Ordering::SeqCst) + dy as i64;
        let _ = self.event_tx.send(SessionEvent::Scrolled { offset });
        Ok(())
    }
}
