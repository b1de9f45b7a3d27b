//! Fallback Driver
//!
//! Repeats the simulated activity action on a fixed period while the session
//! is in fallback mode.

use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::activity::ActivityLog;
use super::viewport::Viewport;
use crate::session::SessionEvent;

/// Displacement applied to the viewport on each tick
pub const NUDGE_PX: i32 = 10;
/// Delay before the displacement is undone
pub const RESTORE_DELAY: Duration = Duration::from_millis(100);

/// Periodic timer for the fallback action
#[derive(Debug, Default)]
pub struct FallbackDriver {
    task: Option<JoinHandle<()>>,
    period: Option<Duration>,
}

impl FallbackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_tick` every `period`, starting one period from now.
    /// A running repetition is cancelled first.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        self.task = Some(handle);
        self.period = Some(period);
        debug!("Fallback driver started with period {}ms", period.as_millis());
    }

    /// Cancel the repetition. Activity state is left untouched.
    pub fn stop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
            debug!("Fallback driver stopped");
        }
        self.period = None;
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}

impl Drop for FallbackDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The action performed on each fallback tick
#[derive(Clone)]
pub struct ActivitySimulator {
    log: Arc<Mutex<ActivityLog>>,
    viewport: Arc<dyn Viewport>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ActivitySimulator {
    pub fn new(
        pattern: &str,
        viewport: Arc<dyn Viewport>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            log: Arc::new(Mutex::new(ActivityLog::new(pattern))),
            viewport,
            event_tx,
        }
    }

    /// Nudge the viewport, then append one character to the log.
    ///
    /// The restore scroll runs on its own timer and is not cancelled by `stop()`.
    pub fn tick(&self) {
        match self.viewport.scroll_by(NUDGE_PX) {
            Ok(()) => {
                let viewport = self.viewport.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(RESTORE_DELAY).await;
                    if let Err(e) = viewport.scroll_by(-NUDGE_PX) {
                        debug!("Viewport restore failed: {}", e);
                    }
                });
            }
            Err(e) => warn!("Viewport nudge failed: {}", e),
        }

        let (character, length) = {
            let mut log = self.log.lock();
            let character = log.append_next();
            (character, log.len())
        };

        let _ = self.event_tx.send(SessionEvent::Activity { character, length });
    }

    /// Clear the log and rewind the cursor
    pub fn reset(&self) {
        self.log.lock().reset();
    }

    pub fn text(&self) -> String {
        self.log.lock().text().to_string()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    pub fn read_position(&self) -> usize {
        self.log.lock().read_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{WakeError, WakeResult};
    use crate::fallback::viewport::ScrollOffset;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenViewport;

    impl Viewport for BrokenViewport {
        fn scroll_by(&self, _dy: i32) -> WakeResult<()> {
            Err(WakeError::Viewport("no window".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_ticks_on_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let mut driver = FallbackDriver::new();

        driver.start(Duration::from_secs(4), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(driver.is_running());
        assert_eq!(driver.period(), Some(Duration::from_secs(4)));

        tokio::time::sleep(Duration::from_millis(3_900)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(8_200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stop_cancels() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let mut driver = FallbackDriver::new();

        driver.start(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        driver.stop();
        driver.stop();
        assert!(!driver.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_nudges_and_restores() {
        let (tx, mut rx) = broadcast::channel(16);
        let viewport = Arc::new(ScrollOffset::new(tx.clone()));
        let simulator = ActivitySimulator::new("ab", viewport.clone(), tx);

        simulator.tick();
        assert_eq!(viewport.offset(), NUDGE_PX as i64);
        assert_eq!(simulator.text(), "a");
        assert_eq!(simulator.read_position(), 1);

        tokio::time::sleep(RESTORE_DELAY + Duration::from_millis(1)).await;
        assert_eq!(viewport.offset(), 0);

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Scrolled { offset: 10 });
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Activity {
                character: 'a',
                length: 1
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Scrolled { offset: 0 });
    }

    #[tokio::test]
    async fn test_viewport_failure_is_not_fatal() {
        let (tx, _rx) = broadcast::channel(16);
        let simulator = ActivitySimulator::new("xyz", Arc::new(BrokenViewport), tx);

        simulator.tick();
        simulator.tick();
        assert_eq!(simulator.text(), "xy");

        simulator.reset();
        assert!(simulator.is_empty());
        assert_eq!(simulator.len(), 0);
    }
}
