use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::error::CaptureError;
use crate::session::events::{AttemptId, EventSink, SessionEvent};
use crate::traits::ticker::Ticker;

/// Ticker backed by a named background thread.
///
/// The thread sleeps in short steps so `stop` returns promptly even with
/// long intervals.
#[derive(Default)]
pub struct ThreadTicker {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

const SLEEP_STEP: Duration = Duration::from_millis(10);

impl ThreadTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ticker for ThreadTicker {
    fn start(
        &mut self,
        interval: Duration,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<(), CaptureError> {
        self.stop();
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let handle = thread::Builder::new()
            .name("elapsed-ticker".into())
            .spawn(move || {
                let mut waited = Duration::ZERO;
                while running.load(Ordering::SeqCst) {
                    thread::sleep(SLEEP_STEP.min(interval));
                    waited += SLEEP_STEP.min(interval);
                    if waited >= interval && running.load(Ordering::SeqCst) {
                        waited = Duration::ZERO;
                        events(SessionEvent::Tick { attempt });
                    }
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CaptureError::Unknown(format!("failed to spawn ticker thread: {}", e))
            })?;

        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("elapsed ticker thread panicked");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::EventQueue;

    #[test]
    fn emits_ticks_until_stopped() {
        let queue = EventQueue::new();
        let mut ticker = ThreadTicker::new();

        ticker
            .start(Duration::from_millis(5), AttemptId::new(2), queue.sink())
            .unwrap();
        assert!(ticker.is_running());
        assert!(queue.wait(Duration::from_secs(5)));

        ticker.stop();
        assert!(!ticker.is_running());

        let mut count = 0;
        while let Some(event) = queue.pop() {
            assert_eq!(event, SessionEvent::Tick { attempt: AttemptId::new(2) });
            count += 1;
        }
        assert!(count >= 1);

        // Nothing arrives once stopped.
        assert!(!queue.wait(Duration::from_millis(30)));
    }

    #[test]
    fn stop_without_start_is_harmless() {
        let mut ticker = ThreadTicker::new();
        ticker.stop();
        assert!(!ticker.is_running());
    }
}
