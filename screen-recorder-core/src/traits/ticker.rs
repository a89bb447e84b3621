use std::time::Duration;

use crate::models::error::CaptureError;
use crate::session::events::{AttemptId, EventSink};

/// Periodic source of `SessionEvent::Tick`.
///
/// Implemented by:
/// - `ThreadTicker` (native background thread)
/// - `IntervalTicker` (browser, `setInterval`)
pub trait Ticker {
    fn start(
        &mut self,
        interval: Duration,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<(), CaptureError>;

    /// Stop ticking. Safe to call when not running.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
