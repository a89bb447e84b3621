use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::models::error::CaptureError;

/// Identifies one recording attempt. Events tagged with a superseded
/// attempt are ignored by the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Platform notifications that drive the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The capture source acquired a stream; collect it with `take_stream`.
    StreamGranted { attempt: AttemptId },
    /// The capture request failed.
    StreamRejected { attempt: AttemptId, error: CaptureError },
    /// The capture source ended outside our control (e.g. "stop sharing").
    SourceEnded { attempt: AttemptId },
    /// The encoder flushed a chunk of encoded media.
    DataAvailable { attempt: AttemptId, data: Vec<u8> },
    /// The encoder has stopped and delivered every chunk.
    EncoderStopped { attempt: AttemptId },
    /// The encoder reported a runtime error.
    EncoderError { attempt: AttemptId, message: String },
    /// Periodic elapsed-time tick.
    Tick { attempt: AttemptId },
}

impl SessionEvent {
    pub fn attempt(&self) -> AttemptId {
        match self {
            Self::StreamGranted { attempt }
            | Self::StreamRejected { attempt, .. }
            | Self::SourceEnded { attempt }
            | Self::DataAvailable { attempt, .. }
            | Self::EncoderStopped { attempt }
            | Self::EncoderError { attempt, .. }
            | Self::Tick { attempt } => *attempt,
        }
    }
}

/// Callback platform code uses to report events.
pub type EventSink = Arc<dyn Fn(SessionEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct QueueInner {
    events: Mutex<VecDeque<SessionEvent>>,
    ready: Condvar,
}

/// FIFO of pending session events, shared between platform callbacks and
/// the session manager.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<QueueInner>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: SessionEvent) {
        self.inner.events.lock().push_back(event);
        self.inner.ready.notify_all();
    }

    pub fn pop(&self) -> Option<SessionEvent> {
        self.inner.events.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.events.lock().is_empty()
    }

    /// A sink that appends to this queue.
    pub fn sink(&self) -> EventSink {
        let queue = self.clone();
        Arc::new(move |event| queue.push(event))
    }

    /// Block until an event is queued or `timeout` passes. Returns whether
    /// events are pending.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut events = self.inner.events.lock();
        if events.is_empty() {
            self.inner.ready.wait_for(&mut events, timeout);
        }
        !events.is_empty()
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue").field("pending", &self.len()).finish()
    }
}
