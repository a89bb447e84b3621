use std::time::Duration;

use crate::models::error::CaptureError;
use crate::models::media_models::EncoderOptions;
use crate::session::events::{AttemptId, EventSink};

/// Interface for the platform's chunked media encoder.
///
/// Implemented by:
/// - `WebMediaEncoder` (browser, `MediaRecorder`)
pub trait MediaEncoder {
    type Stream;
    type Handle: EncoderHandle;

    /// Whether chunked encoding exists on this platform at all.
    fn is_supported(&self) -> bool;

    /// Whether the encoder can produce the given container type.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Create an encoder for `stream`.
    ///
    /// The handle reports `DataAvailable`, `EncoderStopped` and
    /// `EncoderError` for `attempt` through `events`. `EncoderStopped` must
    /// only be sent after every chunk has been delivered.
    fn create(
        &mut self,
        stream: &Self::Stream,
        options: &EncoderOptions,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<Self::Handle, CaptureError>;
}

/// A running encoder instance.
pub trait EncoderHandle {
    /// Begin encoding, flushing a chunk at least every `timeslice`.
    fn start(&mut self, timeslice: Duration) -> Result<(), CaptureError>;

    /// Request the encoder to flush and stop.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Container type the encoder actually produces, when known.
    fn mime_type(&self) -> Option<String>;
}
