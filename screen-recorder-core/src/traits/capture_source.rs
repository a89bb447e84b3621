use crate::models::config::CaptureConstraints;
use crate::models::error::CaptureError;
use crate::models::media_models::TrackInfo;
use crate::session::events::{AttemptId, EventSink};

/// Interface for platform-specific display capture.
///
/// Implemented by:
/// - `WebDisplayCapture` (browser, `getDisplayMedia`)
pub trait CaptureSource {
    type Stream: CaptureStream;

    /// Whether display capture exists on this platform at all.
    fn is_supported(&self) -> bool;

    /// Ask the platform for a fresh capture stream.
    ///
    /// May prompt the user. The outcome is reported later through `events`
    /// as `StreamGranted` or `StreamRejected` tagged with `attempt`. An
    /// `Err` return means the request could not even be issued.
    fn request_stream(
        &mut self,
        constraints: &CaptureConstraints,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<(), CaptureError>;

    /// Hand over the stream granted for `attempt`, if there is one.
    fn take_stream(&mut self, attempt: AttemptId) -> Option<Self::Stream>;
}

/// A live capture stream (video plus optional audio tracks).
pub trait CaptureStream {
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Whether any track is still producing media.
    fn has_live_tracks(&self) -> bool {
        self.tracks().iter().any(|t| t.live)
    }

    /// Stop every track. Stopped tracks are never restarted.
    fn stop_all(&mut self);

    /// Report `SourceEnded` for `attempt` when the capture is ended outside
    /// the session manager's control.
    fn watch_ended(&mut self, attempt: AttemptId, events: EventSink);
}
