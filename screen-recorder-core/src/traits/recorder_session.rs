use crate::models::state::SessionStatus;
use crate::models::view::SessionView;

/// The intents a UI can issue against a recording session.
///
/// None of these fail: errors become notifications and status changes.
pub trait RecorderSession {
    /// Current session status.
    fn status(&self) -> SessionStatus;

    /// Whole seconds recorded so far; zero unless recording.
    fn elapsed_seconds(&self) -> u64;

    /// Request a capture stream. Transitions: ready/complete/failed → starting.
    fn start(&mut self);

    /// Stop recording. Transitions: recording → processing → complete/failed.
    fn stop(&mut self);

    /// Save the finished recording. Returns where it was saved.
    fn download(&mut self) -> Option<String>;

    /// Snapshot for rendering.
    fn view(&self) -> SessionView;
}
