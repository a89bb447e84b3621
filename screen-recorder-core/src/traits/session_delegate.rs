use crate::models::artifact::Artifact;
use crate::models::notification::Notification;
use crate::models::state::SessionStatus;

/// Event delegate for session notifications.
///
/// Called synchronously from the session manager, on whatever thread is
/// processing events. Every method has an empty default.
pub trait SessionDelegate {
    /// Called when the session status changes.
    fn on_status_changed(&self, _status: &SessionStatus) {}

    /// Called when the elapsed second counter advances.
    fn on_elapsed_updated(&self, _elapsed_secs: u64) {}

    /// Called when a new notification is raised.
    fn on_notification(&self, _notification: &Notification) {}

    /// Called once the artifact is finalized and published.
    fn on_artifact_ready(&self, _artifact: &Artifact) {}
}
