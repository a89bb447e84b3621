use serde::Serialize;

use super::notification::Notification;

/// Snapshot of everything the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: String,
    pub is_recording: bool,
    pub elapsed_seconds: u64,
    /// `MM:SS`
    pub elapsed: String,
    pub notification: Option<Notification>,
    pub artifact_ready: bool,
    pub preview_url: Option<String>,
    pub artifact_size: Option<u64>,
    pub mime_type: Option<String>,
    pub error: Option<String>,
}
