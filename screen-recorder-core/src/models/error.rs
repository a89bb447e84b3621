use thiserror::Error;

use super::notification::NotificationKind;

/// Errors that can occur during a screen recording session.
///
/// Every failure the session manager observes is translated into one of
/// these kinds before it reaches the UI.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no capturable source available")]
    SourceUnavailable,

    #[error("screen sharing cancelled by user")]
    UserCancelled,

    #[error("display capture or media encoding unsupported")]
    UnsupportedEnvironment,

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("recording produced no data")]
    EmptyResult,

    #[error("no recording available to download")]
    NoArtifact,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Translate a platform exception (a DOM exception name plus message)
    /// into a capture error kind.
    pub fn from_dom_error(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                let lower = message.to_ascii_lowercase();
                if lower.contains("dismiss") || lower.contains("cancel") {
                    Self::UserCancelled
                } else {
                    Self::PermissionDenied
                }
            }
            "NotFoundError" | "OverconstrainedError" | "NotReadableError" => {
                Self::SourceUnavailable
            }
            "AbortError" => Self::UserCancelled,
            "NotSupportedError" | "TypeError" | "InvalidStateError" => {
                Self::UnsupportedEnvironment
            }
            _ if message.is_empty() => Self::Unknown(name.to_string()),
            _ => Self::Unknown(format!("{name}: {message}")),
        }
    }

    /// Text shown to the user when this error surfaces.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Screen capture permission was denied. Please allow access and try again.".into()
            }
            Self::SourceUnavailable => "No screen or window is available to capture.".into(),
            Self::UserCancelled => "Screen sharing was cancelled.".into(),
            Self::UnsupportedEnvironment => {
                "Screen recording is not supported here. Please use a recent Chrome, Edge or Firefox."
                    .into()
            }
            Self::EncodingError(_) => "An error occurred while recording.".into(),
            Self::EmptyResult => {
                "No data was captured. Try recording for a little longer.".into()
            }
            Self::NoArtifact => "There is no recording available to download.".into(),
            Self::ConfigurationFailed(detail) => format!("Recorder is misconfigured: {detail}"),
            Self::StorageError(_) => "The recording could not be saved.".into(),
            Self::Unknown(_) => "Failed to start screen recording.".into(),
        }
    }

    /// Severity of the notification raised for this error.
    pub fn notification_kind(&self) -> NotificationKind {
        match self {
            Self::UserCancelled => NotificationKind::Info,
            _ => NotificationKind::Error,
        }
    }
}
