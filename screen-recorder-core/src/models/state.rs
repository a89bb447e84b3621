use super::error::CaptureError;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// ready → starting → recording → processing → complete
///            ↓           ↓            ↓
///          failed ←──────┴────────────┘
///
/// complete / failed → starting (on a new start)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Ready,
    Starting,
    Recording,
    Processing,
    Complete,
    Failed(CaptureError),
}

impl SessionStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }

    /// An attempt is in flight: a new `start()` must be ignored.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Starting | Self::Recording | Self::Processing)
    }

    /// The failure cause, if any.
    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Human label shown by the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Starting => "Starting",
            Self::Recording => "Recording",
            Self::Processing => "Processing",
            Self::Complete => "Complete",
            Self::Failed(_) => "Failed",
        }
    }
}
