use serde::{Deserialize, Serialize};

/// Kind of media track in a capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// A track in a capture stream (e.g. the shared screen, tab audio).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
    pub live: bool,
}

impl TrackInfo {
    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }
}

/// Options handed to the media encoder when a recording starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Container type to request, or `None` for the platform default.
    pub mime_type: Option<String>,
    pub video_bits_per_second: Option<u32>,
    pub audio_bits_per_second: Option<u32>,
}
