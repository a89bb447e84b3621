use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// An `{ ideal: value }` constraint, as understood by display capture APIs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ideal<T> {
    pub ideal: T,
}

impl<T> Ideal<T> {
    pub fn new(ideal: T) -> Self {
        Self { ideal }
    }
}

/// Video track preferences for the capture request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub width: Ideal<u32>,
    pub height: Ideal<u32>,
    pub frame_rate: Ideal<u32>,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: Ideal::new(1920),
            height: Ideal::new(1080),
            frame_rate: Ideal::new(60),
        }
    }
}

/// Audio track preferences. Processing is off by default so the capture
/// keeps the original signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: false,
            noise_suppression: false,
            auto_gain_control: false,
        }
    }
}

/// Constraints passed to the capture source. Serializes to the shape
/// `getDisplayMedia` accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub video: VideoConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConstraints>,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            video: VideoConstraints::default(),
            audio: Some(AudioConstraints::default()),
        }
    }
}

/// Configuration for a session manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderConfiguration {
    /// What to ask the capture source for.
    pub constraints: CaptureConstraints,

    /// Container types to try, most preferred first.
    pub mime_preferences: Vec<String>,

    /// Container type for the artifact when the encoder reports none.
    pub fallback_mime_type: String,

    /// Encoder flush interval in milliseconds (default: 1000).
    pub timeslice_ms: u32,

    /// Elapsed-time tick interval in milliseconds (default: 250).
    pub tick_interval_ms: u32,

    /// How long notifications stay visible in milliseconds (default: 4000).
    pub notification_ttl_ms: u32,

    /// Prefix of the downloaded file name.
    pub file_prefix: String,

    pub video_bits_per_second: Option<u32>,
    pub audio_bits_per_second: Option<u32>,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.timeslice_ms == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "timeslice must be positive".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "tick interval must be positive".into(),
            ));
        }
        if self.file_prefix.trim().is_empty() {
            return Err(CaptureError::ConfigurationFailed(
                "file prefix must not be empty".into(),
            ));
        }
        if self.fallback_mime_type.trim().is_empty() {
            return Err(CaptureError::ConfigurationFailed(
                "fallback mime type must not be empty".into(),
            ));
        }
        if self.mime_preferences.iter().any(|m| m.trim().is_empty()) {
            return Err(CaptureError::ConfigurationFailed(
                "mime preferences must not contain empty entries".into(),
            ));
        }
        Ok(())
    }

    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeslice_ms))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    pub fn notification_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::from(self.notification_ttl_ms))
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            mime_preferences: vec![
                "video/webm;codecs=vp9,opus".into(),
                "video/webm;codecs=vp8,opus".into(),
                "video/webm".into(),
                "video/mp4".into(),
            ],
            fallback_mime_type: "video/webm".into(),
            timeslice_ms: 1000,
            tick_interval_ms: 250,
            notification_ttl_ms: 4000,
            file_prefix: "screen-recording".into(),
            video_bits_per_second: None,
            audio_bits_per_second: None,
        }
    }
}
