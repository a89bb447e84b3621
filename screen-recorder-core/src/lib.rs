//! # screen-recorder-core
//!
//! Platform-agnostic screen recording core library.
//!
//! Owns the recording session state machine: capture stream and encoder
//! lifetimes, ordered chunk accumulation, elapsed time, and the finalized
//! artifact. Platform backends (browser `getDisplayMedia` + `MediaRecorder`)
//! implement the `CaptureSource`, `MediaEncoder` and `ArtifactHost` traits
//! and plug into the generic `SessionManager`.
//!
//! ## Architecture
//!
//! ```text
//! screen-recorder-core (this crate)
//! ├── traits/       ← CaptureSource, MediaEncoder, ArtifactHost, Ticker, Clock, SessionDelegate
//! ├── models/       ← SessionStatus, CaptureError, RecorderConfiguration, Artifact, Notification
//! ├── processing/   ← ChunkBuffer, ChunkSequencer, container selection, MM:SS formatting
//! ├── session/      ← SessionManager, event queue, ThreadTicker
//! └── storage/      ← FileArtifactHost, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use models::artifact::{Artifact, ArtifactUrl, RecordingMetadata};
pub use models::config::{AudioConstraints, CaptureConstraints, Ideal, RecorderConfiguration, VideoConstraints};
pub use models::error::CaptureError;
pub use models::media_models::{EncoderOptions, TrackInfo, TrackKind};
pub use models::notification::{Notification, NotificationKind};
pub use models::state::SessionStatus;
pub use models::view::SessionView;
pub use processing::chunk_buffer::ChunkBuffer;
pub use processing::elapsed::format_elapsed;
pub use processing::sequencer::ChunkSequencer;
pub use session::events::{AttemptId, EventQueue, EventSink, SessionEvent};
pub use session::manager::SessionManager;
pub use session::ticker::ThreadTicker;
pub use storage::file_host::FileArtifactHost;
pub use traits::artifact_host::ArtifactHost;
pub use traits::capture_source::{CaptureSource, CaptureStream};
pub use traits::clock::{Clock, SystemClock};
pub use traits::media_encoder::{EncoderHandle, MediaEncoder};
pub use traits::recorder_session::RecorderSession;
pub use traits::session_delegate::SessionDelegate;
pub use traits::ticker::Ticker;
