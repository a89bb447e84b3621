pub mod artifact_host;
pub mod capture_source;
pub mod clock;
pub mod media_encoder;
pub mod recorder_session;
pub mod session_delegate;
pub mod ticker;
