//! # screen-recorder-web
//!
//! Browser backend for screen-recorder-core.
//!
//! Provides:
//! - `WebDisplayCapture`: screen capture via `navigator.mediaDevices.getDisplayMedia`
//! - `WebMediaEncoder`: chunked encoding via `MediaRecorder`
//! - `BlobArtifactHost`: object URLs for preview and anchor-click downloads
//! - `IntervalTicker`: elapsed-time ticks via `setInterval`
//! - `WebRecorder`: the `#[wasm_bindgen]` facade a page drives
//!
//! ## Platform Requirements
//! - A secure context (HTTPS or localhost); `getDisplayMedia` is unavailable otherwise
//! - `MediaRecorder` support for at least one WebM or MP4 container
//!
//! ## Usage
//! ```ignore
//! import init, { WebRecorder } from "./screen_recorder_web.js";
//!
//! await init();
//! const recorder = new WebRecorder({ filePrefix: "screen-recording" });
//! recorder.onChange((view) => render(view));
//! button.onclick = () => recorder.start();
//! ```

#[cfg(target_arch = "wasm32")]
pub mod blob_host;
#[cfg(target_arch = "wasm32")]
pub mod console_log;
#[cfg(target_arch = "wasm32")]
pub mod display_capture;
pub mod expiry;
#[cfg(target_arch = "wasm32")]
pub mod interval_ticker;
#[cfg(target_arch = "wasm32")]
pub mod media_recorder;
#[cfg(target_arch = "wasm32")]
pub mod recorder;
#[cfg(target_arch = "wasm32")]
pub mod support;
#[cfg(target_arch = "wasm32")]
pub mod waker;

#[cfg(target_arch = "wasm32")]
pub use blob_host::BlobArtifactHost;
#[cfg(target_arch = "wasm32")]
pub use display_capture::{WebCaptureStream, WebDisplayCapture};
#[cfg(target_arch = "wasm32")]
pub use interval_ticker::IntervalTicker;
#[cfg(target_arch = "wasm32")]
pub use media_recorder::{WebEncoderHandle, WebMediaEncoder};
#[cfg(target_arch = "wasm32")]
pub use recorder::WebRecorder;
#[cfg(target_arch = "wasm32")]
pub use waker::Waker;
