//! Browser capability checks and JS error mapping.

use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, MediaDevices};

use screen_recorder_core::CaptureError;

pub fn media_devices() -> Option<MediaDevices> {
    web_sys::window()?.navigator().media_devices().ok()
}

/// True when `navigator.mediaDevices.getDisplayMedia` exists.
pub fn is_display_capture_supported() -> bool {
    media_devices()
        .map(|devices| has_property(&devices, "getDisplayMedia"))
        .unwrap_or(false)
}

/// True when the `MediaRecorder` constructor is exposed on `window`.
pub fn is_media_recorder_supported() -> bool {
    web_sys::window()
        .map(|window| has_property(&window, "MediaRecorder"))
        .unwrap_or(false)
}

fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

/// `(name, message)` of a thrown `DOMException` or `Error`, if it is one.
pub fn error_parts(err: &JsValue) -> Option<(String, String)> {
    if let Some(dom) = err.dyn_ref::<DomException>() {
        return Some((dom.name(), dom.message()));
    }
    err.dyn_ref::<js_sys::Error>()
        .map(|e| (String::from(e.name()), String::from(e.message())))
}

pub fn describe(err: &JsValue) -> String {
    match error_parts(err) {
        Some((name, message)) if message.is_empty() => name,
        Some((name, message)) => format!("{}: {}", name, message),
        None => err.as_string().unwrap_or_else(|| format!("{:?}", err)),
    }
}

/// Classify a rejection from the capture or recorder APIs.
pub fn to_capture_error(err: &JsValue) -> CaptureError {
    match error_parts(err) {
        Some((name, message)) => CaptureError::from_dom_error(&name, &message),
        None => CaptureError::Unknown(describe(err)),
    }
}

pub fn to_encoding_error(err: &JsValue) -> CaptureError {
    CaptureError::EncodingError(describe(err))
}

pub fn to_storage_error(err: &JsValue) -> CaptureError {
    CaptureError::StorageError(describe(err))
}
