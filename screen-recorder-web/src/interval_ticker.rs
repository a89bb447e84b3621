use std::time::Duration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use screen_recorder_core::{AttemptId, CaptureError, EventSink, SessionEvent, Ticker};

use crate::support;
use crate::waker::Waker;

/// Ticker backed by `window.setInterval`.
pub struct IntervalTicker {
    waker: Waker,
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl IntervalTicker {
    pub fn new(waker: Waker) -> Self {
        Self {
            waker,
            handle: None,
            callback: None,
        }
    }
}

impl Ticker for IntervalTicker {
    fn start(
        &mut self,
        interval: Duration,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<(), CaptureError> {
        self.stop();
        let window = web_sys::window().ok_or(CaptureError::UnsupportedEnvironment)?;

        let waker = self.waker.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            events(SessionEvent::Tick { attempt });
            waker.wake();
        });
        let millis = i32::try_from(interval.as_millis()).unwrap_or(i32::MAX);
        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), millis)
            .map_err(|e| CaptureError::Unknown(format!("setInterval failed: {}", support::describe(&e))))?;

        self.handle = Some(handle);
        self.callback = Some(callback);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(handle);
            }
        }
        self.callback = None;
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
