//! The `#[wasm_bindgen]` surface a page drives.
//!
//! A page creates one `WebRecorder`, subscribes with `onChange`, and wires
//! its controls to `start`, `stop` and `download`. Every browser callback
//! funnels through the shared [`Waker`] into `process_events`, after which
//! the subscriber receives a fresh view.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Utc;
use js_sys::Function;
use log::LevelFilter;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use screen_recorder_core::{RecorderConfiguration, SessionManager, SessionView};

use crate::blob_host::BlobArtifactHost;
use crate::console_log;
use crate::display_capture::WebDisplayCapture;
use crate::expiry::ExpiryGate;
use crate::interval_ticker::IntervalTicker;
use crate::media_recorder::WebMediaEncoder;
use crate::waker::Waker;

type WebSessionManager = SessionManager<WebDisplayCapture, WebMediaEncoder, BlobArtifactHost>;

struct Shared {
    manager: RefCell<WebSessionManager>,
    on_change: RefCell<Option<Function>>,
    expiry: ExpiryGate,
}

impl Shared {
    /// Drain queued events, then publish the resulting view.
    ///
    /// A callback that fires while an intent holds the manager finds it
    /// borrowed; its events stay queued and the intent drains them.
    fn pump(this: &Rc<Self>) {
        match this.manager.try_borrow_mut() {
            Ok(mut manager) => {
                manager.process_events();
            }
            Err(_) => return,
        }
        Self::publish(this);
    }

    fn publish(this: &Rc<Self>) {
        let view = match this.manager.try_borrow() {
            Ok(manager) => manager.view(),
            Err(_) => return,
        };
        Self::schedule_expiry(this, &view);

        let callback = this.on_change.borrow().clone();
        if let Some(callback) = callback {
            match serde_wasm_bindgen::to_value(&view) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        log::error!("onChange callback threw: {:?}", e);
                    }
                }
                Err(e) => log::error!("failed to serialize session view: {}", e),
            }
        }
    }

    /// Re-publish once the visible notification has expired so the page
    /// can clear it even when nothing else is happening. At most one
    /// timeout is armed per notification.
    fn schedule_expiry(this: &Rc<Self>, view: &SessionView) {
        let Some(notification) = &view.notification else { return };
        let deadline = notification.expires_at;
        let Some(window) = web_sys::window() else { return };
        if !this.expiry.arm(deadline) {
            return;
        }
        let remaining = (deadline - Utc::now()).num_milliseconds().max(0) + 1;

        let shared: Weak<Self> = Rc::downgrade(this);
        let callback = Closure::once_into_js(move || {
            if let Some(shared) = shared.upgrade() {
                shared.expiry.release(deadline);
                Self::publish(&shared);
            }
        });
        let timeout = i32::try_from(remaining).unwrap_or(i32::MAX);
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout) {
            this.expiry.release(deadline);
            log::warn!("failed to schedule notification expiry: {:?}", e);
        }
    }
}

/// Screen recorder session bound to the current page.
#[wasm_bindgen]
pub struct WebRecorder {
    shared: Rc<Shared>,
    waker: Waker,
}

#[wasm_bindgen]
impl WebRecorder {
    /// Create a recorder. `config` is an optional object in the
    /// `RecorderConfiguration` camelCase shape; omitted fields use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WebRecorder, JsError> {
        console_log::init(if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info });

        let config: RecorderConfiguration = if config.is_undefined() || config.is_null() {
            RecorderConfiguration::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
        };

        let waker = Waker::new();
        let manager = SessionManager::new(
            WebDisplayCapture::new(waker.clone()),
            WebMediaEncoder::new(waker.clone()),
            BlobArtifactHost::new(),
            config,
        )
        .map_err(|e| JsError::new(&e.to_string()))?
        .with_ticker(Box::new(IntervalTicker::new(waker.clone())));

        let shared = Rc::new(Shared {
            manager: RefCell::new(manager),
            on_change: RefCell::new(None),
            expiry: ExpiryGate::new(),
        });

        let weak = Rc::downgrade(&shared);
        waker.set(move || {
            if let Some(shared) = weak.upgrade() {
                Shared::pump(&shared);
            }
        });

        log::info!("screen recorder ready");
        Ok(WebRecorder { shared, waker })
    }

    /// Ask for a screen to record. Ignored unless the session is idle,
    /// complete or failed.
    pub fn start(&self) {
        self.with_manager(|m| m.start());
    }

    /// Stop recording, or cancel a pending screen picker.
    pub fn stop(&self) {
        self.with_manager(|m| m.stop());
    }

    /// Save the finished recording. Returns the suggested file name, or
    /// `undefined` when there is nothing to save.
    pub fn download(&self) -> Option<String> {
        self.with_manager(|m| m.download())
    }

    /// Current session snapshot in the same shape `onChange` delivers.
    pub fn view(&self) -> Result<JsValue, JsError> {
        let view = self.shared.manager.borrow().view();
        serde_wasm_bindgen::to_value(&view).map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(js_name = isRecording)]
    pub fn is_recording(&self) -> bool {
        self.shared.manager.borrow().is_recording()
    }

    #[wasm_bindgen(js_name = elapsedLabel)]
    pub fn elapsed_label(&self) -> String {
        self.shared.manager.borrow().elapsed_label()
    }

    /// Subscribe to view changes. Passing `null` unsubscribes.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Option<Function>) {
        *self.shared.on_change.borrow_mut() = callback;
        Shared::publish(&self.shared);
    }
}

impl WebRecorder {
    fn with_manager<T>(&self, intent: impl FnOnce(&mut WebSessionManager) -> T) -> T {
        let result = {
            let mut manager = self.shared.manager.borrow_mut();
            let result = intent(&mut manager);
            manager.process_events();
            result
        };
        Shared::publish(&self.shared);
        result
    }
}

impl Drop for WebRecorder {
    fn drop(&mut self) {
        self.waker.clear();
    }
}
