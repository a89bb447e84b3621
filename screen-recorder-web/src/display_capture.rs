//! Screen capture through `navigator.mediaDevices.getDisplayMedia`.
//!
//! The picker resolves asynchronously. Granted streams are parked under
//! their attempt id until the session collects them with `take_stream`,
//! so a stream granted to an abandoned attempt can still be stopped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{DisplayMediaStreamConstraints, MediaStream, MediaStreamTrack, MediaStreamTrackState};

use screen_recorder_core::{
    AttemptId, CaptureConstraints, CaptureError, CaptureSource, CaptureStream, EventSink, SessionEvent,
    TrackInfo, TrackKind,
};

use crate::support;
use crate::waker::Waker;

pub struct WebDisplayCapture {
    waker: Waker,
    granted: Rc<RefCell<HashMap<AttemptId, MediaStream>>>,
}

impl WebDisplayCapture {
    pub fn new(waker: Waker) -> Self {
        Self {
            waker,
            granted: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl CaptureSource for WebDisplayCapture {
    type Stream = WebCaptureStream;

    fn is_supported(&self) -> bool {
        support::is_display_capture_supported()
    }

    fn request_stream(
        &mut self,
        constraints: &CaptureConstraints,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<(), CaptureError> {
        let devices = support::media_devices().ok_or(CaptureError::UnsupportedEnvironment)?;
        let options = serde_wasm_bindgen::to_value(constraints)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("invalid capture constraints: {}", e)))?;
        let promise = devices
            .get_display_media_with_constraints(options.unchecked_ref::<DisplayMediaStreamConstraints>())
            .map_err(|e| support::to_capture_error(&e))?;

        log::debug!("getDisplayMedia requested for attempt {}", attempt);

        let granted = Rc::clone(&self.granted);
        let waker = self.waker.clone();
        spawn_local(async move {
            let event = match JsFuture::from(promise).await {
                Ok(value) => match value.dyn_into::<MediaStream>() {
                    Ok(stream) => {
                        granted.borrow_mut().insert(attempt, stream);
                        SessionEvent::StreamGranted { attempt }
                    }
                    Err(_) => SessionEvent::StreamRejected {
                        attempt,
                        error: CaptureError::SourceUnavailable,
                    },
                },
                Err(err) => SessionEvent::StreamRejected {
                    attempt,
                    error: support::to_capture_error(&err),
                },
            };
            events(event);
            waker.wake();
        });

        Ok(())
    }

    fn take_stream(&mut self, attempt: AttemptId) -> Option<WebCaptureStream> {
        let stream = self.granted.borrow_mut().remove(&attempt)?;
        Some(WebCaptureStream::new(stream, self.waker.clone()))
    }
}

/// A granted display stream and the `ended` listener attached to it.
pub struct WebCaptureStream {
    stream: MediaStream,
    waker: Waker,
    on_ended: Option<Closure<dyn FnMut()>>,
}

impl WebCaptureStream {
    fn new(stream: MediaStream, waker: Waker) -> Self {
        Self {
            stream,
            waker,
            on_ended: None,
        }
    }

    pub fn media_stream(&self) -> &MediaStream {
        &self.stream
    }

    fn media_tracks(&self) -> Vec<MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|track| track.dyn_into::<MediaStreamTrack>().ok())
            .collect()
    }

    fn detach_listeners(&mut self) {
        if self.on_ended.take().is_some() {
            for track in self.media_tracks() {
                track.set_onended(None);
            }
        }
    }
}

impl CaptureStream for WebCaptureStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        self.media_tracks()
            .iter()
            .map(|track| TrackInfo {
                id: track.id(),
                kind: if track.kind() == "audio" { TrackKind::Audio } else { TrackKind::Video },
                label: track.label(),
                live: track.ready_state() == MediaStreamTrackState::Live,
            })
            .collect()
    }

    fn stop_all(&mut self) {
        self.detach_listeners();
        for track in self.media_tracks() {
            track.stop();
        }
    }

    fn watch_ended(&mut self, attempt: AttemptId, events: EventSink) {
        self.detach_listeners();

        let waker = self.waker.clone();
        let on_ended = Closure::<dyn FnMut()>::new(move || {
            events(SessionEvent::SourceEnded { attempt });
            waker.wake();
        });

        // The browser's "Stop sharing" control ends the video track.
        for track in self.media_tracks() {
            if track.kind() == "video" {
                track.set_onended(Some(on_ended.as_ref().unchecked_ref()));
            }
        }
        self.on_ended = Some(on_ended);
    }
}

impl Drop for WebCaptureStream {
    fn drop(&mut self) {
        self.detach_listeners();
    }
}
