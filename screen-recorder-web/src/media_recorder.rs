//! Chunked encoding through `MediaRecorder`.
//!
//! `dataavailable` hands over a `Blob`; its bytes arrive later through
//! `Blob.arrayBuffer()`. A `ChunkSequencer` keeps those conversions in
//! announcement order and holds back `EncoderStopped` until the last one
//! has been delivered, so the session never finalizes with chunks missing.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Blob, BlobEvent, Event, MediaRecorder, MediaRecorderOptions, RecordingState};

use screen_recorder_core::{
    AttemptId, CaptureError, ChunkSequencer, EncoderHandle, EncoderOptions, EventSink, MediaEncoder,
    SessionEvent,
};

use crate::display_capture::WebCaptureStream;
use crate::support;
use crate::waker::Waker;

pub struct WebMediaEncoder {
    waker: Waker,
}

impl WebMediaEncoder {
    pub fn new(waker: Waker) -> Self {
        Self { waker }
    }
}

impl MediaEncoder for WebMediaEncoder {
    type Stream = WebCaptureStream;
    type Handle = WebEncoderHandle;

    fn is_supported(&self) -> bool {
        support::is_media_recorder_supported()
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        MediaRecorder::is_type_supported(mime_type)
    }

    fn create(
        &mut self,
        stream: &WebCaptureStream,
        options: &EncoderOptions,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<WebEncoderHandle, CaptureError> {
        let recorder_options = MediaRecorderOptions::new();
        if let Some(mime_type) = &options.mime_type {
            recorder_options.set_mime_type(mime_type);
        }
        if let Some(bits) = options.video_bits_per_second {
            recorder_options.set_video_bits_per_second(bits);
        }
        if let Some(bits) = options.audio_bits_per_second {
            recorder_options.set_audio_bits_per_second(bits);
        }

        let recorder = MediaRecorder::new_with_media_stream_and_media_recorder_options(
            stream.media_stream(),
            &recorder_options,
        )
        .map_err(|e| support::to_capture_error(&e))?;

        log::debug!(
            "MediaRecorder created for attempt {} (requested {:?})",
            attempt,
            options.mime_type
        );
        Ok(WebEncoderHandle::attach(recorder, attempt, events, self.waker.clone()))
    }
}

/// Shared between the recorder callbacks and the pending chunk reads.
#[derive(Default)]
struct Delivery {
    sequencer: ChunkSequencer,
    stop_reported: bool,
}

impl Delivery {
    /// True exactly once, the first time the recorder is stopped and drained.
    fn take_stop(&mut self) -> bool {
        if self.sequencer.is_drained() && !self.stop_reported {
            self.stop_reported = true;
            true
        } else {
            false
        }
    }
}

pub struct WebEncoderHandle {
    recorder: MediaRecorder,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
    _on_stop: Closure<dyn FnMut(Event)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl WebEncoderHandle {
    fn attach(recorder: MediaRecorder, attempt: AttemptId, events: EventSink, waker: Waker) -> Self {
        let delivery = Rc::new(RefCell::new(Delivery::default()));

        let on_data = {
            let delivery = Rc::clone(&delivery);
            let events = events.clone();
            let waker = waker.clone();
            Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
                let Some(blob) = event.data() else { return };
                if blob.size() == 0.0 {
                    return;
                }
                let seq = delivery.borrow_mut().sequencer.reserve();
                spawn_local(read_chunk(
                    blob,
                    seq,
                    Rc::clone(&delivery),
                    attempt,
                    events.clone(),
                    waker.clone(),
                ));
            })
        };

        let on_stop = {
            let delivery = Rc::clone(&delivery);
            let events = events.clone();
            let waker = waker.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                let stopped = {
                    let mut delivery = delivery.borrow_mut();
                    delivery.sequencer.request_stop();
                    delivery.take_stop()
                };
                if stopped {
                    events(SessionEvent::EncoderStopped { attempt });
                    waker.wake();
                }
            })
        };

        let on_error = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let message = Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .filter(|err| !err.is_undefined() && !err.is_null())
                .map(|err| support::describe(&err))
                .unwrap_or_else(|| "MediaRecorder error".to_string());
            events(SessionEvent::EncoderError { attempt, message });
            waker.wake();
        });

        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        recorder.set_onstop(Some(on_stop.as_ref().unchecked_ref()));
        recorder.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Self {
            recorder,
            _on_data: on_data,
            _on_stop: on_stop,
            _on_error: on_error,
        }
    }
}

async fn read_chunk(
    blob: Blob,
    seq: u64,
    delivery: Rc<RefCell<Delivery>>,
    attempt: AttemptId,
    events: EventSink,
    waker: Waker,
) {
    let data = match JsFuture::from(blob.array_buffer()).await {
        Ok(buffer) => Uint8Array::new(&buffer).to_vec(),
        Err(err) => {
            // A recording with a missing chunk is unplayable, so fail the
            // session. The empty slot keeps the sequencer able to drain.
            let message = format!("failed to read recorded chunk {}: {}", seq, support::describe(&err));
            log::error!("{}", message);
            events(SessionEvent::EncoderError { attempt, message });
            Vec::new()
        }
    };

    let (ready, stopped) = {
        let mut delivery = delivery.borrow_mut();
        let ready = delivery.sequencer.complete(seq, data);
        (ready, delivery.take_stop())
    };

    for data in ready {
        events(SessionEvent::DataAvailable { attempt, data });
    }
    if stopped {
        events(SessionEvent::EncoderStopped { attempt });
    }
    waker.wake();
}

impl EncoderHandle for WebEncoderHandle {
    fn start(&mut self, timeslice: Duration) -> Result<(), CaptureError> {
        let millis = i32::try_from(timeslice.as_millis()).unwrap_or(i32::MAX);
        self.recorder
            .start_with_time_slice(millis)
            .map_err(|e| support::to_encoding_error(&e))
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if self.recorder.state() == RecordingState::Inactive {
            return Ok(());
        }
        self.recorder.stop().map_err(|e| support::to_encoding_error(&e))
    }

    fn mime_type(&self) -> Option<String> {
        let mime_type = self.recorder.mime_type();
        if mime_type.is_empty() {
            None
        } else {
            Some(mime_type)
        }
    }
}

impl Drop for WebEncoderHandle {
    fn drop(&mut self) {
        self.recorder.set_ondataavailable(None);
        self.recorder.set_onstop(None);
        self.recorder.set_onerror(None);
    }
}
