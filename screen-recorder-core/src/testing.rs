//! In-crate fakes for the platform traits, shared by the session tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::models::artifact::{Artifact, ArtifactUrl};
use crate::models::config::{CaptureConstraints, RecorderConfiguration};
use crate::models::error::CaptureError;
use crate::models::media_models::{EncoderOptions, TrackInfo, TrackKind};
use crate::models::notification::Notification;
use crate::models::state::SessionStatus;
use crate::session::events::{AttemptId, EventSink, SessionEvent};
use crate::session::manager::SessionManager;
use crate::traits::artifact_host::ArtifactHost;
use crate::traits::capture_source::{CaptureSource, CaptureStream};
use crate::traits::clock::Clock;
use crate::traits::media_encoder::{EncoderHandle, MediaEncoder};
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::ticker::Ticker;

// --- Clock ---

#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at_millis(ms: i64) -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc.timestamp_millis_opt(ms).unwrap())),
        }
    }

    pub fn advance_millis(&self, ms: i64) {
        *self.now.lock() += chrono::Duration::milliseconds(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

// --- Capture ---

struct StreamState {
    id: usize,
    tracks: Vec<TrackInfo>,
    stop_calls: usize,
    ended_watch: Option<(AttemptId, EventSink)>,
}

#[derive(Clone)]
pub struct FakeStream {
    inner: Arc<Mutex<StreamState>>,
}

impl FakeStream {
    fn new(id: usize) -> Self {
        let track = |kind: TrackKind, label: &str| TrackInfo {
            id: format!("{}-{}", id, label),
            kind,
            label: label.to_string(),
            live: true,
        };
        Self {
            inner: Arc::new(Mutex::new(StreamState {
                id,
                tracks: vec![track(TrackKind::Video, "screen"), track(TrackKind::Audio, "system")],
                stop_calls: 0,
                ended_watch: None,
            })),
        }
    }

    pub fn id(&self) -> usize {
        self.inner.lock().id
    }

    pub fn is_live(&self) -> bool {
        self.has_live_tracks()
    }

    pub fn stop_calls(&self) -> usize {
        self.inner.lock().stop_calls
    }

    pub fn is_watched(&self) -> bool {
        self.inner.lock().ended_watch.is_some()
    }

    /// Simulate the user pressing the platform's "stop sharing" control.
    pub fn end_externally(&self) {
        let watch = {
            let mut s = self.inner.lock();
            for track in &mut s.tracks {
                track.live = false;
            }
            s.ended_watch.clone()
        };
        if let Some((attempt, events)) = watch {
            events(SessionEvent::SourceEnded { attempt });
        }
    }
}

impl CaptureStream for FakeStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        self.inner.lock().tracks.clone()
    }

    fn stop_all(&mut self) {
        let mut s = self.inner.lock();
        s.stop_calls += 1;
        for track in &mut s.tracks {
            track.live = false;
        }
    }

    fn watch_ended(&mut self, attempt: AttemptId, events: EventSink) {
        self.inner.lock().ended_watch = Some((attempt, events));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GrantMode {
    Grant,
    Reject(CaptureError),
    Defer,
}

struct SourceState {
    supported: bool,
    mode: GrantMode,
    request_error: Option<CaptureError>,
    requests: Vec<(AttemptId, CaptureConstraints)>,
    pending: Vec<(AttemptId, EventSink)>,
    granted: HashMap<AttemptId, FakeStream>,
    created: Vec<FakeStream>,
}

#[derive(Clone)]
pub struct FakeCaptureSource {
    inner: Arc<Mutex<SourceState>>,
}

impl FakeCaptureSource {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SourceState {
                supported: true,
                mode: GrantMode::Grant,
                request_error: None,
                requests: Vec::new(),
                pending: Vec::new(),
                granted: HashMap::new(),
                created: Vec::new(),
            })),
        }
    }

    pub fn set_mode(&self, mode: GrantMode) {
        self.inner.lock().mode = mode;
    }

    pub fn set_supported(&self, supported: bool) {
        self.inner.lock().supported = supported;
    }

    pub fn fail_requests(&self, err: CaptureError) {
        self.inner.lock().request_error = Some(err);
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn last_constraints(&self) -> Option<CaptureConstraints> {
        self.inner.lock().requests.last().map(|(_, c)| c.clone())
    }

    pub fn created_streams(&self) -> Vec<FakeStream> {
        self.inner.lock().created.clone()
    }

    pub fn last_stream(&self) -> FakeStream {
        self.created_streams().pop().expect("no stream created")
    }

    /// Grant the oldest deferred request.
    pub fn grant_pending(&self) {
        let (attempt, events) = {
            let mut s = self.inner.lock();
            let (attempt, events) = s.pending.remove(0);
            let stream = FakeStream::new(s.created.len());
            s.created.push(stream.clone());
            s.granted.insert(attempt, stream);
            (attempt, events)
        };
        events(SessionEvent::StreamGranted { attempt });
    }

    /// Reject the oldest deferred request.
    pub fn reject_pending(&self, error: CaptureError) {
        let (attempt, events) = self.inner.lock().pending.remove(0);
        events(SessionEvent::StreamRejected { attempt, error });
    }
}

impl CaptureSource for FakeCaptureSource {
    type Stream = FakeStream;

    fn is_supported(&self) -> bool {
        self.inner.lock().supported
    }

    fn request_stream(
        &mut self,
        constraints: &CaptureConstraints,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<(), CaptureError> {
        let mut s = self.inner.lock();
        s.requests.push((attempt, constraints.clone()));
        if let Some(err) = s.request_error.clone() {
            return Err(err);
        }
        match s.mode.clone() {
            GrantMode::Grant => {
                let stream = FakeStream::new(s.created.len());
                s.created.push(stream.clone());
                s.granted.insert(attempt, stream);
                events(SessionEvent::StreamGranted { attempt });
            }
            GrantMode::Reject(error) => events(SessionEvent::StreamRejected { attempt, error }),
            GrantMode::Defer => s.pending.push((attempt, events)),
        }
        Ok(())
    }

    fn take_stream(&mut self, attempt: AttemptId) -> Option<FakeStream> {
        self.inner.lock().granted.remove(&attempt)
    }
}

// --- Encoder ---

struct HandleState {
    attempt: AttemptId,
    events: EventSink,
    mime: Option<String>,
    timeslice: Option<Duration>,
    start_error: Option<CaptureError>,
    stop_calls: usize,
    active: bool,
    finish_on_stop: bool,
    stream_id: usize,
}

#[derive(Clone)]
pub struct FakeEncoderHandle {
    inner: Arc<Mutex<HandleState>>,
}

impl FakeEncoderHandle {
    pub fn emit(&self, data: Vec<u8>) {
        let s = self.inner.lock();
        (s.events)(SessionEvent::DataAvailable {
            attempt: s.attempt,
            data,
        });
    }

    pub fn emit_error(&self, message: &str) {
        let s = self.inner.lock();
        (s.events)(SessionEvent::EncoderError {
            attempt: s.attempt,
            message: message.to_string(),
        });
    }

    /// Report the encoder as stopped without being asked to.
    pub fn finish(&self) {
        let mut s = self.inner.lock();
        s.active = false;
        (s.events)(SessionEvent::EncoderStopped { attempt: s.attempt });
    }

    pub fn stop_calls(&self) -> usize {
        self.inner.lock().stop_calls
    }

    pub fn timeslice(&self) -> Option<Duration> {
        self.inner.lock().timeslice
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    pub fn stream_id(&self) -> usize {
        self.inner.lock().stream_id
    }
}

impl EncoderHandle for FakeEncoderHandle {
    fn start(&mut self, timeslice: Duration) -> Result<(), CaptureError> {
        let mut s = self.inner.lock();
        if let Some(err) = s.start_error.clone() {
            return Err(err);
        }
        s.timeslice = Some(timeslice);
        s.active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let mut s = self.inner.lock();
        s.stop_calls += 1;
        if !s.active {
            return Ok(());
        }
        s.active = false;
        if s.finish_on_stop {
            (s.events)(SessionEvent::EncoderStopped { attempt: s.attempt });
        }
        Ok(())
    }

    fn mime_type(&self) -> Option<String> {
        self.inner.lock().mime.clone()
    }
}

struct EncoderState {
    supported: bool,
    supported_types: Vec<String>,
    reported_mime: Option<Option<String>>,
    create_error: Option<CaptureError>,
    start_error: Option<CaptureError>,
    finish_on_stop: bool,
    last_options: Option<EncoderOptions>,
    handles: Vec<FakeEncoderHandle>,
}

#[derive(Clone)]
pub struct FakeEncoder {
    inner: Arc<Mutex<EncoderState>>,
}

impl FakeEncoder {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EncoderState {
                supported: true,
                supported_types: vec!["video/webm;codecs=vp8,opus".into(), "video/webm".into()],
                reported_mime: None,
                create_error: None,
                start_error: None,
                finish_on_stop: true,
                last_options: None,
                handles: Vec::new(),
            })),
        }
    }

    pub fn set_supported(&self, supported: bool) {
        self.inner.lock().supported = supported;
    }

    pub fn set_supported_types(&self, types: &[&str]) {
        self.inner.lock().supported_types = types.iter().map(|t| t.to_string()).collect();
    }

    /// Override what `mime_type()` reports on new handles.
    pub fn report_mime(&self, mime: Option<&str>) {
        self.inner.lock().reported_mime = Some(mime.map(str::to_string));
    }

    pub fn fail_create(&self, err: CaptureError) {
        self.inner.lock().create_error = Some(err);
    }

    pub fn fail_start(&self, err: CaptureError) {
        self.inner.lock().start_error = Some(err);
    }

    /// Whether `stop()` immediately reports `EncoderStopped`.
    pub fn set_finish_on_stop(&self, finish: bool) {
        self.inner.lock().finish_on_stop = finish;
    }

    pub fn last_options(&self) -> Option<EncoderOptions> {
        self.inner.lock().last_options.clone()
    }

    pub fn handle_count(&self) -> usize {
        self.inner.lock().handles.len()
    }

    pub fn last_handle(&self) -> FakeEncoderHandle {
        self.inner.lock().handles.last().cloned().expect("no encoder created")
    }
}

impl MediaEncoder for FakeEncoder {
    type Stream = FakeStream;
    type Handle = FakeEncoderHandle;

    fn is_supported(&self) -> bool {
        self.inner.lock().supported
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.inner
            .lock()
            .supported_types
            .iter()
            .any(|t| t == mime_type)
    }

    fn create(
        &mut self,
        stream: &FakeStream,
        options: &EncoderOptions,
        attempt: AttemptId,
        events: EventSink,
    ) -> Result<FakeEncoderHandle, CaptureError> {
        let mut s = self.inner.lock();
        s.last_options = Some(options.clone());
        if let Some(err) = s.create_error.clone() {
            return Err(err);
        }
        let mime = match &s.reported_mime {
            Some(reported) => reported.clone(),
            None => options.mime_type.clone(),
        };
        let handle = FakeEncoderHandle {
            inner: Arc::new(Mutex::new(HandleState {
                attempt,
                events,
                mime,
                timeslice: None,
                start_error: s.start_error.clone(),
                stop_calls: 0,
                active: false,
                finish_on_stop: s.finish_on_stop,
                stream_id: stream.id(),
            })),
        };
        s.handles.push(handle.clone());
        Ok(handle)
    }
}

// --- Host ---

#[derive(Default)]
struct HostState {
    next_id: usize,
    live: Vec<ArtifactUrl>,
    revoked: Vec<ArtifactUrl>,
    saves: Vec<(String, usize)>,
    publish_error: Option<CaptureError>,
    save_error: Option<CaptureError>,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    inner: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn live(&self) -> Vec<ArtifactUrl> {
        self.inner.lock().live.clone()
    }

    pub fn revoked(&self) -> Vec<ArtifactUrl> {
        self.inner.lock().revoked.clone()
    }

    /// `(file name, byte length)` for each save.
    pub fn saves(&self) -> Vec<(String, usize)> {
        self.inner.lock().saves.clone()
    }

    pub fn fail_publish(&self, err: CaptureError) {
        self.inner.lock().publish_error = Some(err);
    }

    pub fn fail_save(&self, err: CaptureError) {
        self.inner.lock().save_error = Some(err);
    }
}

impl ArtifactHost for FakeHost {
    fn publish(&mut self, _artifact: &Artifact) -> Result<ArtifactUrl, CaptureError> {
        let mut s = self.inner.lock();
        if let Some(err) = s.publish_error.clone() {
            return Err(err);
        }
        s.next_id += 1;
        let url = ArtifactUrl::new(format!("blob:test/{}", s.next_id));
        s.live.push(url.clone());
        Ok(url)
    }

    fn revoke(&mut self, url: &ArtifactUrl) {
        let mut s = self.inner.lock();
        s.live.retain(|u| u != url);
        s.revoked.push(url.clone());
    }

    fn save(&mut self, artifact: &Artifact, file_name: &str) -> Result<String, CaptureError> {
        let mut s = self.inner.lock();
        if let Some(err) = s.save_error.clone() {
            return Err(err);
        }
        s.saves.push((file_name.to_string(), artifact.len()));
        Ok(format!("downloads/{}", file_name))
    }
}

// --- Ticker ---

#[derive(Default)]
struct TickerState {
    running: bool,
    starts: usize,
    interval: Option<Duration>,
    start_error: Option<CaptureError>,
}

#[derive(Clone, Default)]
pub struct ManualTicker {
    inner: Arc<Mutex<TickerState>>,
}

impl ManualTicker {
    pub fn starts(&self) -> usize {
        self.inner.lock().starts
    }

    pub fn interval(&self) -> Option<Duration> {
        self.inner.lock().interval
    }

    pub fn fail_start(&self, err: CaptureError) {
        self.inner.lock().start_error = Some(err);
    }
}

impl Ticker for ManualTicker {
    fn start(
        &mut self,
        interval: Duration,
        _attempt: AttemptId,
        _events: EventSink,
    ) -> Result<(), CaptureError> {
        let mut s = self.inner.lock();
        if let Some(err) = s.start_error.clone() {
            return Err(err);
        }
        s.running = true;
        s.starts += 1;
        s.interval = Some(interval);
        Ok(())
    }

    fn stop(&mut self) {
        self.inner.lock().running = false;
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }
}

// --- Delegate ---

#[derive(Default)]
pub struct RecordingDelegate {
    pub statuses: Mutex<Vec<SessionStatus>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub elapsed: Mutex<Vec<u64>>,
    pub artifacts: Mutex<Vec<usize>>,
}

impl SessionDelegate for RecordingDelegate {
    fn on_status_changed(&self, status: &SessionStatus) {
        self.statuses.lock().push(status.clone());
    }

    fn on_elapsed_updated(&self, elapsed_secs: u64) {
        self.elapsed.lock().push(elapsed_secs);
    }

    fn on_notification(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
    }

    fn on_artifact_ready(&self, artifact: &Artifact) {
        self.artifacts.lock().push(artifact.len());
    }
}

// --- Harness ---

pub type TestManager = SessionManager<FakeCaptureSource, FakeEncoder, FakeHost>;

pub const START_MS: i64 = 1_700_000_000_000;

pub struct Harness {
    pub manager: TestManager,
    pub source: FakeCaptureSource,
    pub encoder: FakeEncoder,
    pub host: FakeHost,
    pub clock: ManualClock,
    pub ticker: ManualTicker,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RecorderConfiguration::default())
    }

    pub fn with_config(config: RecorderConfiguration) -> Self {
        let source = FakeCaptureSource::new();
        let encoder = FakeEncoder::new();
        let host = FakeHost::default();
        let clock = ManualClock::at_millis(START_MS);
        let ticker = ManualTicker::default();

        let manager = SessionManager::new(source.clone(), encoder.clone(), host.clone(), config)
            .expect("valid configuration")
            .with_ticker(Box::new(ticker.clone()))
            .with_clock(Arc::new(clock.clone()));

        Self {
            manager,
            source,
            encoder,
            host,
            clock,
            ticker,
        }
    }

    /// A harness already in `Recording`.
    pub fn recording() -> Self {
        let mut h = Self::new();
        h.manager.start();
        assert_eq!(h.manager.status(), &SessionStatus::Recording);
        h
    }

    pub fn send_chunk(&mut self, data: Vec<u8>) {
        self.encoder.last_handle().emit(data);
        self.manager.process_events();
    }

    /// Advance the clock and deliver one tick.
    pub fn tick_after(&mut self, ms: i64) {
        self.clock.advance_millis(ms);
        let attempt = self.manager.attempt();
        (self.manager.event_sink())(SessionEvent::Tick { attempt });
        self.manager.process_events();
    }
}
