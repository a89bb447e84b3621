use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::artifact::Artifact;
use crate::models::config::RecorderConfiguration;
use crate::models::error::CaptureError;
use crate::models::media_models::EncoderOptions;
use crate::models::notification::{Notification, NotificationKind};
use crate::models::state::SessionStatus;
use crate::models::view::SessionView;
use crate::processing::chunk_buffer::ChunkBuffer;
use crate::processing::elapsed::format_elapsed;
use crate::processing::mime;
use crate::session::events::{AttemptId, EventQueue, EventSink, SessionEvent};
use crate::session::ticker::ThreadTicker;
use crate::traits::artifact_host::ArtifactHost;
use crate::traits::capture_source::{CaptureSource, CaptureStream};
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::media_encoder::{EncoderHandle, MediaEncoder};
use crate::traits::recorder_session::RecorderSession;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::ticker::Ticker;

/// Everything owned by the current recording attempt.
struct Session<S, R> {
    status: SessionStatus,
    stream: Option<S>,
    recorder: Option<R>,
    /// Container chosen when the encoder was created.
    mime_type: Option<String>,
    chunks: ChunkBuffer,
    started_at: Option<DateTime<Utc>>,
    elapsed_secs: u64,
    artifact: Option<Artifact>,
    notification: Option<Notification>,
}

impl<S, R> Session<S, R> {
    fn new() -> Self {
        Self {
            status: SessionStatus::Ready,
            stream: None,
            recorder: None,
            mime_type: None,
            chunks: ChunkBuffer::new(),
            started_at: None,
            elapsed_secs: 0,
            artifact: None,
            notification: None,
        }
    }
}

/// Single-session screen recording manager.
///
/// Generic over the platform's capture source, media encoder and artifact
/// host. Platform callbacks feed `SessionEvent`s into an internal queue;
/// every intent drains that queue, and hosts call `process_events` when
/// callbacks fire between intents.
///
/// ```text
/// start() ──► [CaptureSource] ──StreamGranted──► [MediaEncoder] ──DataAvailable──► [ChunkBuffer]
/// stop() / SourceEnded ──► encoder.stop() ──EncoderStopped──► concat ──► [ArtifactHost]
/// ```
pub struct SessionManager<C, E, H>
where
    C: CaptureSource,
    E: MediaEncoder<Stream = C::Stream>,
    H: ArtifactHost,
{
    capture: C,
    encoder: E,
    host: H,
    ticker: Box<dyn Ticker>,
    clock: Arc<dyn Clock>,
    config: RecorderConfiguration,
    delegate: Option<Arc<dyn SessionDelegate>>,
    queue: EventQueue,
    attempt: AttemptId,
    session: Session<C::Stream, E::Handle>,
}

impl<C, E, H> SessionManager<C, E, H>
where
    C: CaptureSource,
    E: MediaEncoder<Stream = C::Stream>,
    H: ArtifactHost,
{
    pub fn new(
        capture: C,
        encoder: E,
        host: H,
        config: RecorderConfiguration,
    ) -> Result<Self, CaptureError> {
        config.validate()?;
        Ok(Self {
            capture,
            encoder,
            host,
            ticker: Box::new(ThreadTicker::new()),
            clock: Arc::new(SystemClock),
            config,
            delegate: None,
            queue: EventQueue::new(),
            attempt: AttemptId::default(),
            session: Session::new(),
        })
    }

    pub fn with_ticker(mut self, ticker: Box<dyn Ticker>) -> Self {
        self.ticker = ticker;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    pub fn status(&self) -> &SessionStatus {
        &self.session.status
    }

    pub fn is_recording(&self) -> bool {
        self.session.status.is_recording()
    }

    /// Whole seconds since recording started; zero unless recording.
    pub fn elapsed_seconds(&self) -> u64 {
        if self.session.status.is_recording() {
            self.session.elapsed_secs
        } else {
            0
        }
    }

    /// Elapsed time as `MM:SS`.
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed_seconds())
    }

    /// The finalized recording, once `Complete`.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.session.artifact.as_ref()
    }

    /// The most recent notification, unless it has expired.
    pub fn notification(&self) -> Option<&Notification> {
        let now = self.clock.now();
        self.session
            .notification
            .as_ref()
            .filter(|n| n.is_active_at(now))
    }

    /// The live capture stream, while starting or recording.
    pub fn stream(&self) -> Option<&C::Stream> {
        self.session.stream.as_ref()
    }

    pub fn chunk_count(&self) -> usize {
        self.session.chunks.len()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.session.chunks.total_bytes()
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// A sink that queues events for this manager.
    pub fn event_sink(&self) -> EventSink {
        self.queue.sink()
    }

    /// Apply every queued event in arrival order. Returns how many ran.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.pop() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Block until events arrive or `timeout` passes, then process them.
    pub fn wait_for_events(&mut self, timeout: Duration) -> usize {
        if self.queue.wait(timeout) {
            self.process_events()
        } else {
            0
        }
    }

    /// Request a capture stream. Transitions: ready/complete/failed → starting.
    ///
    /// Ignored while an attempt is starting, recording or processing.
    pub fn start(&mut self) {
        self.process_events();
        if self.session.status.is_busy() {
            log::debug!("start ignored: session is {}", self.session.status.label());
            return;
        }

        self.reset_session();

        if !self.capture.is_supported() || !self.encoder.is_supported() {
            self.fail(CaptureError::UnsupportedEnvironment);
            return;
        }

        self.attempt = self.attempt.next();
        let attempt = self.attempt;
        self.set_status(SessionStatus::Starting);
        log::info!("requesting capture stream for attempt {}", attempt);

        let sink = self.queue.sink();
        if let Err(err) = self
            .capture
            .request_stream(&self.config.constraints, attempt, sink)
        {
            self.fail(err);
            return;
        }

        self.process_events();
    }

    /// Stop recording. Transitions: recording → processing → complete/failed.
    ///
    /// While starting, the pending attempt is abandoned instead; any stream
    /// granted for it later is stopped unused.
    pub fn stop(&mut self) {
        self.process_events();
        match self.session.status {
            SessionStatus::Recording => {
                log::info!("stopping recording attempt {}", self.attempt);
                self.begin_stop(false);
            }
            SessionStatus::Starting => {
                log::info!("stop requested before capture began; abandoning attempt {}", self.attempt);
                self.attempt = self.attempt.next();
                self.fail(CaptureError::UserCancelled);
            }
            _ => {
                log::debug!("stop ignored: session is {}", self.session.status.label());
                return;
            }
        }
        self.process_events();
    }

    /// Save the finished recording. Only valid when `Complete`.
    pub fn download(&mut self) -> Option<String> {
        self.process_events();

        if !self.session.status.is_complete() || self.session.artifact.is_none() {
            log::debug!("download ignored: session is {}", self.session.status.label());
            let err = CaptureError::NoArtifact;
            self.notify(err.user_message(), err.notification_kind());
            return None;
        }
        let artifact = self.session.artifact.as_ref()?;

        let file_name = artifact.file_name(&self.config.file_prefix);
        match self.host.save(artifact, &file_name) {
            Ok(location) => {
                log::info!("saved recording to {}", location);
                self.notify(format!("Downloading {file_name}"), NotificationKind::Success);
                Some(location)
            }
            Err(err) => {
                log::error!("failed to save recording {}: {}", file_name, err);
                self.notify(err.user_message(), NotificationKind::Error);
                None
            }
        }
    }

    pub fn view(&self) -> SessionView {
        let status = &self.session.status;
        let artifact = self.session.artifact.as_ref().filter(|_| status.is_complete());
        let elapsed_seconds = self.elapsed_seconds();
        SessionView {
            status: status.label().to_string(),
            is_recording: status.is_recording(),
            elapsed_seconds,
            elapsed: format_elapsed(elapsed_seconds),
            notification: self.notification().cloned(),
            artifact_ready: artifact.is_some(),
            preview_url: artifact.and_then(|a| a.preview()).map(|u| u.to_string()),
            artifact_size: artifact.map(|a| a.len() as u64),
            mime_type: artifact.map(|a| a.mime_type().to_string()),
            error: status.error().map(|e| e.to_string()),
        }
    }

    // --- Event handling ---

    fn handle_event(&mut self, event: SessionEvent) {
        let attempt = event.attempt();
        if attempt != self.attempt {
            if let SessionEvent::StreamGranted { attempt } = event {
                self.discard_stale_stream(attempt);
            } else {
                log::debug!("ignoring {} from superseded attempt {}", event_name(&event), attempt);
            }
            return;
        }

        match event {
            SessionEvent::StreamGranted { attempt } => self.on_stream_granted(attempt),
            SessionEvent::StreamRejected { error, .. } => {
                if matches!(self.session.status, SessionStatus::Starting) {
                    self.fail(error);
                } else {
                    log::debug!("ignoring stream rejection while {}", self.session.status.label());
                }
            }
            SessionEvent::SourceEnded { .. } => {
                if self.session.status.is_recording() {
                    log::info!("capture source ended; stopping attempt {}", self.attempt);
                    self.begin_stop(false);
                }
            }
            SessionEvent::DataAvailable { data, .. } => match self.session.status {
                SessionStatus::Recording | SessionStatus::Processing => {
                    let len = data.len();
                    if self.session.chunks.push(data) {
                        log::trace!("buffered chunk {} ({} bytes)", self.session.chunks.len(), len);
                    }
                }
                _ => log::debug!("dropping chunk received while {}", self.session.status.label()),
            },
            SessionEvent::EncoderStopped { .. } => match self.session.status {
                SessionStatus::Recording => {
                    log::warn!("encoder stopped on its own; finalizing attempt {}", self.attempt);
                    self.begin_stop(true);
                    if matches!(self.session.status, SessionStatus::Processing) {
                        self.finalize();
                    }
                }
                SessionStatus::Processing => self.finalize(),
                _ => log::debug!("ignoring encoder stop while {}", self.session.status.label()),
            },
            SessionEvent::EncoderError { message, .. } => {
                if self.session.status.is_busy() {
                    log::error!("encoder error during attempt {}: {}", self.attempt, message);
                    self.fail(CaptureError::EncodingError(message));
                }
            }
            SessionEvent::Tick { .. } => {
                if self.session.status.is_recording() {
                    self.update_elapsed();
                }
            }
        }
    }

    fn discard_stale_stream(&mut self, attempt: AttemptId) {
        if let Some(mut stream) = self.capture.take_stream(attempt) {
            log::info!("stopping stream granted to superseded attempt {}", attempt);
            stream.stop_all();
        }
    }

    fn on_stream_granted(&mut self, attempt: AttemptId) {
        let Some(stream) = self.capture.take_stream(attempt) else {
            if matches!(self.session.status, SessionStatus::Starting) {
                log::error!("capture source reported a stream for {} but has none", attempt);
                self.fail(CaptureError::SourceUnavailable);
            }
            return;
        };

        if !matches!(self.session.status, SessionStatus::Starting) {
            let mut stream = stream;
            stream.stop_all();
            return;
        }

        self.begin_recording(stream);
    }

    /// Transition: starting → recording.
    fn begin_recording(&mut self, stream: C::Stream) {
        let attempt = self.attempt;

        let encoder = &self.encoder;
        let selected = mime::select_container(&self.config.mime_preferences, |m| {
            encoder.is_type_supported(m)
        });
        match &selected {
            Some(mime_type) => log::info!("encoding as {}", mime_type),
            None => log::warn!("no preferred container supported; using platform default"),
        }

        let options = EncoderOptions {
            mime_type: selected.clone(),
            video_bits_per_second: self.config.video_bits_per_second,
            audio_bits_per_second: self.config.audio_bits_per_second,
        };

        self.session.chunks.reset();
        let created = self
            .encoder
            .create(&stream, &options, attempt, self.queue.sink());
        self.session.stream = Some(stream);

        let mut recorder = match created {
            Ok(recorder) => recorder,
            Err(err) => {
                self.fail(err);
                return;
            }
        };

        let started = recorder.start(self.config.timeslice());
        self.session.mime_type = recorder.mime_type().or(selected);
        self.session.recorder = Some(recorder);
        if let Err(err) = started {
            self.fail(err);
            return;
        }

        let sink = self.queue.sink();
        if let Some(stream) = self.session.stream.as_mut() {
            stream.watch_ended(attempt, sink);
        }

        self.session.started_at = Some(self.clock.now());
        self.session.elapsed_secs = 0;

        let sink = self.queue.sink();
        if let Err(err) = self.ticker.start(self.config.tick_interval(), attempt, sink) {
            self.fail(err);
            return;
        }

        self.set_status(SessionStatus::Recording);
        self.notify("Recording started", NotificationKind::Info);
    }

    /// Transition: recording → processing.
    fn begin_stop(&mut self, encoder_stopped: bool) {
        self.update_elapsed();
        self.set_status(SessionStatus::Processing);
        self.ticker.stop();

        if !encoder_stopped {
            if let Some(recorder) = self.session.recorder.as_mut() {
                if let Err(err) = recorder.stop() {
                    self.fail(err);
                    return;
                }
            }
        }

        if let Some(mut stream) = self.session.stream.take() {
            stream.stop_all();
        }
    }

    /// Transition: processing → complete/failed.
    fn finalize(&mut self) {
        let reported = self
            .session
            .recorder
            .take()
            .and_then(|recorder| recorder.mime_type())
            .filter(|m| !m.is_empty());

        let chunk_count = self.session.chunks.len();
        let bytes = self.session.chunks.take_concat();
        if chunk_count == 0 || bytes.is_empty() {
            self.fail(CaptureError::EmptyResult);
            return;
        }

        let mime_type = reported
            .or_else(|| self.session.mime_type.clone())
            .unwrap_or_else(|| self.config.fallback_mime_type.clone());

        let mut artifact = Artifact::new(
            bytes,
            mime_type,
            self.clock.now(),
            self.session.elapsed_secs,
            chunk_count,
        );

        match self.host.publish(&artifact) {
            Ok(url) => artifact.set_preview(url),
            Err(err) => {
                self.fail(err);
                return;
            }
        }

        log::info!(
            "recording complete: {} bytes in {} chunks ({})",
            artifact.len(),
            chunk_count,
            artifact.mime_type()
        );
        self.session.artifact = Some(artifact);
        self.set_status(SessionStatus::Complete);
        self.notify(
            "Recording complete. Preview it below or download the file.",
            NotificationKind::Success,
        );

        if let (Some(delegate), Some(artifact)) = (&self.delegate, &self.session.artifact) {
            delegate.on_artifact_ready(artifact);
        }
    }

    /// Transition: any → failed. Releases the ticker, encoder and stream.
    fn fail(&mut self, err: CaptureError) {
        log::warn!("recording attempt {} failed: {}", self.attempt, err);
        self.release_resources();
        self.session.chunks.reset();

        let text = err.user_message();
        let kind = err.notification_kind();
        self.set_status(SessionStatus::Failed(err));
        self.notify(text, kind);
    }

    // --- Internal helpers ---

    fn release_resources(&mut self) {
        self.ticker.stop();
        if let Some(mut recorder) = self.session.recorder.take() {
            if let Err(err) = recorder.stop() {
                log::debug!("encoder stop during cleanup failed: {}", err);
            }
        }
        if let Some(mut stream) = self.session.stream.take() {
            stream.stop_all();
        }
    }

    /// Discard everything from the previous attempt.
    fn reset_session(&mut self) {
        self.release_resources();
        if let Some(mut artifact) = self.session.artifact.take() {
            if let Some(url) = artifact.take_preview() {
                self.host.revoke(&url);
            }
        }
        self.session.chunks.reset();
        self.session.mime_type = None;
        self.session.started_at = None;
        self.session.elapsed_secs = 0;
        self.session.notification = None;
    }

    fn update_elapsed(&mut self) {
        let Some(started_at) = self.session.started_at else {
            return;
        };
        let secs = u64::try_from((self.clock.now() - started_at).num_seconds()).unwrap_or(0);
        if secs > self.session.elapsed_secs {
            self.session.elapsed_secs = secs;
            if let Some(ref delegate) = self.delegate {
                delegate.on_elapsed_updated(secs);
            }
        }
    }

    fn set_status(&mut self, status: SessionStatus) {
        log::info!("session {} → {}", self.session.status.label(), status.label());
        self.session.status = status;
        if let Some(ref delegate) = self.delegate {
            delegate.on_status_changed(&self.session.status);
        }
    }

    fn notify(&mut self, text: impl Into<String>, kind: NotificationKind) {
        let notification = Notification::new(
            text,
            kind,
            self.clock.now(),
            self.config.notification_ttl(),
        );
        if let Some(ref delegate) = self.delegate {
            delegate.on_notification(&notification);
        }
        self.session.notification = Some(notification);
    }
}

impl<C, E, H> RecorderSession for SessionManager<C, E, H>
where
    C: CaptureSource,
    E: MediaEncoder<Stream = C::Stream>,
    H: ArtifactHost,
{
    fn status(&self) -> SessionStatus {
        self.session.status.clone()
    }

    fn elapsed_seconds(&self) -> u64 {
        Self::elapsed_seconds(self)
    }

    fn start(&mut self) {
        Self::start(self)
    }

    fn stop(&mut self) {
        Self::stop(self)
    }

    fn download(&mut self) -> Option<String> {
        Self::download(self)
    }

    fn view(&self) -> SessionView {
        Self::view(self)
    }
}

impl<C, E, H> Drop for SessionManager<C, E, H>
where
    C: CaptureSource,
    E: MediaEncoder<Stream = C::Stream>,
    H: ArtifactHost,
{
    fn drop(&mut self) {
        self.release_resources();
        if let Some(url) = self.session.artifact.as_mut().and_then(Artifact::take_preview) {
            self.host.revoke(&url);
        }
    }
}

fn event_name(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::StreamGranted { .. } => "stream grant",
        SessionEvent::StreamRejected { .. } => "stream rejection",
        SessionEvent::SourceEnded { .. } => "source end",
        SessionEvent::DataAvailable { .. } => "chunk",
        SessionEvent::EncoderStopped { .. } => "encoder stop",
        SessionEvent::EncoderError { .. } => "encoder error",
        SessionEvent::Tick { .. } => "tick",
    }
}
