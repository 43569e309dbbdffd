use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::backend::{select_mime_type, AudioCaptureSource, CaptureConfig};
use super::spectrum::{FftSpectrum, SpectrumAnalyzer};
use super::state::SessionState;
use crate::analysis::{QualityAnalyzer, QualityMetrics, SilenceGate};
use crate::clip::{AudioBlob, AudioClip, ClipAssembler, ClipMetadata, ClipPayload, UploadQueue};
use crate::enhance::{EnhanceOptions, EnhancementPipeline};
use crate::error::{CaptureError, SubmitError};
use crate::trim::{TrimEngine, TrimSelection};
use crate::waveform::{WaveformAnalyzer, WaveformFrame, WAVEFORM_BINS};

/// Interval between duration-timer ticks.
const TIMER_TICK_MS: u64 = 100;

/// Events surfaced to the host while a session is live.
///
/// The host drives the controller: on `AutoStopped` or `RecorderFault` it
/// must call [`CaptureController::stop_capture`]. Audio past the duration
/// ceiling is dropped by the frame pump regardless, so a missed
/// `AutoStopped` delays finalization but never lengthens the clip.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// Periodic elapsed-time update while recording.
    Tick { elapsed_ms: u64 },
    /// The recording reached its duration ceiling.
    AutoStopped { elapsed_ms: u64 },
    /// The capture stream ended while recording was still active.
    RecorderFault { message: String },
}

/// Everything owned by a live recording: the hardware source and the two
/// repeating tasks. Torn down as a unit from every exit path.
struct ActiveSessionResources {
    source: Box<dyn AudioCaptureSource>,
    timer_task: JoinHandle<()>,
    waveform_task: JoinHandle<()>,
    pump_task: JoinHandle<()>,
}

impl ActiveSessionResources {
    /// Cancel both repeating tasks, stop the hardware source, and wait for
    /// the frame pump to drain the final flush.
    async fn teardown(mut self) {
        self.timer_task.abort();
        self.waveform_task.abort();

        if let Err(e) = self.source.stop().await {
            warn!("Capture source stop failed during teardown: {e}");
        }

        match tokio::time::timeout(Duration::from_secs(1), &mut self.pump_task).await {
            Ok(Err(e)) if e.is_panic() => error!("Frame pump task panicked: {e}"),
            Ok(_) => {}
            Err(_) => {
                warn!("Frame pump did not drain in time, aborting");
                self.pump_task.abort();
            }
        }
    }
}

/// Owns the recording session state machine, the hardware capture source,
/// and the timers; drives the waveform analyzer while recording and runs
/// the silence gate, quality analysis, enhancement, and trim in sequence
/// when the user submits.
///
/// Only one session lives at a time. Every exit path funnels through the
/// single teardown routine on [`ActiveSessionResources`]; async one-shot
/// results are committed only if the session that spawned them is still
/// the active one.
pub struct CaptureController {
    config: CaptureConfig,
    podcast_mode: bool,
    state: SessionState,
    session_id: Uuid,
    max_duration_ms: u64,
    mime_type: Option<&'static str>,

    resources: Option<ActiveSessionResources>,
    recorded: Arc<Mutex<Vec<i16>>>,
    spectrum: Arc<Mutex<Box<dyn SpectrumAnalyzer>>>,
    analyzer: Arc<Mutex<WaveformAnalyzer>>,

    waveform_tx: watch::Sender<WaveformFrame>,
    waveform_rx: watch::Receiver<WaveformFrame>,
    event_tx: mpsc::Sender<ControllerEvent>,
    event_rx: Option<mpsc::Receiver<ControllerEvent>>,

    is_recording: Arc<AtomicBool>,
    ceiling_reached: Arc<AtomicBool>,
    elapsed_ms: Arc<AtomicU64>,

    clip: Option<AudioClip>,
    trim_selection: Option<TrimSelection>,
    volume_level: f32,
    auto_enhance: Option<EnhanceOptions>,

    quality_slot: Arc<Mutex<Option<(Uuid, QualityMetrics)>>>,
    enhanced_slot: Arc<Mutex<Option<(Uuid, AudioBlob)>>>,
}

impl CaptureController {
    pub fn new(config: CaptureConfig) -> Self {
        Self::with_spectrum(config, Box::new(FftSpectrum::new()))
    }

    /// Construct with an injected spectrum analyser backend.
    pub fn with_spectrum(config: CaptureConfig, spectrum: Box<dyn SpectrumAnalyzer>) -> Self {
        let (waveform_tx, waveform_rx) = watch::channel([0.0; WAVEFORM_BINS]);
        let (event_tx, event_rx) = mpsc::channel(64);

        Self {
            config,
            podcast_mode: false,
            state: SessionState::Idle,
            session_id: Uuid::new_v4(),
            max_duration_ms: 0,
            mime_type: None,
            resources: None,
            recorded: Arc::new(Mutex::new(Vec::new())),
            spectrum: Arc::new(Mutex::new(spectrum)),
            analyzer: Arc::new(Mutex::new(WaveformAnalyzer::new())),
            waveform_tx,
            waveform_rx,
            event_tx,
            event_rx: Some(event_rx),
            is_recording: Arc::new(AtomicBool::new(false)),
            ceiling_reached: Arc::new(AtomicBool::new(false)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            clip: None,
            trim_selection: None,
            volume_level: 1.0,
            auto_enhance: None,
            quality_slot: Arc::new(Mutex::new(None)),
            enhanced_slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Ceiling of the running session in milliseconds; fixed when the
    /// recording starts.
    pub fn max_duration_ms(&self) -> u64 {
        self.max_duration_ms
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        self.mime_type
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }

    /// Toggle podcast mode. Only affects sessions started afterwards; the
    /// running session's ceiling was snapshotted at start.
    pub fn set_podcast_mode(&mut self, enabled: bool) {
        self.podcast_mode = enabled;
    }

    pub fn podcast_mode(&self) -> bool {
        self.podcast_mode
    }

    /// Take the controller event stream. Yields `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<ControllerEvent>> {
        self.event_rx.take()
    }

    /// Subscribe to live waveform frames.
    pub fn waveform_frames(&self) -> watch::Receiver<WaveformFrame> {
        self.waveform_rx.clone()
    }

    pub fn clip(&self) -> Option<&AudioClip> {
        self.clip.as_ref()
    }

    fn transition(&mut self, next: SessionState) -> Result<(), CaptureError> {
        if !self.state.can_transition_to(next) {
            return Err(CaptureError::InvalidState {
                expected: format!("a state preceding {next}"),
                actual: self.state.to_string(),
            });
        }
        debug!("Session state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Request the microphone and begin capturing.
    ///
    /// Snapshots the podcast flag into the session's duration ceiling at
    /// this instant, selects the recording encoding from the preference
    /// list, and spawns the duration timer and waveform animation loop.
    pub async fn start_capture(
        &mut self,
        mut source: Box<dyn AudioCaptureSource>,
    ) -> Result<(), CaptureError> {
        self.transition(SessionState::Requesting)?;

        let mime = match select_mime_type(&*source) {
            Some(mime) => mime,
            None => {
                self.state = SessionState::Idle;
                return Err(CaptureError::Device(format!(
                    "capture source '{}' supports no preferred encoding",
                    source.name()
                )));
            }
        };

        let frame_rx = match source.start().await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Failed to acquire capture source: {e}");
                // Hardware acquisition failures abort the session to Idle.
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        // Fresh session identity and per-session state.
        self.session_id = Uuid::new_v4();
        self.max_duration_ms = if self.podcast_mode {
            self.config.max_duration_podcast_ms
        } else {
            self.config.max_duration_short_ms
        };
        self.mime_type = Some(mime);
        self.clip = None;
        self.trim_selection = None;
        self.volume_level = 1.0;
        self.elapsed_ms.store(0, Ordering::SeqCst);
        self.ceiling_reached.store(false, Ordering::SeqCst);
        self.recorded.lock().await.clear();
        self.analyzer.lock().await.reset();
        self.spectrum.lock().await.reset();
        *self.quality_slot.lock().await = None;
        *self.enhanced_slot.lock().await = None;
        let _ = self.waveform_tx.send([0.0; WAVEFORM_BINS]);

        self.is_recording.store(true, Ordering::SeqCst);

        let pump_task = self.spawn_frame_pump(frame_rx);
        let timer_task = self.spawn_duration_timer();
        let waveform_task = self.spawn_waveform_loop();

        self.resources = Some(ActiveSessionResources {
            source,
            timer_task,
            waveform_task,
            pump_task,
        });

        self.transition(SessionState::Recording)?;
        info!(
            "Recording started: session={} mime={} ceiling={}ms",
            self.session_id, mime, self.max_duration_ms
        );

        Ok(())
    }

    fn spawn_frame_pump(&self, mut frame_rx: mpsc::Receiver<super::AudioFrame>) -> JoinHandle<()> {
        let recorded = Arc::clone(&self.recorded);
        let spectrum = Arc::clone(&self.spectrum);
        let is_recording = Arc::clone(&self.is_recording);
        let ceiling_reached = Arc::clone(&self.ceiling_reached);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                // Past the ceiling, frames are drained but never recorded:
                // the clip stays capped even if the host misses AutoStopped.
                if ceiling_reached.load(Ordering::SeqCst) {
                    continue;
                }
                recorded.lock().await.extend_from_slice(&frame.samples);
                spectrum.lock().await.push_samples(&frame.samples);
            }

            // The channel closing is a normal stop when we initiated it,
            // a device fault otherwise.
            if is_recording.load(Ordering::SeqCst) {
                warn!("Capture stream ended while recording was active");
                let _ = event_tx
                    .send(ControllerEvent::RecorderFault {
                        message: "capture stream ended unexpectedly".to_string(),
                    })
                    .await;
            }
        })
    }

    fn spawn_duration_timer(&self) -> JoinHandle<()> {
        let elapsed_ms = Arc::clone(&self.elapsed_ms);
        let ceiling_reached = Arc::clone(&self.ceiling_reached);
        let event_tx = self.event_tx.clone();
        let max_duration_ms = self.max_duration_ms;

        tokio::spawn(async move {
            let started = Instant::now();
            let mut interval = tokio::time::interval(Duration::from_millis(TIMER_TICK_MS));
            interval.tick().await; // first tick is immediate

            loop {
                interval.tick().await;
                let elapsed = started.elapsed().as_millis() as u64;
                elapsed_ms.store(elapsed, Ordering::SeqCst);

                if elapsed >= max_duration_ms {
                    info!("Duration ceiling reached at {elapsed}ms, requesting auto-stop");
                    ceiling_reached.store(true, Ordering::SeqCst);
                    let _ = event_tx
                        .send(ControllerEvent::AutoStopped { elapsed_ms: elapsed })
                        .await;
                    break;
                }

                // Ticks are advisory; drop them rather than stall the timer.
                let _ = event_tx.try_send(ControllerEvent::Tick { elapsed_ms: elapsed });
            }
        })
    }

    fn spawn_waveform_loop(&self) -> JoinHandle<()> {
        let spectrum = Arc::clone(&self.spectrum);
        let analyzer = Arc::clone(&self.analyzer);
        let waveform_tx = self.waveform_tx.clone();
        let tick = Duration::from_millis(self.config.tick_interval_ms);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                let data = spectrum.lock().await.frequency_data();
                let frame = analyzer.lock().await.process(&data);
                let _ = waveform_tx.send(frame);
            }
        })
    }

    /// Stop the recording, release the hardware, and build the clip.
    ///
    /// The final waveform frame becomes the clip's permanent summary.
    pub async fn stop_capture(&mut self) -> Result<(), CaptureError> {
        if self.state != SessionState::Recording {
            return Err(CaptureError::InvalidState {
                expected: SessionState::Recording.to_string(),
                actual: self.state.to_string(),
            });
        }

        self.is_recording.store(false, Ordering::SeqCst);

        if let Some(resources) = self.resources.take() {
            resources.teardown().await;
        }

        let samples = std::mem::take(&mut *self.recorded.lock().await);
        let summary = self.analyzer.lock().await.last_frame();

        let mut blob = AudioBlob::from_pcm(&samples, self.config.sample_rate, self.config.channels)
            .map_err(|e| CaptureError::Recording(format!("failed to encode clip: {e:#}")))?;
        if let Some(mime) = self.mime_type {
            blob.mime_type = mime.to_string();
        }

        let duration_seconds = samples.len() as f64
            / (self.config.sample_rate as f64 * self.config.channels.max(1) as f64);

        self.clip = Some(AudioClip {
            raw_blob: blob,
            processed_blob: None,
            duration_seconds,
            waveform_summary: summary,
            quality_metrics: None,
        });

        self.transition(SessionState::Stopped)?;
        info!(
            "Recording stopped: session={} duration={:.2}s",
            self.session_id, duration_seconds
        );

        Ok(())
    }

    /// Enter review and kick off the advisory quality analysis.
    pub async fn begin_review(&mut self) -> Result<(), CaptureError> {
        self.transition(SessionState::Reviewing)?;

        let clip = match &self.clip {
            Some(clip) => clip,
            None => return Ok(()), // nothing recorded, nothing to analyze
        };

        let blob = clip.raw_blob.clone();
        let session_id = self.session_id;
        let slot = Arc::clone(&self.quality_slot);

        tokio::spawn(async move {
            match QualityAnalyzer::analyze(&blob) {
                Ok(metrics) => {
                    *slot.lock().await = Some((session_id, metrics));
                }
                Err(e) => {
                    // Advisory only: the clip keeps null metrics.
                    warn!("Quality analysis failed (non-blocking): {e}");
                }
            }
        });

        Ok(())
    }

    /// Adopt the quality analysis result if it has arrived and still
    /// belongs to this session.
    pub async fn quality_metrics(&mut self) -> Option<QualityMetrics> {
        if let Some((sid, metrics)) = self.quality_slot.lock().await.take() {
            if sid == self.session_id {
                if let Some(clip) = &mut self.clip {
                    clip.quality_metrics = Some(metrics);
                }
            } else {
                debug!("Discarding quality metrics from superseded session {sid}");
            }
        }
        self.clip.as_ref().and_then(|c| c.quality_metrics.clone())
    }

    fn ensure_editable(&self) -> Result<(), CaptureError> {
        if !self.state.allows_editing() {
            return Err(CaptureError::InvalidState {
                expected: SessionState::Reviewing.to_string(),
                actual: self.state.to_string(),
            });
        }
        Ok(())
    }

    /// Stage a trim selection; committed at submission.
    pub fn set_trim(&mut self, selection: TrimSelection) -> Result<(), CaptureError> {
        self.ensure_editable()?;
        self.trim_selection = Some(selection);
        Ok(())
    }

    /// Stage a manual gain level in [0, 2]; applied after trim at
    /// submission so discarded audio is never processed.
    pub fn set_volume(&mut self, level: f32) -> Result<(), CaptureError> {
        self.ensure_editable()?;
        self.volume_level = level.clamp(0.0, 2.0);
        Ok(())
    }

    /// Enable or disable automatic enhancement at submission.
    pub fn set_auto_enhance(&mut self, options: Option<EnhanceOptions>) -> Result<(), CaptureError> {
        self.ensure_editable()?;
        self.auto_enhance = options;
        Ok(())
    }

    /// Run enhancement in the background for preview. The result is only
    /// committed by [`accept_enhancement`] and only if this session is
    /// still the active one.
    ///
    /// [`accept_enhancement`]: CaptureController::accept_enhancement
    pub fn request_enhancement_preview(
        &mut self,
        options: EnhanceOptions,
    ) -> Result<(), CaptureError> {
        self.ensure_editable()?;
        let clip = self.clip.as_ref().ok_or_else(|| CaptureError::InvalidState {
            expected: "a recorded clip".to_string(),
            actual: "no clip".to_string(),
        })?;

        let blob = clip.raw_blob.clone();
        let session_id = self.session_id;
        let slot = Arc::clone(&self.enhanced_slot);

        tokio::spawn(async move {
            let enhanced = EnhancementPipeline::auto_enhance(&blob, &options);
            *slot.lock().await = Some((session_id, enhanced));
        });

        Ok(())
    }

    /// Commit a finished enhancement preview into the clip. Returns false
    /// when no preview is ready or the preview belongs to a superseded
    /// session (stale results are discarded, never applied).
    pub async fn accept_enhancement(&mut self) -> bool {
        let Some((sid, blob)) = self.enhanced_slot.lock().await.take() else {
            return false;
        };

        if sid != self.session_id {
            debug!("Discarding enhancement preview from superseded session {sid}");
            return false;
        }

        match &mut self.clip {
            Some(clip) => {
                clip.processed_blob = Some(blob);
                true
            }
            None => false,
        }
    }

    /// Validate, process, and hand the clip to the upload queue.
    ///
    /// Processing order: trim, then automatic enhancement, then manual
    /// gain. The silence gate runs against the waveform summary and the
    /// re-derived post-trim duration. Validation failures return the
    /// session to Reviewing with the blob preserved; an upload rejection
    /// fails the session.
    pub async fn submit(
        &mut self,
        metadata: ClipMetadata,
        queue: &dyn UploadQueue,
    ) -> Result<ClipPayload, SubmitError> {
        if self.state != SessionState::Reviewing {
            return Err(SubmitError::InvalidState(format!(
                "cannot submit from state {}",
                self.state
            )));
        }
        // Entering Submitting disables edits and re-submission until a
        // definitive outcome is known.
        self.state = SessionState::Submitting;

        // Adopt any quality metrics that arrived during review.
        self.quality_metrics().await;

        let clip = match &self.clip {
            Some(clip) => clip.clone(),
            None => {
                self.state = SessionState::Reviewing;
                return Err(SubmitError::InvalidState("no clip recorded".to_string()));
            }
        };

        // Trim before gain: discarded audio is never processed.
        let selection = self
            .trim_selection
            .unwrap_or_else(|| TrimSelection::new(clip.duration_seconds));
        let outcome = TrimEngine::apply(clip.effective_blob(), clip.duration_seconds, &selection);
        let mut blob = outcome.blob;
        let mut duration_seconds = outcome.duration_seconds;

        if let Some(options) = self.auto_enhance {
            blob = EnhancementPipeline::auto_enhance(&blob, &options);
        }

        if self.volume_level != 1.0 {
            match EnhancementPipeline::manual_volume_adjust(&blob, self.volume_level) {
                Ok(adjusted) => blob = adjusted,
                // Processing failures never block submission.
                Err(e) => warn!("Volume adjust failed, keeping unadjusted audio: {e}"),
            }
        }

        // Re-derive the duration if processing re-encoded the clip.
        if let Ok(decoded) = blob.decode() {
            duration_seconds = decoded.duration_seconds();
        }

        if let Err(e) = SilenceGate::check(&clip.waveform_summary, duration_seconds) {
            info!("Submission blocked by silence gate: {e}");
            self.state = SessionState::Reviewing;
            return Err(SubmitError::Validation(e));
        }

        let final_clip = AudioClip {
            raw_blob: clip.raw_blob.clone(),
            processed_blob: Some(blob),
            duration_seconds,
            waveform_summary: clip.waveform_summary,
            quality_metrics: clip.quality_metrics.clone(),
        };

        let payload = match ClipAssembler::assemble(&final_clip, metadata) {
            Ok(payload) => payload,
            Err(e) => {
                info!("Submission blocked by payload validation: {e}");
                self.state = SessionState::Reviewing;
                return Err(SubmitError::Validation(e));
            }
        };

        match queue.enqueue(payload.clone()).await {
            Ok(()) => {
                self.state = SessionState::Queued;
                self.clip = Some(final_clip);
                info!("Clip queued: session={}", self.session_id);
                Ok(payload)
            }
            Err(e) => {
                error!("Upload queue rejected the clip: {e:#}");
                self.state = SessionState::Failed;
                Err(SubmitError::Upload(format!("{e:#}")))
            }
        }
    }

    /// Return to Idle from any state, tearing down every live resource.
    ///
    /// Rotating the session id here is what invalidates in-flight one-shot
    /// results from the old session.
    pub async fn reset(&mut self) {
        info!("Resetting session {}", self.session_id);

        self.is_recording.store(false, Ordering::SeqCst);
        if let Some(resources) = self.resources.take() {
            resources.teardown().await;
        }

        self.recorded.lock().await.clear();
        self.analyzer.lock().await.reset();
        self.spectrum.lock().await.reset();
        *self.quality_slot.lock().await = None;
        *self.enhanced_slot.lock().await = None;

        self.clip = None;
        self.trim_selection = None;
        self.volume_level = 1.0;
        self.auto_enhance = None;
        self.mime_type = None;
        self.max_duration_ms = 0;
        self.elapsed_ms.store(0, Ordering::SeqCst);
        self.ceiling_reached.store(false, Ordering::SeqCst);
        self.session_id = Uuid::new_v4();
        self.state = SessionState::Idle;
        let _ = self.waveform_tx.send([0.0; WAVEFORM_BINS]);
    }
}
