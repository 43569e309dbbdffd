use anyhow::Result;
use tracing::{info, warn};
use voiceclip::{
    profile_city, CaptureController, ClipMetadata, ClipPayload, Config, ContentRating,
    ControllerEvent, PostTarget, ProfileProvider, UploadQueue, Visibility, WavFileSource,
};

/// Demo upload collaborator that just logs what it would persist.
struct LoggingUploadQueue;

#[async_trait::async_trait]
impl UploadQueue for LoggingUploadQueue {
    async fn enqueue(&self, payload: ClipPayload) -> Result<()> {
        info!(
            "Would upload clip: {:.2}s, {} bytes, mood={}",
            payload.duration_seconds,
            payload.audio_bytes.len(),
            payload.mood_emoji
        );
        Ok(())
    }
}

/// Demo profile collaborator with a fixed consented city.
struct StaticProfile;

#[async_trait::async_trait]
impl ProfileProvider for StaticProfile {
    async fn consented_city(&self) -> Result<Option<String>> {
        Ok(Some("Lisbon".to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = match Config::load("config/voiceclip") {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("No config file loaded ({e}), using defaults");
            Config::default()
        }
    };

    info!("voiceclip v0.1.0");
    info!("Service: {}", cfg.service.name);

    let fixture_path = "tests/fixtures/sample-clip.wav";
    if !std::path::Path::new(fixture_path).exists() {
        info!("No demo fixture found at {fixture_path}");
        info!("To run the pipeline demo, place a .wav file at: {fixture_path}");
        return Ok(());
    }

    let capture_config = cfg.capture_config();
    let mut controller = CaptureController::new(capture_config.clone());
    let mut events = controller
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("controller events already taken"))?;

    let source = WavFileSource::new(fixture_path, capture_config);
    controller.start_capture(Box::new(source)).await?;
    info!("Recording from fixture...");

    // Record until the source runs dry or the ceiling fires.
    loop {
        match events.recv().await {
            Some(ControllerEvent::Tick { elapsed_ms }) => {
                let frame = *controller.waveform_frames().borrow();
                let peak = frame.iter().cloned().fold(0.0f32, f32::max);
                info!("Recording: {elapsed_ms}ms, waveform peak {peak:.2}");
            }
            Some(ControllerEvent::AutoStopped { elapsed_ms }) => {
                info!("Auto-stop at {elapsed_ms}ms");
                break;
            }
            Some(ControllerEvent::RecorderFault { message }) => {
                info!("Capture stream finished: {message}");
                break;
            }
            None => break,
        }
    }

    controller.stop_capture().await?;
    controller.begin_review().await?;

    // Give the advisory quality analysis a moment, then report.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    if let Some(metrics) = controller.quality_metrics().await {
        info!(
            "Quality: peak={:.2} avg={:.3} floor={:.4} clipping={:.4} silence={:.2}",
            metrics.peak_level,
            metrics.average_level,
            metrics.noise_floor_estimate,
            metrics.clipping_ratio,
            metrics.silence_ratio
        );
        info!("Suggestions: {:?}", metrics.recommended_actions);
    }

    controller.set_auto_enhance(Some(cfg.enhance_options()))?;

    let city = profile_city(&StaticProfile).await;
    let metadata = ClipMetadata {
        mood_emoji: "🎙️".to_string(),
        content_rating: ContentRating::Everyone,
        title: Some("Pipeline demo".to_string()),
        tags: vec!["demo".to_string()],
        visibility: Visibility::Private,
        scheduled_for: None,
        consent_city: city.is_some(),
        city,
        podcast_flag: false,
        accessibility_urls: Vec::new(),
        target: Some(PostTarget::Topic("demo".to_string())),
    };

    match controller.submit(metadata, &LoggingUploadQueue).await {
        Ok(payload) => info!("Clip queued: {:.2}s final duration", payload.duration_seconds),
        Err(e) => warn!("Submission blocked: {e}"),
    }

    controller.reset().await;
    Ok(())
}
