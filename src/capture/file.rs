use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{AudioCaptureSource, AudioFrame, CaptureConfig};
use crate::error::CaptureError;

/// Capture source that streams a WAV file as if it were a microphone.
///
/// Used by the demo binary and batch processing; real deployments inject a
/// platform microphone behind the same trait.
pub struct WavFileSource {
    path: PathBuf,
    config: CaptureConfig,
    stream_task: Option<JoinHandle<()>>,
    capturing: bool,
}

impl WavFileSource {
    pub fn new(path: impl AsRef<Path>, config: CaptureConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            stream_task: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl AudioCaptureSource for WavFileSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let reader = hound::WavReader::open(&self.path)
            .map_err(|e| CaptureError::Device(format!("{}: {e}", self.path.display())))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CaptureError::Device(format!("failed to read samples: {e}")))?;

        info!(
            "Streaming {} as capture source: {}Hz, {} channels, {} samples",
            self.path.display(),
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        let (tx, rx) = mpsc::channel(100);
        let buffer_ms = self.config.buffer_duration_ms.max(1);
        let samples_per_frame =
            ((spec.sample_rate as u64 * spec.channels as u64 * buffer_ms) / 1000).max(1) as usize;

        let task = tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            for chunk in samples.chunks(samples_per_frame) {
                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
                timestamp_ms += buffer_ms;
                tokio::time::sleep(std::time::Duration::from_millis(buffer_ms)).await;
            }
            // Sender drops here, closing the frame channel.
        });

        self.stream_task = Some(task);
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.capturing = false;
        if let Some(task) = self.stream_task.take() {
            task.abort();
            if let Err(e) = task.await {
                if e.is_panic() {
                    warn!("File stream task panicked: {e}");
                }
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn supports_mime_type(&self, mime_type: &str) -> bool {
        mime_type == "audio/wav"
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
