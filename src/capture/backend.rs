use tokio::sync::mpsc;

use crate::error::CaptureError;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture source
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
    /// Recording ceiling for standard clips
    pub max_duration_short_ms: u64,
    /// Recording ceiling with podcast mode enabled
    pub max_duration_podcast_ms: u64,
    /// Interval between waveform animation ticks
    pub tick_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 1,
            buffer_duration_ms: 100,
            max_duration_short_ms: 30_000,
            max_duration_podcast_ms: 600_000,
            tick_interval_ms: 33, // ~30fps waveform
        }
    }
}

/// Ordered encoding preference list; the first type a source supports wins.
pub const PREFERRED_MIME_TYPES: &[&str] = &[
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/ogg;codecs=opus",
    "audio/wav",
];

/// Microphone capture capability.
///
/// The platform owns the hardware; this trait exposes exactly the
/// start/stop/data-available surface the controller needs. A source closes
/// its frame channel after `stop()` drains the final flush; a channel that
/// closes while recording is treated as a device fault.
#[async_trait::async_trait]
pub trait AudioCaptureSource: Send + Sync {
    /// Begin capturing audio.
    ///
    /// Returns a channel receiver that will receive audio frames.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing and flush any buffered audio into the frame channel
    /// before closing it.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if the source is currently capturing.
    fn is_capturing(&self) -> bool;

    /// Whether the source can deliver the given encoding.
    fn supports_mime_type(&self, mime_type: &str) -> bool;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Pick the recording encoding: first supported entry in the preference
/// list wins.
pub fn select_mime_type(source: &dyn AudioCaptureSource) -> Option<&'static str> {
    PREFERRED_MIME_TYPES
        .iter()
        .copied()
        .find(|mime| source.supports_mime_type(mime))
}
