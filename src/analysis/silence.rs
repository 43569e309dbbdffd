use crate::error::ValidationError;
use crate::waveform::WaveformFrame;

/// Mean bin level below which a clip is suspect.
pub const AVERAGE_THRESHOLD: f32 = 0.05;

/// Peak bin level below which a quiet clip is rejected (2x the average
/// threshold, so a single loud transient passes an otherwise-quiet clip).
pub const PEAK_THRESHOLD: f32 = 0.10;

/// Clips at or below this duration are rejected.
pub const MIN_DURATION_SECONDS: f64 = 1.0;

/// Pass/fail check on the finished clip's waveform summary.
///
/// Applied exactly once at submission time, never continuously during
/// recording. Both checks are evaluated independently; either failing
/// blocks submission while preserving the recorded blob for retry.
pub struct SilenceGate;

impl SilenceGate {
    /// Validate the waveform summary and re-derived duration.
    pub fn check(summary: &WaveformFrame, duration_seconds: f64) -> Result<(), ValidationError> {
        let average = summary.iter().sum::<f32>() / summary.len() as f32;
        let peak = summary.iter().cloned().fold(0.0f32, f32::max);

        if average < AVERAGE_THRESHOLD && peak < PEAK_THRESHOLD {
            return Err(ValidationError::InsufficientAudio);
        }

        if duration_seconds <= MIN_DURATION_SECONDS {
            return Err(ValidationError::TooShort { duration_seconds });
        }

        Ok(())
    }
}
