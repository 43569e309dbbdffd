//! Non-destructive head/tail trim
//!
//! A trim selection is edited freely during review but only committed at
//! submission. The engine re-measures the trimmed clip's duration from the
//! encoded output rather than computing it arithmetically, absorbing
//! encoder rounding; a failed trim falls back to the untrimmed original
//! and surfaces a non-fatal warning.

use tracing::warn;

use crate::clip::AudioBlob;
use crate::error::ProcessingError;

/// Minimum audio that must remain after trimming, in seconds.
pub const MIN_REMAINDER_SECONDS: f64 = 0.5;

/// A head/tail trim selection against a clip of known duration.
///
/// Invariant: `start_offset_sec + end_offset_sec <= original_duration_sec -
/// 0.5` at all times. Editing one bound re-clamps the other's allowed
/// maximum, so the invariant can never be violated through the setters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimSelection {
    start_offset_sec: f64,
    end_offset_sec: f64,
    original_duration_sec: f64,
}

impl TrimSelection {
    pub fn new(original_duration_sec: f64) -> Self {
        Self {
            start_offset_sec: 0.0,
            end_offset_sec: 0.0,
            original_duration_sec: original_duration_sec.max(0.0),
        }
    }

    pub fn start_offset_sec(&self) -> f64 {
        self.start_offset_sec
    }

    pub fn end_offset_sec(&self) -> f64 {
        self.end_offset_sec
    }

    pub fn original_duration_sec(&self) -> f64 {
        self.original_duration_sec
    }

    /// Seconds of audio the selection would keep.
    pub fn kept_seconds(&self) -> f64 {
        self.original_duration_sec - self.start_offset_sec - self.end_offset_sec
    }

    /// True when the selection removes nothing.
    pub fn is_noop(&self) -> bool {
        self.start_offset_sec == 0.0 && self.end_offset_sec == 0.0
    }

    /// Move the head trim point, re-clamping the tail if necessary.
    pub fn set_start(&mut self, seconds: f64) {
        let budget = (self.original_duration_sec - MIN_REMAINDER_SECONDS).max(0.0);
        self.start_offset_sec = seconds.clamp(0.0, budget);
        let max_end = (budget - self.start_offset_sec).max(0.0);
        self.end_offset_sec = self.end_offset_sec.min(max_end);
    }

    /// Move the tail trim point, re-clamping the head if necessary.
    pub fn set_end(&mut self, seconds: f64) {
        let budget = (self.original_duration_sec - MIN_REMAINDER_SECONDS).max(0.0);
        self.end_offset_sec = seconds.clamp(0.0, budget);
        let max_start = (budget - self.end_offset_sec).max(0.0);
        self.start_offset_sec = self.start_offset_sec.min(max_start);
    }
}

/// Result of a trim attempt. On failure the original blob and duration are
/// carried through unchanged and `warning` records what went wrong.
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub blob: AudioBlob,
    pub duration_seconds: f64,
    pub warning: Option<ProcessingError>,
}

pub struct TrimEngine;

impl TrimEngine {
    /// Commit a trim selection against a clip.
    ///
    /// Never blocks submission: any failure falls back to the untrimmed
    /// original with a non-fatal warning attached.
    pub fn apply(
        blob: &AudioBlob,
        duration_seconds: f64,
        selection: &TrimSelection,
    ) -> TrimOutcome {
        if selection.is_noop() {
            return TrimOutcome {
                blob: blob.clone(),
                duration_seconds,
                warning: None,
            };
        }

        match Self::trim_inner(blob, duration_seconds, selection) {
            Ok((trimmed, measured)) => TrimOutcome {
                blob: trimmed,
                duration_seconds: measured,
                warning: None,
            },
            Err(e) => {
                warn!("Trim failed, keeping untrimmed audio: {e}");
                TrimOutcome {
                    blob: blob.clone(),
                    duration_seconds,
                    warning: Some(e),
                }
            }
        }
    }

    fn trim_inner(
        blob: &AudioBlob,
        duration_seconds: f64,
        selection: &TrimSelection,
    ) -> Result<(AudioBlob, f64), ProcessingError> {
        let decoded = blob
            .decode()
            .map_err(|e| ProcessingError::Trim(format!("decode failed: {e:#}")))?;

        let channels = decoded.channels.max(1) as usize;
        let total_frames = decoded.samples.len() / channels;

        let start_frame = ((selection.start_offset_sec() * decoded.sample_rate as f64).round()
            as usize)
            .min(total_frames);
        let end_time = duration_seconds - selection.end_offset_sec();
        let end_frame = ((end_time * decoded.sample_rate as f64).round() as usize)
            .clamp(start_frame, total_frames);

        if end_frame <= start_frame {
            return Err(ProcessingError::Trim(
                "selection leaves no audio".to_string(),
            ));
        }

        let kept = &decoded.samples[start_frame * channels..end_frame * channels];
        let trimmed = AudioBlob::from_samples(kept, decoded.sample_rate, decoded.channels)
            .map_err(|e| ProcessingError::Trim(format!("re-encode failed: {e:#}")))?;

        // Re-measure from the encoded output rather than trusting the
        // arithmetic above.
        let measured = trimmed
            .decode()
            .map_err(|e| ProcessingError::Trim(format!("re-measure failed: {e:#}")))?
            .duration_seconds();

        Ok((trimmed, measured))
    }
}
