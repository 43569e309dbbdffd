//! Clip enhancement
//!
//! Noise reduction and peak normalization applied before a clip is queued.
//! The automatic path is guaranteed to hand back a usable blob: full
//! enhancement falls back to normalize-only, which falls back to the
//! original input. Failures are logged and absorbed, never raised.

use tracing::warn;

use crate::clip::{AudioBlob, DecodedAudio};
use crate::error::ProcessingError;

/// Window length driving the downward expander, matching the quality
/// analyzer's estimation window.
const WINDOW_MS: u64 = 50;

/// Quiet windows are attenuated when their RMS falls below
/// `noise_floor * NOISE_GATE_RATIO`.
const NOISE_GATE_RATIO: f32 = 1.5;

/// Percentile of window energies used as the noise-floor estimate.
const NOISE_FLOOR_PERCENTILE: f64 = 0.10;

/// Options for automatic enhancement.
#[derive(Debug, Clone, Copy)]
pub struct EnhanceOptions {
    pub reduce_noise: bool,
    pub normalize: bool,
    pub target_peak: f32,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            reduce_noise: true,
            normalize: true,
            target_peak: 0.95,
        }
    }
}

pub struct EnhancementPipeline;

impl EnhancementPipeline {
    /// Automatic enhancement with tiered fallback.
    ///
    /// Tier 1 applies noise reduction and normalization, tier 2 normalizes
    /// only, tier 3 returns the input unchanged. Each tier's failure is
    /// logged; the caller always receives a usable blob.
    pub fn auto_enhance(blob: &AudioBlob, options: &EnhanceOptions) -> AudioBlob {
        Self::auto_enhance_with(
            blob,
            options,
            |b, o| Self::enhance_full(b, o),
            |b, peak| Self::normalize_only(b, peak),
        )
    }

    /// Tiering skeleton with injectable tiers.
    ///
    /// The production path goes through [`auto_enhance`]; injecting the
    /// tiers lets failure behavior be exercised deterministically.
    pub fn auto_enhance_with<F, N>(
        blob: &AudioBlob,
        options: &EnhanceOptions,
        full: F,
        normalize: N,
    ) -> AudioBlob
    where
        F: Fn(&AudioBlob, &EnhanceOptions) -> Result<AudioBlob, ProcessingError>,
        N: Fn(&AudioBlob, f32) -> Result<AudioBlob, ProcessingError>,
    {
        match full(blob, options) {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!("Full enhancement failed, falling back to normalize-only: {e}");
                match normalize(blob, options.target_peak) {
                    Ok(normalized) => normalized,
                    Err(e) => {
                        warn!("Normalize-only fallback failed, returning original audio: {e}");
                        blob.clone()
                    }
                }
            }
        }
    }

    /// Noise reduction followed by peak normalization.
    pub fn enhance_full(
        blob: &AudioBlob,
        options: &EnhanceOptions,
    ) -> Result<AudioBlob, ProcessingError> {
        let mut decoded = Self::decode(blob)?;

        if options.reduce_noise {
            Self::reduce_noise(&mut decoded);
        }
        if options.normalize {
            Self::normalize_samples(&mut decoded.samples, options.target_peak);
        }

        decoded
            .encode()
            .map_err(|e| ProcessingError::Enhancement(format!("re-encode failed: {e:#}")))
    }

    /// Peak normalization without noise reduction (fallback tier 2).
    pub fn normalize_only(blob: &AudioBlob, target_peak: f32) -> Result<AudioBlob, ProcessingError> {
        let mut decoded = Self::decode(blob)?;
        Self::normalize_samples(&mut decoded.samples, target_peak);
        decoded
            .encode()
            .map_err(|e| ProcessingError::Enhancement(format!("re-encode failed: {e:#}")))
    }

    /// Linear gain adjustment chosen by the user.
    ///
    /// `level` is clamped to [0, 2]. A level of exactly 1.0 is a no-op and
    /// skips the decode/encode round trip entirely.
    pub fn manual_volume_adjust(
        blob: &AudioBlob,
        level: f32,
    ) -> Result<AudioBlob, ProcessingError> {
        let level = level.clamp(0.0, 2.0);
        if level == 1.0 {
            return Ok(blob.clone());
        }

        let mut decoded = Self::decode(blob)?;
        for sample in &mut decoded.samples {
            *sample = (*sample * level).clamp(-1.0, 1.0);
        }
        decoded
            .encode()
            .map_err(|e| ProcessingError::Enhancement(format!("re-encode failed: {e:#}")))
    }

    fn decode(blob: &AudioBlob) -> Result<DecodedAudio, ProcessingError> {
        let decoded = blob
            .decode()
            .map_err(|e| ProcessingError::Enhancement(format!("decode failed: {e:#}")))?;
        if decoded.samples.is_empty() {
            return Err(ProcessingError::Enhancement(
                "clip contains no samples".to_string(),
            ));
        }
        Ok(decoded)
    }

    /// Downward expander: windows quieter than the gate threshold are
    /// scaled down proportionally to how far below it they sit.
    fn reduce_noise(decoded: &mut DecodedAudio) {
        let window_len =
            ((decoded.sample_rate as u64 * decoded.channels as u64 * WINDOW_MS) / 1000).max(1)
                as usize;

        let mut energies: Vec<f32> = decoded
            .samples
            .chunks(window_len)
            .map(|w| {
                let sum: f64 = w.iter().map(|&s| (s as f64) * (s as f64)).sum();
                (sum / w.len() as f64).sqrt() as f32
            })
            .collect();

        let mut sorted = energies.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let floor_index =
            ((sorted.len() as f64 * NOISE_FLOOR_PERCENTILE) as usize).min(sorted.len() - 1);
        let noise_floor = sorted[floor_index];

        let gate = noise_floor * NOISE_GATE_RATIO;
        if gate <= 0.0 {
            return;
        }

        for (window, rms) in decoded.samples.chunks_mut(window_len).zip(energies.drain(..)) {
            if rms < gate {
                let gain = rms / gate;
                for sample in window {
                    *sample *= gain;
                }
            }
        }
    }

    fn normalize_samples(samples: &mut [f32], target_peak: f32) {
        let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        if peak <= 0.0 {
            return;
        }

        let gain = target_peak.clamp(0.0, 1.0) / peak;
        for sample in samples {
            *sample = (*sample * gain).clamp(-1.0, 1.0);
        }
    }
}
