use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clip::AudioBlob;
use crate::error::ProcessingError;

/// Window length used for noise-floor and silence estimation.
const WINDOW_MS: u64 = 50;

/// Samples within this distance of full scale count as clipped.
const CLIPPING_EPSILON: f32 = 1e-3;

/// Window RMS below this level counts as silence.
const SILENCE_RMS_THRESHOLD: f32 = 0.01;

/// Percentile of window energies taken as the noise-floor estimate.
const NOISE_FLOOR_PERCENTILE: f64 = 0.10;

/// Advisory suggestions derived from the measured metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    ApplyNoiseReduction,
    BoostGain,
    ReduceInputLevel,
    TrimSilence,
}

/// Advisory quality metrics for a finished clip.
///
/// Never blocking: a failed analysis leaves the clip's metrics absent and
/// submission proceeds regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Highest absolute sample value, 0..1.
    pub peak_level: f32,
    /// Global RMS level, 0..1.
    pub average_level: f32,
    /// Low-percentile window RMS, approximating the noise floor.
    pub noise_floor_estimate: f32,
    /// Fraction of samples within epsilon of full scale.
    pub clipping_ratio: f32,
    /// Fraction of 50ms windows below the silence threshold.
    pub silence_ratio: f32,
    pub recommended_actions: Vec<RecommendedAction>,
}

/// One-shot offline analysis of a processed clip.
pub struct QualityAnalyzer;

impl QualityAnalyzer {
    /// Decode the blob and compute advisory metrics.
    pub fn analyze(blob: &AudioBlob) -> Result<QualityMetrics, ProcessingError> {
        let decoded = blob
            .decode()
            .map_err(|e| ProcessingError::QualityAnalysis(format!("decode failed: {e:#}")))?;

        if decoded.samples.is_empty() {
            return Err(ProcessingError::QualityAnalysis(
                "clip contains no samples".to_string(),
            ));
        }

        let samples = &decoded.samples;
        let peak_level = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));

        let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let average_level = (sum_squares / samples.len() as f64).sqrt() as f32;

        let clipped = samples
            .iter()
            .filter(|s| s.abs() >= 1.0 - CLIPPING_EPSILON)
            .count();
        let clipping_ratio = clipped as f32 / samples.len() as f32;

        let window_len =
            ((decoded.sample_rate as u64 * decoded.channels as u64 * WINDOW_MS) / 1000).max(1)
                as usize;
        let mut window_rms: Vec<f32> = samples
            .chunks(window_len)
            .map(|w| {
                let sum: f64 = w.iter().map(|&s| (s as f64) * (s as f64)).sum();
                (sum / w.len() as f64).sqrt() as f32
            })
            .collect();

        let silent_windows = window_rms
            .iter()
            .filter(|&&rms| rms < SILENCE_RMS_THRESHOLD)
            .count();
        let silence_ratio = silent_windows as f32 / window_rms.len() as f32;

        window_rms.sort_by(|a, b| a.total_cmp(b));
        let floor_index = ((window_rms.len() as f64 * NOISE_FLOOR_PERCENTILE) as usize)
            .min(window_rms.len() - 1);
        let noise_floor_estimate = window_rms[floor_index];

        let mut metrics = QualityMetrics {
            peak_level,
            average_level,
            noise_floor_estimate,
            clipping_ratio,
            silence_ratio,
            recommended_actions: Vec::new(),
        };
        metrics.recommended_actions = Self::recommend(&metrics);

        debug!(
            "Quality analysis: peak={:.3} avg={:.3} floor={:.4} clip={:.4} silence={:.2}",
            metrics.peak_level,
            metrics.average_level,
            metrics.noise_floor_estimate,
            metrics.clipping_ratio,
            metrics.silence_ratio
        );

        Ok(metrics)
    }

    fn recommend(metrics: &QualityMetrics) -> Vec<RecommendedAction> {
        let mut actions = Vec::new();

        // A floor near the average level is just sustained signal; advice
        // applies only when a distinct quiet bed carries energy.
        if metrics.noise_floor_estimate > 0.02
            && metrics.noise_floor_estimate < metrics.average_level * 0.5
        {
            actions.push(RecommendedAction::ApplyNoiseReduction);
        }
        if metrics.peak_level > 0.0 && metrics.peak_level < 0.3 {
            actions.push(RecommendedAction::BoostGain);
        }
        if metrics.clipping_ratio > 0.01 {
            actions.push(RecommendedAction::ReduceInputLevel);
        }
        if metrics.silence_ratio > 0.4 {
            actions.push(RecommendedAction::TrimSilence);
        }

        actions
    }
}
