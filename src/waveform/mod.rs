//! Live 24-bin waveform analysis
//!
//! Converts frequency-domain snapshots from the spectrum analyser into the
//! smoothed bar data rendered during recording. The last frame produced
//! before the recording stops is retained as the clip's permanent waveform
//! summary and later feeds the silence gate.

/// Number of visualization bins.
pub const WAVEFORM_BINS: usize = 24;

/// Gain applied to the normalized per-bin average before clamping.
const AMPLIFICATION: f32 = 2.5;

/// Exponential smoothing weights (30% previous frame, 70% new value).
const SMOOTHING_PREV: f32 = 0.3;
const SMOOTHING_RAW: f32 = 0.7;

/// Below this level a bin is considered quiet enough to decay.
const DECAY_THRESHOLD: f32 = 0.05;

/// Per-tick decay factor applied to quiet bins.
const DECAY_FACTOR: f32 = 0.8;

/// One visualization frame: 24 values in [0, 1].
pub type WaveformFrame = [f32; WAVEFORM_BINS];

/// Tick-driven analyzer that folds byte spectra into smoothed frames.
///
/// Holds the previous frame for exponential smoothing; `reset()` must be
/// called between sessions so one recording's tail never bleeds into the
/// next recording's first frame.
#[derive(Debug, Clone)]
pub struct WaveformAnalyzer {
    prev: WaveformFrame,
}

impl WaveformAnalyzer {
    pub fn new() -> Self {
        Self {
            prev: [0.0; WAVEFORM_BINS],
        }
    }

    /// Process one frequency-domain snapshot (one byte per bin, 0-255).
    ///
    /// Partitions the spectrum into 24 equal-width slices, averages each,
    /// normalizes and amplifies, then applies exponential smoothing. Quiet
    /// bins (raw and previous value both below 0.05) decay toward zero
    /// instead of holding steady, which keeps the bars from jittering
    /// during silence.
    pub fn process(&mut self, spectrum: &[u8]) -> WaveformFrame {
        let mut frame = [0.0f32; WAVEFORM_BINS];
        let slice_width = (spectrum.len() / WAVEFORM_BINS).max(1);

        for (bin, value) in frame.iter_mut().enumerate() {
            let start = bin * slice_width;
            let end = ((bin + 1) * slice_width).min(spectrum.len());

            let raw = if start >= spectrum.len() || end <= start {
                0.0
            } else {
                let sum: u32 = spectrum[start..end].iter().map(|&b| b as u32).sum();
                let avg = sum as f32 / (end - start) as f32;
                ((avg / 255.0) * AMPLIFICATION).clamp(0.0, 1.0)
            };

            let prev = self.prev[bin];
            let smoothed = prev * SMOOTHING_PREV + raw * SMOOTHING_RAW;

            *value = if raw < DECAY_THRESHOLD && prev < DECAY_THRESHOLD {
                (prev * DECAY_FACTOR).max(0.0)
            } else {
                smoothed.clamp(0.0, 1.0)
            };
        }

        self.prev = frame;
        frame
    }

    /// The most recently produced frame.
    pub fn last_frame(&self) -> WaveformFrame {
        self.prev
    }

    /// Clear smoothing state between sessions.
    pub fn reset(&mut self) {
        self.prev = [0.0; WAVEFORM_BINS];
    }
}

impl Default for WaveformAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_stay_in_range_at_full_scale() {
        let mut analyzer = WaveformAnalyzer::new();
        let spectrum = vec![255u8; 1024];

        for _ in 0..10 {
            let frame = analyzer.process(&spectrum);
            for bin in frame {
                assert!((0.0..=1.0).contains(&bin), "bin out of range: {}", bin);
            }
        }
    }

    #[test]
    fn test_amplification_saturates_loud_input() {
        let mut analyzer = WaveformAnalyzer::new();
        // 255/255 * 2.5 clamps to 1.0; first frame smooths from zero: 0.7
        let frame = analyzer.process(&vec![255u8; 240]);
        for bin in frame {
            assert!((bin - 0.7).abs() < 1e-6);
        }
    }

    #[test]
    fn test_quiet_bins_decay_toward_zero() {
        let mut analyzer = WaveformAnalyzer::new();
        analyzer.prev = [0.04; WAVEFORM_BINS];

        let frame = analyzer.process(&vec![0u8; 240]);
        for bin in frame {
            assert!((bin - 0.032).abs() < 1e-6, "expected 0.8 decay, got {}", bin);
        }
    }

    #[test]
    fn test_loud_bins_do_not_decay() {
        let mut analyzer = WaveformAnalyzer::new();
        analyzer.prev = [0.5; WAVEFORM_BINS];

        // raw = 0 but prev is loud: exponential smoothing applies, not decay
        let frame = analyzer.process(&vec![0u8; 240]);
        for bin in frame {
            assert!((bin - 0.15).abs() < 1e-6);
        }
    }

    #[test]
    fn test_short_spectrum_is_handled() {
        let mut analyzer = WaveformAnalyzer::new();
        let frame = analyzer.process(&[255u8; 8]);
        for bin in frame {
            assert!((0.0..=1.0).contains(&bin));
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut analyzer = WaveformAnalyzer::new();
        analyzer.process(&vec![200u8; 240]);
        analyzer.reset();
        assert_eq!(analyzer.last_frame(), [0.0; WAVEFORM_BINS]);
    }
}
