//! Frequency-domain analyser feeding the live waveform.
//!
//! Mirrors the analyser semantics the recording UI was built against: a
//! fixed FFT size, time smoothing over successive spectra, and a dB range
//! mapped onto one byte per bin.

use std::collections::VecDeque;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// FFT window size. Frequency data exposes `FFT_SIZE / 2` bins.
pub const FFT_SIZE: usize = 2048;

/// Time smoothing constant over successive spectra.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// Decibel range mapped onto the 0-255 byte output.
pub const MIN_DECIBELS: f32 = -90.0;
pub const MAX_DECIBELS: f32 = -10.0;

/// Capability interface over the platform spectrum analyser.
///
/// The capture controller pushes raw PCM in and reads byte magnitudes out
/// once per animation tick; implementations own windowing and smoothing.
pub trait SpectrumAnalyzer: Send {
    /// Feed captured PCM samples into the analysis window.
    fn push_samples(&mut self, samples: &[i16]);

    /// Current frequency-domain snapshot, one byte per bin (0-255).
    fn frequency_data(&mut self) -> Vec<u8>;

    /// Number of bins in the snapshot.
    fn bin_count(&self) -> usize;

    /// Clear window and smoothing state between sessions.
    fn reset(&mut self);
}

/// FFT-backed spectrum analyser.
pub struct FftSpectrum {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    ring: VecDeque<f32>,
    smoothed: Vec<f32>,
}

impl FftSpectrum {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Hann window
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (FFT_SIZE - 1) as f32).cos())
            })
            .collect();

        Self {
            fft,
            window,
            ring: VecDeque::with_capacity(FFT_SIZE),
            smoothed: vec![0.0; FFT_SIZE / 2],
        }
    }
}

impl Default for FftSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer for FftSpectrum {
    fn push_samples(&mut self, samples: &[i16]) {
        for &sample in samples {
            if self.ring.len() == FFT_SIZE {
                self.ring.pop_front();
            }
            self.ring.push_back(sample as f32 / i16::MAX as f32);
        }
    }

    fn frequency_data(&mut self) -> Vec<u8> {
        let mut buffer: Vec<Complex<f32>> = (0..FFT_SIZE)
            .map(|i| {
                let sample = self.ring.get(i).copied().unwrap_or(0.0);
                Complex::new(sample * self.window[i], 0.0)
            })
            .collect();

        self.fft.process(&mut buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        let mut out = Vec::with_capacity(FFT_SIZE / 2);

        for (bin, value) in buffer.iter().take(FFT_SIZE / 2).enumerate() {
            let magnitude = value.norm() * scale;

            // Smooth in the linear domain, then convert to dB.
            let smoothed = self.smoothed[bin] * SMOOTHING_TIME_CONSTANT
                + magnitude * (1.0 - SMOOTHING_TIME_CONSTANT);
            self.smoothed[bin] = smoothed;

            let db = if smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                MIN_DECIBELS
            };

            let normalized = (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
            out.push((normalized.clamp(0.0, 1.0) * 255.0).round() as u8);
        }

        out
    }

    fn bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    fn reset(&mut self) {
        self.ring.clear();
        self.smoothed.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_maps_to_zero_bytes() {
        let mut spectrum = FftSpectrum::new();
        spectrum.push_samples(&vec![0i16; FFT_SIZE]);
        let data = spectrum.frequency_data();
        assert_eq!(data.len(), FFT_SIZE / 2);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_raises_some_bin() {
        let mut spectrum = FftSpectrum::new();

        // 1kHz tone at 48kHz
        let samples: Vec<i16> = (0..FFT_SIZE)
            .map(|i| {
                let t = i as f32 / 48_000.0;
                ((2.0 * std::f32::consts::PI * 1000.0 * t).sin() * 20_000.0) as i16
            })
            .collect();
        spectrum.push_samples(&samples);

        // Run a few frames so time smoothing converges upward.
        let mut data = Vec::new();
        for _ in 0..10 {
            data = spectrum.frequency_data();
        }

        assert!(data.iter().any(|&b| b > 50), "expected an energized bin");
    }

    #[test]
    fn test_reset_clears_smoothing() {
        let mut spectrum = FftSpectrum::new();
        spectrum.push_samples(&vec![15_000i16; FFT_SIZE]);
        spectrum.frequency_data();
        spectrum.reset();
        let data = spectrum.frequency_data();
        assert!(data.iter().all(|&b| b == 0));
    }
}
