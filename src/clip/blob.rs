use std::io::Cursor;

use anyhow::{Context, Result};
use tracing::debug;

/// MIME type of the WAV container produced by the built-in encoder.
pub const WAV_MIME: &str = "audio/wav";

/// An encoded audio clip held in memory.
///
/// Clips never touch the filesystem during the recording flow; the blob is
/// the unit handed between capture, processing, and the upload queue.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode interleaved f32 samples into a 16-bit WAV blob.
    pub fn from_samples(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV writer")?;
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
                writer
                    .write_sample(value)
                    .context("Failed to write sample to WAV")?;
            }
            writer.finalize().context("Failed to finalize WAV blob")?;
        }

        Ok(Self::new(cursor.into_inner(), WAV_MIME))
    }

    /// Encode raw 16-bit PCM into a WAV blob.
    pub fn from_pcm(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV writer")?;
            for &sample in samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            writer.finalize().context("Failed to finalize WAV blob")?;
        }

        Ok(Self::new(cursor.into_inner(), WAV_MIME))
    }

    /// Decode the blob into normalized f32 samples.
    pub fn decode(&self) -> Result<DecodedAudio> {
        let reader = hound::WavReader::new(Cursor::new(&self.bytes))
            .context("Failed to parse WAV blob")?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<Vec<_>, _>>()
                    .context("Failed to read integer samples")?
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read float samples")?,
        };

        debug!(
            "Decoded blob: {} samples, {}Hz, {} channels",
            samples.len(),
            spec.sample_rate,
            spec.channels
        );

        Ok(DecodedAudio {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

/// Decoded PCM audio, interleaved, normalized to [-1, 1].
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Re-encode as a 16-bit WAV blob.
    pub fn encode(&self) -> Result<AudioBlob> {
        AudioBlob::from_samples(&self.samples, self.sample_rate, self.channels)
    }
}
