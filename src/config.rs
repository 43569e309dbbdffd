use anyhow::Result;
use serde::Deserialize;

use crate::capture::CaptureConfig;
use crate::enhance::EnhanceOptions;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureSettings,
    pub enhancement: EnhancementSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureSettings {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
    pub max_duration_short_ms: u64,
    pub max_duration_podcast_ms: u64,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct EnhancementSettings {
    pub reduce_noise: bool,
    pub normalize: bool,
    pub target_peak: f32,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            sample_rate: self.capture.sample_rate,
            channels: self.capture.channels,
            buffer_duration_ms: self.capture.buffer_duration_ms,
            max_duration_short_ms: self.capture.max_duration_short_ms,
            max_duration_podcast_ms: self.capture.max_duration_podcast_ms,
            tick_interval_ms: self.capture.tick_interval_ms,
        }
    }

    pub fn enhance_options(&self) -> EnhanceOptions {
        EnhanceOptions {
            reduce_noise: self.enhancement.reduce_noise,
            normalize: self.enhancement.normalize,
            target_peak: self.enhancement.target_peak,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let capture = CaptureConfig::default();
        let enhance = EnhanceOptions::default();
        Self {
            service: ServiceConfig {
                name: "voiceclip".to_string(),
            },
            capture: CaptureSettings {
                sample_rate: capture.sample_rate,
                channels: capture.channels,
                buffer_duration_ms: capture.buffer_duration_ms,
                max_duration_short_ms: capture.max_duration_short_ms,
                max_duration_podcast_ms: capture.max_duration_podcast_ms,
                tick_interval_ms: capture.tick_interval_ms,
            },
            enhancement: EnhancementSettings {
                reduce_noise: enhance.reduce_noise,
                normalize: enhance.normalize,
                target_peak: enhance.target_peak,
            },
        }
    }
}
