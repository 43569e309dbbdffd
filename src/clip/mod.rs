//! Finished clips and payload assembly
//!
//! Everything produced by a recording session: the in-memory audio blob,
//! the assembled upload payload, and the traits for the external
//! collaborators (upload queue, suggestion services, profile data).

pub mod assembler;
pub mod blob;
pub mod services;

pub use assembler::{
    ClipAssembler, ClipMetadata, ClipPayload, ContentRating, PostTarget, Visibility,
};
pub use blob::{AudioBlob, DecodedAudio, WAV_MIME};
pub use services::{
    profile_city, suggested_metadata, suggested_tags, AiSuggestionService, ClipSuggestions,
    ProfileProvider, TagSuggestionService, UploadQueue,
};

use crate::analysis::QualityMetrics;
use crate::waveform::WaveformFrame;

/// A finished recording, owned by its session and discarded on reset.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// The clip exactly as captured.
    pub raw_blob: AudioBlob,
    /// Result of enhancement/trim/gain, when any was applied.
    pub processed_blob: Option<AudioBlob>,
    /// Always re-derived from encoded audio after trim, never assumed.
    pub duration_seconds: f64,
    /// The last live waveform frame, retained permanently.
    pub waveform_summary: WaveformFrame,
    /// Advisory metrics; absent when analysis failed or has not finished.
    pub quality_metrics: Option<QualityMetrics>,
}

impl AudioClip {
    /// The blob that downstream processing should operate on.
    pub fn effective_blob(&self) -> &AudioBlob {
        self.processed_blob.as_ref().unwrap_or(&self.raw_blob)
    }
}
