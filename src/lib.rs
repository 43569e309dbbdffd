pub mod analysis;
pub mod capture;
pub mod clip;
pub mod config;
pub mod enhance;
pub mod error;
pub mod trim;
pub mod waveform;

pub use analysis::{QualityAnalyzer, QualityMetrics, RecommendedAction, SilenceGate};
pub use capture::{
    select_mime_type, AudioCaptureSource, AudioFrame, CaptureConfig, CaptureController,
    ControllerEvent, FftSpectrum, SessionState, SpectrumAnalyzer, WavFileSource,
    PREFERRED_MIME_TYPES,
};
pub use clip::{
    profile_city, suggested_metadata, suggested_tags, AiSuggestionService, AudioBlob, AudioClip,
    ClipAssembler, ClipMetadata, ClipPayload, ClipSuggestions, ContentRating, DecodedAudio,
    PostTarget, ProfileProvider, TagSuggestionService, UploadQueue, Visibility,
};
pub use config::Config;
pub use enhance::{EnhanceOptions, EnhancementPipeline};
pub use error::{CaptureError, ProcessingError, SubmitError, ValidationError};
pub use trim::{TrimEngine, TrimOutcome, TrimSelection};
pub use waveform::{WaveformAnalyzer, WaveformFrame, WAVEFORM_BINS};
