use thiserror::Error;

/// Hardware acquisition and mid-capture failures.
///
/// Permission and device errors abort the session back to Idle; a recording
/// fault forces an immediate stop of the running capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone permission denied: {0}")]
    Permission(String),

    #[error("audio device unavailable: {0}")]
    Device(String),

    #[error("recording fault: {0}")]
    Recording(String),

    /// Operation called in a state that does not allow it.
    #[error("invalid session state: expected {expected}, was {actual}")]
    InvalidState { expected: String, actual: String },
}

/// Content and payload validation failures.
///
/// These block submission and return the user to review; the recorded blob
/// is always preserved for retry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("not enough audible audio was captured")]
    InsufficientAudio,

    #[error("recording is too short ({duration_seconds:.1}s)")]
    TooShort { duration_seconds: f64 },

    #[error("unsupported audio format: {mime_type}")]
    UnsupportedFormat { mime_type: String },

    #[error("a mood emoji is required")]
    MissingMood,

    #[error("a target profile or topic is required")]
    MissingTarget,
}

/// Processing failures.
///
/// Never surfaced to the user as blocking errors: enhancement and trim fall
/// back to earlier tiers or the original blob, quality analysis degrades to
/// absent metrics.
#[derive(Debug, Error, Clone)]
pub enum ProcessingError {
    #[error("enhancement failed: {0}")]
    Enhancement(String),

    #[error("trim failed: {0}")]
    Trim(String),

    #[error("quality analysis failed: {0}")]
    QualityAnalysis(String),
}

/// Outcome of a submission attempt.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("upload queue rejected the clip: {0}")]
    Upload(String),

    #[error("submission not allowed: {0}")]
    InvalidState(String),
}
