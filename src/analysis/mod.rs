//! Submission-time clip analysis
//!
//! The silence gate is the hard check applied once when the user submits;
//! the quality analyzer is a one-shot advisory pass whose failure never
//! blocks anything.

pub mod quality;
pub mod silence;

pub use quality::{QualityAnalyzer, QualityMetrics, RecommendedAction};
pub use silence::SilenceGate;
