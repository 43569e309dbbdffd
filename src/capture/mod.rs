//! Recording capture
//!
//! The capture controller owns the session state machine, the hardware
//! source, and the two repeating tasks (duration timer, waveform loop)
//! that exist while recording. Hardware is abstracted behind
//! [`AudioCaptureSource`]; the spectrum analyser behind
//! [`SpectrumAnalyzer`].

pub mod backend;
pub mod controller;
pub mod file;
pub mod spectrum;
pub mod state;

pub use backend::{
    select_mime_type, AudioCaptureSource, AudioFrame, CaptureConfig, PREFERRED_MIME_TYPES,
};
pub use controller::{CaptureController, ControllerEvent};
pub use file::WavFileSource;
pub use spectrum::{FftSpectrum, SpectrumAnalyzer, FFT_SIZE};
pub use state::SessionState;
