// src/audio/mod.rs
//! Audio module - decoding, the playback graph and the analysis tap.

pub mod analysis;
pub mod decode;
pub mod output;
pub mod player;
pub mod sample_capture;
pub mod transport;

// Re-export commonly used types
pub use analysis::{AnalysisTap, MagnitudeSpectrum};
pub use decode::{decode, DecodedAudio};
pub use output::{AudioOutput, ManualOutput, RodioOutput};
pub use player::{PlaybackGraph, PlaybackSession};
pub use sample_capture::{capture_buffer, CaptureBuffer, SampleCapture};
pub use transport::TransportState;
