// src/audio/analysis/mod.rs
//! Analysis tap: frequency-domain snapshots of the post-gain signal.

mod fft;

use ringbuf::traits::*;

use crate::audio::sample_capture::CaptureBuffer;
use crate::config::{is_valid_fft_size, MAX_FFT_SIZE, MIN_FFT_SIZE};
use crate::error::{FieldError, Result, VisualizerError};

pub use fft::{FftProcessor, MAX_DECIBELS, MIN_DECIBELS, SMOOTHING_TIME_CONSTANT};

/// One magnitude snapshot: `fft_size / 2` byte bins, low frequency first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagnitudeSpectrum(Vec<u8>);

impl MagnitudeSpectrum {
    pub fn new(bins: Vec<u8>) -> Self {
        Self(bins)
    }

    pub fn silent(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn bins(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for MagnitudeSpectrum {
    fn from(bins: Vec<u8>) -> Self {
        Self(bins)
    }
}

/// Frequency analyser attached to one playback session's capture point.
pub struct AnalysisTap {
    capture: Option<CaptureBuffer>,
    processor: FftProcessor,
    /// Most recent snapshot.
    current: MagnitudeSpectrum,
}

impl AnalysisTap {
    pub fn new(fft_size: usize) -> Result<Self> {
        check_fft_size(fft_size)?;
        Ok(Self {
            capture: None,
            processor: FftProcessor::new(fft_size),
            current: MagnitudeSpectrum::silent(fft_size / 2),
        })
    }

    pub fn attach(&mut self, capture: CaptureBuffer) {
        self.capture = Some(capture);
    }

    /// Drop the capture point. Later snapshots fail until re-attached.
    pub fn detach(&mut self) {
        self.capture = None;
    }

    pub fn is_attached(&self) -> bool {
        self.capture.is_some()
    }

    pub fn fft_size(&self) -> usize {
        self.processor.fft_size()
    }

    /// Set the analysis window size; applies from the next snapshot.
    pub fn configure(&mut self, fft_size: usize) -> Result<()> {
        check_fft_size(fft_size)?;
        self.processor.resize(fft_size);
        Ok(())
    }

    /// Analyse the most recent `fft_size` samples. Fewer captured samples are
    /// zero-padded at the old end.
    pub fn snapshot(&mut self) -> Result<MagnitudeSpectrum> {
        let capture = self
            .capture
            .as_ref()
            .ok_or(VisualizerError::InvalidState("analysis tap is detached"))?;
        let n = self.processor.fft_size();

        let window: Vec<f32> = {
            let buf = capture
                .lock()
                .map_err(|_| VisualizerError::InvalidState("capture buffer poisoned"))?;
            let available = buf.occupied_len();
            let mut window = vec![0.0f32; n.saturating_sub(available)];
            window.extend(buf.iter().skip(available.saturating_sub(n)).copied());
            window
        };

        self.current = MagnitudeSpectrum::new(self.processor.compute(&window));
        Ok(self.current.clone())
    }

    /// The last computed snapshot, without running a new transform.
    pub fn current(&self) -> &MagnitudeSpectrum {
        &self.current
    }
}

fn check_fft_size(fft_size: usize) -> Result<()> {
    if is_valid_fft_size(fft_size) {
        Ok(())
    } else {
        Err(VisualizerError::Validation(vec![FieldError::new(
            "fft_size",
            format!("{fft_size} is not a power of two between {MIN_FFT_SIZE} and {MAX_FFT_SIZE}"),
        )]))
    }
}
