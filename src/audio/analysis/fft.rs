// src/audio/analysis/fft.rs
//! FFT computation with analyser-node style smoothing and byte scaling.

use std::f32::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

/// Blackman window parameter.
const BLACKMAN_ALPHA: f32 = 0.16;
/// Weight of the previous snapshot in temporal smoothing.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
/// dB value mapped to byte 0.
pub const MIN_DECIBELS: f32 = -100.0;
/// dB value mapped to byte 255.
pub const MAX_DECIBELS: f32 = -30.0;

/// FFT processor for audio spectrum analysis.
pub struct FftProcessor {
    /// FFT planner for frequency analysis
    fft_planner: FftPlanner<f32>,
    fft_size: usize,
    /// Precomputed window coefficients
    window: Vec<f32>,
    /// Smoothed linear magnitudes carried between snapshots
    smoothed: Vec<f32>,
}

impl FftProcessor {
    pub fn new(fft_size: usize) -> Self {
        Self {
            fft_planner: FftPlanner::new(),
            fft_size,
            window: blackman_window(fft_size),
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Switch window size. Smoothing history does not carry over.
    pub fn resize(&mut self, fft_size: usize) {
        if fft_size != self.fft_size {
            self.fft_size = fft_size;
            self.window = blackman_window(fft_size);
            self.smoothed = vec![0.0; fft_size / 2];
        }
    }

    /// Compute the byte magnitude spectrum of `samples`, which must hold exactly `fft_size` values.
    pub fn compute(&mut self, samples: &[f32]) -> Vec<u8> {
        let n = self.fft_size;

        let mut buffer: Vec<Complex<f32>> = samples
            .iter()
            .take(n)
            .zip(&self.window)
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(n, Complex::new(0.0, 0.0));

        let fft = self.fft_planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        // Only the first half carries information for real input
        let scale = 1.0 / n as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        buffer
            .iter()
            .take(n / 2)
            .zip(self.smoothed.iter_mut())
            .map(|(c, smoothed)| {
                let mag = c.norm() * scale;
                *smoothed = SMOOTHING_TIME_CONSTANT * *smoothed
                    + (1.0 - SMOOTHING_TIME_CONSTANT) * mag;
                let db = 20.0 * smoothed.max(1e-10).log10();
                (255.0 * (db - MIN_DECIBELS) / range).clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = (1.0 - BLACKMAN_ALPHA) / 2.0;
    let a1 = 0.5;
    let a2 = BLACKMAN_ALPHA / 2.0;
    (0..size)
        .map(|i| {
            let x = 2.0 * PI * i as f32 / size as f32;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}
