// src/audio/sample_capture.rs
//! A wrapper source that captures audio samples into a circular buffer for analysis.

use std::sync::{Arc, Mutex};

use ringbuf::{traits::*, HeapRb};
use rodio::Source;

/// Shared circular buffer of recent mono samples, read by the analysis tap.
pub type CaptureBuffer = Arc<Mutex<HeapRb<f32>>>;

/// Allocate a capture buffer holding `capacity` mono samples.
pub fn capture_buffer(capacity: usize) -> CaptureBuffer {
    Arc::new(Mutex::new(HeapRb::<f32>::new(capacity.max(1))))
}

/// A wrapper source that downmixes each frame to mono into a circular buffer
/// while passing the interleaved samples through untouched.
pub struct SampleCapture<S> {
    source: S,
    buffer: CaptureBuffer,
    channels: u16,
    channel: u16,
    frame_sum: f32,
}

impl<S> SampleCapture<S>
where
    S: Source<Item = f32>,
{
    /// Create a new sample capture wrapper around an existing source.
    pub fn new(source: S, buffer: CaptureBuffer) -> Self {
        let channels = source.channels().max(1);
        Self {
            source,
            buffer,
            channels,
            channel: 0,
            frame_sum: 0.0,
        }
    }

    fn push(&self, sample: f32) {
        if let Ok(mut buf) = self.buffer.lock() {
            // If buffer is full, pop the oldest sample to make room
            if buf.is_full() {
                let _ = buf.try_pop();
            }
            let _ = buf.try_push(sample);
        }
    }
}

impl<S> Iterator for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.source.next()?;
        self.frame_sum += sample;
        self.channel += 1;
        if self.channel == self.channels {
            self.push(self.frame_sum / self.channels as f32);
            self.channel = 0;
            self.frame_sum = 0.0;
        }
        Some(sample)
    }
}

impl<S> Source for SampleCapture<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.source.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn total_duration(&self) -> Option<std::time::Duration> {
        self.source.total_duration()
    }
}
