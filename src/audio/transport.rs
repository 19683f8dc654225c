// src/audio/transport.rs
//! Transport-driven signal source: cursor, gain and looping over a decoded buffer.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rodio::Source;

use super::decode::DecodedAudio;

/// Playback transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

/// State shared between the graph (control side) and the source (audio side).
#[derive(Debug)]
pub struct Transport {
    pub state: TransportState,
    /// Interleaved sample index of the next frame; always frame-aligned.
    pub cursor: usize,
    pub gain: f32,
    pub looping: bool,
}

impl Transport {
    pub fn new(gain: f32, looping: bool) -> Self {
        Self {
            state: TransportState::Stopped,
            cursor: 0,
            gain,
            looping,
        }
    }
}

pub type SharedTransport = Arc<Mutex<Transport>>;

/// Streams the decoded buffer according to the shared transport. Transport
/// changes are picked up on frame boundaries so channels never swap.
pub struct TransportSource {
    audio: DecodedAudio,
    transport: SharedTransport,
    /// Start index of the frame being emitted, `None` while emitting silence.
    frame_start: Option<usize>,
    gain: f32,
    channel: u16,
}

impl TransportSource {
    pub fn new(audio: DecodedAudio, transport: SharedTransport) -> Self {
        Self {
            audio,
            transport,
            frame_start: None,
            gain: 1.0,
            channel: 0,
        }
    }

    /// Latch the next frame. Returns `None` once the transport is stopped.
    fn begin_frame(&mut self) -> Option<()> {
        let mut t = self.transport.lock().ok()?;
        let len = self.audio.samples().len();
        let channels = self.audio.channels() as usize;

        self.frame_start = match t.state {
            TransportState::Stopped => return None,
            TransportState::Paused => None,
            TransportState::Playing => {
                if t.cursor >= len && t.looping {
                    t.cursor = 0;
                }
                if t.cursor + channels <= len {
                    let start = t.cursor;
                    t.cursor += channels;
                    Some(start)
                } else {
                    // Holding at end of media until the scheduler halts the graph.
                    t.cursor = len;
                    None
                }
            }
        };
        self.gain = t.gain;
        Some(())
    }
}

impl Iterator for TransportSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.channel == 0 {
            self.begin_frame()?;
        }
        let sample = match self.frame_start {
            Some(start) => self.audio.samples()[start + self.channel as usize] * self.gain,
            None => 0.0,
        };
        self.channel += 1;
        if self.channel == self.audio.channels() {
            self.channel = 0;
        }
        Some(sample)
    }
}

impl Source for TransportSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.audio.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.audio.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
