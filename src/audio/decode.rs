// src/audio/decode.rs
//! Decoding raw encoded audio into an interleaved f32 buffer.

use std::{io::Cursor, sync::Arc, time::Duration};

use rodio::{Decoder, Source};

use crate::error::{Result, VisualizerError};

/// Fully decoded audio asset, shared between the graph and its signal source.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Wrap already-decoded interleaved samples.
    pub fn from_samples(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn samples(&self) -> &Arc<[f32]> {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of multi-channel frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        frames_to_duration(self.frames(), self.sample_rate)
    }
}

pub(crate) fn frames_to_duration(frames: usize, sample_rate: u32) -> Duration {
    Duration::from_secs_f64(frames as f64 / f64::from(sample_rate))
}

/// Decode an encoded byte stream (WAV, MP3, FLAC, OGG...).
pub fn decode(bytes: Vec<u8>) -> Result<DecodedAudio> {
    let byte_len = bytes.len();
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| VisualizerError::Decode(e.to_string()))?;

    let channels = source.channels();
    let sample_rate = source.sample_rate();
    if channels == 0 || sample_rate == 0 {
        return Err(VisualizerError::Decode(format!(
            "stream reports {channels} channels at {sample_rate} Hz"
        )));
    }

    let samples: Vec<f32> = source.convert_samples::<f32>().collect();
    if samples.is_empty() {
        return Err(VisualizerError::Decode("stream contains no audio frames".into()));
    }

    let audio = DecodedAudio::from_samples(samples, channels, sample_rate);
    log::info!(
        "Decoded {} bytes: {} frames, {} ch, {}Hz, {:.1}s",
        byte_len,
        audio.frames(),
        channels,
        sample_rate,
        audio.duration().as_secs_f32()
    );
    Ok(audio)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory 16-bit PCM WAV with a sine at `freq` Hz.
    pub(crate) fn sine_wav(freq: f32, secs: f32, sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let frames = (secs * sample_rate as f32) as usize;
            for i in 0..frames {
                let t = i as f32 / sample_rate as f32;
                let v = (2.0 * std::f32::consts::PI * freq * t).sin() * 0.5;
                for _ in 0..channels {
                    writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_wav_bytes() {
        let audio = decode(sine_wav(440.0, 0.5, 8000, 2)).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.frames(), 4000);
        assert!((audio.duration().as_secs_f32() - 0.5).abs() < 1e-3);
        assert!(audio.samples().iter().any(|s| s.abs() > 0.4));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode(b"definitely not audio data".to_vec()).unwrap_err();
        assert!(matches!(err, VisualizerError::Decode(_)));
    }

    #[test]
    fn empty_input_is_a_decode_error() {
        assert!(matches!(decode(Vec::new()), Err(VisualizerError::Decode(_))));
    }

    #[test]
    fn duration_from_frames() {
        let audio = DecodedAudio::from_samples(vec![0.0; 44_100 * 2], 2, 44_100);
        assert_eq!(audio.frames(), 44_100);
        assert_eq!(audio.duration(), Duration::from_secs(1));
    }
}
