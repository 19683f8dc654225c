// src/audio/player.rs
//! Decode & playback graph: one session at a time, transport control, gain and the analysis tap point.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ringbuf::traits::*;

use super::decode::{frames_to_duration, DecodedAudio};
use super::output::AudioOutput;
use super::sample_capture::{capture_buffer, CaptureBuffer, SampleCapture};
use super::transport::{SharedTransport, Transport, TransportSource, TransportState};
use crate::config::MAX_FFT_SIZE;
use crate::error::{Result, VisualizerError};

/// Resources owned for the lifetime of one loaded file.
pub struct PlaybackSession {
    audio: DecodedAudio,
    transport: SharedTransport,
    capture: CaptureBuffer,
    /// True while a source built from this session is attached to the output.
    connected: bool,
}

impl PlaybackSession {
    pub fn duration(&self) -> Duration {
        self.audio.duration()
    }

    pub fn audio(&self) -> &DecodedAudio {
        &self.audio
    }
}

/// Owns the output stage and the active session, if any.
pub struct PlaybackGraph {
    output: Box<dyn AudioOutput>,
    session: Option<PlaybackSession>,
    /// Loop flag applied to sessions loaded later.
    looping: bool,
}

impl PlaybackGraph {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            session: None,
            looping: true,
        }
    }

    /// Replace any current session with `audio`, ready to play from the start.
    pub fn load(&mut self, audio: DecodedAudio, volume: f32) -> &PlaybackSession {
        self.close();
        let transport = Arc::new(Mutex::new(Transport::new(
            volume.clamp(0.0, 1.0),
            self.looping,
        )));
        log::info!(
            "Session loaded: {:.1}s, {} ch, {}Hz",
            audio.duration().as_secs_f32(),
            audio.channels(),
            audio.sample_rate()
        );
        self.session.insert(PlaybackSession {
            audio,
            transport,
            capture: capture_buffer(MAX_FFT_SIZE),
            connected: false,
        })
    }

    /// Release the session and its decoded buffer.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            if let Ok(mut t) = session.transport.lock() {
                t.state = TransportState::Stopped;
            }
            if session.connected {
                self.output.disconnect();
            }
            log::info!("Session closed");
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// The post-gain capture point the analysis tap attaches to.
    pub fn tap_point(&self) -> Result<CaptureBuffer> {
        Ok(self.active()?.capture.clone())
    }

    /// Start or resume playback. Returns `false` when already playing.
    pub fn play(&mut self) -> Result<bool> {
        let session = self
            .session
            .as_mut()
            .ok_or(VisualizerError::InvalidState("play without a loaded session"))?;

        {
            let mut t = lock(&session.transport)?;
            if t.state == TransportState::Playing {
                return Ok(false);
            }
            if t.cursor >= session.audio.samples().len() {
                t.cursor = 0;
            }
            t.state = TransportState::Playing;
        }

        if !session.connected {
            let source = SampleCapture::new(
                TransportSource::new(session.audio.clone(), session.transport.clone()),
                session.capture.clone(),
            );
            self.output.connect(source);
            session.connected = true;
        }
        Ok(true)
    }

    /// Pause playback. Returns `false` when not currently playing.
    pub fn pause(&mut self) -> Result<bool> {
        let mut t = lock(&self.active()?.transport)?;
        if t.state != TransportState::Playing {
            return Ok(false);
        }
        t.state = TransportState::Paused;
        Ok(true)
    }

    /// Rewind to zero and tear down the signal path. The decoded buffer stays loaded.
    pub fn stop(&mut self) -> Result<()> {
        let session = self
            .session
            .as_mut()
            .ok_or(VisualizerError::InvalidState("stop without a loaded session"))?;
        {
            let mut t = lock(&session.transport)?;
            t.state = TransportState::Stopped;
            t.cursor = 0;
        }
        if session.connected {
            self.output.disconnect();
            session.connected = false;
        }
        if let Ok(mut buf) = session.capture.lock() {
            buf.clear();
        }
        Ok(())
    }

    /// Move the playhead, clamped to `[0, duration]`. Returns the applied position.
    pub fn seek(&mut self, position: Duration) -> Result<Duration> {
        let session = self.active()?;
        let frames = session.audio.frames();
        let rate = session.audio.sample_rate();
        let frame = ((position.as_secs_f64() * f64::from(rate)) as usize).min(frames);
        lock(&session.transport)?.cursor = frame * session.audio.channels() as usize;
        Ok(frames_to_duration(frame, rate))
    }

    /// Set the output gain, clamped to `[0, 1]`. Returns the applied level.
    pub fn set_volume(&mut self, level: f32) -> Result<f32> {
        let level = level.clamp(0.0, 1.0);
        lock(&self.active()?.transport)?.gain = level;
        Ok(level)
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
        if let Some(session) = &self.session {
            if let Ok(mut t) = session.transport.lock() {
                t.looping = looping;
            }
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn state(&self) -> TransportState {
        self.session
            .as_ref()
            .and_then(|s| s.transport.lock().ok().map(|t| t.state))
            .unwrap_or(TransportState::Stopped)
    }

    pub fn position(&self) -> Result<Duration> {
        let session = self.active()?;
        let cursor = lock(&session.transport)?.cursor;
        let frame = cursor / session.audio.channels() as usize;
        Ok(frames_to_duration(frame, session.audio.sample_rate()))
    }

    pub fn duration(&self) -> Result<Duration> {
        Ok(self.active()?.duration())
    }

    fn active(&self) -> Result<&PlaybackSession> {
        self.session
            .as_ref()
            .ok_or(VisualizerError::InvalidState("no loaded session"))
    }
}

impl Drop for PlaybackGraph {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock(transport: &SharedTransport) -> Result<std::sync::MutexGuard<'_, Transport>> {
    transport
        .lock()
        .map_err(|_| VisualizerError::InvalidState("transport lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::ManualOutput;

    fn graph() -> (PlaybackGraph, ManualOutput) {
        let output = ManualOutput::new();
        (PlaybackGraph::new(Box::new(output.clone())), output)
    }

    /// One second of mono audio at 100 Hz sample rate.
    fn ramp() -> DecodedAudio {
        DecodedAudio::from_samples((0..100).map(|i| i as f32 / 100.0).collect(), 1, 100)
    }

    #[test]
    fn operations_without_session_are_invalid_state() {
        let (mut graph, _) = graph();
        assert!(matches!(graph.play(), Err(VisualizerError::InvalidState(_))));
        assert!(matches!(graph.pause(), Err(VisualizerError::InvalidState(_))));
        assert!(matches!(graph.stop(), Err(VisualizerError::InvalidState(_))));
        assert!(matches!(graph.seek(Duration::ZERO), Err(VisualizerError::InvalidState(_))));
        assert!(matches!(graph.set_volume(0.3), Err(VisualizerError::InvalidState(_))));
        assert!(graph.position().is_err());
        assert!(graph.tap_point().is_err());
        assert_eq!(graph.state(), TransportState::Stopped);
    }

    #[test]
    fn play_connects_once_and_is_idempotent() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        assert!(!output.is_connected());

        assert!(graph.play().unwrap());
        assert!(output.is_connected());
        assert!(!graph.play().unwrap());
        assert_eq!(graph.state(), TransportState::Playing);
    }

    #[test]
    fn pause_twice_changes_nothing_the_second_time() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        graph.play().unwrap();
        output.pump(10);

        assert!(graph.pause().unwrap());
        let position = graph.position().unwrap();
        assert!(!graph.pause().unwrap());
        assert_eq!(graph.state(), TransportState::Paused);
        output.pump(10);
        assert_eq!(graph.position().unwrap(), position);
    }

    #[test]
    fn position_tracks_pulled_frames() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        graph.play().unwrap();
        output.pump(25);
        assert_eq!(graph.position().unwrap(), Duration::from_millis(250));
        assert_eq!(graph.duration().unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn seek_clamps_to_duration() {
        let (mut graph, _) = graph();
        graph.load(ramp(), 1.0);
        assert_eq!(graph.seek(Duration::from_secs(5)).unwrap(), Duration::from_secs(1));
        assert_eq!(graph.position().unwrap(), Duration::from_secs(1));
        assert_eq!(graph.seek(Duration::from_millis(500)).unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn seek_takes_effect_on_next_frame() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        graph.play().unwrap();
        output.pump(3);
        graph.seek(Duration::from_millis(500)).unwrap();
        assert_eq!(output.pump(1), vec![0.5]);
    }

    #[test]
    fn volume_scales_output_and_capture() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        assert_eq!(graph.set_volume(1.7).unwrap(), 1.0);
        assert_eq!(graph.set_volume(0.5).unwrap(), 0.5);
        graph.play().unwrap();
        graph.seek(Duration::from_millis(500)).unwrap();

        assert_eq!(output.pump(1), vec![0.25]);
        let tap = graph.tap_point().unwrap();
        let captured: Vec<f32> = tap.lock().unwrap().iter().copied().collect();
        assert_eq!(captured, vec![0.25]);
    }

    #[test]
    fn stop_rewinds_and_disconnects() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        graph.play().unwrap();
        output.pump(40);

        graph.stop().unwrap();
        assert_eq!(graph.position().unwrap(), Duration::ZERO);
        assert_eq!(graph.state(), TransportState::Stopped);
        assert!(!output.is_connected());
        assert_eq!(graph.tap_point().unwrap().lock().unwrap().occupied_len(), 0);

        // Playing again rebuilds the signal path from the start.
        graph.play().unwrap();
        assert!(output.is_connected());
        assert_eq!(output.pump(1), vec![0.0]);
    }

    #[test]
    fn non_looping_playback_holds_at_end() {
        let (mut graph, output) = graph();
        graph.set_loop(false);
        graph.load(ramp(), 1.0);
        graph.play().unwrap();
        output.pump(150);
        assert_eq!(graph.position().unwrap(), graph.duration().unwrap());
        assert_eq!(graph.state(), TransportState::Playing);
    }

    #[test]
    fn looping_playback_wraps() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        graph.set_loop(true);
        graph.play().unwrap();
        output.pump(130);
        let position = graph.position().unwrap().as_secs_f64();
        assert!((position - 0.3).abs() < 1e-6, "position {position}");
    }

    #[test]
    fn loading_replaces_previous_session() {
        let (mut graph, output) = graph();
        graph.load(ramp(), 1.0);
        graph.play().unwrap();
        let old_tap = graph.tap_point().unwrap();

        graph.load(DecodedAudio::from_samples(vec![0.0; 50], 1, 100), 1.0);
        assert!(!output.is_connected());
        assert_eq!(graph.duration().unwrap(), Duration::from_millis(500));
        assert!(!Arc::ptr_eq(&old_tap, &graph.tap_point().unwrap()));
    }
}
