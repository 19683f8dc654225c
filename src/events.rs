// src/events.rs
//! Notifications delivered from the core to the presentation shell.

use std::{sync::mpsc::Sender, time::Duration};

use crate::error::VisualizerError;

/// Callbacks the shell registers with the core.
pub trait PlayerEvents {
    /// Non-looping playback reached the end of media.
    fn on_playback_ended(&mut self);
    fn on_position_changed(&mut self, position: Duration);
    fn on_play_state_changed(&mut self, playing: bool);
    /// Asynchronous decode finished and the session is ready.
    fn on_loaded(&mut self, _duration: Duration) {}
    /// Asynchronous decode failed; the shell should offer file selection again.
    fn on_load_failed(&mut self, _error: VisualizerError) {}
}

/// Event form for shells that prefer draining a channel.
#[derive(Debug)]
pub enum PlayerEvent {
    Ended,
    Position(Duration),
    PlayState(bool),
    Loaded(Duration),
    LoadFailed(VisualizerError),
}

impl PlayerEvents for Sender<PlayerEvent> {
    fn on_playback_ended(&mut self) {
        let _ = self.send(PlayerEvent::Ended);
    }

    fn on_position_changed(&mut self, position: Duration) {
        let _ = self.send(PlayerEvent::Position(position));
    }

    fn on_play_state_changed(&mut self, playing: bool) {
        let _ = self.send(PlayerEvent::PlayState(playing));
    }

    fn on_loaded(&mut self, duration: Duration) {
        let _ = self.send(PlayerEvent::Loaded(duration));
    }

    fn on_load_failed(&mut self, error: VisualizerError) {
        let _ = self.send(PlayerEvent::LoadFailed(error));
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl PlayerEvents for NoEvents {
    fn on_playback_ended(&mut self) {}
    fn on_position_changed(&mut self, _position: Duration) {}
    fn on_play_state_changed(&mut self, _playing: bool) {}
}
