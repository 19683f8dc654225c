// src/audio/output.rs
//! Output backends that pull the signal path: a rodio device thread, or a manual pump.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use rodio::{OutputStream, Sink};

use super::sample_capture::SampleCapture;
use super::transport::TransportSource;

/// The complete signal path handed to an output: transport source plus analysis capture.
pub type GraphSource = SampleCapture<TransportSource>;

/// Final stage of the playback graph.
pub trait AudioOutput: Send {
    /// Start pulling `source`, replacing whatever was connected.
    fn connect(&mut self, source: GraphSource);
    /// Drop the connected source, if any.
    fn disconnect(&mut self);
}

/// Commands sent to the audio playback thread.
enum OutputCommand {
    Connect(GraphSource),
    Disconnect,
}

/// Plays through the default output device. The `OutputStream` lives on its own
/// thread and is driven by commands.
pub struct RodioOutput {
    cmd_tx: Sender<OutputCommand>,
}

impl RodioOutput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<OutputCommand>();

        // Spawn audio thread which owns the OutputStream and the current sink
        thread::spawn(move || {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::error!("No audio output device: {e}");
                    // Drain commands until the sender is dropped, then return.
                    while rx.recv().is_ok() {}
                    return;
                }
            };
            let mut sink: Option<Sink> = None;

            while let Ok(cmd) = rx.recv() {
                match cmd {
                    OutputCommand::Connect(source) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        match Sink::try_new(&handle) {
                            Ok(new_sink) => {
                                new_sink.append(source);
                                new_sink.play();
                                sink = Some(new_sink);
                            }
                            Err(e) => log::error!("Failed to open sink: {e}"),
                        }
                    }
                    OutputCommand::Disconnect => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                    }
                }
            }
            // If the command channel closed, make sure to stop the sink.
            if let Some(s) = sink.take() {
                s.stop();
            }
            // Keep stream alive until thread exits
            drop(stream);
        });

        Self { cmd_tx: tx }
    }
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RodioOutput {
    fn connect(&mut self, source: GraphSource) {
        let _ = self.cmd_tx.send(OutputCommand::Connect(source));
    }

    fn disconnect(&mut self) {
        let _ = self.cmd_tx.send(OutputCommand::Disconnect);
    }
}

/// Device-less output: the caller pulls samples explicitly. Clones share the same slot.
#[derive(Clone, Default)]
pub struct ManualOutput {
    slot: Arc<Mutex<Option<GraphSource>>>,
}

impl ManualOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Pull up to `samples` interleaved samples. A source that ends is dropped,
    /// as a device sink would.
    pub fn pump(&self, samples: usize) -> Vec<f32> {
        let Ok(mut slot) = self.slot.lock() else {
            return Vec::new();
        };
        let Some(source) = slot.as_mut() else {
            return Vec::new();
        };
        let out: Vec<f32> = source.by_ref().take(samples).collect();
        if out.len() < samples {
            *slot = None;
        }
        out
    }
}

impl AudioOutput for ManualOutput {
    fn connect(&mut self, source: GraphSource) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(source);
        }
    }

    fn disconnect(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
