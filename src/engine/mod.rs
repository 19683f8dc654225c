// src/engine/mod.rs
//! The visualizer core as the shell sees it.
//!
//! [`Visualizer`] owns exactly one playback graph, one analysis tap and one frame
//! scheduler, and routes the shell's intents to them. Everything runs on the
//! caller's thread except decoding, which completes on a worker thread and is
//! wired up by the next [`Visualizer::poll`].

pub mod format;

use std::{
    fs,
    path::Path,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::Duration,
};

use crate::{
    audio::{
        analysis::AnalysisTap,
        decode::{decode, DecodedAudio},
        output::AudioOutput,
        player::PlaybackGraph,
        transport::TransportState,
    },
    chart::{transform, ChartSeries},
    config::{Settings, SettingsStore},
    error::{Result, VisualizerError},
    events::PlayerEvents,
    fs::{ensure_audio, SNIFF_LEN},
    scheduler::{Clock, FrameScheduler, SchedulerState, SystemClock},
};

pub use format::{format_duration, format_remaining};

pub struct Visualizer<C: Clock = SystemClock> {
    graph: PlaybackGraph,
    tap: AnalysisTap,
    scheduler: FrameScheduler<C>,
    store: SettingsStore,
    events: Box<dyn PlayerEvents>,
    /// Decode running on a worker thread.
    pending: Option<Receiver<Result<DecodedAudio>>>,
}

impl Visualizer<SystemClock> {
    pub fn new(
        output: Box<dyn AudioOutput>,
        store: SettingsStore,
        events: Box<dyn PlayerEvents>,
    ) -> Result<Self> {
        Self::with_clock(output, store, events, SystemClock::new())
    }
}

impl<C: Clock> Visualizer<C> {
    pub fn with_clock(
        output: Box<dyn AudioOutput>,
        mut store: SettingsStore,
        events: Box<dyn PlayerEvents>,
        clock: C,
    ) -> Result<Self> {
        let settings = store.settings().clone();
        let tap = AnalysisTap::new(settings.fft_size)?;
        let mut graph = PlaybackGraph::new(output);
        graph.set_loop(settings.looping);

        let mut scheduler = FrameScheduler::new(clock, settings);
        scheduler.subscribe(store.subscribe());

        Ok(Self {
            graph,
            tap,
            scheduler,
            store,
            events,
            pending: None,
        })
    }

    /// Replace the current file with `bytes`. Returns immediately; the result
    /// arrives through `on_loaded` or `on_load_failed` during a later `poll`.
    pub fn load(&mut self, bytes: Vec<u8>) {
        self.teardown();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(decode(bytes));
        });
        self.pending = Some(rx);
    }

    /// Read and validate a file, then [`Self::load`] it. Non-audio input is
    /// rejected before anything is torn down.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path)?;
        let head = &bytes[..bytes.len().min(SNIFF_LEN as usize)];
        let file_type = ensure_audio(path, head)?;
        log::info!("Loading {} ({})", path.display(), file_type.mime);
        self.load(bytes);
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Drive the core: finish a pending load, then run due scheduler callbacks.
    /// Returns how many callbacks ran.
    pub fn poll(&mut self) -> usize {
        self.finish_load();

        let was_running = self.scheduler.state() == SchedulerState::Running;
        let ran = self
            .scheduler
            .poll(&mut self.tap, &mut self.graph, self.events.as_mut());
        if was_running && self.scheduler.state() == SchedulerState::Idle {
            // End of media tore the run down.
            self.events.on_play_state_changed(false);
        }
        ran
    }

    /// Time until the scheduler next needs a `poll`.
    pub fn until_next_frame(&self) -> Option<Duration> {
        self.scheduler.until_next()
    }

    pub fn play(&mut self) -> Result<()> {
        if !self.graph.play()? {
            return Ok(());
        }
        if !self.tap.is_attached() {
            self.tap.attach(self.graph.tap_point()?);
        }
        self.scheduler.start(&mut self.tap, &mut self.graph);
        self.events.on_play_state_changed(true);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.graph.pause()? {
            self.scheduler.suspend();
            self.events.on_play_state_changed(false);
        }
        Ok(())
    }

    /// Halt the scheduler, rewind and release the signal path. The loaded file stays.
    pub fn stop(&mut self) -> Result<()> {
        if !self.graph.has_session() {
            return Err(VisualizerError::InvalidState("stop without a loaded session"));
        }
        let was_playing = self.graph.state() == TransportState::Playing;
        self.scheduler.stop(&mut self.tap, &mut self.graph);
        self.graph.stop()?;
        self.tap.detach();
        if was_playing {
            self.events.on_play_state_changed(false);
        }
        Ok(())
    }

    pub fn seek(&mut self, position: Duration) -> Result<Duration> {
        let applied = self.graph.seek(position)?;
        self.events.on_position_changed(applied);
        Ok(applied)
    }

    /// Set and remember the output level, clamped to `[0, 1]`. Without a loaded
    /// session the level is only remembered for the next load.
    pub fn set_volume(&mut self, level: f32) -> Result<f32> {
        self.store.set_volume(level);
        let level = self.store.volume();
        if self.graph.has_session() {
            self.graph.set_volume(level)?;
        }
        Ok(level)
    }

    pub fn volume(&self) -> f32 {
        self.store.volume()
    }

    /// Validate and publish new settings. While playing they take effect on the
    /// next tick; otherwise immediately.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.store.update(settings)?;
        if self.scheduler.state() != SchedulerState::Running {
            self.scheduler.sync_settings(&mut self.tap, &mut self.graph);
        }
        Ok(())
    }

    /// The last accepted settings.
    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    /// Chart series for the current frame. Read on every repaint.
    pub fn current_frame(&self) -> ChartSeries {
        transform(self.scheduler.frame(), self.scheduler.settings())
    }

    pub fn has_session(&self) -> bool {
        self.graph.has_session()
    }

    pub fn is_playing(&self) -> bool {
        self.graph.state() == TransportState::Playing
    }

    pub fn transport_state(&self) -> TransportState {
        self.graph.state()
    }

    pub fn position(&self) -> Result<Duration> {
        self.graph.position()
    }

    pub fn duration(&self) -> Result<Duration> {
        self.graph.duration()
    }

    /// Release the session and abandon any pending load.
    pub fn close(&mut self) {
        self.teardown();
    }

    /// Cancel callbacks before the graph they reference goes away.
    fn teardown(&mut self) {
        self.pending = None;
        let was_playing = self.is_playing();
        self.scheduler.stop(&mut self.tap, &mut self.graph);
        self.tap.detach();
        self.graph.close();
        if was_playing {
            self.events.on_play_state_changed(false);
        }
    }

    fn finish_load(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(VisualizerError::Decode("decoder thread exited".into()))
            }
        };
        self.pending = None;

        match result {
            Ok(audio) => {
                let duration = self.graph.load(audio, self.store.volume()).duration();
                match self.graph.tap_point() {
                    Ok(capture) => self.tap.attach(capture),
                    Err(e) => log::warn!("New session has no tap point: {e}"),
                }
                self.events.on_loaded(duration);
            }
            Err(e) => {
                log::warn!("Load failed: {e}");
                self.events.on_load_failed(e);
            }
        }
    }
}

impl<C: Clock> Drop for Visualizer<C> {
    fn drop(&mut self) {
        self.scheduler.stop(&mut self.tap, &mut self.graph);
    }
}
