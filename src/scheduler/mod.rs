// src/scheduler/mod.rs
//! Frame scheduler: samples the analysis tap at a bounded cadence and publishes
//! the current spectrum frame.
//!
//! Two kinds of callbacks are queued: a coarse `Tick` every `1 / fps` seconds
//! that takes a fresh snapshot, and a one-shot `Repaint` armed by each tick that
//! re-reads the tap on the next display refresh. The host drives both by calling
//! [`FrameScheduler::poll`] once per repaint. Every queued callback carries the
//! cancellation token of the run that created it and is skipped once that token
//! is cancelled.

pub mod cancel;
pub mod clock;

use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::audio::analysis::{AnalysisTap, MagnitudeSpectrum};
use crate::audio::player::PlaybackGraph;
use crate::config::Settings;
use crate::error::Result;
use crate::events::PlayerEvents;

pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};

/// What the scheduler reads spectra from.
pub trait SpectrumSource {
    fn configure(&mut self, fft_size: usize) -> Result<()>;
    fn snapshot(&mut self) -> Result<MagnitudeSpectrum>;
    /// Last computed spectrum, without recomputing.
    fn current(&self) -> MagnitudeSpectrum;
    fn detach(&mut self);
}

/// The slice of the playback graph the scheduler observes and tears down.
pub trait PlaybackTransport {
    fn position(&self) -> Result<Duration>;
    fn duration(&self) -> Result<Duration>;
    fn set_loop(&mut self, looping: bool);
    /// Stop playback and release the signal path.
    fn halt(&mut self) -> Result<()>;
}

impl SpectrumSource for AnalysisTap {
    fn configure(&mut self, fft_size: usize) -> Result<()> {
        AnalysisTap::configure(self, fft_size)
    }

    fn snapshot(&mut self) -> Result<MagnitudeSpectrum> {
        AnalysisTap::snapshot(self)
    }

    fn current(&self) -> MagnitudeSpectrum {
        AnalysisTap::current(self).clone()
    }

    fn detach(&mut self) {
        AnalysisTap::detach(self);
    }
}

impl PlaybackTransport for PlaybackGraph {
    fn position(&self) -> Result<Duration> {
        PlaybackGraph::position(self)
    }

    fn duration(&self) -> Result<Duration> {
        PlaybackGraph::duration(self)
    }

    fn set_loop(&mut self, looping: bool) {
        PlaybackGraph::set_loop(self, looping);
    }

    fn halt(&mut self) -> Result<()> {
        PlaybackGraph::stop(self)
    }
}

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
}

/// Ticks run before repaints that fall due in the same poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Callback {
    Tick,
    Repaint,
}

struct Pending {
    due: Duration,
    kind: Callback,
    token: CancellationToken,
}

pub struct FrameScheduler<C: Clock = SystemClock> {
    clock: C,
    state: SchedulerState,
    token: CancellationToken,
    pending: Vec<Pending>,
    /// Settings in effect for the current and following ticks.
    settings: Settings,
    updates: Option<Receiver<Settings>>,
    frame: MagnitudeSpectrum,
    /// True once the source and transport have been released.
    released: bool,
}

impl<C: Clock> FrameScheduler<C> {
    pub fn new(clock: C, settings: Settings) -> Self {
        let frame = MagnitudeSpectrum::silent(settings.bin_count());
        Self {
            clock,
            state: SchedulerState::Idle,
            token: CancellationToken::cancelled(),
            pending: Vec::new(),
            settings,
            updates: None,
            frame,
            released: true,
        }
    }

    /// Receive settings replacements; each applies at the start of the next tick.
    pub fn subscribe(&mut self, updates: Receiver<Settings>) {
        self.updates = Some(updates);
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The most recently published spectrum frame.
    pub fn frame(&self) -> &MagnitudeSpectrum {
        &self.frame
    }

    /// Settings the current frame was produced under.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Token of the current run; cancelled whenever the scheduler is not running.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Earliest pending callback, for sizing the host's wait.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending
            .iter()
            .filter(|p| p.token.is_live())
            .map(|p| p.due)
            .min()
    }

    /// Time left until [`Self::next_deadline`], zero when already due.
    pub fn until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|due| due.saturating_sub(self.clock.now()))
    }

    /// Idle -> Running. The first tick is due immediately. No-op when already running.
    pub fn start(&mut self, source: &mut dyn SpectrumSource, transport: &mut dyn PlaybackTransport) {
        if self.state == SchedulerState::Running {
            return;
        }
        self.sync_settings(source, transport);
        self.token = CancellationToken::new();
        self.state = SchedulerState::Running;
        self.released = false;
        self.schedule(self.clock.now(), Callback::Tick);
        log::info!("Scheduler running at {} fps", self.settings.fps);
    }

    /// Cancel pending callbacks but keep the tap and transport attached (pause).
    pub fn suspend(&mut self) {
        if self.state != SchedulerState::Running {
            return;
        }
        self.token.cancel();
        self.pending.clear();
        self.state = SchedulerState::Idle;
    }

    /// Cancel every pending callback, then release the tap and the transport.
    /// Idempotent.
    pub fn stop(&mut self, source: &mut dyn SpectrumSource, transport: &mut dyn PlaybackTransport) {
        self.token.cancel();
        self.pending.clear();
        if self.released {
            self.state = SchedulerState::Idle;
            return;
        }
        self.state = SchedulerState::Stopping;

        source.detach();
        if let Err(e) = transport.halt() {
            log::warn!("Halting transport during teardown: {e}");
        }
        self.released = true;
        self.state = SchedulerState::Idle;
        log::info!("Scheduler stopped");
    }

    /// Run every callback that is due. Returns how many actually ran.
    pub fn poll(
        &mut self,
        source: &mut dyn SpectrumSource,
        transport: &mut dyn PlaybackTransport,
        events: &mut dyn PlayerEvents,
    ) -> usize {
        if self.state != SchedulerState::Running {
            return 0;
        }
        let now = self.clock.now();

        let (mut due, later): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = later;
        due.sort_by_key(|p| (p.kind, p.due));
        // A repaint already in this batch runs after the tick and shows its frame.
        let arm_repaint = !due.iter().any(|p| p.kind == Callback::Repaint);

        let mut ran = 0;
        for callback in due {
            // A callback drained in this batch may belong to a run that was
            // torn down by an earlier callback of the same batch.
            if callback.token.is_cancelled() {
                continue;
            }
            match callback.kind {
                Callback::Tick => {
                    self.tick(callback.due, now, arm_repaint, source, transport, events)
                }
                Callback::Repaint => self.frame = source.current(),
            }
            ran += 1;
        }
        ran
    }

    fn tick(
        &mut self,
        due: Duration,
        now: Duration,
        arm_repaint: bool,
        source: &mut dyn SpectrumSource,
        transport: &mut dyn PlaybackTransport,
        events: &mut dyn PlayerEvents,
    ) {
        self.sync_settings(source, transport);

        match (transport.position(), transport.duration()) {
            (Ok(position), Ok(duration)) => {
                if !self.settings.looping && position >= duration {
                    log::info!("End of media at {:.1}s", duration.as_secs_f32());
                    events.on_playback_ended();
                    self.stop(source, transport);
                    return;
                }
                events.on_position_changed(position);
            }
            (Err(e), _) | (_, Err(e)) => log::debug!("No transport position this tick: {e}"),
        }

        // A failed snapshot keeps the previous frame.
        match source.snapshot() {
            Ok(spectrum) => self.frame = spectrum,
            Err(e) => log::debug!("Tick kept previous frame: {e}"),
        }

        let interval = self.settings.tick_interval();
        let mut next = due + interval;
        if next <= now {
            // Fell behind; resume the cadence from now instead of bursting.
            next = now + interval;
        }
        self.schedule(next, Callback::Tick);
        if arm_repaint {
            self.schedule(now, Callback::Repaint);
        }
    }

    fn schedule(&mut self, due: Duration, kind: Callback) {
        self.pending.push(Pending {
            due,
            kind,
            token: self.token.clone(),
        });
    }

    /// Adopt the newest queued settings, if any. Runs at the start of every
    /// tick; hosts call it directly while the scheduler is not running.
    pub fn sync_settings(&mut self, source: &mut dyn SpectrumSource, transport: &mut dyn PlaybackTransport) {
        let Some(updates) = &self.updates else {
            return;
        };
        let Some(latest) = updates.try_iter().last() else {
            return;
        };
        if latest.fft_size != self.settings.fft_size {
            if let Err(e) = source.configure(latest.fft_size) {
                log::warn!("Rejected analysis size {}: {e}", latest.fft_size);
                return;
            }
        }
        if latest.looping != self.settings.looping {
            transport.set_loop(latest.looping);
        }
        self.settings = latest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisualizerError;
    use crate::events::NoEvents;
    use std::sync::mpsc;

    #[derive(Default)]
    struct FakeSource {
        attached: bool,
        fail: bool,
        value: u8,
        fft_size: usize,
        snapshots: usize,
        configures: usize,
        detaches: usize,
    }

    impl FakeSource {
        fn attached() -> Self {
            Self {
                attached: true,
                fft_size: 256,
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.snapshots + self.configures
        }
    }

    impl SpectrumSource for FakeSource {
        fn configure(&mut self, fft_size: usize) -> Result<()> {
            self.configures += 1;
            self.fft_size = fft_size;
            Ok(())
        }

        fn snapshot(&mut self) -> Result<MagnitudeSpectrum> {
            self.snapshots += 1;
            if self.fail || !self.attached {
                return Err(VisualizerError::InvalidState("detached"));
            }
            self.value = self.value.wrapping_add(1);
            Ok(MagnitudeSpectrum::new(vec![self.value; self.fft_size / 2]))
        }

        fn current(&self) -> MagnitudeSpectrum {
            MagnitudeSpectrum::new(vec![self.value; self.fft_size / 2])
        }

        fn detach(&mut self) {
            self.detaches += 1;
            self.attached = false;
        }
    }

    /// Counts `current()` reads, which take `&self`.
    struct CountingSource {
        inner: FakeSource,
        reads: std::cell::Cell<usize>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                inner: FakeSource::attached(),
                reads: std::cell::Cell::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.inner.calls() + self.reads.get()
        }
    }

    impl SpectrumSource for CountingSource {
        fn configure(&mut self, fft_size: usize) -> Result<()> {
            self.inner.configure(fft_size)
        }

        fn snapshot(&mut self) -> Result<MagnitudeSpectrum> {
            self.inner.snapshot()
        }

        fn current(&self) -> MagnitudeSpectrum {
            self.reads.set(self.reads.get() + 1);
            self.inner.current()
        }

        fn detach(&mut self) {
            self.inner.detach();
        }
    }

    struct FakeTransport {
        position: Duration,
        duration: Duration,
        looping: Option<bool>,
        accesses: std::cell::Cell<usize>,
        halts: usize,
    }

    impl FakeTransport {
        fn new(duration: Duration) -> Self {
            Self {
                position: Duration::ZERO,
                duration,
                looping: None,
                accesses: std::cell::Cell::new(0),
                halts: 0,
            }
        }

        fn calls(&self) -> usize {
            self.accesses.get() + self.halts
        }
    }

    impl PlaybackTransport for FakeTransport {
        fn position(&self) -> Result<Duration> {
            self.accesses.set(self.accesses.get() + 1);
            Ok(self.position)
        }

        fn duration(&self) -> Result<Duration> {
            self.accesses.set(self.accesses.get() + 1);
            Ok(self.duration)
        }

        fn set_loop(&mut self, looping: bool) {
            self.accesses.set(self.accesses.get() + 1);
            self.looping = Some(looping);
        }

        fn halt(&mut self) -> Result<()> {
            self.halts += 1;
            self.position = Duration::ZERO;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        ended: usize,
        positions: Vec<Duration>,
    }

    impl PlayerEvents for Recorder {
        fn on_playback_ended(&mut self) {
            self.ended += 1;
        }

        fn on_position_changed(&mut self, position: Duration) {
            self.positions.push(position);
        }

        fn on_play_state_changed(&mut self, _playing: bool) {}
    }

    fn setup(settings: Settings) -> (FrameScheduler<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (FrameScheduler::new(clock.clone(), settings), clock)
    }

    fn fps(fps: u32, looping: bool) -> Settings {
        Settings {
            fps,
            looping,
            ..Default::default()
        }
    }

    #[test]
    fn starts_idle_and_runs_on_start() {
        let (mut scheduler, _) = setup(Settings::default());
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.token().is_cancelled());
        assert_eq!(scheduler.frame().len(), 128);

        scheduler.start(&mut source, &mut transport);
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert!(scheduler.token().is_live());
        assert_eq!(scheduler.next_deadline(), Some(Duration::ZERO));
    }

    #[test]
    fn ticks_follow_configured_cadence() {
        let (mut scheduler, clock) = setup(fps(10, true));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);

        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(source.inner.snapshots, 1);
        assert_eq!(scheduler.frame().bins()[0], 1);

        clock.advance(Duration::from_millis(50));
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(source.inner.snapshots, 1, "no tick before 100ms");
        assert_eq!(source.reads.get(), 1, "repaint re-read the tap");

        clock.advance(Duration::from_millis(50));
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(source.inner.snapshots, 2);
        assert_eq!(events.positions.len(), 2);
    }

    #[test]
    fn falling_behind_does_not_burst() {
        let (mut scheduler, clock) = setup(fps(10, true));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);
        scheduler.poll(&mut source, &mut transport, &mut events);

        clock.advance(Duration::from_secs(1));
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(source.inner.snapshots, 2);
        assert_eq!(
            scheduler.next_deadline(),
            Some(Duration::from_millis(1100)),
        );
    }

    #[test]
    fn failed_snapshot_keeps_previous_frame() {
        let (mut scheduler, clock) = setup(fps(10, true));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        let mut events = NoEvents;
        scheduler.start(&mut source, &mut transport);
        scheduler.poll(&mut source, &mut transport, &mut events);
        let before = scheduler.frame().clone();
        assert!(!before.is_empty());

        source.inner.fail = true;
        clock.advance(Duration::from_millis(100));
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(scheduler.frame(), &before);
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[test]
    fn teardown_blocks_every_later_callback() {
        let (mut scheduler, clock) = setup(fps(60, true));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);

        // One tick fires and arms a repaint plus the next tick.
        scheduler.poll(&mut source, &mut transport, &mut events);
        let captured = scheduler.token();
        assert!(scheduler.next_deadline().is_some());

        scheduler.stop(&mut source, &mut transport);
        assert!(captured.is_cancelled());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(source.inner.detaches, 1);
        assert_eq!(transport.halts, 1);

        let source_calls = source.calls();
        let transport_calls = transport.calls();
        for _ in 0..10 {
            clock.advance(Duration::from_millis(20));
            assert_eq!(scheduler.poll(&mut source, &mut transport, &mut events), 0);
        }
        assert_eq!(source.calls(), source_calls);
        assert_eq!(transport.calls(), transport_calls);

        // Stopping again touches nothing.
        scheduler.stop(&mut source, &mut transport);
        assert_eq!(source.inner.detaches, 1);
        assert_eq!(transport.halts, 1);
    }

    #[test]
    fn end_of_media_notifies_once_and_cancels_same_batch_repaint() {
        let (mut scheduler, clock) = setup(fps(10, false));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(1));
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);
        scheduler.poll(&mut source, &mut transport, &mut events);

        // Next poll drains the pending repaint together with the tick that
        // observes end of media; the repaint must not run.
        transport.position = Duration::from_secs(1);
        clock.advance(Duration::from_millis(100));
        let reads_before = source.reads.get();
        assert_eq!(scheduler.poll(&mut source, &mut transport, &mut events), 1);

        assert_eq!(events.ended, 1);
        assert_eq!(source.reads.get(), reads_before);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(transport.halts, 1);

        clock.advance(Duration::from_secs(1));
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(events.ended, 1);
    }

    #[test]
    fn looping_ignores_end_of_media() {
        let (mut scheduler, _) = setup(fps(10, true));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(1));
        transport.position = Duration::from_secs(1);
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(events.ended, 0);
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[test]
    fn settings_apply_on_next_tick_only() {
        let (mut scheduler, clock) = setup(fps(10, true));
        let (tx, rx) = mpsc::channel();
        scheduler.subscribe(rx);
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);
        scheduler.poll(&mut source, &mut transport, &mut events);

        tx.send(Settings {
            fft_size: 64,
            fps: 20,
            looping: false,
            ..Default::default()
        })
        .unwrap();
        // Not yet applied: the in-flight frame keeps the old shape.
        assert_eq!(scheduler.settings().fft_size, 256);
        assert_eq!(scheduler.frame().len(), 128);

        clock.advance(Duration::from_millis(100));
        scheduler.poll(&mut source, &mut transport, &mut events);
        assert_eq!(scheduler.settings().fft_size, 64);
        assert_eq!(source.inner.configures, 1);
        assert_eq!(transport.looping, Some(false));
        assert_eq!(scheduler.frame().len(), 32);
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(150)));
    }

    #[test]
    fn suspend_keeps_resources_and_frame() {
        let (mut scheduler, clock) = setup(fps(10, true));
        let mut source = CountingSource::new();
        let mut transport = FakeTransport::new(Duration::from_secs(10));
        let mut events = Recorder::default();
        scheduler.start(&mut source, &mut transport);
        scheduler.poll(&mut source, &mut transport, &mut events);
        let frame = scheduler.frame().clone();

        scheduler.suspend();
        clock.advance(Duration::from_secs(1));
        assert_eq!(scheduler.poll(&mut source, &mut transport, &mut events), 0);
        assert_eq!(scheduler.frame(), &frame);
        assert_eq!(source.inner.detaches, 0);

        scheduler.start(&mut source, &mut transport);
        assert_eq!(scheduler.poll(&mut source, &mut transport, &mut events), 1);
    }
}
