// src/app/state.rs
//! Application state management.

use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    time::Duration,
};

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{widgets::ListState, Frame};

use crate::{
    audio::{AudioOutput, RodioOutput},
    config::{Settings, SettingsStore, MAX_FFT_SIZE, MIN_FFT_SIZE},
    engine::Visualizer,
    error::VisualizerError,
    events::PlayerEvent,
    fs::{load_entries, tail_path, Entry},
    ui::{
        keybindings::{key_to_action, NavigationAction},
        layout::{compute_layout, Section, SectionVisibility},
        widgets::{
            render_file_list, render_player_panel, render_settings_panel, render_spectrum,
            PlayerView,
        },
    },
};

const SEEK_STEP: Duration = Duration::from_secs(5);
const VOLUME_STEP: f32 = 0.05;
const FPS_STEP: u32 = 5;

/// Main application state.
pub struct App {
    /// Current directory being browsed
    pub current_dir: PathBuf,
    /// Directory entries
    pub entries: Vec<Entry>,
    /// List widget state
    pub state: ListState,
    /// Currently selected index
    pub selected: usize,

    /// The visualizer core
    pub visualizer: Visualizer,
    /// Core notifications
    events: Receiver<PlayerEvent>,

    /// Name of the loaded (or loading) file
    pub track: Option<String>,
    pub position: Duration,
    pub duration: Duration,
    pub playing: bool,
    /// Last message for the user
    pub status: Option<String>,

    /// Section visibility state
    pub visibility: SectionVisibility,
}

impl App {
    /// Create the application on the default audio device.
    pub fn new(store: SettingsStore) -> Result<Self> {
        Self::with_output(store, Box::new(RodioOutput::new()))
    }

    pub fn with_output(store: SettingsStore, output: Box<dyn AudioOutput>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut state = ListState::default();
        state.select(Some(0));

        let (tx, rx) = mpsc::channel::<PlayerEvent>();
        let visualizer = Visualizer::new(output, store, Box::new(tx))?;

        Ok(Self {
            current_dir: cwd.clone(),
            entries: load_entries(&cwd),
            state,
            selected: 0,

            visualizer,
            events: rx,

            track: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            playing: false,
            status: None,

            visibility: SectionVisibility::default(),
        })
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(&key);

        match action {
            NavigationAction::ToggleSection(d) => {
                self.visibility.toggle(d);
            }
            NavigationAction::Down => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            NavigationAction::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            NavigationAction::Enter => {
                if let Some(entry) = self.entries.get(self.selected).cloned() {
                    if entry.is_dir {
                        self.current_dir.push(&entry.name);
                        self.entries = load_entries(&self.current_dir);
                        self.selected = 0;
                    } else {
                        let path = self.current_dir.join(&entry.name);
                        self.open(&path);
                    }
                }
            }
            NavigationAction::Back => {
                if self.current_dir.pop() {
                    self.entries = load_entries(&self.current_dir);
                    self.selected = 0;
                }
            }
            NavigationAction::TogglePause => {
                let result = if self.visualizer.is_playing() {
                    self.visualizer.pause()
                } else {
                    self.visualizer.play()
                };
                self.report(result);
            }
            NavigationAction::Stop => {
                let result = self.visualizer.stop();
                self.report(result);
                self.position = Duration::ZERO;
                self.visibility.files = true;
            }
            NavigationAction::SeekForward => self.seek_by(SEEK_STEP, true),
            NavigationAction::SeekBackward => self.seek_by(SEEK_STEP, false),
            NavigationAction::VolumeUp => self.nudge_volume(VOLUME_STEP),
            NavigationAction::VolumeDown => self.nudge_volume(-VOLUME_STEP),
            NavigationAction::FftSizeUp => self.edit_settings(|s| {
                s.fft_size = (s.fft_size * 2).min(MAX_FFT_SIZE);
            }),
            NavigationAction::FftSizeDown => self.edit_settings(|s| {
                s.fft_size = (s.fft_size / 2).max(MIN_FFT_SIZE);
            }),
            NavigationAction::FpsUp => self.edit_settings(|s| s.fps += FPS_STEP),
            NavigationAction::FpsDown => {
                self.edit_settings(|s| s.fps = s.fps.saturating_sub(FPS_STEP))
            }
            NavigationAction::ToggleFloating => self.edit_settings(|s| s.floating = !s.floating),
            NavigationAction::ToggleLoop => self.edit_settings(|s| s.looping = !s.looping),
            NavigationAction::Quit => {
                self.visualizer.close();
                return true; // Signal to quit
            }
            NavigationAction::None => {}
        }

        self.state.select(Some(self.selected));
        false
    }

    /// Validate and start loading `path`. Non-audio files leave the picker open.
    pub fn open(&mut self, path: &Path) {
        match self.visualizer.load_file(path) {
            Ok(()) => {
                self.track = path.file_name().map(|n| n.to_string_lossy().into_owned());
                self.position = Duration::ZERO;
                self.duration = Duration::ZERO;
                self.status = None;
            }
            Err(VisualizerError::InvalidInput { mime }) => {
                log::info!("Rejected {} ({mime})", path.display());
                self.status = Some("File must be audio".to_string());
            }
            Err(e) => self.report(Err(e)),
        }
    }

    /// Run due core work and apply its notifications. Called once per repaint.
    pub fn tick(&mut self) {
        self.visualizer.poll();
        self.process_events();
    }

    /// How long the main loop may wait before the next `tick`.
    pub fn timeout(&self, idle: Duration) -> Duration {
        self.visualizer
            .until_next_frame()
            .map_or(idle, |d| d.min(idle))
    }

    /// Drain notifications from the core.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PlayerEvent::Position(p) => self.position = p,
                PlayerEvent::PlayState(playing) => self.playing = playing,
                PlayerEvent::Loaded(d) => {
                    self.duration = d;
                    let result = self.visualizer.play();
                    self.report(result);
                }
                PlayerEvent::LoadFailed(e) => {
                    self.track = None;
                    self.status = Some(e.to_string());
                    self.visibility.files = true;
                }
                PlayerEvent::Ended => {
                    self.position = Duration::ZERO;
                    self.status = Some("Playback ended".to_string());
                    self.visibility.files = true;
                }
            }
        }
    }

    /// Draw the application UI.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        let area = f.area();
        let layout = compute_layout(area, &self.visibility);

        for (section, column) in layout.columns.iter().copied() {
            match section {
                Section::Files => {
                    let title = format!("1:  {}", tail_path(&self.current_dir, 3));
                    render_file_list(f, column, &title, &self.entries, &mut self.state);
                }
                Section::Player => {
                    let view = PlayerView {
                        track: self.track.as_deref(),
                        position: self.position,
                        duration: self.duration,
                        playing: self.playing,
                        loading: self.visualizer.is_loading(),
                        volume: self.visualizer.volume(),
                        status: self.status.as_deref(),
                    };
                    render_player_panel(f, column, &view);
                }
                Section::Settings => {
                    render_settings_panel(f, column, self.visualizer.settings());
                }
            }
        }

        // Bottom pane: the live chart
        if let Some(spectrum_area) = layout.spectrum_area {
            render_spectrum(f, spectrum_area, &self.visualizer.current_frame());
        }
    }

    fn seek_by(&mut self, step: Duration, forward: bool) {
        let target = if forward {
            self.position + step
        } else {
            self.position.saturating_sub(step)
        };
        let result = self.visualizer.seek(target).map(|_| ());
        self.report(result);
    }

    fn nudge_volume(&mut self, delta: f32) {
        let result = self.visualizer.set_volume(self.visualizer.volume() + delta);
        self.report(result.map(|_| ()));
    }

    /// Apply an edit to a copy of the active settings and submit it.
    fn edit_settings(&mut self, edit: impl FnOnce(&mut Settings)) {
        let mut settings = self.visualizer.settings().clone();
        edit(&mut settings);
        let result = self.visualizer.update_settings(settings);
        if result.is_ok() {
            self.status = None;
        }
        self.report(result);
    }

    /// Show recoverable errors; log state errors, which point at a shell bug.
    fn report(&mut self, result: crate::Result<()>) {
        match result {
            Ok(()) => {}
            Err(VisualizerError::InvalidState(what)) => {
                log::warn!("Ignored intent: {what}");
            }
            Err(VisualizerError::Validation(fields)) => {
                let msg: Vec<String> = fields.iter().map(ToString::to_string).collect();
                self.status = Some(msg.join("; "));
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }
}
