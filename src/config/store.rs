// src/config/store.rs
//! Settings store: persisted JSON state, validated replacement and change notifications.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
};

use serde::{Deserialize, Serialize};

use super::settings::Settings;
use crate::error::Result;

/// On-disk shape: the visualizer settings plus the last volume level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for StoredState {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            volume: default_volume(),
        }
    }
}

fn default_volume() -> f32 { 0.5 }

/// Holds the active settings and publishes every accepted replacement.
pub struct SettingsStore {
    /// Backing file; `None` keeps everything in memory.
    path: Option<PathBuf>,
    state: StoredState,
    subscribers: Vec<Sender<Settings>>,
}

impl SettingsStore {
    /// Default location: `<config dir>/barviz/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("barviz").join("settings.json"))
    }

    /// Load the store from `path`, writing defaults when the file is absent or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match read_state(&path) {
            Ok(Some(state)) => state,
            Ok(None) => {
                log::info!("No settings at {}, writing defaults", path.display());
                let state = StoredState::default();
                write_state(&path, &state)?;
                state
            }
            Err(e) => {
                log::warn!("Could not read {}: {e}. Using defaults.", path.display());
                let state = StoredState::default();
                write_state(&path, &state)?;
                state
            }
        };

        // A hand-edited file may hold values the validator would reject.
        let state = if state.settings.validate().is_ok() {
            state
        } else {
            log::warn!("Stored settings failed validation, falling back to defaults");
            StoredState {
                settings: Settings::default(),
                ..state
            }
        };

        Ok(Self {
            path: Some(path),
            state,
            subscribers: Vec::new(),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(state: StoredState) -> Self {
        Self {
            path: None,
            state,
            subscribers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn volume(&self) -> f32 {
        self.state.volume
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Register for change notifications. Each accepted update is sent to every live subscriber.
    pub fn subscribe(&mut self) -> Receiver<Settings> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Validate and replace the active settings. On rejection the previous
    /// settings stay active and nothing is published.
    pub fn update(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        if settings == self.state.settings {
            return Ok(());
        }
        self.state.settings = settings;
        self.persist();
        let current = self.state.settings.clone();
        self.subscribers.retain(|tx| tx.send(current.clone()).is_ok());
        Ok(())
    }

    /// Remember the output level, clamped to 0..=1.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        if volume != self.state.volume {
            self.state.volume = volume;
            self.persist();
        }
    }

    fn persist(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = write_state(path, &self.state) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }
}

fn read_state(path: &Path) -> Result<Option<StoredState>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_state(path: &Path, state: &StoredState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}
