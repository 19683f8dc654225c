// src/config/mod.rs
//! Configuration module: visualizer settings and their persisted store.

pub mod settings;
pub mod store;

pub use settings::{is_valid_fft_size, ColorStop, Rgb, Settings, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use store::{SettingsStore, StoredState};
