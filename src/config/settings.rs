// src/config/settings.rs
//! Visualizer settings: color stops, analysis resolution, frame rate and display mode.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result, VisualizerError};

pub const MIN_FFT_SIZE: usize = 16;
pub const MAX_FFT_SIZE: usize = 8192;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 240;

/// Magnitude thresholds of the six named color stops.
pub const STOP_THRESHOLDS: [u16; 6] = [0, 50, 100, 150, 200, 250];

/// An sRGB color, stored as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend towards `other`; `t` is clamped to 0..=1.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("`{s}` is not a #rgb or #rrggbb color"));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(format!("`{s}` is not a #rgb or #rrggbb color")),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| format!("`{s}` is not a #rgb or #rrggbb color"))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// One (threshold, color) pair of the bar gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStop {
    pub threshold: u16,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(threshold: u16, color: Rgb) -> Self {
        Self { threshold, color }
    }
}

/// Complete visualizer configuration. Replaced wholesale, never patched in place
/// while a session is being analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_color_stops")]
    pub color_stops: Vec<ColorStop>,
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(rename = "loop", default = "default_loop")]
    pub looping: bool,
    #[serde(default)]
    pub floating: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color_stops: default_color_stops(),
            fft_size: default_fft_size(),
            fps: default_fps(),
            looping: default_loop(),
            floating: false,
        }
    }
}

fn default_color_stops() -> Vec<ColorStop> {
    let low = Rgb::new(0x88, 0x0a, 0xfc);
    let high = Rgb::new(0xb9, 0x75, 0xff);
    STOP_THRESHOLDS
        .iter()
        .map(|&t| ColorStop::new(t, if t < 150 { low } else { high }))
        .collect()
}
fn default_fft_size() -> usize { 256 }
fn default_fps() -> u32 { 60 }
fn default_loop() -> bool { true }

/// True when `n` is a power of two inside the supported analysis range.
pub fn is_valid_fft_size(n: usize) -> bool {
    n.is_power_of_two() && (MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&n)
}

impl Settings {
    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !is_valid_fft_size(self.fft_size) {
            errors.push(FieldError::new(
                "fft_size",
                format!(
                    "{} is not a power of two between {MIN_FFT_SIZE} and {MAX_FFT_SIZE}",
                    self.fft_size
                ),
            ));
        }

        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            errors.push(FieldError::new(
                "fps",
                format!("{} is outside {MIN_FPS}..={MAX_FPS}", self.fps),
            ));
        }

        let thresholds: Vec<u16> = self.color_stops.iter().map(|s| s.threshold).collect();
        if thresholds != STOP_THRESHOLDS {
            errors.push(FieldError::new(
                "color_stops",
                format!("expected stops at {STOP_THRESHOLDS:?}, got {thresholds:?}"),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VisualizerError::Validation(errors))
        }
    }

    /// Sampling cadence of the frame scheduler.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(MIN_FPS)))
    }

    /// Number of bins in one magnitude spectrum.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}
