use clap::Parser;
use std::path::PathBuf;

use barviz::config::Settings;

#[derive(Parser, Debug)]
#[command(name = "barviz", about = "Terminal audio visualizer with a live frequency-bar chart")]
pub struct Cli {
    /// Audio file to load on start (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Settings file [default: <config dir>/barviz/settings.json]
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Log file [default: <data dir>/barviz/barviz.log]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// FFT size (power of two, 16-8192)
    #[arg(long)]
    pub fft_size: Option<usize>,

    /// Spectrum refresh rate (1-240)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Draw floating bars mirrored around the center
    #[arg(long)]
    pub floating: bool,

    /// Stop at the end of the file instead of looping
    #[arg(long)]
    pub no_loop: bool,
}

impl Cli {
    /// `base` with the command-line overrides applied, or `None` when there are none.
    pub fn overrides(&self, base: &Settings) -> Option<Settings> {
        if self.fft_size.is_none() && self.fps.is_none() && !self.floating && !self.no_loop {
            return None;
        }
        let mut settings = base.clone();
        if let Some(fft_size) = self.fft_size {
            settings.fft_size = fft_size;
        }
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if self.floating {
            settings.floating = true;
        }
        if self.no_loop {
            settings.looping = false;
        }
        Some(settings)
    }
}
