mod cli;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;

use barviz::{app::App, config::SettingsStore, ui};
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;
    log::info!("barviz starting, logging to {}", log_path.display());

    let settings_path = cli
        .settings
        .clone()
        .or_else(SettingsStore::default_path)
        .context("No config directory found; pass --settings")?;
    let mut store = SettingsStore::open(&settings_path)
        .with_context(|| format!("Failed to open settings at {}", settings_path.display()))?;
    log::info!("Settings: {}", settings_path.display());

    if let Some(settings) = cli.overrides(store.settings()) {
        store
            .update(settings)
            .context("Invalid settings on the command line")?;
    }

    let mut app = App::new(store)?;
    if let Some(input) = &cli.input {
        app.open(input);
    }
    ui::run(app)
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("barviz")
        .join("barviz.log")
}

/// The terminal belongs to the UI, so log records go to a file.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
