// src/lib.rs
//! Barviz - a terminal audio spectrum visualizer.
//!
//! The library holds the real-time pipeline: decode and playback graph,
//! analysis tap, frame scheduler and frame transform, fronted by
//! [`engine::Visualizer`]. The `app` and `ui` modules are the ratatui shell
//! that drives it.

pub mod app;
pub mod audio;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fs;
pub mod scheduler;
pub mod ui;

pub use engine::Visualizer;
pub use error::{Result, VisualizerError};
