// src/app/mod.rs
//! Application module - shell state wired to the visualizer core.

pub mod state;

// Re-export the App struct
pub use state::App;
