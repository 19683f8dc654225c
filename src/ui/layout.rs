// src/ui/layout.rs
//! Layout computation for the UI panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Visibility state for UI sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionVisibility {
    pub files: bool,
    pub player: bool,
    pub settings: bool,
    pub spectrum: bool,
}

impl Default for SectionVisibility {
    fn default() -> Self {
        Self {
            files: true,
            player: true,
            settings: true,
            spectrum: true,
        }
    }
}

impl SectionVisibility {
    /// Toggle a section by number (1-4).
    pub fn toggle(&mut self, section: usize) {
        match section {
            1 => self.files = !self.files,
            2 => self.player = !self.player,
            3 => self.settings = !self.settings,
            4 => self.spectrum = !self.spectrum,
            _ => {}
        }
    }
}

/// Panels of the upper row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Files,
    Player,
    Settings,
}

/// Computed layout areas for rendering.
pub struct ComputedLayout {
    /// Bottom spectrum area (if visible)
    pub spectrum_area: Option<Rect>,
    /// Visible upper-row sections with their areas, left to right
    pub columns: Vec<(Section, Rect)>,
}

/// Compute the layout based on total area and section visibility.
pub fn compute_layout(area: Rect, visibility: &SectionVisibility) -> ComputedLayout {
    let any_column = visibility.files || visibility.player || visibility.settings;

    // The chart gets the larger share; it takes everything when the row is empty.
    let (main_area, spectrum_area) = match (visibility.spectrum, any_column) {
        (true, true) => {
            let vertical_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(area);
            (Some(vertical_chunks[0]), Some(vertical_chunks[1]))
        }
        (true, false) => (None, Some(area)),
        (false, _) => (Some(area), None),
    };

    let mut sections = Vec::new();
    let mut weights = Vec::new();

    if visibility.files {
        sections.push(Section::Files);
        weights.push(30u16);
    }
    if visibility.player {
        sections.push(Section::Player);
        weights.push(40u16);
    }
    if visibility.settings {
        sections.push(Section::Settings);
        weights.push(30u16);
    }

    let columns = match main_area {
        Some(main_area) if !weights.is_empty() => {
            let sum: u16 = weights.iter().copied().sum();
            let constraints: Vec<Constraint> = weights
                .into_iter()
                .map(|w| Constraint::Percentage((w as u32 * 100 / sum as u32) as u16))
                .collect();
            let areas = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(constraints)
                .split(main_area);
            sections.into_iter().zip(areas.iter().copied()).collect()
        }
        _ => Vec::new(),
    };

    ComputedLayout {
        spectrum_area,
        columns,
    }
}
