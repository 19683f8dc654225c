// src/ui/widgets/player_panel.rs
//! Player information panel widget.

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::engine::{format_duration, format_remaining};

/// What the player panel shows.
pub struct PlayerView<'a> {
    /// File name of the loaded track
    pub track: Option<&'a str>,
    pub position: Duration,
    pub duration: Duration,
    pub playing: bool,
    pub loading: bool,
    /// Output level in 0..=1
    pub volume: f32,
    /// Last user-facing message
    pub status: Option<&'a str>,
}

/// Render the player information panel.
pub fn render_player_panel(f: &mut Frame<'_>, area: Rect, view: &PlayerView<'_>) {
    let title = "2: Player";
    f.render_widget(
        Block::default().borders(Borders::ALL).title(title),
        area,
    );

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    let mut lines = Vec::new();
    match (view.track, view.loading) {
        (_, true) => lines.push(Line::from("Decoding...")),
        (Some(track), false) => {
            lines.push(Line::from(Span::styled(
                track.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!("Duration: {}", format_duration(view.duration))));
        }
        (None, false) => lines.push(Line::from("Select an audio file")),
    }
    if let Some(status) = view.status {
        lines.push(Line::from(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner[0]);

    // Playback control buttons
    let play_pause_icon = if view.playing {
        Span::styled(" ⏸ ", Style::default().fg(Color::Green))
    } else if view.track.is_some() {
        Span::styled(" ⏵ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" ⏵ ", Style::default().fg(Color::Gray))
    };

    let controls = Line::from(vec![
        Span::styled(" ⏪ ", Style::default().fg(Color::Cyan)),  // Seek back (,)
        Span::raw(" "),
        Span::styled(" ⏹ ", Style::default().fg(Color::Red)),   // Stop (s)
        Span::raw(" "),
        play_pause_icon,                                         // Play/Pause (space)
        Span::raw(" "),
        Span::styled(" ⏩ ", Style::default().fg(Color::Cyan)),  // Seek forward (.)
    ]);

    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center),
        inner[1],
    );

    f.render_widget(
        Paragraph::new(format!("Volume {:>3}%", (view.volume * 100.0).round() as u32))
            .alignment(Alignment::Center),
        inner[2],
    );

    // Progress bar with time display
    let ratio = if view.duration.is_zero() {
        0.0
    } else {
        (view.position.as_secs_f64() / view.duration.as_secs_f64()).clamp(0.0, 1.0)
    };
    let time_label = format!(
        "{} / {}",
        format_duration(view.position),
        format_remaining(view.position, view.duration)
    );

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC))
            .ratio(ratio)
            .label(time_label),
        inner[3],
    );
}
