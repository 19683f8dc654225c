// src/ui/widgets/settings_panel.rs
//! Live settings and key help.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::config::{Rgb, Settings};

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Render the settings panel.
pub fn render_settings_panel(f: &mut Frame<'_>, area: Rect, settings: &Settings) {
    let key = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("FFT size  {:>5}  ", settings.fft_size)),
            Span::styled("[ ]", key),
        ]),
        Line::from(vec![
            Span::raw(format!("FPS       {:>5}  ", settings.fps)),
            Span::styled("{ }", key),
        ]),
        Line::from(vec![
            Span::raw(format!("Loop      {:>5}  ", on_off(settings.looping))),
            Span::styled("l", key),
        ]),
        Line::from(vec![
            Span::raw(format!("Floating  {:>5}  ", on_off(settings.floating))),
            Span::styled("f", key),
        ]),
        Line::from(""),
    ];

    let swatches: Vec<Span> = settings
        .color_stops
        .iter()
        .flat_map(|stop| {
            [
                Span::styled("██", Style::default().fg(to_color(stop.color))),
                Span::raw(format!("{:<4}", stop.threshold)),
            ]
        })
        .collect();
    lines.push(Line::from(swatches));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "space play/pause  s stop  , . seek  - + volume",
        key,
    )));

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("3: Settings")),
        area,
    );
}
