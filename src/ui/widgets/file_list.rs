// src/ui/widgets/file_list.rs
//! File browser list widget.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::fs::{Entry, FileCategory};
use crate::ui::icons::icon_for_entry;

/// Render the file browser list. Non-audio files are dimmed.
pub fn render_file_list(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    entries: &[Entry],
    state: &mut ListState,
) {
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let item = ListItem::new(format!("{} {}", icon_for_entry(entry), entry.name));
            if entry.is_dir || entry.category == FileCategory::Audio {
                item
            } else {
                item.style(Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, state);
}
