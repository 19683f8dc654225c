// src/ui/keybindings.rs
//! Keyboard input handling and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map digit/shifted-digit keys to section number (1..4).
pub fn map_key_to_digit(k: &KeyEvent) -> Option<usize> {
    if let KeyCode::Char(c) = k.code {
        match c {
            '1' | '!' => Some(1),
            '2' | '@' => Some(2),
            '3' | '#' => Some(3),
            '4' | '$' => Some(4),
            _ => None,
        }
    } else {
        None
    }
}

/// Check if the key event is a shifted symbol (!, @, #, $).
pub fn is_shifted_symbol(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Char('!') | KeyCode::Char('@') | KeyCode::Char('#') | KeyCode::Char('$')
    )
}

/// Actions derived from key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationAction {
    Up,
    Down,
    Enter,
    Back,
    TogglePause,
    Stop,
    SeekForward,
    SeekBackward,
    VolumeUp,
    VolumeDown,
    FftSizeUp,
    FftSizeDown,
    FpsUp,
    FpsDown,
    ToggleFloating,
    ToggleLoop,
    Quit,
    ToggleSection(usize),
    None,
}

/// Convert a key event to an action.
pub fn key_to_action(key: &KeyEvent) -> NavigationAction {
    // Check for section toggle first
    if let Some(d) = map_key_to_digit(key) {
        if key.modifiers.contains(KeyModifiers::SHIFT) || is_shifted_symbol(key) {
            return NavigationAction::ToggleSection(d);
        }
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => NavigationAction::Down,
        KeyCode::Up | KeyCode::Char('k') => NavigationAction::Up,
        KeyCode::Enter | KeyCode::Right => NavigationAction::Enter,
        KeyCode::Left | KeyCode::Backspace => NavigationAction::Back,
        KeyCode::Char(' ') => NavigationAction::TogglePause,
        KeyCode::Char('s') => NavigationAction::Stop,
        KeyCode::Char('.') | KeyCode::Char('>') => NavigationAction::SeekForward,
        KeyCode::Char(',') | KeyCode::Char('<') => NavigationAction::SeekBackward,
        KeyCode::Char('+') | KeyCode::Char('=') => NavigationAction::VolumeUp,
        KeyCode::Char('-') | KeyCode::Char('_') => NavigationAction::VolumeDown,
        KeyCode::Char(']') => NavigationAction::FftSizeUp,
        KeyCode::Char('[') => NavigationAction::FftSizeDown,
        KeyCode::Char('}') => NavigationAction::FpsUp,
        KeyCode::Char('{') => NavigationAction::FpsDown,
        KeyCode::Char('f') => NavigationAction::ToggleFloating,
        KeyCode::Char('l') => NavigationAction::ToggleLoop,
        KeyCode::Char('q') | KeyCode::Esc => NavigationAction::Quit,
        _ => NavigationAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn shifted_digits_toggle_sections() {
        assert_eq!(key_to_action(&key(KeyCode::Char('#'))), NavigationAction::ToggleSection(3));
        let shifted = KeyEvent::new(KeyCode::Char('2'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(&shifted), NavigationAction::ToggleSection(2));
        assert_eq!(key_to_action(&key(KeyCode::Char('2'))), NavigationAction::None);
    }

    #[test]
    fn transport_and_settings_keys() {
        assert_eq!(key_to_action(&key(KeyCode::Char(' '))), NavigationAction::TogglePause);
        assert_eq!(key_to_action(&key(KeyCode::Char('s'))), NavigationAction::Stop);
        assert_eq!(key_to_action(&key(KeyCode::Char(']'))), NavigationAction::FftSizeUp);
        assert_eq!(key_to_action(&key(KeyCode::Char('{'))), NavigationAction::FpsDown);
        assert_eq!(key_to_action(&key(KeyCode::Char('f'))), NavigationAction::ToggleFloating);
        assert_eq!(key_to_action(&key(KeyCode::Esc)), NavigationAction::Quit);
    }
}
