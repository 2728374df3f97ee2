//! Raw key reads from the controlling terminal.
//!
//! Raw mode is switched on only while waiting for a key, so log lines printed
//! between key presses render normally.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use decky_core::{KeyEventSource, ESC};

#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    pub fn new() -> Self {
        Self
    }
}

/// Restores cooked mode when dropped, even if the read fails.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl KeyEventSource for TerminalKeys {
    fn read_key(&mut self) -> anyhow::Result<char> {
        let _raw = RawModeGuard::enable()?;

        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(c) = translate(key) {
                    return Ok(c);
                }
            }
        }
    }
}

/// Map a key event to the character a keymap is keyed by.
/// Ctrl-C maps to ESC so an interrupt still turns sounding notes off.
pub fn translate(key: KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(ESC),
        KeyCode::Char(c) => Some(c),
        KeyCode::Esc => Some(ESC),
        KeyCode::Tab => Some('\t'),
        KeyCode::Enter => Some('\r'),
        KeyCode::Backspace => Some('\x7f'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_printable_keys() {
        assert_eq!(translate(key(KeyCode::Char('z'), KeyModifiers::NONE)), Some('z'));
        // Shifted characters arrive already shifted
        assert_eq!(translate(key(KeyCode::Char('+'), KeyModifiers::SHIFT)), Some('+'));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(translate(key(KeyCode::Esc, KeyModifiers::NONE)), Some(ESC));
        assert_eq!(translate(key(KeyCode::Tab, KeyModifiers::NONE)), Some('\t'));
        assert_eq!(translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(ESC));
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(translate(key(KeyCode::Left, KeyModifiers::NONE)), None);
        assert_eq!(translate(key(KeyCode::F(5), KeyModifiers::NONE)), None);
    }
}
