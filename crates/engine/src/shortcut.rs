//! Keyboard shortcuts available while a session is active.

use crate::session::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Cancel,
}

impl Shortcut {
    /// Maps a key press to a shortcut.
    ///
    /// `modifier` is Ctrl on most platforms and Cmd on macOS. Ctrl+Z undoes,
    /// Ctrl+Y and Ctrl+Shift+Z redo, Escape cancels the session.
    pub fn from_key(key: &str, modifier: bool, shift: bool) -> Option<Self> {
        if key == "Escape" && !modifier {
            return Some(Shortcut::Cancel);
        }
        if !modifier {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "z" if shift => Some(Shortcut::Redo),
            "z" => Some(Shortcut::Undo),
            "y" => Some(Shortcut::Redo),
            _ => None,
        }
    }

    pub fn command<H>(&self) -> Command<H> {
        match self {
            Shortcut::Undo => Command::Undo,
            Shortcut::Redo => Command::Redo,
            Shortcut::Cancel => Command::Cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_shortcuts() {
        assert_eq!(Shortcut::from_key("z", true, false), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key("y", true, false), Some(Shortcut::Redo));
        // Shift turns the reported key upper case on most layouts.
        assert_eq!(Shortcut::from_key("Z", true, true), Some(Shortcut::Redo));
        assert_eq!(Shortcut::from_key("z", false, false), None);
        assert_eq!(Shortcut::from_key("x", true, false), None);
    }

    #[test]
    fn test_escape_cancels() {
        assert_eq!(Shortcut::from_key("Escape", false, false), Some(Shortcut::Cancel));
        assert_eq!(Shortcut::Cancel.command::<u32>(), Command::Cancel);
    }
}
