// Theme support for the TUI
//
// A single palette over the terminal's ANSI colors. Kept as a struct rather
// than scattered constants so component views take their colors from one
// place and a themed variant stays a constructor away.

use ratatui::style::Color;

/// Color palette for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    // Transcript colors
    pub user_message: Color,
    pub assistant_message: Color,
    pub turn_failed: Color,

    // Surface component colors
    pub card_title: Color,
    pub label: Color,
    pub button: Color,
    pub button_locked: Color,
    pub input: Color,
    pub select: Color,
    pub placeholder: Color,
    pub image: Color,

    // Focus and selection
    pub focused: Color,
    pub focused_bg: Color,

    // UI element colors
    pub status_bar: Color,
    pub title: Color,
    pub border: Color,
    pub log_pane: Color,
    pub error: Color,
    pub toast: Color,
}

impl Theme {
    /// Default theme - uses terminal's ANSI palette
    pub fn default_palette() -> Self {
        Self {
            user_message: Color::Cyan,
            assistant_message: Color::White,
            turn_failed: Color::Red,
            card_title: Color::Cyan,
            label: Color::Gray,
            button: Color::Green,
            button_locked: Color::DarkGray,
            input: Color::White,
            select: Color::Magenta,
            placeholder: Color::DarkGray,
            image: Color::Blue,
            focused: Color::Yellow,
            focused_bg: Color::Rgb(0x2a, 0x2a, 0x2a),
            status_bar: Color::Green,
            title: Color::Cyan,
            border: Color::White,
            log_pane: Color::DarkGray,
            error: Color::Red,
            toast: Color::Yellow,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_palette()
    }
}
