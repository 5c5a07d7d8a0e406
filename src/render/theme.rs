//! Color theme and styling definitions using ratatui colors
//!
//! Themes are plain ratatui styles; the renderer picks them per span and the terminal
//! backend uses the status colors.

use crate::config::ThemeName;
use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTheme {
    /// Normal text color (None uses terminal default)
    pub normal_text: Option<Color>,

    /// Search match highlighting
    pub search_match: Style,

    /// Line-number gutter
    pub line_numbers: Style,

    /// Gutter of the goto target or of a line matching the active search
    pub marked_gutter: Style,

    /// Capture timestamp prefix
    pub timestamp: Style,

    /// Separator between fields in column mode
    pub column_separator: Style,

    /// `(END)` marker below the last line
    pub end_marker: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,
}

impl Default for ColorTheme {
    /// Default color theme similar to less/more
    fn default() -> Self {
        Self {
            normal_text: None,
            search_match: Style::default().add_modifier(Modifier::REVERSED),
            line_numbers: Style::default().fg(Color::DarkGray),
            marked_gutter: Style::default().add_modifier(Modifier::REVERSED),
            timestamp: Style::default().fg(Color::Cyan),
            column_separator: Style::default().fg(Color::DarkGray),
            end_marker: Style::default().fg(Color::DarkGray),
            status_bg: Color::Blue,
            status_fg: Color::White,
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            normal_text: None,
            search_match: Style::default().add_modifier(Modifier::REVERSED),
            line_numbers: Style::default(),
            marked_gutter: Style::default().add_modifier(Modifier::REVERSED),
            timestamp: Style::default(),
            column_separator: Style::default(),
            end_marker: Style::default().add_modifier(Modifier::BOLD),
            status_bg: Color::Black,
            status_fg: Color::White,
        }
    }

    /// Create a high-contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            normal_text: Some(Color::White),
            search_match: Style::default().fg(Color::Black).bg(Color::LightYellow),
            line_numbers: Style::default().fg(Color::LightGreen),
            marked_gutter: Style::default().fg(Color::Black).bg(Color::LightGreen),
            timestamp: Style::default().fg(Color::LightCyan),
            column_separator: Style::default().fg(Color::LightYellow),
            end_marker: Style::default().fg(Color::LightRed),
            status_bg: Color::White,
            status_fg: Color::Black,
        }
    }

    pub fn text(&self) -> Style {
        match self.normal_text {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        }
    }

    pub fn status(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.status_fg)
    }
}

impl From<ThemeName> for ColorTheme {
    fn from(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default(),
            ThemeName::Monochrome => Self::monochrome(),
            ThemeName::HighContrast => Self::high_contrast(),
        }
    }
}
