//! Terminal UI implementation using ratatui
//!
//! Concrete [`UIRenderer`] over ratatui's crossterm backend. The last content and status
//! are cached because ratatui draws whole frames; each paint redraws both halves.

use crate::error::Result;
use crate::render::renderer::UIRenderer;
use crate::render::theme::ColorTheme;
use ratatui::crossterm::{
    cursor::{Hide, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::Line,
    widgets::Paragraph,
    Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Terminal UI implementation with ratatui backend
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
    content: Vec<Line<'static>>,
    status: String,
    mouse_capture: bool,
}

impl TerminalUI {
    pub fn new() -> Result<Self> {
        Self::with_theme(ColorTheme::default())
    }

    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
            content: Vec::new(),
            status: String::new(),
            mouse_capture: false,
        })
    }

    fn draw(&mut self) -> Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        let content = &self.content;
        let status = &self.status;
        let theme = &self.theme;

        terminal.draw(|frame| {
            // Split screen: content area and status line
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(frame.size());

            frame.render_widget(Paragraph::new(content.clone()), chunks[0]);
            frame.render_widget(
                Paragraph::new(status.as_str()).style(theme.status()),
                chunks[1],
            );
        })?;
        Ok(())
    }
}

impl UIRenderer for TerminalUI {
    fn paint_content(&mut self, rows: Vec<Line<'static>>) -> Result<()> {
        self.content = rows;
        self.draw()
    }

    fn paint_status(&mut self, status: &str) -> Result<()> {
        self.status.clear();
        self.status.push_str(status);
        self.draw()
    }

    fn clear(&mut self) -> Result<()> {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.clear()?;
        }
        Ok(())
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> Result<()> {
        if self.mouse_capture == enabled {
            return Ok(());
        }
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)?;
        } else {
            execute!(io::stdout(), DisableMouseCapture)?;
        }
        log::debug!("mouse capture: {enabled}");
        self.mouse_capture = enabled;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        if self.mouse_capture {
            execute!(stdout, EnableMouseCapture)?;
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;
            self.terminal = None;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_terminal_ui_creation() {
        let ui = TerminalUI::new().unwrap();
        assert!(ui.terminal.is_none());
        assert!(!ui.mouse_capture);

        let ui_with_theme = TerminalUI::with_theme(ColorTheme::monochrome()).unwrap();
        assert_eq!(ui_with_theme.theme.status_bg, Color::Black);
    }

    #[test]
    fn test_paint_before_initialize_is_cached() {
        let mut ui = TerminalUI::new().unwrap();
        ui.paint_content(vec![Line::from("hello")]).unwrap();
        ui.paint_status("status").unwrap();
        assert_eq!(ui.content.len(), 1);
        assert_eq!(ui.status, "status");
        assert!(ui.cleanup().is_ok());
    }
}
