//! UI renderer trait and the change-tracking renderer that drives it.
//!
//! [`UIRenderer`] is the terminal surface. [`Renderer`] belongs to one screen and decides
//! whether anything needs to reach that surface at all.

use crate::buffer::LineStore;
use crate::error::Result;
use crate::render::state::ViewState;
use crate::render::theme::ColorTheme;
use crate::render::window::build_window;
use ratatui::text::Line as TextLine;

/// Terminal surface the screens paint onto.
pub trait UIRenderer {
    /// Replace the content area with `rows`, top to bottom.
    fn paint_content(&mut self, rows: Vec<TextLine<'static>>) -> Result<()>;

    /// Replace the status line text.
    fn paint_status(&mut self, status: &str) -> Result<()>;

    /// Drop any cached output so the next paint redraws everything.
    fn clear(&mut self) -> Result<()>;

    fn set_mouse_capture(&mut self, enabled: bool) -> Result<()>;

    /// Enter raw mode and the alternate screen.
    fn initialize(&mut self) -> Result<()>;

    /// Restore the terminal for the shell or another program.
    fn cleanup(&mut self) -> Result<()>;

    /// Current terminal dimensions as (cols, rows).
    fn get_terminal_size(&self) -> Result<(u16, u16)>;
}

#[derive(Debug, Clone, PartialEq)]
struct RenderKey {
    view: ViewState,
    /// Buffer length at the last paint, tracked only when that paint left rows empty.
    partial_len: Option<usize>,
}

/// Per-screen paint cache.
#[derive(Debug)]
pub struct Renderer {
    theme: ColorTheme,
    last: Option<RenderKey>,
    last_status: Option<String>,
}

impl Renderer {
    pub fn new(theme: ColorTheme) -> Self {
        Self {
            theme,
            last: None,
            last_status: None,
        }
    }

    /// Forget what was painted; the next calls repaint unconditionally.
    pub fn invalidate(&mut self) {
        self.last = None;
        self.last_status = None;
    }

    /// Paint the content area unless nothing visible changed. Returns whether it painted.
    pub fn paint(
        &mut self,
        ui: &mut dyn UIRenderer,
        store: &LineStore,
        view: &ViewState,
    ) -> Result<bool> {
        let len = store.len();
        if let Some(last) = &self.last {
            let same_lines = last.partial_len.map_or(true, |painted| painted == len);
            if last.view == *view && same_lines {
                return Ok(false);
            }
        }

        let end = view.y.saturating_add(view.content_rows()).min(len);
        let lines = store.range(view.y, end);
        let window = build_window(&lines, len, view, &self.theme);

        ui.paint_content(window.rows)?;
        self.last = Some(RenderKey {
            view: view.clone(),
            partial_len: (!window.filled).then_some(len),
        });
        Ok(true)
    }

    /// Paint the status line if its text changed. Returns whether it painted.
    pub fn paint_status(&mut self, ui: &mut dyn UIRenderer, text: String) -> Result<bool> {
        if self.last_status.as_deref() == Some(text.as_str()) {
            return Ok(false);
        }
        ui.paint_status(&text)?;
        self.last_status = Some(text);
        Ok(true)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Mock UI renderer for testing
    ///
    /// Records paints so tests can verify what reached the terminal and how often.
    #[derive(Debug)]
    pub struct MockUIRenderer {
        pub content_paints: usize,
        pub status_paints: usize,
        pub last_content: Vec<String>,
        pub last_status: String,
        pub mouse_capture: bool,
        pub terminal_size: (u16, u16),
        pub is_initialized: bool,
    }

    impl Default for MockUIRenderer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockUIRenderer {
        pub fn new() -> Self {
            Self {
                content_paints: 0,
                status_paints: 0,
                last_content: Vec::new(),
                last_status: String::new(),
                mouse_capture: false,
                terminal_size: (80, 24),
                is_initialized: false,
            }
        }

        pub fn set_terminal_size(&mut self, width: u16, height: u16) {
            self.terminal_size = (width, height);
        }
    }

    impl UIRenderer for MockUIRenderer {
        fn paint_content(&mut self, rows: Vec<TextLine<'static>>) -> Result<()> {
            self.content_paints += 1;
            self.last_content = rows
                .iter()
                .map(|row| row.spans.iter().map(|s| s.content.as_ref()).collect())
                .collect();
            Ok(())
        }

        fn paint_status(&mut self, status: &str) -> Result<()> {
            self.status_paints += 1;
            self.last_status = status.to_string();
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            Ok(())
        }

        fn set_mouse_capture(&mut self, enabled: bool) -> Result<()> {
            self.mouse_capture = enabled;
            Ok(())
        }

        fn initialize(&mut self) -> Result<()> {
            self.is_initialized = true;
            Ok(())
        }

        fn cleanup(&mut self) -> Result<()> {
            self.is_initialized = false;
            Ok(())
        }

        fn get_terminal_size(&self) -> Result<(u16, u16)> {
            Ok(self.terminal_size)
        }
    }

    fn renderer() -> Renderer {
        Renderer::new(ColorTheme::default())
    }

    #[test]
    fn test_mock_renderer_lifecycle() {
        let mut ui = MockUIRenderer::new();
        assert!(!ui.is_initialized);
        ui.initialize().unwrap();
        assert!(ui.is_initialized);
        ui.set_terminal_size(120, 30);
        assert_eq!(ui.get_terminal_size().unwrap(), (120, 30));
        ui.cleanup().unwrap();
        assert!(!ui.is_initialized);
    }

    #[test]
    fn unchanged_view_is_painted_once() {
        let mut ui = MockUIRenderer::new();
        let store = LineStore::from_text("a\nb\nc");
        let view = ViewState::new(80, 24);
        let mut renderer = renderer();

        assert!(renderer.paint(&mut ui, &store, &view).unwrap());
        assert!(!renderer.paint(&mut ui, &store, &view).unwrap());
        assert_eq!(ui.content_paints, 1);
        assert_eq!(ui.last_content, vec!["a", "b", "c", "(END)"]);
    }

    #[test]
    fn view_change_repaints() {
        let mut ui = MockUIRenderer::new();
        let store = LineStore::from_text("a\nb\nc");
        let mut view = ViewState::new(80, 24);
        let mut renderer = renderer();

        renderer.paint(&mut ui, &store, &view).unwrap();
        view.y = 1;
        assert!(renderer.paint(&mut ui, &store, &view).unwrap());
        assert_eq!(ui.last_content[0], "b");
    }

    #[test]
    fn growth_repaints_only_a_partial_window() {
        let mut ui = MockUIRenderer::new();
        let store = LineStore::new(usize::MAX);
        store.append("a".into(), None);
        let view = ViewState::new(80, 3);
        let mut renderer = renderer();

        renderer.paint(&mut ui, &store, &view).unwrap();
        store.append("b".into(), None);
        assert!(renderer.paint(&mut ui, &store, &view).unwrap(), "window was partial");

        store.append("c".into(), None);
        renderer.paint(&mut ui, &store, &view).unwrap();
        store.append("d".into(), None);
        assert!(
            !renderer.paint(&mut ui, &store, &view).unwrap(),
            "a full window does not change when lines are appended below it"
        );
    }

    #[test]
    fn invalidate_forces_repaint() {
        let mut ui = MockUIRenderer::new();
        let store = LineStore::from_text("a");
        let view = ViewState::new(80, 24);
        let mut renderer = renderer();

        renderer.paint(&mut ui, &store, &view).unwrap();
        renderer.invalidate();
        assert!(renderer.paint(&mut ui, &store, &view).unwrap());
        assert_eq!(ui.content_paints, 2);
    }

    #[test]
    fn status_is_painted_when_text_changes() {
        let mut ui = MockUIRenderer::new();
        let mut renderer = renderer();
        assert!(renderer.paint_status(&mut ui, "one".into()).unwrap());
        assert!(!renderer.paint_status(&mut ui, "one".into()).unwrap());
        assert!(renderer.paint_status(&mut ui, "two".into()).unwrap());
        assert_eq!(ui.status_paints, 2);
        assert_eq!(ui.last_status, "two");
    }
}
