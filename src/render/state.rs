//! View state: every parameter that affects what the content area shows.

use crate::search::SearchPattern;

/// Snapshot of the drawn window. Two equal states produce identical output for the same
/// buffer contents, which is what lets the renderer skip redundant paints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    /// Terminal height, status line included.
    pub rows: u16,
    pub cols: u16,
    /// Index of the top visible line.
    pub y: usize,
    /// Horizontal offset in characters.
    pub x: usize,
    pub search: Option<SearchPattern>,
    /// Index of the line a goto landed on; its gutter is highlighted.
    pub goto_target: Option<usize>,
    pub show_line_numbers: bool,
    pub show_timestamps: bool,
    pub separate_columns: bool,
}

impl ViewState {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Rows available for lines; the last terminal row is the status line.
    pub fn content_rows(&self) -> usize {
        (self.rows as usize).saturating_sub(1).max(1)
    }

    /// Largest top index. The `(END)` marker row may be the last one on screen.
    pub fn y_max(&self, len: usize) -> usize {
        (len + 1).saturating_sub(self.content_rows())
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// Move the top line to `y`, clamped to `0..=y_max(len)`.
    pub fn scroll_to(&mut self, y: usize, len: usize) {
        self.y = y.min(self.y_max(len));
    }

    pub fn scroll_down(&mut self, lines: usize, len: usize) {
        self.scroll_to(self.y.saturating_add(lines), len);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.y = self.y.saturating_sub(lines);
    }

    pub fn scroll_left(&mut self, cols: usize) {
        self.x = self.x.saturating_sub(cols);
    }

    pub fn scroll_right(&mut self, cols: usize) {
        self.x = self.x.saturating_add(cols);
    }

    /// Index of the line shown on content row `row`, if the row shows one.
    pub fn line_at_row(&self, row: u16, len: usize) -> Option<usize> {
        let row = row as usize;
        if row >= self.content_rows() {
            return None;
        }
        let index = self.y + row;
        (index < len).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_max_leaves_room_for_the_end_marker() {
        let view = ViewState::new(80, 3);
        assert_eq!(view.content_rows(), 2);
        assert_eq!(view.y_max(5), 4);
        assert_eq!(view.y_max(0), 0);
        assert_eq!(view.y_max(1), 0);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut view = ViewState::new(80, 11);
        view.scroll_down(100, 50);
        assert_eq!(view.y, 41);
        view.scroll_up(1000);
        assert_eq!(view.y, 0);
        view.scroll_to(7, 50);
        assert_eq!(view.y, 7);
    }

    #[test]
    fn horizontal_offset_never_goes_negative() {
        let mut view = ViewState::new(80, 24);
        view.scroll_right(3);
        view.scroll_left(5);
        assert_eq!(view.x, 0);
    }

    #[test]
    fn tiny_terminal_still_shows_a_row() {
        let view = ViewState::new(10, 1);
        assert_eq!(view.content_rows(), 1);
    }

    #[test]
    fn line_at_row_maps_clicks_to_lines() {
        let mut view = ViewState::new(80, 5);
        view.y = 10;
        assert_eq!(view.line_at_row(2, 100), Some(12));
        assert_eq!(view.line_at_row(4, 100), None, "status row");
        assert_eq!(view.line_at_row(1, 11), None, "past the buffer");
    }

    #[test]
    fn equality_tracks_every_field() {
        let a = ViewState::new(80, 24);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.show_timestamps = true;
        assert_ne!(a, b);
    }
}
