//! Turns the visible slice of a buffer into styled terminal rows.

use crate::buffer::Line;
use crate::render::state::ViewState;
use crate::render::theme::ColorTheme;
use crate::search::Span;
use ratatui::style::Style;
use ratatui::text::{Line as TextLine, Span as TextSpan};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;

/// Width of `format!("{:>5} |", seq)`.
pub const GUTTER_WIDTH: usize = 7;
pub const END_MARKER: &str = "(END)";
const TAB_STOP: usize = 8;
const COLUMN_SEPARATOR: &str = " | ";

/// Rows ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub rows: Vec<TextLine<'static>>,
    /// Every content row shows a line, so later appends cannot change this window.
    pub filled: bool,
}

/// Build the window for `lines`, the buffer slice starting at `view.y`, out of `len` total.
pub fn build_window(
    lines: &[Arc<Line>],
    len: usize,
    view: &ViewState,
    theme: &ColorTheme,
) -> Window {
    let content_rows = view.content_rows();
    let widths = if view.separate_columns {
        column_widths(lines.iter().take(content_rows).map(|l| l.text.as_str()))
    } else {
        Vec::new()
    };

    let mut rows: Vec<TextLine<'static>> = lines
        .iter()
        .take(content_rows)
        .enumerate()
        .map(|(i, line)| render_row(view.y + i, line, view, &widths, theme))
        .collect();

    if rows.len() < content_rows && view.y + rows.len() == len {
        rows.push(TextLine::from(TextSpan::styled(END_MARKER, theme.end_marker)));
    }

    Window {
        rows,
        filled: view.y + content_rows <= len,
    }
}

fn render_row(
    index: usize,
    line: &Line,
    view: &ViewState,
    widths: &[usize],
    theme: &ColorTheme,
) -> TextLine<'static> {
    let mut spans = Vec::new();
    let mut cols = view.cols as usize;

    if view.show_line_numbers {
        let marked = view.goto_target == Some(index)
            || view
                .search
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(&line.text));
        let style = if marked {
            theme.marked_gutter
        } else {
            theme.line_numbers
        };
        spans.push(TextSpan::styled(format!("{:>5} |", line.seq), style));
        cols = cols.saturating_sub(GUTTER_WIDTH);
    }

    if view.show_timestamps {
        if let Some(stamp) = &line.timestamp {
            let stamp = format!("{} ", stamp.format("%H:%M:%S"));
            cols = cols.saturating_sub(stamp.chars().count());
            spans.push(TextSpan::styled(stamp, theme.timestamp));
        }
    }

    let (text, separators) = if view.separate_columns {
        let (text, separators) = columns_with_separators(&line.text, widths);
        (Cow::Owned(text), separators)
    } else {
        (expand_tabs(&line.text), Vec::new())
    };
    let slice = visible_text(&text, view.x, cols);
    let plain = PlainText {
        separators: &separators,
        text_style: theme.text(),
        separator_style: theme.column_separator,
    };

    match &view.search {
        Some(pattern) => {
            let mut offset = view.x;
            for span in pattern.partition(&slice) {
                match span {
                    Span::Matched(part) => {
                        spans.push(TextSpan::styled(part.to_string(), theme.search_match));
                        offset += part.chars().count();
                    }
                    Span::Unmatched(part) => offset = plain.push(&mut spans, part, offset),
                }
            }
        }
        None => {
            plain.push(&mut spans, &slice, view.x);
        }
    }

    TextLine::from(spans)
}

/// Styling for text outside search matches; column separators get their own spans.
struct PlainText<'a> {
    /// Character ranges of the separators within the full row text.
    separators: &'a [Range<usize>],
    text_style: Style,
    separator_style: Style,
}

impl PlainText<'_> {
    /// Push `part`, which starts at character `start` of the row text. Returns the end offset.
    fn push(&self, spans: &mut Vec<TextSpan<'static>>, part: &str, start: usize) -> usize {
        if self.separators.is_empty() {
            spans.push(TextSpan::styled(part.to_string(), self.text_style));
            return start + part.chars().count();
        }
        let mut run = String::new();
        let mut in_separator = false;
        let mut offset = start;
        for ch in part.chars() {
            let separator = self.separators.iter().any(|range| range.contains(&offset));
            if separator != in_separator && !run.is_empty() {
                spans.push(TextSpan::styled(std::mem::take(&mut run), self.style(in_separator)));
            }
            in_separator = separator;
            run.push(ch);
            offset += 1;
        }
        if !run.is_empty() {
            spans.push(TextSpan::styled(run, self.style(in_separator)));
        }
        offset
    }

    fn style(&self, separator: bool) -> Style {
        if separator {
            self.separator_style
        } else {
            self.text_style
        }
    }
}

/// The `cols` characters of `text` starting at character offset `x`.
pub fn visible_text(text: &str, x: usize, cols: usize) -> String {
    text.chars().skip(x).take(cols).collect()
}

/// Expand tabs to the next multiple of eight columns.
pub fn expand_tabs(text: &str) -> Cow<'_, str> {
    if !text.contains('\t') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + TAB_STOP);
    let mut col = 0;
    for ch in text.chars() {
        if ch == '\t' {
            let pad = TAB_STOP - col % TAB_STOP;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    Cow::Owned(out)
}

/// Widest field per tab-separated column across `texts`.
pub fn column_widths<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for text in texts {
        for (idx, field) in text.split('\t').enumerate() {
            let width = field.chars().count();
            match widths.get_mut(idx) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }
    widths
}

/// Pad each tab-separated field to its column width and join with ` | `.
pub fn separate_columns(text: &str, widths: &[usize]) -> String {
    columns_with_separators(text, widths).0
}

/// Like [`separate_columns`], also returning the character range of every separator.
fn columns_with_separators(text: &str, widths: &[usize]) -> (String, Vec<Range<usize>>) {
    let fields: Vec<&str> = text.split('\t').collect();
    let last = fields.len().saturating_sub(1);
    let mut out = String::with_capacity(text.len() + fields.len() * COLUMN_SEPARATOR.len());
    let mut separators = Vec::with_capacity(last);
    let mut chars = 0;
    for (idx, field) in fields.iter().enumerate() {
        out.push_str(field);
        chars += field.chars().count();
        if idx == last {
            break;
        }
        let width = widths.get(idx).copied().unwrap_or(0);
        let pad = width.saturating_sub(field.chars().count());
        out.extend(std::iter::repeat(' ').take(pad));
        chars += pad;
        out.push_str(COLUMN_SEPARATOR);
        separators.push(chars..chars + COLUMN_SEPARATOR.len());
        chars += COLUMN_SEPARATOR.len();
    }
    (out, separators)
}
