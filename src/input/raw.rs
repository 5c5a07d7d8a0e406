//! Low-level input collection: crossterm polling, mouse scroll coalescing, and
//! decoding into platform-independent [`InputEvent`]s.

use crate::error::Result;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Default coalescing window in milliseconds for scroll events.
const DEFAULT_COALESCE_WINDOW_MS: u64 = 12;
/// Number of lines produced by a single mouse wheel tick.
pub const MOUSE_SCROLL_LINES: usize = 3;

/// A decoded key press.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// Control plus a lowercase letter.
    Ctrl(char),
    Enter,
    Backspace,
    Esc,
    Tab,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    /// Anything else, by name, so it can be reported.
    Other(String),
}

impl Key {
    /// Decode a crossterm key event; releases and repeats of non-press kinds yield `None`.
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let key = match event.code {
            KeyCode::Char(ch) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Key::Ctrl(ch.to_ascii_lowercase())
            }
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            other => Key::Other(format!("{other:?}")),
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(ch) => write!(f, "{ch}"),
            Key::Ctrl(ch) => write!(f, "C-{ch}"),
            Key::Other(name) => f.write_str(name),
            named => write!(f, "{named:?}"),
        }
    }
}

/// Direction for scroll coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Events delivered to the screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize { cols: u16, rows: u16 },
    Scroll {
        direction: ScrollDirection,
        lines: usize,
    },
    Click { column: u16, row: u16 },
}

/// Aggregates high-frequency scroll events into larger steps.
#[derive(Debug, Clone)]
pub struct ScrollCoalescer {
    window: Duration,
    pending: Option<PendingScroll>,
}

#[derive(Debug, Clone)]
struct PendingScroll {
    direction: ScrollDirection,
    lines: usize,
    last_event: Instant,
}

impl ScrollCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Register a scroll, returning a previously queued one that must be flushed first.
    pub fn push(
        &mut self,
        direction: ScrollDirection,
        lines: usize,
        now: Instant,
    ) -> Option<(ScrollDirection, usize)> {
        match self.pending {
            Some(ref mut pending) if pending.direction == direction => {
                pending.lines = pending.lines.saturating_add(lines);
                pending.last_event = now;
                None
            }
            _ => {
                let flushed = self.flush();
                self.pending = Some(PendingScroll {
                    direction,
                    lines,
                    last_event: now,
                });
                flushed
            }
        }
    }

    /// Flush accumulated scrolls if the coalescing window has expired.
    pub fn flush_if_stale(&mut self, now: Instant) -> Option<(ScrollDirection, usize)> {
        match &self.pending {
            Some(pending) if now.duration_since(pending.last_event) >= self.window => self.flush(),
            _ => None,
        }
    }

    pub fn flush(&mut self) -> Option<(ScrollDirection, usize)> {
        self.pending
            .take()
            .map(|pending| (pending.direction, pending.lines))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

/// Polls crossterm and turns its events into [`InputEvent`]s.
#[derive(Debug)]
pub struct EventDecoder {
    coalescer: ScrollCoalescer,
    pending_events: VecDeque<InputEvent>,
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(DEFAULT_COALESCE_WINDOW_MS))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            coalescer: ScrollCoalescer::new(window),
            pending_events: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending_events.is_empty() && self.coalescer.is_empty()
    }

    /// Feed one crossterm event.
    pub fn process_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) => {
                if let Some(key) = Key::from_event(key_event) {
                    self.flush_pending_scroll();
                    self.pending_events.push_back(InputEvent::Key(key));
                }
            }
            Event::Resize(cols, rows) => {
                self.flush_pending_scroll();
                self.pending_events
                    .push_back(InputEvent::Resize { cols, rows });
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        }
    }

    /// Next decoded event without polling the terminal.
    pub fn try_flush(&mut self) -> Option<InputEvent> {
        if let Some(event) = self.pending_events.pop_front() {
            return Some(event);
        }
        self.coalescer
            .flush_if_stale(Instant::now())
            .map(|(direction, lines)| InputEvent::Scroll { direction, lines })
    }

    /// Retrieve the next event, blocking up to `timeout`.
    pub fn poll_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>> {
        if let Some(event) = self.try_flush() {
            return Ok(Some(event));
        }
        if event::poll(timeout)? {
            self.process_event(event::read()?);
        }
        Ok(self.try_flush())
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        let direction = match mouse_event.kind {
            MouseEventKind::ScrollUp => ScrollDirection::Up,
            MouseEventKind::ScrollDown => ScrollDirection::Down,
            MouseEventKind::Down(MouseButton::Left) => {
                self.flush_pending_scroll();
                self.pending_events.push_back(InputEvent::Click {
                    column: mouse_event.column,
                    row: mouse_event.row,
                });
                return;
            }
            _ => return,
        };

        if let Some((direction, lines)) =
            self.coalescer
                .push(direction, MOUSE_SCROLL_LINES, Instant::now())
        {
            self.pending_events
                .push_back(InputEvent::Scroll { direction, lines });
        }
    }

    fn flush_pending_scroll(&mut self) {
        if let Some((direction, lines)) = self.coalescer.flush() {
            self.pending_events
                .push_back(InputEvent::Scroll { direction, lines });
        }
    }
}
