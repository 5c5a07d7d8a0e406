//! Key bindings for the pager screen.

use crate::input::raw::Key;

/// What a key press asks the active screen to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pop the active screen.
    Quit,
    /// Leave the program from any screen.
    Exit,
    LineUp,
    LineDown,
    ColumnLeft,
    ColumnRight,
    Top,
    Bottom,
    PageDown,
    PageUp,
    /// Open the goto prompt seeded with this digit.
    Goto(char),
    Follow,
    ToggleUnlimited,
    Search,
    SearchNext,
    SearchPrev,
    Filter,
    Save,
    Edit,
    ToggleMouse,
    ToggleLineNumbers,
    ToggleTimestamps,
    ToggleColumns,
    Shell,
    SendInput,
    Headers,
    Help,
    Unrecognized(Key),
}

pub fn command_for(key: &Key) -> Command {
    match key {
        Key::Char('q') => Command::Quit,
        Key::Ctrl('c') => Command::Exit,
        Key::Char('k') | Key::Up => Command::LineUp,
        Key::Char('j') | Key::Down => Command::LineDown,
        Key::Char('h') | Key::Left => Command::ColumnLeft,
        Key::Char('l') | Key::Right => Command::ColumnRight,
        Key::Char('g') | Key::Home => Command::Top,
        Key::Char('G') | Key::End => Command::Bottom,
        Key::Char(' ') | Key::PageDown | Key::Ctrl('d') => Command::PageDown,
        Key::PageUp | Key::Ctrl('u') => Command::PageUp,
        Key::Char(digit @ '0'..='9') => Command::Goto(*digit),
        Key::Char('F') => Command::Follow,
        Key::Char('L') => Command::ToggleUnlimited,
        Key::Char('/') => Command::Search,
        Key::Char('n') => Command::SearchNext,
        Key::Char('p') => Command::SearchPrev,
        Key::Char('f') => Command::Filter,
        Key::Char('s') => Command::Save,
        Key::Char('v') => Command::Edit,
        Key::Char('m') => Command::ToggleMouse,
        Key::Char('N') => Command::ToggleLineNumbers,
        Key::Char('T') => Command::ToggleTimestamps,
        Key::Char('S') => Command::ToggleColumns,
        Key::Char('t') => Command::Shell,
        Key::Char('x') => Command::SendInput,
        Key::Char('H') => Command::Headers,
        Key::Char('?') => Command::Help,
        other => Command::Unrecognized(other.clone()),
    }
}
