//! Single-line editor shown on the status line.
//!
//! Enter submits and Backspace deletes. Esc, or any key the prompt does not accept,
//! cancels it.

use crate::input::raw::Key;
use crate::search::SearchOptions;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    /// Line number; digits only.
    Goto,
    /// Tab toggles case sensitivity, Ctrl-R toggles regex/literal.
    Search(SearchOptions),
    SaveFile,
    /// `y` or `n`, answered without Enter.
    ConfirmOverwrite(PathBuf),
    /// A line for the attached subprocess.
    SendInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Editing,
    Cancelled,
    Submitted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    buffer: String,
}

impl Prompt {
    pub fn goto(first_digit: char) -> Self {
        Self {
            kind: PromptKind::Goto,
            buffer: first_digit.to_string(),
        }
    }

    pub fn search(options: SearchOptions) -> Self {
        Self::empty(PromptKind::Search(options))
    }

    pub fn save_file() -> Self {
        Self::empty(PromptKind::SaveFile)
    }

    pub fn confirm_overwrite(path: PathBuf) -> Self {
        Self::empty(PromptKind::ConfirmOverwrite(path))
    }

    pub fn send_input() -> Self {
        Self::empty(PromptKind::SendInput)
    }

    fn empty(kind: PromptKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
        }
    }

    pub fn kind(&self) -> &PromptKind {
        &self.kind
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn label(&self) -> String {
        match &self.kind {
            PromptKind::Goto => "Goto:".to_string(),
            PromptKind::Search(options) => options.prompt_label(),
            PromptKind::SaveFile => "Save file:".to_string(),
            PromptKind::ConfirmOverwrite(path) => {
                format!("{:?} exists. Override? [y/n] ", path.display().to_string())
            }
            PromptKind::SendInput => "input:".to_string(),
        }
    }

    /// Label followed by what has been typed.
    pub fn line(&self) -> String {
        format!("{}{}", self.label(), self.buffer)
    }

    pub fn handle_key(&mut self, key: &Key) -> PromptOutcome {
        match (&mut self.kind, key) {
            (PromptKind::ConfirmOverwrite(_), Key::Char(ch @ ('y' | 'n'))) => {
                PromptOutcome::Submitted(ch.to_string())
            }
            (PromptKind::ConfirmOverwrite(_), _) => PromptOutcome::Cancelled,
            (_, Key::Enter) => PromptOutcome::Submitted(std::mem::take(&mut self.buffer)),
            (_, Key::Esc) => PromptOutcome::Cancelled,
            (_, Key::Backspace) => {
                self.buffer.pop();
                PromptOutcome::Editing
            }
            (PromptKind::Search(options), Key::Tab) => {
                options.ignore_case = !options.ignore_case;
                PromptOutcome::Editing
            }
            (PromptKind::Search(options), Key::Ctrl('r')) => {
                options.regex = !options.regex;
                PromptOutcome::Editing
            }
            (PromptKind::Goto, Key::Char(ch)) if ch.is_ascii_digit() => {
                self.buffer.push(*ch);
                PromptOutcome::Editing
            }
            (PromptKind::Search(_) | PromptKind::SaveFile | PromptKind::SendInput, Key::Char(ch)) => {
                self.buffer.push(*ch);
                PromptOutcome::Editing
            }
            _ => PromptOutcome::Cancelled,
        }
    }
}
