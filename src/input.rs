//! Input subsystem: terminal decoding, key bindings, status-line prompts and the
//! polling thread.

pub mod keymap;
pub mod prompt;
pub mod raw;
pub mod service;

pub use keymap::{command_for, Command};
pub use prompt::{Prompt, PromptKind, PromptOutcome};
pub use raw::{InputEvent, Key, ScrollDirection};
pub use service::{spawn_input_thread, InputControl};
