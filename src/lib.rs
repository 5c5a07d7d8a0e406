//! # flowless - a pager for growing line streams
//!
//! Pages files, pipes, commands and URLs like `less`, and follows them like `tail -f`,
//! while a background thread keeps reading.
//!
//! ## Architecture
//!
//! - [`buffer`] - shared line store, ingestion thread, source opening and tail detection
//! - [`search`] - pattern compilation and chunked scanning over the store
//! - [`follow`] - incremental follow, goto and search modes driven by ticks
//! - [`render`] - view state, window building and the ratatui terminal backend
//! - [`input`] - key decoding, key map and the single-line prompt
//! - [`screen`] - one pager screen and the stack of open screens
//! - [`app`] - the event loop tying screens, input and the terminal together

// Ambient
pub mod config;
pub mod error;
pub mod logging;

// Data path
pub mod buffer;
pub mod follow;
pub mod search;

// Interaction
pub mod help;
pub mod input;
pub mod render;
pub mod screen;

pub mod app;

pub use app::Application;
pub use config::Config;
pub use error::{FlowlessError, Result};
pub use screen::{Screen, ScreenOptions, ScreenStack};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
