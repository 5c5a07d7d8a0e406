//! Rendering: view state, window building, status line and the terminal backend.

pub mod renderer;
pub mod state;
pub mod status;
pub mod terminal;
pub mod theme;
pub mod window;

pub use renderer::{Renderer, UIRenderer};
pub use state::ViewState;
pub use status::{compose_status, Spinner, StatusInfo};
pub use terminal::TerminalUI;
pub use theme::ColorTheme;

#[cfg(test)]
pub use renderer::tests::MockUIRenderer;
