//! Application orchestration layer
//!
//! Drives the screen stack: every iteration resizes, ticks and paints the top screen,
//! then waits a bounded time for the next input event.

use crate::error::Result;
use crate::input::{InputControl, InputEvent};
use crate::render::UIRenderer;
use crate::screen::{ExternalCommand, ScreenStack, StackStatus, Transition};
use std::path::Path;
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedReceiver;

pub struct Application {
    stack: ScreenStack,
    ui: Box<dyn UIRenderer>,
    events: UnboundedReceiver<InputEvent>,
    input: InputControl,
}

impl Application {
    pub fn new(
        stack: ScreenStack,
        ui: Box<dyn UIRenderer>,
        events: UnboundedReceiver<InputEvent>,
        input: InputControl,
    ) -> Self {
        Self {
            stack,
            ui,
            events,
            input,
        }
    }

    /// Run until the last screen is popped, then restore the terminal.
    pub async fn run(&mut self) -> Result<()> {
        self.ui.initialize()?;
        let result = self.event_loop().await;

        self.stack.close_all();
        self.input.shutdown();
        self.ui.cleanup()?;
        log::debug!("terminate");
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        loop {
            let (cols, rows) = self.ui.get_terminal_size()?;
            let Some(screen) = self.stack.top_mut() else {
                return Ok(());
            };
            screen.resize(cols, rows);
            screen.tick();
            screen.paint(self.ui.as_mut())?;
            self.ui.set_mouse_capture(screen.mouse_enabled())?;

            let event = match tokio::time::timeout(screen.poll_interval(), self.events.recv()).await
            {
                Err(_) => {
                    screen.idle();
                    continue;
                }
                Ok(None) => {
                    log::debug!("input channel closed");
                    return Ok(());
                }
                Ok(Some(event)) => event,
            };

            match screen.handle_event(event) {
                Transition::Continue => {}
                Transition::Push(child) => self.stack.push(*child),
                Transition::Pop => {
                    if self.stack.pop() == StackStatus::Exhausted {
                        return Ok(());
                    }
                }
                Transition::Exit => return Ok(()),
                Transition::External(command) => self.run_external(command).await?,
            }
        }
    }

    /// Hand the terminal to an editor or shell and take it back when it exits.
    async fn run_external(&mut self, command: ExternalCommand) -> Result<()> {
        self.input.pause();
        self.ui.cleanup()?;

        let mut process = match &command {
            ExternalCommand::Editor { path, line } => editor_command(path, *line),
            ExternalCommand::Shell => {
                Command::new(std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()))
            }
        };
        match process.status().await {
            Ok(status) => log::debug!("{command:?} exited with {status}"),
            Err(err) => log::warn!("{command:?} failed to start: {err}"),
        }

        self.ui.initialize()?;
        self.ui.clear()?;
        self.input.resume();
        self.stack.invalidate_top();
        Ok(())
    }
}

/// `$EDITOR +LINE PATH` through the shell, so EDITOR may carry its own arguments.
fn editor_command(path: &Path, line: usize) -> Command {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(format!("{editor} +{line} \"$1\""))
        .arg("flowless")
        .arg(path);
    command
}
