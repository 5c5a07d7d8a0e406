//! Input thread: polls the terminal and forwards decoded events to the UI loop.

use crate::input::raw::{EventDecoder, InputEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared switches for the input thread.
#[derive(Debug, Clone, Default)]
pub struct InputControl {
    shutdown: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl InputControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Stop reading the terminal while an external program owns it.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// Spawn a blocking thread that polls for terminal events and forwards them to the UI loop.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputEvent>,
    control: InputControl,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut decoder = EventDecoder::new();
        while !control.is_shutdown() {
            if control.is_paused() {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            match decoder.poll_event(POLL_INTERVAL) {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    log::error!("input thread error: {err}");
                    break;
                }
            }
        }
        log::debug!("input thread stopped");
    })
}
