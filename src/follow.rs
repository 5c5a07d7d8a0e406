//! Follow mode: keep the view moving while a source is still loading.
//!
//! Each poll tick calls [`FollowMode::step`], which says where the view should scroll and
//! whether the mode has settled back to [`FollowMode::Off`].

use crate::buffer::LineStore;
use crate::render::ViewState;
use crate::search::{scan_forward, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowMode {
    #[default]
    Off,
    /// Track the newest line until the read cycle ends.
    Following,
    /// Advance until line index `n` exists, then stop on it.
    Going(usize),
    /// A forward search found nothing yet; keep scanning new lines from `from`.
    Searching { from: usize },
}

/// How a follow mode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// End of stream reached while following.
    CaughtUp,
    /// The goto target (or the last line, if the stream ended short) is on screen.
    Reached(usize),
    Found(usize),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FollowStep {
    /// New top line; callers clamp it to the scroll range.
    pub scroll_to: Option<usize>,
    /// Set when this step returned the mode to `Off`.
    pub outcome: Option<FollowOutcome>,
}

impl FollowMode {
    pub fn is_active(&self) -> bool {
        *self != FollowMode::Off
    }

    /// Whether this mode needs every line buffered.
    pub fn wants_unlimited(&self) -> bool {
        matches!(self, FollowMode::Following | FollowMode::Searching { .. })
    }

    pub fn step(&mut self, store: &LineStore, view: &ViewState) -> FollowStep {
        // End-of-stream is read before the length so a true flag covers every line.
        let eof = store.is_eof();
        let len = store.len();

        match *self {
            FollowMode::Off => FollowStep::default(),
            FollowMode::Following => {
                let outcome = eof.then_some(FollowOutcome::CaughtUp);
                self.settle_if(eof);
                FollowStep {
                    scroll_to: Some(view.y_max(len)),
                    outcome,
                }
            }
            FollowMode::Going(target) => {
                if target < len {
                    *self = FollowMode::Off;
                    return FollowStep {
                        scroll_to: Some(target),
                        outcome: Some(FollowOutcome::Reached(target)),
                    };
                }
                let outcome = eof.then(|| FollowOutcome::Reached(len.saturating_sub(1)));
                self.settle_if(eof);
                FollowStep {
                    scroll_to: Some(view.y_max(len)),
                    outcome,
                }
            }
            FollowMode::Searching { from } => {
                let Some(pattern) = &view.search else {
                    *self = FollowMode::Off;
                    return FollowStep {
                        scroll_to: None,
                        outcome: Some(FollowOutcome::NotFound),
                    };
                };
                match scan_forward(store, pattern, from) {
                    ScanResult::Found(index) => {
                        *self = FollowMode::Off;
                        FollowStep {
                            scroll_to: Some(index),
                            outcome: Some(FollowOutcome::Found(index)),
                        }
                    }
                    ScanResult::Exhausted { len: scanned } => {
                        if eof {
                            *self = FollowMode::Off;
                            return FollowStep {
                                scroll_to: None,
                                outcome: Some(FollowOutcome::NotFound),
                            };
                        }
                        *self = FollowMode::Searching { from: scanned };
                        FollowStep {
                            scroll_to: Some(view.y_max(scanned)),
                            outcome: None,
                        }
                    }
                }
            }
        }
    }

    fn settle_if(&mut self, done: bool) {
        if done {
            *self = FollowMode::Off;
        }
    }
}
