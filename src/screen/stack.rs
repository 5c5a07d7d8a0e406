//! The stack of open screens; the top one receives input.

use crate::screen::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    Active,
    /// The last screen was popped; the session is over.
    Exhausted,
}

#[derive(Debug)]
pub struct ScreenStack {
    screens: Vec<Screen>,
}

impl ScreenStack {
    pub fn new(root: Screen) -> Self {
        Self {
            screens: vec![root],
        }
    }

    pub fn push(&mut self, mut screen: Screen) {
        screen.invalidate();
        self.screens.push(screen);
    }

    /// Discard the top screen, closing its buffer, and redraw the one below.
    pub fn pop(&mut self) -> StackStatus {
        if let Some(screen) = self.screens.pop() {
            screen.close();
        }
        match self.screens.last_mut() {
            Some(top) => {
                top.invalidate();
                StackStatus::Active
            }
            None => StackStatus::Exhausted,
        }
    }

    pub fn top_mut(&mut self) -> Option<&mut Screen> {
        self.screens.last_mut()
    }

    pub fn top(&self) -> Option<&Screen> {
        self.screens.last()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn invalidate_top(&mut self) {
        if let Some(top) = self.screens.last_mut() {
            top.invalidate();
        }
    }

    /// Close every buffer so no producer stays parked.
    pub fn close_all(&self) {
        for screen in &self.screens {
            screen.close();
        }
    }
}
