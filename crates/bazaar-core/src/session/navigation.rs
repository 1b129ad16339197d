//! Back-navigation history.

use crate::action::ScreenId;
use serde::{Deserialize, Serialize};

/// Ordered history of logical screens for one session.
///
/// Frames record screens the user has *left* through a forward transition;
/// the screen currently on display is never on the stack. System-initiated
/// redraws must not push — only the dispatcher's forward path records frames,
/// so back-navigation can neither loop nor skip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationStack {
    frames: Vec<ScreenId>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack pre-seeded with a single frame (used after a session reset, so
    /// the first "back" lands on home instead of dead-ending).
    pub fn seeded(frame: ScreenId) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Records the screen being left.
    pub fn push(&mut self, frame: ScreenId) {
        self.frames.push(frame);
    }

    /// Returns to the previous screen. `None` means "go home".
    pub fn pop(&mut self) -> Option<ScreenId> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&ScreenId> {
        self.frames.last()
    }

    /// Clears the history, used when returning to home explicitly.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CallbackAction;

    fn screen(n: u32) -> ScreenId {
        CallbackAction::with_param("projects", "view", n.to_string())
    }

    #[test]
    fn test_pop_empty_means_go_home() {
        let mut stack = NavigationStack::new();
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_push_pop_depth_accounting() {
        let mut stack = NavigationStack::new();
        for n in 0..5 {
            stack.push(screen(n));
        }
        assert_eq!(stack.len(), 5);
        for _ in 0..3 {
            stack.pop();
        }
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_pop_returns_most_recent_frame() {
        let mut stack = NavigationStack::new();
        stack.push(screen(1));
        stack.push(screen(2));
        assert_eq!(stack.pop(), Some(screen(2)));
        assert_eq!(stack.peek(), Some(&screen(1)));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut stack = NavigationStack::seeded(CallbackAction::home());
        stack.push(screen(1));
        stack.reset();
        assert!(stack.is_empty());
    }
}
