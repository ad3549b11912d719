use std::time::{Duration, Instant};

use crate::shared::constants::RESIZE_DEBOUNCE;

/// Debounce for orientation-change resizes.
///
/// Platforms need a moment to settle layout after rotating; resizing
/// the overlay immediately would capture the pre-rotation box. Each
/// request restarts the delay; `poll` fires at most once per request.
#[derive(Debug)]
pub struct ResizeDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once, when the settle delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}
