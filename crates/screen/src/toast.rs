// Short-lived notifications

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub posted_at: Instant,
}

/// Queue of toasts that expire after a fixed duration
#[derive(Debug)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    duration: Duration,
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            duration,
        }
    }

    pub fn show(&mut self, message: &str) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: &str, now: Instant) {
        log::info!("[toast] {}", message);
        self.queue.push_back(Toast {
            message: message.to_string(),
            posted_at: now,
        });
    }

    /// Drop expired toasts and return what is still on screen
    pub fn visible(&mut self, now: Instant) -> impl Iterator<Item = &str> {
        let duration = self.duration;
        self.queue
            .retain(|toast| now.saturating_duration_since(toast.posted_at) < duration);
        self.queue.iter().map(|toast| toast.message.as_str())
    }

    /// Most recently posted message, expired or not
    pub fn latest(&self) -> Option<&str> {
        self.queue.back().map(|toast| toast.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
