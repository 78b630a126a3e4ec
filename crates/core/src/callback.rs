// Player events delivered from worker threads to the handle's owner

use parking_lot::Mutex;
use std::sync::Arc;

/// Player event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    /// Asynchronous preparation finished
    Prepared { duration_ms: u64 },

    /// Playback reached the end of the track
    PlaybackCompleted,

    /// Playback error occurred
    Error { message: String },
}

/// Player callback trait
/// Implementations should be lightweight and non-blocking
pub trait PlayerCallback: Send + Sync {
    /// Called when an event occurs, usually from a worker thread
    fn on_event(&self, event: CallbackEvent);
}

/// Callback slot shared between a handle and its workers
///
/// Clearing the slot guarantees no further events reach the old callback,
/// even from workers that are still winding down.
#[derive(Clone, Default)]
pub struct CallbackSlot {
    inner: Arc<Mutex<Option<Arc<dyn PlayerCallback>>>>,
}

impl CallbackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, callback: Option<Arc<dyn PlayerCallback>>) {
        *self.inner.lock() = callback;
    }

    pub fn dispatch(&self, event: CallbackEvent) {
        let callback = self.inner.lock().clone();
        match callback {
            Some(callback) => callback.on_event(event),
            None => log::debug!("No callback registered, dropping {:?}", event),
        }
    }
}

/// Callback that records every event, for tests
#[cfg(test)]
pub struct RecordingCallback {
    events: Mutex<Vec<CallbackEvent>>,
}

#[cfg(test)]
impl RecordingCallback {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<CallbackEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl PlayerCallback for RecordingCallback {
    fn on_event(&self, event: CallbackEvent) {
        self.events.lock().push(event);
    }
}
