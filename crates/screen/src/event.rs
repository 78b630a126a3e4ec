// Events handled on the screen thread

use earshot_core::{CallbackEvent, PlayerCallback};
use parking_lot::Mutex;
use std::sync::mpsc::Sender;

/// User gestures on the screen's controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    TogglePlayPause,
    Stop,
    /// Slider released (or otherwise moved by the user) at a position
    SeekReleased { position_ms: u64 },
}

/// Everything the screen thread reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Gesture(Gesture),
    Player(CallbackEvent),
    Tick,
    /// The screen is being closed
    Close,
}

/// Player callback that forwards events onto the screen thread's queue
pub struct ChannelCallback {
    events: Mutex<Sender<ScreenEvent>>,
}

impl ChannelCallback {
    pub fn new(events: Sender<ScreenEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

impl PlayerCallback for ChannelCallback {
    fn on_event(&self, event: CallbackEvent) {
        if self.events.lock().send(ScreenEvent::Player(event)).is_err() {
            log::debug!("screen event queue closed, player event dropped");
        }
    }
}
