// Player handle abstraction driven by the playback screen

use crate::callback::PlayerCallback;
use crate::error::Result;
use crate::state::HandleState;
use std::sync::Arc;

/// A media player handle for one remote source
///
/// Commands are issued from a single owner thread. Preparation runs on a
/// worker and reports back through the registered [`PlayerCallback`].
pub trait PlayerHandle: Send {
    /// Attach the remote source. Fails with `AudioError::SourceAttach` for
    /// malformed addresses.
    fn set_data_source(&mut self, url: &str) -> Result<()>;

    /// Begin asynchronous preparation; completion arrives as
    /// `CallbackEvent::Prepared` or `CallbackEvent::Error`.
    fn prepare_async(&mut self) -> Result<()>;

    /// Start or resume playback
    fn start(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Hard stop; the handle must be prepared again before it can start
    fn stop(&mut self) -> Result<()>;

    /// Jump to a position in milliseconds
    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    /// Current playback position in milliseconds
    fn current_position_ms(&self) -> u64;

    /// Current state of the handle's own state machine
    fn state(&self) -> HandleState;

    /// Register the event callback, replacing any previous one
    fn set_callback(&mut self, callback: Option<Arc<dyn PlayerCallback>>);

    /// Release all resources. Safe to call more than once and in any state.
    fn release(&mut self);
}
