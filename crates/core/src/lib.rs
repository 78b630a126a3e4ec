// Core types and traits for the earshot player

pub mod callback;
pub mod error;
pub mod handle;
pub mod source;
pub mod state;

// Re-export commonly used types
pub use callback::{CallbackEvent, CallbackSlot, PlayerCallback};
pub use error::{AudioError, Result};
pub use handle::PlayerHandle;
pub use source::SourceUrl;
pub use state::{HandleState, HandleStateContainer, SessionState};
