// Errors surfaced to the user as toasts

use earshot_core::AudioError;
use thiserror::Error;

/// Failures of a single user-facing action
///
/// None of these end the screen; each becomes a toast at the point it is
/// raised.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The fixed source could not be attached at startup
    #[error("cannot attach source: {0}")]
    SourceAttach(#[source] AudioError),

    /// A playback control was used before preparation finished
    #[error("media not ready")]
    NotReady,

    /// The handle reported a playback failure
    #[error("playback error: {0}")]
    Playback(String),
}

impl ScreenError {
    /// Short text shown in the toast
    pub fn user_message(&self) -> &'static str {
        match self {
            ScreenError::SourceAttach(_) => "Error setting up media player",
            ScreenError::NotReady => "Media not ready yet",
            ScreenError::Playback(_) => "Media player error occurred",
        }
    }
}
