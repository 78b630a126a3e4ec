// Error handling for the player handle and its pipeline

use thiserror::Error;

/// Audio player error types
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// The data source could not be attached to the handle
    #[error("Source attach error: {0}")]
    SourceAttach(String),

    /// Command issued in a state that does not accept it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Network error (HEAD/Range requests)
    #[error("Network error: {0}")]
    Network(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Failed to probe or open the media
    #[error("Load error: {0}")]
    Load(String),

    /// Decoding error
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Audio format not supported
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Output device error
    #[error("Device error: {0}")]
    Device(String),

    /// Playback error
    #[error("Playback error: {0}")]
    Playback(String),
}

/// Result type alias for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::Io(err.to_string())
    }
}
