// Screen configuration

use std::time::Duration;

/// The one track this screen plays
pub const SOURCE_URL: &str = "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3";

/// Screen timing and source settings
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub source_url: String,
    /// Period of the position refresh task
    pub refresh_interval: Duration,
    /// How long a toast stays visible
    pub toast_duration: Duration,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            refresh_interval: Duration::from_secs(1),
            toast_duration: Duration::from_secs(2),
        }
    }
}
