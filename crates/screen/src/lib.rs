//! Playback screen: binds a player handle to a toggle, a stop button, a
//! progress slider and an elapsed/duration label.

mod config;
mod controller;
mod error;
mod event;
mod format;
mod refresh;
mod toast;
mod view;

pub use config::{ScreenConfig, SOURCE_URL};
pub use controller::PlaybackScreen;
pub use error::ScreenError;
pub use event::{ChannelCallback, Gesture, ScreenEvent};
pub use format::{format_clock, format_time_label};
pub use refresh::RefreshTask;
pub use toast::{Toast, Toasts};
pub use view::{ScreenView, ToggleLabel};
