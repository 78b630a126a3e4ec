// What the screen shows

use crate::format::format_time_label;
use std::fmt;

/// Caption of the play/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    Play,
    Pause,
}

impl fmt::Display for ToggleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToggleLabel::Play => "Play",
            ToggleLabel::Pause => "Pause",
        })
    }
}

/// Control values derived from the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub toggle_label: ToggleLabel,
    pub toggle_enabled: bool,
    pub slider_max: u64,
    pub slider_position: u64,
    pub time_label: String,
}

impl ScreenView {
    pub fn new() -> Self {
        Self {
            toggle_label: ToggleLabel::Play,
            toggle_enabled: false,
            slider_max: 0,
            slider_position: 0,
            time_label: format_time_label(0, 0),
        }
    }

    /// Move the slider and recompute the label against `duration_ms`
    pub fn show_position(&mut self, position_ms: u64, duration_ms: u64) {
        self.slider_position = if self.slider_max > 0 {
            position_ms.min(self.slider_max)
        } else {
            position_ms
        };
        self.time_label = format_time_label(position_ms, duration_ms);
    }
}

impl Default for ScreenView {
    fn default() -> Self {
        Self::new()
    }
}
