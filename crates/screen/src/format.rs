// Elapsed / duration label

/// `MM:SS` for a millisecond value, truncating to whole seconds
pub fn format_clock(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// `MM:SS / MM:SS` for position and duration
pub fn format_time_label(position_ms: u64, duration_ms: u64) -> String {
    format!("{} / {}", format_clock(position_ms), format_clock(duration_ms))
}
