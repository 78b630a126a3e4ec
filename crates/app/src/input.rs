// Terminal commands

use earshot_screen::Gesture;

/// A parsed line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Gesture(Gesture),
    Quit,
}

pub const HELP: &str =
    "commands: <enter>|p|play|pause = toggle, s|stop = stop, seek <secs|m:ss>, q|quit";

/// Parse one line; `None` when the line is not a command
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None => return Some(Command::Gesture(Gesture::TogglePlayPause)),
        Some(word) => word.to_ascii_lowercase(),
    };

    let parsed = match command.as_str() {
        "p" | "play" | "pause" => Command::Gesture(Gesture::TogglePlayPause),
        "s" | "stop" => Command::Gesture(Gesture::Stop),
        "q" | "quit" => Command::Quit,
        "seek" => {
            let position_ms = parse_position(words.next()?)?;
            Command::Gesture(Gesture::SeekReleased { position_ms })
        }
        _ => return None,
    };

    if words.next().is_some() {
        return None;
    }
    Some(parsed)
}

/// `90` or `1:30` as milliseconds
fn parse_position(text: &str) -> Option<u64> {
    match text.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: u64 = seconds.parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)?.checked_mul(1000)
        }
        None => text.parse::<u64>().ok()?.checked_mul(1000),
    }
}
