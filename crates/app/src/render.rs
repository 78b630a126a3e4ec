// Text rendering of the screen

use earshot_screen::ScreenView;

const SLIDER_WIDTH: usize = 30;

fn slider(position: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        (position.min(max) * width as u64 / max) as usize
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One frame: the control row followed by any visible toasts
pub fn render(view: &ScreenView, toasts: &[String]) -> String {
    let toggle = if view.toggle_enabled {
        format!(" {} ", view.toggle_label)
    } else {
        format!("[{}]", view.toggle_label)
    };

    let mut frame = format!(
        "{} | Stop | {} {}",
        toggle,
        slider(view.slider_position, view.slider_max, SLIDER_WIDTH),
        view.time_label
    );
    for toast in toasts {
        frame.push_str("\n  ! ");
        frame.push_str(toast);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use earshot_screen::ToggleLabel;

    #[test]
    fn test_slider_fill() {
        assert_eq!(slider(0, 0, 4), "[----]");
        assert_eq!(slider(50, 100, 4), "[##--]");
        assert_eq!(slider(500, 100, 4), "[####]");
    }

    #[test]
    fn test_disabled_toggle_is_bracketed() {
        let view = ScreenView::new();
        let frame = render(&view, &[]);
        assert!(frame.starts_with("[Play] | Stop |"));
        assert!(frame.ends_with("00:00 / 00:00"));
    }

    #[test]
    fn test_enabled_toggle_and_toasts() {
        let mut view = ScreenView::new();
        view.toggle_enabled = true;
        view.toggle_label = ToggleLabel::Pause;
        view.slider_max = 125_000;
        view.show_position(65_000, 125_000);

        let frame = render(&view, &["Media player error occurred".to_string()]);
        let mut lines = frame.lines();
        let controls = lines.next().unwrap();
        assert!(controls.starts_with(" Pause  | Stop |"));
        assert!(controls.ends_with("01:05 / 02:05"));
        assert_eq!(lines.next(), Some("  ! Media player error occurred"));
    }
}
