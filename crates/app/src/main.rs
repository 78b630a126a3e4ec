// Terminal front end for the playback screen

mod input;
mod render;

use earshot_player::StreamingPlayer;
use earshot_screen::{PlaybackScreen, ScreenConfig, ScreenEvent};
use input::{parse_command, Command, HELP};
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};

static INIT_LOGGER: Once = Once::new();

fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    });
}

/// Forward stdin lines to the screen thread; EOF closes the screen
fn spawn_input_reader(events: Sender<ScreenEvent>) {
    let spawned = thread::Builder::new()
        .name("earshot-input".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::error!("[input] read failed: {}", e);
                        break;
                    }
                };
                let event = match parse_command(&line) {
                    Some(Command::Gesture(gesture)) => ScreenEvent::Gesture(gesture),
                    Some(Command::Quit) => ScreenEvent::Close,
                    None => {
                        println!("{}", HELP);
                        continue;
                    }
                };
                let closing = event == ScreenEvent::Close;
                if events.send(event).is_err() || closing {
                    return;
                }
            }
            let _ = events.send(ScreenEvent::Close);
        });

    if let Err(e) = spawned {
        log::error!("[input] cannot start reader: {}", e);
    }
}

fn main() {
    init_logging();
    log::info!("earshot {}", env!("CARGO_PKG_VERSION"));

    let (events, queue) = mpsc::channel();
    let config = ScreenConfig::default();
    let mut screen = PlaybackScreen::create(StreamingPlayer::new(), &config, events.clone());
    spawn_input_reader(events);
    println!("{}", HELP);

    let mut last_frame = String::new();
    loop {
        match queue.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if !screen.handle_event(event) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let toasts: Vec<String> = screen
            .toasts_mut()
            .visible(Instant::now())
            .map(str::to_string)
            .collect();
        let frame = render::render(screen.view(), &toasts);
        if frame != last_frame {
            println!("{}", frame);
            last_frame = frame;
        }
    }

    screen.destroy();
    log::info!("earshot exiting");
}
