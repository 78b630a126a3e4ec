// Playback screen controller

use crate::config::ScreenConfig;
use crate::error::ScreenError;
use crate::event::{ChannelCallback, Gesture, ScreenEvent};
use crate::refresh::RefreshTask;
use crate::toast::Toasts;
use crate::view::{ScreenView, ToggleLabel};
use earshot_core::{CallbackEvent, PlayerHandle, SessionState};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Binds the toggle, stop button, slider and time label to one player handle
///
/// All methods run on the screen thread. Player callbacks and refresh ticks
/// arrive as [`ScreenEvent`]s on the channel given to [`PlaybackScreen::create`]
/// and are fed back in through [`PlaybackScreen::handle_event`].
pub struct PlaybackScreen<H: PlayerHandle> {
    handle: Option<H>,
    state: SessionState,
    duration_ms: u64,
    view: ScreenView,
    toasts: Toasts,
    refresh: Option<RefreshTask>,
}

impl<H: PlayerHandle> PlaybackScreen<H> {
    /// Register callbacks, attach the fixed source, start preparing and
    /// start the refresh task
    pub fn create(mut handle: H, config: &ScreenConfig, events: Sender<ScreenEvent>) -> Self {
        log::info!("[screen] create, source {}", config.source_url);
        handle.set_callback(Some(Arc::new(ChannelCallback::new(events.clone()))));

        let mut screen = Self {
            handle: None,
            state: SessionState::Uninitialized,
            duration_ms: 0,
            view: ScreenView::new(),
            toasts: Toasts::new(config.toast_duration),
            refresh: None,
        };

        match Self::attach(&mut handle, &config.source_url) {
            Ok(()) => screen.state = SessionState::Preparing,
            Err(e) => screen.raise(e),
        }
        screen.handle = Some(handle);

        screen.refresh = Some(RefreshTask::start(config.refresh_interval, move || {
            events.send(ScreenEvent::Tick).is_ok()
        }));
        screen
    }

    fn attach(handle: &mut H, url: &str) -> Result<(), ScreenError> {
        handle
            .set_data_source(url)
            .map_err(ScreenError::SourceAttach)?;
        handle.prepare_async().map_err(ScreenError::SourceAttach)
    }

    /// Dispatch one event; returns `false` once the screen is closed
    pub fn handle_event(&mut self, event: ScreenEvent) -> bool {
        match event {
            ScreenEvent::Gesture(Gesture::TogglePlayPause) => self.on_toggle_pressed(),
            ScreenEvent::Gesture(Gesture::Stop) => self.on_stop_pressed(),
            ScreenEvent::Gesture(Gesture::SeekReleased { position_ms }) => {
                self.on_seek_released(position_ms)
            }
            ScreenEvent::Player(CallbackEvent::Prepared { duration_ms }) => {
                self.on_prepared(duration_ms)
            }
            ScreenEvent::Player(CallbackEvent::PlaybackCompleted) => self.on_completion(),
            ScreenEvent::Player(CallbackEvent::Error { message }) => self.on_player_error(&message),
            ScreenEvent::Tick => self.on_refresh_tick(),
            ScreenEvent::Close => {
                self.destroy();
                return false;
            }
        }
        true
    }

    pub fn on_prepared(&mut self, duration_ms: u64) {
        if self.handle.is_none() {
            return;
        }
        log::info!("[screen] prepared, duration {} ms", duration_ms);
        self.state = SessionState::Paused;
        self.duration_ms = duration_ms;
        self.view.slider_max = duration_ms;
        self.view.toggle_enabled = true;
        self.view.toggle_label = ToggleLabel::Play;
        self.view.show_position(0, duration_ms);
    }

    pub fn on_player_error(&mut self, message: &str) {
        if let Some(handle) = self.handle.as_ref() {
            log::error!("[screen] player error in {:?}: {}", handle.state(), message);
        }
        self.raise(ScreenError::Playback(message.to_string()));
    }

    pub fn on_completion(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        log::info!("[screen] playback completed");
        self.state = SessionState::Paused;
        self.view.toggle_label = ToggleLabel::Play;
        self.view.show_position(self.duration_ms, self.duration_ms);
    }

    pub fn on_toggle_pressed(&mut self) {
        let handle = match self.handle.as_mut() {
            Some(handle) if self.state.is_prepared() => handle,
            _ => {
                self.raise(ScreenError::NotReady);
                return;
            }
        };

        let result = if self.state.is_playing() {
            handle.pause().map(|()| (SessionState::Paused, ToggleLabel::Play))
        } else {
            handle.start().map(|()| (SessionState::Playing, ToggleLabel::Pause))
        };

        match result {
            Ok((state, label)) => {
                log::debug!("[screen] {:?} -> {:?}", self.state, state);
                self.state = state;
                self.view.toggle_label = label;
            }
            Err(e) => self.raise(ScreenError::Playback(e.to_string())),
        }
    }

    pub fn on_stop_pressed(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        if let Err(e) = handle.stop() {
            log::warn!("[screen] stop failed: {}", e);
        }
        self.state = SessionState::Stopped;
        self.view.toggle_label = ToggleLabel::Play;
        self.view.show_position(0, self.duration_ms);

        if let Err(e) = handle.prepare_async() {
            log::warn!("[screen] re-prepare after stop failed: {}", e);
        }
    }

    pub fn on_seek_released(&mut self, position_ms: u64) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let target = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };

        let result = handle.seek_to(target);
        self.view.show_position(target, self.duration_ms);
        if let Err(e) = result {
            self.raise(ScreenError::Playback(e.to_string()));
        }
    }

    pub fn on_refresh_tick(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        let position = handle.current_position_ms();
        self.view.show_position(position, self.duration_ms);
    }

    fn raise(&mut self, error: ScreenError) {
        log::warn!("[screen] {}", error);
        self.toasts.show(error.user_message());
    }

    /// Cancel the refresh task, then release the handle
    pub fn destroy(&mut self) {
        if let Some(mut refresh) = self.refresh.take() {
            refresh.cancel();
        }
        if let Some(mut handle) = self.handle.take() {
            log::info!("[screen] releasing player");
            handle.set_callback(None);
            handle.release();
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn view(&self) -> &ScreenView {
        &self.view
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_destroyed(&self) -> bool {
        self.handle.is_none()
    }
}

impl<H: PlayerHandle> Drop for PlaybackScreen<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}
