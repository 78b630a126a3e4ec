// Streaming player handle backed by the playback engine

use crate::engine::{EngineConfig, PlaybackEngine};
use earshot_core::{
    AudioError, CallbackSlot, HandleState, HandleStateContainer, PlayerCallback, PlayerHandle,
    Result, SourceUrl,
};
use std::sync::Arc;

/// [`PlayerHandle`] that streams a remote file over HTTP Range requests,
/// decodes it with Symphonia and plays it on the default cpal device
pub struct StreamingPlayer {
    state: HandleStateContainer,
    callback: CallbackSlot,
    source: Option<SourceUrl>,
    engine: Option<PlaybackEngine>,
    config: EngineConfig,
}

impl StreamingPlayer {
    pub fn new() -> Self {
        log::info!("StreamingPlayer::new");
        Self {
            state: HandleStateContainer::new(),
            callback: CallbackSlot::new(),
            source: None,
            engine: None,
            config: EngineConfig::default(),
        }
    }

    fn engine(&self) -> Result<&PlaybackEngine> {
        self.engine
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("no prepared engine".to_string()))
    }

    /// Enter `Preparing` and hand the pipeline to a new engine, rolling the
    /// state back if the engine cannot be started
    fn launch<F>(&mut self, url: SourceUrl, spawn: F) -> Result<()>
    where
        F: FnOnce(SourceUrl, HandleStateContainer, CallbackSlot, EngineConfig) -> Result<PlaybackEngine>,
    {
        let previous = self.state.transition(HandleState::Preparing)?;

        self.shutdown_engine();
        match spawn(url, self.state.clone(), self.callback.clone(), self.config) {
            Ok(engine) => {
                self.engine = Some(engine);
                Ok(())
            }
            Err(e) => {
                log::error!("engine start failed: {}", e);
                if let Err(rollback) = self.state.transition_from(HandleState::Preparing, previous) {
                    log::warn!("state rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    fn shutdown_engine(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
    }
}

impl Default for StreamingPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerHandle for StreamingPlayer {
    fn set_data_source(&mut self, url: &str) -> Result<()> {
        log::info!("set_data_source called");
        if self.state.get() != HandleState::Idle {
            return Err(AudioError::InvalidState(format!(
                "data source can only be set when idle, not {:?}",
                self.state.get()
            )));
        }
        let url = SourceUrl::parse(url)?;
        log::info!("source host {}", url.host());
        self.state.transition(HandleState::Initialized)?;
        self.source = Some(url);
        Ok(())
    }

    fn prepare_async(&mut self) -> Result<()> {
        log::info!("prepare_async called");
        let url = self
            .source
            .clone()
            .ok_or_else(|| AudioError::InvalidState("no data source".to_string()))?;
        self.launch(url, PlaybackEngine::spawn)
    }

    fn start(&mut self) -> Result<()> {
        log::info!("start called");
        self.state.transition(HandleState::Started)?;
        self.engine()?.play();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        log::info!("pause called");
        self.state.transition(HandleState::Paused)?;
        self.engine()?.pause();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        log::info!("stop called");
        self.state.transition(HandleState::Stopped)?;
        self.shutdown_engine();
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        log::info!("seek_to called -> {} ms", position_ms);
        let state = self.state.get();
        if !state.is_seekable() {
            return Err(AudioError::InvalidState(format!(
                "cannot seek in state {:?}",
                state
            )));
        }
        self.engine()?.seek_to(position_ms);
        Ok(())
    }

    fn current_position_ms(&self) -> u64 {
        self.engine.as_ref().map_or(0, PlaybackEngine::position_ms)
    }

    fn state(&self) -> HandleState {
        self.state.get()
    }

    fn set_callback(&mut self, callback: Option<Arc<dyn PlayerCallback>>) {
        self.callback.set(callback);
    }

    fn release(&mut self) {
        if self.state.get() == HandleState::Released {
            return;
        }
        log::info!("release called");
        self.callback.set(None);
        self.shutdown_engine();
        self.source = None;
        if let Err(e) = self.state.transition(HandleState::Released) {
            log::warn!("release: {}", e);
        }
    }
}

impl Drop for StreamingPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_source_is_rejected() {
        let mut player = StreamingPlayer::new();
        let err = player.set_data_source("ftp://example.com/a.mp3").unwrap_err();
        assert!(matches!(err, AudioError::SourceAttach(_)));
        assert_eq!(player.state(), HandleState::Idle);
    }

    #[test]
    fn test_source_can_only_be_set_once() {
        let mut player = StreamingPlayer::new();
        player.set_data_source("https://example.com/a.mp3").unwrap();
        assert_eq!(player.state(), HandleState::Initialized);
        assert!(player.set_data_source("https://example.com/b.mp3").is_err());
    }

    #[test]
    fn test_commands_before_prepare_fail() {
        let mut player = StreamingPlayer::new();
        player.set_data_source("https://example.com/a.mp3").unwrap();
        assert!(player.start().is_err());
        assert!(player.pause().is_err());
        assert!(player.stop().is_err());
        assert!(player.seek_to(1000).is_err());
        assert_eq!(player.state(), HandleState::Initialized);
        assert_eq!(player.current_position_ms(), 0);
    }

    #[test]
    fn test_prepare_without_source_fails() {
        let mut player = StreamingPlayer::new();
        assert!(matches!(
            player.prepare_async(),
            Err(AudioError::InvalidState(_))
        ));
    }

    fn failing_spawn(
        _: SourceUrl,
        _: HandleStateContainer,
        _: CallbackSlot,
        _: EngineConfig,
    ) -> Result<PlaybackEngine> {
        Err(AudioError::Playback("spawn worker: out of threads".to_string()))
    }

    #[test]
    fn test_failed_engine_start_rolls_back() {
        let mut player = StreamingPlayer::new();
        player.set_data_source("https://example.com/a.mp3").unwrap();
        let url = player.source.clone().unwrap();

        let err = player.launch(url.clone(), failing_spawn).unwrap_err();
        assert!(matches!(err, AudioError::Playback(_)));
        assert_eq!(player.state(), HandleState::Initialized);
        assert!(player.engine.is_none());

        // Still preparable: the retry reaches the engine again
        assert!(matches!(
            player.launch(url, failing_spawn),
            Err(AudioError::Playback(_))
        ));
        assert_eq!(player.state(), HandleState::Initialized);
    }

    #[test]
    fn test_failed_restart_after_stop_stays_stopped() {
        let mut player = StreamingPlayer::new();
        player.set_data_source("https://example.com/a.mp3").unwrap();
        let url = player.source.clone().unwrap();
        player.state.transition(HandleState::Preparing).unwrap();
        player.state.transition(HandleState::Prepared).unwrap();
        player.stop().unwrap();

        assert!(player.launch(url, failing_spawn).is_err());
        assert_eq!(player.state(), HandleState::Stopped);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut player = StreamingPlayer::new();
        player.release();
        player.release();
        assert_eq!(player.state(), HandleState::Released);
        assert!(player.set_data_source("https://example.com/a.mp3").is_err());
    }
}
