// Playback engine: preparation worker, decode loop and output

use crate::adapt::SampleAdapter;
use crate::output::AudioOutput;
use earshot_core::{
    CallbackEvent, CallbackSlot, HandleState, HandleStateContainer, Result, SourceUrl,
};
use earshot_decode::{hint_for_extension, TrackReader};
use earshot_ringbuffer::SharedSampleRing;
use earshot_transport_http::HttpRangeSource;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Engine tuning
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineConfig {
    /// Seconds of output audio the ring buffer holds
    pub(crate) ring_seconds: usize,
    /// Fill level at which decoding pauses while playback is paused
    pub(crate) prebuffer_fullness: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ring_seconds: 5,
            prebuffer_fullness: 0.9,
        }
    }
}

/// State shared between the handle, the worker thread and the output callback
pub(crate) struct EngineShared {
    pub(crate) ring: SharedSampleRing,
    pub(crate) playing: AtomicBool,
    pub(crate) end_of_stream: AtomicBool,
    pub(crate) played_frames: AtomicU64,
    stop: Arc<AtomicBool>,
    completed: AtomicBool,
    seek_request: Mutex<Option<u64>>,
    base_ms: AtomicU64,
    output_rate: AtomicU32,
    duration_ms: Mutex<Option<u64>>,
}

impl EngineShared {
    fn new() -> Self {
        Self {
            ring: SharedSampleRing::new(2),
            playing: AtomicBool::new(false),
            end_of_stream: AtomicBool::new(false),
            played_frames: AtomicU64::new(0),
            stop: Arc::new(AtomicBool::new(false)),
            completed: AtomicBool::new(false),
            seek_request: Mutex::new(None),
            base_ms: AtomicU64::new(0),
            output_rate: AtomicU32::new(0),
            duration_ms: Mutex::new(None),
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn rebase(&self, position_ms: u64) {
        self.base_ms.store(position_ms, Ordering::SeqCst);
        self.played_frames.store(0, Ordering::SeqCst);
    }

    fn position_ms(&self) -> u64 {
        let rate = self.output_rate.load(Ordering::SeqCst) as u64;
        let played = if rate > 0 {
            self.played_frames.load(Ordering::SeqCst) * 1000 / rate
        } else {
            0
        };
        let position = self.base_ms.load(Ordering::SeqCst) + played;
        match *self.duration_ms.lock() {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

/// One preparation-and-playback run against a source
///
/// Each `prepare_async` spawns a fresh engine. Shutting an engine down only
/// raises its stop flag; the worker winds down on its own and never reports
/// events once the flag is set.
pub(crate) struct PlaybackEngine {
    shared: Arc<EngineShared>,
}

impl PlaybackEngine {
    pub(crate) fn spawn(
        url: SourceUrl,
        state: HandleStateContainer,
        callback: CallbackSlot,
        config: EngineConfig,
    ) -> Result<Self> {
        let shared = Arc::new(EngineShared::new());
        let worker_shared = shared.clone();

        thread::Builder::new()
            .name("earshot-engine".into())
            .spawn(move || Self::worker(url, worker_shared, state, callback, config))
            .map_err(|e| earshot_core::AudioError::Playback(format!("spawn worker: {}", e)))?;

        Ok(Self { shared })
    }

    pub(crate) fn play(&self) {
        if self.shared.completed.swap(false, Ordering::SeqCst) {
            log::info!("[engine] restarting completed track");
            self.seek_to(0);
        }
        self.shared.playing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn pause(&self) {
        self.shared.playing.store(false, Ordering::SeqCst);
    }

    pub(crate) fn seek_to(&self, position_ms: u64) {
        let target = match *self.shared.duration_ms.lock() {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
        self.shared.ring.clear();
        self.shared.rebase(target);
        self.shared.completed.store(false, Ordering::SeqCst);
        *self.shared.seek_request.lock() = Some(target);
    }

    pub(crate) fn position_ms(&self) -> u64 {
        self.shared.position_ms()
    }

    pub(crate) fn shutdown(&self) {
        log::info!("[engine] shutting down");
        self.shared.playing.store(false, Ordering::SeqCst);
        self.shared.stop.store(true, Ordering::SeqCst);
    }

    fn worker(
        url: SourceUrl,
        shared: Arc<EngineShared>,
        state: HandleStateContainer,
        callback: CallbackSlot,
        config: EngineConfig,
    ) {
        if let Err(e) = Self::run(&url, &shared, &state, &callback, config) {
            if shared.stopped() {
                log::debug!("[engine] error after shutdown ignored: {}", e);
                return;
            }
            log::error!("[engine] playback failed: {}", e);
            shared.playing.store(false, Ordering::SeqCst);
            callback.dispatch(CallbackEvent::Error {
                message: e.to_string(),
            });
        }
        log::info!("[engine] worker finished");
    }

    fn run(
        url: &SourceUrl,
        shared: &Arc<EngineShared>,
        state: &HandleStateContainer,
        callback: &CallbackSlot,
        config: EngineConfig,
    ) -> Result<()> {
        log::info!("[engine] preparing {}", url);
        let source = HttpRangeSource::open(url.as_str(), shared.stop.clone())?;
        if source.total_size().is_none() {
            log::warn!("[engine] server did not report a size, seeking may fail");
        }
        let mut reader = TrackReader::open(
            Box::new(source),
            hint_for_extension(url.extension().as_deref()),
        )?;
        let info = reader.info();

        *shared.duration_ms.lock() = info.duration_ms;

        let output = AudioOutput::open(shared.clone())?;
        let spec = output.spec;
        shared
            .ring
            .resize(spec.sample_rate as usize * spec.channels as usize * config.ring_seconds);
        shared.output_rate.store(spec.sample_rate, Ordering::SeqCst);
        let mut adapter =
            SampleAdapter::new(info.sample_rate, info.channels, spec.sample_rate, spec.channels);

        if shared.stopped() {
            return Ok(());
        }
        state.transition_from(HandleState::Preparing, HandleState::Prepared)?;
        callback.dispatch(CallbackEvent::Prepared {
            duration_ms: info.duration_ms.unwrap_or(0),
        });

        let mut pending: Vec<f32> = Vec::new();
        loop {
            if shared.stopped() {
                log::info!("[engine] stop requested");
                break;
            }

            let seek = shared.seek_request.lock().take();
            if let Some(target_ms) = seek {
                match reader.seek(target_ms) {
                    Ok(landed) => {
                        shared.ring.clear();
                        shared.rebase(landed);
                        pending.clear();
                        adapter.reset();
                        shared.end_of_stream.store(false, Ordering::SeqCst);
                        log::info!("[engine] decoder seek to {} ms (landed {})", target_ms, landed);
                    }
                    Err(e) => log::warn!("[engine] seek to {} ms failed: {}", target_ms, e),
                }
            }

            if !pending.is_empty() {
                let written = shared.ring.push(&pending);
                pending.drain(..written);
                if !pending.is_empty() {
                    thread::sleep(Duration::from_millis(5));
                    continue;
                }
            }

            if shared.end_of_stream.load(Ordering::SeqCst) {
                let playing = shared.playing.load(Ordering::SeqCst);
                if playing && shared.ring.is_empty() && !shared.completed.load(Ordering::SeqCst) {
                    Self::complete(shared, state, callback);
                }
                thread::sleep(Duration::from_millis(10));
                continue;
            }

            // While paused keep prebuffering until the ring is mostly full
            if !shared.playing.load(Ordering::SeqCst)
                && shared.ring.fullness() > config.prebuffer_fullness
            {
                thread::sleep(Duration::from_millis(10));
                continue;
            }

            match reader.next_chunk()? {
                Some(samples) => pending = adapter.process(&samples),
                None => {
                    log::info!("[engine] end of stream");
                    shared.end_of_stream.store(true, Ordering::SeqCst);
                }
            }
        }

        Ok(())
    }

    fn complete(shared: &EngineShared, state: &HandleStateContainer, callback: &CallbackSlot) {
        shared.completed.store(true, Ordering::SeqCst);
        shared.playing.store(false, Ordering::SeqCst);
        if let Some(duration) = *shared.duration_ms.lock() {
            shared.rebase(duration);
        }
        if state
            .transition_from(HandleState::Started, HandleState::Paused)
            .is_err()
        {
            log::debug!("[engine] completion outside Started, state left as is");
        }
        if !shared.stopped() {
            log::info!("[engine] playback completed");
            callback.dispatch(CallbackEvent::PlaybackCompleted);
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_follows_played_frames() {
        let shared = EngineShared::new();
        shared.output_rate.store(48_000, Ordering::SeqCst);
        shared.rebase(10_000);
        shared.played_frames.store(72_000, Ordering::SeqCst);
        assert_eq!(shared.position_ms(), 11_500);
    }

    #[test]
    fn test_position_is_clamped_to_duration() {
        let shared = EngineShared::new();
        shared.output_rate.store(1000, Ordering::SeqCst);
        *shared.duration_ms.lock() = Some(2000);
        shared.rebase(1900);
        shared.played_frames.store(500, Ordering::SeqCst);
        assert_eq!(shared.position_ms(), 2000);
    }

    #[test]
    fn test_position_before_output_opens() {
        let shared = EngineShared::new();
        shared.played_frames.store(500, Ordering::SeqCst);
        assert_eq!(shared.position_ms(), 0);
    }

    #[test]
    fn test_seek_request_is_clamped_and_rebases() {
        let engine = PlaybackEngine {
            shared: Arc::new(EngineShared::new()),
        };
        *engine.shared.duration_ms.lock() = Some(3000);
        engine.shared.completed.store(true, Ordering::SeqCst);

        engine.seek_to(9000);
        assert_eq!(*engine.shared.seek_request.lock(), Some(3000));
        assert_eq!(engine.position_ms(), 3000);
        assert!(!engine.shared.completed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_play_after_completion_rewinds() {
        let engine = PlaybackEngine {
            shared: Arc::new(EngineShared::new()),
        };
        engine.shared.completed.store(true, Ordering::SeqCst);
        engine.shared.rebase(4000);

        engine.play();
        assert_eq!(*engine.shared.seek_request.lock(), Some(0));
        assert!(engine.shared.playing.load(Ordering::SeqCst));
    }
}
