// cpal output stream fed from the shared sample ring

use crate::engine::EngineShared;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use earshot_core::{AudioError, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Layout of the default output device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutputSpec {
    pub(crate) sample_rate: u32,
    pub(crate) channels: u16,
}

/// Negotiated output: the running stream and its layout
///
/// The stream is not `Send`; it lives on the thread that opened it.
pub(crate) struct AudioOutput {
    _stream: Stream,
    pub(crate) spec: OutputSpec,
}

/// Default output device and its preferred stream config
fn default_output_device() -> Result<(cpal::Device, cpal::SupportedStreamConfig)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Device("no default output device".into()))?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioError::Device(format!("output config failed: {}", e)))?;
    Ok((device, config))
}

impl AudioOutput {
    /// Open and start the default device; silence is produced until the
    /// engine's play flag is set.
    pub(crate) fn open(shared: Arc<EngineShared>) -> Result<Self> {
        let (device, supported) = default_output_device()?;
        let config = supported.config();
        let spec = OutputSpec {
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        };

        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, shared)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, shared)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, shared)?,
            other => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "output sample format {:?}",
                    other
                )))
            }
        };
        stream
            .play()
            .map_err(|e| AudioError::Playback(format!("stream play: {}", e)))?;

        log::info!(
            "[output] stream started rate={} channels={} format={:?}",
            spec.sample_rate,
            spec.channels,
            supported.sample_format()
        );
        Ok(Self {
            _stream: stream,
            spec,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    shared: Arc<EngineShared>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch: Vec<f32> = Vec::new();
    let mut underflows = 0u64;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                let read = if shared.playing.load(Ordering::SeqCst) {
                    let read = shared.ring.pop_into(&mut scratch);
                    if read < data.len() && !shared.end_of_stream.load(Ordering::SeqCst) {
                        underflows += 1;
                        if underflows % 10 == 0 {
                            log::warn!("[output] audio underflow count={}", underflows);
                        }
                    }
                    read
                } else {
                    0
                };
                scratch[read..].fill(0.0);

                for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = T::from_sample(*sample);
                }
                shared
                    .played_frames
                    .fetch_add((read / channels) as u64, Ordering::SeqCst);
            },
            |err| log::error!("[output] stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("build stream: {}", e)))
}
