// Probing, demuxing and decoding with Symphonia

use earshot_core::{AudioError, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

/// Track information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackInfo {
    pub sample_rate: u32,
    pub channels: u16,
    /// None when the container does not carry a frame count
    pub duration_ms: Option<u64>,
}

/// Build a probe hint from a file extension, assuming MP3 when unknown
pub fn hint_for_extension(extension: Option<&str>) -> Hint {
    let mut hint = Hint::new();
    hint.with_extension(extension.unwrap_or("mp3"));
    hint
}

fn ts_to_ms(time_base: Option<TimeBase>, sample_rate: u32, ts: u64) -> u64 {
    match time_base {
        Some(tb) => {
            let time = tb.calc_time(ts);
            time.seconds * 1000 + (time.frac * 1000.0).round() as u64
        }
        None => ts * 1000 / sample_rate.max(1) as u64,
    }
}

/// Reads and decodes the default track of a media source
pub struct TrackReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: Option<TimeBase>,
    info: TrackInfo,
    sample_buf: Option<SampleBuffer<f32>>,
}

impl TrackReader {
    /// Probe the container and set up a decoder for its default track
    pub fn open(source: Box<dyn MediaSource>, hint: Hint) -> Result<Self> {
        let stream = MediaSourceStream::new(source, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions {
                    enable_gapless: true,
                    ..Default::default()
                },
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::Load(format!("Failed to probe media: {}", e)))?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::Load("No audio track found".to_string()))?;

        let params = &track.codec_params;
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| AudioError::UnsupportedFormat("Sample rate not specified".to_string()))?;
        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(2);
        let duration_ms = params
            .n_frames
            .map(|n| ts_to_ms(params.time_base, sample_rate, n));

        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions::default())
            .map_err(|e| AudioError::Decoding(format!("Failed to create decoder: {}", e)))?;

        let info = TrackInfo {
            sample_rate,
            channels,
            duration_ms,
        };
        log::info!(
            "[decode] track sample_rate={} channels={} duration_ms={:?}",
            info.sample_rate,
            info.channels,
            info.duration_ms
        );

        Ok(Self {
            track_id: track.id,
            time_base: params.time_base,
            format,
            decoder,
            info,
            sample_buf: None,
        })
    }

    pub fn info(&self) -> TrackInfo {
        self.info
    }

    /// Interleaved samples of the next packet of the track; `None` at end
    /// of stream
    pub fn next_chunk(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(AudioError::Decoding(format!("Failed to read packet: {}", e)));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::warn!("[decode] skipping corrupt packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(AudioError::Decoding(format!("Decoding failed: {}", e))),
            };

            let needed = decoded.capacity() * decoded.spec().channels.count();
            let buf = match self.sample_buf.take() {
                Some(buf) if buf.capacity() >= needed => buf,
                _ => SampleBuffer::new(decoded.capacity() as u64, *decoded.spec()),
            };
            let buf = self.sample_buf.insert(buf);
            buf.copy_interleaved_ref(decoded);

            return Ok(Some(buf.samples().to_vec()));
        }
    }

    /// Seek to `position_ms`; returns the position actually reached
    pub fn seek(&mut self, position_ms: u64) -> Result<u64> {
        let time = Time::new(position_ms / 1000, (position_ms % 1000) as f64 / 1000.0);
        let seeked = self
            .format
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time,
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| AudioError::Playback(format!("Seek failed: {}", e)))?;
        self.decoder.reset();
        Ok(ts_to_ms(self.time_base, self.info.sample_rate, seeked.actual_ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RATE: u32 = 8000;

    /// Mono 16-bit PCM WAV with `seconds` of a quiet ramp
    fn wav_bytes(seconds: u32) -> Vec<u8> {
        let frames = RATE * seconds;
        let data_len = frames * 2;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&RATE.to_le_bytes());
        out.extend_from_slice(&(RATE * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for i in 0..frames {
            out.extend_from_slice(&((i % 512) as i16).to_le_bytes());
        }
        out
    }

    fn open_wav(seconds: u32) -> TrackReader {
        TrackReader::open(
            Box::new(Cursor::new(wav_bytes(seconds))),
            hint_for_extension(Some("wav")),
        )
        .unwrap()
    }

    #[test]
    fn test_track_info_from_wav() {
        let reader = open_wav(2);
        assert_eq!(
            reader.info(),
            TrackInfo {
                sample_rate: RATE,
                channels: 1,
                duration_ms: Some(2000),
            }
        );
    }

    #[test]
    fn test_decodes_every_frame() {
        let mut reader = open_wav(1);
        let mut total = 0;
        while let Some(samples) = reader.next_chunk().unwrap() {
            total += samples.len();
        }
        assert_eq!(total, RATE as usize);
    }

    #[test]
    fn test_seek_lands_near_target() {
        let mut reader = open_wav(3);
        let landed = reader.seek(1500).unwrap();
        assert!((1400..=1500).contains(&landed), "landed at {}", landed);

        let mut remaining = 0;
        while let Some(samples) = reader.next_chunk().unwrap() {
            remaining += samples.len();
        }
        assert!((12_000..=12_800).contains(&remaining), "remaining {}", remaining);
    }

    #[test]
    fn test_garbage_fails_to_probe() {
        let result = TrackReader::open(
            Box::new(Cursor::new(vec![0u8; 4096])),
            hint_for_extension(None),
        );
        assert!(matches!(result, Err(AudioError::Load(_))));
    }

    #[test]
    fn test_ts_without_time_base() {
        assert_eq!(ts_to_ms(None, 44_100, 88_200), 2000);
        assert_eq!(ts_to_ms(Some(TimeBase::new(1, 1000)), 44_100, 1234), 1234);
    }
}
