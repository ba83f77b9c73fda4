use super::{loop_window, pcm_duration, AudioBackend, Track};
use crate::assets::AssetSource;
use crate::config::{AssetConfig, TrackConfig};
use anyhow::{bail, Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Plays the two tracks through the default output device. Not `Send`: build it
/// on the thread that plays.
pub struct RodioBackend {
    typing: Arc<[u8]>,
    bounce: Arc<[u8]>,
    output: Option<(OutputStream, OutputStreamHandle)>,
    sinks: HashMap<Track, Sink>,
    decoded: HashMap<Track, DecodedTrack>,
}

/// PCM kept in memory so the loop window can be measured; compressed decoders
/// do not report their length.
struct DecodedTrack {
    channels: u16,
    sample_rate: u32,
    samples: Vec<i16>,
}

impl DecodedTrack {
    fn decode(bytes: Arc<[u8]>) -> Result<Self> {
        let decoder = Decoder::new(Cursor::new(bytes))?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();
        Ok(Self { channels, sample_rate, samples })
    }

    fn duration(&self) -> Duration {
        pcm_duration(self.samples.len(), self.channels, self.sample_rate)
    }

    fn buffer(&self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.clone())
    }
}

impl RodioBackend {
    pub fn new(typing: Vec<u8>, bounce: Vec<u8>) -> Self {
        Self { typing: typing.into(), bounce: bounce.into(), output: None, sinks: HashMap::new(), decoded: HashMap::new() }
    }

    pub fn from_assets(source: &dyn AssetSource, names: &AssetConfig) -> Result<Self> {
        let typing = source
            .load_bytes(&names.typing_audio)
            .with_context(|| format!("Failed to load audio '{}'", names.typing_audio))?;
        let bounce = source
            .load_bytes(&names.bounce_audio)
            .with_context(|| format!("Failed to load audio '{}'", names.bounce_audio))?;
        Ok(Self::new(typing, bounce))
    }
}

impl AudioBackend for RodioBackend {
    fn unlock(&mut self) -> Result<()> {
        if self.output.is_none() {
            self.output = Some(OutputStream::try_default().context("No audio output device")?);
        }
        Ok(())
    }

    fn play_looped(&mut self, track: Track, settings: &TrackConfig, volume: f32) -> Result<()> {
        let Some((_, handle)) = &self.output else {
            bail!("audio output is locked");
        };
        if !self.decoded.contains_key(&track) {
            let bytes = match track {
                Track::Typing => Arc::clone(&self.typing),
                Track::Bounce => Arc::clone(&self.bounce),
            };
            let decoded = DecodedTrack::decode(bytes).with_context(|| format!("Failed to decode {track:?} track"))?;
            log::debug!("decoded {track:?} track: {:?}", decoded.duration());
            self.decoded.insert(track, decoded);
        }
        let Some(decoded) = self.decoded.get(&track) else {
            bail!("{track:?} track is not decoded");
        };
        let (start, window) = loop_window(decoded.duration(), settings);
        let rate = if settings.playback_rate > 0.0 { settings.playback_rate } else { 1.0 };

        let sink = Sink::try_new(handle).context("Failed to open audio sink")?;
        sink.set_volume(volume);
        let trimmed = decoded.buffer().skip_duration(start);
        match window {
            Some(window) => sink.append(trimmed.take_duration(window).speed(rate).repeat_infinite()),
            // Trims cover the whole track: loop everything after the start.
            None => sink.append(trimmed.speed(rate).repeat_infinite()),
        }
        // Replacing the previous sink drops it, which stops it.
        self.sinks.insert(track, sink);
        Ok(())
    }

    fn stop(&mut self, track: Track) {
        if let Some(sink) = self.sinks.remove(&track) {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        for sink in self.sinks.values() {
            sink.set_volume(volume);
        }
    }
}
