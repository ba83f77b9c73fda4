//! Audio that follows the cat: a trimmed loop while typing, another while bouncing, silence when idle.

use crate::config::{AudioConfig, TrackConfig};
use crate::state::CatState;
use anyhow::Result;
use std::time::Duration;

#[cfg(feature = "audio")]
mod rodio_backend;
#[cfg(feature = "audio")]
pub use rodio_backend::RodioBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Typing,
    Bounce,
}

pub trait AudioBackend {
    /// Opens the output. May fail until the user has interacted with the panel.
    fn unlock(&mut self) -> Result<()>;

    /// Starts `track` from its trim start, looping within its trim window.
    fn play_looped(&mut self, track: Track, settings: &TrackConfig, volume: f32) -> Result<()>;

    /// Stops `track` and rewinds it.
    fn stop(&mut self, track: Track);

    fn set_volume(&mut self, volume: f32);
}

/// Playback window for a decoded track of length `total`: the start offset and,
/// when the trims leave something to play, how long to play before looping.
/// `None` loops everything after the start.
pub fn loop_window(total: Duration, settings: &TrackConfig) -> (Duration, Option<Duration>) {
    let start = Duration::from_secs_f32(settings.trim_start.max(0.0));
    let end = Duration::from_secs_f32(settings.trim_end.max(0.0));
    let window = total.checked_sub(start).and_then(|rest| rest.checked_sub(end)).filter(|window| !window.is_zero());
    (start, window)
}

/// Length of interleaved PCM audio.
pub fn pcm_duration(samples: usize, channels: u16, sample_rate: u32) -> Duration {
    if channels == 0 || sample_rate == 0 {
        return Duration::ZERO;
    }
    let frames = samples as u64 / u64::from(channels);
    Duration::from_secs(frames / u64::from(sample_rate))
        + Duration::from_nanos((frames % u64::from(sample_rate)) * 1_000_000_000 / u64::from(sample_rate))
}

/// Backend for hosts without sound output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl AudioBackend for SilentBackend {
    fn unlock(&mut self) -> Result<()> {
        Ok(())
    }

    fn play_looped(&mut self, _track: Track, _settings: &TrackConfig, _volume: f32) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self, _track: Track) {}

    fn set_volume(&mut self, _volume: f32) {}
}

pub struct AudioDirector<B> {
    backend: B,
    typing: TrackConfig,
    bounce: TrackConfig,
    volume: f32,
    unlocked: bool,
    state: CatState,
    playing: Option<Track>,
}

impl<B: AudioBackend> AudioDirector<B> {
    pub fn new(backend: B, config: &AudioConfig) -> Self {
        Self {
            backend,
            typing: config.typing,
            bounce: config.bounce,
            volume: config.volume.clamp(0.0, 1.0),
            unlocked: false,
            state: CatState::Idle,
            playing: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn playing(&self) -> Option<Track> {
        self.playing
    }

    /// True while the panel should offer an "enable audio" prompt.
    pub fn needs_unlock(&self) -> bool {
        !self.unlocked
    }

    /// Opens the output and catches up with the current state.
    pub fn unlock(&mut self) -> Result<()> {
        if let Err(err) = self.backend.unlock() {
            self.unlocked = false;
            return Err(err);
        }
        self.unlocked = true;
        self.backend.set_volume(self.volume);
        self.apply_current();
        Ok(())
    }

    pub fn set_volume_percent(&mut self, percent: u8) {
        self.volume = f32::from(percent.min(100)) / 100.0;
        self.backend.set_volume(self.volume);
    }

    pub fn apply(&mut self, state: CatState) {
        self.state = state;
        self.apply_current();
    }

    fn apply_current(&mut self) {
        match self.state {
            CatState::Idle => {
                self.backend.stop(Track::Typing);
                self.backend.stop(Track::Bounce);
                self.playing = None;
            }
            CatState::Typing => self.switch_to(Track::Typing),
            CatState::Bounce => self.switch_to(Track::Bounce),
        }
    }

    fn switch_to(&mut self, track: Track) {
        if !self.unlocked {
            log::debug!("audio locked; deferring {track:?}");
            return;
        }
        let (other, settings) = match track {
            Track::Typing => (Track::Bounce, self.typing),
            Track::Bounce => (Track::Typing, self.bounce),
        };
        self.backend.stop(other);
        match self.backend.play_looped(track, &settings, self.volume) {
            Ok(()) => self.playing = Some(track),
            Err(err) => {
                log::warn!("failed to play {track:?} track: {err:#}");
                self.playing = None;
            }
        }
    }
}
