use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_idle_after_ms")]
    pub idle_after_ms: u64,
    #[serde(default = "TimingConfig::default_promote_after_ms")]
    pub promote_after_ms: u64,
    #[serde(default = "TimingConfig::default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MotionConfig {
    #[serde(default = "MotionConfig::default_size")]
    pub size: f32,
    #[serde(default = "MotionConfig::default_start")]
    pub start: [f32; 2],
    #[serde(default = "MotionConfig::default_velocity")]
    pub velocity: [f32; 2],
    #[serde(default = "MotionConfig::default_min_x")]
    pub min_x: f32,
    #[serde(default = "MotionConfig::default_max_x")]
    pub max_x: f32,
    #[serde(default = "MotionConfig::default_min_y")]
    pub min_y: f32,
    #[serde(default = "MotionConfig::default_bottom_margin")]
    pub bottom_margin: f32,
    #[serde(default = "MotionConfig::default_fallback_viewport_height")]
    pub fallback_viewport_height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PulseConfig {
    #[serde(default = "PulseConfig::default_max_scale")]
    pub max_scale: f32,
    #[serde(default = "PulseConfig::default_period_ms")]
    pub period_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "AssetConfig::default_media_dir")]
    pub media_dir: PathBuf,
    #[serde(default = "AssetConfig::default_idle")]
    pub idle: String,
    #[serde(default = "AssetConfig::default_typing")]
    pub typing: String,
    #[serde(default = "AssetConfig::default_bounce")]
    pub bounce: String,
    #[serde(default = "AssetConfig::default_typing_audio")]
    pub typing_audio: String,
    #[serde(default = "AssetConfig::default_bounce_audio")]
    pub bounce_audio: String,
}

/// Loop window and speed for one audio track. Trim values are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrackConfig {
    #[serde(default)]
    pub trim_start: f32,
    #[serde(default)]
    pub trim_end: f32,
    #[serde(default = "TrackConfig::default_playback_rate")]
    pub playback_rate: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_volume")]
    pub volume: f32,
    #[serde(default = "AudioConfig::default_typing")]
    pub typing: TrackConfig,
    #[serde(default = "AudioConfig::default_bounce")]
    pub bounce: TrackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "ViewportConfig::default_line_height_px")]
    pub line_height_px: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub pulse: PulseConfig,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub media_dir: Option<PathBuf>,
    pub tick_ms: Option<u64>,
    pub idle_after_ms: Option<u64>,
    pub promote_after_ms: Option<u64>,
}

impl TimingConfig {
    const fn default_idle_after_ms() -> u64 {
        2_000
    }

    const fn default_promote_after_ms() -> u64 {
        5_500
    }

    const fn default_tick_ms() -> u64 {
        30
    }

    pub fn idle_after(&self) -> Duration {
        Duration::from_millis(self.idle_after_ms)
    }

    pub fn promote_after(&self) -> Duration {
        Duration::from_millis(self.promote_after_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_after_ms: Self::default_idle_after_ms(),
            promote_after_ms: Self::default_promote_after_ms(),
            tick_ms: Self::default_tick_ms(),
        }
    }
}

impl MotionConfig {
    const fn default_size() -> f32 {
        80.0
    }

    const fn default_start() -> [f32; 2] {
        [300.0, 200.0]
    }

    const fn default_velocity() -> [f32; 2] {
        [3.0, 2.0]
    }

    const fn default_min_x() -> f32 {
        20.0
    }

    const fn default_max_x() -> f32 {
        1200.0
    }

    const fn default_min_y() -> f32 {
        20.0
    }

    const fn default_bottom_margin() -> f32 {
        20.0
    }

    const fn default_fallback_viewport_height() -> f32 {
        700.0
    }

    pub fn start_position(&self) -> Vec2 {
        Vec2::from(self.start)
    }

    pub fn start_velocity(&self) -> Vec2 {
        Vec2::from(self.velocity)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            start: Self::default_start(),
            velocity: Self::default_velocity(),
            min_x: Self::default_min_x(),
            max_x: Self::default_max_x(),
            min_y: Self::default_min_y(),
            bottom_margin: Self::default_bottom_margin(),
            fallback_viewport_height: Self::default_fallback_viewport_height(),
        }
    }
}

impl PulseConfig {
    const fn default_max_scale() -> f32 {
        2.0
    }

    const fn default_period_ms() -> u64 {
        8_000
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self { max_scale: Self::default_max_scale(), period_ms: Self::default_period_ms() }
    }
}

impl AssetConfig {
    fn default_media_dir() -> PathBuf {
        PathBuf::from("media")
    }

    fn default_idle() -> String {
        "cat-idle.png".to_string()
    }

    fn default_typing() -> String {
        "cat-impulse.gif".to_string()
    }

    fn default_bounce() -> String {
        "cat-spin.gif".to_string()
    }

    fn default_typing_audio() -> String {
        "oiiai.mp3".to_string()
    }

    fn default_bounce_audio() -> String {
        "oiiaoiia.mp3".to_string()
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            media_dir: Self::default_media_dir(),
            idle: Self::default_idle(),
            typing: Self::default_typing(),
            bounce: Self::default_bounce(),
            typing_audio: Self::default_typing_audio(),
            bounce_audio: Self::default_bounce_audio(),
        }
    }
}

impl TrackConfig {
    const fn default_playback_rate() -> f32 {
        1.0
    }
}

impl AudioConfig {
    const fn default_volume() -> f32 {
        0.5
    }

    const fn default_typing() -> TrackConfig {
        TrackConfig { trim_start: 0.15, trim_end: 0.25, playback_rate: 1.25 }
    }

    const fn default_bounce() -> TrackConfig {
        TrackConfig { trim_start: 0.0, trim_end: 0.0, playback_rate: 1.0 }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { volume: Self::default_volume(), typing: Self::default_typing(), bounce: Self::default_bounce() }
    }
}

impl ViewportConfig {
    const fn default_line_height_px() -> f32 {
        18.0
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { line_height_px: Self::default_line_height_px() }
    }
}

impl CatConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: CatConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        cfg.validate().with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.timing.idle_after_ms == 0 || self.timing.promote_after_ms == 0 || self.timing.tick_ms == 0 {
            bail!("timing values must be greater than zero");
        }
        if self.pulse.period_ms == 0 {
            bail!("pulse.period_ms must be greater than zero");
        }
        if self.pulse.max_scale.is_nan() || self.pulse.max_scale < 1.0 {
            bail!("pulse.max_scale must be at least 1.0 (got {})", self.pulse.max_scale);
        }
        if self.motion.min_x >= self.motion.max_x {
            bail!("motion.min_x ({}) must be below motion.max_x ({})", self.motion.min_x, self.motion.max_x);
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            bail!("audio.volume must be within 0.0..=1.0 (got {})", self.audio.volume);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.media_dir {
            self.assets.media_dir = dir.clone();
        }
        if let Some(tick_ms) = overrides.tick_ms {
            self.timing.tick_ms = tick_ms;
        }
        if let Some(idle) = overrides.idle_after_ms {
            self.timing.idle_after_ms = idle;
        }
        if let Some(promote) = overrides.promote_after_ms {
            self.timing.promote_after_ms = promote;
        }
    }
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.media_dir.is_none()
            && self.tick_ms.is_none()
            && self.idle_after_ms.is_none()
            && self.promote_after_ms.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.media_dir.is_some() {
            fields.push("media");
        }
        if self.tick_ms.is_some() {
            fields.push("tick-ms");
        }
        if self.idle_after_ms.is_some() {
            fields.push("idle-ms");
        }
        if self.promote_after_ms.is_some() {
            fields.push("promote-ms");
        }
        fields
    }
}
