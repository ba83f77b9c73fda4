#![allow(dead_code)]

use anyhow::{anyhow, Result};
use flying_cat::assets::{AssetSource, CatImages};
use flying_cat::config::{AssetConfig, CatConfig};
use flying_cat::host::{Collaborators, DisplaySink, Notifier, Renderer, ViewportProbe};
use flying_cat::render::{Frame, RedrawOutcome};
use flying_cat::CatState;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct RecordingDisplay {
    states: Mutex<Vec<CatState>>,
}

impl RecordingDisplay {
    pub fn states(&self) -> Vec<CatState> {
        self.states.lock().unwrap().clone()
    }

    pub fn count(&self, state: CatState) -> usize {
        self.states().into_iter().filter(|s| *s == state).count()
    }
}

impl DisplaySink for RecordingDisplay {
    fn state_changed(&self, state: CatState) {
        self.states.lock().unwrap().push(state);
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<Frame>>,
    releases: AtomicUsize,
    no_display: AtomicBool,
}

impl RecordingRenderer {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn set_no_display(&self, value: bool) {
        self.no_display.store(value, Ordering::SeqCst);
    }
}

impl Renderer for RecordingRenderer {
    fn redraw(&self, frame: &Frame) -> RedrawOutcome {
        self.frames.lock().unwrap().push(frame.clone());
        if self.no_display.load(Ordering::SeqCst) {
            RedrawOutcome::NoDisplay
        } else {
            RedrawOutcome::Drawn
        }
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FixedViewport(pub Option<f32>);

impl ViewportProbe for FixedViewport {
    fn viewport_height_estimate(&self) -> Option<f32> {
        self.0
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub struct Harness {
    pub display: Arc<RecordingDisplay>,
    pub renderer: Arc<RecordingRenderer>,
    pub notifier: Arc<RecordingNotifier>,
    pub viewport: Option<f32>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            display: Arc::new(RecordingDisplay::default()),
            renderer: Arc::new(RecordingRenderer::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            viewport: None,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            display: self.display.clone(),
            renderer: self.renderer.clone(),
            viewport: Arc::new(FixedViewport(self.viewport)),
            notifier: self.notifier.clone(),
        }
    }
}

pub fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255])));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).expect("encode test image");
    bytes
}

/// In-memory media keyed by file name.
#[derive(Default)]
pub struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn with_cat_images() -> Self {
        let names = AssetConfig::default();
        let mut assets = Self::default();
        assets.insert(&names.idle, encode(ImageFormat::Png, 8, 8));
        assets.insert(&names.typing, encode(ImageFormat::Gif, 8, 8));
        assets.insert(&names.bounce, encode(ImageFormat::Gif, 8, 8));
        assets
    }

    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) {
        self.files.insert(name.to_string(), bytes);
    }

    pub fn remove(&mut self, name: &str) {
        self.files.remove(name);
    }
}

impl AssetSource for MemoryAssets {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| anyhow!("no such asset '{name}'"))
    }
}

pub fn cat_images() -> CatImages {
    CatImages::load(&MemoryAssets::with_cat_images(), &AssetConfig::default()).expect("load cat images")
}

pub fn config_with(idle_ms: u64, promote_ms: u64) -> CatConfig {
    let mut config = CatConfig::default();
    config.timing.idle_after_ms = idle_ms;
    config.timing.promote_after_ms = promote_ms;
    config
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
