use crate::config::AssetConfig;
use crate::state::CatState;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An image ready to embed in a decoration: validated, measured and encoded as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub name: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub data_uri: String,
}

impl ImageAsset {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .with_context(|| format!("Failed to sniff image format of '{name}'"))?;
        let format = reader.format();
        let (width, height) =
            reader.into_dimensions().with_context(|| format!("Asset '{name}' is not a decodable image"))?;
        let mime = mime_for(name, format);
        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        Ok(Self { name: name.to_string(), mime, width, height, data_uri })
    }
}

fn mime_for(name: &str, format: Option<ImageFormat>) -> String {
    match format {
        Some(ImageFormat::Png) => return "image/png".to_string(),
        Some(ImageFormat::Gif) => return "image/gif".to_string(),
        _ => {}
    }
    let ext = Path::new(name).extension().and_then(|ext| ext.to_str()).unwrap_or("octet-stream");
    format!("image/{}", ext.to_ascii_lowercase())
}

/// Where the cat's media comes from.
pub trait AssetSource: Send + Sync {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>>;

    fn load_asset(&self, name: &str) -> Result<ImageAsset> {
        let bytes = self.load_bytes(name)?;
        ImageAsset::from_bytes(name, &bytes)
    }
}

#[derive(Debug, Clone)]
pub struct MediaDir {
    root: PathBuf,
}

impl MediaDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for MediaDir {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        fs::read(&path).with_context(|| format!("Failed to read media file {}", path.display()))
    }
}

/// The three sprites, one per state. Loaded together or not at all.
#[derive(Debug, Clone)]
pub struct CatImages {
    pub idle: Arc<ImageAsset>,
    pub typing: Arc<ImageAsset>,
    pub bounce: Arc<ImageAsset>,
}

impl CatImages {
    pub fn load(source: &dyn AssetSource, names: &AssetConfig) -> Result<Self> {
        let load = |name: &str| -> Result<Arc<ImageAsset>> {
            source.load_asset(name).map(Arc::new).with_context(|| format!("Failed to load cat image '{name}'"))
        };
        Ok(Self {
            idle: load(names.idle.as_str())?,
            typing: load(names.typing.as_str())?,
            bounce: load(names.bounce.as_str())?,
        })
    }

    pub fn for_state(&self, state: CatState) -> &Arc<ImageAsset> {
        match state {
            CatState::Idle => &self.idle,
            CatState::Typing => &self.typing,
            CatState::Bounce => &self.bounce,
        }
    }
}
