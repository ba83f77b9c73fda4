use crate::assets::ImageAsset;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    /// Why the on-screen frame is stale. Empty means nothing is owed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RedrawReasons: u8 {
        const INITIAL = 1 << 0;
        const STATE = 1 << 1;
        const CONTEXT = 1 << 2;
        const MOTION = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    Drawn,
    /// No editor to draw into; the frame is dropped.
    NoDisplay,
}

/// Everything the renderer needs to place the cat for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: Arc<ImageAsset>,
    pub flip_horizontal: bool,
    pub scale: f32,
    pub x: i32,
    pub y: i32,
}

impl Frame {
    pub fn is_identity_scale(&self) -> bool {
        (self.scale - 1.0).abs() <= f32::EPSILON
    }

    pub fn transform_css(&self) -> String {
        let mut transform = String::new();
        if self.flip_horizontal {
            transform.push_str(" scaleX(-1)");
        }
        if !self.is_identity_scale() {
            transform.push_str(&format!(" scale({:.3})", self.scale));
        }
        transform
    }

    /// Inline style for a fixed-position overlay decoration.
    pub fn decoration_css(&self, size: f32) -> String {
        let size = size.round() as i32;
        [
            "font-size: 0 !important;".to_string(),
            "letter-spacing: -9999px !important;".to_string(),
            "position: fixed !important;".to_string(),
            format!("top: {}px !important;", self.y),
            format!("left: {}px !important;", self.x),
            "z-index: 2147483647 !important;".to_string(),
            "pointer-events: none !important;".to_string(),
            format!("width: {size}px !important;"),
            format!("height: {size}px !important;"),
            "display: inline-block !important;".to_string(),
            format!("background-image: url(\"{}\") !important;", self.image.data_uri),
            "background-size: contain !important;".to_string(),
            "background-repeat: no-repeat !important;".to_string(),
            "background-position: center !important;".to_string(),
            format!("transform:{};", self.transform_css()),
            "filter: drop-shadow(0 4px 12px rgba(0,0,0,0.5));".to_string(),
        ]
        .join(" ")
    }
}
