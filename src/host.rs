//! Seams to the host editor. Every call is non-blocking and made while the
//! cat's state lock is held, so implementations must not call back into the cat.

use crate::render::{Frame, RedrawOutcome};
use crate::state::CatState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Receives every state transition (the side panel).
pub trait DisplaySink: Send + Sync {
    fn state_changed(&self, state: CatState);
}

/// Draws the overlay decoration.
pub trait Renderer: Send + Sync {
    fn redraw(&self, frame: &Frame) -> RedrawOutcome;

    /// Drop whatever decoration is currently on screen.
    fn release(&self);
}

/// Rough height of the visible content, if there is anything to measure.
pub trait ViewportProbe: Send + Sync {
    fn viewport_height_estimate(&self) -> Option<f32>;
}

/// User-visible toast messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Clone)]
pub struct Collaborators {
    pub display: Arc<dyn DisplaySink>,
    pub renderer: Arc<dyn Renderer>,
    pub viewport: Arc<dyn ViewportProbe>,
    pub notifier: Arc<dyn Notifier>,
}

/// Estimates height from the active document's line count.
#[derive(Debug)]
pub struct LineCountViewport {
    line_height_px: f32,
    line_count: AtomicUsize,
}

impl LineCountViewport {
    pub fn new(line_height_px: f32) -> Self {
        Self { line_height_px, line_count: AtomicUsize::new(0) }
    }

    /// `None` means no document is open.
    pub fn set_line_count(&self, lines: Option<usize>) {
        self.line_count.store(lines.map_or(0, |n| n.saturating_add(1)), Ordering::Relaxed);
    }
}

impl ViewportProbe for LineCountViewport {
    fn viewport_height_estimate(&self) -> Option<f32> {
        match self.line_count.load(Ordering::Relaxed) {
            0 => None,
            stored => Some((stored - 1) as f32 * self.line_height_px),
        }
    }
}
