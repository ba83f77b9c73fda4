use crate::audio::{AudioBackend, AudioDirector};
use crate::config::{AssetConfig, AudioConfig};
use crate::host::DisplaySink;
use crate::state::CatState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMessage {
    SetState(CatState),
    /// Volume slider position, 0..=100.
    SetVolume(u8),
}

/// Sending half handed to the cat as its display sink.
#[derive(Debug, Clone)]
pub struct PanelChannel {
    tx: UnboundedSender<PanelMessage>,
}

impl PanelChannel {
    pub fn open() -> (Self, UnboundedReceiver<PanelMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, message: PanelMessage) {
        if self.tx.send(message).is_err() {
            log::debug!("panel closed; dropping {message:?}");
        }
    }
}

impl DisplaySink for PanelChannel {
    fn state_changed(&self, state: CatState) {
        self.send(PanelMessage::SetState(state));
    }
}

/// The side panel: mirrors the cat's state and keeps the audio in step with it.
pub struct PanelView<B> {
    state: CatState,
    images: AssetConfig,
    audio: AudioDirector<B>,
}

impl<B: AudioBackend> PanelView<B> {
    pub fn new(backend: B, images: &AssetConfig, audio: &AudioConfig) -> Self {
        Self { state: CatState::Idle, images: images.clone(), audio: AudioDirector::new(backend, audio) }
    }

    pub fn state(&self) -> CatState {
        self.state
    }

    pub fn status_label(&self) -> &'static str {
        self.state.label()
    }

    /// Highlighted border while the cat is doing anything.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn current_image(&self) -> &str {
        match self.state {
            CatState::Idle => &self.images.idle,
            CatState::Typing => &self.images.typing,
            CatState::Bounce => &self.images.bounce,
        }
    }

    pub fn audio(&self) -> &AudioDirector<B> {
        &self.audio
    }

    /// User gesture in the panel (click / enable button).
    pub fn unlock_audio(&mut self) -> bool {
        match self.audio.unlock() {
            Ok(()) => true,
            Err(err) => {
                log::warn!("audio stays locked: {err:#}");
                false
            }
        }
    }

    /// Returns whether the displayed state changed.
    pub fn handle(&mut self, message: PanelMessage) -> bool {
        match message {
            PanelMessage::SetState(state) => {
                if state == self.state {
                    return false;
                }
                self.state = state;
                self.audio.apply(state);
                true
            }
            PanelMessage::SetVolume(percent) => {
                self.audio.set_volume_percent(percent);
                false
            }
        }
    }

    /// Drains messages until every sender is gone. Blocks; run it on its own thread.
    pub fn run_blocking(&mut self, mut rx: UnboundedReceiver<PanelMessage>, mut on_change: impl FnMut(&Self)) {
        while let Some(message) = rx.blocking_recv() {
            if self.handle(message) {
                on_change(self);
            }
        }
    }
}
