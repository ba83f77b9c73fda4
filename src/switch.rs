use crate::assets::{AssetSource, CatImages};
use crate::config::CatConfig;
use crate::flying_cat::FlyingCat;
use crate::host::Collaborators;
use anyhow::Result;
use std::sync::Arc;

pub const ENABLED_MESSAGE: &str = "The cat took off!";
pub const DISABLED_MESSAGE: &str = "The cat flew away!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Enabled,
    Disabled,
}

/// Owns the feature's lifecycle: at most one cat, created on enable and torn down on disable.
pub struct CatSwitch {
    config: CatConfig,
    assets: Arc<dyn AssetSource>,
    collaborators: Collaborators,
    cat: Option<FlyingCat>,
}

impl CatSwitch {
    pub fn new(config: CatConfig, assets: Arc<dyn AssetSource>, collaborators: Collaborators) -> Self {
        Self { config, assets, collaborators, cat: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.cat.is_some()
    }

    pub fn cat(&self) -> Option<&FlyingCat> {
        self.cat.as_ref()
    }

    /// Flips the feature. Enabling loads every image up front; if any is
    /// missing the error is returned and the feature stays off.
    pub fn toggle(&mut self) -> Result<Toggled> {
        if let Some(cat) = self.cat.take() {
            cat.dispose();
            self.collaborators.notifier.notify(DISABLED_MESSAGE);
            return Ok(Toggled::Disabled);
        }
        let images = CatImages::load(self.assets.as_ref(), &self.config.assets)?;
        let cat = FlyingCat::start(&self.config, images, self.collaborators.clone())?;
        self.cat = Some(cat);
        self.collaborators.notifier.notify(ENABLED_MESSAGE);
        Ok(Toggled::Enabled)
    }

    pub fn on_edit(&self) {
        if let Some(cat) = &self.cat {
            cat.on_edit();
        }
    }

    pub fn on_context_changed(&self) {
        if let Some(cat) = &self.cat {
            cat.on_context_changed();
        }
    }

    /// Host is going away. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if let Some(cat) = self.cat.take() {
            cat.dispose();
        }
    }
}

impl Drop for CatSwitch {
    fn drop(&mut self) {
        self.shutdown();
    }
}
