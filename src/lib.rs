pub mod activity;
pub mod assets;
pub mod audio;
pub mod cli;
pub mod config;
pub mod flying_cat;
pub mod host;
pub mod motion;
pub mod panel;
pub mod render;
pub mod state;
pub mod switch;

pub use flying_cat::{CatSnapshot, FlyingCat};
pub use state::CatState;
pub use switch::{CatSwitch, Toggled};
