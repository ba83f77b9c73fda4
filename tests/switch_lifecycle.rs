mod common;

use common::{encode, sleep_ms, Harness, MemoryAssets};
use flying_cat::assets::{AssetSource, CatImages, MediaDir};
use flying_cat::config::{AssetConfig, CatConfig};
use flying_cat::switch::{DISABLED_MESSAGE, ENABLED_MESSAGE};
use flying_cat::{CatState, CatSwitch, Toggled};
use image::ImageFormat;
use std::fs;
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn toggle_is_a_pure_flip() {
    let harness = Harness::new();
    let mut switch = CatSwitch::new(
        CatConfig::default(),
        Arc::new(MemoryAssets::with_cat_images()),
        harness.collaborators(),
    );
    assert!(!switch.is_enabled());

    assert_eq!(switch.toggle().expect("enable"), Toggled::Enabled);
    assert!(switch.is_enabled());
    switch.on_edit();
    assert_eq!(switch.cat().expect("cat").state(), CatState::Typing);

    assert_eq!(switch.toggle().expect("disable"), Toggled::Disabled);
    assert!(!switch.is_enabled());
    assert_eq!(harness.renderer.releases(), 1);
    assert_eq!(harness.display.states(), vec![CatState::Typing, CatState::Idle]);

    // Edits while disabled go nowhere.
    switch.on_edit();
    sleep_ms(10_000).await;
    assert_eq!(harness.display.states(), vec![CatState::Typing, CatState::Idle]);

    assert_eq!(switch.toggle().expect("enable again"), Toggled::Enabled);
    assert_eq!(switch.cat().expect("fresh cat").state(), CatState::Idle);
    assert_eq!(
        harness.notifier.messages(),
        vec![ENABLED_MESSAGE.to_string(), DISABLED_MESSAGE.to_string(), ENABLED_MESSAGE.to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn missing_image_keeps_the_feature_off() {
    let harness = Harness::new();
    let mut assets = MemoryAssets::with_cat_images();
    assets.remove("cat-spin.gif");
    let mut switch = CatSwitch::new(CatConfig::default(), Arc::new(assets), harness.collaborators());

    let err = switch.toggle().expect_err("bounce image is missing");
    assert!(format!("{err:#}").contains("cat-spin.gif"), "error names the asset: {err:#}");
    assert!(!switch.is_enabled());
    assert!(harness.notifier.messages().is_empty());
    assert!(harness.display.states().is_empty());
    assert_eq!(harness.renderer.frame_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_tick_is_rejected_before_anything_runs() {
    let harness = Harness::new();
    let mut config = CatConfig::default();
    config.timing.tick_ms = 0;
    let mut switch = CatSwitch::new(config, Arc::new(MemoryAssets::with_cat_images()), harness.collaborators());

    let err = switch.toggle().expect_err("zero tick is invalid");
    assert!(format!("{err:#}").contains("greater than zero"), "unexpected error: {err:#}");
    assert!(!switch.is_enabled());
    sleep_ms(500).await;
    assert_eq!(harness.renderer.frame_count(), 0);
    assert!(harness.notifier.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_idempotent() {
    let harness = Harness::new();
    let mut switch = CatSwitch::new(
        CatConfig::default(),
        Arc::new(MemoryAssets::with_cat_images()),
        harness.collaborators(),
    );
    switch.toggle().expect("enable");
    switch.shutdown();
    switch.shutdown();
    drop(switch);
    assert_eq!(harness.renderer.releases(), 1);
    assert_eq!(harness.display.states(), vec![CatState::Idle]);
}

#[test]
fn enabling_outside_a_runtime_fails_instead_of_panicking() {
    let harness = Harness::new();
    let mut switch = CatSwitch::new(
        CatConfig::default(),
        Arc::new(MemoryAssets::with_cat_images()),
        harness.collaborators(),
    );
    let err = switch.toggle().expect_err("no runtime");
    assert!(err.to_string().contains("tokio runtime"));
    assert!(!switch.is_enabled());
}

#[test]
fn media_dir_loads_and_embeds_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    let names = AssetConfig::default();
    fs::write(dir.path().join(&names.idle), encode(ImageFormat::Png, 12, 10)).expect("write idle");
    fs::write(dir.path().join(&names.typing), encode(ImageFormat::Gif, 6, 6)).expect("write typing");
    fs::write(dir.path().join(&names.bounce), encode(ImageFormat::Gif, 6, 6)).expect("write bounce");

    let media = MediaDir::new(dir.path());
    let images = CatImages::load(&media, &names).expect("load from media dir");
    assert_eq!(images.idle.mime, "image/png");
    assert_eq!((images.idle.width, images.idle.height), (12, 10));
    assert!(images.idle.data_uri.starts_with("data:image/png;base64,iVBOR"));
    assert_eq!(images.for_state(CatState::Bounce).mime, "image/gif");
    assert!(images.typing.data_uri.starts_with("data:image/gif;base64,"));
}

#[test]
fn media_dir_reports_missing_and_corrupt_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let media = MediaDir::new(dir.path());
    let err = media.load_asset("cat-idle.png").expect_err("missing");
    assert!(format!("{err:#}").contains("cat-idle.png"));

    fs::write(dir.path().join("cat-idle.png"), b"not an image").expect("write junk");
    assert!(media.load_asset("cat-idle.png").is_err());
}
