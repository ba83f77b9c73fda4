mod common;

use common::{cat_images, config_with, sleep_ms, Harness};
use flying_cat::{CatState, FlyingCat};
use glam::Vec2;

#[tokio::test(start_paused = true)]
async fn idle_cat_is_drawn_once_then_left_alone() {
    let harness = Harness::new();
    let cat = FlyingCat::start(&config_with(2_000, 5_500), cat_images(), harness.collaborators()).expect("start");

    sleep_ms(1).await;
    assert_eq!(harness.renderer.frame_count(), 1, "initial frame");
    let frame = harness.renderer.last_frame().expect("frame");
    assert_eq!(frame.image.name, "cat-idle.png");
    assert_eq!((frame.x, frame.y), (300, 200));
    assert!(!frame.flip_horizontal, "moving right at start");
    assert!((frame.scale - 1.0).abs() < f32::EPSILON);

    sleep_ms(600).await;
    assert_eq!(harness.renderer.frame_count(), 1, "no redraw without a reason");
    assert!(!cat.snapshot().redraw_pending);
}

#[tokio::test(start_paused = true)]
async fn state_and_context_changes_each_owe_one_redraw() {
    let harness = Harness::new();
    let cat = FlyingCat::start(&config_with(2_000, 5_500), cat_images(), harness.collaborators()).expect("start");
    sleep_ms(1).await;

    cat.on_edit();
    assert!(cat.snapshot().redraw_pending);
    sleep_ms(31).await;
    assert_eq!(harness.renderer.frame_count(), 2);
    assert_eq!(harness.renderer.last_frame().expect("frame").image.name, "cat-impulse.gif");

    cat.on_edit();
    sleep_ms(60).await;
    assert_eq!(harness.renderer.frame_count(), 2, "typing without a state change draws nothing");

    cat.on_context_changed();
    sleep_ms(31).await;
    assert_eq!(harness.renderer.frame_count(), 3);

    sleep_ms(2_000).await;
    assert_eq!(cat.state(), CatState::Idle);
    assert_eq!(harness.renderer.frame_count(), 4);
    assert_eq!(harness.renderer.last_frame().expect("frame").image.name, "cat-idle.png");
}

#[tokio::test(start_paused = true)]
async fn bounce_moves_and_pulses_every_tick() {
    let harness = Harness::new();
    let cat = FlyingCat::start(&config_with(10_000, 310), cat_images(), harness.collaborators()).expect("start");

    cat.on_edit();
    sleep_ms(311).await;
    let entered = cat.snapshot();
    assert_eq!(entered.state, CatState::Bounce);
    assert_eq!(entered.position, Vec2::new(300.0, 200.0), "no motion before bounce");
    assert_eq!(entered.pulse_elapsed_ms, 0);
    let frames_before = harness.renderer.frame_count();

    // Ticks at 330, 360, ..., 600.
    sleep_ms(300).await;
    let moved = cat.snapshot();
    assert_eq!(moved.position, Vec2::new(330.0, 220.0));
    assert_eq!(moved.velocity, Vec2::new(3.0, 2.0), "no bound reached yet");
    assert_eq!(moved.pulse_elapsed_ms, 300);
    assert!(moved.scale > 1.0 && moved.scale < 2.0);
    assert_eq!(harness.renderer.frame_count(), frames_before + 10);

    let frame = harness.renderer.last_frame().expect("frame");
    assert_eq!(frame.image.name, "cat-spin.gif");
    assert_eq!((frame.x, frame.y), (330, 220));
    assert!((frame.scale - moved.scale).abs() < f32::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn missing_display_drops_the_frame_and_clears_the_flag() {
    let harness = Harness::new();
    harness.renderer.set_no_display(true);
    let cat = FlyingCat::start(&config_with(2_000, 5_500), cat_images(), harness.collaborators()).expect("start");

    sleep_ms(1).await;
    assert_eq!(harness.renderer.frame_count(), 1, "one attempt");
    assert!(!cat.snapshot().redraw_pending, "flag cleared even though nothing was drawn");

    sleep_ms(300).await;
    assert_eq!(harness.renderer.frame_count(), 1, "no retry until something changes");

    harness.renderer.set_no_display(false);
    cat.on_context_changed();
    sleep_ms(31).await;
    assert_eq!(harness.renderer.frame_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn leaving_bounce_restores_identity_scale_and_keeps_position() {
    let harness = Harness::new();
    let cat = FlyingCat::start(&config_with(1_000, 100), cat_images(), harness.collaborators()).expect("start");

    cat.on_edit();
    sleep_ms(500).await;
    let bouncing = cat.snapshot();
    assert_eq!(bouncing.state, CatState::Bounce);

    sleep_ms(1_000).await;
    let idle = cat.snapshot();
    assert_eq!(idle.state, CatState::Idle);
    assert!((idle.scale - 1.0).abs() < f32::EPSILON);
    let frame = harness.renderer.last_frame().expect("frame");
    assert_eq!(frame.image.name, "cat-idle.png");
    assert!((frame.scale - 1.0).abs() < f32::EPSILON);
    assert_eq!(frame.x, idle.position.x.round() as i32, "idle cat stays where it stopped");
}
