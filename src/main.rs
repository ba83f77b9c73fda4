use anyhow::{anyhow, Result};
use flying_cat::assets::MediaDir;
use flying_cat::audio::{AudioBackend, SilentBackend};
use flying_cat::cli::CliOverrides;
use flying_cat::config::{AssetConfig, AudioConfig, CatConfig};
use flying_cat::host::{Collaborators, LineCountViewport, Notifier, Renderer};
use flying_cat::panel::{PanelChannel, PanelMessage, PanelView};
use flying_cat::render::{Frame, RedrawOutcome};
use flying_cat::{CatSwitch, Toggled};
use std::sync::Arc;
use std::thread;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints frames instead of decorating an editor.
struct TerminalRenderer {
    size: f32,
}

impl Renderer for TerminalRenderer {
    fn redraw(&self, frame: &Frame) -> RedrawOutcome {
        log::info!("[cat] {} at ({}, {}) transform='{}'", frame.image.name, frame.x, frame.y, frame.transform_css());
        log::trace!("[cat] decoration css: {}", frame.decoration_css(self.size));
        RedrawOutcome::Drawn
    }

    fn release(&self) {
        log::info!("[cat] decoration released");
    }
}

struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    let mut config = CatConfig::load_or_default(cli.config_path());
    let overrides = cli.into_config_overrides();
    if !overrides.is_empty() {
        log::info!("CLI overrides applied: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }
    if let Err(err) = config.validate() {
        eprintln!("[config] {err:#}");
        std::process::exit(2);
    }
    if let Err(err) = run(config).await {
        eprintln!("Application error: {err:?}");
        std::process::exit(1);
    }
}

async fn run(config: CatConfig) -> Result<()> {
    let media = Arc::new(MediaDir::new(&config.assets.media_dir));
    let (panel, panel_rx) = PanelChannel::open();
    panel.send(PanelMessage::SetVolume((config.audio.volume * 100.0).round() as u8));
    let panel_thread = spawn_panel(panel_rx, config.assets.clone(), config.audio.clone(), Arc::clone(&media));

    let viewport = Arc::new(LineCountViewport::new(config.viewport.line_height_px));
    let collaborators = Collaborators {
        display: Arc::new(panel),
        renderer: Arc::new(TerminalRenderer { size: config.motion.size }),
        viewport: viewport.clone(),
        notifier: Arc::new(TerminalNotifier),
    };
    let mut switch = CatSwitch::new(config, media, collaborators);
    report_toggle(switch.toggle());

    println!("Type to make the cat fly. Commands: toggle, ctx, quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_count = 0usize;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "quit" => break,
            "toggle" => report_toggle(switch.toggle()),
            "ctx" => switch.on_context_changed(),
            _ => {
                line_count += 1;
                viewport.set_line_count(Some(line_count));
                switch.on_edit();
            }
        }
    }

    switch.shutdown();
    // Dropping the switch drops the last panel sender, which ends the panel thread.
    drop(switch);
    panel_thread.join().map_err(|_| anyhow!("panel thread panicked"))
}

fn report_toggle(result: Result<Toggled>) {
    match result {
        Ok(toggled) => log::info!("flying cat {toggled:?}"),
        Err(err) => eprintln!("[cat] could not start: {err:#}"),
    }
}

#[cfg_attr(not(feature = "audio"), allow(unused_variables))]
fn spawn_panel(
    rx: UnboundedReceiver<PanelMessage>,
    images: AssetConfig,
    audio: AudioConfig,
    media: Arc<MediaDir>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        #[cfg(feature = "audio")]
        match flying_cat::audio::RodioBackend::from_assets(media.as_ref(), &images) {
            Ok(backend) => return run_panel(backend, rx, &images, &audio),
            Err(err) => log::warn!("audio disabled: {err:#}"),
        }
        run_panel(SilentBackend, rx, &images, &audio);
    })
}

fn run_panel<B: AudioBackend>(
    backend: B,
    rx: UnboundedReceiver<PanelMessage>,
    images: &AssetConfig,
    audio: &AudioConfig,
) {
    let mut view = PanelView::new(backend, images, audio);
    view.unlock_audio();
    view.run_blocking(rx, |view| println!("[panel] {} ({})", view.status_label(), view.current_image()));
}
