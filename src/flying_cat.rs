use crate::activity::{ActivityMachine, EditOutcome};
use crate::assets::CatImages;
use crate::config::CatConfig;
use crate::host::Collaborators;
use crate::motion::Motion;
use crate::render::{Frame, RedrawOutcome, RedrawReasons};
use crate::state::CatState;
use anyhow::{Context, Result};
use glam::Vec2;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Point-in-time copy of the cat's mutable fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatSnapshot {
    pub state: CatState,
    pub position: Vec2,
    pub velocity: Vec2,
    pub scale: f32,
    pub pulse_elapsed_ms: u64,
    pub redraw_pending: bool,
}

struct Core {
    machine: ActivityMachine,
    motion: Motion,
    images: CatImages,
    dirty: RedrawReasons,
    idle_timer: Option<JoinHandle<()>>,
    idle_generation: u64,
    promotion_timer: Option<JoinHandle<()>>,
    promotion_generation: u64,
    ticker: Option<JoinHandle<()>>,
    disposed: bool,
}

impl Core {
    fn frame(&self) -> Frame {
        let state = self.machine.state();
        let position = self.motion.position();
        Frame {
            image: Arc::clone(self.images.for_state(state)),
            flip_horizontal: self.motion.facing_left(),
            scale: if state == CatState::Bounce { self.motion.scale() } else { 1.0 },
            x: position.x.round() as i32,
            y: position.y.round() as i32,
        }
    }

    fn cancel_promotion(&mut self) {
        self.promotion_generation = self.promotion_generation.wrapping_add(1);
        if let Some(handle) = self.promotion_timer.take() {
            handle.abort();
        }
    }

    fn cancel_idle(&mut self) {
        self.idle_generation = self.idle_generation.wrapping_add(1);
        if let Some(handle) = self.idle_timer.take() {
            handle.abort();
        }
    }
}

struct Shared {
    core: Mutex<Core>,
    collaborators: Collaborators,
    runtime: Handle,
    idle_after: Duration,
    promote_after: Duration,
    tick: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entered(&self, core: &mut Core, state: CatState) {
        match state {
            CatState::Bounce => core.motion.reset_pulse(),
            _ => core.motion.settle(),
        }
        core.dirty |= RedrawReasons::STATE;
        log::info!("flying cat -> {state}");
        self.collaborators.display.state_changed(state);
    }

    fn arm_idle_timer(self: &Arc<Self>, core: &mut Core) {
        core.cancel_idle();
        let generation = core.idle_generation;
        let weak = Arc::downgrade(self);
        let deadline = Instant::now() + self.idle_after;
        core.idle_timer = Some(self.runtime.spawn(async move {
            time::sleep_until(deadline).await;
            if let Some(shared) = weak.upgrade() {
                shared.idle_fired(generation);
            }
        }));
    }

    fn arm_promotion_timer(self: &Arc<Self>, core: &mut Core) {
        core.cancel_promotion();
        let generation = core.promotion_generation;
        let weak = Arc::downgrade(self);
        let deadline = Instant::now() + self.promote_after;
        core.promotion_timer = Some(self.runtime.spawn(async move {
            time::sleep_until(deadline).await;
            if let Some(shared) = weak.upgrade() {
                shared.promotion_fired(generation);
            }
        }));
    }

    fn on_edit(self: &Arc<Self>) {
        let now = Instant::now().into_std();
        let mut core = self.lock();
        if core.disposed {
            return;
        }
        self.arm_idle_timer(&mut core);
        match core.machine.on_edit(now) {
            EditOutcome::StartedTyping => {
                self.entered(&mut core, CatState::Typing);
                self.arm_promotion_timer(&mut core);
            }
            EditOutcome::Promoted => {
                core.cancel_promotion();
                self.entered(&mut core, CatState::Bounce);
            }
            EditOutcome::Unchanged => {}
        }
    }

    fn idle_fired(&self, generation: u64) {
        let mut core = self.lock();
        if core.disposed || generation != core.idle_generation {
            return;
        }
        core.idle_timer = None;
        if core.machine.on_idle_timeout() {
            core.cancel_promotion();
            self.entered(&mut core, CatState::Idle);
        }
    }

    fn promotion_fired(&self, generation: u64) {
        let mut core = self.lock();
        if core.disposed || generation != core.promotion_generation {
            return;
        }
        core.promotion_timer = None;
        if core.machine.on_promotion_due() {
            self.entered(&mut core, CatState::Bounce);
        }
    }

    fn on_tick(&self) {
        let mut core = self.lock();
        if core.disposed {
            return;
        }
        if core.machine.state() == CatState::Bounce {
            let viewport = self.collaborators.viewport.viewport_height_estimate();
            core.motion.step(self.tick, viewport);
            core.dirty |= RedrawReasons::MOTION;
        }
        if core.dirty.is_empty() {
            return;
        }
        let reasons = std::mem::take(&mut core.dirty);
        let frame = core.frame();
        match self.collaborators.renderer.redraw(&frame) {
            RedrawOutcome::Drawn => log::trace!("redraw {reasons:?} at ({}, {})", frame.x, frame.y),
            RedrawOutcome::NoDisplay => log::debug!("redraw {reasons:?} skipped: no active display"),
        }
    }

    fn dispose(&self) -> bool {
        let mut core = self.lock();
        if core.disposed {
            return false;
        }
        core.disposed = true;
        core.cancel_idle();
        core.cancel_promotion();
        if let Some(ticker) = core.ticker.take() {
            ticker.abort();
        }
        core.machine.on_idle_timeout();
        core.motion.settle();
        core.dirty = RedrawReasons::empty();
        self.collaborators.renderer.release();
        self.collaborators.display.state_changed(CatState::Idle);
        log::info!("flying cat disposed");
        true
    }
}

/// A running cat: owns its idle, promotion and render-tick tasks. Dropping it disposes it.
pub struct FlyingCat {
    shared: Arc<Shared>,
}

impl FlyingCat {
    /// Starts the render loop on the current tokio runtime.
    pub fn start(config: &CatConfig, images: CatImages, collaborators: Collaborators) -> Result<Self> {
        config.validate().context("Refusing to start the flying cat")?;
        let runtime = Handle::try_current().context("Flying cat needs a running tokio runtime")?;
        let core = Core {
            machine: ActivityMachine::new(config.timing.promote_after()),
            motion: Motion::new(&config.motion, &config.pulse),
            images,
            dirty: RedrawReasons::INITIAL,
            idle_timer: None,
            idle_generation: 0,
            promotion_timer: None,
            promotion_generation: 0,
            ticker: None,
            disposed: false,
        };
        let shared = Arc::new(Shared {
            core: Mutex::new(core),
            collaborators,
            runtime,
            idle_after: config.timing.idle_after(),
            promote_after: config.timing.promote_after(),
            tick: config.timing.tick(),
        });
        let ticker = spawn_ticker(&shared);
        shared.lock().ticker = Some(ticker);
        log::info!(
            "flying cat started (idle after {:?}, bounce after {:?}, tick {:?})",
            shared.idle_after,
            shared.promote_after,
            shared.tick
        );
        Ok(Self { shared })
    }

    /// One detected text change.
    pub fn on_edit(&self) {
        self.shared.on_edit();
    }

    /// The active editor changed; the frame must be redrawn there.
    pub fn on_context_changed(&self) {
        let mut core = self.shared.lock();
        if !core.disposed {
            core.dirty |= RedrawReasons::CONTEXT;
        }
    }

    /// Cancels all tasks, releases the decoration and resets the panel to idle.
    /// Returns `false` if already disposed.
    pub fn dispose(&self) -> bool {
        self.shared.dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.lock().disposed
    }

    pub fn state(&self) -> CatState {
        self.shared.lock().machine.state()
    }

    pub fn snapshot(&self) -> CatSnapshot {
        let core = self.shared.lock();
        CatSnapshot {
            state: core.machine.state(),
            position: core.motion.position(),
            velocity: core.motion.velocity(),
            scale: if core.machine.state() == CatState::Bounce { core.motion.scale() } else { 1.0 },
            pulse_elapsed_ms: core.motion.pulse_elapsed_ms(),
            redraw_pending: !core.dirty.is_empty(),
        }
    }
}

impl Drop for FlyingCat {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

fn spawn_ticker(shared: &Arc<Shared>) -> JoinHandle<()> {
    let weak: Weak<Shared> = Arc::downgrade(shared);
    let period = shared.tick;
    shared.runtime.spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            shared.on_tick();
        }
    })
}
