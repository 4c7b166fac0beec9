//! Shared fixtures for the integration suites: a tick-driven one-shot
//! animator and a host wiring a pan gesture into a two-screen container.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use stagehand_core::animator::{
    AnimatingPosition, InteractionController, InterruptibleAnimation, InterruptibleHandle,
    TransitionAnimator,
};
use stagehand_core::context::TransitionContext;
use stagehand_core::delegate::ContainerDelegate;
use stagehand_core::geometry::Rect;
use stagehand_core::gesture::{DragGesture, DragPhase};
use stagehand_core::interactive::{DriveMode, PercentDrivenInteraction};
use stagehand_core::positions::AnimationPositions;
use stagehand_core::screen::{BasicScreen, ScreenRef};
use stagehand_core::view::View;
use stagehand_core::{PanGestureInteraction, TransitionContainer};

pub const BOUNDS: Rect = Rect::from_size(400, 300);
pub const FRAME: Duration = Duration::from_millis(16);

struct Running {
    ctx: TransitionContext,
    media_elapsed: f64,
}

/// Tick-driven one-shot animator honoring the container view's layer state:
/// a frozen layer parks the animation and a scrubbed time offset shifts its
/// presented time.
#[derive(Default)]
pub struct TickAnimator {
    running: RefCell<Option<Running>>,
}

impl TickAnimator {
    pub const DURATION: Duration = Duration::from_millis(160);
}

impl TransitionAnimator for TickAnimator {
    fn duration(&self, _ctx: &TransitionContext) -> Duration {
        Self::DURATION
    }

    fn animate(&self, ctx: &TransitionContext) {
        *self.running.borrow_mut() = Some(Running {
            ctx: ctx.clone(),
            media_elapsed: 0.0,
        });
    }

    fn tick(&self, dt: Duration) {
        let done = {
            let mut slot = self.running.borrow_mut();
            let Some(running) = slot.as_mut() else {
                return;
            };
            let layer = running.ctx.container_view().layer();
            running.media_elapsed += dt.as_secs_f64() * layer.speed;
            // A frozen layer shows the scrubbed frame but never finishes
            // playback, even when scrubbed all the way to the end.
            let presented = running.media_elapsed + layer.time_offset;
            if layer.speed > 0.0 && presented >= Self::DURATION.as_secs_f64() {
                slot.take()
            } else {
                None
            }
        };
        if let Some(running) = done {
            let did_complete = !running.ctx.was_cancelled();
            running.ctx.complete_transition(did_complete);
        }
    }
}

struct ScrubHandleInner {
    playing: bool,
    finished: bool,
    fraction: f32,
    reversed: bool,
    /// Playback rate relative to natural speed, set by `continue_animation`.
    rate: f64,
    completions: Vec<Box<dyn FnOnce(AnimatingPosition)>>,
}

/// Interruptible playback over the transition context: pure bookkeeping,
/// no frames. Continuing with nothing left to cover resolves synchronously.
pub struct ScrubHandle {
    ctx: TransitionContext,
    duration: Duration,
    inner: RefCell<ScrubHandleInner>,
}

impl ScrubHandle {
    fn new(ctx: TransitionContext, duration: Duration) -> Self {
        Self {
            ctx,
            duration,
            inner: RefCell::new(ScrubHandleInner {
                playing: false,
                finished: false,
                fraction: 0.0,
                reversed: false,
                rate: 1.0,
                completions: Vec::new(),
            }),
        }
    }

    fn finish(&self, position: AnimatingPosition) {
        let completions = {
            let mut inner = self.inner.borrow_mut();
            inner.finished = true;
            inner.playing = false;
            inner.fraction = match position {
                AnimatingPosition::End => 1.0,
                _ => 0.0,
            };
            std::mem::take(&mut inner.completions)
        };
        for completion in completions {
            completion(position);
        }
        self.ctx
            .complete_transition(matches!(position, AnimatingPosition::End));
    }
}

impl InterruptibleAnimation for ScrubHandle {
    fn start(&self) {
        self.inner.borrow_mut().playing = true;
    }
    fn pause(&self) {
        self.inner.borrow_mut().playing = false;
    }
    fn is_reversed(&self) -> bool {
        self.inner.borrow().reversed
    }
    fn set_reversed(&self, reversed: bool) {
        self.inner.borrow_mut().reversed = reversed;
    }
    fn fraction_complete(&self) -> f32 {
        self.inner.borrow().fraction
    }
    fn set_fraction_complete(&self, fraction: f32) {
        let mut inner = self.inner.borrow_mut();
        if !inner.finished {
            inner.fraction = fraction.clamp(0.0, 1.0);
        }
    }
    fn continue_animation(&self, duration_factor: f32) {
        let snap = {
            let mut inner = self.inner.borrow_mut();
            if inner.finished {
                return;
            }
            let remaining = if inner.reversed {
                inner.fraction
            } else {
                1.0 - inner.fraction
            };
            if duration_factor <= f32::EPSILON || remaining <= f32::EPSILON {
                true
            } else {
                inner.rate = f64::from(remaining / duration_factor);
                inner.playing = true;
                false
            }
        };
        if snap {
            let position = if self.inner.borrow().reversed {
                AnimatingPosition::Start
            } else {
                AnimatingPosition::End
            };
            self.finish(position);
        }
    }
    fn add_completion(&self, completion: Box<dyn FnOnce(AnimatingPosition)>) {
        self.inner.borrow_mut().completions.push(completion);
    }
    fn tick(&self, dt: Duration) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            if !inner.playing || inner.finished {
                return;
            }
            let step = (dt.as_secs_f64() / self.duration.as_secs_f64() * inner.rate) as f32;
            inner.fraction += if inner.reversed { -step } else { step };
            if inner.reversed && inner.fraction <= 0.0 {
                AnimatingPosition::Start
            } else if !inner.reversed && inner.fraction >= 1.0 {
                AnimatingPosition::End
            } else {
                return;
            }
        };
        self.finish(outcome);
    }
}

/// Animator that hands out [`ScrubHandle`]s, for the animator-interruption
/// suites.
#[derive(Default)]
pub struct ScrubAnimator;

impl ScrubAnimator {
    pub const DURATION: Duration = Duration::from_millis(160);
}

impl TransitionAnimator for ScrubAnimator {
    fn duration(&self, _ctx: &TransitionContext) -> Duration {
        Self::DURATION
    }

    fn animate(&self, ctx: &TransitionContext) {
        // No one-shot playback of its own; resolve straight away.
        ctx.complete_transition(!ctx.was_cancelled());
    }

    fn interruptible_animator(&self, ctx: &TransitionContext) -> Option<InterruptibleHandle> {
        Some(Rc::new(ScrubHandle::new(ctx.clone(), Self::DURATION)))
    }
}

pub struct Host {
    pub initial: ScreenRef,
    pub animator: Rc<dyn TransitionAnimator>,
    pub pan: PanGestureInteraction,
    pub finished: RefCell<Vec<(ScreenRef, bool)>>,
}

impl ContainerDelegate for Host {
    fn initial_screen(&self, _container: &TransitionContainer) -> ScreenRef {
        self.initial.clone()
    }
    fn animator_for(
        &self,
        _container: &TransitionContainer,
        _from: &ScreenRef,
        _to: &ScreenRef,
    ) -> Option<Rc<dyn TransitionAnimator>> {
        Some(Rc::clone(&self.animator))
    }
    fn interaction_controller_for(
        &self,
        _container: &TransitionContainer,
        animator: &Rc<dyn TransitionAnimator>,
    ) -> Option<Rc<dyn InteractionController>> {
        if !self.pan.is_ready_to_start() {
            return None;
        }
        self.pan.controller().bind_animator(Rc::clone(animator));
        Some(Rc::new(self.pan.clone()) as _)
    }
    fn positions_for(
        &self,
        _container: &TransitionContainer,
        _from: &ScreenRef,
        _to: &ScreenRef,
    ) -> Option<AnimationPositions> {
        Some(AnimationPositions::new(
            BOUNDS,
            BOUNDS.offset_by(-(BOUNDS.width as i32), 0),
            BOUNDS.offset_by(BOUNDS.width as i32, 0),
            BOUNDS,
        ))
    }
    fn on_transition_finished(
        &self,
        _container: &TransitionContainer,
        current: &ScreenRef,
        was_cancelled: bool,
    ) {
        self.finished
            .borrow_mut()
            .push((current.clone(), was_cancelled));
    }
}

pub struct PanFixture {
    pub container: TransitionContainer,
    pub host: Rc<Host>,
    pub pan: PanGestureInteraction,
    pub a: ScreenRef,
    pub b: ScreenRef,
}

/// Two basic screens, a pan recognizer whose begin callback transitions to
/// screen `b`, and a loaded container currently showing screen `a`. Drives
/// interaction through the time-offset strategy.
pub fn pan_fixture() -> PanFixture {
    pan_fixture_with(DriveMode::TimeOffset, Rc::new(TickAnimator::default()))
}

/// Variant of [`pan_fixture`] driving through the animator-interruption
/// strategy with a [`ScrubHandle`].
pub fn handle_fixture() -> PanFixture {
    pan_fixture_with(DriveMode::Auto, Rc::new(ScrubAnimator))
}

pub fn pan_fixture_with(mode: DriveMode, animator: Rc<dyn TransitionAnimator>) -> PanFixture {
    let a = ScreenRef::new(BasicScreen::new(View::new(BOUNDS)));
    let b = ScreenRef::new(BasicScreen::new(View::new(BOUNDS)));
    let pan = PanGestureInteraction::new(PercentDrivenInteraction::new(mode));
    let host = Rc::new(Host {
        initial: a.clone(),
        animator,
        pan: pan.clone(),
        finished: RefCell::new(Vec::new()),
    });
    let container = TransitionContainer::new();
    container.set_delegate(&(Rc::clone(&host) as Rc<dyn ContainerDelegate>));
    container.load_view(BOUNDS);
    host.finished.borrow_mut().clear();

    let target = b.clone();
    let routed = container.clone();
    pan.set_begin_callback(move |_velocity| {
        routed.transition_to(&target, true, true);
    });

    PanFixture {
        container,
        host,
        pan,
        a,
        b,
    }
}

pub fn drag(phase: DragPhase, tx: f32, vx: f32) -> DragGesture {
    DragGesture::new(phase, (tx, 0.0), (vx, 0.0))
}

pub fn run_until_settled(container: &TransitionContainer) {
    for _ in 0..120 {
        if container.transition_coordinator().is_none() {
            return;
        }
        container.tick(FRAME);
    }
    panic!("transition did not settle within the tick budget");
}
