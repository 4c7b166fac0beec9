#![forbid(unsafe_code)]

//! Percent-driven interactive transitions.
//!
//! [`PercentDrivenInteraction`] is the state machine at the center of
//! interactive transitions. It cycles `Inactive → Interacting → TearingDown →
//! Inactive` and drives progress through one of two mutually exclusive
//! strategies behind the same interface:
//!
//! - **Animator interruption** — the bound animator hands out an
//!   [`InterruptibleAnimation`] handle; the controller starts it, immediately
//!   pauses it, and scrubs its fraction. Teardown resumes the handle (reversed
//!   for cancel) and lets it play out.
//! - **Time offset** — the animator only has a one-shot animation; the
//!   controller freezes the container view's render layer (speed 0), runs the
//!   animation, and scrubs the layer's time offset. Teardown walks the offset
//!   back to zero or on to the full duration at the host tick cadence.
//!
//! # Invariants
//!
//! 1. Progress updates are meaningful only while `Interacting`; once teardown
//!    begins, percent mutations are ignored.
//! 2. Every public operation silently no-ops when called from a disallowed
//!    state, so late gesture events racing a completed teardown are harmless.
//! 3. For each accepted `start`, the bound context sees exactly one of
//!    `finish_interactive_transition` / `cancel_interactive_transition`.
//! 4. The context is bound only while the state is not `Inactive`.
//!
//! # Failure Modes
//!
//! - `start` without a bound animator is a programmer error and panics.
//! - Forcing [`DriveMode::AnimatorInterruption`] on an animator that offers
//!   no interruptible handle panics at `start`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::animator::{InteractionController, InterruptibleHandle, TransitionAnimator};
use crate::context::TransitionContext;
use crate::easing::{EasingFn, linear};

/// Lifecycle state of an interactive transition controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractiveState {
    /// No transition bound; ready to start.
    #[default]
    Inactive,
    /// Bound to a context and accepting progress updates.
    Interacting,
    /// A terminal was requested; playback is resolving toward it.
    TearingDown,
}

/// How progress is driven once interaction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveMode {
    /// Prefer the animator's interruptible handle; fall back to time offset.
    #[default]
    Auto,
    /// Require the interruptible handle (panics at start if absent).
    AnimatorInterruption,
    /// Always freeze the layer and scrub its time offset.
    TimeOffset,
}

enum ActiveDrive {
    Handle(InterruptibleHandle),
    TimeOffset { duration: Duration },
}

struct InteractionInner {
    state: InteractiveState,
    mode: DriveMode,
    animator: Option<Rc<dyn TransitionAnimator>>,
    ctx: Option<TransitionContext>,
    drive: Option<ActiveDrive>,
    percent: f32,
    completion_speed: f32,
    completion_curve: EasingFn,
    /// Time-offset teardown in progress; cleared exactly once on terminal.
    ticking: bool,
}

/// Base percent-driven interactive transition controller.
///
/// Cloning shares the same controller state.
pub struct PercentDrivenInteraction {
    inner: Rc<RefCell<InteractionInner>>,
}

impl Clone for PercentDrivenInteraction {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for PercentDrivenInteraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("PercentDrivenInteraction")
            .field("state", &inner.state)
            .field("mode", &inner.mode)
            .field("percent", &inner.percent)
            .field("has_animator", &inner.animator.is_some())
            .finish()
    }
}

impl Default for PercentDrivenInteraction {
    fn default() -> Self {
        Self::new(DriveMode::Auto)
    }
}

impl PercentDrivenInteraction {
    /// Create a controller with the given drive mode and no animator bound.
    #[must_use]
    pub fn new(mode: DriveMode) -> Self {
        Self {
            inner: Rc::new(RefCell::new(InteractionInner {
                state: InteractiveState::Inactive,
                mode,
                animator: None,
                ctx: None,
                drive: None,
                percent: 0.0,
                completion_speed: 1.0,
                completion_curve: linear,
                ticking: false,
            })),
        }
    }

    /// Create a controller already bound to an animator.
    #[must_use]
    pub fn with_animator(mode: DriveMode, animator: Rc<dyn TransitionAnimator>) -> Self {
        let controller = Self::new(mode);
        controller.bind_animator(animator);
        controller
    }

    /// Bind (or replace) the animator driven by this controller.
    pub fn bind_animator(&self, animator: Rc<dyn TransitionAnimator>) {
        self.inner.borrow_mut().animator = Some(animator);
    }

    // ---- state queries ----------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> InteractiveState {
        self.inner.borrow().state
    }

    /// Whether the controller is accepting progress updates.
    pub fn is_interacting(&self) -> bool {
        self.state() == InteractiveState::Interacting
    }

    /// Whether a terminal was requested and playback is resolving.
    pub fn is_tearing_down(&self) -> bool {
        self.state() == InteractiveState::TearingDown
    }

    /// Whether a transition context is currently bound.
    pub fn has_context(&self) -> bool {
        self.inner.borrow().ctx.is_some()
    }

    /// Last accepted progress, clamped to [0, 1].
    pub fn percent_complete(&self) -> f32 {
        self.inner.borrow().percent
    }

    /// Speed factor applied to teardown playback (default 1.0).
    pub fn completion_speed(&self) -> f32 {
        self.inner.borrow().completion_speed
    }

    /// Set the teardown playback speed factor.
    pub fn set_completion_speed(&self, speed: f32) {
        self.inner.borrow_mut().completion_speed = speed;
    }

    /// Easing curve reported for the completion phase (default linear).
    pub fn completion_curve(&self) -> EasingFn {
        self.inner.borrow().completion_curve
    }

    /// Set the completion-phase easing curve.
    pub fn set_completion_curve(&self, curve: EasingFn) {
        self.inner.borrow_mut().completion_curve = curve;
    }

    // ---- lifecycle --------------------------------------------------------

    /// Take ownership of `ctx` and enter `Interacting`.
    ///
    /// No-op unless `Inactive`. Panics if no animator is bound, or if the
    /// drive mode requires an interruptible handle the animator cannot
    /// provide.
    pub fn start(&self, ctx: TransitionContext) {
        let (animator, mode) = {
            let inner = self.inner.borrow();
            if inner.state != InteractiveState::Inactive {
                return;
            }
            let animator = inner
                .animator
                .clone()
                .expect("an animator must be bound before starting an interactive transition");
            (animator, inner.mode)
        };

        let duration = animator.duration(&ctx);
        ctx.coordinator().set_transition_duration(duration);

        let handle = match mode {
            DriveMode::TimeOffset => None,
            DriveMode::Auto => animator.interruptible_animator(&ctx),
            DriveMode::AnimatorInterruption => Some(
                animator
                    .interruptible_animator(&ctx)
                    .expect("drive mode requires an animator with interruption support"),
            ),
        };

        {
            let mut inner = self.inner.borrow_mut();
            inner.state = InteractiveState::Interacting;
            inner.percent = 0.0;
            inner.ctx = Some(ctx.clone());
        }

        match handle {
            Some(handle) => {
                debug!("interactive start: animator-interruption strategy");
                // Start then pause so no motion happens until updates arrive.
                handle.start();
                handle.pause();
                let controller = self.clone();
                handle.add_completion(Box::new(move |_position| controller.playback_resolved()));
                self.inner.borrow_mut().drive = Some(ActiveDrive::Handle(handle));
            }
            None => {
                debug!("interactive start: time-offset strategy");
                let container_view = ctx.container_view();
                container_view.set_layer_speed(0.0);
                container_view.set_layer_time_offset(0.0);
                self.inner.borrow_mut().drive = Some(ActiveDrive::TimeOffset { duration });
                // Runs visually frozen at offset zero until scrubbed.
                animator.animate(&ctx);
            }
        }
    }

    /// Record progress and drive the strategy knob. No-op unless
    /// `Interacting`. Input is clamped to [0, 1].
    pub fn update(&self, percent: f32) {
        let percent = percent.clamp(0.0, 1.0);
        let ctx = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != InteractiveState::Interacting {
                return;
            }
            inner.percent = percent;
            inner.ctx.clone()
        };
        let Some(ctx) = ctx else { return };

        match &self.drive() {
            Some(ActiveDrive::Handle(handle)) => handle.set_fraction_complete(percent),
            Some(ActiveDrive::TimeOffset { duration }) => {
                let offset = f64::from(percent) * duration.as_secs_f64();
                ctx.container_view().set_layer_time_offset(offset);
            }
            None => {}
        }
        ctx.update_interactive_transition(percent);
    }

    /// Request cancellation: notify the context, reverse playback, and enter
    /// `TearingDown`. No-op unless `Interacting`.
    pub fn cancel(&self) {
        let Some(ctx) = self.enter_teardown() else {
            return;
        };
        debug!("interactive cancel requested");
        ctx.cancel_interactive_transition();
        match &self.drive() {
            Some(ActiveDrive::Handle(handle)) => {
                handle.set_reversed(true);
                handle.continue_animation(handle.fraction_complete());
            }
            Some(ActiveDrive::TimeOffset { .. }) => self.inner.borrow_mut().ticking = true,
            None => {}
        }
    }

    /// Request completion: notify the context, resume playback forward, and
    /// enter `TearingDown`. No-op unless `Interacting`.
    pub fn finish(&self) {
        let Some(ctx) = self.enter_teardown() else {
            return;
        };
        debug!("interactive finish requested");
        ctx.finish_interactive_transition();
        match &self.drive() {
            Some(ActiveDrive::Handle(handle)) => {
                handle.continue_animation(1.0 - handle.fraction_complete());
            }
            Some(ActiveDrive::TimeOffset { .. }) => self.inner.borrow_mut().ticking = true,
            None => {}
        }
    }

    /// Advance teardown playback by `dt` of host time.
    ///
    /// Animator-interruption strategy: forwards to the handle (a paused
    /// handle ignores ticks). Time-offset strategy: walks the layer's time
    /// offset by `dt × completion_speed` toward the requested terminal; on
    /// crossing it, restores the layer to unit speed exactly once and
    /// re-enters `Inactive`.
    pub fn tick(&self, dt: Duration) {
        if let Some(ActiveDrive::Handle(handle)) = &self.drive() {
            handle.tick(dt);
            return;
        }

        let (ctx, duration, speed) = {
            let inner = self.inner.borrow();
            if !inner.ticking || inner.state != InteractiveState::TearingDown {
                return;
            }
            let Some(ActiveDrive::TimeOffset { duration }) = inner.drive else {
                return;
            };
            let Some(ctx) = inner.ctx.clone() else {
                return;
            };
            (ctx, duration, inner.completion_speed)
        };

        let container_view = ctx.container_view();
        let step = dt.as_secs_f64() * f64::from(speed);
        let mut offset = container_view.layer().time_offset;
        offset += if ctx.was_cancelled() { -step } else { step };

        let total = duration.as_secs_f64();
        if offset < 0.0 || offset > total {
            // Snap to the terminal and hand the frozen one-shot animation
            // back to real time; it resolves the transition from there,
            // reading the outcome out of the context.
            container_view.set_layer_time_offset(total);
            container_view.set_layer_speed(1.0);
            self.inner.borrow_mut().ticking = false;
            self.playback_resolved();
        } else {
            container_view.set_layer_time_offset(offset);
        }
    }

    /// Playback reached its terminal: unbind and return to `Inactive`.
    fn playback_resolved(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = InteractiveState::Inactive;
        inner.ctx = None;
        inner.drive = None;
        inner.ticking = false;
    }

    fn enter_teardown(&self) -> Option<TransitionContext> {
        let mut inner = self.inner.borrow_mut();
        if inner.state != InteractiveState::Interacting {
            return None;
        }
        inner.state = InteractiveState::TearingDown;
        inner.ctx.clone()
    }

    /// Clone of the active drive, so strategy calls run without holding the
    /// inner borrow (completion hooks re-enter the controller).
    fn drive(&self) -> Option<ActiveDrive> {
        match &self.inner.borrow().drive {
            Some(ActiveDrive::Handle(handle)) => Some(ActiveDrive::Handle(Rc::clone(handle))),
            Some(ActiveDrive::TimeOffset { duration }) => {
                Some(ActiveDrive::TimeOffset { duration: *duration })
            }
            None => None,
        }
    }
}

impl InteractionController for PercentDrivenInteraction {
    fn start_interactive_transition(&self, ctx: TransitionContext) {
        self.start(ctx);
    }

    fn tick(&self, dt: Duration) {
        PercentDrivenInteraction::tick(self, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::{DriveMode, InteractiveState, PercentDrivenInteraction};
    use crate::animator::{AnimatingPosition, InterruptibleAnimation, TransitionAnimator};
    use crate::context::TransitionContext;
    use crate::geometry::Rect;
    use crate::positions::AnimationPositions;
    use crate::screen::{BasicScreen, ScreenRef};
    use crate::view::View;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct StubHandleState {
        started: Cell<bool>,
        paused: Cell<bool>,
        reversed: Cell<bool>,
        fraction: Cell<f32>,
        continued_with: Cell<Option<f32>>,
        completions: RefCell<Vec<Box<dyn FnOnce(AnimatingPosition)>>>,
    }

    #[derive(Default)]
    struct StubHandle(Rc<StubHandleState>);

    impl StubHandle {
        fn resolve(&self, position: AnimatingPosition) {
            for completion in self.0.completions.borrow_mut().drain(..) {
                completion(position);
            }
        }
    }

    impl InterruptibleAnimation for StubHandle {
        fn start(&self) {
            self.0.started.set(true);
        }
        fn pause(&self) {
            self.0.paused.set(true);
        }
        fn is_reversed(&self) -> bool {
            self.0.reversed.get()
        }
        fn set_reversed(&self, reversed: bool) {
            self.0.reversed.set(reversed);
        }
        fn fraction_complete(&self) -> f32 {
            self.0.fraction.get()
        }
        fn set_fraction_complete(&self, fraction: f32) {
            self.0.fraction.set(fraction);
        }
        fn continue_animation(&self, duration_factor: f32) {
            self.0.continued_with.set(Some(duration_factor));
        }
        fn add_completion(&self, completion: Box<dyn FnOnce(AnimatingPosition)>) {
            self.0.completions.borrow_mut().push(completion);
        }
        fn tick(&self, _dt: Duration) {}
    }

    struct StubAnimator {
        handle: Option<Rc<StubHandleState>>,
        animated: Cell<bool>,
    }

    impl TransitionAnimator for StubAnimator {
        fn duration(&self, _ctx: &TransitionContext) -> Duration {
            Duration::from_millis(200)
        }
        fn animate(&self, _ctx: &TransitionContext) {
            self.animated.set(true);
        }
        fn interruptible_animator(
            &self,
            _ctx: &TransitionContext,
        ) -> Option<crate::animator::InterruptibleHandle> {
            self.handle
                .as_ref()
                .map(|state| Rc::new(StubHandle(Rc::clone(state))) as _)
        }
    }

    fn context() -> TransitionContext {
        let bounds = Rect::from_size(100, 40);
        let ctx = TransitionContext::new(
            View::new(bounds),
            ScreenRef::new(BasicScreen::new(View::new(bounds))),
            ScreenRef::new(BasicScreen::new(View::new(bounds))),
            AnimationPositions::identity(bounds),
        );
        ctx.set_interactive(true);
        ctx
    }

    fn interruptible_setup() -> (PercentDrivenInteraction, Rc<StubHandleState>, TransitionContext) {
        let state = Rc::new(StubHandleState::default());
        let animator = Rc::new(StubAnimator {
            handle: Some(Rc::clone(&state)),
            animated: Cell::new(false),
        });
        let controller = PercentDrivenInteraction::with_animator(DriveMode::Auto, animator);
        (controller, state, context())
    }

    #[test]
    #[should_panic(expected = "animator must be bound")]
    fn start_without_animator_panics() {
        PercentDrivenInteraction::new(DriveMode::Auto).start(context());
    }

    #[test]
    fn start_prefers_interruptible_handle_and_pauses_it() {
        let (controller, handle, ctx) = interruptible_setup();
        controller.start(ctx);
        assert_eq!(controller.state(), InteractiveState::Interacting);
        assert!(handle.started.get());
        assert!(handle.paused.get());
    }

    #[test]
    fn update_clamps_and_forwards() {
        let (controller, handle, ctx) = interruptible_setup();
        controller.start(ctx.clone());

        controller.update(-0.5);
        assert_eq!(controller.percent_complete(), 0.0);
        controller.update(1.7);
        assert_eq!(controller.percent_complete(), 1.0);
        controller.update(0.3);
        assert_eq!(handle.fraction.get(), 0.3);
        assert_eq!(ctx.percent_complete(), 0.3);
    }

    #[test]
    fn operations_no_op_outside_their_states() {
        let (controller, handle, ctx) = interruptible_setup();

        // Everything before start is ignored.
        controller.update(0.5);
        controller.cancel();
        controller.finish();
        assert_eq!(controller.state(), InteractiveState::Inactive);

        controller.start(ctx.clone());
        // Second start is ignored.
        controller.start(ctx);
        controller.cancel();
        assert_eq!(controller.state(), InteractiveState::TearingDown);

        // Updates and a second terminal during teardown are ignored.
        controller.update(0.9);
        assert_eq!(controller.percent_complete(), 0.0);
        controller.finish();
        assert_eq!(controller.state(), InteractiveState::TearingDown);
        assert!(handle.reversed.get(), "finish must not override cancel");
    }

    #[test]
    fn cancel_reverses_and_resolves_to_inactive() {
        let (controller, handle, ctx) = interruptible_setup();
        controller.start(ctx.clone());
        controller.update(0.4);
        controller.cancel();

        assert!(handle.reversed.get());
        assert_eq!(handle.continued_with.get(), Some(0.4));
        assert!(ctx.was_cancelled());

        StubHandle(Rc::clone(&handle)).resolve(AnimatingPosition::Start);
        assert_eq!(controller.state(), InteractiveState::Inactive);
        assert!(!controller.has_context());
    }

    #[test]
    fn finish_continues_forward() {
        let (controller, handle, ctx) = interruptible_setup();
        controller.start(ctx.clone());
        controller.update(0.25);
        controller.finish();

        assert!(!handle.reversed.get());
        assert_eq!(handle.continued_with.get(), Some(0.75));
        assert!(!ctx.was_cancelled());

        StubHandle(Rc::clone(&handle)).resolve(AnimatingPosition::End);
        assert_eq!(controller.state(), InteractiveState::Inactive);
    }

    #[test]
    fn time_offset_strategy_freezes_layer_and_scrubs() {
        let animator = Rc::new(StubAnimator {
            handle: None,
            animated: Cell::new(false),
        });
        let controller =
            PercentDrivenInteraction::with_animator(DriveMode::Auto, Rc::clone(&animator) as _);
        let ctx = context();
        let container_view = ctx.container_view();

        controller.start(ctx.clone());
        assert!(animator.animated.get(), "one-shot animation must be scheduled");
        assert_eq!(container_view.layer().speed, 0.0);

        controller.update(0.5);
        assert!((container_view.layer().time_offset - 0.1).abs() < 1e-9);
    }

    #[test]
    fn time_offset_cancel_ticks_back_and_restores_layer() {
        let animator = Rc::new(StubAnimator {
            handle: None,
            animated: Cell::new(false),
        });
        let controller = PercentDrivenInteraction::with_animator(DriveMode::TimeOffset, animator);
        let ctx = context();
        let container_view = ctx.container_view();

        controller.start(ctx.clone());
        controller.update(0.1);
        controller.cancel();
        assert!(ctx.was_cancelled());

        // 0.1 × 200ms = 20ms of offset to walk back.
        let mut guard = 0;
        while controller.state() == InteractiveState::TearingDown {
            controller.tick(Duration::from_millis(16));
            guard += 1;
            assert!(guard < 100, "teardown must terminate");
        }
        assert_eq!(controller.state(), InteractiveState::Inactive);
        assert_eq!(container_view.layer().speed, 1.0);
        assert_eq!(container_view.layer().time_offset, 0.2);

        // Further ticks are inert.
        controller.tick(Duration::from_millis(16));
        assert_eq!(container_view.layer().time_offset, 0.2);
    }

    #[test]
    fn completion_speed_scales_teardown() {
        let animator = Rc::new(StubAnimator {
            handle: None,
            animated: Cell::new(false),
        });
        let controller = PercentDrivenInteraction::with_animator(DriveMode::TimeOffset, animator);
        controller.set_completion_speed(2.0);
        let ctx = context();

        controller.start(ctx.clone());
        controller.update(1.0);
        controller.cancel();

        // Offset 0.2s, speed 2.0: 100ms of ticks less one step crosses zero.
        controller.tick(Duration::from_millis(60));
        assert_eq!(controller.state(), InteractiveState::TearingDown);
        controller.tick(Duration::from_millis(60));
        assert_eq!(controller.state(), InteractiveState::Inactive);
    }
}
