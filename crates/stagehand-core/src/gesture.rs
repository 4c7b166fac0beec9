#![forbid(unsafe_code)]

//! Pan-gesture driver for percent-driven transitions.
//!
//! [`PanGestureInteraction`] translates a stream of horizontal drag events
//! into calls on a wrapped [`PercentDrivenInteraction`]: the gesture's begin
//! phase asks the host (via a begin callback) to kick off a transition, each
//! change scrubs progress from the horizontal translation, and the end phase
//! commits or rolls back based on how far and how fast the drag went.
//!
//! # Invariants
//!
//! 1. `start_interactive_transition` is accepted only inside the narrow
//!    window opened by a `Began` event; a call outside it is a programmer
//!    error.
//! 2. The commit decision is recomputed on every change, so the last observed
//!    translation and velocity before release decide the outcome.
//! 3. A translation sign reversal mid-drag cancels the transition rather
//!    than driving it to negative progress.
//!
//! # Failure Modes
//!
//! - A begin callback that does not route back into
//!   `start_interactive_transition` leaves the controller inactive; later
//!   changes then re-invoke the callback once per event until one sticks.
//!   The same path restarts the drag when a cancelled transition settles
//!   while the finger is still down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::animator::InteractionController;
use crate::context::TransitionContext;
use crate::interactive::{InteractiveState, PercentDrivenInteraction};

/// Where a drag event sits in its gesture's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// First event of a gesture.
    Began,
    /// Movement while the gesture is held.
    Changed,
    /// The gesture was released normally.
    Ended,
    /// The gesture was aborted by the host.
    Cancelled,
}

/// One horizontal drag event, in container-view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub phase: DragPhase,
    /// Cumulative translation since `Began`, in points.
    pub translation: (f32, f32),
    /// Instantaneous velocity, in points per second.
    pub velocity: (f32, f32),
}

impl DragGesture {
    #[must_use]
    pub fn new(phase: DragPhase, translation: (f32, f32), velocity: (f32, f32)) -> Self {
        Self {
            phase,
            translation,
            velocity,
        }
    }
}

/// Fraction of the container width a drag must cover to commit.
pub const DEFAULT_PROGRESS_THRESHOLD: f32 = 0.35;
/// Horizontal speed, in points per second, that commits regardless of
/// distance covered.
pub const DEFAULT_VELOCITY_THRESHOLD: f32 = 550.0;

struct PanState {
    /// Drag direction fixed at `Began` (true when moving left to right).
    left_to_right: bool,
    /// Latest commit decision, recomputed on every change.
    should_commit: bool,
    ctx: Option<TransitionContext>,
}

/// Horizontal pan gesture driving a [`PercentDrivenInteraction`].
///
/// The host owns event delivery: it feeds [`DragGesture`] values into
/// [`handle_drag`](Self::handle_drag) and supplies a begin callback that
/// starts the appropriate transition on its container. Cloning shares state.
pub struct PanGestureInteraction {
    controller: PercentDrivenInteraction,
    progress_threshold: f32,
    velocity_threshold: f32,
    last_velocity: Rc<Cell<(f32, f32)>>,
    /// Open only while a `Began` event is being dispatched.
    ready_to_start: Rc<Cell<bool>>,
    state: Rc<RefCell<PanState>>,
    on_begin: Rc<RefCell<Option<Box<dyn Fn(f32)>>>>,
}

impl Clone for PanGestureInteraction {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            progress_threshold: self.progress_threshold,
            velocity_threshold: self.velocity_threshold,
            last_velocity: Rc::clone(&self.last_velocity),
            ready_to_start: Rc::clone(&self.ready_to_start),
            state: Rc::clone(&self.state),
            on_begin: Rc::clone(&self.on_begin),
        }
    }
}

impl std::fmt::Debug for PanGestureInteraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanGestureInteraction")
            .field("controller", &self.controller)
            .field("progress_threshold", &self.progress_threshold)
            .field("velocity_threshold", &self.velocity_threshold)
            .field("ready_to_start", &self.ready_to_start.get())
            .finish()
    }
}

impl Default for PanGestureInteraction {
    fn default() -> Self {
        Self::new(PercentDrivenInteraction::default())
    }
}

impl PanGestureInteraction {
    /// Wrap `controller` with the default commit thresholds.
    #[must_use]
    pub fn new(controller: PercentDrivenInteraction) -> Self {
        Self {
            controller,
            progress_threshold: DEFAULT_PROGRESS_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            last_velocity: Rc::new(Cell::new((0.0, 0.0))),
            ready_to_start: Rc::new(Cell::new(false)),
            state: Rc::new(RefCell::new(PanState {
                left_to_right: false,
                should_commit: false,
                ctx: None,
            })),
            on_begin: Rc::new(RefCell::new(None)),
        }
    }

    /// Override the progress fraction at which a release commits.
    #[must_use]
    pub fn with_progress_threshold(mut self, threshold: f32) -> Self {
        self.progress_threshold = threshold;
        self
    }

    /// Override the velocity at which a release commits regardless of
    /// distance.
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f32) -> Self {
        self.velocity_threshold = threshold;
        self
    }

    /// Install the callback invoked when a gesture begins. It receives the
    /// horizontal velocity at `Began` and is expected to route back into
    /// [`start_interactive_transition`](InteractionController::start_interactive_transition)
    /// by starting a transition on its container.
    pub fn set_begin_callback(&self, callback: impl Fn(f32) + 'static) {
        *self.on_begin.borrow_mut() = Some(Box::new(callback));
    }

    /// Underlying percent-driven controller.
    #[must_use]
    pub fn controller(&self) -> &PercentDrivenInteraction {
        &self.controller
    }

    /// Horizontal velocity of the most recent drag event.
    pub fn last_horizontal_velocity(&self) -> f32 {
        self.last_velocity.get().0
    }

    /// Whether a start request would currently be accepted.
    pub fn is_ready_to_start(&self) -> bool {
        self.ready_to_start.get()
    }

    /// Feed one drag event into the recognizer.
    pub fn handle_drag(&self, gesture: DragGesture) {
        self.last_velocity.set(gesture.velocity);
        match gesture.phase {
            DragPhase::Began => self.on_began(gesture),
            DragPhase::Changed => self.on_changed(gesture),
            DragPhase::Ended | DragPhase::Cancelled => self.on_ended(),
        }
    }

    fn on_began(&self, gesture: DragGesture) {
        {
            let mut state = self.state.borrow_mut();
            state.left_to_right = gesture.velocity.0 > 0.0;
            state.should_commit = false;
        }
        self.invoke_begin(gesture.velocity.0);
    }

    fn on_changed(&self, gesture: DragGesture) {
        if self.controller.state() == InteractiveState::Inactive {
            // Either the begin callback declined (or was never installed),
            // or the previous transition settled while the finger was still
            // down. Treat the change as a fresh begin so the rest of the
            // drag drives a new transition.
            self.state.borrow_mut().ctx = None;
            self.on_began(gesture);
            return;
        }
        if self.controller.state() != InteractiveState::Interacting {
            // Teardown in flight; drop events until it resolves.
            return;
        }
        let ctx = self.state.borrow().ctx.clone();
        let Some(ctx) = ctx else {
            return;
        };

        let left_to_right = self.state.borrow().left_to_right;
        let (tx, _) = gesture.translation;
        let (vx, _) = gesture.velocity;

        // Moving against the locked direction is a reversal, not progress.
        let reversed = (left_to_right && tx < 0.0) || (!left_to_right && tx > 0.0);
        if reversed {
            debug!("drag reversed direction, cancelling");
            self.controller.update(0.0);
            self.controller.cancel();
            return;
        }

        let width = ctx.container_view().bounds().width.max(1) as f32;
        let progress = (tx.abs() / width).clamp(0.0, 1.0);
        let fast_enough = vx.abs() > self.velocity_threshold
            && ((left_to_right && vx > 0.0) || (!left_to_right && vx < 0.0));
        let should_commit = progress > self.progress_threshold || fast_enough;
        self.state.borrow_mut().should_commit = should_commit;

        trace!(progress, should_commit, "drag progress");
        self.controller.update(progress);
    }

    fn on_ended(&self) {
        let should_commit = {
            let mut state = self.state.borrow_mut();
            std::mem::replace(&mut state.should_commit, false)
        };
        if should_commit {
            self.controller.finish();
        } else {
            self.controller.cancel();
        }
    }

    fn invoke_begin(&self, velocity_x: f32) {
        let callback = self.on_begin.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        self.ready_to_start.set(true);
        callback(velocity_x);
        self.ready_to_start.set(false);
    }
}

impl InteractionController for PanGestureInteraction {
    /// Accept the context handed over by the container during the begin
    /// callback. Panics when called outside that window.
    fn start_interactive_transition(&self, ctx: TransitionContext) {
        assert!(
            self.ready_to_start.get(),
            "interactive transition may only start from a drag begin event"
        );
        self.state.borrow_mut().ctx = Some(ctx.clone());
        self.controller.start(ctx);
    }

    fn tick(&self, dt: std::time::Duration) {
        self.controller.tick(dt);
        if self.controller.state() == InteractiveState::Inactive
            && self.state.borrow().ctx.is_some()
        {
            self.state.borrow_mut().ctx = None;
        }
    }
}
