#![forbid(unsafe_code)]

//! Screen container orchestrating transitions.
//!
//! [`TransitionContainer`] owns one container view, keeps exactly one
//! *current* screen installed in it, and runs transitions to other screens
//! through the animator / interaction machinery. It owns the mechanics
//! (attach and detach of views, appearance and parent lifecycle ordering,
//! context wiring); all policy comes from its [`ContainerDelegate`].
//!
//! # Invariants
//!
//! 1. At most one transition is in flight; a `transition_to` that arrives
//!    mid-flight is dropped.
//! 2. Outside a transition exactly the current screen's view is installed.
//!    A committed transition leaves only the destination installed; a rolled
//!    back one leaves only the source, relaid out by the delegate.
//! 3. Appearance callbacks pair up: every `begin_appearance_transition` on a
//!    screen is matched by `end_appearance_transition` before the transition
//!    settles, on the commit and the rollback path alike.
//! 4. The transition coordinator is observable only while its transition is
//!    in flight.
//!
//! # Failure Modes
//!
//! - A non-animated interactive request is a contract violation and panics.
//! - Driving the container without a live delegate panics; the delegate is
//!   held weakly and the host must keep it alive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, info};

use crate::animator::{InteractionController, InterruptibleHandle, TransitionAnimator};
use crate::context::TransitionContext;
use crate::coordinator::TransitionCoordinator;
use crate::delegate::ContainerDelegate;
use crate::geometry::Rect;
use crate::positions::AnimationPositions;
use crate::screen::ScreenRef;
use crate::view::View;

struct ActiveTransition {
    ctx: TransitionContext,
    animator: Option<Rc<dyn TransitionAnimator>>,
    /// Set only on the animated non-interactive interruption path; the
    /// interactive controller owns its handle itself.
    handle: Option<InterruptibleHandle>,
    controller: Option<Rc<dyn InteractionController>>,
}

struct ContainerInner {
    delegate: Option<Weak<dyn ContainerDelegate>>,
    view: Option<View>,
    current: Option<ScreenRef>,
    active: Option<ActiveTransition>,
}

/// Container managing a set of screens with one current at a time.
///
/// Cloning yields another handle to the same container.
pub struct TransitionContainer {
    inner: Rc<RefCell<ContainerInner>>,
}

impl Clone for TransitionContainer {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for TransitionContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TransitionContainer")
            .field("view_loaded", &inner.view.is_some())
            .field("has_current", &inner.current.is_some())
            .field("transition_active", &inner.active.is_some())
            .finish()
    }
}

impl Default for TransitionContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionContainer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ContainerInner {
                delegate: None,
                view: None,
                current: None,
                active: None,
            })),
        }
    }

    /// Install the delegate. Held weakly; the host keeps the strong
    /// reference.
    pub fn set_delegate(&self, delegate: &Rc<dyn ContainerDelegate>) {
        self.inner.borrow_mut().delegate = Some(Rc::downgrade(delegate));
    }

    fn delegate(&self) -> Rc<dyn ContainerDelegate> {
        self.inner
            .borrow()
            .delegate
            .as_ref()
            .and_then(Weak::upgrade)
            .expect("container driven without a live delegate")
    }

    /// Whether `load_view` has run.
    pub fn is_view_loaded(&self) -> bool {
        self.inner.borrow().view.is_some()
    }

    /// The container view. Panics before `load_view`.
    #[must_use]
    pub fn container_view(&self) -> View {
        self.inner
            .borrow()
            .view
            .clone()
            .expect("container view accessed before load_view")
    }

    /// Screen currently installed, if any.
    pub fn selected_screen(&self) -> Option<ScreenRef> {
        self.inner.borrow().current.clone()
    }

    /// Coordinator of the in-flight transition, if one is running.
    pub fn transition_coordinator(&self) -> Option<TransitionCoordinator> {
        self.inner
            .borrow()
            .active
            .as_ref()
            .map(|active| active.ctx.coordinator())
    }

    /// Create the container view at `bounds` and install the delegate's
    /// initial screen. No-op when the view is already loaded.
    pub fn load_view(&self, bounds: Rect) {
        if self.is_view_loaded() {
            return;
        }
        let initial = self.delegate().initial_screen(self);
        self.inner.borrow_mut().view = Some(View::new(bounds));
        info!(?bounds, "container view loaded");
        self.transition_to(&initial, false, false);
    }

    /// Transition from the current screen to `screen`.
    ///
    /// `animated` is honored only when the delegate supplies an animator;
    /// `interactive` only when it additionally supplies an interaction
    /// controller. A request that cannot be satisfied silently degrades.
    /// Requests that arrive before the view loads, while another transition
    /// is in flight, or that target the current screen are dropped.
    ///
    /// Panics when asked for a non-animated interactive transition.
    pub fn transition_to(&self, screen: &ScreenRef, animated: bool, interactive: bool) {
        assert!(
            animated || !interactive,
            "an interactive transition must be animated"
        );
        let (view, from) = {
            let inner = self.inner.borrow();
            if inner.active.is_some() {
                debug!("transition requested while one is in flight, dropping");
                return;
            }
            let Some(view) = inner.view.clone() else {
                debug!("transition requested before the container view loaded, dropping");
                return;
            };
            (view, inner.current.clone())
        };

        let Some(from) = from else {
            self.install_initial(screen, &view);
            return;
        };
        if from == *screen {
            return;
        }

        let delegate = self.delegate();
        let animator = if animated {
            delegate.animator_for(self, &from, screen)
        } else {
            None
        };
        let is_animated = animated && animator.is_some();
        let controller = match (&animator, interactive) {
            (Some(animator), true) => delegate.interaction_controller_for(self, animator),
            _ => None,
        };
        let is_interactive = is_animated && controller.is_some();
        info!(
            animated = is_animated,
            interactive = is_interactive,
            "starting transition"
        );

        let positions = delegate
            .positions_for(self, &from, screen)
            .unwrap_or_else(|| AnimationPositions::identity(view.bounds()));

        let ctx = TransitionContext::new(view.clone(), from.clone(), screen.clone(), positions);
        ctx.set_animated(is_animated);
        ctx.set_interactive(is_interactive);
        delegate.on_will_transition(self, &from, screen, &ctx.coordinator());

        // Source begins leaving, destination begins appearing off-stage.
        from.will_move_to_parent(false);
        from.begin_appearance_transition(false, is_animated);
        delegate.release_layout(self, &from);
        screen.will_move_to_parent(true);
        screen.begin_appearance_transition(true, is_animated);
        view.add_subview(&screen.view());
        screen.view().set_frame(positions.to_initial);

        let weak = Rc::downgrade(&self.inner);
        let (closure_from, closure_to) = (from.clone(), screen.clone());
        ctx.set_completion(move |did_complete| {
            if let Some(inner) = weak.upgrade() {
                let container = TransitionContainer { inner };
                container.settle(&closure_from, &closure_to, did_complete, is_animated);
            }
        });

        let mut handle = None;
        if is_animated
            && !is_interactive
            && let Some(animator) = &animator
        {
            handle = animator.interruptible_animator(&ctx);
        }
        self.inner.borrow_mut().active = Some(ActiveTransition {
            ctx: ctx.clone(),
            animator: animator.clone(),
            handle: handle.clone(),
            controller: controller.clone(),
        });

        ctx.coordinator().perform_alongside_animations();

        if !is_animated {
            ctx.complete_transition(true);
        } else if is_interactive {
            controller
                .expect("interactive flag implies a controller")
                .start_interactive_transition(ctx);
        } else if let Some(handle) = handle {
            handle.start();
        } else {
            animator
                .expect("animated flag implies an animator")
                .animate(&ctx);
        }
    }

    /// Advance any in-flight transition machinery by `dt` of host time.
    pub fn tick(&self, dt: Duration) {
        let Some((animator, handle, controller)) = ({
            let inner = self.inner.borrow();
            inner.active.as_ref().map(|active| {
                (
                    active.animator.clone(),
                    active.handle.clone(),
                    active.controller.clone(),
                )
            })
        }) else {
            return;
        };
        if let Some(controller) = controller {
            controller.tick(dt);
        } else if let Some(handle) = handle {
            handle.tick(dt);
        }
        if let Some(animator) = animator {
            animator.tick(dt);
        }
    }

    // ---- internals --------------------------------------------------------

    fn install_initial(&self, screen: &ScreenRef, view: &View) {
        info!("installing initial screen");
        let delegate = self.delegate();
        screen.will_move_to_parent(true);
        view.add_subview(&screen.view());
        delegate.layout(self, screen, view);
        screen.did_move_to_parent(true);
        self.inner.borrow_mut().current = Some(screen.clone());
        delegate.on_transition_finished(self, screen, false);
    }

    /// Completion path for every transition route, committed or rolled back.
    fn settle(&self, from: &ScreenRef, to: &ScreenRef, did_complete: bool, animated: bool) {
        let delegate = self.delegate();
        let view = self.container_view();

        // The layer state is transition-scoped; whatever an interactive
        // drive left behind is reset now.
        view.set_layer_speed(1.0);
        view.set_layer_time_offset(0.0);

        let new_current = if did_complete {
            from.view().remove_from_superview();
            from.did_move_to_parent(false);
            from.end_appearance_transition();

            view.add_subview(&to.view());
            delegate.layout(self, to, &view);
            to.did_move_to_parent(true);
            to.end_appearance_transition();
            to.clone()
        } else {
            // Roll back: the destination disappears again and the source is
            // rebalanced as if it never started leaving.
            to.begin_appearance_transition(false, animated);
            to.view().remove_from_superview();
            to.did_move_to_parent(false);
            to.end_appearance_transition();

            from.begin_appearance_transition(true, animated);
            view.add_subview(&from.view());
            delegate.layout(self, from, &view);
            from.did_move_to_parent(true);
            from.end_appearance_transition();
            from.clone()
        };

        let (prior, coordinator) = {
            let mut inner = self.inner.borrow_mut();
            let prior = inner.current.replace(new_current.clone());
            let coordinator = inner
                .active
                .take()
                .map(|active| active.ctx.coordinator());
            (prior, coordinator)
        };

        // Cancelled means the screen on stage is the one that was on stage
        // before the transition began.
        let was_cancelled = prior.as_ref() == Some(&new_current);
        info!(was_cancelled, "transition settled");
        if let Some(coordinator) = coordinator {
            coordinator.set_cancelled(was_cancelled);
            coordinator.complete_transition();
        }
        delegate.on_transition_finished(self, &new_current, was_cancelled);
    }
}
