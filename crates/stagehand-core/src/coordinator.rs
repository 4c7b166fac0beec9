#![forbid(unsafe_code)]

//! Transition coordinator: the observer hub third parties hook into.
//!
//! The coordinator is a registration-only surface. Collaborators register
//! alongside-animation callbacks, completion callbacks, and interaction
//! observers; the transition machinery fires each registry exactly once, in
//! registration order, when the corresponding event occurs. There is no
//! removal API; callbacks registered after their event has already fired are
//! dropped with the coordinator.
//!
//! The coordinator mirrors the transition context's flags so observers never
//! need the context itself. It is created together with the context and is
//! meaningful until the transition's completion callback fires.
//!
//! # Invariants
//!
//! 1. Every registered callback fires at most once.
//! 2. Callbacks fire in registration order.
//! 3. [`notify_interaction_stopped`](TransitionCoordinator::notify_interaction_stopped)
//!    is the single interactive → non-interactive edge: it clears
//!    `is_interactive`, then fires interaction-changed, then interaction-ended.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::easing::{EasingFn, linear};
use crate::geometry::Transform;
use crate::screen::ScreenRef;
use crate::view::View;

/// Which side of a transition a lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKey {
    /// The outgoing screen.
    From,
    /// The incoming screen.
    To,
}

/// A one-shot observer callback receiving the coordinator it registered with.
pub type CoordinatorCallback = Box<dyn FnOnce(&TransitionCoordinator)>;

struct CoordinatorInner {
    container_view: View,
    from: ScreenRef,
    to: ScreenRef,

    is_animated: bool,
    is_interactive: bool,
    initially_interactive: bool,
    is_cancelled: bool,
    target_transform: Transform,
    transition_duration: Duration,
    percent_complete: f32,
    completion_velocity: f32,
    completion_curve: EasingFn,

    /// Set once the alongside animations have been performed; registrations
    /// arriving later are refused.
    animations_performed: bool,
    alongside_animations: Vec<CoordinatorCallback>,
    completion_callbacks: Vec<CoordinatorCallback>,
    change_callbacks: Vec<CoordinatorCallback>,
    end_callbacks: Vec<CoordinatorCallback>,
    /// Views animated alongside that live outside the container hierarchy.
    other_animated_views: Vec<View>,
}

/// Observer-registration hub for a single transition.
///
/// Cloning shares the same underlying state.
pub struct TransitionCoordinator {
    inner: Rc<RefCell<CoordinatorInner>>,
}

impl Clone for TransitionCoordinator {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for TransitionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TransitionCoordinator")
            .field("is_animated", &inner.is_animated)
            .field("is_interactive", &inner.is_interactive)
            .field("is_cancelled", &inner.is_cancelled)
            .field("percent_complete", &inner.percent_complete)
            .field("pending_animations", &inner.alongside_animations.len())
            .field("pending_completions", &inner.completion_callbacks.len())
            .finish()
    }
}

impl TransitionCoordinator {
    pub(crate) fn new(container_view: View, from: ScreenRef, to: ScreenRef) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CoordinatorInner {
                container_view,
                from,
                to,
                is_animated: false,
                is_interactive: false,
                initially_interactive: false,
                is_cancelled: false,
                target_transform: Transform::IDENTITY,
                transition_duration: Duration::from_millis(500),
                percent_complete: 0.0,
                completion_velocity: 1.0,
                completion_curve: linear,
                animations_performed: false,
                alongside_animations: Vec::new(),
                completion_callbacks: Vec::new(),
                change_callbacks: Vec::new(),
                end_callbacks: Vec::new(),
                other_animated_views: Vec::new(),
            })),
        }
    }

    // ---- mirrored state ---------------------------------------------------

    /// Whether the transition animates.
    pub fn is_animated(&self) -> bool {
        self.inner.borrow().is_animated
    }

    /// Whether the transition is currently interactive.
    pub fn is_interactive(&self) -> bool {
        self.inner.borrow().is_interactive
    }

    /// Whether the transition started out interactive.
    pub fn initially_interactive(&self) -> bool {
        self.inner.borrow().initially_interactive
    }

    /// Whether the transition has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.borrow().is_cancelled
    }

    /// The transform applied to alongside-animated views at completion.
    pub fn target_transform(&self) -> Transform {
        self.inner.borrow().target_transform
    }

    /// The driving animator's duration.
    pub fn transition_duration(&self) -> Duration {
        self.inner.borrow().transition_duration
    }

    /// Progress reported when interaction handed off to completion.
    pub fn percent_complete(&self) -> f32 {
        self.inner.borrow().percent_complete
    }

    /// Speed factor for the non-interactive completion phase.
    pub fn completion_velocity(&self) -> f32 {
        self.inner.borrow().completion_velocity
    }

    /// Easing curve for the non-interactive completion phase.
    pub fn completion_curve(&self) -> EasingFn {
        self.inner.borrow().completion_curve
    }

    /// The view hosting the transition.
    pub fn container_view(&self) -> View {
        self.inner.borrow().container_view.clone()
    }

    /// The screen on the given side of the transition.
    pub fn screen(&self, key: TransitionKey) -> ScreenRef {
        let inner = self.inner.borrow();
        match key {
            TransitionKey::From => inner.from.clone(),
            TransitionKey::To => inner.to.clone(),
        }
    }

    /// The root view of the screen on the given side.
    pub fn view(&self, key: TransitionKey) -> View {
        self.screen(key).view()
    }

    /// Views registered for animation outside the container hierarchy.
    pub fn other_animated_views(&self) -> Vec<View> {
        self.inner.borrow().other_animated_views.clone()
    }

    pub(crate) fn set_animated(&self, animated: bool) {
        self.inner.borrow_mut().is_animated = animated;
    }

    pub(crate) fn set_interactive(&self, interactive: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.is_interactive = interactive;
        inner.initially_interactive = interactive;
    }

    pub(crate) fn set_cancelled(&self, cancelled: bool) {
        self.inner.borrow_mut().is_cancelled = cancelled;
    }

    pub(crate) fn set_target_transform(&self, transform: Transform) {
        self.inner.borrow_mut().target_transform = transform;
    }

    pub(crate) fn set_transition_duration(&self, duration: Duration) {
        self.inner.borrow_mut().transition_duration = duration;
    }

    pub(crate) fn set_percent_complete(&self, percent: f32) {
        self.inner.borrow_mut().percent_complete = percent;
    }

    // ---- registration -----------------------------------------------------

    /// Register an animation to run alongside the transition, and optionally
    /// a completion callback. Returns whether anything was registered; once
    /// the transition has dispatched its animations, registration is refused.
    pub fn animate_alongside(
        &self,
        animation: Option<CoordinatorCallback>,
        completion: Option<CoordinatorCallback>,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.animations_performed {
            return false;
        }
        let mut added = false;
        if let Some(animation) = animation {
            inner.alongside_animations.push(animation);
            added = true;
        }
        if let Some(completion) = completion {
            inner.completion_callbacks.push(completion);
            added = true;
        }
        added
    }

    /// Like [`animate_alongside`](Self::animate_alongside), additionally
    /// recording `view` as an auxiliary animated view outside the container
    /// hierarchy.
    pub fn animate_alongside_in_view(
        &self,
        view: Option<&View>,
        animation: Option<CoordinatorCallback>,
        completion: Option<CoordinatorCallback>,
    ) -> bool {
        let added_view = {
            let mut inner = self.inner.borrow_mut();
            match view {
                Some(view) if !inner.animations_performed => {
                    inner.other_animated_views.push(view.clone());
                    true
                }
                _ => false,
            }
        };
        self.animate_alongside(animation, completion) || added_view
    }

    /// Register an observer for the interactive → non-interactive edge.
    pub fn notify_when_interaction_changes(
        &self,
        handler: impl FnOnce(&TransitionCoordinator) + 'static,
    ) {
        self.inner
            .borrow_mut()
            .change_callbacks
            .push(Box::new(handler));
    }

    /// Register an observer for the end of the interactive phase.
    pub fn notify_when_interaction_ends(
        &self,
        handler: impl FnOnce(&TransitionCoordinator) + 'static,
    ) {
        self.inner
            .borrow_mut()
            .end_callbacks
            .push(Box::new(handler));
    }

    // ---- event entry points -----------------------------------------------

    /// Fire all registered alongside animations, in registration order, and
    /// close registration.
    pub(crate) fn perform_alongside_animations(&self) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.animations_performed = true;
            std::mem::take(&mut inner.alongside_animations)
        };
        for callback in callbacks {
            callback(self);
        }
    }

    /// Fire all registered completion callbacks, in registration order.
    pub(crate) fn complete_transition(&self) {
        let callbacks = std::mem::take(&mut self.inner.borrow_mut().completion_callbacks);
        for callback in callbacks {
            callback(self);
        }
    }

    /// Transition from interactive to non-interactive, firing the
    /// interaction-changed and then the interaction-ended observers.
    pub(crate) fn notify_interaction_stopped(&self) {
        self.inner.borrow_mut().is_interactive = false;
        let changed = std::mem::take(&mut self.inner.borrow_mut().change_callbacks);
        for callback in changed {
            callback(self);
        }
        let ended = std::mem::take(&mut self.inner.borrow_mut().end_callbacks);
        for callback in ended {
            callback(self);
        }
    }
}
