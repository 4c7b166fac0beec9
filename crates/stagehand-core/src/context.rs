#![forbid(unsafe_code)]

//! Transition context: the per-transition mediator handed to animators.
//!
//! A context is created fresh for every transition and discarded once its
//! completion callback fires. It answers the animator's questions (frames,
//! screens, views), stores interactive progress, and carries the one
//! contractual obligation of whichever component drives the transition:
//! calling [`complete_transition`](TransitionContext::complete_transition)
//! exactly once.
//!
//! The context owns the transition's [`TransitionCoordinator`] and keeps its
//! mirrored flags up to date.
//!
//! # Failure Modes
//!
//! - **Double completion**: calling `complete_transition` twice is a
//!   programmer-contract violation and panics. The completion callback is a
//!   consumed one-shot; there is no recovery from completing a transition
//!   that already resolved.
//! - **Foreign screen**: frame queries for a screen that is neither side of
//!   this transition panic.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::coordinator::{TransitionCoordinator, TransitionKey};
use crate::geometry::{Rect, Transform};
use crate::positions::AnimationPositions;
use crate::screen::ScreenRef;
use crate::view::View;

type CompletionFn = Box<dyn FnOnce(bool)>;

struct ContextInner {
    container_view: View,
    from: ScreenRef,
    to: ScreenRef,
    positions: AnimationPositions,

    is_animated: bool,
    is_interactive: bool,
    was_cancelled: bool,
    percent_complete: f32,
    target_transform: Transform,

    /// One-shot; consumed by `complete_transition`.
    completion: Option<CompletionFn>,
    coordinator: TransitionCoordinator,
}

/// Mediator between the container and whatever drives a transition.
///
/// Cloning shares the same underlying transition state.
pub struct TransitionContext {
    inner: Rc<RefCell<ContextInner>>,
}

impl Clone for TransitionContext {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for TransitionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TransitionContext")
            .field("is_animated", &inner.is_animated)
            .field("is_interactive", &inner.is_interactive)
            .field("was_cancelled", &inner.was_cancelled)
            .field("percent_complete", &inner.percent_complete)
            .field("completed", &inner.completion.is_none())
            .finish()
    }
}

impl TransitionContext {
    pub(crate) fn new(
        container_view: View,
        from: ScreenRef,
        to: ScreenRef,
        positions: AnimationPositions,
    ) -> Self {
        let coordinator =
            TransitionCoordinator::new(container_view.clone(), from.clone(), to.clone());
        Self {
            inner: Rc::new(RefCell::new(ContextInner {
                container_view,
                from,
                to,
                positions,
                is_animated: false,
                is_interactive: false,
                was_cancelled: false,
                percent_complete: 0.0,
                target_transform: Transform::IDENTITY,
                completion: None,
                coordinator,
            })),
        }
    }

    // ---- identity and geometry --------------------------------------------

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

    /// The frame `screen` occupies before the transition.
    ///
    /// Panics if `screen` is neither side of this transition.
    pub fn initial_frame(&self, screen: &ScreenRef) -> Rect {
        let inner = self.inner.borrow();
        if *screen == inner.from {
            inner.positions.from_initial
        } else if *screen == inner.to {
            inner.positions.to_initial
        } else {
            panic!("frame query for a screen that is not part of this transition");
        }
    }

    /// The frame `screen` occupies after the transition.
    ///
    /// Panics if `screen` is neither side of this transition.
    pub fn final_frame(&self, screen: &ScreenRef) -> Rect {
        let inner = self.inner.borrow();
        if *screen == inner.from {
            inner.positions.from_final
        } else if *screen == inner.to {
            inner.positions.to_final
        } else {
            panic!("frame query for a screen that is not part of this transition");
        }
    }

    // ---- flags ------------------------------------------------------------

    /// Whether the transition animates.
    pub fn is_animated(&self) -> bool {
        self.inner.borrow().is_animated
    }

    /// Whether the transition is currently interactive.
    pub fn is_interactive(&self) -> bool {
        self.inner.borrow().is_interactive
    }

    /// Whether the transition was cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.inner.borrow().was_cancelled
    }

    /// Last interactive progress recorded, in [0, 1].
    pub fn percent_complete(&self) -> f32 {
        self.inner.borrow().percent_complete
    }

    /// The transform applied to alongside-animated views at completion.
    pub fn target_transform(&self) -> Transform {
        self.inner.borrow().target_transform
    }

    /// The coordinator observing this transition.
    pub fn coordinator(&self) -> TransitionCoordinator {
        self.inner.borrow().coordinator.clone()
    }

    pub(crate) fn set_animated(&self, animated: bool) {
        let coordinator = {
            let mut inner = self.inner.borrow_mut();
            inner.is_animated = animated;
            inner.coordinator.clone()
        };
        coordinator.set_animated(animated);
    }

    pub(crate) fn set_interactive(&self, interactive: bool) {
        let coordinator = {
            let mut inner = self.inner.borrow_mut();
            inner.is_interactive = interactive;
            inner.coordinator.clone()
        };
        coordinator.set_interactive(interactive);
    }

    pub(crate) fn set_target_transform(&self, transform: Transform) {
        let coordinator = {
            let mut inner = self.inner.borrow_mut();
            inner.target_transform = transform;
            inner.coordinator.clone()
        };
        coordinator.set_target_transform(transform);
    }

    fn set_was_cancelled(&self, cancelled: bool) {
        let coordinator = {
            let mut inner = self.inner.borrow_mut();
            inner.was_cancelled = cancelled;
            inner.coordinator.clone()
        };
        coordinator.set_cancelled(cancelled);
    }

    /// Install the container's completion callback. Called once per
    /// transition, before any driver runs.
    pub(crate) fn set_completion(&self, completion: impl FnOnce(bool) + 'static) {
        self.inner.borrow_mut().completion = Some(Box::new(completion));
    }

    // ---- driver obligations -----------------------------------------------

    /// Record interactive progress. Storage only; animators poll it.
    pub fn update_interactive_transition(&self, percent: f32) {
        let coordinator = {
            let mut inner = self.inner.borrow_mut();
            inner.percent_complete = percent;
            inner.coordinator.clone()
        };
        coordinator.set_percent_complete(percent);
    }

    /// Mark the interactive phase finished (heading to completion) and fire
    /// the coordinator's interaction-stopped notifications synchronously.
    pub fn finish_interactive_transition(&self) {
        trace!("interactive transition finishing");
        self.coordinator().notify_interaction_stopped();
        self.set_was_cancelled(false);
    }

    /// Mark the interactive phase cancelled (heading back to the start) and
    /// fire the coordinator's interaction-stopped notifications synchronously.
    pub fn cancel_interactive_transition(&self) {
        trace!("interactive transition cancelling");
        self.coordinator().notify_interaction_stopped();
        self.set_was_cancelled(true);
    }

    /// Resolve the transition. `did_complete` reports whether the destination
    /// took over (`true`) or the transition rolled back (`false`).
    ///
    /// Whichever component drives the transition must call this exactly once;
    /// a second call panics.
    pub fn complete_transition(&self, did_complete: bool) {
        let completion = self.inner.borrow_mut().completion.take();
        let Some(completion) = completion else {
            panic!("complete_transition called on an already-completed transition");
        };
        trace!(did_complete, "transition completing");
        completion(did_complete);
    }
}

#[cfg(test)]
mod tests {
    use super::TransitionContext;
    use crate::coordinator::TransitionKey;
    use crate::geometry::Rect;
    use crate::positions::AnimationPositions;
    use crate::screen::{BasicScreen, ScreenRef};
    use crate::view::View;
    use std::cell::Cell;
    use std::rc::Rc;

    fn context_with_positions(positions: AnimationPositions) -> (TransitionContext, ScreenRef, ScreenRef) {
        let bounds = Rect::from_size(80, 24);
        let from = ScreenRef::new(BasicScreen::new(View::new(bounds)));
        let to = ScreenRef::new(BasicScreen::new(View::new(bounds)));
        let ctx = TransitionContext::new(View::new(bounds), from.clone(), to.clone(), positions);
        (ctx, from, to)
    }

    #[test]
    fn frame_queries_pick_the_right_side() {
        let positions = AnimationPositions::new(
            Rect::new(0, 0, 80, 24),
            Rect::new(-80, 0, 80, 24),
            Rect::new(80, 0, 80, 24),
            Rect::new(0, 0, 80, 24),
        );
        let (ctx, from, to) = context_with_positions(positions);
        assert_eq!(ctx.initial_frame(&from), positions.from_initial);
        assert_eq!(ctx.final_frame(&from), positions.from_final);
        assert_eq!(ctx.initial_frame(&to), positions.to_initial);
        assert_eq!(ctx.final_frame(&to), positions.to_final);
    }

    #[test]
    #[should_panic(expected = "not part of this transition")]
    fn frame_query_for_foreign_screen_panics() {
        let (ctx, _, _) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        let stranger = ScreenRef::new(BasicScreen::new(View::new(Rect::from_size(80, 24))));
        ctx.initial_frame(&stranger);
    }

    #[test]
    fn flags_propagate_to_coordinator() {
        let (ctx, _, _) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        ctx.set_animated(true);
        ctx.set_interactive(true);
        assert!(ctx.coordinator().is_animated());
        assert!(ctx.coordinator().is_interactive());
        assert!(ctx.coordinator().initially_interactive());

        ctx.cancel_interactive_transition();
        assert!(ctx.was_cancelled());
        assert!(ctx.coordinator().is_cancelled());
        assert!(!ctx.coordinator().is_interactive());
    }

    #[test]
    fn update_stores_percent_verbatim() {
        let (ctx, _, _) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        ctx.update_interactive_transition(0.42);
        assert_eq!(ctx.percent_complete(), 0.42);
        assert_eq!(ctx.coordinator().percent_complete(), 0.42);
    }

    #[test]
    fn completion_fires_once_with_flag() {
        let (ctx, _, _) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        let seen: Rc<Cell<Option<bool>>> = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        ctx.set_completion(move |did_complete| s.set(Some(did_complete)));
        ctx.complete_transition(true);
        assert_eq!(seen.get(), Some(true));
    }

    #[test]
    #[should_panic(expected = "already-completed")]
    fn double_completion_panics() {
        let (ctx, _, _) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        ctx.set_completion(|_| {});
        ctx.complete_transition(true);
        ctx.complete_transition(true);
    }

    #[test]
    fn interaction_ended_observers_fire_synchronously() {
        let (ctx, _, _) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        ctx.set_interactive(true);
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        ctx.coordinator()
            .notify_when_interaction_ends(move |c| {
                f.set(true);
                assert!(c.is_cancelled() || !c.is_interactive());
            });
        ctx.finish_interactive_transition();
        assert!(fired.get());
        assert!(!ctx.was_cancelled());
    }

    #[test]
    fn key_lookup_returns_screens_and_views() {
        let (ctx, from, to) = context_with_positions(AnimationPositions::identity(Rect::from_size(80, 24)));
        assert_eq!(ctx.screen(TransitionKey::From), from);
        assert_eq!(ctx.screen(TransitionKey::To), to);
        assert!(ctx.view(TransitionKey::From).ptr_eq(&from.view()));
        assert!(ctx.view(TransitionKey::To).ptr_eq(&to.view()));
    }
}
