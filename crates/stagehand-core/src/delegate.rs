#![forbid(unsafe_code)]

//! Delegate seam between a [`TransitionContainer`] and its host.
//!
//! The container owns mechanics (view hierarchy, lifecycle ordering, context
//! plumbing); everything policy-shaped goes through [`ContainerDelegate`]:
//! which screen comes first, which animator and interaction controller serve
//! a given transition, where screens start and end up, and what happens
//! around each transition. Only [`initial_screen`] is required; every other
//! method has a workable default.
//!
//! [`TransitionContainer`]: crate::container::TransitionContainer
//! [`initial_screen`]: ContainerDelegate::initial_screen

use std::rc::Rc;

use crate::animator::{InteractionController, TransitionAnimator};
use crate::container::TransitionContainer;
use crate::coordinator::TransitionCoordinator;
use crate::positions::AnimationPositions;
use crate::screen::ScreenRef;
use crate::view::View;

/// Host policy for a [`TransitionContainer`].
///
/// [`TransitionContainer`]: crate::container::TransitionContainer
pub trait ContainerDelegate {
    /// Screen installed when the container's view loads.
    fn initial_screen(&self, container: &TransitionContainer) -> ScreenRef;

    /// Animator for a transition between two screens. `None` forces the
    /// transition to run non-animated regardless of what the caller asked.
    fn animator_for(
        &self,
        container: &TransitionContainer,
        from: &ScreenRef,
        to: &ScreenRef,
    ) -> Option<Rc<dyn TransitionAnimator>> {
        let _ = (container, from, to);
        None
    }

    /// Interaction controller for a transition. `None` downgrades an
    /// interactive request to a plain animated one. Only consulted when an
    /// animator was supplied.
    fn interaction_controller_for(
        &self,
        container: &TransitionContainer,
        animator: &Rc<dyn TransitionAnimator>,
    ) -> Option<Rc<dyn InteractionController>> {
        let _ = (container, animator);
        None
    }

    /// Start and end frames for both screens. `None` keeps every frame equal
    /// to the container bounds.
    fn positions_for(
        &self,
        container: &TransitionContainer,
        from: &ScreenRef,
        to: &ScreenRef,
    ) -> Option<AnimationPositions> {
        let _ = (container, from, to);
        None
    }

    /// Size a screen's view inside the container view. The default fills the
    /// container bounds.
    fn layout(&self, container: &TransitionContainer, screen: &ScreenRef, container_view: &View) {
        let _ = container;
        screen.view().set_frame(container_view.bounds());
    }

    /// Undo whatever [`layout`](Self::layout) established for a screen that
    /// is leaving. The default does nothing.
    fn release_layout(&self, container: &TransitionContainer, screen: &ScreenRef) {
        let _ = (container, screen);
    }

    /// Called right before transition work begins, with the coordinator the
    /// host can use to attach alongside animations and observers.
    fn on_will_transition(
        &self,
        container: &TransitionContainer,
        from: &ScreenRef,
        to: &ScreenRef,
        coordinator: &TransitionCoordinator,
    ) {
        let _ = (container, from, to, coordinator);
    }

    /// Called after a transition settles, animated or not, with the screen
    /// that ended up current and whether the transition was rolled back.
    fn on_transition_finished(
        &self,
        container: &TransitionContainer,
        current: &ScreenRef,
        was_cancelled: bool,
    ) {
        let _ = (container, current, was_cancelled);
    }
}
