#![forbid(unsafe_code)]

//! Swipe container: an ordered set of screens navigated by horizontal drags.
//!
//! [`SwipeContainer`] wires a [`TransitionContainer`] together with a
//! [`SlideAnimator`] and a [`PanGestureInteraction`]: dragging right reveals
//! the previous screen, dragging left the next one, and releasing commits or
//! rolls back based on the recognizer's thresholds. Programmatic navigation
//! goes through [`select`](SwipeContainer::select).
//!
//! # Invariants
//!
//! 1. The screen list is fixed at construction and never empty.
//! 2. Drags at either end of the list do nothing; there is no wrap-around.
//! 3. Observers see `will_transition` before any movement and exactly one
//!    `did_finish_transition` per settled transition.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

use stagehand_core::animator::{InteractionController, TransitionAnimator};
use stagehand_core::coordinator::TransitionCoordinator;
use stagehand_core::delegate::ContainerDelegate;
use stagehand_core::geometry::Rect;
use stagehand_core::gesture::DragGesture;
use stagehand_core::interactive::{DriveMode, PercentDrivenInteraction};
use stagehand_core::positions::AnimationPositions;
use stagehand_core::screen::ScreenRef;
use stagehand_core::view::View;
use stagehand_core::{PanGestureInteraction, TransitionContainer};

use crate::slide::{slide_positions, SlideAnimator};

/// Host-facing notifications about swipe navigation.
pub trait SwipeObserver {
    /// A transition between two indices is about to start.
    fn will_transition(
        &self,
        from_index: usize,
        to_index: usize,
        coordinator: &TransitionCoordinator,
    ) {
        let _ = (from_index, to_index, coordinator);
    }

    /// A transition settled on `index`; `was_cancelled` reports a rollback.
    fn did_finish_transition(&self, index: usize, was_cancelled: bool) {
        let _ = (index, was_cancelled);
    }
}

struct SwipeInner {
    container: TransitionContainer,
    screens: Vec<ScreenRef>,
    animator: Rc<SlideAnimator>,
    pan: PanGestureInteraction,
    observers: RefCell<Vec<Weak<dyn SwipeObserver>>>,
}

impl SwipeInner {
    fn index_of(&self, screen: &ScreenRef) -> Option<usize> {
        self.screens.iter().position(|candidate| candidate == screen)
    }

    fn selected_index(&self) -> usize {
        self.container
            .selected_screen()
            .and_then(|screen| self.index_of(&screen))
            .unwrap_or(0)
    }

    fn notify(&self, f: impl Fn(&dyn SwipeObserver)) {
        let observers: Vec<_> = {
            let mut slot = self.observers.borrow_mut();
            slot.retain(|observer| observer.strong_count() > 0);
            slot.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in observers {
            f(&*observer);
        }
    }
}

impl ContainerDelegate for SwipeInner {
    fn initial_screen(&self, _container: &TransitionContainer) -> ScreenRef {
        self.screens[0].clone()
    }

    fn animator_for(
        &self,
        _container: &TransitionContainer,
        _from: &ScreenRef,
        _to: &ScreenRef,
    ) -> Option<Rc<dyn TransitionAnimator>> {
        Some(Rc::clone(&self.animator) as _)
    }

    fn interaction_controller_for(
        &self,
        _container: &TransitionContainer,
        animator: &Rc<dyn TransitionAnimator>,
    ) -> Option<Rc<dyn InteractionController>> {
        // Only gesture-initiated transitions are interactive; `select` runs
        // as a plain animated transition.
        if !self.pan.is_ready_to_start() {
            return None;
        }
        self.pan.controller().bind_animator(Rc::clone(animator));
        Some(Rc::new(self.pan.clone()) as _)
    }

    fn positions_for(
        &self,
        container: &TransitionContainer,
        from: &ScreenRef,
        to: &ScreenRef,
    ) -> Option<AnimationPositions> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;
        Some(slide_positions(
            container.container_view().bounds(),
            to_index > from_index,
        ))
    }

    fn on_will_transition(
        &self,
        _container: &TransitionContainer,
        from: &ScreenRef,
        to: &ScreenRef,
        coordinator: &TransitionCoordinator,
    ) {
        let (Some(from_index), Some(to_index)) = (self.index_of(from), self.index_of(to)) else {
            return;
        };
        self.notify(|observer| observer.will_transition(from_index, to_index, coordinator));
    }

    fn on_transition_finished(
        &self,
        _container: &TransitionContainer,
        current: &ScreenRef,
        was_cancelled: bool,
    ) {
        let Some(index) = self.index_of(current) else {
            return;
        };
        self.notify(|observer| observer.did_finish_transition(index, was_cancelled));
    }
}

/// An ordered set of screens with slide transitions and swipe navigation.
///
/// Cloning yields another handle to the same container.
pub struct SwipeContainer {
    inner: Rc<SwipeInner>,
}

impl Clone for SwipeContainer {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for SwipeContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeContainer")
            .field("screens", &self.inner.screens.len())
            .field("selected_index", &self.inner.selected_index())
            .finish()
    }
}

impl SwipeContainer {
    /// Build a container over `screens` with the default slide animator.
    ///
    /// Panics when `screens` is empty.
    #[must_use]
    pub fn new(screens: Vec<ScreenRef>) -> Self {
        Self::with_animator(screens, SlideAnimator::new())
    }

    /// Build a container over `screens` with a custom slide animator.
    ///
    /// Panics when `screens` is empty.
    #[must_use]
    pub fn with_animator(screens: Vec<ScreenRef>, animator: SlideAnimator) -> Self {
        assert!(!screens.is_empty(), "a swipe container needs at least one screen");
        let pan =
            PanGestureInteraction::new(PercentDrivenInteraction::new(DriveMode::TimeOffset));
        let inner = Rc::new(SwipeInner {
            container: TransitionContainer::new(),
            screens,
            animator: Rc::new(animator),
            pan: pan.clone(),
            observers: RefCell::new(Vec::new()),
        });
        inner
            .container
            .set_delegate(&(Rc::clone(&inner) as Rc<dyn ContainerDelegate>));

        let weak = Rc::downgrade(&inner);
        pan.set_begin_callback(move |velocity_x| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let selected = inner.selected_index();
            // Dragging right (positive velocity) reveals the previous
            // screen; dragging left the next one.
            let target = if velocity_x > 0.0 {
                selected.checked_sub(1)
            } else {
                let next = selected + 1;
                (next < inner.screens.len()).then_some(next)
            };
            let Some(target) = target else {
                debug!(selected, "swipe at the end of the screen list, ignoring");
                return;
            };
            inner
                .container
                .transition_to(&inner.screens[target], true, true);
        });

        Self { inner }
    }

    /// Create the container view and install the first screen.
    pub fn load_view(&self, bounds: Rect) {
        self.inner.container.load_view(bounds);
    }

    /// The container view. Panics before [`load_view`](Self::load_view).
    #[must_use]
    pub fn container_view(&self) -> View {
        self.inner.container.container_view()
    }

    /// The managed screens, in navigation order.
    pub fn screens(&self) -> &[ScreenRef] {
        &self.inner.screens
    }

    /// Index of the currently selected screen.
    pub fn selected_index(&self) -> usize {
        self.inner.selected_index()
    }

    /// Coordinator of the in-flight transition, if one is running.
    pub fn transition_coordinator(&self) -> Option<TransitionCoordinator> {
        self.inner.container.transition_coordinator()
    }

    /// Navigate to `index` programmatically.
    ///
    /// Panics when `index` is out of range. Dropped while a transition is in
    /// flight, like any other transition request.
    pub fn select(&self, index: usize, animated: bool) {
        let screen = self
            .inner
            .screens
            .get(index)
            .unwrap_or_else(|| panic!("screen index {index} out of range"))
            .clone();
        self.inner.container.transition_to(&screen, animated, false);
    }

    /// Register an observer. Held weakly; the host keeps the strong
    /// reference.
    pub fn add_observer(&self, observer: &Rc<dyn SwipeObserver>) {
        self.inner
            .observers
            .borrow_mut()
            .push(Rc::downgrade(observer));
    }

    /// Feed one drag event into the swipe recognizer.
    pub fn handle_drag(&self, gesture: DragGesture) {
        self.inner.pan.handle_drag(gesture);
    }

    /// Advance animations and interactive teardown by `dt` of host time.
    pub fn tick(&self, dt: Duration) {
        self.inner.container.tick(dt);
    }
}
