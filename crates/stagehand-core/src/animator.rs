#![forbid(unsafe_code)]

//! Boundary traits for the policy objects that drive transitions.
//!
//! The container asks its delegate for a [`TransitionAnimator`] per
//! transition. An animator may additionally offer an [`InterruptibleAnimation`]
//! handle; when it does, interactive transitions prefer scrubbing that handle
//! over freezing the render layer, and animated transitions start the handle
//! directly instead of the one-shot path.
//!
//! Time never comes from a wall clock: hosts feed elapsed time through the
//! `tick` methods at whatever cadence their render loop runs.

use std::rc::Rc;
use std::time::Duration;

use crate::context::TransitionContext;

/// Where an interruptible animation came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatingPosition {
    /// Playback returned to the beginning (reversed playback finished).
    Start,
    /// Playback reached the end.
    End,
    /// Playback stopped somewhere in between.
    Current,
}

/// A pausable, reversible, scrubbable in-flight animation.
///
/// Obtained from [`TransitionAnimator::interruptible_animator`]. All methods
/// take `&self`; implementations use interior mutability so handles can be
/// shared between the container, the interactive controller, and completion
/// hooks.
pub trait InterruptibleAnimation {
    /// Begin (or resume) playback.
    fn start(&self);

    /// Pause playback, keeping the current fraction.
    fn pause(&self);

    /// Whether playback currently runs toward the start.
    fn is_reversed(&self) -> bool;

    /// Reverse (or restore) the playback direction.
    fn set_reversed(&self, reversed: bool);

    /// Current progress in [0, 1].
    fn fraction_complete(&self) -> f32;

    /// Scrub to the given progress. Meaningful while paused.
    fn set_fraction_complete(&self, fraction: f32);

    /// Resume playback from the current fraction, rescaling the remaining
    /// playback to `duration_factor × duration`.
    fn continue_animation(&self, duration_factor: f32);

    /// Register a completion hook. Hooks fire once, in registration order,
    /// when playback reaches a terminal; registering after completion fires
    /// the hook immediately with the final position.
    fn add_completion(&self, completion: Box<dyn FnOnce(AnimatingPosition)>);

    /// Advance playback by `dt` of host time. No-op while paused.
    fn tick(&self, dt: Duration);
}

/// Shared handle to an interruptible animation.
pub type InterruptibleHandle = Rc<dyn InterruptibleAnimation>;

/// A policy object performing the visual transition between two screens.
pub trait TransitionAnimator {
    /// The animation's duration for the given transition.
    fn duration(&self, ctx: &TransitionContext) -> Duration;

    /// Run the one-shot animation. The animator must eventually call
    /// [`TransitionContext::complete_transition`] exactly once.
    fn animate(&self, ctx: &TransitionContext);

    /// An interruptible handle over the same animation, if this animator
    /// supports interruption. The default is `None`, which routes animated
    /// transitions through [`animate`](Self::animate) and interactive ones
    /// through the time-offset strategy.
    fn interruptible_animator(&self, _ctx: &TransitionContext) -> Option<InterruptibleHandle> {
        None
    }

    /// Advance any in-flight one-shot animation by `dt` of host time.
    fn tick(&self, _dt: Duration) {}
}

/// A policy object driving a transition from continuous input instead of a
/// fixed-duration animation.
pub trait InteractionController {
    /// Take ownership of the transition. Called by the container instead of
    /// running the animator directly.
    fn start_interactive_transition(&self, ctx: TransitionContext);

    /// Advance any teardown playback by `dt` of host time.
    fn tick(&self, _dt: Duration) {}
}
