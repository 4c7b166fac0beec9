#![forbid(unsafe_code)]

//! Horizontal slide animation between two screens.
//!
//! [`SlideAnimator`] moves the outgoing and incoming views between the
//! frames recorded in the transition context, driven purely by host ticks.
//! It serves both animation routes: [`animate`](SlideAnimator::animate) runs
//! a one-shot playback that honors the container layer's speed and time
//! offset (so the time-offset interactive strategy can freeze and scrub it),
//! and [`interruptible_animator`](SlideAnimator::interruptible_animator)
//! hands out a [`SlideHandle`] that can be paused, scrubbed, reversed, and
//! resumed directly.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use stagehand_core::animator::{
    AnimatingPosition, InterruptibleAnimation, InterruptibleHandle, TransitionAnimator,
};
use stagehand_core::context::TransitionContext;
use stagehand_core::coordinator::TransitionKey;
use stagehand_core::easing::{linear, EasingFn};
use stagehand_core::geometry::Rect;
use stagehand_core::positions::AnimationPositions;

/// Default duration of a slide.
pub const DEFAULT_SLIDE_DURATION: Duration = Duration::from_millis(200);

/// Start and end frames for a horizontal slide inside `bounds`.
///
/// `forward` slides the stage leftward: the incoming screen enters from the
/// right while the outgoing one exits to the left. `!forward` mirrors that.
#[must_use]
pub fn slide_positions(bounds: Rect, forward: bool) -> AnimationPositions {
    let width = bounds.width as i32;
    let travel = if forward { -width } else { width };
    AnimationPositions::new(
        bounds,
        bounds.offset_by(travel, 0),
        bounds.offset_by(-travel, 0),
        bounds,
    )
}

struct RunningSlide {
    ctx: TransitionContext,
    media_elapsed: f64,
}

/// Tick-driven horizontal slide between the context's recorded frames.
pub struct SlideAnimator {
    duration: Duration,
    easing: EasingFn,
    running: RefCell<Option<RunningSlide>>,
}

impl Default for SlideAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SlideAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideAnimator")
            .field("duration", &self.duration)
            .field("running", &self.running.borrow().is_some())
            .finish()
    }
}

impl SlideAnimator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            duration: DEFAULT_SLIDE_DURATION,
            easing: linear,
            running: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    fn apply_frames(ctx: &TransitionContext, easing: EasingFn, progress: f32) {
        let eased = easing(progress.clamp(0.0, 1.0));
        let from = ctx.screen(TransitionKey::From);
        let to = ctx.screen(TransitionKey::To);
        ctx.view(TransitionKey::From)
            .set_frame(ctx.initial_frame(&from).lerp(&ctx.final_frame(&from), eased));
        ctx.view(TransitionKey::To)
            .set_frame(ctx.initial_frame(&to).lerp(&ctx.final_frame(&to), eased));
    }
}

impl TransitionAnimator for SlideAnimator {
    fn duration(&self, _ctx: &TransitionContext) -> Duration {
        self.duration
    }

    fn animate(&self, ctx: &TransitionContext) {
        SlideAnimator::apply_frames(ctx, self.easing, 0.0);
        *self.running.borrow_mut() = Some(RunningSlide {
            ctx: ctx.clone(),
            media_elapsed: 0.0,
        });
    }

    fn interruptible_animator(&self, ctx: &TransitionContext) -> Option<InterruptibleHandle> {
        Some(Rc::new(SlideHandle::new(
            ctx.clone(),
            self.duration,
            self.easing,
        )))
    }

    fn tick(&self, dt: Duration) {
        let done = {
            let mut slot = self.running.borrow_mut();
            let Some(running) = slot.as_mut() else {
                return;
            };
            let layer = running.ctx.container_view().layer();
            running.media_elapsed += dt.as_secs_f64() * layer.speed;
            let presented = running.media_elapsed + layer.time_offset;
            let total = self.duration.as_secs_f64();
            let progress = (presented / total).clamp(0.0, 1.0) as f32;
            SlideAnimator::apply_frames(&running.ctx, self.easing, progress);
            trace!(progress, "slide tick");
            // A frozen layer shows the scrubbed frame but playback only ends
            // while the layer actually runs.
            if layer.speed > 0.0 && presented >= total {
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

enum HandleState {
    Pending,
    Playing,
    Paused,
    Finished(AnimatingPosition),
}

struct SlideHandleInner {
    state: HandleState,
    fraction: f32,
    reversed: bool,
    /// Playback rate relative to natural speed, set by `continue_animation`.
    rate: f64,
    completions: Vec<Box<dyn FnOnce(AnimatingPosition)>>,
}

/// Directly drivable slide playback for the animator-interruption strategy.
pub struct SlideHandle {
    ctx: TransitionContext,
    duration: Duration,
    easing: EasingFn,
    inner: RefCell<SlideHandleInner>,
}

impl SlideHandle {
    fn new(ctx: TransitionContext, duration: Duration, easing: EasingFn) -> Self {
        Self {
            ctx,
            duration,
            easing,
            inner: RefCell::new(SlideHandleInner {
                state: HandleState::Pending,
                fraction: 0.0,
                reversed: false,
                rate: 1.0,
                completions: Vec::new(),
            }),
        }
    }

    fn apply(&self, fraction: f32) {
        SlideAnimator::apply_frames(&self.ctx, self.easing, fraction);
    }

    fn finish(&self, position: AnimatingPosition) {
        let completions = {
            let mut inner = self.inner.borrow_mut();
            inner.state = HandleState::Finished(position);
            inner.fraction = match position {
                AnimatingPosition::End => 1.0,
                _ => 0.0,
            };
            std::mem::take(&mut inner.completions)
        };
        self.apply(self.inner.borrow().fraction);
        for completion in completions {
            completion(position);
        }
        self.ctx
            .complete_transition(matches!(position, AnimatingPosition::End));
    }
}

impl InterruptibleAnimation for SlideHandle {
    fn start(&self) {
        let mut inner = self.inner.borrow_mut();
        if matches!(inner.state, HandleState::Pending | HandleState::Paused) {
            inner.state = HandleState::Playing;
        }
    }

    fn pause(&self) {
        let mut inner = self.inner.borrow_mut();
        if matches!(inner.state, HandleState::Playing) {
            inner.state = HandleState::Paused;
        }
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
        let fraction = fraction.clamp(0.0, 1.0);
        {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, HandleState::Finished(_)) {
                return;
            }
            inner.fraction = fraction;
        }
        self.apply(fraction);
    }

    /// Resume playback toward the current direction's terminal, pacing the
    /// remaining distance over `duration_factor` of the full duration.
    fn continue_animation(&self, duration_factor: f32) {
        let snap = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, HandleState::Finished(_)) {
                return;
            }
            let remaining = if inner.reversed {
                inner.fraction
            } else {
                1.0 - inner.fraction
            };
            if duration_factor <= f32::EPSILON {
                true
            } else {
                inner.rate = f64::from(remaining / duration_factor);
                inner.state = HandleState::Playing;
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
        let fire_now = {
            let mut inner = self.inner.borrow_mut();
            if let HandleState::Finished(position) = inner.state {
                Some(position)
            } else {
                inner.completions.push(completion);
                return;
            }
        };
        if let Some(position) = fire_now {
            completion(position);
        }
    }

    fn tick(&self, dt: Duration) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, HandleState::Playing) {
                return;
            }
            let step =
                (dt.as_secs_f64() / self.duration.as_secs_f64() * inner.rate) as f32;
            inner.fraction += if inner.reversed { -step } else { step };
            if inner.reversed && inner.fraction <= 0.0 {
                Some(AnimatingPosition::Start)
            } else if !inner.reversed && inner.fraction >= 1.0 {
                Some(AnimatingPosition::End)
            } else {
                let fraction = inner.fraction;
                drop(inner);
                self.apply(fraction);
                return;
            }
        };
        if let Some(position) = outcome {
            self.finish(position);
        }
    }
}
