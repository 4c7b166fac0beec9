#![forbid(unsafe_code)]

//! Core: screen containment, transition plumbing, and interactive drivers.
//!
//! # Role in Stagehand
//! `stagehand-core` is the transition layer. It owns the container that keeps
//! one screen on stage at a time, the context and coordinator objects a
//! transition exposes while it runs, and the percent-driven machinery that
//! lets a gesture scrub a transition back and forth before committing.
//!
//! # Primary responsibilities
//! - **TransitionContainer**: one current screen, transitions to others.
//! - **TransitionContext / TransitionCoordinator**: per-transition state and
//!   observation surface for animators and hosts.
//! - **PercentDrivenInteraction**: the interactive state machine, with
//!   animator-interruption and time-offset drive strategies.
//! - **PanGestureInteraction**: horizontal drags mapped onto progress.
//!
//! # How it fits in the system
//! Hosts implement [`Screen`](screen::Screen) for their content and
//! [`ContainerDelegate`](delegate::ContainerDelegate) for policy; animator
//! crates (such as `stagehand-swipe`) implement
//! [`TransitionAnimator`](animator::TransitionAnimator) on top of the context
//! API. Time is tick-driven throughout: hosts forward frame deltas and the
//! crate never reads a clock.

pub mod animator;
pub mod container;
pub mod context;
pub mod coordinator;
pub mod delegate;
pub mod easing;
pub mod geometry;
pub mod gesture;
pub mod interactive;
pub mod positions;
pub mod screen;
pub mod view;

pub use animator::{
    AnimatingPosition, InteractionController, InterruptibleAnimation, InterruptibleHandle,
    TransitionAnimator,
};
pub use container::TransitionContainer;
pub use context::TransitionContext;
pub use coordinator::{TransitionCoordinator, TransitionKey};
pub use delegate::ContainerDelegate;
pub use geometry::{Rect, Transform};
pub use gesture::{DragGesture, DragPhase, PanGestureInteraction};
pub use interactive::{DriveMode, InteractiveState, PercentDrivenInteraction};
pub use positions::AnimationPositions;
pub use screen::{BasicScreen, Screen, ScreenRef};
pub use view::{LayerState, View};
