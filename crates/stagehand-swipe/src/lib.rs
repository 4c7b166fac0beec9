#![forbid(unsafe_code)]

//! Swipe navigation built on `stagehand-core`.
//!
//! # Role in Stagehand
//! `stagehand-swipe` is the batteries-included front end: an ordered list of
//! screens, horizontal slide transitions between neighbors, and a pan
//! recognizer that lets the user drag the next or previous screen in and
//! release to commit or roll back.
//!
//! # Primary responsibilities
//! - **SlideAnimator / SlideHandle**: tick-driven horizontal slide, usable
//!   both as a scrubbing one-shot and as an interruptible playback handle.
//! - **SwipeContainer**: container plus delegate wiring in one handle, with
//!   programmatic `select` and observer notifications.

pub mod container;
pub mod slide;

pub use container::{SwipeContainer, SwipeObserver};
pub use slide::{slide_positions, SlideAnimator, SlideHandle, DEFAULT_SLIDE_DURATION};
