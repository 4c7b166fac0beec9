#![forbid(unsafe_code)]

//! Animation positions: the four frames describing a transition's geometry.

use crate::geometry::Rect;

/// Where each side of a transition starts and ends, in container coordinates.
///
/// Produced by the layout policy (the container delegate) and consumed by
/// animators through the transition context's frame queries. Immutable once
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationPositions {
    /// Frame of the outgoing screen before the transition.
    pub from_initial: Rect,
    /// Frame of the outgoing screen after the transition.
    pub from_final: Rect,
    /// Frame of the incoming screen before the transition.
    pub to_initial: Rect,
    /// Frame of the incoming screen after the transition.
    pub to_final: Rect,
}

impl AnimationPositions {
    /// Create positions from explicit frames.
    #[must_use]
    pub const fn new(from_initial: Rect, from_final: Rect, to_initial: Rect, to_final: Rect) -> Self {
        Self {
            from_initial,
            from_final,
            to_initial,
            to_final,
        }
    }

    /// The fallback when no layout policy supplies custom geometry: every
    /// frame equals the container bounds, so screens swap in place.
    #[must_use]
    pub const fn identity(bounds: Rect) -> Self {
        Self::new(bounds, bounds, bounds, bounds)
    }
}
