#![forbid(unsafe_code)]

//! Easing curves as plain function pointers.
//!
//! Curves map a normalized progress `t` in [0, 1] to an eased value in the
//! same range. The interactive controller carries one as its completion curve;
//! animators are free to apply any of them to frame interpolation.

/// An easing function: normalized progress in, eased progress out.
pub type EasingFn = fn(f32) -> f32;

/// No easing; progress passes through unchanged.
#[inline]
pub fn linear(t: f32) -> f32 {
    t
}

/// Quadratic ease-in: slow start.
#[inline]
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Quadratic ease-out: slow finish.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out: slow start and finish.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0) * (-2.0 * t + 2.0) / 2.0
    }
}
