#![forbid(unsafe_code)]

//! Shared view handles.
//!
//! [`View`] is a lightweight stand-in for a screen's root surface: a frame, a
//! render-layer timing state, and a place in a view hierarchy. The library
//! never draws; hosts read frames and layer state out of these handles and
//! render however they like.
//!
//! Cloning a `View` produces another handle to the **same** view; identity is
//! pointer identity ([`View::ptr_eq`]).
//!
//! # Invariants
//!
//! 1. A view has at most one superview; re-adding a view to its current
//!    superview is a no-op, adding it elsewhere reparents it.
//! 2. At rest the layer runs at unit speed with a zero time offset.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::geometry::Rect;

/// Render-layer timing state.
///
/// The time-offset interactive strategy freezes a layer by dropping `speed`
/// to zero, then scrubs `time_offset` to move the frozen animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerState {
    /// Playback rate multiplier. 1.0 is real time, 0.0 is frozen.
    pub speed: f64,
    /// Offset in seconds added to the layer's media time.
    pub time_offset: f64,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            speed: 1.0,
            time_offset: 0.0,
        }
    }
}

struct ViewInner {
    frame: Rect,
    layer: LayerState,
    subviews: Vec<View>,
    superview: Option<Weak<RefCell<ViewInner>>>,
}

/// A shared handle to a view.
pub struct View {
    inner: Rc<RefCell<ViewInner>>,
}

// Manual Clone: shares the same inner view.
impl Clone for View {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("View")
            .field("frame", &inner.frame)
            .field("layer", &inner.layer)
            .field("subview_count", &inner.subviews.len())
            .finish()
    }
}

impl View {
    /// Create a detached view with the given frame.
    #[must_use]
    pub fn new(frame: Rect) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ViewInner {
                frame,
                layer: LayerState::default(),
                subviews: Vec::new(),
                superview: None,
            })),
        }
    }

    /// Whether two handles refer to the same view.
    #[inline]
    pub fn ptr_eq(&self, other: &View) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The view's frame in its superview's coordinates.
    pub fn frame(&self) -> Rect {
        self.inner.borrow().frame
    }

    /// Set the view's frame.
    pub fn set_frame(&self, frame: Rect) {
        self.inner.borrow_mut().frame = frame;
    }

    /// The view's own coordinate space (frame size, origin at zero).
    pub fn bounds(&self) -> Rect {
        self.inner.borrow().frame.bounds()
    }

    /// Current render-layer state.
    pub fn layer(&self) -> LayerState {
        self.inner.borrow().layer
    }

    /// Set the layer's playback speed.
    pub fn set_layer_speed(&self, speed: f64) {
        self.inner.borrow_mut().layer.speed = speed;
    }

    /// Set the layer's time offset in seconds.
    pub fn set_layer_time_offset(&self, time_offset: f64) {
        self.inner.borrow_mut().layer.time_offset = time_offset;
    }

    /// The view's current superview, if attached.
    pub fn superview(&self) -> Option<View> {
        let weak = self.inner.borrow().superview.clone()?;
        weak.upgrade().map(|inner| View { inner })
    }

    /// Whether `child` is a direct subview of this view.
    pub fn contains_subview(&self, child: &View) -> bool {
        self.inner
            .borrow()
            .subviews
            .iter()
            .any(|v| v.ptr_eq(child))
    }

    /// Number of direct subviews.
    pub fn subview_count(&self) -> usize {
        self.inner.borrow().subviews.len()
    }

    /// Attach `child` as the topmost subview.
    ///
    /// Re-adding the current topmost child is a no-op; a child attached
    /// elsewhere (or lower in this view) is reparented to the top. Attaching
    /// a view to itself is a design bug and panics.
    pub fn add_subview(&self, child: &View) {
        assert!(!self.ptr_eq(child), "cannot add a view as its own subview");
        if self.contains_subview(child) {
            return;
        }
        child.remove_from_superview();
        child.inner.borrow_mut().superview = Some(Rc::downgrade(&self.inner));
        self.inner.borrow_mut().subviews.push(child.clone());
    }

    /// Detach this view from its superview, if any.
    pub fn remove_from_superview(&self) {
        let superview = self.inner.borrow_mut().superview.take();
        if let Some(weak) = superview
            && let Some(parent) = weak.upgrade()
        {
            parent
                .borrow_mut()
                .subviews
                .retain(|v| !Rc::ptr_eq(&v.inner, &self.inner));
        }
    }
}
