#![forbid(unsafe_code)]

//! Screens: the units of content a container manages.
//!
//! A [`Screen`] owns a root [`View`] and may observe its own lifecycle through
//! the default-no-op hooks. The container drives the hooks in a fixed order
//! around each transition: parent-move notifications bracket hierarchy
//! changes, appearance notifications bracket visibility changes.
//!
//! [`ScreenRef`] is the shared handle the rest of the crate works with;
//! equality is pointer identity, so two screens with identical content are
//! still two distinct screens.

use std::cell::RefCell;
use std::rc::Rc;

use crate::view::View;

/// A unit of UI content manageable by a transition container.
pub trait Screen {
    /// The screen's root view.
    fn view(&self) -> View;

    /// The screen is about to gain (`true`) or lose (`false`) its parent.
    fn will_move_to_parent(&mut self, _has_parent: bool) {}

    /// The screen finished gaining (`true`) or losing (`false`) its parent.
    fn did_move_to_parent(&mut self, _has_parent: bool) {}

    /// The screen is about to appear or disappear.
    fn begin_appearance_transition(&mut self, _appearing: bool, _animated: bool) {}

    /// The appearance change announced by the last
    /// [`begin_appearance_transition`](Screen::begin_appearance_transition)
    /// call took effect.
    fn end_appearance_transition(&mut self) {}
}

/// A screen with no lifecycle behavior of its own: just a root view.
#[derive(Debug)]
pub struct BasicScreen {
    view: View,
}

impl BasicScreen {
    /// Create a screen wrapping the given root view.
    #[must_use]
    pub fn new(view: View) -> Self {
        Self { view }
    }
}

impl Screen for BasicScreen {
    fn view(&self) -> View {
        self.view.clone()
    }
}

/// A shared handle to a [`Screen`]. Cloning shares the same screen;
/// comparison is pointer identity.
pub struct ScreenRef {
    inner: Rc<RefCell<dyn Screen>>,
}

impl Clone for ScreenRef {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl PartialEq for ScreenRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ScreenRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScreenRef")
            .field(&Rc::as_ptr(&self.inner))
            .finish()
    }
}

impl ScreenRef {
    /// Wrap a screen in a shared handle.
    #[must_use]
    pub fn new(screen: impl Screen + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(screen)),
        }
    }

    /// Share an existing `Rc`-held screen.
    ///
    /// Lets callers keep a typed handle to the same screen the container
    /// manages.
    #[must_use]
    pub fn from_rc<S: Screen + 'static>(screen: Rc<RefCell<S>>) -> Self {
        Self { inner: screen }
    }

    /// The screen's root view.
    pub fn view(&self) -> View {
        self.inner.borrow().view()
    }

    pub(crate) fn will_move_to_parent(&self, has_parent: bool) {
        self.inner.borrow_mut().will_move_to_parent(has_parent);
    }

    pub(crate) fn did_move_to_parent(&self, has_parent: bool) {
        self.inner.borrow_mut().did_move_to_parent(has_parent);
    }

    pub(crate) fn begin_appearance_transition(&self, appearing: bool, animated: bool) {
        self.inner
            .borrow_mut()
            .begin_appearance_transition(appearing, animated);
    }

    pub(crate) fn end_appearance_transition(&self) {
        self.inner.borrow_mut().end_appearance_transition();
    }
}
