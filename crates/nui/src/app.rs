//! Application context shared by every view.
//!
//! An [`App`] owns the platform backend and the layout tree. Views hold an
//! `Rc` to its state, so the context outlives every view created from it.
//! The whole object graph is single-threaded.

use crate::layout::LayoutEngine;
use crate::platform::{HeadlessPlatform, PlatformBackend};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub(crate) struct AppState {
    pub(crate) platform: Rc<dyn PlatformBackend>,
    pub(crate) layout: RefCell<LayoutEngine>,
    /// Set while a layout pass is applying computed bounds, so the resize
    /// notifications it produces do not start nested passes.
    pub(crate) in_layout: Cell<bool>,
}

/// Handle to the application context. Cheap to clone.
#[derive(Clone)]
pub struct App {
    state: Rc<AppState>,
}

impl App {
    /// Creates a context over the given backend.
    pub fn new(platform: Rc<dyn PlatformBackend>) -> Self {
        App {
            state: Rc::new(AppState {
                platform,
                layout: RefCell::new(LayoutEngine::new()),
                in_layout: Cell::new(false),
            }),
        }
    }

    /// Creates a context over an in-memory backend, returning the backend
    /// alongside so tests can script and inspect it.
    pub fn headless() -> (Self, Rc<HeadlessPlatform>) {
        let platform = Rc::new(HeadlessPlatform::new());
        (App::new(platform.clone()), platform)
    }

    pub fn platform(&self) -> Rc<dyn PlatformBackend> {
        self.state.platform.clone()
    }

    pub(crate) fn state(&self) -> &Rc<AppState> {
        &self.state
    }
}
