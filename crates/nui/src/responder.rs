//! Input event routing base shared by every view.
//!
//! The platform binding translates native input into [`MouseEvent`] and
//! [`KeyEvent`] values and feeds them through the dispatch methods here.
//! Observers run in subscription order; marking an event handled stops
//! further dispatch and is reported back to the backend so it can decide
//! whether to run the native default behavior.

use crate::geometry::{Pixels, Point};
use crate::subscription::{Signal, Subscription};
use std::cell::Cell;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// A pointer event in view-local logical coordinates.
#[derive(Debug)]
pub struct MouseEvent {
    pub button: Option<MouseButton>,
    pub position: Point<Pixels>,
    handled: Cell<bool>,
}

impl MouseEvent {
    pub fn new(button: Option<MouseButton>, position: Point<Pixels>) -> Self {
        MouseEvent {
            button,
            position,
            handled: Cell::new(false),
        }
    }

    /// Stops further dispatch of this event.
    pub fn mark_handled(&self) {
        self.handled.set(true);
    }

    pub fn is_handled(&self) -> bool {
        self.handled.get()
    }
}

/// A keyboard event. `key` is the layout-resolved key string as reported by
/// the native toolkit.
#[derive(Debug)]
pub struct KeyEvent {
    pub key: String,
    handled: Cell<bool>,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            handled: Cell::new(false),
        }
    }

    pub fn mark_handled(&self) {
        self.handled.set(true);
    }

    pub fn is_handled(&self) -> bool {
        self.handled.get()
    }
}

/// Per-view input signals. Embedded in every view's state.
#[derive(Default)]
pub struct Responder {
    pub(crate) mouse_down: Signal<MouseEvent>,
    pub(crate) mouse_up: Signal<MouseEvent>,
    pub(crate) mouse_move: Signal<MouseEvent>,
    pub(crate) mouse_enter: Signal<MouseEvent>,
    pub(crate) mouse_leave: Signal<MouseEvent>,
    pub(crate) key_down: Signal<KeyEvent>,
    pub(crate) key_up: Signal<KeyEvent>,
}

impl Responder {
    pub fn on_mouse_down(&self, observer: impl Fn(&MouseEvent) + 'static) -> Subscription {
        self.mouse_down.subscribe(observer)
    }

    pub fn on_mouse_up(&self, observer: impl Fn(&MouseEvent) + 'static) -> Subscription {
        self.mouse_up.subscribe(observer)
    }

    pub fn on_mouse_move(&self, observer: impl Fn(&MouseEvent) + 'static) -> Subscription {
        self.mouse_move.subscribe(observer)
    }

    pub fn on_mouse_enter(&self, observer: impl Fn(&MouseEvent) + 'static) -> Subscription {
        self.mouse_enter.subscribe(observer)
    }

    pub fn on_mouse_leave(&self, observer: impl Fn(&MouseEvent) + 'static) -> Subscription {
        self.mouse_leave.subscribe(observer)
    }

    pub fn on_key_down(&self, observer: impl Fn(&KeyEvent) + 'static) -> Subscription {
        self.key_down.subscribe(observer)
    }

    pub fn on_key_up(&self, observer: impl Fn(&KeyEvent) + 'static) -> Subscription {
        self.key_up.subscribe(observer)
    }

    /// Dispatch entry points for the platform binding. Each returns whether
    /// an observer marked the event handled.
    pub fn dispatch_mouse_down(&self, event: &MouseEvent) -> bool {
        self.mouse_down.emit_while(event, |e| !e.is_handled());
        event.is_handled()
    }

    pub fn dispatch_mouse_up(&self, event: &MouseEvent) -> bool {
        self.mouse_up.emit_while(event, |e| !e.is_handled());
        event.is_handled()
    }

    pub fn dispatch_mouse_move(&self, event: &MouseEvent) -> bool {
        self.mouse_move.emit_while(event, |e| !e.is_handled());
        event.is_handled()
    }

    pub fn dispatch_mouse_enter(&self, event: &MouseEvent) {
        self.mouse_enter.emit(event);
    }

    pub fn dispatch_mouse_leave(&self, event: &MouseEvent) {
        self.mouse_leave.emit(event);
    }

    pub fn dispatch_key_down(&self, event: &KeyEvent) -> bool {
        self.key_down.emit_while(event, |e| !e.is_handled());
        event.is_handled()
    }

    pub fn dispatch_key_up(&self, event: &KeyEvent) -> bool {
        self.key_up.emit_while(event, |e| !e.is_handled());
        event.is_handled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{point, px};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn handled_event_stops_dispatch() {
        let responder = Responder::default();
        let second_ran = Rc::new(Cell::new(false));

        responder
            .on_mouse_down(|event| event.mark_handled())
            .detach();
        let flag = second_ran.clone();
        responder.on_mouse_down(move |_| flag.set(true)).detach();

        let event = MouseEvent::new(Some(MouseButton::Left), point(px(1.0), px(2.0)));
        assert!(responder.dispatch_mouse_down(&event));
        assert!(!second_ran.get());
    }

    #[test]
    fn unhandled_event_reports_false() {
        let responder = Responder::default();
        let event = KeyEvent::new("escape");
        assert!(!responder.dispatch_key_down(&event));
    }
}
