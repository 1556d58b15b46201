//! Observer lists with explicit unsubscription tokens.
//!
//! Native toolkits surface view events as signal/slot pairs with ad-hoc
//! connection ids; here dispatch order and unsubscription are pinned down
//! instead: observers run in subscription order, a [`Subscription`] cancels
//! its observer when dropped (call [`Subscription::detach`] to keep it for the
//! emitter's lifetime), and an observer removed while an emission is in
//! progress still sees that emission. Observers added during an emission are
//! not invoked until the next one.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Observer<E> = Rc<dyn Fn(&E)>;

struct SignalState<E> {
    next_id: u64,
    observers: SmallVec<[(u64, Observer<E>); 2]>,
}

/// A single-threaded observer list for events of type `E`.
pub struct Signal<E> {
    state: Rc<RefCell<SignalState<E>>>,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Signal {
            state: Rc::new(RefCell::new(SignalState {
                next_id: 0,
                observers: SmallVec::new(),
            })),
        }
    }
}

impl<E: 'static> Signal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. The returned [`Subscription`] removes it when
    /// dropped.
    pub fn subscribe(&self, observer: impl Fn(&E) + 'static) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.observers.push((id, Rc::new(observer)));
            id
        };
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = Weak::upgrade(&weak) {
                state.borrow_mut().observers.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().observers.is_empty()
    }

    /// Invokes every observer with `event`, in subscription order.
    pub fn emit(&self, event: &E) {
        self.emit_while(event, |_| true);
    }

    /// Invokes observers in subscription order as long as `keep_going`
    /// returns true after each call. The observer list is snapshotted before
    /// dispatch so observers may subscribe or unsubscribe freely.
    pub(crate) fn emit_while(&self, event: &E, keep_going: impl Fn(&E) -> bool) {
        let snapshot: SmallVec<[Observer<E>; 2]> = self
            .state
            .borrow()
            .observers
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in snapshot {
            observer(event);
            if !keep_going(event) {
                break;
            }
        }
    }
}

/// Token representing a registered observer. Dropping it unsubscribes.
#[must_use]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Keeps the observer registered for the lifetime of its signal.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn observers_run_in_subscription_order() {
        let signal = Signal::<u32>::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = order.clone();
        signal.subscribe(move |_| a.borrow_mut().push("a")).detach();
        let b = order.clone();
        signal.subscribe(move |_| b.borrow_mut().push("b")).detach();
        signal.emit(&1);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let signal = Signal::<()>::new();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let subscription = signal.subscribe(move |_| counter.set(counter.get() + 1));
        signal.emit(&());
        drop(subscription);
        signal.emit(&());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unsubscribe_during_dispatch_still_sees_current_emission() {
        let signal = Signal::<()>::new();
        let count = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_in_observer = slot.clone();
        // First observer cancels the second mid-emission.
        signal
            .subscribe(move |_| {
                slot_in_observer.borrow_mut().take();
            })
            .detach();
        let counter = count.clone();
        *slot.borrow_mut() = Some(signal.subscribe(move |_| counter.set(counter.get() + 1)));

        signal.emit(&());
        assert_eq!(count.get(), 1, "snapshotted observer runs this emission");
        signal.emit(&());
        assert_eq!(count.get(), 1, "but is gone for the next one");
    }
}
