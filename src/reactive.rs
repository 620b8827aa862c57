//! Single-threaded observable values.
//!
//! A [`Signal`] is a shared cell that notifies its subscribers after every
//! write. Every registration hands back a [`Subscription`]; dropping it
//! removes the listener, so components hold their subscriptions for exactly
//! as long as they live.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct SignalInner<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_id: Cell<u64>,
}

pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Mutate in place and notify unconditionally.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.notify();
    }

    /// Register `f`, called with the new value after each write.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(f)));

        let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        // Snapshot both so listeners may read this signal or (un)subscribe.
        let value = self.get();
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(&value);
        }
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Store `value` and notify. Returns `false` (and stays silent) when the
    /// value is unchanged.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.notify();
        true
    }
}

/// Disposer for one listener registration.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn dispose(mut self) {
        if let Some(f) = self.dispose.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.dispose.take() {
            f();
        }
    }
}

/// Owns a component's subscriptions and disposes all of them on drop.
#[derive(Default)]
pub struct Subscriptions {
    items: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sub: Subscription) {
        self.items.push(sub);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_notifies_only_on_change() {
        let signal = Signal::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = signal.subscribe(move |v| sink.borrow_mut().push(*v));

        assert!(signal.set(2));
        assert!(!signal.set(2));
        assert!(signal.set(3));
        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn test_update_always_notifies() {
        let signal = Signal::new(vec![1]);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = signal.subscribe(move |_| c.set(c.get() + 1));

        signal.update(|v| v.push(2));
        signal.update(|_| {});
        assert_eq!(count.get(), 2);
        assert_eq!(signal.get(), vec![1, 2]);
    }

    #[test]
    fn test_dropping_subscription_stops_notifications() {
        let signal = Signal::new(0);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = signal.subscribe(move |_| c.set(c.get() + 1));

        signal.set(1);
        drop(sub);
        signal.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_listener_can_write_another_signal() {
        let source = Signal::new(0);
        let mirror = Signal::new(0);
        let target = mirror.clone();
        let _sub = source.subscribe(move |v| {
            target.set(*v * 10);
        });

        source.set(4);
        assert_eq!(mirror.get(), 40);
    }

    #[test]
    fn test_listener_can_read_its_own_signal() {
        let signal = Signal::new(String::from("a"));
        let reader = signal.clone();
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        let _sub = signal.subscribe(move |_| *sink.borrow_mut() = reader.get());

        signal.set("b".to_string());
        assert_eq!(*seen.borrow(), "b");
    }

    #[test]
    fn test_dispose_after_signal_dropped_is_noop() {
        let signal = Signal::new(0);
        let sub = signal.subscribe(|_| {});
        drop(signal);
        sub.dispose();
    }

    #[test]
    fn test_subscriptions_bag_disposes_all() {
        let signal = Signal::new(0);
        let mut bag = Subscriptions::new();
        bag.push(signal.subscribe(|_| {}));
        bag.push(signal.subscribe(|_| {}));
        assert_eq!(signal.subscriber_count(), 2);
        drop(bag);
        assert_eq!(signal.subscriber_count(), 0);
    }
}
