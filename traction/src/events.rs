//! Named publish/subscribe.
//!
//! An [`EventBus`] maps event names to handlers. Models, collections and
//! components each own one and forward `on`/`off`/`emit` to it.
//!
//! Delivery is synchronous and in registration order. Handlers registered for
//! [`ALL`] run after the handlers of every specific event, with the same
//! arguments. A handler returning `Err` stops the emission: later handlers are
//! skipped and `emit` returns the error.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use traction::events::EventBus;
//!
//! let bus: EventBus<u32> = EventBus::new();
//! let total = Rc::new(Cell::new(0));
//!
//! let sum = total.clone();
//! let id = bus.on("tick", move |n| {
//!     sum.set(sum.get() + n);
//!     Ok(())
//! });
//!
//! bus.emit("tick", &2).unwrap();
//! bus.off("tick", Some(id));
//! bus.emit("tick", &5).unwrap();
//!
//! assert_eq!(total.get(), 2);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::{EventError, HandlerError};

/// Wildcard event name: handlers registered for it see every emission.
///
/// Handlers added with [`EventBus::on`] under this name receive only the
/// arguments. Use [`EventBus::on_all`] to also receive the event name.
pub const ALL: &str = "all";

/// Result returned by every handler.
pub type HandlerResult = Result<(), HandlerError>;

type Handler<A> = Rc<dyn Fn(&str, &A) -> HandlerResult>;

/// Identifies one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<A> {
    id: ListenerId,
    event: String,
    handler: Handler<A>,
}

struct BusInner<A> {
    listeners: RefCell<Vec<Listener<A>>>,
    next_id: Cell<u64>,
}

impl<A> BusInner<A> {
    fn remove(&self, event: &str, id: Option<ListenerId>) -> usize {
        // Handlers are dropped after the borrow is released; they may own
        // things whose drop touches this bus.
        let removed: Vec<Listener<A>> = {
            let mut listeners = self.listeners.borrow_mut();
            let (removed, kept) = std::mem::take(&mut *listeners)
                .into_iter()
                .partition(|l| l.event == event && id.is_none_or(|id| l.id == id));
            *listeners = kept;
            removed
        };
        removed.len()
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|l| l.id == id)
    }
}

/// A named publish/subscribe channel carrying arguments of type `A`.
///
/// Cloning an `EventBus` clones the handle; clones share their handlers.
pub struct EventBus<A> {
    inner: Rc<BusInner<A>>,
}

impl<A> Clone for EventBus<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> Default for EventBus<A> {
    fn default() -> Self {
        Self {
            inner: Rc::new(BusInner {
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }
}

impl<A: 'static> EventBus<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for future emissions of `event`.
    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&A) -> HandlerResult + 'static,
    {
        self.register(event.into(), Rc::new(move |_: &str, args: &A| handler(args)))
    }

    /// Register `handler` for every emission, receiving the emitted event
    /// name along with the arguments. It runs with the [`ALL`] handlers.
    pub fn on_all<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&str, &A) -> HandlerResult + 'static,
    {
        self.register(ALL.to_string(), Rc::new(handler))
    }

    fn register(&self, event: String, handler: Handler<A>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(Listener { id, event, handler });
        id
    }

    /// Like [`on`](Self::on), but the handler stays registered only as long
    /// as the returned guard lives.
    pub fn subscribe<F>(&self, event: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&A) -> HandlerResult + 'static,
    {
        let event = event.into();
        let id = self.on(event.clone(), handler);
        let bus: Weak<BusInner<A>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(bus) = bus.upgrade() {
                bus.remove(&event, Some(id));
            }
        })
    }

    /// Remove one handler of `event`, or all of them when `id` is `None`.
    ///
    /// Returns the number of handlers removed.
    pub fn off(&self, event: &str, id: Option<ListenerId>) -> usize {
        self.inner.remove(event, id)
    }

    /// Remove every handler of every event.
    pub fn clear(&self) {
        let previous = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        drop(previous);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    /// Invoke every handler currently registered for `event`, then every
    /// handler registered for [`ALL`].
    pub fn emit(&self, event: &str, args: &A) -> Result<(), EventError> {
        let snapshot: Vec<(ListenerId, Handler<A>)> = {
            let listeners = self.inner.listeners.borrow();
            let specific = listeners.iter().filter(|l| l.event == event);
            let wildcard = listeners
                .iter()
                .filter(|l| event != ALL && l.event == ALL);
            specific
                .chain(wildcard)
                .map(|l| (l.id, Rc::clone(&l.handler)))
                .collect()
        };

        for (id, handler) in snapshot {
            // Skip handlers removed by an earlier handler of this emission
            if !self.inner.is_registered(id) {
                continue;
            }
            handler(event, args).map_err(|source| EventError::handler(event, source))?;
        }
        Ok(())
    }
}

impl<A> std::fmt::Debug for EventBus<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

/// Keeps a handler registered; dropping it removes the handler.
#[must_use = "dropping a Subscription immediately removes its handler"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Remove the handler now.
    pub fn detach(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.release.is_some())
            .finish()
    }
}
