//! Named-topic publish/subscribe channel
//!
//! A [`NotificationChannel`] routes payloads to the handlers registered for a
//! topic. Everything is synchronous: [`dispatch`](NotificationChannel::dispatch)
//! returns once every handler has run.
//!
//! # Invariants
//!
//! 1. Handlers for a topic run in registration order.
//! 2. Dispatch works on a snapshot of the topic's handlers: a handler added
//!    while a dispatch is running is not invoked by that dispatch.
//! 3. A handler removed while a dispatch is running is skipped if its turn
//!    has not come yet.
//! 4. Removing a handler that is already gone is a no-op.
//!
//! The channel is a cheap, cloneable handle over `Rc<RefCell<..>>`. No borrow
//! is held while handlers run, so handlers may listen, unsubscribe or
//! dispatch again.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// Identifies one registration on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A registered handler
pub type Handler<P> = Rc<dyn Fn(&P)>;

struct Listener<P> {
    id: HandlerId,
    handler: Handler<P>,
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Rc::clone(&self.handler),
        }
    }
}

struct ChannelInner<K, P> {
    topics: IndexMap<K, Vec<Listener<P>>>,
    next_id: u64,
}

impl<K: Eq + Hash, P> ChannelInner<K, P> {
    fn allocate_id(&mut self) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn remove(&mut self, topic: &K, id: HandlerId) -> bool {
        let Some(listeners) = self.topics.get_mut(topic) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.topics.shift_remove(topic);
        }
        removed
    }

    fn contains(&self, topic: &K, id: HandlerId) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|listeners| listeners.iter().any(|l| l.id == id))
    }
}

/// Synchronous publish/subscribe over topics of type `K` carrying `P`
pub struct NotificationChannel<K, P> {
    inner: Rc<RefCell<ChannelInner<K, P>>>,
}

impl<K, P> Clone for NotificationChannel<K, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: Eq + Hash + Clone + 'static, P: 'static> Default for NotificationChannel<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> fmt::Debug for NotificationChannel<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("NotificationChannel")
            .field("topics", &inner.topics.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

impl<K: Eq + Hash + Clone + 'static, P: 'static> NotificationChannel<K, P> {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                topics: IndexMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register `handler` for `topic`
    ///
    /// The returned [`Unsubscribe`] removes exactly this registration.
    pub fn listen(&self, topic: K, handler: impl Fn(&P) + 'static) -> Unsubscribe {
        self.listen_rc(topic, Rc::new(handler))
    }

    /// Register an already shared handler for `topic`
    pub fn listen_rc(&self, topic: K, handler: Handler<P>) -> Unsubscribe {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.allocate_id();
            inner
                .topics
                .entry(topic.clone())
                .or_default()
                .push(Listener { id, handler });
            id
        };
        self.unsubscriber(topic, id)
    }

    /// Register a handler that runs at most once
    ///
    /// The handler is wrapped; the wrapper removes itself from the channel
    /// before invoking the handler, so a nested dispatch of the same topic
    /// cannot reach it again.
    pub fn once(&self, topic: K, handler: impl Fn(&P) + 'static) -> Unsubscribe {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate_id();

        let weak = Rc::downgrade(&self.inner);
        let wrapper_topic = topic.clone();
        let fired = Cell::new(false);
        let wrapper = move |payload: &P| {
            if fired.replace(true) {
                return;
            }
            if let Some(strong) = weak.upgrade() {
                strong.borrow_mut().remove(&wrapper_topic, id);
            }
            handler(payload);
        };

        inner.topics.entry(topic.clone()).or_default().push(Listener {
            id,
            handler: Rc::new(wrapper),
        });
        drop(inner);

        self.unsubscriber(topic, id)
    }

    /// Remove the registration `id` from `topic`
    ///
    /// Returns whether something was removed. Unknown ids are ignored.
    pub fn off(&self, topic: &K, id: HandlerId) -> bool {
        self.inner.borrow_mut().remove(topic, id)
    }

    /// Deliver `payload` to every handler of `topic`
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, topic: &K, payload: &P) -> usize {
        let snapshot: Vec<Listener<P>> = match self.inner.borrow().topics.get(topic) {
            Some(listeners) => listeners.clone(),
            None => return 0,
        };

        let mut invoked = 0;
        for listener in snapshot {
            if !self.inner.borrow().contains(topic, listener.id) {
                continue;
            }
            (listener.handler)(payload);
            invoked += 1;
        }
        invoked
    }

    /// Ids of the handlers currently registered for `topic`, in order
    pub fn listeners_of(&self, topic: &K) -> Vec<HandlerId> {
        self.inner
            .borrow()
            .topics
            .get(topic)
            .map(|listeners| listeners.iter().map(|l| l.id).collect())
            .unwrap_or_default()
    }

    /// Number of handlers registered for `topic`
    pub fn listener_count(&self, topic: &K) -> usize {
        self.inner
            .borrow()
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }

    fn unsubscriber(&self, topic: K, id: HandlerId) -> Unsubscribe {
        let weak: Weak<RefCell<ChannelInner<K, P>>> = Rc::downgrade(&self.inner);
        Unsubscribe {
            id,
            cancel: Box::new(move || {
                if let Some(strong) = weak.upgrade() {
                    strong.borrow_mut().remove(&topic, id);
                }
            }),
        }
    }
}

/// Handle that removes one registration from its channel
///
/// Dropping the handle does not unsubscribe. Calling
/// [`unsubscribe`](Unsubscribe::unsubscribe) more than once is harmless and
/// never touches other registrations.
pub struct Unsubscribe {
    id: HandlerId,
    cancel: Box<dyn Fn()>,
}

impl Unsubscribe {
    /// Remove the registration this handle was created for
    pub fn unsubscribe(&self) {
        (self.cancel)();
    }

    /// The registration this handle refers to
    pub fn handler_id(&self) -> HandlerId {
        self.id
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}
