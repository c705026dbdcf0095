//! Synchronous publish/subscribe primitive.
//!
//! [`EventBus`] is a small composable emitter held as a private field by
//! [`TeamCoordinator`](crate::coordinator::TeamCoordinator) and
//! [`Match`](crate::simulation::Match). Listeners are registered per channel
//! and invoked in registration order, on the caller's thread, before
//! [`EventBus::trigger`] returns. There is no queueing.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use skirmish_core::bus::EventBus;
//!
//! let mut bus: EventBus<&'static str, u32> = EventBus::new();
//! let total = Arc::new(AtomicU32::new(0));
//!
//! let sink = Arc::clone(&total);
//! let id = bus.on("damage", move |amount| {
//!     sink.fetch_add(*amount, Ordering::SeqCst);
//! });
//!
//! bus.trigger("damage", &12);
//! bus.trigger("heal", &5); // no listeners: no-op
//! assert_eq!(total.load(Ordering::SeqCst), 12);
//!
//! bus.off("damage", Some(id));
//! bus.trigger("damage", &12);
//! assert_eq!(total.load(Ordering::SeqCst), 12);
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Handle identifying one registered listener, returned by [`EventBus::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw value of this handle.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}

type Handler<E> = Box<dyn FnMut(&E) + Send>;

struct Listener<E> {
    id: ListenerId,
    handler: Handler<E>,
}

/// Ordered, synchronous fan-out of events to per-channel listeners.
///
/// `C` is the channel key (ordered, so dispatch never depends on hashing) and
/// `E` is the event payload passed by reference to every listener.
pub struct EventBus<C, E> {
    listeners: BTreeMap<C, Vec<Listener<E>>>,
    next_id: u64,
}

impl<C: Ord + Copy, E> EventBus<C, E> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Registers `handler` on `channel`, after any existing listeners.
    pub fn on<F>(&mut self, channel: C, handler: F) -> ListenerId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(channel).or_default().push(Listener {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes one listener (`Some(id)`) or every listener (`None`) on `channel`.
    ///
    /// Returns the number of listeners removed. Unknown handles and empty
    /// channels are ignored.
    pub fn off(&mut self, channel: C, listener: Option<ListenerId>) -> usize {
        let Some(list) = self.listeners.get_mut(&channel) else {
            return 0;
        };

        let removed = match listener {
            None => list.len(),
            Some(id) => {
                let before = list.len();
                list.retain(|l| l.id != id);
                before - list.len()
            }
        };

        if listener.is_none() || list.is_empty() {
            self.listeners.remove(&channel);
        }
        removed
    }

    /// Invokes every listener on `channel`, in registration order.
    pub fn trigger(&mut self, channel: C, event: &E) {
        if let Some(list) = self.listeners.get_mut(&channel) {
            for listener in list.iter_mut() {
                (listener.handler)(event);
            }
        }
    }

    /// Returns how many listeners are registered on `channel`.
    #[must_use]
    pub fn listener_count(&self, channel: C) -> usize {
        self.listeners.get(&channel).map_or(0, Vec::len)
    }

    /// Returns `true` if no listener is registered on any channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<C: Ord + Copy, E> Default for EventBus<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: fmt::Debug, E> fmt::Debug for EventBus<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<_> = self
            .listeners
            .iter()
            .map(|(channel, list)| (channel, list.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .finish_non_exhaustive()
    }
}
