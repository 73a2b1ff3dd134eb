//! Minimal publish/subscribe events.

use std::fmt;

use super::ItemId;

/// Handle returned by [`Event::listen`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<A> = Box<dyn FnMut(&A) -> bool>;

/// Named event with an ordered listener list.
///
/// Listeners return `true` to let the event continue to the next listener and `false`
/// to stop it.
pub struct Event<A> {
    name: String,
    owner: Option<ItemId>,
    listeners: Vec<(ListenerId, Listener<A>)>,
    next_id: u64,
}

impl<A> Event<A> {
    /// Create an event without owner.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Create an event owned by an item.
    pub fn owned(name: &str, owner: ItemId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<ItemId> {
        self.owner
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Subscribe a listener.
    pub fn listen(&mut self, listener: impl FnMut(&A) -> bool + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe. Returns `false` if the listener was not registered.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        before != self.listeners.len()
    }

    /// Call listeners in order until one returns `false`.
    ///
    /// Returns `true` when every listener ran.
    pub fn trigger(&mut self, args: &A) -> bool {
        for (_, listener) in &mut self.listeners {
            if !listener(args) {
                return false;
            }
        }
        true
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Model-wide events, fired for every item of the owning model.
#[derive(Debug)]
pub struct EventBus {
    pub on_created: Event<ItemId>,
    pub on_destroyed: Event<ItemId>,
    pub on_modified: Event<ItemId>,
    pub on_pre_update: Event<ItemId>,
    pub on_post_update: Event<ItemId>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self {
            on_created: Event::new("created"),
            on_destroyed: Event::new("destroyed"),
            on_modified: Event::new("modified"),
            on_pre_update: Event::new("preUpdate"),
            on_post_update: Event::new("postUpdate"),
        }
    }
}

/// Per-item events.
#[derive(Debug)]
pub struct ItemEvents {
    pub on_modified: Event<ItemId>,
    pub on_pre_update: Event<ItemId>,
    pub on_post_update: Event<ItemId>,
}

impl ItemEvents {
    pub(crate) fn new(owner: ItemId) -> Self {
        Self {
            on_modified: Event::owned("modified", owner),
            on_pre_update: Event::owned("preUpdate", owner),
            on_post_update: Event::owned("postUpdate", owner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_trigger_short_circuits() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut event: Event<u32> = Event::new("test");

        let c = calls.clone();
        event.listen(move |v| {
            c.borrow_mut().push(("first", *v));
            true
        });
        let c = calls.clone();
        let stopper = event.listen(move |v| {
            c.borrow_mut().push(("second", *v));
            false
        });
        let c = calls.clone();
        event.listen(move |v| {
            c.borrow_mut().push(("third", *v));
            true
        });

        assert!(!event.trigger(&7));
        assert_eq!(*calls.borrow(), vec![("first", 7), ("second", 7)]);

        assert!(event.unlisten(stopper));
        assert!(!event.unlisten(stopper));
        assert!(event.trigger(&8));
        assert_eq!(calls.borrow().len(), 4);
    }
}
