//! Explicit event subscriptions keyed by element identity.
//!
//! Listeners register against an `ElementId` and are invoked in
//! registration order. There is no bubbling: an event on one element never
//! reaches listeners of another.

use std::collections::HashMap;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Country,
    Region,
    FopCheckbox,
    Tab,
    Avatar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Changed {
        element: ElementId,
        value: Option<String>,
    },
}

impl FormEvent {
    pub fn element(&self) -> ElementId {
        match self {
            Self::Changed { element, .. } => *element,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FormEvent) + Send>;

#[derive(Default)]
pub struct EventSubscriptions {
    listeners: HashMap<ElementId, Vec<(SubscriptionId, Listener)>>,
    next_id: u64,
}

impl EventSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, element: ElementId, listener: F) -> SubscriptionId
    where
        F: FnMut(&FormEvent) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners
            .entry(element)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Delivers `event` to the listeners of its element; returns how many ran.
    pub fn emit(&mut self, event: &FormEvent) -> usize {
        let Some(list) = self.listeners.get_mut(&event.element()) else {
            return 0;
        };
        for (_, listener) in list.iter_mut() {
            listener(event);
        }
        trace!(element = ?event.element(), listeners = list.len(), "event emitted");
        list.len()
    }

    pub fn len(&self, element: ElementId) -> usize {
        self.listeners.get(&element).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventSubscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self.listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventSubscriptions")
            .field("listeners", &counts)
            .finish()
    }
}
