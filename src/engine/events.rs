//! "Circuit updated" notifications.

use std::fmt;

/// Summary passed to listeners at the end of every recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitUpdate {
    /// Monotonic recompute counter
    pub revision: u64,
    /// Number of lamps currently on
    pub lamps_on: usize,
    /// Number of closed loop regions
    pub closed_regions: usize,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A synchronous listener.
pub type Listener = Box<dyn FnMut(&CircuitUpdate) + Send>;

/// Registered listeners, invoked in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
    next: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, update: &CircuitUpdate) {
        for (_, listener) in &mut self.entries {
            listener(update);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("count", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_and_unsubscribe() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();

        let sink = Arc::clone(&seen);
        let id = listeners.subscribe(Box::new(move |update| sink.lock().unwrap().push(update.revision)));

        let update = CircuitUpdate {
            revision: 3,
            lamps_on: 1,
            closed_regions: 1,
        };
        listeners.notify(&update);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(&update);

        assert_eq!(*seen.lock().unwrap(), vec![3]);
        assert_eq!(listeners.len(), 0);
    }
}
