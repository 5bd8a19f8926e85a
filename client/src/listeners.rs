use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// Handle returned by [`Listeners::attach`]; pass it back to `detach`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct ListenerEntry<E> {
    id: ListenerId,
    callback: Callback<E>,
}

// Manual impl: derive would require `E: Clone`.
impl<E> Clone for ListenerEntry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

/// Ordered registry of callbacks for one kind of event.
pub struct Listeners<E> {
    entries: Mutex<Vec<ListenerEntry<E>>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ListenerEntry<E>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("listener registry mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn attach<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(Uuid::new_v4());
        self.lock().push(ListenerEntry {
            id,
            callback: Arc::new(callback),
        });
        id
    }

    /// Removes the listener. Returns `false` if it was already gone.
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut entries = self.lock();
        match entries.iter().position(|entry| entry.id == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Invokes every live listener in attach order.
    ///
    /// Callbacks run on a snapshot taken under the lock, so they are free to
    /// attach or detach listeners on this same registry.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<ListenerEntry<E>> = self.lock().clone();

        for entry in &snapshot {
            (entry.callback)(event);
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_reaches_every_attached_listener_in_order() {
        let listeners: Listeners<u32> = Listeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            listeners.attach(move |value: &u32| seen.lock().unwrap().push((tag, *value)));
        }

        assert_eq!(listeners.emit(&7), 2);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn detach_removes_only_the_named_listener() {
        let listeners: Listeners<()> = Listeners::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let first = {
            let hits = Arc::clone(&hits);
            listeners.attach(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _second = {
            let hits = Arc::clone(&hits);
            listeners.attach(move |_| {
                hits.fetch_add(10, Ordering::SeqCst);
            })
        };

        assert!(listeners.detach(first));
        assert!(!listeners.detach(first));
        listeners.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 10);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn callback_may_detach_itself_during_emit() {
        let listeners: Arc<Listeners<()>> = Arc::new(Listeners::new());
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let id = {
            let registry = Arc::clone(&listeners);
            let slot = Arc::clone(&slot);
            listeners.attach(move |_| {
                if let Some(id) = slot.lock().unwrap().take() {
                    registry.detach(id);
                }
            })
        };
        *slot.lock().unwrap() = Some(id);

        assert_eq!(listeners.emit(&()), 1);
        assert!(listeners.is_empty());
    }
}
