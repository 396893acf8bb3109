//! Observer registration with explicit unsubscribe handles.
//!
//! Contract:
//! - `Subscription::unsubscribe` is idempotent; dropping the handle unsubscribes.
//! - Once `unsubscribe` returns, the callback is never invoked again, including
//!   by a `notify` that is already walking the registry.
//! - Callbacks run outside the registry lock, so they may subscribe or
//!   unsubscribe re-entrantly.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    slots: BTreeMap<u64, Callback<T>>,
}

pub struct Observers<T> {
    inner: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                slots: BTreeMap::new(),
            })),
        }
    }
}

impl<T: 'static> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut reg = self.inner.lock();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.slots.insert(id, Arc::new(callback));
            id
        };
        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().slots.remove(&id);
                }
            })),
        }
    }

    /// Invokes every live callback in registration order.
    pub fn notify(&self, value: &T) {
        let ids: Vec<u64> = self.inner.lock().slots.keys().copied().collect();
        for id in ids {
            // Re-check per callback: an earlier callback may have unsubscribed this one.
            let Some(cb) = self.inner.lock().slots.get(&id).cloned() else {
                continue;
            };
            cb(value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Observers::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// A handle with nothing to release, for sources that never emit.
    pub fn detached() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
