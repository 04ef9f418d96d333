//! A registry of tasks parked on a one-shot event.
//!
//! Both the promise's outcome broadcast and stop tokens need the same thing:
//! park an arbitrary number of tasks, then wake all of them exactly when the
//! event fires. Entries stay in the list until their owners remove them, so
//! a woken task that polls again simply re-arms its own slot.

use std::sync::Mutex;
use std::task::{Context, Waker};

use slab::Slab;

pub(crate) struct WakerList {
    /// Wakers of parked tasks, keyed by their index in the slab.
    ///
    /// A `None` entry belongs to a task that has been woken but has not
    /// polled or dropped yet.
    entries: Mutex<Slab<Option<Waker>>>,
}

impl WakerList {
    pub(crate) fn new() -> WakerList {
        WakerList {
            entries: Mutex::new(Slab::new()),
        }
    }

    /// Parks the current task and returns the key of its entry.
    pub(crate) fn insert(&self, cx: &Context<'_>) -> usize {
        let w = cx.waker().clone();
        self.entries.lock().unwrap().insert(Some(w))
    }

    /// Re-arms the waker of a previously parked task.
    pub(crate) fn update(&self, key: usize, cx: &Context<'_>) {
        let mut entries = self.entries.lock().unwrap();

        match &mut entries[key] {
            None => {
                // The entry was emptied by a wake-up; fill it back in.
                let w = cx.waker().clone();
                entries[key] = Some(w);
            }
            Some(w) => {
                if !w.will_wake(cx.waker()) {
                    *w = cx.waker().clone();
                }
            }
        }
    }

    /// Removes the entry of a task that completed or gave up.
    pub(crate) fn remove(&self, key: usize) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Wakes every parked task.
    pub(crate) fn notify_all(&self) {
        let mut entries = self.entries.lock().unwrap();

        for (_, entry) in entries.iter_mut() {
            if let Some(w) = entry.take() {
                w.wake();
            }
        }
    }
}
