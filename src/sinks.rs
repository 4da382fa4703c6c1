use std::{cell::RefCell, rc::Rc};

use slabmap::SlabMap;

pub(crate) type SinkKey = usize;

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Registry of change-notification callbacks.
///
/// Callbacks are snapshotted into a buffer before a notification pass, so a
/// running callback may register or remove sinks (including itself) without
/// re-entrant borrows of the registry.
pub(crate) struct Sinks<T: 'static> {
    sinks: SlabMap<Callback<T>>,
}

impl<T: 'static> Sinks<T> {
    pub fn new() -> Self {
        Self {
            sinks: SlabMap::new(),
        }
    }

    pub fn insert(&mut self, f: impl FnMut(&T) + 'static) -> SinkKey {
        let callback: Callback<T> = Rc::new(RefCell::new(f));
        self.sinks.insert(callback)
    }

    pub fn remove(&mut self, key: SinkKey) {
        self.sinks.remove(key);
    }

    /// Calls every sink registered at the start of the pass with `value`.
    pub fn notify(this: &RefCell<Self>, value: &T) {
        let callbacks = {
            let mut sinks = this.borrow_mut();
            sinks.sinks.optimize();
            sinks.sinks.values().cloned().collect::<Vec<_>>()
        };
        for callback in &callbacks {
            (callback.borrow_mut())(value);
        }
    }
}
