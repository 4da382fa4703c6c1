use std::{cell::RefCell, rc::Rc};

use derive_ex::derive_ex;

use crate::{sinks::Sinks, Subscription};

#[cfg(test)]
mod tests;

/// A single-domain reducer cell.
///
/// The lightweight sibling of [`Store`](crate::Store) for component-local
/// state: one reducer, one value, no action queue and no multi-domain
/// snapshot. The same purity rules apply, so [`get`](Self::get) is
/// pointer-stable across no-op dispatches, and watchers only fire when the
/// reducer returned a new reference. Cloning returns another handle to the
/// same cell.
#[derive_ex(Clone, bound())]
pub struct Reduced<S: 'static, A: 'static>(Rc<ReducedNode<S, A>>);

struct ReducedNode<S: 'static, A> {
    value: RefCell<Rc<S>>,
    #[allow(clippy::type_complexity)]
    reduce: Box<dyn Fn(&Rc<S>, &A) -> Rc<S>>,
    watchers: RefCell<Sinks<Rc<S>>>,
}

impl<S: 'static, A: 'static> Reduced<S, A> {
    pub fn new(initial: S, reduce: impl Fn(&Rc<S>, &A) -> Rc<S> + 'static) -> Self {
        Self(Rc::new(ReducedNode {
            value: RefCell::new(Rc::new(initial)),
            reduce: Box::new(reduce),
            watchers: RefCell::new(Sinks::new()),
        }))
    }

    /// The current value.
    pub fn get(&self) -> Rc<S> {
        self.0.value.borrow().clone()
    }

    /// Runs the reducer; replaces the value and notifies watchers only when
    /// a new state reference came back.
    pub fn dispatch(&self, action: A) {
        let node = &*self.0;
        let prev = node.value.borrow().clone();
        let next = (node.reduce)(&prev, &action);
        if Rc::ptr_eq(&next, &prev) {
            return;
        }
        *node.value.borrow_mut() = next.clone();
        Sinks::notify(&node.watchers, &next);
    }

    /// Calls `f` with each newly produced state.
    pub fn watch(&self, f: impl FnMut(&Rc<S>) + 'static) -> Subscription {
        let key = self.0.watchers.borrow_mut().insert(f);
        let node = Rc::downgrade(&self.0);
        Subscription::from_fn(move || {
            if let Some(node) = node.upgrade() {
                node.watchers.borrow_mut().remove(key);
            }
        })
    }
}
