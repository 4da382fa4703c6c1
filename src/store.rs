use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::{HashSet, VecDeque},
    fmt,
    marker::PhantomData,
    rc::Rc,
};

use derive_ex::derive_ex;
use parse_display::Display;
use tracing::{debug, trace};

use crate::{sinks::Sinks, Subscription};


/// Typed handle to one state domain registered in a [`Store`].
///
/// Obtained from [`StoreBuilder::domain`] and only meaningful for snapshots
/// of the store built from that builder.
#[derive_ex(Clone, Copy, bound())]
pub struct DomainKey<S: 'static> {
    index: usize,
    _marker: PhantomData<fn() -> S>,
}

/// Immutable view of the store's root state.
///
/// Snapshots are shared, never mutated: a dispatch that changes anything
/// swaps in a newly built snapshot, and a dispatch that changes nothing
/// leaves the previous one in place, pointer-identical.
pub struct Snapshot {
    domains: Box<[Rc<dyn Any>]>,
}

impl Snapshot {
    /// The current value of the domain identified by `key`.
    pub fn get<S: 'static>(&self, key: DomainKey<S>) -> Rc<S> {
        self.domains[key.index].clone().downcast().unwrap()
    }
}

/// Two domains claimed the same name at store configuration.
#[derive(Display, Debug)]
#[display("duplicate state domain `{0}`")]
pub struct DuplicateDomain(pub &'static str);

impl std::error::Error for DuplicateDomain {}

#[allow(clippy::type_complexity)]
struct DomainEntry<A: 'static> {
    name: &'static str,
    reduce: Box<dyn Fn(&Rc<dyn Any>, &A) -> (Rc<dyn Any>, bool)>,
}

/// Collects state domains and combines them into a [`Store`].
#[derive_ex(Default, bound())]
pub struct StoreBuilder<A: 'static> {
    domains: Vec<(DomainEntry<A>, Rc<dyn Any>)>,
}

impl<A: 'static> StoreBuilder<A> {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
        }
    }

    /// Registers a state domain with its initial value and reducer.
    ///
    /// The returned key reads this domain out of any snapshot of the built
    /// store. The reducer must return a newly allocated state on every
    /// state-changing branch and the input reference on the no-op branch;
    /// pointer identity is the store's change detection.
    pub fn domain<S: 'static>(
        &mut self,
        name: &'static str,
        initial: S,
        reduce: impl Fn(&Rc<S>, &A) -> Rc<S> + 'static,
    ) -> DomainKey<S> {
        let key = DomainKey {
            index: self.domains.len(),
            _marker: PhantomData,
        };
        let entry = DomainEntry {
            name,
            reduce: Box::new(move |state, action| {
                let state: Rc<S> = state.clone().downcast().unwrap();
                let next = reduce(&state, action);
                let changed = !Rc::ptr_eq(&next, &state);
                let next: Rc<dyn Any> = next;
                (next, changed)
            }),
        };
        self.domains.push((entry, Rc::new(initial)));
        key
    }

    /// Combines the registered domains into a store, constructing the root
    /// state from each domain's initial value.
    ///
    /// Fails if two domains claim the same name: the process cannot serve a
    /// coherent state tree, so startup must not proceed.
    pub fn build(self) -> Result<Store<A>, DuplicateDomain> {
        let mut seen = HashSet::new();
        for (entry, _) in &self.domains {
            if !seen.insert(entry.name) {
                return Err(DuplicateDomain(entry.name));
            }
        }
        let (domains, initial): (Vec<_>, Vec<_>) = self.domains.into_iter().unzip();
        debug!(
            domains = ?domains.iter().map(|d| d.name).collect::<Vec<_>>(),
            "store configured"
        );
        Ok(Store(Rc::new(StoreNode {
            domains: domains.into_boxed_slice(),
            state: RefCell::new(Rc::new(Snapshot {
                domains: initial.into_boxed_slice(),
            })),
            subscribers: RefCell::new(Sinks::new()),
            dispatching: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
        })))
    }
}

/// The process-wide state container combining all domains.
///
/// Explicitly constructed via [`StoreBuilder`] and explicitly owned;
/// cloning returns another handle to the same store, so it can be passed by
/// reference or injected through the context channel rather than looked up
/// ambiently.
#[derive_ex(Clone, bound())]
pub struct Store<A: 'static>(Rc<StoreNode<A>>);

struct StoreNode<A: 'static> {
    domains: Box<[DomainEntry<A>]>,
    state: RefCell<Rc<Snapshot>>,
    subscribers: RefCell<Sinks<Rc<Snapshot>>>,
    dispatching: Cell<bool>,
    queue: RefCell<VecDeque<A>>,
}

impl<A: 'static> Store<A> {
    pub fn builder() -> StoreBuilder<A> {
        StoreBuilder::new()
    }

    /// The current immutable snapshot of the root state.
    pub fn state(&self) -> Rc<Snapshot> {
        self.0.state.borrow().clone()
    }

    /// Applies `action` to every domain's reducer against the pre-dispatch
    /// snapshot, swaps in the combined result, then notifies every
    /// subscriber once with the new snapshot.
    ///
    /// Dispatch is fully synchronous. A dispatch issued from within a
    /// subscriber callback is queued and applied after the current pass
    /// completes but before the outermost `dispatch` call returns, so no
    /// notification ever observes a partially applied pass. A panicking
    /// reducer propagates to the caller with the prior snapshot intact and
    /// the store still usable.
    pub fn dispatch(&self, action: A)
    where
        A: fmt::Display,
    {
        let node = &*self.0;
        node.queue.borrow_mut().push_back(action);
        if node.dispatching.get() {
            return;
        }
        node.dispatching.set(true);
        let _guard = DrainGuard(node);
        loop {
            let action = match node.queue.borrow_mut().pop_front() {
                Some(action) => action,
                None => break,
            };
            node.apply(&action);
        }
    }

    /// Registers `f` to be called after every dispatch with the new
    /// snapshot, whether or not any domain changed.
    ///
    /// Consumers that only care about one domain should filter with
    /// [`watch`](Self::watch). Dropping the returned [`Subscription`]
    /// unregisters the callback.
    pub fn subscribe(&self, f: impl FnMut(&Rc<Snapshot>) + 'static) -> Subscription {
        let key = self.0.subscribers.borrow_mut().insert(f);
        let node = Rc::downgrade(&self.0);
        Subscription::from_fn(move || {
            if let Some(node) = node.upgrade() {
                node.subscribers.borrow_mut().remove(key);
            }
        })
    }

    /// Calls `f` only when the domain selected by `key` changed.
    ///
    /// Change detection compares the domain value by pointer identity,
    /// which is exactly what the reducers' no-op branches preserve.
    pub fn watch<S: 'static>(
        &self,
        key: DomainKey<S>,
        mut f: impl FnMut(&Rc<S>) + 'static,
    ) -> Subscription {
        let mut last = self.state().get(key);
        self.subscribe(move |snapshot| {
            let current = snapshot.get(key);
            if !Rc::ptr_eq(&current, &last) {
                last = Rc::clone(&current);
                f(&current);
            }
        })
    }
}

impl<A: 'static> StoreNode<A> {
    fn apply(&self, action: &A)
    where
        A: fmt::Display,
    {
        let prev = self.state.borrow().clone();
        let mut changed = Vec::new();
        let next: Vec<Rc<dyn Any>> = self
            .domains
            .iter()
            .zip(prev.domains.iter())
            .map(|(entry, value)| {
                let (next, domain_changed) = (entry.reduce)(value, action);
                if domain_changed {
                    changed.push(entry.name);
                }
                next
            })
            .collect();
        trace!(action = %action, changed = ?changed, "dispatch");
        let next = if changed.is_empty() {
            prev
        } else {
            Rc::new(Snapshot {
                domains: next.into_boxed_slice(),
            })
        };
        *self.state.borrow_mut() = next.clone();
        Sinks::notify(&self.subscribers, &next);
    }
}

struct DrainGuard<'a, A: 'static>(&'a StoreNode<A>);

impl<A: 'static> Drop for DrainGuard<'_, A> {
    fn drop(&mut self) {
        // On unwind, actions queued by re-entrant dispatches are discarded
        // rather than applied against a half-poisoned pass.
        self.0.dispatching.set(false);
        self.0.queue.borrow_mut().clear();
    }
}
