use std::{
    any::Any,
    cell::RefCell,
    collections::HashMap,
    marker::PhantomData,
    rc::{Rc, Weak},
};

use derive_ex::derive_ex;
use tracing::trace;

use crate::{sinks::Sinks, Subscription};


/// One node in the component tree's scope chain.
///
/// Scopes exist to give context values a tree position: a value provided in
/// a scope is visible from that scope and every scope derived from it with
/// [`child`](Self::child), and resolution always finds the nearest
/// providing ancestor.
#[derive(Clone)]
pub struct Scope(Rc<ScopeNode>);

struct ScopeNode {
    parent: Option<Scope>,
    provided: RefCell<HashMap<usize, ProvidedSlot>>,
}

struct ProvidedSlot {
    node: Weak<dyn Any>,
    owner: usize,
}

impl Scope {
    /// Root of a scope chain.
    pub fn root() -> Self {
        Scope(Rc::new(ScopeNode {
            parent: None,
            provided: RefCell::new(HashMap::new()),
        }))
    }

    /// A scope one level deeper in the tree.
    pub fn child(&self) -> Self {
        Scope(Rc::new(ScopeNode {
            parent: Some(self.clone()),
            provided: RefCell::new(HashMap::new()),
        }))
    }
}

/// Identity of one context channel carrying values of type `T`.
///
/// Resolution is by key identity and tree position, not by name: two keys
/// created separately never observe each other's providers, even for the
/// same value type.
#[derive_ex(Clone, bound())]
pub struct ContextKey<T: 'static> {
    id: Rc<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ContextKey<T> {
    pub fn new() -> Self {
        Self {
            id: Rc::new(()),
            _marker: PhantomData,
        }
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.id) as usize
    }

    /// Installs `value` in `scope`, making it readable from that scope and
    /// all descendants until the returned provider is dropped.
    ///
    /// A later provider for the same key in a descendant scope shadows this
    /// one for that subtree.
    pub fn provide(&self, scope: &Scope, value: T) -> ContextProvider<T> {
        let node = Rc::new(ProviderNode {
            value: RefCell::new(Rc::new(value)),
            watchers: RefCell::new(Sinks::new()),
        });
        let owner = Rc::as_ptr(&node) as *const () as usize;
        let node_dyn: Rc<dyn Any> = node.clone();
        let weak: Weak<dyn Any> = Rc::downgrade(&node_dyn);
        scope
            .0
            .provided
            .borrow_mut()
            .insert(self.id(), ProvidedSlot { node: weak, owner });
        ContextProvider {
            node,
            scope: Rc::downgrade(&scope.0),
            key_id: self.id(),
            owner,
        }
    }

    /// Resolves the nearest ancestor provider's current value, if any.
    pub fn read(&self, scope: &Scope) -> Option<Rc<T>> {
        let node = self.resolve(scope)?;
        let value = node.value.borrow().clone();
        Some(value)
    }

    /// Calls `f` with the new value each time the nearest provider's value
    /// reference is replaced.
    ///
    /// Returns an empty subscription when no provider is in scope.
    pub fn watch(&self, scope: &Scope, f: impl FnMut(&Rc<T>) + 'static) -> Subscription {
        let Some(node) = self.resolve(scope) else {
            return Subscription::empty();
        };
        let key = node.watchers.borrow_mut().insert(f);
        let node = Rc::downgrade(&node);
        Subscription::from_fn(move || {
            if let Some(node) = node.upgrade() {
                node.watchers.borrow_mut().remove(key);
            }
        })
    }

    fn resolve(&self, scope: &Scope) -> Option<Rc<ProviderNode<T>>> {
        let id = self.id();
        let mut current = Some(scope.0.clone());
        while let Some(scope) = current {
            if let Some(slot) = scope.provided.borrow().get(&id) {
                if let Some(node) = slot.node.upgrade() {
                    return Some(node.downcast().unwrap());
                }
            }
            current = scope.parent.as_ref().map(|parent| parent.0.clone());
        }
        None
    }
}

impl<T: 'static> Default for ContextKey<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct ProviderNode<T: 'static> {
    value: RefCell<Rc<T>>,
    watchers: RefCell<Sinks<Rc<T>>>,
}

impl<T: 'static> ProviderNode<T> {
    fn set(this: &Rc<Self>, value: T) {
        let value = Rc::new(value);
        *this.value.borrow_mut() = value.clone();
        Sinks::notify(&this.watchers, &value);
    }
}

/// Owner of one provided context value.
///
/// Dropping the provider uninstalls the value from its scope; readers below
/// then resolve the next provider up the tree, or nothing.
pub struct ContextProvider<T: 'static> {
    node: Rc<ProviderNode<T>>,
    scope: Weak<ScopeNode>,
    key_id: usize,
    owner: usize,
}

impl<T: 'static> ContextProvider<T> {
    /// The currently owned value.
    pub fn get(&self) -> Rc<T> {
        self.node.value.borrow().clone()
    }

    /// Replaces the owned value and notifies watchers.
    pub fn set(&self, value: T) {
        ProviderNode::set(&self.node, value);
    }

    /// A cloneable setter descendants may hold without owning the value.
    pub fn setter(&self) -> ContextSetter<T> {
        ContextSetter {
            node: Rc::downgrade(&self.node),
        }
    }
}

impl<T: 'static> Drop for ContextProvider<T> {
    fn drop(&mut self) {
        let Some(scope) = self.scope.upgrade() else {
            return;
        };
        let mut provided = scope.provided.borrow_mut();
        // Only remove the slot this provider still owns; a newer provider
        // for the same key may have replaced it.
        if provided.get(&self.key_id).is_some_and(|slot| slot.owner == self.owner) {
            provided.remove(&self.key_id);
        }
    }
}

/// Non-owning handle that replaces a provider's value.
#[derive_ex(Clone, bound())]
pub struct ContextSetter<T: 'static> {
    node: Weak<ProviderNode<T>>,
}

impl<T: 'static> ContextSetter<T> {
    /// Replaces the provider's value and notifies watchers.
    ///
    /// A setter that outlives its provider is a silent no-op, so a late
    /// update can never touch an unmounted part of the tree.
    pub fn set(&self, value: T) {
        match self.node.upgrade() {
            Some(node) => ProviderNode::set(&node, value),
            None => trace!("context set after provider drop; ignoring"),
        }
    }
}
