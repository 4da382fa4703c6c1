use std::{
    cell::RefCell,
    fmt,
    future::Future,
    rc::{Rc, Weak},
};

use futures::future::LocalBoxFuture;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{sinks::Sinks, Subscription};

#[cfg(test)]
mod tests;

/// One record of the remote collection: a JSON object with at least
/// `{id, title}`. Unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Item {
    pub id: u64,
    pub title: String,
}

/// Failure surfaced by the fetch helper.
///
/// Never escapes as a panic and never crosses the store boundary; consumers
/// read it out of [`FetchState::error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// What a fetch consumer reads on each render.
#[derive(Clone, Debug)]
pub struct FetchState {
    /// `true` from the start of the request until a response or error
    /// arrives.
    pub is_fetching: bool,
    pub error: Option<FetchError>,
    /// The last successfully fetched items; empty until the first success.
    pub items: Rc<Vec<Item>>,
}

/// The opaque transport performing the single outbound GET.
///
/// The endpoint is an external collaborator; embedders supply whatever
/// client they already run, tests supply canned futures.
pub trait Transport {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<String, FetchError>>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> LocalBoxFuture<'static, Result<String, FetchError>>,
{
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        self(url)
    }
}

struct FetchNode {
    state: RefCell<Rc<FetchState>>,
    watchers: RefCell<Sinks<Rc<FetchState>>>,
}

impl FetchNode {
    fn apply(this: &Rc<Self>, f: impl FnOnce(&FetchState) -> FetchState) {
        let next = {
            let current = this.state.borrow();
            Rc::new(f(&current))
        };
        *this.state.borrow_mut() = next.clone();
        Sinks::notify(&this.watchers, &next);
    }
}

/// Consumer handle for one in-flight fetch.
///
/// Dropping the handle is the unmount: a response arriving afterwards is
/// discarded without touching any state.
pub struct FetchHandle {
    node: Rc<FetchNode>,
}

impl FetchHandle {
    /// The current fetch state.
    pub fn state(&self) -> Rc<FetchState> {
        self.node.state.borrow().clone()
    }

    /// Replaces the fetched items directly, bypassing the transport.
    pub fn set_items(&self, items: Vec<Item>) {
        FetchNode::apply(&self.node, |state| FetchState {
            items: Rc::new(items),
            ..state.clone()
        });
    }

    /// Calls `f` with each new fetch state.
    pub fn watch(&self, f: impl FnMut(&Rc<FetchState>) + 'static) -> Subscription {
        let key = self.node.watchers.borrow_mut().insert(f);
        let node = Rc::downgrade(&self.node);
        Subscription::from_fn(move || {
            if let Some(node) = node.upgrade() {
                node.watchers.borrow_mut().remove(key);
            }
        })
    }
}

/// Starts a read-only fetch of the JSON collection at `url`.
///
/// Returns the consumer handle and the effect future; the caller spawns the
/// future on its single-threaded executor. The future holds only a weak
/// reference back to the handle's state, so completion after the handle is
/// dropped updates nothing.
///
/// On success the decoded items replace the current ones and `is_fetching`
/// clears; on failure `error` is populated and the last known items stay in
/// place (empty on first failure).
pub fn fetch_items(
    url: &str,
    transport: &impl Transport,
) -> (FetchHandle, impl Future<Output = ()>) {
    let node = Rc::new(FetchNode {
        state: RefCell::new(Rc::new(FetchState {
            is_fetching: true,
            error: None,
            items: Rc::new(Vec::new()),
        })),
        watchers: RefCell::new(Sinks::new()),
    });
    let weak = Rc::downgrade(&node);
    let url = url.to_owned();
    let response = transport.get(&url);
    let task = async move {
        let result = response.await;
        let Some(node) = Weak::upgrade(&weak) else {
            debug!(url = %url, "fetch completed after unmount; discarding");
            return;
        };
        match result.and_then(decode) {
            Ok(items) => {
                debug!(url = %url, count = items.len(), "fetch complete");
                FetchNode::apply(&node, |_| FetchState {
                    is_fetching: false,
                    error: None,
                    items: Rc::new(items),
                });
            }
            Err(error) => {
                warn!(url = %url, message = %error.message, "fetch failed");
                FetchNode::apply(&node, |state| FetchState {
                    is_fetching: false,
                    error: Some(error),
                    items: state.items.clone(),
                });
            }
        }
    };
    (FetchHandle { node }, task)
}

fn decode(body: String) -> Result<Vec<Item>, FetchError> {
    serde_json::from_str(&body).map_err(|e| FetchError::new(e.to_string()))
}
