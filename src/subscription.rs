use std::mem::take;

/// Handle that undoes a registration when dropped.
///
/// Returned by [`Store::subscribe`](crate::Store::subscribe) and the other
/// subscribe-like operations; hold it for as long as the callback should
/// stay registered.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    /// A subscription that does nothing when dropped.
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }

    /// Runs `f` when the subscription is dropped.
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        match take(&mut self.0) {
            RawSubscription::Empty => {}
            RawSubscription::Fn(f) => f(),
        }
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
}
