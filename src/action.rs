use parse_display::Display;


/// A named, immutable request to change application state.
///
/// Every action renders to its `domain/type` string, which is what dispatch
/// logging records. A domain's reducer matches only its own variants and
/// falls through to the unchanged-state branch for everything else, so
/// dispatching an action no domain recognizes is a legal no-op.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum Action {
    #[display("counter/{0}")]
    Counter(CounterAction),
    #[display("auth/{0}")]
    Auth(AuthAction),
    /// Matched by no reducer; the canonical no-op dispatch.
    #[display("store/init")]
    Init,
}

/// Counter domain vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum CounterAction {
    #[display("increment")]
    Increment,
    #[display("decrement")]
    Decrement,
    /// Adds the payload to the count. Unlike `Decrement`, no guard applies.
    #[display("increase({0})")]
    Increase(i64),
}

/// Authentication domain vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum AuthAction {
    #[display("onLogin")]
    Login,
    #[display("onLogout")]
    Logout,
}

impl From<CounterAction> for Action {
    fn from(action: CounterAction) -> Self {
        Action::Counter(action)
    }
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}
