use crate::{
    auth, counter, Action, AuthState, ContextKey, CounterState, DomainKey, DuplicateDomain, Store,
};


/// The assembled application state: the store with its two reduced domains
/// plus the context key for the ad hoc shared user value.
///
/// The two tiers are deliberate. Counter and authentication go through the
/// store's action vocabulary so every transition is reducer-validated; the
/// user value is plain context ownership, replaced directly by whoever
/// holds the setter.
pub struct App {
    pub store: Store<Action>,
    pub counter: DomainKey<CounterState>,
    pub auth: DomainKey<AuthState>,
    pub user: ContextKey<String>,
}

impl App {
    /// Configures the store from each domain's initial value.
    pub fn new() -> Result<Self, DuplicateDomain> {
        let mut builder = Store::builder();
        let counter = builder.domain("counter", CounterState::default(), counter::reduce);
        let auth = builder.domain("authentication", AuthState::default(), auth::reduce);
        Ok(App {
            store: builder.build()?,
            counter,
            auth,
            user: ContextKey::new(),
        })
    }
}
