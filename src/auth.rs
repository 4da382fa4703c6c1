//! The authentication state domain.

use std::rc::Rc;

use crate::{Action, AuthAction};

#[cfg(test)]
mod tests;

/// State of the authentication domain.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthState {
    pub is_authenticated: bool,
}

/// Authentication domain reducer.
///
/// `Login` and `Logout` are idempotent in value; each matched branch still
/// returns a freshly allocated state, only the unmatched branch returns the
/// input reference.
pub fn reduce(state: &Rc<AuthState>, action: &Action) -> Rc<AuthState> {
    match action {
        Action::Auth(AuthAction::Login) => Rc::new(AuthState {
            is_authenticated: true,
        }),
        Action::Auth(AuthAction::Logout) => Rc::new(AuthState {
            is_authenticated: false,
        }),
        _ => Rc::clone(state),
    }
}
