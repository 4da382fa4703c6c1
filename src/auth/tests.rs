use std::rc::Rc;

use crate::{auth::reduce, Action, AuthAction, AuthState, CounterAction};

#[test]
fn login_then_logout() {
    let state = Rc::new(AuthState::default());
    let state = reduce(&state, &AuthAction::Login.into());
    assert!(state.is_authenticated);
    let state = reduce(&state, &AuthAction::Logout.into());
    assert!(!state.is_authenticated);
}

#[test]
fn logout_is_idempotent() {
    let state = Rc::new(AuthState::default());
    let state = reduce(&state, &AuthAction::Logout.into());
    assert!(!state.is_authenticated);
    let state = reduce(&state, &AuthAction::Logout.into());
    assert!(!state.is_authenticated);
}

#[test]
fn foreign_actions_are_no_ops() {
    let state = Rc::new(AuthState {
        is_authenticated: true,
    });
    for action in [Action::Init, CounterAction::Increment.into()] {
        let next = reduce(&state, &action);
        assert!(Rc::ptr_eq(&next, &state));
    }
}
