use std::rc::Rc;

use rstest::rstest;

use crate::{counter::reduce, Action, AuthAction, CounterAction, CounterState};

fn counter(count: i64) -> Rc<CounterState> {
    Rc::new(CounterState { count })
}

#[test]
fn increment() {
    let state = reduce(&counter(0), &CounterAction::Increment.into());
    assert_eq!(state.count, 1);
}

#[test]
fn decrement() {
    let state = reduce(&counter(2), &CounterAction::Decrement.into());
    assert_eq!(state.count, 1);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn decrement_never_goes_negative(#[case] start: i64) {
    let mut state = counter(start);
    for _ in 0..start + 3 {
        state = reduce(&state, &CounterAction::Decrement.into());
        assert!(state.count >= 0);
    }
    assert_eq!(state.count, 0);
}

#[test]
fn decrement_at_zero_returns_the_input_reference() {
    let state = counter(0);
    let next = reduce(&state, &CounterAction::Decrement.into());
    assert!(Rc::ptr_eq(&next, &state));
}

#[rstest]
#[case(3, 4)]
#[case(10, -2)]
#[case(0, 0)]
fn increase_is_additive(#[case] a: i64, #[case] b: i64) {
    let start = counter(7);
    let split = reduce(
        &reduce(&start, &CounterAction::Increase(a).into()),
        &CounterAction::Increase(b).into(),
    );
    let joined = reduce(&start, &CounterAction::Increase(a + b).into());
    assert_eq!(split.count, joined.count);
}

#[test]
fn increase_has_no_floor_guard() {
    let state = reduce(&counter(0), &CounterAction::Increase(-5).into());
    assert_eq!(state.count, -5);
}

#[test]
fn foreign_actions_are_no_ops() {
    let state = counter(3);
    for action in [Action::Init, AuthAction::Login.into()] {
        let next = reduce(&state, &action);
        assert!(Rc::ptr_eq(&next, &state));
    }
}
