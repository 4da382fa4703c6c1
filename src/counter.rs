//! The counter state domain.

use std::rc::Rc;

use crate::{Action, CounterAction};

#[cfg(test)]
mod tests;

/// State of the counter domain.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CounterState {
    pub count: i64,
}

/// Counter domain reducer.
///
/// `Decrement` at or below zero is a no-op returning the input reference
/// unchanged, so the count never goes negative. `Increase` applies its
/// payload without a guard.
pub fn reduce(state: &Rc<CounterState>, action: &Action) -> Rc<CounterState> {
    match action {
        Action::Counter(CounterAction::Increment) => Rc::new(CounterState {
            count: state.count + 1,
        }),
        Action::Counter(CounterAction::Decrement) => {
            if state.count <= 0 {
                Rc::clone(state)
            } else {
                Rc::new(CounterState {
                    count: state.count - 1,
                })
            }
        }
        Action::Counter(CounterAction::Increase(amount)) => Rc::new(CounterState {
            count: state.count + amount,
        }),
        _ => Rc::clone(state),
    }
}
