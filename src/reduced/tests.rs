use std::rc::Rc;

use assert_call::{call, CallRecorder};

use crate::Reduced;

#[derive(Clone, Copy, Debug)]
enum LocalAction {
    Increment,
    Reset,
}

#[derive(Debug, Default)]
struct Local {
    count: i64,
}

fn cell() -> Reduced<Local, LocalAction> {
    Reduced::new(Local::default(), |state, action| match action {
        LocalAction::Increment => Rc::new(Local {
            count: state.count + 1,
        }),
        LocalAction::Reset if state.count != 0 => Rc::new(Local::default()),
        _ => Rc::clone(state),
    })
}

#[test]
fn dispatch_applies_the_reducer() {
    let cell = cell();
    cell.dispatch(LocalAction::Increment);
    cell.dispatch(LocalAction::Increment);
    assert_eq!(cell.get().count, 2);
}

#[test]
fn no_op_dispatch_is_pointer_stable_and_silent() {
    let cell = cell();
    let mut cr = CallRecorder::new();
    let _w = cell.watch(|state| call!("{}", state.count));
    let before = cell.get();
    // Already zero, so the reducer hands back the same reference.
    cell.dispatch(LocalAction::Reset);
    assert!(Rc::ptr_eq(&cell.get(), &before));
    cr.verify(());
    cell.dispatch(LocalAction::Increment);
    cr.verify("1");
}

#[test]
fn clones_share_the_cell() {
    let cell = cell();
    let other = cell.clone();
    other.dispatch(LocalAction::Increment);
    assert_eq!(cell.get().count, 1);
}
