use std::cell::RefCell;

use assert_call::{call, CallRecorder};
use futures::{channel::oneshot, FutureExt};
use rt_local::{runtime::core::test, spawn_local, wait_for_idle};

use crate::{fetch_items, FetchError, Item, Transport};

const URL: &str = "https://jsonplaceholder.typicode.com/todos";

fn ok_transport(body: &str) -> impl Transport {
    let body = body.to_owned();
    move |_: &str| {
        let body = body.clone();
        async move { Ok::<_, FetchError>(body) }.boxed_local()
    }
}

fn err_transport(message: &str) -> impl Transport {
    let message = message.to_owned();
    move |_: &str| {
        let message = message.clone();
        async move { Err::<String, _>(FetchError::new(message)) }.boxed_local()
    }
}

#[test]
async fn success_populates_items_and_clears_is_fetching() {
    let body = r#"[
        {"userId":1,"id":1,"title":"delectus aut autem","completed":false},
        {"userId":1,"id":2,"title":"quis ut nam facilis","completed":false}
    ]"#;
    let (handle, task) = fetch_items(URL, &ok_transport(body));
    assert!(handle.state().is_fetching);
    let _task = spawn_local(task);
    wait_for_idle().await;

    let state = handle.state();
    assert!(!state.is_fetching);
    assert!(state.error.is_none());
    assert_eq!(
        *state.items,
        vec![
            Item {
                id: 1,
                title: "delectus aut autem".into(),
            },
            Item {
                id: 2,
                title: "quis ut nam facilis".into(),
            },
        ]
    );
}

#[test]
async fn failure_surfaces_the_message_and_keeps_last_items() {
    let (handle, task) = fetch_items(URL, &err_transport("Failed to fetch"));
    let _task = spawn_local(task);
    wait_for_idle().await;

    let state = handle.state();
    assert!(!state.is_fetching);
    assert_eq!(state.error.as_ref().unwrap().message, "Failed to fetch");
    assert!(state.items.is_empty());
}

#[test]
async fn malformed_body_is_a_decode_error() {
    let (handle, task) = fetch_items(URL, &ok_transport("not json"));
    let _task = spawn_local(task);
    wait_for_idle().await;

    let state = handle.state();
    assert!(!state.is_fetching);
    assert!(state.error.is_some());
    assert!(state.items.is_empty());
}

#[test]
async fn completion_after_unmount_is_discarded() {
    let (sender, receiver) = oneshot::channel::<Result<String, FetchError>>();
    let receiver = RefCell::new(Some(receiver));
    let transport = move |_: &str| {
        let receiver = receiver.borrow_mut().take().unwrap();
        async move { receiver.await.unwrap() }.boxed_local()
    };

    let (handle, task) = fetch_items(URL, &transport);
    let mut cr = CallRecorder::new();
    let _w = handle.watch(|_| call!("update"));
    let _task = spawn_local(task);
    wait_for_idle().await;

    drop(handle);
    sender.send(Ok(String::from("[]"))).unwrap();
    wait_for_idle().await;
    cr.verify(());
}

#[test]
fn set_items_replaces_data_directly() {
    let (handle, _task) = fetch_items(URL, &ok_transport("[]"));
    let mut cr = CallRecorder::new();
    let _w = handle.watch(|state| call!("{}", state.items.len()));
    handle.set_items(vec![Item {
        id: 1,
        title: "pinned".into(),
    }]);
    cr.verify("1");
    assert_eq!(handle.state().items.len(), 1);
    // The direct setter does not touch the in-flight flag.
    assert!(handle.state().is_fetching);
}
